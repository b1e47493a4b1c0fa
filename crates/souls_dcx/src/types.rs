//! Base types for the structure of a DCX frame.

use binrw::{BinRead, BinWrite};

/// Scheme tag for a whole-payload Zlib stream.
pub const TAG_DEFLATE: [u8; 4] = *b"DFLT";
/// Scheme tag for the block-oriented scheme.
pub const TAG_BLOCK: [u8; 4] = *b"EDGE";
/// Scheme tag occasionally written by tools for an uncompressed payload.
pub const TAG_NONE: [u8; 4] = *b"NONE";
/// Recognized tags this library does not implement.
pub const TAG_UNSUPPORTED: [[u8; 4]; 2] = [*b"KRAK", *b"ZSTD"];

/// Leading DCX section
///
/// The offsets locate the `DCS` and `DCP` sections; every known writer places them at
/// `0x18` and `0x24`. The remaining words vary per game and are preserved verbatim.
#[derive(BinRead, BinWrite, Debug, Copy, Clone, PartialEq)]
#[brw(magic = b"DCX\0", big)]
pub struct DcxHeader {
    /// Format version word, `0x10000` or `0x11000`
    pub version_word: u32,

    /// Offset of the sizes section from the start of the file
    pub sizes_offset: u32,

    /// Offset of the parameters section from the start of the file
    pub params_offset: u32,

    /// Unknown, `0x24` or `0x44`
    pub unk10: u32,

    /// Unknown, `0x2C` or `0x4C`
    pub unk14: u32,
}

/// `DCS` section: payload sizes before and after compression
#[derive(BinRead, BinWrite, Debug, Copy, Clone, PartialEq)]
#[brw(magic = b"DCS\0", big)]
pub struct DcxSizes {
    /// Size of the payload once decompressed
    pub uncompressed_size: u32,

    /// Size of the compressed data section
    pub compressed_size: u32,
}

/// `DCP` section: the compression scheme and its tunables
#[derive(BinRead, BinWrite, Debug, Copy, Clone, PartialEq)]
#[brw(magic = b"DCP\0", big)]
pub struct DcxScheme {
    /// Scheme tag, one of [`TAG_DEFLATE`], [`TAG_BLOCK`] or [`TAG_NONE`]
    pub tag: [u8; 4],

    /// Size of this section, always `0x20`
    pub params_size: u32,

    /// Compression level
    pub level: u8,

    #[brw(pad_before = 3)]
    /// Deflate window hint for `DFLT`, maximum block size for `EDGE`
    pub window: u32,

    /// Reserved words, preserved verbatim
    pub reserved: [u32; 3],
}

/// `DCA` section header preceding the compressed data
#[derive(BinRead, BinWrite, Debug, Copy, Clone, PartialEq)]
#[brw(magic = b"DCA\0", big)]
pub struct DcxExtra {
    /// Size of the data header, `8` unless a block table follows
    pub size: u32,
}

/// `EgdT` block table header used by the `EDGE` scheme
#[derive(BinRead, BinWrite, Debug, Copy, Clone, PartialEq)]
#[brw(magic = b"EgdT", big)]
pub struct BlockTableHeader {
    /// Table format version, `0x10100`
    pub version: u32,

    /// Size of this header, `0x24`
    pub header_size: u32,

    /// Size of one block record, `0x10`
    pub record_size: u32,

    /// Uncompressed size of every block but the last
    pub normal_block_size: u32,

    /// Uncompressed size of the final block
    pub last_block_size: u32,

    /// Total size of the table, header and records
    pub table_size: u32,

    /// Number of blocks
    pub block_count: u32,

    /// Unknown, `0x100000`
    pub unk20: u32,
}

/// One record of the `EDGE` block table
#[derive(BinRead, BinWrite, Debug, Default, Copy, Clone, PartialEq)]
#[brw(big)]
pub struct BlockRecord {
    /// Always zero
    pub unk00: u32,

    /// Offset of this block's data from the start of the data section
    pub offset: u32,

    /// Size of this block's data as stored
    pub length: u32,

    /// `1` when the block is a Zlib stream, `0` when stored raw
    pub compressed: u32,
}

impl BlockTableHeader {
    pub const HEADER_SIZE: u32 = 0x24;
    pub const RECORD_SIZE: u32 = 0x10;
    pub const VERSION: u32 = 0x10100;
}
