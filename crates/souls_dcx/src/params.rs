//! Compression parameters captured on decode and required verbatim on re-encode.

use bon::Builder;

use crate::types;

/// Standard maximum block size for the block-oriented scheme
pub const BLOCK_SIZE_STANDARD: u32 = 0x10000;
/// Maximum block size of the "max" preset
pub const BLOCK_SIZE_MAX: u32 = 0x40000;

/// The closed set of supported compression schemes
///
/// Every scheme is a pure byte transform; adding one touches only this crate,
/// never the archive codecs layered on top.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum DcxAlgorithm {
    /// No frame at all; the payload is stored bare
    #[default]
    None,

    /// A frame whose data section is the payload verbatim (`NONE`)
    ///
    /// Distinct from [`DcxAlgorithm::None`] so that frames some tools write with an
    /// uncompressed data section still round-trip to their original bytes.
    Stored,

    /// Whole-payload Zlib stream (`DFLT`)
    Deflate,

    /// Independently compressed fixed-size blocks (`EDGE`)
    Block {
        /// Uncompressed size of every block but the last
        max_block_size: u32,
    },
}

/// Full parameter set of a DCX frame
///
/// Captured by [`decode`](crate::read::decode) and threaded verbatim back into
/// [`encode`](crate::write::encode). The unknown header words are carried here
/// rather than recomputed so frames written by other tools survive a round trip
/// untouched. Callers building a *new* archive pick a preset instead:
///
/// ```
/// use souls_dcx::DcxParams;
///
/// let frame = souls_dcx::encode(b"payload", &DcxParams::deflate()).unwrap();
/// let (payload, params) = souls_dcx::decode(&frame).unwrap();
/// assert_eq!(payload, b"payload");
/// assert_eq!(params, DcxParams::deflate());
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Builder)]
pub struct DcxParams {
    /// Scheme selector; never re-detected on encode
    #[builder(default)]
    pub algorithm: DcxAlgorithm,

    /// Header version word, `0x10000` or `0x11000`
    #[builder(default = 0x10000)]
    pub version_word: u32,

    /// Unknown header word at `0x10`
    #[builder(default = 0x24)]
    pub unk10: u32,

    /// Unknown header word at `0x14`
    #[builder(default = 0x2C)]
    pub unk14: u32,

    /// Compression level byte
    #[builder(default = 9)]
    pub level: u8,

    /// Deflate window hint; for the block scheme this mirrors the block size
    #[builder(default = 0x10000)]
    pub window: u32,

    /// Reserved scheme words, preserved verbatim
    #[builder(default = [0; 3])]
    pub reserved: [u32; 3],
}

impl DcxParams {
    /// Parameters for a bare, unwrapped payload.
    pub fn none() -> Self {
        Self::builder().build()
    }

    /// The fixed deflate preset used for new archives.
    pub fn deflate() -> Self {
        Self::builder().algorithm(DcxAlgorithm::Deflate).build()
    }

    /// The standard block-oriented preset.
    pub fn block() -> Self {
        Self::builder()
            .algorithm(DcxAlgorithm::Block {
                max_block_size: BLOCK_SIZE_STANDARD,
            })
            .build()
    }

    /// The block-oriented preset with the larger block size.
    pub fn block_max() -> Self {
        Self::builder()
            .algorithm(DcxAlgorithm::Block {
                max_block_size: BLOCK_SIZE_MAX,
            })
            .window(BLOCK_SIZE_MAX)
            .build()
    }

    /// The on-disk scheme tag for this parameter set.
    pub fn tag(&self) -> [u8; 4] {
        match self.algorithm {
            DcxAlgorithm::None | DcxAlgorithm::Stored => types::TAG_NONE,
            DcxAlgorithm::Deflate => types::TAG_DEFLATE,
            DcxAlgorithm::Block { .. } => types::TAG_BLOCK,
        }
    }
}

impl Default for DcxParams {
    fn default() -> Self {
        Self::none()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn presets() {
        assert_eq!(DcxParams::none().algorithm, DcxAlgorithm::None);
        assert_eq!(DcxParams::deflate().level, 9);
        assert_eq!(
            DcxParams::block().algorithm,
            DcxAlgorithm::Block {
                max_block_size: BLOCK_SIZE_STANDARD
            }
        );
        assert_eq!(
            DcxParams::block_max().algorithm,
            DcxAlgorithm::Block {
                max_block_size: BLOCK_SIZE_MAX
            }
        );
    }

    #[test]
    fn tags() {
        assert_eq!(DcxParams::deflate().tag(), *b"DFLT");
        assert_eq!(DcxParams::block().tag(), *b"EDGE");
        assert_eq!(DcxParams::none().tag(), *b"NONE");
    }
}
