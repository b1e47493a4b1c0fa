//! The two-file binder variant
//!
//! Split binders keep entry metadata in a header file (`BHF3`/`BHF4`) and payload bytes
//! in a data file (`BDF3`/`BDF4`); entry offsets in the header half address regions of
//! the data half. The error modes differ from the single-file case — an out-of-range
//! offset here means the two files do not belong together, not just a malformed header —
//! so the pair is validated as a whole before any entry is materialized.

use std::io::Write;

use tracing::instrument;

use crate::endian::Endian;
use crate::error::{Error, Result};
use crate::read::{bind_entries, leading_magic, read_bnd3, read_bnd4, RawRecord};
use crate::types::{Binder, BinderMeta};
use crate::write::{bnd3_shell, bnd4_shell, layout_entries, write_data};

pub(crate) const BDF3_HEADER_SIZE: u64 = 0x10;
pub(crate) const BDF4_HEADER_SIZE: u64 = 0x30;

/// Header metadata of the data half, preserved for verbatim re-emission.
///
/// The older data header carries only a version signature; the unknown flag fields are
/// meaningful for the newer variant and ignored otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataHalfMeta {
    /// 8-byte version signature of the data file
    pub version: [u8; 8],
    pub unk04: bool,
    pub unk05: bool,
    pub big_endian: bool,
    pub bit_big_endian: bool,
}

/// A binder whose header and payload bytes live in separate files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitBinder {
    binder: Binder,
    data_meta: DataHalfMeta,
}

impl SplitBinder {
    /// Parse a header file and its companion data file.
    ///
    /// Every entry's `[offset, offset + length)` region must lie inside the data file
    /// and no two regions may intersect; a violation fails the whole parse rather than
    /// producing a partially usable binder.
    #[instrument(skip_all, fields(header_len = header_bytes.len(), data_len = data_bytes.len()), err)]
    pub fn parse(header_bytes: &[u8], data_bytes: &[u8]) -> Result<SplitBinder> {
        let magic = leading_magic(header_bytes)?;
        match &magic {
            b"BHF3" => {
                let (meta, records) = read_bnd3(header_bytes, b"BHF3")?;
                let data_meta = parse_bdf3(data_bytes)?;
                check_overlap(&records)?;
                Ok(SplitBinder {
                    binder: Binder {
                        meta: BinderMeta::Bnd3(meta),
                        entries: bind_entries(&records, data_bytes)?,
                    },
                    data_meta,
                })
            }
            b"BHF4" => {
                let (meta, records) = read_bnd4(header_bytes, b"BHF4")?;
                let data_meta = parse_bdf4(data_bytes)?;
                check_overlap(&records)?;
                Ok(SplitBinder {
                    binder: Binder {
                        meta: BinderMeta::Bnd4(meta),
                        entries: bind_entries(&records, data_bytes)?,
                    },
                    data_meta,
                })
            }
            _ => Err(Error::InvalidMagic(magic)),
        }
    }

    /// Serialize back into `(header_bytes, data_bytes)`.
    ///
    /// The same round-trip law as [`Binder::serialize`], applied to both halves
    /// jointly. The caller owns writing the two buffers out; if one write fails the
    /// other file must not be left half-updated, so failures are reported per half.
    #[instrument(skip(self), fields(entries = self.binder.len()), err)]
    pub fn serialize(&self) -> Result<(Vec<u8>, Vec<u8>)> {
        let entries = &self.binder.entries;
        match &self.binder.meta {
            BinderMeta::Bnd3(meta) => {
                let offsets = layout_entries(entries, meta.data_align, BDF3_HEADER_SIZE);
                let header = bnd3_shell(meta, entries, b"BHF3", &offsets)?;

                let mut data = Vec::new();
                data.write_all(b"BDF3")?;
                data.write_all(&self.data_meta.version)?;
                data.write_all(&[0; 4])?;
                write_data(&mut data, entries, &offsets);

                Ok((header, data))
            }
            BinderMeta::Bnd4(meta) => {
                let offsets = layout_entries(entries, meta.data_align, BDF4_HEADER_SIZE);
                let header = bnd4_shell(meta, entries, b"BHF4", &offsets)?;

                let endian = if self.data_meta.big_endian {
                    Endian::Big
                } else {
                    Endian::Little
                };
                let mut data = Vec::new();
                data.write_all(b"BDF4")?;
                data.push(u8::from(self.data_meta.unk04));
                data.push(u8::from(self.data_meta.unk05));
                data.extend_from_slice(&[0; 3]);
                data.push(u8::from(self.data_meta.big_endian));
                data.push(u8::from(self.data_meta.bit_big_endian));
                data.push(0);
                endian.write_u32(&mut data, 0)?;
                endian.write_u64(&mut data, BDF4_HEADER_SIZE)?;
                data.write_all(&self.data_meta.version)?;
                endian.write_u64(&mut data, 0)?;
                endian.write_u64(&mut data, 0)?;
                write_data(&mut data, entries, &offsets);

                Ok((header, data))
            }
        }
    }

    /// Split an in-memory binder, deriving the data half's header from the binder's.
    pub fn from_binder(binder: Binder) -> SplitBinder {
        let data_meta = match &binder.meta {
            BinderMeta::Bnd3(meta) => DataHalfMeta {
                version: meta.version,
                unk04: false,
                unk05: false,
                big_endian: meta.big_endian,
                bit_big_endian: meta.bit_big_endian,
            },
            BinderMeta::Bnd4(meta) => DataHalfMeta {
                version: meta.version,
                unk04: meta.unk04,
                unk05: meta.unk05,
                big_endian: meta.big_endian,
                bit_big_endian: meta.bit_big_endian,
            },
        };
        SplitBinder { binder, data_meta }
    }

    pub fn binder(&self) -> &Binder {
        &self.binder
    }

    pub fn binder_mut(&mut self) -> &mut Binder {
        &mut self.binder
    }

    pub fn into_binder(self) -> Binder {
        self.binder
    }

    pub fn data_meta(&self) -> &DataHalfMeta {
        &self.data_meta
    }
}

fn parse_bdf3(bytes: &[u8]) -> Result<DataHalfMeta> {
    let magic = leading_magic(bytes)?;
    if &magic != b"BDF3" {
        return Err(Error::InvalidMagic(magic));
    }
    if (bytes.len() as u64) < BDF3_HEADER_SIZE {
        return Err(Error::Truncated {
            expected: BDF3_HEADER_SIZE,
            actual: bytes.len() as u64,
        });
    }

    let mut version = [0u8; 8];
    version.copy_from_slice(&bytes[0x04..0x0C]);
    Ok(DataHalfMeta {
        version,
        unk04: false,
        unk05: false,
        big_endian: false,
        bit_big_endian: false,
    })
}

fn parse_bdf4(bytes: &[u8]) -> Result<DataHalfMeta> {
    let magic = leading_magic(bytes)?;
    if &magic != b"BDF4" {
        return Err(Error::InvalidMagic(magic));
    }
    if (bytes.len() as u64) < BDF4_HEADER_SIZE {
        return Err(Error::Truncated {
            expected: BDF4_HEADER_SIZE,
            actual: bytes.len() as u64,
        });
    }

    let unk04 = bytes[0x04] != 0;
    let unk05 = bytes[0x05] != 0;
    let big_endian = bytes[0x09] != 0;
    let bit_big_endian = bytes[0x0A] != 0;
    let endian = if big_endian { Endian::Big } else { Endian::Little };

    let mut header_size_bytes = &bytes[0x10..0x18];
    let header_size = endian.read_u64(&mut header_size_bytes)?;
    if header_size != BDF4_HEADER_SIZE {
        return Err(Error::UnsupportedVariant {
            field: "data header size",
            value: header_size,
        });
    }

    let mut version = [0u8; 8];
    version.copy_from_slice(&bytes[0x18..0x20]);
    Ok(DataHalfMeta {
        version,
        unk04,
        unk05,
        big_endian,
        bit_big_endian,
    })
}

/// Reject any pair of entries whose data regions intersect.
fn check_overlap(records: &[RawRecord]) -> Result<()> {
    let mut regions: Vec<(u64, u64, usize)> = records
        .iter()
        .enumerate()
        .filter(|(_, record)| record.compressed_size > 0)
        .map(|(index, record)| (record.data_offset, record.compressed_size, index))
        .collect();
    regions.sort_unstable();

    for pair in regions.windows(2) {
        let (first_offset, first_len, first) = pair[0];
        let (second_offset, _, second) = pair[1];
        if first_offset.saturating_add(first_len) > second_offset {
            return Err(Error::OverlappingEntries { first, second });
        }
    }

    Ok(())
}
