//! Parsing raw payloads into binders
//!

use std::io::Cursor;

use byteorder::ReadBytesExt;
use tracing::instrument;

use crate::endian::Endian;
use crate::error::{Error, Result};
use crate::types::{
    Binder, BinderEntry, BinderFormat, BinderMeta, Bnd3Meta, Bnd4Meta, NameEncoding,
};

pub(crate) const BND3_HEADER_SIZE: u64 = 0x20;
pub(crate) const BND4_HEADER_SIZE: u64 = 0x40;

/// One entry's header record with the payload not yet attached.
///
/// Shared between the single-file reader, which slices payload bytes out of the same
/// buffer, and the split coordinator, which resolves offsets into a separate data file.
#[derive(Debug, Clone)]
pub(crate) struct RawRecord {
    pub flags: u8,
    pub compressed_size: u64,
    pub uncompressed_size: Option<u64>,
    pub data_offset: u64,
    pub id: i32,
    pub name: String,
    pub name_raw: Vec<u8>,
}

impl Binder {
    /// Parse a raw (already decompressed) payload into a binder.
    ///
    /// The variant is decided here, once, from the magic; downstream code never
    /// re-inspects it.
    #[instrument(skip(payload), fields(len = payload.len()), err)]
    pub fn parse(payload: &[u8]) -> Result<Binder> {
        let magic = leading_magic(payload)?;
        match &magic {
            b"BND3" => {
                let (meta, records) = read_bnd3(payload, b"BND3")?;
                let entries = bind_entries(&records, payload)?;
                Ok(Binder {
                    meta: BinderMeta::Bnd3(meta),
                    entries,
                })
            }
            b"BND4" => {
                let (meta, records) = read_bnd4(payload, b"BND4")?;
                let entries = bind_entries(&records, payload)?;
                Ok(Binder {
                    meta: BinderMeta::Bnd4(meta),
                    entries,
                })
            }
            _ => Err(Error::InvalidMagic(magic)),
        }
    }
}

pub(crate) fn leading_magic(bytes: &[u8]) -> Result<[u8; 4]> {
    let mut magic = [0u8; 4];
    match bytes.get(..4) {
        Some(head) => {
            magic.copy_from_slice(head);
            Ok(magic)
        }
        None => Err(Error::Truncated {
            expected: 4,
            actual: bytes.len() as u64,
        }),
    }
}

/// Attach payload bytes to parsed records, bounds-checking every region.
pub(crate) fn bind_entries(records: &[RawRecord], source: &[u8]) -> Result<Vec<BinderEntry>> {
    records
        .iter()
        .map(|record| {
            let end = record
                .data_offset
                .checked_add(record.compressed_size)
                .unwrap_or(u64::MAX);
            if end > source.len() as u64 {
                return Err(Error::Truncated {
                    expected: end,
                    actual: source.len() as u64,
                });
            }

            Ok(BinderEntry {
                id: record.id,
                name: record.name.clone(),
                name_raw: Some(record.name_raw.clone()),
                flags: record.flags,
                bytes: source[record.data_offset as usize..end as usize].to_vec(),
                uncompressed_size: record.uncompressed_size,
            })
        })
        .collect()
}

pub(crate) fn read_bnd3(bytes: &[u8], magic: &[u8; 4]) -> Result<(Bnd3Meta, Vec<RawRecord>)> {
    let found = leading_magic(bytes)?;
    if found != *magic {
        return Err(Error::InvalidMagic(found));
    }
    if (bytes.len() as u64) < BND3_HEADER_SIZE {
        return Err(Error::Truncated {
            expected: BND3_HEADER_SIZE,
            actual: bytes.len() as u64,
        });
    }

    let mut version = [0u8; 8];
    version.copy_from_slice(&bytes[0x04..0x0C]);

    let big_endian = bytes[0x0D] != 0;
    let bit_big_endian = bytes[0x0E] != 0;
    let format = BinderFormat::from_raw(bytes[0x0C], bit_big_endian);

    let meta = Bnd3Meta {
        version,
        format,
        big_endian,
        bit_big_endian,
        unk18: 0,
        data_align: 0x10,
    };
    let endian = if big_endian || format.forces_big_endian() {
        Endian::Big
    } else {
        Endian::Little
    };

    let mut reader = Cursor::new(bytes);
    reader.set_position(0x10);
    let file_count = endian.read_u32(&mut reader)?;
    let _file_headers_end = endian.read_u32(&mut reader)?;
    let unk18 = endian.read_u32(&mut reader)?;
    let _reserved = endian.read_u32(&mut reader)?;
    let meta = Bnd3Meta { unk18, ..meta };

    let record_size = bnd3_record_size(format);
    ensure_records_fit(bytes.len() as u64, BND3_HEADER_SIZE, file_count, record_size)?;

    let records = (0..file_count)
        .map(|_| {
            let flags = reader.read_u8()?;
            reader.set_position(reader.position() + 3);
            let compressed_size = u64::from(endian.read_u32(&mut reader)?);
            let data_offset = u64::from(endian.read_u32(&mut reader)?);
            let id = if format.has_ids() {
                endian.read_i32(&mut reader)?
            } else {
                -1
            };
            let (name, name_raw) = if format.has_names() {
                let offset = u64::from(endian.read_u32(&mut reader)?);
                read_name(bytes, offset, NameEncoding::Bytes)?
            } else {
                (String::new(), Vec::new())
            };
            let uncompressed_size = if format.has_uncompressed_sizes() {
                Some(u64::from(endian.read_u32(&mut reader)?))
            } else {
                None
            };

            Ok(RawRecord {
                flags,
                compressed_size,
                uncompressed_size,
                data_offset,
                id,
                name,
                name_raw,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok((meta, records))
}

pub(crate) fn read_bnd4(bytes: &[u8], magic: &[u8; 4]) -> Result<(Bnd4Meta, Vec<RawRecord>)> {
    let found = leading_magic(bytes)?;
    if found != *magic {
        return Err(Error::InvalidMagic(found));
    }
    if (bytes.len() as u64) < BND4_HEADER_SIZE {
        return Err(Error::Truncated {
            expected: BND4_HEADER_SIZE,
            actual: bytes.len() as u64,
        });
    }

    let unk04 = bytes[0x04] != 0;
    let unk05 = bytes[0x05] != 0;
    let big_endian = bytes[0x09] != 0;
    let bit_big_endian = bytes[0x0A] != 0;
    let endian = if big_endian { Endian::Big } else { Endian::Little };

    let mut reader = Cursor::new(bytes);
    reader.set_position(0x0C);
    let file_count = endian.read_u32(&mut reader)?;
    let header_size = endian.read_u64(&mut reader)?;
    if header_size != BND4_HEADER_SIZE {
        return Err(Error::UnsupportedVariant {
            field: "header size",
            value: header_size,
        });
    }

    let mut version = [0u8; 8];
    version.copy_from_slice(&bytes[0x18..0x20]);
    reader.set_position(0x20);
    let file_header_size = endian.read_u64(&mut reader)?;
    let _file_headers_end = endian.read_u64(&mut reader)?;

    let unicode = bytes[0x30] != 0;
    let format = BinderFormat::from_raw(bytes[0x31], bit_big_endian);
    let extended = bytes[0x32];
    if !matches!(extended, 0 | 1 | 4 | 0x80) {
        return Err(Error::UnsupportedVariant {
            field: "extended header",
            value: u64::from(extended),
        });
    }
    reader.set_position(0x38);
    let buckets_offset = endian.read_u64(&mut reader)?;

    let record_size = bnd4_record_size(format);
    if file_header_size != record_size {
        return Err(Error::UnsupportedVariant {
            field: "entry record size",
            value: file_header_size,
        });
    }
    ensure_records_fit(bytes.len() as u64, BND4_HEADER_SIZE, file_count, record_size)?;

    let bucket_count = if extended == 4 {
        read_bucket_count(bytes, buckets_offset, endian)?
    } else {
        0
    };

    let meta = Bnd4Meta {
        version,
        unk04,
        unk05,
        big_endian,
        bit_big_endian,
        unicode,
        format,
        extended,
        bucket_count,
        data_align: 0x10,
    };
    let encoding = if unicode {
        NameEncoding::Wide(endian)
    } else {
        NameEncoding::Bytes
    };

    let records = (0..file_count)
        .map(|_| {
            let flags = reader.read_u8()?;
            reader.set_position(reader.position() + 3);
            let _minus_one = endian.read_i32(&mut reader)?;
            let compressed_size = endian.read_u64(&mut reader)?;
            let uncompressed_size = if format.has_uncompressed_sizes() {
                Some(endian.read_u64(&mut reader)?)
            } else {
                None
            };
            let data_offset = if format.has_long_offsets() {
                endian.read_u64(&mut reader)?
            } else {
                u64::from(endian.read_u32(&mut reader)?)
            };
            let id = if format.has_ids() {
                endian.read_i32(&mut reader)?
            } else {
                -1
            };
            let (name, name_raw) = if format.has_names() {
                let offset = u64::from(endian.read_u32(&mut reader)?);
                read_name(bytes, offset, encoding)?
            } else {
                (String::new(), Vec::new())
            };

            Ok(RawRecord {
                flags,
                compressed_size,
                uncompressed_size,
                data_offset,
                id,
                name,
                name_raw,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok((meta, records))
}

pub(crate) fn bnd3_record_size(format: BinderFormat) -> u64 {
    let mut size = 0x0C;
    if format.has_ids() {
        size += 4;
    }
    if format.has_names() {
        size += 4;
    }
    if format.has_uncompressed_sizes() {
        size += 4;
    }
    size
}

pub(crate) fn bnd4_record_size(format: BinderFormat) -> u64 {
    let mut size = 0x10;
    if format.has_uncompressed_sizes() {
        size += 8;
    }
    size += if format.has_long_offsets() { 8 } else { 4 };
    if format.has_ids() {
        size += 4;
    }
    if format.has_names() {
        size += 4;
    }
    size
}

fn ensure_records_fit(len: u64, header_size: u64, count: u32, record_size: u64) -> Result<()> {
    let needed = header_size + u64::from(count) * record_size;
    if needed > len {
        return Err(Error::Truncated {
            expected: needed,
            actual: len,
        });
    }
    Ok(())
}

fn read_bucket_count(bytes: &[u8], buckets_offset: u64, endian: Endian) -> Result<u32> {
    let end = buckets_offset + 0x10;
    if end > bytes.len() as u64 {
        return Err(Error::Truncated {
            expected: end,
            actual: bytes.len() as u64,
        });
    }

    let mut reader = Cursor::new(bytes);
    reader.set_position(buckets_offset);
    let _path_hashes_offset = endian.read_u64(&mut reader)?;
    Ok(endian.read_u32(&mut reader)?)
}

fn read_name(bytes: &[u8], offset: u64, encoding: NameEncoding) -> Result<(String, Vec<u8>)> {
    if offset >= bytes.len() as u64 {
        return Err(Error::Truncated {
            expected: offset + 1,
            actual: bytes.len() as u64,
        });
    }

    let tail = &bytes[offset as usize..];
    let raw = match encoding {
        NameEncoding::Bytes => {
            let end = tail
                .iter()
                .position(|&b| b == 0)
                .ok_or(Error::UnterminatedName { offset })?;
            tail[..end].to_vec()
        }
        NameEncoding::Wide(_) => {
            let end = tail
                .chunks_exact(2)
                .position(|pair| pair == [0, 0])
                .ok_or(Error::UnterminatedName { offset })?;
            tail[..end * 2].to_vec()
        }
    };

    Ok((encoding.decode(&raw), raw))
}
