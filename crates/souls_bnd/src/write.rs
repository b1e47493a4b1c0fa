//! Serializing binders back to raw payloads
//!

use std::io::Write;

use tracing::instrument;

use crate::endian::Endian;
use crate::error::{Error, Result};
use crate::hash;
use crate::read::{bnd3_record_size, bnd4_record_size, BND3_HEADER_SIZE, BND4_HEADER_SIZE};
use crate::types::{Binder, BinderEntry, BinderMeta, Bnd3Meta, Bnd4Meta, NameEncoding};

impl Binder {
    /// Serialize the binder back into a raw payload.
    ///
    /// A pure function of the in-memory binder: for any binder produced by
    /// [`Binder::parse`] and not mutated since, the output is byte-identical to the
    /// parsed payload. Offsets, sizes and the path-hash table are recomputed; every
    /// other header field comes from the captured metadata.
    #[instrument(skip(self), fields(entries = self.entries.len()), err)]
    pub fn serialize(&self) -> Result<Vec<u8>> {
        match &self.meta {
            BinderMeta::Bnd3(meta) => {
                let shell_end = bnd3_shell(meta, &self.entries, b"BND3", &[])?.len() as u64;
                let offsets = layout_entries(&self.entries, meta.data_align, shell_end);
                let mut out = bnd3_shell(meta, &self.entries, b"BND3", &offsets)?;
                write_data(&mut out, &self.entries, &offsets);
                Ok(out)
            }
            BinderMeta::Bnd4(meta) => {
                let shell_end = bnd4_shell(meta, &self.entries, b"BND4", &[])?.len() as u64;
                let offsets = layout_entries(&self.entries, meta.data_align, shell_end);
                let mut out = bnd4_shell(meta, &self.entries, b"BND4", &offsets)?;
                write_data(&mut out, &self.entries, &offsets);
                Ok(out)
            }
        }
    }
}

/// Compute each entry's data offset: sequential, padded to the alignment boundary.
pub(crate) fn layout_entries(entries: &[BinderEntry], align: u64, start: u64) -> Vec<u64> {
    let mut cursor = start;
    entries
        .iter()
        .map(|entry| {
            let offset = align_up(cursor, align);
            cursor = offset + entry.bytes.len() as u64;
            offset
        })
        .collect()
}

/// Append entry payloads at their computed offsets, padding the gaps with the fill byte.
pub(crate) fn write_data(out: &mut Vec<u8>, entries: &[BinderEntry], offsets: &[u64]) {
    for (entry, &offset) in entries.iter().zip(offsets) {
        if (out.len() as u64) < offset {
            out.resize(offset as usize, 0);
        }
        out.extend_from_slice(&entry.bytes);
    }
}

/// Header, entry records and name region of an older-variant binder.
///
/// `offsets` holds the data offset recorded for each entry; the split coordinator
/// passes offsets into its separate data file. Called with an empty slice, the
/// offsets are written as zero, which the single-file writer uses for a sizing pass.
pub(crate) fn bnd3_shell(
    meta: &Bnd3Meta,
    entries: &[BinderEntry],
    magic: &[u8; 4],
    offsets: &[u64],
) -> Result<Vec<u8>> {
    let endian = if meta.big_endian || meta.format.forces_big_endian() {
        Endian::Big
    } else {
        Endian::Little
    };
    let format = meta.format;

    let names_base = BND3_HEADER_SIZE + count_u32(entries)? as u64 * bnd3_record_size(format);
    let names = build_names(entries, format.has_names(), NameEncoding::Bytes, names_base)?;
    let file_headers_end = names_base + names.blob.len() as u64;

    let mut out = Vec::new();
    out.write_all(magic)?;
    out.write_all(&meta.version)?;
    out.push(format.to_raw(meta.bit_big_endian));
    out.push(u8::from(meta.big_endian));
    out.push(u8::from(meta.bit_big_endian));
    out.push(0);
    endian.write_u32(&mut out, count_u32(entries)?)?;
    endian.write_u32(&mut out, into_u32(file_headers_end)?)?;
    endian.write_u32(&mut out, meta.unk18)?;
    endian.write_u32(&mut out, 0)?;

    for (index, entry) in entries.iter().enumerate() {
        out.push(entry.flags);
        out.extend_from_slice(&[0; 3]);
        endian.write_u32(&mut out, into_u32(entry.bytes.len() as u64)?)?;
        endian.write_u32(&mut out, into_u32(entry_offset(offsets, index))?)?;
        if format.has_ids() {
            endian.write_i32(&mut out, entry.id)?;
        }
        if format.has_names() {
            endian.write_u32(&mut out, into_u32(names.offsets[index])?)?;
        }
        if format.has_uncompressed_sizes() {
            let size = entry.uncompressed_size.unwrap_or(entry.bytes.len() as u64);
            endian.write_u32(&mut out, into_u32(size)?)?;
        }
    }

    out.extend_from_slice(&names.blob);
    Ok(out)
}

/// Header, entry records, name region and path-hash table of a newer-variant binder.
pub(crate) fn bnd4_shell(
    meta: &Bnd4Meta,
    entries: &[BinderEntry],
    magic: &[u8; 4],
    offsets: &[u64],
) -> Result<Vec<u8>> {
    let endian = if meta.big_endian {
        Endian::Big
    } else {
        Endian::Little
    };
    let format = meta.format;
    let encoding = if meta.unicode {
        NameEncoding::Wide(endian)
    } else {
        NameEncoding::Bytes
    };

    let record_size = bnd4_record_size(format);
    let names_base = BND4_HEADER_SIZE + count_u32(entries)? as u64 * record_size;
    let names = build_names(entries, format.has_names(), encoding, names_base)?;
    let names_end = names_base + names.blob.len() as u64;

    let (buckets_offset, headers_end) = if meta.extended == 4 {
        let buckets_offset = align_up(names_end, 8);
        let bucket_count = if meta.bucket_count == 0 {
            hash::default_bucket_count(entries.len())
        } else {
            meta.bucket_count
        };
        let end = buckets_offset + hash::table_size(entries.len() as u64, u64::from(bucket_count));
        (buckets_offset, end)
    } else {
        (0, names_end)
    };
    let file_headers_end = align_up(headers_end, meta.data_align);

    let mut out = Vec::new();
    out.write_all(magic)?;
    out.push(u8::from(meta.unk04));
    out.push(u8::from(meta.unk05));
    out.extend_from_slice(&[0; 3]);
    out.push(u8::from(meta.big_endian));
    out.push(u8::from(meta.bit_big_endian));
    out.push(0);
    endian.write_u32(&mut out, count_u32(entries)?)?;
    endian.write_u64(&mut out, BND4_HEADER_SIZE)?;
    out.write_all(&meta.version)?;
    endian.write_u64(&mut out, record_size)?;
    endian.write_u64(&mut out, file_headers_end)?;
    out.push(u8::from(meta.unicode));
    out.push(format.to_raw(meta.bit_big_endian));
    out.push(meta.extended);
    out.push(0);
    endian.write_u32(&mut out, 0)?;
    endian.write_u64(&mut out, buckets_offset)?;

    for (index, entry) in entries.iter().enumerate() {
        out.push(entry.flags);
        out.extend_from_slice(&[0; 3]);
        endian.write_i32(&mut out, -1)?;
        endian.write_u64(&mut out, entry.bytes.len() as u64)?;
        if format.has_uncompressed_sizes() {
            let size = entry.uncompressed_size.unwrap_or(entry.bytes.len() as u64);
            endian.write_u64(&mut out, size)?;
        }
        let offset = entry_offset(offsets, index);
        if format.has_long_offsets() {
            endian.write_u64(&mut out, offset)?;
        } else {
            endian.write_u32(&mut out, into_u32(offset)?)?;
        }
        if format.has_ids() {
            endian.write_i32(&mut out, entry.id)?;
        }
        if format.has_names() {
            endian.write_u32(&mut out, into_u32(names.offsets[index])?)?;
        }
    }

    out.extend_from_slice(&names.blob);

    if meta.extended == 4 {
        if (out.len() as u64) < buckets_offset {
            out.resize(buckets_offset as usize, 0);
        }
        let bucket_count = if meta.bucket_count == 0 {
            hash::default_bucket_count(entries.len())
        } else {
            meta.bucket_count
        };
        hash::write_table(&mut out, endian, entries, bucket_count, buckets_offset)?;
    }

    Ok(out)
}

struct NameBlock {
    blob: Vec<u8>,
    offsets: Vec<u64>,
}

fn build_names(
    entries: &[BinderEntry],
    has_names: bool,
    encoding: NameEncoding,
    base: u64,
) -> Result<NameBlock> {
    let mut blob = Vec::new();
    let mut offsets = Vec::with_capacity(entries.len());

    for entry in entries {
        if !has_names {
            offsets.push(0);
            continue;
        }

        offsets.push(base + blob.len() as u64);
        match &entry.name_raw {
            Some(raw) => blob.extend_from_slice(raw),
            None => blob.extend_from_slice(&encoding.encode(&entry.name)),
        }
        match encoding {
            NameEncoding::Bytes => blob.push(0),
            NameEncoding::Wide(_) => blob.extend_from_slice(&[0, 0]),
        }
    }

    Ok(NameBlock { blob, offsets })
}

fn entry_offset(offsets: &[u64], index: usize) -> u64 {
    offsets.get(index).copied().unwrap_or(0)
}

pub(crate) fn align_up(value: u64, align: u64) -> u64 {
    if align == 0 {
        value
    } else {
        value.div_ceil(align) * align
    }
}

fn count_u32(entries: &[BinderEntry]) -> Result<u32> {
    u32::try_from(entries.len()).map_err(|_| Error::TooLarge(entries.len() as u64))
}

fn into_u32(value: u64) -> Result<u32> {
    u32::try_from(value).map_err(|_| Error::TooLarge(value))
}

#[cfg(test)]
mod test {
    use pretty_assertions::{assert_eq, assert_str_eq};
    use tracing_test::traced_test;

    use crate::error::Result;
    use crate::types::{Binder, BinderEntry, BinderMeta, Bnd3Meta, Bnd4Meta};

    #[traced_test]
    #[test]
    fn serialize_reproduces_parsed_bnd3() -> Result<()> {
        let bytes = crate::read::test::bnd3_fixture();
        let binder = Binder::parse(&bytes)?;
        let actual = binder.serialize()?;

        assert_str_eq!(format!("{:02X?}", actual), format!("{:02X?}", bytes));

        Ok(())
    }

    #[traced_test]
    #[test]
    fn serialize_empty_bnd3() -> Result<()> {
        #[rustfmt::skip]
        let expected = vec![
            0x42, 0x4E, 0x44, 0x33,
            0x30, 0x37, 0x44, 0x37, 0x52, 0x36, 0x00, 0x00,
            0x26, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
            0x20, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
        ];

        let binder = Binder::new(BinderMeta::Bnd3(Bnd3Meta::default()));
        let actual = binder.serialize()?;
        assert_str_eq!(format!("{:02X?}", actual), format!("{:02X?}", expected));

        Ok(())
    }

    #[traced_test]
    #[test]
    fn bnd4_roundtrips_fieldwise() -> Result<()> {
        let mut binder = Binder::new(BinderMeta::Bnd4(Bnd4Meta::default()));
        binder.push(BinderEntry::new(100, "menu\\icon.tpf", b"icon bytes".to_vec()));
        binder.push(BinderEntry::new(200, "menu\\font.ccm", b"font bytes".to_vec()));
        binder.push(BinderEntry::new(300, "menu\\empty.flver", Vec::new()));

        let payload = binder.serialize()?;
        let reparsed = Binder::parse(&payload)?;

        assert_eq!(reparsed.len(), 3);
        assert_eq!(reparsed.entries()[0].name, "menu\\icon.tpf");
        assert_eq!(reparsed.entries()[0].bytes, b"icon bytes");
        assert_eq!(reparsed.entries()[2].bytes, b"");
        assert_eq!(reparsed.meta(), binder.meta());

        // A second pass over the reparsed binder must reproduce the payload exactly.
        assert_str_eq!(
            format!("{:02X?}", reparsed.serialize()?),
            format!("{:02X?}", payload)
        );

        Ok(())
    }

    #[traced_test]
    #[test]
    fn bnd4_big_endian_roundtrips() -> Result<()> {
        let meta = Bnd4Meta {
            big_endian: true,
            ..Bnd4Meta::default()
        };
        let mut binder = Binder::new(BinderMeta::Bnd4(meta));
        binder.push(BinderEntry::new(1, "chr/c0000.anibnd", b"anim".to_vec()));

        let payload = binder.serialize()?;
        let reparsed = Binder::parse(&payload)?;

        assert_eq!(reparsed.entries()[0].name, "chr/c0000.anibnd");
        assert_eq!(reparsed.meta(), binder.meta());
        assert_str_eq!(
            format!("{:02X?}", reparsed.serialize()?),
            format!("{:02X?}", payload)
        );

        Ok(())
    }
}
