//! The path-hash table appended to newer binder headers.
//!
//! Binders with `extended == 4` carry a lookup table mapping a hash of each entry's
//! path to its index, bucketed by `hash % bucket_count`. The table is fully derivable
//! from the entry names, so it is recomputed on write; the bucket count is the one
//! degree of freedom and is captured in [`Bnd4Meta`](crate::types::Bnd4Meta).

use std::io::Write;

use crate::endian::Endian;
use crate::error::Result;
use crate::types::BinderEntry;

/// Marker word carried in the table header.
const FIELD_SIZES: u32 = 0x00080810;

/// Hash of an entry path.
///
/// Case- and separator-insensitive: the engine looks entries up by lowercased,
/// forward-slash, rooted paths.
pub(crate) fn hash_path(name: &str) -> u32 {
    let normalized = name.replace('\\', "/").to_ascii_lowercase();
    let mut hash = 0u32;
    if !normalized.starts_with('/') {
        hash = u32::from(b'/');
    }
    for byte in normalized.bytes() {
        hash = hash.wrapping_mul(37).wrapping_add(u32::from(byte));
    }
    hash
}

/// Bucket count used when building a binder that never had a table.
pub(crate) fn default_bucket_count(entries: usize) -> u32 {
    (entries / 7 + 1) as u32
}

/// Serialized size of a table with the given dimensions.
pub(crate) fn table_size(entry_count: u64, bucket_count: u64) -> u64 {
    0x10 + bucket_count * 8 + entry_count * 8
}

/// Append the table to `out`, assuming it starts at `buckets_offset`.
pub(crate) fn write_table<W: Write>(
    out: &mut W,
    endian: Endian,
    entries: &[BinderEntry],
    bucket_count: u32,
    buckets_offset: u64,
) -> Result<()> {
    let mut buckets: Vec<Vec<(u32, u32)>> = vec![Vec::new(); bucket_count as usize];
    for (index, entry) in entries.iter().enumerate() {
        let hash = hash_path(&entry.name);
        buckets[(hash % bucket_count) as usize].push((hash, index as u32));
    }
    for bucket in &mut buckets {
        bucket.sort_unstable();
    }

    let path_hashes_offset = buckets_offset + 0x10 + u64::from(bucket_count) * 8;
    endian.write_u64(out, path_hashes_offset)?;
    endian.write_u32(out, bucket_count)?;
    endian.write_u32(out, FIELD_SIZES)?;

    let mut start = 0u32;
    for bucket in &buckets {
        endian.write_u32(out, start)?;
        endian.write_u32(out, bucket.len() as u32)?;
        start += bucket.len() as u32;
    }

    for bucket in &buckets {
        for (hash, index) in bucket {
            endian.write_u32(out, *hash)?;
            endian.write_u32(out, *index)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn hash_ignores_case_and_separator() {
        assert_eq!(hash_path("parts\\WP_A_0210.partsbnd"), hash_path("PARTS/wp_a_0210.PARTSBND"));
        assert_eq!(hash_path("a.txt"), hash_path("/a.txt"));
    }

    #[test]
    fn hash_distinguishes_paths() {
        assert_ne!(hash_path("a.txt"), hash_path("b.txt"));
    }

    #[test]
    fn table_size_matches_layout() {
        // Header, four bucket records, nine hash records.
        assert_eq!(table_size(9, 4), 0x10 + 0x20 + 0x48);
    }
}
