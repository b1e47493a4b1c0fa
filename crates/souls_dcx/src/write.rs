//! Frame encoding
//!

use std::io::{Cursor, Write};

use binrw::BinWrite;
use flate2::{write::ZlibEncoder, Compression};
use tracing::instrument;

use crate::error::{Error, Result};
use crate::params::{DcxAlgorithm, DcxParams};
use crate::types::{BlockRecord, BlockTableHeader, DcxExtra, DcxHeader, DcxScheme, DcxSizes};

/// Re-apply the compression frame described by `params` to `payload`.
///
/// The two-sided inverse of [`decode`](crate::read::decode): every parameter set decode
/// can produce rebuilds the frame it came from byte-identically. The scheme is taken
/// from `params.algorithm` alone; nothing about the payload is sniffed.
#[instrument(skip(payload), fields(len = payload.len(), algorithm = ?params.algorithm), err)]
pub fn encode(payload: &[u8], params: &DcxParams) -> Result<Vec<u8>> {
    match params.algorithm {
        DcxAlgorithm::None => Ok(payload.to_vec()),
        DcxAlgorithm::Stored => write_frame(params, payload, payload.to_vec(), None),
        DcxAlgorithm::Deflate => {
            let data = deflate(payload, params.level)?;
            write_frame(params, payload, data, None)
        }
        DcxAlgorithm::Block { max_block_size } => encode_blocks(payload, params, max_block_size),
    }
}

fn encode_blocks(payload: &[u8], params: &DcxParams, max_block_size: u32) -> Result<Vec<u8>> {
    if max_block_size == 0 {
        return Err(Error::UnsupportedLayout {
            field: "block size",
            value: 0,
        });
    }

    let mut records = Vec::new();
    let mut data = Vec::new();
    let mut last_block_size = 0u32;
    for chunk in payload.chunks(max_block_size as usize) {
        let block = deflate(chunk, params.level)?;
        records.push(BlockRecord {
            unk00: 0,
            offset: data.len() as u32,
            length: block.len() as u32,
            compressed: 1,
        });
        data.extend_from_slice(&block);
        last_block_size = chunk.len() as u32;
    }

    let block_count = records.len() as u32;
    let table = BlockTableHeader {
        version: BlockTableHeader::VERSION,
        header_size: BlockTableHeader::HEADER_SIZE,
        record_size: BlockTableHeader::RECORD_SIZE,
        normal_block_size: max_block_size,
        last_block_size,
        table_size: BlockTableHeader::HEADER_SIZE + block_count * BlockTableHeader::RECORD_SIZE,
        block_count,
        unk20: 0x100000,
    };

    write_frame(params, payload, data, Some((table, records)))
}

fn write_frame(
    params: &DcxParams,
    payload: &[u8],
    data: Vec<u8>,
    table: Option<(BlockTableHeader, Vec<BlockRecord>)>,
) -> Result<Vec<u8>> {
    if payload.len() > u32::MAX as usize || data.len() > u32::MAX as usize {
        return Err(Error::TooLarge(payload.len() as u64));
    }

    let table_size = table.as_ref().map_or(0, |(header, _)| header.table_size);
    let mut out = Cursor::new(Vec::new());

    DcxHeader {
        version_word: params.version_word,
        sizes_offset: 0x18,
        params_offset: 0x24,
        unk10: params.unk10,
        unk14: params.unk14,
    }
    .write(&mut out)?;

    DcxSizes {
        uncompressed_size: payload.len() as u32,
        compressed_size: data.len() as u32,
    }
    .write(&mut out)?;

    DcxScheme {
        tag: params.tag(),
        params_size: 0x20,
        level: params.level,
        window: params.window,
        reserved: params.reserved,
    }
    .write(&mut out)?;

    DcxExtra {
        size: 8 + table_size,
    }
    .write(&mut out)?;

    if let Some((header, records)) = table {
        header.write(&mut out)?;
        for record in records {
            record.write(&mut out)?;
        }
    }

    out.write_all(&data)?;

    Ok(out.into_inner())
}

fn deflate(bytes: &[u8], level: u8) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::new(u32::from(level.min(9))));
    encoder.write_all(bytes)?;
    Ok(encoder.finish()?)
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use crate::error::Result;
    use crate::params::DcxParams;
    use crate::read::decode;
    use crate::write::encode;

    #[test]
    fn encode_none_is_identity() -> Result<()> {
        let frame = encode(b"Hello World", &DcxParams::none())?;
        assert_eq!(frame, b"Hello World");

        Ok(())
    }

    #[test]
    fn roundtrip_deflate() -> Result<()> {
        let params = DcxParams::deflate();
        let frame = encode(b"Hello World", &params)?;
        assert_eq!(decode(&frame)?, (b"Hello World".to_vec(), params));

        Ok(())
    }

    #[test]
    fn roundtrip_deflate_empty() -> Result<()> {
        let params = DcxParams::deflate();
        let frame = encode(b"", &params)?;
        assert_eq!(decode(&frame)?, (Vec::new(), params));

        Ok(())
    }

    #[test]
    fn roundtrip_stored() -> Result<()> {
        let mut params = DcxParams::none();
        params.algorithm = crate::DcxAlgorithm::Stored;

        let frame = encode(b"Hello World", &params)?;
        assert!(crate::read::is_wrapped(&frame));
        assert_eq!(decode(&frame)?, (b"Hello World".to_vec(), params));

        Ok(())
    }

    #[test]
    fn roundtrip_block_multiple_blocks() -> Result<()> {
        let payload = (0..200_000u32).flat_map(u32::to_le_bytes).collect::<Vec<_>>();

        for params in [DcxParams::block(), DcxParams::block_max()] {
            let frame = encode(&payload, &params)?;
            assert_eq!(decode(&frame)?, (payload.clone(), params));
        }

        Ok(())
    }

    #[test]
    fn reencode_is_byte_identical() -> Result<()> {
        for params in [
            DcxParams::deflate(),
            DcxParams::block(),
            DcxParams::block_max(),
        ] {
            let original = encode(b"the quick brown fox jumps over the lazy dog", &params)?;
            let (payload, captured) = decode(&original)?;
            assert_eq!(encode(&payload, &captured)?, original);
        }

        Ok(())
    }
}
