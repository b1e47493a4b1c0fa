//! Frame detection and decoding
//!

use std::io::{Cursor, Read};

use binrw::BinRead;
use flate2::read::ZlibDecoder;
use tracing::instrument;

use crate::error::{Error, Result};
use crate::params::{DcxAlgorithm, DcxParams};
use crate::types::{
    BlockRecord, BlockTableHeader, DcxExtra, DcxHeader, DcxScheme, DcxSizes, TAG_BLOCK,
    TAG_DEFLATE, TAG_NONE, TAG_UNSUPPORTED,
};

/// Returns whether `bytes` carry a DCX frame.
///
/// A cheap magic sniff for callers that branch before [`decode`]; the encoder never
/// consults it.
pub fn is_wrapped(bytes: &[u8]) -> bool {
    bytes.len() >= 4 && bytes[..4] == *b"DCX\0"
}

/// Strip the compression frame from `bytes`.
///
/// Returns the raw payload together with the parameter set needed to rebuild the frame
/// byte-identically. Input without the `DCX\0` magic is returned verbatim under the
/// [`DcxAlgorithm::None`] scheme; at this layer an unwrapped archive and arbitrary bytes
/// are indistinguishable, and the archive codec above makes that call.
#[instrument(skip(bytes), fields(len = bytes.len()), err)]
pub fn decode(bytes: &[u8]) -> Result<(Vec<u8>, DcxParams)> {
    if !is_wrapped(bytes) {
        return Ok((bytes.to_vec(), DcxParams::none()));
    }

    let mut reader = Cursor::new(bytes);
    let header = DcxHeader::read(&mut reader)?;
    if header.sizes_offset != 0x18 {
        return Err(Error::UnsupportedLayout {
            field: "sizes offset",
            value: header.sizes_offset,
        });
    }
    if header.params_offset != 0x24 {
        return Err(Error::UnsupportedLayout {
            field: "params offset",
            value: header.params_offset,
        });
    }

    let sizes = DcxSizes::read(&mut reader)?;
    let scheme = DcxScheme::read(&mut reader)?;
    let extra = DcxExtra::read(&mut reader)?;
    if extra.size < 8 {
        return Err(Error::UnsupportedLayout {
            field: "data header size",
            value: extra.size,
        });
    }

    let mut params = DcxParams {
        algorithm: DcxAlgorithm::None,
        version_word: header.version_word,
        unk10: header.unk10,
        unk14: header.unk14,
        level: scheme.level,
        window: scheme.window,
        reserved: scheme.reserved,
    };

    let data_start = 0x44 + u64::from(extra.size);
    let data_end = data_start + u64::from(sizes.compressed_size);
    if data_end > bytes.len() as u64 {
        return Err(Error::Truncated {
            expected: data_end,
            actual: bytes.len() as u64,
        });
    }

    let payload = match scheme.tag {
        TAG_DEFLATE => {
            params.algorithm = DcxAlgorithm::Deflate;
            inflate(&bytes[data_start as usize..data_end as usize])?
        }
        TAG_BLOCK => {
            let table = BlockTableHeader::read(&mut reader)?;
            params.algorithm = DcxAlgorithm::Block {
                max_block_size: table.normal_block_size,
            };
            decode_blocks(bytes, &mut reader, &table, extra.size, data_start)?
        }
        TAG_NONE => {
            params.algorithm = DcxAlgorithm::Stored;
            bytes[data_start as usize..data_end as usize].to_vec()
        }
        tag if TAG_UNSUPPORTED.contains(&tag) => return Err(Error::UnsupportedScheme(tag)),
        tag => return Err(Error::UnknownScheme(tag)),
    };

    if payload.len() as u64 != u64::from(sizes.uncompressed_size) {
        return Err(Error::SizeMismatch {
            declared: u64::from(sizes.uncompressed_size),
            actual: payload.len() as u64,
        });
    }

    Ok((payload, params))
}

fn decode_blocks(
    bytes: &[u8],
    reader: &mut Cursor<&[u8]>,
    table: &BlockTableHeader,
    extra_size: u32,
    data_start: u64,
) -> Result<Vec<u8>> {
    if table.version != BlockTableHeader::VERSION
        || table.header_size != BlockTableHeader::HEADER_SIZE
        || table.record_size != BlockTableHeader::RECORD_SIZE
    {
        return Err(Error::UnsupportedLayout {
            field: "block table version",
            value: table.version,
        });
    }
    let table_size = BlockTableHeader::HEADER_SIZE + table.block_count * BlockTableHeader::RECORD_SIZE;
    if table.table_size != table_size || extra_size != 8 + table_size {
        return Err(Error::UnsupportedLayout {
            field: "block table size",
            value: table.table_size,
        });
    }

    let records = (0..table.block_count)
        .map(|_| BlockRecord::read(reader).map_err(Error::from))
        .collect::<Result<Vec<_>>>()?;

    let mut payload = Vec::new();
    for (index, record) in records.iter().enumerate() {
        let start = data_start + u64::from(record.offset);
        let end = start + u64::from(record.length);
        if end > bytes.len() as u64 {
            return Err(Error::Truncated {
                expected: end,
                actual: bytes.len() as u64,
            });
        }

        let block = &bytes[start as usize..end as usize];
        let expected = if index as u32 + 1 == table.block_count {
            table.last_block_size
        } else {
            table.normal_block_size
        };

        let produced = if record.compressed != 0 {
            let inflated = inflate(block)?;
            let len = inflated.len() as u64;
            payload.extend_from_slice(&inflated);
            len
        } else {
            payload.extend_from_slice(block);
            block.len() as u64
        };

        if produced != u64::from(expected) {
            return Err(Error::SizeMismatch {
                declared: u64::from(expected),
                actual: produced,
            });
        }
    }

    Ok(payload)
}

fn inflate(compressed: &[u8]) -> Result<Vec<u8>> {
    let mut payload = Vec::new();
    ZlibDecoder::new(compressed)
        .read_to_end(&mut payload)
        .map_err(|e| Error::DecompressionFailed(e.to_string()))?;
    Ok(payload)
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use crate::error::Error;
    use crate::params::{DcxAlgorithm, DcxParams};
    use crate::read::{decode, is_wrapped};

    #[rustfmt::skip]
    fn deflate_frame() -> Vec<u8> {
        vec![
            // DCX
            0x44, 0x43, 0x58, 0x00,
            0x00, 0x01, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x18,
            0x00, 0x00, 0x00, 0x24,
            0x00, 0x00, 0x00, 0x24,
            0x00, 0x00, 0x00, 0x2C,
            // DCS
            0x44, 0x43, 0x53, 0x00,
            0x00, 0x00, 0x00, 0x0B,
            0x00, 0x00, 0x00, 0x13,
            // DCP
            0x44, 0x43, 0x50, 0x00,
            0x44, 0x46, 0x4C, 0x54,
            0x00, 0x00, 0x00, 0x20,
            0x09, 0x00, 0x00, 0x00,
            0x00, 0x01, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
            // DCA
            0x44, 0x43, 0x41, 0x00,
            0x00, 0x00, 0x00, 0x08,
            // Data
            0x78, 0x9C, 0xF3, 0x48, 0xCD, 0xC9, 0xC9, 0x57, 0x08, 0xCF, 0x2F, 0xCA, 0x49, 0x01,
            0x00, 0x18, 0x0B, 0x04, 0x1D,
        ]
    }

    #[test]
    fn sniffs_magic() {
        assert!(is_wrapped(&deflate_frame()));
        assert!(!is_wrapped(b"BND4"));
        assert!(!is_wrapped(b"DC"));
    }

    #[test]
    fn decode_passes_bare_payload_through() {
        let (payload, params) = decode(b"BND4 payload").unwrap();
        assert_eq!(payload, b"BND4 payload");
        assert_eq!(params, DcxParams::none());
    }

    #[test]
    fn decode_deflate_frame() {
        let (payload, params) = decode(&deflate_frame()).unwrap();
        assert_eq!(payload, b"Hello World");
        assert_eq!(params.algorithm, DcxAlgorithm::Deflate);
        assert_eq!(params.version_word, 0x10000);
        assert_eq!(params.level, 9);
        assert_eq!(params.window, 0x10000);
    }

    #[test]
    fn decode_truncated_frame() {
        let mut frame = deflate_frame();
        frame.truncate(frame.len() - 4);

        let err = decode(&frame).unwrap_err();
        assert!(matches!(err, Error::Truncated { .. }), "actual error: {err:?}");
    }

    #[test]
    fn decode_unknown_scheme() {
        let mut frame = deflate_frame();
        frame[0x28..0x2C].copy_from_slice(b"ABCD");

        let err = decode(&frame).unwrap_err();
        assert!(matches!(err, Error::UnknownScheme(_)), "actual error: {err:?}");
    }

    #[test]
    fn decode_unsupported_scheme() {
        let mut frame = deflate_frame();
        frame[0x28..0x2C].copy_from_slice(b"KRAK");

        let err = decode(&frame).unwrap_err();
        assert!(
            matches!(err, Error::UnsupportedScheme(tag) if &tag == b"KRAK"),
            "actual error: {err:?}"
        );
    }

    #[test]
    fn decode_size_mismatch() {
        let mut frame = deflate_frame();
        // Declare one more byte than the stream inflates to.
        frame[0x1F] = 0x0C;

        let err = decode(&frame).unwrap_err();
        assert!(matches!(err, Error::SizeMismatch { .. }), "actual error: {err:?}");
    }

    #[test]
    fn decode_corrupt_stream() {
        let mut frame = deflate_frame();
        let data = frame.len() - 8;
        frame[data] ^= 0xFF;

        let err = decode(&frame).unwrap_err();
        assert!(
            matches!(err, Error::DecompressionFailed(_)),
            "actual error: {err:?}"
        );
    }
}
