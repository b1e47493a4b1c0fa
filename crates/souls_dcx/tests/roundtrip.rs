use pretty_assertions::assert_eq;
use souls_dcx::{decode, encode, error::Result, DcxParams};
use tracing_test::traced_test;

fn payloads() -> Vec<Vec<u8>> {
    vec![
        Vec::new(),
        b"Hello World".to_vec(),
        vec![0u8; 0x10000],
        (0..0x50000u32).map(|i| (i % 251) as u8).collect(),
    ]
}

#[traced_test]
#[test]
fn decode_inverts_encode_for_every_preset() -> Result<()> {
    for payload in payloads() {
        for params in [
            DcxParams::none(),
            DcxParams::deflate(),
            DcxParams::block(),
            DcxParams::block_max(),
        ] {
            let frame = encode(&payload, &params)?;
            let (decoded, captured) = decode(&frame)?;
            assert_eq!(decoded, payload);
            assert_eq!(captured, params);
        }
    }

    Ok(())
}

#[traced_test]
#[test]
fn reencode_reproduces_frame_bytes() -> Result<()> {
    for payload in payloads() {
        for params in [
            DcxParams::deflate(),
            DcxParams::block(),
            DcxParams::block_max(),
        ] {
            let original = encode(&payload, &params)?;
            let (decoded, captured) = decode(&original)?;
            let rebuilt = encode(&decoded, &captured)?;
            assert_eq!(
                format!("{:02X?}", rebuilt),
                format!("{:02X?}", original)
            );
        }
    }

    Ok(())
}

#[traced_test]
#[test]
fn nonstandard_header_words_survive() -> Result<()> {
    let params = DcxParams::builder()
        .algorithm(souls_dcx::DcxAlgorithm::Deflate)
        .version_word(0x11000)
        .unk10(0x44)
        .unk14(0x4C)
        .level(8)
        .build();

    let frame = encode(b"payload", &params)?;
    let (_, captured) = decode(&frame)?;
    assert_eq!(captured, params);
    assert_eq!(encode(b"payload", &captured)?, frame);

    Ok(())
}
