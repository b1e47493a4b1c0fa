use pretty_assertions::{assert_eq, assert_str_eq};
use souls_bnd::{
    error::Result, Binder, BinderEntry, BinderMeta, Bnd3Meta, Bnd4Meta, SplitBinder,
};
use tracing_test::traced_test;

fn two_entry_binder(meta: BinderMeta) -> Result<Binder> {
    let mut binder = Binder::new(meta);
    binder.push(BinderEntry::new(0, "a.txt", b"hello".to_vec()));
    binder.push(BinderEntry::new(1, "b.txt", b"world".to_vec()));
    Ok(binder)
}

fn metas() -> Vec<BinderMeta> {
    vec![
        BinderMeta::Bnd3(Bnd3Meta::default()),
        BinderMeta::Bnd3(Bnd3Meta {
            big_endian: true,
            ..Bnd3Meta::default()
        }),
        BinderMeta::Bnd4(Bnd4Meta::default()),
        BinderMeta::Bnd4(Bnd4Meta {
            unicode: false,
            ..Bnd4Meta::default()
        }),
        BinderMeta::Bnd4(Bnd4Meta {
            extended: 0,
            bucket_count: 0,
            ..Bnd4Meta::default()
        }),
    ]
}

#[traced_test]
#[test]
fn parse_inverts_serialize_for_every_variant() -> Result<()> {
    for meta in metas() {
        let binder = two_entry_binder(meta)?;
        let payload = binder.serialize()?;

        let reparsed = Binder::parse(&payload)?;
        assert_eq!(reparsed.len(), 2);
        assert_eq!(reparsed.entries()[0].name, "a.txt");
        assert_eq!(reparsed.entries()[0].bytes, b"hello");
        assert_eq!(reparsed.entries()[1].name, "b.txt");
        assert_eq!(reparsed.entries()[1].bytes, b"world");
        assert_eq!(reparsed.meta(), binder.meta());

        // An unmutated binder must reproduce its payload exactly.
        assert_str_eq!(
            format!("{:02X?}", reparsed.serialize()?),
            format!("{:02X?}", payload)
        );
    }

    Ok(())
}

#[traced_test]
#[test]
fn split_roundtrips_for_every_variant() -> Result<()> {
    for meta in metas() {
        let split = SplitBinder::from_binder(two_entry_binder(meta)?);
        let (header, data) = split.serialize()?;

        let reparsed = SplitBinder::parse(&header, &data)?;
        let (header_again, data_again) = reparsed.serialize()?;
        assert_str_eq!(format!("{:02X?}", header_again), format!("{:02X?}", header));
        assert_str_eq!(format!("{:02X?}", data_again), format!("{:02X?}", data));
    }

    Ok(())
}

#[traced_test]
#[test]
fn rename_changes_only_name_bytes() -> Result<()> {
    let binder = two_entry_binder(BinderMeta::Bnd3(Bnd3Meta::default()))?;
    let original = binder.serialize()?;

    let mut renamed = Binder::parse(&original)?;
    let changed = souls_bnd::rename_matching(&mut renamed, "a", "c", souls_bnd::CaseMode::Exact);
    assert_eq!(changed, 1);

    let patched = renamed.serialize()?;
    let reparsed = Binder::parse(&patched)?;
    assert_eq!(reparsed.entries()[0].name, "c.txt");
    assert_eq!(reparsed.entries()[0].bytes, b"hello");
    assert_eq!(reparsed.entries()[1].name, "b.txt");
    assert_eq!(reparsed.entries()[1].bytes, b"world");

    // The rename swapped one same-length name, so exactly one byte may differ.
    assert_eq!(patched.len(), original.len());
    let differing: Vec<usize> = original
        .iter()
        .zip(&patched)
        .enumerate()
        .filter(|(_, (a, b))| a != b)
        .map(|(index, _)| index)
        .collect();
    assert_eq!(differing.len(), 1);

    Ok(())
}

#[traced_test]
#[test]
fn edits_shift_offsets_without_touching_metadata() -> Result<()> {
    let binder = two_entry_binder(BinderMeta::Bnd4(Bnd4Meta::default()))?;
    let original = binder.serialize()?;

    let mut patched = Binder::parse(&original)?;
    let outcome = souls_bnd::replace_bytes(
        &mut patched,
        |entry| entry.name == "a.txt",
        |_| Ok::<_, String>(b"a considerably longer payload than before".to_vec()),
    );
    assert_eq!(outcome.replaced, 1);

    let reparsed = Binder::parse(&patched.serialize()?)?;
    assert_eq!(
        reparsed.entries()[0].bytes,
        b"a considerably longer payload than before"
    );
    assert_eq!(reparsed.entries()[1].bytes, b"world");
    assert_eq!(reparsed.meta(), Binder::parse(&original)?.meta());

    Ok(())
}
