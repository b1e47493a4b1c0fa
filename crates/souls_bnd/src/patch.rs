//! Logical edits applied to an in-memory binder before writing
//!
//! These operate purely on the entry table; raw archive bytes are never touched.
//! Unlike the parsers, which fail fast, patch operations are partially resilient: a
//! batch keeps going past individual failures and reports them per entry, so one bad
//! replacement does not lose dozens of good ones.

use std::fmt::Display;

use tracing::instrument;

use crate::types::{Binder, BinderEntry};

/// Case rule applied when matching entry names.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CaseMode {
    /// Substrings must match exactly
    Exact,
    /// Substrings are compared after ASCII uppercasing
    IgnoreCase,
}

/// Result of a [`replace_bytes`] batch.
#[derive(Debug, Default)]
pub struct PatchOutcome {
    /// Number of entries whose payload was replaced
    pub replaced: usize,

    /// Entries the producer failed for, left unmodified
    pub failures: Vec<PatchFailure>,
}

impl PatchOutcome {
    /// Whether every matched entry was replaced.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// One entry a [`replace_bytes`] producer failed for.
#[derive(Debug)]
pub struct PatchFailure {
    pub id: i32,
    pub name: String,
    pub error: String,
}

/// Replace `old` with `new` in every entry name containing it.
///
/// Returns the number of entries changed; finding no match is not an error. Renamed
/// entries drop their captured on-disk name bytes, so the writer re-encodes them in the
/// archive's name encoding while every untouched name round-trips verbatim.
#[instrument(skip(binder), ret)]
pub fn rename_matching(binder: &mut Binder, old: &str, new: &str, case: CaseMode) -> usize {
    if old.is_empty() {
        return 0;
    }

    let mut changed = 0;
    for entry in binder.entries_mut() {
        let renamed = match case {
            CaseMode::Exact => entry
                .name
                .contains(old)
                .then(|| entry.name.replace(old, new)),
            CaseMode::IgnoreCase => replace_ignore_case(&entry.name, old, new),
        };

        if let Some(name) = renamed {
            entry.name = name;
            entry.name_raw = None;
            changed += 1;
        }
    }

    changed
}

/// Replace the payload of every entry matching `predicate` with bytes from `producer`.
///
/// A producer failure leaves that entry untouched and is recorded in the outcome; the
/// rest of the batch proceeds. The per-entry length fields always follow the new
/// payload, and a carried uncompressed-size field is updated alongside.
pub fn replace_bytes<P, F, E>(binder: &mut Binder, predicate: P, mut producer: F) -> PatchOutcome
where
    P: Fn(&BinderEntry) -> bool,
    F: FnMut(&BinderEntry) -> Result<Vec<u8>, E>,
    E: Display,
{
    let mut outcome = PatchOutcome::default();

    for entry in binder.entries_mut() {
        if !predicate(entry) {
            continue;
        }

        match producer(entry) {
            Ok(bytes) => {
                entry.uncompressed_size = entry.uncompressed_size.map(|_| bytes.len() as u64);
                entry.bytes = bytes;
                outcome.replaced += 1;
            }
            Err(error) => outcome.failures.push(PatchFailure {
                id: entry.id,
                name: entry.name.clone(),
                error: error.to_string(),
            }),
        }
    }

    outcome
}

/// Predicate matching the host tool's "name equals target, with the expected
/// extension" rule, both case-insensitively.
pub fn name_equals_ignore_case(
    target: impl ToString,
    extension: impl ToString,
) -> impl Fn(&BinderEntry) -> bool {
    let target = target.to_string().to_ascii_uppercase();
    let extension = extension.to_string().to_ascii_uppercase();
    move |entry: &BinderEntry| {
        let name = entry.name.to_ascii_uppercase();
        name == target && name.ends_with(&extension)
    }
}

/// ASCII-case-insensitive substring replacement, splicing `new` over each match while
/// leaving the untouched regions' original case intact.
fn replace_ignore_case(name: &str, old: &str, new: &str) -> Option<String> {
    let haystack = name.to_ascii_uppercase();
    let needle = old.to_ascii_uppercase();

    let mut out = String::with_capacity(name.len());
    let mut position = 0;
    let mut found = false;
    while let Some(index) = haystack[position..].find(&needle) {
        let at = position + index;
        out.push_str(&name[position..at]);
        out.push_str(new);
        position = at + old.len();
        found = true;
    }

    if !found {
        return None;
    }
    out.push_str(&name[position..]);
    Some(out)
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::types::{Binder, BinderEntry, BinderMeta, Bnd3Meta};

    fn sample() -> Binder {
        let mut binder = Binder::new(BinderMeta::Bnd3(Bnd3Meta::default()));
        binder.push(BinderEntry::new(1, "parts\\WP_A_0210.partsbnd", b"axe".to_vec()));
        binder.push(BinderEntry::new(2, "parts\\WP_A_0211.partsbnd", b"blade".to_vec()));
        binder.push(BinderEntry::new(3, "chr\\c0000.anibnd", b"anim".to_vec()));
        binder
    }

    #[test]
    fn rename_replaces_matching_substrings() {
        let mut binder = sample();
        let changed = rename_matching(&mut binder, "WP_A_021", "WP_A_031", CaseMode::Exact);

        assert_eq!(changed, 2);
        assert_eq!(binder.entries()[0].name, "parts\\WP_A_0310.partsbnd");
        assert_eq!(binder.entries()[1].name, "parts\\WP_A_0311.partsbnd");
        assert_eq!(binder.entries()[2].name, "chr\\c0000.anibnd");
    }

    #[test]
    fn rename_is_idempotent() {
        let mut binder = sample();
        assert_eq!(
            rename_matching(&mut binder, "WP_A_021", "WP_A_031", CaseMode::Exact),
            2
        );
        assert_eq!(
            rename_matching(&mut binder, "WP_A_021", "WP_A_031", CaseMode::Exact),
            0
        );
    }

    #[test]
    fn rename_ignore_case_preserves_untouched_case() {
        let mut binder = sample();
        let changed = rename_matching(&mut binder, "wp_a_0210", "WP_A_9999", CaseMode::IgnoreCase);

        assert_eq!(changed, 1);
        assert_eq!(binder.entries()[0].name, "parts\\WP_A_9999.partsbnd");
    }

    #[test]
    fn rename_without_matches_is_not_an_error() {
        let mut binder = sample();
        assert_eq!(
            rename_matching(&mut binder, "missing", "found", CaseMode::Exact),
            0
        );
        assert_eq!(rename_matching(&mut binder, "", "found", CaseMode::Exact), 0);
    }

    #[test]
    fn rename_drops_captured_name_bytes() {
        let mut binder = sample();
        binder.entries_mut()[0].name_raw = Some(b"parts\\WP_A_0210.partsbnd".to_vec());

        rename_matching(&mut binder, "0210", "0310", CaseMode::Exact);
        assert_eq!(binder.entries()[0].name_raw, None);
        assert!(binder.entries()[2].name_raw.is_none());
    }

    #[test]
    fn replace_bytes_updates_matches() {
        let mut binder = sample();
        let outcome = replace_bytes(
            &mut binder,
            |entry| entry.name.ends_with(".partsbnd"),
            |_| Ok::<_, String>(b"patched".to_vec()),
        );

        assert_eq!(outcome.replaced, 2);
        assert!(outcome.is_clean());
        assert_eq!(binder.entries()[0].bytes, b"patched");
        assert_eq!(binder.entries()[1].bytes, b"patched");
        assert_eq!(binder.entries()[2].bytes, b"anim");
    }

    #[test]
    fn replace_bytes_reports_failures_per_entry() {
        let mut binder = sample();
        let outcome = replace_bytes(
            &mut binder,
            |entry| entry.name.ends_with(".partsbnd"),
            |entry| {
                if entry.id == 1 {
                    Err("payload codec rejected the input")
                } else {
                    Ok(b"patched".to_vec())
                }
            },
        );

        assert_eq!(outcome.replaced, 1);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].id, 1);
        assert_eq!(outcome.failures[0].error, "payload codec rejected the input");
        // The failed entry is left exactly as it was.
        assert_eq!(binder.entries()[0].bytes, b"axe");
        assert_eq!(binder.entries()[1].bytes, b"patched");
    }

    #[test]
    fn replace_bytes_tracks_uncompressed_size() {
        let mut binder = sample();
        binder.entries_mut()[0].uncompressed_size = Some(3);

        replace_bytes(
            &mut binder,
            |entry| entry.id == 1,
            |_| Ok::<_, String>(b"longer payload".to_vec()),
        );
        assert_eq!(binder.entries()[0].uncompressed_size, Some(14));
        assert_eq!(binder.entries()[1].uncompressed_size, None);
    }

    #[test]
    fn name_predicate_matches_case_insensitively() {
        let predicate = name_equals_ignore_case("PARTS\\wp_a_0210.PARTSBND", ".partsbnd");
        let binder = sample();

        assert!(predicate(&binder.entries()[0]));
        assert!(!predicate(&binder.entries()[1]));
        assert!(!predicate(&binder.entries()[2]));
    }
}
