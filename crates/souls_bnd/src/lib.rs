//! This library handles reading from and creating **BND** binder archives used by
//! *FromSoftware* games.
//!
//! # Binder Archive Format Documentation
//!
//! A binder packs many named files (models, textures, scripts, params) into a single
//! blob. Two header layouts are in circulation — an older fixed-field variant (`BND3`)
//! and a newer variant with longer, more flexible entry records (`BND4`) — plus a
//! split form of each (`BHF3`/`BDF3`, `BHF4`/`BDF4`) that stores entry metadata and
//! payload bytes in separate files. Whole archives are often additionally wrapped in a
//! compression frame; that layer is handled by the `souls_dcx` crate and composed by
//! callers, never by this library.
//!
//! Both variants parse into the same [`Binder`] shape, so code downstream of
//! [`Binder::parse`] is variant-agnostic.
//!
//! ## BND3 Structure
//!
//! Header fields are little-endian unless the endianness flags say otherwise.
//!
//! | Offset (bytes) | Field              | Description                                          |
//! |----------------|--------------------|------------------------------------------------------|
//! | 0x00           | Magic              | 4 bytes: `BND3` (`BHF3` for a split header file)     |
//! | 0x04           | Version            | 8 bytes: version signature, preserved verbatim       |
//! | 0x0C           | Format             | 1 byte: selects which fields entry records carry     |
//! | 0x0D           | Big-endian         | 1 byte: multi-byte fields are big-endian             |
//! | 0x0E           | Bit-big-endian     | 1 byte: the format byte is stored MSB-first          |
//! | 0x0F           | Zero               | 1 byte                                               |
//! | 0x10           | Entry count        | 4 bytes                                              |
//! | 0x14           | Headers end        | 4 bytes: end of the record and name region           |
//! | 0x18           | Unknown            | 4 bytes: preserved verbatim                          |
//! | 0x1C           | Zero               | 4 bytes                                              |
//!
//! Each entry record holds a flag byte, the payload size, the payload offset, and —
//! depending on the format byte — an id, an offset into the NUL-terminated name
//! region, and an uncompressed size. Entry payloads follow, each padded to a 16-byte
//! boundary.
//!
//! ## BND4 Structure
//!
//! | Offset (bytes) | Field              | Description                                          |
//! |----------------|--------------------|------------------------------------------------------|
//! | 0x00           | Magic              | 4 bytes: `BND4` (`BHF4` for a split header file)     |
//! | 0x04           | Unknown flags      | 2 bytes: preserved verbatim, then 3 zero bytes       |
//! | 0x09           | Big-endian         | 1 byte                                               |
//! | 0x0A           | Bit-big-endian     | 1 byte, then 1 zero byte                             |
//! | 0x0C           | Entry count        | 4 bytes                                              |
//! | 0x10           | Header size        | 8 bytes: `0x40`                                      |
//! | 0x18           | Version            | 8 bytes: version signature, preserved verbatim       |
//! | 0x20           | Entry record size  | 8 bytes: must match the format byte's field set      |
//! | 0x28           | Headers end        | 8 bytes: start of the entry payload region           |
//! | 0x30           | Unicode            | 1 byte: names are UTF-16 rather than single-byte     |
//! | 0x31           | Format             | 1 byte                                               |
//! | 0x32           | Extended           | 1 byte: `4` appends a path-hash table, then 1 zero   |
//! | 0x34           | Zero               | 4 bytes                                              |
//! | 0x38           | Hash table offset  | 8 bytes: `0` unless the extended byte is `4`         |
//!
//! ## Round-trip law
//!
//! Header metadata captured on read — version signatures, format and flag bytes,
//! unknown words — is threaded unchanged into the writer, and unidentified per-entry
//! flag bits pass through as opaque values. [`Binder::serialize`] therefore reproduces
//! the parsed payload byte-for-byte when no entry was edited, and reproduces all
//! unedited regions when entries were renamed or replaced; only computed offsets,
//! lengths and the derived hash table change. The same law applies jointly to both
//! halves of a [`SplitBinder`].
//!
//! ## Additional Information
//!
//! - **File Extensions**: `.*bnd`, `.*bhd` + `.*bdt` (conventionally per content type:
//!   `.chrbnd`, `.partsbnd`, `.anibnd`, ...)
//! - **Entry names**: path-like, with either separator; preserved verbatim, never
//!   normalized
//! - **Entry payloads**: opaque byte spans handed to other codecs

pub mod error;
pub mod patch;
pub mod read;
pub mod split;
pub mod types;
pub mod write;

mod endian;
mod hash;

pub use patch::{rename_matching, replace_bytes, CaseMode, PatchFailure, PatchOutcome};
pub use split::{DataHalfMeta, SplitBinder};
pub use types::{Binder, BinderEntry, BinderFormat, BinderMeta, Bnd3Meta, Bnd4Meta};
