//! This library handles reading and writing the **DCX** compression frame wrapped around
//! archive files used by *FromSoftware* games.
//!
//! # DCX Frame Format Documentation
//!
//! DCX is a whole-file compression wrapper: the payload (usually a binder archive, but the
//! frame is payload-agnostic) is compressed as a single unit and prefixed with a header
//! describing the scheme and its parameters. Files are typically identified by a `.dcx`
//! suffix appended to the wrapped file's own extension (`.bnd.dcx`, `.bhd.dcx`).
//!
//! ## File Structure
//!
//! All multi-byte integers are **big-endian**. The frame consists of four tagged sections
//! followed by the compressed data.
//!
//! | Offset (bytes) | Field              | Description                                         |
//! |----------------|--------------------|-----------------------------------------------------|
//! | 0x00           | Magic              | 4 bytes: `DCX\0`                                    |
//! | 0x04           | Version word       | 4 bytes: `0x10000` or `0x11000` depending on game   |
//! | 0x08           | Sizes offset       | 4 bytes: offset of the `DCS` section (`0x18`)       |
//! | 0x0C           | Params offset      | 4 bytes: offset of the `DCP` section (`0x24`)       |
//! | 0x10           | Unknown            | 4 bytes: `0x24` or `0x44`, preserved verbatim       |
//! | 0x14           | Unknown            | 4 bytes: `0x2C` or `0x4C`, preserved verbatim       |
//! | 0x18           | `DCS\0`            | Sizes section tag                                   |
//! | 0x1C           | Uncompressed size  | 4 bytes: payload size after decompression           |
//! | 0x20           | Compressed size    | 4 bytes: size of the compressed data section        |
//! | 0x24           | `DCP\0`            | Parameters section tag                              |
//! | 0x28           | Scheme tag         | 4 bytes: `DFLT`, `EDGE` or `NONE`                   |
//! | 0x2C           | Params size        | 4 bytes: `0x20`                                     |
//! | 0x30           | Level              | 1 byte: compression level, then 3 zero bytes        |
//! | 0x34           | Window/block size  | 4 bytes: deflate window hint or maximum block size  |
//! | 0x38           | Reserved           | 12 bytes: preserved verbatim                        |
//! | 0x44           | `DCA\0`            | Data section tag                                    |
//! | 0x48           | Data header size   | 4 bytes: `8`, plus the block table size for `EDGE`  |
//!
//! ## Schemes
//!
//! - **`DFLT`**: the whole payload is a single Zlib stream. The one preset used when
//!   building new frames is level 9; the level byte and the unknown header words of
//!   existing frames are captured on decode and re-emitted verbatim, so the sub-variants
//!   that differ only in those constants all round-trip.
//! - **`EDGE`**: the payload is cut into fixed-size blocks, each Zlib-compressed
//!   independently, with a block table (`EgdT`) inside the data header. Two presets are
//!   supported, differing in maximum block size: standard (`0x10000`) and max (`0x40000`).
//!   Blocks whose `compressed` flag is zero are stored raw.
//! - **`NONE`**: no frame at all; the payload is stored bare. [`decode`] treats input
//!   without the `DCX\0` magic as this scheme, which keeps callers agnostic about whether
//!   a given file on disk is wrapped.
//!
//! ## Round-trip law
//!
//! For every frame [`decode`] accepts, [`encode`] with the returned [`DcxParams`] rebuilds
//! the original bytes exactly. Scheme selection on encode is always explicit via the
//! params value; detection only happens on decode.
//!
//! [`decode`]: read::decode
//! [`encode`]: write::encode

pub mod error;
pub mod params;
pub mod read;
pub mod types;
pub mod write;

pub use params::{DcxAlgorithm, DcxParams};
pub use read::{decode, is_wrapped};
pub use write::encode;
