//! # pkgproto Core Library
//!
//! This crate models System V `prototype(4)` package entries: parse a line of
//! text into a structured [`record::Record`], format a record back into the
//! exact line it came from, self-check records by round-tripping them, and
//! build records from live filesystem metadata.
//!
//! ## Key Modules
//!
//! - [`record`]: The entry model: schema table, parser, formatter, validator
//!   and the metadata-backed constructor.
//! - [`meta`]: The [`meta::FileMetadataProvider`] capability the constructor
//!   consumes, plus its defaults.
//! - [`fsx`]: The Unix implementation of that capability.
//! - [`scan`]: Entry generation for files and directory trees.
//!
//! ## Examples
//!
//! ```
//! use pkgproto::record::Record;
//!
//! let rec = Record::from_line("c none /dev/null 13 2 0666 root sys")?;
//! assert_eq!(rec.mode(), Some(0o666));
//! assert_eq!(rec.to_string(), "c none /dev/null 13 2 0666 root sys");
//! # Ok::<(), pkgproto::ProtoError>(())
//! ```
//!
//! Command lines (leading `!`), pathname variable substitution and multi-part
//! package assembly are not supported.

pub mod cli;
pub mod error;
pub mod meta;
pub mod record;
pub mod scan;
pub use error::ProtoError;

// Platform filesystem metadata provider
pub mod fsx;
