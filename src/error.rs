use std::path::PathBuf;

use thiserror::Error;

/// The primary error type for all operations in the `pkgproto` crate.
///
/// Every variant is recoverable; callers inspect the error and decide how to
/// proceed. Parsing and construction are all-or-nothing, so no variant ever
/// accompanies a partial record.
#[derive(Debug, Error)]
pub enum ProtoError {
    /// The leading file type token is not one of the tags known to the schema
    /// table. Carries the offending token.
    #[error("unknown file type {0:?}")]
    UnknownFileKind(String),

    /// The line is a prototype command (leading `!`). Command lines are
    /// explicitly unsupported.
    #[error("prototype commands are not supported: {0:?}")]
    UnsupportedDirective(String),

    /// The file type was recognized but the rest of the line does not match
    /// that type's field grammar. Carries the whole line for diagnostics.
    #[error("could not parse line {0:?}")]
    MalformedLine(String),

    /// The filesystem node has a kind with no prototype file type, e.g. a
    /// socket.
    #[error("unsupported file type at '{}'", .0.display())]
    UnsupportedFileType(PathBuf),

    /// An I/O error occurred, typically while querying file metadata.
    /// Includes the path where the error happened.
    #[error("I/O error on path '{}': {source}", .path.display())]
    Io {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
}

impl ProtoError {
    /// Attach a path to an I/O error.
    pub fn io(source: std::io::Error, path: impl Into<PathBuf>) -> Self {
        ProtoError::Io {
            source,
            path: path.into(),
        }
    }
}
