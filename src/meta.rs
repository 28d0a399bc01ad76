//! Filesystem metadata capability consumed by [`Record::from_path`].
//!
//! The record core never touches the filesystem itself. Everything it needs
//! from the outside world (node classification, permission bits, owner and
//! group names, device numbers) comes through the [`FileMetadataProvider`]
//! trait, so the constructor can be driven by the real OS (see [`crate::fsx`])
//! or by a canned provider in tests.
//!
//! All provider methods operate on the link itself, never the link target.
//!
//! [`Record::from_path`]: crate::record::Record::from_path

use std::io;
use std::path::Path;

/// Install class used when none is given.
pub const DEFAULT_INSTALL_CLASS: &str = "none";

/// Classification of a filesystem node, as reported by a provider.
///
/// Only the kinds a filesystem can actually hand back appear here; the
/// prototype-only types (`e`, `v`, `x`, `i`, `l`) are never produced by
/// metadata queries. `Unknown` is a distinct outcome, not an error: the
/// lookup succeeded but the node has no corresponding file type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileClass {
    /// Block special device.
    Block,
    /// Character special device.
    Char,
    /// Directory.
    Directory,
    /// Regular file.
    Regular,
    /// Named pipe (FIFO).
    Fifo,
    /// Symbolic link.
    Symlink,
    /// Anything else, e.g. a socket.
    Unknown,
}

/// Source of filesystem metadata for one path at a time.
///
/// Implementations must resolve symlink status without following the link
/// (lstat semantics). Each method is a single synchronous query; failures
/// propagate immediately, there is no retry.
pub trait FileMetadataProvider {
    /// Classify the node at `path`.
    fn classify(&self, path: &Path) -> io::Result<FileClass>;

    /// True if the node at `path` is a symbolic link.
    fn is_symlink(&self, path: &Path) -> io::Result<bool>;

    /// Permission bits of the node. Callers mask to the low 12 bits.
    fn mode(&self, path: &Path) -> io::Result<u32>;

    /// Name of the owning user.
    fn owner_name(&self, path: &Path) -> io::Result<String>;

    /// Name of the owning group.
    fn group_name(&self, path: &Path) -> io::Result<String>;

    /// Major device number. Only meaningful for device nodes.
    fn dev_major(&self, path: &Path) -> io::Result<u32>;

    /// Minor device number. Only meaningful for device nodes.
    fn dev_minor(&self, path: &Path) -> io::Result<u32>;
}

/// Defaults applied by the metadata constructor.
///
/// Passed explicitly so the defaults are visible at the call site rather than
/// living in ambient global state.
#[derive(Debug, Clone)]
pub struct Defaults {
    /// Install class recorded on generated entries.
    pub install_class: String,
    /// Part label recorded on generated entries. `None` means part 1 per
    /// prototype(4), and is emitted as absent.
    pub part: Option<String>,
}

impl Default for Defaults {
    fn default() -> Self {
        Defaults {
            install_class: DEFAULT_INSTALL_CLASS.to_string(),
            part: None,
        }
    }
}
