//! # Prototype entries
//!
//! This module defines [`Record`], one line of a System V `prototype(4)` file,
//! together with the logic to parse a line into a record, format a record back
//! into a line, and self-check a record by round-tripping it.
//!
//! A line carries a single-character file type tag which decides the field set
//! of the rest of the line. The tag-to-field-set mapping (the schema table) is
//! consulted by both the parser and the formatter, so the two directions
//! cannot drift apart; [`Record::is_valid`] re-parses formatted output as a
//! guard against exactly that.
//!
//! See the `prototype(4)` man page for the format itself. Command lines
//! (leading `!`), pathname variable substitution and multi-part assembly are
//! not supported.

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ProtoError;
use crate::meta::{Defaults, FileClass, FileMetadataProvider};

/// One prototype entry: an optional part label plus the kind-specific fields.
///
/// `part` is left public on purpose: callers assign parts after construction,
/// the way packaging scripts renumber entries when splitting a package. A part
/// of `None` means "part 1" and is emitted as absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Optional part label, prepended verbatim when formatting.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub part: Option<String>,
    /// The file type tag and its fields.
    #[serde(flatten)]
    pub entry: Entry,
}

/// Kind-specific payload of a [`Record`], one variant per file type tag.
///
/// Each variant carries exactly the fields its tag defines, so a record can
/// never hold a field its file type does not have. Kinds sharing a field
/// layout share a field struct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "ftype")]
pub enum Entry {
    /// `b`: block special device.
    #[serde(rename = "b")]
    BlockDevice(DeviceEntry),
    /// `c`: character special device.
    #[serde(rename = "c")]
    CharDevice(DeviceEntry),
    /// `d`: directory.
    #[serde(rename = "d")]
    Directory(NodeEntry),
    /// `e`: file edited during installation.
    #[serde(rename = "e")]
    EditableFile(NodeEntry),
    /// `f`: regular file.
    #[serde(rename = "f")]
    RegularFile(NodeEntry),
    /// `i`: installation script or information file.
    #[serde(rename = "i")]
    InfoFile(InfoEntry),
    /// `l`: hard link.
    #[serde(rename = "l")]
    HardLink(LinkEntry),
    /// `p`: named pipe.
    #[serde(rename = "p")]
    NamedPipe(NodeEntry),
    /// `s`: symbolic link.
    #[serde(rename = "s")]
    SymLink(LinkEntry),
    /// `v`: file whose contents are volatile after installation.
    #[serde(rename = "v")]
    VolatileFile(NodeEntry),
    /// `x`: directory exclusively owned by the package.
    #[serde(rename = "x")]
    ExclusiveDir(NodeEntry),
}

/// Fields of a device entry (`b`, `c`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceEntry {
    pub class: String,
    pub path: String,
    pub major: u32,
    pub minor: u32,
    pub mode: u32,
    pub owner: String,
    pub group: String,
}

/// Fields of a plain node entry (`d`, `e`, `f`, `p`, `v`, `x`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeEntry {
    pub class: String,
    pub path: String,
    pub mode: u32,
    pub owner: String,
    pub group: String,
}

/// Fields of an information entry (`i`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfoEntry {
    pub path: String,
}

/// Fields of a link entry (`l`, `s`).
///
/// For links the path usually encodes an `install-path=target` pair; the pair
/// is kept as one opaque string, embedded `=` included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkEntry {
    pub class: String,
    pub path: String,
}

/// Field layout behind a file type tag. One row of the schema table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layout {
    Device,
    Node,
    Info,
    Link,
}

/// The schema table: maps every known tag to its field layout.
///
/// This is the single place a tag is declared. The parser resolves tags here
/// and the formatter emits tags via [`Entry::tag`], whose match arms mirror
/// this table variant for variant.
fn layout_for(tag: char) -> Option<Layout> {
    match tag {
        'b' | 'c' => Some(Layout::Device),
        'd' | 'e' | 'f' | 'p' | 'v' | 'x' => Some(Layout::Node),
        'i' => Some(Layout::Info),
        'l' | 's' => Some(Layout::Link),
        _ => None,
    }
}

// Field grammars, one per layout, over the portion of the line after the tag.
//
// Device and Node anchor both ends. Info and Link anchor only the start:
// prototype(4) consumers ignore trailing content on those lines and so do we.
// The asymmetry is inherited behavior, kept as-is.

fn device_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^(\w{1,12}) (\S+) (\d+) (\d+) ([0-7]{4}) (\S+) (\S+)$").unwrap())
}

fn node_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(\w{1,12}) (\S+) ([0-7]{4}) (\S+) (\S+)$").unwrap())
}

fn info_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(\S+)").unwrap())
}

fn link_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(\w{1,12}) (\S+)").unwrap())
}

/// Returns the tag if `token` is a single known file type character.
fn known_tag(token: &str) -> Option<char> {
    let mut chars = token.chars();
    let tag = chars.next()?;
    if chars.next().is_none() && layout_for(tag).is_some() {
        Some(tag)
    } else {
        None
    }
}

impl Record {
    /// Parse one prototype line.
    ///
    /// The leading whitespace-delimited token is taken as the file type tag.
    /// If it is not a known tag it is tried as an optional part label with the
    /// next token as the tag; lines where neither works fail with
    /// [`ProtoError::UnknownFileKind`]. Command lines (leading `!`) fail with
    /// [`ProtoError::UnsupportedDirective`], and recognized tags whose fields
    /// do not match the tag's grammar fail with [`ProtoError::MalformedLine`].
    ///
    /// # Examples
    ///
    /// ```
    /// use pkgproto::record::Record;
    ///
    /// let rec = Record::from_line("f none /etc/motd 0644 root sys").unwrap();
    /// assert_eq!(rec.path(), "/etc/motd");
    /// assert_eq!(rec.mode(), Some(0o644));
    /// assert_eq!(rec.to_string(), "f none /etc/motd 0644 root sys");
    /// ```
    pub fn from_line(line: &str) -> Result<Record, ProtoError> {
        if line.starts_with('!') {
            return Err(ProtoError::UnsupportedDirective(line.to_string()));
        }
        let (first, rest) = line.split_once(' ').unwrap_or((line, ""));
        if let Some(tag) = known_tag(first) {
            let entry = Entry::from_fields(tag, rest, line)?;
            return Ok(Record { part: None, entry });
        }
        // Not a tag: the first token may be a part label in front of the tag.
        // A part label is a real token, so leading whitespace does not count.
        let (second, fields) = rest.split_once(' ').unwrap_or((rest, ""));
        if !first.is_empty() {
            if let Some(tag) = known_tag(second) {
                let entry = Entry::from_fields(tag, fields, line)?;
                return Ok(Record {
                    part: Some(first.to_string()),
                    entry,
                });
            }
        }
        Err(ProtoError::UnknownFileKind(first.to_string()))
    }

    /// Round-trip self-check: format this record and parse the result.
    ///
    /// Returns `true` iff the re-parse succeeds. This deliberately goes
    /// through the real formatter and parser instead of checking fields one
    /// by one, so anything that would produce an unparsable line (say an
    /// install class with a space written into a public field) shows up
    /// here. Never panics.
    pub fn is_valid(&self) -> bool {
        Record::from_line(&self.to_string()).is_ok()
    }

    /// Build a record from filesystem metadata.
    ///
    /// All metadata is queried from `provider` for `path`, operating on the
    /// link itself for symlinks. If `actual` is given it becomes the record's
    /// pathname while the metadata still comes from `path`; this supports the
    /// `install-path=source-path` convention, where the packaged file is
    /// described at one location but sourced from another. The composite form
    /// is passed through opaquely.
    ///
    /// Symlink status wins over the generic classification, so a link to a
    /// directory is recorded as `s`, not `d`. Nodes the format cannot express
    /// (e.g. sockets) fail with [`ProtoError::UnsupportedFileType`].
    pub fn from_path<M>(
        provider: &M,
        path: &Path,
        actual: Option<&Path>,
        defaults: &Defaults,
    ) -> Result<Record, ProtoError>
    where
        M: FileMetadataProvider + ?Sized,
    {
        let class = provider
            .classify(path)
            .map_err(|e| ProtoError::io(e, path))?;
        let class = if provider
            .is_symlink(path)
            .map_err(|e| ProtoError::io(e, path))?
        {
            FileClass::Symlink
        } else {
            class
        };
        tracing::debug!(path = %path.display(), ?class, "classified filesystem entry");

        let pathname = actual.unwrap_or(path).display().to_string();
        let install_class = defaults.install_class.clone();

        let entry = match class {
            FileClass::Unknown => {
                return Err(ProtoError::UnsupportedFileType(path.to_path_buf()));
            }
            // Links carry no mode or ownership on the wire, so none of those
            // queries are made for them.
            FileClass::Symlink => Entry::SymLink(LinkEntry {
                class: install_class,
                path: pathname,
            }),
            FileClass::Block | FileClass::Char => {
                let dev = DeviceEntry {
                    class: install_class,
                    path: pathname,
                    major: provider.dev_major(path).map_err(|e| ProtoError::io(e, path))?,
                    minor: provider.dev_minor(path).map_err(|e| ProtoError::io(e, path))?,
                    mode: provider.mode(path).map_err(|e| ProtoError::io(e, path))? & 0o7777,
                    owner: provider
                        .owner_name(path)
                        .map_err(|e| ProtoError::io(e, path))?,
                    group: provider
                        .group_name(path)
                        .map_err(|e| ProtoError::io(e, path))?,
                };
                if class == FileClass::Block {
                    Entry::BlockDevice(dev)
                } else {
                    Entry::CharDevice(dev)
                }
            }
            FileClass::Directory | FileClass::Regular | FileClass::Fifo => {
                let node = NodeEntry {
                    class: install_class,
                    path: pathname,
                    mode: provider.mode(path).map_err(|e| ProtoError::io(e, path))? & 0o7777,
                    owner: provider
                        .owner_name(path)
                        .map_err(|e| ProtoError::io(e, path))?,
                    group: provider
                        .group_name(path)
                        .map_err(|e| ProtoError::io(e, path))?,
                };
                match class {
                    FileClass::Directory => Entry::Directory(node),
                    FileClass::Regular => Entry::RegularFile(node),
                    _ => Entry::NamedPipe(node),
                }
            }
        };

        Ok(Record {
            part: defaults.part.clone(),
            entry,
        })
    }

    /// The single-character file type tag.
    pub fn tag(&self) -> char {
        self.entry.tag()
    }

    /// The entry's pathname. Present for every file type.
    pub fn path(&self) -> &str {
        match &self.entry {
            Entry::BlockDevice(d) | Entry::CharDevice(d) => &d.path,
            Entry::Directory(n)
            | Entry::EditableFile(n)
            | Entry::RegularFile(n)
            | Entry::NamedPipe(n)
            | Entry::VolatileFile(n)
            | Entry::ExclusiveDir(n) => &n.path,
            Entry::InfoFile(i) => &i.path,
            Entry::HardLink(l) | Entry::SymLink(l) => &l.path,
        }
    }

    /// The install class, absent for `i` entries.
    pub fn install_class(&self) -> Option<&str> {
        match &self.entry {
            Entry::BlockDevice(d) | Entry::CharDevice(d) => Some(&d.class),
            Entry::Directory(n)
            | Entry::EditableFile(n)
            | Entry::RegularFile(n)
            | Entry::NamedPipe(n)
            | Entry::VolatileFile(n)
            | Entry::ExclusiveDir(n) => Some(&n.class),
            Entry::InfoFile(_) => None,
            Entry::HardLink(l) | Entry::SymLink(l) => Some(&l.class),
        }
    }

    /// Permission bits, absent for `i` and link entries.
    pub fn mode(&self) -> Option<u32> {
        match &self.entry {
            Entry::BlockDevice(d) | Entry::CharDevice(d) => Some(d.mode),
            Entry::Directory(n)
            | Entry::EditableFile(n)
            | Entry::RegularFile(n)
            | Entry::NamedPipe(n)
            | Entry::VolatileFile(n)
            | Entry::ExclusiveDir(n) => Some(n.mode),
            Entry::InfoFile(_) | Entry::HardLink(_) | Entry::SymLink(_) => None,
        }
    }

    /// Owning user name, absent for `i` and link entries.
    pub fn owner(&self) -> Option<&str> {
        match &self.entry {
            Entry::BlockDevice(d) | Entry::CharDevice(d) => Some(&d.owner),
            Entry::Directory(n)
            | Entry::EditableFile(n)
            | Entry::RegularFile(n)
            | Entry::NamedPipe(n)
            | Entry::VolatileFile(n)
            | Entry::ExclusiveDir(n) => Some(&n.owner),
            Entry::InfoFile(_) | Entry::HardLink(_) | Entry::SymLink(_) => None,
        }
    }

    /// Owning group name, absent for `i` and link entries.
    pub fn group(&self) -> Option<&str> {
        match &self.entry {
            Entry::BlockDevice(d) | Entry::CharDevice(d) => Some(&d.group),
            Entry::Directory(n)
            | Entry::EditableFile(n)
            | Entry::RegularFile(n)
            | Entry::NamedPipe(n)
            | Entry::VolatileFile(n)
            | Entry::ExclusiveDir(n) => Some(&n.group),
            Entry::InfoFile(_) | Entry::HardLink(_) | Entry::SymLink(_) => None,
        }
    }

    /// Major device number, present only for `b` and `c` entries.
    pub fn major(&self) -> Option<u32> {
        match &self.entry {
            Entry::BlockDevice(d) | Entry::CharDevice(d) => Some(d.major),
            _ => None,
        }
    }

    /// Minor device number, present only for `b` and `c` entries.
    pub fn minor(&self) -> Option<u32> {
        match &self.entry {
            Entry::BlockDevice(d) | Entry::CharDevice(d) => Some(d.minor),
            _ => None,
        }
    }
}

impl Entry {
    /// The single-character file type tag of this entry. Match arms mirror
    /// the schema table in [`layout_for`].
    pub fn tag(&self) -> char {
        match self {
            Entry::BlockDevice(_) => 'b',
            Entry::CharDevice(_) => 'c',
            Entry::Directory(_) => 'd',
            Entry::EditableFile(_) => 'e',
            Entry::RegularFile(_) => 'f',
            Entry::InfoFile(_) => 'i',
            Entry::HardLink(_) => 'l',
            Entry::NamedPipe(_) => 'p',
            Entry::SymLink(_) => 's',
            Entry::VolatileFile(_) => 'v',
            Entry::ExclusiveDir(_) => 'x',
        }
    }

    /// Parse the field portion of a line (everything after `"<tag> "`) for
    /// the given tag. `line` is the whole input, carried for diagnostics.
    fn from_fields(tag: char, fields: &str, line: &str) -> Result<Entry, ProtoError> {
        let malformed = || ProtoError::MalformedLine(line.to_string());
        let layout = layout_for(tag).ok_or_else(|| ProtoError::UnknownFileKind(tag.to_string()))?;
        match layout {
            Layout::Device => {
                let caps = device_pattern().captures(fields).ok_or_else(malformed)?;
                let dev = DeviceEntry {
                    class: caps[1].to_string(),
                    path: caps[2].to_string(),
                    major: caps[3].parse().map_err(|_| malformed())?,
                    minor: caps[4].parse().map_err(|_| malformed())?,
                    mode: u32::from_str_radix(&caps[5], 8).map_err(|_| malformed())?,
                    owner: caps[6].to_string(),
                    group: caps[7].to_string(),
                };
                Ok(match tag {
                    'b' => Entry::BlockDevice(dev),
                    _ => Entry::CharDevice(dev),
                })
            }
            Layout::Node => {
                let caps = node_pattern().captures(fields).ok_or_else(malformed)?;
                let node = NodeEntry {
                    class: caps[1].to_string(),
                    path: caps[2].to_string(),
                    mode: u32::from_str_radix(&caps[3], 8).map_err(|_| malformed())?,
                    owner: caps[4].to_string(),
                    group: caps[5].to_string(),
                };
                Ok(match tag {
                    'd' => Entry::Directory(node),
                    'e' => Entry::EditableFile(node),
                    'f' => Entry::RegularFile(node),
                    'p' => Entry::NamedPipe(node),
                    'v' => Entry::VolatileFile(node),
                    _ => Entry::ExclusiveDir(node),
                })
            }
            Layout::Info => {
                let caps = info_pattern().captures(fields).ok_or_else(malformed)?;
                Ok(Entry::InfoFile(InfoEntry {
                    path: caps[1].to_string(),
                }))
            }
            Layout::Link => {
                let caps = link_pattern().captures(fields).ok_or_else(malformed)?;
                let link = LinkEntry {
                    class: caps[1].to_string(),
                    path: caps[2].to_string(),
                };
                Ok(match tag {
                    'l' => Entry::HardLink(link),
                    _ => Entry::SymLink(link),
                })
            }
        }
    }
}

impl fmt::Display for Record {
    /// Emit the record as one prototype line: optional part, tag, then the
    /// tag's fields in wire order. Mode is always four zero-padded octal
    /// digits, device numbers are bare decimal. No trailing whitespace and no
    /// line terminator.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(part) = &self.part {
            write!(f, "{part} ")?;
        }
        write!(f, "{}", self.entry.tag())?;
        match &self.entry {
            Entry::BlockDevice(d) | Entry::CharDevice(d) => write!(
                f,
                " {} {} {} {} {:04o} {} {}",
                d.class, d.path, d.major, d.minor, d.mode, d.owner, d.group
            ),
            Entry::Directory(n)
            | Entry::EditableFile(n)
            | Entry::RegularFile(n)
            | Entry::NamedPipe(n)
            | Entry::VolatileFile(n)
            | Entry::ExclusiveDir(n) => write!(
                f,
                " {} {} {:04o} {} {}",
                n.class, n.path, n.mode, n.owner, n.group
            ),
            Entry::InfoFile(i) => write!(f, " {}", i.path),
            Entry::HardLink(l) | Entry::SymLink(l) => write!(f, " {} {}", l.class, l.path),
        }
    }
}

impl FromStr for Record {
    type Err = ProtoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Record::from_line(s)
    }
}
