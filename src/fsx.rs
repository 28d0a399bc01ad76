//! Platform filesystem metadata provider.
//!
//! On Unix the [`OsMetadata`] provider answers every
//! [`FileMetadataProvider`] query from `lstat(2)`-level metadata
//! (`std::fs::symlink_metadata`), resolves uid/gid to names through
//! `getpwuid_r(3)`/`getgrgid_r(3)`, and splits `st_rdev` into major/minor
//! device numbers. All queries operate on the link itself, never the target.
//!
//! Non-Unix platforms get a stub whose queries fail with
//! `io::ErrorKind::Unsupported`; prototype files describe Unix filesystem
//! semantics, so there is nothing useful to report elsewhere.

use std::io;
use std::path::Path;

use crate::meta::{FileClass, FileMetadataProvider};

/// Metadata provider backed by the running operating system.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsMetadata;

#[cfg(unix)]
mod imp {
    use super::*;
    use std::ffi::CStr;
    use std::fs;
    use std::os::unix::fs::{FileTypeExt, MetadataExt};

    fn lstat(path: &Path) -> io::Result<fs::Metadata> {
        fs::symlink_metadata(path)
    }

    /// Split an `st_rdev` value into (major, minor).
    #[cfg(any(target_os = "linux", target_os = "android"))]
    fn split_dev(rdev: u64) -> (u32, u32) {
        // glibc encoding: twelve low major bits at 8, the rest at 32;
        // eight low minor bits at 0, the rest at 12.
        let major = (((rdev >> 32) & 0xffff_f000) | ((rdev >> 8) & 0x0fff)) as u32;
        let minor = (((rdev >> 12) & 0xffff_ff00) | (rdev & 0x00ff)) as u32;
        (major, minor)
    }

    #[cfg(all(unix, not(any(target_os = "linux", target_os = "android"))))]
    fn split_dev(rdev: u64) -> (u32, u32) {
        (((rdev >> 24) & 0xff) as u32, (rdev & 0x00ff_ffff) as u32)
    }

    /// Resolve a uid to a user name via `getpwuid_r`.
    pub(super) fn user_name(uid: u32) -> io::Result<String> {
        let mut buf = vec![0u8; 1024];
        let mut pwd: libc::passwd = unsafe { std::mem::zeroed() };
        let mut result: *mut libc::passwd = std::ptr::null_mut();
        loop {
            let rc = unsafe {
                libc::getpwuid_r(
                    uid as libc::uid_t,
                    &mut pwd,
                    buf.as_mut_ptr() as *mut libc::c_char,
                    buf.len(),
                    &mut result,
                )
            };
            if rc == libc::ERANGE {
                buf.resize(buf.len() * 2, 0);
                continue;
            }
            if rc != 0 {
                return Err(io::Error::from_raw_os_error(rc));
            }
            break;
        }
        if result.is_null() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no passwd entry for uid {uid}"),
            ));
        }
        let name = unsafe { CStr::from_ptr(pwd.pw_name) };
        Ok(name.to_string_lossy().into_owned())
    }

    /// Resolve a gid to a group name via `getgrgid_r`.
    pub(super) fn group_name(gid: u32) -> io::Result<String> {
        let mut buf = vec![0u8; 1024];
        let mut grp: libc::group = unsafe { std::mem::zeroed() };
        let mut result: *mut libc::group = std::ptr::null_mut();
        loop {
            let rc = unsafe {
                libc::getgrgid_r(
                    gid as libc::gid_t,
                    &mut grp,
                    buf.as_mut_ptr() as *mut libc::c_char,
                    buf.len(),
                    &mut result,
                )
            };
            if rc == libc::ERANGE {
                buf.resize(buf.len() * 2, 0);
                continue;
            }
            if rc != 0 {
                return Err(io::Error::from_raw_os_error(rc));
            }
            break;
        }
        if result.is_null() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no group entry for gid {gid}"),
            ));
        }
        let name = unsafe { CStr::from_ptr(grp.gr_name) };
        Ok(name.to_string_lossy().into_owned())
    }

    impl FileMetadataProvider for OsMetadata {
        fn classify(&self, path: &Path) -> io::Result<FileClass> {
            let ft = lstat(path)?.file_type();
            Ok(if ft.is_symlink() {
                FileClass::Symlink
            } else if ft.is_dir() {
                FileClass::Directory
            } else if ft.is_file() {
                FileClass::Regular
            } else if ft.is_block_device() {
                FileClass::Block
            } else if ft.is_char_device() {
                FileClass::Char
            } else if ft.is_fifo() {
                FileClass::Fifo
            } else {
                // Sockets and anything the format cannot describe.
                FileClass::Unknown
            })
        }

        fn is_symlink(&self, path: &Path) -> io::Result<bool> {
            Ok(lstat(path)?.file_type().is_symlink())
        }

        fn mode(&self, path: &Path) -> io::Result<u32> {
            Ok(lstat(path)?.mode())
        }

        fn owner_name(&self, path: &Path) -> io::Result<String> {
            user_name(lstat(path)?.uid())
        }

        fn group_name(&self, path: &Path) -> io::Result<String> {
            group_name(lstat(path)?.gid())
        }

        fn dev_major(&self, path: &Path) -> io::Result<u32> {
            Ok(split_dev(lstat(path)?.rdev()).0)
        }

        fn dev_minor(&self, path: &Path) -> io::Result<u32> {
            Ok(split_dev(lstat(path)?.rdev()).1)
        }
    }
}

#[cfg(not(unix))]
mod imp {
    use super::*;

    fn unsupported() -> io::Error {
        io::Error::new(
            io::ErrorKind::Unsupported,
            "prototype metadata requires a Unix filesystem",
        )
    }

    impl FileMetadataProvider for OsMetadata {
        fn classify(&self, _path: &Path) -> io::Result<FileClass> {
            Err(unsupported())
        }
        fn is_symlink(&self, _path: &Path) -> io::Result<bool> {
            Err(unsupported())
        }
        fn mode(&self, _path: &Path) -> io::Result<u32> {
            Err(unsupported())
        }
        fn owner_name(&self, _path: &Path) -> io::Result<String> {
            Err(unsupported())
        }
        fn group_name(&self, _path: &Path) -> io::Result<String> {
            Err(unsupported())
        }
        fn dev_major(&self, _path: &Path) -> io::Result<u32> {
            Err(unsupported())
        }
        fn dev_minor(&self, _path: &Path) -> io::Result<u32> {
            Err(unsupported())
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::meta::Defaults;
    use crate::record::Record;
    use std::fs;

    #[test]
    fn classify_and_build_for_a_real_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("answer.txt");
        fs::write(&file, b"42\n").unwrap();

        let meta = OsMetadata;
        assert_eq!(meta.classify(&file).unwrap(), FileClass::Regular);
        assert_eq!(meta.classify(dir.path()).unwrap(), FileClass::Directory);
        assert!(!meta.is_symlink(&file).unwrap());

        let rec = Record::from_path(&meta, &file, None, &Defaults::default()).unwrap();
        assert_eq!(rec.tag(), 'f');
        assert!(rec.is_valid());
    }

    #[test]
    fn classify_symlink_without_following() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("target");
        fs::write(&target, b"x").unwrap();
        let link = dir.path().join("link");
        std::os::unix::fs::symlink(&target, &link).unwrap();

        let meta = OsMetadata;
        assert_eq!(meta.classify(&link).unwrap(), FileClass::Symlink);
        assert!(meta.is_symlink(&link).unwrap());

        let rec = Record::from_path(&meta, &link, None, &Defaults::default()).unwrap();
        assert_eq!(rec.tag(), 's');
        assert_eq!(rec.mode(), None);
    }

    #[test]
    fn missing_path_propagates_io_error() {
        let meta = OsMetadata;
        assert!(meta.classify(Path::new("/no/such/path/here")).is_err());
    }
}
