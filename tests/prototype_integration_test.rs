use pkgproto::record::{Entry, Record};
use pkgproto::ProtoError;

/// A realistic prototype file: every supported file type, a part-prefixed
/// entry, comments and blank lines as they appear in the wild.
const PROTOTYPE: &str = "\
# Copyright notice lives up here.
i pkginfo
i checkinstall
d none /opt/MYtool 0755 root bin
d none /opt/MYtool/bin 0755 root bin
f none /opt/MYtool/bin/run 0555 root bin
e build /etc/MYtool.conf 0644 root sys
v none /var/log/MYtool.log 0644 root sys
x none /var/spool/MYtool 0700 daemon daemon
p none /var/run/MYtool.pipe 0600 daemon daemon
l none /opt/MYtool/bin/run2=/opt/MYtool/bin/run
s none /opt/MYtool/latest=./bin/run
b none /dev/dsk/c0t0d0s0 32 0 0600 root sys
c none /dev/null 13 2 0666 root sys

2 f none /opt/MYtool/share/data 0444 root bin
";

fn entry_lines() -> impl Iterator<Item = &'static str> {
    PROTOTYPE
        .lines()
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
}

#[test]
fn whole_file_round_trips_line_for_line() {
    let mut parsed = 0;
    for line in entry_lines() {
        let record = Record::from_line(line)
            .unwrap_or_else(|e| panic!("line {line:?} failed to parse: {e}"));
        assert_eq!(record.to_string(), line, "line {line:?} did not round trip");
        assert!(record.is_valid());
        parsed += 1;
    }
    assert_eq!(parsed, 14);
}

#[test]
fn parsed_records_respect_their_field_schema() {
    for line in entry_lines() {
        let record = Record::from_line(line).unwrap();
        match record.tag() {
            'b' | 'c' => {
                assert!(record.major().is_some() && record.minor().is_some());
                assert!(record.mode().is_some() && record.owner().is_some());
            }
            'i' => {
                assert_eq!(record.install_class(), None);
                assert_eq!(record.mode(), None);
                assert_eq!(record.owner(), None);
            }
            'l' | 's' => {
                assert!(record.install_class().is_some());
                assert_eq!(record.mode(), None);
                assert_eq!(record.major(), None);
            }
            _ => {
                assert!(record.mode().is_some() && record.group().is_some());
                assert_eq!(record.major(), None);
            }
        }
    }
}

#[test]
fn part_prefixed_entry_keeps_its_part() {
    let record = Record::from_line("2 f none /opt/MYtool/share/data 0444 root bin").unwrap();
    assert_eq!(record.part.as_deref(), Some("2"));
    assert!(matches!(record.entry, Entry::RegularFile(_)));
}

#[test]
fn reparse_equality_for_every_entry() {
    for line in entry_lines() {
        let record = Record::from_line(line).unwrap();
        let reparsed = Record::from_line(&record.to_string()).unwrap();
        assert_eq!(reparsed, record);
    }
}

#[test]
fn rejected_lines_keep_their_error_class() {
    for (line, want_directive) in [
        ("!search /usr /opt", true),
        ("! reset", true),
        ("q none /x 0644 root sys", false),
        ("default 0644 root sys", false),
    ] {
        match Record::from_line(line).unwrap_err() {
            ProtoError::UnsupportedDirective(_) => assert!(want_directive, "{line:?}"),
            ProtoError::UnknownFileKind(_) => assert!(!want_directive, "{line:?}"),
            other => panic!("unexpected error for {line:?}: {other}"),
        }
    }
}

#[cfg(unix)]
mod generated {
    use pkgproto::fsx::OsMetadata;
    use pkgproto::meta::Defaults;
    use pkgproto::record::Record;
    use pkgproto::scan::scan_paths;
    use std::fs;

    /// Full cycle: scan a tree, format every record, re-parse the output.
    #[test]
    fn generated_entries_parse_back_identically() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("etc")).unwrap();
        fs::write(dir.path().join("etc/tool.conf"), "key=value\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "hi\n").unwrap();
        std::os::unix::fs::symlink("notes.txt", dir.path().join("link")).unwrap();

        let records = scan_paths(
            &OsMetadata,
            &[dir.path().to_path_buf()],
            true,
            &Defaults::default(),
        )
        .unwrap();
        assert_eq!(records.len(), 5);

        for record in &records {
            let line = record.to_string();
            let reparsed = Record::from_line(&line).unwrap();
            assert_eq!(&reparsed, record, "line {line:?}");
        }

        assert!(records.iter().any(|r| r.tag() == 's'));
    }
}
