//! End-to-end pipeline tests exercising the public `Archive`/`safe_extract`
//! surface, as opposed to the attack-category suite under `tests/security`.

#![allow(clippy::unwrap_used)]

use exarch_core::test_utils::TarTestBuilder;
use exarch_core::{safe_extract, Archive, ArchiveBuilder, SecurityConfig};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

fn write_archive(temp: &TempDir, name: &str, data: Vec<u8>) -> std::path::PathBuf {
    let path = temp.path().join(name);
    std::fs::write(&path, data).unwrap();
    path
}

#[test]
fn test_extract_all_preserves_directory_structure() {
    let temp = TempDir::new().unwrap();
    let data = TarTestBuilder::new()
        .add_directory("a/")
        .add_directory("a/b/")
        .add_file("a/b/leaf.txt", b"deep content")
        .add_file("root.txt", b"shallow content")
        .build();
    let archive_path = write_archive(&temp, "nested.tar", data);
    let out = temp.path().join("out");

    let archive = Archive::open(&archive_path, SecurityConfig::default()).unwrap();
    let report = archive.extract_all(&out).unwrap();

    assert_eq!(report.files_extracted, 2);
    assert!(out.join("a/b").is_dir());
    assert_eq!(std::fs::read(out.join("a/b/leaf.txt")).unwrap(), b"deep content");
    assert_eq!(std::fs::read(out.join("root.txt")).unwrap(), b"shallow content");
}

#[test]
fn test_extract_member_extracts_only_requested_entry() {
    let temp = TempDir::new().unwrap();
    let data = TarTestBuilder::new()
        .add_file("one.txt", b"one")
        .add_file("two.txt", b"two")
        .build();
    let archive_path = write_archive(&temp, "multi.tar", data);
    let out = temp.path().join("out");

    let archive = Archive::open(&archive_path, SecurityConfig::default()).unwrap();
    let report = archive.extract_member(&out, "two.txt").unwrap();

    assert_eq!(report.files_extracted, 1);
    assert!(!out.join("one.txt").exists());
    assert_eq!(std::fs::read(out.join("two.txt")).unwrap(), b"two");
}

#[test]
fn test_extract_member_missing_name_extracts_nothing_without_error() {
    let temp = TempDir::new().unwrap();
    let data = TarTestBuilder::new().add_file("one.txt", b"one").build();
    let archive_path = write_archive(&temp, "single.tar", data);
    let out = temp.path().join("out");

    let archive = Archive::open(&archive_path, SecurityConfig::default()).unwrap();
    let report = archive.extract_member(&out, "does-not-exist.txt").unwrap();

    assert_eq!(report.files_extracted, 0);
}

#[test]
fn test_path_traversal_rejected_end_to_end() {
    let temp = TempDir::new().unwrap();
    let data = TarTestBuilder::new()
        .add_file("../escape.txt", b"pwned")
        .build();
    let archive_path = write_archive(&temp, "evil.tar", data);
    let out = temp.path().join("out");

    let archive = Archive::open(&archive_path, SecurityConfig::default()).unwrap();
    let result = archive.extract_all(&out);

    assert!(result.is_err());
    assert!(!out.join("escape.txt").exists());
}

#[test]
fn test_file_count_limit_rejected_at_open() {
    let temp = TempDir::new().unwrap();
    let mut builder = TarTestBuilder::new();
    for i in 0..10 {
        builder = builder.add_file(&format!("file{i}.txt"), b"x");
    }
    let data = builder.build();
    let archive_path = write_archive(&temp, "many.tar", data);

    let config = SecurityConfig {
        max_files: 5,
        ..SecurityConfig::default()
    };
    let result = Archive::open(&archive_path, config);
    assert!(result.is_err());
}

#[test]
fn test_security_event_callback_fires_on_rejection() {
    let temp = TempDir::new().unwrap();
    let data = TarTestBuilder::new()
        .add_file("../escape.txt", b"pwned")
        .build();
    let archive_path = write_archive(&temp, "evil.tar", data);
    let out = temp.path().join("out");

    let fired = Arc::new(AtomicUsize::new(0));
    let fired_clone = Arc::clone(&fired);
    let config = SecurityConfig::default().with_security_event_callback(move |_event| {
        fired_clone.fetch_add(1, Ordering::SeqCst);
    });

    let archive = Archive::open(&archive_path, config).unwrap();
    let _ = archive.extract_all(&out);

    assert_eq!(fired.load(Ordering::SeqCst), 1);
}

#[test]
fn test_archive_builder_end_to_end_with_member_filter() {
    let temp = TempDir::new().unwrap();
    let data = TarTestBuilder::new()
        .add_file("keep.txt", b"keep me")
        .add_file("drop.txt", b"drop me")
        .build();
    let archive_path = write_archive(&temp, "filtered.tar", data);
    let out = temp.path().join("out");

    let report = ArchiveBuilder::new()
        .archive(&archive_path)
        .output_dir(&out)
        .member("keep.txt")
        .config(SecurityConfig::default())
        .extract()
        .unwrap();

    assert_eq!(report.files_extracted, 1);
    assert!(out.join("keep.txt").exists());
    assert!(!out.join("drop.txt").exists());
}

#[test]
fn test_safe_extract_convenience_function() {
    let temp = TempDir::new().unwrap();
    let data = TarTestBuilder::new().add_file("only.txt", b"content").build();
    let archive_path = write_archive(&temp, "simple.tar", data);
    let out = temp.path().join("out");

    let report = safe_extract(&archive_path, &out, &SecurityConfig::default()).unwrap();

    assert_eq!(report.files_extracted, 1);
    assert_eq!(std::fs::read(out.join("only.txt")).unwrap(), b"content");
}

#[test]
fn test_member_names_lists_without_extracting() {
    let temp = TempDir::new().unwrap();
    let data = TarTestBuilder::new()
        .add_directory("docs/")
        .add_file("docs/a.md", b"a")
        .add_file("docs/b.md", b"b")
        .build();
    let archive_path = write_archive(&temp, "listable.tar", data);

    let archive = Archive::open(&archive_path, SecurityConfig::default()).unwrap();
    let names = archive.member_names().unwrap();

    assert!(names.contains(&"docs/a.md".to_string()));
    assert!(names.contains(&"docs/b.md".to_string()));
}

#[cfg(unix)]
#[test]
fn test_preserve_ownership_applies_archived_uid_gid_when_root() {
    use std::os::unix::fs::MetadataExt;

    // chown to an arbitrary uid/gid only succeeds for root; everywhere
    // else `apply_ownership` tolerates the EPERM and leaves the file
    // owned by the current process, so this positive-path assertion only
    // holds when the test itself is running as root.
    let is_root = unsafe { libc::geteuid() == 0 };
    if !is_root {
        return;
    }

    let temp = TempDir::new().unwrap();
    let archived_uid = 4242u64;
    let archived_gid = 4343u64;
    let data = TarTestBuilder::new()
        .add_file_with_owner("owned.txt", b"content", archived_uid, archived_gid)
        .build();
    let archive_path = write_archive(&temp, "owned.tar", data);
    let out = temp.path().join("out");

    let config = SecurityConfig {
        preserve_ownership: true,
        ..SecurityConfig::default()
    };
    let archive = Archive::open(&archive_path, config).unwrap();
    archive.extract_all(&out).unwrap();

    let meta = std::fs::metadata(out.join("owned.txt")).unwrap();
    assert_eq!(u64::from(meta.uid()), archived_uid);
    assert_eq!(u64::from(meta.gid()), archived_gid);
}

#[cfg(unix)]
#[test]
fn test_preserve_ownership_false_uses_current_process_owner() {
    use std::os::unix::fs::MetadataExt;

    let temp = TempDir::new().unwrap();
    let data = TarTestBuilder::new()
        .add_file_with_owner("owned.txt", b"content", 4242, 4343)
        .build();
    let archive_path = write_archive(&temp, "owned.tar", data);
    let out = temp.path().join("out");

    let archive = Archive::open(&archive_path, SecurityConfig::default()).unwrap();
    archive.extract_all(&out).unwrap();

    let meta = std::fs::metadata(out.join("owned.txt")).unwrap();
    let expected_uid = unsafe { libc::geteuid() };
    let expected_gid = unsafe { libc::getegid() };
    assert_eq!(meta.uid(), expected_uid);
    assert_eq!(meta.gid(), expected_gid);
}

#[test]
fn test_reopening_same_archive_is_independent() {
    let temp = TempDir::new().unwrap();
    let data = TarTestBuilder::new().add_file("shared.txt", b"content").build();
    let archive_path = write_archive(&temp, "shared.tar", data);
    let out_a = temp.path().join("out_a");
    let out_b = temp.path().join("out_b");

    let first = Archive::open(&archive_path, SecurityConfig::default()).unwrap();
    let second = Archive::open(&archive_path, SecurityConfig::default()).unwrap();

    assert_eq!(first.archive_hash(), second.archive_hash());
    first.extract_all(&out_a).unwrap();
    second.extract_all(&out_b).unwrap();
    assert!(out_a.join("shared.txt").exists());
    assert!(out_b.join("shared.txt").exists());
}
