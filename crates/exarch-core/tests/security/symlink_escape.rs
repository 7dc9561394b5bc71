//! Symlink escape attack integration tests.

#![cfg(unix)]

use exarch_core::test_utils::TarTestBuilder;
use exarch_core::types::DestDir;
use exarch_core::{Archive, SecurityConfig};
use tempfile::TempDir;

fn extract_with(data: Vec<u8>, config: SecurityConfig) -> exarch_core::Result<exarch_core::ExtractionReport> {
    let temp = TempDir::new().unwrap();
    let archive_path = temp.path().join("test.tar");
    std::fs::write(&archive_path, data).unwrap();
    let out_dir = temp.path().join("out");

    let archive = Archive::open(&archive_path, config)?;
    archive.extract_all(&out_dir)
}

#[test]
fn test_symlink_absolute_target_rejected_when_resolved() {
    let data = TarTestBuilder::new()
        .add_symlink("malicious_link", "/etc/passwd")
        .build();
    let result = extract_with(data, SecurityConfig::permissive());
    assert!(result.is_err());
}

#[test]
fn test_symlink_parent_traversal_rejected() {
    let data = TarTestBuilder::new()
        .add_symlink("safe/link", "../../etc/passwd")
        .build();
    let result = extract_with(data, SecurityConfig::permissive());
    assert!(result.is_err());
}

#[test]
fn test_symlink_rejected_by_default_policy() {
    let data = TarTestBuilder::new()
        .add_symlink("link", "target.txt")
        .build();
    let result = extract_with(data, SecurityConfig::default());
    assert!(result.is_err());
}

#[test]
fn test_symlink_internal_relative_target_allowed() {
    let data = TarTestBuilder::new()
        .add_file("bar/target.txt", b"hi")
        .add_symlink("foo/link", "../bar/target.txt")
        .build();
    let report = extract_with(data, SecurityConfig::permissive()).unwrap();
    assert_eq!(report.symlinks_created, 1);
}

#[test]
fn test_symlink_chain_deep_escape_rejected() {
    let data = TarTestBuilder::new()
        .add_symlink("a/b/c/link", "../../../../etc/passwd")
        .build();
    let result = extract_with(data, SecurityConfig::permissive());
    assert!(result.is_err());
}

#[test]
fn test_symlink_same_directory_allowed() {
    let data = TarTestBuilder::new()
        .add_file("target.txt", b"hi")
        .add_symlink("link", "target.txt")
        .build();
    let temp = TempDir::new().unwrap();
    let archive_path = temp.path().join("test.tar");
    std::fs::write(&archive_path, data).unwrap();
    let out_dir = temp.path().join("out");
    let _dest = DestDir::new(out_dir.clone()).unwrap();

    let archive = Archive::open(&archive_path, SecurityConfig::permissive()).unwrap();
    let report = archive.extract_all(&out_dir).unwrap();
    assert_eq!(report.symlinks_created, 1);
    assert_eq!(std::fs::read(out_dir.join("link")).unwrap(), b"hi");
}
