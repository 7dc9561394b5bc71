//! Hardlink attack integration tests.

use exarch_core::test_utils::TarTestBuilder;
use exarch_core::{Archive, SecurityConfig};
use tempfile::TempDir;

fn extract(data: Vec<u8>) -> exarch_core::Result<exarch_core::ExtractionReport> {
    let temp = TempDir::new().unwrap();
    let archive_path = temp.path().join("test.tar");
    std::fs::write(&archive_path, data).unwrap();
    let out_dir = temp.path().join("out");

    let archive = Archive::open(&archive_path, SecurityConfig::default())?;
    archive.extract_all(&out_dir)
}

#[test]
fn test_hardlink_to_unextracted_target_rejected() {
    let data = TarTestBuilder::new()
        .add_hardlink("link", "never_extracted.txt")
        .build();
    let result = extract(data);
    assert!(result.is_err());
}

#[test]
fn test_hardlink_forward_reference_rejected() {
    let data = TarTestBuilder::new()
        .add_hardlink("link", "later.txt")
        .add_file("later.txt", b"content")
        .build();
    let result = extract(data);
    assert!(result.is_err());
}

#[test]
fn test_hardlink_to_absolute_target_rejected() {
    let data = TarTestBuilder::new()
        .add_hardlink("link", "/etc/passwd")
        .build();
    let result = extract(data);
    assert!(result.is_err());
}

#[test]
fn test_hardlink_to_already_extracted_file_allowed() {
    let data = TarTestBuilder::new()
        .add_file("real.txt", b"content")
        .add_hardlink("link", "real.txt")
        .build();
    let temp = TempDir::new().unwrap();
    let archive_path = temp.path().join("test.tar");
    std::fs::write(&archive_path, data).unwrap();
    let out_dir = temp.path().join("out");

    let archive = Archive::open(&archive_path, SecurityConfig::default()).unwrap();
    let report = archive.extract_all(&out_dir).unwrap();

    assert_eq!(report.files_extracted, 2);
    assert_eq!(std::fs::read(out_dir.join("link")).unwrap(), b"content");
}

#[test]
fn test_hardlink_traversal_in_target_rejected() {
    let data = TarTestBuilder::new()
        .add_file("real.txt", b"content")
        .add_hardlink("link", "../real.txt")
        .build();
    let result = extract(data);
    assert!(result.is_err());
}
