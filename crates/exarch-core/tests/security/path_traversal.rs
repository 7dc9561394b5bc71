//! Path traversal attack integration tests.
//!
//! Exercises real-world archive path-traversal patterns end-to-end
//! through [`Archive`], not just the underlying [`SafePath`] unit.

use exarch_core::test_utils::TarTestBuilder;
use exarch_core::types::DestDir;
use exarch_core::{Archive, SecurityConfig};
use tempfile::TempDir;

fn extract_single(data: Vec<u8>) -> (TempDir, exarch_core::Result<exarch_core::ExtractionReport>) {
    let temp = TempDir::new().unwrap();
    let archive_path = temp.path().join("test.tar");
    std::fs::write(&archive_path, data).unwrap();
    let out_dir = temp.path().join("out");

    let archive = Archive::open(&archive_path, SecurityConfig::default()).unwrap();
    let result = archive.extract_all(&out_dir);
    (temp, result)
}

#[test]
fn test_cve_style_dotdot_traversal() {
    for raw in [
        "../etc/passwd",
        "../../etc/passwd",
        "foo/../../etc/passwd",
        "foo/../../../etc/passwd",
    ] {
        let data = TarTestBuilder::new().add_file(raw, b"pwned").build();
        let (_temp, result) = extract_single(data);
        assert!(result.is_err(), "path should be rejected: {raw}");
    }
}

#[test]
fn test_absolute_path_rejected() {
    #[cfg(unix)]
    let paths = ["/etc/passwd", "/tmp/malicious"];
    #[cfg(windows)]
    let paths = ["C:/Windows/System32", "C:/temp/malicious"];

    for raw in paths {
        let data = TarTestBuilder::new().add_file(raw, b"pwned").build();
        let (_temp, result) = extract_single(data);
        assert!(result.is_err(), "absolute path should be rejected: {raw}");
    }
}

#[cfg(unix)]
#[test]
fn test_null_byte_in_name_rejected() {
    use exarch_core::security::validate_filename;

    let result = validate_filename("file\0.txt");
    assert!(result.is_err());
}

#[test]
fn test_overlong_name_rejected() {
    use exarch_core::security::validate_filename;

    let long = "a".repeat(5000);
    assert!(validate_filename(&long).is_err());
}

#[test]
fn test_safe_paths_extracted() {
    let data = TarTestBuilder::new()
        .add_file("README.md", b"hi")
        .add_file("src/main.rs", b"fn main() {}")
        .add_file("foo/bar/baz.txt", b"nested")
        .build();

    let temp = TempDir::new().unwrap();
    let archive_path = temp.path().join("test.tar");
    std::fs::write(&archive_path, data).unwrap();
    let out_dir = temp.path().join("out");
    let dest = DestDir::new(out_dir.clone()).unwrap();

    let archive = Archive::open(&archive_path, SecurityConfig::default()).unwrap();
    let report = archive.extract_all(dest.as_path()).unwrap();

    assert_eq!(report.files_extracted, 3);
    assert!(out_dir.join("foo/bar/baz.txt").exists());
}
