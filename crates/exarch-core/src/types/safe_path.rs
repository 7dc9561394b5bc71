//! Validated safe path type for archive extraction.

use std::path::{Path, PathBuf};

use unicode_normalization::UnicodeNormalization;

use crate::ExtractionError;
use crate::Result;

use super::DestDir;

/// A validated path that is safe for extraction.
///
/// `SafePath` represents a member name that has been resolved against a
/// destination directory and proven, by construction, to stay inside it.
///
/// # Security Properties
///
/// - Can ONLY be constructed through [`SafePath::resolve`].
/// - NO `From<&str>`/`From<PathBuf>` implementation.
/// - The wrapped path is always relative and free of `..` segments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SafePath(PathBuf);

impl SafePath {
    /// Resolves a raw archive member name against `dest`, the way
    /// `resolve_member_path` does: normalise, reject absolute paths and
    /// `..` segments outright, then canonicalize-and-contain.
    ///
    /// # Validation steps
    ///
    /// 1. Unicode NFC-normalise the raw name.
    /// 2. Replace backslashes with forward slashes (archives built on
    ///    Windows sometimes embed them as directory separators).
    /// 3. Reject a Unix-absolute (`/...`) or Windows-drive (`C:/...`) path.
    /// 4. Split on `/`; drop empty and `.` segments; reject any `..`
    ///    segment outright — it is never silently absorbed.
    /// 5. Fail if no segments remain (the whole name normalised away).
    /// 6. Reject an embedded NUL byte in the rejoined name.
    /// 7. Compose `dest.join(name)` and canonicalize, tolerating
    ///    `NotFound` (the member doesn't exist yet).
    /// 8. Belt-and-braces: the (possibly non-canonical, `NotFound`) result
    ///    must equal `dest` or start with `dest` plus a separator.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractionError::UnsafeEntry`] for any of the above, or
    /// [`ExtractionError::Io`] if canonicalization fails for a reason
    /// other than the path not existing yet.
    pub fn resolve(raw: &str, dest: &DestDir) -> Result<Self> {
        let normalised: String = raw.nfc().collect();
        let slashed = normalised.replace('\\', "/");

        if is_unix_absolute(&slashed) || is_windows_drive_absolute(&slashed) {
            return Err(ExtractionError::unsafe_entry(format!(
                "absolute path not allowed: {raw}"
            )));
        }

        let mut segments = Vec::new();
        for segment in slashed.split('/') {
            if segment.is_empty() || segment == "." {
                continue;
            }
            if segment == ".." {
                return Err(ExtractionError::unsafe_entry(format!(
                    "path traversal segment in: {raw}"
                )));
            }
            segments.push(segment);
        }

        if segments.is_empty() {
            return Err(ExtractionError::unsafe_entry(format!(
                "path resolves to no segments: {raw}"
            )));
        }

        let joined = segments.join("/");
        if joined.as_bytes().contains(&0) {
            return Err(ExtractionError::unsafe_entry("path contains NUL byte"));
        }

        let resolved = dest.as_path().join(&joined);

        match resolved.canonicalize() {
            Ok(canonical) => {
                if !is_contained(&canonical, dest.as_path()) {
                    return Err(ExtractionError::unsafe_entry(format!(
                        "resolved path escapes destination: {raw}"
                    )));
                }
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                if !is_contained(&resolved, dest.as_path()) {
                    return Err(ExtractionError::unsafe_entry(format!(
                        "resolved path escapes destination: {raw}"
                    )));
                }
            }
            Err(err) => return Err(ExtractionError::Io(err)),
        }

        Ok(Self(PathBuf::from(joined)))
    }

    /// Wraps an already-resolved path without re-running validation.
    ///
    /// Used only for hardlink targets, which are resolved through
    /// [`SafePath::resolve`] and then re-wrapped once confirmed to sit
    /// in the set of already-extracted paths.
    pub(crate) fn new_unchecked(path: PathBuf) -> Self {
        Self(path)
    }

    /// Returns the path as a `&Path`.
    #[inline]
    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Converts into the inner `PathBuf`.
    #[inline]
    #[must_use]
    pub fn into_path_buf(self) -> PathBuf {
        self.0
    }
}

fn is_unix_absolute(path: &str) -> bool {
    path.starts_with('/')
}

fn is_windows_drive_absolute(path: &str) -> bool {
    let bytes = path.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

#[cfg(any(target_os = "macos", target_os = "windows"))]
fn is_contained(path: &Path, base: &Path) -> bool {
    let path_str = path.to_string_lossy().to_lowercase();
    let base_str = base.to_string_lossy().to_lowercase();
    path_str == base_str || path_str.starts_with(&format!("{base_str}{}", std::path::MAIN_SEPARATOR))
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn is_contained(path: &Path, base: &Path) -> bool {
    path == base || path.starts_with(base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_dest() -> (TempDir, DestDir) {
        let temp = TempDir::new().expect("failed to create temp dir");
        let dest = DestDir::new(temp.path().to_path_buf()).expect("failed to create dest");
        (temp, dest)
    }

    #[test]
    fn test_resolve_plain_relative_path() {
        let (_temp, dest) = test_dest();
        let safe = SafePath::resolve("foo/bar.txt", &dest).expect("should resolve");
        assert_eq!(safe.as_path(), Path::new("foo/bar.txt"));
    }

    #[test]
    fn test_resolve_rejects_parent_traversal() {
        let (_temp, dest) = test_dest();
        for raw in ["../etc/passwd", "foo/../../etc/passwd", ".."] {
            let result = SafePath::resolve(raw, &dest);
            assert!(
                matches!(result, Err(ExtractionError::UnsafeEntry { .. })),
                "should reject {raw}"
            );
        }
    }

    #[test]
    fn test_resolve_rejects_absolute_unix() {
        let (_temp, dest) = test_dest();
        let result = SafePath::resolve("/etc/passwd", &dest);
        assert!(matches!(result, Err(ExtractionError::UnsafeEntry { .. })));
    }

    #[test]
    fn test_resolve_rejects_windows_drive_absolute() {
        let (_temp, dest) = test_dest();
        let result = SafePath::resolve("C:/Windows/System32", &dest);
        assert!(matches!(result, Err(ExtractionError::UnsafeEntry { .. })));
    }

    #[test]
    fn test_resolve_normalises_backslashes() {
        let (_temp, dest) = test_dest();
        let safe = SafePath::resolve("foo\\bar\\baz.txt", &dest).expect("should resolve");
        assert_eq!(safe.as_path(), Path::new("foo/bar/baz.txt"));
    }

    #[test]
    fn test_resolve_drops_dot_and_empty_segments() {
        let (_temp, dest) = test_dest();
        let safe = SafePath::resolve("./foo//./bar.txt", &dest).expect("should resolve");
        assert_eq!(safe.as_path(), Path::new("foo/bar.txt"));
    }

    #[test]
    fn test_resolve_rejects_empty_result() {
        let (_temp, dest) = test_dest();
        for raw in [".", "./", "//", ""] {
            let result = SafePath::resolve(raw, &dest);
            assert!(
                matches!(result, Err(ExtractionError::UnsafeEntry { .. })),
                "should reject {raw:?}"
            );
        }
    }

    #[test]
    fn test_resolve_rejects_embedded_nul() {
        let (_temp, dest) = test_dest();
        let result = SafePath::resolve("foo/bar\0.txt", &dest);
        assert!(matches!(result, Err(ExtractionError::UnsafeEntry { .. })));
    }

    #[test]
    #[cfg(unix)]
    fn test_resolve_rejects_symlink_escape_in_parent_chain() {
        use std::os::unix::fs::symlink;

        let temp = TempDir::new().expect("failed to create temp dir");
        let dest = DestDir::new(temp.path().to_path_buf()).expect("failed to create dest");

        let parent_symlink = temp.path().join("escape");
        symlink("/tmp", &parent_symlink).expect("failed to create symlink");

        let result = SafePath::resolve("escape/payload.txt", &dest);
        assert!(matches!(result, Err(ExtractionError::UnsafeEntry { .. })));
    }

    #[test]
    fn test_resolve_unicode_nfc_normalisation() {
        let (_temp, dest) = test_dest();
        // "e" + combining acute accent, decomposed form
        let decomposed = "cafe\u{0301}.txt";
        let safe = SafePath::resolve(decomposed, &dest).expect("should resolve");
        let composed: String = "caf\u{e9}.txt".to_string();
        assert_eq!(safe.as_path(), Path::new(&composed));
    }
}
