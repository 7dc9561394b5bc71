//! TAR extraction pipeline: preflight, per-member classification and
//! sandboxing, and streamed writes.
//!
//! The pipeline runs in two passes over the archive. [`Preflight::run`]
//! opens the file once to hash it, measure its compressed size, and count
//! members without materialising any content. [`extract`] then reopens a
//! fresh decoder and performs the real per-member walk: classify the
//! header (`Guard`), resolve and verify its destination path (`Sandbox`),
//! and stream its content under the size/ratio monitor (`Streamer`).
//! Symlinks are queued and created only after every regular file and
//! hardlink has landed, closing the window between path validation and
//! link creation that a TOCTOU race would otherwise open.

use std::fs::{self, File};
use std::io::{BufWriter, Read};
use std::path::{Path, PathBuf};
use std::time::Instant;

use sha2::{Digest, Sha256};
use tar::{Archive, Entry as TarEntry, EntryType as TarEntryType};
use tracing::{debug, warn};

use crate::config::SecurityConfig;
use crate::copy::{copy_with_quota, CopyBuffer};
use crate::events::SecurityEvent;
use crate::security::{
    classify_entry, clamp_timestamp, pre_scan_file_count, sanitise_mode, validate_filename,
    validate_pax_path, verify_hardlink_target, Disposition, ExtractedSet, ExtractionMonitor,
};
use crate::types::{DestDir, SafePath};
use crate::{ExtractionError, ExtractionReport, Result};

use super::compression::CompressionCodec;
use super::detect::sniff_codec;

/// Results of the preflight pass: everything the real extraction pass
/// needs to know before it touches a single byte of member content.
#[derive(Debug, Clone)]
pub struct Preflight {
    path: PathBuf,
    codec: Option<CompressionCodec>,
    /// On-disk (compressed) size of the archive — the ratio check's
    /// denominator.
    pub archive_size: u64,
    /// First 16 hex characters of the SHA-256 of the whole compressed
    /// archive, used to correlate [`SecurityEvent`]s without leaking
    /// member names.
    pub archive_hash: String,
    /// Number of members counted during the header-only pre-scan.
    pub member_count: usize,
}

impl Preflight {
    /// Runs the preflight pass over the archive at `path`: captures its
    /// size, hashes it, sniffs its compression codec, and counts members.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractionError::Io`] if the file cannot be opened or
    /// read, [`ExtractionError::MalformedArchive`] if the TAR structure
    /// is unreadable, or [`ExtractionError::FileCountExceeded`] if the
    /// member count exceeds `config.max_files`.
    pub fn run(path: &Path, config: &SecurityConfig) -> Result<Self> {
        let archive_size = fs::metadata(path)?.len();
        let archive_hash = hash_archive(path)?;
        let codec = sniff_codec(&mut File::open(path)?)?;

        let mut reader = open_decoder(path, codec)?;
        let mut archive = Archive::new(&mut reader);
        let member_count = pre_scan_file_count(&mut archive, config.max_files)?;

        debug!(
            archive_size,
            member_count,
            codec = codec.map_or("none", CompressionCodec::name),
            "preflight complete"
        );

        Ok(Self {
            path: path.to_path_buf(),
            codec,
            archive_size,
            archive_hash,
            member_count,
        })
    }
}

fn hash_archive(path: &Path) -> Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut chunk = [0u8; 64 * 1024];
    loop {
        let n = file.read(&mut chunk)?;
        if n == 0 {
            break;
        }
        hasher.update(&chunk[..n]);
    }
    let digest = hasher.finalize();
    Ok(hex::encode(digest)[..16].to_string())
}

fn open_decoder(path: &Path, codec: Option<CompressionCodec>) -> Result<Box<dyn Read>> {
    let file = File::open(path)?;
    Ok(match codec {
        Some(codec) => codec.wrap(file),
        None => Box::new(file),
    })
}

/// Lists member names without extracting anything.
///
/// # Errors
///
/// Returns [`ExtractionError::MalformedArchive`] if a header cannot be
/// read.
pub fn list_members(preflight: &Preflight) -> Result<Vec<String>> {
    let mut reader = open_decoder(&preflight.path, preflight.codec)?;
    let mut archive = Archive::new(&mut reader);
    let entries = archive
        .entries()
        .map_err(|e| ExtractionError::malformed(e.to_string()))?;

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| ExtractionError::malformed(e.to_string()))?;
        let name = entry
            .path()
            .map_err(|e| ExtractionError::malformed(e.to_string()))?
            .to_string_lossy()
            .into_owned();
        names.push(name);
    }
    Ok(names)
}

/// Runs the full Guard → Sandbox → Streamer pipeline, extracting every
/// member when `member_filter` is `None`, or only the member whose raw
/// archive name matches it.
///
/// # Errors
///
/// Returns the first security or I/O error encountered; extraction stops
/// at that member rather than continuing past a rejected entry.
pub fn extract(
    preflight: &Preflight,
    dest: &DestDir,
    config: &SecurityConfig,
    member_filter: Option<&str>,
) -> Result<ExtractionReport> {
    let started = Instant::now();
    let mut report = ExtractionReport::new();

    let result = run_pipeline(preflight, dest, config, member_filter, &mut report);

    if let Err(ref err) = result {
        warn!(archive_hash = %preflight.archive_hash, error = %err, "extraction aborted");
        if let Some(callback) = &config.on_security_event {
            if let Some(event) = SecurityEvent::from_error(err, &preflight.archive_hash) {
                callback(&event);
            }
        }
    }
    result?;

    report.duration = started.elapsed();
    debug!(
        archive_hash = %preflight.archive_hash,
        files = report.files_extracted,
        dirs = report.directories_created,
        symlinks = report.symlinks_created,
        bytes = report.bytes_written,
        "extraction complete"
    );
    Ok(report)
}

struct DeferredDir {
    path: PathBuf,
    mode: u32,
    mtime: i64,
    uid: u32,
    gid: u32,
}

struct DeferredSymlink {
    link: SafePath,
    raw_target: String,
}

fn run_pipeline(
    preflight: &Preflight,
    dest: &DestDir,
    config: &SecurityConfig,
    member_filter: Option<&str>,
    report: &mut ExtractionReport,
) -> Result<()> {
    let mut reader = open_decoder(&preflight.path, preflight.codec)?;
    let mut archive = Archive::new(&mut reader);

    let mut monitor = ExtractionMonitor::new(preflight.archive_size, config);
    let mut extracted = ExtractedSet::new();
    let mut deferred_dirs: Vec<DeferredDir> = Vec::new();
    let mut deferred_symlinks: Vec<DeferredSymlink> = Vec::new();
    let mut buffer = CopyBuffer::new();

    let entries = archive
        .entries()
        .map_err(|e| ExtractionError::malformed(e.to_string()))?;

    for entry in entries {
        let mut entry = entry.map_err(|e| ExtractionError::malformed(e.to_string()))?;
        process_entry(
            &mut entry,
            dest,
            config,
            member_filter,
            &mut monitor,
            &mut extracted,
            &mut deferred_dirs,
            &mut deferred_symlinks,
            report,
            &mut buffer,
        )?;
    }

    for deferred in deferred_symlinks {
        create_deferred_symlink(deferred, dest, &mut extracted, report)?;
    }

    for dir in deferred_dirs {
        apply_dir_metadata(&dir, config)?;
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn process_entry<R: Read>(
    entry: &mut TarEntry<'_, R>,
    dest: &DestDir,
    config: &SecurityConfig,
    member_filter: Option<&str>,
    monitor: &mut ExtractionMonitor,
    extracted: &mut ExtractedSet,
    deferred_dirs: &mut Vec<DeferredDir>,
    deferred_symlinks: &mut Vec<DeferredSymlink>,
    report: &mut ExtractionReport,
    buffer: &mut CopyBuffer,
) -> Result<()> {
    let raw_name = entry
        .path()
        .map_err(|e| ExtractionError::malformed(e.to_string()))?
        .to_string_lossy()
        .into_owned();

    if let Some(wanted) = member_filter {
        if raw_name != wanted {
            return Ok(());
        }
    }

    validate_filename(&raw_name)?;
    validate_pax_override(entry)?;

    match classify_entry(entry, config)? {
        Disposition::Skip => Ok(()),
        Disposition::DeferSymlink => {
            let link = SafePath::resolve(&raw_name, dest)?;
            let raw_target = entry
                .link_name()
                .map_err(|e| ExtractionError::malformed(e.to_string()))?
                .ok_or_else(|| ExtractionError::unsafe_entry("symlink entry missing link name"))?
                .to_string_lossy()
                .into_owned();
            deferred_symlinks.push(DeferredSymlink { link, raw_target });
            Ok(())
        }
        Disposition::Extract => match entry.header().entry_type() {
            TarEntryType::Directory => {
                extract_directory(entry, &raw_name, dest, deferred_dirs, report)
            }
            TarEntryType::Link => extract_hardlink(entry, &raw_name, dest, extracted, report),
            _ => extract_file(entry, &raw_name, dest, config, monitor, extracted, report, buffer),
        },
    }
}

fn validate_pax_override<R: Read>(entry: &TarEntry<'_, R>) -> Result<()> {
    let Some(pax) = entry
        .pax_extensions()
        .map_err(|e| ExtractionError::malformed(e.to_string()))?
    else {
        return Ok(());
    };
    for field in pax {
        let field = field.map_err(|e| ExtractionError::malformed(e.to_string()))?;
        if field.key() == Ok("path") {
            let value = field
                .value()
                .map_err(|e| ExtractionError::malformed(e.to_string()))?;
            validate_pax_path(value)?;
        }
    }
    Ok(())
}

fn extract_directory<R: Read>(
    entry: &mut TarEntry<'_, R>,
    raw_name: &str,
    dest: &DestDir,
    deferred_dirs: &mut Vec<DeferredDir>,
    report: &mut ExtractionReport,
) -> Result<()> {
    let safe = SafePath::resolve(raw_name, dest)?;
    let path = dest.join(&safe);
    fs::create_dir_all(&path)?;

    let header = entry.header();
    deferred_dirs.push(DeferredDir {
        path,
        mode: header.mode().unwrap_or(0o755),
        mtime: header.mtime().unwrap_or(0) as i64,
        uid: header.uid().unwrap_or(0) as u32,
        gid: header.gid().unwrap_or(0) as u32,
    });
    report.directories_created += 1;
    Ok(())
}

fn extract_hardlink<R: Read>(
    entry: &mut TarEntry<'_, R>,
    raw_name: &str,
    dest: &DestDir,
    extracted: &mut ExtractedSet,
    report: &mut ExtractionReport,
) -> Result<()> {
    let link_safe = SafePath::resolve(raw_name, dest)?;
    let raw_target = entry
        .link_name()
        .map_err(|e| ExtractionError::malformed(e.to_string()))?
        .ok_or_else(|| ExtractionError::unsafe_entry("hardlink entry missing link name"))?
        .to_string_lossy()
        .into_owned();
    let target_safe = SafePath::resolve(&raw_target, dest)?;
    verify_hardlink_target(&target_safe, dest, extracted)?;

    let link_path = dest.join(&link_safe);
    if let Some(parent) = link_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::hard_link(dest.join(&target_safe), &link_path)?;

    extracted.insert(link_safe.into_path_buf());
    report.files_extracted += 1;
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn extract_file<R: Read>(
    entry: &mut TarEntry<'_, R>,
    raw_name: &str,
    dest: &DestDir,
    config: &SecurityConfig,
    monitor: &mut ExtractionMonitor,
    extracted: &mut ExtractedSet,
    report: &mut ExtractionReport,
    buffer: &mut CopyBuffer,
) -> Result<()> {
    let safe = SafePath::resolve(raw_name, dest)?;
    let final_path = dest.join(&safe);
    if let Some(parent) = final_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let header = entry.header();
    let mode = sanitise_mode(header.mode().unwrap_or(0o644), config);
    let mtime = clamp_timestamp(header.mtime().unwrap_or(0) as i64, config);
    let uid = header.uid().unwrap_or(0) as u32;
    let gid = header.gid().unwrap_or(0) as u32;

    monitor.reset_member();

    let tmp_path = temp_sibling_path(&final_path);
    let written = {
        let tmp_file = File::create(&tmp_path)?;
        let mut writer = BufWriter::new(tmp_file);
        let written = copy_with_quota(entry, &mut writer, buffer, |n| monitor.account(n))?;
        std::io::Write::flush(&mut writer)?;
        written
    };

    apply_file_metadata(&tmp_path, mode, mtime, uid, gid, config)?;
    fs::rename(&tmp_path, &final_path)?;

    extracted.insert(safe.into_path_buf());
    report.files_extracted += 1;
    report.bytes_written += written;
    Ok(())
}

fn temp_sibling_path(final_path: &Path) -> PathBuf {
    let file_name = final_path
        .file_name()
        .map_or_else(|| "entry".into(), |n| n.to_string_lossy().into_owned());
    let suffix: u32 = std::process::id();
    final_path.with_file_name(format!(".safetar_tmp_{suffix}_{file_name}"))
}

#[allow(clippy::too_many_arguments)]
fn apply_file_metadata(
    path: &Path,
    mode: u32,
    mtime: u64,
    uid: u32,
    gid: u32,
    config: &SecurityConfig,
) -> Result<()> {
    apply_permissions(path, mode)?;
    apply_mtime(path, mtime)?;
    apply_ownership(path, uid, gid, config)?;
    Ok(())
}

fn apply_dir_metadata(dir: &DeferredDir, config: &SecurityConfig) -> Result<()> {
    let mode = sanitise_mode(dir.mode, config);
    let mtime = clamp_timestamp(dir.mtime, config);
    apply_permissions(&dir.path, mode)?;
    apply_mtime(&dir.path, mtime)?;
    apply_ownership(&dir.path, dir.uid, dir.gid, config)?;
    Ok(())
}

fn create_deferred_symlink(
    deferred: DeferredSymlink,
    dest: &DestDir,
    extracted: &mut ExtractedSet,
    report: &mut ExtractionReport,
) -> Result<()> {
    let link_path = dest.join(&deferred.link);
    if let Some(parent) = link_path.parent() {
        fs::create_dir_all(parent)?;
    }

    #[cfg(unix)]
    {
        crate::security::verify_symlink_chain(&link_path, &deferred.raw_target, dest)?;
        std::os::unix::fs::symlink(&deferred.raw_target, &link_path)?;
        extracted.insert(deferred.link.into_path_buf());
        report.symlinks_created += 1;
        Ok(())
    }

    #[cfg(not(unix))]
    {
        let _ = (link_path, extracted, report);
        Err(ExtractionError::InvalidOperation(
            "symlink extraction requires a unix target platform".into(),
        ))
    }
}

#[cfg(unix)]
fn apply_permissions(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode))?;
    Ok(())
}

#[cfg(not(unix))]
fn apply_permissions(_path: &Path, _mode: u32) -> Result<()> {
    Ok(())
}

fn apply_mtime(path: &Path, mtime: u64) -> Result<()> {
    let time = filetime_from_unix(mtime);
    set_file_mtime(path, time)
}

#[cfg(unix)]
fn filetime_from_unix(secs: u64) -> std::time::SystemTime {
    std::time::UNIX_EPOCH + std::time::Duration::from_secs(secs)
}

#[cfg(not(unix))]
fn filetime_from_unix(secs: u64) -> std::time::SystemTime {
    std::time::UNIX_EPOCH + std::time::Duration::from_secs(secs)
}

fn set_file_mtime(path: &Path, time: std::time::SystemTime) -> Result<()> {
    let file = File::options().write(true).open(path).or_else(|_| File::open(path))?;
    file.set_modified(time)?;
    Ok(())
}

#[cfg(unix)]
fn apply_ownership(path: &Path, archived_uid: u32, archived_gid: u32, config: &SecurityConfig) -> Result<()> {
    use std::ffi::CString;
    use std::os::unix::ffi::OsStrExt;

    let (uid, gid) = crate::security::sanitise_ownership(archived_uid, archived_gid, config);
    let cpath = CString::new(path.as_os_str().as_bytes())
        .map_err(|_| ExtractionError::unsafe_entry("path contains NUL byte"))?;

    // SAFETY: `cpath` is a valid NUL-terminated C string for the duration
    // of the call; `chown` does not retain the pointer afterwards.
    #[allow(unsafe_code)]
    let result = unsafe { libc::chown(cpath.as_ptr(), uid, gid) };
    if result != 0 {
        // Non-root processes cannot chown to an arbitrary uid/gid (this is
        // the expected outcome when `preserve_ownership` asks for an owner
        // the current process isn't allowed to assume); tolerate a
        // permission error rather than aborting the whole extraction over
        // an ownership no-op.
        return Ok(());
    }
    Ok(())
}

#[cfg(not(unix))]
fn apply_ownership(_path: &Path, _archived_uid: u32, _archived_gid: u32, _config: &SecurityConfig) -> Result<()> {
    Ok(())
}
