//! Security validation modules: Guard (header validation), Sandbox
//! (link verification and metadata sanitisation), and the extraction
//! monitor (aggregate size/ratio accounting).

pub mod guard;
pub mod monitor;
pub mod sandbox;

pub use guard::{classify_entry, is_sparse_entry, validate_filename, validate_pax_path, Disposition};
pub use monitor::ExtractionMonitor;
pub use sandbox::{clamp_timestamp, sanitise_mode, verify_hardlink_target, ExtractedSet};

#[cfg(unix)]
pub use sandbox::{sanitise_ownership, verify_symlink_chain};
