//! Project path functions - single source of truth for all file paths.
//!
//! ## Environment Variables
//!
//! - `DATA_DIR`: Override the base data directory (default: "data")
//! - `PREP_SRS_CONFIG`: Override the config file path (default: "config.toml")
//!
//! This allows running multiple isolated instances side by side:
//! ```bash
//! PREP_SRS_CONFIG=deploy/center-a.toml PORT=3001 cargo run
//! ```

use std::env;
use std::path::PathBuf;
use std::sync::OnceLock;

/// Lazily initialized data directory from DATA_DIR env var
static DATA_DIR_VALUE: OnceLock<String> = OnceLock::new();

/// Get the base data directory (from DATA_DIR env var or default "data")
pub fn data_dir() -> &'static str {
    DATA_DIR_VALUE.get_or_init(|| env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string()))
}

/// Config file path (from PREP_SRS_CONFIG env var or default "config.toml")
pub fn config_path() -> PathBuf {
    env::var("PREP_SRS_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"))
}

/// Profiling log for one session
pub fn profile_log_path(session_id: &str) -> PathBuf {
    PathBuf::from(data_dir()).join(format!("profile_{}.jsonl", session_id))
}
