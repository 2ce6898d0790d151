//! Default values and file locations for offlinecopy.
//!
//! This module provides centralized default values used across commands,
//! ensuring consistency and avoiding duplication.

use std::env;
use std::path::PathBuf;

/// File name of the targets store inside the configuration directory.
pub const TARGETS_FILENAME: &str = "targets.yaml";

/// File name of the user settings inside the configuration directory.
pub const SETTINGS_FILENAME: &str = "config.ini";

/// Returns the configuration directory.
///
/// Uses the platform-appropriate configuration directory:
/// - Linux: `~/.config/offlinecopy` (XDG Base Directory)
/// - macOS: `~/Library/Application Support/offlinecopy`
/// - Windows: `{FOLDERID_RoamingAppData}\offlinecopy`
///
/// Falls back to `.offlinecopy` in the current directory if the platform
/// configuration directory cannot be determined.
///
/// This can be overridden by the `OFFLINECOPY_CONFIG_DIR` environment
/// variable, which the test suite uses to isolate its state.
pub fn config_root() -> PathBuf {
    if let Some(dir) = env::var_os("OFFLINECOPY_CONFIG_DIR") {
        return PathBuf::from(dir);
    }
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from(".offlinecopy"))
        .join("offlinecopy")
}

/// Path of the targets store.
pub fn targets_path() -> PathBuf {
    config_root().join(TARGETS_FILENAME)
}

/// Path of the user settings file.
pub fn settings_path() -> PathBuf {
    config_root().join(SETTINGS_FILENAME)
}
