//! # User Settings
//!
//! Optional per-user settings loaded from `config.ini` in the configuration
//! directory. Currently a single knob: extra options appended to every
//! rsync invocation.
//!
//! ```ini
//! [rsync]
//! options = --bwlimit=1000 --one-file-system
//! ```
//!
//! A missing file yields the defaults; options are split on whitespace, so
//! options containing spaces must be passed per-command via `--rsync`
//! instead.

use ini::Ini;
use std::path::Path;

use crate::error::Result;

/// Settings applied to every rsync invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    /// Extra arguments inserted after the base rsync flags.
    pub rsync_options: Vec<String>,
}

impl Settings {
    /// Load settings from `path`. A missing file is not an error and yields
    /// the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("no settings file at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let ini = Ini::load_from_file(path)?;
        Ok(Self::from_ini(&ini))
    }

    fn from_ini(ini: &Ini) -> Self {
        let rsync_options = ini
            .section(Some("rsync"))
            .and_then(|section| section.get("options"))
            .map(|options| options.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default();

        Self { rsync_options }
    }
}
