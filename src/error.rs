//! # Error Handling
//!
//! Centralized error type for offlinecopy, built with `thiserror`.
//!
//! The filter-tree core is total and never fails; errors only arise at the
//! edges: loading and saving the targets store, reading settings, validating
//! new targets against existing ones, and running rsync. Each variant
//! carries the context needed for a useful message.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for offlinecopy operations.
#[derive(Error, Debug)]
pub enum Error {
    /// A new target's destination overlaps an already registered one.
    ///
    /// A destination may neither live inside an existing target nor contain
    /// one; include/exclude state would be ambiguous otherwise.
    #[error("destination {} overlaps registered target {}", dest.display(), existing.display())]
    TargetOverlap { dest: PathBuf, existing: PathBuf },

    /// No registered target has the given destination.
    #[error("{} is not a registered target", path.display())]
    NoSuchTarget { path: PathBuf },

    /// An rsync invocation exited unsuccessfully.
    #[error("rsync failed ({status}): {command}")]
    Rsync { command: String, status: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A targets-store parsing error, wrapped from `serde_yaml::Error`.
    #[error("targets store error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A settings parsing error, wrapped from `ini::Error`.
    #[error("settings error: {0}")]
    Ini(#[from] ini::Error),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
