//! # Target Registry and Persistence
//!
//! The [`TargetRegistry`] owns every registered [`Target`] and handles the
//! `targets.yaml` store in the configuration directory. The store is a
//! plain YAML document:
//!
//! ```yaml
//! targets:
//! - source: "user@host:/srv/media/"
//!   destination: /home/user/media
//!   nodes:
//!   - state: evicted
//!     path: ""
//!   - state: included
//!     path: music
//! ```
//!
//! `nodes` is the filter tree's flat encoding, so the persisted form stays
//! stable regardless of how the tree is shaped in memory.
//!
//! Registration enforces that target destinations never nest: a path on
//! disk belongs to at most one target, which is what makes
//! [`find_enclosing_mut`](TargetRegistry::find_enclosing_mut) unambiguous.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::target::Target;

/// Resolve a path for registry lookups.
///
/// Canonicalizes when the path exists; otherwise falls back to making it
/// absolute without touching the filesystem. The include command must
/// accept paths that exist only on the remote side, so resolution never
/// fails hard.
pub fn resolve_path(path: &Path) -> PathBuf {
    fs::canonicalize(path)
        .or_else(|_| std::path::absolute(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

/// All registered synchronization targets.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TargetRegistry {
    #[serde(default)]
    targets: Vec<Target>,
}

impl TargetRegistry {
    /// Load the registry from `path`. A missing store is not an error and
    /// yields an empty registry.
    pub fn load(path: &Path) -> Result<Self> {
        let data = match fs::read_to_string(path) {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("no targets store at {}, starting empty", path.display());
                return Ok(Self::default());
            }
            Err(err) => return Err(err.into()),
        };
        Ok(serde_yaml::from_str(&data)?)
    }

    /// Write the registry to `path`, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        for target in &self.targets {
            // a directory synced from a source without a trailing slash
            // makes rsync nest the source directory inside the destination
            if target.destination.is_dir() && !target.source.ends_with('/') {
                log::warn!(
                    "directory target {} uses non-directory source {}",
                    target.destination.display(),
                    target.source
                );
            }
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_yaml::to_string(self)?)?;
        Ok(())
    }

    /// Register a new target, rejecting destinations that are inside, equal
    /// to, or a parent of an existing target's destination.
    pub fn add(&mut self, target: Target) -> Result<()> {
        for existing in &self.targets {
            let existing_dest = resolve_path(&existing.destination);
            if target.destination.starts_with(&existing_dest)
                || existing_dest.starts_with(&target.destination)
            {
                return Err(Error::TargetOverlap {
                    dest: target.destination,
                    existing: existing.destination.clone(),
                });
            }
        }
        self.targets.push(target);
        Ok(())
    }

    /// Remove and return the target with the given destination.
    pub fn remove(&mut self, dest: &Path) -> Result<Target> {
        match self
            .targets
            .iter()
            .position(|target| resolve_path(&target.destination) == dest)
        {
            Some(index) => Ok(self.targets.remove(index)),
            None => Err(Error::NoSuchTarget {
                path: dest.to_path_buf(),
            }),
        }
    }

    /// The target whose destination is exactly `dest`, if any.
    pub fn get_mut(&mut self, dest: &Path) -> Option<&mut Target> {
        self.targets
            .iter_mut()
            .find(|target| resolve_path(&target.destination) == dest)
    }

    /// The target whose destination contains `path` (or is `path`), together
    /// with the target-relative remainder (`""` for the destination itself).
    pub fn find_enclosing_mut(&mut self, path: &Path) -> Option<(&mut Target, String)> {
        let index = self.targets.iter().position(|target| {
            path.starts_with(resolve_path(&target.destination))
        })?;
        let target = &mut self.targets[index];
        let relative = path
            .strip_prefix(resolve_path(&target.destination))
            .expect("starts_with implies strip_prefix succeeds")
            .to_string_lossy()
            .into_owned();
        Some((target, relative))
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    pub fn targets_mut(&mut self) -> &mut [Target] {
        &mut self.targets
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}
