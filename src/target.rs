//! # Synchronization Targets
//!
//! A [`Target`] pairs a remote rsync source with a local destination
//! directory and owns the [`FilterTree`](crate::filter::FilterTree) that
//! records which of its sub-paths are included or evicted.
//!
//! New targets start with their root evicted: nothing is transferred until
//! the user explicitly includes (or summons) paths. All mutation goes
//! through [`Target::evict`] and [`Target::include`], which are idempotent,
//! and [`Target::prune`], which drops redundant markers after a change.
//!
//! Targets serialize through their flat node list, so the persisted form is
//! independent of the tree's internal shape.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::filter::{split_path, FilterRule, FilterTree, FlatNode, State};

/// One synchronization target.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "TargetRecord", into = "TargetRecord")]
pub struct Target {
    /// rsync-style source, e.g. `user@host:/path/` or a local directory.
    pub source: String,
    /// Local destination directory, canonicalized by the CLI layer.
    pub destination: PathBuf,
    tree: FilterTree,
}

/// Persisted form of a [`Target`]: source, destination and the flat node
/// list produced by the filter tree's codec.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TargetRecord {
    source: String,
    destination: PathBuf,
    #[serde(default)]
    nodes: Vec<FlatNode>,
}

impl From<TargetRecord> for Target {
    fn from(record: TargetRecord) -> Self {
        let mut target = Self::new(record.source, record.destination);
        target.load_flat_nodes(record.nodes);
        target
    }
}

impl From<Target> for TargetRecord {
    fn from(target: Target) -> Self {
        Self {
            nodes: target.flat_nodes(),
            source: target.source,
            destination: target.destination,
        }
    }
}

impl Target {
    /// Create a target whose tree root is explicitly evicted, so nothing is
    /// synchronized until paths are included.
    pub fn new(source: impl Into<String>, destination: impl Into<PathBuf>) -> Self {
        let mut tree = FilterTree::new();
        let root = tree.root();
        tree.set_state(root, Some(State::Evicted));
        Self {
            source: source.into(),
            destination: destination.into(),
            tree,
        }
    }

    /// The effective state of `path` within this target. Never mutates the
    /// tree; unknown paths resolve through their deepest existing ancestor.
    pub fn get_state(&self, path: &str) -> State {
        let key = split_path(path);
        let (node, _) = self.tree.resolve_prefix(&key);
        self.tree.effective_state(node)
    }

    /// Mark `path` as evicted. A no-op if it already is.
    pub fn evict(&mut self, path: &str) {
        if self.get_state(path) == State::Evicted {
            return;
        }
        let key = split_path(path);
        let node = self.tree.ensure_path(&key);
        self.tree.set_state(node, Some(State::Evicted));
    }

    /// Mark `path` as included. A no-op if it already is.
    pub fn include(&mut self, path: &str) {
        if self.get_state(path) == State::Included {
            return;
        }
        let key = split_path(path);
        let node = self.tree.ensure_path(&key);
        self.tree.set_state(node, Some(State::Included));
    }

    /// Drop redundant state markers from the tree.
    pub fn prune(&mut self) {
        self.tree.prune();
    }

    /// Compile the target's filter rule list for rsync.
    pub fn filter_rules(&self) -> Vec<FilterRule> {
        self.tree.rules()
    }

    /// The flat, persistence-oriented encoding of the tree.
    pub fn flat_nodes(&self) -> Vec<FlatNode> {
        self.tree.to_flat()
    }

    /// Replace the tree contents with a previously persisted flat encoding.
    pub fn load_flat_nodes<I>(&mut self, nodes: I)
    where
        I: IntoIterator<Item = FlatNode>,
    {
        self.tree.from_flat(nodes);
    }
}
