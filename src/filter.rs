//! # Filter Tree and Rule Compilation
//!
//! This module is the heart of offlinecopy: it tracks which sub-paths of a
//! synchronization target are included in or evicted from transfers, and
//! compiles that sparse override set into an ordered list of rsync filter
//! rules.
//!
//! ## Key Components
//!
//! - **`State`**: the two-valued include/evict tag carried by tree nodes.
//!   "No explicit state" is a third, distinct condition and is therefore
//!   modelled as `Option<State>` on the node, never folded into the tag.
//!
//! - **`FilterTree`**: a tree of path-segment nodes stored in an arena.
//!   Nodes inherit their effective state from the nearest explicitly-stated
//!   ancestor; an unstated root resolves to `Included`.
//!
//! - **`FilterRule`**: one compiled rule, an include/exclude marker plus a
//!   pattern, rendered as `"<marker> /<pattern>"` for rsync's
//!   `--filter ". FILE"` mechanism.
//!
//! ## Rule Ordering
//!
//! rsync applies filter rules first-match-wins, so the compiler must emit
//! the most specific rule before any broader one. The compiler walks the
//! tree post-order (every child's full rule block before the node's own
//! boundary rule, children in ascending segment order) and rebases child
//! patterns with the child's segment name on the way up. The resulting list
//! reproduces every node's effective state exactly.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Synchronization state of a path within a target.
///
/// Serialized as `"included"` / `"evicted"` in the targets store; any other
/// token is rejected during deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum State {
    /// The path takes part in synchronization.
    Included,
    /// The path is left out of synchronization.
    Evicted,
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Included => write!(f, "included"),
            Self::Evicted => write!(f, "evicted"),
        }
    }
}

/// Split a path string into its non-empty segments.
///
/// Leading, trailing and repeated separators are tolerated; `.` and `..`
/// are not resolved. Every string splits successfully: the empty string
/// (and `"/"`) yields an empty sequence, which denotes the tree root.
pub fn split_path(path: &str) -> Vec<&str> {
    path.split('/').filter(|segment| !segment.is_empty()).collect()
}

/// The action of a single compiled filter rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleAction {
    /// `+` rule: the pattern is transferred.
    Include,
    /// `-` rule: the pattern is skipped.
    Exclude,
}

impl fmt::Display for RuleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Include => write!(f, "+"),
            Self::Exclude => write!(f, "-"),
        }
    }
}

/// One compiled filter rule.
///
/// `pattern` is a target-relative path, a path suffixed with `/*`, or the
/// bare root wildcard `*`. The `Display` form is the line format consumed
/// by rsync filter files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterRule {
    pub action: RuleAction,
    pub pattern: String,
}

impl fmt::Display for FilterRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} /{}", self.action, self.pattern)
    }
}

/// One entry of the flat, persistence-oriented tree encoding: the explicit
/// state of a single node plus its target-relative path (the root's path is
/// the empty string).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatNode {
    pub state: State,
    pub path: String,
}

impl FlatNode {
    pub fn new(state: State, path: impl Into<String>) -> Self {
        Self {
            state,
            path: path.into(),
        }
    }
}

/// Handle to a node inside a [`FilterTree`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeId(usize);

const ROOT: NodeId = NodeId(0);

#[derive(Debug, Clone, Default)]
struct Node {
    parent: Option<NodeId>,
    children: BTreeMap<String, NodeId>,
    state: Option<State>,
}

/// A tree of path-segment nodes with optional explicit states.
///
/// Nodes are stored in an arena and addressed by [`NodeId`]; parent links
/// are plain indices used only for upward state resolution, so there is no
/// ownership cycle. Slots detached by [`prune`](Self::prune) are reclaimed
/// the next time the tree is [`clear`](Self::clear)ed; trees stay small, one
/// node per explicitly marked path plus intermediates.
#[derive(Debug, Clone)]
pub struct FilterTree {
    nodes: Vec<Node>,
}

impl Default for FilterTree {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterTree {
    /// Create an empty tree: a single stateless root.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::default()],
        }
    }

    /// The root node. It always exists and is never removed.
    pub fn root(&self) -> NodeId {
        ROOT
    }

    /// The explicit state of `node`, if any.
    pub fn state(&self, node: NodeId) -> Option<State> {
        self.nodes[node.0].state
    }

    /// Set or clear the explicit state of `node`.
    pub fn set_state(&mut self, node: NodeId, state: Option<State>) {
        self.nodes[node.0].state = state;
    }

    /// Resolve the effective state of `node`: its explicit state if present,
    /// otherwise the nearest explicitly-stated ancestor. An unstated root
    /// resolves to `Included`.
    pub fn effective_state(&self, node: NodeId) -> State {
        let mut current = node;
        loop {
            let n = &self.nodes[current.0];
            if let Some(state) = n.state {
                return state;
            }
            match n.parent {
                Some(parent) => current = parent,
                None => return State::Included,
            }
        }
    }

    /// Walk `key`'s segments through existing children as far as possible.
    ///
    /// Returns the deepest existing node reached and the unmatched remainder
    /// of `key`. Never creates nodes.
    pub fn resolve_prefix<'k>(&self, key: &'k [&'k str]) -> (NodeId, &'k [&'k str]) {
        let mut node = ROOT;
        for (index, segment) in key.iter().enumerate() {
            match self.nodes[node.0].children.get(*segment) {
                Some(&child) => node = child,
                None => return (node, &key[index..]),
            }
        }
        (node, &[])
    }

    /// Like [`resolve_prefix`](Self::resolve_prefix), but creates a chain of
    /// fresh stateless nodes for the unmatched suffix. Idempotent: the same
    /// key always resolves to the same node.
    pub fn ensure_path(&mut self, key: &[&str]) -> NodeId {
        let (mut node, unmatched) = self.resolve_prefix(key);
        for segment in unmatched {
            let child = NodeId(self.nodes.len());
            self.nodes.push(Node {
                parent: Some(node),
                children: BTreeMap::new(),
                state: None,
            });
            self.nodes[node.0].children.insert((*segment).to_string(), child);
            node = child;
        }
        node
    }

    /// Compile the tree into an ordered filter rule list.
    ///
    /// A first-match-wins consumer of the result sees exactly the effective
    /// states encoded in the tree.
    pub fn rules(&self) -> Vec<FilterRule> {
        self.node_rules(ROOT)
            .into_iter()
            .map(|(action, pattern)| FilterRule {
                action,
                pattern: pattern.expect("non-root rules are rebased by their parent"),
            })
            .collect()
    }

    /// Rules for the subtree rooted at `node`, relative to that node.
    ///
    /// A pattern of `None` denotes the node's own boundary; the parent
    /// rebases it to the bare segment name. The root emits its boundary as
    /// the whole-tree wildcard instead, since it has no path to name.
    fn node_rules(&self, node: NodeId) -> Vec<(RuleAction, Option<String>)> {
        let n = &self.nodes[node.0];
        let mut rules = Vec::new();

        for (segment, &child) in &n.children {
            for (action, suffix) in self.node_rules(child) {
                rules.push((action, Some(rebase(segment, suffix))));
            }
        }

        if n.state == Some(State::Included) {
            if n.parent.is_some() {
                rules.push((RuleAction::Include, None));
            }
        } else if !n.children.is_empty() && self.effective_state(node) == State::Evicted {
            // Everything strictly inside this node is excluded; the nested
            // overrides above already punched their holes. If an ancestor's
            // wildcard would stop rsync from descending into this node at
            // all, re-include the directory entry itself.
            rules.push((RuleAction::Exclude, Some(String::from("*"))));
            if let Some(parent) = n.parent {
                if self.effective_state(parent) == State::Evicted {
                    rules.push((RuleAction::Include, None));
                }
            }
        } else if n.state == Some(State::Evicted) {
            if n.parent.is_none() {
                rules.push((RuleAction::Exclude, Some(String::from("*"))));
            } else {
                rules.push((RuleAction::Exclude, None));
            }
        }

        rules
    }

    /// Remove nodes whose explicit state is redundant.
    ///
    /// Post-order: descendants are pruned first, then a child whose explicit
    /// state equals this node's effective state and which has no remaining
    /// children is dropped. No effective state in the tree changes.
    pub fn prune(&mut self) {
        self.prune_node(ROOT);
    }

    fn prune_node(&mut self, node: NodeId) {
        // Snapshot the child set, the walk below mutates it.
        let children: Vec<(String, NodeId)> = self.nodes[node.0]
            .children
            .iter()
            .map(|(segment, &child)| (segment.clone(), child))
            .collect();
        let inherited = self.effective_state(node);

        for (segment, child) in children {
            self.prune_node(child);
            let child_node = &self.nodes[child.0];
            if child_node.state == Some(inherited) && child_node.children.is_empty() {
                self.nodes[node.0].children.remove(&segment);
            }
        }
    }

    /// Reset to the empty, stateless tree.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.nodes.push(Node::default());
    }

    /// Produce the flat encoding of the tree: every explicitly-stated node
    /// as a `(state, path)` pair, pre-order (self before children, children
    /// ascending). The inverse of [`from_flat`](Self::from_flat).
    pub fn to_flat(&self) -> Vec<FlatNode> {
        self.node_flat(ROOT)
            .into_iter()
            .map(|(state, path)| FlatNode {
                state,
                // the root itself renders as the empty path
                path: path.unwrap_or_default(),
            })
            .collect()
    }

    fn node_flat(&self, node: NodeId) -> Vec<(State, Option<String>)> {
        let n = &self.nodes[node.0];
        let mut entries = Vec::new();

        if let Some(state) = n.state {
            entries.push((state, None));
        }
        for (segment, &child) in &n.children {
            for (state, suffix) in self.node_flat(child) {
                entries.push((state, Some(rebase(segment, suffix))));
            }
        }

        entries
    }

    /// Rebuild the tree from a flat encoding.
    ///
    /// Clears the tree first, then replays every entry in order. Does not
    /// prune; callers wanting a minimal tree call [`prune`](Self::prune)
    /// afterwards.
    pub fn from_flat<I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = FlatNode>,
    {
        self.clear();
        for entry in entries {
            let key = split_path(&entry.path);
            let node = self.ensure_path(&key);
            self.nodes[node.0].state = Some(entry.state);
        }
    }
}

/// Express a child-relative pattern relative to the parent by prefixing the
/// child's segment name. `None` is the child's own boundary and becomes the
/// bare segment, without a trailing separator.
fn rebase(segment: &str, suffix: Option<String>) -> String {
    match suffix {
        None => segment.to_string(),
        Some(suffix) => format!("{}/{}", segment, suffix),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(action: RuleAction, pattern: &str) -> FilterRule {
        FilterRule {
            action,
            pattern: pattern.to_string(),
        }
    }

    /// Tree with the root explicitly included, like a summoned target.
    fn included_tree() -> FilterTree {
        let mut tree = FilterTree::new();
        let root = tree.root();
        tree.set_state(root, Some(State::Included));
        tree
    }

    fn evict(tree: &mut FilterTree, path: &str) {
        let key = split_path(path);
        let (node, _) = tree.resolve_prefix(&key);
        if tree.effective_state(node) == State::Evicted {
            return;
        }
        let node = tree.ensure_path(&key);
        tree.set_state(node, Some(State::Evicted));
    }

    fn include(tree: &mut FilterTree, path: &str) {
        let key = split_path(path);
        let (node, _) = tree.resolve_prefix(&key);
        if tree.effective_state(node) == State::Included {
            return;
        }
        let node = tree.ensure_path(&key);
        tree.set_state(node, Some(State::Included));
    }

    fn state_at(tree: &FilterTree, path: &str) -> State {
        let key = split_path(path);
        let (node, _) = tree.resolve_prefix(&key);
        tree.effective_state(node)
    }

    #[test]
    fn test_split_path_deep() {
        assert_eq!(split_path("A/B/C"), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_split_path_tolerates_extra_separators() {
        assert_eq!(split_path("/A/B/C/"), vec!["A", "B", "C"]);
        assert_eq!(split_path("A//B"), vec!["A", "B"]);
    }

    #[test]
    fn test_split_path_root() {
        assert!(split_path("").is_empty());
        assert!(split_path("/").is_empty());
        assert!(split_path("///").is_empty());
    }

    #[test]
    fn test_effective_state_inherits_from_nearest_ancestor() {
        let mut tree = FilterTree::new();
        let root = tree.root();
        tree.set_state(root, Some(State::Included));
        let foo = tree.ensure_path(&["foo"]);
        tree.set_state(foo, Some(State::Evicted));
        let bar = tree.ensure_path(&["foo", "bar"]);

        assert_eq!(tree.effective_state(root), State::Included);
        assert_eq!(tree.effective_state(foo), State::Evicted);
        assert_eq!(tree.effective_state(bar), State::Evicted);
    }

    #[test]
    fn test_effective_state_unstated_root_defaults_to_included() {
        let tree = FilterTree::new();
        assert_eq!(tree.effective_state(tree.root()), State::Included);
    }

    #[test]
    fn test_resolve_prefix() {
        let mut tree = FilterTree::new();
        let bar = tree.ensure_path(&["foo", "bar"]);
        let (foo, _) = tree.resolve_prefix(&["foo"]);

        assert_eq!(tree.resolve_prefix(&["foo", "bar"]), (bar, &[][..]));
        assert_eq!(
            tree.resolve_prefix(&["foo", "bar", "baz"]),
            (bar, &["baz"][..])
        );
        assert_eq!(tree.resolve_prefix(&["foo"]), (foo, &[][..]));
        assert_eq!(
            tree.resolve_prefix(&["qux"]),
            (tree.root(), &["qux"][..])
        );
        assert_eq!(tree.resolve_prefix(&[]), (tree.root(), &[][..]));
    }

    #[test]
    fn test_ensure_path_is_idempotent() {
        let mut tree = FilterTree::new();
        let first = tree.ensure_path(&["foo", "bar"]);
        let second = tree.ensure_path(&["foo", "bar"]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_ensure_path_links_parents() {
        let mut tree = FilterTree::new();
        let baz = tree.ensure_path(&["foo", "bar", "baz"]);
        tree.set_state(baz, Some(State::Evicted));
        // the fresh intermediates inherit through their parent chain
        let (bar, _) = tree.resolve_prefix(&["foo", "bar"]);
        assert_eq!(tree.effective_state(bar), State::Included);
        assert_eq!(tree.effective_state(baz), State::Evicted);
    }

    #[test]
    fn test_rules_empty_for_uniform_tree() {
        let tree = included_tree();
        assert!(tree.rules().is_empty());
    }

    #[test]
    fn test_rules_single_eviction() {
        let mut tree = included_tree();
        evict(&mut tree, "A/B");

        assert_eq!(tree.rules(), vec![rule(RuleAction::Exclude, "A/B")]);
        assert_eq!(state_at(&tree, "A"), State::Included);
        assert_eq!(state_at(&tree, "A/B"), State::Evicted);
        assert_eq!(state_at(&tree, "A/B/C"), State::Evicted);
    }

    #[test]
    fn test_rules_evicted_root() {
        let mut tree = included_tree();
        evict(&mut tree, "");

        assert_eq!(tree.rules(), vec![rule(RuleAction::Exclude, "*")]);
    }

    #[test]
    fn test_evict_inside_evicted_is_noop() {
        let mut tree = included_tree();
        evict(&mut tree, "A");
        evict(&mut tree, "A/B");

        assert_eq!(tree.rules(), vec![rule(RuleAction::Exclude, "A")]);
    }

    #[test]
    fn test_rules_include_under_eviction() {
        let mut tree = included_tree();
        evict(&mut tree, "A");
        include(&mut tree, "A/B");

        assert_eq!(
            tree.rules(),
            vec![
                rule(RuleAction::Include, "A/B"),
                rule(RuleAction::Exclude, "A/*"),
            ]
        );
    }

    #[test]
    fn test_rules_deep_include_under_eviction() {
        let mut tree = included_tree();
        evict(&mut tree, "A");
        include(&mut tree, "A/B/C");

        assert_eq!(
            tree.rules(),
            vec![
                rule(RuleAction::Include, "A/B/C"),
                rule(RuleAction::Exclude, "A/B/*"),
                rule(RuleAction::Include, "A/B"),
                rule(RuleAction::Exclude, "A/*"),
            ]
        );
    }

    #[test]
    fn test_rules_complex_override_nest() {
        let mut tree = included_tree();
        evict(&mut tree, "A");
        include(&mut tree, "A/B/C");
        evict(&mut tree, "A/B/C/D");
        include(&mut tree, "A/E");

        assert_eq!(
            tree.rules(),
            vec![
                rule(RuleAction::Exclude, "A/B/C/D"),
                rule(RuleAction::Include, "A/B/C"),
                rule(RuleAction::Exclude, "A/B/*"),
                rule(RuleAction::Include, "A/B"),
                rule(RuleAction::Include, "A/E"),
                rule(RuleAction::Exclude, "A/*"),
            ]
        );
    }

    #[test]
    fn test_rules_are_idempotent_under_repeated_eviction() {
        let mut tree = included_tree();
        evict(&mut tree, "A/B");
        let once = tree.rules();
        evict(&mut tree, "A/B");
        assert_eq!(tree.rules(), once);
    }

    #[test]
    fn test_prune_removes_includes_under_included() {
        let mut tree = FilterTree::new();
        let foo = tree.ensure_path(&["foo"]);
        tree.set_state(foo, Some(State::Included));

        tree.prune();
        assert_eq!(tree.resolve_prefix(&["foo"]).0, tree.root());
    }

    #[test]
    fn test_prune_keeps_outermost_eviction() {
        let mut tree = FilterTree::new();
        let foo = tree.ensure_path(&["foo"]);
        tree.set_state(foo, Some(State::Evicted));
        let bar = tree.ensure_path(&["foo", "bar"]);
        tree.set_state(bar, Some(State::Evicted));

        tree.prune();
        // the inner eviction was redundant, the outer one is load-bearing
        let (node, unmatched) = tree.resolve_prefix(&["foo", "bar"]);
        assert_eq!(unmatched, &["bar"][..]);
        assert_eq!(tree.state(node), Some(State::Evicted));
    }

    #[test]
    fn test_prune_collapses_chains_bottom_up() {
        // evict foo, re-include foo again: both markers become redundant
        // only once the inner one is gone
        let mut tree = included_tree();
        evict(&mut tree, "foo/bar");
        include(&mut tree, "foo/bar");

        tree.prune();
        let (_, unmatched) = tree.resolve_prefix(&["foo", "bar"]);
        assert_eq!(unmatched, &["bar"][..]);
    }

    #[test]
    fn test_prune_preserves_effective_states() {
        let mut tree = included_tree();
        evict(&mut tree, "A");
        include(&mut tree, "A/B/C");
        evict(&mut tree, "A/B/C/D");
        include(&mut tree, "A/E");

        let paths = ["", "A", "A/B", "A/B/C", "A/B/C/D", "A/B/C/D/E", "A/E", "F"];
        let before: Vec<State> = paths.iter().map(|p| state_at(&tree, p)).collect();
        tree.prune();
        let after: Vec<State> = paths.iter().map(|p| state_at(&tree, p)).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_clear_resets_tree() {
        let mut tree = included_tree();
        evict(&mut tree, "A/B");
        tree.clear();

        assert_eq!(tree.state(tree.root()), None);
        assert!(tree.rules().is_empty());
        assert!(tree.to_flat().is_empty());
    }

    #[test]
    fn test_to_flat_orders_self_before_children() {
        let mut tree = included_tree();
        evict(&mut tree, "A");
        include(&mut tree, "A/B/C");
        evict(&mut tree, "A/B/C/D");
        include(&mut tree, "A/E");

        assert_eq!(
            tree.to_flat(),
            vec![
                FlatNode::new(State::Included, ""),
                FlatNode::new(State::Evicted, "A"),
                FlatNode::new(State::Included, "A/B/C"),
                FlatNode::new(State::Evicted, "A/B/C/D"),
                FlatNode::new(State::Included, "A/E"),
            ]
        );
    }

    #[test]
    fn test_to_flat_evicted_root() {
        let mut tree = included_tree();
        evict(&mut tree, "");
        include(&mut tree, "A/B/C");
        evict(&mut tree, "A/B/C/D");

        assert_eq!(
            tree.to_flat(),
            vec![
                FlatNode::new(State::Evicted, ""),
                FlatNode::new(State::Included, "A/B/C"),
                FlatNode::new(State::Evicted, "A/B/C/D"),
            ]
        );
    }

    #[test]
    fn test_from_flat_round_trips() {
        let entries = vec![
            FlatNode::new(State::Evicted, "A"),
            FlatNode::new(State::Included, "A/B/C"),
            FlatNode::new(State::Evicted, "A/B/C/D"),
            FlatNode::new(State::Included, "A/E"),
        ];

        let mut tree = FilterTree::new();
        tree.from_flat(entries.clone());

        assert_eq!(tree.to_flat(), entries);
        assert_eq!(
            tree.rules(),
            vec![
                rule(RuleAction::Exclude, "A/B/C/D"),
                rule(RuleAction::Include, "A/B/C"),
                rule(RuleAction::Exclude, "A/B/*"),
                rule(RuleAction::Include, "A/B"),
                rule(RuleAction::Include, "A/E"),
                rule(RuleAction::Exclude, "A/*"),
            ]
        );
    }

    #[test]
    fn test_from_flat_replaces_previous_contents() {
        let mut tree = included_tree();
        evict(&mut tree, "old/path");

        tree.from_flat(vec![FlatNode::new(State::Evicted, "new")]);
        assert_eq!(tree.to_flat(), vec![FlatNode::new(State::Evicted, "new")]);
        assert_eq!(state_at(&tree, "old/path"), State::Included);
    }

    #[test]
    fn test_filter_rule_display() {
        assert_eq!(
            rule(RuleAction::Include, "A/B").to_string(),
            "+ /A/B"
        );
        assert_eq!(rule(RuleAction::Exclude, "A/*").to_string(), "- /A/*");
        assert_eq!(rule(RuleAction::Exclude, "*").to_string(), "- /*");
    }

    #[test]
    fn test_state_serde_tokens() {
        assert_eq!(serde_yaml::to_string(&State::Included).unwrap().trim(), "included");
        assert_eq!(serde_yaml::to_string(&State::Evicted).unwrap().trim(), "evicted");
        assert!(serde_yaml::from_str::<State>("banished").is_err());
    }
}
