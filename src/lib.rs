//! # offlinecopy Library
//!
//! This library provides the core functionality for selectively
//! synchronizing directory trees with a remote rsync source. It is designed
//! to be used by the `offlinecopy` command-line tool but can also be
//! integrated into other applications that need include/exclude bookkeeping
//! for first-match-wins path filters.
//!
//! ## Quick Example
//!
//! ```
//! use offlinecopy::target::Target;
//! use offlinecopy::filter::State;
//!
//! // New targets start fully evicted: nothing is transferred until
//! // something is included.
//! let mut target = Target::new("user@host:/srv/media/", "/home/user/media");
//! assert_eq!(target.get_state("music"), State::Evicted);
//!
//! // Include a sub-path, evict part of it again.
//! target.include("music");
//! target.evict("music/podcasts");
//!
//! // Compile the override tree into ordered rsync filter rules.
//! let rules: Vec<String> = target
//!     .filter_rules()
//!     .iter()
//!     .map(ToString::to_string)
//!     .collect();
//! assert_eq!(rules, ["- /music/podcasts", "+ /music", "- /*"]);
//! ```
//!
//! ## Core Concepts
//!
//! - **Filter Tree (`filter`)**: a tree of path-segment nodes carrying
//!   optional include/evict states, with state inheritance, a rule
//!   compiler producing ordered first-match-wins filter rules, a pruning
//!   pass keeping the tree minimal, and a flat codec for persistence.
//! - **Targets (`target`)**: a source/destination pair owning one filter
//!   tree, exposing the evict/include/prune operations used by the CLI.
//! - **Registry (`store`)**: loads and saves all targets and finds the
//!   target responsible for a local path.
//! - **Settings (`settings`)** and **rsync invocation (`rsync`)**: user
//!   configuration and the assembly of the actual transfer commands.
//!
//! The filter tree is the only part with algorithmic subtlety: rule order
//! decides what rsync transfers, so the compiler's ordering contract is
//! documented and tested in detail in the `filter` module.

pub mod defaults;
pub mod error;
pub mod filter;
pub mod output;
pub mod rsync;
pub mod settings;
pub mod store;
pub mod target;

#[cfg(test)]
mod filter_proptest;
