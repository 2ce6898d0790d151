//! Property-based tests for the filter tree.
//!
//! These tests use proptest to generate random paths and edit sequences and
//! verify that the tree's invariants hold for all of them.

#[cfg(test)]
mod proptest_tests {
    use crate::filter::{split_path, State};
    use crate::target::Target;
    use proptest::prelude::*;

    /// A random target-relative path: 0-4 plain segments.
    fn path_strategy() -> impl Strategy<Value = String> {
        proptest::collection::vec("[a-zA-Z0-9_.]{1,8}", 0..4)
            .prop_map(|segments| segments.join("/"))
    }

    /// A random evict/include edit sequence.
    fn edit_strategy() -> impl Strategy<Value = Vec<(bool, String)>> {
        proptest::collection::vec((any::<bool>(), path_strategy()), 0..12)
    }

    fn apply_edits(target: &mut Target, edits: &[(bool, String)]) {
        for (is_evict, path) in edits {
            if *is_evict {
                target.evict(path);
            } else {
                target.include(path);
            }
        }
    }

    /// Paths whose states are worth comparing after an edit sequence: every
    /// edited path plus a child and the root.
    fn probe_paths(edits: &[(bool, String)]) -> Vec<String> {
        let mut probes = vec![String::new(), "unrelated/probe".to_string()];
        for (_, path) in edits {
            probes.push(path.clone());
            probes.push(format!("{}/below", path));
        }
        probes
    }

    // ============================================================================
    // split_path property tests
    // ============================================================================

    proptest! {
        /// Property: split_path never yields empty segments
        #[test]
        fn split_path_yields_no_empty_segments(input in "[a-z/]{0,30}") {
            for segment in split_path(&input) {
                prop_assert!(!segment.is_empty());
                prop_assert!(!segment.contains('/'));
            }
        }

        /// Property: splitting is insensitive to extra separators
        #[test]
        fn split_path_ignores_extra_separators(segments in proptest::collection::vec("[a-z]{1,6}", 0..5)) {
            let plain = segments.join("/");
            let decorated = format!("//{}//", segments.join("//"));
            prop_assert_eq!(split_path(&plain), split_path(&decorated));
        }

        /// Property: split_path round-trips through join
        #[test]
        fn split_path_round_trips(segments in proptest::collection::vec("[a-z]{1,6}", 0..5)) {
            let joined = segments.join("/");
            let split: Vec<String> = split_path(&joined).iter().map(|s| s.to_string()).collect();
            prop_assert_eq!(split, segments);
        }
    }

    // ============================================================================
    // tree edit property tests
    // ============================================================================

    proptest! {
        /// Property: evict and include are idempotent
        #[test]
        fn edits_are_idempotent(edits in edit_strategy(), path in path_strategy()) {
            let mut once = Target::new("host:/src/", "/dest");
            apply_edits(&mut once, &edits);
            let mut twice = once.clone();

            once.evict(&path);
            twice.evict(&path);
            twice.evict(&path);
            prop_assert_eq!(once.flat_nodes(), twice.flat_nodes());
            prop_assert_eq!(once.filter_rules(), twice.filter_rules());

            once.include(&path);
            twice.include(&path);
            twice.include(&path);
            prop_assert_eq!(once.flat_nodes(), twice.flat_nodes());
        }

        /// Property: an edit takes effect for the path and its descendants
        #[test]
        fn edits_take_effect(edits in edit_strategy(), path in path_strategy()) {
            let mut target = Target::new("host:/src/", "/dest");
            apply_edits(&mut target, &edits);

            target.evict(&path);
            prop_assert_eq!(target.get_state(&path), State::Evicted);
            prop_assert_eq!(
                target.get_state(&format!("{}/below", path)),
                State::Evicted
            );

            target.include(&path);
            prop_assert_eq!(target.get_state(&path), State::Included);
        }

        /// Property: prune never changes any effective state
        #[test]
        fn prune_preserves_states(edits in edit_strategy()) {
            let mut target = Target::new("host:/src/", "/dest");
            apply_edits(&mut target, &edits);

            let probes = probe_paths(&edits);
            let before: Vec<State> = probes.iter().map(|p| target.get_state(p)).collect();
            target.prune();
            let after: Vec<State> = probes.iter().map(|p| target.get_state(p)).collect();
            prop_assert_eq!(before, after);
        }

        /// Property: rebuilding a tree from its flat encoding preserves the
        /// effective state of every path, regardless of tree shape
        #[test]
        fn flat_codec_round_trips_states(edits in edit_strategy()) {
            let mut target = Target::new("host:/src/", "/dest");
            apply_edits(&mut target, &edits);

            let mut restored = Target::new("host:/src/", "/dest");
            restored.load_flat_nodes(target.flat_nodes());

            for probe in probe_paths(&edits) {
                prop_assert_eq!(
                    restored.get_state(&probe),
                    target.get_state(&probe),
                    "path {:?}",
                    probe
                );
            }
        }

        /// Property: the flat encoding is stable across a round trip
        #[test]
        fn flat_codec_is_stable(edits in edit_strategy()) {
            let mut target = Target::new("host:/src/", "/dest");
            apply_edits(&mut target, &edits);

            let flat = target.flat_nodes();
            let mut restored = Target::new("host:/src/", "/dest");
            restored.load_flat_nodes(flat.clone());
            prop_assert_eq!(restored.flat_nodes(), flat);
        }
    }
}
