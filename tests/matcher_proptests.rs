//! Property tests for the matching structures, checked against naive models.

use brrtcors::origin::radix::{Tree, WILDCARD_ELEM};
use brrtcors::util::{is_token, SortedSet};
use proptest::prelude::*;
use std::collections::BTreeSet;

/// Header-name-like elements: non-empty, no commas.
fn elem() -> impl Strategy<Value = String> {
    "[a-z0-9-]{1,10}"
}

/// Keys over a small alphabet so that patterns share suffixes often.
fn key() -> impl Strategy<Value = String> {
    "[ab.]{0,7}"
}

fn pattern() -> impl Strategy<Value = (String, i32)> {
    (any::<bool>(), key(), prop_oneof![Just(WILDCARD_ELEM), 0..3i32])
        .prop_map(|(star, k, tag)| (if star { format!("*{k}") } else { k }, tag))
}

/// Reference semantics: a leading `*` matches any non-empty prefix and the
/// sentinel tag matches any tag.
fn naive_contains(patterns: &[(String, i32)], key: &str, tag: i32) -> bool {
    patterns.iter().any(|(p, t)| {
        let tag_ok = *t == tag || *t == WILDCARD_ELEM;
        let key_ok = match p.strip_prefix('*') {
            Some(suffix) => key.len() > suffix.len() && key.ends_with(suffix),
            None => key == p,
        };
        tag_ok && key_ok
    })
}

proptest! {
    #[test]
    fn prop_cardinality_counts_distinct(list in prop::collection::vec(elem(), 0..20)) {
        let distinct: BTreeSet<&String> = list.iter().collect();
        prop_assert_eq!(SortedSet::new(&list).len(), distinct.len());
    }

    #[test]
    fn prop_subsumes_own_serialization(list in prop::collection::vec(elem(), 0..20)) {
        let set = SortedSet::new(&list);
        prop_assert!(set.subsumes(&set.to_string()));
        prop_assert!(set.subsumes(""));
    }

    #[test]
    fn prop_rejects_absent_element(list in prop::collection::vec(elem(), 0..20), e in elem()) {
        prop_assume!(!list.contains(&e));
        prop_assert!(!SortedSet::new(&list).subsumes(&e));
    }

    #[test]
    fn prop_rejects_reversed_and_duplicated(a in elem(), b in elem()) {
        prop_assume!(a < b);
        let set = SortedSet::new([&a, &b]);
        let ordered = format!("{a},{b}");
        let reversed = format!("{b},{a}");
        let duplicated = format!("{a},{a}");
        prop_assert!(set.subsumes(&ordered));
        prop_assert!(!set.subsumes(&reversed));
        prop_assert!(!set.subsumes(&duplicated));
    }

    #[test]
    fn prop_subsumes_every_sorted_subset(
        list in prop::collection::vec(elem(), 1..12),
        mask in prop::collection::vec(any::<bool>(), 12),
    ) {
        let sorted: BTreeSet<&String> = list.iter().collect();
        let subset: Vec<&str> = sorted
            .iter()
            .zip(&mask)
            .filter(|(_, &keep)| keep)
            .map(|(s, _)| s.as_str())
            .collect();
        prop_assert!(SortedSet::new(&list).subsumes(&subset.join(",")));
    }

    #[test]
    fn prop_tree_matches_naive_model(
        patterns in prop::collection::vec(pattern(), 0..12),
        probes in prop::collection::vec((key(), 0..3i32), 1..24),
    ) {
        let mut tree = Tree::new();
        for (p, t) in &patterns {
            tree.insert(p, *t);
        }
        for (k, t) in &probes {
            prop_assert_eq!(
                tree.contains(k, *t),
                naive_contains(&patterns, k, *t),
                "key {:?} tag {} patterns {:?}", k, t, patterns
            );
        }
        // every exact pattern is found under its own tag
        for (p, t) in patterns.iter().filter(|(p, _)| !p.starts_with('*')) {
            prop_assert!(tree.contains(p, *t));
        }
    }

    #[test]
    fn prop_bare_star_with_sentinel_matches_everything(k in "[a-z.]{1,20}", t in any::<i32>()) {
        let mut tree = Tree::new();
        tree.insert("*", WILDCARD_ELEM);
        prop_assert!(tree.contains(&k, t));
        prop_assert!(!tree.contains("", t));
    }

    #[test]
    fn prop_token_validator_agrees_with_rfc_tchar(s in "[ -~]{0,12}") {
        let tchar = |c: char| c.is_ascii_alphanumeric() || "!#$%&'*+-.^_`|~".contains(c);
        prop_assert_eq!(is_token(&s), !s.is_empty() && s.chars().all(tchar));
    }
}
