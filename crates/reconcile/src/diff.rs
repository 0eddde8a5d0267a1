//! Set difference between the reference set and list membership

use crate::types::{Identifier, IdentifierSet};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Elements of `main` that appear nowhere in `sub`
///
/// Keeps `main`'s order. Duplicates in `main` are kept as delivered; the
/// result is not deduplicated.
///
/// ```
/// use reconcile::divide;
///
/// assert_eq!(divide(&[1, 2, 3], &[1, 2]), vec![3]);
/// assert!(divide(&[1, 2], &[1, 2, 3]).is_empty());
/// ```
pub fn divide(main: &[Identifier], sub: &[Identifier]) -> IdentifierSet {
    if sub.is_empty() {
        return main.to_vec();
    }

    let index: HashSet<Identifier> = sub.iter().copied().collect();
    main.iter()
        .copied()
        .filter(|id| !index.contains(id))
        .collect()
}

/// Corrections that move the list membership toward the reference set
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diff {
    /// In the reference set, missing from the list
    pub additions: IdentifierSet,
    /// On the list, no longer in the reference set
    pub removals: IdentifierSet,
}

impl Diff {
    /// Compute both directions from freshly fetched sets
    pub fn compute(friends: &[Identifier], members: &[Identifier]) -> Self {
        Self {
            additions: divide(friends, members),
            removals: divide(members, friends),
        }
    }

    /// Check if the list already matches the reference set
    pub fn is_empty(&self) -> bool {
        self.additions.is_empty() && self.removals.is_empty()
    }

    pub fn summary(&self) -> DiffSummary {
        DiffSummary {
            additions: self.additions.len(),
            removals: self.removals.len(),
        }
    }
}

/// Diff summary statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffSummary {
    /// Number of identifiers to add
    pub additions: usize,
    /// Number of identifiers to remove
    pub removals: usize,
}

impl DiffSummary {
    /// Total number of changes
    pub fn total(&self) -> usize {
        self.additions + self.removals
    }

    /// Check if there are any changes
    pub fn has_changes(&self) -> bool {
        self.total() > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_divide_basic() {
        assert_eq!(divide(&[1, 2, 3], &[1, 2]), vec![3]);
        assert_eq!(divide(&[1, 2], &[1, 2, 3]), Vec::<Identifier>::new());
    }

    #[test]
    fn test_divide_empty_inputs() {
        assert_eq!(divide(&[4, 5], &[]), vec![4, 5]);
        assert!(divide(&[], &[4, 5]).is_empty());
        assert!(divide(&[], &[]).is_empty());
    }

    #[test]
    fn test_divide_self_is_empty() {
        let ids = [9, 1, 7, 1];
        assert!(divide(&ids, &ids).is_empty());
    }

    #[test]
    fn test_divide_preserves_order() {
        assert_eq!(divide(&[5, 1, 4, 2, 3], &[1, 2]), vec![5, 4, 3]);
    }

    #[test]
    fn test_divide_keeps_duplicates() {
        assert_eq!(divide(&[3, 3, 1], &[1]), vec![3, 3]);
        // duplicates in `sub` do not matter
        assert_eq!(divide(&[1, 2], &[1, 1, 1]), vec![2]);
    }

    #[test]
    fn test_diff_compute() {
        let diff = Diff::compute(&[1, 2, 3], &[2, 3, 4]);
        assert_eq!(diff.additions, vec![1]);
        assert_eq!(diff.removals, vec![4]);
        assert_eq!(diff.summary().total(), 2);
        assert!(diff.summary().has_changes());
    }

    #[test]
    fn test_diff_identical_sets() {
        let diff = Diff::compute(&[10, 20, 30], &[30, 20, 10]);
        assert!(diff.is_empty());
        assert!(!diff.summary().has_changes());
    }

    proptest! {
        #[test]
        fn prop_partition_law(
            a in prop::collection::btree_set(any::<i64>(), 0..64),
            b in prop::collection::btree_set(any::<i64>(), 0..64),
        ) {
            let a_vec: Vec<i64> = a.iter().copied().collect();
            let b_vec: Vec<i64> = b.iter().copied().collect();

            let only_a: BTreeSet<i64> = divide(&a_vec, &b_vec).into_iter().collect();
            let only_b: BTreeSet<i64> = divide(&b_vec, &a_vec).into_iter().collect();
            let both: BTreeSet<i64> = a.intersection(&b).copied().collect();

            prop_assert!(only_a.is_disjoint(&only_b));
            prop_assert!(only_a.is_disjoint(&both));
            prop_assert!(only_b.is_disjoint(&both));

            let union: BTreeSet<i64> = only_a
                .iter()
                .chain(&only_b)
                .chain(&both)
                .copied()
                .collect();
            let expected: BTreeSet<i64> = a.union(&b).copied().collect();
            prop_assert_eq!(union, expected);
        }

        #[test]
        fn prop_diff_excludes_other_side(
            friends in prop::collection::vec(0i64..32, 0..48),
            members in prop::collection::vec(0i64..32, 0..48),
        ) {
            let diff = Diff::compute(&friends, &members);
            prop_assert!(diff.additions.iter().all(|id| !members.contains(id)));
            prop_assert!(diff.removals.iter().all(|id| !friends.contains(id)));
        }

        #[test]
        fn prop_self_difference_is_empty(a in prop::collection::vec(any::<i64>(), 0..64)) {
            prop_assert!(divide(&a, &a).is_empty());
        }

        #[test]
        fn prop_divide_by_empty_is_identity(a in prop::collection::vec(any::<i64>(), 0..64)) {
            prop_assert_eq!(divide(&a, &[]), a.clone());
            prop_assert!(divide(&[], &a).is_empty());
        }
    }
}
