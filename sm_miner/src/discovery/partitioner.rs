use crate::dfg::activity_set::{ActivitySet, ActivitySetFamily};

use super::concurrency::ConcurrentPair;

fn resolves(excluded: &ActivitySet, (a, b): ConcurrentPair) -> bool {
    excluded.contains(a) || excluded.contains(b)
}

///
/// Compute all inclusion-minimal sets of activities to exclude, such that every concurrent pair loses at least one member
///
/// Branch-and-bound over the (sorted) list of pairs on an explicit work stack: a pair already resolved by the candidate
/// is skipped, otherwise the search branches into excluding `a` and excluding `b`. A candidate is dropped as soon as a
/// member of the (minimal) family is a subset of it.
///
/// At most `max_nof_solutions` sets are collected. With no concurrent pairs, the family consists of the empty set.
pub fn partition_activities(
    pairs: &[ConcurrentPair],
    max_nof_solutions: usize,
) -> ActivitySetFamily {
    let mut family = ActivitySetFamily::minimal();
    let mut stack: Vec<(usize, ActivitySet)> = vec![(0, ActivitySet::new())];
    while let Some((mut next, excluded)) = stack.pop() {
        if family.len() >= max_nof_solutions {
            log::debug!(
                "Stopping activity set search at {} solutions",
                family.len()
            );
            break;
        }
        if family.is_dominated(&excluded) {
            continue;
        }
        while next < pairs.len() && resolves(&excluded, pairs[next]) {
            next += 1;
        }
        match pairs.get(next) {
            None => {
                family.insert(excluded);
            }
            Some(&(a, b)) => {
                let mut without_b = excluded.clone();
                without_b.insert(b);
                let mut without_a = excluded;
                without_a.insert(a);
                // `a` is explored first
                stack.push((next + 1, without_b));
                stack.push((next + 1, without_a));
            }
        }
    }
    family
}

/// Activity subsets to build state machines for: the complements of the exclusion sets
pub fn kept_activity_sets(exclusions: &ActivitySetFamily, alphabet_len: usize) -> Vec<ActivitySet> {
    exclusions
        .iter()
        .map(|excluded| excluded.complement(alphabet_len))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(ids: &[usize]) -> ActivitySet {
        ids.iter().copied().collect()
    }

    #[test]
    fn single_pair_gives_two_sets() {
        let family = partition_activities(&[(2, 3)], 100);
        assert_eq!(family.clone().into_vec(), vec![set(&[2]), set(&[3])]);
        assert_eq!(kept_activity_sets(&family, 4), vec![set(&[1, 3]), set(&[1, 2])]);
    }

    #[test]
    fn no_pairs_keeps_everything() {
        let family = partition_activities(&[], 100);
        assert_eq!(family.clone().into_vec(), vec![ActivitySet::new()]);
        assert_eq!(kept_activity_sets(&family, 3), vec![set(&[1, 2])]);
    }

    #[test]
    fn triangle_needs_two_exclusions() {
        // a || b, a || c, b || c
        let pairs = [(1, 2), (1, 3), (2, 3)];
        let family = partition_activities(&pairs, 100);
        let sets = family.into_vec();
        assert_eq!(sets, vec![set(&[1, 2]), set(&[1, 3]), set(&[2, 3])]);
    }

    #[test]
    fn path_finds_all_minimal_covers() {
        // a || b, b || c: exclude {b} or {a, c}
        let pairs = [(1, 2), (2, 3)];
        let family = partition_activities(&pairs, 100);
        let mut sets = family.into_vec();
        sets.sort();
        let mut expected = vec![set(&[2]), set(&[1, 3])];
        expected.sort();
        assert_eq!(sets, expected);
    }

    #[test]
    fn families_are_minimal_and_cover_all_pairs() {
        let pairs = [(1, 2), (1, 3), (2, 4), (3, 4), (4, 5), (1, 5)];
        let family = partition_activities(&pairs, 1000);
        let sets: Vec<ActivitySet> = family.clone().into_vec();
        for s1 in &sets {
            for s2 in &sets {
                if s1 != s2 {
                    assert!(!s1.is_subset(s2));
                }
            }
            for pair in &pairs {
                assert!(resolves(s1, *pair));
            }
        }
        for kept in kept_activity_sets(&family, 6) {
            for (a, b) in pairs {
                assert!(!(kept.contains(a) && kept.contains(b)));
            }
        }
    }

    #[test]
    fn solution_cap_is_respected() {
        let pairs = [(1, 2), (3, 4), (5, 6)];
        assert_eq!(partition_activities(&pairs, 100).len(), 8);
        assert_eq!(partition_activities(&pairs, 3).len(), 3);
    }
}
