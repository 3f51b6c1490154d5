use std::collections::HashSet;

use crate::dfg::activity_set::{ActivitySet, ActivitySetFamily};

use super::count_matrix_struct::CountMatrix;

///
/// Split `activities` into inclusion-maximal subsets without any pair in the [`CountMatrix::both`] relation
///
/// Exhaustive search on an explicit frontier stack: a candidate containing a pair `(a, b)` is replaced by the candidate
/// without `a` and the candidate without `b`. Visited candidates are memoized, and candidates contained in an already
/// accepted solution are skipped.
///
/// At most `max_nof_solutions` solutions are accepted.
pub fn split_activities(
    matrix: &CountMatrix,
    activities: &ActivitySet,
    max_nof_solutions: usize,
) -> ActivitySetFamily {
    let mut solutions = ActivitySetFamily::maximal();
    let mut visited: HashSet<ActivitySet> = HashSet::new();
    let mut frontier: Vec<ActivitySet> = vec![activities.clone()];
    while let Some(candidate) = frontier.pop() {
        if !visited.insert(candidate.clone()) || solutions.is_dominated(&candidate) {
            continue;
        }
        let first_pair = matrix.both_pairs(&candidate).next();
        match first_pair {
            None => {
                solutions.insert(candidate);
                if solutions.len() >= max_nof_solutions {
                    log::debug!("Stopping exact split at {} solutions", solutions.len());
                    break;
                }
            }
            Some((a, b)) => {
                let mut without_b = candidate.clone();
                without_b.remove(b);
                let mut without_a = candidate;
                without_a.remove(a);
                frontier.push(without_b);
                frontier.push(without_a);
            }
        }
    }
    log::debug!(
        "Exact split: {} solutions, {} visited candidates",
        solutions.len(),
        visited.len()
    );
    solutions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_log::activity_projection::EventLogActivityProjection;

    fn set(ids: &[usize]) -> ActivitySet {
        ids.iter().copied().collect()
    }

    fn split(traces: &[Vec<&str>], max: usize) -> Vec<ActivitySet> {
        let proj = EventLogActivityProjection::from_traces(traces);
        let m = CountMatrix::from_stream(&proj.stream, proj.alphabet.len());
        let mut sets =
            split_activities(&m, &ActivitySet::full(proj.alphabet.len()), max).into_vec();
        sets.sort();
        sets
    }

    #[test]
    fn sequential_log_is_not_split() {
        assert_eq!(split(&[vec!["a", "b", "c"]], 10), vec![set(&[1, 2, 3])]);
    }

    #[test]
    fn parallel_pair_is_split() {
        let traces = vec![vec!["a", "b", "c", "d"], vec!["a", "c", "b", "d"]];
        let mut expected = vec![set(&[1, 2, 4]), set(&[1, 3, 4])];
        expected.sort();
        assert_eq!(split(&traces, 10), expected);
    }

    #[test]
    fn three_parallel_activities_give_singletons() {
        // b, c, d pairwise interleaved
        let traces = vec![
            vec!["a", "b", "c", "d"],
            vec!["a", "c", "d", "b"],
            vec!["a", "d", "b", "c"],
            vec!["a", "b", "d", "c"],
            vec!["a", "c", "b", "d"],
            vec!["a", "d", "c", "b"],
        ];
        let mut expected = vec![set(&[1, 2]), set(&[1, 3]), set(&[1, 4])];
        expected.sort();
        assert_eq!(split(&traces, 10), expected);
    }

    #[test]
    fn solutions_are_capped() {
        let traces = vec![vec!["a", "b", "c", "d"], vec!["a", "c", "b", "d"]];
        assert_eq!(split(&traces, 1).len(), 1);
    }
}
