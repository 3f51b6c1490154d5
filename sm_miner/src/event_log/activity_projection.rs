use std::collections::{BTreeSet, HashMap};

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::dfg::activity_set::ActivitySet;

/// Label of the reserved combined start/end activity
pub const START_END_ACTIVITY: &str = "__START_END";
/// Alphabet ID of the reserved combined start/end activity
pub const START_END: usize = 0;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
///
/// Activity alphabet: dense IDs for all activity labels of a log
///
/// ID 0 is reserved for the virtual start/end marker ([`START_END`]).
/// All other IDs are assigned in lexicographic order of the labels.
pub struct ActivityAlphabet {
    activities: Vec<String>,
    act_to_index: HashMap<String, usize>,
}

impl ActivityAlphabet {
    /// Build the alphabet of all labels occurring in the passed traces
    pub fn from_traces<T, S>(traces: &[T]) -> Self
    where
        T: AsRef<[S]>,
        S: AsRef<str>,
    {
        let labels: BTreeSet<&str> = traces
            .iter()
            .flat_map(|t| t.as_ref().iter().map(AsRef::as_ref))
            .collect();
        let activities: Vec<String> = std::iter::once(START_END_ACTIVITY)
            .chain(labels)
            .map(str::to_string)
            .collect();
        let act_to_index = activities
            .iter()
            .enumerate()
            .skip(1)
            .map(|(i, act)| (act.clone(), i))
            .collect();
        Self {
            activities,
            act_to_index,
        }
    }

    /// Number of IDs (including the reserved start/end marker)
    pub fn len(&self) -> usize {
        self.activities.len()
    }

    /// `true` if there is no activity besides the start/end marker
    pub fn is_empty(&self) -> bool {
        self.activities.len() <= 1
    }

    /// ID of an activity label
    ///
    /// Only real activities are found; the reserved start/end label is never returned
    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.act_to_index.get(label).copied()
    }

    /// Label of an ID
    pub fn label_of(&self, id: usize) -> &str {
        &self.activities[id]
    }

    /// IDs of all activities (without the start/end marker)
    pub fn activity_ids(&self) -> std::ops::Range<usize> {
        1..self.activities.len()
    }

    /// Translate IDs to their sorted labels
    pub fn acts_to_names(&self, acts: impl IntoIterator<Item = usize>) -> Vec<String> {
        acts.into_iter()
            .map(|act| self.activities[act].clone())
            .sorted()
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
///
/// All traces flattened into one ID sequence
///
/// Layout: `marker, trace-1 activities, marker, trace-2 activities, marker, ...`
pub struct IndexedTraceStream {
    ids: Vec<usize>,
    num_traces: usize,
}

impl IndexedTraceStream {
    /// Flatten the traces using the passed alphabet
    ///
    /// Labels unknown to the alphabet are skipped.
    pub fn from_traces<T, S>(traces: &[T], alphabet: &ActivityAlphabet) -> Self
    where
        T: AsRef<[S]>,
        S: AsRef<str>,
    {
        let mut ids = Vec::with_capacity(
            traces.iter().map(|t| t.as_ref().len() + 1).sum::<usize>() + 1,
        );
        ids.push(START_END);
        for t in traces {
            ids.extend(
                t.as_ref()
                    .iter()
                    .filter_map(|label| alphabet.index_of(label.as_ref())),
            );
            ids.push(START_END);
        }
        Self {
            ids,
            num_traces: traces.len(),
        }
    }

    /// The flattened IDs
    pub fn ids(&self) -> &[usize] {
        &self.ids
    }

    /// Number of traces
    pub fn num_traces(&self) -> usize {
        self.num_traces
    }

    /// All directly-follows pairs of the stream
    ///
    /// If `keep` is passed, activities not contained in it are ignored (as if they did not occur).
    /// Markers are never ignored, so no pair spans two traces.
    pub fn projected_pairs<'a>(
        &'a self,
        keep: Option<&'a ActivitySet>,
    ) -> impl Iterator<Item = (usize, usize)> + 'a {
        self.ids
            .iter()
            .copied()
            .filter(move |id| *id == START_END || keep.map_or(true, |k| k.contains(*id)))
            .tuple_windows()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Projection of an event log on just activity labels: [`ActivityAlphabet`] and [`IndexedTraceStream`]
pub struct EventLogActivityProjection {
    /// Alphabet
    pub alphabet: ActivityAlphabet,
    /// Flattened traces
    pub stream: IndexedTraceStream,
}

impl EventLogActivityProjection {
    /// Project the passed (already classified) traces
    pub fn from_traces<T, S>(traces: &[T]) -> Self
    where
        T: AsRef<[S]>,
        S: AsRef<str>,
    {
        let alphabet = ActivityAlphabet::from_traces(traces);
        let stream = IndexedTraceStream::from_traces(traces, &alphabet);
        Self { alphabet, stream }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alphabet_is_sorted_and_reserves_zero() {
        let alphabet = ActivityAlphabet::from_traces(&[vec!["c", "a"], vec!["b", "a"]]);
        assert_eq!(alphabet.len(), 4);
        assert_eq!(alphabet.label_of(START_END), START_END_ACTIVITY);
        assert_eq!(alphabet.index_of("a"), Some(1));
        assert_eq!(alphabet.index_of("b"), Some(2));
        assert_eq!(alphabet.index_of("c"), Some(3));
        assert_eq!(alphabet.index_of(START_END_ACTIVITY), None);
    }

    #[test]
    fn reserved_label_does_not_collide_with_activity() {
        let alphabet = ActivityAlphabet::from_traces(&[vec![START_END_ACTIVITY]]);
        assert_eq!(alphabet.len(), 2);
        assert_eq!(alphabet.index_of(START_END_ACTIVITY), Some(1));
    }

    #[test]
    fn stream_separates_traces_with_markers() {
        let proj = EventLogActivityProjection::from_traces(&[vec!["a", "b"], vec![], vec!["b"]]);
        assert_eq!(proj.stream.ids(), &[0, 1, 2, 0, 0, 2, 0]);
        assert_eq!(proj.stream.num_traces(), 3);
    }

    #[test]
    fn projected_pairs_skip_excluded_activities() {
        let proj = EventLogActivityProjection::from_traces(&[vec!["a", "b", "c"]]);
        let keep: ActivitySet = [1, 3].into_iter().collect();
        let pairs: Vec<(usize, usize)> = proj.stream.projected_pairs(Some(&keep)).collect();
        assert_eq!(pairs, vec![(0, 1), (1, 3), (3, 0)]);
        assert_eq!(proj.stream.projected_pairs(None).count(), 4);
    }

    #[test]
    fn empty_log_has_only_marker() {
        let proj = EventLogActivityProjection::from_traces::<Vec<&str>, &str>(&[]);
        assert!(proj.alphabet.is_empty());
        assert_eq!(proj.stream.ids(), &[0]);
        assert_eq!(proj.stream.projected_pairs(None).count(), 0);
    }
}
