use serde::{Deserialize, Serialize};

use crate::{
    dfg::activity_set::ActivitySet,
    discovery::concurrency::within_density_bound,
    event_log::activity_projection::{IndexedTraceStream, START_END},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
///
/// Directly-follows counts with a fixed threshold configuration
///
/// Row/column `0` is the virtual start/end activity. In contrast to the
/// [`DirectlyFollowsMatrix`](crate::dfg::df_matrix::DirectlyFollowsMatrix), counts are never modified:
/// the thresholds are evaluated on demand.
pub struct CountMatrix {
    counts: Vec<Vec<u64>>,
    occurrences: Vec<u64>,
    row_max: Vec<u64>,
    col_max: Vec<u64>,
    absolute_threshold: u64,
    relative_threshold: u32,
}

impl CountMatrix {
    /// Count all directly-follows pairs of the stream (without thresholds)
    pub fn from_stream(stream: &IndexedTraceStream, size: usize) -> Self {
        Self::from_pairs(stream.projected_pairs(None), size)
    }

    /// Count the directly-follows pairs of the stream, ignoring all activities not in `keep`
    pub fn from_stream_projected(
        stream: &IndexedTraceStream,
        size: usize,
        keep: &ActivitySet,
    ) -> Self {
        Self::from_pairs(stream.projected_pairs(Some(keep)), size)
    }

    fn from_pairs(pairs: impl Iterator<Item = (usize, usize)>, size: usize) -> Self {
        let mut counts = vec![vec![0; size]; size];
        let mut occurrences = vec![0; size];
        for (from, to) in pairs {
            counts[from][to] += 1;
            occurrences[to] += 1;
        }
        let row_max = counts
            .iter()
            .map(|row| row.iter().copied().max().unwrap_or(0))
            .collect();
        let col_max = (0..size)
            .map(|to| counts.iter().map(|row| row[to]).max().unwrap_or(0))
            .collect();
        Self {
            counts,
            occurrences,
            row_max,
            col_max,
            absolute_threshold: 0,
            relative_threshold: 0,
        }
    }

    /// Use the given thresholds for [`CountMatrix::passes`]
    pub fn with_thresholds(mut self, absolute_threshold: u64, relative_threshold: u32) -> Self {
        self.absolute_threshold = absolute_threshold;
        self.relative_threshold = relative_threshold;
        self
    }

    /// Number of alphabet IDs (rows/columns)
    pub fn size(&self) -> usize {
        self.occurrences.len()
    }

    /// Number of times `to` directly followed `from`
    pub fn count(&self, from: usize, to: usize) -> u64 {
        self.counts[from][to]
    }

    /// Number of occurrences of an activity (for the start/end activity: the number of traces)
    pub fn occurrences(&self, id: usize) -> u64 {
        self.occurrences[id]
    }

    /// Check if the entry survives both thresholds
    ///
    /// That is, `count > absolute` and `100·count > relative·min(rowMax, colMax)`.
    pub fn passes(&self, from: usize, to: usize) -> bool {
        let c = self.count(from, to);
        let bound = u64::from(self.relative_threshold) * self.row_max[from].min(self.col_max[to]);
        c > self.absolute_threshold && 100 * c > bound
    }

    /// All entries surviving the thresholds, sorted
    pub fn edges(&self) -> Vec<(usize, usize)> {
        let size = self.size();
        (0..size)
            .flat_map(|from| (0..size).map(move |to| (from, to)))
            .filter(|(from, to)| self.passes(*from, *to))
            .collect()
    }

    /// Check if two distinct activities follow each other in both directions
    ///
    /// Both directions have to survive the thresholds and together may not exceed the smaller occurrence count.
    pub fn both(&self, a: usize, b: usize) -> bool {
        a != b
            && a != START_END
            && b != START_END
            && self.passes(a, b)
            && self.passes(b, a)
            && within_density_bound(
                self.count(a, b),
                self.count(b, a),
                self.occurrences(a),
                self.occurrences(b),
            )
    }

    /// All pairs `(a, b)`, `a < b`, of activities in `candidate` in the [`CountMatrix::both`] relation
    pub fn both_pairs<'a>(
        &'a self,
        candidate: &'a ActivitySet,
    ) -> impl Iterator<Item = (usize, usize)> + 'a {
        candidate.iter().flat_map(move |a| {
            candidate
                .iter()
                .filter(move |b| a < *b && self.both(a, *b))
                .map(move |b| (a, b))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_log::activity_projection::EventLogActivityProjection;

    fn matrix_of(traces: &[Vec<&str>]) -> CountMatrix {
        let proj = EventLogActivityProjection::from_traces(traces);
        CountMatrix::from_stream(&proj.stream, proj.alphabet.len())
    }

    #[test]
    fn thresholds_are_evaluated_on_demand() {
        let mut traces = vec![vec!["a", "b"]; 4];
        traces.push(vec!["a", "c"]);
        let m = matrix_of(&traces);
        assert_eq!(m.count(1, 2), 4);
        assert!(m.passes(1, 3));
        let m = m.with_thresholds(1, 0);
        assert!(!m.passes(1, 3));
        assert!(m.passes(1, 2));
        assert_eq!(m.count(1, 3), 1);
        assert_eq!(m.edges(), vec![(0, 1), (1, 2), (2, 0)]);
    }

    #[test]
    fn relative_threshold_uses_row_and_column_maxima() {
        // a->b 9 times, a->c once, d->c 9 times
        let mut traces = vec![vec!["a", "b"]; 9];
        traces.push(vec!["a", "c"]);
        traces.extend(vec![vec!["d", "c"]; 9]);
        let m = matrix_of(&traces).with_thresholds(0, 20);
        assert!(!m.passes(1, 3));
        assert!(m.passes(1, 2));
    }

    #[test]
    fn both_relation_needs_interleaving() {
        let m = matrix_of(&[vec!["a", "b", "c"], vec!["a", "c", "b"]]);
        assert!(m.both(2, 3));
        assert!(!m.both(1, 2));
        let all = ActivitySet::full(4);
        assert_eq!(m.both_pairs(&all).collect::<Vec<_>>(), vec![(2, 3)]);

        // short loop: both directions, but too dense
        let m = matrix_of(&[vec!["a", "b", "a", "b", "a"]]);
        assert!(!m.both(1, 2));
    }
}
