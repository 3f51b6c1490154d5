use serde::{Deserialize, Serialize};

use crate::event_log::activity_projection::{IndexedTraceStream, START_END};

use super::activity_set::ActivitySet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
///
/// Directly-follows matrix over alphabet IDs
///
/// `count(from, to)` is the number of times `to` directly followed `from` within a trace
/// (with the start/end marker `0` standing before the first and after the last activity of every trace).
///
/// Filtering never deletes counts: a filtered-out entry stores its negated magnitude (tombstone),
/// so [`DirectlyFollowsMatrix::restore`] can undo all filters.
pub struct DirectlyFollowsMatrix {
    counts: Vec<Vec<i64>>,
    occurrences: Vec<u64>,
}

impl DirectlyFollowsMatrix {
    /// Create an empty matrix over `size` alphabet IDs
    pub fn new(size: usize) -> Self {
        Self {
            counts: vec![vec![0; size]; size],
            occurrences: vec![0; size],
        }
    }

    /// Count all directly-follows pairs of the stream
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
        let mut matrix = Self::new(size);
        for (from, to) in pairs {
            matrix.counts[from][to] += 1;
            matrix.occurrences[to] += 1;
        }
        matrix
    }

    /// Number of alphabet IDs (rows/columns)
    pub fn size(&self) -> usize {
        self.occurrences.len()
    }

    /// Stored (signed) count; negative if filtered out
    pub fn count(&self, from: usize, to: usize) -> i64 {
        self.counts[from][to]
    }

    /// Raw count, ignoring filtering
    pub fn magnitude(&self, from: usize, to: usize) -> u64 {
        self.counts[from][to].unsigned_abs()
    }

    /// `true` if the entry is present and not filtered out
    pub fn is_active(&self, from: usize, to: usize) -> bool {
        self.counts[from][to] > 0
    }

    /// Number of occurrences of an activity (for the start/end marker: the number of traces)
    pub fn occurrences(&self, id: usize) -> u64 {
        self.occurrences[id]
    }

    /// Number of traces the matrix was built from
    pub fn num_traces(&self) -> u64 {
        self.occurrences[START_END]
    }

    /// Active successors of `from` (ascending)
    pub fn active_successors(&self, from: usize) -> impl Iterator<Item = usize> + '_ {
        (0..self.size()).filter(move |to| self.is_active(from, *to))
    }

    /// Active predecessors of `to` (ascending)
    pub fn active_predecessors(&self, to: usize) -> impl Iterator<Item = usize> + '_ {
        (0..self.size()).filter(move |from| self.is_active(*from, to))
    }

    /// `true` if the activity has at least one active incoming or outgoing entry
    pub fn is_activity_active(&self, id: usize) -> bool {
        self.active_successors(id).next().is_some()
            || self.active_predecessors(id).next().is_some()
    }

    /// Tombstone all entries with `|count| ≤ threshold`
    pub fn filter_absolute(&mut self, threshold: u64) {
        for row in &mut self.counts {
            for c in row.iter_mut() {
                if c.unsigned_abs() <= threshold {
                    *c = -c.abs();
                }
            }
        }
    }

    /// Tombstone all entries that are small relative to their row and column
    ///
    /// An entry is filtered out if `100·|count| ≤ threshold·min(rowMax, colMax)`, where `rowMax` is the
    /// largest magnitude of its row (outgoing) and `colMax` the largest magnitude of its column (incoming).
    /// `threshold` is a percentage.
    pub fn filter_relative(&mut self, threshold: u32) {
        let size = self.size();
        let row_max: Vec<u64> = (0..size)
            .map(|from| (0..size).map(|to| self.magnitude(from, to)).max().unwrap_or(0))
            .collect();
        let col_max: Vec<u64> = (0..size)
            .map(|to| (0..size).map(|from| self.magnitude(from, to)).max().unwrap_or(0))
            .collect();
        for (from, row) in self.counts.iter_mut().enumerate() {
            for (to, c) in row.iter_mut().enumerate() {
                let bound = u64::from(threshold) * row_max[from].min(col_max[to]);
                if 100 * c.unsigned_abs() <= bound {
                    *c = -c.abs();
                }
            }
        }
    }

    /// Clear all tombstones (undo all filters)
    pub fn restore(&mut self) {
        for row in &mut self.counts {
            for c in row.iter_mut() {
                *c = c.abs();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_log::activity_projection::EventLogActivityProjection;

    fn matrix_of(traces: &[Vec<&str>]) -> DirectlyFollowsMatrix {
        let proj = EventLogActivityProjection::from_traces(traces);
        DirectlyFollowsMatrix::from_stream(&proj.stream, proj.alphabet.len())
    }

    #[test]
    fn counts_pairs_within_traces() {
        // a=1, b=2, c=3
        let m = matrix_of(&[vec!["a", "b", "c"], vec!["a", "c", "b"]]);
        assert_eq!(m.count(0, 1), 2);
        assert_eq!(m.count(1, 2), 1);
        assert_eq!(m.count(2, 3), 1);
        assert_eq!(m.count(3, 2), 1);
        assert_eq!(m.count(3, 0), 1);
        assert_eq!(m.count(2, 0), 1);
        // no pair across the trace boundary
        assert_eq!(m.count(3, 1), 0);
        assert_eq!(m.count(2, 1), 0);
        assert_eq!(m.occurrences(1), 2);
        assert_eq!(m.occurrences(2), 2);
        assert_eq!(m.num_traces(), 2);
    }

    #[test]
    fn empty_traces_count_as_traces() {
        let m = matrix_of(&[vec![], vec!["a"], vec![]]);
        assert_eq!(m.num_traces(), 3);
        assert_eq!(m.count(0, 0), 2);
        assert_eq!(m.occurrences(1), 1);
    }

    #[test]
    fn projection_bridges_excluded_activities() {
        let proj = EventLogActivityProjection::from_traces(&[vec!["a", "b", "c"]]);
        let keep: ActivitySet = [1, 3].into_iter().collect();
        let m = DirectlyFollowsMatrix::from_stream_projected(&proj.stream, 4, &keep);
        assert_eq!(m.count(1, 3), 1);
        assert_eq!(m.count(1, 2), 0);
        assert_eq!(m.occurrences(2), 0);
        assert!(!m.is_activity_active(2));
    }

    #[test]
    fn absolute_filter_is_idempotent_and_reversible() {
        let mut m = matrix_of(&[vec!["a", "b"], vec!["a", "b"], vec!["a", "c"]]);
        let raw = m.clone();
        m.filter_absolute(1);
        assert_eq!(m.count(1, 3), -1);
        assert_eq!(m.count(1, 2), 2);
        assert!(!m.is_active(1, 3));
        assert_eq!(m.magnitude(1, 3), 1);

        let once = m.clone();
        m.filter_absolute(1);
        assert_eq!(m, once);

        m.restore();
        assert_eq!(m, raw);
        m.filter_absolute(1);
        assert_eq!(m, once);
    }

    #[test]
    fn relative_filter_uses_row_and_column_maxima() {
        // a->b 9 times, a->c once
        let mut traces = vec![vec!["a", "b"]; 9];
        traces.push(vec!["a", "c"]);
        let mut m = matrix_of(&traces);
        m.filter_relative(20);
        // a->c: rowMax(a) = 9, colMax(c) = 1 → bound 20·1 = 20 < 100 → kept
        assert!(m.is_active(1, 3));

        let mut traces = vec![vec!["a", "b"]; 9];
        traces.push(vec!["a", "c"]);
        traces.push(vec!["d", "c"]);
        traces.extend(vec![vec!["d", "c"]; 8]);
        let mut m = matrix_of(&traces);
        m.filter_relative(20);
        // a->c: rowMax(a) = 9, colMax(c) = 9 → 100 ≤ 180 → filtered
        let (a, c) = (1, 3);
        assert!(!m.is_active(a, c));
        assert_eq!(m.magnitude(a, c), 1);
        let once = m.clone();
        m.filter_relative(20);
        assert_eq!(m, once);
    }

    #[test]
    fn zero_relative_threshold_keeps_everything() {
        let mut m = matrix_of(&[vec!["a", "b"], vec!["b", "a"]]);
        let raw = m.clone();
        m.filter_relative(0);
        m.filter_absolute(0);
        assert_eq!(m, raw);
    }
}
