use crate::dfg::df_matrix::DirectlyFollowsMatrix;

/// Unordered pair of concurrent activities, stored as `(a, b)` with `a < b`
pub type ConcurrentPair = (usize, usize);

/// Check if `a` and `b` directly follow each other in both directions
///
/// Uses raw magnitudes, so the result does not depend on any filter applied to the matrix.
pub fn is_concurrent(matrix: &DirectlyFollowsMatrix, a: usize, b: usize) -> bool {
    a != b && matrix.magnitude(a, b) > 0 && matrix.magnitude(b, a) > 0
}

/// Density bound of the weighted concurrency test
///
/// Two activities only count as interleaving if the directed counts between them (`ab` and `ba`) together do not
/// exceed the smaller of their occurrence counts. This rejects pairs that mostly repeat each other (e.g., short loops).
pub fn within_density_bound(ab: u64, ba: u64, occurrences_a: u64, occurrences_b: u64) -> bool {
    ab + ba <= occurrences_a.min(occurrences_b)
}

/// All concurrent pairs of (non-reserved) activities, sorted
pub fn concurrent_pairs(matrix: &DirectlyFollowsMatrix) -> Vec<ConcurrentPair> {
    let size = matrix.size();
    (1..size)
        .flat_map(|a| ((a + 1)..size).map(move |b| (a, b)))
        .filter(|(a, b)| is_concurrent(matrix, *a, *b))
        .collect()
}
