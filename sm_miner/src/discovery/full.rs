use std::time::{SystemTime, UNIX_EPOCH};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{
    dfg::{activity_set::ActivitySet, df_matrix::DirectlyFollowsMatrix},
    event_log::activity_projection::{EventLogActivityProjection, IndexedTraceStream},
    petri_net::petri_net_struct::PetriNet,
    reduction::reducer::Reducer,
};

use super::{
    concurrency::concurrent_pairs,
    merge::NetMerger,
    parameters::{DiscoveryError, DiscoveryParameters},
    partitioner::{kept_activity_sets, partition_activities},
    synthesis::{synthesize_fragment, StateMachineImages},
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
/// Duration (in seconds) per phase of discovery (+ total time)
pub struct DiscoveryDurations {
    /// Building the directly-follows matrix (in seconds)
    pub matrix: f32,
    /// Detecting concurrent activity pairs (in seconds)
    pub concurrency: f32,
    /// Searching activity sets (in seconds)
    pub partitioning: f32,
    /// Building the (filtered) sub-matrices (in seconds)
    pub sub_matrices: f32,
    /// Synthesizing and merging state machines (in seconds)
    pub synthesis: f32,
    /// Structural reduction (in seconds)
    pub reduction: f32,
    /// Total duration (in seconds)
    pub total: f32,
}

impl DiscoveryDurations {
    /// Serialize to JSON string
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
    /// Deserialize from JSON string
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
/// Additional information on a discovery run
pub struct DiscoveryReport {
    /// Durations of the individual phases
    pub durations: DiscoveryDurations,
    /// Concurrent activity pairs (labels)
    pub concurrent_pairs: Vec<(String, String)>,
    /// Activity sets a state machine was built for (sorted labels)
    pub activity_sets: Vec<Vec<String>>,
    /// Diagnostics of the applied reductions
    pub diagnostics: Vec<String>,
}

/// Get current system time milliseconds
pub fn get_current_time_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default()
}

pub(crate) fn seconds_since(get_time_millis_fn: &dyn Fn() -> u128, start: u128) -> f32 {
    get_time_millis_fn().saturating_sub(start) as f32 / 1000.0
}

/// Project the stream onto every kept activity set and filter the resulting matrices
///
/// Matrices are built in parallel, in the order of `kept`.
pub fn collect_sub_matrices(
    stream: &IndexedTraceStream,
    alphabet_len: usize,
    kept: &[ActivitySet],
    params: &DiscoveryParameters,
) -> Vec<DirectlyFollowsMatrix> {
    kept.par_iter()
        .map(|keep| {
            let mut matrix =
                DirectlyFollowsMatrix::from_stream_projected(stream, alphabet_len, keep);
            matrix.filter_absolute(params.absolute_threshold);
            matrix.filter_relative(params.relative_threshold);
            matrix
        })
        .collect()
}

///
/// Discover an accepting [`PetriNet`] by decomposing the log into state machines
///
/// 1. Count the directly-follows relation of the traces
/// 2. Find concurrent activity pairs (both directions observed)
/// 3. Search all minimal sets of activities to leave out, so no concurrent pair is left in any remaining set
/// 4. Build a filtered directly-follows matrix for the log projected on every remaining set
/// 5. Synthesize a state machine per matrix and merge them into one net
/// 6. Apply the configured reductions
///
/// Additionally returns a [`DiscoveryReport`] (durations, intermediate results and reduction diagnostics).
pub fn discover_petri_net<T, S>(
    traces: &[T],
    params: &DiscoveryParameters,
) -> Result<(PetriNet, DiscoveryReport), DiscoveryError>
where
    T: AsRef<[S]>,
    S: AsRef<str>,
{
    discover_petri_net_with_timing_fn(traces, params, &get_current_time_millis)
}

/// Run state machine based discovery
///
/// Measures [`DiscoveryDurations`] using the passed `get_time_millis_fn` function
pub fn discover_petri_net_with_timing_fn<T, S>(
    traces: &[T],
    params: &DiscoveryParameters,
    get_time_millis_fn: &dyn Fn() -> u128,
) -> Result<(PetriNet, DiscoveryReport), DiscoveryError>
where
    T: AsRef<[S]>,
    S: AsRef<str>,
{
    params.validate()?;
    log::info!("Started state machine discovery on {} traces", traces.len());
    let mut report = DiscoveryReport::default();
    let total_start = get_time_millis_fn();

    let mut start = get_time_millis_fn();
    let proj = EventLogActivityProjection::from_traces(traces);
    let alphabet = &proj.alphabet;
    let matrix = DirectlyFollowsMatrix::from_stream(&proj.stream, alphabet.len());
    report.durations.matrix = seconds_since(get_time_millis_fn, start);
    log::debug!(
        "Built directly-follows matrix over {} activities in {:.4}s",
        alphabet.len() - 1,
        report.durations.matrix
    );

    start = get_time_millis_fn();
    let pairs = concurrent_pairs(&matrix);
    report.durations.concurrency = seconds_since(get_time_millis_fn, start);
    report.concurrent_pairs = pairs
        .iter()
        .map(|(a, b)| {
            (
                alphabet.label_of(*a).to_string(),
                alphabet.label_of(*b).to_string(),
            )
        })
        .collect();
    log::debug!("#Concurrent pairs: {}", pairs.len());

    start = get_time_millis_fn();
    let exclusions = partition_activities(&pairs, params.max_nof_solutions);
    let kept = kept_activity_sets(&exclusions, alphabet.len());
    report.durations.partitioning = seconds_since(get_time_millis_fn, start);
    report.activity_sets = kept
        .iter()
        .map(|set| alphabet.acts_to_names(set.iter()))
        .collect();
    log::debug!(
        "#Activity sets: {} (took {:.4}s)",
        kept.len(),
        report.durations.partitioning
    );

    start = get_time_millis_fn();
    let sub_matrices = collect_sub_matrices(&proj.stream, alphabet.len(), &kept, params);
    report.durations.sub_matrices = seconds_since(get_time_millis_fn, start);

    start = get_time_millis_fn();
    let mut merger = NetMerger::new(params.merge);
    for sub_matrix in &sub_matrices {
        synthesize_fragment(&mut merger, &StateMachineImages::from_matrix(sub_matrix), alphabet);
    }
    let mut net = merger.finish();
    report.durations.synthesis = seconds_since(get_time_millis_fn, start);
    log::debug!(
        "Merged {} state machines: {} places, {} transitions",
        sub_matrices.len(),
        net.num_places(),
        net.num_transitions()
    );

    start = get_time_millis_fn();
    let steps = Reducer::new(params.reductions.clone()).reduce(&mut net);
    report.diagnostics = steps.iter().map(ToString::to_string).collect();
    report.durations.reduction = seconds_since(get_time_millis_fn, start);

    report.durations.total = seconds_since(get_time_millis_fn, total_start);
    log::info!(
        "Discovered net with {} places and {} transitions in {:.4}s",
        net.num_places(),
        net.num_transitions(),
        report.durations.total
    );
    Ok((net, report))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn durations_use_timing_fn() {
        let clock = std::cell::Cell::new(0u128);
        let tick = || {
            clock.set(clock.get() + 500);
            clock.get()
        };
        let traces = vec![vec!["a", "b"]];
        let (_, report) =
            discover_petri_net_with_timing_fn(&traces, &DiscoveryParameters::default(), &tick)
                .unwrap();
        assert!(report.durations.total > report.durations.matrix);
        assert_eq!(report.durations.matrix, 0.5);
    }

    #[test]
    fn invalid_parameters_stop_discovery() {
        let params = DiscoveryParameters {
            relative_threshold: 200,
            ..Default::default()
        };
        let traces = vec![vec!["a"]];
        assert_eq!(
            discover_petri_net(&traces, &params).map(|_| ()),
            Err(DiscoveryError::RelativeThresholdOutOfRange(200))
        );
    }

    #[test]
    fn sub_matrices_keep_order_of_sets() {
        let traces = vec![vec!["a", "b", "c"], vec!["a", "c", "b"]];
        let proj = EventLogActivityProjection::from_traces(&traces);
        let kept: Vec<ActivitySet> = vec![
            [1, 2].into_iter().collect(),
            [1, 3].into_iter().collect(),
        ];
        let matrices =
            collect_sub_matrices(&proj.stream, 4, &kept, &DiscoveryParameters::default());
        assert_eq!(matrices.len(), 2);
        assert_eq!(matrices[0].count(1, 2), 2);
        assert_eq!(matrices[0].occurrences(3), 0);
        assert_eq!(matrices[1].count(1, 3), 2);
        assert_eq!(matrices[1].occurrences(2), 0);
    }

    #[test]
    fn report_lists_pairs_and_sets() {
        let traces = vec![vec!["a", "b", "c"], vec!["a", "c", "b"]];
        let (_, report) = discover_petri_net(&traces, &DiscoveryParameters::default()).unwrap();
        assert_eq!(
            report.concurrent_pairs,
            vec![("b".to_string(), "c".to_string())]
        );
        assert_eq!(
            report.activity_sets,
            vec![
                vec!["a".to_string(), "c".to_string()],
                vec!["a".to_string(), "b".to_string()]
            ]
        );
        assert!(report.durations.to_json().is_ok());
    }
}
