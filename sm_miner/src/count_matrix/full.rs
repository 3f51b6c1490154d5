use rayon::prelude::*;

use crate::{
    dfg::activity_set::ActivitySet,
    discovery::{
        full::{get_current_time_millis, seconds_since, DiscoveryReport},
        merge::NetMerger,
        parameters::{DiscoveryError, DiscoveryParameters},
        synthesis::{synthesize_fragment, StateMachineImages},
    },
    event_log::activity_projection::EventLogActivityProjection,
    petri_net::petri_net_struct::PetriNet,
    reduction::{reducer::Reducer, silent_chains::collapse_silent_chains},
};

use super::{count_matrix_struct::CountMatrix, exact_split::split_activities};

///
/// Discover an accepting [`PetriNet`] using thresholded count matrices and an exact activity split
///
/// Same pipeline as [`discover_petri_net`](crate::discovery::full::discover_petri_net), but the activity sets are
/// the inclusion-maximal subsets without any pair in the [`CountMatrix::both`] relation (which respects the thresholds
/// and the weighted concurrency bound). `place → invisible → place` chains are collapsed before the configured
/// reductions are applied.
pub fn discover_petri_net_count_matrix<T, S>(
    traces: &[T],
    params: &DiscoveryParameters,
) -> Result<(PetriNet, DiscoveryReport), DiscoveryError>
where
    T: AsRef<[S]>,
    S: AsRef<str>,
{
    discover_petri_net_count_matrix_with_timing_fn(traces, params, &get_current_time_millis)
}

/// Run count matrix based discovery
///
/// Measures durations using the passed `get_time_millis_fn` function
pub fn discover_petri_net_count_matrix_with_timing_fn<T, S>(
    traces: &[T],
    params: &DiscoveryParameters,
    get_time_millis_fn: &dyn Fn() -> u128,
) -> Result<(PetriNet, DiscoveryReport), DiscoveryError>
where
    T: AsRef<[S]>,
    S: AsRef<str>,
{
    params.validate()?;
    log::info!(
        "Started count matrix discovery on {} traces",
        traces.len()
    );
    let mut report = DiscoveryReport::default();
    let total_start = get_time_millis_fn();

    let mut start = get_time_millis_fn();
    let proj = EventLogActivityProjection::from_traces(traces);
    let alphabet = &proj.alphabet;
    let matrix = CountMatrix::from_stream(&proj.stream, alphabet.len())
        .with_thresholds(params.absolute_threshold, params.relative_threshold);
    report.durations.matrix = seconds_since(get_time_millis_fn, start);

    start = get_time_millis_fn();
    let all_activities = ActivitySet::full(alphabet.len());
    report.concurrent_pairs = matrix
        .both_pairs(&all_activities)
        .map(|(a, b)| {
            (
                alphabet.label_of(a).to_string(),
                alphabet.label_of(b).to_string(),
            )
        })
        .collect();
    report.durations.concurrency = seconds_since(get_time_millis_fn, start);

    start = get_time_millis_fn();
    let solutions = split_activities(&matrix, &all_activities, params.max_nof_solutions).into_vec();
    report.durations.partitioning = seconds_since(get_time_millis_fn, start);
    report.activity_sets = solutions
        .iter()
        .map(|set| alphabet.acts_to_names(set.iter()))
        .collect();
    log::debug!("#Activity sets: {}", solutions.len());

    start = get_time_millis_fn();
    let edge_sets: Vec<Vec<(usize, usize)>> = solutions
        .par_iter()
        .map(|keep| {
            CountMatrix::from_stream_projected(&proj.stream, alphabet.len(), keep)
                .with_thresholds(params.absolute_threshold, params.relative_threshold)
                .edges()
        })
        .collect();
    report.durations.sub_matrices = seconds_since(get_time_millis_fn, start);

    start = get_time_millis_fn();
    let mut merger = NetMerger::new(params.merge);
    for edges in edge_sets {
        synthesize_fragment(&mut merger, &StateMachineImages::from_edges(edges), alphabet);
    }
    let mut net = merger.finish();
    report.durations.synthesis = seconds_since(get_time_millis_fn, start);

    start = get_time_millis_fn();
    let mut steps = collapse_silent_chains(&mut net);
    steps.extend(Reducer::new(params.reductions.clone()).reduce(&mut net));
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
