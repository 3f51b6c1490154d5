use std::collections::BTreeSet;

use crate::{
    discover_petri_net,
    petri_net::{
        petri_net_struct::{PetriNet, PlaceID},
        semantics::accepted_traces,
    },
    DiscoveryParameters,
};


/// Upper bound on explored (marking, trace) states when enumerating languages in tests
pub(crate) const MAX_STATES: usize = 200_000;

pub(crate) fn language_of(traces: &[Vec<&str>]) -> BTreeSet<Vec<String>> {
    traces
        .iter()
        .map(|t| t.iter().map(|s| s.to_string()).collect())
        .collect()
}

pub(crate) fn bounded_language(net: &PetriNet, max_len: usize) -> BTreeSet<Vec<String>> {
    accepted_traces(net, max_len, MAX_STATES)
}

/// Places of the initial marking and of all final markings
pub(crate) fn marking_places(net: &PetriNet) -> BTreeSet<PlaceID> {
    net.initial_marking
        .iter()
        .chain(net.final_markings.iter().flatten())
        .flat_map(|m| m.keys().copied())
        .collect()
}

/// Every transition consumes and produces at least one token
pub(crate) fn assert_every_transition_connected(net: &PetriNet) {
    for t in net.transition_ids() {
        assert!(!net.preset_of_transition(t).is_empty(), "{t:?} has an empty preset");
        assert!(!net.postset_of_transition(t).is_empty(), "{t:?} has an empty postset");
    }
}

/// Discovered net without any reductions applied
pub(crate) fn unreduced_net(traces: &[Vec<&str>]) -> PetriNet {
    let params = DiscoveryParameters {
        reductions: Vec::new(),
        ..Default::default()
    };
    discover_petri_net(traces, &params).unwrap().0
}

#[test]
fn test_readme_scenario() {
    let traces = vec![vec!["a", "b", "c"], vec!["a", "c", "b"]];
    let (net, report) = discover_petri_net(&traces, &DiscoveryParameters::default()).unwrap();
    assert_eq!(
        report.concurrent_pairs,
        vec![("b".to_string(), "c".to_string())]
    );
    assert_eq!(net.visible_labels(), vec!["a", "b", "c"]);
}
