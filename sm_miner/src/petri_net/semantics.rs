use std::collections::{BTreeMap, BTreeSet, HashSet, VecDeque};

use super::{
    petri_net_struct::{Marking, PetriNet, PlaceID, TransitionID},
    pre_post_sets::PrePostSets,
};

/// Marking in canonical form (sorted, without empty places)
pub type CanonicalMarking = BTreeMap<PlaceID, u64>;

/// Convert a [`Marking`] into its [`CanonicalMarking`]
pub fn canonical_marking(marking: &Marking) -> CanonicalMarking {
    marking
        .iter()
        .filter(|(_, tokens)| **tokens > 0)
        .map(|(p, tokens)| (*p, *tokens))
        .collect()
}

/// Check if transition `t` is enabled in `marking`
pub fn is_enabled(sets: &PrePostSets, marking: &CanonicalMarking, t: TransitionID) -> bool {
    sets.preset_of_transition(t)
        .iter()
        .all(|(p, w)| marking.get(p).copied().unwrap_or(0) >= u64::from(*w))
}

/// Fire (enabled) transition `t` in `marking`, returning the successor marking
pub fn fire(sets: &PrePostSets, marking: &CanonicalMarking, t: TransitionID) -> CanonicalMarking {
    let mut next = marking.clone();
    for (p, w) in sets.preset_of_transition(t) {
        if let Some(tokens) = next.get_mut(p) {
            *tokens -= u64::from(*w);
            if *tokens == 0 {
                next.remove(p);
            }
        }
    }
    for (p, w) in sets.postset_of_transition(t) {
        *next.entry(*p).or_insert(0) += u64::from(*w);
    }
    next
}

///
/// Enumerate the accepted language of a [`PetriNet`] up to a maximal trace length
///
/// A trace (sequence of visible labels) is accepted if a firing sequence producing it leads from the initial marking
/// to one of the final markings. Invisible transitions can fire at any point without adding to the trace.
///
/// The search stops after `max_states` distinct (marking, trace) states, which bounds the work for unbounded nets.
pub fn accepted_traces(
    net: &PetriNet,
    max_len: usize,
    max_states: usize,
) -> BTreeSet<Vec<String>> {
    let mut accepted = BTreeSet::new();
    let Some(initial) = net.initial_marking.as_ref() else {
        return accepted;
    };
    let finals: HashSet<CanonicalMarking> = net
        .final_markings
        .iter()
        .flatten()
        .map(canonical_marking)
        .collect();
    let sets = PrePostSets::from_net(net);
    let transitions: Vec<(TransitionID, Option<String>)> = net
        .transitions()
        .map(|t| (t.id(), t.label.clone()))
        .collect();

    let mut seen: HashSet<(CanonicalMarking, Vec<String>)> = HashSet::new();
    let mut queue: VecDeque<(CanonicalMarking, Vec<String>)> = VecDeque::new();
    queue.push_back((canonical_marking(initial), Vec::new()));
    while let Some((marking, trace)) = queue.pop_front() {
        if seen.len() >= max_states {
            break;
        }
        if !seen.insert((marking.clone(), trace.clone())) {
            continue;
        }
        if finals.contains(&marking) {
            accepted.insert(trace.clone());
        }
        for (t, label) in &transitions {
            if !is_enabled(&sets, &marking, *t) {
                continue;
            }
            let next = fire(&sets, &marking, *t);
            match label {
                None => queue.push_back((next, trace.clone())),
                Some(label) if trace.len() < max_len => {
                    let mut next_trace = trace.clone();
                    next_trace.push(label.clone());
                    queue.push_back((next, next_trace));
                }
                Some(_) => {}
            }
        }
    }
    accepted
}
