use std::collections::HashSet;

use itertools::Itertools;

use crate::petri_net::{
    petri_net_struct::{ArcType, PetriNet, PlaceID, TransitionID},
    pre_post_sets::PrePostSets,
};

use super::reducer::ReductionStep;

#[derive(Debug, Clone, Copy)]
struct Elimination {
    transition: TransitionID,
    input: PlaceID,
    output: PlaceID,
}

fn candidate(net: &PetriNet, sets: &PrePostSets, t: TransitionID) -> Option<Elimination> {
    let (p, q) = sets.single_in_single_out(t)?;
    if p == q
        || !matches!(sets.preset_of_place(q), [(only, 1)] if *only == t)
        || net.is_in_initial_marking(&p)
        || net.is_marking_place(&q)
    {
        return None;
    }
    Some(Elimination {
        transition: t,
        input: p,
        output: q,
    })
}

/// Non-overlapping eliminations, in canonical order of their transitions
fn plan(net: &PetriNet) -> Vec<Elimination> {
    let sets = PrePostSets::from_net(net);
    let mut touched: HashSet<PlaceID> = HashSet::new();
    net.transitions()
        .filter(|t| t.is_silent())
        .filter_map(|t| candidate(net, &sets, t.id()))
        .sorted_by_cached_key(|e| net.canonical_form(e.transition))
        .filter(|e| {
            if touched.contains(&e.input) || touched.contains(&e.output) {
                return false;
            }
            touched.insert(e.input);
            touched.insert(e.output);
            true
        })
        .collect()
}

fn apply(net: &mut PetriNet, e: Elimination) {
    let successors: Vec<(TransitionID, u32)> = net
        .arcs()
        .iter()
        .filter_map(|arc| match arc.from_to {
            ArcType::PlaceTransition(p, t) if p == e.output => Some((t, arc.weight)),
            _ => None,
        })
        .collect();
    net.remove_transition(e.transition);
    net.remove_place(e.output);
    for (t, weight) in successors {
        net.add_arc(ArcType::place_to_transition(e.input, t), Some(weight));
    }
}

///
/// Eliminate invisible transitions whose output place is only fed by them
///
/// An invisible transition `t` with a single input place `p` and a single output place `q` (both arcs of weight 1) can be
/// removed if `t` is the only input of `q`: `p` takes over all outgoing arcs of `q` and `q` is removed.
///
/// The elimination is skipped if `p` is part of the initial marking or `q` is part of any marking.
pub fn eliminate_silent_transitions(net: &mut PetriNet) -> Vec<ReductionStep> {
    let mut steps = Vec::new();
    loop {
        let planned = plan(net);
        if planned.is_empty() {
            return steps;
        }
        for e in planned {
            apply(net, e);
            steps.push(ReductionStep::SilentTransitionEliminated {
                transition: e.transition,
                input: e.input,
                removed_place: e.output,
            });
        }
    }
}
