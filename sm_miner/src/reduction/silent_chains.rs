use std::collections::HashSet;

use crate::petri_net::{
    petri_net_struct::{ArcType, PetriNet, PlaceID, TransitionID},
    pre_post_sets::PrePostSets,
};

use super::{reducer::ReductionStep, simple_fusion::silent_connectors};

#[derive(Debug, Clone, Copy)]
struct Chain {
    producer: TransitionID,
    from: PlaceID,
    transition: TransitionID,
    to: PlaceID,
}

fn chain(
    net: &PetriNet,
    sets: &PrePostSets,
    (t, from, to): (TransitionID, PlaceID, PlaceID),
) -> Option<Chain> {
    if from == to || net.is_marking_place(&from) || net.is_marking_place(&to) {
        return None;
    }
    let producer = match (sets.preset_of_place(from), sets.postset_of_place(from)) {
        ([(producer, 1)], [(only, 1)]) if *only == t && *producer != t => *producer,
        _ => return None,
    };
    match (sets.preset_of_place(to), sets.postset_of_place(to)) {
        ([(only, 1)], [_]) if *only == t => Some(Chain {
            producer,
            from,
            transition: t,
            to,
        }),
        _ => None,
    }
}

///
/// Collapse `place → invisible transition → place` chains
///
/// If both places have exactly one input and one output arc (and are not part of any marking), the producer of the
/// first place produces directly into the second place. The invisible transition and the first place are removed.
pub fn collapse_silent_chains(net: &mut PetriNet) -> Vec<ReductionStep> {
    let mut steps = Vec::new();
    loop {
        let sets = PrePostSets::from_net(net);
        let mut touched: HashSet<PlaceID> = HashSet::new();
        let chains: Vec<Chain> = silent_connectors(net, &sets)
            .into_iter()
            .filter_map(|c| chain(net, &sets, c))
            .filter(|c| touched.insert(c.from) & touched.insert(c.to))
            .collect();
        if chains.is_empty() {
            return steps;
        }
        for c in chains {
            net.remove_transition(c.transition);
            net.remove_place(c.from);
            net.add_arc(ArcType::transition_to_place(c.producer, c.to), None);
            steps.push(ReductionStep::SilentChainCollapsed {
                from: c.from,
                transition: c.transition,
                to: c.to,
            });
        }
    }
}
