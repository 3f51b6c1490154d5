use std::collections::BTreeMap;

use crate::petri_net::{
    petri_net_struct::{PetriNet, PlaceID, TransitionID},
    pre_post_sets::{PrePostSets, WeightedPlaces, WeightedTransitions},
};

use super::reducer::ReductionStep;

/// Groups of (at least two) nodes with the same key, each sorted ascending
fn duplicate_groups<K: Ord, N: Copy>(nodes: impl Iterator<Item = (K, N)>) -> Vec<Vec<N>> {
    let mut groups: BTreeMap<K, Vec<N>> = BTreeMap::new();
    for (key, node) in nodes {
        groups.entry(key).or_default().push(node);
    }
    groups.into_values().filter(|g| g.len() > 1).collect()
}

fn collapse_duplicate_transitions(net: &mut PetriNet) -> Vec<ReductionStep> {
    let sets = PrePostSets::from_net(net);
    let keyed = net
        .transitions()
        .filter(|t| t.is_silent())
        .map(|t| {
            let key: (WeightedPlaces, WeightedPlaces) = (
                sets.preset_of_transition(t.id()).to_vec(),
                sets.postset_of_transition(t.id()).to_vec(),
            );
            (key, t.id())
        });
    let groups: Vec<Vec<TransitionID>> = duplicate_groups(keyed);
    groups
        .into_iter()
        .map(|group| {
            let (kept, removed) = (group[0], group[1..].to_vec());
            for t in &removed {
                net.remove_transition(*t);
            }
            ReductionStep::DuplicateTransitionsRemoved { kept, removed }
        })
        .collect()
}

fn collapse_duplicate_places(net: &mut PetriNet) -> Vec<ReductionStep> {
    let sets = PrePostSets::from_net(net);
    let keyed = net
        .place_ids()
        .filter(|p| !net.is_marking_place(p))
        .map(|p| {
            let key: (WeightedTransitions, WeightedTransitions) = (
                sets.preset_of_place(p).to_vec(),
                sets.postset_of_place(p).to_vec(),
            );
            (key, p)
        });
    let groups: Vec<Vec<PlaceID>> = duplicate_groups(keyed);
    groups
        .into_iter()
        .map(|group| {
            let (kept, removed) = (group[0], group[1..].to_vec());
            for p in &removed {
                net.remove_place(*p);
            }
            ReductionStep::DuplicatePlacesRemoved { kept, removed }
        })
        .collect()
}

///
/// Remove duplicate invisible transitions and duplicate places
///
/// Invisible transitions with the same (weighted) preset and postset are duplicates, as are places with the same
/// preset and postset. Of each group, the node with the lowest ID is kept. Places of the initial or a final marking
/// are never touched.
///
/// Removing duplicate transitions can make places duplicates (and the other way around), so this repeats until
/// no duplicates are left.
pub fn collapse_duplicates(net: &mut PetriNet) -> Vec<ReductionStep> {
    let mut steps = Vec::new();
    loop {
        let mut round = collapse_duplicate_transitions(net);
        round.extend(collapse_duplicate_places(net));
        if round.is_empty() {
            return steps;
        }
        steps.extend(round);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::petri_net::{
        petri_net_struct::{ArcType, Marking},
        semantics::accepted_traces,
    };

    #[test]
    fn parallel_silent_transitions_collapse() {
        // i -> a -> p1 -> {tau1, tau2} -> q -> b -> o
        let mut net = PetriNet::new();
        let i = net.add_place(Some("i".into()));
        let o = net.add_place(Some("o".into()));
        let p1 = net.add_place(None);
        let q = net.add_place(None);
        let a = net.add_transition(Some("a".into()));
        let b = net.add_transition(Some("b".into()));
        let tau1 = net.add_transition(None);
        let tau2 = net.add_transition(None);
        net.add_arc(ArcType::place_to_transition(i, a), None);
        net.add_arc(ArcType::transition_to_place(a, p1), None);
        net.add_arc(ArcType::place_to_transition(p1, tau1), None);
        net.add_arc(ArcType::place_to_transition(p1, tau2), None);
        net.add_arc(ArcType::transition_to_place(tau1, q), None);
        net.add_arc(ArcType::transition_to_place(tau2, q), None);
        net.add_arc(ArcType::place_to_transition(q, b), None);
        net.add_arc(ArcType::transition_to_place(b, o), None);
        net.initial_marking = Some(Marking::from([(i, 1)]));
        net.final_markings = Some(vec![Marking::from([(o, 1)])]);
        let language = accepted_traces(&net, 4, 1000);

        let steps = collapse_duplicates(&mut net);
        assert_eq!(
            steps,
            vec![ReductionStep::DuplicateTransitionsRemoved {
                kept: tau1,
                removed: vec![tau2]
            }]
        );
        assert!(net.transition(tau2).is_none());
        assert_eq!(accepted_traces(&net, 4, 1000), language);
    }

    #[test]
    fn duplicate_places_collapse_but_marking_places_stay() {
        // a produces into p1 and p2, b consumes from both
        let mut net = PetriNet::new();
        let i = net.add_place(Some("i".into()));
        let i2 = net.add_place(Some("i2".into()));
        let p1 = net.add_place(None);
        let p2 = net.add_place(None);
        let a = net.add_transition(Some("a".into()));
        let b = net.add_transition(Some("b".into()));
        for start in [i, i2] {
            net.add_arc(ArcType::place_to_transition(start, a), None);
        }
        for p in [p1, p2] {
            net.add_arc(ArcType::transition_to_place(a, p), None);
            net.add_arc(ArcType::place_to_transition(p, b), None);
        }
        net.initial_marking = Some(Marking::from([(i, 1), (i2, 1)]));
        net.final_markings = Some(vec![Marking::new()]);
        let language = accepted_traces(&net, 4, 1000);

        let steps = collapse_duplicates(&mut net);
        assert_eq!(
            steps,
            vec![ReductionStep::DuplicatePlacesRemoved {
                kept: p1,
                removed: vec![p2]
            }]
        );
        assert!(net.place(i).is_some() && net.place(i2).is_some());
        assert_eq!(accepted_traces(&net, 4, 1000), language);
        assert!(collapse_duplicates(&mut net).is_empty());
    }
}
