use std::collections::BTreeMap;

use itertools::Itertools;

use crate::petri_net::{
    petri_net_struct::{PetriNet, PlaceID, TransitionID},
    pre_post_sets::PrePostSets,
};

use super::{
    place_classes::PlaceClasses,
    reducer::{FusionPolicy, ReductionStep},
};

/// Invisible one-in/one-out transitions `(t, input, output)`, in canonical order
pub(crate) fn silent_connectors(
    net: &PetriNet,
    sets: &PrePostSets,
) -> Vec<(TransitionID, PlaceID, PlaceID)> {
    net.transitions()
        .filter(|t| t.is_silent())
        .filter_map(|t| {
            let (p, q) = sets.single_in_single_out(t.id())?;
            Some((t.id(), p, q))
        })
        .sorted_by_cached_key(|(t, _, _)| net.canonical_form(*t))
        .collect()
}

fn has_silent_sibling(net: &PetriNet, t: TransitionID, others: &[(TransitionID, u32)]) -> bool {
    others.iter().any(|(other, _)| {
        *other != t && net.transition(*other).is_some_and(|o| o.is_silent())
    })
}

/// Removes the transitions and merges the classes, reporting one step per fused class
pub(crate) fn apply_fusion(
    net: &mut PetriNet,
    classes: &PlaceClasses,
    fused_transitions: &[(TransitionID, PlaceID)],
) -> Vec<ReductionStep> {
    let mut removed_per_class: BTreeMap<PlaceID, Vec<TransitionID>> = BTreeMap::new();
    for (t, p) in fused_transitions {
        removed_per_class.entry(classes.find(*p)).or_default().push(*t);
        net.remove_transition(*t);
    }
    let merged = classes.apply(net);
    merged
        .into_iter()
        .map(|(fused, into)| {
            let representative = classes.find(fused[0]);
            ReductionStep::PlacesFused {
                fused,
                into,
                removed_transitions: removed_per_class
                    .remove(&representative)
                    .unwrap_or_default(),
            }
        })
        .collect()
}

///
/// Fuse the input and output place of invisible transitions
///
/// Candidates are invisible transitions with exactly one input place `p` and one output place `q`
/// (arcs of weight 1), processed in canonical order. A candidate connecting a place with itself (also after earlier
/// fusions) is removed. Otherwise `p` and `q` are fused into one place which inherits all arcs of both (except the
/// removed transition) and their marking membership. Two marking places are never fused.
///
/// With [`FusionPolicy::Restricted`], a candidate is only fused if another invisible transition leaves `p`
/// and another invisible transition enters `q`.
pub fn fuse_silent_transitions(net: &mut PetriNet, policy: FusionPolicy) -> Vec<ReductionStep> {
    let mut steps = Vec::new();
    loop {
        let sets = PrePostSets::from_net(net);
        let mut classes = PlaceClasses::new(net);
        let mut fused: Vec<(TransitionID, PlaceID)> = Vec::new();
        let mut round = Vec::new();
        for (t, p, q) in silent_connectors(net, &sets) {
            if classes.find(p) == classes.find(q) {
                round.push(ReductionStep::SilentSelfLoopRemoved {
                    transition: t,
                    place: p,
                });
                net.remove_transition(t);
                continue;
            }
            if policy == FusionPolicy::Restricted
                && !(has_silent_sibling(net, t, sets.postset_of_place(p))
                    && has_silent_sibling(net, t, sets.preset_of_place(q)))
            {
                continue;
            }
            if classes.try_union(p, q) {
                fused.push((t, p));
            }
        }
        round.extend(apply_fusion(net, &classes, &fused));
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

    /// i -> a -> p -> tau -> q -> b -> o
    fn silent_step() -> (PetriNet, PlaceID, PlaceID, TransitionID) {
        let mut net = PetriNet::new();
        let i = net.add_place(Some("i".into()));
        let o = net.add_place(Some("o".into()));
        let p = net.add_place(None);
        let q = net.add_place(None);
        let a = net.add_transition(Some("a".into()));
        let b = net.add_transition(Some("b".into()));
        let tau = net.add_transition(None);
        net.add_arc(ArcType::place_to_transition(i, a), None);
        net.add_arc(ArcType::transition_to_place(a, p), None);
        net.add_arc(ArcType::place_to_transition(p, tau), None);
        net.add_arc(ArcType::transition_to_place(tau, q), None);
        net.add_arc(ArcType::place_to_transition(q, b), None);
        net.add_arc(ArcType::transition_to_place(b, o), None);
        net.initial_marking = Some(Marking::from([(i, 1)]));
        net.final_markings = Some(vec![Marking::from([(o, 1)])]);
        (net, p, q, tau)
    }

    #[test]
    fn sequential_places_are_fused() {
        let (mut net, p, q, tau) = silent_step();
        let language = accepted_traces(&net, 3, 1000);
        let steps = fuse_silent_transitions(&mut net, FusionPolicy::All);
        assert_eq!(steps.len(), 1);
        let ReductionStep::PlacesFused {
            fused,
            into,
            removed_transitions,
        } = &steps[0]
        else {
            panic!("expected fusion, got {:?}", steps[0]);
        };
        assert_eq!(fused, &vec![p, q]);
        assert_eq!(removed_transitions, &vec![tau]);
        assert_eq!(net.preset_of_place(*into).len(), 1);
        assert_eq!(net.postset_of_place(*into).len(), 1);
        assert_eq!(net.num_places(), 3);
        assert_eq!(accepted_traces(&net, 3, 1000), language);
        assert!(fuse_silent_transitions(&mut net, FusionPolicy::All).is_empty());
    }

    #[test]
    fn restricted_policy_needs_silent_siblings() {
        let (mut net, _, _, _) = silent_step();
        assert!(fuse_silent_transitions(&mut net, FusionPolicy::Restricted).is_empty());
        assert_eq!(net.num_transitions(), 3);
    }

    #[test]
    fn silent_self_loops_are_removed() {
        let (mut net, p, _, _) = silent_step();
        let lp = net.add_transition(None);
        net.add_arc(ArcType::place_to_transition(p, lp), None);
        net.add_arc(ArcType::transition_to_place(lp, p), None);
        let steps = fuse_silent_transitions(&mut net, FusionPolicy::Restricted);
        assert_eq!(
            steps,
            vec![ReductionStep::SilentSelfLoopRemoved {
                transition: lp,
                place: p
            }]
        );
        assert!(net.transition(lp).is_none());
    }

    #[test]
    fn marking_place_survives_fusion() {
        // i -> tau -> p -> a -> o
        let mut net = PetriNet::new();
        let i = net.add_place(Some("i".into()));
        let p = net.add_place(None);
        let o = net.add_place(Some("o".into()));
        let tau = net.add_transition(None);
        let a = net.add_transition(Some("a".into()));
        net.add_arc(ArcType::place_to_transition(i, tau), None);
        net.add_arc(ArcType::transition_to_place(tau, p), None);
        net.add_arc(ArcType::place_to_transition(p, a), None);
        net.add_arc(ArcType::transition_to_place(a, o), None);
        net.initial_marking = Some(Marking::from([(i, 1)]));
        net.final_markings = Some(vec![Marking::from([(o, 1)])]);
        let language = accepted_traces(&net, 2, 1000);

        fuse_silent_transitions(&mut net, FusionPolicy::All);
        assert!(net.place(i).is_some());
        assert!(net.place(p).is_none());
        assert_eq!(net.postset_of_place(i), vec![a]);
        assert_eq!(accepted_traces(&net, 2, 1000), language);
    }

    #[test]
    fn two_marking_places_are_never_fused() {
        // i -> tau -> o
        let mut net = PetriNet::new();
        let i = net.add_place(Some("i".into()));
        let o = net.add_place(Some("o".into()));
        let tau = net.add_transition(None);
        net.add_arc(ArcType::place_to_transition(i, tau), None);
        net.add_arc(ArcType::transition_to_place(tau, o), None);
        net.initial_marking = Some(Marking::from([(i, 1)]));
        net.final_markings = Some(vec![Marking::from([(o, 1)])]);
        assert!(fuse_silent_transitions(&mut net, FusionPolicy::All).is_empty());
        assert_eq!(net.num_places(), 2);
    }
}
