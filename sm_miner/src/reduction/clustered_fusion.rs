use std::collections::{BTreeMap, HashSet};

use crate::petri_net::{
    petri_net_struct::{PetriNet, PlaceID, TransitionID},
    pre_post_sets::PrePostSets,
};

use super::{
    place_classes::PlaceClasses,
    reducer::ReductionStep,
    simple_fusion::{apply_fusion, silent_connectors},
};

/// Unite the `targets` of all connectors sharing the class of their `source`, returns `true` if anything changed
fn unite_siblings(
    classes: &mut PlaceClasses,
    connectors: &[(TransitionID, PlaceID, PlaceID)],
    source: impl Fn(&(TransitionID, PlaceID, PlaceID)) -> PlaceID,
    target: impl Fn(&(TransitionID, PlaceID, PlaceID)) -> PlaceID,
) -> bool {
    let mut clusters: BTreeMap<PlaceID, Vec<PlaceID>> = BTreeMap::new();
    for c in connectors {
        clusters.entry(classes.find(source(c))).or_default().push(target(c));
    }
    let mut changed = false;
    for targets in clusters.values() {
        for other in &targets[1..] {
            changed |= classes.try_union(targets[0], *other);
        }
    }
    changed
}

///
/// Clustered fusion of invisible transitions
///
/// Invisible one-in/one-out transitions leaving the same place have their output places fused, and invisible
/// one-in/one-out transitions entering the same place have their input places fused. This is repeated (on the
/// resulting place classes) until nothing changes. Afterwards, transitions connecting a fused class with itself
/// or duplicating an earlier transition between the same two classes are removed.
///
/// Two marking places are never fused.
pub fn fuse_clustered_silent_transitions(net: &mut PetriNet) -> Vec<ReductionStep> {
    let mut steps = Vec::new();
    loop {
        let sets = PrePostSets::from_net(net);
        let connectors = silent_connectors(net, &sets);
        let mut classes = PlaceClasses::new(net);
        let mut united = false;
        loop {
            let by_input = unite_siblings(&mut classes, &connectors, |c| c.1, |c| c.2);
            let by_output = unite_siblings(&mut classes, &connectors, |c| c.2, |c| c.1);
            if !(by_input || by_output) {
                break;
            }
            united = true;
        }
        if !united {
            return steps;
        }

        let fused_roots = classes.fused_roots(net);
        let mut seen: HashSet<(PlaceID, PlaceID)> = HashSet::new();
        let redundant: Vec<(TransitionID, PlaceID)> = connectors
            .iter()
            .filter(|(_, p, q)| {
                fused_roots.contains(&classes.find(*p)) || fused_roots.contains(&classes.find(*q))
            })
            .filter(|(_, p, q)| {
                let key = (classes.find(*p), classes.find(*q));
                key.0 == key.1 || !seen.insert(key)
            })
            .map(|(t, p, _)| (*t, *p))
            .collect();
        steps.extend(apply_fusion(net, &classes, &redundant));
    }
}
