use super::petri_net_struct::{ArcType, PetriNet, PlaceID, TransitionID};

/// Weighted neighbours of a node, sorted by ID
pub type WeightedPlaces = Vec<(PlaceID, u32)>;
/// Weighted neighbours of a node, sorted by ID
pub type WeightedTransitions = Vec<(TransitionID, u32)>;

#[derive(Debug, Clone)]
///
/// Snapshot of the presets and postsets of every node of a [`PetriNet`]
///
/// Index-keyed tables (one entry per arena slot). The snapshot does not follow later changes to the net,
/// so reductions rebuild it at the start of every round.
pub struct PrePostSets {
    place_pre: Vec<WeightedTransitions>,
    place_post: Vec<WeightedTransitions>,
    transition_pre: Vec<WeightedPlaces>,
    transition_post: Vec<WeightedPlaces>,
}

impl PrePostSets {
    /// Build the preset/postset tables of the given net
    pub fn from_net(net: &PetriNet) -> Self {
        let mut sets = Self {
            place_pre: vec![Vec::new(); net.place_capacity()],
            place_post: vec![Vec::new(); net.place_capacity()],
            transition_pre: vec![Vec::new(); net.transition_capacity()],
            transition_post: vec![Vec::new(); net.transition_capacity()],
        };
        for arc in net.arcs() {
            match arc.from_to {
                ArcType::PlaceTransition(p, t) => {
                    sets.place_post[p.0].push((t, arc.weight));
                    sets.transition_pre[t.0].push((p, arc.weight));
                }
                ArcType::TransitionPlace(t, p) => {
                    sets.transition_post[t.0].push((p, arc.weight));
                    sets.place_pre[p.0].push((t, arc.weight));
                }
            }
        }
        sets.place_pre.iter_mut().for_each(|s| s.sort_unstable());
        sets.place_post.iter_mut().for_each(|s| s.sort_unstable());
        sets.transition_pre.iter_mut().for_each(|s| s.sort_unstable());
        sets.transition_post.iter_mut().for_each(|s| s.sort_unstable());
        sets
    }

    /// Input transitions of a place
    pub fn preset_of_place(&self, p: PlaceID) -> &[(TransitionID, u32)] {
        &self.place_pre[p.0]
    }

    /// Output transitions of a place
    pub fn postset_of_place(&self, p: PlaceID) -> &[(TransitionID, u32)] {
        &self.place_post[p.0]
    }

    /// Input places of a transition
    pub fn preset_of_transition(&self, t: TransitionID) -> &[(PlaceID, u32)] {
        &self.transition_pre[t.0]
    }

    /// Output places of a transition
    pub fn postset_of_transition(&self, t: TransitionID) -> &[(PlaceID, u32)] {
        &self.transition_post[t.0]
    }

    /// The single input and output place of `t`, if `t` has exactly one of each and both arcs have weight 1
    pub fn single_in_single_out(&self, t: TransitionID) -> Option<(PlaceID, PlaceID)> {
        match (self.preset_of_transition(t), self.postset_of_transition(t)) {
            ([(p, 1)], [(q, 1)]) => Some((*p, *q)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pre_post_sets_follow_arcs() {
        let mut net = PetriNet::new();
        let p1 = net.add_place(None);
        let p2 = net.add_place(None);
        let t = net.add_transition(None);
        net.add_arc(ArcType::place_to_transition(p1, t), None);
        net.add_arc(ArcType::transition_to_place(t, p2), None);

        let sets = PrePostSets::from_net(&net);
        assert_eq!(sets.preset_of_transition(t), &[(p1, 1)]);
        assert_eq!(sets.postset_of_transition(t), &[(p2, 1)]);
        assert_eq!(sets.postset_of_place(p1), &[(t, 1)]);
        assert_eq!(sets.preset_of_place(p2), &[(t, 1)]);
        assert_eq!(sets.single_in_single_out(t), Some((p1, p2)));

        net.add_arc(ArcType::place_to_transition(p1, t), None);
        let sets = PrePostSets::from_net(&net);
        assert_eq!(sets.single_in_single_out(t), None);
    }
}
