use std::collections::{BTreeMap, BTreeSet};

use itertools::Itertools;

use crate::{
    dfg::df_matrix::DirectlyFollowsMatrix,
    event_log::activity_projection::{ActivityAlphabet, START_END},
    petri_net::petri_net_struct::{ArcType, PlaceID, TransitionID},
};

use super::merge::NetMerger;

/// Successor/predecessor image of an activity
pub type Image = BTreeSet<usize>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
///
/// Active directly-follows edges of one (sub-)matrix, grouped per activity
///
/// Only activities with at least one active edge appear in the maps.
pub struct StateMachineImages {
    successors: BTreeMap<usize, Image>,
    predecessors: BTreeMap<usize, Image>,
}

impl StateMachineImages {
    /// Collect the images from a list of active edges `(from, to)`
    pub fn from_edges(edges: impl IntoIterator<Item = (usize, usize)>) -> Self {
        let mut images = Self::default();
        for (from, to) in edges {
            images.successors.entry(from).or_default().insert(to);
            images.predecessors.entry(to).or_default().insert(from);
        }
        images
    }

    /// Collect the images of all active (i.e., not filtered out) entries of a matrix
    pub fn from_matrix(matrix: &DirectlyFollowsMatrix) -> Self {
        let size = matrix.size();
        Self::from_edges(
            (0..size)
                .cartesian_product(0..size)
                .filter(|(from, to)| matrix.is_active(*from, *to)),
        )
    }

    /// Successor image of an activity (None if it has no active outgoing edge)
    pub fn successors(&self, act: usize) -> Option<&Image> {
        self.successors.get(&act)
    }

    /// Predecessor image of an activity (None if it has no active incoming edge)
    pub fn predecessors(&self, act: usize) -> Option<&Image> {
        self.predecessors.get(&act)
    }

    /// All active activities except the start/end marker (ascending)
    pub fn active_activities(&self) -> Vec<usize> {
        self.successors
            .keys()
            .chain(self.predecessors.keys())
            .copied()
            .filter(|act| *act != START_END)
            .sorted()
            .dedup()
            .collect()
    }

    /// All active edges `(from, to)`, sorted
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.successors
            .iter()
            .flat_map(|(from, tos)| tos.iter().map(move |to| (*from, *to)))
    }
}

fn image_name(alphabet: &ActivityAlphabet, image: &Image) -> String {
    image.iter().map(|act| alphabet.label_of(*act)).join(",")
}

///
/// Add one state machine fragment to the merger
///
/// The fragment has one place per distinct successor image (_outgoing_ places) and one place per distinct
/// predecessor image (_incoming_ places). Each active activity produces into the outgoing place of its successor image
/// and consumes from the incoming place of its predecessor image. The start/end marker is represented by the shared
/// `pre` (producing into the marker's outgoing place) and `post` (consuming from the marker's incoming place).
///
/// Every active edge `a → b` is realized by an invisible transition moving the token from the outgoing place of `a`
/// to the incoming place of `b`. Edges connecting the same two places share one invisible transition.
///
/// If filtering left no edge at all, `pre` and `post` are connected through a fresh place (the fragment only accepts
/// the empty trace). If only one side of the marker survived, the missing side gets a fresh dead place, so the
/// fragment never completes.
pub fn synthesize_fragment(
    merger: &mut NetMerger,
    images: &StateMachineImages,
    alphabet: &ActivityAlphabet,
) {
    let fragment = merger.begin_fragment();
    let mut out_places: BTreeMap<&Image, PlaceID> = BTreeMap::new();
    let mut in_places: BTreeMap<&Image, PlaceID> = BTreeMap::new();
    for image in images.successors.values() {
        if !out_places.contains_key(image) {
            let p = merger.add_place(format!(
                "sm{}_out({})",
                fragment,
                image_name(alphabet, image)
            ));
            out_places.insert(image, p);
        }
    }
    for image in images.predecessors.values() {
        if !in_places.contains_key(image) {
            let p = merger.add_place(format!(
                "sm{}_in({})",
                fragment,
                image_name(alphabet, image)
            ));
            in_places.insert(image, p);
        }
    }

    let add_node = |merger: &mut NetMerger, act: usize, t: TransitionID| {
        if let Some(p) = images.successors(act).and_then(|img| out_places.get(img)) {
            merger.add_arc(ArcType::transition_to_place(t, *p));
        }
        if let Some(p) = images.predecessors(act).and_then(|img| in_places.get(img)) {
            merger.add_arc(ArcType::place_to_transition(*p, t));
        }
    };

    let visible: Vec<(usize, TransitionID)> = images
        .active_activities()
        .into_iter()
        .map(|act| (act, merger.visible_transition(act, alphabet.label_of(act))))
        .collect();
    for (act, t) in visible {
        add_node(merger, act, t);
    }
    // The marker is split into its start side (`pre`) and end side (`post`)
    let (pre, post) = (merger.pre(), merger.post());
    let start = images
        .successors(START_END)
        .and_then(|img| out_places.get(img))
        .copied();
    let end = images
        .predecessors(START_END)
        .and_then(|img| in_places.get(img))
        .copied();
    match (start, end) {
        (Some(start), Some(end)) => {
            merger.add_arc(ArcType::transition_to_place(pre, start));
            merger.add_arc(ArcType::place_to_transition(end, post));
        }
        (None, None) => {
            // Nothing left of the fragment: start and end are connected directly
            let p = merger.add_place(format!("sm{}_empty", fragment));
            merger.add_arc(ArcType::transition_to_place(pre, p));
            merger.add_arc(ArcType::place_to_transition(p, post));
        }
        (start, end) => {
            // Only one side survived filtering: the fragment can never complete
            let start =
                start.unwrap_or_else(|| merger.add_place(format!("sm{}_start", fragment)));
            let end = end.unwrap_or_else(|| merger.add_place(format!("sm{}_end", fragment)));
            merger.add_arc(ArcType::transition_to_place(pre, start));
            merger.add_arc(ArcType::place_to_transition(end, post));
        }
    }

    let bridges: BTreeSet<(PlaceID, PlaceID)> = images
        .edges()
        .filter_map(|(from, to)| {
            let out_p = images.successors(from).and_then(|img| out_places.get(img))?;
            let in_p = images.predecessors(to).and_then(|img| in_places.get(img))?;
            Some((*out_p, *in_p))
        })
        .collect();
    for (out_p, in_p) in bridges {
        let tau = merger.add_silent_transition();
        merger.add_arc(ArcType::place_to_transition(out_p, tau));
        merger.add_arc(ArcType::transition_to_place(tau, in_p));
    }
    log::debug!(
        "State machine {}: {} outgoing places, {} incoming places",
        fragment,
        out_places.len(),
        in_places.len()
    );
}
