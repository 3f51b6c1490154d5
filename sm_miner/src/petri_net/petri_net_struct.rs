use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
/// Place in a Petri net
pub struct Place {
    id: PlaceID,
    /// Optional place name (only used for diagnostics)
    pub name: Option<String>,
}

impl Place {
    /// Get the [`PlaceID`] of this place
    pub fn id(&self) -> PlaceID {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
/// Transition in a Petri net
pub struct Transition {
    /// Transition label (None if this transition is _invisible_)
    pub label: Option<String>,
    id: TransitionID,
}

impl Transition {
    /// Get the [`TransitionID`] of this transition
    pub fn id(&self) -> TransitionID {
        self.id
    }
    /// Check if this transition is _invisible_ (silent)
    pub fn is_silent(&self) -> bool {
        self.label.is_none()
    }
}

#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize, Hash, Eq, PartialOrd, Ord)]
/// Place ID
///
/// Dense handle into the place arena of a [`PetriNet`]
pub struct PlaceID(pub usize);
impl PlaceID {
    /// Get arena index
    pub fn index(self) -> usize {
        self.0
    }
}
impl From<&Place> for PlaceID {
    fn from(value: &Place) -> Self {
        value.id
    }
}

#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize, Hash, Eq, PartialOrd, Ord)]
/// Transition ID
///
/// Dense handle into the transition arena of a [`PetriNet`]
pub struct TransitionID(pub usize);
impl TransitionID {
    /// Get arena index
    pub fn index(self) -> usize {
        self.0
    }
}
impl From<&Transition> for TransitionID {
    fn from(value: &Transition) -> Self {
        value.id
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[serde(tag = "type", content = "nodes")]
/// Arc type in a Petri net
pub enum ArcType {
    /// From Place to Transition
    PlaceTransition(PlaceID, TransitionID),
    /// From Transition to Place
    TransitionPlace(TransitionID, PlaceID),
}

impl ArcType {
    /// Create new from place to transition
    pub fn place_to_transition(from: PlaceID, to: TransitionID) -> ArcType {
        ArcType::PlaceTransition(from, to)
    }
    /// Create new from transition to place
    pub fn transition_to_place(from: TransitionID, to: PlaceID) -> ArcType {
        ArcType::TransitionPlace(from, to)
    }
    /// Checks if the given place is start or end of this arc
    pub fn contains_place(&self, p: PlaceID) -> bool {
        match self {
            ArcType::PlaceTransition(from, _) => *from == p,
            ArcType::TransitionPlace(_, to) => *to == p,
        }
    }
    /// Checks if the given transition is start or end of this arc
    pub fn contains_transition(&self, t: TransitionID) -> bool {
        match self {
            ArcType::PlaceTransition(_, to) => *to == t,
            ArcType::TransitionPlace(from, _) => *from == t,
        }
    }
    /// The same arc with its place replaced by `p`
    pub fn with_place(&self, p: PlaceID) -> ArcType {
        match self {
            ArcType::PlaceTransition(_, t) => ArcType::PlaceTransition(p, *t),
            ArcType::TransitionPlace(t, _) => ArcType::TransitionPlace(*t, p),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
/// Arc in a Petri net
///
/// Connecting a transition and a place (or the other way around)
pub struct Arc {
    /// Source and target of Arc
    pub from_to: ArcType,
    /// Weight (i.e., how many tokens this arc moves)
    pub weight: u32,
}

/// Marking of a Petri net: Assigning [`PlaceID`]s to a number of tokens
pub type Marking = HashMap<PlaceID, u64>;

#[serde_as]
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
///
/// An accepting Petri net of [`Place`]s and [`Transition`]s
///
/// Bipartite graph of [`Place`]s and [`Transition`]s with [`Arc`]s connecting them, as well as initial and final [`Marking`]s.
///
/// Nodes live in arenas indexed by [`PlaceID`]/[`TransitionID`]. Removing a node leaves an empty slot,
/// so the handles of all other nodes stay valid.
pub struct PetriNet {
    places: Vec<Option<Place>>,
    transitions: Vec<Option<Transition>>,
    arcs: Vec<Arc>,
    /// Initial marking
    #[serde_as(as = "Option<Vec<(_, _)>>")]
    pub initial_marking: Option<Marking>,
    /// Final markings (any of them are accepted as a final marking)
    #[serde_as(as = "Option<Vec<Vec<(_, _)>>>")]
    pub final_markings: Option<Vec<Marking>>,
}

impl PetriNet {
    /// Create new [`PetriNet`] with no places or transitions
    pub fn new() -> Self {
        Self {
            places: Vec::new(),
            transitions: Vec::new(),
            arcs: Vec::new(),
            initial_marking: None,
            final_markings: None,
        }
    }
    /// Serialize to JSON string
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
    /// Deserialize from JSON string
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
    /// Add a place (with an optional name)
    pub fn add_place(&mut self, name: Option<String>) -> PlaceID {
        let id = PlaceID(self.places.len());
        self.places.push(Some(Place { id, name }));
        id
    }

    /// Add a transition with an label
    ///
    /// Passing `None` as label creates an _invisible_ transition
    pub fn add_transition(&mut self, label: Option<String>) -> TransitionID {
        let id = TransitionID(self.transitions.len());
        self.transitions.push(Some(Transition { id, label }));
        id
    }
    /// Add an arc
    ///
    /// If the arc already exists, its weight is increased instead
    pub fn add_arc(&mut self, from_to: ArcType, weight: Option<u32>) {
        let weight = weight.unwrap_or(1);
        match self.arcs.iter_mut().find(|arc| arc.from_to == from_to) {
            Some(arc) => arc.weight += weight,
            None => self.arcs.push(Arc { from_to, weight }),
        }
    }
    /// Remove an arc (no-op if it does not exist)
    pub fn remove_arc(&mut self, from_to: &ArcType) {
        self.arcs.retain(|arc| &arc.from_to != from_to);
    }
    /// Weight of the given arc (0 if the arc does not exist)
    pub fn arc_weight(&self, from_to: &ArcType) -> u32 {
        self.arcs
            .iter()
            .find(|arc| &arc.from_to == from_to)
            .map_or(0, |arc| arc.weight)
    }

    /// All arcs of this net
    pub fn arcs(&self) -> &[Arc] {
        &self.arcs
    }

    /// Get place by ID (None if it was removed or never existed)
    pub fn place(&self, id: PlaceID) -> Option<&Place> {
        self.places.get(id.0).and_then(Option::as_ref)
    }

    /// Get transition by ID (None if it was removed or never existed)
    pub fn transition(&self, id: TransitionID) -> Option<&Transition> {
        self.transitions.get(id.0).and_then(Option::as_ref)
    }

    /// Iterate over all (not removed) places
    pub fn places(&self) -> impl Iterator<Item = &Place> + '_ {
        self.places.iter().flatten()
    }

    /// Iterate over all (not removed) transitions
    pub fn transitions(&self) -> impl Iterator<Item = &Transition> + '_ {
        self.transitions.iter().flatten()
    }

    /// IDs of all (not removed) places, ascending
    pub fn place_ids(&self) -> impl Iterator<Item = PlaceID> + '_ {
        self.places().map(Place::id)
    }

    /// IDs of all (not removed) transitions, ascending
    pub fn transition_ids(&self) -> impl Iterator<Item = TransitionID> + '_ {
        self.transitions().map(Transition::id)
    }

    /// Number of places
    pub fn num_places(&self) -> usize {
        self.places().count()
    }

    /// Number of transitions
    pub fn num_transitions(&self) -> usize {
        self.transitions().count()
    }

    /// Size of the place arena (including removed slots)
    pub fn place_capacity(&self) -> usize {
        self.places.len()
    }

    /// Size of the transition arena (including removed slots)
    pub fn transition_capacity(&self) -> usize {
        self.transitions.len()
    }

    /// Labels of all visible transitions (sorted, with duplicates)
    pub fn visible_labels(&self) -> Vec<&str> {
        self.transitions()
            .filter_map(|t| t.label.as_deref())
            .sorted()
            .collect()
    }

    /// Remove a Place from the Petri net
    ///
    /// Also removes all connected arcs and the place from all markings
    pub fn remove_place(&mut self, place_id: PlaceID) {
        if let Some(slot) = self.places.get_mut(place_id.0) {
            if slot.take().is_some() {
                if let Some(im) = &mut self.initial_marking {
                    im.remove(&place_id);
                }
                if let Some(fm) = &mut self.final_markings {
                    for m in fm {
                        m.remove(&place_id);
                    }
                }
                self.arcs.retain(|arc| !arc.from_to.contains_place(place_id));
            }
        }
    }

    /// Remove a Transition from the Petri net
    ///
    /// Also removes all connected arcs
    pub fn remove_transition(&mut self, transition_id: TransitionID) {
        if let Some(slot) = self.transitions.get_mut(transition_id.0) {
            if slot.take().is_some() {
                self.arcs
                    .retain(|arc| !arc.from_to.contains_transition(transition_id));
            }
        }
    }

    /// Move all arcs and marking tokens of place `from` onto place `into`, then remove `from`
    ///
    /// Arcs that end up connecting the same nodes are combined by adding their weights.
    pub fn merge_place_into(&mut self, from: PlaceID, into: PlaceID) {
        if from == into {
            return;
        }
        let moved: Vec<Arc> = self
            .arcs
            .iter()
            .filter(|arc| arc.from_to.contains_place(from))
            .cloned()
            .collect();
        self.arcs.retain(|arc| !arc.from_to.contains_place(from));
        for arc in moved {
            self.add_arc(arc.from_to.with_place(into), Some(arc.weight));
        }
        let markings = self
            .initial_marking
            .iter_mut()
            .chain(self.final_markings.iter_mut().flatten());
        for m in markings {
            if let Some(tokens) = m.remove(&from) {
                *m.entry(into).or_insert(0) += tokens;
            }
        }
        self.remove_place(from);
    }

    /// Get the preset of a [`PetriNet`] place
    pub fn preset_of_place(&self, p: PlaceID) -> Vec<TransitionID> {
        self.arcs
            .iter()
            .filter_map(|x: &Arc| match x.from_to {
                ArcType::TransitionPlace(from, to) if to == p => Some(from),
                _ => None,
            })
            .collect()
    }

    /// Get the preset of [`PetriNet`] transition referred to by passed id
    pub fn preset_of_transition(&self, t: TransitionID) -> Vec<PlaceID> {
        self.arcs
            .iter()
            .filter_map(|x: &Arc| match x.from_to {
                ArcType::PlaceTransition(from, to) if to == t => Some(from),
                _ => None,
            })
            .collect()
    }

    /// Get postset of [`PetriNet`] place referred to by passed id
    pub fn postset_of_place(&self, p: PlaceID) -> Vec<TransitionID> {
        self.arcs
            .iter()
            .filter_map(|x: &Arc| match x.from_to {
                ArcType::PlaceTransition(from, to) if from == p => Some(to),
                _ => None,
            })
            .collect()
    }

    /// Get postset of [`PetriNet`] transition referred to by passed id
    pub fn postset_of_transition(&self, t: TransitionID) -> Vec<PlaceID> {
        self.arcs
            .iter()
            .filter_map(|x: &Arc| match x.from_to {
                ArcType::TransitionPlace(from, to) if from == t => Some(to),
                _ => None,
            })
            .collect()
    }

    /// Check if place is in initial marking
    pub fn is_in_initial_marking(&self, p: &PlaceID) -> bool {
        self.initial_marking
            .as_ref()
            .is_some_and(|m| m.contains_key(p))
    }

    /// Check if place is in _any_ final marking
    pub fn is_in_a_final_marking(&self, p: &PlaceID) -> bool {
        self.final_markings
            .as_ref()
            .is_some_and(|fm| fm.iter().any(|m| m.contains_key(p)))
    }

    /// Check if place is part of the initial marking or of any final marking
    pub fn is_marking_place(&self, p: &PlaceID) -> bool {
        self.is_in_initial_marking(p) || self.is_in_a_final_marking(p)
    }

    /// Canonical string form of a transition
    ///
    /// Consists of the (sorted, zero-padded) indices of its input places, its label (`tau` if invisible)
    /// and the indices of its output places. Sorting by this form gives a reproducible processing order.
    pub fn canonical_form(&self, t: TransitionID) -> String {
        let fmt_places = |places: Vec<PlaceID>| {
            places
                .into_iter()
                .sorted()
                .map(|p| format!("p{:08}", p.0))
                .join(",")
        };
        let label = self
            .transition(t)
            .and_then(|t| t.label.clone())
            .unwrap_or_else(|| "tau".to_string());
        format!(
            "[{}]-{}-[{}]",
            fmt_places(self.preset_of_transition(t)),
            label,
            fmt_places(self.postset_of_transition(t))
        )
    }
}
