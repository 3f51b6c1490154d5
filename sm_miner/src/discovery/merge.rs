use std::collections::HashMap;

use crate::petri_net::petri_net_struct::{ArcType, Marking, PetriNet, PlaceID, TransitionID};

#[derive(Debug)]
///
/// Builder uniting state machine fragments into one accepting [`PetriNet`]
///
/// All fragments share the source place `i` (initial marking), the sink place `o` (final marking) and the
/// invisible `pre`/`post` transitions connecting them to the fragments. In merge mode, the visible transition of an
/// activity is shared by all fragments containing it; otherwise every fragment gets its own copy.
pub struct NetMerger {
    net: PetriNet,
    source: PlaceID,
    sink: PlaceID,
    pre: TransitionID,
    post: TransitionID,
    merge: bool,
    shared_transitions: HashMap<usize, TransitionID>,
    num_fragments: usize,
}

impl NetMerger {
    /// Start a new net with the shared start/end structure
    pub fn new(merge: bool) -> Self {
        let mut net = PetriNet::new();
        let source = net.add_place(Some("i".to_string()));
        let sink = net.add_place(Some("o".to_string()));
        let pre = net.add_transition(None);
        let post = net.add_transition(None);
        net.add_arc(ArcType::place_to_transition(source, pre), None);
        net.add_arc(ArcType::transition_to_place(post, sink), None);
        Self {
            net,
            source,
            sink,
            pre,
            post,
            merge,
            shared_transitions: HashMap::new(),
            num_fragments: 0,
        }
    }

    /// Begin a new fragment, returns its (0-based) number
    pub fn begin_fragment(&mut self) -> usize {
        self.num_fragments += 1;
        self.num_fragments - 1
    }

    /// Number of fragments begun so far
    pub fn num_fragments(&self) -> usize {
        self.num_fragments
    }

    /// The shared invisible start transition
    pub fn pre(&self) -> TransitionID {
        self.pre
    }

    /// The shared invisible end transition
    pub fn post(&self) -> TransitionID {
        self.post
    }

    /// The visible transition to use for `activity` in the current fragment
    ///
    /// Must be called at most once per activity and fragment.
    pub fn visible_transition(&mut self, activity: usize, label: &str) -> TransitionID {
        if self.merge {
            *self
                .shared_transitions
                .entry(activity)
                .or_insert_with(|| self.net.add_transition(Some(label.to_string())))
        } else {
            self.net.add_transition(Some(label.to_string()))
        }
    }

    /// Add a place to the net
    pub fn add_place(&mut self, name: String) -> PlaceID {
        self.net.add_place(Some(name))
    }

    /// Add an invisible transition to the net
    pub fn add_silent_transition(&mut self) -> TransitionID {
        self.net.add_transition(None)
    }

    /// Add an arc to the net
    pub fn add_arc(&mut self, from_to: ArcType) {
        self.net.add_arc(from_to, None);
    }

    /// Finish the net: `[i]` is the initial marking and `[o]` the only final marking
    pub fn finish(mut self) -> PetriNet {
        self.net.initial_marking = Some(Marking::from([(self.source, 1)]));
        self.net.final_markings = Some(vec![Marking::from([(self.sink, 1)])]);
        self.net
    }
}
