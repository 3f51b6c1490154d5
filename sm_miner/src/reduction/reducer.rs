use std::fmt;

use serde::{Deserialize, Serialize};

use crate::petri_net::petri_net_struct::{PetriNet, PlaceID, TransitionID};

use super::{
    clustered_fusion::fuse_clustered_silent_transitions, duplicates::collapse_duplicates,
    silent_chains::collapse_silent_chains, silent_elimination::eliminate_silent_transitions,
    simple_fusion::fuse_silent_transitions,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Which invisible transitions simple fusion may fuse
pub enum FusionPolicy {
    /// Every invisible one-in/one-out transition
    All,
    /// Only if another invisible transition leaves its input place and another one enters its output place
    Restricted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// A structural reduction pass
pub enum ReductionPass {
    /// Remove invisible transitions and places with identical presets and postsets
    CollapseDuplicates,
    /// Remove invisible transitions by letting their input place take over their output place
    EliminateSilentTransitions,
    /// Fuse input and output place of invisible transitions
    FuseSilentTransitions(FusionPolicy),
    /// Merge output (input) places of invisible transitions sharing their input (output) place
    ClusteredFusion,
    /// Collapse `place → invisible → place` chains
    CollapseSilentChains,
}

impl ReductionPass {
    /// Apply this pass to the net (until it has nothing left to do)
    pub fn apply(self, net: &mut PetriNet) -> Vec<ReductionStep> {
        match self {
            ReductionPass::CollapseDuplicates => collapse_duplicates(net),
            ReductionPass::EliminateSilentTransitions => eliminate_silent_transitions(net),
            ReductionPass::FuseSilentTransitions(policy) => fuse_silent_transitions(net, policy),
            ReductionPass::ClusteredFusion => fuse_clustered_silent_transitions(net),
            ReductionPass::CollapseSilentChains => collapse_silent_chains(net),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A single applied change of a reduction pass
pub enum ReductionStep {
    /// Invisible transitions with the same preset and postset as `kept` were removed
    DuplicateTransitionsRemoved {
        /// Representative
        kept: TransitionID,
        /// Removed duplicates
        removed: Vec<TransitionID>,
    },
    /// Places with the same preset and postset as `kept` were removed
    DuplicatePlacesRemoved {
        /// Representative
        kept: PlaceID,
        /// Removed duplicates
        removed: Vec<PlaceID>,
    },
    /// `transition` was removed, `input` took over the arcs of `removed_place`
    SilentTransitionEliminated {
        /// Removed invisible transition
        transition: TransitionID,
        /// Its input place
        input: PlaceID,
        /// Its (removed) output place
        removed_place: PlaceID,
    },
    /// An invisible transition connecting a place with itself was removed
    SilentSelfLoopRemoved {
        /// Removed invisible transition
        transition: TransitionID,
        /// Place it was connected to
        place: PlaceID,
    },
    /// Places were fused into `into`, the invisible transitions between them removed
    PlacesFused {
        /// Places merged into `into` (and removed)
        fused: Vec<PlaceID>,
        /// Resulting place
        into: PlaceID,
        /// Removed invisible transitions
        removed_transitions: Vec<TransitionID>,
    },
    /// `from → transition → to` was collapsed: the producer of `from` now produces into `to`
    SilentChainCollapsed {
        /// Removed first place of the chain
        from: PlaceID,
        /// Removed invisible transition
        transition: TransitionID,
        /// Kept last place of the chain
        to: PlaceID,
    },
}

fn fmt_ids<T: fmt::Debug>(ids: &[T]) -> String {
    ids.iter()
        .map(|id| format!("{id:?}"))
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Display for ReductionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReductionStep::DuplicateTransitionsRemoved { kept, removed } => write!(
                f,
                "Removed invisible transitions [{}] duplicating {kept:?}",
                fmt_ids(removed)
            ),
            ReductionStep::DuplicatePlacesRemoved { kept, removed } => write!(
                f,
                "Removed places [{}] duplicating {kept:?}",
                fmt_ids(removed)
            ),
            ReductionStep::SilentTransitionEliminated {
                transition,
                input,
                removed_place,
            } => write!(
                f,
                "Eliminated invisible transition {transition:?}: {input:?} takes over {removed_place:?}"
            ),
            ReductionStep::SilentSelfLoopRemoved { transition, place } => write!(
                f,
                "Removed invisible self-loop {transition:?} on {place:?}"
            ),
            ReductionStep::PlacesFused {
                fused,
                into,
                removed_transitions,
            } => write!(
                f,
                "Fused places [{}] into {into:?}, removing invisible transitions [{}]",
                fmt_ids(fused),
                fmt_ids(removed_transitions)
            ),
            ReductionStep::SilentChainCollapsed {
                from,
                transition,
                to,
            } => write!(
                f,
                "Collapsed chain {from:?} -> {transition:?} -> {to:?}"
            ),
        }
    }
}

#[derive(Debug, Clone)]
/// Reduced copy of a net together with the applied steps
pub struct ReductionResult {
    /// The reduced net
    pub net: PetriNet,
    /// Applied steps (in order)
    pub steps: Vec<ReductionStep>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
///
/// Runs a list of reduction passes (in order) on a [`PetriNet`]
///
/// All passes preserve the accepted language of the net and never remove a place of the initial or a final marking.
pub struct Reducer {
    passes: Vec<ReductionPass>,
}

impl Reducer {
    /// Create a reducer running the given passes
    pub fn new(passes: Vec<ReductionPass>) -> Self {
        Self { passes }
    }

    /// The configured passes
    pub fn passes(&self) -> &[ReductionPass] {
        &self.passes
    }

    /// Reduce the net in place, returns the applied steps
    pub fn reduce(&self, net: &mut PetriNet) -> Vec<ReductionStep> {
        let mut steps = Vec::new();
        for pass in &self.passes {
            let pass_steps = pass.apply(net);
            log::debug!("{:?}: {} step(s)", pass, pass_steps.len());
            for step in &pass_steps {
                log::debug!("{step}");
            }
            steps.extend(pass_steps);
        }
        steps
    }

    /// Reduce a copy of the net, leaving the passed net untouched
    pub fn reduce_cloned(&self, net: &PetriNet) -> ReductionResult {
        let mut net = net.clone();
        let steps = self.reduce(&mut net);
        ReductionResult { net, steps }
    }
}

/// Run the given passes on the net in place
pub fn reduce_in_place(net: &mut PetriNet, passes: &[ReductionPass]) -> Vec<ReductionStep> {
    Reducer::new(passes.to_vec()).reduce(net)
}
