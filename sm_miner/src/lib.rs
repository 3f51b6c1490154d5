#![warn(
    clippy::doc_markdown,
    missing_debug_implementations,
    rust_2018_idioms,
    missing_docs
)]

#![doc = include_str!("../README.md")]

///
/// Traces and their indexed activity projection
///
pub mod event_log {
    /// Activity alphabet and indexed trace stream
    pub mod activity_projection;

    #[doc(inline)]
    pub use activity_projection::{ActivityAlphabet, EventLogActivityProjection, IndexedTraceStream};
}

///
/// Directly-follows matrices and activity sets
///
pub mod dfg {
    /// [`ActivitySet`] bit-set and antichain [`ActivitySetFamily`]
    pub mod activity_set;
    /// [`DirectlyFollowsMatrix`] with reversible filtering
    pub mod df_matrix;

    #[doc(inline)]
    pub use activity_set::{ActivitySet, ActivitySetFamily};

    #[doc(inline)]
    pub use df_matrix::DirectlyFollowsMatrix;
}

///
/// Petri nets
///
pub mod petri_net {
    /// [`PetriNet`] struct
    pub mod petri_net_struct;
    /// Index-keyed preset/postset snapshots
    pub mod pre_post_sets;
    /// Firing rule and bounded language enumeration
    pub mod semantics;

    #[doc(inline)]
    pub use petri_net_struct::PetriNet;
}

///
/// State machine based discovery
///
pub mod discovery {
    /// Concurrency detection on directly-follows matrices
    pub mod concurrency;
    /// Full discovery pipeline
    pub mod full;
    /// Uniting state machines into one net
    pub mod merge;
    /// Discovery parameters and errors
    pub mod parameters;
    /// Activity set search (minimal exclusion sets)
    pub mod partitioner;
    /// State machine synthesis from directly-follows images
    pub mod synthesis;
}

///
/// Structural, language-preserving reductions of Petri nets
///
pub mod reduction {
    /// Fusion of invisible transitions sharing input or output places
    pub mod clustered_fusion;
    /// Duplicate transitions and places
    pub mod duplicates;
    /// Place equivalence classes for fusion
    pub mod place_classes;
    /// [`Reducer`](reducer::Reducer), passes and steps
    pub mod reducer;
    /// `place → invisible → place` chain collapsing
    pub mod silent_chains;
    /// Generic elimination of invisible transitions
    pub mod silent_elimination;
    /// Simple fusion of invisible transitions
    pub mod simple_fusion;

    #[doc(inline)]
    pub use reducer::{FusionPolicy, Reducer, ReductionPass, ReductionStep};
}

///
/// Alternate discovery using thresholded count matrices and an exact activity split
///
pub mod count_matrix {
    /// [`CountMatrix`](count_matrix_struct::CountMatrix) struct
    pub mod count_matrix_struct;
    /// Exact split into maximal activity sets
    pub mod exact_split;
    /// Full count matrix discovery pipeline
    pub mod full;
}

#[cfg(test)]
mod tests;

#[doc(inline)]
pub use petri_net::petri_net_struct::PetriNet;

#[doc(inline)]
pub use discovery::full::{discover_petri_net, DiscoveryReport};

#[doc(inline)]
pub use discovery::parameters::{DiscoveryError, DiscoveryParameters};

#[doc(inline)]
pub use count_matrix::full::discover_petri_net_count_matrix;

#[doc(inline)]
pub use reduction::reducer::{Reducer, ReductionPass};

#[doc(inline)]
pub use event_log::activity_projection::EventLogActivityProjection;
