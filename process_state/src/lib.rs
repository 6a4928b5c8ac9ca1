#![warn(
    clippy::doc_markdown,
    missing_debug_implementations,
    rust_2018_idioms,
    missing_docs
)]

#![doc = include_str!("../README.md")]

/// Core types shared by BPMN models and Petri nets ([`Marking`], [`ModelError`], IO traits)
pub mod core;

///
/// BPMN models
///
pub mod bpmn {
    /// [`BpmnModel`] struct and its token semantics
    pub mod bpmn_model_struct;
    /// JSON import/export of [`BpmnModel`]
    pub mod io;

    #[doc(inline)]
    pub use bpmn_model_struct::{BpmnModel, BpmnNodeType, Flow, Node};
}

///
/// Petri nets
///
pub mod petri_net {
    /// JSON import/export of [`PetriNet`]
    pub mod io;
    /// [`PetriNet`] struct and its firing rule
    pub mod petri_net_struct;

    #[doc(inline)]
    pub use petri_net_struct::{PetriNet, Place, Transition};
}

///
/// Execution of process models: marking advancement and reachability graph construction
///
pub mod execution {
    /// Advancing markings over silent steps
    pub mod marking_advancement;
    /// [`ReachabilityGraphOptions`]
    pub mod options;
    /// Construction of [`ReachabilityGraph`](crate::ReachabilityGraph)s
    pub mod reachability_builder;
    /// Model-agnostic [`ExecutionSemantics`]
    pub mod semantics;

    #[doc(inline)]
    pub use options::ReachabilityGraphOptions;
    #[doc(inline)]
    pub use semantics::{ExecutionSemantics, StepRole};
}

///
/// Reachability graphs
///
pub mod reachability_graph {
    /// Export [`ReachabilityGraph`] to `.tgf`
    pub mod export_tgf;
    /// Import [`ReachabilityGraph`] from `.tgf`
    pub mod import_tgf;
    /// [`Importable`](crate::core::io::Importable) and [`Exportable`](crate::core::io::Exportable) for [`ReachabilityGraph`]
    pub mod io;
    /// [`ReachabilityGraph`] struct and activity sequence replay
    pub mod reachability_graph_struct;

    #[doc(inline)]
    pub use reachability_graph_struct::{EdgeId, MarkingId, ReachabilityGraph, ReplayError};
}

///
/// N-gram indexes estimating the marking of ongoing process instances
///
pub mod n_gram_index {
    /// JSON import/export of [`NGramIndex`]
    pub mod io;
    /// [`NGramIndex`] struct
    pub mod n_gram_index_struct;

    #[doc(inline)]
    pub use n_gram_index_struct::{NGram, NGramIndex, NGramIndexBuilder, TRACE_START};
}


#[doc(inline)]
pub use crate::core::{Marking, ModelError, TokenMarking};

#[doc(inline)]
pub use crate::core::io::{Exportable, Importable};

#[doc(inline)]
pub use bpmn::{BpmnModel, BpmnNodeType};

#[doc(inline)]
pub use petri_net::PetriNet;

#[doc(inline)]
pub use execution::ReachabilityGraphOptions;

#[doc(inline)]
pub use reachability_graph::{ReachabilityGraph, ReplayError};

#[doc(inline)]
pub use n_gram_index::{NGramIndex, TRACE_START};
