use thiserror::Error;

/// Errors raised while constructing a process model or calling it with unknown IDs
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// A node, flow, place or transition with this ID already exists
    #[error("Duplicate ID '{0}'")]
    DuplicateId(String),
    /// No node (BPMN) or transition (Petri net) with this ID exists
    #[error("Unknown node '{0}'")]
    UnknownNode(String),
    /// No flow (BPMN) or place (Petri net) with this ID exists
    #[error("Unknown token holder '{0}'")]
    UnknownToken(String),
    /// A node was added through the constructor of another node kind
    #[error("Node '{node_id}' must be of kind {expected}")]
    WrongNodeKind {
        /// ID of the rejected node
        node_id: String,
        /// Expected node kind
        expected: &'static str,
    },
    /// Adding a flow would violate the degree constraints of its source or target
    #[error("Invalid flow '{flow_id}': {reason}")]
    InvalidFlow {
        /// ID of the rejected flow
        flow_id: String,
        /// Violated constraint
        reason: String,
    },
    /// Arcs of a Petri net must connect a place with a transition
    #[error("Invalid arc from '{source_id}' to '{target_id}': {reason}")]
    InvalidArc {
        /// Source of the rejected arc
        source_id: String,
        /// Target of the rejected arc
        target_id: String,
        /// Violated constraint
        reason: String,
    },
    /// A place is followed by both invisible and visible transitions
    #[error("Place '{place_id}' is connected to both invisible transitions and tasks")]
    MixedDecisionPoint {
        /// ID of the offending place
        place_id: String,
    },
    /// The model does not define an initial marking
    #[error("No initial marking defined")]
    NoInitialMarking,
}
