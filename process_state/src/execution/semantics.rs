use crate::core::{Marking, ModelError, TokenMarking};

use super::options::ReachabilityGraphOptions;

/// Role a step (BPMN node or Petri net transition) plays during marking advancement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepRole {
    /// Labels an edge of the reachability graph (tasks, observable events, visible transitions)
    Observable,
    /// Fired automatically while advancing a marking
    Silent,
    /// Silent branching choice (XOR/OR split, invisible transition after a split place)
    ///
    /// Only fired when exploring all branches of a marking, never when advancing to the next decision point.
    DecisionPoint,
    /// Never fired during advancement (start and end events)
    Inert,
}

impl StepRole {
    /// Whether the step is fired while exploring silent advancements
    pub fn is_silent(self) -> bool {
        matches!(self, StepRole::Silent | StepRole::DecisionPoint)
    }
}

///
/// Token-game view of a process model over dense indices
///
/// Tokens (BPMN flows / Petri net places) and steps (BPMN nodes / Petri net transitions)
/// are addressed by the dense indices the model assigned at construction time.
/// The marking advancement and the reachability graph builder are generic over this trait.
///
pub trait ExecutionSemantics {
    /// Number of token holders
    fn token_count(&self) -> usize;
    /// ID of the token holder with index `token`
    fn token_id(&self, token: usize) -> &str;
    /// Index of the token holder with the given ID
    fn token_index(&self, token_id: &str) -> Option<usize>;
    /// Number of steps
    fn step_count(&self) -> usize;
    /// ID of the step with index `step`
    fn step_id(&self, step: usize) -> &str;
    /// Label used for reachability graph edges
    fn step_label(&self, step: usize) -> &str;
    /// Index of the step with the given ID
    fn step_index(&self, step_id: &str) -> Option<usize>;
    /// Role of the step under the given options
    fn step_role(&self, step: usize, options: &ReachabilityGraphOptions) -> StepRole;
    /// Token holders the step consumes from
    fn step_inputs(&self, step: usize) -> &TokenMarking;
    /// Whether the step can fire in `marking`
    fn is_enabled(&self, step: usize, marking: &TokenMarking) -> bool;
    /// All markings resulting from firing the step (empty if not enabled)
    fn fire(&self, step: usize, marking: &TokenMarking) -> Vec<TokenMarking>;
    /// Initial marking of the model, if defined
    fn initial_tokens(&self) -> Result<Option<TokenMarking>, ModelError>;

    /// Whether marking advancement may fire the enabled step in `marking` yet
    ///
    /// Steps that still wait for tokens on their way to them return `false`.
    fn may_advance(&self, _step: usize, _marking: &TokenMarking) -> bool {
        true
    }

    /// Translate a [`Marking`] of IDs into dense token indices
    fn to_token_marking(&self, marking: &Marking) -> Result<TokenMarking, ModelError> {
        marking
            .iter()
            .map(|token_id| {
                self.token_index(token_id)
                    .ok_or_else(|| ModelError::UnknownToken(token_id.clone()))
            })
            .collect()
    }

    /// Translate dense token indices back into a [`Marking`] of IDs
    fn to_marking(&self, tokens: &TokenMarking) -> Marking {
        tokens
            .iter()
            .map(|token| self.token_id(*token).to_string())
            .collect()
    }

    /// Index of the step with the given ID, or [`ModelError::UnknownNode`]
    fn require_step(&self, step_id: &str) -> Result<usize, ModelError> {
        self.step_index(step_id)
            .ok_or_else(|| ModelError::UnknownNode(step_id.to_string()))
    }
}
