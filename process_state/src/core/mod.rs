//! Core types shared by all process model flavors

/// IO Traits
pub mod io;

/// [`Marking`] and dense [`TokenMarking`] types
pub mod marking;

/// Errors raised when building or querying a process model
pub mod model_error;

pub use marking::{Marking, TokenMarking};
pub use model_error::ModelError;
