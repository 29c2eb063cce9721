//! Error taxonomy shared across the workspace.
//!
//! Only two failure classes exist: bad parameters at a call boundary and
//! operations on data that cannot support them. Expected "nothing to do"
//! outcomes (empty clustering input, non-converging launch plan) are
//! encoded in return values, never as errors.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BulwarkError {
    /// A caller-supplied parameter is out of range. Raised immediately at
    /// the boundary of the call that received it; configuration bugs the
    /// caller must fix, never caught or retried internally.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The operation cannot be performed on the data it was given, e.g.
    /// dequeue from an empty queue or an empty ballistic table.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),
}

pub type Result<T> = std::result::Result<T, BulwarkError>;
