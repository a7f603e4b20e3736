//! Error types for the data-flow graph builder and filter.

use thiserror::Error;

/// Errors raised while building or registering a [`crate::registers::RegisterFile`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegisterFileError {
    /// Two register descriptors were registered under the same name.
    #[error("duplicate register descriptor: {name}")]
    DuplicateRegister {
        /// The register alias that was registered twice.
        name: String,
    },
    /// A register descriptor was registered with a zero-bit width.
    #[error("register {name} has zero bit width")]
    EmptyRegister {
        /// The register alias with the invalid width.
        name: String,
    },
}

/// Errors local to a single handler invocation.
///
/// None of these are fatal to the [`crate::dfg::Dfg`] itself: per the
/// evaluation model, a failure halts evaluation of the current token only.
/// Prior mutations remain valid and the same `Dfg` may keep accepting more
/// expression text afterwards.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DfgError {
    /// A handler needed to pop an operand but the stack driving the
    /// evaluation was empty.
    #[error("missing operand for operator `{op}`")]
    MissingOperand {
        /// The operator token whose handler could not find an operand.
        op: String,
    },
    /// A register name was referenced that isn't in the register-file
    /// description. Writes to unknown registers are no-ops; reads resolve
    /// to nothing, handled by the caller.
    #[error("unknown register: {name}")]
    InvalidRegister {
        /// The unrecognized register alias.
        name: String,
    },
    /// The filter pass encountered an intermediate-result token with no
    /// entry in the results map. This is never raised as an error by
    /// [`crate::filter`] — it is recorded here only so instrumentation has
    /// a uniform type to log through; the filter itself falls back to
    /// treating the token as a literal.
    #[error("unbound intermediate result: {name}")]
    UnboundResult {
        /// The dangling intermediate-result name.
        name: String,
    },
    /// A register-file construction error, surfaced through the same error
    /// type so `Dfg::new` has a single failure mode.
    #[error(transparent)]
    RegisterFile(#[from] RegisterFileError),
}
