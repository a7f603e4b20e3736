//! Symbolic data-flow graph builder and filter for postfix
//! instruction-semantics expressions.
//!
//! Feed a [`dfg::Dfg`] register-write/read expressions one token stream at
//! a time; it builds a directed graph of constants, registers, and operator
//! applications. The [`dfg::Dfg::filter`] pass then reduces that graph back
//! down to the postfix expression that computes a single register's current
//! symbolic value, substituting every intermediate result with its
//! generating sub-expression.

pub mod dfg;
pub mod error;
pub mod interval;
mod filter;
mod machine;
pub mod node;
pub mod registers;
mod symtab;
pub mod token;

pub mod prelude {
    pub use crate::dfg::{filter_expr, Dfg};
    pub use crate::error::{DfgError, RegisterFileError};
    pub use crate::node::{NodeId, NodeKind};
    pub use crate::registers::{RegisterDescriptor, RegisterFile, RegisterFileBuilder};
    pub use crate::token::{classify, tokenize, Operand};
}
