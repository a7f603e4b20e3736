//! Minimal first-party tokenizer and operand classifier.
//!
//! The expression language itself is an external concern — callers may
//! tokenize and classify operands however they like before driving
//! [`crate::machine::StackMachine`] — but a small built-in implementation
//! keeps the crate runnable standalone on raw expression text.

use crate::registers::RegisterFile;

/// What an operand string popped from the stack resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand<'a> {
    /// A known register alias.
    Reg(&'a str),
    /// An integer literal, still in its original textual form.
    Num(&'a str),
    /// An intermediate-result name bound in the symbol table
    /// (`result_N`, `<reg>:var_N`, `<reg>:var_mem_N`).
    Internal(&'a str),
}

/// Split `expr` on commas and whitespace, dropping empty fragments.
pub fn tokenize(expr: &str) -> impl Iterator<Item = &str> {
    expr.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|tok| !tok.is_empty())
}

/// Classify a popped operand string against the known register names.
/// Anything parsing as an integer literal (hex `0x..` or decimal,
/// optionally negative) that isn't itself a register name is `Num`;
/// anything else is `Internal`.
pub fn classify<'a>(token: &'a str, registers: &RegisterFile) -> Operand<'a> {
    if registers.contains(token) {
        Operand::Reg(token)
    } else if is_numeric_literal(token) {
        Operand::Num(token)
    } else {
        Operand::Internal(token)
    }
}

fn is_numeric_literal(token: &str) -> bool {
    let token = token.strip_prefix('-').unwrap_or(token);
    if let Some(hex) = token.strip_prefix("0x").or_else(|| token.strip_prefix("0X")) {
        !hex.is_empty() && hex.chars().all(|c| c.is_ascii_hexdigit())
    } else {
        !token.is_empty() && token.chars().all(|c| c.is_ascii_digit())
    }
}
