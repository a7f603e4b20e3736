//! The stack-machine driver: tokenizes expression text and dispatches each
//! operator token to its handler family.

mod handlers;

use crate::dfg::Dfg;
use crate::error::DfgError;
use crate::token::tokenize;

/// Drives symbolic evaluation of one expression over a [`Dfg`]. Owns only
/// the transient operand-name stack; everything persistent lives on the
/// `Dfg` itself, so a fresh `StackMachine` is cheap per call.
#[derive(Debug, Default)]
pub(crate) struct StackMachine {
    stack: Vec<String>,
}

impl StackMachine {
    pub(crate) fn new() -> Self {
        Self { stack: Vec::new() }
    }

    /// Evaluate `expr` token by token against `dfg`.
    pub(crate) fn run(&mut self, dfg: &mut Dfg, expr: &str) -> Result<(), DfgError> {
        for token in tokenize(expr) {
            self.step(dfg, token)?;
        }
        Ok(())
    }

    fn step(&mut self, dfg: &mut Dfg, op: &str) -> Result<(), DfgError> {
        use handlers::*;

        match op {
            "=" => consume_2_set_reg(dfg, &mut self.stack, op, true),
            ":=" => eq_weak(dfg, &mut self.stack, op),
            "+=" | "-=" | "*=" | "/=" | "&=" | "|=" | "^=" => {
                consume_2_set_reg(dfg, &mut self.stack, op, false)
            }
            "+" | "-" | "*" | "/" | "%" | "&" | "|" | "^" | ">>" | "<<" | ">>>" => {
                consume_2_push_1(dfg, &mut self.stack, op)
            }
            "!" | "[1]" | "[2]" | "[4]" | "[8]" | "[16]" => consume_1_push_1(dfg, &mut self.stack, op),
            "=[1]" | "=[2]" | "=[4]" | "=[8]" => consume_2_set_mem(dfg, &mut self.stack, op),
            "$z" => use_new_push_1(dfg, &mut self.stack, op, |cur| format!(":({cur}==0)")),
            "$p" => use_new_push_1(dfg, &mut self.stack, op, |cur| format!(":parity_of({cur})")),
            "$c" => consume_1_use_old_new_push_1(dfg, &mut self.stack, op, |w, cur, old| {
                format!(":(({cur}&mask({w}&0x3f))<({old}&mask({w}&0x3f)))")
            }),
            "$b" => consume_1_use_old_new_push_1(dfg, &mut self.stack, op, |w, cur, old| {
                format!(":(({old}&mask(({w}+0x3f)&0x3f))<({cur}&mask(({w}+0x3f)&0x3f)))")
            }),
            _ => {
                self.stack.push(op.to_string());
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registers::RegisterFile;

    fn registers() -> RegisterFile {
        RegisterFile::from_entries([("eax", 0, 32), ("rax", 0, 64)]).unwrap()
    }

    #[test]
    fn unknown_tokens_are_pushed_as_operands() {
        let mut dfg = Dfg::new(registers());
        let mut machine = StackMachine::new();
        machine.run(&mut dfg, "0x10,eax,=").unwrap();
        assert!(machine.stack.is_empty());
    }

    #[test]
    fn missing_operand_surfaces_as_error() {
        let mut dfg = Dfg::new(registers());
        let mut machine = StackMachine::new();
        let err = machine.run(&mut dfg, "+").unwrap_err();
        assert!(matches!(err, DfgError::MissingOperand { .. }));
    }

    #[test]
    fn binary_operator_leaves_one_result_on_the_stack() {
        let mut dfg = Dfg::new(registers());
        let mut machine = StackMachine::new();
        machine.run(&mut dfg, "1,2,+").unwrap();
        assert_eq!(machine.stack.len(), 1);
        assert!(machine.stack[0].starts_with("result_"));
    }
}
