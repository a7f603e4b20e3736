//! The data-flow graph container and its public API.

use crate::error::DfgError;
use crate::filter;
use crate::interval::{BitRange, IntervalMap, Piece};
use crate::machine::StackMachine;
use crate::node::{Graph, Node, NodeId, NodeKind};
use crate::registers::RegisterFile;
use crate::symtab::SymbolTable;
use crate::token::{classify, Operand};

/// Symbolic data-flow graph for a single expression stream over one
/// register file. Single-threaded, disposable scratch state: mutations
/// accumulate across as many calls to [`Dfg::eval_expr`] as the caller
/// likes, and the whole thing is dropped once a caller is done filtering.
#[derive(Debug)]
pub struct Dfg {
    graph: Graph,
    registers: RegisterFile,
    intervals: IntervalMap,
    symbols: SymbolTable,
    idx: usize,
    /// Node most recently written to a register by the last `=`/`:=`/arith-assign.
    cur: Option<NodeId>,
    /// The node `cur` replaced, used by the carry/borrow flag handlers.
    old: Option<NodeId>,
}

impl Dfg {
    /// A fresh DFG over `registers`, with an empty graph and no history.
    pub fn new(registers: RegisterFile) -> Self {
        Self {
            graph: Graph::new(),
            registers,
            intervals: IntervalMap::new(),
            symbols: SymbolTable::new(),
            idx: 0,
            cur: None,
            old: None,
        }
    }

    /// Symbolically evaluate `expr` against this DFG, extending it in place.
    /// Multiple calls accumulate in the same graph, so a caller may feed a
    /// whole basic block one instruction's worth of expression text at a time.
    pub fn eval_expr(&mut self, expr: &str) -> Result<(), DfgError> {
        StackMachine::new().run(self, expr)
    }

    /// Filter pass: reconstruct the reduced postfix expression that computes
    /// `reg`'s current symbolic value. `None` if `reg` has never been
    /// written or read (no defining node exists yet).
    pub fn filter(&mut self, reg: &str) -> Option<String> {
        filter::filter(self, reg)
    }

    pub(crate) fn graph(&self) -> &Graph {
        &self.graph
    }

    fn next_idx(&mut self) -> usize {
        let idx = self.idx;
        self.idx += 1;
        idx
    }

    /// Allocate a node whose content may embed its own creation index
    /// (`result_<idx>`, `<reg>:var_<idx>`, `merge to <reg>:var_<idx>`, ...).
    pub(crate) fn alloc_node(&mut self, kind: NodeKind, content: impl FnOnce(usize) -> String) -> NodeId {
        let idx = self.next_idx();
        self.graph.add_node(idx, content(idx), kind)
    }

    pub(crate) fn add_edge(&mut self, from: NodeId, to: NodeId) {
        self.graph.add_edge(from, to);
    }

    pub(crate) fn append(&mut self, node: NodeId, text: &str) {
        self.graph.node_mut(node).append(text);
    }

    pub(crate) fn node(&self, id: NodeId) -> &Node {
        self.graph.node(id)
    }

    pub(crate) fn cur(&self) -> Option<NodeId> {
        self.cur
    }

    pub(crate) fn old(&self) -> Option<NodeId> {
        self.old
    }

    pub(crate) fn set_cur(&mut self, node: Option<NodeId>) {
        self.cur = node;
    }

    pub(crate) fn set_old(&mut self, node: Option<NodeId>) {
        self.old = node;
    }

    pub(crate) fn bind_result(&mut self, name: &str, node: NodeId) {
        self.symbols.bind_result(name, node);
    }

    pub(crate) fn classify<'a>(&self, token: &'a str) -> Operand<'a> {
        classify(token, &self.registers)
    }

    /// The cached origin node for `reg`, lazily materializing one the first
    /// time any bit of `reg` is found uncovered. Cached per register
    /// *name* for the lifetime of the DFG.
    pub(crate) fn origin(&mut self, reg: &str) -> Result<NodeId, DfgError> {
        if let Some(id) = self.symbols.origin(reg) {
            return Ok(id);
        }
        if !self.registers.contains(reg) {
            return Err(DfgError::InvalidRegister { name: reg.to_string() });
        }
        let reg_node = self.alloc_node(NodeKind::empty(), |_| reg.to_string());
        let origin_node = self.alloc_node(NodeKind::VAR, |idx| format!("{reg}:var_{idx}"));
        self.add_edge(reg_node, origin_node);
        self.symbols.set_origin(reg, origin_node);
        tracing::trace!(reg, node = %origin_node, "materialized register origin");
        Ok(origin_node)
    }

    /// READ a register's current defining node, gathering contributions
    /// from the interval map and lazily filling any gaps with the
    /// register's origin node.
    pub(crate) fn read_register(&mut self, reg: &str) -> Result<NodeId, DfgError> {
        let descriptor = self
            .registers
            .get(reg)
            .ok_or_else(|| DfgError::InvalidRegister { name: reg.to_string() })?;
        let range = BitRange::new(descriptor.from(), descriptor.to());

        let mut parts = Vec::new();
        for piece in self.intervals.gather(range) {
            match piece {
                Piece::Known(node) => parts.push(node),
                Piece::Gap(gap) => {
                    let origin = self.origin(reg)?;
                    self.intervals.write(gap, origin);
                    parts.push(origin);
                }
            }
        }

        match parts.len() {
            0 => unreachable!("a non-empty register range always yields at least one part"),
            1 => Ok(parts[0]),
            _ => {
                let merge = self.alloc_node(NodeKind::GENERATIVE, |idx| format!("merge to {reg}:var_{idx}"));
                for part in parts {
                    self.add_edge(part, merge);
                }
                tracing::trace!(reg, parts = parts.len(), node = %merge, "merged overlapping register parts");
                Ok(merge)
            }
        }
    }

    /// WRITE `node` as the defining node for the whole of `reg`'s bit range.
    pub(crate) fn write_register(&mut self, reg: &str, node: NodeId) -> Result<(), DfgError> {
        let descriptor = self
            .registers
            .get(reg)
            .ok_or_else(|| DfgError::InvalidRegister { name: reg.to_string() })?;
        self.intervals.write(BitRange::new(descriptor.from(), descriptor.to()), node);
        Ok(())
    }

    /// Resolve a popped operand string to the node it refers to: a register
    /// read, a freshly synthesized literal/CONST pair, or a symbol-table
    /// lookup for a bound intermediate result.
    pub(crate) fn resolve_operand(&mut self, token: &str) -> Result<NodeId, DfgError> {
        self.operand(token).map(|(node, _)| node)
    }

    /// Resolve a popped operand string the same way [`Self::resolve_operand`]
    /// does, additionally returning the text a generative node's `content`
    /// should embed for that operand. For registers and intermediate
    /// results the embedded text is the operand string itself (a register
    /// alias or a `result_N`/`<reg>:var_N` name is already its own display
    /// form); for numeric literals it's the synthesized CONST node's
    /// annotated content (`<num>:const_N`), not the bare digits, so the
    /// filter's textual substitution can tell a literal's originating node
    /// apart from one written by a later handler.
    pub(crate) fn operand(&mut self, token: &str) -> Result<(NodeId, String), DfgError> {
        match self.classify(token) {
            Operand::Reg(reg) => {
                let reg = reg.to_string();
                Ok((self.read_register(&reg)?, reg))
            }
            Operand::Num(text) => {
                let literal = self.alloc_node(NodeKind::empty(), |_| text.to_string());
                let constant = self.alloc_node(NodeKind::CONST, |idx| format!("{text}:const_{idx}"));
                self.add_edge(literal, constant);
                let display = self.node(constant).content().to_string();
                Ok((constant, display))
            }
            Operand::Internal(name) => {
                let node = self
                    .symbols
                    .result(name)
                    .ok_or_else(|| DfgError::UnboundResult { name: name.to_string() })?;
                Ok((node, name.to_string()))
            }
        }
    }
}

/// Build a fresh DFG over `registers`, evaluate `expr`, filter `reg`, and
/// discard the DFG. Convenience wrapper for one-shot callers that don't
/// need to accumulate multiple expressions in the same graph.
pub fn filter_expr(registers: RegisterFile, expr: &str, reg: &str) -> Result<Option<String>, DfgError> {
    let mut dfg = Dfg::new(registers);
    dfg.eval_expr(expr)?;
    Ok(dfg.filter(reg))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registers() -> RegisterFile {
        RegisterFile::from_entries([
            ("rax", 0, 64),
            ("eax", 0, 32),
            ("ax", 0, 16),
            ("al", 0, 8),
            ("ah", 8, 8),
        ])
        .unwrap()
    }

    #[test]
    fn simple_constant_assignment_filters_to_constant_and_assign() {
        let mut dfg = Dfg::new(registers());
        dfg.eval_expr("0x10,eax,=").unwrap();
        let filtered = dfg.filter("eax").unwrap();
        assert!(filtered.contains("0x10:const_"));
        assert!(filtered.ends_with(",eax,="));
    }

    #[test]
    fn reading_an_unwritten_register_materializes_its_origin() {
        let mut dfg = Dfg::new(registers());
        dfg.eval_expr("1,rax,+=").unwrap();
        let filtered = dfg.filter("rax").unwrap();
        assert!(filtered.contains("rax:var_"));
        assert!(filtered.contains("1:const_"));
        assert!(filtered.ends_with(",rax,+="));
    }

    #[test]
    fn filter_of_never_written_register_is_none() {
        let mut dfg = Dfg::new(registers());
        assert_eq!(dfg.filter("eax"), None);
    }

    #[test]
    fn filter_expr_builds_and_discards_in_one_call() {
        let filtered = filter_expr(registers(), "0x10,eax,=", "eax").unwrap().unwrap();
        assert!(filtered.contains("0x10:const_"));
    }

    #[test]
    fn unknown_register_read_is_an_error() {
        let mut dfg = Dfg::new(registers());
        let err = dfg.eval_expr("1,zzz,+=").unwrap_err();
        assert!(matches!(err, DfgError::InvalidRegister { .. } | DfgError::RegisterFile(_)));
    }
}
