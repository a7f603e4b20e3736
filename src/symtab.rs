//! Maps register and intermediate-result names to the graph nodes that
//! currently stand for them, mirroring the two dynamic namespaces the
//! original source keeps in its transition table: cached per-register
//! origin nodes and live intermediate-result bindings.

use crate::node::NodeId;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy)]
enum SymbolEntry {
    Origin(NodeId),
    Result(NodeId),
}

/// Name-keyed lookup for origin nodes and intermediate results.
///
/// Register descriptors (bit offsets) live in [`crate::registers::RegisterFile`]
/// and the live register value graph lives in
/// [`crate::interval::IntervalMap`] — this table only covers the two
/// namespaces that are keyed by plain string identity rather than bit range.
#[derive(Debug, Clone, Default)]
pub(crate) struct SymbolTable {
    entries: HashMap<String, SymbolEntry>,
}

impl SymbolTable {
    pub(crate) fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// The cached origin node for `reg`, if one has already been
    /// materialized. Origin nodes are cached per register *name*, not per
    /// bit range — `al` and `ah` each get their own origin node even
    /// though both alias bits of the same underlying `ax`/`eax`/`rax`
    /// storage.
    pub(crate) fn origin(&self, reg: &str) -> Option<NodeId> {
        match self.entries.get(reg) {
            Some(SymbolEntry::Origin(id)) => Some(*id),
            _ => None,
        }
    }

    /// Cache `node` as the origin for `reg`. Called exactly once per
    /// register name, the first time it's read before ever being written.
    pub(crate) fn set_origin(&mut self, reg: &str, node: NodeId) {
        self.entries.insert(reg.to_string(), SymbolEntry::Origin(node));
    }

    /// The node bound to intermediate result `name`, if any.
    pub(crate) fn result(&self, name: &str) -> Option<NodeId> {
        match self.entries.get(name) {
            Some(SymbolEntry::Result(id)) => Some(*id),
            _ => None,
        }
    }

    /// Bind intermediate result `name` to `node`, overwriting any prior
    /// binding under that name.
    pub(crate) fn bind_result(&mut self, name: &str, node: NodeId) {
        self.entries.insert(name.to_string(), SymbolEntry::Result(node));
    }
}
