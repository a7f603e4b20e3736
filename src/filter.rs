//! The filter pass: reduce a DFG down to the postfix expression that
//! computes one register's current symbolic value.

use crate::dfg::Dfg;
use crate::node::{Graph, NodeId, NodeKind};
use std::collections::{BTreeMap, HashMap};

/// Reconstruct the reduced postfix expression for `reg`'s current value,
/// or `None` if `reg` has no defining node (unknown register name).
pub(crate) fn filter(dfg: &mut Dfg, reg: &str) -> Option<String> {
    let root = dfg.read_register(reg).ok()?;

    let mut generative: BTreeMap<usize, NodeId> = BTreeMap::new();
    let mut results: HashMap<String, NodeId> = HashMap::new();

    // RESULT must win over GENERATIVE for combined-kind nodes (the `g` node
    // of consume_1_push_1/consume_2_push_1 is RESULT|GENERATIVE): such a
    // node's content reaches the output only by substitution through the
    // pure-RESULT node downstream of it, never as its own standalone
    // top-level fragment — otherwise it prints twice.
    dfg.graph().reverse_dfs(root, |id, node| {
        if node.kind().contains(NodeKind::RESULT) {
            if let Some(&generator) = node.incoming().first() {
                results.insert(node.content().to_string(), generator);
            }
        } else if node.kind().contains(NodeKind::GENERATIVE) {
            generative.insert(node.idx(), id);
        }
    });

    let mut filtered = String::new();
    for id in generative.values() {
        filtered.push_str(&resolve(dfg.graph(), &results, *id));
    }

    let collapsed = filtered.replace(",,", ",").replace(",,", ",");
    Some(collapsed.strip_prefix(',').unwrap_or(&collapsed).to_string())
}

/// Expand a generative node's comma-separated content, substituting any
/// token bound in `results` with its generator's own expansion — the
/// trailing token is always the operator and is never a substitution
/// target.
fn resolve(graph: &Graph, results: &HashMap<String, NodeId>, id: NodeId) -> String {
    let content = graph.node(id).content();
    let mut tokens = content.split(',').peekable();
    let mut out = String::new();

    while let Some(token) = tokens.next() {
        if tokens.peek().is_none() {
            out.push_str(token);
        } else if let Some(&generator) = results.get(token) {
            out.push(',');
            out.push_str(&resolve(graph, results, generator));
            out.push(',');
        } else {
            out.push(',');
            out.push_str(token);
            out.push(',');
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registers::RegisterFile;

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
    fn chained_intermediates_fully_substitute() {
        let mut dfg = Dfg::new(registers());
        dfg.eval_expr("1,2,+,3,+,eax,=").unwrap();
        let filtered = dfg.filter("eax").unwrap();

        assert!(!filtered.starts_with(','));
        assert!(!filtered.contains(",,"));
        assert!(filtered.contains("1:const_"));
        assert!(filtered.contains("2:const_"));
        assert!(filtered.contains("3:const_"));
        assert!(filtered.ends_with(",eax,="));
        // only two `+` survive in the fully-expanded form, no leftover
        // result_N placeholders.
        assert!(!filtered.contains("result_"));
        // each `+` substitutes exactly once; a RESULT|GENERATIVE operator
        // node printed both standalone and via substitution would double
        // these counts.
        assert_eq!(filtered.matches(",+").count(), 2);
        assert_eq!(filtered.matches("1:const_").count(), 1);
        assert_eq!(filtered.matches("2:const_").count(), 1);
        assert_eq!(filtered.matches("3:const_").count(), 1);
    }

    #[test]
    fn sub_register_overlap_merges_into_ax() {
        let mut dfg = Dfg::new(registers());
        dfg.eval_expr("0xFF,al,=,ah,ah,+=").unwrap();
        let filtered = dfg.filter("ax").unwrap();

        assert!(filtered.contains("0xFF:const_"));
        assert!(filtered.contains("ah:var_"));
        assert!(filtered.contains("merge to ax:var_"));
    }

    #[test]
    fn zero_flag_does_not_disturb_the_register_it_was_read_from() {
        let mut dfg = Dfg::new(registers());
        dfg.eval_expr("eax,eax,^=,$z").unwrap();
        // $z only pushes a result name; eax's defining node is still the
        // xor write, untouched by evaluating the flag afterwards.
        let filtered = dfg.filter("eax").unwrap();
        assert!(filtered.ends_with(",^="));
    }

    #[test]
    fn weak_assignment_keeps_flag_history_pointed_at_the_addition() {
        let mut dfg = Dfg::new(registers());
        dfg.eval_expr("1,2,+,eax,=,$z").unwrap();
        dfg.eval_expr("5,eax,:=").unwrap();
        // cur/old after the weak write still point at the addition's
        // write, not at 5 — filtering eax directly should show the weak
        // write on top, independent of $z's own frozen reference.
        let filtered = dfg.filter("eax").unwrap();
        assert!(filtered.contains("5:const_"));
        assert!(filtered.ends_with(",eax,:="));
    }
}
