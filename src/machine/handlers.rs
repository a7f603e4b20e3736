//! The six handler families the stack machine dispatches operator tokens
//! to. Each pops its operands off the evaluation stack, resolves them to
//! graph nodes, synthesizes the operator's generative/result nodes, and
//! (where applicable) pushes a new intermediate-result name back.

use crate::dfg::Dfg;
use crate::error::DfgError;
use crate::node::NodeKind;

fn pop(stack: &mut Vec<String>, op: &str) -> Result<String, DfgError> {
    stack.pop().ok_or_else(|| DfgError::MissingOperand { op: op.to_string() })
}

/// Unary operator producing a value: `!`, the `[N]` memory reads.
pub(crate) fn consume_1_push_1(dfg: &mut Dfg, stack: &mut Vec<String>, op: &str) -> Result<(), DfgError> {
    let s = pop(stack, op)?;
    let (s_node, s_text) = dfg.operand(&s)?;
    let g = dfg.alloc_node(NodeKind::RESULT | NodeKind::GENERATIVE, |_| format!("{s_text},{op}"));
    dfg.add_edge(s_node, g);

    let r = dfg.alloc_node(NodeKind::RESULT, |idx| format!("result_{idx}"));
    dfg.add_edge(g, r);
    let result_name = dfg.node(r).content().to_string();
    dfg.bind_result(&result_name, r);
    stack.push(result_name);
    Ok(())
}

/// Binary operator producing a value: arithmetic, bitwise, shifts.
pub(crate) fn consume_2_push_1(dfg: &mut Dfg, stack: &mut Vec<String>, op: &str) -> Result<(), DfgError> {
    let a = pop(stack, op)?;
    let b = pop(stack, op)?;
    let (a_node, a_text) = dfg.operand(&a)?;
    let (b_node, b_text) = dfg.operand(&b)?;
    let g = dfg.alloc_node(NodeKind::RESULT | NodeKind::GENERATIVE, |_| format!("{b_text},{a_text},{op}"));
    dfg.add_edge(a_node, g);
    dfg.add_edge(b_node, g);

    let r = dfg.alloc_node(NodeKind::RESULT, |idx| format!("result_{idx}"));
    dfg.add_edge(g, r);
    let result_name = dfg.node(r).content().to_string();
    dfg.bind_result(&result_name, r);
    stack.push(result_name);
    Ok(())
}

/// Register-writing operator: `=` (`use_origin = true`) and the
/// arithmetic-assignment family (`use_origin = false`).
pub(crate) fn consume_2_set_reg(
    dfg: &mut Dfg,
    stack: &mut Vec<String>,
    op: &str,
    use_origin: bool,
) -> Result<(), DfgError> {
    let dst = pop(stack, op)?;
    let src = pop(stack, op)?;

    let (src_node, src_text) = dfg.operand(&src)?;
    let dst_node = if use_origin { dfg.origin(&dst)? } else { dfg.read_register(&dst)? };
    let old_dst_node = dst_node;

    let g = dfg.alloc_node(NodeKind::GENERATIVE, |_| format!("{src_text},{dst},{op}"));
    dfg.add_edge(dst_node, g);
    dfg.add_edge(src_node, g);

    let r = dfg.alloc_node(NodeKind::RESULT | NodeKind::VAR, |idx| format!("{dst}:var_{idx}"));
    dfg.add_edge(g, r);

    dfg.write_register(&dst, r)?;
    dfg.set_old(Some(old_dst_node));
    dfg.set_cur(Some(r));
    Ok(())
}

/// Weak assignment `:=`: writes the register like `=`, but the flag
/// operators must keep referring to whatever `cur`/`old` already were —
/// a weak write doesn't reset the carry/zero/parity history.
pub(crate) fn eq_weak(dfg: &mut Dfg, stack: &mut Vec<String>, op: &str) -> Result<(), DfgError> {
    let prev_old = dfg.old();
    let prev_cur = dfg.cur();
    consume_2_set_reg(dfg, stack, op, true)?;
    dfg.set_old(prev_old);
    dfg.set_cur(prev_cur);
    Ok(())
}

/// Memory store `=[N]`. Structurally identical to [`consume_2_set_reg`]
/// except the destination is an address, not a register to WRITE into —
/// no interval-map write occurs and nothing is bound or pushed.
pub(crate) fn consume_2_set_mem(dfg: &mut Dfg, stack: &mut Vec<String>, op: &str) -> Result<(), DfgError> {
    let dst = pop(stack, op)?;
    let src = pop(stack, op)?;

    let (src_node, src_text) = dfg.operand(&src)?;

    let dst_node = match dfg.read_register(&dst) {
        Ok(node) => Some(node),
        Err(_) => match dfg.classify(&dst) {
            crate::token::Operand::Internal(name) => dfg.resolve_operand(name).ok(),
            _ => None,
        },
    };

    // Unreachable in practice: classify() and read_register() consult the
    // same register table, so a name classified Reg never fails the read
    // above. Kept for parity with the dead branch it mirrors.
    let dst_node = match dst_node {
        Some(node) => node,
        None if matches!(dfg.classify(&dst), crate::token::Operand::Reg(_)) => {
            let reg_label = dfg.alloc_node(NodeKind::empty(), |_| dst.clone());
            let ptr = dfg.alloc_node(NodeKind::VAR | NodeKind::PTR, |idx| format!("{dst}:var_ptr_{idx}"));
            dfg.add_edge(reg_label, ptr);
            ptr
        }
        None => return Err(DfgError::MissingOperand { op: op.to_string() }),
    };

    let g = dfg.alloc_node(NodeKind::GENERATIVE, |_| format!("{src_text},{dst},{op}"));
    dfg.add_edge(dst_node, g);
    dfg.add_edge(src_node, g);

    let r = dfg.alloc_node(NodeKind::VAR, |idx| format!("{dst}:var_mem_{idx}"));
    dfg.add_edge(g, r);
    Ok(())
}

/// `$z`/`$p`: synthesize a constraint over the most recent write, with no
/// operands popped.
pub(crate) fn use_new_push_1(
    dfg: &mut Dfg,
    stack: &mut Vec<String>,
    op: &str,
    constraint: impl FnOnce(&str) -> String,
) -> Result<(), DfgError> {
    let latest_new = dfg.cur().ok_or_else(|| DfgError::MissingOperand { op: op.to_string() })?;
    let op_node = dfg.alloc_node(NodeKind::empty(), |_| op.to_string());

    let new_text = dfg.node(latest_new).content().to_string();
    let r = dfg.alloc_node(NodeKind::RESULT, |idx| format!("result_{idx}"));
    dfg.append(r, &constraint(&new_text));

    dfg.add_edge(latest_new, op_node);
    dfg.add_edge(op_node, r);

    let result_name = dfg.node(r).content().to_string();
    dfg.bind_result(&result_name, r);
    stack.push(result_name);
    Ok(())
}

/// `$c`/`$b`: pop a width operand, synthesize a constraint referencing
/// both the most recent write and the value it replaced.
pub(crate) fn consume_1_use_old_new_push_1(
    dfg: &mut Dfg,
    stack: &mut Vec<String>,
    op: &str,
    constraint: impl FnOnce(&str, &str, &str) -> String,
) -> Result<(), DfgError> {
    let w = pop(stack, op)?;
    let op_node = dfg.alloc_node(NodeKind::empty(), |_| format!("{w},{op}"));
    let w_node = dfg.resolve_operand(&w)?;
    dfg.add_edge(w_node, op_node);

    let latest_new = dfg.cur().ok_or_else(|| DfgError::MissingOperand { op: op.to_string() })?;
    let latest_old = dfg.old().ok_or_else(|| DfgError::MissingOperand { op: op.to_string() })?;

    let w_text = dfg.node(w_node).content().to_string();
    let new_text = dfg.node(latest_new).content().to_string();
    let old_text = dfg.node(latest_old).content().to_string();

    let r = dfg.alloc_node(NodeKind::RESULT, |idx| format!("result_{idx}"));
    dfg.append(r, &constraint(&w_text, &new_text, &old_text));

    dfg.add_edge(latest_new, op_node);
    dfg.add_edge(latest_old, op_node);
    dfg.add_edge(op_node, r);

    let result_name = dfg.node(r).content().to_string();
    dfg.bind_result(&result_name, r);
    stack.push(result_name);
    Ok(())
}
