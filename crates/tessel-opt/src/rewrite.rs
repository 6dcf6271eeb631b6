//! Allocation rewriting.
//!
//! Turns a [`MemoryPlan`] into `Allocate`/`Alias`/`Free` markers in the
//! top-level block. Slot owners get `Allocate`, later occupants get
//! `Alias { buffer, target: owner }`, and each slot is freed once, by its
//! owner's name.

use std::collections::HashSet;

use tessel_ir::{Block, Buffer, Handle, Program, Statement};

use crate::error::PlanError;
use crate::options::MarkerPlacement;
use crate::reuse::{MemoryPlan, buffer_name};

/// Drops top-level markers that name any non-external buffer.
///
/// Those markers are regenerated from the plan, which makes planning an
/// already-planned block a no-op.
pub fn strip_planned_markers(body: &[Statement], externals: &HashSet<Handle<Buffer>>) -> Block {
    body.iter()
        .filter(|stmt| {
            !stmt.is_memory_marker()
                || stmt.marker_buffers().iter().all(|b| externals.contains(b))
        })
        .cloned()
        .collect()
}

/// Rejects markers for planned buffers below the top-level block.
pub fn check_nested_markers(
    program: &Program,
    body: &[Statement],
    plan: &MemoryPlan,
) -> Result<(), PlanError> {
    for stmt in body {
        for block in stmt.sub_blocks() {
            check_block(program, block, plan)?;
        }
    }
    Ok(())
}

fn check_block(program: &Program, block: &[Statement], plan: &MemoryPlan) -> Result<(), PlanError> {
    for stmt in block {
        if let Some(&buffer) = stmt
            .marker_buffers()
            .iter()
            .find(|&&b| plan.slot_of(b).is_some())
        {
            return Err(PlanError::ScopedMarker {
                buffer: buffer_name(program, buffer),
            });
        }
        for sub in stmt.sub_blocks() {
            check_block(program, sub, plan)?;
        }
    }
    Ok(())
}

/// The `Allocate` or `Alias` marker introducing `buffer`.
fn introduce(plan: &MemoryPlan, buffer: Handle<Buffer>) -> Option<Statement> {
    let owner = plan.owner_of(buffer)?;
    Some(if owner == buffer {
        Statement::Allocate(buffer)
    } else {
        Statement::Alias {
            buffer,
            target: owner,
        }
    })
}

/// Inserts the markers for `plan` into a marker-free `body`.
pub fn insert_markers(body: Block, plan: &MemoryPlan, placement: MarkerPlacement) -> Block {
    if plan.is_empty() {
        return body;
    }
    match placement {
        MarkerPlacement::LiveRange => place_at_live_range(body, plan),
        MarkerPlacement::Hoisted => place_hoisted(body, plan),
    }
}

fn place_at_live_range(body: Block, plan: &MemoryPlan) -> Block {
    let len = body.len();
    let mut before: Vec<Vec<Statement>> = vec![Vec::new(); len];
    let mut after: Vec<Vec<Statement>> = vec![Vec::new(); len];

    for &buffer in plan.order() {
        let Some(slot) = plan.slot_of(buffer) else {
            continue;
        };
        let occupants = &plan.slot(slot).occupants;
        let Some(occupant) = occupants.iter().find(|o| o.buffer == buffer) else {
            continue;
        };
        let Some(marker) = introduce(plan, buffer) else {
            continue;
        };
        if let Some(at) = before.get_mut(occupant.range.start) {
            at.push(marker);
        }
    }
    // Reverse creation order, so later slots are released first at a shared
    // position.
    for (_, slot) in plan.slots().iter().collect::<Vec<_>>().into_iter().rev() {
        if let Some(at) = after.get_mut(slot.last_use()) {
            at.push(Statement::Free(slot.owner));
        }
    }

    let mut out = Vec::with_capacity(len + 2 * plan.order().len());
    for ((stmt, head), tail) in body.into_iter().zip(before).zip(after) {
        out.extend(head);
        out.push(stmt);
        out.extend(tail);
    }
    out
}

fn place_hoisted(body: Block, plan: &MemoryPlan) -> Block {
    let mut out: Block = plan
        .order()
        .iter()
        .filter_map(|&buffer| introduce(plan, buffer))
        .collect();
    out.extend(body);
    let frees: Vec<_> = plan.slots().iter().map(|(_, s)| Statement::Free(s.owner)).collect();
    out.extend(frees.into_iter().rev());
    out
}
