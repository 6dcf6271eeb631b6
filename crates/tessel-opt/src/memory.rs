//! Memory planning pass.
//!
//! Computes the live range of every temporary buffer in the top-level
//! block and lets buffers whose ranges do not overlap share backing storage.
//! The result is written back into the program as `Allocate`, `Alias` and
//! `Free` markers.
//!
//! Caller-bound buffers (`Program::arguments`) and the requested outputs are
//! external: they are never planned, never aliased and never freed here.

use std::collections::HashSet;

use tessel_ir::{Buffer, Handle, Program};

use crate::Pass;
use crate::error::PlanError;
use crate::liveness::Liveness;
use crate::options::PlannerOptions;
use crate::reuse::{BufferInfo, MemoryPlan, plan_reuse};
use crate::rewrite;

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// A rewritten program together with the plan that produced it.
#[derive(Clone, Debug)]
pub struct PlannedProgram {
    pub program: Program,
    pub plan: MemoryPlan,
}

/// Plans storage reuse for the temporaries of `program`.
///
/// `program` is left untouched; the rewritten copy is returned along with
/// the plan. Fails if an output handle is out of bounds, if a planned buffer
/// has a marker nested below the top-level block, or if the plan breaks a
/// safety invariant.
pub fn plan_memory(
    program: &Program,
    outputs: &[Handle<Buffer>],
    options: &PlannerOptions,
) -> Result<PlannedProgram, PlanError> {
    for &output in outputs {
        program.buffers.check(output, "buffer")?;
    }
    let externals: HashSet<Handle<Buffer>> = program
        .arguments
        .iter()
        .chain(outputs)
        .copied()
        .collect();

    let body = rewrite::strip_planned_markers(&program.body, &externals);
    let liveness = Liveness::compute_block(program, &body);
    let buffers = collect_temporaries(program, &liveness, &externals)?;

    let plan = plan_reuse(buffers, options);
    rewrite::check_nested_markers(program, &body, &plan)?;
    plan.verify(program, &externals)?;

    let body = rewrite::insert_markers(body, &plan, options.placement);
    log::debug!(
        "memory plan: {} buffers in {} slots, {} of {} bytes reserved",
        plan.order().len(),
        plan.slots().len(),
        plan.planned_bytes(),
        plan.unplanned_bytes()
    );

    let mut rewritten = program.clone();
    rewritten.body = body;
    Ok(PlannedProgram {
        program: rewritten,
        plan,
    })
}

/// Referenced, non-external buffers with their footprints and ranges.
fn collect_temporaries(
    program: &Program,
    liveness: &Liveness,
    externals: &HashSet<Handle<Buffer>>,
) -> Result<Vec<BufferInfo>, PlanError> {
    let mut infos = Vec::new();
    for (first_seen, &buffer) in liveness.buffers().iter().enumerate() {
        if externals.contains(&buffer) {
            continue;
        }
        let Some(range) = liveness.range(buffer) else {
            continue;
        };
        program.buffers.check(buffer, "buffer")?;
        let desc = &program.buffers[buffer];
        let footprint = desc.byte_footprint();
        if footprint.is_none() {
            log::debug!("buffer '{}' has no static footprint; not shared", desc.name);
        }
        infos.push(BufferInfo {
            buffer,
            dtype: desc.dtype,
            footprint,
            range,
            first_seen,
        });
    }
    Ok(infos)
}

// ---------------------------------------------------------------------------
// Pass integration
// ---------------------------------------------------------------------------

/// Memory planning as a pipeline pass.
///
/// Reports a change only when the marker layout differs from what the body
/// already holds, so rerunning it on its own output is a no-op.
#[derive(Debug, Default)]
pub struct MemoryPlanning {
    pub outputs: Vec<Handle<Buffer>>,
    pub options: PlannerOptions,
}

impl MemoryPlanning {
    pub fn new(outputs: Vec<Handle<Buffer>>) -> Self {
        Self {
            outputs,
            options: PlannerOptions::default(),
        }
    }

    pub fn with_options(mut self, options: PlannerOptions) -> Self {
        self.options = options;
        self
    }
}

impl Pass for MemoryPlanning {
    fn name(&self) -> &str {
        "memory-planning"
    }

    fn run(&self, program: &mut Program) -> Result<bool, PlanError> {
        let planned = plan_memory(program, &self.outputs, &self.options)?;
        if planned.program.body == program.body {
            return Ok(false);
        }
        log::trace!("{}", planned.plan);
        *program = planned.program;
        Ok(true)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
