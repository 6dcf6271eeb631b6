//! Lowering passes for tessel IR.
//!
//! Provides a [`Pass`] trait, a [`PassManager`] with fixed-point iteration,
//! IR validation, and the memory-planning pass that lets temporaries with
//! disjoint live ranges share backing storage.

mod compat;
mod error;
pub mod liveness;
mod memory;
mod options;
pub mod reuse;
pub mod rewrite;
mod validation;

pub use compat::can_reuse;
pub use error::PlanError;
pub use liveness::{LiveRange, Liveness, live_range};
pub use memory::{MemoryPlanning, PlannedProgram, plan_memory};
pub use options::{MarkerPlacement, PlannerOptions, SlotPolicy};
pub use reuse::{BufferInfo, MemoryPlan, Slot, plan_reuse};
pub use validation::{IrValidation, validate_program};

use std::fmt::Debug;

use tessel_ir::{Buffer, Handle, Program};

/// A pass that transforms a program.
pub trait Pass: Debug {
    /// Human-readable name of the pass.
    fn name(&self) -> &str;

    /// Run the pass on a program. Returns `true` if anything was modified.
    fn run(&self, program: &mut Program) -> Result<bool, PlanError>;
}

/// Optimization level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OptLevel {
    /// Validation only.
    O0,
    /// Validation and memory planning.
    #[default]
    O1,
    /// Same as O1 for now.
    O2,
}

/// Maximum number of fixed-point iterations before giving up.
const MAX_ITERATIONS: usize = 10;

/// Runs passes in sequence with fixed-point iteration.
#[derive(Debug)]
pub struct PassManager {
    passes: Vec<Box<dyn Pass>>,
}

impl Default for PassManager {
    fn default() -> Self {
        Self::new()
    }
}

impl PassManager {
    /// Creates an empty pass manager with no passes.
    pub fn new() -> Self {
        Self { passes: Vec::new() }
    }

    /// Creates a pass manager for `level`; `outputs` are the buffers that
    /// must keep their own storage.
    pub fn for_level(level: OptLevel, outputs: &[Handle<Buffer>]) -> Self {
        let mut pm = Self::new();
        pm.add_pass(Box::new(IrValidation));
        match level {
            OptLevel::O0 => {}
            OptLevel::O1 | OptLevel::O2 => {
                pm.add_pass(Box::new(MemoryPlanning::new(outputs.to_vec())));
            }
        }
        pm
    }

    /// Adds a pass to the pipeline.
    pub fn add_pass(&mut self, pass: Box<dyn Pass>) {
        self.passes.push(pass);
    }

    /// Names of the registered passes, in run order.
    pub fn pass_names(&self) -> Vec<&str> {
        self.passes.iter().map(|p| p.name()).collect()
    }

    /// Runs all passes until a fixed point is reached or the iteration limit.
    ///
    /// Stops at the first pass that fails.
    pub fn run(&self, program: &mut Program) -> Result<(), PlanError> {
        for iteration in 0..MAX_ITERATIONS {
            let mut changed = false;
            for pass in &self.passes {
                let modified = pass.run(program)?;
                if modified {
                    log::debug!("pass '{}' changed the program", pass.name());
                }
                changed |= modified;
            }
            if !changed {
                return Ok(());
            }
            log::trace!("fixed-point iteration {iteration} made changes");
        }
        log::warn!("pass pipeline did not converge after {MAX_ITERATIONS} iterations");
        Ok(())
    }
}

/// Convenience function: runs the O1 pipeline on a program.
pub fn optimize(program: &mut Program, outputs: &[Handle<Buffer>]) -> Result<(), PlanError> {
    PassManager::for_level(OptLevel::O1, outputs).run(program)
}
