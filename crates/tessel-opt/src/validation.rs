//! IR validation pass.
//!
//! Checks that every handle in the program points inside its arena and that
//! loads and stores index buffers with the right rank. Suspicious but legal
//! shapes (zero-sized buffers, empty loops, duplicate buffer names) are only
//! logged. This pass never modifies the program.

use std::collections::HashSet;

use tessel_ir::{Buffer, Expression, Handle, IrError, Program, Statement};

use crate::Pass;
use crate::error::PlanError;

/// Validates IR structural invariants. Returns `Ok(false)` on success.
#[derive(Debug)]
pub struct IrValidation;

impl Pass for IrValidation {
    fn name(&self) -> &str {
        "ir-validation"
    }

    fn run(&self, program: &mut Program) -> Result<bool, PlanError> {
        validate_program(program)?;
        Ok(false)
    }
}

/// Runs the checks of [`IrValidation`] without going through a pipeline.
pub fn validate_program(program: &Program) -> Result<(), IrError> {
    let mut names = HashSet::new();
    for (handle, buffer) in program.buffers.iter() {
        if buffer.byte_footprint() == Some(0) {
            log::warn!("buffer '{}' ({handle:?}) has zero size", buffer.name);
        }
        if !names.insert(buffer.name.as_str()) {
            log::warn!("buffer name '{}' is declared more than once", buffer.name);
        }
    }
    for &argument in &program.arguments {
        program.buffers.check(argument, "buffer")?;
    }

    for (handle, expr) in program.expressions.iter() {
        for operand in expr.operands() {
            program.expressions.check(operand, "expression")?;
        }
        match expr {
            Expression::Variable(var) => program.variables.check(*var, "variable")?,
            Expression::Load { buffer, indices } => {
                check_access(program, *buffer, indices.len()).inspect_err(|_| {
                    log::debug!("invalid load in expression {handle:?}");
                })?;
            }
            Expression::Literal(_)
            | Expression::Unary { .. }
            | Expression::Binary { .. }
            | Expression::Select { .. }
            | Expression::Cast { .. } => {}
        }
    }

    validate_block(program, &program.body)
}

fn check_access(program: &Program, buffer: Handle<Buffer>, indices: usize) -> Result<(), IrError> {
    program.buffers.check(buffer, "buffer")?;
    let desc = &program.buffers[buffer];
    if desc.rank() != indices {
        return Err(IrError::RankMismatch {
            buffer: desc.name.clone(),
            rank: desc.rank(),
            indices,
        });
    }
    Ok(())
}

fn validate_block(program: &Program, block: &[Statement]) -> Result<(), IrError> {
    for stmt in block {
        match stmt {
            Statement::Store {
                buffer,
                indices,
                value,
            } => {
                check_access(program, *buffer, indices.len())?;
                for &index in indices {
                    program.expressions.check(index, "expression")?;
                }
                program.expressions.check(*value, "expression")?;
            }
            Statement::For {
                var,
                start,
                end,
                body,
            } => {
                program.variables.check(*var, "variable")?;
                program.expressions.check(*start, "expression")?;
                program.expressions.check(*end, "expression")?;
                if body.is_empty() {
                    log::warn!(
                        "loop over '{}' has an empty body",
                        program.variables[*var].name
                    );
                }
                validate_block(program, body)?;
            }
            Statement::If {
                condition,
                accept,
                reject,
            } => {
                program.expressions.check(*condition, "expression")?;
                validate_block(program, accept)?;
                validate_block(program, reject)?;
            }
            Statement::Block(inner) => validate_block(program, inner)?,
            Statement::Allocate(_) | Statement::Alias { .. } | Statement::Free(_) => {
                for buffer in stmt.marker_buffers() {
                    program.buffers.check(buffer, "buffer")?;
                }
            }
        }
    }
    Ok(())
}
