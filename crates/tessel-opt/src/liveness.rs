//! Buffer live-range analysis.
//!
//! Statements of the top-level block are numbered from zero. A buffer is
//! live from the first to the last top-level statement that loads from or
//! stores to it, at any nesting depth below that statement. Memory markers
//! (`Allocate`, `Alias`, `Free`) do not count as references.

use std::collections::{HashMap, HashSet};
use std::fmt;

use tessel_ir::{Buffer, Expression, Handle, Program, Statement};

use crate::error::PlanError;
use crate::reuse::buffer_name;

/// Inclusive span of top-level statement indices.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub struct LiveRange {
    pub start: usize,
    pub end: usize,
}

impl LiveRange {
    /// A range covering the single statement at `index`.
    pub fn at(index: usize) -> Self {
        Self {
            start: index,
            end: index,
        }
    }

    /// Returns `true` if some statement index lies in both ranges.
    pub fn overlaps(&self, other: &LiveRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    fn include(&mut self, index: usize) {
        self.start = self.start.min(index);
        self.end = self.end.max(index);
    }
}

impl fmt::Display for LiveRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}

/// Collects the buffers reachable from one statement, in pre-order.
struct ReferenceCollector<'a> {
    program: &'a Program,
    seen_exprs: HashSet<Handle<Expression>>,
    seen_buffers: HashSet<Handle<Buffer>>,
    buffers: Vec<Handle<Buffer>>,
}

impl<'a> ReferenceCollector<'a> {
    fn new(program: &'a Program) -> Self {
        Self {
            program,
            seen_exprs: HashSet::new(),
            seen_buffers: HashSet::new(),
            buffers: Vec::new(),
        }
    }

    fn touch(&mut self, buffer: Handle<Buffer>) {
        if self.seen_buffers.insert(buffer) {
            self.buffers.push(buffer);
        }
    }

    fn visit_block(&mut self, block: &[Statement]) {
        for stmt in block {
            self.visit_stmt(stmt);
        }
    }

    fn visit_stmt(&mut self, stmt: &Statement) {
        match stmt {
            Statement::Store {
                buffer,
                indices,
                value,
            } => {
                self.touch(*buffer);
                for &index in indices {
                    self.visit_expr(index);
                }
                self.visit_expr(*value);
            }
            Statement::For {
                start, end, body, ..
            } => {
                self.visit_expr(*start);
                self.visit_expr(*end);
                self.visit_block(body);
            }
            Statement::If {
                condition,
                accept,
                reject,
            } => {
                self.visit_expr(*condition);
                self.visit_block(accept);
                self.visit_block(reject);
            }
            Statement::Block(block) => self.visit_block(block),
            Statement::Allocate(_) | Statement::Alias { .. } | Statement::Free(_) => {}
        }
    }

    fn visit_expr(&mut self, root: Handle<Expression>) {
        let mut stack = vec![root];
        while let Some(handle) = stack.pop() {
            if !self.seen_exprs.insert(handle) {
                continue;
            }
            let Some(expr) = self.program.expressions.try_get(handle) else {
                continue;
            };
            if let Expression::Load { buffer, .. } = expr {
                self.touch(*buffer);
            }
            // reversed so operands are visited left to right
            stack.extend(expr.operands().into_iter().rev());
        }
    }

    fn finish(self) -> (Vec<Handle<Buffer>>, HashSet<Handle<Buffer>>) {
        (self.buffers, self.seen_buffers)
    }
}

/// Buffers referenced by `stmt` (loads and stores at any depth), in
/// pre-order of first reference.
pub fn referenced_buffers(program: &Program, stmt: &Statement) -> Vec<Handle<Buffer>> {
    let mut collector = ReferenceCollector::new(program);
    collector.visit_stmt(stmt);
    collector.finish().0
}

fn statement_references(program: &Program, stmt: &Statement, buffer: Handle<Buffer>) -> bool {
    let mut collector = ReferenceCollector::new(program);
    collector.visit_stmt(stmt);
    collector.finish().1.contains(&buffer)
}

/// Live range of one buffer over `program.body`.
///
/// Returns [`PlanError::UnreferencedBuffer`] if no top-level statement
/// references the buffer.
pub fn live_range(program: &Program, buffer: Handle<Buffer>) -> Result<LiveRange, PlanError> {
    let mut range: Option<LiveRange> = None;
    for (index, stmt) in program.body.iter().enumerate() {
        if statement_references(program, stmt, buffer) {
            match range.as_mut() {
                Some(r) => r.include(index),
                None => range = Some(LiveRange::at(index)),
            }
        }
    }
    range.ok_or_else(|| PlanError::UnreferencedBuffer {
        buffer: buffer_name(program, buffer),
    })
}

/// Live ranges of every buffer referenced in a block, computed in one walk.
#[derive(Clone, Debug, Default)]
pub struct Liveness {
    ranges: HashMap<Handle<Buffer>, LiveRange>,
    /// Buffers in order of first reference.
    appearance: Vec<Handle<Buffer>>,
    /// Buffers referenced by each top-level statement.
    touched: Vec<Vec<Handle<Buffer>>>,
}

impl Liveness {
    /// Analyzes `program.body`.
    pub fn compute(program: &Program) -> Self {
        Self::compute_block(program, &program.body)
    }

    /// Analyzes `block`, resolving expressions through `program`.
    pub fn compute_block(program: &Program, block: &[Statement]) -> Self {
        let mut liveness = Self::default();
        for (index, stmt) in block.iter().enumerate() {
            let buffers = referenced_buffers(program, stmt);
            for &buffer in &buffers {
                match liveness.ranges.get_mut(&buffer) {
                    Some(range) => range.include(index),
                    None => {
                        liveness.ranges.insert(buffer, LiveRange::at(index));
                        liveness.appearance.push(buffer);
                    }
                }
            }
            liveness.touched.push(buffers);
        }
        liveness
    }

    pub fn range(&self, buffer: Handle<Buffer>) -> Option<LiveRange> {
        self.ranges.get(&buffer).copied()
    }

    pub fn is_referenced(&self, buffer: Handle<Buffer>) -> bool {
        self.ranges.contains_key(&buffer)
    }

    /// Referenced buffers in order of first reference.
    pub fn buffers(&self) -> &[Handle<Buffer>] {
        &self.appearance
    }

    /// Position of `buffer` in first-reference order.
    pub fn first_appearance(&self, buffer: Handle<Buffer>) -> Option<usize> {
        self.appearance.iter().position(|&b| b == buffer)
    }

    /// Buffers referenced by the top-level statement at `index`.
    pub fn touched(&self, index: usize) -> &[Handle<Buffer>] {
        self.touched.get(index).map_or(&[], Vec::as_slice)
    }

    pub fn statement_count(&self) -> usize {
        self.touched.len()
    }
}
