//! The program container handed between lowering passes.

use crate::arena::{Arena, Handle};
use crate::buffer::{Buffer, Variable};
use crate::expr::{BinaryOp, Expression, Literal};
use crate::stmt::{Block, Statement};
use crate::types::Scalar;

/// A lowered loop-nest program.
///
/// `body` is the top-level block; the position of a statement in `body` is
/// the index used by live-range analysis.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Program {
    /// Every buffer the program mentions.
    pub buffers: Arena<Buffer>,
    /// Loop induction variables.
    pub variables: Arena<Variable>,
    /// Shared expression arena.
    pub expressions: Arena<Expression>,
    /// Buffers bound by the caller (kernel inputs). Their storage is owned
    /// outside the program.
    pub arguments: Vec<Handle<Buffer>>,
    pub body: Block,
}

impl Program {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a buffer with fully static extents.
    pub fn add_buffer(&mut self, name: &str, dtype: Scalar, dims: &[u64]) -> Handle<Buffer> {
        self.buffers.append(Buffer::fixed(name, dtype, dims))
    }

    /// Declares a buffer bound by the caller.
    pub fn add_argument(&mut self, name: &str, dtype: Scalar, dims: &[u64]) -> Handle<Buffer> {
        let handle = self.add_buffer(name, dtype, dims);
        self.arguments.push(handle);
        handle
    }

    pub fn add_variable(&mut self, name: &str, dtype: Scalar) -> Handle<Variable> {
        self.variables.append(Variable::new(name, dtype))
    }

    pub fn literal(&mut self, literal: Literal) -> Handle<Expression> {
        self.expressions.append(Expression::Literal(literal))
    }

    pub fn var(&mut self, var: Handle<Variable>) -> Handle<Expression> {
        self.expressions.append(Expression::Variable(var))
    }

    pub fn load(&mut self, buffer: Handle<Buffer>, indices: &[Handle<Expression>]) -> Handle<Expression> {
        self.expressions.append(Expression::Load {
            buffer,
            indices: indices.to_vec(),
        })
    }

    pub fn binary(
        &mut self,
        op: BinaryOp,
        left: Handle<Expression>,
        right: Handle<Expression>,
    ) -> Handle<Expression> {
        self.expressions.append(Expression::Binary { op, left, right })
    }

    pub fn cast(&mut self, expr: Handle<Expression>, to: Scalar) -> Handle<Expression> {
        self.expressions.append(Expression::Cast { expr, to })
    }

    /// Builds `for (var = 0; var < extent; var++) body`.
    pub fn for_range(&mut self, var: Handle<Variable>, extent: i32, body: Block) -> Statement {
        let start = self.literal(Literal::I32(0));
        let end = self.literal(Literal::I32(extent));
        Statement::For {
            var,
            start,
            end,
            body,
        }
    }

    /// Returns `true` if `buffer` is bound by the caller.
    pub fn is_argument(&self, buffer: Handle<Buffer>) -> bool {
        self.arguments.contains(&buffer)
    }

    /// Finds a buffer by name.
    pub fn buffer_by_name(&self, name: &str) -> Option<Handle<Buffer>> {
        self.buffers
            .iter()
            .find(|(_, b)| b.name == name)
            .map(|(h, _)| h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arguments_are_tracked() {
        let mut program = Program::new();
        let a = program.add_argument("A", Scalar::F32, &[4]);
        let t = program.add_buffer("T", Scalar::F32, &[4]);
        assert!(program.is_argument(a));
        assert!(!program.is_argument(t));
        assert_eq!(program.buffer_by_name("T"), Some(t));
        assert_eq!(program.buffer_by_name("missing"), None);
    }

    #[test]
    fn for_range_builds_loop_bounds() {
        let mut program = Program::new();
        let i = program.add_variable("i", Scalar::I32);
        let stmt = program.for_range(i, 32, vec![]);
        let Statement::For { start, end, .. } = stmt else {
            panic!("expected For");
        };
        assert_eq!(
            program.expressions[start],
            Expression::Literal(Literal::I32(0))
        );
        assert_eq!(
            program.expressions[end],
            Expression::Literal(Literal::I32(32))
        );
    }
}
