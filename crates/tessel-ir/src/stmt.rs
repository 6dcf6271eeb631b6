//! Statements: stores, control flow and memory markers.

use crate::arena::Handle;
use crate::buffer::{Buffer, Variable};
use crate::expr::Expression;

/// A sequence of statements executed in order.
pub type Block = Vec<Statement>;

/// A statement in the IR.
#[derive(Clone, Debug, PartialEq)]
pub enum Statement {
    /// Write `value` to one element of `buffer`.
    Store {
        buffer: Handle<Buffer>,
        indices: Vec<Handle<Expression>>,
        value: Handle<Expression>,
    },
    /// `for (var = start; var < end; var++) body`.
    For {
        var: Handle<Variable>,
        start: Handle<Expression>,
        end: Handle<Expression>,
        body: Block,
    },
    /// Conditional branch.
    If {
        condition: Handle<Expression>,
        accept: Block,
        reject: Block,
    },
    /// A nested block.
    Block(Block),
    /// Reserve independent backing storage for a buffer.
    Allocate(Handle<Buffer>),
    /// Back `buffer` with the storage of `target`, reinterpreting the bytes
    /// under `buffer`'s element type.
    Alias {
        buffer: Handle<Buffer>,
        target: Handle<Buffer>,
    },
    /// Release the storage reserved by an earlier `Allocate`.
    Free(Handle<Buffer>),
}

impl Statement {
    /// Returns `true` for `Allocate`, `Alias` and `Free`.
    pub fn is_memory_marker(&self) -> bool {
        matches!(
            self,
            Self::Allocate(_) | Self::Alias { .. } | Self::Free(_)
        )
    }

    /// Buffers named by a memory marker; empty for other statements.
    pub fn marker_buffers(&self) -> Vec<Handle<Buffer>> {
        match self {
            Self::Allocate(b) | Self::Free(b) => vec![*b],
            Self::Alias { buffer, target } => vec![*buffer, *target],
            Self::Store { .. } | Self::For { .. } | Self::If { .. } | Self::Block(_) => vec![],
        }
    }

    /// Child blocks of a control-flow statement.
    pub fn sub_blocks(&self) -> Vec<&Block> {
        match self {
            Self::For { body, .. } => vec![body],
            Self::If { accept, reject, .. } => vec![accept, reject],
            Self::Block(block) => vec![block],
            Self::Store { .. } | Self::Allocate(_) | Self::Alias { .. } | Self::Free(_) => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::Arena;
    use crate::expr::Literal;
    use crate::types::Scalar;

    #[test]
    fn markers_are_recognised() {
        let mut buffers = Arena::new();
        let c = buffers.append(Buffer::fixed("C", Scalar::F32, &[8]));
        let e = buffers.append(Buffer::fixed("E", Scalar::U8, &[8]));
        let alias = Statement::Alias {
            buffer: e,
            target: c,
        };
        assert!(alias.is_memory_marker());
        assert_eq!(alias.marker_buffers(), vec![e, c]);
        assert_eq!(Statement::Free(c).marker_buffers(), vec![c]);
    }

    #[test]
    fn if_has_two_sub_blocks() {
        let mut buffers = Arena::new();
        let a = buffers.append(Buffer::fixed("a", Scalar::F32, &[]));
        let mut exprs = Arena::new();
        let cond = exprs.append(Expression::Literal(Literal::Bool(true)));
        let stmt = Statement::If {
            condition: cond,
            accept: vec![Statement::Store {
                buffer: a,
                indices: vec![],
                value: cond,
            }],
            reject: vec![],
        };
        let blocks = stmt.sub_blocks();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].len(), 1);
        assert!(blocks[1].is_empty());
        assert!(!stmt.is_memory_marker());
        assert!(stmt.marker_buffers().is_empty());
    }
}
