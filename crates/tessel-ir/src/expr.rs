//! Expressions: pure values with no side effects.

use crate::arena::Handle;
use crate::buffer::{Buffer, Variable};
use crate::types::Scalar;

/// A literal constant value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Literal {
    Bool(bool),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
}

impl Literal {
    /// Returns the scalar type of this literal.
    pub fn scalar(&self) -> Scalar {
        match *self {
            Self::Bool(_) => Scalar::BOOL,
            Self::I32(_) => Scalar::I32,
            Self::I64(_) => Scalar::I64,
            Self::F32(_) => Scalar::F32,
            Self::F64(_) => Scalar::F64,
        }
    }
}

/// A unary operator.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum UnaryOp {
    Negate,
    LogicalNot,
}

/// A binary operator.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Min,
    Max,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    LogicalAnd,
    LogicalOr,
}

/// An expression in the IR.
///
/// Expressions live in the program's expression arena and are referenced
/// by [`Handle<Expression>`]; one expression may be shared by several
/// statements.
#[derive(Clone, Debug, PartialEq)]
pub enum Expression {
    Literal(Literal),
    /// The current value of a loop variable.
    Variable(Handle<Variable>),
    /// Read one element of a buffer.
    Load {
        buffer: Handle<Buffer>,
        indices: Vec<Handle<Expression>>,
    },
    Unary {
        op: UnaryOp,
        expr: Handle<Expression>,
    },
    Binary {
        op: BinaryOp,
        left: Handle<Expression>,
        right: Handle<Expression>,
    },
    /// `condition ? accept : reject`.
    Select {
        condition: Handle<Expression>,
        accept: Handle<Expression>,
        reject: Handle<Expression>,
    },
    /// Value conversion to another element type.
    Cast {
        expr: Handle<Expression>,
        to: Scalar,
    },
}

impl Expression {
    /// Returns the expressions this one reads directly.
    pub fn operands(&self) -> Vec<Handle<Expression>> {
        match self {
            Self::Literal(_) | Self::Variable(_) => vec![],
            Self::Load { indices, .. } => indices.clone(),
            Self::Unary { expr, .. } | Self::Cast { expr, .. } => vec![*expr],
            Self::Binary { left, right, .. } => vec![*left, *right],
            Self::Select {
                condition,
                accept,
                reject,
            } => vec![*condition, *accept, *reject],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::Arena;

    #[test]
    fn literal_scalars() {
        assert_eq!(Literal::F32(1.0).scalar(), Scalar::F32);
        assert_eq!(Literal::I32(-1).scalar(), Scalar::I32);
        assert_eq!(Literal::Bool(true).scalar(), Scalar::BOOL);
        assert_eq!(Literal::F64(0.5).scalar(), Scalar::F64);
    }

    #[test]
    fn load_operands_are_indices() {
        let mut buffers = Arena::new();
        let a = buffers.append(Buffer::fixed("a", Scalar::F32, &[4, 4]));
        let mut exprs = Arena::new();
        let i = exprs.append(Expression::Literal(Literal::I32(1)));
        let j = exprs.append(Expression::Literal(Literal::I32(2)));
        let load = Expression::Load {
            buffer: a,
            indices: vec![i, j],
        };
        assert_eq!(load.operands(), vec![i, j]);
    }

    #[test]
    fn select_operands() {
        let mut exprs = Arena::new();
        let c = exprs.append(Expression::Literal(Literal::Bool(true)));
        let x = exprs.append(Expression::Literal(Literal::F32(1.0)));
        let y = exprs.append(Expression::Literal(Literal::F32(2.0)));
        let sel = Expression::Select {
            condition: c,
            accept: x,
            reject: y,
        };
        assert_eq!(sel.operands(), vec![c, x, y]);
        assert!(Expression::Literal(Literal::I64(3)).operands().is_empty());
    }
}
