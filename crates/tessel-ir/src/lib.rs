//! Tessel intermediate representation.
//!
//! A loop-nest IR for lowered tensor expressions: buffers with element
//! types and shapes, arena-allocated expressions, and a statement tree of
//! stores, loops, conditionals and memory markers.

pub mod arena;
mod buffer;
mod display;
mod error;
mod expr;
mod program;
mod stmt;
mod types;

pub use arena::{Arena, Handle};
pub use buffer::{Buffer, Variable};
pub use display::{dump_program, format_dims, format_expr};
pub use error::IrError;
pub use expr::{BinaryOp, Expression, Literal, UnaryOp};
pub use program::Program;
pub use stmt::{Block, Statement};
pub use types::{Bytes, Dimension, Scalar, ScalarKind};
