//! Display implementations and text dump for debugging.

use std::fmt;

use crate::Program;
use crate::arena::Handle;
use crate::expr::{BinaryOp, Expression, Literal, UnaryOp};
use crate::stmt::Statement;
use crate::types::{Dimension, Scalar, ScalarKind};

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => write!(f, "bool"),
            Self::Sint => write!(f, "sint"),
            Self::Uint => write!(f, "uint"),
            Self::Float => write!(f, "float"),
            Self::BFloat => write!(f, "bfloat"),
            Self::QUint => write!(f, "quint"),
            Self::QSint => write!(f, "qint"),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bits = u32::from(self.width) * 8;
        match self.kind {
            ScalarKind::Bool => write!(f, "bool"),
            ScalarKind::Sint => write!(f, "i{bits}"),
            ScalarKind::Uint => write!(f, "u{bits}"),
            ScalarKind::Float => write!(f, "f{bits}"),
            ScalarKind::BFloat => write!(f, "bf{bits}"),
            ScalarKind::QUint => write!(f, "qu{bits}"),
            ScalarKind::QSint => write!(f, "qi{bits}"),
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(n) => write!(f, "{n}"),
            Self::Symbolic(name) => write!(f, "{name}"),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::I32(v) => write!(f, "{v}"),
            Self::I64(v) => write!(f, "{v}l"),
            Self::F32(v) => write!(f, "{v}f"),
            Self::F64(v) => write!(f, "{v}lf"),
        }
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Negate => write!(f, "-"),
            Self::LogicalNot => write!(f, "!"),
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
            Self::Modulo => "%",
            Self::Min => "min",
            Self::Max => "max",
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::Less => "<",
            Self::LessEqual => "<=",
            Self::Greater => ">",
            Self::GreaterEqual => ">=",
            Self::LogicalAnd => "&&",
            Self::LogicalOr => "||",
        };
        f.write_str(s)
    }
}

/// Formats a shape as `[d0, d1, ...]`.
pub fn format_dims(dims: &[Dimension]) -> String {
    let dims: Vec<_> = dims.iter().map(|d| d.to_string()).collect();
    format!("[{}]", dims.join(", "))
}

fn buffer_name(program: &Program, handle: Handle<crate::Buffer>) -> String {
    match program.buffers.try_get(handle) {
        Some(buf) => buf.name.clone(),
        None => format!("<invalid buffer {handle:?}>"),
    }
}

fn format_indices(program: &Program, indices: &[Handle<Expression>]) -> String {
    let parts: Vec<_> = indices.iter().map(|&i| format_expr(program, i)).collect();
    parts.join(", ")
}

/// Formats an expression tree inline, e.g. `(C[i, j] + A[i, k])`.
pub fn format_expr(program: &Program, handle: Handle<Expression>) -> String {
    let Some(expr) = program.expressions.try_get(handle) else {
        return format!("<invalid expr {handle:?}>");
    };
    match expr {
        Expression::Literal(lit) => format!("{lit}"),
        Expression::Variable(var) => match program.variables.try_get(*var) {
            Some(v) => v.name.clone(),
            None => format!("<invalid var {var:?}>"),
        },
        Expression::Load { buffer, indices } => {
            format!(
                "{}[{}]",
                buffer_name(program, *buffer),
                format_indices(program, indices)
            )
        }
        Expression::Unary { op, expr } => format!("{op}{}", format_expr(program, *expr)),
        Expression::Binary {
            op: op @ (BinaryOp::Min | BinaryOp::Max),
            left,
            right,
        } => format!(
            "{op}({}, {})",
            format_expr(program, *left),
            format_expr(program, *right)
        ),
        Expression::Binary { op, left, right } => format!(
            "({} {op} {})",
            format_expr(program, *left),
            format_expr(program, *right)
        ),
        Expression::Select {
            condition,
            accept,
            reject,
        } => format!(
            "({} ? {} : {})",
            format_expr(program, *condition),
            format_expr(program, *accept),
            format_expr(program, *reject)
        ),
        Expression::Cast { expr, to } => format!("{to}({})", format_expr(program, *expr)),
    }
}

fn write_block(out: &mut String, program: &Program, block: &[Statement], indent: usize) {
    for stmt in block {
        write_stmt(out, program, stmt, indent);
    }
}

fn write_stmt(out: &mut String, program: &Program, stmt: &Statement, indent: usize) {
    let pad = " ".repeat(indent);
    match stmt {
        Statement::Store {
            buffer,
            indices,
            value,
        } => {
            out.push_str(&format!(
                "{pad}{}[{}] = {};\n",
                buffer_name(program, *buffer),
                format_indices(program, indices),
                format_expr(program, *value)
            ));
        }
        Statement::For {
            var,
            start,
            end,
            body,
        } => {
            let name = match program.variables.try_get(*var) {
                Some(v) => v.name.clone(),
                None => format!("<invalid var {var:?}>"),
            };
            out.push_str(&format!(
                "{pad}for ({name} = {}; {name} < {}; {name}++) {{\n",
                format_expr(program, *start),
                format_expr(program, *end)
            ));
            write_block(out, program, body, indent + 2);
            out.push_str(&format!("{pad}}}\n"));
        }
        Statement::If {
            condition,
            accept,
            reject,
        } => {
            out.push_str(&format!(
                "{pad}if ({}) {{\n",
                format_expr(program, *condition)
            ));
            write_block(out, program, accept, indent + 2);
            if !reject.is_empty() {
                out.push_str(&format!("{pad}}} else {{\n"));
                write_block(out, program, reject, indent + 2);
            }
            out.push_str(&format!("{pad}}}\n"));
        }
        Statement::Block(block) => {
            out.push_str(&format!("{pad}{{\n"));
            write_block(out, program, block, indent + 2);
            out.push_str(&format!("{pad}}}\n"));
        }
        Statement::Allocate(buffer) => match program.buffers.try_get(*buffer) {
            Some(buf) => out.push_str(&format!(
                "{pad}Allocate({}); // dtype={}, dims={}\n",
                buf.name,
                buf.dtype,
                format_dims(&buf.dims)
            )),
            None => out.push_str(&format!(
                "{pad}Allocate({});\n",
                buffer_name(program, *buffer)
            )),
        },
        Statement::Alias { buffer, target } => {
            out.push_str(&format!(
                "{pad}Alias({},{});\n",
                buffer_name(program, *buffer),
                buffer_name(program, *target)
            ));
        }
        Statement::Free(buffer) => {
            out.push_str(&format!("{pad}Free({});\n", buffer_name(program, *buffer)));
        }
    }
}

/// Produces a human-readable text dump of a [`Program`] for debugging.
pub fn dump_program(program: &Program) -> String {
    let mut out = String::new();

    if !program.buffers.is_empty() {
        out.push_str("Buffers:\n");
        for (handle, buf) in program.buffers.iter() {
            let arg = if program.is_argument(handle) {
                " (argument)"
            } else {
                ""
            };
            out.push_str(&format!(
                "  {handle:?} {}: {}{}{arg}\n",
                buf.name,
                buf.dtype,
                format_dims(&buf.dims)
            ));
        }
    }

    out.push_str("Body:\n");
    write_block(&mut out, program, &program.body, 2);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_scalar() {
        assert_eq!(format!("{}", Scalar::F32), "f32");
        assert_eq!(format!("{}", Scalar::I16), "i16");
        assert_eq!(format!("{}", Scalar::QUINT8), "qu8");
        assert_eq!(format!("{}", Scalar::BF16), "bf16");
        assert_eq!(format!("{}", Scalar::BOOL), "bool");
    }

    #[test]
    fn display_dims() {
        let dims = vec![Dimension::Fixed(32), Dimension::Symbolic("n".into())];
        assert_eq!(format_dims(&dims), "[32, n]");
        assert_eq!(format_dims(&[]), "[]");
    }

    #[test]
    fn dump_markers() {
        let mut program = Program::new();
        let c = program.add_buffer("C", Scalar::F32, &[32, 32]);
        let e = program.add_buffer("E", Scalar::QUINT8, &[32, 32]);
        program.body = vec![
            Statement::Allocate(c),
            Statement::Alias {
                buffer: e,
                target: c,
            },
            Statement::Free(c),
        ];
        let dump = dump_program(&program);
        assert!(dump.contains("  Allocate(C); // dtype=f32, dims=[32, 32]\n"));
        assert!(dump.contains("  Alias(E,C);\n"));
        assert!(dump.contains("  Free(C);\n"));
    }

    #[test]
    fn dump_loop_nest() {
        let mut program = Program::new();
        let a = program.add_argument("a", Scalar::F32, &[32]);
        let b = program.add_buffer("b", Scalar::F32, &[32]);
        let i = program.add_variable("i", Scalar::I32);
        let iv = program.var(i);
        let load = program.load(a, &[iv]);
        let two = program.literal(Literal::F32(2.0));
        let mul = program.binary(BinaryOp::Multiply, load, two);
        let store = Statement::Store {
            buffer: b,
            indices: vec![iv],
            value: mul,
        };
        let stmt = program.for_range(i, 32, vec![store]);
        program.body.push(stmt);

        let dump = dump_program(&program);
        assert!(dump.contains("%0 a: f32[32] (argument)"));
        assert!(dump.contains("  for (i = 0; i < 32; i++) {\n"));
        assert!(dump.contains("    b[i] = (a[i] * 2f);\n"));
    }

    #[test]
    fn format_min_and_cast() {
        let mut program = Program::new();
        let x = program.literal(Literal::I32(3));
        let y = program.literal(Literal::I32(4));
        let min = program.binary(BinaryOp::Min, x, y);
        let cast = program.cast(min, Scalar::QUINT8);
        assert_eq!(format_expr(&program, cast), "qu8(min(3, 4))");
    }
}
