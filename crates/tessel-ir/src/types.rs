//! Element types and dimensions.

/// Width of a scalar type in bytes.
pub type Bytes = u8;

/// The kind of a scalar type.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub enum ScalarKind {
    Bool,
    Sint,
    Uint,
    Float,
    BFloat,
    /// Quantized unsigned integer.
    QUint,
    /// Quantized signed integer.
    QSint,
}

/// A scalar element type: kind + byte width.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct Scalar {
    pub kind: ScalarKind,
    pub width: Bytes,
}

impl Scalar {
    pub const BOOL: Self = Self {
        kind: ScalarKind::Bool,
        width: 1,
    };
    pub const I8: Self = Self {
        kind: ScalarKind::Sint,
        width: 1,
    };
    pub const U8: Self = Self {
        kind: ScalarKind::Uint,
        width: 1,
    };
    pub const QUINT8: Self = Self {
        kind: ScalarKind::QUint,
        width: 1,
    };
    pub const QINT8: Self = Self {
        kind: ScalarKind::QSint,
        width: 1,
    };
    pub const I16: Self = Self {
        kind: ScalarKind::Sint,
        width: 2,
    };
    pub const I32: Self = Self {
        kind: ScalarKind::Sint,
        width: 4,
    };
    pub const I64: Self = Self {
        kind: ScalarKind::Sint,
        width: 8,
    };
    pub const F16: Self = Self {
        kind: ScalarKind::Float,
        width: 2,
    };
    pub const BF16: Self = Self {
        kind: ScalarKind::BFloat,
        width: 2,
    };
    pub const F32: Self = Self {
        kind: ScalarKind::Float,
        width: 4,
    };
    pub const F64: Self = Self {
        kind: ScalarKind::Float,
        width: 8,
    };
}

/// One extent of a buffer shape.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub enum Dimension {
    /// Statically known extent.
    Fixed(u64),
    /// Extent only known at run time, named by a symbol.
    Symbolic(String),
}

impl Dimension {
    /// Returns the extent if it is statically known.
    pub fn fixed(&self) -> Option<u64> {
        match self {
            Self::Fixed(n) => Some(*n),
            Self::Symbolic(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_widths() {
        assert_eq!(Scalar::F32.width, 4);
        assert_eq!(Scalar::I16.width, 2);
        assert_eq!(Scalar::QUINT8.width, 1);
        assert_eq!(Scalar::F64.width, 8);
        assert_eq!(Scalar::BOOL.width, 1);
    }

    #[test]
    fn quantized_kinds_are_distinct() {
        assert_ne!(Scalar::QUINT8, Scalar::U8);
        assert_ne!(Scalar::QINT8, Scalar::I8);
    }

    #[test]
    fn fixed_dimension() {
        assert_eq!(Dimension::Fixed(32).fixed(), Some(32));
        assert_eq!(Dimension::Symbolic("n".into()).fixed(), None);
    }
}
