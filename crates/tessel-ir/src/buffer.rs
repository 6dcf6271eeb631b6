//! Buffers and loop variables.

use crate::types::{Dimension, Scalar};

/// A named, multi-dimensional storage region addressed by loads and stores.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct Buffer {
    pub name: String,
    /// Element type of every value stored in the buffer.
    pub dtype: Scalar,
    /// Extents, outermost first.
    pub dims: Vec<Dimension>,
}

impl Buffer {
    /// Creates a buffer whose extents are all statically known.
    pub fn fixed(name: impl Into<String>, dtype: Scalar, dims: &[u64]) -> Self {
        Self {
            name: name.into(),
            dtype,
            dims: dims.iter().copied().map(Dimension::Fixed).collect(),
        }
    }

    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    /// Returns `true` if every extent is statically known.
    pub fn is_static(&self) -> bool {
        self.dims.iter().all(|d| d.fixed().is_some())
    }

    /// Number of elements, or `None` if any extent is symbolic or the
    /// product overflows.
    pub fn element_count(&self) -> Option<u64> {
        self.dims
            .iter()
            .try_fold(1u64, |acc, d| acc.checked_mul(d.fixed()?))
    }

    /// Bytes required to hold the whole buffer: element width times
    /// element count.
    pub fn byte_footprint(&self) -> Option<u64> {
        self.element_count()?.checked_mul(u64::from(self.dtype.width))
    }
}

/// A scalar loop induction variable.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct Variable {
    pub name: String,
    pub dtype: Scalar,
}

impl Variable {
    pub fn new(name: impl Into<String>, dtype: Scalar) -> Self {
        Self {
            name: name.into(),
            dtype,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn footprint_of_static_buffer() {
        let c = Buffer::fixed("C", Scalar::F32, &[32, 32]);
        assert_eq!(c.element_count(), Some(1024));
        assert_eq!(c.byte_footprint(), Some(4096));
        assert!(c.is_static());
    }

    #[test]
    fn footprint_depends_on_width() {
        let e = Buffer::fixed("E", Scalar::QUINT8, &[32, 32]);
        assert_eq!(e.byte_footprint(), Some(1024));
        let s = Buffer::fixed("S", Scalar::I16, &[32, 32]);
        assert_eq!(s.byte_footprint(), Some(2048));
    }

    #[test]
    fn symbolic_buffer_has_no_footprint() {
        let buf = Buffer {
            name: "dyn".into(),
            dtype: Scalar::F32,
            dims: vec![Dimension::Fixed(4), Dimension::Symbolic("n".into())],
        };
        assert!(!buf.is_static());
        assert_eq!(buf.element_count(), None);
        assert_eq!(buf.byte_footprint(), None);
    }

    #[test]
    fn scalar_buffer_holds_one_element() {
        let buf = Buffer::fixed("acc", Scalar::F64, &[]);
        assert_eq!(buf.rank(), 0);
        assert_eq!(buf.byte_footprint(), Some(8));
    }

    #[test]
    fn overflowing_footprint_is_unknown() {
        let buf = Buffer::fixed("huge", Scalar::F64, &[u64::MAX, 2]);
        assert_eq!(buf.byte_footprint(), None);
    }
}
