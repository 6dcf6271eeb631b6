//! Append-only arenas addressed by typed handles.
//!
//! Buffers, loop variables, expressions and planner slots are all stored in
//! an [`Arena`] and referred to by a [`Handle`], so statement trees can be
//! cloned and rewritten freely without sharing ownership of the nodes they
//! point at.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::ops::{Index, IndexMut};

use crate::error::IrError;

/// A typed index into an [`Arena`].
///
/// Two handles compare equal when they point at the same slot of the same
/// kind of arena. Ordering follows insertion order.
pub struct Handle<T> {
    index: u32,
    _phantom: PhantomData<T>,
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl<T> Eq for Handle<T> {}

impl<T> PartialOrd for Handle<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Handle<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.index.cmp(&other.index)
    }
}

impl<T> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
    }
}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "%{}", self.index)
    }
}

impl<T> Handle<T> {
    fn new(index: u32) -> Self {
        Self {
            index,
            _phantom: PhantomData,
        }
    }

    /// Returns the zero-based position of this handle in its arena.
    pub fn index(self) -> usize {
        self.index as usize
    }
}

/// Append-only storage; values are never removed once appended.
#[derive(Clone, Debug, PartialEq)]
pub struct Arena<T> {
    data: Vec<T>,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Arena<T> {
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Appends a value and returns its handle.
    ///
    /// # Panics
    ///
    /// Panics if the arena already holds `u32::MAX` values.
    pub fn append(&mut self, value: T) -> Handle<T> {
        let index = u32::try_from(self.data.len()).unwrap_or_else(|_| {
            panic!("arena overflow: {} items exceeds u32::MAX", self.data.len())
        });
        self.data.push(value);
        Handle::new(index)
    }

    pub fn try_get(&self, handle: Handle<T>) -> Option<&T> {
        self.data.get(handle.index())
    }

    /// Checks that `handle` points inside this arena.
    ///
    /// `kind` names the arena in the returned error (e.g. `"buffer"`).
    pub fn check(&self, handle: Handle<T>, kind: &'static str) -> Result<(), IrError> {
        if handle.index() < self.data.len() {
            Ok(())
        } else {
            Err(IrError::BadHandle {
                kind,
                index: handle.index(),
                size: self.data.len(),
            })
        }
    }

    /// Iterates over all handles in insertion order.
    pub fn handles(&self) -> impl Iterator<Item = Handle<T>> + use<T> {
        // arena size is bounded by u32::MAX (enforced in append)
        (0..self.data.len() as u32).map(Handle::new)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Handle<T>, &T)> {
        self.data
            .iter()
            .enumerate()
            .map(|(i, v)| (Handle::new(i as u32), v))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Handle<T>, &mut T)> {
        self.data
            .iter_mut()
            .enumerate()
            .map(|(i, v)| (Handle::new(i as u32), v))
    }
}

impl<T> Index<Handle<T>> for Arena<T> {
    type Output = T;

    fn index(&self, handle: Handle<T>) -> &T {
        &self.data[handle.index()]
    }
}

impl<T> IndexMut<Handle<T>> for Arena<T> {
    fn index_mut(&mut self, handle: Handle<T>) -> &mut T {
        &mut self.data[handle.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_and_index() {
        let mut arena = Arena::new();
        let a = arena.append("gemm");
        let b = arena.append("relu");
        assert_eq!(arena[a], "gemm");
        assert_eq!(arena[b], "relu");
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn handles_follow_insertion_order() {
        let mut arena = Arena::new();
        arena.append(10);
        arena.append(20);
        arena.append(30);
        let indices: Vec<_> = arena.handles().map(Handle::index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        let items: Vec<_> = arena.iter().map(|(h, &v)| (h.index(), v)).collect();
        assert_eq!(items, vec![(0, 10), (1, 20), (2, 30)]);
    }

    #[test]
    fn handle_ordering_and_debug() {
        let mut arena = Arena::new();
        let h0 = arena.append(());
        let h1 = arena.append(());
        assert!(h0 < h1);
        assert_eq!(format!("{h1:?}"), "%1");
    }

    #[test]
    fn check_rejects_foreign_handle() {
        let mut big = Arena::new();
        big.append(1);
        let stray = big.append(2);
        let mut small = Arena::new();
        small.append(3);
        assert!(small.check(stray, "buffer").is_err());
        assert_eq!(small.try_get(stray), None);
        let err = small.check(stray, "buffer").unwrap_err();
        assert_eq!(
            err.to_string(),
            "buffer handle index 1 out of bounds (arena size: 1)"
        );
    }
}
