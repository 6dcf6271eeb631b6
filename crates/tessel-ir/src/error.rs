//! Error types for the tessel IR.

/// Errors that can occur when constructing or validating IR.
#[derive(Debug, thiserror::Error)]
pub enum IrError {
    /// A handle index is out of bounds for its arena.
    #[error("{kind} handle index {index} out of bounds (arena size: {size})")]
    BadHandle {
        kind: &'static str,
        index: usize,
        size: usize,
    },

    /// A store or load addresses a buffer with the wrong number of indices.
    #[error("buffer '{buffer}' has rank {rank} but is indexed with {indices} indices")]
    RankMismatch {
        buffer: String,
        rank: usize,
        indices: usize,
    },
}
