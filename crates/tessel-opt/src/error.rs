//! Errors raised by the lowering passes.

use tessel_ir::IrError;

/// Errors produced while validating or memory-planning a program.
///
/// Everything except [`PlanError::Ir`] and [`PlanError::ScopedMarker`]
/// signals a broken planner invariant rather than bad input.
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    /// The program itself is malformed.
    #[error(transparent)]
    Ir(#[from] IrError),

    /// A live range was requested for a buffer that no load or store touches.
    #[error("buffer '{buffer}' is never referenced in the block")]
    UnreferencedBuffer { buffer: String },

    /// A memory marker for a planned buffer sits below the top-level block.
    #[error("buffer '{buffer}' has a memory marker nested below the top-level block")]
    ScopedMarker { buffer: String },

    /// Two occupants of one slot are live at the same time.
    #[error(
        "slot owned by '{owner}' holds '{first}' {first_range} and '{second}' {second_range}, which overlap"
    )]
    OverlappingOccupants {
        owner: String,
        first: String,
        first_range: String,
        second: String,
        second_range: String,
    },

    /// An occupant needs more bytes than its slot provides.
    #[error("buffer '{buffer}' needs {needed} bytes but slot owned by '{owner}' has {available}")]
    SlotTooSmall {
        buffer: String,
        owner: String,
        needed: u64,
        available: u64,
    },

    /// A caller-owned buffer ended up in the plan.
    #[error("external buffer '{buffer}' was assigned planner-managed storage")]
    ExternalBufferPlanned { buffer: String },
}
