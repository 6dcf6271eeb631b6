//! Configuration for the memory planner.

/// Which eligible slot a buffer takes when several retired slots fit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SlotPolicy {
    /// The earliest-created eligible slot.
    #[default]
    FirstCreated,
    /// The slot whose last occupant ended most recently; later-created
    /// slots win ties.
    MostRecentlyRetired,
    /// The smallest slot that still fits; earlier-created slots win ties.
    BestFit,
}

/// Where the rewriter places memory markers in the top-level block.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MarkerPlacement {
    /// `Allocate`/`Alias` right before an occupant's first statement,
    /// `Free` right after the slot's last statement.
    #[default]
    LiveRange,
    /// All `Allocate`/`Alias` markers at the head of the block and all
    /// `Free` markers at its tail.
    Hoisted,
}

/// Memory planner settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlannerOptions {
    /// When `false` every temporary gets its own slot.
    pub reuse_enabled: bool,
    pub slot_policy: SlotPolicy,
    pub placement: MarkerPlacement,
    /// Allow a slot to be reinterpreted under a different element type.
    pub allow_reinterpret: bool,
}

impl Default for PlannerOptions {
    fn default() -> Self {
        Self {
            reuse_enabled: true,
            slot_policy: SlotPolicy::default(),
            placement: MarkerPlacement::default(),
            allow_reinterpret: true,
        }
    }
}

impl PlannerOptions {
    /// Options that allocate every temporary independently.
    pub fn no_reuse() -> Self {
        Self {
            reuse_enabled: false,
            ..Self::default()
        }
    }
}
