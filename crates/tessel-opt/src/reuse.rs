//! Greedy first-fit slot assignment.
//!
//! Buffers are visited in order of live-range start. Each one moves into a
//! retired slot (one whose current occupant ended before the buffer starts)
//! that passes [`can_reuse`], or opens a new slot it owns. Slots persist for
//! the whole planning run, so one slot can host a chain of occupants.

use std::collections::{HashMap, HashSet};
use std::fmt;

use tessel_ir::{Arena, Buffer, Handle, Program, Scalar};

use crate::compat::can_reuse;
use crate::error::PlanError;
use crate::liveness::LiveRange;
use crate::options::{PlannerOptions, SlotPolicy};

/// A temporary buffer as seen by the planner.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BufferInfo {
    pub buffer: Handle<Buffer>,
    pub dtype: Scalar,
    /// `None` for buffers with symbolic extents.
    pub footprint: Option<u64>,
    pub range: LiveRange,
    /// Position in first-reference order; the final tie-break.
    pub first_seen: usize,
}

/// One buffer's tenancy in a slot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Occupant {
    pub buffer: Handle<Buffer>,
    pub dtype: Scalar,
    pub footprint: Option<u64>,
    pub range: LiveRange,
}

impl From<&BufferInfo> for Occupant {
    fn from(info: &BufferInfo) -> Self {
        Self {
            buffer: info.buffer,
            dtype: info.dtype,
            footprint: info.footprint,
            range: info.range,
        }
    }
}

/// A storage region owned by the first buffer placed in it.
#[derive(Clone, Debug)]
pub struct Slot {
    pub owner: Handle<Buffer>,
    /// Element type the owner allocates with.
    pub dtype: Scalar,
    /// The owner's footprint; fixed for the slot's lifetime.
    pub footprint: Option<u64>,
    /// End of the current occupant's live range.
    pub occupied_until: usize,
    /// Occupants in assignment order; the first is the owner.
    pub occupants: Vec<Occupant>,
    /// `false` for slots whose size is unknown at compile time.
    pub reusable: bool,
}

impl Slot {
    /// Opens a slot owned by `owner`.
    pub fn new(owner: &BufferInfo) -> Self {
        Self {
            owner: owner.buffer,
            dtype: owner.dtype,
            footprint: owner.footprint,
            occupied_until: owner.range.end,
            occupants: vec![Occupant::from(owner)],
            reusable: owner.footprint.is_some(),
        }
    }

    /// Returns `true` if the current occupant is dead before `index`.
    pub fn is_retired_before(&self, index: usize) -> bool {
        self.occupied_until < index
    }

    /// Last statement index at which any occupant is live.
    pub fn last_use(&self) -> usize {
        self.occupants
            .iter()
            .map(|o| o.range.end)
            .max()
            .unwrap_or(self.occupied_until)
    }

    fn push(&mut self, info: &BufferInfo) {
        debug_assert!(
            self.occupants.iter().all(|o| !o.range.overlaps(&info.range)),
            "occupant {:?} overlaps an earlier tenant of slot {:?}",
            info.buffer,
            self.owner
        );
        self.occupied_until = info.range.end;
        self.occupants.push(Occupant::from(info));
    }
}

/// The planner's result: slots and the slot each buffer occupies.
#[derive(Clone, Debug, Default)]
pub struct MemoryPlan {
    slots: Arena<Slot>,
    assignment: HashMap<Handle<Buffer>, Handle<Slot>>,
    /// Buffers in the order they were assigned.
    order: Vec<Handle<Buffer>>,
}

impl MemoryPlan {
    /// Slots in creation order.
    pub fn slots(&self) -> &Arena<Slot> {
        &self.slots
    }

    pub fn slot(&self, handle: Handle<Slot>) -> &Slot {
        &self.slots[handle]
    }

    pub fn slot_of(&self, buffer: Handle<Buffer>) -> Option<Handle<Slot>> {
        self.assignment.get(&buffer).copied()
    }

    /// Owner of the slot `buffer` occupies.
    pub fn owner_of(&self, buffer: Handle<Buffer>) -> Option<Handle<Buffer>> {
        self.slot_of(buffer).map(|s| self.slots[s].owner)
    }

    /// Returns `true` if `buffer` shares storage owned by another buffer.
    pub fn is_alias(&self, buffer: Handle<Buffer>) -> bool {
        self.owner_of(buffer).is_some_and(|owner| owner != buffer)
    }

    /// Planned buffers in assignment order.
    pub fn order(&self) -> &[Handle<Buffer>] {
        &self.order
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Bytes reserved with reuse (sum of known slot footprints).
    pub fn planned_bytes(&self) -> u64 {
        self.slots.iter().filter_map(|(_, s)| s.footprint).sum()
    }

    /// Bytes that independent allocation would reserve.
    pub fn unplanned_bytes(&self) -> u64 {
        self.slots
            .iter()
            .flat_map(|(_, s)| s.occupants.iter())
            .filter_map(|o| o.footprint)
            .sum()
    }

    /// Checks the safety invariants of the plan.
    ///
    /// Every pair of occupants in a slot must be disjoint, every occupant
    /// must fit in its slot, and no buffer in `externals` may be planned.
    pub fn verify(
        &self,
        program: &Program,
        externals: &HashSet<Handle<Buffer>>,
    ) -> Result<(), PlanError> {
        for (_, slot) in self.slots.iter() {
            for (i, first) in slot.occupants.iter().enumerate() {
                if externals.contains(&first.buffer) {
                    return Err(PlanError::ExternalBufferPlanned {
                        buffer: buffer_name(program, first.buffer),
                    });
                }
                if first.buffer != slot.owner {
                    let fits = matches!(
                        (first.footprint, slot.footprint),
                        (Some(needed), Some(available)) if needed <= available
                    );
                    if !fits {
                        return Err(PlanError::SlotTooSmall {
                            buffer: buffer_name(program, first.buffer),
                            owner: buffer_name(program, slot.owner),
                            needed: first.footprint.unwrap_or(u64::MAX),
                            available: slot.footprint.unwrap_or(0),
                        });
                    }
                }
                for second in &slot.occupants[i + 1..] {
                    if first.range.overlaps(&second.range) {
                        return Err(PlanError::OverlappingOccupants {
                            owner: buffer_name(program, slot.owner),
                            first: buffer_name(program, first.buffer),
                            first_range: first.range.to_string(),
                            second: buffer_name(program, second.buffer),
                            second_range: second.range.to_string(),
                        });
                    }
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for MemoryPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let planned = self.planned_bytes();
        let unplanned = self.unplanned_bytes();
        writeln!(f, "Memory Plan:")?;
        writeln!(f, "  Slots: {}", self.slots.len())?;
        writeln!(f, "  Buffers: {}", self.order.len())?;
        writeln!(f, "  Bytes without reuse: {unplanned}")?;
        writeln!(f, "  Bytes with reuse: {planned}")?;
        let savings = unplanned.saturating_sub(planned);
        if unplanned > 0 {
            let pct = savings as f64 / unplanned as f64 * 100.0;
            writeln!(f, "  Reuse savings: {savings} bytes ({pct:.1}%)")?;
        }
        for (handle, slot) in self.slots.iter() {
            let size = slot
                .footprint
                .map_or_else(|| "dynamic".to_string(), |b| format!("{b} bytes"));
            let tenants: Vec<_> = slot
                .occupants
                .iter()
                .map(|o| format!("{:?} {}", o.buffer, o.range))
                .collect();
            writeln!(f, "  slot {handle:?} ({size}): {}", tenants.join(", "))?;
        }
        Ok(())
    }
}

pub(crate) fn buffer_name(program: &Program, buffer: Handle<Buffer>) -> String {
    program
        .buffers
        .try_get(buffer)
        .map_or_else(|| format!("{buffer:?}"), |b| b.name.clone())
}

fn choose_slot(
    slots: &Arena<Slot>,
    info: &BufferInfo,
    options: &PlannerOptions,
) -> Option<Handle<Slot>> {
    let mut eligible = slots
        .iter()
        .filter(|(_, slot)| slot.is_retired_before(info.range.start))
        .filter(|(_, slot)| can_reuse(slot, info, options));
    let chosen = match options.slot_policy {
        SlotPolicy::FirstCreated => eligible.next(),
        SlotPolicy::MostRecentlyRetired => {
            eligible.max_by_key(|(handle, slot)| (slot.occupied_until, *handle))
        }
        SlotPolicy::BestFit => eligible.min_by_key(|(handle, slot)| (slot.footprint, *handle)),
    };
    chosen.map(|(handle, _)| handle)
}

/// Assigns every buffer in `buffers` to a slot.
///
/// Order: live-range start, then footprint (unknown last), then first
/// appearance in the program.
pub fn plan_reuse(mut buffers: Vec<BufferInfo>, options: &PlannerOptions) -> MemoryPlan {
    buffers.sort_by(|a, b| {
        a.range
            .start
            .cmp(&b.range.start)
            .then_with(|| footprint_key(a).cmp(&footprint_key(b)))
            .then(a.first_seen.cmp(&b.first_seen))
    });

    let mut plan = MemoryPlan::default();
    for info in &buffers {
        let reused = if options.reuse_enabled {
            choose_slot(&plan.slots, info, options)
        } else {
            None
        };
        let slot = match reused {
            Some(slot) => {
                log::trace!(
                    "buffer {:?} {} reuses slot {:?} owned by {:?}",
                    info.buffer,
                    info.range,
                    slot,
                    plan.slots[slot].owner
                );
                plan.slots[slot].push(info);
                slot
            }
            None => {
                let slot = plan.slots.append(Slot::new(info));
                log::trace!("buffer {:?} {} opens slot {:?}", info.buffer, info.range, slot);
                slot
            }
        };
        plan.assignment.insert(info.buffer, slot);
        plan.order.push(info.buffer);
    }
    plan
}

fn footprint_key(info: &BufferInfo) -> (bool, u64) {
    (info.footprint.is_none(), info.footprint.unwrap_or(0))
}
