//! Slot compatibility.

use crate::options::PlannerOptions;
use crate::reuse::{BufferInfo, Slot};

/// Decides whether `candidate` may be placed in `slot`'s storage.
///
/// Only byte footprints matter: shapes and element types may differ, and
/// the candidate's element type reinterprets the slot's bytes. Whether the
/// slot is free at the candidate's start is checked by the caller.
pub fn can_reuse(slot: &Slot, candidate: &BufferInfo, options: &PlannerOptions) -> bool {
    if !slot.reusable {
        return false;
    }
    let (Some(available), Some(needed)) = (slot.footprint, candidate.footprint) else {
        return false;
    };
    if needed > available {
        return false;
    }
    options.allow_reinterpret || slot.dtype == candidate.dtype
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::liveness::LiveRange;
    use tessel_ir::{Arena, Buffer, Scalar};

    fn info(buffers: &mut Arena<Buffer>, dtype: Scalar, dims: &[u64]) -> BufferInfo {
        let buf = Buffer::fixed("t", dtype, dims);
        let footprint = buf.byte_footprint();
        BufferInfo {
            buffer: buffers.append(buf),
            dtype,
            footprint,
            range: LiveRange::at(0),
            first_seen: 0,
        }
    }

    #[test]
    fn narrower_type_fits() {
        let mut buffers = Arena::new();
        let c = info(&mut buffers, Scalar::F32, &[32, 32]);
        let e = info(&mut buffers, Scalar::QUINT8, &[32, 32]);
        let slot = Slot::new(&c);
        assert!(can_reuse(&slot, &e, &PlannerOptions::default()));
    }

    #[test]
    fn wider_type_does_not_fit() {
        let mut buffers = Arena::new();
        let c = info(&mut buffers, Scalar::I16, &[32, 32]);
        let e = info(&mut buffers, Scalar::F32, &[32, 32]);
        let slot = Slot::new(&c);
        assert!(!can_reuse(&slot, &e, &PlannerOptions::default()));
    }

    #[test]
    fn shape_is_irrelevant_when_bytes_fit() {
        let mut buffers = Arena::new();
        let owner = info(&mut buffers, Scalar::F32, &[16, 16]);
        let flat = info(&mut buffers, Scalar::F32, &[256]);
        let bigger = info(&mut buffers, Scalar::F32, &[257]);
        let slot = Slot::new(&owner);
        assert!(can_reuse(&slot, &flat, &PlannerOptions::default()));
        assert!(!can_reuse(&slot, &bigger, &PlannerOptions::default()));
    }

    #[test]
    fn reinterpretation_can_be_disabled() {
        let mut buffers = Arena::new();
        let c = info(&mut buffers, Scalar::F32, &[8]);
        let e = info(&mut buffers, Scalar::U8, &[8]);
        let d = info(&mut buffers, Scalar::F32, &[4]);
        let slot = Slot::new(&c);
        let strict = PlannerOptions {
            allow_reinterpret: false,
            ..PlannerOptions::default()
        };
        assert!(!can_reuse(&slot, &e, &strict));
        assert!(can_reuse(&slot, &d, &strict));
    }

    #[test]
    fn unknown_footprints_never_match() {
        let mut buffers = Arena::new();
        let owner = info(&mut buffers, Scalar::F32, &[8]);
        let mut dynamic = info(&mut buffers, Scalar::F32, &[8]);
        dynamic.footprint = None;

        let slot = Slot::new(&owner);
        assert!(!can_reuse(&slot, &dynamic, &PlannerOptions::default()));

        let dynamic_slot = Slot::new(&dynamic);
        assert!(!dynamic_slot.reusable);
        assert!(!can_reuse(&dynamic_slot, &owner, &PlannerOptions::default()));
    }
}
