#![no_main]

use libfuzzer_sys::fuzz_target;
use tessel_ir::{Buffer, Dimension, Handle, Literal, Program, Scalar, Statement};
use tessel_opt::{MarkerPlacement, PlannerOptions, SlotPolicy, plan_memory};

const DTYPES: [Scalar; 5] = [Scalar::U8, Scalar::I16, Scalar::F32, Scalar::F64, Scalar::BF16];

/// Decodes a program from fuzz input: a header byte for the buffer count
/// and options, one byte per buffer, then three bytes per statement.
fn build(data: &[u8]) -> Option<(Program, PlannerOptions, Vec<Handle<Buffer>>)> {
    let (&header, rest) = data.split_first()?;
    let count = usize::from(header & 0x07) + 1;
    if rest.len() < count {
        return None;
    }
    let (decls, stmts) = rest.split_at(count);

    let options = PlannerOptions {
        reuse_enabled: header & 0x08 == 0,
        slot_policy: match (header >> 4) & 0x03 {
            0 => SlotPolicy::FirstCreated,
            1 => SlotPolicy::MostRecentlyRetired,
            _ => SlotPolicy::BestFit,
        },
        placement: if header & 0x40 == 0 {
            MarkerPlacement::LiveRange
        } else {
            MarkerPlacement::Hoisted
        },
        allow_reinterpret: header & 0x80 == 0,
    };

    let mut program = Program::new();
    let mut outputs = Vec::new();
    let buffers: Vec<_> = decls
        .iter()
        .enumerate()
        .map(|(n, &byte)| {
            let dtype = DTYPES[usize::from(byte & 0x07) % DTYPES.len()];
            let len = u64::from((byte >> 3) & 0x0f);
            let handle = program.add_buffer(&format!("t{n}"), dtype, &[len]);
            match byte >> 7 {
                0 => {}
                _ if n % 2 == 0 => outputs.push(handle),
                _ => program.buffers[handle].dims = vec![Dimension::Symbolic("n".into())],
            }
            handle
        })
        .collect();

    let i = program.add_variable("i", Scalar::I32);
    let zero = program.literal(Literal::I32(0));
    for chunk in stmts.chunks_exact(3) {
        let dst = buffers[usize::from(chunk[0]) % count];
        let src = buffers[usize::from(chunk[1]) % count];
        let value = program.load(src, &[zero]);
        let store = Statement::Store {
            buffer: dst,
            indices: vec![zero],
            value,
        };
        let stmt = match chunk[2] % 4 {
            0 => store,
            1 => program.for_range(i, 2, vec![store]),
            2 => Statement::Block(vec![store]),
            _ => Statement::Allocate(dst),
        };
        program.body.push(stmt);
    }
    Some((program, options, outputs))
}

fuzz_target!(|data: &[u8]| {
    let Some((program, options, outputs)) = build(data) else {
        return;
    };
    // Top-level markers are regenerated, so planning must always succeed and
    // the result must already be a fixed point.
    let planned = plan_memory(&program, &outputs, &options).expect("planning failed");
    let externals = program.arguments.iter().chain(&outputs).copied().collect();
    planned.plan.verify(&planned.program, &externals).expect("unsafe plan");
    let again = plan_memory(&planned.program, &outputs, &options).expect("replanning failed");
    assert_eq!(again.program, planned.program);
});
