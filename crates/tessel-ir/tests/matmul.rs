//! Integration test: build a matmul + bias loop nest programmatically and
//! verify the text dump output.

use tessel_ir::*;

/// ```text
/// for (i = 0; i < 4; i++) {
///   for (j = 0; j < 8; j++) {
///     acc[i, j] = 0f;
///     for (k = 0; k < 16; k++) {
///       acc[i, j] = (acc[i, j] + (a[i, k] * b[k, j]));
///     }
///   }
/// }
/// for (i = 0; i < 4; i++) {
///   for (j = 0; j < 8; j++) {
///     out[i, j] = max((acc[i, j] + bias[j]), 0f);
///   }
/// }
/// ```
fn build_matmul_bias() -> Program {
    let mut p = Program::new();
    let a = p.add_argument("a", Scalar::F32, &[4, 16]);
    let b = p.add_argument("b", Scalar::F32, &[16, 8]);
    let bias = p.add_argument("bias", Scalar::F32, &[8]);
    let acc = p.add_buffer("acc", Scalar::F32, &[4, 8]);
    let out = p.add_buffer("out", Scalar::F32, &[4, 8]);

    let i = p.add_variable("i", Scalar::I32);
    let j = p.add_variable("j", Scalar::I32);
    let k = p.add_variable("k", Scalar::I32);
    let (iv, jv, kv) = (p.var(i), p.var(j), p.var(k));
    let zero = p.literal(Literal::F32(0.0));

    // ---- matmul ----
    let acc_ij = p.load(acc, &[iv, jv]);
    let a_ik = p.load(a, &[iv, kv]);
    let b_kj = p.load(b, &[kv, jv]);
    let prod = p.binary(BinaryOp::Multiply, a_ik, b_kj);
    let sum = p.binary(BinaryOp::Add, acc_ij, prod);
    let update = Statement::Store {
        buffer: acc,
        indices: vec![iv, jv],
        value: sum,
    };
    let init = Statement::Store {
        buffer: acc,
        indices: vec![iv, jv],
        value: zero,
    };
    let reduce = p.for_range(k, 16, vec![update]);
    let cols = p.for_range(j, 8, vec![init, reduce]);
    let matmul = p.for_range(i, 4, vec![cols]);

    // ---- bias + relu ----
    let bias_j = p.load(bias, &[jv]);
    let biased = p.binary(BinaryOp::Add, acc_ij, bias_j);
    let relu = p.binary(BinaryOp::Max, biased, zero);
    let store_out = Statement::Store {
        buffer: out,
        indices: vec![iv, jv],
        value: relu,
    };
    let cols = p.for_range(j, 8, vec![store_out]);
    let epilogue = p.for_range(i, 4, vec![cols]);

    p.body = vec![matmul, epilogue];
    p
}

#[test]
fn dump_matmul_bias() {
    let p = build_matmul_bias();
    let dump = dump_program(&p);

    assert!(dump.starts_with("Buffers:\n"));
    assert!(dump.contains("  %0 a: f32[4, 16] (argument)\n"));
    assert!(dump.contains("  %3 acc: f32[4, 8]\n"));
    assert!(dump.contains("Body:\n"));
    assert!(dump.contains("  for (i = 0; i < 4; i++) {\n"));
    assert!(dump.contains("    for (j = 0; j < 8; j++) {\n"));
    assert!(dump.contains("      acc[i, j] = 0f;\n"));
    assert!(dump.contains("        acc[i, j] = (acc[i, j] + (a[i, k] * b[k, j]));\n"));
    assert!(dump.contains("      out[i, j] = max((acc[i, j] + bias[j]), 0f);\n"));
}

#[test]
fn footprints_and_arguments() {
    let p = build_matmul_bias();
    let acc = p.buffer_by_name("acc").unwrap();
    let bias = p.buffer_by_name("bias").unwrap();
    assert_eq!(p.buffers[acc].byte_footprint(), Some(4 * 8 * 4));
    assert_eq!(p.buffers[bias].element_count(), Some(8));
    assert!(p.is_argument(bias));
    assert!(!p.is_argument(acc));
    assert_eq!(p.arguments.len(), 3);
}

#[test]
fn program_clone_is_independent() {
    let p = build_matmul_bias();
    let mut copy = p.clone();
    let acc = copy.buffer_by_name("acc").unwrap();
    copy.body.insert(0, Statement::Allocate(acc));
    assert_ne!(copy, p);
    assert_eq!(p.body.len(), 2);
    assert!(dump_program(&copy).contains("  Allocate(acc); // dtype=f32, dims=[4, 8]\n"));
}
