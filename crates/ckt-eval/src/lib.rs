//! Host-side ground truth for a sealed circuit.
//!
//! Evaluates every gate in the order it was appended (guaranteed topological
//! by [`ckt_circuit::Circuit::add_gate`]'s append-only invariant) against a
//! concrete input assignment. Used as the reference implementation that
//! differential tests and the equivalence checker's counterexample replay
//! check against.

use bitvec::prelude::*;
use ckt_circuit::{GateType, SealedCircuit, Wire};
use thiserror::Error;

mod emulator;

pub use emulator::{EmuError, EmuResult, EmulatorState};

/// Errors raised while evaluating a circuit against a concrete input.
#[derive(Debug, Error)]
pub enum EvalError {
    #[error("expected {expected} input bits, got {got}")]
    InputLengthMismatch { expected: usize, got: usize },
}

pub type EvalResult<T> = Result<T, EvalError>;

/// Evaluates `circuit` against `inputs` (which must include the two leading
/// constant bits: `inputs[0] = false`, `inputs[1] = true`, matching the wire
/// layout every other crate assumes) and returns the output bits in output
/// order.
pub fn evaluate(circuit: &SealedCircuit, inputs: &BitSlice) -> EvalResult<BitVec> {
    if inputs.len() != circuit.num_input_bits as usize {
        return Err(EvalError::InputLengthMismatch {
            expected: circuit.num_input_bits as usize,
            got: inputs.len(),
        });
    }

    let mut wire_values: BitVec = BitVec::with_capacity(circuit.num_wires as usize);
    wire_values.extend_from_bitslice(inputs);
    wire_values.resize(circuit.num_wires as usize, false);

    for gate in &circuit.gates {
        let left = wire_values[u32::from(gate.left) as usize];
        let right = wire_values[u32::from(gate.right) as usize];
        let out = gate.ty.eval(left, right);
        wire_values.set(u32::from(gate.output) as usize, out);
    }

    let outputs: BitVec = circuit
        .outputs
        .iter()
        .map(|&w| wire_values[u32::from(w) as usize])
        .collect();

    log::trace!(
        "ckt-eval: evaluated {} gates, {} outputs",
        circuit.gates.len(),
        outputs.len()
    );

    Ok(outputs)
}

/// Convenience entry point taking plain `bool`s instead of a `BitSlice`,
/// for callers that build inputs from a `Vec<bool>`.
pub fn evaluate_bools(circuit: &SealedCircuit, inputs: &[bool]) -> EvalResult<Vec<bool>> {
    let bits: BitVec = inputs.iter().copied().collect();
    evaluate(circuit, &bits).map(|out| out.into_iter().collect())
}

/// Packs an unsigned integer into `width` little-endian bits (bit 0 = LSB),
/// for building test input vectors.
pub fn bits_of_u64(value: u64, width: usize) -> Vec<bool> {
    (0..width).map(|i| (value >> i) & 1 == 1).collect()
}

/// Inverse of [`bits_of_u64`]: packs little-endian bits back into a `u64`.
/// Panics if `bits` is longer than 64.
pub fn u64_of_bits(bits: &[bool]) -> u64 {
    assert!(bits.len() <= 64, "u64_of_bits: {} bits won't fit", bits.len());
    bits.iter()
        .enumerate()
        .fold(0u64, |acc, (i, &b)| acc | ((b as u64) << i))
}

/// Builds a full input vector for a circuit whose layout is `[FALSE, TRUE,
/// ...operand bits]`, given the operand bit-vectors in order.
pub fn pack_inputs(operands: &[&[bool]]) -> Vec<bool> {
    let mut v = vec![false, true];
    for op in operands {
        v.extend_from_slice(op);
    }
    v
}
