//! The three native-gate wrappers Keccak needs. Deliberately not shared with
//! `ckt-arith` — this crate has no reason to depend on the arithmetic crate
//! just for three one-line gate calls.

use ckt_circuit::{Circuit, CktResult, GateType, Wire};

pub(crate) fn and(c: &mut Circuit, a: Wire, b: Wire) -> CktResult<Wire> {
    let out = c.alloc_wire();
    c.add_gate(a, b, out, GateType::And)?;
    Ok(out)
}

pub(crate) fn xor(c: &mut Circuit, a: Wire, b: Wire) -> CktResult<Wire> {
    let out = c.alloc_wire();
    c.add_gate(a, b, out, GateType::Xor)?;
    Ok(out)
}

pub(crate) fn not(c: &mut Circuit, a: Wire) -> CktResult<Wire> {
    xor(c, a, Wire::TRUE)
}
