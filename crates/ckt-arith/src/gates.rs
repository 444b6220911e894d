//! The handful of synthesized booleans every arithmetic primitive is built
//! from: AND and XOR are native gates, everything else — OR, NOT, MUX — is
//! rewritten in terms of them before it ever reaches [`Circuit::add_gate`].

use ckt_circuit::{Circuit, CktResult, GateType, Wire};
use ckt_dedup::Dedup;

fn emit(c: &mut Circuit, dedup: &mut Option<Dedup>, ty: GateType, a: Wire, b: Wire) -> CktResult<Wire> {
    match dedup {
        Some(d) => d.emit(c, ty, a, b),
        None => {
            let out = c.alloc_wire();
            c.add_gate(a, b, out, ty)?;
            Ok(out)
        }
    }
}

/// Appends an AND gate and returns its output wire.
pub fn and(c: &mut Circuit, a: Wire, b: Wire) -> CktResult<Wire> {
    emit(c, &mut None, GateType::And, a, b)
}

/// Appends an XOR gate and returns its output wire.
pub fn xor(c: &mut Circuit, a: Wire, b: Wire) -> CktResult<Wire> {
    emit(c, &mut None, GateType::Xor, a, b)
}

/// Dedup-routed counterpart of [`and`]: when `dedup` holds a cache, reuses a
/// prior identical gate (or a peephole fold) instead of always appending a
/// new one. With `dedup = &mut None` this is identical to [`and`].
pub fn and_dedup(c: &mut Circuit, dedup: &mut Option<Dedup>, a: Wire, b: Wire) -> CktResult<Wire> {
    emit(c, dedup, GateType::And, a, b)
}

/// Dedup-routed counterpart of [`xor`]. See [`and_dedup`].
pub fn xor_dedup(c: &mut Circuit, dedup: &mut Option<Dedup>, a: Wire, b: Wire) -> CktResult<Wire> {
    emit(c, dedup, GateType::Xor, a, b)
}

/// `NOT a`, as `a XOR 1`. Zero extra wires beyond the one gate.
pub fn not(c: &mut Circuit, a: Wire) -> CktResult<Wire> {
    xor(c, a, Wire::TRUE)
}

/// `a OR b`, synthesized as `(a XOR b) XOR (a AND b)` — 2 gates.
pub fn or(c: &mut Circuit, a: Wire, b: Wire) -> CktResult<Wire> {
    let x = xor(c, a, b)?;
    let y = and(c, a, b)?;
    xor(c, x, y)
}

/// Two-to-one multiplexer: `sel = 0` selects `a`, `sel = 1` selects `b`.
/// Synthesized as `a XOR (sel AND (a XOR b))` — 2 gates.
pub fn mux(c: &mut Circuit, sel: Wire, a: Wire, b: Wire) -> CktResult<Wire> {
    let diff = xor(c, a, b)?;
    let masked = and(c, sel, diff)?;
    xor(c, a, masked)
}

/// Bitwise `mux` over two equal-length wire buses.
pub fn mux_bus(c: &mut Circuit, sel: Wire, a: &[Wire], b: &[Wire]) -> CktResult<Vec<Wire>> {
    assert_eq!(a.len(), b.len(), "mux_bus: operand width mismatch");
    a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| mux(c, sel, x, y))
        .collect()
}

/// AND-reduction (all bits true) of a wire bus, used by equality and by
/// Booth-encoder zero detection.
pub fn and_reduce(c: &mut Circuit, bits: &[Wire]) -> CktResult<Wire> {
    let mut acc = Wire::TRUE;
    for &b in bits {
        acc = and(c, acc, b)?;
    }
    Ok(acc)
}

/// Dedup-routed counterpart of [`not`].
pub fn not_dedup(c: &mut Circuit, dedup: &mut Option<Dedup>, a: Wire) -> CktResult<Wire> {
    xor_dedup(c, dedup, a, Wire::TRUE)
}

/// Dedup-routed counterpart of [`or`].
pub fn or_dedup(c: &mut Circuit, dedup: &mut Option<Dedup>, a: Wire, b: Wire) -> CktResult<Wire> {
    let x = xor_dedup(c, dedup, a, b)?;
    let y = and_dedup(c, dedup, a, b)?;
    xor_dedup(c, dedup, x, y)
}

/// Dedup-routed counterpart of [`mux`].
pub fn mux_dedup(c: &mut Circuit, dedup: &mut Option<Dedup>, sel: Wire, a: Wire, b: Wire) -> CktResult<Wire> {
    let diff = xor_dedup(c, dedup, a, b)?;
    let masked = and_dedup(c, dedup, sel, diff)?;
    xor_dedup(c, dedup, a, masked)
}

/// Dedup-routed counterpart of [`mux_bus`].
pub fn mux_bus_dedup(
    c: &mut Circuit,
    dedup: &mut Option<Dedup>,
    sel: Wire,
    a: &[Wire],
    b: &[Wire],
) -> CktResult<Vec<Wire>> {
    assert_eq!(a.len(), b.len(), "mux_bus_dedup: operand width mismatch");
    a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| mux_dedup(c, dedup, sel, x, y))
        .collect()
}

/// Dedup-routed counterpart of [`and_reduce`].
pub fn and_reduce_dedup(c: &mut Circuit, dedup: &mut Option<Dedup>, bits: &[Wire]) -> CktResult<Wire> {
    let mut acc = Wire::TRUE;
    for &b in bits {
        acc = and_dedup(c, dedup, acc, b)?;
    }
    Ok(acc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ckt_circuit::Limits;
    use ckt_eval::{evaluate_bools, pack_inputs};

    #[test]
    fn mux_selects_correctly() {
        let mut c = Circuit::create(Limits::default(), 5).unwrap();
        let sel = Wire::from(2);
        let a = Wire::from(3);
        let b = Wire::from(4);
        let out = mux(&mut c, sel, a, b).unwrap();
        let sealed = c.seal(vec![out]).unwrap();

        for (s, av, bv, expect) in
            [(false, true, false, true), (true, true, false, false), (false, false, true, false)]
        {
            let inputs = pack_inputs(&[&[s], &[av], &[bv]]);
            assert_eq!(evaluate_bools(&sealed, &inputs).unwrap(), vec![expect]);
        }
    }

    #[test]
    fn or_matches_boolean_or() {
        let mut c = Circuit::create(Limits::default(), 4).unwrap();
        let out = or(&mut c, Wire::from(2), Wire::from(3)).unwrap();
        let sealed = c.seal(vec![out]).unwrap();
        for (a, b, expect) in [(false, false, false), (true, false, true), (true, true, true)] {
            let inputs = pack_inputs(&[&[a], &[b]]);
            assert_eq!(evaluate_bools(&sealed, &inputs).unwrap(), vec![expect]);
        }
    }
}
