//! Equality and ordering over little-endian wire buses.

use ckt_circuit::{Circuit, CktResult, Wire};
use ckt_dedup::Dedup;

use crate::adder::{subtract, subtract_dedup};
use crate::gates::{and_reduce, and_reduce_dedup, mux, mux_dedup, not, not_dedup, xor, xor_dedup};

/// Bitwise equality: AND-reduction of `NOT(a_i XOR b_i)` across all bits.
pub fn eq(c: &mut Circuit, a: &[Wire], b: &[Wire]) -> CktResult<Wire> {
    assert_eq!(a.len(), b.len(), "eq: operand width mismatch");
    let mut matches = Vec::with_capacity(a.len());
    for (&ai, &bi) in a.iter().zip(b.iter()) {
        let diff = xor(c, ai, bi)?;
        matches.push(not(c, diff)?);
    }
    and_reduce(c, &matches)
}

/// Unsigned `a < b`, as the borrow-out of `a - b`.
pub fn lt_unsigned(c: &mut Circuit, a: &[Wire], b: &[Wire]) -> CktResult<Wire> {
    let (_, borrow) = subtract(c, a, b)?;
    Ok(borrow)
}

/// Signed `a < b` (two's complement, MSB is the sign bit). When the operands'
/// signs differ, the sign of `a` alone decides the answer: a negative `a`
/// next to a non-negative `b` is always smaller regardless of magnitude.
/// Otherwise both operands share a sign and unsigned comparison of their
/// bit patterns already gives the right answer.
pub fn lt_signed(c: &mut Circuit, a: &[Wire], b: &[Wire]) -> CktResult<Wire> {
    assert_eq!(a.len(), b.len(), "lt_signed: operand width mismatch");
    let n = a.len();
    let sign_a = a[n - 1];
    let sign_b = b[n - 1];
    let signs_differ = xor(c, sign_a, sign_b)?;
    let unsigned_result = lt_unsigned(c, a, b)?;
    mux(c, signs_differ, unsigned_result, sign_a)
}

/// Unsigned `a >= b`, as `NOT(a < b)`.
pub fn ge_unsigned(c: &mut Circuit, a: &[Wire], b: &[Wire]) -> CktResult<Wire> {
    let lt = lt_unsigned(c, a, b)?;
    not(c, lt)
}

/// Signed `a >= b`, as `NOT(a < b)`.
pub fn ge_signed(c: &mut Circuit, a: &[Wire], b: &[Wire]) -> CktResult<Wire> {
    let lt = lt_signed(c, a, b)?;
    not(c, lt)
}

/// Dedup-routed counterpart of [`eq`].
pub fn eq_dedup(c: &mut Circuit, dedup: &mut Option<Dedup>, a: &[Wire], b: &[Wire]) -> CktResult<Wire> {
    assert_eq!(a.len(), b.len(), "eq_dedup: operand width mismatch");
    let mut matches = Vec::with_capacity(a.len());
    for (&ai, &bi) in a.iter().zip(b.iter()) {
        let diff = xor_dedup(c, dedup, ai, bi)?;
        matches.push(not_dedup(c, dedup, diff)?);
    }
    and_reduce_dedup(c, dedup, &matches)
}

/// Dedup-routed counterpart of [`lt_unsigned`].
pub fn lt_unsigned_dedup(c: &mut Circuit, dedup: &mut Option<Dedup>, a: &[Wire], b: &[Wire]) -> CktResult<Wire> {
    let (_, borrow) = subtract_dedup(c, dedup, a, b)?;
    Ok(borrow)
}

/// Dedup-routed counterpart of [`lt_signed`].
pub fn lt_signed_dedup(c: &mut Circuit, dedup: &mut Option<Dedup>, a: &[Wire], b: &[Wire]) -> CktResult<Wire> {
    assert_eq!(a.len(), b.len(), "lt_signed_dedup: operand width mismatch");
    let n = a.len();
    let sign_a = a[n - 1];
    let sign_b = b[n - 1];
    let signs_differ = xor_dedup(c, dedup, sign_a, sign_b)?;
    let unsigned_result = lt_unsigned_dedup(c, dedup, a, b)?;
    mux_dedup(c, dedup, signs_differ, unsigned_result, sign_a)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ckt_circuit::Limits;
    use ckt_eval::{bits_of_u64, evaluate_bools, pack_inputs};

    fn wires(width: usize, offset: u32) -> Vec<Wire> {
        (0..width).map(|i| Wire::from(offset + i as u32)).collect()
    }

    #[test]
    fn eq_matches_equality() {
        let width = 8;
        let mut c = Circuit::create(Limits::default(), 2 + 2 * width as u64).unwrap();
        let a = wires(width, 2);
        let b = wires(width, 2 + width as u32);
        let out = eq(&mut c, &a, &b).unwrap();
        let sealed = c.seal(vec![out]).unwrap();

        for (av, bv, expect) in [(5u64, 5u64, true), (5, 6, false), (0, 0, true), (255, 0, false)] {
            let inputs = pack_inputs(&[&bits_of_u64(av, width), &bits_of_u64(bv, width)]);
            assert_eq!(evaluate_bools(&sealed, &inputs).unwrap(), vec![expect]);
        }
    }

    #[test]
    fn lt_unsigned_matches_u8_order() {
        let width = 8;
        let mut c = Circuit::create(Limits::default(), 2 + 2 * width as u64).unwrap();
        let a = wires(width, 2);
        let b = wires(width, 2 + width as u32);
        let out = lt_unsigned(&mut c, &a, &b).unwrap();
        let sealed = c.seal(vec![out]).unwrap();

        for (av, bv) in [(3u64, 9u64), (9, 3), (5, 5), (0, 255), (255, 0)] {
            let inputs = pack_inputs(&[&bits_of_u64(av, width), &bits_of_u64(bv, width)]);
            assert_eq!(evaluate_bools(&sealed, &inputs).unwrap(), vec![av < bv]);
        }
    }

    #[test]
    fn lt_signed_matches_i8_order() {
        let width = 8;
        let mut c = Circuit::create(Limits::default(), 2 + 2 * width as u64).unwrap();
        let a = wires(width, 2);
        let b = wires(width, 2 + width as u32);
        let out = lt_signed(&mut c, &a, &b).unwrap();
        let sealed = c.seal(vec![out]).unwrap();

        let cases: &[(i8, i8)] = &[(-1, 1), (1, -1), (-5, -3), (-3, -5), (0, 0), (127, -128), (-128, 127)];
        for &(av, bv) in cases {
            let inputs = pack_inputs(&[
                &bits_of_u64(av as u8 as u64, width),
                &bits_of_u64(bv as u8 as u64, width),
            ]);
            assert_eq!(evaluate_bools(&sealed, &inputs).unwrap(), vec![av < bv]);
        }
    }

    #[test]
    fn eq_dedup_and_lt_dedup_match_with_no_cache() {
        let width = 8;
        let mut c = Circuit::create(Limits::default(), 2 + 2 * width as u64).unwrap();
        let a = wires(width, 2);
        let b = wires(width, 2 + width as u32);
        let eq_out = eq_dedup(&mut c, &mut None, &a, &b).unwrap();
        let lt_u_out = lt_unsigned_dedup(&mut c, &mut None, &a, &b).unwrap();
        let lt_s_out = lt_signed_dedup(&mut c, &mut None, &a, &b).unwrap();
        let sealed = c.seal(vec![eq_out, lt_u_out, lt_s_out]).unwrap();

        let cases: &[(i8, i8)] = &[(-1, 1), (1, -1), (-5, -3), (0, 0), (127, -128), (-128, 127)];
        for &(av, bv) in cases {
            let inputs = pack_inputs(&[
                &bits_of_u64(av as u8 as u64, width),
                &bits_of_u64(bv as u8 as u64, width),
            ]);
            let out = evaluate_bools(&sealed, &inputs).unwrap();
            assert_eq!(out[0], av == bv, "eq av={av} bv={bv}");
            assert_eq!(out[1], (av as u8) < (bv as u8), "lt_unsigned av={av} bv={bv}");
            assert_eq!(out[2], av < bv, "lt_signed av={av} bv={bv}");
        }
    }
}
