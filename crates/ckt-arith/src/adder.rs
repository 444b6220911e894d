//! Binary adders over little-endian wire buses (bus\[0\] is the LSB).

use ckt_circuit::{Circuit, CktResult, Wire};
use ckt_dedup::Dedup;

use crate::gates::{and, and_dedup, not_dedup, or, or_dedup, xor, xor_dedup};

/// Ripple-carry adder: one full adder per bit, 5 gates per bit, depth O(n).
///
/// Kept alongside [`kogge_stone_add`] deliberately: the two are structurally
/// independent implementations of the same function, so running a program
/// through both and comparing gate-level outputs (or running the equivalence
/// checker over the two circuits) catches bugs that only one encoding would
/// share.
pub fn ripple_carry_add(
    c: &mut Circuit,
    a: &[Wire],
    b: &[Wire],
    carry_in: Wire,
) -> CktResult<(Vec<Wire>, Wire)> {
    assert_eq!(a.len(), b.len(), "ripple_carry_add: operand width mismatch");
    let mut sum = Vec::with_capacity(a.len());
    let mut carry = carry_in;
    for (&ai, &bi) in a.iter().zip(b.iter()) {
        let half_sum = xor(c, ai, bi)?;
        let s = xor(c, half_sum, carry)?;
        let half_carry = and(c, ai, bi)?;
        let carry_prop = and(c, half_sum, carry)?;
        carry = xor(c, half_carry, carry_prop)?;
        sum.push(s);
    }
    Ok((sum, carry))
}

/// Kogge-Stone parallel-prefix adder: O(log n) gate depth.
///
/// Computes bitwise generate/propagate signals, then combines them in
/// `ceil(log2(n))` doubling steps so that bit `i`'s carry-in is available
/// after `O(log n)` levels instead of `O(n)`. The incoming `carry_in` is
/// folded into bit 0's generate signal (`g0' = g0 OR (p0 AND carry_in)`)
/// before the prefix network runs, which lets the same network serve as
/// both a plain adder (`carry_in = 0`) and, with inverted `b` and
/// `carry_in = 1`, a subtractor.
pub fn kogge_stone_add(
    c: &mut Circuit,
    a: &[Wire],
    b: &[Wire],
    carry_in: Wire,
) -> CktResult<(Vec<Wire>, Wire)> {
    assert_eq!(a.len(), b.len(), "kogge_stone_add: operand width mismatch");
    let n = a.len();
    assert!(n > 0, "kogge_stone_add: zero-width operand");

    let mut orig_p = Vec::with_capacity(n);
    let mut g = Vec::with_capacity(n);
    for (&ai, &bi) in a.iter().zip(b.iter()) {
        g.push(and(c, ai, bi)?);
        orig_p.push(xor(c, ai, bi)?);
    }
    let mut p = orig_p.clone();

    let p0_and_cin = and(c, orig_p[0], carry_in)?;
    g[0] = or(c, g[0], p0_and_cin)?;

    let mut step = 1usize;
    while step < n {
        let g_prev = g.clone();
        let p_prev = p.clone();
        for i in step..n {
            let and_pg = and(c, p_prev[i], g_prev[i - step])?;
            g[i] = or(c, g_prev[i], and_pg)?;
            p[i] = and(c, p_prev[i], p_prev[i - step])?;
        }
        step *= 2;
    }

    let mut sum = Vec::with_capacity(n);
    sum.push(xor(c, orig_p[0], carry_in)?);
    for i in 1..n {
        sum.push(xor(c, orig_p[i], g[i - 1])?);
    }
    let carry_out = g[n - 1];
    Ok((sum, carry_out))
}

/// `a - b` via `a + !b + 1`. Returns the difference and a borrow-out flag
/// (true when `a < b` unsigned, mirroring the adder's inverted carry-out).
pub fn subtract(c: &mut Circuit, a: &[Wire], b: &[Wire]) -> CktResult<(Vec<Wire>, Wire)> {
    let not_b: Vec<Wire> = b
        .iter()
        .map(|&w| crate::gates::not(c, w))
        .collect::<CktResult<Vec<_>>>()?;
    let (diff, carry_out) = kogge_stone_add(c, a, &not_b, Wire::TRUE)?;
    let borrow_out = crate::gates::not(c, carry_out)?;
    Ok((diff, borrow_out))
}

/// Dedup-routed counterpart of [`kogge_stone_add`]. With `dedup = &mut None`
/// this produces the identical gate sequence as [`kogge_stone_add`].
pub fn kogge_stone_add_dedup(
    c: &mut Circuit,
    dedup: &mut Option<Dedup>,
    a: &[Wire],
    b: &[Wire],
    carry_in: Wire,
) -> CktResult<(Vec<Wire>, Wire)> {
    assert_eq!(a.len(), b.len(), "kogge_stone_add_dedup: operand width mismatch");
    let n = a.len();
    assert!(n > 0, "kogge_stone_add_dedup: zero-width operand");

    let mut orig_p = Vec::with_capacity(n);
    let mut g = Vec::with_capacity(n);
    for (&ai, &bi) in a.iter().zip(b.iter()) {
        g.push(and_dedup(c, dedup, ai, bi)?);
        orig_p.push(xor_dedup(c, dedup, ai, bi)?);
    }
    let mut p = orig_p.clone();

    let p0_and_cin = and_dedup(c, dedup, orig_p[0], carry_in)?;
    g[0] = or_dedup(c, dedup, g[0], p0_and_cin)?;

    let mut step = 1usize;
    while step < n {
        let g_prev = g.clone();
        let p_prev = p.clone();
        for i in step..n {
            let and_pg = and_dedup(c, dedup, p_prev[i], g_prev[i - step])?;
            g[i] = or_dedup(c, dedup, g_prev[i], and_pg)?;
            p[i] = and_dedup(c, dedup, p_prev[i], p_prev[i - step])?;
        }
        step *= 2;
    }

    let mut sum = Vec::with_capacity(n);
    sum.push(xor_dedup(c, dedup, orig_p[0], carry_in)?);
    for i in 1..n {
        sum.push(xor_dedup(c, dedup, orig_p[i], g[i - 1])?);
    }
    let carry_out = g[n - 1];
    Ok((sum, carry_out))
}

/// Dedup-routed counterpart of [`subtract`].
pub fn subtract_dedup(
    c: &mut Circuit,
    dedup: &mut Option<Dedup>,
    a: &[Wire],
    b: &[Wire],
) -> CktResult<(Vec<Wire>, Wire)> {
    let not_b: Vec<Wire> = b
        .iter()
        .map(|&w| not_dedup(c, dedup, w))
        .collect::<CktResult<Vec<_>>>()?;
    let (diff, carry_out) = kogge_stone_add_dedup(c, dedup, a, &not_b, Wire::TRUE)?;
    let borrow_out = not_dedup(c, dedup, carry_out)?;
    Ok((diff, borrow_out))
}
