//! Radix-4 Booth multiplier with a Wallace-style carry-save reduction tree.
//!
//! Operands are `n` bits wide (`n` even); the result is the full `2n`-bit
//! product, split into low and high halves by the caller (`MUL` wants the
//! low half, `MULH`/`MULHU`/`MULHSU` the high half — the three differ only
//! in which operand, if any, is treated as unsigned).
//!
//! Each Booth window folds three adjacent multiplier bits into a digit in
//! `{-2,-1,0,1,2}`, selecting `0`, `±A`, or `±2A` as that window's partial
//! product. Negation is done with the standard trick of XOR-ing the
//! magnitude with the window's sign bit and adding that sign bit back in as
//! a separate single-bit addend at the window's base position — equivalent
//! to two's-complement negation (`~x + 1`) without a dedicated adder per
//! row. An extra all-but-one-window-wide correction window handles unsigned
//! operands: it contributes zero when the operand is genuinely signed and
//! exactly cancels the sign weight Booth would otherwise assign to the
//! operand's top bit when it isn't.

use ckt_circuit::{Circuit, CktResult, Wire};
use ckt_dedup::Dedup;

use crate::gates::{and, and_dedup, mux, mux_dedup, not, not_dedup, or, or_dedup, xor, xor_dedup};
use crate::shift::shift_left_const;

fn full_adder_bit(c: &mut Circuit, x: Wire, y: Wire, z: Wire) -> CktResult<(Wire, Wire)> {
    let xy = xor(c, x, y)?;
    let sum = xor(c, xy, z)?;
    let and_xy = and(c, x, y)?;
    let and_xyz = and(c, xy, z)?;
    let carry = or(c, and_xy, and_xyz)?;
    Ok((sum, carry))
}

fn full_adder_bit_dedup(c: &mut Circuit, dedup: &mut Option<Dedup>, x: Wire, y: Wire, z: Wire) -> CktResult<(Wire, Wire)> {
    let xy = xor_dedup(c, dedup, x, y)?;
    let sum = xor_dedup(c, dedup, xy, z)?;
    let and_xy = and_dedup(c, dedup, x, y)?;
    let and_xyz = and_dedup(c, dedup, xy, z)?;
    let carry = or_dedup(c, dedup, and_xy, and_xyz)?;
    Ok((sum, carry))
}

/// Reduces any number of equal-width wire buses to exactly two (`sum`,
/// `carry`), via repeated 3:2 compression. Each compressor's carry output is
/// shifted left by one bit immediately, so every bus in the working set
/// always has bit `j` at weight `2^j` — the final pair can be added with an
/// ordinary adder with no further shifting.
fn carry_save_reduce(c: &mut Circuit, mut rows: Vec<Vec<Wire>>, width: usize) -> CktResult<(Vec<Wire>, Vec<Wire>)> {
    while rows.len() > 2 {
        let mut next = Vec::with_capacity(rows.len());
        for chunk in rows.chunks(3) {
            if chunk.len() == 3 {
                let mut sum = Vec::with_capacity(width);
                let mut carry = Vec::with_capacity(width);
                for j in 0..width {
                    let (s, cr) = full_adder_bit(c, chunk[0][j], chunk[1][j], chunk[2][j])?;
                    sum.push(s);
                    carry.push(cr);
                }
                next.push(sum);
                next.push(shift_left_const(&carry, 1));
            } else {
                next.extend(chunk.iter().cloned());
            }
        }
        rows = next;
    }
    if rows.len() == 1 {
        rows.push(vec![Wire::FALSE; width]);
    }
    let carry = rows.pop().unwrap();
    let sum = rows.pop().unwrap();
    Ok((sum, carry))
}

fn carry_save_reduce_dedup(
    c: &mut Circuit,
    dedup: &mut Option<Dedup>,
    mut rows: Vec<Vec<Wire>>,
    width: usize,
) -> CktResult<(Vec<Wire>, Vec<Wire>)> {
    while rows.len() > 2 {
        let mut next = Vec::with_capacity(rows.len());
        for chunk in rows.chunks(3) {
            if chunk.len() == 3 {
                let mut sum = Vec::with_capacity(width);
                let mut carry = Vec::with_capacity(width);
                for j in 0..width {
                    let (s, cr) = full_adder_bit_dedup(c, dedup, chunk[0][j], chunk[1][j], chunk[2][j])?;
                    sum.push(s);
                    carry.push(cr);
                }
                next.push(sum);
                next.push(shift_left_const(&carry, 1));
            } else {
                next.extend(chunk.iter().cloned());
            }
        }
        rows = next;
    }
    if rows.len() == 1 {
        rows.push(vec![Wire::FALSE; width]);
    }
    let carry = rows.pop().unwrap();
    let sum = rows.pop().unwrap();
    Ok((sum, carry))
}

/// Fetches multiplier bit `idx` (which may run from `-1` to `n+1` across
/// Booth windows), sign- or zero-extending beyond the operand's real width
/// per `signed`. `idx == -1` is the algorithm's initial `b_{-1} = 0`.
fn booth_bit(b: &[Wire], idx: i64, n: usize, signed: bool) -> Wire {
    if idx < 0 {
        Wire::FALSE
    } else if (idx as usize) < n {
        b[idx as usize]
    } else if signed {
        b[n - 1]
    } else {
        Wire::FALSE
    }
}

/// Full `n x n -> 2n` bit multiply. Returns `(low, high)`, each `n` bits,
/// least-significant bit first.
pub fn multiply(
    c: &mut Circuit,
    a: &[Wire],
    b: &[Wire],
    a_signed: bool,
    b_signed: bool,
) -> CktResult<(Vec<Wire>, Vec<Wire>)> {
    let n = a.len();
    assert_eq!(n, b.len(), "multiply: operand width mismatch");
    assert!(n > 0 && n % 2 == 0, "multiply: width must be even and nonzero");
    let width = 2 * n;

    // b_{n}/b_{n+1} only ever matter through `booth_bit`'s extension rule; one
    // extra window beyond the `n/2` a plain signed Booth encoding needs is
    // enough to neutralize the sign weight on an unsigned operand's MSB.
    let windows = n / 2 + 1;

    let two_a = shift_left_const(a, 1); // 2A's bits 0..n-1; bit n is a[n-1].
    let a_ext = if a_signed { a[n - 1] } else { Wire::FALSE };

    let mut rows = Vec::with_capacity(windows + 1);
    let mut corrections = vec![Wire::FALSE; width];

    for i in 0..windows {
        let base = 2 * i as i64;
        let x0 = booth_bit(b, base - 1, n, b_signed);
        let x1 = booth_bit(b, base, n, b_signed);
        let x2 = booth_bit(b, base + 1, n, b_signed);

        let sel1 = xor(c, x1, x0)?;
        let not_x2 = not(c, x2)?;
        let not_x1 = not(c, x1)?;
        let not_x0 = not(c, x0)?;
        let both_one = and(c, x1, x0)?;
        let both_zero = and(c, not_x1, not_x0)?;
        let pos2 = and(c, not_x2, both_one)?;
        let neg2 = and(c, x2, both_zero)?;
        let sel2 = or(c, pos2, neg2)?;
        let neg = x2;

        let not_sel1 = not(c, sel1)?;
        let not_sel2 = not(c, sel2)?;
        let is_zero = and(c, not_sel1, not_sel2)?;

        // magnitude_core[0..=n]: the selected value (0, A, or 2A) before sign flip.
        let mut magnitude = Vec::with_capacity(n + 1);
        for j in 0..n {
            let two_a_bit = two_a[j];
            let a_bit = a[j];
            let not_zero_choice = mux(c, sel1, Wire::FALSE, a_bit)?;
            let bit = mux(c, sel2, not_zero_choice, two_a_bit)?;
            magnitude.push(bit);
        }
        {
            let two_a_top = a[n - 1]; // bit n of 2A
            let not_zero_choice = mux(c, sel1, Wire::FALSE, a_ext)?;
            let bit = mux(c, sel2, not_zero_choice, two_a_top)?;
            magnitude.push(bit);
        }
        let fill_beyond = mux(c, is_zero, Wire::FALSE, a_ext)?;

        let mut row = vec![Wire::FALSE; width];
        for (k, slot) in row.iter_mut().enumerate() {
            let global = k as i64 - base;
            if global < 0 {
                continue; // below this window's base: no contribution
            }
            let magnitude_bit = if (global as usize) <= n {
                magnitude[global as usize]
            } else {
                fill_beyond
            };
            *slot = xor(c, magnitude_bit, neg)?;
        }
        rows.push(row);

        if base >= 0 && (base as usize) < width {
            corrections[base as usize] = neg;
        }
    }
    rows.push(corrections);

    let (sum, carry) = carry_save_reduce(c, rows, width)?;
    let (product, _overflow) = crate::adder::kogge_stone_add(c, &sum, &carry, Wire::FALSE)?;

    let low = product[..n].to_vec();
    let high = product[n..].to_vec();
    Ok((low, high))
}

/// Dedup-routed counterpart of [`multiply`]. With `dedup = &mut None` this
/// produces the identical gate sequence as [`multiply`].
pub fn multiply_dedup(
    c: &mut Circuit,
    dedup: &mut Option<Dedup>,
    a: &[Wire],
    b: &[Wire],
    a_signed: bool,
    b_signed: bool,
) -> CktResult<(Vec<Wire>, Vec<Wire>)> {
    let n = a.len();
    assert_eq!(n, b.len(), "multiply_dedup: operand width mismatch");
    assert!(n > 0 && n % 2 == 0, "multiply_dedup: width must be even and nonzero");
    let width = 2 * n;

    let windows = n / 2 + 1;

    let two_a = shift_left_const(a, 1);
    let a_ext = if a_signed { a[n - 1] } else { Wire::FALSE };

    let mut rows = Vec::with_capacity(windows + 1);
    let mut corrections = vec![Wire::FALSE; width];

    for i in 0..windows {
        let base = 2 * i as i64;
        let x0 = booth_bit(b, base - 1, n, b_signed);
        let x1 = booth_bit(b, base, n, b_signed);
        let x2 = booth_bit(b, base + 1, n, b_signed);

        let sel1 = xor_dedup(c, dedup, x1, x0)?;
        let not_x2 = not_dedup(c, dedup, x2)?;
        let not_x1 = not_dedup(c, dedup, x1)?;
        let not_x0 = not_dedup(c, dedup, x0)?;
        let both_one = and_dedup(c, dedup, x1, x0)?;
        let both_zero = and_dedup(c, dedup, not_x1, not_x0)?;
        let pos2 = and_dedup(c, dedup, not_x2, both_one)?;
        let neg2 = and_dedup(c, dedup, x2, both_zero)?;
        let sel2 = or_dedup(c, dedup, pos2, neg2)?;
        let neg = x2;

        let not_sel1 = not_dedup(c, dedup, sel1)?;
        let not_sel2 = not_dedup(c, dedup, sel2)?;
        let is_zero = and_dedup(c, dedup, not_sel1, not_sel2)?;

        let mut magnitude = Vec::with_capacity(n + 1);
        for j in 0..n {
            let two_a_bit = two_a[j];
            let a_bit = a[j];
            let not_zero_choice = mux_dedup(c, dedup, sel1, Wire::FALSE, a_bit)?;
            let bit = mux_dedup(c, dedup, sel2, not_zero_choice, two_a_bit)?;
            magnitude.push(bit);
        }
        {
            let two_a_top = a[n - 1];
            let not_zero_choice = mux_dedup(c, dedup, sel1, Wire::FALSE, a_ext)?;
            let bit = mux_dedup(c, dedup, sel2, not_zero_choice, two_a_top)?;
            magnitude.push(bit);
        }
        let fill_beyond = mux_dedup(c, dedup, is_zero, Wire::FALSE, a_ext)?;

        let mut row = vec![Wire::FALSE; width];
        for (k, slot) in row.iter_mut().enumerate() {
            let global = k as i64 - base;
            if global < 0 {
                continue;
            }
            let magnitude_bit = if (global as usize) <= n {
                magnitude[global as usize]
            } else {
                fill_beyond
            };
            *slot = xor_dedup(c, dedup, magnitude_bit, neg)?;
        }
        rows.push(row);

        if base >= 0 && (base as usize) < width {
            corrections[base as usize] = neg;
        }
    }
    rows.push(corrections);

    let (sum, carry) = carry_save_reduce_dedup(c, dedup, rows, width)?;
    let (product, _overflow) = crate::adder::kogge_stone_add_dedup(c, dedup, &sum, &carry, Wire::FALSE)?;

    let low = product[..n].to_vec();
    let high = product[n..].to_vec();
    Ok((low, high))
}
