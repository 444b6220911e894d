//! Restoring shift-subtract divider, unrolled into `n` combinational stages,
//! plus the RV32IM special cases layered on top of plain integer division:
//! division by zero and the `MIN_INT / -1` signed overflow.

use ckt_circuit::{Circuit, CktResult, Wire};
use ckt_dedup::Dedup;

use crate::adder::{subtract, subtract_dedup};
use crate::compare::{eq, eq_dedup};
use crate::gates::{and, and_dedup, and_reduce, and_reduce_dedup, mux_bus, mux_bus_dedup, not, not_dedup, xor, xor_dedup};
use crate::shift::shift_left_const;

fn negate(c: &mut Circuit, a: &[Wire]) -> CktResult<Vec<Wire>> {
    let zero = vec![Wire::FALSE; a.len()];
    let (diff, _borrow) = subtract(c, &zero, a)?;
    Ok(diff)
}

fn negate_dedup(c: &mut Circuit, dedup: &mut Option<Dedup>, a: &[Wire]) -> CktResult<Vec<Wire>> {
    let zero = vec![Wire::FALSE; a.len()];
    let (diff, _borrow) = subtract_dedup(c, dedup, &zero, a)?;
    Ok(diff)
}

fn is_zero_bus(c: &mut Circuit, bus: &[Wire]) -> CktResult<Wire> {
    let nots: Vec<Wire> = bus.iter().map(|&w| not(c, w)).collect::<CktResult<Vec<_>>>()?;
    and_reduce(c, &nots)
}

fn is_zero_bus_dedup(c: &mut Circuit, dedup: &mut Option<Dedup>, bus: &[Wire]) -> CktResult<Wire> {
    let nots: Vec<Wire> = bus.iter().map(|&w| not_dedup(c, dedup, w)).collect::<CktResult<Vec<_>>>()?;
    and_reduce_dedup(c, dedup, &nots)
}

fn const_bus(n: usize, value: u64) -> Vec<Wire> {
    (0..n)
        .map(|i| if (value >> i) & 1 == 1 { Wire::TRUE } else { Wire::FALSE })
        .collect()
}

/// One restoring-division step per bit of the operand width: shift the
/// running remainder left bringing in the next dividend bit, trial-subtract
/// the divisor, and keep the subtracted value (setting a quotient bit) only
/// when it didn't borrow.
fn unsigned_divide_core(c: &mut Circuit, dividend: &[Wire], divisor: &[Wire]) -> CktResult<(Vec<Wire>, Vec<Wire>)> {
    let n = dividend.len();
    let mut quotient = vec![Wire::FALSE; n];
    let mut remainder = vec![Wire::FALSE; n + 1];
    let mut divisor_ext = divisor.to_vec();
    divisor_ext.push(Wire::FALSE);

    for i in (0..n).rev() {
        let mut shifted = shift_left_const(&remainder, 1);
        shifted[0] = dividend[i];
        let (trial, borrow) = subtract(c, &shifted, &divisor_ext)?;
        quotient[i] = not(c, borrow)?;
        remainder = mux_bus(c, borrow, &trial, &shifted)?;
    }
    Ok((quotient, remainder[..n].to_vec()))
}

/// Dedup-routed counterpart of [`unsigned_divide_core`].
fn unsigned_divide_core_dedup(
    c: &mut Circuit,
    dedup: &mut Option<Dedup>,
    dividend: &[Wire],
    divisor: &[Wire],
) -> CktResult<(Vec<Wire>, Vec<Wire>)> {
    let n = dividend.len();
    let mut quotient = vec![Wire::FALSE; n];
    let mut remainder = vec![Wire::FALSE; n + 1];
    let mut divisor_ext = divisor.to_vec();
    divisor_ext.push(Wire::FALSE);

    for i in (0..n).rev() {
        let mut shifted = shift_left_const(&remainder, 1);
        shifted[0] = dividend[i];
        let (trial, borrow) = subtract_dedup(c, dedup, &shifted, &divisor_ext)?;
        quotient[i] = not_dedup(c, dedup, borrow)?;
        remainder = mux_bus_dedup(c, dedup, borrow, &trial, &shifted)?;
    }
    Ok((quotient, remainder[..n].to_vec()))
}

/// Full `n`-bit integer division with RV32IM semantics: returns
/// `(quotient, remainder)`.
///
/// - Division by zero: quotient is all ones, remainder is the dividend,
///   for both signed and unsigned division.
/// - Signed overflow (`MIN_INT / -1`): quotient is `MIN_INT`, remainder is
///   zero. Unsigned division has no equivalent overflow case.
pub fn divide(c: &mut Circuit, dividend: &[Wire], divisor: &[Wire], signed: bool) -> CktResult<(Vec<Wire>, Vec<Wire>)> {
    assert_eq!(dividend.len(), divisor.len(), "divide: operand width mismatch");
    let n = dividend.len();

    let dividend_sign = if signed { dividend[n - 1] } else { Wire::FALSE };
    let divisor_sign = if signed { divisor[n - 1] } else { Wire::FALSE };

    let neg_dividend = negate(c, dividend)?;
    let neg_divisor = negate(c, divisor)?;
    let abs_dividend = mux_bus(c, dividend_sign, dividend, &neg_dividend)?;
    let abs_divisor = mux_bus(c, divisor_sign, divisor, &neg_divisor)?;

    let (uq, ur) = unsigned_divide_core(c, &abs_dividend, &abs_divisor)?;

    let quotient_sign = xor(c, dividend_sign, divisor_sign)?;
    let neg_uq = negate(c, &uq)?;
    let quotient = mux_bus(c, quotient_sign, &uq, &neg_uq)?;

    let neg_ur = negate(c, &ur)?;
    let remainder = mux_bus(c, dividend_sign, &ur, &neg_ur)?;

    let divisor_is_zero = is_zero_bus(c, divisor)?;
    let all_ones = const_bus(n, u64::MAX);
    let quotient = mux_bus(c, divisor_is_zero, &quotient, &all_ones)?;
    let remainder = mux_bus(c, divisor_is_zero, &remainder, dividend)?;

    if !signed {
        return Ok((quotient, remainder));
    }

    let min_int = const_bus(n, 1u64 << (n - 1));
    let all_ones_signed = const_bus(n, u64::MAX);
    let is_min_int = eq(c, dividend, &min_int)?;
    let is_neg_one = eq(c, divisor, &all_ones_signed)?;
    let overflow = and(c, is_min_int, is_neg_one)?;

    let zero = vec![Wire::FALSE; n];
    let quotient = mux_bus(c, overflow, &quotient, &min_int)?;
    let remainder = mux_bus(c, overflow, &remainder, &zero)?;

    Ok((quotient, remainder))
}

/// Dedup-routed counterpart of [`divide`]. With `dedup = &mut None` this
/// produces the identical gate sequence as [`divide`].
pub fn divide_dedup(
    c: &mut Circuit,
    dedup: &mut Option<Dedup>,
    dividend: &[Wire],
    divisor: &[Wire],
    signed: bool,
) -> CktResult<(Vec<Wire>, Vec<Wire>)> {
    assert_eq!(dividend.len(), divisor.len(), "divide_dedup: operand width mismatch");
    let n = dividend.len();

    let dividend_sign = if signed { dividend[n - 1] } else { Wire::FALSE };
    let divisor_sign = if signed { divisor[n - 1] } else { Wire::FALSE };

    let neg_dividend = negate_dedup(c, dedup, dividend)?;
    let neg_divisor = negate_dedup(c, dedup, divisor)?;
    let abs_dividend = mux_bus_dedup(c, dedup, dividend_sign, dividend, &neg_dividend)?;
    let abs_divisor = mux_bus_dedup(c, dedup, divisor_sign, divisor, &neg_divisor)?;

    let (uq, ur) = unsigned_divide_core_dedup(c, dedup, &abs_dividend, &abs_divisor)?;

    let quotient_sign = xor_dedup(c, dedup, dividend_sign, divisor_sign)?;
    let neg_uq = negate_dedup(c, dedup, &uq)?;
    let quotient = mux_bus_dedup(c, dedup, quotient_sign, &uq, &neg_uq)?;

    let neg_ur = negate_dedup(c, dedup, &ur)?;
    let remainder = mux_bus_dedup(c, dedup, dividend_sign, &ur, &neg_ur)?;

    let divisor_is_zero = is_zero_bus_dedup(c, dedup, divisor)?;
    let all_ones = const_bus(n, u64::MAX);
    let quotient = mux_bus_dedup(c, dedup, divisor_is_zero, &quotient, &all_ones)?;
    let remainder = mux_bus_dedup(c, dedup, divisor_is_zero, &remainder, dividend)?;

    if !signed {
        return Ok((quotient, remainder));
    }

    let min_int = const_bus(n, 1u64 << (n - 1));
    let all_ones_signed = const_bus(n, u64::MAX);
    let is_min_int = eq_dedup(c, dedup, dividend, &min_int)?;
    let is_neg_one = eq_dedup(c, dedup, divisor, &all_ones_signed)?;
    let overflow = and_dedup(c, dedup, is_min_int, is_neg_one)?;

    let zero = vec![Wire::FALSE; n];
    let quotient = mux_bus_dedup(c, dedup, overflow, &quotient, &min_int)?;
    let remainder = mux_bus_dedup(c, dedup, overflow, &remainder, &zero)?;

    Ok((quotient, remainder))
}
