//! Barrel shifters and their zero-gate constant-amount specializations.

use ckt_circuit::{Circuit, CktResult, Wire};
use ckt_dedup::Dedup;

use crate::gates::{mux, mux_dedup};

/// Which way [`barrel_shift`] moves bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShiftDir {
    Left,
    Right,
}

/// Log-depth barrel shifter: one MUX stage per bit of `amount` (bit `k`
/// stage conditionally shifts by `2^k`). `fill` supplies the bit shifted
/// into vacated positions at every stage — `Wire::FALSE` for SLL/SRL, the
/// original sign bit for SRA (reused unchanged across every stage, since
/// the value being filled in never itself needs to shift).
///
/// `amount` must carry enough bits to address every position in `value`
/// (`2^amount.len() >= value.len()`); for the 32-bit RV32I shift
/// instructions this is the 5-bit `rs2[4:0]` / `shamt` field.
pub fn barrel_shift(
    c: &mut Circuit,
    value: &[Wire],
    amount: &[Wire],
    dir: ShiftDir,
    fill: Wire,
) -> CktResult<Vec<Wire>> {
    let n = value.len();
    let mut cur = value.to_vec();
    for (k, &amount_bit) in amount.iter().enumerate() {
        let s = 1usize << k;
        if s >= n {
            break;
        }
        let mut next = Vec::with_capacity(n);
        for i in 0..n {
            let shifted = match dir {
                ShiftDir::Left => {
                    if i >= s {
                        cur[i - s]
                    } else {
                        fill
                    }
                }
                ShiftDir::Right => {
                    if i + s < n {
                        cur[i + s]
                    } else {
                        fill
                    }
                }
            };
            next.push(mux(c, amount_bit, cur[i], shifted)?);
        }
        cur = next;
    }
    Ok(cur)
}

pub fn shift_left_logical(c: &mut Circuit, value: &[Wire], amount: &[Wire]) -> CktResult<Vec<Wire>> {
    barrel_shift(c, value, amount, ShiftDir::Left, Wire::FALSE)
}

pub fn shift_right_logical(c: &mut Circuit, value: &[Wire], amount: &[Wire]) -> CktResult<Vec<Wire>> {
    barrel_shift(c, value, amount, ShiftDir::Right, Wire::FALSE)
}

pub fn shift_right_arithmetic(
    c: &mut Circuit,
    value: &[Wire],
    amount: &[Wire],
) -> CktResult<Vec<Wire>> {
    let sign = value[value.len() - 1];
    barrel_shift(c, value, amount, ShiftDir::Right, sign)
}

/// Dedup-routed counterpart of [`barrel_shift`].
pub fn barrel_shift_dedup(
    c: &mut Circuit,
    dedup: &mut Option<Dedup>,
    value: &[Wire],
    amount: &[Wire],
    dir: ShiftDir,
    fill: Wire,
) -> CktResult<Vec<Wire>> {
    let n = value.len();
    let mut cur = value.to_vec();
    for (k, &amount_bit) in amount.iter().enumerate() {
        let s = 1usize << k;
        if s >= n {
            break;
        }
        let mut next = Vec::with_capacity(n);
        for i in 0..n {
            let shifted = match dir {
                ShiftDir::Left => {
                    if i >= s {
                        cur[i - s]
                    } else {
                        fill
                    }
                }
                ShiftDir::Right => {
                    if i + s < n {
                        cur[i + s]
                    } else {
                        fill
                    }
                }
            };
            next.push(mux_dedup(c, dedup, amount_bit, cur[i], shifted)?);
        }
        cur = next;
    }
    Ok(cur)
}

/// Dedup-routed counterpart of [`shift_left_logical`].
pub fn shift_left_logical_dedup(
    c: &mut Circuit,
    dedup: &mut Option<Dedup>,
    value: &[Wire],
    amount: &[Wire],
) -> CktResult<Vec<Wire>> {
    barrel_shift_dedup(c, dedup, value, amount, ShiftDir::Left, Wire::FALSE)
}

/// Dedup-routed counterpart of [`shift_right_logical`].
pub fn shift_right_logical_dedup(
    c: &mut Circuit,
    dedup: &mut Option<Dedup>,
    value: &[Wire],
    amount: &[Wire],
) -> CktResult<Vec<Wire>> {
    barrel_shift_dedup(c, dedup, value, amount, ShiftDir::Right, Wire::FALSE)
}

/// Dedup-routed counterpart of [`shift_right_arithmetic`].
pub fn shift_right_arithmetic_dedup(
    c: &mut Circuit,
    dedup: &mut Option<Dedup>,
    value: &[Wire],
    amount: &[Wire],
) -> CktResult<Vec<Wire>> {
    let sign = value[value.len() - 1];
    barrel_shift_dedup(c, dedup, value, amount, ShiftDir::Right, sign)
}

/// Zero-gate shift by a compile-time-known amount: pure rewiring.
pub fn shift_left_const(value: &[Wire], amount: usize) -> Vec<Wire> {
    let n = value.len();
    (0..n)
        .map(|i| if i >= amount { value[i - amount] } else { Wire::FALSE })
        .collect()
}

/// Zero-gate logical right shift by a compile-time-known amount.
pub fn shift_right_logical_const(value: &[Wire], amount: usize) -> Vec<Wire> {
    let n = value.len();
    (0..n)
        .map(|i| if i + amount < n { value[i + amount] } else { Wire::FALSE })
        .collect()
}

/// Zero-gate arithmetic right shift by a compile-time-known amount: vacated
/// high bits are filled with the (reused, not recomputed) sign wire.
pub fn shift_right_arithmetic_const(value: &[Wire], amount: usize) -> Vec<Wire> {
    let n = value.len();
    let sign = value[n - 1];
    (0..n)
        .map(|i| if i + amount < n { value[i + amount] } else { sign })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ckt_circuit::Limits;
    use ckt_eval::{bits_of_u64, evaluate_bools, pack_inputs, u64_of_bits};

    const WIDTH: usize = 32;
    const AMT_WIDTH: usize = 5;

    fn wires(width: usize, offset: u32) -> Vec<Wire> {
        (0..width).map(|i| Wire::from(offset + i as u32)).collect()
    }

    #[test]
    fn sll_matches_rust_shl() {
        let mut c = Circuit::create(Limits::default(), 2 + (WIDTH + AMT_WIDTH) as u64).unwrap();
        let value = wires(WIDTH, 2);
        let amount = wires(AMT_WIDTH, 2 + WIDTH as u32);
        let out = shift_left_logical(&mut c, &value, &amount).unwrap();
        let sealed = c.seal(out).unwrap();

        for (v, s) in [(1u32, 0u32), (1, 31), (0xFFFF_FFFFu32, 4), (1, 32u32 - 1)] {
            let inputs = pack_inputs(&[
                &bits_of_u64(v as u64, WIDTH),
                &bits_of_u64((s % 32) as u64, AMT_WIDTH),
            ]);
            let out = evaluate_bools(&sealed, &inputs).unwrap();
            let got = u64_of_bits(&out) as u32;
            assert_eq!(got, v.wrapping_shl(s % 32));
        }
    }

    #[test]
    fn srl_matches_rust_shr() {
        let mut c = Circuit::create(Limits::default(), 2 + (WIDTH + AMT_WIDTH) as u64).unwrap();
        let value = wires(WIDTH, 2);
        let amount = wires(AMT_WIDTH, 2 + WIDTH as u32);
        let out = shift_right_logical(&mut c, &value, &amount).unwrap();
        let sealed = c.seal(out).unwrap();

        for (v, s) in [(0xFFFF_FFFFu32, 4u32), (0x8000_0000, 31), (1, 0)] {
            let inputs = pack_inputs(&[&bits_of_u64(v as u64, WIDTH), &bits_of_u64(s as u64, AMT_WIDTH)]);
            let out = evaluate_bools(&sealed, &inputs).unwrap();
            let got = u64_of_bits(&out) as u32;
            assert_eq!(got, v.wrapping_shr(s));
        }
    }

    #[test]
    fn sra_sign_extends() {
        let mut c = Circuit::create(Limits::default(), 2 + (WIDTH + AMT_WIDTH) as u64).unwrap();
        let value = wires(WIDTH, 2);
        let amount = wires(AMT_WIDTH, 2 + WIDTH as u32);
        let out = shift_right_arithmetic(&mut c, &value, &amount).unwrap();
        let sealed = c.seal(out).unwrap();

        for (v, s) in [(-8i32, 1u32), (-1, 31), (i32::MIN, 4)] {
            let inputs =
                pack_inputs(&[&bits_of_u64(v as u32 as u64, WIDTH), &bits_of_u64(s as u64, AMT_WIDTH)]);
            let out = evaluate_bools(&sealed, &inputs).unwrap();
            let got = u64_of_bits(&out) as u32 as i32;
            assert_eq!(got, v.wrapping_shr(s));
        }
    }

    #[test]
    fn const_shifts_match_variable_shifts() {
        let value: Vec<Wire> = wires(8, 2);
        let left = shift_left_const(&value, 3);
        let right = shift_right_logical_const(&value, 3);
        let arith = shift_right_arithmetic_const(&value, 3);
        assert_eq!(left[0], Wire::FALSE);
        assert_eq!(left[3], value[0]);
        assert_eq!(right[7], Wire::FALSE);
        assert_eq!(arith[7], value[7]);
    }

    #[test]
    fn dedup_shifts_match_plain_shifts_with_no_cache() {
        let mut c = Circuit::create(Limits::default(), 2 + (WIDTH + AMT_WIDTH) as u64).unwrap();
        let value = wires(WIDTH, 2);
        let amount = wires(AMT_WIDTH, 2 + WIDTH as u32);
        let sll = shift_left_logical_dedup(&mut c, &mut None, &value, &amount).unwrap();
        let srl = shift_right_logical_dedup(&mut c, &mut None, &value, &amount).unwrap();
        let sra = shift_right_arithmetic_dedup(&mut c, &mut None, &value, &amount).unwrap();
        let mut outs = sll;
        outs.extend(srl);
        outs.extend(sra);
        let sealed = c.seal(outs).unwrap();

        for (v, s) in [(0xFFFF_FFFFu32, 4u32), (0x8000_0000, 31), (1, 0)] {
            let inputs = pack_inputs(&[&bits_of_u64(v as u64, WIDTH), &bits_of_u64(s as u64, AMT_WIDTH)]);
            let out = evaluate_bools(&sealed, &inputs).unwrap();
            let got_sll = u64_of_bits(&out[..WIDTH]) as u32;
            let got_srl = u64_of_bits(&out[WIDTH..2 * WIDTH]) as u32;
            let got_sra = u64_of_bits(&out[2 * WIDTH..]) as u32 as i32;
            assert_eq!(got_sll, v.wrapping_shl(s));
            assert_eq!(got_srl, v.wrapping_shr(s));
            assert_eq!(got_sra, (v as i32).wrapping_shr(s));
        }
    }
}
