//! The Keccak-f[1600] permutation: 24 rounds of θ, ρ, π, χ, ι over a
//! 1600-wire state organized as 25 little-endian 64-bit lanes.
//!
//! ρ and π are pure lane rewiring (rotate, then relabel) — zero gates. θ and
//! ι are XOR-only. χ is the permutation's only source of nonlinearity, and
//! the only step that costs an AND gate.

use ckt_circuit::{Circuit, CktResult, Wire};

/// Standard Keccak rho rotation offsets, indexed `[x][y]`.
const RHO_OFFSETS: [[u32; 5]; 5] = [
    [0, 36, 3, 41, 18],
    [1, 44, 10, 45, 2],
    [62, 6, 43, 15, 61],
    [28, 55, 25, 21, 56],
    [27, 20, 39, 8, 14],
];

/// Round constants for ι, one per of the 24 rounds.
const ROUND_CONSTANTS: [u64; 24] = [
    0x0000000000000001,
    0x0000000000008082,
    0x800000000000808A,
    0x8000000080008000,
    0x000000000000808B,
    0x0000000080000001,
    0x8000000080008081,
    0x8000000000008009,
    0x000000000000008A,
    0x0000000000000088,
    0x0000000080008009,
    0x000000008000000A,
    0x000000008000808B,
    0x800000000000008B,
    0x8000000000008089,
    0x8000000000008003,
    0x8000000000008002,
    0x8000000000000080,
    0x000000000000800A,
    0x800000008000000A,
    0x8000000080008081,
    0x8000000000008080,
    0x0000000080000001,
    0x8000000080008008,
];

/// Number of wires in a Keccak-f[1600] state.
pub(crate) const STATE_BITS: usize = 1600;
const LANE_BITS: usize = 64;

fn lane_offset(x: usize, y: usize) -> usize {
    LANE_BITS * (5 * y + x)
}

fn get_lane(state: &[Wire], x: usize, y: usize) -> &[Wire] {
    let off = lane_offset(x, y);
    &state[off..off + LANE_BITS]
}

fn set_lane(state: &mut [Wire], x: usize, y: usize, lane: &[Wire]) {
    let off = lane_offset(x, y);
    state[off..off + LANE_BITS].copy_from_slice(lane);
}

/// Rotates a 64-bit lane left by `amount` bits (mod 64). Pure rewiring.
fn rotate_left(lane: &[Wire], amount: u32) -> Vec<Wire> {
    let n = LANE_BITS;
    let amount = (amount as usize) % n;
    (0..n).map(|i| lane[(i + n - amount) % n]).collect()
}

fn xor_lanes(c: &mut Circuit, a: &[Wire], b: &[Wire]) -> CktResult<Vec<Wire>> {
    a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| crate::gate_helpers::xor(c, x, y))
        .collect()
}

fn theta(c: &mut Circuit, state: &[Wire]) -> CktResult<Vec<Wire>> {
    let mut col_parity = Vec::with_capacity(5);
    for x in 0..5 {
        let mut acc = get_lane(state, x, 0).to_vec();
        for y in 1..5 {
            acc = xor_lanes(c, &acc, get_lane(state, x, y))?;
        }
        col_parity.push(acc);
    }

    let mut d = Vec::with_capacity(5);
    for x in 0..5 {
        let left = &col_parity[(x + 4) % 5];
        let right_rot = rotate_left(&col_parity[(x + 1) % 5], 1);
        d.push(xor_lanes(c, left, &right_rot)?);
    }

    let mut out = state.to_vec();
    for x in 0..5 {
        for y in 0..5 {
            let new_lane = xor_lanes(c, get_lane(state, x, y), &d[x])?;
            set_lane(&mut out, x, y, &new_lane);
        }
    }
    Ok(out)
}

fn rho_pi(state: &[Wire]) -> Vec<Wire> {
    let mut out = vec![Wire::FALSE; STATE_BITS];
    for x in 0..5 {
        for y in 0..5 {
            let rotated = rotate_left(get_lane(state, x, y), RHO_OFFSETS[x][y]);
            // pi: lane (x, y) moves to (y, (2x + 3y) mod 5)
            let new_x = y;
            let new_y = (2 * x + 3 * y) % 5;
            set_lane(&mut out, new_x, new_y, &rotated);
        }
    }
    out
}

fn chi(c: &mut Circuit, state: &[Wire]) -> CktResult<Vec<Wire>> {
    let mut out = state.to_vec();
    for x in 0..5 {
        for y in 0..5 {
            let a = get_lane(state, x, y);
            let b = get_lane(state, (x + 1) % 5, y);
            let d = get_lane(state, (x + 2) % 5, y);
            let mut new_lane = Vec::with_capacity(LANE_BITS);
            for z in 0..LANE_BITS {
                let not_b = crate::gate_helpers::not(c, b[z])?;
                let and_bd = crate::gate_helpers::and(c, not_b, d[z])?;
                new_lane.push(crate::gate_helpers::xor(c, a[z], and_bd)?);
            }
            set_lane(&mut out, x, y, &new_lane);
        }
    }
    Ok(out)
}

fn iota(c: &mut Circuit, state: &[Wire], round: usize) -> CktResult<Vec<Wire>> {
    let mut out = state.to_vec();
    let rc = ROUND_CONSTANTS[round];
    let lane0 = get_lane(state, 0, 0).to_vec();
    let mut new_lane0 = lane0.clone();
    for z in 0..LANE_BITS {
        if (rc >> z) & 1 == 1 {
            new_lane0[z] = crate::gate_helpers::xor(c, lane0[z], Wire::TRUE)?;
        }
    }
    set_lane(&mut out, 0, 0, &new_lane0);
    Ok(out)
}

/// Applies the full 24-round Keccak-f[1600] permutation to a 1600-wire
/// state, returning the permuted state.
pub(crate) fn keccak_f1600(c: &mut Circuit, mut state: Vec<Wire>) -> CktResult<Vec<Wire>> {
    assert_eq!(state.len(), STATE_BITS, "keccak_f1600: state must be exactly 1600 wires");
    for round in 0..24 {
        state = theta(c, &state)?;
        state = rho_pi(&state);
        state = chi(c, &state)?;
        state = iota(c, &state, round)?;
    }
    Ok(state)
}
