//! A "zkVM-direct" builder: constructs small standalone circuits straight
//! from algorithmic intent, bypassing the decoder entirely. Used to seed
//! the equivalence checker with pairs of circuits that compute the same
//! function through different gate layouts (and, deliberately, pairs that
//! don't), rather than going through a whole instruction stream.

use ckt_arith::{kogge_stone_add, ripple_carry_add};
use ckt_circuit::{Circuit, CktResult, Limits, SealedCircuit, Wire};

fn wires(width: usize, offset: u32) -> Vec<Wire> {
    (0..width).map(|i| Wire::from(offset + i as u32)).collect()
}

/// A plain `n`-bit ripple-carry adder with no carry-in, sealed with the
/// sum bits as output (carry-out dropped). Two circuits built from this
/// with different `n` use disjoint wire numbering internally despite
/// computing the same function — a textbook equivalence-checker positive.
pub fn ripple_adder_circuit(n: usize) -> CktResult<SealedCircuit> {
    let mut c = Circuit::create(Limits::default(), 2 + 2 * n as u64)?;
    let a = wires(n, 2);
    let b = wires(n, 2 + n as u32);
    let (sum, _carry) = ripple_carry_add(&mut c, &a, &b, Wire::FALSE)?;
    c.seal(sum)
}

/// The same adder built from the parallel-prefix network instead — a
/// structurally different circuit computing the identical function.
pub fn kogge_stone_adder_circuit(n: usize) -> CktResult<SealedCircuit> {
    let mut c = Circuit::create(Limits::default(), 2 + 2 * n as u64)?;
    let a = wires(n, 2);
    let b = wires(n, 2 + n as u32);
    let (sum, _carry) = kogge_stone_add(&mut c, &a, &b, Wire::FALSE)?;
    c.seal(sum)
}

/// A deliberately broken `n`-bit ripple-carry adder: the final bit's carry
/// term is dropped, so the top sum bit is just `a[n-1] XOR b[n-1]` with no
/// incoming carry folded in. Diverges from a correct adder exactly when the
/// carry chain reaches the top bit — e.g. `0b0111 + 0b0001` on 4 bits.
pub fn broken_ripple_adder_circuit(n: usize) -> CktResult<SealedCircuit> {
    use ckt_arith::{and, or, xor};

    let mut c = Circuit::create(Limits::default(), 2 + 2 * n as u64)?;
    let a = wires(n, 2);
    let b = wires(n, 2 + n as u32);

    let mut sum = Vec::with_capacity(n);
    let mut carry = Wire::FALSE;
    for i in 0..n {
        let half_sum = xor(&mut c, a[i], b[i])?;
        if i + 1 == n {
            // Bug: omits the carry-in for the top bit.
            sum.push(half_sum);
        } else {
            let s = xor(&mut c, half_sum, carry)?;
            let half_carry = and(&mut c, a[i], b[i])?;
            let carry_prop = and(&mut c, half_sum, carry)?;
            carry = or(&mut c, half_carry, carry_prop)?;
            sum.push(s);
        }
    }
    c.seal(sum)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ckt_eval::{bits_of_u64, evaluate_bools, pack_inputs, u64_of_bits};

    #[test]
    fn ripple_and_kogge_stone_compute_the_same_function() {
        let n = 4;
        let ripple = ripple_adder_circuit(n).unwrap();
        let kogge = kogge_stone_adder_circuit(n).unwrap();
        for av in 0..(1u64 << n) {
            for bv in 0..(1u64 << n) {
                let inputs = pack_inputs(&[&bits_of_u64(av, n), &bits_of_u64(bv, n)]);
                let r = u64_of_bits(&evaluate_bools(&ripple, &inputs).unwrap());
                let k = u64_of_bits(&evaluate_bools(&kogge, &inputs).unwrap());
                assert_eq!(r, k);
                assert_eq!(r, (av + bv) % (1 << n));
            }
        }
    }

    #[test]
    fn broken_adder_diverges_exactly_when_the_dropped_carry_mattered() {
        let n = 4;
        let correct = ripple_adder_circuit(n).unwrap();
        let broken = broken_ripple_adder_circuit(n).unwrap();

        let inputs = pack_inputs(&[&bits_of_u64(0b0111, n), &bits_of_u64(0b0001, n)]);
        let good = u64_of_bits(&evaluate_bools(&correct, &inputs).unwrap());
        let bad = u64_of_bits(&evaluate_bools(&broken, &inputs).unwrap());
        assert_eq!(good, 0b1000);
        assert_eq!(bad, 0b0000);
        assert_ne!(good, bad);
    }
}
