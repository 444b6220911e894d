//! Circuit equivalence checking via a Tseitin-encoded miter handed to an
//! external SAT solver: build one CNF formula asserting two circuits agree
//! on inputs but diverge on some output, then ask whether it's satisfiable.
//! UNSAT proves equivalence for every possible input; SAT yields a concrete
//! counterexample.
//!
//! There's no direct prior art in this codebase's history for SAT/CNF
//! encoding specifically — the Tseitin transformation and miter
//! construction here follow the standard textbook algorithm rather than
//! any one example file, with the surrounding error handling and logging
//! kept in the same idiom as the rest of this workspace.

mod cnf;
mod error;
mod miter;
mod solve;

use std::time::Duration;

use ckt_circuit::SealedCircuit;

pub use cnf::CnfFormula;
pub use error::{EquivError, EquivResult};
pub use miter::{build_miter, Miter};
pub use solve::{solve, Verdict};

/// Checks whether `a` and `b` compute the same function, for every possible
/// input, within `timeout`. Convenience wrapper over [`build_miter`] and
/// [`solve`] for callers that don't need the intermediate CNF.
pub fn check_equivalence(a: &SealedCircuit, b: &SealedCircuit, timeout: Duration) -> EquivResult<Verdict> {
    let miter = build_miter(a, b)?;
    solve(miter.formula, miter.input_vars, timeout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ckt_isa::{broken_ripple_adder_circuit, kogge_stone_adder_circuit, ripple_adder_circuit};
    use std::time::Duration;

    fn timeout() -> Duration {
        Duration::from_secs(30)
    }

    #[test]
    fn ripple_and_kogge_stone_adders_are_equivalent() {
        let ripple = ripple_adder_circuit(4).unwrap();
        let kogge = kogge_stone_adder_circuit(4).unwrap();
        let verdict = check_equivalence(&ripple, &kogge, timeout()).unwrap();
        assert_eq!(verdict, Verdict::Equivalent);
    }

    #[test]
    fn broken_adder_diverges_with_the_known_counterexample() {
        let correct = ripple_adder_circuit(4).unwrap();
        let broken = broken_ripple_adder_circuit(4).unwrap();
        let verdict = check_equivalence(&correct, &broken, timeout()).unwrap();
        match verdict {
            Verdict::Divergent { counterexample } => {
                // inputs are [FALSE, TRUE, a0..a3, b0..b3]; any counterexample
                // the solver finds must actually reproduce a divergence.
                assert_eq!(counterexample.len(), correct.num_input_bits as usize);
                let bits_to_u64 = |bits: &[bool]| -> u64 {
                    bits.iter().enumerate().fold(0u64, |acc, (i, &b)| acc | ((b as u64) << i))
                };
                let a = bits_to_u64(&counterexample[2..6]);
                let b = bits_to_u64(&counterexample[6..10]);
                assert_ne!((a + b) % 16, {
                    let inputs = ckt_eval::pack_inputs(&[
                        &ckt_eval::bits_of_u64(a, 4),
                        &ckt_eval::bits_of_u64(b, 4),
                    ]);
                    ckt_eval::u64_of_bits(&ckt_eval::evaluate_bools(&broken, &inputs).unwrap())
                });
            }
            other => panic!("expected Divergent, got {other:?}"),
        }
    }

    #[test]
    fn mismatched_arity_is_rejected_before_reaching_the_solver() {
        let a = ripple_adder_circuit(4).unwrap();
        let b = ripple_adder_circuit(5).unwrap();
        assert!(matches!(
            check_equivalence(&a, &b, timeout()),
            Err(EquivError::InputArityMismatch { .. })
        ));
    }
}
