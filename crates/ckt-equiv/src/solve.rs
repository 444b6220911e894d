//! Hands a miter's CNF to `varisat` and classifies the result. A wall-clock
//! deadline is enforced independently of the solver's own internals: the
//! blocking solve runs on a dedicated thread, and the caller simply stops
//! waiting on it once `timeout` elapses. A solver that later finishes (or
//! never does, e.g. if it's thrashing on allocation) is abandoned rather
//! than joined — its result is discarded.

use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use varisat::{CnfFormula as VarisatCnf, ExtendFormula, Lit, Solver};

use crate::cnf::CnfFormula;
use crate::error::{EquivError, EquivResult};

/// Outcome of one equivalence check. `Unknown` covers both a solver timeout
/// and memory exhaustion — spec requires both be reported the same way,
/// since neither proves equivalence or divergence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Equivalent,
    Divergent { counterexample: Vec<bool> },
    Unknown,
}

fn to_varisat(formula: &CnfFormula) -> VarisatCnf {
    let mut v = VarisatCnf::new();
    for clause in &formula.clauses {
        let lits: Vec<Lit> = clause.iter().map(|&l| Lit::from_dimacs(l as isize)).collect();
        v.add_clause(lits);
    }
    v
}

fn decode_counterexample(model: &[Lit], input_vars: &[i32]) -> Vec<bool> {
    input_vars
        .iter()
        .map(|&v| {
            model
                .iter()
                .find_map(|lit| {
                    let d = lit.to_dimacs();
                    (d.unsigned_abs() as i32 == v).then_some(d > 0)
                })
                .unwrap_or(false)
        })
        .collect()
}

/// Runs the solver on `formula` on a background thread, waiting up to
/// `timeout`. `input_vars` are the CNF variables of circuit A's input bits
/// in order, used to decode a SAT witness into a concrete counterexample.
pub fn solve(formula: CnfFormula, input_vars: Vec<i32>, timeout: Duration) -> EquivResult<Verdict> {
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        let cnf = to_varisat(&formula);
        let mut solver = Solver::new();
        solver.add_formula(&cnf);
        let result = solver.solve();
        let model = matches!(result, Ok(true)).then(|| solver.model()).flatten();
        let _ = tx.send((result, model));
    });

    match rx.recv_timeout(timeout) {
        Ok((Ok(true), Some(model))) => {
            log::debug!("ckt-equiv: SAT, circuits diverge");
            Ok(Verdict::Divergent { counterexample: decode_counterexample(&model, &input_vars) })
        }
        Ok((Ok(true), None)) => Err(EquivError::Solver("SAT result carried no model".into())),
        Ok((Ok(false), _)) => {
            log::debug!("ckt-equiv: UNSAT, circuits equivalent");
            Ok(Verdict::Equivalent)
        }
        Ok((Err(e), _)) => Err(EquivError::Solver(e.to_string())),
        Err(mpsc::RecvTimeoutError::Timeout) => {
            log::warn!("ckt-equiv: solver exceeded {:?} deadline, reporting unknown", timeout);
            Ok(Verdict::Unknown)
        }
        Err(mpsc::RecvTimeoutError::Disconnected) => {
            Err(EquivError::Solver("solver thread exited without a result".into()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cnf::{encode_and, encode_xor};

    #[test]
    fn unsatisfiable_formula_is_equivalent() {
        // x AND NOT x: no satisfying assignment.
        let mut f = CnfFormula::new();
        f.add_clause(&[1]);
        f.add_clause(&[-1]);
        let v = solve(f, vec![1], Duration::from_secs(5)).unwrap();
        assert_eq!(v, Verdict::Equivalent);
    }

    #[test]
    fn satisfiable_formula_yields_a_consistent_counterexample() {
        // out = a AND b, plus "out must be true" forces a = b = true.
        let mut f = CnfFormula::new();
        encode_and(&mut f, 1, 2, 3);
        f.add_clause(&[3]);
        let v = solve(f, vec![1, 2], Duration::from_secs(5)).unwrap();
        match v {
            Verdict::Divergent { counterexample } => assert_eq!(counterexample, vec![true, true]),
            other => panic!("expected Divergent, got {other:?}"),
        }
    }

    #[test]
    fn xor_forced_true_with_one_input_fixed_determines_the_other() {
        let mut f = CnfFormula::new();
        encode_xor(&mut f, 1, 2, 3);
        f.add_clause(&[1]); // a = true
        f.add_clause(&[3]); // out = true => b = false
        let v = solve(f, vec![1, 2], Duration::from_secs(5)).unwrap();
        match v {
            Verdict::Divergent { counterexample } => assert_eq!(counterexample, vec![true, false]),
            other => panic!("expected Divergent, got {other:?}"),
        }
    }
}
