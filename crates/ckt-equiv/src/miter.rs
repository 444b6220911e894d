//! Builds the miter: one CNF formula asserting circuits `a` and `b` agree on
//! every input bit, with a clause demanding at least one output bit differs.
//! UNSAT means no such input exists, i.e. the circuits are equivalent; a
//! satisfying assignment decodes directly into a counterexample.

use ckt_circuit::{SealedCircuit, Wire};

use crate::cnf::{encode_circuit, encode_xor, wire_var, CnfFormula};
use crate::error::{EquivError, EquivResult};

/// A built miter, ready to hand to the solver.
#[derive(Debug)]
pub struct Miter {
    pub formula: CnfFormula,
    /// CNF variables of circuit `a`'s input bits, in order — used to decode
    /// a SAT witness back into a concrete counterexample input.
    pub input_vars: Vec<i32>,
}

pub fn build_miter(a: &SealedCircuit, b: &SealedCircuit) -> EquivResult<Miter> {
    if a.num_input_bits != b.num_input_bits {
        return Err(EquivError::InputArityMismatch {
            a: a.num_input_bits,
            b: b.num_input_bits,
        });
    }
    if a.outputs.len() != b.outputs.len() {
        return Err(EquivError::OutputArityMismatch {
            a: a.outputs.len(),
            b: b.outputs.len(),
        });
    }

    let mut f = CnfFormula::new();
    let b_offset = a.num_wires as u32;

    encode_circuit(&mut f, a, 0);
    encode_circuit(&mut f, b, b_offset);

    let mut input_vars = Vec::with_capacity(a.num_input_bits as usize);
    for i in 0..a.num_input_bits as u32 {
        let wa = wire_var(Wire::from(i), 0);
        let wb = wire_var(Wire::from(i), b_offset);
        // wa <-> wb
        f.add_clause(&[-wa, wb]);
        f.add_clause(&[wa, -wb]);
        input_vars.push(wa);
    }

    let mut differ_vars = Vec::with_capacity(a.outputs.len());
    for (&oa, &ob) in a.outputs.iter().zip(b.outputs.iter()) {
        let va = wire_var(oa, 0);
        let vb = wire_var(ob, b_offset);
        let d = f.fresh_var();
        encode_xor(&mut f, va, vb, d);
        differ_vars.push(d);
    }

    f.add_clause(&differ_vars);

    log::debug!(
        "ckt-equiv: built miter, {} vars, {} clauses",
        f.num_vars,
        f.clauses.len()
    );

    Ok(Miter { formula: f, input_vars })
}
