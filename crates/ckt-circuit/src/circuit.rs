use crate::error::{CktError, CktResult};
use crate::gate::{Gate, GateType};
use crate::limits::Limits;
use crate::wire::Wire;

/// Append-only Boolean circuit under construction.
///
/// Wire IDs are handed out monotonically starting at `num_input_bits`
/// (wires `0..num_input_bits` are the input layout, beginning with the two
/// universal constants). A wire is "defined" once it is an input bit or the
/// output of a gate; `add_gate` refuses to read an undefined wire or to
/// redefine one that already has an output, which keeps every prefix of
/// `gates` topologically valid by construction.
#[derive(Debug)]
pub struct Circuit {
    limits: Limits,
    num_input_bits: u64,
    gates: Vec<Gate>,
    next_wire: u32,
    defined: Vec<bool>,
}

/// A circuit whose output layout has been designated and which may no longer
/// be mutated.
#[derive(Debug, Clone)]
pub struct SealedCircuit {
    pub num_input_bits: u64,
    pub gates: Vec<Gate>,
    pub num_wires: u64,
    pub outputs: Vec<Wire>,
}

/// Summary statistics about a circuit, used for CLI reporting and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CircuitStats {
    pub num_gates: u64,
    pub num_and_gates: u64,
    pub num_xor_gates: u64,
    pub num_wires: u64,
    pub num_input_bits: u64,
    pub num_output_bits: u64,
}

impl Circuit {
    /// Creates a new circuit whose input layout begins with the two
    /// universal constants.
    ///
    /// `num_input_bits` must be at least 2 (for the constants) and within
    /// `limits.max_io_bits`.
    pub fn create(limits: Limits, num_input_bits: u64) -> CktResult<Self> {
        if num_input_bits < 2 {
            return Err(CktError::ConfigError(format!(
                "num_input_bits must be at least 2 for the universal constants, got {num_input_bits}"
            )));
        }
        if num_input_bits > limits.max_io_bits {
            return Err(CktError::BudgetExceeded {
                budget: "input bits",
                limit: limits.max_io_bits,
                requested: num_input_bits,
            });
        }

        let mut defined = vec![true; num_input_bits as usize];
        // Wires 0 and 1 are always defined as constants; the rest of the
        // input layout is "defined" in the sense that it's supplied by the
        // host, not produced by a gate.
        defined[0] = true;
        defined[1] = true;

        log::debug!("circuit: created with {num_input_bits} input bits");

        Ok(Self {
            limits,
            num_input_bits,
            gates: Vec::new(),
            next_wire: num_input_bits as u32,
            defined,
        })
    }

    /// Allocates one fresh wire. Never returns wire 0 or 1.
    pub fn alloc_wire(&mut self) -> Wire {
        let w = Wire::from(self.next_wire);
        self.next_wire += 1;
        self.defined.push(false);
        w
    }

    /// Allocates `k` fresh, contiguously-numbered wires.
    pub fn alloc_wire_array(&mut self, k: usize) -> Vec<Wire> {
        (0..k).map(|_| self.alloc_wire()).collect()
    }

    fn is_defined(&self, w: Wire) -> bool {
        self.defined
            .get(u32::from(w) as usize)
            .copied()
            .unwrap_or(false)
    }

    /// Appends a gate. `output` must have been returned by `alloc_wire`(_array)
    /// and must not already be the output of an earlier gate; `left` and
    /// `right` must already be defined.
    pub fn add_gate(&mut self, left: Wire, right: Wire, output: Wire, ty: GateType) -> CktResult<()> {
        if self.gates.len() as u64 >= self.limits.max_gates {
            return Err(CktError::BudgetExceeded {
                budget: "gates",
                limit: self.limits.max_gates,
                requested: self.gates.len() as u64 + 1,
            });
        }
        if !self.is_defined(left) {
            return Err(CktError::InvariantViolation(format!(
                "gate input {left:?} is not yet defined"
            )));
        }
        if !self.is_defined(right) {
            return Err(CktError::InvariantViolation(format!(
                "gate input {right:?} is not yet defined"
            )));
        }
        if self.is_defined(output) {
            return Err(CktError::InvariantViolation(format!(
                "output wire {output:?} already has a defining gate"
            )));
        }

        self.gates.push(Gate::new(left, right, output, ty));
        let idx = u32::from(output) as usize;
        if idx >= self.defined.len() {
            return Err(CktError::InvariantViolation(format!(
                "output wire {output:?} was never allocated"
            )));
        }
        self.defined[idx] = true;
        Ok(())
    }

    pub fn num_inputs(&self) -> u64 {
        self.num_input_bits
    }

    pub fn num_gates(&self) -> u64 {
        self.gates.len() as u64
    }

    pub fn num_wires(&self) -> u64 {
        self.next_wire as u64
    }

    pub fn gates(&self) -> &[Gate] {
        &self.gates
    }

    /// Designates the output wires and consumes the builder, producing a
    /// [`SealedCircuit`] that may be serialized, evaluated, or checked for
    /// equivalence. No mutation is possible after this point.
    pub fn seal(self, outputs: Vec<Wire>) -> CktResult<SealedCircuit> {
        if outputs.len() as u64 > self.limits.max_io_bits {
            return Err(CktError::BudgetExceeded {
                budget: "output bits",
                limit: self.limits.max_io_bits,
                requested: outputs.len() as u64,
            });
        }
        for &w in &outputs {
            if !self.is_defined(w) {
                return Err(CktError::InvariantViolation(format!(
                    "output wire {w:?} was never defined"
                )));
            }
        }

        log::debug!(
            "circuit: sealed with {} gates, {} outputs",
            self.gates.len(),
            outputs.len()
        );

        Ok(SealedCircuit {
            num_input_bits: self.num_input_bits,
            gates: self.gates,
            num_wires: self.next_wire as u64,
            outputs,
        })
    }
}

impl SealedCircuit {
    pub fn stats(&self) -> CircuitStats {
        let num_and_gates = self
            .gates
            .iter()
            .filter(|g| g.ty == GateType::And)
            .count() as u64;
        CircuitStats {
            num_gates: self.gates.len() as u64,
            num_and_gates,
            num_xor_gates: self.gates.len() as u64 - num_and_gates,
            num_wires: self.num_wires,
            num_input_bits: self.num_input_bits,
            num_output_bits: self.outputs.len() as u64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_limits() -> Limits {
        Limits {
            max_io_bits: 1024,
            max_gates: 1024,
        }
    }

    #[test]
    fn constants_preallocated_and_defined() {
        let c = Circuit::create(small_limits(), 4).unwrap();
        assert_eq!(c.num_inputs(), 4);
        assert!(c.is_defined(Wire::FALSE));
        assert!(c.is_defined(Wire::TRUE));
    }

    #[test]
    fn alloc_never_returns_reserved_wires() {
        let mut c = Circuit::create(small_limits(), 4).unwrap();
        let w = c.alloc_wire();
        assert!(u32::from(w) >= 4);
    }

    #[test]
    fn add_gate_rejects_undefined_input() {
        let mut c = Circuit::create(small_limits(), 4).unwrap();
        let out = c.alloc_wire();
        let undefined = Wire::from(99);
        let err = c
            .add_gate(Wire::FALSE, undefined, out, GateType::And)
            .unwrap_err();
        assert!(matches!(err, CktError::InvariantViolation(_)));
    }

    #[test]
    fn add_gate_rejects_redefining_output() {
        let mut c = Circuit::create(small_limits(), 4).unwrap();
        let out = c.alloc_wire();
        c.add_gate(Wire::FALSE, Wire::TRUE, out, GateType::Xor)
            .unwrap();
        let err = c
            .add_gate(Wire::FALSE, Wire::TRUE, out, GateType::And)
            .unwrap_err();
        assert!(matches!(err, CktError::InvariantViolation(_)));
    }

    #[test]
    fn gate_budget_enforced() {
        let limits = Limits {
            max_io_bits: 1024,
            max_gates: 1,
        };
        let mut c = Circuit::create(limits, 4).unwrap();
        let out1 = c.alloc_wire();
        c.add_gate(Wire::FALSE, Wire::TRUE, out1, GateType::Xor)
            .unwrap();
        let out2 = c.alloc_wire();
        let err = c
            .add_gate(Wire::FALSE, Wire::TRUE, out2, GateType::And)
            .unwrap_err();
        assert!(matches!(err, CktError::BudgetExceeded { .. }));
    }

    #[test]
    fn seal_rejects_undefined_output() {
        let mut c = Circuit::create(small_limits(), 4).unwrap();
        let w = c.alloc_wire();
        let err = c.seal(vec![w]).unwrap_err();
        assert!(matches!(err, CktError::InvariantViolation(_)));
    }

    #[test]
    fn seal_and_stats_roundtrip() {
        let mut c = Circuit::create(small_limits(), 4).unwrap();
        let out = c.alloc_wire();
        c.add_gate(Wire::FALSE, Wire::TRUE, out, GateType::And)
            .unwrap();
        let sealed = c.seal(vec![out]).unwrap();
        let stats = sealed.stats();
        assert_eq!(stats.num_gates, 1);
        assert_eq!(stats.num_and_gates, 1);
        assert_eq!(stats.num_xor_gates, 0);
        assert_eq!(stats.num_output_bits, 1);
    }
}
