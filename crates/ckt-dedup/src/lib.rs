//! A structural gate cache sitting in front of [`Circuit::add_gate`]:
//! repeated `(type, operands)` patterns return the already-allocated output
//! wire instead of emitting a duplicate gate, and five trivial patterns
//! fold to a constant or an operand without ever touching the circuit.
//!
//! Keyed on the wire-pair packed into a `u64` (operands are already
//! well-distributed integers, so hashing them is a no-op) rather than on
//! `(GateType, Wire, Wire)` directly — one cache per gate type instead of
//! one combined key saves having to fold the type into the packed integer.
//! Backed by [`indexmap::IndexMap`] so cache iteration (if ever needed for
//! diagnostics) stays insertion-ordered and therefore deterministic across
//! runs, independent of hash seeding.

use ckt_circuit::{Circuit, CktResult, GateType, Wire};
use indexmap::IndexMap;
use nohash_hasher::BuildNoHashHasher;

type PairMap = IndexMap<u64, Wire, BuildNoHashHasher<u64>>;

/// Packs an unordered wire pair into one `u64`, canonicalizing order so
/// `(a, b)` and `(b, a)` hash identically — both AND and XOR are
/// commutative.
fn pair_key(a: Wire, b: Wire) -> u64 {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    (u32::from(lo) as u64) << 32 | u32::from(hi) as u64
}

/// Folds a gate whose result is determined by the universal constants or
/// by its operands being identical, without needing a cache lookup.
fn peephole_fold(ty: GateType, a: Wire, b: Wire) -> Option<Wire> {
    match ty {
        GateType::And => {
            if a == Wire::FALSE || b == Wire::FALSE {
                Some(Wire::FALSE) // a AND 0 -> 0
            } else if a == Wire::TRUE {
                Some(b) // 1 AND b -> b
            } else if b == Wire::TRUE {
                Some(a) // a AND 1 -> a
            } else if a == b {
                Some(a) // a AND a -> a
            } else {
                None
            }
        }
        GateType::Xor => {
            if a == b {
                Some(Wire::FALSE) // a XOR a -> 0
            } else if a == Wire::FALSE {
                Some(b) // 0 XOR b -> b
            } else if b == Wire::FALSE {
                Some(a) // a XOR 0 -> a
            } else {
                None
            }
        }
    }
}

/// Deduplicating gate emitter. One instance should be threaded through an
/// entire compilation for the no-duplicate-gates guarantee to hold across
/// instructions, not just within one.
#[derive(Default)]
pub struct Dedup {
    and_cache: PairMap,
    xor_cache: PairMap,
}

impl Dedup {
    /// A fresh cache with no prior gates recorded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct gates recorded so far, one per cache entry.
    pub fn len(&self) -> usize {
        self.and_cache.len() + self.xor_cache.len()
    }

    /// Whether any gate has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.and_cache.is_empty() && self.xor_cache.is_empty()
    }

    fn cache_mut(&mut self, ty: GateType) -> &mut PairMap {
        match ty {
            GateType::And => &mut self.and_cache,
            GateType::Xor => &mut self.xor_cache,
        }
    }

    /// Emits `a <ty> b`, reusing a prior gate or a peephole fold wherever
    /// possible instead of appending a new one.
    pub fn emit(&mut self, c: &mut Circuit, ty: GateType, a: Wire, b: Wire) -> CktResult<Wire> {
        if let Some(folded) = peephole_fold(ty, a, b) {
            return Ok(folded);
        }

        let key = pair_key(a, b);
        if let Some(&existing) = self.cache_mut(ty).get(&key) {
            return Ok(existing);
        }

        let out = c.alloc_wire();
        c.add_gate(a, b, out, ty)?;
        self.cache_mut(ty).insert(key, out);
        Ok(out)
    }

    /// Convenience wrapper for [`Self::emit`] with [`GateType::And`].
    pub fn and(&mut self, c: &mut Circuit, a: Wire, b: Wire) -> CktResult<Wire> {
        self.emit(c, GateType::And, a, b)
    }

    /// Convenience wrapper for [`Self::emit`] with [`GateType::Xor`].
    pub fn xor(&mut self, c: &mut Circuit, a: Wire, b: Wire) -> CktResult<Wire> {
        self.emit(c, GateType::Xor, a, b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ckt_circuit::Limits;
    use ckt_eval::{evaluate_bools, pack_inputs};

    #[test]
    fn repeated_gate_does_not_grow_the_circuit() {
        let mut c = Circuit::create(Limits::default(), 4).unwrap();
        let mut dedup = Dedup::new();
        let a = Wire::from(2);
        let b = Wire::from(3);

        let first = dedup.and(&mut c, a, b).unwrap();
        let before = c.num_gates();
        for _ in 0..9 {
            let again = dedup.and(&mut c, a, b).unwrap();
            assert_eq!(again, first);
        }
        assert_eq!(c.num_gates(), before, "repeated gate must not add wires");
    }

    #[test]
    fn commuted_operands_hit_the_same_cache_entry() {
        let mut c = Circuit::create(Limits::default(), 4).unwrap();
        let mut dedup = Dedup::new();
        let a = Wire::from(2);
        let b = Wire::from(3);

        let ab = dedup.xor(&mut c, a, b).unwrap();
        let ba = dedup.xor(&mut c, b, a).unwrap();
        assert_eq!(ab, ba);
        assert_eq!(c.num_gates(), 1);
    }

    #[test]
    fn peepholes_fold_without_touching_the_circuit() {
        let mut c = Circuit::create(Limits::default(), 3).unwrap();
        let mut dedup = Dedup::new();
        let a = Wire::from(2);

        assert_eq!(dedup.and(&mut c, a, Wire::FALSE).unwrap(), Wire::FALSE);
        assert_eq!(dedup.and(&mut c, a, Wire::TRUE).unwrap(), a);
        assert_eq!(dedup.and(&mut c, a, a).unwrap(), a);
        assert_eq!(dedup.xor(&mut c, a, Wire::FALSE).unwrap(), a);
        assert_eq!(dedup.xor(&mut c, a, a).unwrap(), Wire::FALSE);
        assert_eq!(c.num_gates(), 0);
    }

    #[test]
    fn ten_identical_adds_cost_fewer_gates_with_dedup_enabled() {
        use ckt_isa::{compile_program, MemoryKind};
        use ckt_state::Layout;

        fn r_type(funct7: u32, rs2: u32, rs1: u32, funct3: u32, rd: u32, opcode: u32) -> u32 {
            (funct7 << 25) | (rs2 << 20) | (rs1 << 15) | (funct3 << 12) | (rd << 7) | opcode
        }

        // ADD x3, x1, x2 — the exact same instruction, repeated ten times.
        // x1/x2 are never written, so every repeat reads the identical pair
        // of wires: a correctly dedup-threaded ALU op must fully cache the
        // add after the first occurrence.
        let add_x3_x1_x2 = r_type(0, 2, 1, 0b000, 3, 0b011_0011);
        let layout = Layout::new(16).unwrap();

        let one = vec![add_x3_x1_x2];
        let single_gates = compile_program(Limits::default(), &layout, MemoryKind::Ultra, &one, 0, false)
            .unwrap()
            .gates
            .len();

        let ten: Vec<u32> = std::iter::repeat(add_x3_x1_x2).take(10).collect();
        let ten_nodedup = compile_program(Limits::default(), &layout, MemoryKind::Ultra, &ten, 0, false)
            .unwrap()
            .gates
            .len();
        let ten_dedup = compile_program(Limits::default(), &layout, MemoryKind::Ultra, &ten, 0, true)
            .unwrap()
            .gates
            .len();

        // Every instruction also emits its own PC+4 increment, which is
        // outside the dedup cache's scope (each instruction's PC differs, so
        // there's nothing to share there) — that's real, not-reusable work
        // present in both runs. The only difference `use_dedup` can make is
        // on the nine repeated ADD computations themselves, so the saving
        // must be strictly positive but can't reach the full 9x a single
        // instruction's cost.
        assert!(
            ten_dedup < ten_nodedup,
            "compiling the same ADD ten times with dedup enabled ({ten_dedup} gates) must cost fewer \
             gates than without dedup ({ten_nodedup} gates)"
        );

        let marginal_nodedup = ten_nodedup.saturating_sub(single_gates);
        let savings = ten_nodedup - ten_dedup;
        assert!(
            savings * 4 > marginal_nodedup,
            "dedup should reclaim a meaningful share of the 9 repeated instructions' marginal cost \
             (saved {savings} gates out of a marginal {marginal_nodedup})"
        );
    }
}
