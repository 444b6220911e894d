//! Byte/halfword/word loads and stores layered over a [`MemoryPort`]'s
//! fixed 32-bit word granularity, plus the witness bookkeeping Secure-tier
//! memory needs that Ultra/Simple don't.

use ckt_arith::{mux, shift_left_logical, shift_right_logical};
use ckt_circuit::{Circuit, CktResult, Wire};
use ckt_mem::{BankedMemory, MemoryPort, SecureMemory, WORD_BITS};

use crate::decode::{LoadOp, StoreOp};

/// The authentication witness one Secure-tier access consumes: the value
/// claimed to currently live at the address, and the sibling hash at each
/// tree level. Both are dedicated input wires supplied by the host (spec's
/// "Merkle authentication-path input wiring from the host" collaborator) —
/// this compiler only wires them into the circuit, it never chooses them.
pub struct SecureWitness {
    pub claimed_value: Vec<Wire>,
    pub auth_path: Vec<Vec<Wire>>,
}

/// Hands out a fresh, non-overlapping [`SecureWitness`] input range for
/// each Secure-tier access, in program order. These wires live just past
/// the fixed machine-state input layout.
pub struct SecureWitnessCursor {
    next_wire: u32,
    depth: usize,
}

impl SecureWitnessCursor {
    pub fn new(start_wire: u32, depth: usize) -> Self {
        Self { next_wire: start_wire, depth }
    }

    /// Total input bits one access's witness consumes.
    pub fn witness_bits(depth: usize) -> usize {
        WORD_BITS + depth * ckt_hash::DIGEST_BITS
    }

    fn take(&mut self, n: usize) -> Vec<Wire> {
        let v: Vec<Wire> = (0..n).map(|i| Wire::from(self.next_wire + i as u32)).collect();
        self.next_wire += n as u32;
        v
    }

    pub fn next_witness(&mut self) -> SecureWitness {
        let claimed_value = self.take(WORD_BITS);
        let auth_path = (0..self.depth).map(|_| self.take(ckt_hash::DIGEST_BITS)).collect();
        SecureWitness { claimed_value, auth_path }
    }
}

pub enum MemoryTier {
    Ultra(BankedMemory),
    Simple(BankedMemory),
    Secure(SecureMemory),
}

impl MemoryTier {
    /// Reads the authenticated-OK wire accumulated by the most recent
    /// Secure access, if this tier is Secure. Ultra/Simple have no such
    /// concept and always authenticate trivially (`Wire::TRUE`).
    fn raw_access(
        &mut self,
        c: &mut Circuit,
        addr: &[Wire],
        write_data: &[Wire],
        write_enable: Wire,
        witness: Option<&SecureWitness>,
    ) -> CktResult<(Vec<Wire>, Wire)> {
        match self {
            MemoryTier::Ultra(m) | MemoryTier::Simple(m) => {
                Ok((m.access(c, addr, write_data, write_enable)?, Wire::TRUE))
            }
            MemoryTier::Secure(m) => {
                let witness = witness.expect("secure tier access requires a witness");
                m.access(
                    c,
                    addr,
                    &witness.claimed_value,
                    write_data,
                    write_enable,
                    &witness.auth_path,
                )
            }
        }
    }
}

fn byte_shift_amount(addr: &[Wire]) -> Vec<Wire> {
    vec![Wire::FALSE, Wire::FALSE, Wire::FALSE, addr[0], addr[1]]
}

fn sign_extend_from(bits: &[Wire], width: usize) -> Vec<Wire> {
    let sign = bits[width - 1];
    let mut out = bits[..width].to_vec();
    out.resize(WORD_BITS, sign);
    out
}

fn zero_extend_from(bits: &[Wire], width: usize) -> Vec<Wire> {
    let mut out = bits[..width].to_vec();
    out.resize(WORD_BITS, Wire::FALSE);
    out
}

/// Emits a load: fetches the containing word, then selects and
/// sign/zero-extends the addressed byte or halfword lane. Returns
/// `(value, auth_ok)`.
pub(crate) fn emit_load(
    c: &mut Circuit,
    memory: &mut MemoryTier,
    op: LoadOp,
    addr: &[Wire],
    witness: Option<&SecureWitness>,
) -> CktResult<(Vec<Wire>, Wire)> {
    let (word, auth_ok) = memory.raw_access(c, addr, &[Wire::FALSE; WORD_BITS], Wire::FALSE, witness)?;
    let amount = byte_shift_amount(addr);
    let shifted = shift_right_logical(c, &word, &amount)?;

    let value = match op {
        LoadOp::Lw => shifted,
        LoadOp::Lb => sign_extend_from(&shifted, 8),
        LoadOp::Lbu => zero_extend_from(&shifted, 8),
        LoadOp::Lh => sign_extend_from(&shifted, 16),
        LoadOp::Lhu => zero_extend_from(&shifted, 16),
    };
    Ok((value, auth_ok))
}

/// Emits a store: for sub-word widths, reads the containing word, replaces
/// only the addressed lane, and writes the merged word back. Returns
/// `auth_ok`.
pub(crate) fn emit_store(
    c: &mut Circuit,
    memory: &mut MemoryTier,
    op: StoreOp,
    addr: &[Wire],
    value: &[Wire],
    witness: Option<&SecureWitness>,
) -> CktResult<Wire> {
    if let StoreOp::Sw = op {
        let (_, auth_ok) = memory.raw_access(c, addr, value, Wire::TRUE, witness)?;
        return Ok(auth_ok);
    }

    let lane_bits = match op {
        StoreOp::Sb => 8,
        StoreOp::Sh => 16,
        StoreOp::Sw => unreachable!(),
    };
    let amount = byte_shift_amount(addr);

    let (old_word, read_auth_ok) =
        memory.raw_access(c, addr, &[Wire::FALSE; WORD_BITS], Wire::FALSE, witness)?;

    let mut padded_value = value[..lane_bits].to_vec();
    padded_value.resize(WORD_BITS, Wire::FALSE);
    let shifted_value = shift_left_logical(c, &padded_value, &amount)?;

    let mut lane_mask = vec![Wire::TRUE; lane_bits];
    lane_mask.resize(WORD_BITS, Wire::FALSE);
    let shifted_mask = shift_left_logical(c, &lane_mask, &amount)?;

    let mut merged = Vec::with_capacity(WORD_BITS);
    for i in 0..WORD_BITS {
        merged.push(mux(c, shifted_mask[i], old_word[i], shifted_value[i])?);
    }

    let (_, write_auth_ok) = memory.raw_access(c, addr, &merged, Wire::TRUE, witness)?;
    let _ = read_auth_ok; // the write access re-authenticates the same witness
    Ok(write_auth_ok)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ckt_circuit::Limits;
    use ckt_eval::{bits_of_u64, evaluate_bools, pack_inputs, u64_of_bits};

    fn wires(width: usize, offset: u32) -> Vec<Wire> {
        (0..width).map(|i| Wire::from(offset + i as u32)).collect()
    }

    #[test]
    fn store_byte_then_load_byte_round_trips_without_disturbing_neighbors() {
        let addr_width = 32;
        let mut c = Circuit::create(Limits::default(), 2 + (addr_width + WORD_BITS) as u64).unwrap();
        let addr = wires(addr_width, 2);
        let value = wires(WORD_BITS, 2 + addr_width as u32);

        let mut memory = MemoryTier::Ultra(BankedMemory::ultra(vec![]).unwrap());
        let sb_ok = emit_store(&mut c, &mut memory, StoreOp::Sb, &addr, &value, None).unwrap();
        let (lb, lb_ok) = emit_load(&mut c, &mut memory, LoadOp::Lbu, &addr, None).unwrap();

        let mut outputs = lb;
        outputs.push(sb_ok);
        outputs.push(lb_ok);
        let sealed = c.seal(outputs).unwrap();

        // Address 1 (byte offset 1 within word 0); store 0xAB; load back unsigned byte.
        let inputs = pack_inputs(&[&bits_of_u64(1, addr_width), &bits_of_u64(0xAB, WORD_BITS)]);
        let out = evaluate_bools(&sealed, &inputs).unwrap();
        let (value_bits, ok_bits) = out.split_at(WORD_BITS);
        assert_eq!(u64_of_bits(value_bits), 0xAB);
        assert_eq!(ok_bits, [true, true]);
    }

    #[test]
    fn load_byte_sign_extends() {
        let addr_width = 32;
        let mut c = Circuit::create(Limits::default(), 2 + (addr_width + WORD_BITS) as u64).unwrap();
        let addr = wires(addr_width, 2);
        let value = wires(WORD_BITS, 2 + addr_width as u32);

        let mut memory = MemoryTier::Ultra(BankedMemory::ultra(vec![]).unwrap());
        let _ = emit_store(&mut c, &mut memory, StoreOp::Sb, &addr, &value, None).unwrap();
        let (lb, _) = emit_load(&mut c, &mut memory, LoadOp::Lb, &addr, None).unwrap();
        let sealed = c.seal(lb).unwrap();

        let inputs = pack_inputs(&[&bits_of_u64(0, addr_width), &bits_of_u64(0xFF, WORD_BITS)]);
        let out = evaluate_bools(&sealed, &inputs).unwrap();
        assert_eq!(u64_of_bits(&out) as u32 as i32, -1);
    }
}
