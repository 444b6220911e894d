//! The SHA3-256 sponge built on [`keccak_f1600`]: rate 1088 bits, capacity
//! 512 bits, `pad10*1` multi-rate padding with the SHA3 domain suffix `01`.

use ckt_circuit::{Circuit, CktResult, Wire};

use crate::keccak::keccak_f1600;

const RATE_BITS: usize = 1088;
const STATE_BITS: usize = 1600;
pub const DIGEST_BITS: usize = 256;

/// Pads `message` (bit length need not be byte- or rate-aligned) per
/// `pad10*1`, with the SHA3 domain separation suffix `01` appended first:
/// `message || 0 || 1 || 1 || 0...0 || 1`, padded out to a multiple of
/// `RATE_BITS`. All padding bits are the universal constants, so this adds
/// no gates — only the final XOR-into-state absorption costs any.
fn pad(message: &[Wire]) -> Vec<Wire> {
    let mut v = message.to_vec();
    v.push(Wire::FALSE); // domain separation suffix, bit 0
    v.push(Wire::TRUE); // domain separation suffix, bit 1
    v.push(Wire::TRUE); // pad10*1 leading 1
    while v.len() % RATE_BITS != RATE_BITS - 1 {
        v.push(Wire::FALSE);
    }
    v.push(Wire::TRUE); // pad10*1 trailing 1
    v
}

/// Computes SHA3-256 over an arbitrary (compile-time-fixed) number of input
/// bits, least-significant bit of each byte first — matching the bit order
/// every other wire bus in this workspace uses. Returns 256 output wires.
pub fn sha3_256(c: &mut Circuit, message: &[Wire]) -> CktResult<Vec<Wire>> {
    let padded = pad(message);
    debug_assert_eq!(padded.len() % RATE_BITS, 0);

    let mut state = vec![Wire::FALSE; STATE_BITS];
    for block in padded.chunks(RATE_BITS) {
        for i in 0..RATE_BITS {
            state[i] = crate::gate_helpers::xor(c, state[i], block[i])?;
        }
        state = keccak_f1600(c, state)?;
    }

    log::debug!(
        "ckt-hash: sha3_256 absorbed {} input bits over {} block(s)",
        message.len(),
        padded.len() / RATE_BITS
    );

    Ok(state[..DIGEST_BITS].to_vec())
}
