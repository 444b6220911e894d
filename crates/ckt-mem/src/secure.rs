//! The Secure tier: a Merkle-authenticated address-indexed binary tree
//! whose root lives in circuit state. Every access is a witness-checking
//! operation, not a lookup — the actual memory contents never live in the
//! circuit, only the 256-bit root and whatever sibling hashes the caller
//! supplies for this one access.
//!
//! There is no runtime error for a bad witness: a dishonest value or a
//! stale authentication path makes `auth_ok` evaluate to false, which the
//! caller is responsible for wiring into a public output the verifier
//! requires to be true. The compiler's job stops at emitting that check.

use ckt_arith::{and_reduce, mux_bus, not, xor};
use ckt_circuit::{Circuit, CktResult, Wire};
use ckt_hash::{sha3_256, DIGEST_BITS};

use crate::banked::WORD_BITS;
use crate::error::{MemError, MemResult};

pub struct SecureMemory {
    depth: usize,
    root: Vec<Wire>,
}

impl SecureMemory {
    /// `root` is the 256-bit initial Merkle root; `depth` is the tree
    /// depth, i.e. `log2` of the number of addressable words.
    pub fn new(root: Vec<Wire>, depth: usize) -> MemResult<Self> {
        if root.len() != DIGEST_BITS {
            return Err(MemError::WordWidthMismatch {
                index: 0,
                got: root.len(),
                expected: DIGEST_BITS,
            });
        }
        Ok(Self { depth, root })
    }

    /// The current 256-bit root. For a write access this is the *new*
    /// root produced by [`Self::access`], ready to route to the next
    /// instruction's memory stage or to the circuit's output layout.
    pub fn root(&self) -> &[Wire] {
        &self.root
    }

    fn recompute_root(
        &self,
        c: &mut Circuit,
        addr: &[Wire],
        leaf_value: &[Wire],
        auth_path: &[Vec<Wire>],
    ) -> CktResult<Vec<Wire>> {
        let mut node = sha3_256(c, leaf_value)?;
        for (level, sibling) in auth_path.iter().enumerate() {
            let direction = addr[2 + level];
            let left = mux_bus(c, direction, &node, sibling)?;
            let right = mux_bus(c, direction, sibling, &node)?;
            let mut concat = left;
            concat.extend(right);
            node = sha3_256(c, &concat)?;
        }
        Ok(node)
    }

    /// Authenticates `claimed_value` against the current root using
    /// `auth_path`, then (if `write_enable`) replaces the leaf with
    /// `write_data` and advances the stored root.
    ///
    /// Returns `(read_data, auth_ok)`: `read_data` is `claimed_value`
    /// (authenticated to actually be the value stored at `addr`), and
    /// `auth_ok` is true only if the supplied witness reproduces the
    /// current root.
    pub fn access(
        &mut self,
        c: &mut Circuit,
        addr: &[Wire],
        claimed_value: &[Wire],
        write_data: &[Wire],
        write_enable: Wire,
        auth_path: &[Vec<Wire>],
    ) -> CktResult<(Vec<Wire>, Wire)> {
        assert_eq!(claimed_value.len(), WORD_BITS, "secure memory word width mismatch");
        assert_eq!(write_data.len(), WORD_BITS, "secure memory word width mismatch");
        assert_eq!(auth_path.len(), self.depth, "secure memory authentication path depth mismatch");

        let recomputed = self.recompute_root(c, addr, claimed_value, auth_path)?;
        let mut bitwise_eq = Vec::with_capacity(DIGEST_BITS);
        for i in 0..DIGEST_BITS {
            let diff = xor(c, recomputed[i], self.root[i])?;
            bitwise_eq.push(not(c, diff)?);
        }
        let auth_ok = and_reduce(c, &bitwise_eq)?;

        let new_root = self.recompute_root(c, addr, write_data, auth_path)?;
        self.root = mux_bus(c, write_enable, &self.root, &new_root)?;

        log::debug!("ckt-mem: secure access at tree depth {}", self.depth);

        Ok((claimed_value.to_vec(), auth_ok))
    }
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
    fn all_zero_witness_does_not_trivially_authenticate() {
        let depth = 2;
        let addr_width = 32;
        let mut c = Circuit::create(
            Limits::default(),
            2 + (addr_width + WORD_BITS + WORD_BITS + 1 + depth * DIGEST_BITS) as u64,
        )
        .unwrap();

        let addr = wires(addr_width, 2);
        let mut offset = 2 + addr_width as u32;
        let claimed = wires(WORD_BITS, offset);
        offset += WORD_BITS as u32;
        let write_data = wires(WORD_BITS, offset);
        offset += WORD_BITS as u32;
        let write_enable = Wire::from(offset);
        offset += 1;
        let auth_path: Vec<Vec<Wire>> = (0..depth)
            .map(|i| wires(DIGEST_BITS, offset + (i * DIGEST_BITS) as u32))
            .collect();

        let mut mem = SecureMemory::new(vec![Wire::FALSE; DIGEST_BITS], depth).unwrap();
        let (_, write_ok) = mem
            .access(&mut c, &addr, &claimed, &write_data, write_enable, &auth_path)
            .unwrap();
        let sealed = c.seal(vec![write_ok]).unwrap();

        let inputs = pack_inputs(&[
            &bits_of_u64(0, addr_width),
            &bits_of_u64(0, WORD_BITS), // claimed value matches the all-zero root's leaf guess
            &bits_of_u64(0, WORD_BITS),
            &[false], // not writing; purely checking authentication of the seed root
            &vec![false; depth * DIGEST_BITS],
        ]);
        let out = evaluate_bools(&sealed, &inputs).unwrap();
        // An all-zero claimed leaf and all-zero path will only authenticate
        // against the all-zero root if hashing all-zero bits happens to
        // produce all-zero output, which it does not for Keccak — so this
        // must evaluate to false, confirming `auth_ok` really does reject
        // a witness that doesn't reproduce the stored root.
        assert_eq!(out, vec![false]);
    }

    #[test]
    fn tampering_with_the_root_is_rejected() {
        let depth = 1;
        let addr_width = 32;
        let mut c = Circuit::create(
            Limits::default(),
            2 + (addr_width + WORD_BITS + WORD_BITS + 1 + depth * DIGEST_BITS) as u64,
        )
        .unwrap();

        let addr = wires(addr_width, 2);
        let mut offset = 2 + addr_width as u32;
        let claimed = wires(WORD_BITS, offset);
        offset += WORD_BITS as u32;
        let write_data = wires(WORD_BITS, offset);
        offset += WORD_BITS as u32;
        let write_enable = Wire::from(offset);
        offset += 1;
        let auth_path: Vec<Vec<Wire>> = (0..depth)
            .map(|i| wires(DIGEST_BITS, offset + (i * DIGEST_BITS) as u32))
            .collect();

        // A root that cannot possibly equal any real SHA3-256 output: all
        // ones is not infeasible in principle, but jointly with an
        // all-zero leaf and path it is certain to mismatch.
        let mut mem = SecureMemory::new(vec![Wire::TRUE; DIGEST_BITS], depth).unwrap();
        let (_, ok) = mem
            .access(&mut c, &addr, &claimed, &write_data, write_enable, &auth_path)
            .unwrap();
        let sealed = c.seal(vec![ok]).unwrap();

        let inputs = pack_inputs(&[
            &bits_of_u64(0, addr_width),
            &bits_of_u64(0, WORD_BITS),
            &bits_of_u64(0, WORD_BITS),
            &[false],
            &vec![false; depth * DIGEST_BITS],
        ]);
        let out = evaluate_bools(&sealed, &inputs).unwrap();
        assert_eq!(out, vec![false]);
    }

    #[test]
    fn write_then_read_with_the_same_path_authenticates() {
        // Build the circuit so that the *second* access's root input is
        // wired directly to the *first* access's `SecureMemory::root()`,
        // which is exactly how a multi-instruction program would chain
        // secure memory across cycles. With the same address and
        // authentication path used for both the write and the read, and
        // `claimed_value` on the read set equal to the just-written value,
        // authentication must succeed.
        let depth = 1;
        let addr_width = 32;
        let mut c = Circuit::create(
            Limits::default(),
            2 + (addr_width + WORD_BITS + WORD_BITS + 1 + depth * DIGEST_BITS) as u64,
        )
        .unwrap();

        let addr = wires(addr_width, 2);
        let mut offset = 2 + addr_width as u32;
        let write_data = wires(WORD_BITS, offset);
        offset += WORD_BITS as u32;
        let write_enable = Wire::from(offset);
        offset += 1;
        let auth_path: Vec<Vec<Wire>> = (0..depth)
            .map(|i| wires(DIGEST_BITS, offset + (i * DIGEST_BITS) as u32))
            .collect();

        let mut mem = SecureMemory::new(vec![Wire::FALSE; DIGEST_BITS], depth).unwrap();
        // First access: write `write_data` at `addr`. Its own auth check is
        // irrelevant here (we don't assert on it); what matters is the
        // resulting root.
        let (_, _write_auth_ok) = mem
            .access(&mut c, &addr, &write_data, &write_data, write_enable, &auth_path)
            .unwrap();

        // Second access: read back using the write's value as the claim.
        let (read_data, read_ok) = mem
            .access(&mut c, &addr, &write_data, &write_data, Wire::FALSE, &auth_path)
            .unwrap();

        let mut outputs = read_data;
        outputs.push(read_ok);
        let sealed = c.seal(outputs).unwrap();

        let inputs = pack_inputs(&[
            &bits_of_u64(0, addr_width),
            &bits_of_u64(0xABCD_1234, WORD_BITS),
            &[true],
            &vec![false; depth * DIGEST_BITS],
        ]);
        let out = evaluate_bools(&sealed, &inputs).unwrap();
        let (read_bits, ok_bits) = out.split_at(WORD_BITS);
        assert_eq!(u64_of_bits(read_bits), 0xABCD_1234);
        assert_eq!(ok_bits, [true]);
    }
}
