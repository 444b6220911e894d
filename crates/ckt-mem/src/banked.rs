//! The Ultra and Simple tiers: both are a fixed bank of words selected by
//! one-hot decoding the low address bits, with zero cryptographic
//! guarantees. They differ only in capacity (3 vs 8 decoded bits), so both
//! are instances of the same generic implementation.

use ckt_arith::{and, mux_bus, not, or};
use ckt_circuit::{Circuit, CktResult, Wire};

use crate::error::{MemError, MemResult};
use crate::MemoryPort;

pub const WORD_BITS: usize = 32;

/// A flat bank of `2^addr_bits` words, read and written by one-hot decoding
/// the low `addr_bits` bits of the byte address (word-addressed: bit 0 and
/// 1 of the byte address are ignored, matching 4-byte-aligned RV32 words).
pub struct BankedMemory {
    addr_bits: usize,
    words: Vec<Vec<Wire>>,
}

impl BankedMemory {
    pub fn new(addr_bits: usize, initial_words: Vec<Vec<Wire>>) -> MemResult<Self> {
        let capacity = 1usize << addr_bits;
        if initial_words.len() > capacity {
            return Err(MemError::TooManyWords {
                capacity,
                got: initial_words.len(),
            });
        }
        for (index, word) in initial_words.iter().enumerate() {
            if word.len() != WORD_BITS {
                return Err(MemError::WordWidthMismatch {
                    index,
                    got: word.len(),
                    expected: WORD_BITS,
                });
            }
        }
        let mut words = initial_words;
        words.resize(capacity, vec![Wire::FALSE; WORD_BITS]);
        Ok(Self { addr_bits, words })
    }

    /// Up to 8 words, selected by 3 decoded address bits. Used only for
    /// demos and small differential tests.
    pub fn ultra(initial_words: Vec<Vec<Wire>>) -> MemResult<Self> {
        Self::new(3, initial_words)
    }

    /// Up to 256 words, selected by 8 decoded address bits. No
    /// authentication.
    pub fn simple(initial_words: Vec<Vec<Wire>>) -> MemResult<Self> {
        Self::new(8, initial_words)
    }

    /// Current contents of every bank, in index order — used by callers
    /// that need to route final memory state to circuit outputs.
    pub fn words(&self) -> &[Vec<Wire>] {
        &self.words
    }

    fn one_hot(&self, c: &mut Circuit, addr: &[Wire]) -> CktResult<Vec<Wire>> {
        let select_bits = &addr[2..2 + self.addr_bits];
        let capacity = self.words.len();
        let mut sel = Vec::with_capacity(capacity);
        for index in 0..capacity {
            let mut term = Wire::TRUE;
            for (bit, &addr_bit) in select_bits.iter().enumerate() {
                let want = (index >> bit) & 1 == 1;
                let matched = if want { addr_bit } else { not(c, addr_bit)? };
                term = and(c, term, matched)?;
            }
            sel.push(term);
        }
        Ok(sel)
    }
}

impl MemoryPort for BankedMemory {
    fn access(
        &mut self,
        c: &mut Circuit,
        addr: &[Wire],
        write_data: &[Wire],
        write_enable: Wire,
    ) -> CktResult<Vec<Wire>> {
        let sel = self.one_hot(c, addr)?;

        let mut read_data = vec![Wire::FALSE; WORD_BITS];
        for bit in 0..WORD_BITS {
            let mut acc = Wire::FALSE;
            for (index, word) in self.words.iter().enumerate() {
                let masked = and(c, sel[index], word[bit])?;
                acc = or(c, acc, masked)?;
            }
            read_data[bit] = acc;
        }

        for (index, word) in self.words.iter_mut().enumerate() {
            let write_sel = and(c, sel[index], write_enable)?;
            *word = mux_bus(c, write_sel, word, write_data)?;
        }

        log::debug!(
            "ckt-mem: banked access over {} words ({} select bits)",
            self.words.len(),
            self.addr_bits
        );

        Ok(read_data)
    }
}
