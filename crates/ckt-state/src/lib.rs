//! The machine-state bit layout: a pure function of the memory size `N`
//! (bytes) to a set of offsets into the circuit's input/output wires.
//!
//! Bits `[0, 1]` are the universal constants; `[2, 34)` is the PC;
//! `[34, 1058)` is 32 little-endian 32-bit registers `x0..x31`; everything
//! from `[1058, 1058 + 8N)` is memory, one byte per 8 bits, little-endian
//! within each byte. Output layout is identical to input layout — the
//! compiler's job is only to route each output bit to the wire holding the
//! final value of that state element.

use thiserror::Error;

/// Offset of the PC's low bit, right after the two universal constants.
pub const PC_OFFSET: usize = 2;
/// PC is a 32-bit little-endian value.
pub const PC_BITS: usize = 32;
/// Offset of register x0's low bit.
pub const REGISTERS_OFFSET: usize = PC_OFFSET + PC_BITS;
/// 32 registers, 32 bits each.
pub const NUM_REGISTERS: usize = 32;
pub const REGISTER_BITS: usize = 32;
/// Offset of memory byte 0's low bit.
pub const MEMORY_OFFSET: usize = REGISTERS_OFFSET + NUM_REGISTERS * REGISTER_BITS;

/// The 10 MiB bound on total input (and output) bits.
pub const MAX_TOTAL_BITS: u64 = 10 * 1024 * 1024 * 8;

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("memory size {bytes} bytes exceeds the 10 MiB I/O budget ({max_bytes} bytes)")]
    MemoryTooLarge { bytes: u64, max_bytes: u64 },

    #[error("register index {0} is out of range (registers are x0..x31)")]
    RegisterOutOfRange(usize),

    #[error("byte address {addr} is out of range for a {memory_bytes}-byte memory")]
    AddressOutOfRange { addr: u64, memory_bytes: u64 },
}

pub type LayoutResult<T> = Result<T, LayoutError>;

/// The bit layout for a machine with `memory_bytes` bytes of memory.
/// Identical on the input and output side.
#[derive(Debug, Clone, Copy)]
pub struct Layout {
    memory_bytes: u64,
}

impl Layout {
    pub fn new(memory_bytes: u64) -> LayoutResult<Self> {
        let total_bits = MEMORY_OFFSET as u64 + memory_bytes * 8;
        if total_bits > MAX_TOTAL_BITS {
            return Err(LayoutError::MemoryTooLarge {
                bytes: memory_bytes,
                max_bytes: (MAX_TOTAL_BITS - MEMORY_OFFSET as u64) / 8,
            });
        }
        Ok(Self { memory_bytes })
    }

    pub fn memory_bytes(&self) -> u64 {
        self.memory_bytes
    }

    /// Total number of bits in this layout, on both the input and output
    /// side.
    pub fn total_bits(&self) -> u64 {
        MEMORY_OFFSET as u64 + self.memory_bytes * 8
    }

    /// Bit index of PC bit `i` (`i` in `0..32`, little-endian).
    pub fn pc_bit(&self, i: usize) -> usize {
        assert!(i < PC_BITS, "pc bit {i} out of range");
        PC_OFFSET + i
    }

    /// Bit index of register `r`'s bit `i`.
    pub fn register_bit(&self, r: usize, i: usize) -> LayoutResult<usize> {
        if r >= NUM_REGISTERS {
            return Err(LayoutError::RegisterOutOfRange(r));
        }
        assert!(i < REGISTER_BITS, "register bit {i} out of range");
        Ok(REGISTERS_OFFSET + r * REGISTER_BITS + i)
    }

    /// Bit index of memory byte `addr`'s bit `i`.
    pub fn memory_bit(&self, addr: u64, i: usize) -> LayoutResult<usize> {
        if addr >= self.memory_bytes {
            return Err(LayoutError::AddressOutOfRange {
                addr,
                memory_bytes: self.memory_bytes,
            });
        }
        assert!(i < 8, "memory byte bit {i} out of range");
        Ok(MEMORY_OFFSET + (addr as usize) * 8 + i)
    }
}
