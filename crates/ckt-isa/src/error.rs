use thiserror::Error;

use crate::decode::DecodeError;
use ckt_circuit::CktError;
use ckt_mem::MemError;
use ckt_state::LayoutError;

#[derive(Debug, Error)]
pub enum IsaError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Circuit(#[from] CktError),

    #[error(transparent)]
    Memory(#[from] MemError),

    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error("memory size must be a multiple of 4 bytes for word-addressed tiers, got {0}")]
    UnalignedMemorySize(u64),

    #[error("secure tier needs at least 32 bytes of memory to hold the Merkle root, got {0}")]
    SecureMemoryTooSmall(u64),
}

pub type IsaResult<T> = Result<T, IsaError>;
