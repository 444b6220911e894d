use thiserror::Error;

/// Errors raised while configuring a memory tier. Access itself never fails
/// at circuit-build time — an illegal access becomes an unsatisfiable
/// constraint, not a Rust error (see the crate-level docs).
#[derive(Debug, Error)]
pub enum MemError {
    /// More initial words were supplied than the tier's fixed capacity.
    #[error("memory tier holds at most {capacity} words, got {got}")]
    TooManyWords { capacity: usize, got: usize },

    /// An initial word's bus width did not match the configured word width.
    #[error("word {index} has {got} bits, expected {expected}")]
    WordWidthMismatch {
        index: usize,
        got: usize,
        expected: usize,
    },

    /// The Merkle tree depth implied by the address space doesn't fit the
    /// supplied authentication path.
    #[error("authentication path has {got} levels, expected {expected}")]
    PathDepthMismatch { got: usize, expected: usize },
}

pub type MemResult<T> = Result<T, MemError>;
