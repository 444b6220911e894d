use thiserror::Error;

/// Errors raised while building or solving a miter between two circuits.
#[derive(Debug, Error)]
pub enum EquivError {
    #[error("circuits have different input widths: {a} vs {b} bits")]
    InputArityMismatch { a: u64, b: u64 },

    #[error("circuits have different output widths: {a} vs {b} bits")]
    OutputArityMismatch { a: usize, b: usize },

    #[error("SAT solver error: {0}")]
    Solver(String),
}

pub type EquivResult<T> = Result<T, EquivError>;
