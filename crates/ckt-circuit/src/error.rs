use thiserror::Error;

/// Errors raised while building or sealing a circuit.
///
/// Mirrors the abstract error taxonomy: `BudgetExceeded` and `ConfigError`
/// are always fatal for the current compilation; `InvariantViolation`
/// indicates a compiler defect and should abort with diagnostic rather than
/// propagate further up.
#[derive(Debug, Error)]
pub enum CktError {
    /// Input/output bit count or gate count exceeded its configured budget.
    #[error("budget exceeded: {budget} limit is {limit}, requested {requested}")]
    BudgetExceeded {
        budget: &'static str,
        limit: u64,
        requested: u64,
    },

    /// Internal invariant broken (e.g. a gate referencing an undefined wire).
    /// Indicates a compiler defect, not a malformed program.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    /// Parameters are nonsensical at construction time (e.g. memory size too
    /// large to fit the I/O budget).
    #[error("config error: {0}")]
    ConfigError(String),

    /// The text circuit format was malformed or truncated.
    #[error("malformed circuit file: {0}")]
    MalformedFile(String),

    /// Underlying I/O failure while reading or writing a circuit file.
    #[error("circuit I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type CktResult<T> = Result<T, CktError>;
