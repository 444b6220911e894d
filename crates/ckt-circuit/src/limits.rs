/// Compile-time-chosen budgets enforced by [`crate::Circuit`].
///
/// Passed explicitly to `Circuit::create` rather than read from global state.
#[derive(Debug, Clone, Copy)]
pub struct Limits {
    /// Maximum total input *or* output bits, each checked independently.
    pub max_io_bits: u64,
    /// Maximum total gates in one circuit.
    pub max_gates: u64,
}

/// 10 MiB of input bits / output bits.
const TEN_MIB_BITS: u64 = 10 * 1024 * 1024 * 8;

/// Generous default gate budget; large enough for SHA3-256 (~200k gates)
/// chained many times over, small enough to catch runaway generation bugs.
const DEFAULT_MAX_GATES: u64 = 64 * 1024 * 1024;

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_io_bits: TEN_MIB_BITS,
            max_gates: DEFAULT_MAX_GATES,
        }
    }
}
