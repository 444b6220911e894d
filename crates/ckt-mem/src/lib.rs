//! Three interchangeable memory tiers behind one `access` contract: Ultra
//! and Simple trade authentication for gate count, Secure pays in gates for
//! a Merkle-authenticated root so a dishonest memory value makes the
//! circuit unsatisfiable rather than silently wrong.
//!
//! Every tier consumes a 32-bit byte address, a 32-bit write value, and a
//! single write-enable wire, and returns the 32-bit value read — a write
//! reads back the old value, matching a single-port RAM.

mod banked;
mod error;
mod secure;

use ckt_circuit::{Circuit, CktResult, Wire};

pub use banked::{BankedMemory, WORD_BITS};
pub use error::{MemError, MemResult};
pub use secure::SecureMemory;

/// Common contract implemented by every memory tier.
pub trait MemoryPort {
    /// Performs one read, or one write when `write_enable` is true.
    /// Returns the 32-bit value read *before* the write takes effect,
    /// mirroring single-port RAM semantics.
    fn access(
        &mut self,
        c: &mut Circuit,
        addr: &[Wire],
        write_data: &[Wire],
        write_enable: Wire,
    ) -> CktResult<Vec<Wire>>;
}
