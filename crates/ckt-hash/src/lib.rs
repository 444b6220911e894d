//! Gate-level Keccak-f\[1600\] permutation and the SHA3-256 sponge built on
//! top of it, for authenticating Secure-tier memory accesses and anywhere
//! else a collision-resistant hash needs to live inside the circuit.

mod gate_helpers;
mod keccak;
pub mod sha3;

pub use sha3::{sha3_256, DIGEST_BITS};
