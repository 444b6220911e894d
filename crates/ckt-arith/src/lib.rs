//! Gate-level arithmetic: adders, a subtractor, comparators, shifters, a
//! Booth multiplier and a restoring divider, all built from the two native
//! gates AND and XOR that [`ckt_circuit::Circuit`] exposes.
//!
//! Every primitive here operates on little-endian wire buses (index 0 is
//! the least significant bit) and returns the output bus for the caller to
//! wire into the next stage — nothing here owns or seals a [`Circuit`].

pub mod adder;
pub mod compare;
pub mod div;
pub mod gates;
pub mod mul;
pub mod shift;

pub use adder::{kogge_stone_add, kogge_stone_add_dedup, ripple_carry_add, subtract, subtract_dedup};
pub use compare::{
    eq, eq_dedup, ge_signed, ge_unsigned, lt_signed, lt_signed_dedup, lt_unsigned, lt_unsigned_dedup,
};
pub use div::{divide, divide_dedup};
pub use gates::{
    and, and_dedup, and_reduce, and_reduce_dedup, mux, mux_bus, mux_bus_dedup, mux_dedup, not, not_dedup,
    or, or_dedup, xor, xor_dedup,
};
pub use mul::{multiply, multiply_dedup};
pub use shift::{
    barrel_shift, barrel_shift_dedup, shift_left_const, shift_left_logical, shift_left_logical_dedup,
    shift_right_arithmetic, shift_right_arithmetic_const, shift_right_arithmetic_dedup,
    shift_right_logical, shift_right_logical_const, shift_right_logical_dedup, ShiftDir,
};
