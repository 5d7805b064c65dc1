//! Deterministic interpreter for RandHash programs.
//!
//! RandHash is the program-execution half of the PacketCrypt proof of
//! work: a generated sequence of 32-bit instruction words is run against a
//! caller-owned state buffer, and the transformed state feeds back into
//! the surrounding hashing cycle. Verifiability demands that every
//! implementation execute programs bit-for-bit identically, so the
//! instruction semantics here (lane-packed arithmetic, scope folding,
//! memory indexing) are all exact-width, wraparound operations with no
//! platform dependence.
//!
//! The only entry point is [`interpret`]. Programs come from the paired
//! generator (not part of this crate), but since they can also arrive
//! from untrusted peers the interpreter checks opcodes, register indexes
//! and the instruction budget rather than trusting the generator.

#![warn(missing_docs)]

mod decode;
mod error;
mod interpret;
mod opcode;
mod ops;


pub use error::RandHashError;
pub use interpret::interpret;
pub use opcode::OpCode;

/// Words in the read-only item memory an interpretation reads from.
pub const MEMORY_WORDS: usize = 256;

/// Words in each half of the state buffer; one half is input and the
/// other output, swapping every cycle.
pub const INOUT_WORDS: usize = 256;

/// Fewest instructions a conforming program may execute in one cycle.
pub const MIN_OPS: u32 = 32;

/// Most instructions a program may execute in one cycle.
pub const MAX_OPS: u32 = 20_000;
