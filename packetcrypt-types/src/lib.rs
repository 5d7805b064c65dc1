//! Wire-level types for PacketCrypt proofs.
//!
//! Two structures cross the wire: the fixed 1024-byte [`PacketCryptAnn`]
//! announcement and the [`PacketCryptProof`] a block carries to prove that
//! four specific announcements are committed, without duplication, in the
//! claimed announcement set.
//!
//! The proof travels as a little-endian type-length-value stream; all
//! framing is hand-rolled because the layout is a consensus rule, not an
//! implementation detail.

#![warn(missing_docs)]

mod ann;
mod error;
mod proof;

pub use ann::{ANN_CONTENT_HASH_RANGE, ANN_MERKLE_SLOT_RANGE, ANN_SIZE, PacketCryptAnn};
pub use error::WireError;
pub use proof::{
    CONTENT_PROOF_TYPE, END_TYPE, PCP_TYPE, PacketCryptProof, SIGNATURES_TYPE, VERSION_TYPE,
};
