//! PacketCrypt announcement proofs.
//!
//! A PacketCrypt block commits to a set of announcements through a Merkle
//! range tree: leaves are announcement hashes, every node covers the
//! keyspace range `[start, end]` named by the first eight bytes of those
//! hashes, and a parent hashes its children together with their bounds:
//!
//! `hash = blake3(l.hash || l.start || l.end || r.hash || r.start || r.end)`
//!
//! Sibling ranges must be contiguous and the root must cover the whole
//! 64-bit keyspace, so no announcement can be counted twice without the
//! arithmetic breaking somewhere along its path.
//!
//! [`pcp_hash`] is the verification entry point: it rebuilds the tree
//! shape for the four announcements a block is challenged on, replays the
//! proof's disclosure bytes into it, and produces the commitment hash the
//! coinbase must carry.

#![warn(missing_docs)]

mod error;
pub(crate) mod hash;
pub(crate) mod tree;
mod verify;

#[cfg(test)]
pub(crate) mod test_utils;
#[cfg(test)]
mod tests;

pub use error::AnnProofError;
pub use hash::{CryptoHash, HASH_LENGTH};
pub use verify::pcp_hash;
