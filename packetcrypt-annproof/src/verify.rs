//! Announcement-proof verification.
//!
//! [`pcp_hash`] is the crate's entry point: from four announcement
//! hashes, the claimed count, the four claimed indexes and the block's
//! [`PacketCryptProof`], it either produces the 32-byte commitment the
//! coinbase must carry or rejects the proof.

use byteorder::{ByteOrder, LittleEndian};
use packetcrypt_types::PacketCryptProof;

use crate::error::AnnProofError;
use crate::hash::{CryptoHash, HASH_LENGTH, compress32};
use crate::tree::Tree;

/// Length of the commitment preimage: root hash padded to 48 bytes.
const COMMIT_LENGTH: usize = 48;

fn take_range(cursor: &mut &[u8]) -> Result<u64, AnnProofError> {
    if cursor.len() < 8 {
        return Err(AnnProofError::RuntProof {
            wanted: 8,
            remaining: cursor.len(),
        });
    }
    let value = LittleEndian::read_u64(&cursor[..8]);
    *cursor = &cursor[8..];
    Ok(value)
}

fn take_hash(cursor: &mut &[u8]) -> Result<CryptoHash, AnnProofError> {
    if cursor.len() < HASH_LENGTH {
        return Err(AnnProofError::RuntProof {
            wanted: HASH_LENGTH,
            remaining: cursor.len(),
        });
    }
    let mut hash = [0u8; HASH_LENGTH];
    hash.copy_from_slice(&cursor[..HASH_LENGTH]);
    *cursor = &cursor[HASH_LENGTH..];
    Ok(hash)
}

/// Check the root resolved to its terminal form and return its values.
fn resolved_root(tree: &Tree) -> Result<(CryptoHash, u64, u64, u64), AnnProofError> {
    let root = tree.node(tree.root_index());
    let shape = root.shape();
    if !(shape.computable && shape.first_entry)
        || shape.leaf
        || shape.right
        || shape.pad_entry
        || shape.pad_sibling
    {
        return Err(AnnProofError::RootShape(
            "root is not the computable first entry".to_string(),
        ));
    }
    match (root.hash(), root.start(), root.end(), root.range()) {
        (Some(hash), Some(start), Some(end), Some(range)) => Ok((hash, start, end, range)),
        _ => {
            let missing: Vec<&str> = [
                ("hash", root.hash().is_none()),
                ("start", root.start().is_none()),
                ("end", root.end().is_none()),
                ("range", root.range().is_none()),
            ]
            .iter()
            .filter(|(_, absent)| *absent)
            .map(|(what, _)| *what)
            .collect();
            Err(AnnProofError::RootShape(format!(
                "root never resolved: missing {}",
                missing.join(", ")
            )))
        }
    }
}

/// The announcement-proof commitment: the root hash in a 48-byte buffer
/// whose final 8 bytes are 0xff, compressed. Bytes 32..40 stay zero; the
/// exact layout is a consensus rule.
fn commitment(root_hash: &CryptoHash) -> CryptoHash {
    let mut buf = [0u8; COMMIT_LENGTH];
    buf[..HASH_LENGTH].copy_from_slice(root_hash);
    for byte in &mut buf[COMMIT_LENGTH - 8..] {
        *byte = 0xff;
    }
    compress32(&buf)
}

/// Verify an announcement proof and produce its commitment hash.
///
/// `ann_hashes` are the hashes of the four announcements the block
/// proves, `ann_count` the number of announcements the miner claims to
/// have committed, and `ann_indexes` the four claimed positions, each
/// reduced modulo `ann_count`. Slot zero of the tree is reserved, so
/// indexes shift up by one and the tree is built over `ann_count + 1`
/// slots.
///
/// The proof's announcement bytes are replayed into the tree in node
/// order: each node missing a derivable range consumes 8 bytes, each
/// node missing a derivable hash 32. Replay must consume the buffer
/// exactly, and the propagated values must resolve the root to the full
/// keyspace, `start == 0` and `end == range == u64::MAX`.
pub fn pcp_hash(
    ann_hashes: &[CryptoHash; 4],
    ann_count: u64,
    ann_indexes: &[u64; 4],
    proof: &PacketCryptProof,
) -> Result<CryptoHash, AnnProofError> {
    if ann_count == 0 {
        return Err(AnnProofError::AnnCountRange(0));
    }
    let slot_count = ann_count
        .checked_add(1)
        .ok_or(AnnProofError::AnnCountRange(ann_count))?;
    let mut targets = [0u64; 4];
    for (target, &raw) in targets.iter_mut().zip(ann_indexes) {
        *target = (raw % ann_count) + 1;
    }

    let mut tree = Tree::new(slot_count, &targets)?;

    for (&slot, hash) in targets.iter().zip(ann_hashes) {
        let Some(leaf) = tree.target_leaf(slot) else {
            return Err(AnnProofError::InternalInvariant(format!(
                "no leaf for target slot {slot}"
            )));
        };
        if !tree.set_hash(leaf, *hash) {
            return Err(AnnProofError::DuplicateData {
                what: "announcement hash",
                node: leaf,
            });
        }
    }

    let mut cursor = proof.ann_proof.as_slice();
    for node in 0..tree.len() {
        if tree.node(node).has_explicit_range() {
            let range = take_range(&mut cursor)?;
            if !tree.set_range(node, range) {
                return Err(AnnProofError::DuplicateData {
                    what: "range",
                    node,
                });
            }
        }
        if tree.node(node).needs_explicit_hash() {
            let hash = take_hash(&mut cursor)?;
            if !tree.set_hash(node, hash) {
                return Err(AnnProofError::DuplicateData { what: "hash", node });
            }
        }
    }
    if !cursor.is_empty() {
        return Err(AnnProofError::TrailingProofBytes {
            remaining: cursor.len(),
        });
    }

    let (root_hash, start, end, range) = resolved_root(&tree)?;
    if start != 0 || end != u64::MAX || range != u64::MAX {
        return Err(AnnProofError::RootRange { start, end, range });
    }
    Ok(commitment(&root_hash))
}
