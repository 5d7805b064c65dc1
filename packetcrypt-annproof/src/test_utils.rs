//! Prover-side machinery for tests: the full conceptual tree over every
//! announcement slot, and proof serialization against it.
//!
//! The emitter re-derives the disclosure schedule from scratch rather
//! than asking [`crate::tree`], so a schedule bug on either side shows
//! up as a verification failure instead of cancelling out.

use byteorder::{ByteOrder, LittleEndian};

use crate::hash::{CryptoHash, HASH_LENGTH, compress32, parent_hash};
use crate::tree::log2_ceil;

/// A fully known node: hash plus resolved bounds.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Entry {
    pub hash: CryptoHash,
    pub start: u64,
    pub end: u64,
}

impl Entry {
    fn pad() -> Self {
        Self {
            hash: [0xff; HASH_LENGTH],
            start: u64::MAX,
            end: u64::MAX,
        }
    }
}

/// The complete tree a prover holds, every slot resolved.
pub(crate) struct IdealTree {
    /// `levels[depth][index]`; depth 0 is the leaves.
    levels: Vec<Vec<Entry>>,
    slot_count: u64,
}

impl IdealTree {
    /// Build the full tree. `leaf_hashes[slot]` covers every slot
    /// including the reserved zero slot; slot zero's first eight bytes
    /// must be zero or proofs against the tree will not verify.
    pub(crate) fn new(leaf_hashes: &[CryptoHash]) -> Self {
        let slot_count = leaf_hashes.len() as u64;
        let height = log2_ceil(slot_count);
        let width = 1usize << height;

        let mut leaves = Vec::with_capacity(width);
        for slot in 0..width {
            if (slot as u64) < slot_count {
                let hash = leaf_hashes[slot];
                let end = if ((slot + 1) as u64) < slot_count {
                    LittleEndian::read_u64(&leaf_hashes[slot + 1][..8])
                } else {
                    u64::MAX
                };
                leaves.push(Entry {
                    hash,
                    start: LittleEndian::read_u64(&hash[..8]),
                    end,
                });
            } else {
                leaves.push(Entry::pad());
            }
        }

        let mut levels = vec![leaves];
        for depth in 1..=height as usize {
            let mut level = Vec::with_capacity(width >> depth);
            for index in 0..width >> depth {
                if ((index as u64) << depth) >= slot_count {
                    level.push(Entry::pad());
                } else {
                    let left = levels[depth - 1][2 * index];
                    let right = levels[depth - 1][2 * index + 1];
                    level.push(Entry {
                        hash: parent_hash(
                            &left.hash,
                            left.start,
                            left.end,
                            &right.hash,
                            right.start,
                            right.end,
                        ),
                        start: left.start,
                        end: right.end,
                    });
                }
            }
            levels.push(level);
        }
        Self { levels, slot_count }
    }

    pub(crate) fn height(&self) -> u32 {
        (self.levels.len() - 1) as u32
    }

    pub(crate) fn root(&self) -> Entry {
        self.levels[self.height() as usize][0]
    }

    fn entry(&self, bits: u64, depth: u32) -> Entry {
        self.levels[depth as usize][(bits >> depth) as usize]
    }
}

/// Serialize the announcement-proof bytes for four target slots,
/// disclosing for every node off the target paths exactly what a
/// verifier cannot derive.
pub(crate) fn build_ann_proof(ideal: &IdealTree, targets: &[u64; 4]) -> Vec<u8> {
    let mut out = Vec::new();
    emit(ideal, targets, 0, ideal.height(), false, &mut out);
    out
}

fn emit(
    ideal: &IdealTree,
    targets: &[u64; 4],
    bits: u64,
    depth: u32,
    right: bool,
    out: &mut Vec<u8>,
) {
    let high = |value: u64| if depth >= 64 { 0 } else { value >> depth };
    let on_target_path = targets.iter().any(|&target| high(target) == high(bits));
    let leaf = depth == 0;
    let pad = !on_target_path && bits >= ideal.slot_count;
    let computable = on_target_path && !leaf;

    if computable {
        let child_depth = depth - 1;
        emit(ideal, targets, bits, child_depth, false, out);
        emit(
            ideal,
            targets,
            bits | (1u64 << child_depth),
            child_depth,
            true,
            out,
        );
    }

    // Disclosure for this node, in the verifier's order: range, then hash.
    let explicit_range = if leaf && right && !pad {
        true
    } else {
        !(leaf || computable || pad)
    };
    if explicit_range {
        let entry = ideal.entry(bits, depth);
        out.extend_from_slice(&entry.end.wrapping_sub(entry.start).to_le_bytes());
    }
    if !on_target_path && !pad {
        out.extend_from_slice(&ideal.entry(bits, depth).hash);
    }
}

/// Deterministic leaf hashes for tests, one per slot. Slot zero's
/// embedded start is pinned to zero so the keyspace closes.
pub(crate) fn test_leaf_hashes(seed: u64, slot_count: u64) -> Vec<CryptoHash> {
    (0..slot_count)
        .map(|slot| {
            let mut preimage = [0u8; 16];
            preimage[..8].copy_from_slice(&seed.to_le_bytes());
            preimage[8..].copy_from_slice(&slot.to_le_bytes());
            let mut hash = compress32(&preimage);
            if slot == 0 {
                hash[..8].fill(0);
            }
            hash
        })
        .collect()
}
