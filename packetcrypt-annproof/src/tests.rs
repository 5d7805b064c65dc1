use assert_matches::assert_matches;
use byteorder::{ByteOrder, LittleEndian};
use packetcrypt_types::{ANN_SIZE, PacketCryptAnn, PacketCryptProof};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};

use super::*;
use crate::hash::compress32;
use crate::test_utils::{IdealTree, build_ann_proof, test_leaf_hashes};
use crate::tree::Tree;

/// Wrap announcement-proof bytes in a block proof; the other sections do
/// not participate in verification.
fn proof_with(ann_proof: Vec<u8>) -> PacketCryptProof {
    let ann = |fill: u8| {
        PacketCryptAnn::from_bytes(&[fill; ANN_SIZE]).expect("announcement is 1024 bytes")
    };
    PacketCryptProof {
        nonce: 7,
        announcements: [ann(1), ann(2), ann(3), ann(4)],
        ann_proof,
        signatures: None,
        content_proof: None,
        version: None,
    }
}

/// Build the prover's side for `ann_count` announcements and four raw
/// indexes: the hashes and proof `pcp_hash` consumes, plus the full tree
/// and the bumped target slots for tests that dig deeper.
fn prover_setup(
    seed: u64,
    ann_count: u64,
    raw_indexes: &[u64; 4],
) -> ([CryptoHash; 4], PacketCryptProof, IdealTree, [u64; 4]) {
    let leaves = test_leaf_hashes(seed, ann_count + 1);
    let ideal = IdealTree::new(&leaves);
    let mut targets = [0u64; 4];
    let mut hashes = [[0u8; HASH_LENGTH]; 4];
    for slot in 0..4 {
        targets[slot] = (raw_indexes[slot] % ann_count) + 1;
        hashes[slot] = leaves[targets[slot] as usize];
    }
    let proof = proof_with(build_ann_proof(&ideal, &targets));
    (hashes, proof, ideal, targets)
}

fn inject_targets(tree: &mut Tree, targets: &[u64; 4], hashes: &[CryptoHash; 4]) {
    for (&slot, hash) in targets.iter().zip(hashes) {
        let leaf = tree.target_leaf(slot).expect("tree has a leaf per target");
        assert!(tree.set_hash(leaf, *hash), "target hash accepted");
    }
}

/// The disclosure walk `pcp_hash` performs, kept separate here so tests
/// can inspect the resolved tree afterwards.
fn replay(tree: &mut Tree, mut bytes: &[u8]) {
    for node in 0..tree.len() {
        if tree.node(node).has_explicit_range() {
            let (head, rest) = bytes.split_at(8);
            assert!(tree.set_range(node, LittleEndian::read_u64(head)));
            bytes = rest;
        }
        if tree.node(node).needs_explicit_hash() {
            let (head, rest) = bytes.split_at(HASH_LENGTH);
            let mut hash = [0u8; HASH_LENGTH];
            hash.copy_from_slice(head);
            assert!(tree.set_hash(node, hash));
            bytes = rest;
        }
    }
    assert!(bytes.is_empty(), "proof fully consumed");
}

// ── Verification round trips ─────────────────────────────────────────

#[test]
fn test_minimal_proof_verifies() {
    // One real announcement: slot 1 of a two-slot tree, all four
    // challenges landing on it.
    let (hashes, proof, ideal, _) = prover_setup(1, 1, &[0; 4]);
    let commitment = pcp_hash(&hashes, 1, &[0; 4], &proof).expect("minimal proof verifies");

    // Independent recomputation: the root hash in a 48-byte buffer whose
    // final eight bytes are 0xff.
    let mut preimage = [0u8; 48];
    preimage[..HASH_LENGTH].copy_from_slice(&ideal.root().hash);
    preimage[40..].fill(0xff);
    assert_eq!(commitment, compress32(&preimage));
}

#[test]
fn test_pcp_hash_is_deterministic() {
    let raw = [3u64, 77, 42, 99];
    let (hashes, proof, _, _) = prover_setup(2, 100, &raw);
    let first = pcp_hash(&hashes, 100, &raw, &proof).expect("valid proof");
    let second = pcp_hash(&hashes, 100, &raw, &proof).expect("valid proof");
    assert_eq!(first, second);
}

#[test]
fn test_verifies_across_counts() {
    // Counts on, just below and just above powers of two, with targets
    // hitting the first and last real slots.
    for ann_count in [1u64, 2, 3, 4, 5, 7, 8, 9, 15, 16, 31, 33, 100, 255] {
        let raw = [0, ann_count / 2, ann_count - 1, ann_count / 3];
        let (hashes, proof, _, _) = prover_setup(ann_count, ann_count, &raw);
        pcp_hash(&hashes, ann_count, &raw, &proof)
            .unwrap_or_else(|err| panic!("count {ann_count}: {err}"));
    }
}

#[test]
fn test_colliding_targets_with_equal_hashes_verify() {
    // Raw indexes 3 and 13 reduce to the same slot modulo 10; the proof
    // is fine as long as both carry the same hash.
    let raw = [3u64, 13, 5, 9];
    let (hashes, proof, _, _) = prover_setup(6, 10, &raw);
    assert_eq!(hashes[0], hashes[1]);
    pcp_hash(&hashes, 10, &raw, &proof).expect("colliding targets with consistent hashes");
}

// ── Malformed proofs ─────────────────────────────────────────────────

#[test]
fn test_zero_count_rejected() {
    let (hashes, proof, _, _) = prover_setup(1, 1, &[0; 4]);
    assert_matches!(
        pcp_hash(&hashes, 0, &[0; 4], &proof),
        Err(AnnProofError::AnnCountRange(0))
    );
}

#[test]
fn test_count_overflow_rejected() {
    // The tree spans ann_count + 1 slots, so the count itself must leave
    // room for the reserved zero slot.
    let proof = proof_with(Vec::new());
    assert_matches!(
        pcp_hash(&[[0u8; HASH_LENGTH]; 4], u64::MAX, &[0; 4], &proof),
        Err(AnnProofError::AnnCountRange(u64::MAX))
    );
}

#[test]
fn test_every_truncation_rejected() {
    let raw = [1u64, 5, 9, 19];
    let (hashes, proof, _, _) = prover_setup(3, 20, &raw);
    for cut in 0..proof.ann_proof.len() {
        let mut runt = proof.clone();
        runt.ann_proof.truncate(cut);
        assert_matches!(
            pcp_hash(&hashes, 20, &raw, &runt),
            Err(AnnProofError::RuntProof { .. }),
            "cut at {}",
            cut
        );
    }
}

#[test]
fn test_trailing_bytes_rejected() {
    let raw = [1u64, 5, 9, 19];
    let (hashes, mut proof, _, _) = prover_setup(4, 20, &raw);
    proof.ann_proof.push(0xaa);
    assert_matches!(
        pcp_hash(&hashes, 20, &raw, &proof),
        Err(AnnProofError::TrailingProofBytes { remaining: 1 })
    );
}

#[test]
fn test_conflicting_target_hashes_rejected() {
    // Four raw indexes reducing to one slot must carry one hash.
    let (mut hashes, proof, _, _) = prover_setup(5, 1, &[0; 4]);
    hashes[2][31] ^= 1;
    assert_matches!(
        pcp_hash(&hashes, 1, &[0; 4], &proof),
        Err(AnnProofError::DuplicateData {
            what: "announcement hash",
            ..
        })
    );
}

// ── Forged proofs ────────────────────────────────────────────────────

#[test]
fn test_corrupted_range_breaks_keyspace_closure() {
    let ann_count = 4u64;
    let raw = [0u64; 4];
    let (hashes, proof, _, targets) = prover_setup(7, ann_count, &raw);

    // Locate the last disclosed range in the stream; bending it shifts
    // everything to its right off the top of the keyspace.
    let mut tree = Tree::new(ann_count + 1, &targets).expect("tree arguments");
    inject_targets(&mut tree, &targets, &hashes);
    let mut offset = 0;
    let mut last_range = None;
    for node in 0..tree.len() {
        if tree.node(node).has_explicit_range() {
            last_range = Some(offset);
            offset += 8;
        }
        if tree.node(node).needs_explicit_hash() {
            offset += HASH_LENGTH;
        }
    }

    let mut forged = proof.clone();
    forged.ann_proof[last_range.expect("a range is disclosed")] ^= 1;
    assert_matches!(
        pcp_hash(&hashes, ann_count, &raw, &forged),
        Err(AnnProofError::RootRange { .. })
    );
}

#[test]
fn test_corrupted_sibling_hash_changes_commitment() {
    let ann_count = 4u64;
    let raw = [0u64; 4];
    let (hashes, proof, _, _) = prover_setup(10, ann_count, &raw);
    let honest = pcp_hash(&hashes, ann_count, &raw, &proof).expect("valid proof");

    // The stream ends with an off-path subtree hash. No range arithmetic
    // touches its tail bytes, so the forgery survives until the
    // commitment comparison the caller performs.
    let mut forged = proof.clone();
    *forged.ann_proof.last_mut().expect("nonempty proof") ^= 1;
    let forged_commitment =
        pcp_hash(&hashes, ann_count, &raw, &forged).expect("structurally still sound");
    assert_ne!(forged_commitment, honest);
}

#[test]
fn test_foreign_announcement_hash_rejected() {
    // An announcement hash whose embedded start disagrees with the
    // committed neighbors cannot close the keyspace.
    let (mut hashes, proof, _, _) = prover_setup(12, 1, &[0; 4]);
    for hash in &mut hashes {
        hash[0] ^= 1;
    }
    assert_matches!(
        pcp_hash(&hashes, 1, &[0; 4], &proof),
        Err(AnnProofError::RootRange { .. })
    );
}

#[test]
fn test_proof_for_other_targets_rejected() {
    // A proof serialized for one set of challenges replayed against
    // another: the disclosure schedule no longer lines up.
    let ann_count = 4u64;
    let (_, proof, _, _) = prover_setup(13, ann_count, &[0u64; 4]);
    let other_raw = [1u64; 4];
    let (other_hashes, _, _, _) = prover_setup(13, ann_count, &other_raw);
    pcp_hash(&other_hashes, ann_count, &other_raw, &proof)
        .expect_err("proof for different challenges");
}

// ── Resolved tree structure ──────────────────────────────────────────

#[test]
fn test_verified_tree_closes_the_keyspace() {
    let ann_count = 23u64;
    let raw = [2u64, 11, 17, 22];
    let (hashes, proof, _, targets) = prover_setup(8, ann_count, &raw);

    let mut tree = Tree::new(ann_count + 1, &targets).expect("tree arguments");
    inject_targets(&mut tree, &targets, &hashes);
    replay(&mut tree, &proof.ann_proof);

    let root = tree.node(tree.root_index());
    assert_eq!(root.start(), Some(0));
    assert_eq!(root.end(), Some(u64::MAX));
    assert_eq!(root.range(), Some(u64::MAX));

    for index in 0..tree.len() {
        let node = tree.node(index);
        assert!(
            node.hash().is_some() && node.range().is_some(),
            "node {index} resolved"
        );
        if let (Some(start), Some(end), Some(range)) = (node.start(), node.end(), node.range()) {
            assert_eq!(
                range,
                end.wrapping_sub(start),
                "range arithmetic at node {index}"
            );
        }
        let Some((left, right)) = node.children() else {
            continue;
        };
        assert_eq!(
            tree.node(left).end(),
            tree.node(right).start(),
            "contiguity at node {index}"
        );
        assert_eq!(node.start(), tree.node(left).start());
        assert_eq!(node.end(), tree.node(right).end());
    }
}

#[test]
fn test_disclosure_schedule_for_one_target() {
    // Count 4, one target in slot 1: the proof must disclose the zero
    // slot's hash, the target's range, and range plus hash for the two
    // off-path subtrees, in node order.
    let leaves = test_leaf_hashes(11, 5);
    let ideal = IdealTree::new(&leaves);
    let targets = [1u64; 4];
    let bytes = build_ann_proof(&ideal, &targets);
    assert_eq!(bytes.len(), 32 + 8 + (8 + 32) + (8 + 32));
    assert_eq!(&bytes[..32], &leaves[0]);

    let start1 = LittleEndian::read_u64(&leaves[1][..8]);
    let start2 = LittleEndian::read_u64(&leaves[2][..8]);
    assert_eq!(
        LittleEndian::read_u64(&bytes[32..40]),
        start2.wrapping_sub(start1)
    );
}

#[test]
fn test_emitter_and_disclosure_schedule_agree() {
    // The serializer derives what to disclose independently of the
    // verification tree; the two must demand the same byte count.
    for ann_count in [1u64, 2, 5, 12, 64, 200] {
        let raw = [0, 1 % ann_count, ann_count - 1, (ann_count / 2) % ann_count];
        let (hashes, proof, _, targets) = prover_setup(9, ann_count, &raw);
        let mut tree = Tree::new(ann_count + 1, &targets).expect("tree arguments");
        inject_targets(&mut tree, &targets, &hashes);
        assert_eq!(
            proof.ann_proof.len(),
            tree.expected_proof_len(),
            "count {ann_count}"
        );
    }
}

// ── Randomized coverage ──────────────────────────────────────────────

#[test]
fn test_random_leaf_hashes_verify() {
    // Announcement hashes are arbitrary 32-byte strings; nothing about
    // verification assumes the test generator's distribution.
    let mut rng = StdRng::seed_from_u64(99);
    for round in 0..20 {
        let ann_count = rng.random_range(1u64..300);
        let mut leaves: Vec<CryptoHash> = (0..=ann_count).map(|_| rng.random()).collect();
        leaves[0][..8].fill(0);
        let ideal = IdealTree::new(&leaves);

        let raw: [u64; 4] = rng.random();
        let mut targets = [0u64; 4];
        let mut hashes = [[0u8; HASH_LENGTH]; 4];
        for slot in 0..4 {
            targets[slot] = (raw[slot] % ann_count) + 1;
            hashes[slot] = leaves[targets[slot] as usize];
        }
        let proof = proof_with(build_ann_proof(&ideal, &targets));
        pcp_hash(&hashes, ann_count, &raw, &proof)
            .unwrap_or_else(|err| panic!("round {round}: {err}"));
    }
}

proptest! {
    #[test]
    fn test_arbitrary_announcement_sets_verify(
        seed in any::<u64>(),
        ann_count in 1u64..150,
        raw in prop::array::uniform4(any::<u64>()),
    ) {
        let (hashes, proof, _, _) = prover_setup(seed, ann_count, &raw);
        let first = pcp_hash(&hashes, ann_count, &raw, &proof);
        let second = pcp_hash(&hashes, ann_count, &raw, &proof);
        prop_assert!(first.is_ok());
        prop_assert_eq!(first, second);
    }
}
