//! The announcement Merkle range tree.
//!
//! Verification rebuilds the tree a block's announcement commitment
//! claims: a binary trie over announcement slots, sized to the claimed
//! count rounded up to a power of two, containing only the nodes on or
//! adjacent to the paths of the four proven announcements. Every node
//! carries a hash and a keyspace range `[start, end]`; a parent's range
//! spans its children and a right child starts exactly where its left
//! sibling ends, which is what makes duplicate entries unprovable.
//!
//! Construction fixes each node's shape. Values then arrive
//! incrementally, from the injected announcement hashes and the proof's
//! disclosure bytes, and every arrival propagates through the setters
//! until the root resolves. Nodes reference each other by index into one
//! arena; there are no node pointers.

use byteorder::{ByteOrder, LittleEndian};

use crate::error::AnnProofError;
use crate::hash::{CryptoHash, HASH_LENGTH, parent_hash};

/// Ceiling of log2. `value` must be nonzero.
pub(crate) fn log2_ceil(value: u64) -> u32 {
    debug_assert!(value > 0);
    64 - (value - 1).leading_zeros()
}

/// The bits of `value` at and above position `depth`.
fn high_bits(value: u64, depth: u32) -> u64 {
    if depth >= 64 { 0 } else { value >> depth }
}

/// Structural facts about a node, fixed at construction time.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct NodeShape {
    /// Both children are in the tree, so hash and range are derived
    /// rather than supplied.
    pub computable: bool,
    /// Synthetic all-ff entry padding the slot count to a power of two.
    pub pad_entry: bool,
    pub leaf: bool,
    /// Right child of its parent.
    pub right: bool,
    /// Left sibling of a pad entry; its end is hardwired to the top of
    /// the keyspace.
    pub pad_sibling: bool,
    /// Leftmost node of its level, so its range begins the keyspace.
    pub first_entry: bool,
}

/// One tree slot: immutable shape plus incrementally learned values.
#[derive(Debug, Clone)]
pub(crate) struct TreeNode {
    shape: NodeShape,
    hash: Option<CryptoHash>,
    start: Option<u64>,
    end: Option<u64>,
    range: Option<u64>,
    child_left: Option<usize>,
    child_right: Option<usize>,
    parent: Option<usize>,
}

impl TreeNode {
    fn empty(shape: NodeShape) -> Self {
        Self {
            shape,
            hash: None,
            start: None,
            end: None,
            range: None,
            child_left: None,
            child_right: None,
            parent: None,
        }
    }

    fn pad(shape: NodeShape) -> Self {
        Self {
            hash: Some([0xff; HASH_LENGTH]),
            start: Some(u64::MAX),
            end: Some(u64::MAX),
            range: Some(u64::MAX),
            ..Self::empty(shape)
        }
    }

    fn internal(shape: NodeShape, left: usize, right: usize) -> Self {
        Self {
            child_left: Some(left),
            child_right: Some(right),
            ..Self::empty(shape)
        }
    }

    pub(crate) fn shape(&self) -> NodeShape {
        self.shape
    }

    pub(crate) fn hash(&self) -> Option<CryptoHash> {
        self.hash
    }

    pub(crate) fn start(&self) -> Option<u64> {
        self.start
    }

    pub(crate) fn end(&self) -> Option<u64> {
        self.end
    }

    pub(crate) fn range(&self) -> Option<u64> {
        self.range
    }

    /// Child indexes of an internal node, left then right.
    #[cfg(test)]
    pub(crate) fn children(&self) -> Option<(usize, usize)> {
        Some((self.child_left?, self.child_right?))
    }

    /// Whether the serialized proof carries an explicit 8-byte range for
    /// this node. A right-hand non-pad leaf always does: its end depends
    /// on the next announcement, which is external data. Everything else
    /// does unless the range is derivable, from its own hash (leaves),
    /// its children (computable), or hardwiring (pads and pad siblings).
    pub(crate) fn has_explicit_range(&self) -> bool {
        if self.shape.leaf && self.shape.right && !self.shape.pad_entry {
            return true;
        }
        !(self.shape.leaf || self.shape.computable || self.shape.pad_entry || self.shape.pad_sibling)
    }

    /// Whether the serialized proof carries an explicit 32-byte hash for
    /// this node: nothing known and nothing derivable.
    pub(crate) fn needs_explicit_hash(&self) -> bool {
        self.hash.is_none() && !self.shape.computable
    }
}

/// The verification tree: an arena of nodes in construction (post-)
/// order, so children precede parents and the root is last.
#[derive(Debug)]
pub(crate) struct Tree {
    nodes: Vec<TreeNode>,
    /// Slot and node index of each target leaf.
    target_leaves: Vec<(u64, usize)>,
}

impl Tree {
    /// Build the tree for a claimed announcement count (including the
    /// reserved zero slot) and the four target slots.
    pub(crate) fn new(ann_count: u64, targets: &[u64; 4]) -> Result<Self, AnnProofError> {
        if ann_count < 2 {
            return Err(AnnProofError::AnnCountRange(ann_count));
        }
        for &target in targets {
            if target >= ann_count {
                return Err(AnnProofError::IndexOutOfRange {
                    index: target,
                    count: ann_count,
                });
            }
        }
        let branch_height = log2_ceil(ann_count);
        let mut tree = Self {
            nodes: Vec::with_capacity(branch_height as usize * 4 * 3),
            target_leaves: Vec::with_capacity(4),
        };
        tree.build(ann_count, targets, 0, branch_height, false)?;
        Ok(tree)
    }

    /// Recursively build the subtree at path `bits`, `depth` levels above
    /// the leaves, appending nodes in post-order. Returns the index of
    /// the subtree's own node.
    fn build(
        &mut self,
        ann_count: u64,
        targets: &[u64; 4],
        bits: u64,
        depth: u32,
        right: bool,
    ) -> Result<usize, AnnProofError> {
        let on_target_path = targets
            .iter()
            .any(|&target| high_bits(target, depth) == high_bits(bits, depth));
        let mut shape = NodeShape {
            right,
            leaf: depth == 0,
            first_entry: bits == 0,
            ..NodeShape::default()
        };

        if !on_target_path {
            if bits >= ann_count {
                // Pad entries only ever pair with a target subtree on
                // their left; a left-hand pad would mean both children
                // pad, contradicting the parent lying on a target path.
                if !right {
                    return Err(AnnProofError::InternalInvariant(format!(
                        "pad entry in left position at slot {bits} depth {depth}"
                    )));
                }
                shape.pad_entry = true;
                self.nodes.push(TreeNode::pad(shape));
            } else {
                // A sibling of a proof path: hash and range arrive from
                // the proof's disclosure bytes.
                self.nodes.push(TreeNode::empty(shape));
            }
            return Ok(self.nodes.len() - 1);
        }

        if depth == 0 {
            self.nodes.push(TreeNode::empty(shape));
            let node = self.nodes.len() - 1;
            self.target_leaves.push((bits, node));
            return Ok(node);
        }

        shape.computable = true;
        let child_depth = depth - 1;
        let left = self.build(ann_count, targets, bits, child_depth, false)?;
        let right_child = self.build(
            ann_count,
            targets,
            bits | (1u64 << child_depth),
            child_depth,
            true,
        )?;
        let node = self.nodes.len();
        self.nodes.push(TreeNode::internal(shape, left, right_child));
        self.nodes[left].parent = Some(node);
        self.nodes[right_child].parent = Some(node);
        if self.nodes[right_child].shape.pad_entry {
            self.nodes[left].shape.pad_sibling = true;
            // The pad starts at the top of the keyspace, so its sibling
            // must end there.
            if !self.set_end(left, u64::MAX) {
                return Err(AnnProofError::InternalInvariant(format!(
                    "pad sibling {left} rejected its hardwired end"
                )));
            }
        }
        Ok(node)
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    /// The root is always the last node appended.
    pub(crate) fn root_index(&self) -> usize {
        self.nodes.len() - 1
    }

    pub(crate) fn node(&self, node: usize) -> &TreeNode {
        &self.nodes[node]
    }

    /// The leaf standing for a target slot, if `slot` is one of the
    /// targets the tree was built for.
    pub(crate) fn target_leaf(&self, slot: u64) -> Option<usize> {
        self.target_leaves
            .iter()
            .find(|(target, _)| *target == slot)
            .map(|(_, node)| *node)
    }

    /// Bytes of proof the disclosure schedule will consume. Only
    /// meaningful once the target hashes are in place.
    #[cfg(test)]
    pub(crate) fn expected_proof_len(&self) -> usize {
        self.nodes
            .iter()
            .map(|node| {
                usize::from(node.has_explicit_range()) * 8
                    + usize::from(node.needs_explicit_hash()) * HASH_LENGTH
            })
            .sum()
    }

    fn sibling(&self, node: usize) -> Option<usize> {
        let parent = self.nodes[node].parent?;
        if self.nodes[node].shape.right {
            self.nodes[parent].child_left
        } else {
            self.nodes[parent].child_right
        }
    }

    /// Record a node's hash. For leaves the first eight bytes double as
    /// the node's little-endian start. Returns false on a conflict with
    /// an already known value.
    pub(crate) fn set_hash(&mut self, node: usize, hash: CryptoHash) -> bool {
        if let Some(known) = &self.nodes[node].hash {
            return *known == hash;
        }
        self.nodes[node].hash = Some(hash);
        if self.nodes[node].shape.leaf {
            return self.set_start(node, LittleEndian::read_u64(&hash[..8]));
        }
        self.recompute(node)
    }

    /// Record a node's start. A right child starts where its left
    /// sibling ends, so the value propagates there.
    pub(crate) fn set_start(&mut self, node: usize, start: u64) -> bool {
        if let Some(known) = self.nodes[node].start {
            return known == start;
        }
        self.nodes[node].start = Some(start);
        if self.nodes[node].shape.right {
            if let Some(sibling) = self.sibling(node) {
                if !self.set_end(sibling, start) {
                    return false;
                }
            }
        }
        self.recompute(node)
    }

    /// Record a node's end, propagating to the right sibling's start.
    /// The root has no sibling and propagates nowhere.
    pub(crate) fn set_end(&mut self, node: usize, end: u64) -> bool {
        if let Some(known) = self.nodes[node].end {
            return known == end;
        }
        self.nodes[node].end = Some(end);
        if !self.nodes[node].shape.right {
            if let Some(sibling) = self.sibling(node) {
                if !self.set_start(sibling, end) {
                    return false;
                }
            }
        }
        self.recompute(node)
    }

    /// Record a node's range. Ranges never propagate sideways.
    pub(crate) fn set_range(&mut self, node: usize, range: u64) -> bool {
        if let Some(known) = self.nodes[node].range {
            return known == range;
        }
        self.nodes[node].range = Some(range);
        self.recompute(node)
    }

    /// Derive whatever the node's known values imply, in priority order:
    /// a fully resolved node folds into its parent, otherwise the third
    /// of start, end and range follows from the other two. All range
    /// arithmetic wraps; the keyspace is a 64-bit ring.
    fn recompute(&mut self, node: usize) -> bool {
        let n = &self.nodes[node];
        match (n.start, n.end, n.range) {
            (Some(_), Some(_), Some(_)) => {
                if n.hash.is_none() {
                    return true;
                }
                self.compute_parent(node)
            }
            (Some(start), Some(end), None) => self.set_range(node, end.wrapping_sub(start)),
            (None, Some(end), Some(range)) => self.set_start(node, end.wrapping_sub(range)),
            (Some(start), None, Some(range)) => self.set_end(node, start.wrapping_add(range)),
            _ => true,
        }
    }

    /// Fold two fully resolved children into their parent's hash and
    /// bounds, continuing upward through the setters.
    fn compute_parent(&mut self, node: usize) -> bool {
        let Some(parent) = self.nodes[node].parent else {
            return true;
        };
        let (left, right) = match (self.nodes[parent].child_left, self.nodes[parent].child_right) {
            (Some(left), Some(right)) => (left, right),
            _ => return true,
        };
        let resolved = |n: &TreeNode| match (n.hash, n.start, n.end, n.range) {
            (Some(hash), Some(start), Some(end), Some(_)) => Some((hash, start, end)),
            _ => None,
        };
        let Some((left_hash, left_start, left_end)) = resolved(&self.nodes[left]) else {
            return true;
        };
        let Some((right_hash, right_start, right_end)) = resolved(&self.nodes[right]) else {
            return true;
        };
        let hash = parent_hash(
            &left_hash,
            left_start,
            left_end,
            &right_hash,
            right_start,
            right_end,
        );
        self.set_hash(parent, hash)
            && self.set_start(parent, left_start)
            && self.set_end(parent, right_end)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn leaf_hash(fill: u8, start: u64) -> CryptoHash {
        let mut hash = [fill; HASH_LENGTH];
        hash[..8].copy_from_slice(&start.to_le_bytes());
        hash
    }

    #[test]
    fn test_log2_ceil() {
        assert_eq!(log2_ceil(1), 0);
        assert_eq!(log2_ceil(2), 1);
        assert_eq!(log2_ceil(3), 2);
        assert_eq!(log2_ceil(4), 2);
        assert_eq!(log2_ceil(5), 3);
        assert_eq!(log2_ceil(1u64 << 63), 63);
        assert_eq!(log2_ceil((1u64 << 63) + 1), 64);
    }

    #[test]
    fn test_minimal_tree_shape() {
        let tree = Tree::new(2, &[1, 1, 1, 1]).expect("valid arguments");
        assert_eq!(tree.len(), 3);
        assert_eq!(tree.root_index(), 2);
        assert_eq!(tree.target_leaf(1), Some(1));
        assert_eq!(tree.target_leaf(0), None);

        let zero_slot = tree.node(0);
        assert!(zero_slot.shape().leaf);
        assert!(zero_slot.shape().first_entry);
        assert!(!zero_slot.shape().right);
        assert!(zero_slot.needs_explicit_hash());
        assert!(!zero_slot.has_explicit_range());

        let target = tree.node(1);
        assert!(target.shape().leaf);
        assert!(target.shape().right);
        assert!(target.has_explicit_range());

        let root = tree.node(2);
        assert!(root.shape().computable);
        assert!(root.shape().first_entry);
        assert!(!root.shape().leaf);
        assert!(!root.has_explicit_range());
        assert!(!root.needs_explicit_hash());
    }

    #[test]
    fn test_pad_entry_hardwired() {
        // Count 3 with target slot 2: the slot 3 leaf pads the tree.
        let tree = Tree::new(3, &[2, 2, 2, 2]).expect("valid arguments");
        let pads: Vec<usize> = (0..tree.len())
            .filter(|&i| tree.node(i).shape().pad_entry)
            .collect();
        assert_eq!(pads.len(), 1);

        let pad = tree.node(pads[0]);
        assert!(pad.shape().leaf);
        assert!(pad.shape().right);
        assert_eq!(pad.hash(), Some([0xff; HASH_LENGTH]));
        assert_eq!(pad.start(), Some(u64::MAX));
        assert_eq!(pad.end(), Some(u64::MAX));
        assert_eq!(pad.range(), Some(u64::MAX));
        assert!(!pad.has_explicit_range());
        assert!(!pad.needs_explicit_hash());

        let sibling = tree.node(pads[0] - 1);
        assert!(sibling.shape().pad_sibling);
        assert_eq!(sibling.end(), Some(u64::MAX));
        assert!(!sibling.has_explicit_range());
    }

    #[test]
    fn test_idempotent_setters() {
        let mut tree = Tree::new(2, &[1, 1, 1, 1]).expect("valid arguments");
        assert!(tree.set_range(1, 77));
        assert!(tree.set_range(1, 77));
        assert!(!tree.set_range(1, 78));
        assert_eq!(tree.node(1).range(), Some(77));

        let hash = leaf_hash(9, 5000);
        assert!(tree.set_hash(1, hash));
        assert!(tree.set_hash(1, hash));
        assert!(!tree.set_hash(1, leaf_hash(8, 5000)));
        assert_eq!(tree.node(1).hash(), Some(hash));
        // The leaf hash doubles as its start.
        assert_eq!(tree.node(1).start(), Some(5000));
    }

    #[test]
    fn test_sibling_propagation() {
        let mut tree = Tree::new(2, &[1, 1, 1, 1]).expect("valid arguments");
        // A right child's start pins its left sibling's end.
        assert!(tree.set_start(1, 400));
        assert_eq!(tree.node(0).end(), Some(400));
        // And a left child's end pins its right sibling's start.
        let mut other = Tree::new(2, &[1, 1, 1, 1]).expect("valid arguments");
        assert!(other.set_end(0, 60));
        assert_eq!(other.node(1).start(), Some(60));
    }

    #[test]
    fn test_leaf_hash_start_conflict_detected() {
        let mut tree = Tree::new(2, &[1, 1, 1, 1]).expect("valid arguments");
        assert!(tree.set_end(0, 60));
        assert_eq!(tree.node(1).start(), Some(60));
        // A leaf hash whose embedded start disagrees with the propagated
        // one is conflicting data.
        assert!(!tree.set_hash(1, leaf_hash(3, 61)));
        assert_eq!(tree.node(1).start(), Some(60));
    }

    #[test]
    fn test_range_inference() {
        let mut tree = Tree::new(2, &[1, 1, 1, 1]).expect("valid arguments");
        assert!(tree.set_start(1, 100));
        assert!(tree.set_range(1, u64::MAX - 100));
        assert_eq!(tree.node(1).end(), Some(u64::MAX));
        // Inference wraps; the keyspace is a ring.
        let mut other = Tree::new(2, &[1, 1, 1, 1]).expect("valid arguments");
        assert!(other.set_start(1, u64::MAX));
        assert!(other.set_range(1, 5));
        assert_eq!(other.node(1).end(), Some(4));
    }

    #[test]
    fn test_bad_arguments_rejected() {
        assert_matches!(Tree::new(0, &[0; 4]), Err(AnnProofError::AnnCountRange(0)));
        assert_matches!(Tree::new(1, &[0; 4]), Err(AnnProofError::AnnCountRange(1)));
        assert_matches!(
            Tree::new(4, &[4, 1, 1, 1]),
            Err(AnnProofError::IndexOutOfRange { index: 4, count: 4 })
        );
    }
}
