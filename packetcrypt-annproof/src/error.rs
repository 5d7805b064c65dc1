use thiserror::Error;

/// Errors from announcement-proof verification.
///
/// Every variant is terminal: a failing proof is definitively invalid,
/// never transiently so. [`AnnProofError::InternalInvariant`] is the one
/// exception in spirit, marking a condition the tree construction proves
/// unreachable, so its appearance means a bug rather than a bad proof.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AnnProofError {
    /// The claimed announcement count cannot form a tree.
    #[error("announcement count {0} out of range")]
    AnnCountRange(u64),
    /// A target announcement index does not fit the claimed count.
    #[error("announcement index {index} out of range for count {count}")]
    IndexOutOfRange {
        /// The offending index.
        index: u64,
        /// The claimed announcement count.
        count: u64,
    },
    /// A structurally impossible tree state was reached.
    #[error("internal invariant violated: {0}")]
    InternalInvariant(String),
    /// The proof supplied two different values for the same node fact.
    #[error("duplicate data: conflicting {what} for node {node}")]
    DuplicateData {
        /// Which fact conflicted.
        what: &'static str,
        /// Index of the node in the verification tree.
        node: usize,
    },
    /// The proof buffer ran out before the disclosure walk finished.
    #[error("runt proof: wanted {wanted} bytes, {remaining} remaining")]
    RuntProof {
        /// Bytes the next disclosure needed.
        wanted: usize,
        /// Bytes actually left.
        remaining: usize,
    },
    /// The proof buffer held bytes beyond the last disclosure.
    #[error("extra data at end of proof: {remaining} bytes")]
    TrailingProofBytes {
        /// Leftover byte count.
        remaining: usize,
    },
    /// The root did not resolve to the expected terminal form.
    #[error("invalid root: {0}")]
    RootShape(String),
    /// The resolved root does not cover the full keyspace.
    #[error("root covers [{start}, {end}] with range {range}, not the full keyspace")]
    RootRange {
        /// Resolved root start.
        start: u64,
        /// Resolved root end.
        end: u64,
        /// Resolved root range.
        range: u64,
    },
}
