//! Hash compression for tree nodes and the final commitment.

use byteorder::{ByteOrder, LittleEndian};

/// Length in bytes of every hash this crate produces or consumes.
pub const HASH_LENGTH: usize = 32;

/// A 32-byte hash value.
pub type CryptoHash = [u8; HASH_LENGTH];

/// Bytes one child contributes to its parent's preimage: hash plus the
/// two little-endian range bounds.
const ENTRY_LENGTH: usize = HASH_LENGTH + 16;

/// Compress arbitrary bytes to a 32-byte hash.
pub(crate) fn compress32(data: &[u8]) -> CryptoHash {
    *blake3::hash(data).as_bytes()
}

/// Hash of an internal tree node: both children's hash, start and end
/// concatenated left then right into a 96-byte preimage. The layout is a
/// consensus rule.
pub(crate) fn parent_hash(
    left_hash: &CryptoHash,
    left_start: u64,
    left_end: u64,
    right_hash: &CryptoHash,
    right_start: u64,
    right_end: u64,
) -> CryptoHash {
    let mut buf = [0u8; 2 * ENTRY_LENGTH];
    buf[..HASH_LENGTH].copy_from_slice(left_hash);
    LittleEndian::write_u64(&mut buf[HASH_LENGTH..HASH_LENGTH + 8], left_start);
    LittleEndian::write_u64(&mut buf[HASH_LENGTH + 8..ENTRY_LENGTH], left_end);
    buf[ENTRY_LENGTH..ENTRY_LENGTH + HASH_LENGTH].copy_from_slice(right_hash);
    LittleEndian::write_u64(
        &mut buf[ENTRY_LENGTH + HASH_LENGTH..ENTRY_LENGTH + HASH_LENGTH + 8],
        right_start,
    );
    LittleEndian::write_u64(&mut buf[2 * ENTRY_LENGTH - 8..], right_end);
    compress32(&buf)
}
