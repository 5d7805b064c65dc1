//! The 1024-byte PacketCrypt announcement.

use core::fmt;

use byteorder::{ByteOrder, LittleEndian};

use crate::WireError;

/// Exact serialized size of one announcement.
pub const ANN_SIZE: usize = 1024;

/// Byte range of the content hash within an announcement.
pub const ANN_CONTENT_HASH_RANGE: core::ops::Range<usize> = 24..56;

/// Byte range of the 896-byte announcement Merkle slot.
pub const ANN_MERKLE_SLOT_RANGE: core::ops::Range<usize> = 88..984;

/// A unit of claimed work: a fixed 1024-byte structure whose header names
/// a content hash, a work target and a signing key, followed by the
/// 896-byte Merkle slot the announcement miner fills in.
///
/// Layout (all integers little-endian):
///
/// ```text
/// 0        version
/// 1..4     soft nonce
/// 4..8     work target (compact bits)
/// 8..12    parent block height
/// 12..20   content type
/// 20..24   content length
/// 24..56   content hash
/// 56..88   signing key
/// 88..984  merkle slot
/// 984..    padding to 1024
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct PacketCryptAnn {
    bytes: Box<[u8; ANN_SIZE]>,
}

impl PacketCryptAnn {
    /// Wrap a serialized announcement. The input must be exactly
    /// [`ANN_SIZE`] bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, WireError> {
        if bytes.len() != ANN_SIZE {
            return Err(WireError::AnnouncementLength {
                expected: ANN_SIZE,
                actual: bytes.len(),
            });
        }
        let mut buf = Box::new([0u8; ANN_SIZE]);
        buf.copy_from_slice(bytes);
        Ok(Self { bytes: buf })
    }

    /// Announcement format version.
    pub fn version(&self) -> u8 {
        self.bytes[0]
    }

    /// The 3-byte soft nonce, widened to a u32.
    pub fn soft_nonce(&self) -> u32 {
        LittleEndian::read_u24(&self.bytes[1..4])
    }

    /// Work target in compact-bits form.
    pub fn work_bits(&self) -> u32 {
        LittleEndian::read_u32(&self.bytes[4..8])
    }

    /// Height of the block this announcement commits to.
    pub fn parent_block_height(&self) -> u32 {
        LittleEndian::read_u32(&self.bytes[8..12])
    }

    /// Declared type of the announcement content.
    pub fn content_type(&self) -> u64 {
        LittleEndian::read_u64(&self.bytes[12..20])
    }

    /// Length of the announcement content in bytes.
    pub fn content_length(&self) -> u32 {
        LittleEndian::read_u32(&self.bytes[20..24])
    }

    /// Hash of the announcement content.
    pub fn content_hash(&self) -> [u8; 32] {
        let mut out = [0u8; 32];
        out.copy_from_slice(&self.bytes[ANN_CONTENT_HASH_RANGE]);
        out
    }

    /// Public key the announcement is signed with, all zero if unsigned.
    pub fn signing_key(&self) -> [u8; 32] {
        let mut out = [0u8; 32];
        out.copy_from_slice(&self.bytes[56..88]);
        out
    }

    /// The full serialized announcement.
    pub fn as_bytes(&self) -> &[u8; ANN_SIZE] {
        &self.bytes
    }

    /// Blake3 hash of the full 1024 bytes, used as the announcement's
    /// Merkle leaf.
    pub fn hash(&self) -> [u8; 32] {
        *blake3::hash(&self.bytes[..]).as_bytes()
    }
}

impl fmt::Debug for PacketCryptAnn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PacketCryptAnn")
            .field("version", &self.version())
            .field("parent_block_height", &self.parent_block_height())
            .field("work_bits", &format_args!("{:#010x}", self.work_bits()))
            .finish_non_exhaustive()
    }
}
