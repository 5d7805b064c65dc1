//! The PacketCrypt block proof and its type-length-value wire encoding.
//!
//! A proof travels as a stream of sections, each `type (u32 LE)`,
//! `length (u32 LE)`, `payload`. Exactly one pcp section must appear, the
//! stream must close with a zero-length end section, and nothing may
//! follow it. Unknown section types are skipped so old nodes tolerate
//! future extensions.

use byteorder::{ByteOrder, LittleEndian};

use crate::{PacketCryptAnn, WireError, ann::ANN_SIZE};

/// Section type terminating the stream.
pub const END_TYPE: u32 = 0;
/// Section type carrying the nonce, announcements and announcement proof.
pub const PCP_TYPE: u32 = 1;
/// Section type carrying announcement signatures.
pub const SIGNATURES_TYPE: u32 = 2;
/// Section type carrying announcement content proofs.
pub const CONTENT_PROOF_TYPE: u32 = 3;
/// Section type carrying the proof format version.
pub const VERSION_TYPE: u32 = 4;

/// Smallest well-formed pcp payload: nonce plus four announcements.
const PCP_MIN_LEN: usize = 4 + 4 * ANN_SIZE;

/// Upper bound on a pcp payload, limiting the announcement proof size.
const PCP_MAX_LEN: usize = 131_072;

/// The proof a block carries to back its coinbase announcement commitment:
/// four announcements chosen by the previous block hash, plus the
/// serialized Merkle range tree data that places them, without
/// duplication, in the committed set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacketCryptProof {
    /// Miner-chosen nonce.
    pub nonce: u32,
    /// The four proven announcements.
    pub announcements: [PacketCryptAnn; 4],
    /// Serialized range tree data, consumed in node order during
    /// verification.
    pub ann_proof: Vec<u8>,
    /// Aggregated announcement signatures, when any announcement is signed.
    pub signatures: Option<Vec<u8>>,
    /// Announcement content proofs, when demanded by the content length.
    pub content_proof: Option<Vec<u8>>,
    /// Proof format version.
    pub version: Option<u64>,
}

fn write_section_header(out: &mut Vec<u8>, section: u32, length: u32) {
    out.extend_from_slice(&section.to_le_bytes());
    out.extend_from_slice(&length.to_le_bytes());
}

impl PacketCryptProof {
    /// Serialize to the wire form. Sections are written in fixed order:
    /// pcp, signatures, content proof, version, end.
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(16 + PCP_MIN_LEN + self.ann_proof.len());
        write_section_header(
            &mut out,
            PCP_TYPE,
            (PCP_MIN_LEN + self.ann_proof.len()) as u32,
        );
        out.extend_from_slice(&self.nonce.to_le_bytes());
        for ann in &self.announcements {
            out.extend_from_slice(ann.as_bytes());
        }
        out.extend_from_slice(&self.ann_proof);
        if let Some(signatures) = &self.signatures {
            write_section_header(&mut out, SIGNATURES_TYPE, signatures.len() as u32);
            out.extend_from_slice(signatures);
        }
        if let Some(content_proof) = &self.content_proof {
            write_section_header(&mut out, CONTENT_PROOF_TYPE, content_proof.len() as u32);
            out.extend_from_slice(content_proof);
        }
        if let Some(version) = self.version {
            write_section_header(&mut out, VERSION_TYPE, 8);
            out.extend_from_slice(&version.to_le_bytes());
        }
        write_section_header(&mut out, END_TYPE, 0);
        out
    }

    /// Decode a proof from its wire form.
    pub fn deserialize(bytes: &[u8]) -> Result<Self, WireError> {
        let mut cursor = 0usize;
        let mut pcp: Option<(u32, [PacketCryptAnn; 4], Vec<u8>)> = None;
        let mut signatures: Option<Vec<u8>> = None;
        let mut content_proof: Option<Vec<u8>> = None;
        let mut version: Option<u64> = None;
        loop {
            if bytes.len() - cursor < 8 {
                return Err(WireError::Truncated {
                    wanted: 8,
                    remaining: bytes.len() - cursor,
                });
            }
            let section = LittleEndian::read_u32(&bytes[cursor..cursor + 4]);
            let length = LittleEndian::read_u32(&bytes[cursor + 4..cursor + 8]) as usize;
            cursor += 8;

            if section == END_TYPE {
                if length != 0 {
                    return Err(WireError::SectionLength {
                        section,
                        length: length as u32,
                    });
                }
                if cursor != bytes.len() {
                    return Err(WireError::TrailingBytes(bytes.len() - cursor));
                }
                let Some((nonce, announcements, ann_proof)) = pcp else {
                    return Err(WireError::MissingSection(PCP_TYPE));
                };
                return Ok(Self {
                    nonce,
                    announcements,
                    ann_proof,
                    signatures,
                    content_proof,
                    version,
                });
            }

            if bytes.len() - cursor < length {
                return Err(WireError::Truncated {
                    wanted: length,
                    remaining: bytes.len() - cursor,
                });
            }
            let payload = &bytes[cursor..cursor + length];
            cursor += length;

            match section {
                PCP_TYPE => {
                    if pcp.is_some() {
                        return Err(WireError::DuplicateSection(section));
                    }
                    if !(PCP_MIN_LEN..=PCP_MAX_LEN).contains(&length) {
                        return Err(WireError::SectionLength {
                            section,
                            length: length as u32,
                        });
                    }
                    let nonce = LittleEndian::read_u32(&payload[..4]);
                    let ann_at =
                        |i: usize| PacketCryptAnn::from_bytes(&payload[4 + i * ANN_SIZE..][..ANN_SIZE]);
                    let announcements = [ann_at(0)?, ann_at(1)?, ann_at(2)?, ann_at(3)?];
                    pcp = Some((nonce, announcements, payload[PCP_MIN_LEN..].to_vec()));
                }
                SIGNATURES_TYPE => {
                    if signatures.is_some() {
                        return Err(WireError::DuplicateSection(section));
                    }
                    signatures = Some(payload.to_vec());
                }
                CONTENT_PROOF_TYPE => {
                    if content_proof.is_some() {
                        return Err(WireError::DuplicateSection(section));
                    }
                    content_proof = Some(payload.to_vec());
                }
                VERSION_TYPE => {
                    if version.is_some() {
                        return Err(WireError::DuplicateSection(section));
                    }
                    if length != 8 {
                        return Err(WireError::SectionLength {
                            section,
                            length: length as u32,
                        });
                    }
                    version = Some(LittleEndian::read_u64(payload));
                }
                // Unknown sections are tolerated and skipped.
                _ => {}
            }
        }
    }
}
