use thiserror::Error;

/// Errors from announcement and proof wire decoding.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WireError {
    /// Input ended before a complete header or payload could be read.
    #[error("truncated input: wanted {wanted} bytes, {remaining} remaining")]
    Truncated {
        /// Bytes the decoder needed next.
        wanted: usize,
        /// Bytes actually left in the input.
        remaining: usize,
    },
    /// Bytes found after the end section.
    #[error("trailing bytes after end section: {0}")]
    TrailingBytes(usize),
    /// The same section type appeared twice.
    #[error("duplicate section type {0}")]
    DuplicateSection(u32),
    /// A required section never appeared before the end section.
    #[error("missing required section type {0}")]
    MissingSection(u32),
    /// A section's declared length is invalid for its type.
    #[error("section type {section} has invalid length {length}")]
    SectionLength {
        /// The offending section type.
        section: u32,
        /// The declared payload length.
        length: u32,
    },
    /// An announcement was not exactly 1024 bytes.
    #[error("announcement must be {expected} bytes, got {actual}")]
    AnnouncementLength {
        /// Required announcement size.
        expected: usize,
        /// Size actually supplied.
        actual: usize,
    },
}
