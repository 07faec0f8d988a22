//! Error type shared by every stage of the codec.

use std::io;

use thiserror::Error;

/// Everything that can go wrong while encoding or decoding.
#[derive(Error, Debug)]
pub enum HuffmanError {
    /// Reading or writing one of the underlying streams failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The node sequence or its lookup tables could not be allocated.
    #[error("memory allocation failed: requested {size} slots")]
    OutOfMemory { size: usize },

    /// The stream ended before the header was complete.
    #[error("premature end of header")]
    PrematureEndOfHeader,

    /// The header was read in full but its contents don't describe a valid tree.
    #[error("malformed header: {message}")]
    MalformedHeader { message: String },

    /// The payload ran out before every recorded byte was decoded.
    #[error("truncated stream: decoded {decoded} of {expected} bytes")]
    TruncatedStream { decoded: u64, expected: u64 },

    /// The payload holds a bit sequence no codeword produces.
    #[error("corrupt payload: {message}")]
    CorruptPayload { message: String },

    /// More payload followed the last codeword than padding allows.
    #[error("trailing data after {expected} decoded bytes")]
    TrailingData { expected: u64 },

    /// The input is longer than the 4-byte size field can record.
    #[error("input too large: {size} bytes")]
    InputTooLarge { size: u64 },

    /// The second pass over the input saw different bytes than the first.
    #[error("input changed between passes: {message}")]
    InputChanged { message: String },

    /// Misuse of the node sequence builder.
    #[error("tree construction error: {message}")]
    Tree { message: String },
}

pub type Result<T> = std::result::Result<T, HuffmanError>;

impl HuffmanError {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        HuffmanError::MalformedHeader {
            message: message.into(),
        }
    }

    pub(crate) fn tree(message: impl Into<String>) -> Self {
        HuffmanError::Tree {
            message: message.into(),
        }
    }
}
