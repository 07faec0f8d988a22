//! Stream header: everything the decoder needs to rebuild the tree.
//!
//! ```text
//! original size   4 bytes  big-endian
//! active symbols  1 byte   count mod 256
//! entries         5 bytes each: symbol, weight (4 bytes big-endian)
//! ```
//!
//! A count byte of 0 means no symbols when the original size is 0 and all
//! 256 symbols otherwise, since non-empty input always has a symbol.

use std::io::{ErrorKind, Read};

use log::{debug, warn};

use crate::error::{HuffmanError, Result};
use crate::huffman::NodeSequence;

pub const FIXED_LEN: usize = 5;
pub const ENTRY_LEN: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub original_size: u32,
    /// `(symbol, weight)` in ascending symbol order.
    pub entries: Vec<(u8, u32)>,
}

impl Header {
    pub fn encoded_len(&self) -> usize {
        FIXED_LEN + self.entries.len() * ENTRY_LEN
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.encoded_len());
        bytes.extend_from_slice(&self.original_size.to_be_bytes());
        bytes.push((self.entries.len() % 256) as u8);
        for &(symbol, weight) in &self.entries {
            bytes.push(symbol);
            bytes.extend_from_slice(&weight.to_be_bytes());
        }
        bytes
    }
}

/// Serializes the leaf weights of `sequence` behind the original byte count.
///
/// Leaf weights never exceed `original_size`, so they fit the 4-byte field.
pub fn encode_header(original_size: u32, sequence: &NodeSequence) -> Vec<u8> {
    let header = Header {
        original_size,
        entries: sequence
            .leaves()
            .map(|(symbol, weight)| (symbol, weight as u32))
            .collect(),
    };
    let bytes = header.to_bytes();
    debug!(
        "Header generated: {} symbols, {} bytes",
        header.entries.len(),
        bytes.len()
    );
    bytes
}

pub fn decode_header(mut bytes: &[u8]) -> Result<Header> {
    read_header(&mut bytes)
}

/// Reads exactly one header from `input`, leaving the payload unread.
pub fn read_header<R: Read>(input: &mut R) -> Result<Header> {
    let original_size = u32::from_be_bytes(read_field(input)?);
    let [count] = read_field::<_, 1>(input)?;
    let active = match (count, original_size) {
        (0, 0) => 0,
        (0, _) => 256,
        (n, _) => n as usize,
    };
    debug!(
        "Header: original size {}, {} active symbols",
        original_size, active
    );

    let mut entries: Vec<(u8, u32)> = Vec::with_capacity(active);
    for _ in 0..active {
        let [symbol, w0, w1, w2, w3] = read_field::<_, ENTRY_LEN>(input)?;
        let weight = u32::from_be_bytes([w0, w1, w2, w3]);
        if weight == 0 {
            return Err(HuffmanError::malformed(format!(
                "symbol {:#04x} has zero weight",
                symbol
            )));
        }
        if let Some(&(previous, _)) = entries.last() {
            if symbol <= previous {
                return Err(HuffmanError::malformed(format!(
                    "symbol {:#04x} follows {:#04x}",
                    symbol, previous
                )));
            }
        }
        entries.push((symbol, weight));
    }

    let total: u64 = entries.iter().map(|&(_, weight)| weight as u64).sum();
    if total != original_size as u64 {
        warn!(
            "Header weights sum to {} but original size is {}",
            total, original_size
        );
        return Err(HuffmanError::malformed(format!(
            "weights sum to {}, expected {}",
            total, original_size
        )));
    }

    Ok(Header {
        original_size,
        entries,
    })
}

fn read_field<R: Read, const N: usize>(input: &mut R) -> Result<[u8; N]> {
    let mut field = [0u8; N];
    input.read_exact(&mut field).map_err(|e| match e.kind() {
        ErrorKind::UnexpectedEof => HuffmanError::PrematureEndOfHeader,
        _ => HuffmanError::Io(e),
    })?;
    Ok(field)
}
