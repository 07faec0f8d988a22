//! Static Huffman compression of byte streams.
//!
//! The input is scanned once for byte frequencies, a Huffman tree is built
//! over the symbols that occur, and the tree's leaf weights are written as a
//! header in front of the packed codewords. [`encode`] and [`decode`] work on
//! any `Read`/`Write` pair; [`compress`] and [`decompress`] are in-memory
//! shortcuts.

pub mod bitstream;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod frequency;
pub mod header;
pub mod huffman;

use std::io::Cursor;

pub use decoder::{DecodeReport, decode};
pub use encoder::{EncodeReport, encode};
pub use error::{HuffmanError, Result};
pub use frequency::FrequencyTable;
pub use huffman::{NodeSequence, Tag};

pub fn compress(data: &[u8]) -> Result<Vec<u8>> {
    let mut output = Vec::new();
    encode(&mut Cursor::new(data), &mut output)?;
    Ok(output)
}

pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    let mut output = Vec::new();
    decode(&mut Cursor::new(data), &mut output)?;
    Ok(output)
}
