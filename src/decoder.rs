use std::io::{BufWriter, Read, Write};
use std::time::Instant;

use log::{debug, info, warn};

use crate::bitstream::BitReader;
use crate::error::{HuffmanError, Result};
use crate::header::read_header;
use crate::huffman::{NodeSequence, Tag};

/// Summary of one decode run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeReport {
    pub original_size: u64,
    pub header_size: u64,
    pub active_symbols: usize,
}

/// Decompresses `input` into `output`.
///
/// On a truncated payload the bytes decoded so far are still written to
/// `output` before the error is returned.
pub fn decode<R, W>(input: &mut R, output: &mut W) -> Result<DecodeReport>
where
    R: Read,
    W: Write,
{
    let header = read_header(input)?;
    let report = DecodeReport {
        original_size: header.original_size as u64,
        header_size: header.encoded_len() as u64,
        active_symbols: header.entries.len(),
    };
    if header.entries.is_empty() {
        debug!("Empty stream, nothing to decode");
        if !BitReader::new(input).at_padded_end()? {
            warn!("Data follows an empty header");
            return Err(HuffmanError::TrailingData { expected: 0 });
        }
        output.flush()?;
        return Ok(report);
    }

    let tree = NodeSequence::from_entries(&header.entries)?;
    let mut bits = BitReader::new(input);
    let mut out = BufWriter::new(&mut *output);

    let outcome = decode_payload(&tree, &mut bits, &mut out, report.original_size);
    out.flush()?;
    outcome?;

    info!("Decoded {} bytes", report.original_size);
    Ok(report)
}

fn decode_payload<R: Read, W: Write>(
    tree: &NodeSequence,
    bits: &mut BitReader<R>,
    out: &mut W,
    expected: u64,
) -> Result<()> {
    debug!("Starting bitstream decoding...");
    let start_time = Instant::now();
    let Some(root) = tree.root() else {
        return Err(HuffmanError::tree("decoding with an empty tree"));
    };

    let mut decoded = 0u64;
    let mut current = root;
    while decoded < expected {
        let Some(bit) = bits.read_bit()? else {
            warn!("Stream ended after {} of {} bytes", decoded, expected);
            return Err(HuffmanError::TruncatedStream { decoded, expected });
        };
        if bit && matches!(root, Tag::Leaf(_)) {
            return Err(HuffmanError::CorruptPayload {
                message: format!("bit 1 after {} bytes of a single-symbol stream", decoded),
            });
        }
        current = tree.descend(current, bit);
        if let Tag::Leaf(symbol) = current {
            out.write_all(&[symbol])?;
            decoded += 1;
            current = root;
        }
    }

    if !bits.at_padded_end()? {
        warn!("Data follows the last of {} decoded bytes", expected);
        return Err(HuffmanError::TrailingData { expected });
    }

    debug!("Bitstream decoding finished in {:.2?}.", start_time.elapsed());
    Ok(())
}
