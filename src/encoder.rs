use std::io::{BufReader, Read, Seek, SeekFrom, Write};

use log::{debug, info};

use crate::bitstream::BitWriter;
use crate::error::{HuffmanError, Result};
use crate::frequency::FrequencyTable;
use crate::header::encode_header;
use crate::huffman::NodeSequence;

/// Summary of one encode run.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodeReport {
    pub original_size: u64,
    pub header_size: u64,
    pub payload_size: u64,
    pub active_symbols: usize,
    /// Bits per symbol of the input.
    pub entropy: f64,
}

impl EncodeReport {
    pub fn total_size(&self) -> u64 {
        self.header_size + self.payload_size
    }

    /// Space saved as a percentage of the original size.
    pub fn ratio(&self) -> f64 {
        if self.original_size > 0 {
            100.0 * (1.0 - (self.total_size() as f64) / (self.original_size as f64))
        } else {
            0.0
        }
    }
}

/// Compresses `input` into `output`.
///
/// The input is read twice: once for statistics, then again from the position
/// it had when this was called to emit codewords.
pub fn encode<R, W>(input: &mut R, output: &mut W) -> Result<EncodeReport>
where
    R: Read + Seek,
    W: Write,
{
    let start = input.stream_position()?;
    let frequencies = FrequencyTable::collect(input)?;
    let original_size = u32::try_from(frequencies.total()).map_err(|_| {
        HuffmanError::InputTooLarge {
            size: frequencies.total(),
        }
    })?;

    let tree = NodeSequence::from_frequencies(&frequencies)?;
    let header = encode_header(original_size, &tree);
    output.write_all(&header)?;

    input.seek(SeekFrom::Start(start))?;
    let table = tree.code_table();
    let mut writer = BitWriter::new(&mut *output);
    let mut reader = BufReader::new(&mut *input);
    let mut emitted = 0u64;

    debug!("Starting data encoding...");
    let mut chunk = [0u8; 8 * 1024];
    loop {
        let read = match reader.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };
        for &byte in &chunk[..read] {
            let code = &table[byte as usize];
            if code.is_empty() {
                return Err(HuffmanError::InputChanged {
                    message: format!("byte {:#04x} was not seen on the first pass", byte),
                });
            }
            writer.write_bits(code)?;
        }
        emitted += read as u64;
    }
    if emitted != frequencies.total() {
        return Err(HuffmanError::InputChanged {
            message: format!(
                "first pass read {} bytes, second pass {}",
                frequencies.total(),
                emitted
            ),
        });
    }
    writer.flush()?;

    let report = EncodeReport {
        original_size: frequencies.total(),
        header_size: header.len() as u64,
        payload_size: writer.bytes_written(),
        active_symbols: frequencies.active_symbols(),
        entropy: frequencies.entropy(),
    };
    info!(
        "Encoded {} bytes into {} header + {} payload bytes",
        report.original_size, report.header_size, report.payload_size
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::{FIXED_LEN, decode_header};
    use std::io::{self, Cursor};

    /// Serves `first` until the encoder rewinds, then `second`.
    struct ChangingInput {
        first: Cursor<Vec<u8>>,
        second: Cursor<Vec<u8>>,
        rewound: bool,
    }

    impl ChangingInput {
        fn new(first: &[u8], second: &[u8]) -> Self {
            ChangingInput {
                first: Cursor::new(first.to_vec()),
                second: Cursor::new(second.to_vec()),
                rewound: false,
            }
        }
    }

    impl Read for ChangingInput {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.rewound {
                self.second.read(buf)
            } else {
                self.first.read(buf)
            }
        }
    }

    impl Seek for ChangingInput {
        fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
            if let SeekFrom::Current(0) = pos {
                return Ok(self.first.position());
            }
            self.rewound = true;
            self.second.seek(pos)
        }
    }

    fn encode_vec(data: &[u8]) -> (Vec<u8>, EncodeReport) {
        let mut output = Vec::new();
        let report = encode(&mut Cursor::new(data), &mut output).unwrap();
        (output, report)
    }

    #[test]
    fn empty_input_writes_only_header() {
        let (output, report) = encode_vec(&[]);
        assert_eq!(output, vec![0; FIXED_LEN]);
        assert_eq!(report.payload_size, 0);
        assert_eq!(report.active_symbols, 0);
        assert_eq!(report.ratio(), 0.0);
    }

    #[test]
    fn single_symbol_costs_one_bit_each() {
        let (output, report) = encode_vec(&[0x41; 1000]);
        assert_eq!(report.header_size, 10);
        assert_eq!(report.payload_size, 125);
        assert_eq!(output.len(), 135);
        assert!(output[10..].iter().all(|&b| b == 0));
    }

    #[test]
    fn payload_matches_code_table() {
        // a:1 b:1 c:2 gives a=01 b=00 c=1, so "abcc" packs to 0100 11.. -> 0b0100_1100.
        let (output, report) = encode_vec(b"abcc");
        let header = decode_header(&output).unwrap();
        assert_eq!(header.entries, vec![(b'a', 1), (b'b', 1), (b'c', 2)]);
        assert_eq!(report.payload_size, 1);
        assert_eq!(output.last(), Some(&0b0100_1100));
    }

    #[test]
    fn unseen_byte_on_second_pass_is_rejected() {
        let mut output = Vec::new();
        let err = encode(&mut ChangingInput::new(b"aabb", b"aabc"), &mut output).unwrap_err();
        assert!(matches!(err, HuffmanError::InputChanged { .. }));
    }

    #[test]
    fn shorter_second_pass_is_rejected() {
        let mut output = Vec::new();
        let err = encode(&mut ChangingInput::new(b"aabb", b"aab"), &mut output).unwrap_err();
        assert!(matches!(err, HuffmanError::InputChanged { .. }));
    }

    #[test]
    fn longer_second_pass_is_rejected() {
        let mut output = Vec::new();
        let err = encode(&mut ChangingInput::new(b"aab", b"aabba"), &mut output).unwrap_err();
        assert!(matches!(err, HuffmanError::InputChanged { .. }));
    }

    #[test]
    fn rewinds_to_starting_position() {
        let mut input = Cursor::new(b"skip:aab".to_vec());
        input.set_position(5);
        let mut output = Vec::new();
        let report = encode(&mut input, &mut output).unwrap();
        assert_eq!(report.original_size, 3);
        assert_eq!(report.active_symbols, 2);
    }
}
