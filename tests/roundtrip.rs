use std::io::Cursor;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use static_huffman::header::{FIXED_LEN, decode_header};
use static_huffman::{
    FrequencyTable, HuffmanError, NodeSequence, compress, decode, decompress, encode,
};

fn round_trip(data: &[u8]) -> Vec<u8> {
    let encoded = compress(data).unwrap();
    let decoded = decompress(&encoded).unwrap();
    assert_eq!(decoded, data);
    encoded
}

#[test]
fn empty_input() {
    let encoded = round_trip(&[]);
    assert_eq!(encoded, vec![0; FIXED_LEN]);
}

#[test]
fn single_byte_inputs() {
    for byte in [0u8, 0x41, 0xff] {
        round_trip(&[byte]);
    }
}

#[test]
fn repeated_single_symbol() {
    let data = vec![0x41; 1000];
    let encoded = round_trip(&data);
    // 10 header bytes, then one bit per symbol.
    assert_eq!(encoded.len(), 10 + 125);
}

#[test]
fn text_compresses() {
    let data = b"It was the best of times, it was the worst of times, it was the age of \
                 wisdom, it was the age of foolishness, it was the epoch of belief, it was \
                 the epoch of incredulity."
        .repeat(20);
    let encoded = round_trip(&data);
    assert!(encoded.len() < data.len());
}

#[test]
fn random_inputs_round_trip() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    for _ in 0..50 {
        let len = rng.gen_range(0..5000);
        let alphabet = rng.gen_range(1..=256u32);
        let data: Vec<u8> = (0..len)
            .map(|_| rng.gen_range(0..alphabet) as u8)
            .collect();
        round_trip(&data);
    }
}

#[test]
fn full_alphabet_geometric_skew() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut data = Vec::new();
    for symbol in 0..=255u8 {
        data.push(symbol);
    }
    for _ in 0..100_000 {
        // Geometric: symbol k with probability about 2^-(k+1), capped at 255.
        let mut symbol = 0u8;
        while symbol < 255 && rng.gen_bool(0.5) {
            symbol += 1;
        }
        data.push(symbol);
    }

    let encoded = round_trip(&data);
    let header = decode_header(&encoded).unwrap();
    assert_eq!(header.entries.len(), 256);

    let tree = NodeSequence::from_frequencies(&FrequencyTable::from_bytes(&data)).unwrap();
    assert_eq!(tree.internal_count(), 255);
    assert_eq!(tree.len(), 511);
}

#[test]
fn payload_length_matches_code_lengths() {
    let data = b"abracadabra, alakazam, hocus pocus".repeat(7);
    let tree = NodeSequence::from_frequencies(&FrequencyTable::from_bytes(&data)).unwrap();
    let bits: u64 = tree
        .leaves()
        .map(|(symbol, weight)| weight * tree.codeword_for(symbol).unwrap().len() as u64)
        .sum();

    let mut encoded = Vec::new();
    let report = encode(&mut Cursor::new(&data), &mut encoded).unwrap();
    assert_eq!(report.payload_size, bits.div_ceil(8));
    assert_eq!(report.total_size(), encoded.len() as u64);
}

#[test]
fn dropping_last_payload_byte_is_truncation() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..20 {
        let len = rng.gen_range(1..2000);
        let data: Vec<u8> = (0..len).map(|_| rng.gen_range(b'a'..=b'h')).collect();
        let mut encoded = compress(&data).unwrap();
        encoded.pop();
        let mut output = Vec::new();
        match decode(&mut Cursor::new(&encoded), &mut output) {
            Err(HuffmanError::TruncatedStream { decoded, expected }) => {
                assert_eq!(expected, data.len() as u64);
                assert!(decoded < expected);
                assert_eq!(output, data[..decoded as usize]);
            }
            other => panic!("expected truncation, got {:?}", other),
        }
    }
}

#[test]
fn truncated_header_is_reported() {
    let encoded = compress(b"some input").unwrap();
    assert!(matches!(
        decompress(&encoded[..FIXED_LEN + 2]),
        Err(HuffmanError::PrematureEndOfHeader)
    ));
}
