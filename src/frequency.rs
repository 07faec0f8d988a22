use std::io::{self, ErrorKind, Read};

use log::debug;

const READ_CHUNK: usize = 8 * 1024;

/// Byte histogram of one input, plus the number of bytes seen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: [u64; 256],
    total: u64,
}

impl Default for FrequencyTable {
    fn default() -> Self {
        FrequencyTable {
            counts: [0; 256],
            total: 0,
        }
    }
}

impl FrequencyTable {
    /// Reads `input` to the end, counting every byte once.
    pub fn collect<R: Read>(input: &mut R) -> io::Result<Self> {
        let mut table = FrequencyTable::default();
        let mut chunk = [0u8; READ_CHUNK];
        loop {
            let read = match input.read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            table.add(&chunk[..read]);
        }
        debug!(
            "Collected {} bytes over {} distinct symbols",
            table.total,
            table.active_symbols()
        );
        Ok(table)
    }

    pub fn from_bytes(data: &[u8]) -> Self {
        let mut table = FrequencyTable::default();
        table.add(data);
        table
    }

    fn add(&mut self, data: &[u8]) {
        for &byte in data {
            self.counts[byte as usize] += 1;
        }
        self.total += data.len() as u64;
    }

    pub fn count(&self, symbol: u8) -> u64 {
        self.counts[symbol as usize]
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn active_symbols(&self) -> usize {
        self.counts.iter().filter(|&&c| c > 0).count()
    }

    /// Symbols with a non-zero count, in ascending symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, u64)> + '_ {
        self.counts
            .iter()
            .enumerate()
            .filter(|(_, count)| **count > 0)
            .map(|(symbol, &count)| (symbol as u8, count))
    }

    /// Shannon entropy in bits per symbol; 0 for an empty table.
    pub fn entropy(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        let total_f = self.total as f64;

        let entropy: f64 = self
            .iter()
            .map(|(_, count)| {
                let p = count as f64 / total_f;
                -p * p.log2()
            })
            .sum();

        debug!(
            "Calculated entropy: {:.4} bits/symbol (Total samples: {})",
            entropy, self.total
        );
        entropy
    }
}
