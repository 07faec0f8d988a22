//! Bit-granularity reader and writer over byte streams.
//!
//! Bits are packed MSB-first: the first bit written lands in bit 7 of the
//! first byte. Both sides buffer [`BUFFER_SIZE`] bytes at a time.

use std::io::{self, ErrorKind, Read, Write};

use log::trace;

/// Default buffer size in bytes for both reader and writer.
pub const BUFFER_SIZE: usize = 256;

pub struct BitWriter<W: Write> {
    inner: W,
    buffer: Vec<u8>,
    bits_in_buffer: usize,
    bytes_written: u64,
}

impl<W: Write> BitWriter<W> {
    pub fn new(inner: W) -> Self {
        Self::with_capacity(BUFFER_SIZE, inner)
    }

    /// Buffers `capacity` bytes between writes; 0 is treated as 1.
    pub fn with_capacity(capacity: usize, inner: W) -> Self {
        BitWriter {
            inner,
            buffer: vec![0; capacity.max(1)],
            bits_in_buffer: 0,
            bytes_written: 0,
        }
    }

    /// Appends one bit. A full buffer is written out before the bit is stored.
    pub fn write_bit(&mut self, bit: bool) -> io::Result<()> {
        if self.bits_in_buffer == self.buffer.len() * 8 {
            self.inner.write_all(&self.buffer)?;
            self.bytes_written += self.buffer.len() as u64;
            self.buffer.fill(0);
            self.bits_in_buffer = 0;
        }
        if bit {
            self.buffer[self.bits_in_buffer >> 3] |= 0x80 >> (self.bits_in_buffer % 8);
        }
        self.bits_in_buffer += 1;
        Ok(())
    }

    pub fn write_bits(&mut self, bits: &[bool]) -> io::Result<()> {
        for &bit in bits {
            self.write_bit(bit)?;
        }
        Ok(())
    }

    /// Writes the partially filled buffer, zero-padding the last byte.
    ///
    /// Must be called once after the last bit; dropping the writer without it
    /// loses whatever is still buffered.
    pub fn flush(&mut self) -> io::Result<()> {
        if self.bits_in_buffer > 0 {
            let used = self.bits_in_buffer.div_ceil(8);
            self.inner.write_all(&self.buffer[..used])?;
            self.bytes_written += used as u64;
            trace!(
                "Flushed {} bytes ({} bits, {} padding)",
                used,
                self.bits_in_buffer,
                used * 8 - self.bits_in_buffer
            );
            self.buffer.fill(0);
            self.bits_in_buffer = 0;
        }
        self.inner.flush()
    }

    /// Bytes handed to the inner writer so far.
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

pub struct BitReader<R: Read> {
    inner: R,
    buffer: Vec<u8>,
    bits_in_buffer: usize,
    current_bit: usize,
    eof: bool,
}

impl<R: Read> BitReader<R> {
    pub fn new(inner: R) -> Self {
        Self::with_capacity(BUFFER_SIZE, inner)
    }

    /// Reads up to `capacity` bytes per refill; 0 is treated as 1.
    pub fn with_capacity(capacity: usize, inner: R) -> Self {
        BitReader {
            inner,
            buffer: vec![0; capacity.max(1)],
            bits_in_buffer: 0,
            current_bit: 0,
            eof: false,
        }
    }

    /// Next bit, or `None` once the stream is exhausted.
    pub fn read_bit(&mut self) -> io::Result<Option<bool>> {
        if self.current_bit == self.bits_in_buffer && !self.refill()? {
            return Ok(None);
        }
        let byte = self.buffer[self.current_bit >> 3];
        let bit = (byte >> (7 - self.current_bit % 8)) & 1 == 1;
        self.current_bit += 1;
        Ok(Some(bit))
    }

    /// True when only zero padding of the final byte is left.
    pub fn at_padded_end(&mut self) -> io::Result<bool> {
        let remaining = self.bits_in_buffer - self.current_bit;
        if remaining >= 8 {
            return Ok(false);
        }
        while self.current_bit < self.bits_in_buffer {
            let byte = self.buffer[self.current_bit >> 3];
            if (byte >> (7 - self.current_bit % 8)) & 1 == 1 {
                return Ok(false);
            }
            self.current_bit += 1;
        }
        Ok(!self.refill()?)
    }

    fn refill(&mut self) -> io::Result<bool> {
        if self.eof {
            return Ok(false);
        }
        let read = loop {
            match self.inner.read(&mut self.buffer) {
                Ok(n) => break n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        };
        if read == 0 {
            self.eof = true;
        }
        self.bits_in_buffer = read * 8;
        self.current_bit = 0;
        Ok(read > 0)
    }
}
