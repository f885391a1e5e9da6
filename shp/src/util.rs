use crate::result::{Error, Result};
use byteorder::{BigEndian, ByteOrder, LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{self, Read, Write};

/// Packs a double as little endian bytes, whatever the host byte order is.
pub fn encode_le_double(value: f64) -> [u8; 8] {
    let mut buf = [0u8; 8];
    LittleEndian::write_f64(&mut buf, value);
    buf
}

/// Inverse of [encode_le_double].
pub fn decode_le_double(bytes: [u8; 8]) -> f64 {
    LittleEndian::read_f64(&bytes)
}

/// A byte source positioned at the start of a record.
///
/// Keeps track of how many bytes have been consumed so a short read can report
/// where inside the record it happened.
pub struct ShpReader<R> {
    inner: R,
    offset: u64,
}

impl<R: Read> ShpReader<R> {
    pub fn new(inner: R) -> Self {
        ShpReader { inner, offset: 0 }
    }

    /// Bytes consumed since the reader was created
    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    fn read_error(&self, e: io::Error, needed: usize) -> Error {
        match e.kind() {
            io::ErrorKind::UnexpectedEof => Error::TruncatedInput {
                offset: self.offset,
                needed,
            },
            _ => Error::Read(e),
        }
    }

    pub fn read_f64(&mut self) -> Result<f64> {
        let mut buf = [0u8; 8];
        match self.inner.read_exact(&mut buf) {
            Ok(()) => {
                self.offset += 8;
                Ok(decode_le_double(buf))
            }
            Err(e) => Err(self.read_error(e, 8)),
        }
    }

    pub fn read_u32_le(&mut self) -> Result<u32> {
        match self.inner.read_u32::<LittleEndian>() {
            Ok(v) => {
                self.offset += 4;
                Ok(v)
            }
            Err(e) => Err(self.read_error(e, 4)),
        }
    }

    pub fn read_u32_be(&mut self) -> Result<u32> {
        match self.inner.read_u32::<BigEndian>() {
            Ok(v) => {
                self.offset += 4;
                Ok(v)
            }
            Err(e) => Err(self.read_error(e, 4)),
        }
    }
}

/// A byte sink that records are written into.
pub struct ShpWriter<W> {
    inner: W,
    written: u64,
}

impl<W: Write> ShpWriter<W> {
    pub fn new(inner: W) -> Self {
        ShpWriter { inner, written: 0 }
    }

    /// Bytes written since the writer was created
    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn into_inner(self) -> W {
        self.inner
    }

    pub fn write_f64(&mut self, value: f64) -> Result<()> {
        self.inner
            .write_all(&encode_le_double(value))
            .map_err(Error::UnwritableSink)?;
        self.written += 8;
        Ok(())
    }

    pub fn write_u32_le(&mut self, value: u32) -> Result<()> {
        self.inner
            .write_u32::<LittleEndian>(value)
            .map_err(Error::UnwritableSink)?;
        self.written += 4;
        Ok(())
    }

    pub fn write_u32_be(&mut self, value: u32) -> Result<()> {
        self.inner
            .write_u32::<BigEndian>(value)
            .map_err(Error::UnwritableSink)?;
        self.written += 4;
        Ok(())
    }
}
