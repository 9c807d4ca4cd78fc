//! Endianness handling for TIFF files
//!
//! This module implements the Strategy pattern for handling the two byte
//! orders a TIFF header can declare (little-endian `II` or big-endian `MM`).

use byteorder::{BigEndian, LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Result, Write};

use crate::io::seekable::SeekableReader;
use crate::tiff::errors::{TiffError, TiffResult};

/// Byte order of a TIFF file, determined by the two-byte magic at the start
/// of the header (`II` -> little, `MM` -> big).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Little,
    Big,
}

impl Endian {
    /// Detects the byte order from the first two bytes of a TIFF header.
    pub fn detect(reader: &mut dyn SeekableReader) -> TiffResult<Self> {
        let marker = reader.read_u16::<LittleEndian>()?;
        match marker {
            0x4949 => Ok(Endian::Little), // "II"
            0x4D4D => Ok(Endian::Big),    // "MM"
            _ => Err(TiffError::InvalidMagic(marker)),
        }
    }

    /// The two-byte magic this endianness is written as.
    pub fn magic(&self) -> [u8; 2] {
        match self {
            Endian::Little => [0x49, 0x49],
            Endian::Big => [0x4D, 0x4D],
        }
    }

    pub fn handler(&self) -> Box<dyn ByteOrderHandler> {
        match self {
            Endian::Little => Box::new(LittleEndianHandler),
            Endian::Big => Box::new(BigEndianHandler),
        }
    }
}

/// Reads and writes multi-byte values in one particular byte order.
pub trait ByteOrderHandler: Send + Sync {
    fn read_u16(&self, reader: &mut dyn SeekableReader) -> Result<u16>;
    fn read_u32(&self, reader: &mut dyn SeekableReader) -> Result<u32>;
    fn read_u64(&self, reader: &mut dyn SeekableReader) -> Result<u64>;
    fn read_i32(&self, reader: &mut dyn SeekableReader) -> Result<i32>;
    fn read_f32(&self, reader: &mut dyn SeekableReader) -> Result<f32>;
    fn read_f64(&self, reader: &mut dyn SeekableReader) -> Result<f64>;

    fn write_u16(&self, writer: &mut dyn Write, value: u16) -> Result<()>;
    fn write_u32(&self, writer: &mut dyn Write, value: u32) -> Result<()>;
    fn write_u64(&self, writer: &mut dyn Write, value: u64) -> Result<()>;
    fn write_i32(&self, writer: &mut dyn Write, value: i32) -> Result<()>;
    fn write_f32(&self, writer: &mut dyn Write, value: f32) -> Result<()>;
    fn write_f64(&self, writer: &mut dyn Write, value: f64) -> Result<()>;
}

pub struct LittleEndianHandler;

impl ByteOrderHandler for LittleEndianHandler {
    fn read_u16(&self, reader: &mut dyn SeekableReader) -> Result<u16> {
        reader.read_u16::<LittleEndian>()
    }
    fn read_u32(&self, reader: &mut dyn SeekableReader) -> Result<u32> {
        reader.read_u32::<LittleEndian>()
    }
    fn read_u64(&self, reader: &mut dyn SeekableReader) -> Result<u64> {
        reader.read_u64::<LittleEndian>()
    }
    fn read_i32(&self, reader: &mut dyn SeekableReader) -> Result<i32> {
        reader.read_i32::<LittleEndian>()
    }
    fn read_f32(&self, reader: &mut dyn SeekableReader) -> Result<f32> {
        reader.read_f32::<LittleEndian>()
    }
    fn read_f64(&self, reader: &mut dyn SeekableReader) -> Result<f64> {
        reader.read_f64::<LittleEndian>()
    }

    fn write_u16(&self, writer: &mut dyn Write, value: u16) -> Result<()> {
        writer.write_u16::<LittleEndian>(value)
    }
    fn write_u32(&self, writer: &mut dyn Write, value: u32) -> Result<()> {
        writer.write_u32::<LittleEndian>(value)
    }
    fn write_u64(&self, writer: &mut dyn Write, value: u64) -> Result<()> {
        writer.write_u64::<LittleEndian>(value)
    }
    fn write_i32(&self, writer: &mut dyn Write, value: i32) -> Result<()> {
        writer.write_i32::<LittleEndian>(value)
    }
    fn write_f32(&self, writer: &mut dyn Write, value: f32) -> Result<()> {
        writer.write_f32::<LittleEndian>(value)
    }
    fn write_f64(&self, writer: &mut dyn Write, value: f64) -> Result<()> {
        writer.write_f64::<LittleEndian>(value)
    }
}

pub struct BigEndianHandler;

impl ByteOrderHandler for BigEndianHandler {
    fn read_u16(&self, reader: &mut dyn SeekableReader) -> Result<u16> {
        reader.read_u16::<BigEndian>()
    }
    fn read_u32(&self, reader: &mut dyn SeekableReader) -> Result<u32> {
        reader.read_u32::<BigEndian>()
    }
    fn read_u64(&self, reader: &mut dyn SeekableReader) -> Result<u64> {
        reader.read_u64::<BigEndian>()
    }
    fn read_i32(&self, reader: &mut dyn SeekableReader) -> Result<i32> {
        reader.read_i32::<BigEndian>()
    }
    fn read_f32(&self, reader: &mut dyn SeekableReader) -> Result<f32> {
        reader.read_f32::<BigEndian>()
    }
    fn read_f64(&self, reader: &mut dyn SeekableReader) -> Result<f64> {
        reader.read_f64::<BigEndian>()
    }

    fn write_u16(&self, writer: &mut dyn Write, value: u16) -> Result<()> {
        writer.write_u16::<BigEndian>(value)
    }
    fn write_u32(&self, writer: &mut dyn Write, value: u32) -> Result<()> {
        writer.write_u32::<BigEndian>(value)
    }
    fn write_u64(&self, writer: &mut dyn Write, value: u64) -> Result<()> {
        writer.write_u64::<BigEndian>(value)
    }
    fn write_i32(&self, writer: &mut dyn Write, value: i32) -> Result<()> {
        writer.write_i32::<BigEndian>(value)
    }
    fn write_f32(&self, writer: &mut dyn Write, value: f32) -> Result<()> {
        writer.write_f32::<BigEndian>(value)
    }
    fn write_f64(&self, writer: &mut dyn Write, value: f64) -> Result<()> {
        writer.write_f64::<BigEndian>(value)
    }
}
