//! The 8-byte TIFF header: endianness, version, offset to the first IFD.

use std::io::{Read, Seek, SeekFrom, Write};

use crate::io::byte_order::Endian;
use crate::io::seekable::SeekableReader;
use crate::tiff::constants::header as header_consts;
use crate::tiff::errors::{TiffError, TiffResult};

/// The TIFF version field: 42 for classic TIFF, 43 for BigTIFF.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Version {
    Tiff,
    BigTiff,
}

impl Version {
    pub fn code(&self) -> u16 {
        match self {
            Version::Tiff => header_consts::TIFF_VERSION,
            Version::BigTiff => header_consts::BIG_TIFF_VERSION,
        }
    }

    pub fn from_code(code: u16) -> TiffResult<Self> {
        match code {
            v if v == header_consts::TIFF_VERSION => Ok(Version::Tiff),
            v if v == header_consts::BIG_TIFF_VERSION => Ok(Version::BigTiff),
            other => Err(TiffError::UnsupportedVersion(other)),
        }
    }
}

/// The first 8 bytes of a TIFF file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Header {
    pub endian: Endian,
    pub version: Version,
    pub first_ifd_offset: u32,
}

impl Header {
    /// Reads the 8-byte header from the current position of `reader`.
    ///
    /// BigTIFF (`version == 43`) is recognized, not rejected: it surfaces a
    /// warning through the log facade, since this core only ever reads
    /// 32-bit offsets, which is wrong for a true BigTIFF file beyond the
    /// first few kilobytes.
    pub fn read(reader: &mut dyn SeekableReader) -> TiffResult<Self> {
        reader.seek(SeekFrom::Start(0))?;
        let endian = Endian::detect(reader)?;
        let handler = endian.handler();

        let version_code = handler.read_u16(reader)?;
        let version = Version::from_code(version_code)?;
        if version == Version::BigTiff {
            log::warn!(
                "recognized a BigTIFF header (version 43); this core only supports 32-bit offsets"
            );
        }

        let first_ifd_offset = handler.read_u32(reader)?;

        Ok(Header {
            endian,
            version,
            first_ifd_offset,
        })
    }

    /// Writes the header as 8 bytes, with `first_ifd_offset` fixed at 8 per
    /// the layout policy (the GDAL "ghost header" area is never emitted).
    pub fn write(&self, writer: &mut dyn Write) -> TiffResult<()> {
        writer.write_all(&self.endian.magic())?;
        let handler = self.endian.handler();
        handler.write_u16(writer, self.version.code())?;
        handler.write_u32(writer, self.first_ifd_offset)?;
        Ok(())
    }
}

/// Reads just enough of `source` to determine its header, without
/// requiring a prior seek.
pub fn peek_header<R: Read + Seek>(source: &mut R) -> TiffResult<Header> {
    Header::read(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn scenario_a_header_round_trip() {
        let bytes = [0x49, 0x49, 0x2A, 0x00, 0x08, 0x00, 0x00, 0x00];
        let mut cursor = Cursor::new(bytes.to_vec());
        let header = Header::read(&mut cursor).unwrap();
        assert_eq!(header.endian, Endian::Little);
        assert_eq!(header.version, Version::Tiff);
        assert_eq!(header.first_ifd_offset, 8);

        let mut out = Vec::new();
        header.write(&mut out).unwrap();
        assert_eq!(out, bytes);
    }

    #[test]
    fn big_endian_round_trip() {
        for offset in [0u32, 8, 123456] {
            let header = Header {
                endian: Endian::Big,
                version: Version::Tiff,
                first_ifd_offset: offset,
            };
            let mut out = Vec::new();
            header.write(&mut out).unwrap();
            assert_eq!(&out[0..2], b"MM");

            let mut cursor = Cursor::new(out);
            let parsed = Header::read(&mut cursor).unwrap();
            assert_eq!(parsed, header);
        }
    }

    #[test]
    fn rejects_garbage_magic() {
        let bytes = [0x00, 0x00, 0x2A, 0x00, 0x08, 0x00, 0x00, 0x00];
        let mut cursor = Cursor::new(bytes.to_vec());
        assert!(matches!(
            Header::read(&mut cursor),
            Err(TiffError::InvalidMagic(_))
        ));
    }

    #[test]
    fn recognizes_bigtiff_version() {
        let bytes = [0x49, 0x49, 0x2B, 0x00, 0x08, 0x00, 0x00, 0x00];
        let mut cursor = Cursor::new(bytes.to_vec());
        let header = Header::read(&mut cursor).unwrap();
        assert_eq!(header.version, Version::BigTiff);
    }
}
