//! [`Cog`]: the in-memory model of an opened COG — header, IFD chain, and
//! the byte source tiles are read from.

use std::io::{Read, Seek, SeekFrom};

use crate::compression::{CodecRegistry, PixelArray};
use crate::io::source::PrefetchReader;
use crate::tiff::constants::tags;
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::header::Header;
use crate::tiff::ifd::IFD;

/// The result of [`Cog::read_tile`]: either the tile's raw compressed
/// bytes, or its decoded pixels, depending on whether the caller asked for
/// decoding.
#[derive(Debug, Clone, PartialEq)]
pub enum TileData {
    Raw(Vec<u8>),
    Decoded(PixelArray),
}

/// A parsed COG: header, ordered IFDs (index 0 = full resolution, later
/// indices = successive overview levels), and the byte source tiles are
/// read from on demand.
///
/// The source is borrowed for reads only; a `Cog` mutates only during
/// `write` (offsets and compression tags rewritten in place by the
/// caller, see [`crate::tiff::writer`]).
pub struct Cog<R> {
    pub header: Header,
    ifds: Vec<IFD>,
    source: PrefetchReader<R>,
}

impl<R: Read + Seek> Cog<R> {
    pub fn new(header: Header, ifds: Vec<IFD>, source: PrefetchReader<R>) -> Self {
        Self {
            header,
            ifds,
            source,
        }
    }

    pub fn ifds(&self) -> &[IFD] {
        &self.ifds
    }

    pub fn ifds_mut(&mut self) -> &mut Vec<IFD> {
        &mut self.ifds
    }

    /// Reads one tile's bytes at `(x, y)` in `level`'s tile grid, optionally
    /// decoding it through the codec registered for the IFD's `Compression`
    /// tag.
    ///
    /// `columns = ceil(ImageWidth / TileWidth)`; `idx = y * columns + x`
    /// indexes `TileOffsets`/`TileByteCounts`.
    pub fn read_tile(
        &mut self,
        x: u64,
        y: u64,
        level: usize,
        codecs: &CodecRegistry,
        decode: bool,
    ) -> TiffResult<TileData> {
        let columns = self
            .ifds
            .get(level)
            .ok_or_else(|| TiffError::InvariantViolation(format!("no IFD at level {}", level)))?
            .tile_columns()
            .ok_or(TiffError::MissingTag("TileWidth"))?;
        let idx = (y * columns + x) as usize;

        let bytes = self.read_raw_tile(level, idx)?;
        if !decode {
            return Ok(TileData::Raw(bytes));
        }

        let ifd = &self.ifds[level];
        let codec = codecs.build_for_ifd(ifd, self.header.endian)?;
        let pixels = codec.decode(&bytes)?;
        Ok(TileData::Decoded(pixels))
    }

    /// Reads tile `idx` (row-major, per `TileOffsets`/`TileByteCounts`
    /// order) of `level` without decoding. Used by the writer, which walks
    /// tiles by index rather than by `(x, y)` coordinate.
    pub(crate) fn read_raw_tile(&mut self, level: usize, idx: usize) -> TiffResult<Vec<u8>> {
        let ifd = self
            .ifds
            .get(level)
            .ok_or_else(|| TiffError::InvariantViolation(format!("no IFD at level {}", level)))?;

        let offsets = ifd
            .get_u64_vec(tags::TILE_OFFSETS)
            .ok_or(TiffError::MissingTag("TileOffsets"))?;
        let byte_counts = ifd
            .get_u64_vec(tags::TILE_BYTE_COUNTS)
            .ok_or(TiffError::MissingTag("TileByteCounts"))?;

        let offset = *offsets
            .get(idx)
            .ok_or_else(|| TiffError::InvariantViolation(format!("tile index {} out of range", idx)))?;
        let byte_count = *byte_counts
            .get(idx)
            .ok_or_else(|| TiffError::InvariantViolation(format!("tile index {} out of range", idx)))?;

        self.source.seek(SeekFrom::Start(offset))?;
        let mut bytes = vec![0u8; byte_count as usize];
        self.source.read_exact(&mut bytes).map_err(|_| {
            TiffError::Truncated(format!(
                "tile {} at level {} truncated at offset {}",
                idx, level, offset
            ))
        })?;
        Ok(bytes)
    }

    /// Number of tiles in `level`'s `TileOffsets` array.
    pub(crate) fn tile_count(&self, level: usize) -> TiffResult<usize> {
        let ifd = self
            .ifds
            .get(level)
            .ok_or_else(|| TiffError::InvariantViolation(format!("no IFD at level {}", level)))?;
        Ok(ifd
            .get_u64_vec(tags::TILE_OFFSETS)
            .ok_or(TiffError::MissingTag("TileOffsets"))?
            .len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiff::constants::{field_types, tags as t};
    use crate::tiff::field_type::lookup;
    use crate::tiff::tag::{Tag, Value};
    use std::io::Cursor;

    fn short_tag(id: u16, values: Vec<u16>) -> Tag {
        let field_type = lookup(field_types::SHORT).unwrap();
        let count = values.len() as u32;
        Tag::new(id, "x", field_type, count, Value::Shorts(values))
    }

    fn long_tag(id: u16, values: Vec<u32>) -> Tag {
        let field_type = lookup(field_types::LONG).unwrap();
        let count = values.len() as u32;
        Tag::new(id, "x", field_type, count, Value::Longs(values))
    }

    #[test]
    fn read_tile_seeks_to_tile_offsets_entry() {
        let mut ifd = IFD::new();
        ifd.insert(short_tag(t::IMAGE_WIDTH, vec![8]));
        ifd.insert(short_tag(t::IMAGE_LENGTH, vec![4]));
        ifd.insert(short_tag(t::TILE_WIDTH, vec![4]));
        ifd.insert(short_tag(t::TILE_LENGTH, vec![4]));
        ifd.insert(long_tag(t::TILE_OFFSETS, vec![100, 200]));
        ifd.insert(long_tag(t::TILE_BYTE_COUNTS, vec![4, 4]));

        let mut data = vec![0u8; 300];
        data[200..204].copy_from_slice(&[1, 2, 3, 4]);

        let header = Header {
            endian: crate::io::byte_order::Endian::Little,
            version: crate::tiff::header::Version::Tiff,
            first_ifd_offset: 8,
        };
        let source = PrefetchReader::with_default_prefetch(Cursor::new(data)).unwrap();
        let mut cog = Cog::new(header, vec![ifd], source);

        let codecs = CodecRegistry::default();
        // tile (1, 0) -> idx = 0*2 + 1 = 1 -> TileOffsets[1] = 200
        let result = cog.read_tile(1, 0, 0, &codecs, false).unwrap();
        assert_eq!(result, TileData::Raw(vec![1, 2, 3, 4]));
    }
}
