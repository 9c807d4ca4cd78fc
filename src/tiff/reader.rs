//! TIFF/COG reader: header, IFD chain, tag values, second-pass
//! `GeoKeyDirectory` parse.
//!
//! Unknown tags and unsupported field types are skipped with a warning
//! rather than failing the whole read — only a truncated or genuinely
//! malformed stream is fatal.

use std::collections::HashSet;
use std::io::{Cursor, Read, Seek, SeekFrom};

use log::warn;

use crate::io::byte_order::Endian;
use crate::io::seekable::SeekableReader;
use crate::io::source::{PrefetchReader, DEFAULT_PREFETCH_SIZE};
use crate::tiff::cog::Cog;
use crate::tiff::constants::tags;
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::field_type::{self, FieldKind, FieldType};
use crate::tiff::geokey::{self, GeoKeyRegistry};
use crate::tiff::header::Header;
use crate::tiff::ifd::IFD;
use crate::tiff::tag::{self, Tag, TagRegistry, Value};

/// Safety cap on the number of IFDs followed in one chain, guarding against
/// a corrupt or cyclic next-IFD-offset.
const MAX_IFDS: usize = 100;

/// Builds a [`TiffReader`] with an optional non-default tag registry,
/// geokey registry, or prefetch size.
pub struct TiffReaderBuilder {
    tag_registry: TagRegistry,
    geokey_registry: GeoKeyRegistry,
    prefetch_size: usize,
}

impl Default for TiffReaderBuilder {
    fn default() -> Self {
        Self {
            tag_registry: tag::default_registry(),
            geokey_registry: geokey::default_registry(),
            prefetch_size: DEFAULT_PREFETCH_SIZE,
        }
    }
}

impl TiffReaderBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tag_registry(mut self, registry: TagRegistry) -> Self {
        self.tag_registry = registry;
        self
    }

    pub fn geokey_registry(mut self, registry: GeoKeyRegistry) -> Self {
        self.geokey_registry = registry;
        self
    }

    pub fn prefetch_size(mut self, size: usize) -> Self {
        self.prefetch_size = size;
        self
    }

    pub fn build(self) -> TiffReader {
        TiffReader {
            tag_registry: self.tag_registry,
            geokey_registry: self.geokey_registry,
            prefetch_size: self.prefetch_size,
        }
    }
}

/// Parses a byte source into a [`Cog`]: the header, then the full IFD chain
/// with every tag resolved and every `GeoKeyDirectory` parsed.
pub struct TiffReader {
    tag_registry: TagRegistry,
    geokey_registry: GeoKeyRegistry,
    prefetch_size: usize,
}

impl Default for TiffReader {
    fn default() -> Self {
        TiffReaderBuilder::default().build()
    }
}

impl TiffReader {
    /// Wraps `source` in a [`PrefetchReader`] and parses header + IFD chain.
    pub fn open<R: Read + Seek>(&self, source: R) -> TiffResult<Cog<R>> {
        let mut prefetch = PrefetchReader::new(source, self.prefetch_size)?;
        let header = Header::read(&mut prefetch)?;
        let ifds = self.read_ifd_chain(&mut prefetch, header.endian, header.first_ifd_offset)?;
        Ok(Cog::new(header, ifds, prefetch))
    }

    fn read_ifd_chain(
        &self,
        reader: &mut dyn SeekableReader,
        endian: Endian,
        first_offset: u32,
    ) -> TiffResult<Vec<IFD>> {
        let mut ifds = Vec::new();
        let mut offset = first_offset as u64;
        let mut visited = HashSet::new();

        while offset != 0 {
            if ifds.len() >= MAX_IFDS {
                warn!("stopping after {} IFDs, possible cyclic chain", MAX_IFDS);
                break;
            }
            if !visited.insert(offset) {
                warn!("IFD chain revisits offset {}, stopping", offset);
                break;
            }

            let ifd = self.read_ifd(reader, endian, offset)?;
            offset = ifd.next_ifd_offset as u64;
            ifds.push(ifd);
        }

        Ok(ifds)
    }

    fn read_ifd(&self, reader: &mut dyn SeekableReader, endian: Endian, offset: u64) -> TiffResult<IFD> {
        reader.seek(SeekFrom::Start(offset))?;
        let handler = endian.handler();
        let entry_count = handler.read_u16(reader)?;

        let mut ifd = IFD::new();
        for _ in 0..entry_count {
            if let Some(tag) = self.read_entry(reader, endian)? {
                ifd.insert(tag);
            }
        }

        ifd.next_ifd_offset = handler.read_u32(reader)?;

        if let Some(directory_tag) = ifd.get(tags::GEO_KEY_DIRECTORY) {
            if let Some(shorts) = directory_tag.value.as_u16_vec() {
                ifd.geokeys = Some(geokey::parse_geo_key_directory(
                    &shorts,
                    &ifd,
                    &self.geokey_registry,
                ));
            }
        }

        Ok(ifd)
    }

    /// Reads one 12-byte IFD entry. Returns `None`, after logging a
    /// warning, for an unrecognized tag id or field type — everything else
    /// is read as-is.
    fn read_entry(&self, reader: &mut dyn SeekableReader, endian: Endian) -> TiffResult<Option<Tag>> {
        let handler = endian.handler();
        let tag_id = handler.read_u16(reader)?;
        let field_type_code = handler.read_u16(reader)?;
        let count = handler.read_u32(reader)?;

        let mut raw = [0u8; 4];
        reader.read_exact(&mut raw)?;

        let name = match self.tag_registry.get(tag_id) {
            Some(name) => name,
            None => {
                warn!("skipping unknown tag {}", tag_id);
                return Ok(None);
            }
        };

        let field_type = match field_type::lookup(field_type_code) {
            Some(field_type) => field_type,
            None => {
                warn!(
                    "tag {} ({}) has unsupported field type {}, skipping",
                    tag_id, name, field_type_code
                );
                return Ok(None);
            }
        };

        let size = count as u64 * field_type.length as u64;
        let value = if size <= 4 {
            decode_values(&raw[..size as usize], field_type, count, endian)?
        } else {
            let mut offset_cursor = Cursor::new(raw.to_vec());
            let offset = handler.read_u32(&mut offset_cursor)? as u64;
            reader.seek(SeekFrom::Start(offset))?;
            let mut bytes = vec![0u8; size as usize];
            reader.read_exact(&mut bytes).map_err(|_| {
                TiffError::Truncated(format!(
                    "tag {} ({}) value at offset {} truncated",
                    tag_id, name, offset
                ))
            })?;
            decode_values(&bytes, field_type, count, endian)?
        };

        Ok(Some(Tag::new(tag_id, name, field_type, count, value)))
    }
}

/// Decodes `count` values of `field_type` out of `bytes`, which holds
/// exactly `count * field_type.length` bytes.
fn decode_values(
    bytes: &[u8],
    field_type: FieldType,
    count: u32,
    endian: Endian,
) -> TiffResult<Value> {
    let handler = endian.handler();
    match field_type.kind {
        FieldKind::Byte | FieldKind::Undefined => Ok(Value::Bytes(bytes.to_vec())),
        FieldKind::Ascii => {
            let trimmed = bytes.strip_suffix(&[0u8]).unwrap_or(bytes);
            Ok(Value::Ascii(String::from_utf8_lossy(trimmed).into_owned()))
        }
        FieldKind::Short => {
            let mut cursor = Cursor::new(bytes.to_vec());
            let mut values = Vec::with_capacity(count as usize);
            for _ in 0..count {
                values.push(handler.read_u16(&mut cursor)?);
            }
            Ok(Value::Shorts(values))
        }
        FieldKind::Long => {
            let mut cursor = Cursor::new(bytes.to_vec());
            let mut values = Vec::with_capacity(count as usize);
            for _ in 0..count {
                values.push(handler.read_u32(&mut cursor)?);
            }
            Ok(Value::Longs(values))
        }
        FieldKind::Rational => {
            let mut cursor = Cursor::new(bytes.to_vec());
            let mut values = Vec::with_capacity(count as usize);
            for _ in 0..count {
                let numerator = handler.read_u32(&mut cursor)?;
                let denominator = handler.read_u32(&mut cursor)?;
                values.push((numerator, denominator));
            }
            Ok(Value::Rationals(values))
        }
        FieldKind::Double => {
            let mut cursor = Cursor::new(bytes.to_vec());
            let mut values = Vec::with_capacity(count as usize);
            for _ in 0..count {
                values.push(handler.read_f64(&mut cursor)?);
            }
            Ok(Value::Doubles(values))
        }
        FieldKind::Long8 => {
            let mut cursor = Cursor::new(bytes.to_vec());
            let mut values = Vec::with_capacity(count as usize);
            for _ in 0..count {
                values.push(handler.read_u64(&mut cursor)?);
            }
            Ok(Value::Longs8(values))
        }
    }
}
