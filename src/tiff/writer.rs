//! Rewrites a [`Cog`] to a byte stream: fresh offsets throughout, and an
//! optional recompression pass into a different [`Destination`] codec.
//!
//! The writer never mutates the `Cog` it is given; it reads tiles and tags
//! out of it, builds a new in-memory layout, and returns the finished
//! bytes. Tag values inside each IFD are cloned and patched as needed
//! (`TileOffsets`, and whatever a transcode pass changes) before they are
//! serialized — the source `Cog` is left exactly as it was.

use std::io::{Read, Seek, Write};

use crate::compression::{CodecRegistry, Destination};
use crate::io::byte_order::Endian;
use crate::tiff::cog::Cog;
use crate::tiff::constants::field_types;
use crate::tiff::constants::tags;
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::field_type::lookup;
use crate::tiff::header::Header;
use crate::tiff::ifd::IFD;
use crate::tiff::tag::{Tag, Value};

/// Compression-related tags a destination codec's `create_tags()` might
/// not re-supply, but which would otherwise survive a transcode describing
/// the old compression. Checked after every transcode's tag merge; a tag
/// the destination did re-supply is left alone.
const CONFLICTING_COMPRESSION_TAGS: &[u16] = &[
    tags::COMPRESSION,
    tags::PHOTOMETRIC_INTERPRETATION,
    tags::CHROMA_SUB_SAMPLING,
    tags::REFERENCE_BLACK_WHITE,
    tags::JPEG_TABLES,
];

/// One IFD's worth of tile bytes, in `TileOffsets` order, plus the tag
/// table it will be serialized with. Built by [`prepare_ifd`] before any
/// offsets are known.
struct PreparedIfd {
    ifd: IFD,
    tile_bytes: Vec<Vec<u8>>,
}

/// One IFD's position in the output: where its body starts, how large the
/// body and out-of-line value area are, and where each out-of-line tag's
/// value lands.
struct IfdLayout {
    start: u64,
    body_size: u64,
    out_of_line_size: u64,
    /// `(tag_id, absolute_offset, encoded_bytes)`, in tag-ascending order.
    out_of_line: Vec<(u16, u64, Vec<u8>)>,
}

/// Rewrites a [`Cog`] into a fresh byte stream.
///
/// With `destination: None`, every tile's bytes are carried over unchanged
/// and only offsets are recomputed. With `destination: Some(_)`, every
/// tile is decoded with its IFD's current codec and re-encoded into the
/// destination compression, and each IFD's compression-related tags are
/// updated to match.
pub struct TiffWriter {
    codecs: CodecRegistry,
}

impl Default for TiffWriter {
    fn default() -> Self {
        Self {
            codecs: CodecRegistry::default(),
        }
    }
}

impl TiffWriter {
    pub fn new(codecs: CodecRegistry) -> Self {
        Self { codecs }
    }

    pub fn write<R: Read + Seek>(
        &self,
        cog: &mut Cog<R>,
        destination: Option<Destination>,
    ) -> TiffResult<Vec<u8>> {
        let endian = cog.header.endian;
        let level_count = cog.ifds().len();

        let mut prepared = Vec::with_capacity(level_count);
        for level in 0..level_count {
            prepared.push(prepare_ifd(cog, level, &self.codecs, destination)?);
        }

        let layouts = compute_layout(&prepared, endian);
        let tile_region_start = layouts
            .last()
            .map(|l| l.start + l.body_size + l.out_of_line_size)
            .unwrap_or(8);

        assign_tile_offsets(&mut prepared, tile_region_start);

        let total_tile_bytes: u64 = prepared
            .iter()
            .flat_map(|p| p.tile_bytes.iter())
            .map(|t| t.len() as u64)
            .sum();

        let mut out = Vec::new();
        let header = Header {
            endian,
            version: cog.header.version,
            first_ifd_offset: 8,
        };
        header.write(&mut out)?;

        for (i, (prepared_ifd, layout)) in prepared.iter().zip(layouts.iter()).enumerate() {
            let next_offset = layouts.get(i + 1).map(|l| l.start).unwrap_or(0);
            write_ifd_body(&mut out, &prepared_ifd.ifd, layout, next_offset, endian)?;
            for (_, _, bytes) in &layout.out_of_line {
                out.write_all(bytes)?;
            }
        }

        if out.len() as u64 != tile_region_start {
            return Err(TiffError::InvariantViolation(format!(
                "tile region starts at {} but IFD section emitted {} bytes",
                tile_region_start,
                out.len()
            )));
        }

        // Reverse IFD order: coarsest overview (last IFD) first.
        for prepared_ifd in prepared.iter().rev() {
            for bytes in &prepared_ifd.tile_bytes {
                out.write_all(bytes)?;
            }
        }

        if out.len() as u64 != tile_region_start + total_tile_bytes {
            return Err(TiffError::InvariantViolation(format!(
                "expected total size {}, wrote {}",
                tile_region_start + total_tile_bytes,
                out.len()
            )));
        }

        Ok(out)
    }
}

/// Builds the IFD's tag table and tile byte list for writing, running the
/// transcode pass (decode/re-encode, tag merge, tag deletion) when a
/// destination codec is given. `TileOffsets` is left at its old values;
/// [`assign_tile_offsets`] patches it once the layout is known.
fn prepare_ifd<R: Read + Seek>(
    cog: &mut Cog<R>,
    level: usize,
    codecs: &CodecRegistry,
    destination: Option<Destination>,
) -> TiffResult<PreparedIfd> {
    let tile_count = cog.tile_count(level)?;
    let mut raw_tiles = Vec::with_capacity(tile_count);
    for idx in 0..tile_count {
        raw_tiles.push(cog.read_raw_tile(level, idx)?);
    }

    let mut ifd = cog.ifds()[level].clone();

    let tile_bytes = match destination {
        None => raw_tiles,
        Some(destination) => {
            let source_codec = codecs.build_for_ifd(&ifd, cog.header.endian)?;
            let dtype = crate::compression::dtype_from_ifd(&ifd)?;
            let width = ifd
                .get_u64(tags::TILE_WIDTH)
                .ok_or(TiffError::MissingTag("TileWidth"))? as u32;
            let height = ifd
                .get_u64(tags::TILE_LENGTH)
                .ok_or(TiffError::MissingTag("TileHeight"))? as u32;
            let samples = ifd.samples_per_pixel() as u32;
            let dest_codec = destination.build(dtype, width, height, samples);

            let mut encoded = Vec::with_capacity(raw_tiles.len());
            for raw in &raw_tiles {
                let pixels = source_codec.decode(raw)?;
                encoded.push(dest_codec.encode(&pixels)?);
            }

            let byte_counts: Vec<u32> = encoded.iter().map(|t| t.len() as u32).collect();
            ifd.insert(Tag::new(
                tags::TILE_BYTE_COUNTS,
                "TileByteCounts",
                lookup(field_types::LONG).unwrap(),
                byte_counts.len() as u32,
                Value::Longs(byte_counts),
            ));

            let created = dest_codec.create_tags();
            let created_ids: Vec<u16> = created.iter().map(|t| t.id).collect();
            for tag in created {
                ifd.insert(tag);
            }
            for removed in dest_codec.delete_tags() {
                ifd.remove(removed);
            }

            // A destination codec only re-supplies the compression tags its
            // own format needs; any of these left over from the source
            // codec and not re-supplied would describe the old compression,
            // not the new one, so the merge step drops them here rather
            // than trusting each codec's own `delete_tags()` to know about
            // every other codec's tags.
            for conflicting in CONFLICTING_COMPRESSION_TAGS {
                if !created_ids.contains(conflicting) {
                    ifd.remove(*conflicting);
                }
            }

            encoded
        }
    };

    Ok(PreparedIfd { ifd, tile_bytes })
}

/// Lays out every IFD's body and out-of-line value region back to back,
/// starting right after the 8-byte header. Tag *sizes* (and therefore
/// inline-vs-offset placement) are already final at this point; only the
/// numeric values of `TileOffsets` are still provisional.
fn compute_layout(prepared: &[PreparedIfd], endian: Endian) -> Vec<IfdLayout> {
    let mut layouts = Vec::with_capacity(prepared.len());
    let mut cursor = 8u64;

    for p in prepared {
        let n_tags = p.ifd.tag_count() as u64;
        let body_size = 2 + 12 * n_tags + 4;

        let mut out_of_line = Vec::new();
        let mut value_cursor = cursor + body_size;
        for tag in p.ifd.tags_ascending() {
            let bytes = tag.encode_value(endian);
            if bytes.len() > 4 {
                out_of_line.push((tag.id, value_cursor, bytes.clone()));
                value_cursor += bytes.len() as u64;
            }
        }
        let out_of_line_size = value_cursor - (cursor + body_size);

        layouts.push(IfdLayout {
            start: cursor,
            body_size,
            out_of_line_size,
            out_of_line,
        });
        cursor += body_size + out_of_line_size;
    }

    layouts
}

/// Assigns fresh `TileOffsets` values, walking IFDs in reverse (coarsest
/// overview first) and tiles within an IFD in their existing order.
fn assign_tile_offsets(prepared: &mut [PreparedIfd], tile_region_start: u64) {
    let mut cursor = tile_region_start;
    let long_type = lookup(field_types::LONG).unwrap();

    for p in prepared.iter_mut().rev() {
        let mut offsets = Vec::with_capacity(p.tile_bytes.len());
        for bytes in &p.tile_bytes {
            offsets.push(cursor as u32);
            cursor += bytes.len() as u64;
        }
        p.ifd.insert(Tag::new(
            tags::TILE_OFFSETS,
            "TileOffsets",
            long_type,
            offsets.len() as u32,
            Value::Longs(offsets),
        ));
    }
}

/// Writes one IFD's `u16` entry count, its ascending-id 12-byte entries
/// (inline value or out-of-line offset), and the `u32` next-IFD offset.
fn write_ifd_body(
    out: &mut Vec<u8>,
    ifd: &IFD,
    layout: &IfdLayout,
    next_ifd_offset: u64,
    endian: Endian,
) -> TiffResult<()> {
    let handler = endian.handler();
    let start = out.len();

    handler.write_u16(out, ifd.tag_count())?;
    for tag in ifd.tags_ascending() {
        handler.write_u16(out, tag.id)?;
        handler.write_u16(out, tag.field_type.code)?;
        handler.write_u32(out, tag.count)?;

        let encoded = tag.encode_value(endian);
        if encoded.len() <= 4 {
            let mut field = encoded;
            field.resize(4, 0);
            out.write_all(&field)?;
        } else {
            let offset = layout
                .out_of_line
                .iter()
                .find(|(id, _, _)| *id == tag.id)
                .map(|(_, offset, _)| *offset)
                .ok_or_else(|| {
                    TiffError::InvariantViolation(format!("tag {} missing from out-of-line layout", tag.id))
                })?;
            handler.write_u32(out, offset as u32)?;
        }
    }
    handler.write_u32(out, next_ifd_offset as u32)?;

    let written = (out.len() - start) as u64;
    if written != layout.body_size {
        return Err(TiffError::InvariantViolation(format!(
            "IFD body wrote {} bytes, expected {}",
            written, layout.body_size
        )));
    }
    Ok(())
}
