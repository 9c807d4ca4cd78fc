//! The identity codec for `Compression == 1`.

use crate::compression::{dtype_from_ifd, reject_planar, Codec, DataType, PixelArray};
use crate::io::byte_order::Endian;
use crate::tiff::constants::{compression, field_types, tags};
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::field_type::lookup;
use crate::tiff::ifd::IFD;
use crate::tiff::tag::{Tag, Value};

/// Passes tile bytes through unchanged, reinterpreting them as a
/// [`PixelArray`] using the IFD's dtype and tile shape.
pub struct UncompressedCodec {
    dtype: DataType,
    width: u32,
    height: u32,
    samples: u32,
}

pub(super) fn construct_from_ifd(ifd: &IFD, _endian: Endian) -> TiffResult<Box<dyn Codec>> {
    reject_planar(ifd)?;
    let dtype = dtype_from_ifd(ifd)?;
    let width = ifd.get_u64(tags::TILE_WIDTH).ok_or(TiffError::MissingTag("TileWidth"))? as u32;
    let height = ifd.get_u64(tags::TILE_LENGTH).ok_or(TiffError::MissingTag("TileHeight"))? as u32;
    let samples = ifd.samples_per_pixel() as u32;

    Ok(Box::new(UncompressedCodec {
        dtype,
        width,
        height,
        samples,
    }))
}

impl UncompressedCodec {
    pub(crate) fn for_encode(dtype: DataType, width: u32, height: u32, samples: u32) -> Self {
        Self {
            dtype,
            width,
            height,
            samples,
        }
    }
}

impl Codec for UncompressedCodec {
    fn decode(&self, bytes: &[u8]) -> TiffResult<PixelArray> {
        Ok(PixelArray::new(
            self.dtype,
            (self.height, self.width, self.samples),
            bytes.to_vec(),
        ))
    }

    fn encode(&self, pixels: &PixelArray) -> TiffResult<Vec<u8>> {
        Ok(pixels.data.clone())
    }

    fn create_tags(&self) -> Vec<Tag> {
        let field_type = lookup(field_types::SHORT).unwrap();
        vec![Tag::new(
            tags::COMPRESSION,
            "Compression",
            field_type,
            1,
            Value::Shorts(vec![compression::NONE as u16]),
        )]
    }

    fn delete_tags(&self) -> Vec<u16> {
        Vec::new()
    }
}
