//! The Deflate (zlib) codec for `Compression == 8`.
//!
//! Decode performs raw inflate, reinterprets the bytes as the IFD's dtype,
//! and reverses `Predictor == 2` (horizontal differencing) in place, row by
//! row, the way libtiff and every reader in this corpus implement it:
//! `buf[i] = buf[i].wrapping_add(buf[i - samples])`, reset at each row so a
//! row's first `samples` bytes are left untouched. Encoding applies the
//! same steps in reverse before deflating.

use std::io::{Read, Write};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression as ZlibCompression;

use crate::compression::{dtype_from_ifd, reject_planar, Codec, DataType, PixelArray};
use crate::io::byte_order::Endian;
use crate::tiff::constants::{compression, field_types, photometric, predictor, tags};
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::field_type::lookup;
use crate::tiff::ifd::IFD;
use crate::tiff::tag::{Tag, Value};

pub struct DeflateCodec {
    dtype: DataType,
    width: u32,
    height: u32,
    samples: u32,
    predictor: u16,
}

pub(super) fn construct_from_ifd(ifd: &IFD, _endian: Endian) -> TiffResult<Box<dyn Codec>> {
    reject_planar(ifd)?;
    let dtype = dtype_from_ifd(ifd)?;
    let width = ifd.get_u64(tags::TILE_WIDTH).ok_or(TiffError::MissingTag("TileWidth"))? as u32;
    let height = ifd.get_u64(tags::TILE_LENGTH).ok_or(TiffError::MissingTag("TileHeight"))? as u32;
    let samples = ifd.samples_per_pixel() as u32;
    let predictor_value = ifd.get_u64(tags::PREDICTOR).unwrap_or(predictor::NONE as u64) as u16;

    Ok(Box::new(DeflateCodec {
        dtype,
        width,
        height,
        samples,
        predictor: predictor_value,
    }))
}

impl DeflateCodec {
    pub(crate) fn for_encode(dtype: DataType, width: u32, height: u32, samples: u32, use_predictor: bool) -> Self {
        Self {
            dtype,
            width,
            height,
            samples,
            predictor: if use_predictor {
                predictor::HORIZONTAL_DIFFERENCING
            } else {
                predictor::NONE
            },
        }
    }
}

/// Reverses horizontal differencing in place, resetting the running sum at
/// the start of each row (`row_stride` bytes wide, `samples` samples per
/// pixel, each `dtype.byte_width()` bytes wide).
fn unpredict_horizontal(buf: &mut [u8], width: u32, samples: u32, byte_width: usize) {
    let step = samples as usize * byte_width;
    let row_stride = width as usize * step;
    for row in buf.chunks_mut(row_stride) {
        for i in (step..row.len()).step_by(byte_width) {
            for b in 0..byte_width {
                row[i + b] = row[i + b].wrapping_add(row[i - step + b]);
            }
        }
    }
}

/// Forward horizontal differencing (encode-time), same row-reset
/// discipline as [`unpredict_horizontal`].
fn predict_horizontal(buf: &mut [u8], width: u32, samples: u32, byte_width: usize) {
    let step = samples as usize * byte_width;
    let row_stride = width as usize * step;
    for row in buf.chunks_mut(row_stride) {
        for i in (step..row.len()).step_by(byte_width).rev() {
            for b in 0..byte_width {
                row[i + b] = row[i + b].wrapping_sub(row[i - step + b]);
            }
        }
    }
}

impl Codec for DeflateCodec {
    fn decode(&self, bytes: &[u8]) -> TiffResult<PixelArray> {
        let mut decoder = ZlibDecoder::new(bytes);
        let mut raw = Vec::new();
        decoder
            .read_to_end(&mut raw)
            .map_err(|e| TiffError::CodecFailure(format!("deflate inflate failed: {}", e)))?;

        if self.predictor == predictor::HORIZONTAL_DIFFERENCING {
            unpredict_horizontal(&mut raw, self.width, self.samples, self.dtype.byte_width());
        }

        Ok(PixelArray::new(
            self.dtype,
            (self.height, self.width, self.samples),
            raw,
        ))
    }

    fn encode(&self, pixels: &PixelArray) -> TiffResult<Vec<u8>> {
        let mut raw = pixels.data.clone();
        if self.predictor == predictor::HORIZONTAL_DIFFERENCING {
            predict_horizontal(&mut raw, self.width, self.samples, self.dtype.byte_width());
        }

        let mut encoder = ZlibEncoder::new(Vec::new(), ZlibCompression::default());
        encoder
            .write_all(&raw)
            .map_err(|e| TiffError::CodecFailure(format!("deflate write failed: {}", e)))?;
        encoder
            .finish()
            .map_err(|e| TiffError::CodecFailure(format!("deflate finish failed: {}", e)))
    }

    fn create_tags(&self) -> Vec<Tag> {
        let short_type = lookup(field_types::SHORT).unwrap();
        let mut out = vec![Tag::new(
            tags::COMPRESSION,
            "Compression",
            short_type,
            1,
            Value::Shorts(vec![compression::DEFLATE as u16]),
        )];
        if matches!(self.samples, 3 | 4) {
            out.push(Tag::new(
                tags::PHOTOMETRIC_INTERPRETATION,
                "PhotometricInterpretation",
                short_type,
                1,
                Value::Shorts(vec![photometric::RGB]),
            ));
        }
        out.push(Tag::new(
            tags::PREDICTOR,
            "Predictor",
            short_type,
            1,
            Value::Shorts(vec![self.predictor]),
        ));
        out
    }

    fn delete_tags(&self) -> Vec<u16> {
        Vec::new()
    }
}
