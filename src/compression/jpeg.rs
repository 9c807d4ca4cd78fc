//! The JPEG codec for `Compression == 7`.
//!
//! TIFF stores a JPEG tile as an "abbreviated image" — the tables
//! (`JPEGTables`) that would normally open the stream are shared across
//! every tile in the IFD and stored once. To decode a tile we splice the
//! shared tables (minus their trailing End-Of-Image marker) onto the
//! tile's own bytes (minus their leading Start-Of-Image marker), producing
//! one self-contained JPEG stream, then hand it to a general-purpose JPEG
//! decoder. Encoding goes the other way: this core's encoder always
//! produces a self-contained per-tile JPEG, so no shared `JPEGTables` is
//! emitted on the way out.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::{ColorType, ImageEncoder};
use jpeg_decoder::{ColorTransform, Decoder as JpegDecoder, PixelFormat};

use crate::compression::{Codec, DataType, PixelArray};
use crate::io::byte_order::Endian;
use crate::tiff::constants::{compression, field_types, photometric, tags};
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::field_type::lookup;
use crate::tiff::ifd::IFD;
use crate::tiff::tag::{Tag, Value};

const START_OF_IMAGE: [u8; 2] = [0xFF, 0xD8];
const END_OF_IMAGE: [u8; 2] = [0xFF, 0xD9];

pub struct JpegCodec {
    jpeg_tables: Option<Vec<u8>>,
    photometric: u16,
    chroma_subsampling: Option<Vec<u16>>,
}

pub(super) fn construct_from_ifd(ifd: &IFD, endian: Endian) -> TiffResult<Box<dyn Codec>> {
    crate::compression::reject_planar(ifd)?;
    let jpeg_tables = ifd.get(tags::JPEG_TABLES).map(|tag| repack_jpeg_tables(tag, endian));
    let photometric = ifd
        .get_u64(tags::PHOTOMETRIC_INTERPRETATION)
        .map(|v| v as u16)
        .unwrap_or(photometric::YCBCR);
    let chroma_subsampling = ifd
        .get(tags::CHROMA_SUB_SAMPLING)
        .and_then(|tag| tag.value.as_u16_vec());

    Ok(Box::new(JpegCodec {
        jpeg_tables,
        photometric,
        chroma_subsampling,
    }))
}

impl JpegCodec {
    /// Builds a codec for encoding only — no shared `JPEGTables` to splice
    /// on decode, and `photometric` just picks the encoder's grayscale vs.
    /// RGB path (`create_tags` derives the declared `PhotometricInterpretation`
    /// from it).
    pub(crate) fn for_encode(samples: u32) -> Self {
        let photometric = if samples == 1 {
            photometric::BLACK_IS_ZERO
        } else {
            photometric::RGB
        };
        Self {
            jpeg_tables: None,
            photometric,
            chroma_subsampling: None,
        }
    }
}

/// `JPEGTables` is normally stored as UNDEFINED (raw bytes); some writers
/// mis-declare it as a SHORT array. Either way this returns the tag's
/// content as the raw byte stream a JPEG stream expects.
fn repack_jpeg_tables(tag: &Tag, endian: Endian) -> Vec<u8> {
    match &tag.value {
        Value::Bytes(bytes) => bytes.clone(),
        Value::Shorts(shorts) => {
            let handler = endian.handler();
            let mut out = Vec::with_capacity(shorts.len() * 2);
            for &s in shorts {
                let mut buf = Vec::new();
                let _ = handler.write_u16(&mut buf, s);
                out.extend_from_slice(&buf);
            }
            out
        }
        other => other
            .as_u64_vec()
            .map(|values| values.iter().map(|&v| v as u8).collect())
            .unwrap_or_default(),
    }
}

/// Splices shared `JPEGTables` onto per-tile JPEG data, dropping the
/// tables' trailing EOI and the tile's leading SOI.
fn splice_tables(jpeg_tables: Option<&[u8]>, data: &[u8]) -> TiffResult<Vec<u8>> {
    match jpeg_tables {
        None => Ok(data.to_vec()),
        Some(tables) if tables.len() < 2 || data.len() < 2 => Ok(data.to_vec()),
        Some(tables) => {
            if tables[tables.len() - 2..] != END_OF_IMAGE {
                return Err(TiffError::CodecFailure(
                    "JPEGTables does not end with an End-Of-Image marker".to_string(),
                ));
            }
            if data[..2] != START_OF_IMAGE {
                return Err(TiffError::CodecFailure(
                    "JPEG tile data does not start with a Start-Of-Image marker".to_string(),
                ));
            }
            let mut combined = Vec::with_capacity(tables.len() - 2 + data.len() - 2);
            combined.extend_from_slice(&tables[..tables.len() - 2]);
            combined.extend_from_slice(&data[2..]);
            Ok(combined)
        }
    }
}

fn color_transform_for(photometric: u16) -> TiffResult<ColorTransform> {
    match photometric {
        photometric::WHITE_IS_ZERO | photometric::BLACK_IS_ZERO => Ok(ColorTransform::None),
        photometric::RGB => Ok(ColorTransform::RGB),
        photometric::CMYK => Ok(ColorTransform::CMYK),
        photometric::YCBCR => Ok(ColorTransform::YCbCr),
        other => Err(TiffError::CodecFailure(format!(
            "unsupported PhotometricInterpretation for JPEG decode: {}",
            other
        ))),
    }
}

impl Codec for JpegCodec {
    fn decode(&self, bytes: &[u8]) -> TiffResult<PixelArray> {
        let stream = splice_tables(self.jpeg_tables.as_deref(), bytes)?;

        let mut decoder = JpegDecoder::new(Cursor::new(stream));
        decoder.set_color_transform(color_transform_for(self.photometric)?);

        let pixels = decoder
            .decode()
            .map_err(|e| TiffError::CodecFailure(format!("JPEG decode failed: {}", e)))?;
        let info = decoder
            .info()
            .ok_or_else(|| TiffError::CodecFailure("JPEG decoder produced no image info".to_string()))?;

        let samples = match info.pixel_format {
            PixelFormat::L8 => 1,
            PixelFormat::RGB24 => 3,
            PixelFormat::CMYK32 => 4,
            PixelFormat::L16 => {
                return Err(TiffError::CodecFailure("16-bit JPEG output is not supported".to_string()))
            }
        };

        Ok(PixelArray::new(
            DataType::U8,
            (info.height as u32, info.width as u32, samples),
            pixels,
        ))
    }

    fn encode(&self, pixels: &PixelArray) -> TiffResult<Vec<u8>> {
        if pixels.dtype != DataType::U8 {
            return Err(TiffError::CodecFailure(
                "JPEG encoding only supports 8-bit samples".to_string(),
            ));
        }
        let (height, width, samples) = pixels.shape;
        let color_type = match samples {
            1 => ColorType::L8,
            3 => ColorType::Rgb8,
            other => {
                return Err(TiffError::CodecFailure(format!(
                    "JPEG encoding does not support {}-sample pixels",
                    other
                )))
            }
        };

        let mut out = Vec::new();
        let encoder = JpegEncoder::new_with_quality(&mut out, 90);
        encoder
            .write_image(&pixels.data, width, height, color_type.into())
            .map_err(|e| TiffError::CodecFailure(format!("JPEG encode failed: {}", e)))?;
        Ok(out)
    }

    fn create_tags(&self) -> Vec<Tag> {
        let short_type = lookup(field_types::SHORT).unwrap();
        let output_photometric = match &self.chroma_subsampling {
            Some(_) => photometric::YCBCR,
            None if self.photometric == photometric::BLACK_IS_ZERO || self.photometric == photometric::WHITE_IS_ZERO => {
                photometric::BLACK_IS_ZERO
            }
            None => photometric::YCBCR,
        };

        let mut tags = vec![
            Tag::new(
                tags::COMPRESSION,
                "Compression",
                short_type,
                1,
                Value::Shorts(vec![compression::JPEG as u16]),
            ),
            Tag::new(
                tags::PHOTOMETRIC_INTERPRETATION,
                "PhotometricInterpretation",
                short_type,
                1,
                Value::Shorts(vec![output_photometric]),
            ),
        ];

        if let Some(subsampling) = &self.chroma_subsampling {
            tags.push(Tag::new(
                tags::CHROMA_SUB_SAMPLING,
                "ChromaSubSampling",
                short_type,
                subsampling.len() as u32,
                Value::Shorts(subsampling.clone()),
            ));
        }

        if output_photometric == photometric::YCBCR {
            tags.push(Tag::new(
                tags::REFERENCE_BLACK_WHITE,
                "ReferenceBlackWhite",
                lookup(field_types::RATIONAL).unwrap(),
                6,
                Value::Rationals(vec![(0, 1), (255, 1), (128, 1), (255, 1), (128, 1), (255, 1)]),
            ));
        }

        tags
    }

    fn delete_tags(&self) -> Vec<u16> {
        vec![tags::PREDICTOR]
    }
}
