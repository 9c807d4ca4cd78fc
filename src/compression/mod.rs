//! Per-tile codec dispatch, keyed by the TIFF `Compression` tag.
//!
//! Every codec is built from the IFD that owns the tile it will decode or
//! encode (`Codec` values are short-lived, constructed per-IFD rather than
//! held across IFDs with different tiling/photometric settings), decodes
//! raw tile bytes into a [`PixelArray`], and can synthesize the tags a
//! writer must merge into the destination IFD when transcoding into this
//! codec's compression. The entropy coders themselves (JPEG, zlib) are
//! external collaborators; this module only adapts them to the TIFF tag
//! model.

mod deflate;
mod jpeg;
mod uncompressed;

use std::collections::HashMap;

use crate::io::byte_order::Endian;
use crate::tiff::constants::{compression, planar_config, sample_format, tags};
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::ifd::IFD;
use crate::tiff::tag::Tag;

pub use deflate::DeflateCodec;
pub use jpeg::JpegCodec;
pub use uncompressed::UncompressedCodec;

/// Resolves `(SampleFormat, BitsPerSample)` off `ifd`, the lookup every
/// codec that reinterprets raw bytes needs before it can decode a tile.
pub(crate) fn dtype_from_ifd(ifd: &IFD) -> TiffResult<DataType> {
    let format = ifd
        .get_u64(tags::SAMPLE_FORMAT)
        .map(|v| v as u16)
        .unwrap_or(sample_format::UNSIGNED);
    let bits = ifd
        .get_u64(tags::BITS_PER_SAMPLE)
        .ok_or(TiffError::MissingTag("BitsPerSample"))? as u16;
    DataType::from_sample_format(format, bits)
        .ok_or_else(|| TiffError::CodecFailure(format!("unsupported sample type ({}, {})", format, bits)))
}

/// Rejects `PlanarConfiguration == 2` (separate planes per sample):
/// supporting it would mean every codec reshuffling samples back into
/// interleaved order, and no repo in this corpus produces COGs that use it.
pub(crate) fn reject_planar(ifd: &IFD) -> TiffResult<()> {
    let config = ifd.get_u64(tags::PLANAR_CONFIGURATION).unwrap_or(planar_config::CHUNKY as u64);
    if config == planar_config::PLANAR as u64 {
        return Err(TiffError::CodecFailure(
            "PlanarConfiguration == 2 (planar) is not supported".to_string(),
        ));
    }
    Ok(())
}

/// The numeric element type of a decoded tile, derived from
/// `(SampleFormat, BitsPerSample)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    U8,
    U16,
    U32,
    I8,
    I16,
    I32,
    F32,
    F64,
}

impl DataType {
    /// The byte width of one sample of this type.
    pub fn byte_width(&self) -> usize {
        match self {
            DataType::U8 | DataType::I8 => 1,
            DataType::U16 | DataType::I16 => 2,
            DataType::U32 | DataType::I32 | DataType::F32 => 4,
            DataType::F64 => 8,
        }
    }

    /// Resolves `(SampleFormat, BitsPerSample)` to a [`DataType`], per the
    /// sample-format/bits-per-sample table. Returns `None` for any
    /// combination outside the canonical table.
    pub fn from_sample_format(format: u16, bits: u16) -> Option<DataType> {
        match (format, bits) {
            (sample_format::UNSIGNED, 8) => Some(DataType::U8),
            (sample_format::UNSIGNED, 16) => Some(DataType::U16),
            (sample_format::UNSIGNED, 32) => Some(DataType::U32),
            (sample_format::SIGNED, 8) => Some(DataType::I8),
            (sample_format::SIGNED, 16) => Some(DataType::I16),
            (sample_format::SIGNED, 32) => Some(DataType::I32),
            (sample_format::IEEEFP, 32) => Some(DataType::F32),
            (sample_format::IEEEFP, 64) => Some(DataType::F64),
            _ => None,
        }
    }
}

/// The in-memory decode result of one tile: raw bytes plus enough shape
/// information to reinterpret them.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelArray {
    pub dtype: DataType,
    /// `(height, width, samples)`.
    pub shape: (u32, u32, u32),
    pub data: Vec<u8>,
}

impl PixelArray {
    pub fn new(dtype: DataType, shape: (u32, u32, u32), data: Vec<u8>) -> Self {
        Self { dtype, shape, data }
    }

    /// Number of samples across the whole array (`height * width * samples`).
    pub fn sample_count(&self) -> usize {
        self.shape.0 as usize * self.shape.1 as usize * self.shape.2 as usize
    }
}

/// The capability set every codec implements: decode raw tile bytes,
/// encode a pixel array back to raw tile bytes, and describe the tags a
/// writer should merge into (and delete from) an IFD that now uses this
/// codec.
pub trait Codec: Send + Sync {
    /// Decodes one tile's compressed bytes into pixels.
    fn decode(&self, bytes: &[u8]) -> TiffResult<PixelArray>;

    /// Encodes a pixel array into this codec's compressed tile format.
    fn encode(&self, pixels: &PixelArray) -> TiffResult<Vec<u8>>;

    /// Tags to merge into the IFD when this codec becomes the tile
    /// compression (always includes `Compression` itself).
    fn create_tags(&self) -> Vec<Tag>;

    /// Tag ids to remove from the IFD when this codec becomes the tile
    /// compression (e.g. a stale `Predictor` left over from Deflate).
    fn delete_tags(&self) -> Vec<u16>;
}

/// Builds a codec for `ifd`'s declared `Compression`, given the file's
/// byte order.
pub type CodecFactory = fn(&IFD, Endian) -> TiffResult<Box<dyn Codec>>;

/// Maps `Compression` tag codes to codec factories.
///
/// Built explicitly (`CodecRegistry::default()` registers the codes this
/// core knows), not as a hidden singleton, so a caller can extend it with
/// a private codec without touching library internals.
#[derive(Clone)]
pub struct CodecRegistry {
    factories: HashMap<u64, CodecFactory>,
}

impl CodecRegistry {
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    pub fn add(&mut self, code: u64, factory: CodecFactory) -> &mut Self {
        self.factories.insert(code, factory);
        self
    }

    pub fn get(&self, code: u64) -> Option<CodecFactory> {
        self.factories.get(&code).copied()
    }

    /// Constructs the codec registered for `ifd`'s `Compression` tag,
    /// defaulting to uncompressed (code 1) when the tag is absent.
    pub fn build_for_ifd(&self, ifd: &IFD, endian: Endian) -> TiffResult<Box<dyn Codec>> {
        let code = ifd
            .get_u64(crate::tiff::constants::tags::COMPRESSION)
            .unwrap_or(compression::NONE);
        let factory = self
            .get(code)
            .ok_or(TiffError::UnknownCompression(code))?;
        factory(ifd, endian)
    }
}

impl Default for CodecRegistry {
    fn default() -> Self {
        let mut registry = Self::new();
        registry
            .add(compression::NONE, uncompressed::construct_from_ifd)
            .add(compression::JPEG, jpeg::construct_from_ifd)
            .add(compression::DEFLATE, deflate::construct_from_ifd);
        registry
    }
}

/// The compression a writer should transcode tiles into, described as a
/// lightweight configuration rather than a prebuilt [`Codec`]: a codec's
/// internal tile-shape fields (width/height/samples) have to be rebuilt
/// per IFD anyway, since every overview level recomputes them from its own
/// tags before it can encode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    Uncompressed,
    Jpeg,
    Deflate { predictor: bool },
}

impl Destination {
    /// Builds the concrete codec for one IFD's tile shape.
    pub fn build(&self, dtype: DataType, width: u32, height: u32, samples: u32) -> Box<dyn Codec> {
        match self {
            Destination::Uncompressed => Box::new(UncompressedCodec::for_encode(dtype, width, height, samples)),
            Destination::Jpeg => Box::new(JpegCodec::for_encode(samples)),
            Destination::Deflate { predictor } => {
                Box::new(DeflateCodec::for_encode(dtype, width, height, samples, *predictor))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_type_table_covers_canonical_combinations() {
        assert_eq!(DataType::from_sample_format(1, 8), Some(DataType::U8));
        assert_eq!(DataType::from_sample_format(2, 32), Some(DataType::I32));
        assert_eq!(DataType::from_sample_format(3, 64), Some(DataType::F64));
        assert_eq!(DataType::from_sample_format(3, 16), None);
    }

    #[test]
    fn default_registry_knows_baseline_compressions() {
        let registry = CodecRegistry::default();
        assert!(registry.get(compression::NONE).is_some());
        assert!(registry.get(compression::JPEG).is_some());
        assert!(registry.get(compression::DEFLATE).is_some());
        assert!(registry.get(99).is_none());
    }
}
