//! Tag model and registry.
//!
//! A [`Tag`] is TIFF's typed key/value metadata entry: all tags share the
//! same shape (id, name, type, count, size, value) and differ only in which
//! numeric id/name they carry. Subclassing is reserved for tags with
//! non-trivial parse behavior (`GeoKeyDirectory`, see [`crate::tiff::geokey`]);
//! every other tag is this one record type, looked up by id in a registry.

use std::collections::HashMap;

use crate::io::byte_order::Endian;
use crate::tiff::field_type::FieldType;

/// The decoded value of a tag, still in the field type's natural
/// representation.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bytes(Vec<u8>),
    Ascii(String),
    Shorts(Vec<u16>),
    Longs(Vec<u32>),
    Rationals(Vec<(u32, u32)>),
    Doubles(Vec<f64>),
    Longs8(Vec<u64>),
}

impl Value {
    /// Every numeric value widened to `u64`, for callers (GeoKey
    /// indirection, tile offset/byte-count tags) that only care about the
    /// magnitude, not the original width.
    ///
    /// Returns `None` for `Ascii` and `Rationals`, which have no single
    /// natural `u64` per element.
    pub fn as_u64_vec(&self) -> Option<Vec<u64>> {
        match self {
            Value::Bytes(v) => Some(v.iter().map(|&b| b as u64).collect()),
            Value::Shorts(v) => Some(v.iter().map(|&s| s as u64).collect()),
            Value::Longs(v) => Some(v.iter().map(|&l| l as u64).collect()),
            Value::Longs8(v) => Some(v.clone()),
            Value::Doubles(v) => Some(v.iter().map(|&d| d as u64).collect()),
            Value::Ascii(_) | Value::Rationals(_) => None,
        }
    }

    /// Every value as `u16`, used for GeoKeyDirectory indirection (the
    /// directory itself and most referenced tags are SHORT arrays).
    /// `Ascii` widens its bytes one-for-one, since `GeoAsciiParamsTag`
    /// indirection slices the string's bytes, not a numeric array.
    pub fn as_u16_vec(&self) -> Option<Vec<u16>> {
        match self {
            Value::Shorts(v) => Some(v.clone()),
            Value::Bytes(v) => Some(v.iter().map(|&b| b as u16).collect()),
            Value::Longs(v) => Some(v.iter().map(|&l| l as u16).collect()),
            Value::Ascii(s) => Some(s.bytes().map(|b| b as u16).collect()),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Value::Bytes(v) => v.len(),
            Value::Ascii(s) => s.len(),
            Value::Shorts(v) => v.len(),
            Value::Longs(v) => v.len(),
            Value::Rationals(v) => v.len(),
            Value::Doubles(v) => v.len(),
            Value::Longs8(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A single TIFF tag: a typed, named, counted metadata entry inside an IFD.
#[derive(Debug, Clone, PartialEq)]
pub struct Tag {
    pub id: u16,
    pub name: &'static str,
    pub field_type: FieldType,
    pub count: u32,
    pub size: u32,
    pub value: Value,
}

impl Tag {
    pub fn new(id: u16, name: &'static str, field_type: FieldType, count: u32, value: Value) -> Self {
        let size = count * field_type.length;
        Self {
            id,
            name,
            field_type,
            count,
            size,
            value,
        }
    }

    /// Serializes `self.value` to exactly `self.size` bytes in `endian`
    /// order — the inverse of the reader's `decode_values`. An ASCII value
    /// shorter than `count - 1` bytes is zero-padded out to `size`;
    /// everything else encodes to a fixed width per element.
    pub fn encode_value(&self, endian: Endian) -> Vec<u8> {
        let handler = endian.handler();
        let mut out = Vec::with_capacity(self.size as usize);
        match &self.value {
            Value::Bytes(bytes) => out.extend_from_slice(bytes),
            Value::Ascii(s) => {
                out.extend_from_slice(s.as_bytes());
                out.resize(self.size as usize, 0);
            }
            Value::Shorts(values) => {
                for &v in values {
                    let _ = handler.write_u16(&mut out, v);
                }
            }
            Value::Longs(values) => {
                for &v in values {
                    let _ = handler.write_u32(&mut out, v);
                }
            }
            Value::Rationals(values) => {
                for &(num, den) in values {
                    let _ = handler.write_u32(&mut out, num);
                    let _ = handler.write_u32(&mut out, den);
                }
            }
            Value::Doubles(values) => {
                for &v in values {
                    let _ = handler.write_f64(&mut out, v);
                }
            }
            Value::Longs8(values) => {
                for &v in values {
                    let _ = handler.write_u64(&mut out, v);
                }
            }
        }
        out
    }
}

/// Maps numeric tag codes to human-readable names.
///
/// Constructed explicitly (`TagRegistry::default()` registers the baseline
/// and GeoTIFF tag groups); nothing here is a lazily-initialized global, so
/// a caller can build an extended registry for private tags without
/// touching library internals.
#[derive(Debug, Clone, Default)]
pub struct TagRegistry {
    names: HashMap<u16, &'static str>,
}

impl TagRegistry {
    pub fn new() -> Self {
        Self {
            names: HashMap::new(),
        }
    }

    /// Registers the baseline TIFF tags this core knows how to round-trip.
    pub fn register_baseline(&mut self) -> &mut Self {
        use crate::tiff::constants::tags::*;
        self.add(NEW_SUBFILE_TYPE, "NewSubfileType");
        self.add(IMAGE_WIDTH, "ImageWidth");
        self.add(IMAGE_LENGTH, "ImageHeight");
        self.add(BITS_PER_SAMPLE, "BitsPerSample");
        self.add(COMPRESSION, "Compression");
        self.add(PHOTOMETRIC_INTERPRETATION, "PhotometricInterpretation");
        self.add(SAMPLES_PER_PIXEL, "SamplesPerPixel");
        self.add(X_RESOLUTION, "XResolution");
        self.add(Y_RESOLUTION, "YResolution");
        self.add(PLANAR_CONFIGURATION, "PlanarConfiguration");
        self.add(RESOLUTION_UNIT, "ResolutionUnit");
        self.add(PREDICTOR, "Predictor");
        self.add(TILE_WIDTH, "TileWidth");
        self.add(TILE_LENGTH, "TileHeight");
        self.add(TILE_OFFSETS, "TileOffsets");
        self.add(TILE_BYTE_COUNTS, "TileByteCounts");
        self.add(EXTRA_SAMPLES, "ExtraSamples");
        self.add(SAMPLE_FORMAT, "SampleFormat");
        self.add(JPEG_TABLES, "JPEGTables");
        self.add(CHROMA_SUB_SAMPLING, "ChromaSubSampling");
        self.add(REFERENCE_BLACK_WHITE, "ReferenceBlackWhite");
        self
    }

    /// Registers the GeoTIFF extension tags.
    pub fn register_geotiff(&mut self) -> &mut Self {
        use crate::tiff::constants::tags::*;
        self.add(MODEL_PIXEL_SCALE, "ModelPixelScale");
        self.add(MODEL_TIEPOINT, "ModelTiePoint");
        self.add(GEO_KEY_DIRECTORY, "GeoKeyDirectory");
        self.add(GEO_DOUBLE_PARAMS, "GeoDoubleParams");
        self.add(GEO_ASCII_PARAMS, "GeoAsciiParams");
        self
    }

    /// Adds (or overrides) a single tag mapping.
    pub fn add(&mut self, id: u16, name: &'static str) -> &mut Self {
        self.names.insert(id, name);
        self
    }

    /// Looks up the human-readable name for `tag_code`, if registered.
    pub fn get(&self, tag_code: u16) -> Option<&'static str> {
        self.names.get(&tag_code).copied()
    }
}

/// Builds a registry carrying the baseline + GeoTIFF tag groups, the set a
/// typical `open_cog` call should use.
pub fn default_registry() -> TagRegistry {
    let mut registry = TagRegistry::new();
    registry.register_baseline();
    registry.register_geotiff();
    registry
}
