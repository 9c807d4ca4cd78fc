//! TIFF format constants
//!
//! Numeric codes used throughout the reader/writer/codec modules, kept
//! separate from the registries that assign them human-readable names.

/// TIFF header constants
pub mod header {
    pub const TIFF_VERSION: u16 = 42;
    pub const BIG_TIFF_VERSION: u16 = 43;
}

/// Field types as defined in the TIFF spec
pub mod field_types {
    pub const BYTE: u16 = 1;
    pub const ASCII: u16 = 2;
    pub const SHORT: u16 = 3;
    pub const LONG: u16 = 4;
    pub const RATIONAL: u16 = 5;
    pub const UNDEFINED: u16 = 7;
    pub const DOUBLE: u16 = 12;
    pub const LONG8: u16 = 16;
}

/// Baseline and GeoTIFF tag codes.
pub mod tags {
    pub const NEW_SUBFILE_TYPE: u16 = 254;
    pub const IMAGE_WIDTH: u16 = 256;
    pub const IMAGE_LENGTH: u16 = 257;
    pub const BITS_PER_SAMPLE: u16 = 258;
    pub const COMPRESSION: u16 = 259;
    pub const PHOTOMETRIC_INTERPRETATION: u16 = 262;
    pub const SAMPLES_PER_PIXEL: u16 = 277;
    pub const X_RESOLUTION: u16 = 282;
    pub const Y_RESOLUTION: u16 = 283;
    pub const PLANAR_CONFIGURATION: u16 = 284;
    pub const RESOLUTION_UNIT: u16 = 296;
    pub const PREDICTOR: u16 = 317;
    pub const TILE_WIDTH: u16 = 322;
    pub const TILE_LENGTH: u16 = 323;
    pub const TILE_OFFSETS: u16 = 324;
    pub const TILE_BYTE_COUNTS: u16 = 325;
    pub const EXTRA_SAMPLES: u16 = 338;
    pub const SAMPLE_FORMAT: u16 = 339;
    pub const JPEG_TABLES: u16 = 347;
    pub const CHROMA_SUB_SAMPLING: u16 = 530;
    pub const REFERENCE_BLACK_WHITE: u16 = 532;

    // GeoTIFF extension tags.
    pub const MODEL_PIXEL_SCALE: u16 = 33550;
    pub const MODEL_TIEPOINT: u16 = 33922;
    pub const GEO_KEY_DIRECTORY: u16 = 34735;
    pub const GEO_DOUBLE_PARAMS: u16 = 34736;
    pub const GEO_ASCII_PARAMS: u16 = 34737;
}

/// Compression codes handled (or at least named) by this core.
pub mod compression {
    pub const NONE: u64 = 1;
    pub const JPEG: u64 = 7;
    pub const DEFLATE: u64 = 8;
}

/// Photometric interpretation values.
pub mod photometric {
    pub const WHITE_IS_ZERO: u16 = 0;
    pub const BLACK_IS_ZERO: u16 = 1;
    pub const RGB: u16 = 2;
    pub const PALETTE: u16 = 3;
    pub const TRANSPARENCY_MASK: u16 = 4;
    pub const CMYK: u16 = 5;
    pub const YCBCR: u16 = 6;
}

/// Planar configuration values.
pub mod planar_config {
    pub const CHUNKY: u16 = 1;
    pub const PLANAR: u16 = 2;
}

/// Sample format values.
pub mod sample_format {
    pub const UNSIGNED: u16 = 1;
    pub const SIGNED: u16 = 2;
    pub const IEEEFP: u16 = 3;
}

/// Predictor values.
pub mod predictor {
    pub const NONE: u16 = 1;
    pub const HORIZONTAL_DIFFERENCING: u16 = 2;
}

/// GeoTIFF GeoKey id constants.
pub mod geo_keys {
    pub const GT_MODEL_TYPE: u16 = 1024;
    pub const GT_RASTER_TYPE: u16 = 1025;
    pub const GT_CITATION: u16 = 1026;
    pub const GEOGRAPHIC_TYPE: u16 = 2048;
    pub const GEOGRAPHIC_CITATION: u16 = 2049;
    pub const GEOGRAPHIC_GEODETIC_DATUM: u16 = 2050;
    pub const GEOGRAPHIC_PRIME_MERIDIAN: u16 = 2051;
    pub const GEOGRAPHIC_LINEAR_UNITS: u16 = 2052;
    pub const GEOGRAPHIC_LINEAR_UNIT_SIZE: u16 = 2053;
    pub const GEOGRAPHIC_ANGULAR_UNITS: u16 = 2054;
    pub const GEOGRAPHIC_ANGULAR_UNIT_SIZE: u16 = 2055;
    pub const GEOGRAPHIC_ELLIPSOID: u16 = 2056;
    pub const GEOGRAPHIC_SEMI_MAJOR_AXIS: u16 = 2057;
    pub const GEOGRAPHIC_SEMI_MINOR_AXIS: u16 = 2058;
    pub const GEOGRAPHIC_INV_FLATTENING: u16 = 2059;
    pub const GEOGRAPHIC_AZIMUTH_UNITS: u16 = 2060;
    pub const PROJECTED_TYPE: u16 = 3072;
    pub const PROJECTED_LINEAR_UNITS: u16 = 3076;
}
