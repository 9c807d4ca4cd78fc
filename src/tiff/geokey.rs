//! GeoTIFF `GeoKeyDirectory` parsing.
//!
//! The directory is a "meta tag": a TIFF tag whose value is an array of
//! SHORTs, itself structured as a small header followed by a table of
//! geokey entries. This avoids polluting TIFF tag space with CRS-related
//! tags and avoids a private IFD just to hold them. Parsing happens as a
//! second pass once every tag of the owning IFD is already in hand, since a
//! geokey with a non-zero `tag_location` indexes into another tag's already
//! -resolved value array rather than re-entering the tag parser.

use std::collections::{BTreeMap, HashMap};

use log::warn;

use crate::tiff::constants::geo_keys;
use crate::tiff::ifd::IFD;

/// One resolved geokey entry.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoKey {
    pub id: u16,
    pub tag_location: u16,
    pub count: u16,
    pub value_offset: u16,
    /// The resolved SHORT-typed values: either the single literal
    /// `value_offset` (`tag_location == 0`), or the slice of the referenced
    /// tag's value array.
    pub raw_values: Vec<u16>,
    pub parsed: GeoKeyValue,
}

/// The enumerated or literal interpretation of a geokey's value.
#[derive(Debug, Clone, PartialEq)]
pub enum GeoKeyValue {
    GTModelType(GTModelType),
    GTRasterType(GTRasterType),
    GeographicAngularUnits(GeographicAngularUnits),
    ProjectedLinearUnits(ProjectedLinearUnits),
    /// An EPSG code left as-is (e.g. `ProjectedType`).
    EpsgCode(u16),
    Ascii(String),
    /// Any geokey without a specific enumerated interpretation.
    Raw(Vec<u16>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GTModelType {
    Projected = 1,
    Geographic = 2,
    Geocentric = 3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GTRasterType {
    PixelIsArea = 1,
    PixelIsPoint = 2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeographicAngularUnits {
    Radian = 9101,
    Degree = 9102,
    ArcMinute = 9103,
    ArcSecond = 9104,
    Grad = 9105,
    Gon = 9106,
    Dms = 9107,
    DmsHemisphere = 9108,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectedLinearUnits {
    Meter = 9001,
    Foot = 9002,
    FootUsSurvey = 9003,
    FootModifiedAmerican = 9004,
    FootClarke = 9005,
    FootIndian = 9006,
    Link = 9007,
    LinkBenoit = 9008,
    LinkSears = 9009,
    ChainBenoit = 9010,
    ChainSears = 9011,
    YardSears = 9012,
    YardIndian = 9013,
    LinearFathom = 9014,
    LinearMileInternationalNautical = 9015,
}

/// The parsed `GeoKeyDirectory` tag: a header plus the resolved geokeys.
#[derive(Debug, Clone, Default)]
pub struct GeoKeyDirectory {
    pub key_directory_version: u16,
    pub key_revision: u16,
    pub minor_revision: u16,
    pub keys: BTreeMap<u16, GeoKey>,
}

/// Maps GeoKey ids to human-readable names.
///
/// Like [`crate::tiff::tag::TagRegistry`], this is built explicitly rather
/// than as a hidden singleton.
#[derive(Debug, Clone, Default)]
pub struct GeoKeyRegistry {
    names: HashMap<u16, &'static str>,
}

impl GeoKeyRegistry {
    pub fn new() -> Self {
        Self {
            names: HashMap::new(),
        }
    }

    pub fn add(&mut self, id: u16, name: &'static str) -> &mut Self {
        self.names.insert(id, name);
        self
    }

    pub fn get(&self, id: u16) -> Option<&'static str> {
        self.names.get(&id).copied()
    }
}

/// Builds a registry carrying every geokey this core knows how to name,
/// whether or not it has a worked-out enumerated interpretation.
pub fn default_registry() -> GeoKeyRegistry {
    let mut registry = GeoKeyRegistry::new();
    registry
        .add(geo_keys::GT_MODEL_TYPE, "GTModelType")
        .add(geo_keys::GT_RASTER_TYPE, "GTRasterType")
        .add(geo_keys::GT_CITATION, "GTCitation")
        .add(geo_keys::GEOGRAPHIC_TYPE, "GeographicType")
        .add(geo_keys::GEOGRAPHIC_CITATION, "GeographicCitation")
        .add(geo_keys::GEOGRAPHIC_GEODETIC_DATUM, "GeographicGeodeticDatum")
        .add(geo_keys::GEOGRAPHIC_PRIME_MERIDIAN, "GeographicPrimeMeridian")
        .add(geo_keys::GEOGRAPHIC_LINEAR_UNITS, "GeographicLinearUnits")
        .add(
            geo_keys::GEOGRAPHIC_LINEAR_UNIT_SIZE,
            "GeographicLinearUnitSize",
        )
        .add(geo_keys::GEOGRAPHIC_ANGULAR_UNITS, "GeographicAngularUnits")
        .add(
            geo_keys::GEOGRAPHIC_ANGULAR_UNIT_SIZE,
            "GeographicAngularUnitSize",
        )
        .add(geo_keys::GEOGRAPHIC_ELLIPSOID, "GeographicEllipsoid")
        .add(
            geo_keys::GEOGRAPHIC_SEMI_MAJOR_AXIS,
            "GeographicSemiMajorAxis",
        )
        .add(
            geo_keys::GEOGRAPHIC_SEMI_MINOR_AXIS,
            "GeographicSemiMinorAxis",
        )
        .add(
            geo_keys::GEOGRAPHIC_INV_FLATTENING,
            "GeographicInvFlattening",
        )
        .add(geo_keys::GEOGRAPHIC_AZIMUTH_UNITS, "GeographicAzimuthUnits")
        .add(geo_keys::PROJECTED_TYPE, "ProjectedType")
        .add(geo_keys::PROJECTED_LINEAR_UNITS, "ProjectedLinearUnits");
    registry
}

/// Strips the GeoTIFF ASCII sentinel (a trailing `|`) and decodes the rest
/// as ASCII.
fn decode_ascii_geokey(values: &[u16]) -> String {
    let bytes: Vec<u8> = values.iter().map(|&v| v as u8).collect();
    let trimmed = bytes.strip_suffix(b"|").unwrap_or(&bytes);
    String::from_utf8_lossy(trimmed).into_owned()
}

fn interpret(id: u16, raw_values: &[u16]) -> GeoKeyValue {
    let first = raw_values.first().copied().unwrap_or(0);
    match id {
        geo_keys::GT_MODEL_TYPE => match first {
            1 => GeoKeyValue::GTModelType(GTModelType::Projected),
            2 => GeoKeyValue::GTModelType(GTModelType::Geographic),
            3 => GeoKeyValue::GTModelType(GTModelType::Geocentric),
            _ => GeoKeyValue::Raw(raw_values.to_vec()),
        },
        geo_keys::GT_RASTER_TYPE => match first {
            1 => GeoKeyValue::GTRasterType(GTRasterType::PixelIsArea),
            2 => GeoKeyValue::GTRasterType(GTRasterType::PixelIsPoint),
            _ => GeoKeyValue::Raw(raw_values.to_vec()),
        },
        geo_keys::GEOGRAPHIC_ANGULAR_UNITS => match first {
            9101 => GeoKeyValue::GeographicAngularUnits(GeographicAngularUnits::Radian),
            9102 => GeoKeyValue::GeographicAngularUnits(GeographicAngularUnits::Degree),
            9103 => GeoKeyValue::GeographicAngularUnits(GeographicAngularUnits::ArcMinute),
            9104 => GeoKeyValue::GeographicAngularUnits(GeographicAngularUnits::ArcSecond),
            9105 => GeoKeyValue::GeographicAngularUnits(GeographicAngularUnits::Grad),
            9106 => GeoKeyValue::GeographicAngularUnits(GeographicAngularUnits::Gon),
            9107 => GeoKeyValue::GeographicAngularUnits(GeographicAngularUnits::Dms),
            9108 => GeoKeyValue::GeographicAngularUnits(GeographicAngularUnits::DmsHemisphere),
            _ => GeoKeyValue::Raw(raw_values.to_vec()),
        },
        geo_keys::PROJECTED_LINEAR_UNITS => match first {
            9001 => GeoKeyValue::ProjectedLinearUnits(ProjectedLinearUnits::Meter),
            9002 => GeoKeyValue::ProjectedLinearUnits(ProjectedLinearUnits::Foot),
            9003 => GeoKeyValue::ProjectedLinearUnits(ProjectedLinearUnits::FootUsSurvey),
            9004 => {
                GeoKeyValue::ProjectedLinearUnits(ProjectedLinearUnits::FootModifiedAmerican)
            }
            9005 => GeoKeyValue::ProjectedLinearUnits(ProjectedLinearUnits::FootClarke),
            9006 => GeoKeyValue::ProjectedLinearUnits(ProjectedLinearUnits::FootIndian),
            9007 => GeoKeyValue::ProjectedLinearUnits(ProjectedLinearUnits::Link),
            9008 => GeoKeyValue::ProjectedLinearUnits(ProjectedLinearUnits::LinkBenoit),
            9009 => GeoKeyValue::ProjectedLinearUnits(ProjectedLinearUnits::LinkSears),
            9010 => GeoKeyValue::ProjectedLinearUnits(ProjectedLinearUnits::ChainBenoit),
            9011 => GeoKeyValue::ProjectedLinearUnits(ProjectedLinearUnits::ChainSears),
            9012 => GeoKeyValue::ProjectedLinearUnits(ProjectedLinearUnits::YardSears),
            9013 => GeoKeyValue::ProjectedLinearUnits(ProjectedLinearUnits::YardIndian),
            9014 => GeoKeyValue::ProjectedLinearUnits(ProjectedLinearUnits::LinearFathom),
            9015 => GeoKeyValue::ProjectedLinearUnits(
                ProjectedLinearUnits::LinearMileInternationalNautical,
            ),
            _ => GeoKeyValue::Raw(raw_values.to_vec()),
        },
        geo_keys::GT_CITATION | geo_keys::GEOGRAPHIC_CITATION => {
            GeoKeyValue::Ascii(decode_ascii_geokey(raw_values))
        }
        geo_keys::PROJECTED_TYPE => GeoKeyValue::EpsgCode(first),
        _ => GeoKeyValue::Raw(raw_values.to_vec()),
    }
}

/// Parses the `GeoKeyDirectory` tag's raw SHORT array, resolving any
/// indirected keys against `ifd`'s already-parsed tags.
pub fn parse_geo_key_directory(
    directory: &[u16],
    ifd: &IFD,
    registry: &GeoKeyRegistry,
) -> GeoKeyDirectory {
    let mut result = GeoKeyDirectory::default();
    if directory.len() < 4 {
        return result;
    }

    result.key_directory_version = directory[0];
    result.key_revision = directory[1];
    result.minor_revision = directory[2];
    let number_of_keys = directory[3] as usize;

    let entries = &directory[4..];
    for chunk in entries.chunks_exact(4).take(number_of_keys) {
        let (key_id, tag_location, count, value_offset) = (chunk[0], chunk[1], chunk[2], chunk[3]);

        if registry.get(key_id).is_none() {
            warn!("skipping unknown geokey id {}", key_id);
            continue;
        }

        let raw_values = if tag_location == 0 {
            vec![value_offset]
        } else {
            match ifd.get(tag_location).and_then(|t| t.value.as_u16_vec()) {
                Some(values) => {
                    let start = value_offset as usize;
                    let end = start + count as usize;
                    if end > values.len() {
                        warn!(
                            "geokey {} indirects past the end of tag {}, skipping",
                            key_id, tag_location
                        );
                        continue;
                    }
                    values[start..end].to_vec()
                }
                None => {
                    warn!(
                        "geokey {} references tag {}, which is absent from this IFD",
                        key_id, tag_location
                    );
                    continue;
                }
            }
        };

        let parsed = interpret(key_id, &raw_values);
        result.keys.insert(
            key_id,
            GeoKey {
                id: key_id,
                tag_location,
                count,
                value_offset,
                raw_values,
                parsed,
            },
        );
    }

    result
}
