//! Cloud Optimized GeoTIFF (COG) reading and writing.
//!
//! This crate is the core of a COG library: it translates between the
//! on-disk TIFF byte stream and a typed in-memory representation (header,
//! IFD chain, tags, GeoKeys), and dispatches per-tile compression through a
//! pluggable codec registry keyed by the TIFF `Compression` tag.
//!
//! Out of scope: entropy codecs beyond JPEG/Deflate, the concrete byte
//! source (file vs. HTTP range reader vs. memory buffer — this crate is
//! written against `Read + Seek`), CLI front-ends, and coordinate
//! reprojection/CRS math. The crate emits structured logs through `log` but
//! never installs a sink of its own.

pub mod compression;
pub mod io;
pub mod tiff;

pub use compression::{Codec, CodecRegistry, DataType, Destination, PixelArray};
pub use tiff::cog::{Cog, TileData};
pub use tiff::errors::{TiffError, TiffResult};
pub use tiff::reader::{TiffReader, TiffReaderBuilder};
pub use tiff::writer::TiffWriter;
