//! TIFF/COG container model: header, field types, tag and geokey
//! registries, the IFD chain, and the reader/writer built on top of them.

pub mod cog;
pub mod constants;
pub mod errors;
pub mod field_type;
pub mod geokey;
pub mod header;
pub mod ifd;
pub mod reader;
pub mod tag;
pub mod writer;

pub use cog::{Cog, TileData};
pub use errors::{TiffError, TiffResult};
pub use header::{Header, Version};
pub use ifd::IFD;
pub use reader::{TiffReader, TiffReaderBuilder};
pub use tag::{Tag, TagRegistry, Value};
pub use writer::TiffWriter;
