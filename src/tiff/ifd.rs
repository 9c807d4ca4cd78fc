//! Image File Directory (IFD): one resolution level's tag table.

use std::collections::BTreeMap;

use crate::tiff::constants::tags;
use crate::tiff::geokey::GeoKeyDirectory;
use crate::tiff::tag::Tag;

/// One Image File Directory: a tag table plus the geokeys parsed out of its
/// `GeoKeyDirectory` tag, if present.
///
/// Tags are kept in a `BTreeMap` keyed by tag id, which gives ascending
/// tag-id iteration for free — the writer relies on this order directly
/// rather than re-sorting a `Vec` before every write.
#[derive(Debug, Clone, Default)]
pub struct IFD {
    tags: BTreeMap<u16, Tag>,
    /// Byte offset to the next IFD in the chain; 0 marks the last IFD.
    pub next_ifd_offset: u32,
    /// Geokeys parsed from this IFD's `GeoKeyDirectory` tag, if any.
    pub geokeys: Option<GeoKeyDirectory>,
}

impl IFD {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, tag: Tag) {
        self.tags.insert(tag.id, tag);
    }

    pub fn remove(&mut self, tag_id: u16) -> Option<Tag> {
        self.tags.remove(&tag_id)
    }

    pub fn get(&self, tag_id: u16) -> Option<&Tag> {
        self.tags.get(&tag_id)
    }

    pub fn contains(&self, tag_id: u16) -> bool {
        self.tags.contains_key(&tag_id)
    }

    /// Tags in ascending tag-id order, the order the writer must emit them.
    pub fn tags_ascending(&self) -> impl Iterator<Item = &Tag> {
        self.tags.values()
    }

    pub fn tag_count(&self) -> u16 {
        self.tags.len() as u16
    }

    /// Convenience accessor for the first numeric value of a tag, widened
    /// to `u64`.
    pub fn get_u64(&self, tag_id: u16) -> Option<u64> {
        self.get(tag_id)?.value.as_u64_vec()?.first().copied()
    }

    /// Convenience accessor for the full numeric value array of a tag,
    /// widened to `u64`.
    pub fn get_u64_vec(&self, tag_id: u16) -> Option<Vec<u64>> {
        self.get(tag_id)?.value.as_u64_vec()
    }

    /// `(width, height)` from `ImageWidth`/`ImageHeight`, if both present.
    pub fn get_dimensions(&self) -> Option<(u64, u64)> {
        let width = self.get_u64(tags::IMAGE_WIDTH)?;
        let height = self.get_u64(tags::IMAGE_LENGTH)?;
        Some((width, height))
    }

    /// Samples per pixel, defaulting to 1 (grayscale) when absent.
    pub fn samples_per_pixel(&self) -> u64 {
        self.get_u64(tags::SAMPLES_PER_PIXEL).unwrap_or(1)
    }

    /// Number of tile columns: `ceil(ImageWidth / TileWidth)`.
    pub fn tile_columns(&self) -> Option<u64> {
        let width = self.get_u64(tags::IMAGE_WIDTH)?;
        let tile_width = self.get_u64(tags::TILE_WIDTH)?;
        if tile_width == 0 {
            return None;
        }
        Some((width + tile_width - 1) / tile_width)
    }
}
