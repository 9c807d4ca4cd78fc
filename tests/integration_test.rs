//! End-to-end scenarios exercising the reader, writer, and GeoKeyDirectory
//! parser against literal byte layouts rather than mocked internals.

use std::io::Cursor;

use byteorder::{LittleEndian, WriteBytesExt};

use cog::io::byte_order::Endian;
use cog::io::source::PrefetchReader;
use cog::tiff::constants::{compression, field_types, geo_keys, photometric, sample_format, tags};
use cog::tiff::field_type::lookup;
use cog::tiff::geokey::{GTModelType, GeoKeyValue};
use cog::tiff::header::{Header, Version};
use cog::tiff::ifd::IFD;
use cog::tiff::tag::{Tag, Value};
use cog::{Cog, CodecRegistry, Destination, TiffReader, TiffWriter, TileData};

fn short_tag(id: u16, values: Vec<u16>) -> Tag {
    let field_type = lookup(field_types::SHORT).unwrap();
    let count = values.len() as u32;
    Tag::new(id, "x", field_type, count, Value::Shorts(values))
}

fn long_tag(id: u16, values: Vec<u32>) -> Tag {
    let field_type = lookup(field_types::LONG).unwrap();
    let count = values.len() as u32;
    Tag::new(id, "x", field_type, count, Value::Longs(values))
}

// A. Header parse: the literal 8 bytes round-trip through Header::read and
// Header::write unchanged.
#[test]
fn header_parses_and_round_trips_exact_bytes() {
    let bytes: [u8; 8] = [0x49, 0x49, 0x2A, 0x00, 0x08, 0x00, 0x00, 0x00];

    let mut reader = PrefetchReader::with_default_prefetch(Cursor::new(bytes.to_vec())).unwrap();
    let header = Header::read(&mut reader).unwrap();
    assert_eq!(header.endian, Endian::Little);
    assert_eq!(header.version, Version::Tiff);
    assert_eq!(header.first_ifd_offset, 8);

    let mut out = Vec::new();
    header.write(&mut out).unwrap();
    assert_eq!(out, bytes);
}

// B. Single-IFD, single-tag, inline value.
#[test]
fn single_ifd_single_inline_tag_resolves_its_value() {
    let mut buf = Vec::new();
    buf.extend_from_slice(&[0x49, 0x49]);
    buf.write_u16::<LittleEndian>(42).unwrap();
    buf.write_u32::<LittleEndian>(8).unwrap();

    buf.write_u16::<LittleEndian>(1).unwrap(); // one tag
    buf.write_u16::<LittleEndian>(tags::IMAGE_WIDTH).unwrap(); // 0x0100
    buf.write_u16::<LittleEndian>(field_types::SHORT).unwrap(); // type 3
    buf.write_u32::<LittleEndian>(1).unwrap(); // count
    buf.write_u16::<LittleEndian>(100).unwrap(); // inline value
    buf.write_u16::<LittleEndian>(0).unwrap(); // padding to 4 bytes
    buf.write_u32::<LittleEndian>(0).unwrap(); // next IFD offset

    let reader = TiffReader::default();
    let cog = reader.open(Cursor::new(buf)).unwrap();
    assert_eq!(cog.ifds().len(), 1);
    assert_eq!(cog.ifds()[0].get_u64(tags::IMAGE_WIDTH), Some(100));
}

// C. Tag with an out-of-line value.
#[test]
fn out_of_line_tag_value_resolves_to_its_dereferenced_content() {
    let mut buf = Vec::new();
    buf.extend_from_slice(&[0x49, 0x49]);
    buf.write_u16::<LittleEndian>(42).unwrap();
    buf.write_u32::<LittleEndian>(8).unwrap();

    buf.write_u16::<LittleEndian>(1).unwrap();
    buf.write_u16::<LittleEndian>(tags::IMAGE_WIDTH).unwrap();
    buf.write_u16::<LittleEndian>(field_types::LONG).unwrap(); // type 4, 2*4=8 bytes > 4
    buf.write_u32::<LittleEndian>(2).unwrap(); // count
    buf.write_u32::<LittleEndian>(32).unwrap(); // out-of-line offset
    buf.write_u32::<LittleEndian>(0).unwrap(); // next IFD offset

    while buf.len() < 32 {
        buf.push(0);
    }
    buf.write_u32::<LittleEndian>(100).unwrap();
    buf.write_u32::<LittleEndian>(200).unwrap();

    let reader = TiffReader::default();
    let cog = reader.open(Cursor::new(buf)).unwrap();
    assert_eq!(cog.ifds()[0].get_u64_vec(tags::IMAGE_WIDTH), Some(vec![100, 200]));
}

fn tiled_grayscale_ifd(tile_width: u16, tiles_across: u16, byte_per_tile: &[Vec<u8>]) -> IFD {
    let mut ifd = IFD::new();
    ifd.insert(short_tag(tags::IMAGE_WIDTH, vec![tile_width * tiles_across]));
    ifd.insert(short_tag(tags::IMAGE_LENGTH, vec![tile_width]));
    ifd.insert(short_tag(tags::BITS_PER_SAMPLE, vec![8]));
    ifd.insert(short_tag(tags::COMPRESSION, vec![compression::NONE as u16]));
    ifd.insert(short_tag(
        tags::PHOTOMETRIC_INTERPRETATION,
        vec![photometric::BLACK_IS_ZERO],
    ));
    ifd.insert(short_tag(tags::SAMPLE_FORMAT, vec![sample_format::UNSIGNED]));
    ifd.insert(short_tag(tags::TILE_WIDTH, vec![tile_width]));
    ifd.insert(short_tag(tags::TILE_LENGTH, vec![tile_width]));
    ifd.insert(long_tag(
        tags::TILE_OFFSETS,
        vec![0; byte_per_tile.len()],
    ));
    ifd.insert(long_tag(
        tags::TILE_BYTE_COUNTS,
        byte_per_tile.iter().map(|t| t.len() as u32).collect(),
    ));
    ifd
}

// A multi-tile `TileOffsets`/`TileByteCounts` array (count > 1, so 4 bytes
// per LONG makes the whole array > 4 bytes) exercises the out-of-line
// write path end to end: property 3 (inline/offset boundary) and property
// 7 (write round trip preserves every tag's value).
#[test]
fn write_round_trip_preserves_an_out_of_line_tile_array() {
    let tile_data = vec![vec![1u8; 16], vec![2u8; 16]];
    let ifd = tiled_grayscale_ifd(4, 2, &tile_data);

    let mut data = Vec::new();
    let mut offsets = Vec::new();
    for tile in &tile_data {
        offsets.push(data.len() as u32);
        data.extend_from_slice(tile);
    }
    let header = Header {
        endian: Endian::Little,
        version: Version::Tiff,
        first_ifd_offset: 8,
    };
    let source = PrefetchReader::with_default_prefetch(Cursor::new(data)).unwrap();
    let mut cog = Cog::new(header, vec![ifd], source);
    cog.ifds_mut()[0].insert(long_tag(tags::TILE_OFFSETS, offsets));

    let writer = TiffWriter::default();
    let bytes = writer.write(&mut cog, None).unwrap();

    let reader = TiffReader::default();
    let mut reopened = reader.open(Cursor::new(bytes)).unwrap();
    assert_eq!(
        reopened.ifds()[0].get_u64_vec(tags::TILE_BYTE_COUNTS),
        Some(vec![16, 16])
    );

    let codecs = CodecRegistry::default();
    assert_eq!(
        reopened.read_tile(0, 0, 0, &codecs, false).unwrap(),
        TileData::Raw(tile_data[0].clone())
    );
    assert_eq!(
        reopened.read_tile(1, 0, 0, &codecs, false).unwrap(),
        TileData::Raw(tile_data[1].clone())
    );
}

// D. Two-IFD chain: the reader visits both in order.
#[test]
fn two_ifd_chain_is_visited_in_order() {
    let mut buf = Vec::new();
    buf.extend_from_slice(&[0x49, 0x49]);
    buf.write_u16::<LittleEndian>(42).unwrap();
    buf.write_u32::<LittleEndian>(8).unwrap();

    let first_body_len: u32 = 2 + 12 + 4;
    let second_ifd_offset = 8 + first_body_len;

    buf.write_u16::<LittleEndian>(1).unwrap();
    buf.write_u16::<LittleEndian>(tags::IMAGE_WIDTH).unwrap();
    buf.write_u16::<LittleEndian>(field_types::SHORT).unwrap();
    buf.write_u32::<LittleEndian>(1).unwrap();
    buf.write_u16::<LittleEndian>(100).unwrap();
    buf.write_u16::<LittleEndian>(0).unwrap();
    buf.write_u32::<LittleEndian>(second_ifd_offset).unwrap();

    buf.write_u16::<LittleEndian>(1).unwrap();
    buf.write_u16::<LittleEndian>(tags::IMAGE_WIDTH).unwrap();
    buf.write_u16::<LittleEndian>(field_types::SHORT).unwrap();
    buf.write_u32::<LittleEndian>(1).unwrap();
    buf.write_u16::<LittleEndian>(25).unwrap();
    buf.write_u16::<LittleEndian>(0).unwrap();
    buf.write_u32::<LittleEndian>(0).unwrap();

    let reader = TiffReader::default();
    let cog = reader.open(Cursor::new(buf)).unwrap();
    assert_eq!(cog.ifds().len(), 2);
    assert_eq!(cog.ifds()[0].get_u64(tags::IMAGE_WIDTH), Some(100));
    assert_eq!(cog.ifds()[1].get_u64(tags::IMAGE_WIDTH), Some(25));
}

// A write round trip of a two-IFD pyramid (full resolution + one overview)
// keeps the chain intact, in order, with the terminal next-IFD offset at 0 —
// property 4 (chain ordering) and property 7 (write round trip) together.
#[test]
fn write_round_trip_keeps_a_two_ifd_pyramid_in_order() {
    let full_tile = vec![1u8; 16];
    let overview_tile = vec![2u8; 16];
    let full_ifd = tiled_grayscale_ifd(4, 1, std::slice::from_ref(&full_tile));
    let overview_ifd = tiled_grayscale_ifd(2, 1, std::slice::from_ref(&overview_tile));

    let mut data = Vec::new();
    data.extend_from_slice(&full_tile);
    let overview_offset = data.len() as u32;
    data.extend_from_slice(&overview_tile);

    let header = Header {
        endian: Endian::Little,
        version: Version::Tiff,
        first_ifd_offset: 8,
    };
    let source = PrefetchReader::with_default_prefetch(Cursor::new(data)).unwrap();
    let mut cog = Cog::new(header, vec![full_ifd, overview_ifd], source);
    cog.ifds_mut()[0].insert(long_tag(tags::TILE_OFFSETS, vec![0]));
    cog.ifds_mut()[1].insert(long_tag(tags::TILE_OFFSETS, vec![overview_offset]));

    let writer = TiffWriter::default();
    let bytes = writer.write(&mut cog, None).unwrap();

    let reader = TiffReader::default();
    let mut reopened = reader.open(Cursor::new(bytes)).unwrap();
    assert_eq!(reopened.ifds().len(), 2);
    assert_eq!(reopened.ifds()[0].get_u64(tags::IMAGE_WIDTH), Some(4));
    assert_eq!(reopened.ifds()[1].get_u64(tags::IMAGE_WIDTH), Some(2));
    assert_eq!(reopened.ifds()[1].next_ifd_offset, 0);

    let codecs = CodecRegistry::default();
    assert_eq!(
        reopened.read_tile(0, 0, 0, &codecs, false).unwrap(),
        TileData::Raw(full_tile)
    );
    assert_eq!(
        reopened.read_tile(1, 0, 0, &codecs, false).unwrap(),
        TileData::Raw(overview_tile)
    );
}

// E. GeoKeyDirectory: a literal key, and an ASCII-indirected key, decoded
// through the real tag-parsing path (not a hand-built fixture).
#[test]
fn geokey_directory_resolves_literal_and_indirected_keys() {
    let mut buf = Vec::new();
    buf.extend_from_slice(&[0x49, 0x49]);
    buf.write_u16::<LittleEndian>(42).unwrap();
    buf.write_u32::<LittleEndian>(8).unwrap();

    // Body: GeoKeyDirectory (34735, out-of-line) + GeoAsciiParams (34737,
    // out-of-line), ascending by id, then next-IFD = 0.
    let body_len: u64 = 2 + 12 * 2 + 4;
    let directory_offset = 8 + body_len;
    let ascii_offset = directory_offset + 24; // 12 shorts * 2 bytes

    buf.write_u16::<LittleEndian>(2).unwrap();

    buf.write_u16::<LittleEndian>(tags::GEO_KEY_DIRECTORY).unwrap();
    buf.write_u16::<LittleEndian>(field_types::SHORT).unwrap();
    buf.write_u32::<LittleEndian>(12).unwrap();
    buf.write_u32::<LittleEndian>(directory_offset as u32).unwrap();

    buf.write_u16::<LittleEndian>(tags::GEO_ASCII_PARAMS).unwrap();
    buf.write_u16::<LittleEndian>(field_types::ASCII).unwrap();
    buf.write_u32::<LittleEndian>(6).unwrap();
    buf.write_u32::<LittleEndian>(ascii_offset as u32).unwrap();

    buf.write_u32::<LittleEndian>(0).unwrap(); // next IFD offset

    // GeoKeyDirectory value: header (1,1,0,2) + GTModelType (literal
    // Projected) + GeographicCitation (indirected into GeoAsciiParams).
    let directory: [u16; 12] = [
        1,
        1,
        0,
        2,
        geo_keys::GT_MODEL_TYPE,
        0,
        1,
        1,
        geo_keys::GEOGRAPHIC_CITATION,
        tags::GEO_ASCII_PARAMS,
        5,
        0,
    ];
    for v in directory {
        buf.write_u16::<LittleEndian>(v).unwrap();
    }

    // GeoAsciiParams: "WGS4|" plus a NUL terminator (the reader strips it).
    buf.extend_from_slice(b"WGS4|\0");

    let reader = TiffReader::default();
    let cog = reader.open(Cursor::new(buf)).unwrap();

    let geokeys = cog.ifds()[0].geokeys.as_ref().expect("GeoKeyDirectory parsed");
    let model_type = geokeys.keys.get(&geo_keys::GT_MODEL_TYPE).unwrap();
    assert_eq!(model_type.parsed, GeoKeyValue::GTModelType(GTModelType::Projected));

    let citation = geokeys.keys.get(&geo_keys::GEOGRAPHIC_CITATION).unwrap();
    assert_eq!(citation.parsed, GeoKeyValue::Ascii("WGS4".to_string()));
}

// F. JPEG transcode: JPEGTables is deleted, Compression stays 7, and the
// tile byte counts match the re-encoded tiles.
#[test]
fn jpeg_transcode_rewrites_tile_bytes_and_compression_tags() {
    let width = 4u32;
    let height = 4u32;
    let mut pixels = Vec::with_capacity((width * height * 3) as usize);
    for y in 0..height {
        for x in 0..width {
            pixels.push((x * 16) as u8);
            pixels.push((y * 16) as u8);
            pixels.push(((x + y) * 8) as u8);
        }
    }
    let mut tile_jpeg = Vec::new();
    {
        use image::{ColorType, ImageEncoder};
        let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut tile_jpeg, 90);
        encoder
            .write_image(&pixels, width, height, ColorType::Rgb8.into())
            .unwrap();
    }

    let mut ifd = IFD::new();
    ifd.insert(short_tag(tags::IMAGE_WIDTH, vec![width as u16]));
    ifd.insert(short_tag(tags::IMAGE_LENGTH, vec![height as u16]));
    ifd.insert(short_tag(tags::BITS_PER_SAMPLE, vec![8]));
    ifd.insert(short_tag(tags::SAMPLES_PER_PIXEL, vec![3]));
    ifd.insert(short_tag(tags::SAMPLE_FORMAT, vec![sample_format::UNSIGNED]));
    ifd.insert(short_tag(tags::COMPRESSION, vec![compression::JPEG as u16]));
    ifd.insert(short_tag(
        tags::PHOTOMETRIC_INTERPRETATION,
        vec![photometric::YCBCR],
    ));
    ifd.insert(short_tag(tags::TILE_WIDTH, vec![width as u16]));
    ifd.insert(short_tag(tags::TILE_LENGTH, vec![height as u16]));
    // A degenerate but structurally valid abbreviated table: just an SOI
    // immediately followed by an EOI, so splicing it onto a self-contained
    // tile reproduces that tile's bytes unchanged.
    ifd.insert(Tag::new(
        tags::JPEG_TABLES,
        "JPEGTables",
        lookup(field_types::UNDEFINED).unwrap(),
        4,
        Value::Bytes(vec![0xFF, 0xD8, 0xFF, 0xD9]),
    ));

    let tile_offset = 500u64;
    ifd.insert(long_tag(tags::TILE_OFFSETS, vec![tile_offset as u32]));
    ifd.insert(long_tag(tags::TILE_BYTE_COUNTS, vec![tile_jpeg.len() as u32]));

    let mut data = vec![0u8; tile_offset as usize + tile_jpeg.len()];
    data[tile_offset as usize..].copy_from_slice(&tile_jpeg);
    let header = Header {
        endian: Endian::Little,
        version: Version::Tiff,
        first_ifd_offset: 8,
    };
    let source = PrefetchReader::with_default_prefetch(Cursor::new(data)).unwrap();
    let mut cog = Cog::new(header, vec![ifd], source);

    let writer = TiffWriter::default();
    let bytes = writer.write(&mut cog, Some(Destination::Jpeg)).unwrap();

    let reader = TiffReader::default();
    let mut written = reader.open(Cursor::new(bytes)).unwrap();
    let written_ifd = &written.ifds()[0];

    assert_eq!(written_ifd.get_u64(tags::COMPRESSION), Some(compression::JPEG));
    assert!(written_ifd.get(tags::JPEG_TABLES).is_none());
    assert!(written_ifd.get(tags::REFERENCE_BLACK_WHITE).is_some());

    let byte_counts = written_ifd.get_u64_vec(tags::TILE_BYTE_COUNTS).unwrap();
    assert_eq!(byte_counts.len(), 1);

    let codecs = CodecRegistry::default();
    let tile = written.read_tile(0, 0, 0, &codecs, false).unwrap();
    match tile {
        TileData::Raw(bytes) => assert_eq!(bytes.len() as u64, byte_counts[0]),
        TileData::Decoded(_) => panic!("expected raw tile bytes"),
    }
}

// Property 9: total emitted size equals 8 + IFD sections + tile bytes, for
// a plain (no-transcode) write.
#[test]
fn write_output_length_matches_the_layout_sanity_law() {
    let tile_data = vec![9u8; 16];
    let mut ifd = IFD::new();
    ifd.insert(short_tag(tags::IMAGE_WIDTH, vec![4]));
    ifd.insert(short_tag(tags::IMAGE_LENGTH, vec![4]));
    ifd.insert(short_tag(tags::BITS_PER_SAMPLE, vec![8]));
    ifd.insert(short_tag(tags::COMPRESSION, vec![compression::NONE as u16]));
    ifd.insert(short_tag(
        tags::PHOTOMETRIC_INTERPRETATION,
        vec![photometric::BLACK_IS_ZERO],
    ));
    ifd.insert(short_tag(tags::SAMPLE_FORMAT, vec![sample_format::UNSIGNED]));
    ifd.insert(short_tag(tags::TILE_WIDTH, vec![4]));
    ifd.insert(short_tag(tags::TILE_LENGTH, vec![4]));
    ifd.insert(long_tag(tags::TILE_OFFSETS, vec![500]));
    ifd.insert(long_tag(tags::TILE_BYTE_COUNTS, vec![tile_data.len() as u32]));

    let mut data = vec![0u8; 500 + tile_data.len()];
    data[500..].copy_from_slice(&tile_data);
    let header = Header {
        endian: Endian::Little,
        version: Version::Tiff,
        first_ifd_offset: 8,
    };
    let source = PrefetchReader::with_default_prefetch(Cursor::new(data)).unwrap();
    let mut cog = Cog::new(header, vec![ifd], source);

    let writer = TiffWriter::default();
    let bytes = writer.write(&mut cog, None).unwrap();

    let body_size = 2u64 + 12 * 10 + 4; // 10 tags, no out-of-line values
    let expected = 8 + body_size + tile_data.len() as u64;
    assert_eq!(bytes.len() as u64, expected);
}
