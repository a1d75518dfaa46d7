//! Integration tests for the decompression filters.
//!
//! Compressed fixtures come from the reference encoders of each format. The
//! filters must produce identical output no matter how the underlying reader
//! splits its data or how the consumer sizes its reads.

use lumpio_core::error::{LumpioError, Result};
use lumpio_core::traits::{ReadExt, StreamReader};
use lumpio_filter::{
    Bzip2Reader, CompressionMethod, DeflateFraming, DeflateReader, LzmaHeader, LzmaReader,
    decompress_to_vec,
};
use proptest::prelude::*;
use std::io::Write;

// ============================================================================
// Fixtures
// ============================================================================

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Source that returns at most `chunk` bytes per read.
struct Chunked<'a> {
    data: &'a [u8],
    pos: usize,
    chunk: usize,
}

impl<'a> Chunked<'a> {
    fn new(data: &'a [u8], chunk: usize) -> Self {
        Self { data, pos: 0, chunk }
    }
}

impl StreamReader for Chunked<'_> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let n = buf.len().min(self.chunk).min(self.data.len() - self.pos);
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

fn sample(size: usize) -> Vec<u8> {
    let text = b"E1M1: Hangar. Knee-deep in the dead. ";
    let mut seed: u32 = 0x1234_5678;
    (0..size)
        .map(|i| {
            seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            if i % 7 == 0 {
                (seed >> 24) as u8
            } else {
                text[i % text.len()]
            }
        })
        .collect()
}

fn zlib(data: &[u8]) -> Vec<u8> {
    let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

fn raw_deflate(data: &[u8]) -> Vec<u8> {
    let mut encoder =
        flate2::write::DeflateEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

fn bzip2(data: &[u8]) -> Vec<u8> {
    let mut encoder = bzip2::write::BzEncoder::new(Vec::new(), bzip2::Compression::best());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// Encode as `.lzma` (props, 64-bit size, data ending in an end marker).
fn lzma_alone(data: &[u8]) -> Vec<u8> {
    use xz2::stream::{Action, LzmaOptions, Status, Stream};

    let options = LzmaOptions::new_preset(6).unwrap();
    let mut stream = Stream::new_lzma_encoder(&options).unwrap();
    let mut out = Vec::with_capacity(data.len() + 4096);
    let mut input = data;
    loop {
        let before = stream.total_in();
        let status = stream.process_vec(input, &mut out, Action::Finish).unwrap();
        input = &input[(stream.total_in() - before) as usize..];
        if matches!(status, Status::StreamEnd) {
            break;
        }
        out.reserve(4096);
    }
    out
}

/// Raw LZMA behind the zip header: version, props size, props, data.
fn lzma_zip(data: &[u8]) -> Vec<u8> {
    let alone = lzma_alone(data);
    let mut out = vec![9, 20, 5, 0];
    out.extend_from_slice(&alone[..5]);
    out.extend_from_slice(&alone[13..]);
    out
}

/// Raw LZMA with only the property bytes in front.
fn lzma_bare(data: &[u8]) -> Vec<u8> {
    let alone = lzma_alone(data);
    let mut out = alone[..5].to_vec();
    out.extend_from_slice(&alone[13..]);
    out
}

/// Property bytes of [`MAPINFO_LZMA`]: lc=3 lp=0 pb=2, 64 KiB dictionary.
const MAPINFO_PROPS: [u8; 5] = [0x5D, 0x00, 0x00, 0x01, 0x00];

/// Raw LZMA1 data for [`mapinfo_text`] written without an end marker, the way
/// zip archivers store entries whose size is recorded in the directory.
const MAPINFO_LZMA: [u8; 111] = [
    0x00, 0x18, 0x0E, 0x80, 0x25, 0x8E, 0xC6, 0x78, 0xFC, 0x29, 0x4C, 0x3F,
    0xFE, 0x31, 0x97, 0xD9, 0x63, 0x86, 0x0C, 0x84, 0x7A, 0x16, 0x99, 0x52,
    0x4C, 0x60, 0xFA, 0xE0, 0xA0, 0xE0, 0x5B, 0x84, 0x28, 0x2E, 0x9F, 0x4A,
    0xA9, 0x8E, 0xA1, 0x9A, 0x02, 0xB2, 0xD4, 0x7B, 0x2D, 0x05, 0xBC, 0xDB,
    0x49, 0x8F, 0x63, 0xA6, 0xA5, 0x96, 0xE1, 0xF4, 0x1E, 0xB0, 0xE2, 0x31,
    0x93, 0x9D, 0x28, 0xDA, 0x05, 0xCA, 0x3E, 0xF2, 0x36, 0x5A, 0xD3, 0x59,
    0x8B, 0x4B, 0xDE, 0xF5, 0x6B, 0x9D, 0x50, 0xC5, 0x09, 0xED, 0xE7, 0x21,
    0x76, 0x28, 0xAE, 0x1F, 0x22, 0xFD, 0xEC, 0xBA, 0xA6, 0xD6, 0x28, 0xAE,
    0x49, 0x2F, 0xDF, 0x8D, 0x81, 0x3B, 0xD3, 0x32, 0xE2, 0x0E, 0xB2, 0x83,
    0x6C, 0xE7, 0x3F,
];

fn mapinfo_text() -> Vec<u8> {
    (0..12)
        .flat_map(|i| {
            format!("{i}: [maplump] sector {} light {}\n", i * 3, 128 + i % 64).into_bytes()
        })
        .collect()
}

fn mapinfo_zip() -> Vec<u8> {
    let mut out = vec![9, 20, 5, 0];
    out.extend_from_slice(&MAPINFO_PROPS);
    out.extend_from_slice(&MAPINFO_LZMA);
    out
}

fn mapinfo_bare() -> Vec<u8> {
    let mut out = MAPINFO_PROPS.to_vec();
    out.extend_from_slice(&MAPINFO_LZMA);
    out
}

fn drain<R: StreamReader + ?Sized>(reader: &mut R, read_size: usize) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    let mut buf = vec![0u8; read_size];
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            return Ok(out);
        }
        out.extend_from_slice(&buf[..n]);
    }
}

// ============================================================================
// Chunking Independence
// ============================================================================

#[test]
fn test_deflate_chunking() {
    init();
    let data = sample(20_000);
    let compressed = zlib(&data);

    for (chunk, read_size) in [(1, 1), (1, 4096), (7, 100), (4096, 1), (usize::MAX, 65_536)] {
        let mut source = Chunked::new(&compressed, chunk);
        let mut filter = DeflateReader::new(&mut source, DeflateFraming::Zlib);
        let out = drain(&mut filter, read_size).unwrap();
        assert_eq!(out, data, "chunk {chunk}, read size {read_size}");
        assert!(filter.is_finished());
    }
}

#[test]
fn test_raw_deflate_chunking() {
    let data = sample(9_000);
    let compressed = raw_deflate(&data);

    for chunk in [1, 3, 4096, usize::MAX] {
        let mut source = Chunked::new(&compressed, chunk);
        let mut filter = DeflateReader::new(&mut source, DeflateFraming::Raw);
        assert_eq!(drain(&mut filter, 513).unwrap(), data);
    }
}

#[test]
fn test_bzip2_chunking() {
    let data = sample(30_000);
    let compressed = bzip2(&data);

    for (chunk, read_size) in [(1, 1000), (13, 1), (usize::MAX, 4096)] {
        let mut source = Chunked::new(&compressed, chunk);
        let mut filter = Bzip2Reader::new(&mut source);
        assert_eq!(drain(&mut filter, read_size).unwrap(), data);
        assert!(filter.is_finished());
    }
}

#[test]
fn test_lzma_chunking() {
    let data = sample(25_000);
    let compressed = lzma_zip(&data);

    for (chunk, read_size) in [(1, 1), (5, 777), (usize::MAX, 25_000)] {
        let mut source = Chunked::new(&compressed, chunk);
        let mut filter =
            LzmaReader::new(&mut source, data.len() as u64, LzmaHeader::Zip).unwrap();
        assert_eq!(drain(&mut filter, read_size).unwrap(), data);
        assert!(filter.is_finished());
    }
}

// ============================================================================
// End-of-Stream Handling
// ============================================================================

#[test]
fn test_deflate_ignores_trailing_bytes() {
    let data = b"PLAYPAL COLORMAP ENDOOM".to_vec();
    let mut compressed = zlib(&data);
    compressed.extend_from_slice(b"trailing directory bytes");

    let mut source = Chunked::new(&compressed, usize::MAX);
    let mut filter = DeflateReader::new(&mut source, DeflateFraming::Zlib);
    assert_eq!(drain(&mut filter, 4).unwrap(), data);
}

#[test]
fn test_lzma_declared_size_truncates() {
    let data = sample(5_000);
    let compressed = lzma_bare(&data);

    let mut source = Chunked::new(&compressed, usize::MAX);
    let mut filter = LzmaReader::new(&mut source, 1_000, LzmaHeader::Bare).unwrap();
    let out = drain(&mut filter, 4096).unwrap();
    assert_eq!(out, &data[..1_000]);
    assert_eq!(filter.total_out(), 1_000);
}

#[test]
fn test_lzma_declared_size_overrun_faults() {
    let data = sample(5_000);
    let compressed = lzma_zip(&data);

    let mut source = Chunked::new(&compressed, usize::MAX);
    let mut filter = LzmaReader::new(&mut source, 6_000, LzmaHeader::Zip).unwrap();
    let err = drain(&mut filter, 4096).unwrap_err();
    assert!(err.is_decode());
    assert!(filter.is_faulted());
}

#[test]
fn test_lzma_without_end_marker() {
    init();
    let text = mapinfo_text();
    assert_eq!(text.len(), 394);

    for chunk in [1, 16, usize::MAX] {
        let compressed = mapinfo_zip();
        let mut source = Chunked::new(&compressed, chunk);
        let mut filter = LzmaReader::new(&mut source, 394, LzmaHeader::Zip).unwrap();
        assert_eq!(drain(&mut filter, 100).unwrap(), text, "chunk {chunk}");
        assert!(filter.is_finished());
        assert_eq!(filter.total_out(), 394);
    }

    let compressed = mapinfo_bare();
    let mut source = Chunked::new(&compressed, usize::MAX);
    let mut filter = LzmaReader::new(&mut source, 394, LzmaHeader::Bare).unwrap();
    assert_eq!(drain(&mut filter, 4096).unwrap(), text);
}

#[test]
fn test_lzma_without_end_marker_truncates() {
    let text = mapinfo_text();
    let compressed = mapinfo_zip();

    let mut source = Chunked::new(&compressed, 5);
    let mut filter = LzmaReader::new(&mut source, 300, LzmaHeader::Zip).unwrap();
    assert_eq!(drain(&mut filter, 64).unwrap(), &text[..300]);
    assert_eq!(filter.total_out(), 300);
}

#[test]
fn test_lzma_without_end_marker_overrun_faults() {
    init();
    let text = mapinfo_text();
    let compressed = mapinfo_bare();

    let mut source = Chunked::new(&compressed, usize::MAX);
    let mut filter = LzmaReader::new(&mut source, 500, LzmaHeader::Bare).unwrap();
    let mut out = vec![0u8; 500];
    let err = filter.read(&mut out).unwrap_err();
    assert!(err.is_decode());
    assert!(err.to_string().contains("394 of 500"), "{err}");
    assert!(filter.is_faulted());
    assert_eq!(filter.total_out(), text.len() as u64);
    assert!(filter.read(&mut out).unwrap_err().is_decode());
}

#[test]
fn test_lzma_rejects_bad_props_size() {
    let mut compressed = lzma_zip(b"lump");
    compressed[2] = 6;

    let mut source = Chunked::new(&compressed, usize::MAX);
    let err = LzmaReader::new(&mut source, 4, LzmaHeader::Zip).unwrap_err();
    assert!(matches!(err, LumpioError::InvalidHeader { .. }));
}

#[test]
fn test_lzma_truncated_header() {
    let mut source = Chunked::new(&[9, 20, 5], usize::MAX);
    let err = LzmaReader::new(&mut source, 4, LzmaHeader::Zip).unwrap_err();
    assert!(matches!(err, LumpioError::InvalidHeader { .. }));
}

// ============================================================================
// Truncated Streams
// ============================================================================

/// Drain `filter` expecting a latched decode fault before the end marker.
fn assert_truncation_fault<R: StreamReader + ?Sized>(filter: &mut R, data: &[u8]) {
    let mut out = Vec::new();
    let mut buf = [0u8; 1024];
    let err = loop {
        match filter.read(&mut buf) {
            Ok(0) => panic!("truncated stream ended cleanly after {} bytes", out.len()),
            Ok(n) => out.extend_from_slice(&buf[..n]),
            Err(err) => break err,
        }
    };
    assert!(err.is_decode(), "{err}");
    assert!(data.starts_with(&out));
    assert!(filter.read(&mut buf).unwrap_err().is_decode());
}

#[test]
fn test_truncated_zlib_faults() {
    init();
    let data = sample(20_000);
    let compressed = zlib(&data);
    let cut = &compressed[..compressed.len() / 2];

    for chunk in [1, 4096, usize::MAX] {
        let mut source = Chunked::new(cut, chunk);
        let mut filter = DeflateReader::new(&mut source, DeflateFraming::Zlib);
        assert_truncation_fault(&mut filter, &data);
        assert!(filter.is_faulted());
        assert!(!filter.is_finished());
    }
}

#[test]
fn test_zlib_missing_trailer_faults() {
    let data = sample(4_000);
    let compressed = zlib(&data);
    // Every deflate block is present; only the Adler-32 trailer is gone.
    let cut = &compressed[..compressed.len() - 4];

    let mut source = Chunked::new(cut, usize::MAX);
    let mut filter = DeflateReader::new(&mut source, DeflateFraming::Zlib);
    let mut out = Vec::new();
    let err = filter.read_to_vec(&mut out).unwrap_err();
    assert!(err.is_decode());
    assert!(filter.is_faulted());
}

#[test]
fn test_truncated_raw_deflate_faults() {
    init();
    let data = sample(9_000);
    let compressed = raw_deflate(&data);
    let cut = &compressed[..compressed.len() * 2 / 3];

    let mut source = Chunked::new(cut, 7);
    let mut filter = DeflateReader::new(&mut source, DeflateFraming::Raw);
    assert_truncation_fault(&mut filter, &data);
    assert!(filter.is_faulted());
}

#[test]
fn test_truncated_bzip2_faults() {
    init();
    let data = sample(30_000);
    let compressed = bzip2(&data);
    let cut = &compressed[..compressed.len() - 8];

    for chunk in [13, usize::MAX] {
        let mut source = Chunked::new(cut, chunk);
        let mut filter = Bzip2Reader::new(&mut source);
        assert_truncation_fault(&mut filter, &data);
        assert!(filter.is_faulted());
    }
}

#[test]
fn test_empty_source_faults() {
    let mut source = Chunked::new(&[], usize::MAX);
    let mut filter = DeflateReader::new(&mut source, DeflateFraming::Zlib);
    let mut buf = [0u8; 16];
    assert!(filter.read(&mut buf).unwrap_err().is_decode());
    assert!(filter.is_faulted());
}

// ============================================================================
// Decode Faults
// ============================================================================

#[test]
fn test_corrupt_deflate_is_latched() {
    init();
    // A stored block followed by a block of the reserved type 3.
    let mut compressed = vec![0x00, 0x05, 0x00, 0xFA, 0xFF];
    compressed.extend_from_slice(b"hello");
    compressed.push(0x07);

    let mut source = Chunked::new(&compressed, usize::MAX);
    let mut filter = DeflateReader::new(&mut source, DeflateFraming::Raw);
    let mut out = Vec::new();
    let err = filter.read_to_vec(&mut out).unwrap_err();
    assert!(err.is_decode());
    assert!(filter.is_faulted());

    let mut buf = [0u8; 16];
    assert!(filter.read(&mut buf).unwrap_err().is_decode());
}

#[test]
fn test_corrupt_zlib_header() {
    let mut compressed = zlib(b"lump");
    compressed[1] ^= 0x01;

    let mut source = Chunked::new(&compressed, usize::MAX);
    let mut filter = DeflateReader::new(&mut source, DeflateFraming::Zlib);
    let mut buf = [0u8; 16];
    assert!(filter.read(&mut buf).unwrap_err().is_decode());
}

#[test]
fn test_bzip2_bad_magic() {
    let garbage = b"BZx9 definitely not a bzip2 stream";
    let mut source = Chunked::new(garbage, usize::MAX);
    let mut filter = Bzip2Reader::new(&mut source);
    let mut buf = [0u8; 16];
    assert!(filter.read(&mut buf).unwrap_err().is_decode());
    assert!(filter.read(&mut buf).unwrap_err().is_decode());
}

// ============================================================================
// Typed Extraction and Helpers
// ============================================================================

#[test]
fn test_typed_reads_through_filter() {
    let mut plain = Vec::new();
    plain.extend_from_slice(&0x1234u16.to_le_bytes());
    plain.extend_from_slice(&(-5i32).to_le_bytes());
    plain.extend_from_slice(&0xDEAD_BEEF_u32.to_le_bytes());
    let compressed = zlib(&plain);

    let mut source = Chunked::new(&compressed, 2);
    let mut filter = DeflateReader::new(&mut source, DeflateFraming::Zlib);
    assert_eq!(filter.read_u16().unwrap(), 0x1234);
    assert_eq!(filter.read_i32().unwrap(), -5);
    assert_eq!(filter.read_u32().unwrap(), 0xDEAD_BEEF);
    assert!(matches!(
        filter.read_u8().unwrap_err(),
        LumpioError::ShortRead { expected: 1, actual: 0 }
    ));
}

#[test]
fn test_decompress_to_vec_methods() {
    let data = sample(3_000);
    let cases = [
        (zlib(&data), CompressionMethod::Deflate(DeflateFraming::Zlib)),
        (bzip2(&data), CompressionMethod::Bzip2),
        (
            lzma_zip(&data),
            CompressionMethod::Lzma {
                uncompressed_size: data.len() as u64,
                header: LzmaHeader::Zip,
            },
        ),
    ];

    for (compressed, method) in cases {
        let mut source = Chunked::new(&compressed, 100);
        let out = decompress_to_vec(&mut source, method).unwrap();
        assert_eq!(out, data, "{}", method.name());
    }
}

#[test]
fn test_std_read_adapter() {
    use std::io::Read;

    let data = sample(1_000);
    let compressed = bzip2(&data);
    let mut source = Chunked::new(&compressed, 64);
    let mut filter = Bzip2Reader::new(&mut source);
    let mut out = Vec::new();
    Read::read_to_end(&mut filter, &mut out).unwrap();
    assert_eq!(out, data);
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_deflate_chunk_independent(
        data in proptest::collection::vec(any::<u8>(), 0..6000),
        chunk in 1usize..5000,
        read_size in 1usize..5000,
    ) {
        let compressed = raw_deflate(&data);
        let mut source = Chunked::new(&compressed, chunk);
        let mut filter = DeflateReader::new(&mut source, DeflateFraming::Raw);
        prop_assert_eq!(drain(&mut filter, read_size).unwrap(), data);
    }

    #[test]
    fn prop_lzma_exact_size(
        data in proptest::collection::vec(0u8..4, 1..4000),
        chunk in 1usize..5000,
        cut in 0usize..4000,
    ) {
        let size = cut.min(data.len());
        let compressed = lzma_bare(&data);
        let mut source = Chunked::new(&compressed, chunk);
        let mut filter = LzmaReader::new(&mut source, size as u64, LzmaHeader::Bare).unwrap();
        let out = drain(&mut filter, 1024).unwrap();
        prop_assert_eq!(&out[..], &data[..size]);
    }
}
