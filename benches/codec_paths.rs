//! Criterion benchmarks for Romgfx critical paths
//!
//! Benchmarks the core performance-critical operations:
//! - BitReader: sequential sub-byte reads
//! - IndexedCodec: descriptor-driven decode/encode
//! - Psx24Codec: direct-color decode/encode
//! - Arranger: full-sheet render

use std::rc::Rc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use romgfx::address::BitAddress;
use romgfx::arranger::Arranger;
use romgfx::bitstream::BitReader;
use romgfx::codec::{Codec, IndexedCodec, IndexedFormat, Psx24Codec};
use romgfx::color::ColorModel;
use romgfx::datafile::DataFile;
use romgfx::palette::Palette;

/// Deterministic pseudo-random fixture bytes
fn fixture_bytes(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 167 + 41) as u8).collect()
}

fn bench_bitreader(c: &mut Criterion) {
    let data = fixture_bytes(4096);
    let mut group = c.benchmark_group("bitreader");
    group.throughput(Throughput::Bytes(4096));

    for &width in &[1u32, 4, 8, 24] {
        group.bench_with_input(BenchmarkId::new("read_bits", width), &width, |b, &width| {
            b.iter(|| {
                let mut reader = BitReader::new(&data, 4096 * 8).unwrap();
                let mut acc = 0u64;
                while reader.remaining() >= width as u64 {
                    acc = acc.wrapping_add(reader.read_bits(width).unwrap() as u64);
                }
                black_box(acc)
            })
        });
    }
    group.finish();
}

fn bench_indexed_codec(c: &mut Criterion) {
    let palette = Palette::grayscale("gray", ColorModel::Rgb15, 4);
    let codec = IndexedCodec::new("packed-4bpp", 8, 8, IndexedFormat::packed(4)).unwrap();
    let interlaced = IndexedCodec::new(
        "interlaced-4bpp",
        8,
        8,
        IndexedFormat {
            color_depth: 4,
            row_interlace: true,
            row_pixel_pattern: vec![0],
        },
    )
    .unwrap();
    let data = fixture_bytes((codec.storage_size() / 8) as usize);

    let mut group = c.benchmark_group("indexed_codec");
    group.throughput(Throughput::Bytes(data.len() as u64));

    group.bench_function("decode_packed", |b| {
        b.iter(|| black_box(codec.decode(&palette, &data).unwrap()))
    });
    group.bench_function("decode_interlaced", |b| {
        b.iter(|| black_box(interlaced.decode(&palette, &data).unwrap()))
    });

    let decoded = codec.decode(&palette, &data).unwrap();
    group.bench_function("encode_packed", |b| {
        b.iter(|| black_box(codec.encode(&decoded).unwrap()))
    });
    group.finish();
}

fn bench_psx24_codec(c: &mut Criterion) {
    let codec = Psx24Codec::new(64, 64).unwrap();
    let data = fixture_bytes((codec.storage_size() / 8) as usize);

    let mut group = c.benchmark_group("psx24_codec");
    group.throughput(Throughput::Bytes(data.len() as u64));
    group.bench_function("decode", |b| {
        b.iter(|| black_box(codec.decode(&data).unwrap()))
    });
    let decoded = codec.decode(&data).unwrap();
    group.bench_function("encode", |b| {
        b.iter(|| black_box(codec.encode(&decoded).unwrap()))
    });
    group.finish();
}

fn bench_arranger_render(c: &mut Criterion) {
    let codec = Rc::new(Codec::Indexed(
        IndexedCodec::new("packed-4bpp", 8, 8, IndexedFormat::packed(4)).unwrap(),
    ));
    let palette = Rc::new(Palette::grayscale("gray", ColorModel::Rgb15, 4));
    let bytes = fixture_bytes((codec.storage_size() / 8 * 16 * 16) as usize);
    let file = Rc::new(DataFile::from_memory("rom", bytes));
    let arranger = Arranger::sequential(
        "sheet",
        16,
        16,
        file,
        BitAddress::new(0, 0),
        codec,
        palette,
    )
    .unwrap();

    c.bench_function("arranger_render_16x16", |b| {
        b.iter(|| {
            let (image, warnings) = arranger.render();
            assert!(warnings.is_empty());
            black_box(image)
        })
    });
}

criterion_group!(
    benches,
    bench_bitreader,
    bench_indexed_codec,
    bench_psx24_codec,
    bench_arranger_render
);
criterion_main!(benches);
