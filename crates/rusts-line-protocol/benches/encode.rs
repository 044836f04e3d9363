//! Encoding benchmarks

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use rusts_core::{Point, WritePrecision};
use rusts_line_protocol::{LineProtocolEncoder, LineProtocolParser};

fn build_points(points: usize) -> Vec<Point> {
    (0..points)
        .map(|i| {
            let region = if i % 2 == 0 { "us west" } else { "eu,central" };
            Point::measurement("cpu")
                .unwrap()
                .tag("host", format!("h{}", i % 100))
                .tag("region", region)
                .float_field("value", (i % 100) as f64 * 1.5)
                .integer_field("cores", 8)
                .string_field("note", "say \"hi\"")
                .timestamp_nanos(1_700_000_000_000_000_000 + i as i64 * 1_000)
        })
        .collect()
}

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");

    for size in [1_000usize, 10_000usize] {
        let points = build_points(size);
        group.throughput(Throughput::Elements(size as u64));

        for precision in [WritePrecision::Nanosecond, WritePrecision::Second] {
            let encoder = LineProtocolEncoder::new(precision);
            group.bench_function(format!("encode_{}_{}", precision, size), |b| {
                b.iter(|| encoder.encode_all(black_box(&points)).unwrap())
            });
        }
    }
    group.finish();
}

fn bench_round_trip(c: &mut Criterion) {
    let points = build_points(1_000);
    let input = LineProtocolEncoder::default()
        .encode_all(&points)
        .unwrap()
        .join("\n");

    let mut group = c.benchmark_group("round_trip");
    group.throughput(Throughput::Elements(points.len() as u64));
    group.bench_function("parse_reencode_1000", |b| {
        b.iter(|| {
            let (parsed, _errors) =
                LineProtocolParser::parse_lines_ok(black_box(&input), WritePrecision::Nanosecond);
            LineProtocolEncoder::default().encode_all(&parsed).unwrap()
        })
    });
    group.finish();
}

criterion_group!(benches, bench_encode, bench_round_trip);
criterion_main!(benches);
