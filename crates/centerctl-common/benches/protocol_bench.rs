// Criterion benchmarks for centerctl-common protocol layer
//
// Run benchmarks with:
//   cargo bench -p centerctl-common
//
// For detailed output with plots:
//   cargo bench -p centerctl-common -- --save-baseline main

use centerctl_common::protocol::{
    CreateVolumeRequest, MessageHeader, ReserveVolumeRequest, StructBuilder, TType, Value,
};
use centerctl_common::transport::BinaryCodec;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn bench_call_encoding(c: &mut Criterion) {
    let mut group = c.benchmark_group("call_encoding");

    group.bench_function("create_volume", |b| {
        let header = MessageHeader::call("createVolume");
        let req = CreateVolumeRequest::with_size_mb("vol123", 16, 1, 42).unwrap();
        b.iter(|| BinaryCodec::encode_call(black_box(&header), black_box(&req)));
    });

    group.bench_function("reserve_volume", |b| {
        let header = MessageHeader::call("reserveVolume");
        let req = ReserveVolumeRequest::with_size_mb(7, "vol7", 1024, 1, 42).unwrap();
        b.iter(|| BinaryCodec::encode_call(black_box(&header), black_box(&req)));
    });

    group.finish();
}

fn volume(id: i64) -> Value {
    StructBuilder::new()
        .i64(1, id)
        .string(2, &format!("vol{}", id))
        .i64(3, 16 * 1024 * 1024)
        .i32(4, 1)
        .i64(5, 42)
        .build()
}

fn bench_reply_decoding(c: &mut Criterion) {
    let mut group = c.benchmark_group("reply_decoding");

    let header = MessageHeader::call("getVolume");
    let small = BinaryCodec::encode_reply(&header, &volume(1)).unwrap();
    group.bench_function("decode_small", |b| {
        b.iter(|| BinaryCodec::decode_reply(black_box(&small), black_box(&header)));
    });

    let list_header = MessageHeader::call("listVolumes");
    let volumes: Vec<Value> = (0..1000).map(volume).collect();
    let list = StructBuilder::new()
        .value(1, Value::List(TType::Struct, volumes))
        .build();
    let large = BinaryCodec::encode_reply(&list_header, &list).unwrap();
    group.bench_function("decode_1000_volumes", |b| {
        b.iter(|| BinaryCodec::decode_reply(black_box(&large), black_box(&list_header)));
    });

    group.finish();
}

fn bench_reply_rendering(c: &mut Criterion) {
    let mut group = c.benchmark_group("reply_rendering");

    let volumes: Vec<Value> = (0..1000).map(volume).collect();
    let list = StructBuilder::new()
        .value(1, Value::List(TType::Struct, volumes))
        .build();
    group.bench_function("to_json_1000_volumes", |b| {
        b.iter(|| serde_json::to_string_pretty(&black_box(&list).to_json()));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_call_encoding,
    bench_reply_decoding,
    bench_reply_rendering
);
criterion_main!(benches);
