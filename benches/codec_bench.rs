//! Performance benchmarks for the tracker codec.
//!
//! Measures encode/decode throughput for the frame path a busy server
//! exercises on every received packet.
//!
//! Run benchmarks with:
//! ```sh
//! cargo bench --bench codec_bench
//! ```

use bytes::BytesMut;
use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use geotrack_core::DeviceId;
use geotrack_protocol::{CommandCode, Frame, TrackerCodec};
use std::hint::black_box;
use tokio_util::codec::{Decoder, Encoder};

const FEEDBACK_BODY: &str = "240101A3600.0000N04500.0000E000.0120000090.0011110000L00000000";

fn device() -> DeviceId {
    DeviceId::new("35701588506").unwrap()
}

/// The smallest frame a device sends.
fn handshake_frame() -> Frame {
    Frame::build(&device(), CommandCode::Handshake, "").unwrap()
}

/// A realistic feedback frame with a full 62-byte location record.
fn feedback_frame() -> Frame {
    Frame::build(&device(), CommandCode::Feedback, FEEDBACK_BODY).unwrap()
}

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");
    group.throughput(Throughput::Elements(1));

    let handshake = handshake_frame();
    group.bench_function("handshake_frame", |b| {
        b.iter(|| {
            let mut codec = TrackerCodec::new();
            let mut buffer = BytesMut::new();
            codec.encode(black_box(handshake.clone()), &mut buffer).unwrap();
            black_box(buffer);
        });
    });

    let feedback = feedback_frame();
    group.bench_function("feedback_frame", |b| {
        b.iter(|| {
            let mut codec = TrackerCodec::new();
            let mut buffer = BytesMut::new();
            codec.encode(black_box(feedback.clone()), &mut buffer).unwrap();
            black_box(buffer);
        });
    });

    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");
    group.throughput(Throughput::Elements(1));

    let feedback_bytes = feedback_frame().contents();
    group.bench_function("feedback_frame", |b| {
        b.iter(|| {
            let mut codec = TrackerCodec::new();
            let mut buffer = BytesMut::from(&feedback_bytes[..]);
            let frame = codec.decode(black_box(&mut buffer)).unwrap().unwrap();
            black_box(frame);
        });
    });

    // A burst of frames in one buffer, as delivered by a coalesced read
    let mut burst = Vec::new();
    for _ in 0..16 {
        burst.extend_from_slice(&feedback_frame().contents());
    }
    group.throughput(Throughput::Elements(16));
    group.bench_function("burst_of_16", |b| {
        b.iter(|| {
            let mut codec = TrackerCodec::new();
            let mut buffer = BytesMut::from(&burst[..]);
            for _ in 0..16 {
                let frame = codec.decode(&mut buffer).unwrap().unwrap();
                black_box(frame);
            }
        });
    });

    group.finish();
}

criterion_group!(benches, bench_encode, bench_decode);
criterion_main!(benches);
