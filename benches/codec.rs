use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use npi154::protocol::{encode_uart, CommandType, FrameParser, MtFrame, Subsystem};
use npi154::{decode_indication, MAX_PAYLOAD_SIZE};

fn frame(len: usize) -> MtFrame {
    MtFrame::build(CommandType::Areq, Subsystem::Mac, 0x85, vec![0u8; len]).unwrap()
}

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec");

    // Status-sized frame
    let small = frame(1);
    group.throughput(Throughput::Bytes(5));
    group.bench_function("encode_uart_1b", |b| {
        b.iter(|| {
            black_box(encode_uart(&small));
        });
    });

    // Largest frame the length byte allows
    let large = frame(MAX_PAYLOAD_SIZE);
    group.throughput(Throughput::Bytes(MAX_PAYLOAD_SIZE as u64 + 5));
    group.bench_function("encode_uart_250b", |b| {
        b.iter(|| {
            black_box(encode_uart(&large));
        });
    });

    group.finish();
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec");

    // One full frame per push
    let encoded = encode_uart(&frame(MAX_PAYLOAD_SIZE));
    group.throughput(Throughput::Bytes(encoded.len() as u64));
    group.bench_function("parse_250b", |b| {
        let mut parser = FrameParser::new();
        b.iter(|| {
            black_box(parser.push(&encoded));
        });
    });

    // A burst of small frames split into serial-sized reads
    let burst: Vec<u8> = (0..64).flat_map(|_| encode_uart(&frame(8)).to_vec()).collect();
    group.throughput(Throughput::Bytes(burst.len() as u64));
    group.bench_function("parse_burst_32b_reads", |b| {
        let mut parser = FrameParser::new();
        b.iter(|| {
            for chunk in burst.chunks(32) {
                black_box(parser.push(chunk));
            }
        });
    });

    group.finish();
}

fn bench_decode_indication(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec");

    // Data indication carrying a 64-byte MSDU
    let mut attrs = vec![0x02, 0x01, 0x00, 0, 0, 0, 0, 0, 0];
    attrs.extend([0x03, 1, 2, 3, 4, 5, 6, 7, 8]);
    attrs.extend([0u8; 14]);
    attrs.extend([0u8; 11]);
    attrs.extend([0u8; 4]);
    attrs.extend(64u16.to_le_bytes());
    attrs.extend(0u16.to_le_bytes());
    attrs.extend([0xA5; 64]);
    let data_ind = MtFrame::build(CommandType::Areq, Subsystem::Mac, 0x85, attrs).unwrap();

    group.throughput(Throughput::Bytes(data_ind.attrs().len() as u64));
    group.bench_function("decode_data_ind", |b| {
        b.iter(|| {
            black_box(decode_indication(&data_ind).unwrap());
        });
    });

    group.finish();
}

criterion_group!(benches, bench_encode, bench_parse, bench_decode_indication);
criterion_main!(benches);
