use contact_bits::divergence::report;
use contact_bits::event::RecordingSink;
use contact_bits::markov::EmissionTable;
use contact_bits::midi::MidiTrackSink;
use contact_bits::pipeline::analyze;
use contact_bits::symbol::SymbolStream;
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;

/// Deterministic bits file with `lines` entries (xorshift, no external RNG).
fn bits_input(lines: usize) -> Vec<u8> {
    let mut state: u64 = 0x9E37_79B9_7F4A_7C15;
    let mut out = Vec::with_capacity(lines * 3);
    for _ in 0..lines {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        out.push(if state & 1 == 1 { b'1' } else { b'0' });
        out.push(if state & 2 == 2 { b'1' } else { b'0' });
        out.push(b'\n');
    }
    out
}

fn bench_decode(c: &mut Criterion) {
    let data = bits_input(100_000);
    c.bench_function("decode_100k", |b| {
        b.iter(|| SymbolStream::decode(black_box(&data)))
    });
}

fn bench_analyze(c: &mut Criterion) {
    let mut group = c.benchmark_group("analysis pass");
    let table = EmissionTable::default();

    for lines in [1_000, 10_000, 100_000] {
        let stream = SymbolStream::decode(&bits_input(lines));

        group.bench_with_input(BenchmarkId::new("recording", lines), &stream, |b, stream| {
            b.iter(|| {
                let mut sink = RecordingSink::new();
                let distributions = analyze(stream, &table, &mut sink).unwrap();
                report(&distributions)
            })
        });

        group.bench_with_input(BenchmarkId::new("midi", lines), &stream, |b, stream| {
            b.iter(|| {
                let mut sink = MidiTrackSink::new("bench");
                analyze(stream, &table, &mut sink).unwrap();
                sink.track().len()
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_decode, bench_analyze);
criterion_main!(benches);
