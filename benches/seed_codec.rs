use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::SeedableRng;
use seedfec::fec::{Binary, Binary16, Binary4, Binary8, Decoder, Encoder, Field, SymbolBlock};

const SYMBOLS: usize = 128;
const SYMBOL_SIZE: usize = 1040;

/// Encodes `SYMBOLS * 3` payloads with sequential seeds, each framed as
/// `<seed> <symbol>`.
fn encode_payloads<F: Field>(encoder: &mut Encoder<F>, payloads: &mut [Vec<u8>]) {
    for (seed, payload) in payloads.iter_mut().enumerate() {
        let seed = seed as u32;
        payload[..4].copy_from_slice(&seed.to_be_bytes());
        encoder
            .encode_into(seed, &mut payload[4..])
            .expect("source bound");
    }
}

fn bench_field<F: Field>(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(0);
    let block = SymbolBlock::random(SYMBOLS, SYMBOL_SIZE, &mut rng);
    let mut encoder = Encoder::<F>::new(SYMBOLS, SYMBOL_SIZE).unwrap();
    encoder.bind_source(block).unwrap();
    let mut payloads = vec![vec![0u8; encoder.payload_size()]; SYMBOLS * 3];

    let mut group = c.benchmark_group("seed_codec");
    group.throughput(Throughput::Bytes(encoder.block_size() as u64));

    group.bench_function(BenchmarkId::new("encoder", F::KIND), |b| {
        b.iter(|| encode_payloads(&mut encoder, black_box(&mut payloads)));
    });

    encode_payloads(&mut encoder, &mut payloads);
    group.bench_function(BenchmarkId::new("decoder", F::KIND), |b| {
        b.iter_batched(
            || Decoder::<F>::new(SYMBOLS, SYMBOL_SIZE).unwrap(),
            |mut decoder| {
                for payload in &payloads {
                    let seed = u32::from_be_bytes([payload[0], payload[1], payload[2], payload[3]]);
                    decoder.decode(seed, &payload[4..]).unwrap();
                    if decoder.is_complete() {
                        break;
                    }
                }
                assert!(decoder.is_complete());
                decoder
            },
            BatchSize::LargeInput,
        );
    });
    group.finish();
}

fn bench_seed_codec(c: &mut Criterion) {
    bench_field::<Binary>(c);
    bench_field::<Binary4>(c);
    bench_field::<Binary8>(c);
    bench_field::<Binary16>(c);
}

criterion_group!(benches, bench_seed_codec);
criterion_main!(benches);
