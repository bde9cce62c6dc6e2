use rand::rngs::StdRng;
use rand::SeedableRng;
use seedfec::fec::{
    Binary, Binary16, Binary4, Binary8, CodedPayload, Decoder, DecoderVariant, Encoder,
    EncoderVariant, Field, FieldKind, SymbolBlock,
};
use seedfec::CodecError;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn example_block() -> SymbolBlock {
    SymbolBlock::from_symbols(&[[1u8, 2], [3, 4], [5, 6]]).unwrap()
}

/// Feeds sequential seeds until the decoder completes and returns the number
/// of payloads it took.
fn run_to_completion<F: Field>(block: &SymbolBlock) -> usize {
    let mut enc = Encoder::<F>::new(block.symbols(), block.symbol_size()).unwrap();
    enc.bind_source(block.clone()).unwrap();
    let mut dec = Decoder::<F>::new(block.symbols(), block.symbol_size()).unwrap();

    let limit = block.symbols() as u32 + 64;
    let mut sent = 0;
    for seed in 0..limit {
        let rank = dec.rank();
        let innovative = dec.decode(seed, enc.encode(seed).unwrap()).unwrap();
        sent += 1;
        assert_eq!(dec.rank(), rank + innovative as usize);
        if dec.is_complete() {
            break;
        }
    }
    assert!(dec.is_complete(), "{} did not reach full rank", F::KIND);
    assert_eq!(&dec.decoded_symbols().unwrap(), block);
    sent
}

#[test]
fn every_field_recovers_the_block() {
    init_logger();
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let block = SymbolBlock::random(16, 64, &mut rng);
    let sent = run_to_completion::<Binary>(&block);
    assert!(sent >= 16);
    run_to_completion::<Binary4>(&block);
    run_to_completion::<Binary8>(&block);
    run_to_completion::<Binary16>(&block);
}

#[test]
fn larger_block_over_binary8() {
    init_logger();
    let mut rng = StdRng::seed_from_u64(7);
    let block = SymbolBlock::random(64, 1040, &mut rng);
    let sent = run_to_completion::<Binary8>(&block);
    assert!(sent < 64 + 8);
}

#[test]
fn three_symbol_binary_example() {
    init_logger();
    let block = example_block();
    let mut enc = Encoder::<Binary>::new(3, 2).unwrap();
    enc.bind_source(block.clone()).unwrap();
    let mut dec = Decoder::<Binary>::new(3, 2).unwrap();

    for seed in 0..3 {
        let payload = enc.encode_payload(seed).unwrap();
        assert!(dec.decode_payload(&payload).unwrap());
    }
    assert_eq!(dec.rank(), 3);
    assert!(dec.is_complete());
    let decoded = dec.decoded_symbols().unwrap();
    assert_eq!(decoded.symbol(0), &[1, 2]);
    assert_eq!(decoded.symbol(1), &[3, 4]);
    assert_eq!(decoded.symbol(2), &[5, 6]);
}

#[test]
fn single_symbol_block() {
    init_logger();
    let block = SymbolBlock::from_symbols(&[[0xdeu8, 0xad, 0xbe, 0xef]]).unwrap();
    let mut enc = Encoder::<Binary>::new(1, 4).unwrap();
    enc.bind_source(block.clone()).unwrap();
    let mut dec = Decoder::<Binary>::new(1, 4).unwrap();

    // seed 0 selects the only symbol
    assert_eq!(enc.generate(0), vec![1]);
    assert_eq!(enc.encode(0).unwrap(), block.symbol(0));
    assert!(dec.decode(0, enc.encode(0).unwrap()).unwrap());
    assert!(dec.is_complete());
    assert_eq!(dec.decoded_symbols().unwrap(), block);
}

#[test]
fn encoding_is_deterministic() {
    let mut rng = StdRng::seed_from_u64(1);
    let block = SymbolBlock::random(8, 32, &mut rng);
    let mut a = Encoder::<Binary16>::new(8, 32).unwrap();
    let mut b = Encoder::<Binary16>::new(8, 32).unwrap();
    a.bind_source(block.clone()).unwrap();
    b.bind_source(block).unwrap();
    let dec = Decoder::<Binary16>::new(8, 32).unwrap();

    for seed in [0u32, 1, 1000, u32::MAX] {
        let first = a.encode(seed).unwrap().to_vec();
        assert_eq!(a.encode(seed).unwrap(), &first[..]);
        assert_eq!(b.encode(seed).unwrap(), &first[..]);
        assert_eq!(a.generate(seed), dec.generate(seed));
    }
}

#[test]
fn duplicates_are_discarded() {
    init_logger();
    let mut rng = StdRng::seed_from_u64(2);
    let block = SymbolBlock::random(4, 16, &mut rng);
    let mut enc = Encoder::<Binary8>::new(4, 16).unwrap();
    enc.bind_source(block.clone()).unwrap();
    let mut dec = Decoder::<Binary8>::new(4, 16).unwrap();

    let payload = enc.encode_payload(11).unwrap();
    assert!(dec.decode_payload(&payload).unwrap());
    for _ in 0..3 {
        assert!(!dec.decode_payload(&payload).unwrap());
        assert_eq!(dec.rank(), 1);
    }
    for seed in 12..40 {
        if dec.is_complete() {
            break;
        }
        dec.decode_payload(&enc.encode_payload(seed).unwrap()).unwrap();
    }
    assert!(dec.is_complete());
    assert_eq!(dec.decoded_symbols().unwrap(), block);
}

#[test]
fn recovers_after_heavy_loss() {
    init_logger();
    let mut rng = StdRng::seed_from_u64(3);
    let block = SymbolBlock::random(32, 128, &mut rng);
    let mut enc = Encoder::<Binary8>::new(32, 128).unwrap();
    enc.bind_source(block.clone()).unwrap();
    let mut dec = Decoder::<Binary8>::new(32, 128).unwrap();

    // two out of every three payloads are lost
    for seed in (0..200u32).filter(|s| s % 3 == 0) {
        if dec.is_complete() {
            break;
        }
        dec.decode_payload(&enc.encode_payload(seed).unwrap()).unwrap();
    }
    assert!(dec.is_complete());
    assert_eq!(dec.decoded_symbols().unwrap(), block);
}

#[test]
fn batch_encoding_matches_sequential() {
    let mut rng = StdRng::seed_from_u64(4);
    let block = SymbolBlock::random(24, 256, &mut rng);
    let mut enc = Encoder::<Binary4>::new(24, 256).unwrap();
    enc.bind_source(block.clone()).unwrap();

    let seeds: Vec<u32> = (100..160).collect();
    let batch = enc.encode_batch(&seeds).unwrap();
    assert_eq!(batch.len(), seeds.len());
    for payload in &batch {
        assert_eq!(payload, &enc.encode_payload(payload.seed).unwrap());
    }

    // arrival order does not matter
    let mut dec = Decoder::<Binary4>::new(24, 256).unwrap();
    for payload in batch.iter().rev() {
        if dec.is_complete() {
            break;
        }
        dec.decode_payload(payload).unwrap();
    }
    assert_eq!(dec.decoded_symbols().unwrap(), block);
}

#[test]
fn payload_wire_layout() {
    let mut enc = Encoder::<Binary>::new(3, 2).unwrap();
    enc.bind_source(example_block()).unwrap();
    assert_eq!(enc.payload_size(), 6);

    let p0 = enc.encode_payload(0).unwrap();
    assert_eq!(hex::encode(p0.to_bytes()), "000000000700");
    let p1 = enc.encode_payload(1).unwrap();
    assert_eq!(hex::encode(p1.to_bytes()), "000000010404");

    let raw = hex::decode("000000010404").unwrap();
    assert_eq!(CodedPayload::from_bytes(&raw, 2).unwrap(), p1);
    assert!(matches!(
        CodedPayload::from_bytes(&raw, 3),
        Err(CodecError::MalformedPayload { expected: 7, actual: 6 })
    ));
}

#[test]
fn decoder_errors() {
    init_logger();
    let mut dec = Decoder::<Binary>::new(3, 2).unwrap();
    assert_eq!(
        dec.decoded_symbols().unwrap_err(),
        CodecError::NotComplete { rank: 0, symbols: 3 }
    );
    assert!(matches!(
        dec.decode(0, &[1, 2, 3]),
        Err(CodecError::SizeMismatch { .. })
    ));

    let mut enc = Encoder::<Binary>::new(3, 2).unwrap();
    enc.bind_source(example_block()).unwrap();
    for seed in 0..3 {
        dec.decode(seed, enc.encode(seed).unwrap()).unwrap();
    }
    assert_eq!(
        dec.decode(3, enc.encode(3).unwrap()),
        Err(CodecError::AlreadyComplete)
    );
    assert_eq!(dec.decoded_symbols().unwrap(), example_block());
}

#[test]
fn runtime_selected_codecs() {
    init_logger();
    let mut rng = StdRng::seed_from_u64(5);
    let block = SymbolBlock::random(10, 40, &mut rng);
    for kind in FieldKind::ALL {
        let mut enc = EncoderVariant::new(kind, 10, 40).unwrap();
        let mut dec = DecoderVariant::new(kind, 10, 40).unwrap();
        assert_eq!(enc.field(), kind);
        assert_eq!(dec.field(), kind);
        enc.bind_source(block.clone()).unwrap();

        let mut seed = 0;
        while !dec.is_complete() && seed < 100 {
            let payload = enc.encode_payload(seed).unwrap();
            let wire = payload.to_bytes();
            let received = CodedPayload::from_bytes(&wire, dec.symbol_size()).unwrap();
            dec.decode_payload(&received).unwrap();
            seed += 1;
        }
        assert_eq!(dec.decoded_symbols().unwrap(), block, "{}", kind);
        assert_eq!(dec.symbols_decoded(), 10);
    }
}

#[test]
fn rebinding_a_mismatched_block_fails() {
    let mut enc = EncoderVariant::new(FieldKind::Binary8, 3, 2).unwrap();
    enc.bind_source(example_block()).unwrap();
    let err = enc.bind_source(SymbolBlock::new(4, 2)).unwrap_err();
    assert_eq!(
        err,
        CodecError::SizeMismatch {
            expected_symbols: 3,
            expected_size: 2,
            actual_symbols: 4,
            actual_size: 2,
        }
    );
    assert!(enc.encode(0).is_ok());
}
