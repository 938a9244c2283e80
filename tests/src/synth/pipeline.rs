use rand::{Rng, SeedableRng, rngs::StdRng};
use umbra_core::{OpKind, Seed, SynthConfig, ValidationConfig};
use umbra_emit::{ArtifactSink, DispatchConverter, MemorySink, parse_artifact};
use umbra_synth::Pipeline;

const SEED_HEX: &str = "0x1234567890abcdef1234567890abcdef1234567890abcdef1234567890abcdef";

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_ansi(false)
        .without_time()
        .with_test_writer()
        .try_init();
}

#[test]
fn test_injective_catalog_leaves_artifact_absent() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let artifact = dir.path().join("zasm_generated.cpp");
    let errors = dir.path().join("errors.txt");

    let config = SynthConfig {
        width: 8,
        min_length: 1,
        max_length: 1,
        catalog: vec![OpKind::Add, OpKind::Xor],
        seed: Some(Seed::from_hex(SEED_HEX).unwrap()),
        ..Default::default()
    };
    let pipeline = Pipeline::new(config).unwrap();
    let mut sink = ArtifactSink::new(&artifact).with_error_log(&errors);
    let report = pipeline.run(&mut sink).unwrap();

    assert_eq!(report.totals.chains, 2);
    assert_eq!(report.totals.injective, 2);
    assert_eq!(report.totals.emitted, 0);
    assert!(!artifact.exists());
    assert!(!errors.exists());
}

#[test]
fn test_and_shr_sub_triples_within_bounds() {
    init_tracing();
    let config = SynthConfig {
        width: 32,
        min_length: 3,
        max_length: 3,
        operand_limit: Some(4),
        catalog: vec![OpKind::And, OpKind::Shr, OpKind::Sub],
        validation: ValidationConfig {
            samples: 4096,
            random_samples: 1024,
        },
        seed: Some(Seed::from_hex(SEED_HEX).unwrap()),
        ..Default::default()
    };
    let range = config.output_range;
    let pipeline = Pipeline::new(config).unwrap();
    let mut sink = MemorySink::new();
    let report = pipeline.run(&mut sink).unwrap();

    assert_eq!(report.totals.chains, 27);
    // [and -> shr -> *] collapses once the mask is shifted out
    assert!(report.totals.emitted > 0);
    assert_eq!(report.totals.numeric_mismatches, 0);

    let mut rng = StdRng::seed_from_u64(99);
    for p in &sink.predicates {
        assert!(range.contains(p.constant), "{} out of range", p.annotation());
        assert!(p.operands.iter().all(|&r| (1..=4).contains(&r)));
        assert!(p.samples_checked >= 4096);
        assert_eq!(p.expression, p.chain.closed_form(&p.operands));
        for x in (0..4096).chain((0..4096).map(|_| rng.random::<u32>() as u64)) {
            assert_eq!(p.chain.evaluate(x, &p.operands, 32), p.constant);
        }
    }
}

#[test]
fn test_generated_artifact_converts_arm_per_predicate() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let artifact = dir.path().join("zasm_generated.cpp");
    let expressions = dir.path().join("generated.txt");

    let config = SynthConfig {
        width: 16,
        min_length: 2,
        max_length: 2,
        catalog: vec![OpKind::Shl, OpKind::And, OpKind::Rotr],
        seed: Some(Seed::from_hex(SEED_HEX).unwrap()),
        ..Default::default()
    };
    let pipeline = Pipeline::new(config).unwrap();
    let mut sink = ArtifactSink::new(&artifact).with_expressions(&expressions);
    let report = pipeline.run(&mut sink).unwrap();
    assert!(report.totals.emitted > 0);

    let text = std::fs::read_to_string(&artifact).unwrap();
    let fragments = parse_artifact(&text);
    assert_eq!(fragments.len() as u64, report.totals.emitted);
    let lines = std::fs::read_to_string(&expressions).unwrap();
    assert_eq!(lines.lines().count(), fragments.len());

    let block = DispatchConverter::default().convert(&fragments).unwrap();
    assert_eq!(block.len(), fragments.len());
    for (i, arm) in block.arms.iter().enumerate() {
        assert_eq!(arm.index, i);
        assert_eq!(arm.guard, fragments[i].guard);
    }
}

#[test]
fn test_report_serializes_with_its_seed() {
    let config = SynthConfig {
        width: 8,
        min_length: 1,
        max_length: 2,
        catalog: vec![OpKind::Shr],
        operand_limit: Some(4),
        seed: Some(Seed::from_hex(SEED_HEX).unwrap()),
        ..Default::default()
    };
    let pipeline = Pipeline::new(config).unwrap();
    let report = pipeline.run(&mut MemorySink::new()).unwrap();
    assert_eq!(report.lengths.len(), 2);
    assert_eq!(report.totals.chains, 2);

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["seed"], SEED_HEX);
    assert_eq!(json["width"], 8);
    assert_eq!(json["lengths"][1]["length"], 2);
    assert_eq!(json["lengths"][0]["chains"], 1);
}
