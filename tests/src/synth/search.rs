use std::collections::HashSet;
use umbra_core::{Chain, ChainComposer, OpKind, SymbolNames, SynthConfig};
use umbra_synth::{InvarianceSearch, SearchOutcome, SearchParams};
use z3::{Config, Context};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .without_time()
        .with_test_writer()
        .try_init();
}

fn params(width: u32, operand_limit: u64) -> SearchParams {
    let config = SynthConfig {
        width,
        operand_limit: Some(operand_limit),
        ..Default::default()
    };
    SearchParams::from_config(&config, Some(42))
}

#[test]
fn test_add_and_xor_are_quick_rejected() {
    init_tracing();
    let cfg = Config::new();
    let ctx = Context::new(&cfg);
    let search = InvarianceSearch::new(&ctx, params(8, 4));
    let mut names = SymbolNames::new();
    for chain in ChainComposer::new(&[OpKind::Add, OpKind::Xor], 1) {
        let report = search.search(&chain, &mut names).unwrap();
        assert_eq!(report.outcome, SearchOutcome::Injective, "{chain}");
        assert!(!report.quick_reject_passed);
    }
}

#[test]
fn test_refinement_never_repeats_a_proposal() {
    init_tracing();
    let cfg = Config::new();
    let ctx = Context::new(&cfg);
    let search = InvarianceSearch::new(&ctx, params(32, 4));
    let mut names = SymbolNames::new();
    for chain in ChainComposer::new(&[OpKind::Shr, OpKind::Sub], 2) {
        let report = search.search(&chain, &mut names).unwrap();
        let distinct: HashSet<&Vec<u64>> = report.proposals.iter().collect();
        assert_eq!(distinct.len(), report.proposals.len(), "{chain} repeated a model");
        for proposal in &report.proposals {
            assert!(proposal.iter().all(|&r| (1..=4).contains(&r)));
        }
    }
}

#[test]
fn test_hits_pass_the_quick_reject_gate() {
    init_tracing();
    let cfg = Config::new();
    let ctx = Context::new(&cfg);
    let search = InvarianceSearch::new(&ctx, params(16, 8));
    let mut names = SymbolNames::new();
    let mut hits = 0;
    for chain in ChainComposer::new(&[OpKind::Shl, OpKind::And, OpKind::Add], 2) {
        let report = search.search(&chain, &mut names).unwrap();
        if let SearchOutcome::Hit(witness) = &report.outcome {
            hits += 1;
            assert!(report.quick_reject_passed);
            assert_eq!(report.proposals.last(), Some(&witness.operands));
            assert!(witness.constant <= 40960);
            for x in 0..=u64::from(u16::MAX) {
                assert_eq!(chain.evaluate(x, &witness.operands, 16), witness.constant);
            }
        }
    }
    assert!(hits > 0);
}

#[test]
fn test_output_range_excludes_constants_outside_it() {
    init_tracing();
    let config = SynthConfig {
        width: 16,
        output_range: umbra_core::OutputRange { lo: 1, hi: 40960 },
        ..Default::default()
    };
    let cfg = Config::new();
    let ctx = Context::new(&cfg);
    let search = InvarianceSearch::new(&ctx, SearchParams::from_config(&config, Some(7)));
    let mut names = SymbolNames::new();
    let report = search
        .search(&Chain::new(vec![OpKind::Shr, OpKind::Shr]), &mut names)
        .unwrap();
    // the only constant instance produces 0, which the range forbids
    assert!(matches!(report.outcome, SearchOutcome::Exhausted { .. }));
}
