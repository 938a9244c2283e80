use std::collections::HashSet;
use umbra_core::chain::sweep;
use umbra_core::{Chain, ChainComposer, OpKind, SymbolNames};

#[test]
fn test_composer_yields_full_cartesian_power() {
    let catalog = OpKind::default_catalog();
    for length in 1..=3 {
        let composer = ChainComposer::new(&catalog, length);
        let expected = (catalog.len() as u64).pow(length as u32);
        assert_eq!(composer.total(), expected);

        let chains: Vec<Chain> = composer.collect();
        assert_eq!(chains.len() as u64, expected);
        let distinct: HashSet<&Chain> = chains.iter().collect();
        assert_eq!(distinct.len(), chains.len(), "composer repeated a chain");
        assert!(chains.iter().all(|c| c.len() == length));
    }
}

#[test]
fn test_composer_order_is_lexicographic() {
    let catalog = [OpKind::And, OpKind::Shr];
    let chains: Vec<String> = ChainComposer::new(&catalog, 2)
        .map(|c| c.to_string())
        .collect();
    assert_eq!(
        chains,
        vec!["[and -> and]", "[and -> shr]", "[shr -> and]", "[shr -> shr]"]
    );
}

#[test]
fn test_sweep_covers_every_length() {
    let catalog = [OpKind::Add, OpKind::Xor, OpKind::Sub];
    let lengths: Vec<(usize, u64)> = sweep(&catalog, 1..=3)
        .map(|c| (c.length(), c.total()))
        .collect();
    assert_eq!(lengths, vec![(1, 3), (2, 9), (3, 27)]);
}

#[test]
fn test_symbol_names_stay_unique_across_chains() {
    let mut names = SymbolNames::new();
    let mut seen = HashSet::new();
    for chain in ChainComposer::new(&[OpKind::Shl, OpKind::Rotr], 3) {
        for _ in 0..=chain.len() {
            assert!(seen.insert(names.fresh("v")));
        }
        assert!(seen.insert(names.fresh("x")));
    }
    assert_eq!(names.issued() as usize, seen.len());
}
