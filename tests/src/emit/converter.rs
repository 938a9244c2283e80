use umbra_core::{Chain, Labels, OpKind, VerifiedPredicate};
use umbra_emit::{ConverterConfig, DispatchBlock, DispatchConverter, Error, Fragment, parse_artifact};

fn fragment(ops: Vec<OpKind>, operands: Vec<u64>, constant: u64) -> Fragment {
    let chain = Chain::new(ops);
    let predicate = VerifiedPredicate {
        expression: chain.closed_form(&operands),
        chain,
        operands,
        constant,
        samples_checked: 0,
    };
    Fragment::from_predicate(&predicate, &Labels::default())
}

fn three_fragments() -> Vec<Fragment> {
    vec![
        fragment(vec![OpKind::Shl, OpKind::And], vec![16, 6], 0),
        fragment(vec![OpKind::And, OpKind::Shr, OpKind::Xor], vec![4, 3, 9], 9),
        fragment(vec![OpKind::Shr, OpKind::Shr, OpKind::Sub], vec![16, 16, 0], 0),
    ]
}

fn artifact(fragments: &[Fragment]) -> String {
    fragments.iter().map(Fragment::render).collect()
}

#[test]
fn test_three_fragments_give_three_arms_and_a_default() {
    let text = artifact(&three_fragments());
    let dispatch = DispatchConverter::default()
        .convert_and_render(&text)
        .unwrap();

    let cases: Vec<&str> = dispatch
        .lines()
        .map(str::trim)
        .filter(|l| l.starts_with("case "))
        .collect();
    assert_eq!(cases, vec!["case 0: {", "case 1: {", "case 2: {"]);
    assert_eq!(dispatch.matches("default:").count(), 1);
    assert!(dispatch.starts_with("switch (rnd::number<std::size_t>(0, 2)) {\n"));
    assert_eq!(dispatch.matches("break;").count(), 3);
}

#[test]
fn test_removing_a_separator_merges_arms() {
    let fragments = three_fragments();
    let mut merged = fragments[0].render();
    // drop the blank separator after the first fragment
    merged.pop();
    merged.push_str(&fragments[1].render());
    merged.push_str(&fragments[2].render());

    let block = DispatchConverter::default().convert_text(&merged).unwrap();
    assert_eq!(block.len(), 2);
    // the second guard now sits inside arm 0 as an ordinary line
    assert!(block.arms[0].instructions.contains(&fragments[1].guard));
    assert_eq!(block.arms[1].guard, fragments[2].guard);
}

#[test]
fn test_resplitting_recovers_fragment_lines() {
    let fragments = three_fragments();
    let converter = DispatchConverter::default();
    let block = converter.convert(&parse_artifact(&artifact(&fragments))).unwrap();
    let rendered = converter.render(&block).unwrap();

    let parsed = DispatchBlock::parse(&rendered, converter.config()).unwrap();
    assert_eq!(parsed.len(), fragments.len());
    for (i, (arm, fragment)) in parsed.arms.iter().zip(&fragments).enumerate() {
        assert_eq!(arm.index, i);
        assert_eq!(arm.guard, fragment.guard);
        assert_eq!(arm.instructions, fragment.body);
    }

    // idempotent: rendering the parsed block again is byte-identical
    assert_eq!(converter.render(&parsed).unwrap(), rendered);
}

#[test]
fn test_legacy_xor_spelling_is_normalized() {
    let text = "// (x ^ 3) == 3\nas->xor(x, zasm::Imm(3));\nas->cmp(x, zasm::Imm(3));\n\n";
    let dispatch = DispatchConverter::default()
        .convert_and_render(text)
        .unwrap();
    assert!(dispatch.contains("\t\tas->xor_(x, zasm::Imm(3));\n"));
    assert!(dispatch.contains("\t\tas->cmp(x, zasm::Imm(3));\n\t\tvar_alloc.pop(as);\n"));
}

#[test]
fn test_custom_selector_without_cleanup() {
    let config = ConverterConfig {
        selector: "pick(0, {max})".to_string(),
        cleanup: None,
        ..Default::default()
    };
    let dispatch = DispatchConverter::new(config)
        .convert_and_render(&artifact(&three_fragments()))
        .unwrap();
    assert!(dispatch.starts_with("switch (pick(0, 2)) {"));
    assert!(!dispatch.contains("var_alloc.pop(as);"));
}

#[test]
fn test_empty_artifact_has_no_index_range() {
    let converter = DispatchConverter::default();
    assert!(matches!(converter.convert_text(""), Err(Error::EmptyArtifact)));
    assert!(matches!(
        converter.render(&DispatchBlock { arms: vec![] }),
        Err(Error::EmptyArtifact)
    ));
}
