use umbra_core::{Chain, Labels, OpKind, VerifiedPredicate};
use umbra_emit::{ArtifactSink, ErrorRecord, PredicateSink, parse_artifact};

fn predicate(operands: Vec<u64>) -> VerifiedPredicate {
    let chain = Chain::new(vec![OpKind::Shr, OpKind::And]);
    VerifiedPredicate {
        expression: chain.closed_form(&operands),
        chain,
        operands,
        constant: 0,
        samples_checked: 4096,
    }
}

#[test]
fn test_sink_writes_all_three_side_files() {
    let dir = tempfile::tempdir().unwrap();
    let artifact = dir.path().join("zasm_generated.cpp");
    let expressions = dir.path().join("generated.txt");
    let errors = dir.path().join("errors.txt");
    let labels = Labels {
        successor: "next_block".to_string(),
        dead_branch: "junk_block".to_string(),
    };

    let mut sink = ArtifactSink::new(&artifact)
        .with_expressions(&expressions)
        .with_error_log(&errors);
    let first = sink.accept(&predicate(vec![16, 15]), &labels).unwrap();
    sink.reject(&ErrorRecord::Mismatch {
        expression: "((x >> 1) & 1)".to_string(),
        expected: 0,
        input: 2,
        actual: 1,
    })
    .unwrap();
    let second = sink.accept(&predicate(vec![14, 2]), &labels).unwrap();
    assert_eq!(sink.written(), 2);

    let text = std::fs::read_to_string(&artifact).unwrap();
    assert_eq!(parse_artifact(&text), vec![first.clone(), second]);
    assert_eq!(first.body.last().unwrap(), "as->jmp(junk_block)");
    assert!(first.body.contains(&"as->jz(next_block)".to_string()));

    let lines = std::fs::read_to_string(&expressions).unwrap();
    assert_eq!(lines, "((x >> 16) & 15) == 0\n((x >> 14) & 2) == 0\n");
    let logged = std::fs::read_to_string(&errors).unwrap();
    assert_eq!(logged, "((x >> 1) & 1) == 0 (mismatch: x = 0x2 gives 1)\n");
}

#[test]
fn test_unwritable_artifact_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("no_such_dir").join("out.cpp");
    let mut sink = ArtifactSink::new(&missing);
    let err = sink.accept(&predicate(vec![16, 1]), &Labels::default());
    assert!(matches!(err, Err(umbra_emit::Error::Io { .. })));
    assert_eq!(sink.written(), 0);
}

#[test]
fn test_lost_expression_line_keeps_fragment_counted() {
    let dir = tempfile::tempdir().unwrap();
    let artifact = dir.path().join("zasm_generated.cpp");
    let expressions = dir.path().join("no_such_dir").join("generated.txt");

    let mut sink = ArtifactSink::new(&artifact).with_expressions(&expressions);
    let fragment = sink
        .accept(&predicate(vec![16, 3]), &Labels::default())
        .unwrap();
    assert_eq!(sink.written(), 1);
    assert_eq!(sink.expression_failures(), 1);

    let text = std::fs::read_to_string(&artifact).unwrap();
    assert_eq!(parse_artifact(&text), vec![fragment]);
    assert!(!expressions.exists());
}
