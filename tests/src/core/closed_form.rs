use rand::{Rng, SeedableRng, rngs::StdRng};
use umbra_core::expr::{ClosedForm, parse_expr};
use umbra_core::{Chain, ChainComposer, OpKind};

#[test]
fn test_rendered_chains_evaluate_like_direct_evaluation() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    for width in [8u32, 32] {
        for chain in ChainComposer::new(&OpKind::ALL, 2) {
            let operands: Vec<u64> = (0..chain.len())
                .map(|_| rng.random_range(1..=u64::from(width / 2)))
                .collect();
            let expr = parse_expr(&chain.closed_form(&operands)).unwrap();
            for _ in 0..64 {
                let x = rng.random::<u64>();
                assert_eq!(
                    expr.eval(x, width),
                    chain.evaluate(x, &operands, width),
                    "{} over {:?} at W={}",
                    chain,
                    operands,
                    width
                );
            }
        }
    }
}

#[test]
fn test_annotation_parses_with_comment_marker() {
    let closed = ClosedForm::parse("// rotr(((x >> 31) >> 1), 2) == 0").unwrap();
    assert_eq!(closed.expr.to_string(), "rotr(((x >> 31) >> 1), 2)");
    for x in [0u64, 0x20, 0xffff_ffff] {
        let (lhs, rhs) = closed.eval(x, 32);
        assert_eq!(lhs, rhs);
    }
}

#[test]
fn test_precedence_follows_c() {
    let expr = parse_expr("x + 1 << 2 & 0xff").unwrap();
    // (((x + 1) << 2) & 255)
    assert_eq!(expr.eval(3, 32), 16);
    let expr = parse_expr("x | 1 ^ 3").unwrap();
    assert_eq!(expr.eval(0, 32), 2);
}

#[test]
fn test_malformed_expressions_are_errors() {
    for bad in ["", "x +", "(x & 3", "y & 3", "rotl(x)", "x == 3 == 4"] {
        assert!(parse_expr(bad).is_err(), "{bad:?} should not parse");
    }
    assert!(ClosedForm::parse("x & 3").is_err());
}
