use rand::SeedableRng;
use rand::rngs::StdRng;
use umbra_core::{NumericValidator, Seed, Validation, ValidationConfig};

fn rng() -> StdRng {
    Seed::from_hex("0x1234567890abcdef1234567890abcdef1234567890abcdef1234567890abcdef")
        .unwrap()
        .create_deterministic_rng()
}

#[test]
fn test_narrow_widths_are_checked_exhaustively() {
    let validator = NumericValidator::new(8, ValidationConfig::default());
    let result = validator
        .validate("(((x >> 4) >> 4) & 3)", 0, &mut rng())
        .unwrap();
    // all-ones, zero, 256 consecutive, 1024 random
    assert_eq!(result, Validation::Confirmed { checked: 2 + 256 + 1024 });
}

#[test]
fn test_mismatch_reports_first_disagreeing_input() {
    let validator = NumericValidator::new(
        32,
        ValidationConfig {
            samples: 4096,
            random_samples: 0,
        },
    );
    // zero below 0x100, but all-ones is checked first
    let result = validator.validate("((x >> 8) & 1)", 0, &mut rng()).unwrap();
    assert_eq!(
        result,
        Validation::Mismatch {
            input: 0xffff_ffff,
            actual: 1,
            expected: 0
        }
    );
}

#[test]
fn test_random_samples_catch_what_the_consecutive_run_misses() {
    // zero on both boundaries and on 0..15, one on every input with bit 4 of x + 1 set
    let expression = "(((x + 1) >> 4) & 1)";
    let sparse = NumericValidator::new(
        32,
        ValidationConfig {
            samples: 15,
            random_samples: 0,
        },
    );
    assert_eq!(
        sparse.validate(expression, 0, &mut rng()).unwrap(),
        Validation::Confirmed { checked: 17 }
    );

    let dense = NumericValidator::new(
        32,
        ValidationConfig {
            samples: 15,
            random_samples: 4096,
        },
    );
    let a = dense.validate(expression, 0, &mut rng()).unwrap();
    let b = dense.validate(expression, 0, &mut rng()).unwrap();
    assert!(!a.is_confirmed());
    assert_eq!(a, b, "same seed must draw the same inputs");
    assert_ne!(
        dense
            .validate(expression, 0, &mut StdRng::seed_from_u64(7))
            .unwrap(),
        Validation::Confirmed { checked: 15 + 2 + 4096 }
    );
}

#[test]
fn test_unparseable_expression_is_an_error() {
    let validator = NumericValidator::new(32, ValidationConfig::default());
    assert!(validator.validate("((x >> 4) &", 0, &mut rng()).is_err());
}
