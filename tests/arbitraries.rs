// Invariants of the arbitrary algebra, checked over randomized domain
// shapes.

use fluentcheck::arbitrary::FluentPick;
use fluentcheck::generator::FluentRandomGenerator;
use fluentcheck::{array, integer, ArbitraryExt, Value};
use proptest::prelude::*;

proptest! {
    #[test]
    fn integer_picks_stay_in_bounds(
        min in -10_000i64..10_000,
        span in 0i64..10_000,
        seed in any::<u64>(),
    ) {
        let max = min + span;
        let arb = integer(min, max);
        let mut rng = FluentRandomGenerator::with_seed(seed);
        for _ in 0..50 {
            let v = arb.pick(rng.generator_mut()).unwrap().value.as_int().unwrap();
            prop_assert!(v >= min && v <= max);
        }
    }

    #[test]
    fn corner_cases_bracket_the_domain(
        min in -10_000i64..10_000,
        span in 0i64..10_000,
    ) {
        let max = min + span;
        let corners: Vec<i64> = integer(min, max)
            .corner_cases()
            .iter()
            .filter_map(|p| p.value.as_int())
            .collect();
        prop_assert!(corners.contains(&min));
        prop_assert!(corners.contains(&max));
        prop_assert_eq!(corners.contains(&0), min <= 0 && max >= 0);
    }

    #[test]
    fn shrink_candidates_are_strictly_simpler(
        v in 2i64..1_000_000,
        seed in any::<u64>(),
    ) {
        let arb = integer(0, 1_000_000);
        let shrunk = arb.shrink(&FluentPick::new(Value::Int(v)));
        let mut rng = FluentRandomGenerator::with_seed(seed);
        for _ in 0..20 {
            let s = shrunk.pick(rng.generator_mut()).unwrap().value.as_int().unwrap();
            prop_assert!((0..v).contains(&s));
        }
    }

    #[test]
    fn negative_shrink_candidates_move_toward_zero(
        v in -1_000_000i64..-1,
        seed in any::<u64>(),
    ) {
        let arb = integer(-1_000_000, 0);
        let shrunk = arb.shrink(&FluentPick::new(Value::Int(v)));
        let mut rng = FluentRandomGenerator::with_seed(seed);
        for _ in 0..20 {
            let s = shrunk.pick(rng.generator_mut()).unwrap().value.as_int().unwrap();
            prop_assert!(s > v && s <= 0);
        }
    }

    #[test]
    fn picks_always_satisfy_membership(
        min in -1_000i64..1_000,
        span in 0i64..1_000,
        len in 0usize..6,
        seed in any::<u64>(),
    ) {
        let max = min + span;
        let arb = array(integer(min, max), len, len + 4);
        let mut rng = FluentRandomGenerator::with_seed(seed);
        for _ in 0..20 {
            let p = arb.pick(rng.generator_mut()).unwrap();
            prop_assert!(arb.can_generate(&p));
        }
    }

    #[test]
    fn filtered_picks_satisfy_the_predicate(
        modulus in 2i64..10,
        seed in any::<u64>(),
    ) {
        let arb = integer(0, 100_000).filter(move |v| v.as_int().unwrap() % modulus == 0);
        let mut rng = FluentRandomGenerator::with_seed(seed);
        for _ in 0..30 {
            match arb.pick(rng.generator_mut()) {
                Some(p) => prop_assert_eq!(p.value.as_int().unwrap() % modulus, 0),
                None => break,
            }
        }
    }

    #[test]
    fn mapped_originals_round_trip(
        min in -1_000i64..1_000,
        span in 0i64..1_000,
        seed in any::<u64>(),
    ) {
        let max = min + span;
        let arb = integer(min, max).map(|v| Value::Int(v.as_int().unwrap() * 3 + 1));
        let mut rng = FluentRandomGenerator::with_seed(seed);
        for _ in 0..20 {
            let p = arb.pick(rng.generator_mut()).unwrap();
            let original = p.original.as_ref().unwrap().as_int().unwrap();
            prop_assert_eq!(p.value.as_int().unwrap(), original * 3 + 1);
            prop_assert!(arb.can_generate(&p));
        }
    }

    #[test]
    fn unique_samples_have_no_duplicates(
        max in 0i64..200,
        n in 1usize..100,
        seed in any::<u64>(),
    ) {
        let arb = integer(0, max).unique();
        let mut rng = FluentRandomGenerator::with_seed(seed);
        let sample = arb.sample(n, rng.generator_mut());
        prop_assert!(sample.len() <= n);
        let mut values: Vec<i64> = sample.iter().filter_map(|p| p.value.as_int()).collect();
        let before = values.len();
        values.sort_unstable();
        values.dedup();
        prop_assert_eq!(values.len(), before);
    }
}
