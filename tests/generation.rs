// Reproducibility: a fixed seed replays the entire run, and the random
// source itself is swappable.

use fluentcheck::generator::Generator;
use fluentcheck::{integer, scenario};

fn run_with_seed(seed: u64) -> Option<i64> {
    // The shrinking path is driven by the random stream, so the final
    // counterexample is a fingerprint of the whole run.
    let result = scenario()
        .forall("a", integer(0, 1_000_000))
        .then(|env| env.int("a") < 500_000)
        .with_seed(seed)
        .check();
    assert!(!result.satisfiable);
    result.value("a").unwrap().as_int()
}

#[test]
fn same_seed_reproduces_the_counterexample() {
    assert_eq!(run_with_seed(1234), run_with_seed(1234));
    assert_eq!(run_with_seed(77), run_with_seed(77));
}

#[test]
fn results_carry_their_seed() {
    let result = scenario()
        .forall("a", integer(0, 100))
        .then(|env| env.int("a") <= 100)
        .with_seed(4321)
        .check();
    assert_eq!(result.seed, Some(4321));
}

fn lcg_generator(seed: u64) -> Box<Generator> {
    let mut state = seed;
    Box::new(move || {
        state = state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        (state >> 11) as f64 / (1u64 << 53) as f64
    })
}

#[test]
fn custom_generators_are_injectable_and_deterministic() {
    let run = || {
        scenario()
            .forall("a", integer(0, 1_000_000))
            .then(|env| env.int("a") < 500_000)
            .with_generator(lcg_generator, 99)
            .check()
    };
    let first = run();
    let second = run();
    assert!(!first.satisfiable);
    assert_eq!(
        first.value("a").unwrap().as_int(),
        second.value("a").unwrap().as_int()
    );
}
