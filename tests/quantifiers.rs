// End-to-end quantifier semantics: universal and existential search,
// mixed nesting, exhaustion, and shrinking of the deciding input.

use fluentcheck::{expect, integer, scenario};

#[test]
fn unsatisfiable_existential_under_a_universal() {
    // No b in [1, 2] ever makes a + b zero for a in [5, 10].
    let result = scenario()
        .forall("a", integer(5, 10))
        .exists("b", integer(1, 2))
        .then(|env| env.int("a") + env.int("b") == 0)
        .with_seed(1)
        .check();
    assert!(!result.satisfiable);
    assert!(expect(&result).is_err());
}

#[test]
fn two_existentials_find_a_joint_witness() {
    let result = scenario()
        .exists("a", integer(-10, 10))
        .exists("b", integer(-10, 10))
        .then(|env| env.int("a") + env.int("b") == 10)
        .with_seed(2)
        .check();
    assert!(result.satisfiable);
    let a = result.value("a").unwrap().as_int().unwrap();
    let b = result.value("b").unwrap().as_int().unwrap();
    assert_eq!(a + b, 10);
}

#[test]
fn existential_before_a_universal_finds_the_identity() {
    let result = scenario()
        .exists("b", integer(-100, 100))
        .forall("a", integer(-100, 100))
        .then(|env| env.int("a") + env.int("b") == env.int("a"))
        .with_seed(3)
        .check();
    assert!(result.satisfiable);
    assert_eq!(result.value("b").unwrap().as_int(), Some(0));
}

#[test]
fn witnesses_shrink_to_the_smallest_one() {
    let result = scenario()
        .exists("a", integer(1, 1_000_000))
        .then(|env| env.int("a") % 7 == 0)
        .with_seed(4)
        .check();
    assert!(result.satisfiable);
    assert_eq!(result.value("a").unwrap().as_int(), Some(7));
}

#[test]
fn trivial_witnesses_shrink_to_zero() {
    let result = scenario()
        .exists("a", integer(0, 1_000_000))
        .then(|env| env.int("a") + 1000 > env.int("a"))
        .with_seed(5)
        .check();
    assert!(result.satisfiable);
    assert_eq!(result.value("a").unwrap().as_int(), Some(0));
}

#[test]
fn counterexamples_shrink_toward_the_boundary() {
    let result = scenario()
        .forall("a", integer(0, 1_000_000))
        .then(|env| env.int("a") < 1000)
        .with_seed(6)
        .check();
    assert!(!result.satisfiable);
    let a = result.value("a").unwrap().as_int().unwrap();
    // The fixed point of shrinking sits at or just above the boundary.
    assert!((1000..2000).contains(&a));
}

#[test]
fn satisfied_universals_report_the_last_surviving_input() {
    let result = scenario()
        .forall("a", integer(0, 10))
        .then(|env| env.int("a") >= 0)
        .with_seed(7)
        .check();
    assert!(result.satisfiable);
    assert!(result.value("a").is_some());
    assert!(result.seed.is_some());
    assert!(result.elapsed.is_some());
}

#[test]
fn empty_domain_decides_quantifiers_by_exhaustion() {
    // A universal over nothing holds vacuously.
    let vacuous = scenario()
        .forall("a", integer(10, 5))
        .then(|_| false)
        .with_seed(8)
        .check();
    assert!(vacuous.satisfiable);

    // An existential over nothing can never be witnessed.
    let hopeless = scenario()
        .exists("a", integer(10, 5))
        .then(|_| true)
        .with_seed(9)
        .check();
    assert!(!hopeless.satisfiable);
}
