//! Property-based testing with explicit quantifiers.
//!
//! Properties are written as scenarios: a chain of `forall`/`exists`
//! quantifiers binding variables to composable value domains, optional
//! `given`/`when` steps for derived state, and `then` assertions. Checking a
//! scenario samples each quantified domain, and any input that decides the
//! property is shrunk to a simpler one before being reported.
//!
//! ```
//! use fluentcheck::{integer, scenario};
//!
//! let result = scenario()
//!     .exists("b", integer(-1000, 1000))
//!     .forall("a", integer(-1000, 1000))
//!     .then(|env| env.int("a") + env.int("b") == env.int("a"))
//!     .with_seed(42)
//!     .check();
//! assert!(result.satisfiable);
//! assert_eq!(result.value("b").unwrap().as_int(), Some(0));
//! ```
//!
//! Generation is controlled by a strategy, built through
//! [`FluentStrategyFactory`]: sample sizes, corner-case bias, sampling
//! without replacement, constant extraction from source text, pairwise
//! covering arrays and coverage-guided input favoring.

pub mod arbitrary;
pub mod distributions;
pub mod engine;
pub mod generator;
pub mod strategy;
pub mod value;

pub use arbitrary::{
    any_array, any_integer, any_nat, any_real, any_string, array, ascii, base64, boolean, char,
    constant, empty, hex, integer, nat, oneof, real, set, string, string_over, tuple, unicode,
    union, Arbitrary, ArbitraryExt, ArbitraryRef, FluentPick,
};
pub use engine::{expect, scenario, Bindings, FluentCheck, FluentResult, PropertyError};
pub use strategy::{
    CoverageOracle, ExtractionConfig, FluentStrategy, FluentStrategyFactory, SharedCoverage,
};
pub use value::Value;

/// Start building a custom strategy.
pub fn strategy() -> FluentStrategyFactory {
    FluentStrategyFactory::new()
}
