// The Arbitrary algebra: composable value domains supporting sampling,
// corner-case enumeration, shrinking and membership testing. Domains are
// immutable combinator trees held behind `Rc`; wrappers hold their base as
// data, never as a superclass. The only mutable execution state in the whole
// algebra is the acceptance-rate estimator inside filtered domains.

mod collection;
mod composite;
mod constant;
mod numeric;
mod set;
mod string;
mod wrapped;

use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

pub use collection::{ArrayArbitrary, TupleArbitrary};
pub use composite::CompositeArbitrary;
pub use constant::{BooleanArbitrary, ConstantArbitrary, EmptyArbitrary};
pub use numeric::{IntegerArbitrary, RealArbitrary, MAX_SAFE_INTEGER, MIN_SAFE_INTEGER};
pub use set::SetArbitrary;
pub use string::StringArbitrary;
pub use wrapped::{ChainedArbitrary, FilteredArbitrary, MappedArbitrary, UniqueArbitrary};

use crate::generator::Generator;
use crate::value::Value;

/// A generated value together with the pre-transformation value (`original`)
/// that produced it and, where the domain is enumerable, its ordinal index.
/// If `original` is present, applying the owning arbitrary's transformation
/// to it must reproduce `value`.
#[derive(Debug, Clone, PartialEq)]
pub struct FluentPick {
    pub value: Value,
    pub original: Option<Value>,
    pub index: Option<u64>,
}

impl FluentPick {
    pub fn new(value: Value) -> FluentPick {
        FluentPick { value, original: None, index: None }
    }

    pub fn with_original(value: Value, original: Value) -> FluentPick {
        FluentPick { value, original: Some(original), index: None }
    }

    /// The pre-transformation value, falling back to `value` for leaves.
    pub fn original_value(&self) -> &Value {
        self.original.as_ref().unwrap_or(&self.value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeKind {
    Exact,
    Estimated,
}

/// Domain cardinality. Exact for enumerable domains; estimated (with a 90%
/// credible interval) for filtered ones.
#[derive(Debug, Clone, Copy)]
pub struct ArbitrarySize {
    pub value: f64,
    pub kind: SizeKind,
    pub credible_interval: (f64, f64),
}

impl ArbitrarySize {
    pub fn exact(value: f64) -> ArbitrarySize {
        ArbitrarySize { value, kind: SizeKind::Exact, credible_interval: (value, value) }
    }

    pub fn estimated(value: f64, low: f64, high: f64) -> ArbitrarySize {
        ArbitrarySize { value, kind: SizeKind::Estimated, credible_interval: (low, high) }
    }

    /// Apply a monotone transformation, preserving exactness.
    pub fn map(self, f: impl Fn(f64) -> f64) -> ArbitrarySize {
        ArbitrarySize {
            value: f(self.value),
            kind: self.kind,
            credible_interval: (f(self.credible_interval.0), f(self.credible_interval.1)),
        }
    }

    /// Sum of two sizes; the result is exact only if both operands are.
    pub fn add(self, other: ArbitrarySize) -> ArbitrarySize {
        let kind = if self.kind == SizeKind::Exact && other.kind == SizeKind::Exact {
            SizeKind::Exact
        } else {
            SizeKind::Estimated
        };
        ArbitrarySize {
            value: self.value + other.value,
            kind,
            credible_interval: (
                self.credible_interval.0 + other.credible_interval.0,
                self.credible_interval.1 + other.credible_interval.1,
            ),
        }
    }

    /// Cardinality clamped into `usize`, for bounding sample pools.
    pub fn count(&self) -> usize {
        if self.value <= 0.0 {
            0
        } else if self.value >= usize::MAX as f64 {
            usize::MAX
        } else {
            self.value.floor() as usize
        }
    }
}

/// Shared handle to a domain descriptor.
pub type ArbitraryRef = Rc<dyn Arbitrary>;

/// A composable descriptor of a value domain. `pick` returning `None` is not
/// an error: it signals an exhausted or empty domain and quantifiers treat it
/// as pool exhaustion.
pub trait Arbitrary: fmt::Debug {
    fn size(&self) -> ArbitrarySize;

    fn pick(&self, generator: &mut Generator) -> Option<FluentPick>;

    /// Boundary values of the domain. Finite even for continuous domains.
    fn corner_cases(&self) -> Vec<FluentPick> {
        Vec::new()
    }

    /// A new, strictly smaller domain of candidate simplifications of a
    /// failing value, or the empty domain when none exists.
    fn shrink(&self, _initial: &FluentPick) -> ArbitraryRef {
        empty()
    }

    /// Membership test used to decide which branch of a composite may
    /// legally shrink a given value.
    fn can_generate(&self, pick: &FluentPick) -> bool;

    /// Draw up to `n` picks, stopping early when the domain is exhausted.
    fn sample(&self, n: usize, generator: &mut Generator) -> Vec<FluentPick> {
        let mut out = Vec::with_capacity(n);
        for _ in 0..n {
            match self.pick(generator) {
                Some(p) => out.push(p),
                None => break,
            }
        }
        out
    }

    /// Corner cases first, then a random remainder up to `n` picks.
    fn sample_with_bias(&self, n: usize, generator: &mut Generator) -> Vec<FluentPick> {
        let mut out = self.corner_cases();
        out.truncate(n);
        let remainder = n.saturating_sub(out.len());
        out.extend(self.sample(remainder, generator));
        out
    }

    /// Draw up to `n` distinct picks (by canonical form), seeded with
    /// `seeds`. The pool is capped at the (possibly estimated) domain size so
    /// a small domain terminates instead of looping forever.
    fn sample_unique(
        &self,
        n: usize,
        seeds: &[FluentPick],
        generator: &mut Generator,
    ) -> Vec<FluentPick> {
        let mut out: Vec<FluentPick> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        for s in seeds {
            if seen.insert(s.value.canonical()) {
                out.push(s.clone());
            }
        }
        let initial = self.size();
        let mut bag = n.min(initial.count());
        while out.len() < bag {
            match self.pick(generator) {
                None => break,
                Some(p) => {
                    if seen.insert(p.value.canonical()) {
                        out.push(p);
                    }
                }
            }
            if initial.kind != SizeKind::Exact {
                bag = n.min(self.size().count());
            }
        }
        out.truncate(n);
        out
    }

    /// Unique sampling seeded with the corner cases, unless the requested
    /// size is too small to fit them.
    fn sample_unique_with_bias(&self, n: usize, generator: &mut Generator) -> Vec<FluentPick> {
        let corners = self.corner_cases();
        if n <= corners.len() {
            self.sample_unique(n, &[], generator)
        } else {
            self.sample_unique(n, &corners, generator)
        }
    }
}

/// True for the empty domain (and nothing else with exact size zero).
pub fn is_empty(arbitrary: &ArbitraryRef) -> bool {
    let size = arbitrary.size();
    size.kind == SizeKind::Exact && size.value == 0.0
}

pub(crate) fn dedup_picks(picks: Vec<FluentPick>) -> Vec<FluentPick> {
    let mut seen = HashSet::new();
    picks
        .into_iter()
        .filter(|p| seen.insert(p.value.canonical()))
        .collect()
}

/// Wrapping combinators, available on any shared arbitrary handle.
pub trait ArbitraryExt {
    fn map(&self, f: impl Fn(&Value) -> Value + 'static) -> ArbitraryRef;
    fn filter(&self, f: impl Fn(&Value) -> bool + 'static) -> ArbitraryRef;
    fn chain(&self, f: impl Fn(&Value) -> ArbitraryRef + 'static) -> ArbitraryRef;
    fn unique(&self) -> ArbitraryRef;
}

impl ArbitraryExt for ArbitraryRef {
    fn map(&self, f: impl Fn(&Value) -> Value + 'static) -> ArbitraryRef {
        MappedArbitrary::wrap(self.clone(), Rc::new(f))
    }

    fn filter(&self, f: impl Fn(&Value) -> bool + 'static) -> ArbitraryRef {
        FilteredArbitrary::wrap(self.clone(), Rc::new(f))
    }

    fn chain(&self, f: impl Fn(&Value) -> ArbitraryRef + 'static) -> ArbitraryRef {
        ChainedArbitrary::wrap(self.clone(), Rc::new(f))
    }

    fn unique(&self) -> ArbitraryRef {
        UniqueArbitrary::wrap(self.clone())
    }
}

// ---------------------------------------------------------------------------
// Constructors.

/// Integer range [min, max]. An inverted range degrades to the empty domain.
pub fn integer(min: i64, max: i64) -> ArbitraryRef {
    IntegerArbitrary::new(min, max)
}

/// The full safe integer range.
pub fn any_integer() -> ArbitraryRef {
    integer(MIN_SAFE_INTEGER, MAX_SAFE_INTEGER)
}

pub fn nat(max: i64) -> ArbitraryRef {
    integer(0, max)
}

pub fn any_nat() -> ArbitraryRef {
    integer(0, MAX_SAFE_INTEGER)
}

pub fn real(min: f64, max: f64) -> ArbitraryRef {
    RealArbitrary::new(min, max)
}

pub fn any_real() -> ArbitraryRef {
    real(MIN_SAFE_INTEGER as f64, MAX_SAFE_INTEGER as f64)
}

pub fn boolean() -> ArbitraryRef {
    Rc::new(BooleanArbitrary)
}

/// Strings of length [min, max] over the lowercase ASCII alphabet.
pub fn string(min: usize, max: usize) -> ArbitraryRef {
    StringArbitrary::new(min, max, string::LOWERCASE)
}

/// Default string domain (length 2..10, lowercase).
pub fn any_string() -> ArbitraryRef {
    string(2, 10)
}

pub fn string_over(min: usize, max: usize, alphabet: &str) -> ArbitraryRef {
    StringArbitrary::new(min, max, alphabet)
}

/// One printable ASCII character.
pub fn char() -> ArbitraryRef {
    StringArbitrary::new(1, 1, string::PRINTABLE)
}

pub fn ascii() -> ArbitraryRef {
    StringArbitrary::new(1, 1, string::PRINTABLE)
}

pub fn hex() -> ArbitraryRef {
    StringArbitrary::new(1, 1, "0123456789abcdef")
}

pub fn base64() -> ArbitraryRef {
    StringArbitrary::new(1, 1, "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/")
}

pub fn unicode() -> ArbitraryRef {
    StringArbitrary::new(1, 1, string::UNICODE_SAMPLE)
}

/// Arrays of `element` values with length in [min, max].
pub fn array(element: ArbitraryRef, min: usize, max: usize) -> ArbitraryRef {
    ArrayArbitrary::new(element, min, max)
}

/// Default array bounds (0..10).
pub fn any_array(element: ArbitraryRef) -> ArbitraryRef {
    array(element, 0, 10)
}

/// Subsets of `elements` with cardinality in [min, max].
pub fn set(elements: Vec<Value>, min: usize, max: usize) -> ArbitraryRef {
    SetArbitrary::new(elements, min, max)
}

/// Weighted union of member domains.
pub fn union(members: Vec<ArbitraryRef>) -> ArbitraryRef {
    CompositeArbitrary::new(members)
}

/// One of a fixed set of values.
pub fn oneof(values: Vec<Value>) -> ArbitraryRef {
    union(values.into_iter().map(constant).collect())
}

/// Fixed-arity tuples drawn positionally from member domains.
pub fn tuple(members: Vec<ArbitraryRef>) -> ArbitraryRef {
    TupleArbitrary::new(members)
}

pub fn constant(value: impl Into<Value>) -> ArbitraryRef {
    Rc::new(ConstantArbitrary::new(value.into()))
}

/// The empty domain: zero size, no picks, no corner cases.
pub fn empty() -> ArbitraryRef {
    Rc::new(EmptyArbitrary)
}
