// Wrapping combinators: map, filter, chain and unique. Wrappers hold their
// base domain behind `Rc` and carry picks' `original` so that shrinking can
// run against the base domain and re-apply the transformation.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::distributions::{BetaDistribution, Distribution};
use crate::generator::Generator;
use crate::value::Value;

use super::{
    empty, is_empty, ArbitraryExt, ArbitraryRef, Arbitrary, ArbitrarySize, FluentPick,
};

pub struct MappedArbitrary {
    base: ArbitraryRef,
    f: Rc<dyn Fn(&Value) -> Value>,
}

impl MappedArbitrary {
    pub fn wrap(base: ArbitraryRef, f: Rc<dyn Fn(&Value) -> Value>) -> ArbitraryRef {
        if is_empty(&base) {
            empty()
        } else {
            Rc::new(MappedArbitrary { base, f })
        }
    }

    /// The `original` of a mapped pick is the innermost untransformed value,
    /// so stacked maps still shrink against the leaf domain.
    fn map_pick(&self, pick: FluentPick) -> FluentPick {
        let original = pick.original_value().clone();
        FluentPick {
            value: (self.f)(&pick.value),
            original: Some(original),
            index: pick.index,
        }
    }

    fn unmapped(pick: &FluentPick) -> FluentPick {
        let original = pick.original_value().clone();
        FluentPick::with_original(original.clone(), original)
    }
}

impl Arbitrary for MappedArbitrary {
    fn size(&self) -> ArbitrarySize {
        self.base.size()
    }

    fn pick(&self, generator: &mut Generator) -> Option<FluentPick> {
        self.base.pick(generator).map(|p| self.map_pick(p))
    }

    fn corner_cases(&self) -> Vec<FluentPick> {
        self.base
            .corner_cases()
            .into_iter()
            .map(|p| self.map_pick(p))
            .collect()
    }

    fn shrink(&self, initial: &FluentPick) -> ArbitraryRef {
        let shrunk = self.base.shrink(&MappedArbitrary::unmapped(initial));
        MappedArbitrary::wrap(shrunk, self.f.clone())
    }

    fn can_generate(&self, pick: &FluentPick) -> bool {
        self.base.can_generate(&MappedArbitrary::unmapped(pick))
    }
}

impl fmt::Debug for MappedArbitrary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MappedArbitrary").field("base", &self.base).finish()
    }
}

pub struct FilteredArbitrary {
    base: ArbitraryRef,
    f: Rc<dyn Fn(&Value) -> bool>,
    estimation: RefCell<BetaDistribution>,
}

impl FilteredArbitrary {
    pub fn wrap(base: ArbitraryRef, f: Rc<dyn Fn(&Value) -> bool>) -> ArbitraryRef {
        if is_empty(&base) {
            empty()
        } else {
            Rc::new(FilteredArbitrary {
                base,
                f,
                // Prior: optimistic that the predicate mostly accepts.
                estimation: RefCell::new(BetaDistribution::new(2.0, 1.0)),
            })
        }
    }
}

impl Arbitrary for FilteredArbitrary {
    fn size(&self) -> ArbitrarySize {
        let base = self.base.size();
        let est = self.estimation.borrow();
        ArbitrarySize::estimated(
            (base.value * est.mode()).round(),
            base.value * est.inv(0.05),
            base.value * est.inv(0.95),
        )
    }

    fn pick(&self, generator: &mut Generator) -> Option<FluentPick> {
        loop {
            // Stop once the posterior says less than one acceptable value
            // plausibly remains in the base domain.
            let plausible =
                self.base.size().value * self.estimation.borrow().inv(0.95);
            if plausible < 1.0 {
                return None;
            }
            let pick = self.base.pick(generator)?;
            if (self.f)(&pick.value) {
                self.estimation.borrow_mut().update(1.0, 0.0);
                return Some(pick);
            }
            self.estimation.borrow_mut().update(0.0, 1.0);
        }
    }

    fn corner_cases(&self) -> Vec<FluentPick> {
        self.base
            .corner_cases()
            .into_iter()
            .filter(|p| (self.f)(&p.value))
            .collect()
    }

    fn shrink(&self, initial: &FluentPick) -> ArbitraryRef {
        if !(self.f)(&initial.value) {
            return empty();
        }
        FilteredArbitrary::wrap(self.base.shrink(initial), self.f.clone())
    }

    fn can_generate(&self, pick: &FluentPick) -> bool {
        self.base.can_generate(pick)
    }
}

impl fmt::Debug for FilteredArbitrary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilteredArbitrary")
            .field("base", &self.base)
            .field("estimation", &self.estimation.borrow())
            .finish()
    }
}

pub struct ChainedArbitrary {
    base: ArbitraryRef,
    f: Rc<dyn Fn(&Value) -> ArbitraryRef>,
}

impl ChainedArbitrary {
    pub fn wrap(base: ArbitraryRef, f: Rc<dyn Fn(&Value) -> ArbitraryRef>) -> ArbitraryRef {
        if is_empty(&base) {
            empty()
        } else {
            Rc::new(ChainedArbitrary { base, f })
        }
    }
}

impl Arbitrary for ChainedArbitrary {
    fn size(&self) -> ArbitrarySize {
        self.base.size()
    }

    fn pick(&self, generator: &mut Generator) -> Option<FluentPick> {
        let seed = self.base.pick(generator)?;
        (self.f)(&seed.value).pick(generator)
    }

    fn corner_cases(&self) -> Vec<FluentPick> {
        self.base
            .corner_cases()
            .iter()
            .flat_map(|p| (self.f)(&p.value).corner_cases())
            .collect()
    }

    // The derived domain depends on the intermediate value, which a finished
    // pick no longer records, so chained domains neither shrink nor admit a
    // membership test.
    fn can_generate(&self, _pick: &FluentPick) -> bool {
        false
    }
}

impl fmt::Debug for ChainedArbitrary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainedArbitrary").field("base", &self.base).finish()
    }
}

/// Delegates everything to the base but samples without replacement.
#[derive(Debug)]
pub struct UniqueArbitrary {
    base: ArbitraryRef,
}

impl UniqueArbitrary {
    pub fn wrap(base: ArbitraryRef) -> ArbitraryRef {
        if is_empty(&base) {
            empty()
        } else {
            Rc::new(UniqueArbitrary { base })
        }
    }
}

impl Arbitrary for UniqueArbitrary {
    fn size(&self) -> ArbitrarySize {
        self.base.size()
    }

    fn pick(&self, generator: &mut Generator) -> Option<FluentPick> {
        self.base.pick(generator)
    }

    fn corner_cases(&self) -> Vec<FluentPick> {
        self.base.corner_cases()
    }

    fn shrink(&self, initial: &FluentPick) -> ArbitraryRef {
        self.base.shrink(initial).unique()
    }

    fn can_generate(&self, pick: &FluentPick) -> bool {
        self.base.can_generate(pick)
    }

    fn sample(&self, n: usize, generator: &mut Generator) -> Vec<FluentPick> {
        self.base.sample_unique(n, &[], generator)
    }

    fn sample_with_bias(&self, n: usize, generator: &mut Generator) -> Vec<FluentPick> {
        self.base.sample_unique_with_bias(n, generator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arbitrary::{integer, SizeKind};
    use crate::generator::FluentRandomGenerator;

    #[test]
    fn mapped_picks_keep_their_original() {
        let mut rng = FluentRandomGenerator::with_seed(10);
        let arb = integer(0, 100).map(|v| Value::Int(v.as_int().unwrap() * 2));
        for _ in 0..100 {
            let p = arb.pick(rng.generator_mut()).unwrap();
            let mapped = p.value.as_int().unwrap();
            let original = p.original.as_ref().unwrap().as_int().unwrap();
            assert_eq!(mapped, original * 2);
            assert!(arb.can_generate(&p));
        }
    }

    #[test]
    fn mapped_shrink_descends_through_the_base() {
        let mut rng = FluentRandomGenerator::with_seed(11);
        let arb = integer(0, 100).map(|v| Value::Int(v.as_int().unwrap() * 2));
        let failing = FluentPick::with_original(Value::Int(160), Value::Int(80));
        let shrunk = arb.shrink(&failing);
        for _ in 0..100 {
            let p = shrunk.pick(rng.generator_mut()).unwrap();
            let v = p.value.as_int().unwrap();
            assert!(v % 2 == 0 && v < 160);
        }
    }

    #[test]
    fn filtered_picks_satisfy_the_predicate() {
        let mut rng = FluentRandomGenerator::with_seed(12);
        let arb = integer(0, 1000).filter(|v| v.as_int().unwrap() % 3 == 0);
        for _ in 0..200 {
            let p = arb.pick(rng.generator_mut()).unwrap();
            assert_eq!(p.value.as_int().unwrap() % 3, 0);
        }
        let size = arb.size();
        assert_eq!(size.kind, SizeKind::Estimated);
        // Posterior has seen a ~1/3 acceptance rate.
        assert!(size.value > 100.0 && size.value < 700.0);
    }

    #[test]
    fn filter_size_interval_tightens_with_observations() {
        let mut rng = FluentRandomGenerator::with_seed(16);
        let arb = integer(0, 999).filter(|v| v.as_int().unwrap() % 4 == 0);
        let before = arb.size().credible_interval;
        for _ in 0..200 {
            arb.pick(rng.generator_mut()).unwrap();
        }
        let after = arb.size().credible_interval;
        assert!(after.1 - after.0 < before.1 - before.0);
        // Posterior settles near the true 1/4 acceptance rate.
        let informed = arb.size();
        assert!(informed.value > 100.0 && informed.value < 450.0);
    }

    #[test]
    fn impossible_filter_exhausts() {
        let mut rng = FluentRandomGenerator::with_seed(13);
        let arb = integer(0, 9).filter(|_| false);
        assert!(arb.pick(rng.generator_mut()).is_none());
        let size = arb.size();
        assert!(size.credible_interval.0 < 1.0);
    }

    #[test]
    fn chained_picks_come_from_the_derived_domain() {
        let mut rng = FluentRandomGenerator::with_seed(14);
        let arb = integer(1, 5).chain(|v| integer(0, v.as_int().unwrap()));
        for _ in 0..200 {
            let v = arb.pick(rng.generator_mut()).unwrap().value.as_int().unwrap();
            assert!((0..=5).contains(&v));
        }
    }

    #[test]
    fn unique_sampling_has_no_repeats() {
        let mut rng = FluentRandomGenerator::with_seed(15);
        let arb = integer(0, 9).unique();
        let sample = arb.sample(100, rng.generator_mut());
        assert_eq!(sample.len(), 10);
        let mut values: Vec<i64> = sample.iter().filter_map(|p| p.value.as_int()).collect();
        values.sort_unstable();
        assert_eq!(values, (0..=9).collect::<Vec<i64>>());
    }
}
