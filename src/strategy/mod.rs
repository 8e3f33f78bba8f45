// Test-case generation strategies. A strategy owns the random stream and a
// per-variable pool of candidate inputs; quantifiers consume the pool through
// a cursor and ask for a fresh (shrunken) pool after each counterexample.

pub mod coverage;
pub mod extraction;
pub mod factory;
pub mod pairwise;

pub use coverage::{CoverageGuidance, CoverageOracle, SharedCoverage};
pub use extraction::{ExtractedConstants, ExtractionConfig};
pub use factory::FluentStrategyFactory;

use std::collections::{BTreeMap, HashMap};

use tracing::{debug, trace};

use crate::arbitrary::{dedup_picks, ArbitraryRef, FluentPick};
use crate::engine::FluentResult;
use crate::generator::FluentRandomGenerator;

// Per-variable pool cap when building a covering array; covering-array size
// grows with the product of pool sizes, so pools stay small.
const PAIRWISE_POOL_CAP: usize = 20;

#[derive(Debug, Clone)]
pub struct FluentStrategyConfig {
    /// Candidate pool size per variable at the top of the search.
    pub sample_size: usize,
    /// Candidate pool size for each shrinking round.
    pub shrink_size: usize,
    /// Sample pools without repeated values.
    pub without_replacement: bool,
    /// Reuse the first-round pool across sibling quantifier runs.
    pub cached: bool,
    /// Front-load pools with corner cases.
    pub biased: bool,
    /// Covering-array strength; `None` disables combinatorial testing.
    pub pairwise: Option<usize>,
    pub extraction: Option<ExtractionConfig>,
}

impl Default for FluentStrategyConfig {
    fn default() -> FluentStrategyConfig {
        FluentStrategyConfig {
            sample_size: 1000,
            shrink_size: 500,
            without_replacement: false,
            cached: false,
            biased: false,
            pairwise: None,
            extraction: None,
        }
    }
}

#[derive(Debug)]
struct StrategyArbitrary {
    arbitrary: ArbitraryRef,
    collection: Vec<FluentPick>,
    pick_num: usize,
    cache: Option<Vec<FluentPick>>,
}

pub struct FluentStrategy {
    config: FluentStrategyConfig,
    arbitraries: HashMap<String, StrategyArbitrary>,
    order: Vec<String>,
    rng: FluentRandomGenerator,
    constants: Option<ExtractedConstants>,
    tuples: Option<Vec<Vec<FluentPick>>>,
    pairwise_active: bool,
    coverage: Option<CoverageGuidance>,
    current: BTreeMap<String, FluentPick>,
}

impl FluentStrategy {
    pub fn new(
        config: FluentStrategyConfig,
        coverage: Option<CoverageGuidance>,
        rng: FluentRandomGenerator,
    ) -> FluentStrategy {
        FluentStrategy {
            config,
            arbitraries: HashMap::new(),
            order: Vec::new(),
            rng,
            constants: None,
            tuples: None,
            pairwise_active: false,
            coverage,
            current: BTreeMap::new(),
        }
    }

    pub fn seed(&self) -> u64 {
        self.rng.seed
    }

    pub fn add_arbitrary(&mut self, name: &str, arbitrary: ArbitraryRef) {
        self.order.push(name.to_owned());
        self.arbitraries.insert(
            name.to_owned(),
            StrategyArbitrary { arbitrary, collection: Vec::new(), pick_num: 0, cache: None },
        );
    }

    /// (Re)build the candidate pool for `name`. Depth 0 is the top of the
    /// quantifier's search; deeper calls sample from the shrunken domain
    /// around the partial result's pick for this variable.
    pub fn config_arbitrary(&mut self, name: &str, partial: Option<&FluentResult>, depth: usize) {
        if self.constants.is_none() {
            if let Some(extraction) = &self.config.extraction {
                self.constants = Some(ExtractedConstants::mine(extraction));
            }
        }

        if self.config.pairwise.is_some() {
            let driver = self.order.first().map(String::as_str) == Some(name);
            if depth == 0 && (driver || self.pairwise_active) {
                self.config_pairwise(name);
                return;
            }
            if driver && depth > 0 {
                // Shrinking the driving variable abandons the covering array;
                // row lookups keyed off its cursor would no longer line up, so
                // inner variables fall back to independent pools.
                self.pairwise_active = false;
            }
        }

        let (arbitrary, size) = if depth == 0 {
            (self.arbitraries[name].arbitrary.clone(), self.config.sample_size)
        } else {
            let base = self.arbitraries[name].arbitrary.clone();
            let shrunk = partial
                .and_then(|r| r.pick(name))
                .map(|p| base.shrink(p))
                .unwrap_or(base);
            (shrunk, self.config.shrink_size)
        };

        let use_cache = depth == 0 && self.config.cached;
        let collection = if use_cache && self.arbitraries[name].cache.is_some() {
            self.arbitraries[name].cache.clone().unwrap()
        } else {
            let built = self.build_collection(name, &arbitrary, size);
            if use_cache {
                self.arbitraries.get_mut(name).unwrap().cache = Some(built.clone());
            }
            built
        };
        trace!(name, depth, pool = collection.len(), "configured candidate pool");

        let entry = self.arbitraries.get_mut(name).unwrap();
        entry.collection = collection;
        entry.pick_num = 0;
    }

    /// Pairwise mode replaces independent pools with the columns of a
    /// covering array. The first declared variable drives the cursor; each
    /// later variable sees exactly the pick its row prescribes.
    fn config_pairwise(&mut self, name: &str) {
        let strength = self.config.pairwise.unwrap_or(2);
        if self.tuples.is_none() {
            let size = self.config.sample_size.min(PAIRWISE_POOL_CAP);
            let mut pools = Vec::with_capacity(self.order.len());
            for n in self.order.clone() {
                let arbitrary = self.arbitraries[&n].arbitrary.clone();
                // Covering arrays need distinct values per column.
                pools.push(dedup_picks(self.build_collection(&n, &arbitrary, size)));
            }
            let tuples = pairwise::covering_tuples(&pools, strength);
            debug!(rows = tuples.len(), strength, "covering array for quantified variables");
            self.tuples = Some(tuples);
        }
        let pos = self.order.iter().position(|n| n == name).unwrap_or(0);
        if pos == 0 {
            self.pairwise_active = true;
        }
        let tuples = self.tuples.as_ref().unwrap();
        let collection = if pos == 0 {
            tuples.iter().map(|row| row[0].clone()).collect()
        } else {
            // Row currently being explored by the driving variable.
            let row = self.arbitraries[&self.order[0]].pick_num.saturating_sub(1);
            match tuples.get(row) {
                Some(t) => vec![t[pos].clone()],
                None => Vec::new(),
            }
        };
        let entry = self.arbitraries.get_mut(name).unwrap();
        entry.collection = collection;
        entry.pick_num = 0;
    }

    fn build_collection(
        &mut self,
        name: &str,
        arbitrary: &ArbitraryRef,
        size: usize,
    ) -> Vec<FluentPick> {
        let mut seeds: Vec<FluentPick> = Vec::new();
        if let Some(constants) = &self.constants {
            for candidate in constants.candidates() {
                let pick = FluentPick::with_original(candidate.clone(), candidate);
                if arbitrary.can_generate(&pick) {
                    seeds.push(pick);
                }
            }
        }
        if let Some(coverage) = &self.coverage {
            seeds.extend(coverage.favored(name).iter().cloned());
        }
        let mut seeds = dedup_picks(seeds);
        seeds.truncate(size);

        let without_replacement = self.config.without_replacement;
        let biased = self.config.biased;
        let generator = self.rng.generator_mut();
        if without_replacement {
            if biased {
                let corners = arbitrary.corner_cases();
                seeds.extend(corners);
                let seeds = dedup_picks(seeds);
                arbitrary.sample_unique(size, &seeds, generator)
            } else {
                arbitrary.sample_unique(size, &seeds, generator)
            }
        } else {
            let remainder = size.saturating_sub(seeds.len());
            let mut out = seeds;
            if biased {
                out.extend(arbitrary.sample_with_bias(remainder, generator));
            } else {
                out.extend(arbitrary.sample(remainder, generator));
            }
            out.truncate(size);
            out
        }
    }

    pub fn has_input(&self, name: &str) -> bool {
        let entry = &self.arbitraries[name];
        entry.pick_num < entry.collection.len()
    }

    /// Next candidate for `name`. Callers must check `has_input` first.
    pub fn get_input(&mut self, name: &str) -> FluentPick {
        let entry = self.arbitraries.get_mut(name).unwrap();
        let pick = entry.collection[entry.pick_num].clone();
        entry.pick_num += 1;
        self.current.insert(name.to_owned(), pick.clone());
        pick
    }

    /// Called once per evaluated test case, after its deciding assertion.
    pub fn handle_result(&mut self) {
        if let Some(coverage) = &mut self.coverage {
            coverage.observe(&self.current);
        }
    }
}

impl std::fmt::Debug for FluentStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FluentStrategy")
            .field("config", &self.config)
            .field("order", &self.order)
            .field("seed", &self.rng.seed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arbitrary::integer;

    fn strategy(config: FluentStrategyConfig) -> FluentStrategy {
        FluentStrategy::new(config, None, FluentRandomGenerator::with_seed(2024))
    }

    #[test]
    fn pool_is_consumed_through_the_cursor() {
        let mut s = strategy(FluentStrategyConfig {
            sample_size: 10,
            ..FluentStrategyConfig::default()
        });
        s.add_arbitrary("a", integer(0, 100));
        s.config_arbitrary("a", None, 0);
        let mut count = 0;
        while s.has_input("a") {
            let p = s.get_input("a");
            assert!((0..=100).contains(&p.value.as_int().unwrap()));
            count += 1;
        }
        assert_eq!(count, 10);
    }

    #[test]
    fn bias_puts_corners_first() {
        let mut s = strategy(FluentStrategyConfig {
            sample_size: 10,
            biased: true,
            ..FluentStrategyConfig::default()
        });
        s.add_arbitrary("a", integer(-10, 10));
        s.config_arbitrary("a", None, 0);
        let first = s.get_input("a");
        assert_eq!(first.value.as_int(), Some(0));
    }

    #[test]
    fn without_replacement_pools_are_distinct() {
        let mut s = strategy(FluentStrategyConfig {
            sample_size: 50,
            without_replacement: true,
            ..FluentStrategyConfig::default()
        });
        s.add_arbitrary("a", integer(0, 9));
        s.config_arbitrary("a", None, 0);
        let mut values = Vec::new();
        while s.has_input("a") {
            values.push(s.get_input("a").value.as_int().unwrap());
        }
        let mut sorted = values.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(values.len(), sorted.len());
        assert_eq!(values.len(), 10);
    }

    #[test]
    fn cached_pools_are_replayed() {
        let mut s = strategy(FluentStrategyConfig {
            sample_size: 20,
            cached: true,
            ..FluentStrategyConfig::default()
        });
        s.add_arbitrary("a", integer(0, 1_000_000));
        s.config_arbitrary("a", None, 0);
        let mut first = Vec::new();
        while s.has_input("a") {
            first.push(s.get_input("a").value.as_int().unwrap());
        }
        s.config_arbitrary("a", None, 0);
        let mut second = Vec::new();
        while s.has_input("a") {
            second.push(s.get_input("a").value.as_int().unwrap());
        }
        assert_eq!(first, second);
    }

    #[test]
    fn extracted_constants_lead_the_pool() {
        let mut s = strategy(FluentStrategyConfig {
            sample_size: 30,
            extraction: Some(ExtractionConfig::from_snippets(["x == 123456"])),
            ..FluentStrategyConfig::default()
        });
        s.add_arbitrary("a", integer(0, 10_000_000));
        s.config_arbitrary("a", None, 0);
        let first = s.get_input("a");
        assert_eq!(first.value.as_int(), Some(123456));
    }
}
