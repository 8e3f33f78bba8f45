// Builder for strategies. Capabilities are switched on one at a time and the
// assembled configuration is frozen into a `FluentStrategy` when a run
// starts.

use std::cell::RefCell;
use std::rc::Rc;

use crate::generator::FluentRandomGenerator;

use super::coverage::{CoverageGuidance, CoverageOracle};
use super::extraction::ExtractionConfig;
use super::{FluentStrategy, FluentStrategyConfig};

#[derive(Clone)]
pub struct FluentStrategyFactory {
    config: FluentStrategyConfig,
    oracle: Option<Rc<RefCell<dyn CoverageOracle>>>,
}

impl FluentStrategyFactory {
    pub fn new() -> FluentStrategyFactory {
        FluentStrategyFactory { config: FluentStrategyConfig::default(), oracle: None }
    }

    pub fn with_random_sampling(mut self, sample_size: usize) -> Self {
        self.config.sample_size = sample_size;
        self
    }

    pub fn with_shrink_size(mut self, shrink_size: usize) -> Self {
        self.config.shrink_size = shrink_size;
        self
    }

    pub fn without_replacement(mut self) -> Self {
        self.config.without_replacement = true;
        self
    }

    pub fn using_cache(mut self) -> Self {
        self.config.cached = true;
        self
    }

    pub fn with_bias(mut self) -> Self {
        self.config.biased = true;
        self
    }

    pub fn with_constant_extraction(mut self, extraction: ExtractionConfig) -> Self {
        self.config.extraction = Some(extraction);
        self
    }

    /// Pairwise (strength 2) combinatorial testing over the quantified
    /// variables.
    pub fn with_pairwise_testing(self) -> Self {
        self.with_nwise_testing(2)
    }

    pub fn with_nwise_testing(mut self, strength: usize) -> Self {
        self.config.pairwise = Some(strength);
        self
    }

    pub fn with_coverage_guidance(mut self, oracle: Rc<RefCell<dyn CoverageOracle>>) -> Self {
        self.oracle = Some(oracle);
        self
    }

    pub fn build(&self, rng: FluentRandomGenerator) -> FluentStrategy {
        let coverage = self.oracle.clone().map(CoverageGuidance::new);
        FluentStrategy::new(self.config.clone(), coverage, rng)
    }
}

/// The stock strategy: biased random sampling with shrinking.
impl Default for FluentStrategyFactory {
    fn default() -> FluentStrategyFactory {
        FluentStrategyFactory::new()
            .with_random_sampling(1000)
            .with_bias()
            .with_shrink_size(500)
    }
}

impl std::fmt::Debug for FluentStrategyFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FluentStrategyFactory")
            .field("config", &self.config)
            .field("coverage", &self.oracle.is_some())
            .finish()
    }
}
