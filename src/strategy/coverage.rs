// Coverage-guided input favoring. An external oracle reports a scalar
// coverage figure after each test-case execution; inputs that pushed the
// figure to a new high are re-injected into future sample pools.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use tracing::debug;

use crate::arbitrary::FluentPick;

/// Reports cumulative coverage in [0, 1] for the system under test. Called
/// once per evaluated test case.
pub trait CoverageOracle {
    fn coverage(&mut self) -> f64;
}

pub struct CoverageGuidance {
    oracle: Rc<RefCell<dyn CoverageOracle>>,
    best: f64,
    favored: HashMap<String, Vec<FluentPick>>,
}

impl CoverageGuidance {
    pub fn new(oracle: Rc<RefCell<dyn CoverageOracle>>) -> CoverageGuidance {
        CoverageGuidance { oracle, best: 0.0, favored: HashMap::new() }
    }

    /// Record the oracle's reading for the test case described by `current`.
    pub fn observe(&mut self, current: &BTreeMap<String, FluentPick>) {
        let coverage = self.oracle.borrow_mut().coverage();
        if coverage > self.best {
            debug!(coverage, previous = self.best, "coverage high-water mark");
            self.best = coverage;
            for (name, pick) in current {
                self.favored.entry(name.clone()).or_default().push(pick.clone());
            }
        }
    }

    /// Inputs that previously raised coverage for this variable.
    pub fn favored(&self, name: &str) -> &[FluentPick] {
        self.favored.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn best(&self) -> f64 {
        self.best
    }
}

impl std::fmt::Debug for CoverageGuidance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoverageGuidance")
            .field("best", &self.best)
            .field("favored", &self.favored)
            .finish()
    }
}

/// An oracle over a shared cell, for wiring instrumented code to the
/// strategy without further plumbing.
#[derive(Debug, Clone)]
pub struct SharedCoverage {
    reading: Rc<std::cell::Cell<f64>>,
}

impl SharedCoverage {
    pub fn new() -> SharedCoverage {
        SharedCoverage { reading: Rc::new(std::cell::Cell::new(0.0)) }
    }

    /// Handle for the instrumented side to publish readings through.
    pub fn recorder(&self) -> Rc<std::cell::Cell<f64>> {
        self.reading.clone()
    }
}

impl Default for SharedCoverage {
    fn default() -> SharedCoverage {
        SharedCoverage::new()
    }
}

impl CoverageOracle for SharedCoverage {
    fn coverage(&mut self) -> f64 {
        self.reading.get()
    }
}
