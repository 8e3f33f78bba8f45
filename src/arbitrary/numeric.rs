// Integer and real range domains. Shrinking bisects the interval between
// zero and the failing value and returns both halves as a union, so the
// search can move toward zero without losing the upper half. This is a local
// descent: the reported minimum is the fixed point of the explored path, not
// a guaranteed global minimum.

use std::rc::Rc;

use crate::generator::Generator;
use crate::value::Value;

use super::{empty, union, ArbitraryRef, Arbitrary, ArbitrarySize, FluentPick};

/// Largest integer magnitude that survives the f64 arithmetic used by
/// `pick`; the default bound for unbounded integer domains.
pub const MAX_SAFE_INTEGER: i64 = 9_007_199_254_740_991;
pub const MIN_SAFE_INTEGER: i64 = -9_007_199_254_740_991;

#[derive(Debug, Clone)]
pub struct IntegerArbitrary {
    min: i64,
    max: i64,
}

impl IntegerArbitrary {
    pub fn new(min: i64, max: i64) -> ArbitraryRef {
        if min > max {
            empty()
        } else {
            Rc::new(IntegerArbitrary { min, max })
        }
    }
}

impl Arbitrary for IntegerArbitrary {
    fn size(&self) -> ArbitrarySize {
        ArbitrarySize::exact((self.max as i128 - self.min as i128 + 1) as f64)
    }

    fn pick(&self, generator: &mut Generator) -> Option<FluentPick> {
        let span = (self.max as i128 - self.min as i128 + 1) as f64;
        let offset = (generator() * span).floor() as i128;
        let value = (self.min as i128 + offset).min(self.max as i128) as i64;
        let index = (value as i128 - self.min as i128) as u64;
        Some(FluentPick {
            value: Value::Int(value),
            original: Some(Value::Int(value)),
            index: Some(index),
        })
    }

    fn corner_cases(&self) -> Vec<FluentPick> {
        let mut values = if self.min < 0 && self.max > 0 {
            vec![0, self.min, self.max]
        } else {
            vec![self.min, self.max]
        };
        values.dedup();
        values
            .into_iter()
            .map(|v| FluentPick::with_original(Value::Int(v), Value::Int(v)))
            .collect()
    }

    fn shrink(&self, initial: &FluentPick) -> ArbitraryRef {
        let v = match initial.value.as_int() {
            Some(v) => v,
            None => return empty(),
        };
        if v > 0 {
            let lower = self.min.max(0);
            let upper = lower.max(v - 1);
            if lower == upper {
                return empty();
            }
            let midpoint = (lower + upper) / 2;
            union(vec![
                IntegerArbitrary::new(lower, midpoint),
                IntegerArbitrary::new(midpoint, upper),
            ])
        } else if v < 0 {
            let upper = self.max.min(0);
            let lower = v + 1;
            if lower >= upper {
                return empty();
            }
            let midpoint = (lower + upper) / 2;
            union(vec![
                IntegerArbitrary::new(midpoint, upper),
                IntegerArbitrary::new(lower, midpoint),
            ])
        } else {
            empty()
        }
    }

    fn can_generate(&self, pick: &FluentPick) -> bool {
        match pick.value.as_int() {
            Some(v) => v >= self.min && v <= self.max,
            None => false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RealArbitrary {
    min: f64,
    max: f64,
}

impl RealArbitrary {
    pub fn new(min: f64, max: f64) -> ArbitraryRef {
        if !(min <= max) {
            empty()
        } else {
            Rc::new(RealArbitrary { min, max })
        }
    }
}

impl Arbitrary for RealArbitrary {
    fn size(&self) -> ArbitrarySize {
        // Continuous domains report the count of unit steps they span; what
        // matters downstream is relative weight, not exact enumeration.
        ArbitrarySize::exact(self.max - self.min + 1.0)
    }

    fn pick(&self, generator: &mut Generator) -> Option<FluentPick> {
        let value = generator() * (self.max - self.min) + self.min;
        Some(FluentPick {
            value: Value::Real(value),
            original: Some(Value::Real(value)),
            index: None,
        })
    }

    fn corner_cases(&self) -> Vec<FluentPick> {
        let mut values = if self.min < 0.0 && self.max > 0.0 {
            vec![0.0, self.min, self.max]
        } else {
            vec![self.min, self.max]
        };
        values.dedup();
        values
            .into_iter()
            .map(|v| FluentPick::with_original(Value::Real(v), Value::Real(v)))
            .collect()
    }

    fn shrink(&self, initial: &FluentPick) -> ArbitraryRef {
        let v = match initial.value.as_real() {
            Some(v) => v,
            None => return empty(),
        };
        if v > 0.0 {
            let lower = self.min.max(0.0);
            let upper = v - 1.0;
            if upper <= lower {
                return empty();
            }
            let midpoint = (lower + upper) / 2.0;
            union(vec![
                RealArbitrary::new(lower, midpoint),
                RealArbitrary::new(midpoint, upper),
            ])
        } else if v < 0.0 {
            let upper = self.max.min(0.0);
            let lower = v + 1.0;
            if lower >= upper {
                return empty();
            }
            let midpoint = (lower + upper) / 2.0;
            union(vec![
                RealArbitrary::new(midpoint, upper),
                RealArbitrary::new(lower, midpoint),
            ])
        } else {
            empty()
        }
    }

    fn can_generate(&self, pick: &FluentPick) -> bool {
        match pick.value.as_real() {
            Some(v) => v >= self.min && v <= self.max,
            None => false,
        }
    }
}
