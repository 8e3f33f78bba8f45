// Subsets of a finite universe with bounded cardinality. Elements keep the
// order they were declared in, so picks are canonical: a subset is always
// reported in universe order.

use std::collections::BTreeSet;
use std::rc::Rc;

use crate::distributions::combinations;
use crate::generator::Generator;
use crate::value::Value;

use super::{dedup_picks, empty, union, ArbitraryRef, Arbitrary, ArbitrarySize, FluentPick};

#[derive(Debug)]
pub struct SetArbitrary {
    elements: Vec<Value>,
    min: usize,
    max: usize,
}

impl SetArbitrary {
    pub fn new(elements: Vec<Value>, min: usize, max: usize) -> ArbitraryRef {
        let mut seen = BTreeSet::new();
        let elements: Vec<Value> = elements
            .into_iter()
            .filter(|e| seen.insert(e.canonical()))
            .collect();
        let max = max.min(elements.len());
        if min > max {
            empty()
        } else {
            Rc::new(SetArbitrary { elements, min, max })
        }
    }

    fn subset(&self, indices: &BTreeSet<usize>) -> FluentPick {
        let values: Vec<Value> = indices.iter().map(|&i| self.elements[i].clone()).collect();
        FluentPick::with_original(Value::Array(values.clone()), Value::Array(values))
    }
}

impl Arbitrary for SetArbitrary {
    fn size(&self) -> ArbitrarySize {
        let n = self.elements.len();
        let total: f64 = (self.min..=self.max).map(|k| combinations(n, k)).sum();
        ArbitrarySize::exact(total)
    }

    fn pick(&self, generator: &mut Generator) -> Option<FluentPick> {
        let n = self.elements.len();
        let span = (self.max - self.min + 1) as f64;
        let target = self.min + ((generator() * span).floor() as usize).min(self.max - self.min);
        let mut indices = BTreeSet::new();
        while indices.len() < target {
            let i = ((generator() * n as f64).floor() as usize).min(n - 1);
            indices.insert(i);
        }
        Some(self.subset(&indices))
    }

    fn corner_cases(&self) -> Vec<FluentPick> {
        let smallest: BTreeSet<usize> = (0..self.min).collect();
        let largest: BTreeSet<usize> = (0..self.max).collect();
        dedup_picks(vec![self.subset(&smallest), self.subset(&largest)])
    }

    fn shrink(&self, initial: &FluentPick) -> ArbitraryRef {
        let members = match initial.value.as_array() {
            Some(vs) => vs.clone(),
            None => return empty(),
        };
        let length = members.len();
        if length <= self.min {
            return empty();
        }
        // Simplifications draw only from the elements already implicated.
        let middle = (self.min + length) / 2;
        union(vec![
            SetArbitrary::new(members.clone(), self.min, middle),
            SetArbitrary::new(members, middle + 1, length - 1),
        ])
    }

    fn can_generate(&self, pick: &FluentPick) -> bool {
        let values = match pick.value.as_array() {
            Some(vs) => vs,
            None => return false,
        };
        if values.len() < self.min || values.len() > self.max {
            return false;
        }
        let mut seen = BTreeSet::new();
        values.iter().all(|v| {
            seen.insert(v.canonical()) && self.elements.iter().any(|e| e == v)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arbitrary::{is_empty, set};
    use crate::generator::FluentRandomGenerator;

    fn ints(values: &[i64]) -> Vec<Value> {
        values.iter().map(|&v| Value::Int(v)).collect()
    }

    #[test]
    fn picks_are_distinct_in_universe_order() {
        let mut rng = FluentRandomGenerator::with_seed(77);
        let arb = set(ints(&[1, 2, 3, 4, 5]), 1, 3);
        for _ in 0..300 {
            let p = arb.pick(rng.generator_mut()).unwrap();
            let vs: Vec<i64> =
                p.value.as_array().unwrap().iter().filter_map(Value::as_int).collect();
            assert!((1..=3).contains(&vs.len()));
            let mut sorted = vs.clone();
            sorted.sort_unstable();
            sorted.dedup();
            assert_eq!(vs, sorted);
            assert!(arb.can_generate(&p));
        }
    }

    #[test]
    fn size_counts_subsets() {
        // C(4,1) + C(4,2) = 4 + 6
        assert_eq!(set(ints(&[1, 2, 3, 4]), 1, 2).size().count(), 10);
        // Duplicated universe elements collapse first.
        assert_eq!(set(ints(&[1, 1, 2]), 1, 2).size().count(), 3);
    }

    #[test]
    fn cardinality_above_universe_clamps() {
        let arb = set(ints(&[1, 2]), 0, 10);
        assert_eq!(arb.size().count(), 4);
        assert!(is_empty(&set(ints(&[1, 2]), 3, 10)));
    }

    #[test]
    fn shrink_drops_members() {
        let mut rng = FluentRandomGenerator::with_seed(88);
        let arb = set(ints(&[1, 2, 3, 4, 5]), 0, 5);
        let failing = FluentPick::new(Value::Array(ints(&[2, 3, 5])));
        let shrunk = arb.shrink(&failing);
        for _ in 0..100 {
            let p = shrunk.pick(rng.generator_mut()).unwrap();
            let vs = p.value.as_array().unwrap();
            assert!(vs.len() < 3);
            assert!(vs.iter().all(|v| [2, 3, 5].contains(&v.as_int().unwrap())));
        }
        assert!(is_empty(&arb.shrink(&FluentPick::new(Value::Array(vec![])))));
    }

    #[test]
    fn membership_rejects_duplicates_and_foreign_elements() {
        let arb = set(ints(&[1, 2, 3]), 1, 3);
        assert!(arb.can_generate(&FluentPick::new(Value::Array(ints(&[1, 3])))));
        assert!(!arb.can_generate(&FluentPick::new(Value::Array(ints(&[1, 1])))));
        assert!(!arb.can_generate(&FluentPick::new(Value::Array(ints(&[4])))));
    }
}
