// Arrays of a homogeneous element domain and fixed-arity tuples of
// heterogeneous member domains. Array shrinking reduces length before
// element structure; tuples shrink one position at a time.

use std::rc::Rc;

use crate::generator::Generator;
use crate::value::Value;

use super::{
    constant, empty, is_empty, tuple, union, ArbitraryRef, Arbitrary, ArbitrarySize, FluentPick,
    SizeKind,
};

// Tuple corner enumeration is a cartesian product; cap it so wide tuples do
// not explode the biased sample pool.
const MAX_TUPLE_CORNERS: usize = 64;

#[derive(Debug)]
pub struct ArrayArbitrary {
    element: ArbitraryRef,
    min: usize,
    max: usize,
}

impl ArrayArbitrary {
    pub fn new(element: ArbitraryRef, min: usize, max: usize) -> ArbitraryRef {
        if min > max || (is_empty(&element) && min > 0) {
            empty()
        } else {
            Rc::new(ArrayArbitrary { element, min, max })
        }
    }
}

impl Arbitrary for ArrayArbitrary {
    fn size(&self) -> ArbitrarySize {
        let exponent = (self.max - self.min) as f64;
        self.element.size().map(|v| v.powf(exponent))
    }

    fn pick(&self, generator: &mut Generator) -> Option<FluentPick> {
        let span = (self.max - self.min + 1) as f64;
        let length = self.min + ((generator() * span).floor() as usize).min(self.max - self.min);
        let picks = self.element.sample_with_bias(length, generator);
        if picks.len() < length {
            return None;
        }
        let values: Vec<Value> = picks.iter().map(|p| p.value.clone()).collect();
        let originals: Vec<Value> = picks.iter().map(|p| p.original_value().clone()).collect();
        Some(FluentPick::with_original(Value::Array(values), Value::Array(originals)))
    }

    fn corner_cases(&self) -> Vec<FluentPick> {
        let mut lengths = vec![self.min, self.max];
        lengths.dedup();
        self.element
            .corner_cases()
            .iter()
            .flat_map(|corner| {
                lengths.iter().map(move |&l| {
                    let values = vec![corner.value.clone(); l];
                    let originals = vec![corner.original_value().clone(); l];
                    FluentPick::with_original(Value::Array(values), Value::Array(originals))
                })
            })
            .collect()
    }

    fn shrink(&self, initial: &FluentPick) -> ArbitraryRef {
        let length = match initial.value.as_array() {
            Some(vs) => vs.len(),
            None => return empty(),
        };
        if length <= self.min {
            return empty();
        }
        let middle = (self.min + length) / 2;
        union(vec![
            ArrayArbitrary::new(self.element.clone(), self.min, middle),
            ArrayArbitrary::new(self.element.clone(), middle + 1, length - 1),
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
        let originals = pick.original.as_ref().and_then(Value::as_array);
        values.iter().enumerate().all(|(i, v)| {
            let original = originals.and_then(|os| os.get(i)).cloned();
            self.element.can_generate(&FluentPick {
                value: v.clone(),
                original,
                index: None,
            })
        })
    }
}

#[derive(Debug)]
pub struct TupleArbitrary {
    members: Vec<ArbitraryRef>,
}

impl TupleArbitrary {
    pub fn new(members: Vec<ArbitraryRef>) -> ArbitraryRef {
        if members.is_empty() || members.iter().any(is_empty) {
            empty()
        } else {
            Rc::new(TupleArbitrary { members })
        }
    }

    fn component(initial: &FluentPick, i: usize) -> FluentPick {
        let value = initial.value.as_array().map(|vs| vs[i].clone()).unwrap();
        let original = initial
            .original
            .as_ref()
            .and_then(Value::as_array)
            .and_then(|os| os.get(i).cloned());
        FluentPick { value, original, index: None }
    }
}

impl Arbitrary for TupleArbitrary {
    fn size(&self) -> ArbitrarySize {
        let mut value = 1.0;
        let mut low = 1.0;
        let mut high = 1.0;
        let mut kind = SizeKind::Exact;
        for m in &self.members {
            let s = m.size();
            value *= s.value;
            low *= s.credible_interval.0;
            high *= s.credible_interval.1;
            if s.kind != SizeKind::Exact {
                kind = SizeKind::Estimated;
            }
        }
        ArbitrarySize { value, kind, credible_interval: (low, high) }
    }

    fn pick(&self, generator: &mut Generator) -> Option<FluentPick> {
        let mut values = Vec::with_capacity(self.members.len());
        let mut originals = Vec::with_capacity(self.members.len());
        for m in &self.members {
            let p = m.pick(generator)?;
            originals.push(p.original_value().clone());
            values.push(p.value);
        }
        Some(FluentPick::with_original(Value::Array(values), Value::Array(originals)))
    }

    fn corner_cases(&self) -> Vec<FluentPick> {
        let mut acc: Vec<(Vec<Value>, Vec<Value>)> = vec![(Vec::new(), Vec::new())];
        for m in &self.members {
            let corners = m.corner_cases();
            if corners.is_empty() {
                return Vec::new();
            }
            let mut next = Vec::new();
            for (values, originals) in &acc {
                for corner in &corners {
                    let mut values = values.clone();
                    let mut originals = originals.clone();
                    values.push(corner.value.clone());
                    originals.push(corner.original_value().clone());
                    next.push((values, originals));
                    if next.len() >= MAX_TUPLE_CORNERS {
                        break;
                    }
                }
                if next.len() >= MAX_TUPLE_CORNERS {
                    break;
                }
            }
            acc = next;
        }
        acc.into_iter()
            .map(|(values, originals)| {
                FluentPick::with_original(Value::Array(values), Value::Array(originals))
            })
            .collect()
    }

    fn shrink(&self, initial: &FluentPick) -> ArbitraryRef {
        let values = match initial.value.as_array() {
            Some(vs) if vs.len() == self.members.len() => vs,
            _ => return empty(),
        };
        let mut variants = Vec::with_capacity(self.members.len());
        for i in 0..self.members.len() {
            let shrunk = self.members[i].shrink(&TupleArbitrary::component(initial, i));
            let positions: Vec<ArbitraryRef> = (0..self.members.len())
                .map(|j| {
                    if j == i {
                        shrunk.clone()
                    } else {
                        constant(values[j].clone())
                    }
                })
                .collect();
            variants.push(tuple(positions));
        }
        union(variants)
    }

    fn can_generate(&self, pick: &FluentPick) -> bool {
        match pick.value.as_array() {
            Some(vs) if vs.len() == self.members.len() => self
                .members
                .iter()
                .enumerate()
                .all(|(i, m)| m.can_generate(&TupleArbitrary::component(pick, i))),
            _ => false,
        }
    }
}
