// Leaf domains with trivial structure: a single constant, the empty domain
// and booleans.

use crate::generator::Generator;
use crate::value::Value;

use super::{Arbitrary, ArbitrarySize, FluentPick};

#[derive(Debug, Clone)]
pub struct ConstantArbitrary {
    value: Value,
}

impl ConstantArbitrary {
    pub fn new(value: Value) -> ConstantArbitrary {
        ConstantArbitrary { value }
    }
}

impl Arbitrary for ConstantArbitrary {
    fn size(&self) -> ArbitrarySize {
        ArbitrarySize::exact(1.0)
    }

    fn pick(&self, _generator: &mut Generator) -> Option<FluentPick> {
        Some(FluentPick {
            value: self.value.clone(),
            original: Some(self.value.clone()),
            index: Some(0),
        })
    }

    fn corner_cases(&self) -> Vec<FluentPick> {
        vec![FluentPick::with_original(self.value.clone(), self.value.clone())]
    }

    fn can_generate(&self, pick: &FluentPick) -> bool {
        pick.value == self.value
    }
}

/// The zero-cardinality domain. `pick` never succeeds and quantifiers treat
/// it as immediate exhaustion.
#[derive(Debug, Clone, Copy)]
pub struct EmptyArbitrary;

impl Arbitrary for EmptyArbitrary {
    fn size(&self) -> ArbitrarySize {
        ArbitrarySize::exact(0.0)
    }

    fn pick(&self, _generator: &mut Generator) -> Option<FluentPick> {
        None
    }

    fn can_generate(&self, _pick: &FluentPick) -> bool {
        false
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BooleanArbitrary;

impl Arbitrary for BooleanArbitrary {
    fn size(&self) -> ArbitrarySize {
        ArbitrarySize::exact(2.0)
    }

    fn pick(&self, generator: &mut Generator) -> Option<FluentPick> {
        let heads = generator() < 0.5;
        Some(FluentPick {
            value: Value::Bool(heads),
            original: Some(Value::Int(if heads { 0 } else { 1 })),
            index: Some(if heads { 0 } else { 1 }),
        })
    }

    fn corner_cases(&self) -> Vec<FluentPick> {
        vec![
            FluentPick {
                value: Value::Bool(true),
                original: Some(Value::Int(0)),
                index: Some(0),
            },
            FluentPick {
                value: Value::Bool(false),
                original: Some(Value::Int(1)),
                index: Some(1),
            },
        ]
    }

    fn can_generate(&self, pick: &FluentPick) -> bool {
        matches!(pick.value, Value::Bool(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arbitrary::{boolean, constant};
    use crate::generator::FluentRandomGenerator;

    #[test]
    fn constant_always_yields_its_value() {
        let mut rng = FluentRandomGenerator::with_seed(1);
        let arb = constant("fixed");
        for _ in 0..10 {
            let p = arb.pick(rng.generator_mut()).unwrap();
            assert_eq!(p.value, Value::Str("fixed".into()));
            assert_eq!(p.index, Some(0));
        }
        assert!(arb.can_generate(&FluentPick::new(Value::Str("fixed".into()))));
        assert!(!arb.can_generate(&FluentPick::new(Value::Str("other".into()))));
    }

    #[test]
    fn boolean_covers_both_values() {
        let mut rng = FluentRandomGenerator::with_seed(2);
        let arb = boolean();
        let mut seen = [false, false];
        for _ in 0..100 {
            match arb.pick(rng.generator_mut()).unwrap().value {
                Value::Bool(true) => seen[0] = true,
                Value::Bool(false) => seen[1] = true,
                _ => panic!("boolean produced a non-boolean"),
            }
        }
        assert!(seen[0] && seen[1]);
        assert_eq!(arb.corner_cases().len(), 2);
    }
}
