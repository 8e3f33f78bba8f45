// The fluent scenario engine. A scenario is a sequence of steps: quantifiers
// binding variables to domains, given/when state setup, and assertions. A
// universal quantifier breaks on the first falsifying input, an existential
// one on the first witness; either way the breaking input is shrunk by
// recursing with a smaller domain until no candidate reproduces the break.

use std::fmt;
use std::rc::Rc;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::debug;

use crate::arbitrary::{ArbitraryRef, FluentPick};
use crate::generator::{chacha_generator, GeneratorBuilder, FluentRandomGenerator};
use crate::strategy::{FluentStrategy, FluentStrategyFactory};
use crate::value::Value;

/// Variable environment threaded through a scenario's steps. Insertion
/// order is declaration order.
#[derive(Debug, Clone, Default)]
pub struct Bindings {
    entries: Vec<(String, Value)>,
}

impl Bindings {
    pub fn new() -> Bindings {
        Bindings::default()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.entries.iter_mut().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn set(&mut self, name: &str, value: Value) {
        match self.get_mut(name) {
            Some(slot) => *slot = value,
            None => self.entries.push((name.to_owned(), value)),
        }
    }

    fn fetch(&self, name: &str, kind: &str) -> &Value {
        match self.get(name) {
            Some(v) => v,
            None => panic!("no {} binding named `{}`", kind, name),
        }
    }

    pub fn int(&self, name: &str) -> i64 {
        match self.fetch(name, "integer").as_int() {
            Some(v) => v,
            None => panic!("binding `{}` is not an integer", name),
        }
    }

    pub fn real(&self, name: &str) -> f64 {
        match self.fetch(name, "real").as_real() {
            Some(v) => v,
            None => panic!("binding `{}` is not numeric", name),
        }
    }

    pub fn boolean(&self, name: &str) -> bool {
        match self.fetch(name, "boolean").as_bool() {
            Some(v) => v,
            None => panic!("binding `{}` is not a boolean", name),
        }
    }

    pub fn string(&self, name: &str) -> &str {
        match self.fetch(name, "string").as_str() {
            Some(v) => v,
            None => panic!("binding `{}` is not a string", name),
        }
    }

    pub fn array(&self, name: &str) -> &Vec<Value> {
        match self.fetch(name, "array").as_array() {
            Some(v) => v,
            None => panic!("binding `{}` is not an array", name),
        }
    }

    pub fn array_mut(&mut self, name: &str) -> &mut Vec<Value> {
        match self.get_mut(name).and_then(Value::as_array_mut) {
            Some(v) => v,
            None => panic!("binding `{}` is not an array", name),
        }
    }
}

enum Step {
    Quantifier { name: String, arbitrary: ArbitraryRef, universal: bool },
    Given { name: String, factory: Rc<dyn Fn(&Bindings) -> Value> },
    When { action: Rc<dyn Fn(&mut Bindings)> },
    Assert { predicate: Rc<dyn Fn(&Bindings) -> bool> },
}

/// Outcome of a checked scenario. For a falsified universal the example is
/// the shrunken counterexample; for a satisfied existential it is the
/// witness.
#[derive(Debug, Clone)]
pub struct FluentResult {
    pub satisfiable: bool,
    example: Vec<(String, FluentPick)>,
    pub seed: Option<u64>,
    pub elapsed: Option<Duration>,
}

impl FluentResult {
    pub fn new(satisfiable: bool) -> FluentResult {
        FluentResult { satisfiable, example: Vec::new(), seed: None, elapsed: None }
    }

    /// Bind `name` in the example, replacing any earlier binding.
    pub(crate) fn add_example(&mut self, name: &str, pick: FluentPick) {
        self.example.retain(|(n, _)| n != name);
        self.example.insert(0, (name.to_owned(), pick));
    }

    pub fn pick(&self, name: &str) -> Option<&FluentPick> {
        self.example.iter().find(|(n, _)| n == name).map(|(_, p)| p)
    }

    pub fn value(&self, name: &str) -> Option<&Value> {
        self.pick(name).map(|p| &p.value)
    }

    pub fn example(&self) -> &[(String, FluentPick)] {
        &self.example
    }

    fn render_example(&self) -> String {
        if self.example.is_empty() {
            return "(none)".to_owned();
        }
        let parts: Vec<String> = self
            .example
            .iter()
            .map(|(n, p)| format!("{} = {}", n, p.value))
            .collect();
        parts.join(", ")
    }
}

#[derive(Debug, Error)]
#[error("scenario not satisfiable; example: {counterexample}, seed: {seed:?}")]
pub struct PropertyError {
    pub counterexample: String,
    pub seed: Option<u64>,
}

/// Turn a result into an `Err` suitable for `?` in test harnesses.
pub fn expect(result: &FluentResult) -> Result<(), PropertyError> {
    if result.satisfiable {
        Ok(())
    } else {
        Err(PropertyError { counterexample: result.render_example(), seed: result.seed })
    }
}

/// A scenario under construction. Steps accumulate in order and nothing runs
/// until `check`.
pub struct FluentCheck {
    steps: Vec<Step>,
    factory: FluentStrategyFactory,
    builder: GeneratorBuilder,
    seed: Option<u64>,
}

/// Start an empty scenario with the stock strategy.
pub fn scenario() -> FluentCheck {
    FluentCheck {
        steps: Vec::new(),
        factory: FluentStrategyFactory::default(),
        builder: chacha_generator,
        seed: None,
    }
}

impl FluentCheck {
    pub fn forall(mut self, name: &str, arbitrary: ArbitraryRef) -> Self {
        self.steps.push(Step::Quantifier { name: name.to_owned(), arbitrary, universal: true });
        self
    }

    pub fn exists(mut self, name: &str, arbitrary: ArbitraryRef) -> Self {
        self.steps.push(Step::Quantifier { name: name.to_owned(), arbitrary, universal: false });
        self
    }

    /// Bind `name` to a value derived from the current environment.
    pub fn given(mut self, name: &str, factory: impl Fn(&Bindings) -> Value + 'static) -> Self {
        self.steps.push(Step::Given { name: name.to_owned(), factory: Rc::new(factory) });
        self
    }

    pub fn given_value(self, name: &str, value: impl Into<Value>) -> Self {
        let value = value.into();
        self.given(name, move |_| value.clone())
    }

    /// Run a side effect against the environment.
    pub fn when(mut self, action: impl Fn(&mut Bindings) + 'static) -> Self {
        self.steps.push(Step::When { action: Rc::new(action) });
        self
    }

    pub fn then(mut self, predicate: impl Fn(&Bindings) -> bool + 'static) -> Self {
        self.steps.push(Step::Assert { predicate: Rc::new(predicate) });
        self
    }

    /// A further assertion; the scenario holds only if all of them do.
    pub fn and(self, predicate: impl Fn(&Bindings) -> bool + 'static) -> Self {
        self.then(predicate)
    }

    pub fn config(mut self, factory: FluentStrategyFactory) -> Self {
        self.factory = factory;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Replace the random source, for reproducing runs under a different
    /// stream.
    pub fn with_generator(mut self, builder: GeneratorBuilder, seed: u64) -> Self {
        self.builder = builder;
        self.seed = Some(seed);
        self
    }

    pub fn check(self) -> FluentResult {
        let seed = self.seed.unwrap_or_else(rand::random::<u64>);
        let mut strategy = self.factory.build(FluentRandomGenerator::new(self.builder, seed));
        for step in &self.steps {
            if let Step::Quantifier { name, arbitrary, .. } = step {
                strategy.add_arbitrary(name, arbitrary.clone());
            }
        }
        let start = Instant::now();
        let mut env = Bindings::new();
        let mut result = self.run_from(0, &mut env, &mut strategy);
        result.example.sort_by_key(|(name, _)| self.declaration_order(name));
        result.seed = Some(seed);
        result.elapsed = Some(start.elapsed());
        debug!(
            satisfiable = result.satisfiable,
            seed,
            example = %result.render_example(),
            "scenario checked"
        );
        result
    }

    fn has_assert_after(&self, idx: usize) -> bool {
        self.steps[idx + 1..].iter().any(|s| matches!(s, Step::Assert { .. }))
    }

    fn declaration_order(&self, name: &str) -> usize {
        self.steps
            .iter()
            .position(|s| matches!(s, Step::Quantifier { name: n, .. } if n == name))
            .unwrap_or(usize::MAX)
    }

    fn run_from(
        &self,
        idx: usize,
        env: &mut Bindings,
        strategy: &mut FluentStrategy,
    ) -> FluentResult {
        match self.steps.get(idx) {
            None => FluentResult::new(true),
            Some(Step::Given { name, factory }) => {
                let value = factory(env);
                env.set(name, value);
                self.run_from(idx + 1, env, strategy)
            }
            Some(Step::When { action }) => {
                action(env);
                self.run_from(idx + 1, env, strategy)
            }
            Some(Step::Assert { predicate }) => {
                let holds = predicate(env);
                // One strategy notification per test case: the failing
                // assertion decides it, otherwise the last one does.
                if !holds || !self.has_assert_after(idx) {
                    strategy.handle_result();
                }
                if holds {
                    self.run_from(idx + 1, env, strategy)
                } else {
                    FluentResult::new(false)
                }
            }
            Some(Step::Quantifier { name, universal, .. }) => {
                let name = name.clone();
                self.run_quantifier(idx, &name, *universal, env, strategy, None, 0)
            }
        }
    }

    /// Explore one quantifier's pool. A universal breaks on an unsatisfied
    /// continuation, an existential on a satisfied one; the breaking pick is
    /// then shrunk by recursing with a pool drawn from a smaller domain.
    /// Exhaustion returns the best break found so far, or decides the
    /// quantifier in its default direction.
    #[allow(clippy::too_many_arguments)]
    fn run_quantifier(
        &self,
        idx: usize,
        name: &str,
        universal: bool,
        env: &mut Bindings,
        strategy: &mut FluentStrategy,
        partial: Option<FluentResult>,
        depth: usize,
    ) -> FluentResult {
        let break_value = !universal;
        strategy.config_arbitrary(name, partial.as_ref(), depth);
        let mut last: Option<FluentPick> = None;
        while strategy.has_input(name) {
            let pick = strategy.get_input(name);
            env.set(name, pick.value.clone());
            let mut sub = self.run_from(idx + 1, env, strategy);
            if sub.satisfiable == break_value {
                sub.add_example(name, pick);
                debug!(name, depth, "quantifier broke; shrinking");
                return self.run_quantifier(
                    idx,
                    name,
                    universal,
                    env,
                    strategy,
                    Some(sub),
                    depth + 1,
                );
            }
            last = Some(pick);
        }
        match partial {
            Some(result) => result,
            None => {
                let mut result = FluentResult::new(!break_value);
                // A universal satisfied by exhaustion reports the last input
                // it survived.
                if universal {
                    if let Some(pick) = last {
                        result.add_example(name, pick);
                    }
                }
                result
            }
        }
    }
}

impl fmt::Debug for FluentCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FluentCheck")
            .field("steps", &self.steps.len())
            .field("seed", &self.seed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arbitrary::integer;

    #[test]
    fn addition_is_commutative() {
        let result = scenario()
            .forall("a", integer(-1000, 1000))
            .forall("b", integer(-1000, 1000))
            .then(|env| env.int("a") + env.int("b") == env.int("b") + env.int("a"))
            .with_seed(99)
            .check();
        assert!(result.satisfiable);
        assert!(expect(&result).is_ok());
    }

    #[test]
    fn falsified_scenarios_carry_a_counterexample() {
        let result = scenario()
            .forall("a", integer(0, 1000))
            .then(|env| env.int("a") < 900)
            .with_seed(7)
            .check();
        assert!(!result.satisfiable);
        let a = result.value("a").unwrap().as_int().unwrap();
        assert!(a >= 900);
        let err = expect(&result).unwrap_err();
        assert!(err.to_string().contains("a ="));
    }

    #[test]
    fn given_and_when_thread_state() {
        let result = scenario()
            .forall("a", integer(1, 50))
            .given("double", |env| Value::Int(env.int("a") * 2))
            .when(|env| {
                let doubled = env.int("double");
                env.set("tracked", Value::Int(doubled + 1));
            })
            .then(|env| env.int("tracked") == env.int("a") * 2 + 1)
            .with_seed(3)
            .check();
        assert!(result.satisfiable);
    }

    #[test]
    fn conjunction_requires_every_assertion() {
        let result = scenario()
            .forall("a", integer(0, 10))
            .then(|env| env.int("a") >= 0)
            .and(|env| env.int("a") <= 5)
            .with_seed(11)
            .check();
        assert!(!result.satisfiable);
        assert!(result.value("a").unwrap().as_int().unwrap() > 5);
    }
}
