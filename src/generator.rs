// Pseudo-random number source for the whole engine. Randomness is always
// drawn through an injectable builder so that a fixed seed reproduces an
// entire run, including every shrink path.

use std::fmt;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// A uniform-[0, 1) generator. Arbitraries receive this as `&mut Generator`
/// and never own randomness of their own.
pub type Generator = dyn FnMut() -> f64;

/// Builds a generator closure from a seed.
pub type GeneratorBuilder = fn(u64) -> Box<Generator>;

/// Default builder: a ChaCha8 stream keyed by the seed.
pub fn chacha_generator(seed: u64) -> Box<Generator> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    Box::new(move || rng.gen::<f64>())
}

/// Seeded generator handle owned by a strategy for the duration of one
/// `check()` run.
pub struct FluentRandomGenerator {
    pub seed: u64,
    builder: GeneratorBuilder,
    generator: Box<Generator>,
}

impl FluentRandomGenerator {
    pub fn new(builder: GeneratorBuilder, seed: u64) -> FluentRandomGenerator {
        FluentRandomGenerator {
            seed,
            builder,
            generator: builder(seed),
        }
    }

    /// Fresh handle with the default ChaCha8 builder and a random seed.
    pub fn random_seed() -> FluentRandomGenerator {
        FluentRandomGenerator::new(chacha_generator, rand::random::<u64>())
    }

    pub fn with_seed(seed: u64) -> FluentRandomGenerator {
        FluentRandomGenerator::new(chacha_generator, seed)
    }

    /// Restart the stream from the stored seed.
    pub fn reset(&mut self) {
        self.generator = (self.builder)(self.seed);
    }

    pub fn next_f64(&mut self) -> f64 {
        (self.generator)()
    }

    /// Borrow the underlying closure for passing down to arbitraries.
    pub fn generator_mut(&mut self) -> &mut Generator {
        &mut *self.generator
    }
}

impl fmt::Debug for FluentRandomGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FluentRandomGenerator")
            .field("seed", &self.seed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_stream() {
        let mut a = FluentRandomGenerator::with_seed(1234);
        let mut b = FluentRandomGenerator::with_seed(1234);
        for _ in 0..100 {
            assert_eq!(a.next_f64(), b.next_f64());
        }
    }

    #[test]
    fn reset_replays_the_stream() {
        let mut g = FluentRandomGenerator::with_seed(42);
        let first: Vec<f64> = (0..10).map(|_| g.next_f64()).collect();
        g.reset();
        let second: Vec<f64> = (0..10).map(|_| g.next_f64()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn values_are_unit_interval() {
        let mut g = FluentRandomGenerator::with_seed(7);
        for _ in 0..1000 {
            let x = g.next_f64();
            assert!((0.0..1.0).contains(&x));
        }
    }
}
