// Strings of bounded length over a fixed alphabet. Shrinking narrows the
// alphabet to the characters of the failing string and bisects the length,
// so simplified counterexamples keep only characters already implicated.

use std::rc::Rc;

use crate::generator::Generator;
use crate::value::Value;

use super::{empty, union, ArbitraryRef, Arbitrary, ArbitrarySize, FluentPick};

pub const LOWERCASE: &str = "abcdefghijklmnopqrstuvwxyz";

pub const PRINTABLE: &str = " !\"#$%&'()*+,-./0123456789:;<=>?@\
ABCDEFGHIJKLMNOPQRSTUVWXYZ[\\]^_`abcdefghijklmnopqrstuvwxyz{|}~";

/// A spread of non-ASCII code points covering several scripts, for smoke
/// testing text handling beyond the ASCII plane.
pub const UNICODE_SAMPLE: &str = "àéîõüßñçæøαβγδλπσωждщэю中文日本語한글עמ√∞≠€";

#[derive(Debug, Clone)]
pub struct StringArbitrary {
    min: usize,
    max: usize,
    chars: Vec<char>,
}

impl StringArbitrary {
    pub fn new(min: usize, max: usize, alphabet: &str) -> ArbitraryRef {
        let chars: Vec<char> = alphabet.chars().collect();
        if min > max || chars.is_empty() {
            empty()
        } else {
            Rc::new(StringArbitrary { min, max, chars })
        }
    }

    fn narrowed_alphabet(&self, s: &str) -> String {
        let mut out = String::new();
        for c in s.chars() {
            if !out.contains(c) {
                out.push(c);
            }
        }
        out
    }
}

impl Arbitrary for StringArbitrary {
    fn size(&self) -> ArbitrarySize {
        let base = self.chars.len() as f64;
        let total: f64 = (self.min..=self.max).map(|l| base.powi(l as i32)).sum();
        ArbitrarySize::exact(total)
    }

    fn pick(&self, generator: &mut Generator) -> Option<FluentPick> {
        let span = (self.max - self.min + 1) as f64;
        let length = self.min + ((generator() * span).floor() as usize).min(self.max - self.min);
        let mut s = String::with_capacity(length);
        for _ in 0..length {
            let i = ((generator() * self.chars.len() as f64).floor() as usize)
                .min(self.chars.len() - 1);
            s.push(self.chars[i]);
        }
        let value = Value::Str(s);
        Some(FluentPick::with_original(value.clone(), value))
    }

    fn corner_cases(&self) -> Vec<FluentPick> {
        let first = self.chars[0];
        let mut lengths = vec![self.min, self.max];
        lengths.dedup();
        lengths
            .into_iter()
            .map(|l| {
                let s: String = std::iter::repeat(first).take(l).collect();
                FluentPick::with_original(Value::Str(s.clone()), Value::Str(s))
            })
            .collect()
    }

    fn shrink(&self, initial: &FluentPick) -> ArbitraryRef {
        let s = match initial.value.as_str() {
            Some(s) => s,
            None => return empty(),
        };
        let length = s.chars().count();
        if length <= self.min {
            return empty();
        }
        let alphabet = self.narrowed_alphabet(s);
        let middle = (self.min + length) / 2;
        union(vec![
            StringArbitrary::new(self.min, middle, &alphabet),
            StringArbitrary::new(middle + 1, length - 1, &alphabet),
        ])
    }

    fn can_generate(&self, pick: &FluentPick) -> bool {
        match pick.value.as_str() {
            Some(s) => {
                let length = s.chars().count();
                length >= self.min
                    && length <= self.max
                    && s.chars().all(|c| self.chars.contains(&c))
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arbitrary::{is_empty, string, string_over};
    use crate::generator::FluentRandomGenerator;

    #[test]
    fn picks_respect_length_and_alphabet() {
        let mut rng = FluentRandomGenerator::with_seed(21);
        let arb = string_over(2, 6, "abc");
        for _ in 0..500 {
            let p = arb.pick(rng.generator_mut()).unwrap();
            let s = p.value.as_str().unwrap();
            assert!((2..=6).contains(&s.len()));
            assert!(s.chars().all(|c| "abc".contains(c)));
        }
    }

    #[test]
    fn corner_cases_are_shortest_and_longest() {
        let corners: Vec<String> = string(2, 5)
            .corner_cases()
            .iter()
            .map(|p| p.value.as_str().unwrap().to_owned())
            .collect();
        assert_eq!(corners, vec!["aa".to_owned(), "aaaaa".to_owned()]);
    }

    #[test]
    fn shrink_produces_shorter_strings_over_the_seen_characters() {
        let mut rng = FluentRandomGenerator::with_seed(8);
        let arb = string(0, 10);
        let shrunk = arb.shrink(&FluentPick::new(Value::Str("dadbc".into())));
        for _ in 0..200 {
            let s = shrunk
                .pick(rng.generator_mut())
                .unwrap()
                .value
                .as_str()
                .unwrap()
                .to_owned();
            assert!(s.len() < 5);
            assert!(s.chars().all(|c| "dabc".contains(c)));
        }
    }

    #[test]
    fn minimum_length_string_is_fully_shrunk() {
        let arb = string(3, 10);
        assert!(is_empty(&arb.shrink(&FluentPick::new(Value::Str("abc".into())))));
    }

    #[test]
    fn membership_checks_alphabet() {
        let arb = string_over(1, 3, "xyz");
        assert!(arb.can_generate(&FluentPick::new(Value::Str("xy".into()))));
        assert!(!arb.can_generate(&FluentPick::new(Value::Str("xa".into()))));
        assert!(!arb.can_generate(&FluentPick::new(Value::Str("".into()))));
        assert!(!arb.can_generate(&FluentPick::new(Value::Int(3))));
    }
}
