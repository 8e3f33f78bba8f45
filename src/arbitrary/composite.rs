// Weighted union of domains. A member is chosen with probability
// proportional to its size, so uniform members stay uniform after merging.

use std::rc::Rc;

use crate::generator::Generator;

use super::{empty, is_empty, union, ArbitraryRef, Arbitrary, ArbitrarySize, FluentPick};

#[derive(Debug)]
pub struct CompositeArbitrary {
    members: Vec<ArbitraryRef>,
}

impl CompositeArbitrary {
    /// Empty members are dropped; a union of nothing is the empty domain and
    /// a union of one member is that member.
    pub fn new(members: Vec<ArbitraryRef>) -> ArbitraryRef {
        let mut members: Vec<ArbitraryRef> =
            members.into_iter().filter(|m| !is_empty(m)).collect();
        match members.len() {
            0 => empty(),
            1 => members.pop().unwrap(),
            _ => Rc::new(CompositeArbitrary { members }),
        }
    }
}

impl Arbitrary for CompositeArbitrary {
    fn size(&self) -> ArbitrarySize {
        self.members
            .iter()
            .map(|m| m.size())
            .fold(ArbitrarySize::exact(0.0), |acc, s| acc.add(s))
    }

    fn pick(&self, generator: &mut Generator) -> Option<FluentPick> {
        let sizes: Vec<f64> = self.members.iter().map(|m| m.size().value).collect();
        let total: f64 = sizes.iter().sum();
        if total <= 0.0 {
            return None;
        }
        let mut target = generator() * total;
        let mut offset = 0u64;
        let last = self.members.len() - 1;
        for (i, member) in self.members.iter().enumerate() {
            if target < sizes[i] || i == last {
                let mut pick = member.pick(generator)?;
                // Indices are offset into a single flattened enumeration.
                pick.index = pick.index.map(|idx| idx + offset);
                return Some(pick);
            }
            target -= sizes[i];
            offset += member.size().count() as u64;
        }
        None
    }

    fn corner_cases(&self) -> Vec<FluentPick> {
        self.members.iter().flat_map(|m| m.corner_cases()).collect()
    }

    fn shrink(&self, initial: &FluentPick) -> ArbitraryRef {
        union(
            self.members
                .iter()
                .filter(|m| m.can_generate(initial))
                .map(|m| m.shrink(initial))
                .collect(),
        )
    }

    fn can_generate(&self, pick: &FluentPick) -> bool {
        self.members.iter().any(|m| m.can_generate(pick))
    }
}
