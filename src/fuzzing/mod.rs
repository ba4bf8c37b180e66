//! Module for testing using fuzzing (quickcheck)

use std::fmt::Debug;
use std::net::Ipv4Addr;

use quickcheck::Arbitrary;

use crate::*;

mod basic;

#[derive(Debug, PartialEq, Clone, Copy)]
enum Operation {
    Add(TestPrefix, u32),
    Remove(TestPrefix),
}

#[cfg(miri)]
const DEFAULT_NUM_TESTS: usize = 10;
#[cfg(not(miri))]
const DEFAULT_NUM_TESTS: usize = 1000;
const DEFAULT_GEN_SIZE: usize = 100;

fn proptest_runner<A: Arbitrary + Debug + PartialEq, F: Fn(A) -> bool>(f: F) {
    let num_tests: usize = std::env::var("QUICKCHECK_TESTS")
        .ok()
        .and_then(|x| x.parse::<usize>().ok())
        .unwrap_or(DEFAULT_NUM_TESTS);

    let gen_size: usize = std::env::var("QUICKCHECK_GENERATOR_SIZE")
        .ok()
        .and_then(|x| x.parse::<usize>().ok())
        .unwrap_or(DEFAULT_GEN_SIZE);

    let mut gen = quickcheck::Gen::new(gen_size);

    for _ in 0..num_tests {
        let input = A::arbitrary(&mut gen);
        if !f(input.clone()) {
            shrink_failure(f, input)
        }
    }
}

fn shrink_failure<A: Arbitrary + Debug + PartialEq, F: Fn(A) -> bool>(f: F, input: A) -> ! {
    for smaller in input.shrink() {
        if !f(smaller.clone()) {
            shrink_failure(f, smaller)
        }
    }
    // all shrunken inputs pass, so `input` is the minimal counterexample
    panic!(
        "[QUICKCHECK] Test case failed!\n  Minimal input:\n    {:?}",
        input
    );
}

macro_rules! qc {
    ($name:ident, $f:ident) => {
        #[test]
        fn $name() {
            proptest_runner($f)
        }
    };
}
pub(crate) use qc;

/// An IPv4 prefix with a short, heavily colliding length distribution, so
/// random vectors of them exercise glue forks, promotions and collapses.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy)]
struct TestPrefix(u32, u8);

impl TestPrefix {
    fn masked(addr: u32, len: u8) -> u32 {
        if len == 0 {
            0
        } else {
            addr & (u32::MAX << (32 - len))
        }
    }

    fn contains(self, addr: u32) -> bool {
        Self::masked(addr, self.1) == self.0
    }

    fn prefix(self) -> RadixPrefix {
        RadixPrefix::v4(Ipv4Addr::from(self.0), self.1).unwrap()
    }
}

impl Debug for TestPrefix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let addr = format!("{:032b}", self.0)[..10].to_string();
        write!(f, "0b{addr}/{}", self.1)
    }
}

impl Arbitrary for TestPrefix {
    fn arbitrary(g: &mut quickcheck::Gen) -> Self {
        #[rustfmt::skip]
        let len: u8 = *g
            .choose(&[
                0,
                1, 1,
                2, 2, 2,
                3, 3, 3, 3,
                4, 4, 4, 4, 4,
                5, 5, 5, 5, 5, 5,
                6, 6, 6, 6, 6, 6, 6,
                7, 7, 7, 7, 7, 7, 7, 7,
                8, 8, 8, 8, 8, 8, 8, 8, 8,
                9, 9, 9, 9, 9, 9, 9, 9, 9, 9,
            ])
            .unwrap();
        let addr = u32::arbitrary(g);
        Self(Self::masked(addr, len), len)
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        if self.1 == 0 {
            quickcheck::empty_shrinker()
        } else {
            let len = self.1 - 1;
            quickcheck::single_shrinker(Self(Self::masked(self.0, len), len))
        }
    }
}

impl Arbitrary for Operation {
    fn arbitrary(g: &mut quickcheck::Gen) -> Self {
        let p = TestPrefix::arbitrary(g);
        if g.choose(&[
            true, true, true, true, true, true, true, false, false, false,
        ])
        .copied()
        .unwrap_or_default()
        {
            Self::Add(p, u32::arbitrary(g))
        } else {
            Self::Remove(p)
        }
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        match self {
            Operation::Add(p, t) => {
                let t = *t;
                Box::new(p.shrink().map(move |p| Operation::Add(p, t)))
            }
            Operation::Remove(p) => Box::new(p.shrink().map(Operation::Remove)),
        }
    }
}
