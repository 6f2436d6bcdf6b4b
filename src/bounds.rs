//! Weight bounds and the accept set.
//!
//! The accept set maps each accepted configuration to an interval of values
//! the accumulator may take there. An absent side of the interval is
//! unbounded. Propagating an interval along a product step shifts it by the
//! step's weight change and then clamps it using the special sets of both
//! automata; builder and verifier share that exact rule through [`propagate`].

use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fmt;

use crate::config::{Config, ConfigStep};
use crate::special::SpecialSets;
use crate::types::{check_weight, weight_add, Weight};

/// Lower and upper bound on the accumulator; `None` is unbounded.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct Bounds {
    pub lower: Option<Weight>,
    pub upper: Option<Weight>,
}

impl Bounds {
    pub fn new(lower: Option<Weight>, upper: Option<Weight>) -> Self {
        Self { lower, upper }
    }

    /// `[0, 0]`, the bounds of the initial configuration.
    pub fn zero() -> Self {
        Self::new(Some(0), Some(0))
    }

    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn at_least(lower: Weight) -> Self {
        Self::new(Some(lower), None)
    }

    /// Returns `true` if no value satisfies both bounds.
    pub fn is_empty(&self) -> bool {
        matches!((self.lower, self.upper), (Some(l), Some(u)) if u < l)
    }

    /// Returns `true` if `value` lies within the bounds.
    pub fn admits(&self, value: Weight) -> bool {
        self.lower.map_or(true, |l| l <= value) && self.upper.map_or(true, |u| value <= u)
    }

    /// Returns `true` if these bounds are at least as permissive as `other`.
    pub fn covers(&self, other: &Bounds) -> bool {
        let lower_ok = match (self.lower, other.lower) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some(a), Some(b)) => a <= b,
        };
        let upper_ok = match (self.upper, other.upper) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some(a), Some(b)) => a >= b,
        };
        lower_ok && upper_ok
    }

    /// Shifts both present bounds by `delta`.
    pub fn shifted(&self, delta: Weight) -> Bounds {
        Bounds {
            lower: self.lower.map(|l| weight_add(l, delta)),
            upper: self.upper.map(|u| weight_add(u, delta)),
        }
    }

    /// Runs every present bound through the overflow guard.
    pub fn check(&self) {
        for bound in [self.lower, self.upper].into_iter().flatten() {
            check_weight(bound);
        }
    }
}

impl fmt::Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.lower {
            Some(l) => write!(f, "{}", l)?,
            None => write!(f, "-")?,
        }
        match self.upper {
            Some(u) => write!(f, ",{}", u),
            None => write!(f, ",-"),
        }
    }
}

/// Bounds propagated into a successor configuration.
///
/// A side is *hard* when the successor's automaton states are both in the
/// matching special set: that bound is known to hold at 0 regardless of the
/// path taken, and widening may relax it to 0 but never drop it.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Propagated {
    pub bounds: Bounds,
    pub hard_lower: bool,
    pub hard_upper: bool,
}

/// Propagates `bounds` along `step` and clamps the result with the special sets.
pub fn propagate(
    bounds: &Bounds,
    step: &ConfigStep,
    left_special: &SpecialSets,
    right_special: &SpecialSets,
) -> Propagated {
    let mut next = bounds.shifted(step.delta);
    let target = &step.config;

    let hard_lower =
        left_special.is_non_negative(target.left) && right_special.is_non_negative(target.right);
    if hard_lower {
        next.lower = Some(next.lower.map_or(0, |l| l.max(0)));
    }
    let hard_upper =
        left_special.is_non_positive(target.left) && right_special.is_non_positive(target.right);
    if hard_upper {
        next.upper = Some(next.upper.map_or(0, |u| u.min(0)));
    }

    Propagated {
        bounds: next,
        hard_lower,
        hard_upper,
    }
}

/// Accepted configurations and their bounds, in canonical configuration order.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct AcceptSet(BTreeMap<Config, Bounds>);

impl AcceptSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, config: &Config) -> Option<&Bounds> {
        self.0.get(config)
    }

    pub fn get_mut(&mut self, config: &Config) -> Option<&mut Bounds> {
        self.0.get_mut(config)
    }

    pub fn insert(&mut self, config: Config, bounds: Bounds) -> Option<Bounds> {
        self.0.insert(config, bounds)
    }

    pub fn remove(&mut self, config: &Config) -> Option<Bounds> {
        self.0.remove(config)
    }

    pub fn contains(&self, config: &Config) -> bool {
        self.0.contains_key(config)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, Config, Bounds> {
        self.0.iter()
    }

    /// Returns `true` if `config` is accepted with bounds at least as
    /// permissive as `bounds`.
    pub fn accepts(&self, config: &Config, bounds: &Bounds) -> bool {
        self.get(config).is_some_and(|accepted| accepted.covers(bounds))
    }
}

impl FromIterator<(Config, Bounds)> for AcceptSet {
    fn from_iter<I: IntoIterator<Item = (Config, Bounds)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a AcceptSet {
    type Item = (&'a Config, &'a Bounds);
    type IntoIter = btree_map::Iter<'a, Config, Bounds>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Display for AcceptSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (config, bounds)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, "_")?;
            }
            write!(f, "{},{}", config, bounds)?;
        }
        Ok(())
    }
}
