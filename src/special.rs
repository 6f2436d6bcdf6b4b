//! Sign-monotone state classification.
//!
//! A state is *non-negative* if no run of the automaton can pass through a
//! negative-weight edge and then end in that state, and *non-positive*
//! symmetrically. The classification is conservative: a state outside a set
//! may still be sign-monotone. It is only used to clamp accept-set bounds
//! towards zero, never to loosen them.

use std::collections::{BTreeSet, VecDeque};
use std::fmt;

use crate::types::{Weight, WfaState};
use crate::wfa::Wfa;

#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct SpecialSets {
    pub non_negative: BTreeSet<WfaState>,
    pub non_positive: BTreeSet<WfaState>,
}

impl SpecialSets {
    pub fn new(non_negative: &[usize], non_positive: &[usize]) -> Self {
        Self {
            non_negative: non_negative.iter().copied().map(WfaState).collect(),
            non_positive: non_positive.iter().copied().map(WfaState).collect(),
        }
    }

    pub fn is_non_negative(&self, state: WfaState) -> bool {
        self.non_negative.contains(&state)
    }

    pub fn is_non_positive(&self, state: WfaState) -> bool {
        self.non_positive.contains(&state)
    }

    /// Derives the special sets of an automaton.
    ///
    /// Every target of a negative edge may carry a negative contribution, and
    /// so may everything reachable from it; the same holds for positive edges.
    /// The complements of those two closures are the special sets.
    pub fn derive(wfa: &Wfa) -> Self {
        let possibly_negative = closure(wfa, |w| w < 0);
        let possibly_positive = closure(wfa, |w| w > 0);
        let all = (0..wfa.states).map(WfaState);
        Self {
            non_negative: all.clone().filter(|s| !possibly_negative.contains(s)).collect(),
            non_positive: all.filter(|s| !possibly_positive.contains(s)).collect(),
        }
    }
}

/// Forward closure of the targets of all edges whose weight satisfies `seed`.
fn closure(wfa: &Wfa, seed: impl Fn(Weight) -> bool) -> BTreeSet<WfaState> {
    let mut set = BTreeSet::new();
    let mut queue = VecDeque::new();
    for (_, t) in wfa.edges() {
        if seed(t.weight) && set.insert(t.target) {
            queue.push_back(t.target);
        }
    }
    while let Some(state) = queue.pop_front() {
        for t in wfa.transitions.get(state.index()).into_iter().flatten().flatten() {
            if set.insert(t.target) {
                queue.push_back(t.target);
            }
        }
    }
    set
}

fn write_states(f: &mut fmt::Formatter<'_>, states: &BTreeSet<WfaState>) -> fmt::Result {
    for (i, state) in states.iter().enumerate() {
        if i > 0 {
            write!(f, ",")?;
        }
        write!(f, "{}", state)?;
    }
    Ok(())
}

impl fmt::Display for SpecialSets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_states(f, &self.non_negative)?;
        write!(f, "_")?;
        write_states(f, &self.non_positive)
    }
}
