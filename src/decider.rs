//! Meet-in-the-middle search for a non-halting certificate.
//!
//! Both automata start from [`Wfa::seed`]. The search alternates two phases:
//!
//! 1. **Structure.** While the product still needs an undecided edge, that
//!    edge is decided, first by pointing it to a fresh state (if the side has
//!    room), then to each existing state in turn. Every decision commits one
//!    transition; a branch succeeds structurally once the product is closed
//!    with exactly the requested number of committed transitions.
//! 2. **Weights.** The closed automata are completed, an accept set is built
//!    for them and the resulting certificate is verified. If that fails, up to
//!    `weight_pairs` times a `+1`/`-1` nudge is applied to one edge of each
//!    automaton and the certificate is rebuilt.
//!
//! The search is depth-first and stops at the first verified certificate.
//! Branches are explored by mutating one pair of automata in place and
//! undoing the change on the way back, so no table is copied per branch.

use log::{debug, trace};

use crate::certificate::{Certificate, ShortCertificate};
use crate::product::{check_closure, BreakingTransition, Closure};
use crate::tm::TuringMachine;
use crate::types::{Side, Symbol, Weight};
use crate::verifier::verify;
use crate::wfa::{EdgeKey, Wfa, WfaTransition};

/// Size limits of one decider run.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Budget {
    /// Exact number of committed transitions over both automata.
    pub transitions: usize,
    /// State budget of the left automaton, counting one reserved slot.
    pub left_states: usize,
    /// State budget of the right automaton, counting one reserved slot.
    pub right_states: usize,
    /// Number of weight nudges allowed on top of the all-zero weighting.
    pub weight_pairs: usize,
}

impl Budget {
    pub fn new(transitions: usize, left_states: usize, right_states: usize, weight_pairs: usize) -> Self {
        Self {
            transitions,
            left_states,
            right_states,
            weight_pairs,
        }
    }

    fn max_states(&self, side: Side) -> usize {
        match side {
            Side::Left => self.left_states,
            Side::Right => self.right_states,
        }
    }
}

impl Default for Budget {
    fn default() -> Self {
        Self::new(12, 4, 4, 1)
    }
}

/// The blank self-loops on the start states of both seeds.
const SEED_TRANSITIONS: usize = 2;

/// Searches for a certificate proving that `tm` never halts.
pub fn decide(tm: &TuringMachine, budget: &Budget) -> Option<Certificate> {
    let mut search = Search {
        tm,
        budget: *budget,
        left: Wfa::seed(tm.symbols),
        right: Wfa::seed(tm.symbols),
    };
    let result = search.grow(SEED_TRANSITIONS);
    match &result {
        Some(_) => debug!("decide {}: solved with {:?}", tm, budget),
        None => debug!("decide {}: nothing found with {:?}", tm, budget),
    }
    result
}

struct Search<'a> {
    tm: &'a TuringMachine,
    budget: Budget,
    left: Wfa,
    right: Wfa,
}

impl Search<'_> {
    fn wfa_mut(&mut self, side: Side) -> &mut Wfa {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }

    fn states(&self, side: Side) -> usize {
        match side {
            Side::Left => self.left.states,
            Side::Right => self.right.states,
        }
    }

    fn grow(&mut self, transitions: usize) -> Option<Certificate> {
        let breaking = match check_closure(self.tm, &self.left, &self.right) {
            Closure::Closed if transitions == self.budget.transitions => {
                return self.assign_weights(self.budget.weight_pairs, true);
            }
            Closure::Closed => return None,
            Closure::Open(breaking) => breaking,
        };
        if transitions >= self.budget.transitions {
            return None;
        }
        trace!(
            "decide {}: {} transitions, breaking {} {}/{}",
            self.tm,
            transitions,
            breaking.side,
            breaking.source,
            breaking.symbol
        );

        let BreakingTransition { side, source, symbol } = breaking;
        let key = EdgeKey { source, symbol };

        if self.states(side) + 1 < self.budget.max_states(side) {
            let wfa = self.wfa_mut(side);
            let fresh = wfa.add_state();
            wfa.set(key, Some(WfaTransition { target: fresh, weight: 0 }));
            let found = self.grow(transitions + 1);
            let wfa = self.wfa_mut(side);
            wfa.set(key, None);
            wfa.pop_state();
            if found.is_some() {
                return found;
            }
        }

        for target in 0..self.states(side) {
            self.wfa_mut(side).set(key, Some(WfaTransition::new(target, 0)));
            let found = self.grow(transitions + 1);
            self.wfa_mut(side).set(key, None);
            if found.is_some() {
                return found;
            }
        }
        None
    }

    fn assign_weights(&mut self, pairs: usize, first: bool) -> Option<Certificate> {
        let cert = ShortCertificate {
            tm: self.tm.clone(),
            left: self.left.completed(),
            right: self.right.completed(),
        }
        .complete();
        if verify(&cert) {
            return Some(cert);
        }
        if pairs == 0 {
            return None;
        }

        // Negating every weight maps solutions to solutions, so the first
        // nudge only needs one orientation.
        let signs: &[(Weight, Weight)] = if first { &[(1, -1)] } else { &[(1, -1), (-1, 1)] };
        let left_edges = adjustable_edges(&self.left);
        let right_edges = adjustable_edges(&self.right);
        for &(left_delta, right_delta) in signs {
            for &left_edge in &left_edges {
                for &right_edge in &right_edges {
                    self.left.adjust_weight(left_edge, left_delta);
                    self.right.adjust_weight(right_edge, right_delta);
                    let found = self.assign_weights(pairs - 1, false);
                    self.left.adjust_weight(left_edge, -left_delta);
                    self.right.adjust_weight(right_edge, -right_delta);
                    if found.is_some() {
                        return found;
                    }
                }
            }
        }
        None
    }
}

/// Decided edges whose weight the search may change: everything except the
/// blank self-loop of the start state.
fn adjustable_edges(wfa: &Wfa) -> Vec<EdgeKey> {
    wfa.edges()
        .map(|(key, _)| key)
        .filter(|key| !(key.source == wfa.start && key.symbol == Symbol::BLANK))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    use crate::tm::TmTransition;
    use crate::types::{Direction, WfaState};

    /// A0 -> 1RA, halts on 1 (never reached).
    fn writer() -> TuringMachine {
        TuringMachine::new(1, 2).with(0, 0, TmTransition::new(1, Direction::Right, 0))
    }

    #[test]
    fn test_budget_default() {
        assert_eq!(Budget::default(), Budget::new(12, 4, 4, 1));
    }

    #[test]
    fn test_adjustable_edges() {
        let wfa = Wfa::from_rows(&[&[(0, 0), (1, 0)], &[(1, 0), (0, 0)]]);
        let keys: Vec<_> = adjustable_edges(&wfa).into_iter().map(|k| (k.source.0, k.symbol.0)).collect();
        assert_eq!(keys, vec![(0, 1), (1, 0), (1, 1)]);
        assert!(adjustable_edges(&Wfa::seed(2)).is_empty());
    }

    #[test]
    fn test_closed_seed() {
        // A0 -> 0RA stays on blanks forever.
        let tm = TuringMachine::new(1, 2).with(0, 0, TmTransition::new(0, Direction::Right, 0));
        let cert = decide(&tm, &Budget::new(2, 2, 2, 0)).unwrap();
        assert!(verify(&cert));
        assert!(decide(&tm, &Budget::new(3, 2, 2, 0)).is_none());
    }

    #[test]
    fn test_merge_only() {
        let cert = decide(&writer(), &Budget::new(3, 2, 2, 0)).unwrap();
        assert!(verify(&cert));
        assert_eq!(cert.left.transition(WfaState(0), Symbol(1)), Some(WfaTransition::new(0, 0)));
        assert!(decide(&writer(), &Budget::new(4, 2, 2, 0)).is_none());
    }

    #[test]
    fn test_growth() {
        let cert = decide(&writer(), &Budget::new(4, 3, 3, 0)).unwrap();
        assert!(verify(&cert));
        assert_eq!(cert.left.transition(WfaState(0), Symbol(1)), Some(WfaTransition::new(1, 0)));
        assert_eq!(cert.left.transition(WfaState(1), Symbol(1)), Some(WfaTransition::new(0, 0)));
    }

    #[test]
    fn test_halting_machine() {
        // 1RB---_1LA---
        let tm = TuringMachine::new(2, 2)
            .with(0, 0, TmTransition::new(1, Direction::Right, 1))
            .with(1, 0, TmTransition::new(1, Direction::Left, 0));
        for transitions in 2..=6 {
            assert!(decide(&tm, &Budget::new(transitions, 3, 3, 1)).is_none());
        }
    }

    #[test]
    fn test_search_restores_seeds() {
        let tm = writer();
        let mut search = Search {
            tm: &tm,
            budget: Budget::new(5, 3, 3, 1),
            left: Wfa::seed(2),
            right: Wfa::seed(2),
        };
        assert!(search.grow(SEED_TRANSITIONS).is_none());
        assert_eq!(search.left, Wfa::seed(2));
        assert_eq!(search.right, Wfa::seed(2));
    }
}
