//! The product of a Turing machine with the two tape automata.
//!
//! When the head moves left, the cell it lands on was the first cell read by
//! the left automaton; the left automaton's current state was produced by an
//! edge labelled with that cell's symbol. We do not know which one, so every
//! edge *entering* the current left state is a possible predecessor. On the
//! right side the written symbol is pushed in front of the right half, which
//! advances the right automaton deterministically. Moving right is the mirror
//! image.
//!
//! ```text
//!   left half  <- [L]  head  [R] ->  right half
//!   L: x --a/w_L--> l     (enumerated, l = current left state)
//!   R: r --b/w_R--> r'    (deterministic, b = written symbol)
//!   delta = w_R - w_L
//! ```

use std::collections::{HashSet, VecDeque};

use log::trace;

use crate::config::{Config, ConfigStep};
use crate::tm::TuringMachine;
use crate::types::{weight_sub, Direction, Side, Symbol, WfaState};
use crate::wfa::Wfa;

/// An undecided edge that the product needs.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct BreakingTransition {
    pub side: Side,
    pub source: WfaState,
    pub symbol: Symbol,
}

/// Outcome of the structural closure check.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Closure {
    /// Every reachable configuration only needs decided edges.
    Closed,
    /// The first undecided edge met during the search.
    Open(BreakingTransition),
}

/// Computes the successors of `config`, or the undecided edge that blocks them.
///
/// Successors come out in `(source, symbol)` order of the enumerated edges.
/// A halting configuration has no successors.
pub fn successors(
    config: &Config,
    tm: &TuringMachine,
    left: &Wfa,
    right: &Wfa,
) -> Result<Vec<ConfigStep>, BreakingTransition> {
    let Some(step) = tm.transition(config.tm_state, config.tm_symbol) else {
        return Ok(Vec::new());
    };

    // The automaton we walk back on, and the one we advance.
    let (back, ahead, back_state, ahead_state, ahead_side) = match step.direction {
        Direction::Left => (left, right, config.left, config.right, Side::Right),
        Direction::Right => (right, left, config.right, config.left, Side::Left),
    };

    let mut result = Vec::new();
    for (edge, back_t) in back.preimage(back_state) {
        let Some(ahead_t) = ahead.transition(ahead_state, step.write) else {
            return Err(BreakingTransition {
                side: ahead_side,
                source: ahead_state,
                symbol: step.write,
            });
        };
        let delta = weight_sub(ahead_t.weight, back_t.weight);
        let (next_left, next_right) = match step.direction {
            Direction::Left => (edge.source, ahead_t.target),
            Direction::Right => (ahead_t.target, edge.source),
        };
        let next = Config {
            tm_state: step.next,
            tm_symbol: edge.symbol,
            left: next_left,
            right: next_right,
        };
        result.push(ConfigStep::new(next, delta));
    }
    Ok(result)
}

/// Computes the successors of `config` in a pair of total automata.
///
/// An undecided edge yields no successors; use [`successors`] when the
/// automata may be partial.
pub fn next_configs(config: &Config, tm: &TuringMachine, left: &Wfa, right: &Wfa) -> Vec<ConfigStep> {
    successors(config, tm, left, right).unwrap_or_default()
}

/// Explores the product from the initial configuration, ignoring weights,
/// and reports the first undecided edge it needs.
pub fn check_closure(tm: &TuringMachine, left: &Wfa, right: &Wfa) -> Closure {
    let initial = Config::initial(left.start, right.start);
    let mut visited = HashSet::from([initial]);
    let mut queue = VecDeque::from([initial]);

    while let Some(config) = queue.pop_front() {
        trace!("closure: visiting {}", config);
        match successors(&config, tm, left, right) {
            Ok(steps) => {
                for step in steps {
                    if visited.insert(step.config) {
                        queue.push_back(step.config);
                    }
                }
            }
            Err(breaking) => return Closure::Open(breaking),
        }
    }
    Closure::Closed
}
