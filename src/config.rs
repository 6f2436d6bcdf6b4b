//! Nodes of the product system.

use std::fmt;

use crate::types::{Symbol, TmState, Weight, WfaState};

/// A product configuration: machine state, symbol under the head, and the
/// states the two automata reach on their halves of the tape.
///
/// The derived order (state, symbol, left, right) is the canonical order used
/// wherever iteration order influences results.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Config {
    pub tm_state: TmState,
    pub tm_symbol: Symbol,
    pub left: WfaState,
    pub right: WfaState,
}

impl Config {
    pub fn new(tm_state: usize, tm_symbol: usize, left: usize, right: usize) -> Self {
        Self {
            tm_state: TmState(tm_state),
            tm_symbol: Symbol(tm_symbol),
            left: WfaState(left),
            right: WfaState(right),
        }
    }

    /// The configuration of a fresh run: start state, blank symbol, both
    /// automata in their start states.
    pub fn initial(left_start: WfaState, right_start: WfaState) -> Self {
        Self {
            tm_state: TmState::START,
            tm_symbol: Symbol::BLANK,
            left: left_start,
            right: right_start,
        }
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{},{}", self.tm_state, self.tm_symbol, self.left, self.right)
    }
}

/// A successor configuration together with the change of the accumulator.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ConfigStep {
    pub config: Config,
    pub delta: Weight,
}

impl ConfigStep {
    pub fn new(config: Config, delta: Weight) -> Self {
        Self { config, delta }
    }
}
