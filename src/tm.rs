//! Turing machines with a partial transition table.

use std::fmt;

use crate::types::{Direction, Symbol, TmState};

/// The action taken when a state reads a symbol.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct TmTransition {
    pub write: Symbol,
    pub direction: Direction,
    pub next: TmState,
}

impl TmTransition {
    pub fn new(write: usize, direction: Direction, next: usize) -> Self {
        Self {
            write: Symbol(write),
            direction,
            next: TmState(next),
        }
    }
}

/// A Turing machine.
///
/// `transitions[state][symbol]` is `None` when the machine halts on reading
/// `symbol` in `state`. The shape of the table is not enforced here: a record
/// read from the outside may be inconsistent, and the verifier is the one
/// judging that.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct TuringMachine {
    pub states: usize,
    pub symbols: usize,
    pub transitions: Vec<Vec<Option<TmTransition>>>,
}

impl TuringMachine {
    /// Creates a machine that halts everywhere.
    pub fn new(states: usize, symbols: usize) -> Self {
        Self {
            states,
            symbols,
            transitions: vec![vec![None; symbols]; states],
        }
    }

    /// Builder-style helper setting one table entry.
    pub fn with(mut self, state: usize, symbol: usize, transition: TmTransition) -> Self {
        self.transitions[state][symbol] = Some(transition);
        self
    }

    /// Looks up the table entry, treating anything out of range as a halt.
    pub fn transition(&self, state: TmState, symbol: Symbol) -> Option<TmTransition> {
        self.transitions
            .get(state.index())
            .and_then(|row| row.get(symbol.index()))
            .copied()
            .flatten()
    }

    /// Returns `true` if the machine stops after reading `symbol` in `state`,
    /// either because the entry is undefined or because it leads to a state
    /// that does not exist.
    pub fn halts_next_step(&self, state: TmState, symbol: Symbol) -> bool {
        match self.transition(state, symbol) {
            None => true,
            Some(t) => t.next.index() >= self.states,
        }
    }
}

impl fmt::Display for TuringMachine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.transitions.iter().enumerate() {
            if i > 0 {
                write!(f, "_")?;
            }
            for entry in row {
                match entry {
                    Some(t) if t.next.index() < self.states => {
                        write!(f, "{}{}{}", t.write, t.direction, t.next)?
                    }
                    _ => write!(f, "---")?,
                }
            }
        }
        Ok(())
    }
}
