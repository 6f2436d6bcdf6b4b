//! Deterministic weighted finite automata.
//!
//! A [`Wfa`] reads one half of the tape, starting at the cell next to the head
//! and moving away from it. Its state after reading the (infinite, eventually
//! blank) half summarizes that half; the sum of the weights along the way is
//! the half's contribution to the accumulator that the accept set bounds.
//!
//! During the search an automaton is built incrementally, so each edge is an
//! `Option<WfaTransition>`: `None` means the edge has not been decided yet.
//! A finished automaton is total; [`Wfa::completed`] turns a partial one into a
//! total one by routing every undecided edge into a fresh zero-weight sink.

use std::fmt;

use crate::types::{weight_add, Symbol, Weight, WfaState};

/// The target and weight of one automaton edge.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct WfaTransition {
    pub target: WfaState,
    pub weight: Weight,
}

impl WfaTransition {
    pub fn new(target: usize, weight: Weight) -> Self {
        Self {
            target: WfaState(target),
            weight,
        }
    }
}

/// An edge of the automaton, identified by its source and label.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct EdgeKey {
    pub source: WfaState,
    pub symbol: Symbol,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Wfa {
    pub states: usize,
    pub symbols: usize,
    pub start: WfaState,
    /// `transitions[state][symbol]`, `None` while undecided.
    pub transitions: Vec<Vec<Option<WfaTransition>>>,
}

impl Wfa {
    /// Creates the seed automaton of the search: a single start state that
    /// loops on the blank symbol with weight 0, every other edge undecided.
    pub fn seed(symbols: usize) -> Self {
        let mut row = vec![None; symbols];
        if let Some(blank) = row.first_mut() {
            *blank = Some(WfaTransition::new(0, 0));
        }
        Self {
            states: 1,
            symbols,
            start: WfaState(0),
            transitions: vec![row],
        }
    }

    /// Builds a total automaton from `(target, weight)` rows, start state 0.
    pub fn from_rows(rows: &[&[(usize, Weight)]]) -> Self {
        let symbols = rows.first().map_or(0, |row| row.len());
        let transitions = rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|&(target, weight)| Some(WfaTransition::new(target, weight)))
                    .collect()
            })
            .collect();
        Self {
            states: rows.len(),
            symbols,
            start: WfaState(0),
            transitions,
        }
    }

    /// Returns the edge leaving `state` on `symbol`, if it is decided and exists.
    pub fn transition(&self, state: WfaState, symbol: Symbol) -> Option<WfaTransition> {
        self.transitions
            .get(state.index())
            .and_then(|row| row.get(symbol.index()))
            .copied()
            .flatten()
    }

    /// Iterates over all decided edges in `(source, symbol)` order.
    pub fn edges(&self) -> impl Iterator<Item = (EdgeKey, WfaTransition)> + '_ {
        self.transitions.iter().enumerate().flat_map(|(source, row)| {
            row.iter().enumerate().filter_map(move |(symbol, t)| {
                t.map(|t| {
                    let key = EdgeKey {
                        source: WfaState(source),
                        symbol: Symbol(symbol),
                    };
                    (key, t)
                })
            })
        })
    }

    /// Iterates over the decided edges entering `target`, in `(source, symbol)` order.
    pub fn preimage(&self, target: WfaState) -> impl Iterator<Item = (EdgeKey, WfaTransition)> + '_ {
        self.edges().filter(move |(_, t)| t.target == target)
    }

    /// Number of decided edges.
    pub fn decided(&self) -> usize {
        self.transitions.iter().flatten().filter(|t| t.is_some()).count()
    }

    pub fn is_total(&self) -> bool {
        self.transitions.iter().flatten().all(|t| t.is_some())
    }

    /// Appends a state whose edges are all undecided.
    pub fn add_state(&mut self) -> WfaState {
        self.transitions.push(vec![None; self.symbols]);
        self.states += 1;
        WfaState(self.states - 1)
    }

    /// Removes the most recently added state.
    pub fn pop_state(&mut self) {
        self.transitions.pop();
        self.states -= 1;
    }

    pub fn set(&mut self, key: EdgeKey, transition: Option<WfaTransition>) {
        self.transitions[key.source.index()][key.symbol.index()] = transition;
    }

    /// Adds `delta` to the weight of a decided edge.
    pub fn adjust_weight(&mut self, key: EdgeKey, delta: Weight) {
        if let Some(t) = &mut self.transitions[key.source.index()][key.symbol.index()] {
            t.weight = weight_add(t.weight, delta);
        }
    }

    /// Returns a total copy of the automaton.
    ///
    /// If any edge is undecided, one extra state is appended: every undecided
    /// edge leads to it with weight 0 and all its own edges loop with weight 0.
    pub fn completed(&self) -> Wfa {
        if self.is_total() {
            return self.clone();
        }
        let sink = self.states;
        let mut transitions: Vec<Vec<Option<WfaTransition>>> = self
            .transitions
            .iter()
            .map(|row| {
                row.iter()
                    .map(|t| Some(t.unwrap_or(WfaTransition::new(sink, 0))))
                    .collect()
            })
            .collect();
        transitions.push(vec![Some(WfaTransition::new(sink, 0)); self.symbols]);
        Wfa {
            states: self.states + 1,
            symbols: self.symbols,
            start: self.start,
            transitions,
        }
    }
}

impl fmt::Display for Wfa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.transitions.iter().enumerate() {
            if i > 0 {
                write!(f, "_")?;
            }
            for (j, t) in row.iter().enumerate() {
                if j > 0 {
                    write!(f, ";")?;
                }
                match t {
                    Some(t) => write!(f, "{},{}", t.target, t.weight)?,
                    None => write!(f, "-,-")?,
                }
            }
        }
        Ok(())
    }
}
