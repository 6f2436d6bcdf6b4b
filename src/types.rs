//! Type-safe wrappers for machine states, tape symbols and automaton states.
//!
//! These newtypes keep the three index spaces of the product system apart,
//! so a Turing machine state can never be used to index an automaton and
//! vice versa.
use std::fmt;

/// Integer weight carried by automaton edges and accept-set bounds.
pub type Weight = i64;

/// Largest weight allowed anywhere in a certificate.
///
/// Half of the native range is kept as headroom, so that the sum or
/// difference of two guarded weights never wraps before it is checked.
pub const MAX_WEIGHT: Weight = Weight::MAX >> 1;

/// Smallest weight allowed anywhere in a certificate.
pub const MIN_WEIGHT: Weight = -MAX_WEIGHT - 1;

/// Checks that a weight lies in the safe range.
///
/// # Panics
///
/// Panics if `weight` is outside `MIN_WEIGHT..=MAX_WEIGHT`. Overflow means
/// either a malformed certificate or a bug, and neither may produce an answer.
pub fn check_weight(weight: Weight) -> Weight {
    assert!(
        (MIN_WEIGHT..=MAX_WEIGHT).contains(&weight),
        "possible integer overflow detected"
    );
    weight
}

/// Adds two weights, aborting on overflow of the safe range.
pub fn weight_add(a: Weight, b: Weight) -> Weight {
    match a.checked_add(b) {
        Some(sum) => check_weight(sum),
        None => panic!("possible integer overflow detected"),
    }
}

/// Subtracts two weights, aborting on overflow of the safe range.
pub fn weight_sub(a: Weight, b: Weight) -> Weight {
    match a.checked_sub(b) {
        Some(diff) => check_weight(diff),
        None => panic!("possible integer overflow detected"),
    }
}

/// A Turing machine state (0-indexed).
///
/// State 0 is the start state. Displayed as a letter (`A`, `B`, ...), which
/// is the conventional notation and nothing more.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct TmState(pub usize);

impl TmState {
    /// The state every run starts in.
    pub const START: TmState = TmState(0);

    /// Returns the raw state index.
    pub fn index(self) -> usize {
        self.0
    }

    /// Parses a state letter (`A` = 0).
    pub fn from_letter(letter: u8) -> Option<Self> {
        letter.is_ascii_uppercase().then(|| TmState((letter - b'A') as usize))
    }
}

impl fmt::Display for TmState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 < 26 {
            write!(f, "{}", (b'A' + self.0 as u8) as char)
        } else {
            write!(f, "[{}]", self.0)
        }
    }
}

/// A tape symbol (0-indexed).
///
/// Symbol 0 is the blank symbol the tape is initially filled with.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Symbol(pub usize);

impl Symbol {
    /// The blank symbol.
    pub const BLANK: Symbol = Symbol(0);

    /// Returns the raw symbol index.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A state of a weighted automaton (0-indexed).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct WfaState(pub usize);

impl WfaState {
    /// Returns the raw state index.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for WfaState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Head movement of a Turing machine step.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Direction {
    Left,
    Right,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Left => write!(f, "L"),
            Direction::Right => write!(f, "R"),
        }
    }
}

/// Which half of the tape (and hence which automaton) is meant.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Side {
    Left,
    Right,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => write!(f, "left"),
            Side::Right => write!(f, "right"),
        }
    }
}
