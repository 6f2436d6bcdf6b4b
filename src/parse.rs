//! Text formats of machines, automata and certificates.
//!
//! # Machine
//!
//! ```text
//! 1RB1LA_0LA0RB
//! ```
//!
//! One `_`-separated group per state, three characters per symbol: the symbol
//! to write, the direction and the next state letter. A triple whose state
//! letter is not a state of the machine (`---`, `1RZ`) is undefined.
//!
//! # Automaton
//!
//! ```text
//! 0,0;1,0_2,0;1,1_2,0;2,0
//! ```
//!
//! One `_`-separated group per state, one `;`-separated `target,weight` edge
//! per symbol. The start state is 0. `-,-` is an undecided edge.
//!
//! # Special sets
//!
//! ```text
//! 0,1,2_0
//! ```
//!
//! The non-negative states, `_`, the non-positive states.
//!
//! # Accept set
//!
//! ```text
//! A,0,0,0,0,-_B,1,0,2,2,-
//! ```
//!
//! One `_`-separated entry per configuration: state letter, symbol, left
//! state, right state, lower bound, upper bound; `-` is an absent bound.
//!
//! # Certificates
//!
//! A full certificate is six consecutive lines (machine, left automaton,
//! right automaton, left special sets, right special sets, accept set), a
//! short certificate the first three of them.

use std::fmt;
use std::str::FromStr;

use crate::bounds::{AcceptSet, Bounds};
use crate::certificate::{Certificate, ShortCertificate};
use crate::config::Config;
use crate::special::SpecialSets;
use crate::tm::{TmTransition, TuringMachine};
use crate::types::{Direction, Symbol, TmState, Weight, WfaState, MAX_WEIGHT, MIN_WEIGHT};
use crate::wfa::{Wfa, WfaTransition};

/// Records per full certificate.
pub const FULL_CERTIFICATE_LINES: usize = 6;

/// Records per short certificate.
pub const SHORT_CERTIFICATE_LINES: usize = 3;

/// Error type for malformed records.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum ParseError {
    Machine(String),
    Automaton(String),
    SpecialSets(String),
    AcceptSet(String),
    /// A certificate with the wrong number of records.
    RecordCount { expected: usize, found: usize },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Machine(s) => write!(f, "couldn't parse TM: {:?}", s),
            ParseError::Automaton(s) => write!(f, "couldn't parse WFA: {:?}", s),
            ParseError::SpecialSets(s) => write!(f, "couldn't parse special sets: {:?}", s),
            ParseError::AcceptSet(s) => write!(f, "couldn't parse accept set: {:?}", s),
            ParseError::RecordCount { expected, found } => {
                write!(f, "expected {} certificate lines, found {}", expected, found)
            }
        }
    }
}

impl std::error::Error for ParseError {}

impl FromStr for TuringMachine {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseError::Machine(s.to_string());
        let rows: Vec<&[u8]> = s.split('_').map(str::as_bytes).collect();
        let states = rows.len();
        let width = rows[0].len();
        if states < 2 || width == 0 || width % 3 != 0 {
            return Err(err());
        }
        let symbols = width / 3;

        let mut tm = TuringMachine::new(states, symbols);
        for (state, row) in rows.iter().enumerate() {
            if row.len() != width {
                return Err(err());
            }
            for (symbol, triple) in row.chunks(3).enumerate() {
                let next = match TmState::from_letter(triple[2]) {
                    Some(next) if next.index() < states => next,
                    _ => continue,
                };
                let write = match triple[0] {
                    b @ b'0'..=b'9' if ((b - b'0') as usize) < symbols => (b - b'0') as usize,
                    _ => return Err(err()),
                };
                let direction = match triple[1] {
                    b'L' => Direction::Left,
                    b'R' => Direction::Right,
                    _ => return Err(err()),
                };
                tm.transitions[state][symbol] = Some(TmTransition::new(write, direction, next.index()));
            }
        }
        Ok(tm)
    }
}

fn parse_weight(s: &str) -> Option<Weight> {
    s.parse::<Weight>()
        .ok()
        .filter(|w| (MIN_WEIGHT..=MAX_WEIGHT).contains(w))
}

fn parse_bound(s: &str) -> Option<Option<Weight>> {
    match s {
        "-" => Some(None),
        _ => parse_weight(s).map(Some),
    }
}

impl FromStr for Wfa {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseError::Automaton(s.to_string());
        let mut transitions = Vec::new();
        for row in s.split('_') {
            let mut edges = Vec::new();
            for edge in row.split(';') {
                let (target, weight) = edge.split_once(',').ok_or_else(err)?;
                if target == "-" && weight == "-" {
                    edges.push(None);
                    continue;
                }
                let target = target.parse().map_err(|_| err())?;
                let weight = parse_weight(weight).ok_or_else(err)?;
                edges.push(Some(WfaTransition::new(target, weight)));
            }
            transitions.push(edges);
        }
        let symbols = transitions[0].len();
        if transitions.iter().any(|row| row.len() != symbols) {
            return Err(err());
        }
        Ok(Wfa {
            states: transitions.len(),
            symbols,
            start: WfaState(0),
            transitions,
        })
    }
}

fn parse_state_list(s: &str) -> Option<Vec<usize>> {
    if s.is_empty() {
        return Some(Vec::new());
    }
    s.split(',').map(|state| state.parse().ok()).collect()
}

impl FromStr for SpecialSets {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseError::SpecialSets(s.to_string());
        let (non_negative, non_positive) = s.split_once('_').ok_or_else(err)?;
        let non_negative = parse_state_list(non_negative).ok_or_else(err)?;
        let non_positive = parse_state_list(non_positive).ok_or_else(err)?;
        Ok(SpecialSets::new(&non_negative, &non_positive))
    }
}

fn parse_accept_entry(s: &str) -> Option<(Config, Bounds)> {
    let fields: Vec<&str> = s.split(',').collect();
    let [state, symbol, left, right, lower, upper] = fields.as_slice() else {
        return None;
    };
    let tm_state = match state.as_bytes() {
        [letter] => TmState::from_letter(*letter)?,
        _ => return None,
    };
    let config = Config {
        tm_state,
        tm_symbol: Symbol(symbol.parse().ok()?),
        left: WfaState(left.parse().ok()?),
        right: WfaState(right.parse().ok()?),
    };
    Some((config, Bounds::new(parse_bound(lower)?, parse_bound(upper)?)))
}

impl FromStr for AcceptSet {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Ok(AcceptSet::new());
        }
        s.split('_')
            .map(|entry| parse_accept_entry(entry).ok_or_else(|| ParseError::AcceptSet(s.to_string())))
            .collect()
    }
}

fn check_count(lines: &[&str], expected: usize) -> Result<(), ParseError> {
    if lines.len() != expected {
        return Err(ParseError::RecordCount {
            expected,
            found: lines.len(),
        });
    }
    Ok(())
}

/// Parses the six records of a full certificate.
pub fn parse_full_certificate(lines: &[&str]) -> Result<Certificate, ParseError> {
    check_count(lines, FULL_CERTIFICATE_LINES)?;
    Ok(Certificate {
        tm: lines[0].trim().parse()?,
        left: lines[1].trim().parse()?,
        right: lines[2].trim().parse()?,
        left_special: lines[3].trim().parse()?,
        right_special: lines[4].trim().parse()?,
        accept: lines[5].trim().parse()?,
    })
}

/// Parses the three records of a short certificate.
pub fn parse_short_certificate(lines: &[&str]) -> Result<ShortCertificate, ParseError> {
    check_count(lines, SHORT_CERTIFICATE_LINES)?;
    Ok(ShortCertificate {
        tm: lines[0].trim().parse()?,
        left: lines[1].trim().parse()?,
        right: lines[2].trim().parse()?,
    })
}

fn record_lines(s: &str) -> Vec<&str> {
    s.lines().map(str::trim).filter(|line| !line.is_empty()).collect()
}

impl FromStr for Certificate {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_full_certificate(&record_lines(s))
    }
}

impl FromStr for ShortCertificate {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_short_certificate(&record_lines(s))
    }
}
