//! # mitm-wfar: non-halting proofs with weighted automata
//!
//! **`mitm-wfar`** proves that Turing machines never halt, using the
//! *meet-in-the-middle weighted finite automata reduction*. It contains a
//! search procedure that looks for a proof and an independent checker that
//! validates proofs from any source.
//!
//! ## The proof technique
//!
//! A tape is cut at the head into a left and a right half. Each half is read,
//! away from the head, by a deterministic weighted automaton; the state it
//! ends in summarizes the half and the weights along the way add up to an
//! integer. A *configuration* is the machine state, the symbol under the head
//! and the two automaton states. An *accept set* assigns weight bounds to
//! configurations; if it
//!
//! - contains the initial configuration with 0 within bounds,
//! - contains no configuration in which the machine halts, and
//! - is closed under every step of the machine,
//!
//! then no run from the blank tape ever halts.
//!
//! ## Basic Usage
//!
//! ```rust
//! use mitm_wfar::decider::{decide, Budget};
//! use mitm_wfar::tm::TuringMachine;
//! use mitm_wfar::verifier::verify;
//!
//! // A: write 1, move right, stay in A.
//! let tm: TuringMachine = "1RA---_------".parse().unwrap();
//!
//! let cert = decide(&tm, &Budget::new(3, 2, 2, 0)).expect("non-halting");
//! assert!(verify(&cert));
//! ```
//!
//! ## Core Components
//!
//! - **[`product`]**: successors of a configuration, and the structural closure check.
//! - **[`accept`]**: fixed-point construction of an accept set with bound widening.
//! - **[`decider`]**: the backtracking search over automaton structure and weights.
//! - **[`verifier`]**: trust-nothing certificate validation.
//! - **[`runner`]**: a concurrent driver over streams of machines or certificates.
//!
//! Weights are plain `i64` values kept within half of the native range; any
//! arithmetic leaving that range panics instead of producing an answer.

pub mod accept;
pub mod bounds;
pub mod certificate;
pub mod config;
pub mod decider;
pub mod dot;
pub mod parse;
pub mod product;
pub mod runner;
pub mod special;
pub mod tm;
pub mod types;
pub mod verifier;
pub mod wfa;
