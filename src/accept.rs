//! Construction of a forward-closed accept set for fixed automata.
//!
//! Starting from the initial configuration with the accumulator at exactly 0,
//! bounds are pushed through the product until nothing changes. Exact
//! propagation would not terminate on automata whose weights drift, so merging
//! a looser bound into an entry *widens* it:
//!
//! - if the resulting interval stays finite and at most [`WIDENING_LIMIT`]
//!   wide, the looser value is kept;
//! - otherwise the bound is dropped, unless the special sets pin it at 0, in
//!   which case it becomes 0.
//!
//! Every widening step makes an interval strictly wider, and a finite interval
//! can only grow up to the limit, so the fixed point is reached. The result is
//! forward-closed by construction, except for successors whose propagated
//! interval is empty: no trajectory reaches those.

use std::collections::VecDeque;

use log::{debug, trace};

use crate::bounds::{propagate, AcceptSet, Bounds, Propagated};
use crate::config::Config;
use crate::product::next_configs;
use crate::special::SpecialSets;
use crate::tm::TuringMachine;
use crate::types::Weight;
use crate::wfa::Wfa;

/// Widest finite interval that widening keeps instead of dropping a bound.
pub const WIDENING_LIMIT: Weight = 10;

/// Builds the accept set for the given automata.
///
/// Returns an empty set if a configuration reachable under the bounds is a
/// halting one.
pub fn find_accept_set(
    tm: &TuringMachine,
    left: &Wfa,
    right: &Wfa,
    left_special: &SpecialSets,
    right_special: &SpecialSets,
) -> AcceptSet {
    let initial = Config::initial(left.start, right.start);
    let mut accept = AcceptSet::new();
    accept.insert(initial, Bounds::zero());
    let mut queue = VecDeque::from([initial]);

    while let Some(config) = queue.pop_front() {
        let Some(&bounds) = accept.get(&config) else {
            continue;
        };
        if tm.halts_next_step(config.tm_state, config.tm_symbol) {
            debug!("accept set: halting configuration {} is reachable", config);
            return AcceptSet::new();
        }

        let mut steps = next_configs(&config, tm, left, right);
        steps.sort();
        for step in steps {
            let next = propagate(&bounds, &step, left_special, right_special);
            if next.bounds.is_empty() {
                trace!("accept set: {} unreachable from {} [{}]", step.config, config, bounds);
                continue;
            }
            if merge(&mut accept, step.config, &next) {
                trace!("accept set: {} -> [{}]", step.config, accept.get(&step.config).copied().unwrap_or_default());
                queue.push_back(step.config);
            }
        }
    }

    debug!("accept set: {} configurations", accept.len());
    accept
}

/// Merges propagated bounds into the entry for `config`, widening it when
/// needed. Returns `true` if the entry was created or changed.
fn merge(accept: &mut AcceptSet, config: Config, next: &Propagated) -> bool {
    let Some(entry) = accept.get_mut(&config) else {
        accept.insert(config, next.bounds);
        return true;
    };

    // The interval the entry would span if both sides took the looser value.
    let lower_join = entry.lower.zip(next.bounds.lower).map(|(a, b)| a.min(b));
    let upper_join = entry.upper.zip(next.bounds.upper).map(|(a, b)| a.max(b));

    let mut changed = false;
    if let Some(lower) = entry.lower {
        if next.bounds.lower.map_or(true, |l| l < lower) {
            entry.lower = match (next.bounds.lower, upper_join) {
                (Some(l), Some(u)) if u - l <= WIDENING_LIMIT => Some(l),
                _ if next.hard_lower => Some(0),
                _ => None,
            };
            changed = true;
        }
    }
    if let Some(upper) = entry.upper {
        if next.bounds.upper.map_or(true, |u| u > upper) {
            entry.upper = match (lower_join, next.bounds.upper) {
                (Some(l), Some(u)) if u - l <= WIDENING_LIMIT => Some(u),
                _ if next.hard_upper => Some(0),
                _ => None,
            };
            changed = true;
        }
    }
    changed
}
