//! Certificate verification.
//!
//! [`verify`] runs every check in a fixed order and stops at the first one
//! that fails. The checks are independent functions so that they can be used
//! (and tested) on their own.
//!
//! Weights are run through the overflow guard while the definitions are
//! checked, and every weight change or shifted bound is guarded again in the
//! product; a certificate that could overflow makes the verifier panic rather
//! than answer.

use log::debug;

use crate::bounds::{propagate, AcceptSet, Bounds};
use crate::certificate::Certificate;
use crate::config::{Config, ConfigStep};
use crate::product::successors;
use crate::special::SpecialSets;
use crate::tm::TuringMachine;
use crate::types::{check_weight, Symbol};
use crate::wfa::Wfa;

/// Returns `true` if `cert` proves that its machine never halts.
pub fn verify(cert: &Certificate) -> bool {
    let checks: [(&str, &dyn Fn() -> bool); 8] = [
        ("coherent definitions", &|| verify_coherent_definitions(cert)),
        ("left leading blank", &|| verify_leading_blank_invariant(&cert.left)),
        ("right leading blank", &|| verify_leading_blank_invariant(&cert.right)),
        ("left special sets", &|| verify_special_sets_claims(&cert.left, &cert.left_special)),
        ("right special sets", &|| verify_special_sets_claims(&cert.right, &cert.right_special)),
        ("start configuration", &|| verify_start_config_accepted(&cert.left, &cert.right, &cert.accept)),
        ("no halting configuration", &|| verify_no_halting_config_accepted(&cert.tm, &cert.accept)),
        ("forward closure", &|| {
            verify_forward_closed(
                &cert.tm,
                &cert.left,
                &cert.right,
                &cert.left_special,
                &cert.right_special,
                &cert.accept,
            )
        }),
    ];
    for (name, check) in checks {
        if !check() {
            debug!("verify {}: {} check failed", cert.tm, name);
            return false;
        }
    }
    true
}

/// Checks that every component is well-formed and that they fit together.
pub fn verify_coherent_definitions(cert: &Certificate) -> bool {
    verify_valid_tm(&cert.tm)
        && verify_deterministic_wfa(&cert.left)
        && verify_deterministic_wfa(&cert.right)
        && verify_symbol_compatibility(&cert.tm, &cert.left, &cert.right)
        && verify_special_sets_are_subsets(&cert.left, &cert.left_special)
        && verify_special_sets_are_subsets(&cert.right, &cert.right_special)
        && verify_accept_set_is_valid(&cert.tm, &cert.left, &cert.right, &cert.accept)
}

pub fn verify_valid_tm(tm: &TuringMachine) -> bool {
    if tm.states == 0 || tm.symbols == 0 || tm.transitions.len() > tm.states {
        return false;
    }
    tm.transitions.iter().all(|row| {
        row.len() <= tm.symbols && row.iter().flatten().all(|t| t.write.index() < tm.symbols)
    })
}

/// Checks that the automaton is total and deterministic over its declared
/// states and symbols.
///
/// # Panics
///
/// Panics if an edge weight is outside the safe range.
pub fn verify_deterministic_wfa(wfa: &Wfa) -> bool {
    if wfa.states == 0 || wfa.symbols == 0 || wfa.start.index() >= wfa.states {
        return false;
    }
    if wfa.transitions.len() != wfa.states {
        return false;
    }
    for row in &wfa.transitions {
        if row.len() != wfa.symbols {
            return false;
        }
        for t in row {
            let Some(t) = t else {
                return false;
            };
            if t.target.index() >= wfa.states {
                return false;
            }
            check_weight(t.weight);
        }
    }
    true
}

pub fn verify_symbol_compatibility(tm: &TuringMachine, left: &Wfa, right: &Wfa) -> bool {
    tm.symbols == left.symbols && tm.symbols == right.symbols
}

pub fn verify_special_sets_are_subsets(wfa: &Wfa, sets: &SpecialSets) -> bool {
    sets.non_negative
        .iter()
        .chain(&sets.non_positive)
        .all(|s| s.index() < wfa.states)
}

/// Checks that every accepted configuration is in range and that its bounds
/// are ordered.
///
/// # Panics
///
/// Panics if a bound is outside the safe weight range.
pub fn verify_accept_set_is_valid(tm: &TuringMachine, left: &Wfa, right: &Wfa, accept: &AcceptSet) -> bool {
    accept.iter().all(|(config, bounds)| {
        if config.tm_state.index() >= tm.states
            || config.tm_symbol.index() >= tm.symbols
            || config.left.index() >= left.states
            || config.right.index() >= right.states
        {
            return false;
        }
        bounds.check();
        !bounds.is_empty()
    })
}

/// Checks that the start state loops on the blank symbol with weight 0, so
/// that the infinite blank tail is invisible to the automaton.
pub fn verify_leading_blank_invariant(wfa: &Wfa) -> bool {
    wfa.transition(wfa.start, Symbol::BLANK)
        .is_some_and(|t| t.target == wfa.start && t.weight == 0)
}

/// Checks that the special sets are closed backwards along every edge and
/// that edges into them have the right sign.
pub fn verify_special_sets_claims(wfa: &Wfa, sets: &SpecialSets) -> bool {
    wfa.edges().all(|(edge, t)| {
        let non_positive_ok = !sets.is_non_positive(t.target)
            || (sets.is_non_positive(edge.source) && t.weight <= 0);
        let non_negative_ok = !sets.is_non_negative(t.target)
            || (sets.is_non_negative(edge.source) && t.weight >= 0);
        non_positive_ok && non_negative_ok
    })
}

/// Checks that the initial configuration is accepted with 0 in its bounds.
pub fn verify_start_config_accepted(left: &Wfa, right: &Wfa, accept: &AcceptSet) -> bool {
    accept
        .get(&Config::initial(left.start, right.start))
        .is_some_and(|bounds| bounds.admits(0))
}

pub fn verify_no_halting_config_accepted(tm: &TuringMachine, accept: &AcceptSet) -> bool {
    accept.iter().all(|(config, _)| {
        config.tm_state.index() < tm.states && !tm.halts_next_step(config.tm_state, config.tm_symbol)
    })
}

/// Checks that every successor of every accepted configuration is accepted
/// with its propagated bounds. Fails if a successor needs an undecided edge.
pub fn verify_forward_closed(
    tm: &TuringMachine,
    left: &Wfa,
    right: &Wfa,
    left_special: &SpecialSets,
    right_special: &SpecialSets,
    accept: &AcceptSet,
) -> bool {
    accept.iter().all(|(config, bounds)| match successors(config, tm, left, right) {
        Ok(steps) => steps
            .iter()
            .all(|step| step_accepted(step, bounds, left_special, right_special, accept)),
        Err(breaking) => {
            debug!("{} needs undecided edge {:?}", config, breaking);
            false
        }
    })
}

/// Returns `true` if the successor `step`, entered with `bounds`, is covered
/// by the accept set. A successor whose propagated bounds are empty cannot be
/// reached and is accepted trivially.
pub fn step_accepted(
    step: &ConfigStep,
    bounds: &Bounds,
    left_special: &SpecialSets,
    right_special: &SpecialSets,
    accept: &AcceptSet,
) -> bool {
    let next = propagate(bounds, step, left_special, right_special);
    next.bounds.is_empty() || accept.accepts(&step.config, &next.bounds)
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    use crate::tm::TmTransition;
    use crate::types::{Direction, WfaState, MAX_WEIGHT};
    use crate::wfa::{EdgeKey, WfaTransition};

    /// Target of a transition into a state the machine does not have.
    const HALT: usize = 25;

    fn tm() -> TuringMachine {
        // 1RB1LB_1LA1RZ
        TuringMachine::new(2, 2)
            .with(0, 0, TmTransition::new(1, Direction::Right, 1))
            .with(0, 1, TmTransition::new(1, Direction::Left, 1))
            .with(1, 0, TmTransition::new(1, Direction::Left, 0))
            .with(1, 1, TmTransition::new(1, Direction::Right, HALT))
    }

    fn counter() -> TuringMachine {
        // 1RB1LA_0LA0RB
        TuringMachine::new(2, 2)
            .with(0, 0, TmTransition::new(1, Direction::Right, 1))
            .with(0, 1, TmTransition::new(1, Direction::Left, 0))
            .with(1, 0, TmTransition::new(0, Direction::Left, 0))
            .with(1, 1, TmTransition::new(0, Direction::Right, 1))
    }

    fn example() -> Certificate {
        let accept = [
            Config::new(0, 0, 0, 0),
            Config::new(0, 0, 0, 1),
            Config::new(0, 1, 0, 0),
            Config::new(0, 1, 0, 1),
            Config::new(1, 0, 0, 0),
            Config::new(1, 1, 0, 0),
            Config::new(1, 1, 0, 1),
        ]
        .into_iter()
        .map(|c| (c, Bounds::at_least(0)))
        .collect();
        Certificate {
            tm: counter(),
            left: Wfa::from_rows(&[&[(0, 0), (0, 1)]]),
            right: Wfa::from_rows(&[&[(0, 0), (1, 0)], &[(2, 0), (1, 1)], &[(2, 0), (2, 0)]]),
            left_special: SpecialSets::new(&[0], &[]),
            right_special: SpecialSets::new(&[0, 1, 2], &[0]),
            accept,
        }
    }

    fn key(source: usize, symbol: usize) -> EdgeKey {
        EdgeKey {
            source: WfaState(source),
            symbol: Symbol(symbol),
        }
    }

    #[test]
    fn test_valid_tm() {
        assert!(verify_valid_tm(&tm()));
        assert!(!verify_valid_tm(&TuringMachine::new(0, 2)));
        assert!(!verify_valid_tm(&TuringMachine::new(2, 0)));
    }

    #[test]
    fn test_valid_tm_too_many_rows() {
        let mut tm = tm();
        tm.states = 1;
        assert!(!verify_valid_tm(&tm));
    }

    #[test]
    fn test_valid_tm_too_many_symbols() {
        let mut tm = tm();
        tm.symbols = 1;
        assert!(!verify_valid_tm(&tm));
    }

    #[test]
    fn test_valid_tm_write_out_of_bound() {
        let tm = tm().with(1, 0, TmTransition::new(2, Direction::Left, 0));
        assert!(!verify_valid_tm(&tm));
    }

    #[test]
    fn test_deterministic_wfa() {
        let wfa = Wfa::from_rows(&[&[(0, 0), (1, 0)], &[(1, -1), (0, 2)]]);
        assert!(verify_deterministic_wfa(&wfa));
    }

    #[test]
    fn test_deterministic_wfa_empty() {
        let mut wfa = Wfa::from_rows(&[]);
        assert!(!verify_deterministic_wfa(&wfa));
        wfa.states = 1;
        wfa.transitions = vec![vec![]];
        assert!(!verify_deterministic_wfa(&wfa));
    }

    #[test]
    fn test_deterministic_wfa_start_out_of_bound() {
        let mut wfa = Wfa::from_rows(&[&[(0, 0), (0, 0)]]);
        wfa.start = WfaState(1);
        assert!(!verify_deterministic_wfa(&wfa));
    }

    #[test]
    fn test_deterministic_wfa_incomplete() {
        assert!(!verify_deterministic_wfa(&Wfa::seed(2)));

        let mut wfa = Wfa::from_rows(&[&[(0, 0), (0, 0)]]);
        wfa.states = 2;
        assert!(!verify_deterministic_wfa(&wfa));
    }

    #[test]
    fn test_deterministic_wfa_target_out_of_bound() {
        let wfa = Wfa::from_rows(&[&[(0, 0), (1, 0)]]);
        assert!(!verify_deterministic_wfa(&wfa));
    }

    #[test]
    fn test_deterministic_wfa_too_many_entries() {
        let mut wfa = Wfa::from_rows(&[&[(0, 0), (0, 0)], &[(0, 0), (0, 0)]]);
        wfa.states = 1;
        assert!(!verify_deterministic_wfa(&wfa));

        let mut wfa = Wfa::from_rows(&[&[(0, 0), (0, 0)]]);
        wfa.symbols = 1;
        assert!(!verify_deterministic_wfa(&wfa));
    }

    #[test]
    #[should_panic(expected = "possible integer overflow detected")]
    fn test_deterministic_wfa_weight_overflow() {
        let wfa = Wfa::from_rows(&[&[(0, 0), (0, MAX_WEIGHT + 1)]]);
        verify_deterministic_wfa(&wfa);
    }

    #[test]
    fn test_symbol_compatibility() {
        let two = Wfa::from_rows(&[&[(0, 0), (0, 0)]]);
        let three = Wfa::from_rows(&[&[(0, 0), (0, 0), (0, 0)]]);
        assert!(verify_symbol_compatibility(&tm(), &two, &two));
        assert!(!verify_symbol_compatibility(&tm(), &two, &three));
        assert!(!verify_symbol_compatibility(&tm(), &three, &two));
    }

    #[test]
    fn test_special_sets_are_subsets() {
        let wfa = Wfa::from_rows(&[&[(0, 0), (1, 0)], &[(1, 0), (1, 0)]]);
        assert!(verify_special_sets_are_subsets(&wfa, &SpecialSets::new(&[0, 1], &[1])));
        assert!(!verify_special_sets_are_subsets(&wfa, &SpecialSets::new(&[2], &[])));
        assert!(!verify_special_sets_are_subsets(&wfa, &SpecialSets::new(&[], &[0, 5])));
    }

    #[test]
    fn test_accept_set_is_valid() {
        let wfa = Wfa::from_rows(&[&[(0, 0), (1, 0)], &[(1, 0), (1, 0)]]);
        let accept: AcceptSet = [
            (Config::new(0, 0, 0, 0), Bounds::zero()),
            (Config::new(0, 1, 1, 0), Bounds::new(Some(-3), Some(5))),
            (Config::new(1, 1, 0, 1), Bounds::new(None, Some(2))),
            (Config::new(1, 0, 1, 1), Bounds::unbounded()),
        ]
        .into_iter()
        .collect();
        assert!(verify_accept_set_is_valid(&tm(), &wfa, &wfa, &accept));
    }

    #[test]
    fn test_accept_set_out_of_bound() {
        let wfa = Wfa::from_rows(&[&[(0, 0), (0, 0)]]);
        for config in [
            Config::new(2, 0, 0, 0),
            Config::new(0, 2, 0, 0),
            Config::new(0, 0, 1, 0),
            Config::new(0, 0, 0, 1),
        ] {
            let accept: AcceptSet = [(config, Bounds::unbounded())].into_iter().collect();
            assert!(!verify_accept_set_is_valid(&tm(), &wfa, &wfa, &accept), "{}", config);
        }
    }

    #[test]
    fn test_accept_set_inverted_bounds() {
        let wfa = Wfa::from_rows(&[&[(0, 0), (0, 0)]]);
        let accept: AcceptSet = [(Config::new(0, 0, 0, 0), Bounds::new(Some(1), Some(0)))]
            .into_iter()
            .collect();
        assert!(!verify_accept_set_is_valid(&tm(), &wfa, &wfa, &accept));
    }

    #[test]
    #[should_panic(expected = "possible integer overflow detected")]
    fn test_accept_set_bound_overflow() {
        let wfa = Wfa::from_rows(&[&[(0, 0), (0, 0)]]);
        let accept: AcceptSet = [(Config::new(0, 0, 0, 0), Bounds::at_least(MAX_WEIGHT + 1))]
            .into_iter()
            .collect();
        verify_accept_set_is_valid(&tm(), &wfa, &wfa, &accept);
    }

    #[test]
    fn test_leading_blank() {
        assert!(verify_leading_blank_invariant(&Wfa::from_rows(&[&[(0, 0), (1, 3)], &[(1, 0), (0, 0)]])));
        assert!(!verify_leading_blank_invariant(&Wfa::from_rows(&[&[(1, 0), (0, 0)], &[(1, 0), (0, 0)]])));
        assert!(!verify_leading_blank_invariant(&Wfa::from_rows(&[&[(0, 1), (0, 0)]])));
    }

    #[test]
    fn test_leading_blank_other_start() {
        let mut wfa = Wfa::from_rows(&[&[(0, 0), (0, 0)], &[(0, 0), (0, 0)]]);
        wfa.start = WfaState(1);
        assert!(!verify_leading_blank_invariant(&wfa));
        wfa.set(key(1, 0), Some(WfaTransition::new(1, 0)));
        assert!(verify_leading_blank_invariant(&wfa));
    }

    #[test]
    fn test_special_sets_claims() {
        let wfa = Wfa::from_rows(&[
            &[(0, 0), (1, 0)],
            &[(2, -1), (1, 0)],
            &[(2, 1), (3, 0)],
            &[(3, -1), (3, 0)],
        ]);
        assert!(verify_special_sets_claims(&wfa, &SpecialSets::default()));
        assert!(verify_special_sets_claims(&wfa, &SpecialSets::new(&[0, 1], &[0, 1])));
    }

    #[test]
    fn test_special_sets_claims_unweighted() {
        let wfa = Wfa::from_rows(&[&[(0, 0), (1, 0)], &[(2, 0), (1, 0)], &[(2, 0), (3, 0)], &[(3, 0), (3, 0)]]);
        assert!(verify_special_sets_claims(&wfa, &SpecialSets::new(&[0, 1, 2, 3], &[0, 1, 2, 3])));
    }

    #[test]
    fn test_special_sets_claims_wrong_sign() {
        let sets = SpecialSets::new(&[0, 1], &[0, 1]);
        let positive = Wfa::from_rows(&[&[(0, 0), (1, 1)], &[(2, -1), (1, 0)], &[(2, 1), (3, 0)], &[(3, -1), (3, 0)]]);
        assert!(!verify_special_sets_claims(&positive, &sets));
        let negative = Wfa::from_rows(&[&[(0, 0), (1, -1)], &[(2, -1), (1, 0)], &[(2, 1), (3, 0)], &[(3, -1), (3, 0)]]);
        assert!(!verify_special_sets_claims(&negative, &sets));
    }

    #[test]
    fn test_special_sets_claims_not_closed() {
        // 2 -> 3 leaves the non-positive set backwards through 1 -> 2.
        let wfa = Wfa::from_rows(&[&[(0, 0), (1, 0)], &[(2, 0), (1, 0)], &[(2, 0), (3, 0)], &[(3, 0), (3, 0)]]);
        assert!(!verify_special_sets_claims(&wfa, &SpecialSets::new(&[0, 1], &[2, 3])));
        assert!(!verify_special_sets_claims(&wfa, &SpecialSets::new(&[2, 3], &[0, 1])));
    }

    #[test]
    fn test_start_config_accepted() {
        let wfa = Wfa::from_rows(&[&[(0, 0), (0, 0)]]);
        let with = |bounds: Bounds| -> AcceptSet { [(Config::new(0, 0, 0, 0), bounds)].into_iter().collect() };
        assert!(!verify_start_config_accepted(&wfa, &wfa, &AcceptSet::new()));
        assert!(!verify_start_config_accepted(&wfa, &wfa, &with(Bounds::at_least(1))));
        assert!(!verify_start_config_accepted(&wfa, &wfa, &with(Bounds::new(None, Some(-1)))));
        assert!(verify_start_config_accepted(&wfa, &wfa, &with(Bounds::zero())));
        assert!(verify_start_config_accepted(&wfa, &wfa, &with(Bounds::unbounded())));
    }

    #[test]
    fn test_no_halting_config_accepted() {
        let accept = |configs: &[Config]| -> AcceptSet {
            configs.iter().map(|&c| (c, Bounds::unbounded())).collect()
        };
        let base = [Config::new(0, 0, 0, 0), Config::new(0, 1, 0, 0), Config::new(1, 0, 0, 0)];
        assert!(verify_no_halting_config_accepted(&tm(), &accept(&base)));

        let mut halting = base.to_vec();
        halting.push(Config::new(1, 1, 0, 0));
        assert!(!verify_no_halting_config_accepted(&tm(), &accept(&halting)));

        let mut out_of_range = base.to_vec();
        out_of_range.push(Config::new(2, 0, 0, 0));
        assert!(!verify_no_halting_config_accepted(&tm(), &accept(&out_of_range)));

        let undefined = TuringMachine::new(2, 2).with(0, 0, TmTransition::new(1, Direction::Right, 1));
        assert!(!verify_no_halting_config_accepted(&undefined, &accept(&base)));
    }

    #[test]
    fn test_step_accepted() {
        let none = SpecialSets::default();
        let start = Config::new(0, 0, 0, 0);
        let with = |bounds: Bounds| -> AcceptSet { [(start, bounds)].into_iter().collect() };
        let any = Bounds::unbounded();

        let up = ConfigStep::new(start, 1);
        assert!(!step_accepted(&up, &any, &none, &none, &with(Bounds::new(None, Some(0)))));
        assert!(!step_accepted(&up, &any, &none, &none, &with(Bounds::at_least(2))));
        assert!(step_accepted(&ConfigStep::new(start, 0), &any, &none, &none, &with(any)));

        let non_negative = SpecialSets::new(&[0], &[]);
        let down = ConfigStep::new(start, -1);
        assert!(step_accepted(&down, &any, &non_negative, &non_negative, &with(Bounds::at_least(0))));

        let non_positive = SpecialSets::new(&[], &[0]);
        assert!(step_accepted(&up, &any, &non_positive, &non_positive, &with(Bounds::new(None, Some(0)))));
    }

    #[test]
    fn test_step_accepted_unreachable() {
        let sets = SpecialSets::new(&[], &[0]);
        let step = ConfigStep::new(Config::new(0, 0, 0, 0), 1);
        assert!(step_accepted(&step, &Bounds::at_least(0), &sets, &sets, &AcceptSet::new()));
    }

    #[test]
    fn test_example_verifies() {
        assert!(verify(&example()));
    }

    #[test]
    fn test_missing_forward_closure() {
        let mut cert = example();
        cert.accept.remove(&Config::new(1, 0, 0, 0));
        assert!(!verify(&cert));
    }

    #[test]
    fn test_forward_closed_rejects_undecided_edge() {
        // A0 -> 1RA: the left automaton must read the written 1.
        let tm = TuringMachine::new(1, 2).with(0, 0, TmTransition::new(1, Direction::Right, 0));
        let accept: AcceptSet = [(Config::new(0, 0, 0, 0), Bounds::zero())].into_iter().collect();
        let none = SpecialSets::default();

        let seed = Wfa::seed(2);
        assert!(!verify_forward_closed(&tm, &seed, &seed, &none, &none, &accept));

        let mut left = Wfa::seed(2);
        left.set(
            EdgeKey {
                source: WfaState(0),
                symbol: Symbol(1),
            },
            Some(WfaTransition::new(0, 0)),
        );
        assert!(verify_forward_closed(&tm, &left, &seed, &none, &none, &accept));
    }

    #[test]
    fn test_relies_on_special_sets() {
        let cert = example();
        assert!(verify_forward_closed(
            &cert.tm,
            &cert.left,
            &cert.right,
            &cert.left_special,
            &cert.right_special,
            &cert.accept
        ));
        let mut cert = example();
        cert.left_special = SpecialSets::default();
        assert!(!verify(&cert));
    }

    #[test]
    fn test_wrong_bound() {
        let mut cert = example();
        cert.accept = cert
            .accept
            .iter()
            .map(|(&c, _)| (c, Bounds::new(Some(0), Some(10))))
            .collect();
        assert!(!verify(&cert));
    }

    #[test]
    fn test_tightened_start_bound() {
        let mut cert = example();
        cert.accept.insert(Config::new(0, 0, 0, 0), Bounds::zero());
        assert!(!verify(&cert));
    }
}
