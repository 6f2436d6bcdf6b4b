//! Non-halting certificates.
//!
//! A full [`Certificate`] carries everything the verifier needs. A
//! [`ShortCertificate`] only carries the machine and the two automata; the
//! special sets and the accept set are derived again before verification.

use std::fmt::Write;

use clap::ValueEnum;

use crate::accept::find_accept_set;
use crate::bounds::AcceptSet;
use crate::special::SpecialSets;
use crate::tm::TuringMachine;
use crate::wfa::Wfa;

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Certificate {
    pub tm: TuringMachine,
    pub left: Wfa,
    pub right: Wfa,
    pub left_special: SpecialSets,
    pub right_special: SpecialSets,
    pub accept: AcceptSet,
}

impl Certificate {
    /// Renders the certificate, one record per line, at the requested detail.
    pub fn render(&self, mode: PrintMode) -> String {
        let mut out = String::new();
        // Writing into a `String` cannot fail.
        let _ = writeln!(out, "{}", self.tm);
        if mode >= PrintMode::Automata {
            let _ = writeln!(out, "{}", self.left);
            let _ = writeln!(out, "{}", self.right);
        }
        if mode >= PrintMode::Full {
            let _ = writeln!(out, "{}", self.left_special);
            let _ = writeln!(out, "{}", self.right_special);
            let _ = writeln!(out, "{}", self.accept);
        }
        out
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ShortCertificate {
    pub tm: TuringMachine,
    pub left: Wfa,
    pub right: Wfa,
}

impl ShortCertificate {
    /// Derives the special sets and the accept set of the automata.
    pub fn complete(self) -> Certificate {
        let left_special = SpecialSets::derive(&self.left);
        let right_special = SpecialSets::derive(&self.right);
        let accept = find_accept_set(&self.tm, &self.left, &self.right, &left_special, &right_special);
        Certificate {
            tm: self.tm,
            left: self.left,
            right: self.right,
            left_special,
            right_special,
            accept,
        }
    }
}

/// How much of a certificate to print for a solved machine.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Default, ValueEnum)]
pub enum PrintMode {
    /// The machine only.
    #[default]
    Machine,
    /// The machine and both automata (a short certificate).
    Automata,
    /// The full certificate.
    Full,
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    use crate::bounds::Bounds;
    use crate::config::Config;
    use crate::tm::TmTransition;
    use crate::types::Direction;

    fn short() -> ShortCertificate {
        ShortCertificate {
            tm: TuringMachine::new(2, 2)
                .with(0, 0, TmTransition::new(1, Direction::Right, 1))
                .with(0, 1, TmTransition::new(1, Direction::Left, 0))
                .with(1, 0, TmTransition::new(0, Direction::Left, 0))
                .with(1, 1, TmTransition::new(0, Direction::Right, 1)),
            left: Wfa::from_rows(&[&[(0, 0), (0, 1)]]),
            right: Wfa::from_rows(&[&[(0, 0), (1, 0)], &[(2, 0), (1, 1)], &[(2, 0), (2, 0)]]),
        }
    }

    #[test]
    fn test_complete_derives_everything() {
        let cert = short().complete();
        assert_eq!(cert.left_special, SpecialSets::new(&[0], &[]));
        assert_eq!(cert.right_special, SpecialSets::new(&[0, 1, 2], &[0]));
        assert_eq!(cert.accept.get(&Config::new(0, 0, 0, 0)), Some(&Bounds::at_least(0)));
    }

    #[test]
    fn test_render_modes() {
        let cert = short().complete();
        assert_eq!(cert.render(PrintMode::Machine), "1RB1LA_0LA0RB\n");
        assert_eq!(
            cert.render(PrintMode::Automata),
            "1RB1LA_0LA0RB\n0,0;0,1\n0,0;1,0_2,0;1,1_2,0;2,0\n"
        );
        let full = cert.render(PrintMode::Full);
        let lines: Vec<&str> = full.lines().collect();
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[3], "0_");
        assert_eq!(lines[4], "0,1,2_0");
        assert_eq!(
            lines[5],
            "A,0,0,0,0,-_A,0,0,1,0,-_A,1,0,0,0,-_A,1,0,1,0,-_B,0,0,0,0,-_B,1,0,0,0,-_B,1,0,1,0,-"
        );
    }

    #[test]
    fn test_print_mode_order() {
        assert!(PrintMode::Machine < PrintMode::Automata);
        assert!(PrintMode::Automata < PrintMode::Full);
    }
}
