//! Certificate to DOT (Graphviz) conversion.
//!
//! Renders the two automata of a [`Certificate`] as one directed graph, which
//! can be visualized using Graphviz tools like `dot` or online viewers.
//!
//! # DOT Format
//!
//! The generated DOT output follows these conventions:
//! - Each automaton is a cluster, labelled `left` or `right`; its states are
//!   named `L<n>` / `R<n>` and labelled with their index
//! - The **start state** is drawn with a double outline
//! - **Absorbing states** (every edge loops back with weight 0, such as the
//!   sink added when completing a partial automaton) are dashed
//! - Parallel edges between the same pair of states are merged into one edge
//!   labelled with every `symbol/weight` pair
//!
//! # Examples
//!
//! ```
//! use mitm_wfar::certificate::Certificate;
//!
//! let cert: Certificate = "1RB1LA_0LA0RB
//! 0,0;0,1
//! 0,0;1,0_2,0;1,1_2,0;2,0
//! 0_
//! 0,1,2_0
//! A,0,0,0,0,-_A,1,0,0,0,-_A,0,0,1,0,-_A,1,0,1,0,-_B,0,0,0,0,-_B,1,0,0,0,-_B,1,0,1,0,-"
//!     .parse()
//!     .unwrap();
//! let dot = cert.to_dot().unwrap();
//! // Write to file and render with: dot -Tpng output.dot -o output.png
//! ```

use std::collections::BTreeMap;
use std::fmt::Write as _;

use crate::certificate::Certificate;
use crate::types::{Side, WfaState};
use crate::wfa::Wfa;

/// Configuration options for DOT output generation.
///
/// Use `DotConfig::default()` for standard settings.
#[derive(Debug, Clone)]
pub struct DotConfig {
    /// Shape for automaton states (default: "circle")
    pub state_shape: &'static str,
    /// Shape for the start state (default: "doublecircle")
    pub start_shape: &'static str,
    /// Style for absorbing states (default: "dashed")
    pub absorbing_style: &'static str,
    /// Layout direction of the graph (default: "LR")
    pub rank_dir: &'static str,
    /// Whether to print zero weights on edge labels (default: false)
    pub show_zero_weights: bool,
}

impl Default for DotConfig {
    fn default() -> Self {
        Self {
            state_shape: "circle",
            start_shape: "doublecircle",
            absorbing_style: "dashed",
            rank_dir: "LR",
            show_zero_weights: false,
        }
    }
}

impl Certificate {
    /// Converts the automata of the certificate to DOT (Graphviz) format.
    pub fn to_dot(&self) -> Result<String, std::fmt::Error> {
        self.to_dot_with_config(&DotConfig::default())
    }

    /// Converts the automata of the certificate to DOT format with custom configuration.
    ///
    /// The graph is labelled with the machine, so renderings of different
    /// certificates can be told apart.
    pub fn to_dot_with_config(&self, config: &DotConfig) -> Result<String, std::fmt::Error> {
        let mut dot = String::new();
        writeln!(dot, "digraph {{")?;
        writeln!(dot, "rankdir={};", config.rank_dir)?;
        writeln!(dot, "label=\"{}\";", self.tm)?;
        writeln!(dot, "node [shape={}];", config.state_shape)?;
        write_cluster(&mut dot, Side::Left, &self.left, config)?;
        write_cluster(&mut dot, Side::Right, &self.right, config)?;
        writeln!(dot, "}}")?;
        Ok(dot)
    }
}

fn node_name(side: Side, state: WfaState) -> String {
    match side {
        Side::Left => format!("L{}", state),
        Side::Right => format!("R{}", state),
    }
}

/// Returns `true` if every edge of `state` loops back to it with weight 0.
fn is_absorbing(wfa: &Wfa, state: usize) -> bool {
    wfa.transitions[state]
        .iter()
        .all(|t| t.is_some_and(|t| t.target.index() == state && t.weight == 0))
}

fn write_cluster(dot: &mut String, side: Side, wfa: &Wfa, config: &DotConfig) -> std::fmt::Result {
    writeln!(dot, "subgraph cluster_{} {{", side)?;
    writeln!(dot, "label=\"{}\";", side)?;

    for state in 0..wfa.transitions.len() {
        let name = node_name(side, WfaState(state));
        if state == wfa.start.index() {
            writeln!(dot, "{} [label=\"{}\", shape={}];", name, state, config.start_shape)?;
        } else if is_absorbing(wfa, state) {
            writeln!(dot, "{} [label=\"{}\", style={}];", name, state, config.absorbing_style)?;
        } else {
            writeln!(dot, "{} [label=\"{}\"];", name, state)?;
        }
    }

    // Group parallel edges so each pair of states gets a single arrow.
    let mut grouped = BTreeMap::<(WfaState, WfaState), Vec<String>>::new();
    for (key, t) in wfa.edges() {
        let label = if t.weight != 0 || config.show_zero_weights {
            format!("{}/{}", key.symbol, t.weight)
        } else {
            key.symbol.to_string()
        };
        grouped.entry((key.source, t.target)).or_default().push(label);
    }
    for ((source, target), labels) in grouped {
        writeln!(
            dot,
            "{} -> {} [label=\"{}\"];",
            node_name(side, source),
            node_name(side, target),
            labels.join(", ")
        )?;
    }

    writeln!(dot, "}}")
}
