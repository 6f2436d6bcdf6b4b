use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;

use clap::Parser;

use mitm_wfar::certificate::PrintMode;
use mitm_wfar::decider::Budget;
use mitm_wfar::runner::{run, Mode, RunConfig};

#[derive(Debug, Parser)]
#[command(author, version, about = "Meet-in-the-middle weighted automata non-halting prover")]
struct Cli {
    /// Input file, one record per line (default: stdin).
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// What to do with each record.
    #[arg(long, value_enum, default_value_t = Mode::Decide)]
    mode: Mode,

    /// Number of committed transitions (maximum for the scans).
    #[arg(short, long, value_name = "INT", default_value = "12")]
    transitions: usize,

    /// State budget of the left automaton.
    #[arg(short, long, value_name = "INT", default_value = "4")]
    left_states: usize,

    /// State budget of the right automaton.
    #[arg(short, long, value_name = "INT", default_value = "4")]
    right_states: usize,

    /// Number of weight pairs to try.
    #[arg(short, long, value_name = "INT", default_value = "1")]
    weight_pairs: usize,

    /// State budget per side for `dfa-scan`.
    #[arg(long, value_name = "INT", default_value = "5")]
    max_states: usize,

    /// How much of each certificate to print.
    #[arg(short, long, value_enum, default_value_t = PrintMode::Machine)]
    print_mode: PrintMode,

    /// Worker threads (0 = all available cores).
    #[arg(short = 'j', long, value_name = "INT", default_value = "0")]
    threads: usize,

    /// Log level.
    #[arg(long, value_name = "LEVEL", default_value = "warn")]
    log_level: simplelog::LevelFilter,

    /// Write a Graphviz rendering of every solved record into this directory.
    #[arg(long, value_name = "DIR")]
    dot: Option<PathBuf>,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Cli::parse();

    simplelog::TermLogger::init(
        args.log_level,
        simplelog::Config::default(),
        simplelog::TerminalMode::Stderr,
        simplelog::ColorChoice::Auto,
    )?;
    log::debug!("args = {:?}", args);

    if let Some(dir) = &args.dot {
        std::fs::create_dir_all(dir)?;
    }

    let config = RunConfig {
        mode: args.mode,
        budget: Budget::new(args.transitions, args.left_states, args.right_states, args.weight_pairs),
        max_states: args.max_states,
        print_mode: args.print_mode,
        threads: args.threads,
        dot_dir: args.dot,
    };

    let time_total = std::time::Instant::now();
    let stdout = io::stdout();
    let summary = match &args.input {
        Some(path) => run(BufReader::new(File::open(path)?), stdout, &config)?,
        None => run(io::stdin().lock(), stdout, &config)?,
    };
    log::info!(
        "{} of {} records solved in {:.3} s",
        summary.solved,
        summary.total,
        time_total.elapsed().as_secs_f64()
    );

    Ok(())
}
