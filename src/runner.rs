//! Concurrent driver over a stream of records.
//!
//! Records are read and parsed on the calling thread, then handed to a rayon
//! pool. A bounded channel pre-filled with one token per worker throttles the
//! reader: a token is taken before a record is dispatched and given back when
//! its task is done, so at most `threads` records are in flight. Each solved
//! record is written to the output in one piece; outputs of different records
//! may interleave in any order.

use std::fmt;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Mutex, PoisonError};

use clap::ValueEnum;
use log::{debug, error, info, warn};

use crate::certificate::{Certificate, PrintMode, ShortCertificate};
use crate::decider::{decide, Budget};
use crate::parse::{parse_full_certificate, parse_short_certificate, FULL_CERTIFICATE_LINES, SHORT_CERTIFICATE_LINES};
use crate::tm::TuringMachine;
use crate::verifier::verify;

/// What to do with each input record.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default, ValueEnum)]
pub enum Mode {
    /// Run the decider once per machine with the given budget.
    #[default]
    Decide,
    /// Run the decider with growing transition counts up to the budget.
    WeightedScan,
    /// Search unweighted automata with growing transition counts.
    DfaScan,
    /// Verify full certificates.
    VerifyFull,
    /// Complete and verify short certificates.
    VerifyShort,
}

impl Mode {
    /// Number of non-blank lines making up one record.
    pub fn record_lines(self) -> usize {
        match self {
            Mode::Decide | Mode::WeightedScan | Mode::DfaScan => 1,
            Mode::VerifyFull => FULL_CERTIFICATE_LINES,
            Mode::VerifyShort => SHORT_CERTIFICATE_LINES,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub mode: Mode,
    pub budget: Budget,
    /// State budget per side in [`Mode::DfaScan`].
    pub max_states: usize,
    pub print_mode: PrintMode,
    /// Worker count; 0 uses the available parallelism.
    pub threads: usize,
    /// Directory receiving a Graphviz rendering of every solved record.
    pub dot_dir: Option<PathBuf>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            mode: Mode::default(),
            budget: Budget::default(),
            max_states: 5,
            print_mode: PrintMode::default(),
            threads: 0,
            dot_dir: None,
        }
    }
}

/// Counts reported at the end of a run.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct Summary {
    /// Records that were parsed and processed.
    pub total: usize,
    pub solved: usize,
    /// Records skipped because they could not be parsed.
    pub malformed: usize,
}

/// Error type for a run.
#[derive(Debug)]
pub enum RunError {
    /// Reading the input or writing the output failed.
    Io(io::Error),
    /// The worker pool could not be created.
    Pool(rayon::ThreadPoolBuildError),
}

impl From<io::Error> for RunError {
    fn from(e: io::Error) -> Self {
        RunError::Io(e)
    }
}

impl From<rayon::ThreadPoolBuildError> for RunError {
    fn from(e: rayon::ThreadPoolBuildError) -> Self {
        RunError::Pool(e)
    }
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunError::Io(e) => write!(f, "I/O error: {}", e),
            RunError::Pool(e) => write!(f, "thread pool error: {}", e),
        }
    }
}

impl std::error::Error for RunError {}

/// A parsed record, ready to be solved.
enum Job {
    Machine(TuringMachine),
    Full(Certificate),
    Short(ShortCertificate),
}

impl Job {
    fn parse(mode: Mode, lines: &[&str]) -> Result<Job, crate::parse::ParseError> {
        Ok(match mode {
            Mode::Decide | Mode::WeightedScan | Mode::DfaScan => Job::Machine(lines[0].parse()?),
            Mode::VerifyFull => Job::Full(parse_full_certificate(lines)?),
            Mode::VerifyShort => Job::Short(parse_short_certificate(lines)?),
        })
    }

    fn solve(self, config: &RunConfig) -> Option<Certificate> {
        match self {
            Job::Machine(tm) => solve_machine(&tm, config),
            Job::Full(cert) => verify(&cert).then_some(cert),
            Job::Short(short) => {
                let cert = short.complete();
                verify(&cert).then_some(cert)
            }
        }
    }
}

fn solve_machine(tm: &TuringMachine, config: &RunConfig) -> Option<Certificate> {
    let budget = config.budget;
    match config.mode {
        Mode::WeightedScan => (2..=budget.transitions).find_map(|transitions| {
            let step = Budget::new(transitions, budget.transitions, budget.transitions, budget.weight_pairs);
            decide(tm, &step)
        }),
        Mode::DfaScan => {
            let max_transitions = tm.symbols * config.max_states.saturating_sub(1) * 2;
            (2..=max_transitions).find_map(|transitions| {
                let step = Budget::new(transitions, config.max_states, config.max_states, 0);
                decide(tm, &step)
            })
        }
        _ => decide(tm, &budget),
    }
}

/// Groups the non-blank lines of a reader into records of `size` lines.
struct Records<R> {
    lines: io::Lines<R>,
    size: usize,
}

impl<R: BufRead> Iterator for Records<R> {
    type Item = io::Result<Vec<String>>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut record = Vec::with_capacity(self.size);
        while record.len() < self.size {
            match self.lines.next() {
                Some(Ok(line)) if line.trim().is_empty() => continue,
                Some(Ok(line)) => record.push(line.trim().to_string()),
                Some(Err(e)) => return Some(Err(e)),
                None if record.is_empty() => return None,
                None => break,
            }
        }
        Some(Ok(record))
    }
}

/// Gives an admission token back when dropped, even if the task panics.
struct Token(mpsc::SyncSender<()>);

impl Drop for Token {
    fn drop(&mut self) {
        let _ = self.0.send(());
    }
}

fn write_dot(dir: &Path, cert: &Certificate) {
    let path = dir.join(format!("{}.dot", cert.tm));
    let result = cert
        .to_dot()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))
        .and_then(|dot| fs::write(&path, dot));
    if let Err(e) = result {
        error!("failed to write {}: {}", path.display(), e);
    }
}

/// Processes every record of `input`, writing solved ones to `output`.
pub fn run<R, W>(input: R, output: W, config: &RunConfig) -> Result<Summary, RunError>
where
    R: BufRead,
    W: Write + Send,
{
    let pool = rayon::ThreadPoolBuilder::new().num_threads(config.threads).build()?;
    let workers = pool.current_num_threads();
    info!("{:?}: {} workers", config.mode, workers);

    let (token_tx, token_rx) = mpsc::sync_channel::<()>(workers);
    for _ in 0..workers {
        // The channel has room for exactly `workers` tokens.
        let _ = token_tx.send(());
    }

    let output = Mutex::new(output);
    let solved = AtomicUsize::new(0);
    let mut summary = Summary::default();
    let records = Records {
        lines: input.lines(),
        size: config.mode.record_lines(),
    };

    let result: Result<(), RunError> = pool.in_place_scope(|scope| {
        let mut status = Ok(());
        for record in records {
            let record = match record {
                Ok(record) => record,
                Err(e) => {
                    status = Err(e.into());
                    break;
                }
            };
            let lines: Vec<&str> = record.iter().map(String::as_str).collect();
            let job = match Job::parse(config.mode, &lines) {
                Ok(job) => job,
                Err(e) => {
                    warn!("skipping record: {}", e);
                    summary.malformed += 1;
                    continue;
                }
            };
            summary.total += 1;

            if token_rx.recv().is_err() {
                break;
            }
            let token = Token(token_tx.clone());
            let (output, solved) = (&output, &solved);
            scope.spawn(move |_| {
                let _token = token;
                if let Some(cert) = job.solve(config) {
                    solved.fetch_add(1, Ordering::Relaxed);
                    let text = cert.render(config.print_mode);
                    let mut out = output.lock().unwrap_or_else(PoisonError::into_inner);
                    if let Err(e) = out.write_all(text.as_bytes()) {
                        error!("failed to write certificate of {}: {}", cert.tm, e);
                    }
                    drop(out);
                    if let Some(dir) = &config.dot_dir {
                        write_dot(dir, &cert);
                    }
                } else {
                    debug!("unsolved record");
                }
            });
        }
        // Every token back means every task is done.
        for _ in 0..workers {
            let _ = token_rx.recv();
        }
        status
    });
    result?;

    output.into_inner().unwrap_or_else(PoisonError::into_inner).flush()?;
    summary.solved = solved.into_inner();
    info!("solved {} / {}", summary.solved, summary.total);
    if summary.malformed > 0 {
        warn!("{} malformed records skipped", summary.malformed);
    }
    Ok(summary)
}
