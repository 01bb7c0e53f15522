//! Command-line surface and the configuration error taxonomy.
//!
//! Errors here are the "fatal at startup, human-readable message" class
//! from the expanded spec's error handling design -- a manual enum with
//! `Display`/`Error`, matching the teacher's `LexError`/`LexErrorKind`
//! split rather than pulling in `thiserror`/`anyhow` for a handful of
//! variants.

use std::fmt;
use std::io;
use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "qsim", version, about = "Discrete-event simulator for request-serving queueing networks")]
pub struct Cli {
    /// Topology: 0 = single-queue N-processor, 1 = N-queue N-processor, 2 = bounded buffer pair.
    #[arg(long = "topo")]
    pub topo: u8,

    /// Service rate.
    #[arg(long = "mu")]
    pub mu: f64,

    /// Arrival rate.
    #[arg(long = "lambda")]
    pub lambda: f64,

    /// Generator type: 0 = MM, 1 = MD, 2 = MBimodal(0.9), 3 = MBimodal(0.999).
    #[arg(long = "genType")]
    pub gen_type: u8,

    /// Processor discipline: 0 = RTC, 1 = PS with worker_count = cores.
    #[arg(long = "procType")]
    pub proc_type: u8,

    /// Virtual-time horizon.
    #[arg(long = "duration")]
    pub duration: f64,

    /// Downstream buffer capacity; only meaningful for -topo 2.
    #[arg(long = "buffersize", default_value_t = 1)]
    pub buffer_size: usize,

    /// Processor count for -topo 0/1, or PS worker_count for -procType 1.
    #[arg(long = "cores", default_value_t = 1)]
    pub cores: usize,

    /// TS quantum. Unused unless a future -procType selects TS.
    #[arg(long = "quantum", default_value_t = 1.0)]
    pub quantum: f64,

    /// Per-quantum context-switch overhead added by every processor discipline.
    #[arg(long = "ctxcost", default_value_t = 0.0)]
    pub ctx_cost: f64,

    /// RNG seed; the concrete realization of "deterministic given a seed".
    #[arg(long = "seed", default_value_t = 1)]
    pub seed: u64,

    /// One service-time table per CPU; overrides -genType's service half when given.
    #[arg(long = "playback-file")]
    pub playback_files: Vec<PathBuf>,

    #[arg(long = "log-level", default_value = "info")]
    pub log_level: String,
}

/// Fatal configuration/IO errors raised while building a topology from CLI
/// flags. All are reported by `main` as `eprintln!("error: {e}")` followed
/// by `process::exit(1)`; none are retried.
#[derive(Debug)]
pub enum ConfigError {
    UnknownTopology(u8),
    UnknownGenType(u8),
    UnknownProcType(u8),
    NegativeDuration(f64),
    PlaybackFileUnreadable { path: PathBuf, source: io::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::UnknownTopology(t) => write!(f, "unknown -topo value: {t} (expected 0, 1, or 2)"),
            ConfigError::UnknownGenType(g) => write!(f, "unknown -genType value: {g} (expected 0-3)"),
            ConfigError::UnknownProcType(p) => write!(f, "unknown -procType value: {p} (expected 0 or 1)"),
            ConfigError::NegativeDuration(d) => write!(f, "-duration must be non-negative, got {d}"),
            ConfigError::PlaybackFileUnreadable { path, source } => {
                write!(f, "could not read playback file '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {}
