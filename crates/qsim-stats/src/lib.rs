//! Concrete statistics collectors.
//!
//! The distilled specification leaves statistics collection as an
//! "external collaborator, specified only by its termination-callback
//! contract" -- [`qsim_engine::RequestDrain`]. This crate supplies the
//! three concrete collectors a runnable CLI needs: [`ExactStats`] (full
//! sample, sort-on-print), [`HistogramStats`] (fixed-granularity bucket
//! counts), and [`MonitorStats`] (queue-depth tracking on top of
//! `ExactStats`).

mod exact;
mod histogram;
mod monitor;
mod percentile;

pub use exact::ExactStats;
pub use histogram::HistogramStats;
pub use monitor::MonitorStats;

/// The four percentiles every collector reports, in the order the
/// specification's output format lists them.
pub const PERCENTILES: [f64; 4] = [0.5, 0.9, 0.95, 0.99];
