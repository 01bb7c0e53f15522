//! Delay statistics plus queue-depth monitoring for `Monitor`-variant
//! requests.

use qsim_common::{Request, RequestVariant};
use qsim_engine::RequestDrain;

use crate::exact::ExactStats;

/// Wraps an [`ExactStats`] for delay statistics and additionally tracks
/// mean `init_len`/`final_len` across every `Monitor`-variant request it
/// sees. A request that is not the `Monitor` variant is recorded for delay
/// only -- the monitor-specific fields are simply skipped, not an error.
pub struct MonitorStats {
    delays: ExactStats,
    init_lens: Vec<usize>,
    final_lens: Vec<usize>,
}

impl MonitorStats {
    pub fn new(name: impl Into<String>) -> Self {
        MonitorStats {
            delays: ExactStats::new(name),
            init_lens: Vec::new(),
            final_lens: Vec::new(),
        }
    }

    fn mean_init_len(&self) -> f64 {
        self.init_lens.iter().sum::<usize>() as f64 / self.init_lens.len() as f64
    }

    fn mean_final_len(&self) -> f64 {
        self.final_lens.iter().sum::<usize>() as f64 / self.final_lens.len() as f64
    }
}

impl RequestDrain for MonitorStats {
    fn terminate_req(&mut self, req: &Request, now: f64) {
        self.delays.terminate_req(req, now);
        if let RequestVariant::Monitor { init_len, final_len } = &req.variant {
            self.init_lens.push(*init_len);
            self.final_lens.push(*final_len);
        }
    }

    fn print_stats(&self, now: f64) {
        self.delays.print_stats(now);
        if self.init_lens.is_empty() {
            return;
        }
        println!("avg_init_len\tavg_final_len");
        println!("{}\t{}", self.mean_init_len(), self.mean_final_len());
    }
}
