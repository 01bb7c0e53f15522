//! Full-sample ("keep everything, sort at print time") statistics
//! collector.

use qsim_common::{Request, RequestVariant};
use qsim_engine::RequestDrain;

use crate::percentile::exact_percentile;
use crate::PERCENTILES;

/// Records every observed delay in a growing `Vec`; sorts once, at print
/// time, to compute percentiles. Cheap per-request cost, `O(n log n)` at
/// the end -- the right tradeoff for a collector that only prints once,
/// at simulation termination.
pub struct ExactStats {
    name: String,
    delays: Vec<f64>,
    stolen_count: usize,
    saw_stealable: bool,
}

impl ExactStats {
    pub fn new(name: impl Into<String>) -> Self {
        ExactStats {
            name: name.into(),
            delays: Vec::new(),
            stolen_count: 0,
            saw_stealable: false,
        }
    }

    pub fn count(&self) -> usize {
        self.delays.len()
    }

    fn mean(&self) -> f64 {
        self.delays.iter().sum::<f64>() / self.delays.len() as f64
    }

    fn stddev(&self) -> f64 {
        let mean = self.mean();
        let mean_of_squares = self.delays.iter().map(|d| d * d).sum::<f64>() / self.delays.len() as f64;
        (mean_of_squares - mean * mean).max(0.0).sqrt()
    }
}

impl RequestDrain for ExactStats {
    fn terminate_req(&mut self, req: &Request, now: f64) {
        self.delays.push(req.delay(now));
        if let RequestVariant::Stealable { stolen } = &req.variant {
            self.saw_stealable = true;
            if *stolen {
                self.stolen_count += 1;
            }
        }
    }

    fn print_stats(&self, now: f64) {
        println!("Stats collector: {}", self.name);
        if self.saw_stealable {
            println!("Count\tStolen\tAVG\tSTDDev\t50th\t90th\t95th\t99th\tReqs/time_unit");
        } else {
            println!("Count\tAVG\tSTDDev\t50th\t90th\t95th\t99th\tReqs/time_unit");
        }

        print!("{}\t", self.delays.len());
        if self.saw_stealable {
            print!("{}\t", self.stolen_count);
        }

        if self.delays.is_empty() {
            print!("\t\t\t\t\t\t");
        } else {
            let mut sorted = self.delays.clone();
            sorted.sort_by(|a, b| a.partial_cmp(b).expect("delays are never NaN"));
            print!("{}\t{}\t", self.mean(), self.stddev());
            for p in PERCENTILES {
                print!("{}\t", exact_percentile(&sorted, p));
            }
        }
        println!("{}", self.delays.len() as f64 / now);
    }
}
