//! Fixed-granularity, bucket-counted statistics collector.
//!
//! Trades the exact collector's `O(n log n)` sort for `O(1)` per-sample
//! bookkeeping and `O(bucket count)` percentile estimation, at the cost of
//! percentiles that are only accurate to within one bucket width.

use qsim_common::Request;
use qsim_engine::RequestDrain;

use crate::PERCENTILES;

const DEFAULT_GRANULARITY: f64 = 0.01;
const DEFAULT_BUCKET_COUNT: usize = 100_000;

/// Bucket-counted histogram of delay samples.
pub struct HistogramStats {
    name: String,
    granularity: f64,
    buckets: Vec<u64>,
    count: u64,
    sum: f64,
    sum_square: f64,
    min_bucket: usize,
    max_bucket: usize,
}

impl HistogramStats {
    /// `granularity` is the bucket width; `expected_bucket_count` bounds
    /// how far a single sample may land from zero (`granularity *
    /// expected_bucket_count`) before being clamped into the last bucket.
    pub fn new(name: impl Into<String>, granularity: f64, expected_bucket_count: usize) -> Self {
        HistogramStats {
            name: name.into(),
            granularity,
            buckets: vec![0; expected_bucket_count],
            count: 0,
            sum: 0.0,
            sum_square: 0.0,
            min_bucket: expected_bucket_count.saturating_sub(1),
            max_bucket: 0,
        }
    }

    /// A histogram with the reference implementation's default
    /// granularity (`0.01`) and bucket count (`100_000`), i.e. an
    /// effective range of `[0, 1000)` time units.
    pub fn with_defaults(name: impl Into<String>) -> Self {
        Self::new(name, DEFAULT_GRANULARITY, DEFAULT_BUCKET_COUNT)
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    fn mean(&self) -> f64 {
        self.sum / self.count as f64
    }

    fn stddev(&self) -> f64 {
        let mean_of_squares = self.sum_square / self.count as f64;
        let mean = self.mean();
        (mean_of_squares - mean * mean).max(0.0).sqrt()
    }

    fn add_sample(&mut self, s: f64) {
        let raw_index = (s / self.granularity) as i64;
        let index = raw_index.clamp(0, self.buckets.len() as i64 - 1) as usize;
        self.buckets[index] += 1;
        self.count += 1;
        self.sum += s;
        self.sum_square += s * s;
        if index < self.min_bucket {
            self.min_bucket = index;
        }
        if index > self.max_bucket {
            self.max_bucket = index;
        }
    }

    /// Percentiles estimated by linear interpolation within the bucket
    /// straddling each target rank. This assumes a single bucket does not
    /// straddle more than one requested percentile at the configured
    /// granularity; violating that only matters for pathologically coarse
    /// granularity relative to sample count, so it is asserted in debug
    /// builds and silently clamped to the bucket's lower boundary in
    /// release builds rather than panicking in production.
    fn percentiles(&self) -> [Option<f64>; PERCENTILES.len()] {
        let mut results = [None; PERCENTILES.len()];
        if self.count == 0 {
            return results;
        }
        let mut accum: u64 = 0;
        let mut target_idx = 0;
        for bucket in self.min_bucket..=self.max_bucket {
            let before = accum;
            accum += self.buckets[bucket];
            while target_idx < PERCENTILES.len()
                && accum as f64 > PERCENTILES[target_idx] * self.count as f64
            {
                let in_bucket = self.buckets[bucket];
                let lower = self.granularity * bucket as f64;
                let value = if in_bucket > 0 {
                    let rank_into_bucket = PERCENTILES[target_idx] * self.count as f64 - before as f64;
                    let estimate = lower + self.granularity / in_bucket as f64 * rank_into_bucket;
                    debug_assert!(
                        estimate >= lower && estimate <= lower + self.granularity,
                        "percentile estimate escaped its straddling bucket: \
                         multiple target percentiles likely landed in the same bucket"
                    );
                    estimate
                } else {
                    lower
                };
                results[target_idx] = Some(value);
                target_idx += 1;
            }
            if target_idx >= PERCENTILES.len() {
                break;
            }
        }
        results
    }
}

impl RequestDrain for HistogramStats {
    fn terminate_req(&mut self, req: &Request, now: f64) {
        self.add_sample(req.delay(now));
    }

    fn print_stats(&self, now: f64) {
        println!("Stats collector: {} (histogram, granularity={})", self.name, self.granularity);
        println!("Count\tAVG\tSTDDev\t50th\t90th\t95th\t99th\tReqs/time_unit");
        print!("{}\t", self.count);
        if self.count == 0 {
            print!("\t\t\t\t\t\t");
        } else {
            print!("{}\t{}\t", self.mean(), self.stddev());
            for p in self.percentiles() {
                match p {
                    Some(v) => print!("{v}\t"),
                    None => print!("\t"),
                }
            }
        }
        println!("{}", self.count as f64 / now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qsim_common::RequestVariant;

    fn req() -> Request {
        Request::new(0.0, 0.0, RequestVariant::Plain)
    }

    #[test]
    fn empty_histogram_prints_without_panicking() {
        let h = HistogramStats::with_defaults("empty");
        h.print_stats(10.0);
        assert_eq!(h.count(), 0);
    }

    #[test]
    fn mean_and_stddev_match_hand_computation() {
        let mut h = HistogramStats::new("t", 0.01, 10_000);
        for d in [1.0, 2.0, 3.0, 4.0, 5.0] {
            h.terminate_req(&req(), d);
        }
        assert!((h.mean() - 3.0).abs() < 1e-6);
        assert!((h.stddev() - 2.0_f64.sqrt()).abs() < 1e-2);
    }

    #[test]
    fn median_estimate_is_close_for_uniform_samples() {
        let mut h = HistogramStats::new("t", 0.01, 100_000);
        for i in 1..=1000 {
            h.terminate_req(&req(), i as f64 * 0.1);
        }
        let percentiles = h.percentiles();
        let median = percentiles[0].unwrap();
        assert!((median - 50.0).abs() < 1.0, "median was {median}");
    }

    #[test]
    fn samples_beyond_range_clamp_into_last_bucket() {
        let mut h = HistogramStats::new("t", 1.0, 10);
        h.terminate_req(&req(), 1000.0);
        assert_eq!(h.max_bucket, 9);
        assert_eq!(h.count(), 1);
    }
}
