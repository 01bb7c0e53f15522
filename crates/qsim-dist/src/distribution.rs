//! The single-value sampling contract and its four concrete
//! implementations, grounded in `rand`/`rand_distr` the way the rest of
//! this corpus reaches for those crates rather than hand-rolling variate
//! generation.

use rand::RngCore;
use rand_distr::{Distribution as RandDistribution, Exp, LogNormal as RandLogNormal};

/// Something that can produce a non-negative `f64` sample given a source
/// of randomness. Generators use one `Distribution` for interarrival times
/// and another (or a [`crate::playback::PlaybackTable`]) for service times.
pub trait Distribution {
    fn sample(&self, rng: &mut dyn RngCore) -> f64;
}

/// Always returns the same value. Used for `-genType` variants with a
/// fixed service time (the "D" half of M/D/1) and for purely deterministic
/// test topologies.
pub struct Deterministic {
    value: f64,
}

impl Deterministic {
    pub fn new(value: f64) -> Self {
        Deterministic { value }
    }
}

impl Distribution for Deterministic {
    fn sample(&self, _rng: &mut dyn RngCore) -> f64 {
        self.value
    }
}

/// Exponential distribution with the given rate. `rate` is `lambda` for
/// interarrival sampling or `mu` for service-time sampling -- the mean of
/// the samples is `1 / rate`.
pub struct Exponential {
    inner: Exp<f64>,
}

impl Exponential {
    pub fn new(rate: f64) -> Self {
        Exponential {
            inner: Exp::new(rate).expect("exponential rate must be positive"),
        }
    }
}

impl Distribution for Exponential {
    fn sample(&self, rng: &mut dyn RngCore) -> f64 {
        self.inner.sample(rng)
    }
}

/// Log-normal distribution parameterized by the underlying normal's
/// `mu`/`sigma` (not the log-normal's own mean/variance).
pub struct LogNormal {
    inner: RandLogNormal<f64>,
}

impl LogNormal {
    pub fn new(mu: f64, sigma: f64) -> Self {
        LogNormal {
            inner: RandLogNormal::new(mu, sigma).expect("log-normal sigma must be positive"),
        }
    }
}

impl Distribution for LogNormal {
    fn sample(&self, rng: &mut dyn RngCore) -> f64 {
        self.inner.sample(rng)
    }
}

/// Two-point distribution: returns `small` with probability `p_small`,
/// else `large`. The CLI's `MBimodal(0.9)`/`MBimodal(0.999)` generator
/// types are this with `p_small = 0.9`/`0.999` respectively.
pub struct Bimodal {
    p_small: f64,
    small: f64,
    large: f64,
}

impl Bimodal {
    pub fn new(p_small: f64, small: f64, large: f64) -> Self {
        Bimodal {
            p_small,
            small,
            large,
        }
    }
}

impl Distribution for Bimodal {
    fn sample(&self, rng: &mut dyn RngCore) -> f64 {
        use rand::Rng;
        if rng.random::<f64>() > self.p_small {
            self.large
        } else {
            self.small
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn deterministic_always_returns_same_value() {
        let d = Deterministic::new(4.2);
        let mut rng = StdRng::seed_from_u64(0);
        for _ in 0..10 {
            assert_eq!(d.sample(&mut rng), 4.2);
        }
    }

    #[test]
    fn exponential_samples_are_non_negative() {
        let d = Exponential::new(0.5);
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..200 {
            assert!(d.sample(&mut rng) >= 0.0);
        }
    }

    #[test]
    fn exponential_mean_is_close_to_one_over_rate() {
        let rate = 0.1;
        let d = Exponential::new(rate);
        let mut rng = StdRng::seed_from_u64(2);
        let n = 50_000;
        let sum: f64 = (0..n).map(|_| d.sample(&mut rng)).sum();
        let mean = sum / n as f64;
        assert!((mean - 1.0 / rate).abs() < 1.0, "mean was {mean}");
    }

    #[test]
    fn log_normal_samples_are_non_negative() {
        let d = LogNormal::new(0.0, 0.5);
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..200 {
            assert!(d.sample(&mut rng) >= 0.0);
        }
    }

    #[test]
    fn bimodal_only_ever_returns_the_two_configured_values() {
        let d = Bimodal::new(0.9, 1.0, 10.0);
        let mut rng = StdRng::seed_from_u64(4);
        for _ in 0..200 {
            let s = d.sample(&mut rng);
            assert!(s == 1.0 || s == 10.0, "unexpected sample {s}");
        }
    }

    #[test]
    fn bimodal_favors_small_value_at_high_p() {
        let d = Bimodal::new(0.9, 1.0, 10.0);
        let mut rng = StdRng::seed_from_u64(5);
        let small_count = (0..10_000).filter(|_| d.sample(&mut rng) == 1.0).count();
        assert!(small_count > 8_500, "small_count was {small_count}");
    }
}
