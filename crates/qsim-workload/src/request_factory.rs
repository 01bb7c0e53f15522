//! Chooses which [`Request`] variant a generator mints.

use qsim_common::{Request, RequestVariant};

/// Which capability set a generator's requests carry. `Run` never matches
/// on this directly -- it mints through [`RequestFactory::mint`] and lets
/// the downstream processors/drains pattern-match on `req.variant` as
/// needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestFactory {
    Plain,
    Stealable,
    Monitor,
}

impl RequestFactory {
    pub fn mint(&self, init_time: f64, service_time: f64) -> Request {
        let variant = match self {
            RequestFactory::Plain => RequestVariant::Plain,
            RequestFactory::Stealable => RequestVariant::Stealable { stolen: false },
            RequestFactory::Monitor => RequestVariant::Monitor {
                init_len: 0,
                final_len: 0,
            },
        };
        Request::new(init_time, service_time, variant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_factory_mints_plain_requests() {
        let req = RequestFactory::Plain.mint(1.0, 2.0);
        assert_eq!(req.variant, RequestVariant::Plain);
    }

    #[test]
    fn stealable_factory_starts_unstolen() {
        let req = RequestFactory::Stealable.mint(0.0, 1.0);
        assert_eq!(req.variant, RequestVariant::Stealable { stolen: false });
    }

    #[test]
    fn monitor_factory_starts_at_zero_lengths() {
        let req = RequestFactory::Monitor.mint(0.0, 1.0);
        assert_eq!(
            req.variant,
            RequestVariant::Monitor {
                init_len: 0,
                final_len: 0
            }
        );
    }
}
