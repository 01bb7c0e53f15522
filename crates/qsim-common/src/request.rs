//! The unit of simulated work flowing through queues.

/// A request in flight through the simulated topology.
///
/// `init_time` is stamped by the generator that minted the request and never
/// changes afterward. `service_time` starts as the full sampled service
/// demand and is only ever reduced, by a processor, via [`Request::sub_service_time`].
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub init_time: f64,
    pub service_time: f64,
    pub variant: RequestVariant,
}

/// The capability set a request variant carries beyond the base fields.
///
/// `Stealable` and `Monitor` exist for workloads that need steal-accounting
/// or queue-depth observation respectively; `Plain` carries neither.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestVariant {
    Plain,
    Stealable { stolen: bool },
    Monitor { init_len: usize, final_len: usize },
}

impl Request {
    /// Mint a new request at the given virtual time with the given variant.
    pub fn new(init_time: f64, service_time: f64, variant: RequestVariant) -> Self {
        Request {
            init_time,
            service_time,
            variant,
        }
    }

    /// `now - init_time`. Always `>= 0` for a request that has actually
    /// been dequeued by something running at virtual time `now`.
    pub fn delay(&self, now: f64) -> f64 {
        now - self.init_time
    }

    /// Subtract `amount` of simulated work from the residual service time.
    /// Clamped at zero to absorb float error from repeated quantum slicing.
    pub fn sub_service_time(&mut self, amount: f64) {
        self.service_time = (self.service_time - amount).max(0.0);
    }

    /// Mark a `Stealable` request as stolen. No-op on other variants.
    pub fn mark_stolen(&mut self) {
        if let RequestVariant::Stealable { stolen } = &mut self.variant {
            *stolen = true;
        }
    }

    /// Record the out-queue length a `Monitor` request observed at
    /// enqueue/dequeue time. No-op on other variants.
    pub fn set_init_len(&mut self, len: usize) {
        if let RequestVariant::Monitor { init_len, .. } = &mut self.variant {
            *init_len = len;
        }
    }

    pub fn set_final_len(&mut self, len: usize) {
        if let RequestVariant::Monitor { final_len, .. } = &mut self.variant {
            *final_len = len;
        }
    }
}
