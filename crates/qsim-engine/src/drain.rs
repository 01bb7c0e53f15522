//! The terminal-sink contract statistics collectors implement.

use qsim_common::Request;

/// A sink for requests that have finished their journey through the
/// topology (or been dropped). Processors call [`RequestDrain::terminate_req`]
/// whenever a request leaves the simulated system; the engine calls
/// [`RequestDrain::print_stats`] on every registered drain, in registration
/// order, once virtual time reaches the run's threshold.
pub trait RequestDrain {
    fn terminate_req(&mut self, req: &Request, now: f64);

    fn print_stats(&self, now: f64);
}
