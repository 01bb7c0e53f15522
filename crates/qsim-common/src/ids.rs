//! Identity types for actors and queues.
//!
//! Both are plain sequential counters, mirroring the runtime-process `PID`
//! convention this crate is modeled on: identity matters (queues with
//! identical contents are not interchangeable), but the value itself carries
//! no structure beyond uniqueness.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Unique identifier for a queue.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueueId(u64);

impl QueueId {
    /// Generate a fresh, globally unique queue id.
    pub fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        QueueId(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Debug for QueueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Q({})", self.0)
    }
}

impl fmt::Display for QueueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "q{}", self.0)
    }
}

/// Unique identifier for an actor (generator or processor).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActorId(u64);

impl ActorId {
    /// Generate a fresh, globally unique actor id.
    pub fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        ActorId(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Debug for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "A({})", self.0)
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a{}", self.0)
    }
}
