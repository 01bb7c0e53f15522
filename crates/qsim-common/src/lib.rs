//! Shared types for the queueing-network simulator.
//!
//! This crate carries only data: requests, queues, and the identity types
//! that let the engine and the workload actors refer to the same queue or
//! actor without aliasing through contents. It has no knowledge of virtual
//! time, scheduling, or statistics — those live in `qsim-engine`,
//! `qsim-dist`, `qsim-stats`, and `qsim-workload`.

pub mod ids;
pub mod queue;
pub mod request;

pub use ids::{ActorId, QueueId};
pub use queue::{Queue, QueueHandle};
pub use request::{Request, RequestVariant};
