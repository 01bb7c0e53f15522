//! Single-threaded, cooperative virtual-time simulation engine.
//!
//! This crate is the core of the queueing-network simulator: a discrete
//! event loop that drives many independent actor coroutines (generators,
//! processors) through a shared virtual clock. An actor never touches the
//! clock or the timer heap directly -- it calls [`ActorCtx`] methods, which
//! suspend its coroutine with a [`SchedEvent`] and resume it once the
//! [`Engine`] has advanced time or delivered a queue item.
//!
//! ## Modules
//!
//! - [`heap`]: indexed binary min-heap over pending timed waits.
//! - [`event`]: the three yield shapes (`Timer`/`Block`/`Linked`) an actor
//!   coroutine can suspend with, unified as one `PendingWait` record.
//! - [`coroutine`]: the `corosensei`-backed stackful coroutine wrapper that
//!   reifies an actor's `Run` behavior.
//! - [`actor_ctx`]: the contract ([`ActorCtx`]) every generator/processor
//!   runs against.
//! - [`engine`]: the scheduler itself ([`Engine`]).
//! - [`drain`]: the terminal-sink contract ([`RequestDrain`]) statistics
//!   collectors implement.

pub mod actor_ctx;
pub mod coroutine;
pub mod drain;
pub mod engine;
pub mod event;
pub mod heap;

pub use actor_ctx::ActorCtx;
pub use drain::RequestDrain;
pub use engine::Engine;
pub use event::SchedEvent;
