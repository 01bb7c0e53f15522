//! Generators, processors, and topology builders for the queueing-network
//! simulator.
//!
//! This crate supplies the concrete actor bodies the distilled specification
//! calls "core (because they exercise the engine's contracts)": generators
//! (§4.6) and the three processor disciplines plus the bounded-admission
//! pair (§4.7, §4.8). Every body here is a plain function over
//! [`qsim_engine::ActorCtx`] rather than a trait object -- each is spawned
//! exactly once as a coroutine body and never needs dynamic dispatch among
//! its siblings.

pub mod bounded;
pub mod generator;
pub mod ps;
pub mod request_factory;
pub mod rtc;
pub mod topology;
pub mod ts;

pub use generator::{generator_body, Dispatch, ServiceSource};
pub use request_factory::RequestFactory;
pub use topology::{build_bounded, build_per_queue, build_single_queue, ProcessorKind};
