//! Concrete random-variate distributions and file-backed playback tables.
//!
//! The distilled specification this crate implements leaves these as
//! "external collaborators, specified only by their sampling contract" --
//! one [`Distribution`] trait. This crate supplies the concrete samplers a
//! runnable CLI needs: [`Deterministic`], [`Exponential`], [`LogNormal`],
//! [`Bimodal`], and [`playback::PlaybackTable`] (which is two-dimensional --
//! CPU choice, then within-CPU sample choice -- so it is not itself a
//! `Distribution`).

mod distribution;
pub mod playback;

pub use distribution::{Bimodal, Deterministic, Distribution, Exponential, LogNormal};
pub use playback::PlaybackTable;
