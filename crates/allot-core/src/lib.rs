//! Core types and the distribution engine for allot.
//!
//! This crate has no HTTP, database or logging dependencies. It turns a normalised record list and a roster snapshot into
//! an immutable [`distribution::DistributionSnapshot`]; storage backends and
//! transports depend on it, never the other way round.

pub mod agent;
pub mod distribution;
pub mod error;
pub mod partition;
pub mod record;
pub mod store;

pub use error::{Error, Result};
