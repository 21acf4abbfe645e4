//! Multi-objective Pareto archive.
//!
//! Tools for keeping the best trade-offs of a multi-objective run:
//! a dominance relation over fitness vectors, non-dominated front
//! extraction, NSGA ranking and a bounded archive that prunes by crowding
//! distance.
//!
//! # Key Types
//!
//! - [`Vector`]: fitness vector with per-objective comparison and distance
//! - [`ParetoFront`]: mutable set of mutually non-dominated elements
//! - [`ParetoSet`]: bounded archive folded over an evolution stream
//! - [`SizeRange`]: archive bounds (trim to `min` once above `max`)
//! - [`Candidate`]: solution payload paired with its fitness vector
//!
//! # Submodules
//!
//! - [`pareto`]: standalone dominance, front, rank and crowding functions
//!
//! # Concurrency
//!
//! Archives are plain owned values. To accumulate in parallel, build one
//! partial [`ParetoSet`] per worker and combine them with
//! [`ParetoSet::merge`] (see `ParetoSet::par_collect` with the `parallel`
//! feature).

mod candidate;
mod collector;
mod config;
mod error;
mod front;
pub mod pareto;
mod vector;

pub use candidate::Candidate;
pub use collector::{to_pareto_set, ParetoSet};
pub use config::{Optimize, SizeRange};
pub use error::ParetoError;
pub use front::ParetoFront;
pub use vector::Vector;
