//! Composable evolution streams and bounded Pareto archives.
//!
//! - **Engines**: an [`EvolutionEngine`](engine::EvolutionEngine) turns a
//!   start state into a lazy, generation-ordered stream of results.
//! - **Composition**: concatenated, cyclic, adaptive and hot-swappable
//!   engines, all engines themselves.
//! - **Multi-objective archiving**: Pareto dominance, front extraction,
//!   non-dominated ranking and a size-bounded archive pruned by crowding
//!   distance.
//! - **Genetic Algorithm**: a generational single-objective GA that plugs
//!   into the composition layer.
//!
//! # Architecture
//!
//! [`engine`] defines the stream contract. [`compose`] only ever talks to
//! that contract, never to a concrete algorithm. [`ga`] is one concrete
//! engine; [`moea`] consumes streams of any engine and folds them into a
//! Pareto set.
//!
//! # Features
//!
//! - `parallel`: rayon evaluation in the GA and
//!   `ParetoSet::par_collect`
//! - `serde`: `Serialize`/`Deserialize` for configuration and data types

pub mod compose;
pub mod engine;
pub mod ga;
pub mod moea;
