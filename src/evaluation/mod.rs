//! Weighted objective over a [`crate::domain::SolutionData`] (spec §4.D).

pub mod objective;

pub use objective::evaluate_cost;
