//! Destroy/repair operators, the adaptive selector, and the ALNS driver
//! that ties them together (spec §4.F–§4.I).

pub mod alns;
pub mod construction;
pub mod destroy;
pub mod operator;
pub mod repair;

pub use alns::{run_alns, AlnsOutcome, IterationRecord, SegmentRecord};
pub use construction::greedy_construction;
