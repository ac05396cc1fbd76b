//! Route feasibility kernel: the pure functions every destroy/repair
//! operator and the objective function evaluate against, plus a bounded
//! memoization cache for the hot path (spec §4.C, §9).

pub mod cache;
pub mod route;

pub use cache::SeEvalCache;
pub use route::{fe_evaluate, se_evaluate, EPS};
