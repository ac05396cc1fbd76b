//! The immutable solution data model and the read-only problem graph it is
//! evaluated against (spec §3, §4.A).

pub mod node;
pub mod problem;
pub mod solution;

pub use node::{Customer, Depot, Node, NodeId, Satellite};
pub use problem::ProblemInstance;
pub use solution::{FERouteData, FeEvent, FeEventKind, SERouteData, SearchState, SolutionData};
