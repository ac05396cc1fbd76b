//! Immutable route records and whole-solution record. Grounded on the
//! teacher's `domain::solution` (derived, read-only views over a `Route`),
//! generalized to the two-echelon record set and the customer→SE index.

use std::collections::HashMap;
use std::rc::Rc;

use super::node::NodeId;
use super::problem::ProblemInstance;

/// A single second-echelon route: satellite → customers → satellite.
///
/// `nodes_id` starts with the satellite's `dist_id` and ends with its
/// `coll_id`, customer ids in between. Per-node time-window bookkeeping is
/// parallel-indexed with `nodes_id` (index `i` describes arrival/service at
/// `nodes_id[i]`).
#[derive(Debug, Clone, PartialEq)]
pub struct SERouteData {
    pub satellite_id: NodeId,
    pub nodes_id: Vec<NodeId>,
    pub total_distance: f64,
    pub total_travel_time: f64,
    pub total_delivery_load: f64,
    pub total_pickup_load: f64,
    pub service_start_times: Vec<f64>,
    pub waiting_times: Vec<f64>,
    pub forward_time_slacks: Vec<f64>,
}

impl SERouteData {
    pub fn customer_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes_id[1..self.nodes_id.len() - 1].iter().copied()
    }

    pub fn is_empty_of_customers(&self) -> bool {
        self.nodes_id.len() <= 2
    }
}

/// A single event in a first-echelon schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FeEventKind {
    DepartDepot,
    UnloadDeliv,
    LoadPickup,
    ArriveDepot,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeEvent {
    pub kind: FeEventKind,
    pub node_id: NodeId,
    pub arrival: f64,
    pub start: f64,
    pub departure: f64,
    pub load_after: f64,
}

/// A single first-echelon route: depot → satellites → depot.
#[derive(Debug, Clone, PartialEq)]
pub struct FERouteData {
    /// Indices into the owning [`SolutionData::se_routes`] table.
    pub serviced_se_route_indices: Vec<usize>,
    pub schedule: Vec<FeEvent>,
    pub total_distance: f64,
    pub total_travel_time: f64,
    /// `min` over served PickupCustomers' deadlines, `f64::INFINITY` if none.
    pub route_deadline: f64,
}

impl FERouteData {
    pub fn arrival_at_depot(&self) -> Option<f64> {
        self.schedule
            .iter()
            .rev()
            .find(|e| e.kind == FeEventKind::ArriveDepot)
            .map(|e| e.arrival)
    }
}

/// The whole-solution record. Immutable: every accepted transition replaces
/// it wholesale (spec §3, §9 "persistent immutable state").
#[derive(Debug, Clone)]
pub struct SolutionData {
    pub problem: Rc<ProblemInstance>,
    pub fe_routes: Vec<Rc<FERouteData>>,
    pub se_routes: Vec<Rc<SERouteData>>,
    pub unserved_customer_ids: Vec<NodeId>,
    /// Derived: customer id → index into `se_routes`. Rebuilt on construction.
    pub customer_to_se_route_idx: HashMap<NodeId, usize>,
}

impl SolutionData {
    pub fn new(
        problem: Rc<ProblemInstance>,
        fe_routes: Vec<Rc<FERouteData>>,
        se_routes: Vec<Rc<SERouteData>>,
        unserved_customer_ids: Vec<NodeId>,
    ) -> Self {
        let mut customer_to_se_route_idx = HashMap::new();
        for (idx, se) in se_routes.iter().enumerate() {
            for cid in se.customer_ids() {
                customer_to_se_route_idx.insert(cid, idx);
            }
        }
        SolutionData {
            problem,
            fe_routes,
            se_routes,
            unserved_customer_ids,
            customer_to_se_route_idx,
        }
    }

    pub fn empty(problem: Rc<ProblemInstance>) -> Self {
        let unserved = problem.customers.iter().map(|c| c.id).collect();
        SolutionData::new(problem, Vec::new(), Vec::new(), unserved)
    }

    pub fn num_served(&self) -> usize {
        self.customer_to_se_route_idx.len()
    }

    /// Conservation check (spec §8 property 1): served ⊎ unserved = all ids,
    /// no duplicates. Used by tests and by the optional feasibility report.
    pub fn served_and_unserved_partition_all_customers(&self) -> bool {
        let mut seen: HashMap<NodeId, u32> = HashMap::new();
        for se in &self.se_routes {
            for cid in se.customer_ids() {
                *seen.entry(cid).or_insert(0) += 1;
            }
        }
        for &cid in &self.unserved_customer_ids {
            *seen.entry(cid).or_insert(0) += 1;
        }
        if seen.values().any(|&n| n != 1) {
            return false;
        }
        let all: std::collections::HashSet<NodeId> =
            self.problem.customers.iter().map(|c| c.id).collect();
        let covered: std::collections::HashSet<NodeId> = seen.keys().copied().collect();
        all == covered
    }
}

/// Wraps a [`SolutionData`] with a lazily computed cost cache. Copying is
/// shallow — the inner data is persistent (reference counted).
#[derive(Debug, Clone)]
pub struct SearchState {
    pub solution: SolutionData,
    cost: std::cell::Cell<Option<f64>>,
}

impl SearchState {
    pub fn new(solution: SolutionData) -> Self {
        SearchState {
            solution,
            cost: std::cell::Cell::new(None),
        }
    }

    /// Returns the cached cost, computing it with `compute` on first access.
    pub fn cost_with(&self, compute: impl FnOnce(&SolutionData) -> f64) -> f64 {
        if let Some(c) = self.cost.get() {
            return c;
        }
        let c = compute(&self.solution);
        self.cost.set(Some(c));
        c
    }
}
