//! Read-only problem graph: nodes, distances, travel times, capacities,
//! neighbor pruning tables. Grounded on the teacher's `domain::types::ProblemInstance`
//! (a read-only graph + capacity bundle), generalized from a single-echelon
//! flat location list to the two-echelon node taxonomy.

use std::collections::HashMap;

use super::node::{physical_index, Customer, Depot, Node, NodeId, Satellite};

/// Read-only graph loaded once at startup. No method mutates `self`.
///
/// `nodes` holds exactly one entry per *physical* location — depot,
/// satellites (by their distribution-side id `dist_id`), and customers —
/// in that order, so `nodes[i]` is also row/column `i` of the distance and
/// travel-time matrices. A satellite's collection-side alias `coll_id`
/// equals `dist_id + total_nodes` and is never a separate `nodes` entry;
/// [`ProblemInstance::distance`]/[`ProblemInstance::travel_time`] resolve it
/// back to the same row via `% total_nodes`.
#[derive(Debug, Clone)]
pub struct ProblemInstance {
    pub nodes: Vec<Node>,
    pub depot: Depot,
    pub satellites: Vec<Satellite>,
    pub customers: Vec<Customer>,

    pub distance_matrix: Vec<Vec<f64>>,
    pub travel_time_matrix: Vec<Vec<f64>>,

    pub vehicle_speed: f64,
    pub fe_vehicle_capacity: f64,
    pub se_vehicle_capacity: f64,

    /// Count of physical nodes (depot + satellites + customers); also the
    /// modulus used to resolve a satellite's collection-side alias.
    pub total_nodes: usize,

    /// Top-K nearest customers per customer, used to prune the insertion
    /// search (`PRUNING_K_CUSTOMER_NEIGHBORS`).
    pub customer_neighbors: HashMap<NodeId, Vec<NodeId>>,
    /// Top-M nearest satellites per customer (`PRUNING_M_SATELLITE_NEIGHBORS`).
    pub satellite_neighbors: HashMap<NodeId, Vec<NodeId>>,
    /// Cap on SE route candidates considered per satellite during insertion
    /// (`PRUNING_N_SE_ROUTE_CANDIDATES`).
    pub pruning_n_se_route_candidates: usize,

    pub max_dist: f64,
    pub max_due_time: f64,
    pub max_demand: f64,
}

impl ProblemInstance {
    /// Builds a problem instance from physical nodes (one entry each for
    /// depot/satellite/customer, `coll_id` aliases excluded) plus the
    /// pruning parameters. Distance is Euclidean over node coordinates;
    /// travel time is distance divided by `vehicle_speed`.
    pub fn new(
        nodes: Vec<Node>,
        vehicle_speed: f64,
        fe_vehicle_capacity: f64,
        se_vehicle_capacity: f64,
        pruning_k_customer_neighbors: usize,
        pruning_m_satellite_neighbors: usize,
        pruning_n_se_route_candidates: usize,
    ) -> Self {
        let total_nodes = nodes.len();

        let depot = nodes
            .iter()
            .find_map(|n| match n {
                Node::Depot(d) => Some(d.clone()),
                _ => None,
            })
            .expect("problem instance must contain exactly one depot");

        let satellites: Vec<Satellite> = nodes
            .iter()
            .filter_map(|n| match n {
                Node::Satellite(s) => Some(s.clone()),
                _ => None,
            })
            .collect();

        let customers: Vec<Customer> = nodes
            .iter()
            .filter_map(|n| match n {
                Node::DeliveryCustomer(c) | Node::PickupCustomer(c) => Some(c.clone()),
                _ => None,
            })
            .collect();

        let mut distance_matrix = vec![vec![0.0; total_nodes]; total_nodes];
        for i in 0..total_nodes {
            for j in (i + 1)..total_nodes {
                let d = ((nodes[i].x() - nodes[j].x()).powi(2)
                    + (nodes[i].y() - nodes[j].y()).powi(2))
                .sqrt();
                distance_matrix[i][j] = d;
                distance_matrix[j][i] = d;
            }
        }

        let travel_time_matrix: Vec<Vec<f64>> = distance_matrix
            .iter()
            .map(|row| row.iter().map(|d| d / vehicle_speed).collect())
            .collect();

        let max_dist = distance_matrix
            .iter()
            .flatten()
            .copied()
            .fold(0.0_f64, f64::max);
        let max_due_time = customers
            .iter()
            .map(|c| c.due_time)
            .fold(0.0_f64, f64::max);
        let max_demand = customers.iter().map(|c| c.demand).fold(0.0_f64, f64::max);

        let mut instance = ProblemInstance {
            nodes,
            depot,
            satellites,
            customers,
            distance_matrix,
            travel_time_matrix,
            vehicle_speed,
            fe_vehicle_capacity,
            se_vehicle_capacity,
            total_nodes,
            customer_neighbors: HashMap::new(),
            satellite_neighbors: HashMap::new(),
            pruning_n_se_route_candidates,
            max_dist,
            max_due_time,
            max_demand,
        };

        instance.customer_neighbors =
            instance.build_customer_neighbors(pruning_k_customer_neighbors);
        instance.satellite_neighbors =
            instance.build_satellite_neighbors(pruning_m_satellite_neighbors);
        instance
    }

    fn build_customer_neighbors(&self, k: usize) -> HashMap<NodeId, Vec<NodeId>> {
        let mut out = HashMap::new();
        for c in &self.customers {
            let mut ranked: Vec<(NodeId, f64)> = self
                .customers
                .iter()
                .filter(|o| o.id != c.id)
                .map(|o| (o.id, self.distance(c.id, o.id)))
                .collect();
            ranked.sort_by(|a, b| a.1.total_cmp(&b.1));
            ranked.truncate(k);
            out.insert(c.id, ranked.into_iter().map(|(id, _)| id).collect());
        }
        out
    }

    fn build_satellite_neighbors(&self, m: usize) -> HashMap<NodeId, Vec<NodeId>> {
        let mut out = HashMap::new();
        for c in &self.customers {
            let mut ranked: Vec<(NodeId, f64)> = self
                .satellites
                .iter()
                .map(|s| (s.dist_id, self.distance(c.id, s.dist_id)))
                .collect();
            ranked.sort_by(|a, b| a.1.total_cmp(&b.1));
            ranked.truncate(m.max(1));
            out.insert(c.id, ranked.into_iter().map(|(id, _)| id).collect());
        }
        out
    }

    pub fn distance(&self, from: NodeId, to: NodeId) -> f64 {
        let i = physical_index(from, self.total_nodes);
        let j = physical_index(to, self.total_nodes);
        self.distance_matrix[i][j]
    }

    pub fn travel_time(&self, from: NodeId, to: NodeId) -> f64 {
        let i = physical_index(from, self.total_nodes);
        let j = physical_index(to, self.total_nodes);
        self.travel_time_matrix[i][j]
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[physical_index(id, self.total_nodes)]
    }

    pub fn customer(&self, id: NodeId) -> &Customer {
        self.node(id)
            .as_customer()
            .unwrap_or_else(|| panic!("node id {id} did not resolve to a customer"))
    }

    pub fn satellite_by_alias(&self, id: NodeId) -> &Satellite {
        self.satellites
            .iter()
            .find(|s| s.is_alias(id))
            .unwrap_or_else(|| panic!("node id {id} did not resolve to a satellite alias"))
    }

    /// Satellites ordered by non-decreasing distance from the depot,
    /// tie-broken by satellite id — the deterministic visiting order the
    /// FE kernel requires.
    pub fn satellites_by_depot_distance(&self) -> Vec<&Satellite> {
        let mut sats: Vec<&Satellite> = self.satellites.iter().collect();
        sats.sort_by(|a, b| {
            let da = self.distance(self.depot.id, a.dist_id);
            let db = self.distance(self.depot.id, b.dist_id);
            da.total_cmp(&db).then(a.dist_id.cmp(&b.dist_id))
        });
        sats
    }
}
