//! Problem-instance CSV loader (spec §6 collaborator "problem-instance
//! parsing from CSV" — out of scope for the core, wired in here as an
//! external caller of [`ProblemInstance::new`]).
//!
//! Grounded on the teacher's `fixtures::data_generator::read_customer_postals_from_csv`
//! (headerless/headered `csv::ReaderBuilder` with trimmed fields), adapted
//! from a one-column postal-code list to the full node row schema.

use csv::ReaderBuilder;
use tracing::{info, warn};

use crate::config::Config;
use crate::domain::{Customer, Depot, Node, ProblemInstance, Satellite};
use crate::error::InstanceLoadError;

/// Row schema: `id,kind,x,y,service_time,ready_time,due_time,demand,deadline,satellite_group`.
///
/// `kind` is one of `DEPOT`, `SATELLITE`, `DELIVERY`, `PICKUP`. `deadline`
/// is empty for everything but pickups. `satellite_group` is only read for
/// `SATELLITE` rows and becomes the satellite's collection-side alias
/// offset grouping; in this loader a satellite's `dist_id` is its CSV row
/// position and `coll_id = dist_id + total_nodes`, matching
/// [`crate::domain::node::physical_index`].
pub fn load_instance(path: &str, config: &Config) -> Result<ProblemInstance, InstanceLoadError> {
    info!(path, "loading problem instance");

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let mut nodes = Vec::new();
    let mut next_id: usize = 0;

    for (line, row) in reader.records().enumerate() {
        let record = row?;
        let kind = record.get(1).unwrap_or("").to_uppercase();
        let x: f64 = parse_field(&record, 2, line)?;
        let y: f64 = parse_field(&record, 3, line)?;
        let id = next_id;
        next_id += 1;

        let node = match kind.as_str() {
            "DEPOT" => Node::Depot(Depot { id, x, y }),
            "SATELLITE" => Node::Satellite(Satellite {
                dist_id: id,
                // Resolved to a concrete value once total_nodes is known, below.
                coll_id: id,
                x,
                y,
            }),
            "DELIVERY" | "PICKUP" => {
                let service_time = parse_field(&record, 4, line)?;
                let ready_time = parse_field(&record, 5, line)?;
                let due_time = parse_field(&record, 6, line)?;
                let demand = parse_field(&record, 7, line)?;
                let deadline = record
                    .get(8)
                    .map(|s| s.trim())
                    .filter(|s| !s.is_empty())
                    .map(|s| s.parse::<f64>())
                    .transpose()
                    .map_err(|_| InstanceLoadError::MalformedRow {
                        line,
                        reason: "deadline is not a number".to_string(),
                    })?;
                let customer = Customer {
                    id,
                    x,
                    y,
                    service_time,
                    ready_time,
                    due_time,
                    demand,
                    deadline,
                };
                if kind == "PICKUP" {
                    if deadline.is_none() {
                        warn!(line, "pickup customer has no deadline; treating as unconstrained");
                    }
                    Node::PickupCustomer(customer)
                } else {
                    Node::DeliveryCustomer(customer)
                }
            }
            other => {
                return Err(InstanceLoadError::MalformedRow {
                    line,
                    reason: format!("unknown node kind {other:?}"),
                })
            }
        };
        nodes.push(node);
    }

    if !nodes.iter().any(|n| matches!(n, Node::Depot(_))) {
        return Err(InstanceLoadError::MissingDepot);
    }

    let total_nodes = nodes.len();
    for node in &mut nodes {
        if let Node::Satellite(s) = node {
            s.coll_id = s.dist_id + total_nodes;
        }
    }

    info!(total_nodes, "instance loaded");

    Ok(ProblemInstance::new(
        nodes,
        config.vehicle_speed,
        config.fe_vehicle_capacity,
        config.se_vehicle_capacity,
        config.pruning_k_customer_neighbors,
        config.pruning_m_satellite_neighbors,
        config.pruning_n_se_route_candidates,
    ))
}

fn parse_field(record: &csv::StringRecord, col: usize, line: usize) -> Result<f64, InstanceLoadError> {
    record
        .get(col)
        .ok_or_else(|| InstanceLoadError::MalformedRow {
            line,
            reason: format!("missing column {col}"),
        })?
        .parse::<f64>()
        .map_err(|_| InstanceLoadError::MalformedRow {
            line,
            reason: format!("column {col} is not a number"),
        })
}
