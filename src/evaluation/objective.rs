//! Primary-cost + vehicle-count weighted objective (spec §4.D).
//!
//! Grounded on the teacher's `evaluation` module shape (a single function
//! turning route totals into one scalar fitness number), generalized from
//! a flat single-echelon total-distance sum to the two-echelon weighted
//! form with a configurable primary metric.

use crate::config::{Config, PrimaryObjective};
use crate::domain::{FERouteData, SERouteData, SolutionData};

/// Total weighted cost of a solution (spec §4.D). `+ f64::INFINITY` is
/// never produced here directly — an infeasible candidate never reaches
/// this function as a [`SolutionData`], since the kernel already refused
/// to construct its routes. Collaborators that *recompute* routes before
/// they exist as a `SolutionData` (the insertion engine) should use
/// [`recompute_cost`] instead and treat a `None` kernel result as +∞.
pub fn evaluate_cost(solution: &SolutionData, config: &Config) -> f64 {
    recompute_cost(
        solution.fe_routes.iter().map(|r| r.as_ref()),
        solution.se_routes.iter().map(|r| r.as_ref()),
        config,
    )
}

/// Same formula as [`evaluate_cost`] but over arbitrary route slices, so the
/// insertion engine can cost a candidate set of routes before committing
/// them to a [`SolutionData`].
pub fn recompute_cost<'a>(
    fe_routes: impl Iterator<Item = &'a FERouteData>,
    se_routes: impl Iterator<Item = &'a SERouteData>,
    config: &Config,
) -> f64 {
    let mut primary = 0.0;
    let mut fe_count: u64 = 0;
    let mut se_count: u64 = 0;

    for fe in fe_routes {
        primary += primary_of(fe.total_distance, fe.total_travel_time, config.primary_objective);
        fe_count += 1;
    }
    for se in se_routes {
        primary += primary_of(se.total_distance, se.total_travel_time, config.primary_objective);
        se_count += 1;
    }

    let mut cost = config.weight_primary * primary;
    if config.optimize_vehicle_count {
        cost += fe_count as f64 * config.weight_fe_vehicle;
        cost += se_count as f64 * config.weight_se_vehicle;
    }
    cost
}

fn primary_of(distance: f64, travel_time: f64, objective: PrimaryObjective) -> f64 {
    match objective {
        PrimaryObjective::Distance => distance,
        PrimaryObjective::TravelTime => travel_time,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FeEvent, FeEventKind, NodeId};

    fn se(total_distance: f64, total_travel_time: f64) -> SERouteData {
        SERouteData {
            satellite_id: 1 as NodeId,
            nodes_id: vec![1, 2, 5],
            total_distance,
            total_travel_time,
            total_delivery_load: 0.0,
            total_pickup_load: 0.0,
            service_start_times: vec![0.0; 3],
            waiting_times: vec![0.0; 3],
            forward_time_slacks: vec![0.0; 3],
        }
    }

    fn fe(total_distance: f64, total_travel_time: f64) -> FERouteData {
        FERouteData {
            serviced_se_route_indices: vec![0],
            schedule: vec![FeEvent {
                kind: FeEventKind::DepartDepot,
                node_id: 0,
                arrival: 0.0,
                start: 0.0,
                departure: 0.0,
                load_after: 0.0,
            }],
            total_distance,
            total_travel_time,
            route_deadline: f64::INFINITY,
        }
    }

    #[test]
    fn distance_and_travel_time_agree_when_speed_is_one() {
        let fe_routes = vec![fe(10.0, 10.0)];
        let se_routes = vec![se(5.0, 5.0)];

        let mut cfg_distance = Config::default();
        cfg_distance.primary_objective = PrimaryObjective::Distance;
        cfg_distance.optimize_vehicle_count = false;

        let mut cfg_time = cfg_distance.clone();
        cfg_time.primary_objective = PrimaryObjective::TravelTime;

        let cost_d = recompute_cost(fe_routes.iter(), se_routes.iter(), &cfg_distance);
        let cost_t = recompute_cost(fe_routes.iter(), se_routes.iter(), &cfg_time);
        assert!((cost_d - cost_t).abs() < 1e-9);
    }

    #[test]
    fn vehicle_count_terms_only_apply_when_enabled() {
        let fe_routes = vec![fe(1.0, 1.0)];
        let se_routes = vec![se(1.0, 1.0)];

        let mut cfg = Config::default();
        cfg.optimize_vehicle_count = false;
        let without = recompute_cost(fe_routes.iter(), se_routes.iter(), &cfg);

        cfg.optimize_vehicle_count = true;
        let with = recompute_cost(fe_routes.iter(), se_routes.iter(), &cfg);
        assert!(with > without);
    }
}
