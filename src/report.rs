//! Textual solution reporting and feasibility validation (spec §6 "textual
//! and graphical reporting" collaborator — graphical output excluded,
//! textual only).
//!
//! Grounded on the teacher's `main::print_solution` (green/red colored
//! summary line plus a per-route dump), generalized from a single flat
//! route partition to FE/SE route pairs and the property checks of spec §8.

use colored::Colorize;

use crate::domain::SolutionData;
use crate::evaluation::objective::evaluate_cost;
use crate::kernel::EPS;
use crate::config::Config;

/// Prints a human-readable summary: cost, vehicle counts, per-route node
/// sequences, and unserved customers.
pub fn print_solution_details(solution: &SolutionData, config: &Config) {
    let cost = evaluate_cost(solution, config);
    let feasible = validate_solution_feasibility(solution).is_empty();

    if feasible {
        println!(
            "{}",
            format!(
                "cost {:.2} | {} FE routes, {} SE routes | {} unserved",
                cost,
                solution.fe_routes.len(),
                solution.se_routes.len(),
                solution.unserved_customer_ids.len()
            )
            .green()
        );
    } else {
        println!(
            "{}",
            format!("cost {:.2} | FEASIBILITY VIOLATIONS DETECTED", cost).red()
        );
    }

    for (fe_idx, fe) in solution.fe_routes.iter().enumerate() {
        println!(
            "FE[{fe_idx}] dist={:.2} tt={:.2} deadline={:.2} serviced_se={:?}",
            fe.total_distance, fe.total_travel_time, fe.route_deadline, fe.serviced_se_route_indices
        );
    }
    for (se_idx, se) in solution.se_routes.iter().enumerate() {
        println!(
            "SE[{se_idx}] satellite={} nodes={:?} delivery={:.2} pickup={:.2}",
            se.satellite_id, se.nodes_id, se.total_delivery_load, se.total_pickup_load
        );
    }
    if !solution.unserved_customer_ids.is_empty() {
        println!("{}", format!("unserved: {:?}", solution.unserved_customer_ids).yellow());
    }
}

/// Checks the solution against the invariants of spec §8 properties 1-3 and
/// returns a human-readable description of each violation found (empty if
/// none).
pub fn validate_solution_feasibility(solution: &SolutionData) -> Vec<String> {
    let mut violations = Vec::new();
    let problem = &solution.problem;

    if !solution.served_and_unserved_partition_all_customers() {
        violations.push("served/unserved ids do not partition the customer set".to_string());
    }

    for (idx, se) in solution.se_routes.iter().enumerate() {
        let sat = problem.satellite_by_alias(se.satellite_id);
        if se.nodes_id.first() != Some(&sat.dist_id) || se.nodes_id.last() != Some(&sat.coll_id) {
            violations.push(format!("SE[{idx}] does not start/end at its satellite's aliases"));
        }
        if se.total_delivery_load > problem.se_vehicle_capacity + EPS {
            violations.push(format!("SE[{idx}] delivery load exceeds capacity"));
        }
        for &cid in solution
            .se_routes
            .get(idx)
            .map(|s| s.customer_ids().collect::<Vec<_>>())
            .unwrap_or_default()
            .iter()
        {
            let pos = se.nodes_id.iter().position(|&n| n == cid).unwrap();
            let due = problem.customer(cid).due_time;
            if se.service_start_times[pos] > due + EPS {
                violations.push(format!("SE[{idx}] customer {cid} served after its due time"));
            }
        }
    }

    for (idx, fe) in solution.fe_routes.iter().enumerate() {
        if let Some(arrival) = fe.arrival_at_depot() {
            if arrival > fe.route_deadline + EPS {
                violations.push(format!("FE[{idx}] arrives after its route_deadline"));
            }
        }
    }

    violations
}
