//! Insertion engine (spec §4.E): for one customer, enumerates placements
//! across the three action classes and returns the cheapest feasible one.
//!
//! Grounded on the teacher's `phases::core_logic::choose_best_candidate`
//! (enumerate candidate moves, evaluate each, keep the minimum), generalized
//! from a single flat neighbor list to the three two-echelon action classes.

use std::rc::Rc;

use tracing::warn;

use crate::config::Config;
use crate::domain::{FERouteData, NodeId, SERouteData, SolutionData};
use crate::evaluation::objective::{evaluate_cost, recompute_cost};
use crate::kernel::{fe_evaluate, se_evaluate};

/// The chosen placement for a customer, or the unset sentinel meaning "no
/// feasible option" (spec §4.E).
#[derive(Debug, Clone)]
pub enum InsertionAction {
    None,
    IntoExistingSe {
        customer_id: NodeId,
        se_idx: usize,
        fe_idx: usize,
        candidate_nodes: Vec<NodeId>,
        satellite_id: NodeId,
        start_time: f64,
    },
    NewSeOnNewFe {
        customer_id: NodeId,
        satellite_id: NodeId,
        candidate_nodes: Vec<NodeId>,
    },
    NewSeOnExistingFe {
        customer_id: NodeId,
        fe_idx: usize,
        satellite_id: NodeId,
        candidate_nodes: Vec<NodeId>,
    },
}

#[derive(Debug, Clone)]
pub struct InsertionOption {
    pub objective_increase: f64,
    pub action: InsertionAction,
}

impl InsertionOption {
    fn none() -> Self {
        InsertionOption {
            objective_increase: f64::INFINITY,
            action: InsertionAction::None,
        }
    }

    fn is_better(&self, other: &InsertionOption) -> bool {
        other.objective_increase < self.objective_increase
    }
}

fn hosting_fe(solution: &SolutionData, se_idx: usize) -> Option<usize> {
    solution
        .fe_routes
        .iter()
        .position(|fe| fe.serviced_se_route_indices.contains(&se_idx))
}

/// Enumerates all three action classes for `customer_id` against `solution`
/// and returns the cheapest feasible one (spec §4.E).
pub fn best_insertion(customer_id: NodeId, solution: &SolutionData, config: &Config) -> InsertionOption {
    let problem = solution.problem.clone();
    let current_cost = evaluate_cost(solution, config);
    let mut best = InsertionOption::none();

    // Action 1: insert into an existing SE route, at every internal position.
    // N-pruning (PRUNING_N_SE_ROUTE_CANDIDATES) caps how many SE routes per
    // satellite are tried, nearest-total-distance first.
    let mut by_satellite: std::collections::HashMap<NodeId, Vec<usize>> = std::collections::HashMap::new();
    for (idx, se) in solution.se_routes.iter().enumerate() {
        by_satellite.entry(se.satellite_id).or_default().push(idx);
    }
    for indices in by_satellite.values_mut() {
        indices.sort_by(|&a, &b| {
            solution.se_routes[a]
                .total_distance
                .total_cmp(&solution.se_routes[b].total_distance)
        });
        indices.truncate(problem.pruning_n_se_route_candidates.max(1));
    }

    for indices in by_satellite.values() {
        for &se_idx in indices {
            let se = &solution.se_routes[se_idx];
            let fe_idx = match hosting_fe(solution, se_idx) {
                Some(i) => i,
                None => continue,
            };
            let start_time = se.service_start_times[0];
            for pos in 1..se.nodes_id.len() {
                let mut candidate_nodes = se.nodes_id.clone();
                candidate_nodes.insert(pos, customer_id);
                let Some(new_se) = se_evaluate(&candidate_nodes, se.satellite_id, start_time, &problem) else {
                    continue;
                };
                let new_se_rc = Rc::new(new_se);
                let mut se_routes = solution.se_routes.clone();
                se_routes[se_idx] = new_se_rc;
                let hosted: Vec<Rc<SERouteData>> = solution.fe_routes[fe_idx]
                    .serviced_se_route_indices
                    .iter()
                    .map(|&i| se_routes[i].clone())
                    .collect();
                let serviced_indices = solution.fe_routes[fe_idx].serviced_se_route_indices.clone();
                let Some((schedule, total_distance, total_travel_time, route_deadline, refreshed)) =
                    fe_evaluate(&hosted, &problem)
                else {
                    continue;
                };
                for (&i, r) in serviced_indices.iter().zip(refreshed) {
                    se_routes[i] = r;
                }
                let new_fe = Rc::new(FERouteData {
                    serviced_se_route_indices: serviced_indices,
                    schedule,
                    total_distance,
                    total_travel_time,
                    route_deadline,
                });
                let mut fe_routes = solution.fe_routes.clone();
                fe_routes[fe_idx] = new_fe;

                let new_cost = recompute_cost(
                    fe_routes.iter().map(|r| r.as_ref()),
                    se_routes.iter().map(|r| r.as_ref()),
                    config,
                );
                let candidate = InsertionOption {
                    objective_increase: new_cost - current_cost,
                    action: InsertionAction::IntoExistingSe {
                        customer_id,
                        se_idx,
                        fe_idx,
                        candidate_nodes,
                        satellite_id: se.satellite_id,
                        start_time,
                    },
                };
                if best.is_better(&candidate) {
                    best = candidate;
                }
            }
        }
    }

    let candidate_satellites: Vec<NodeId> = problem
        .satellite_neighbors
        .get(&customer_id)
        .cloned()
        .unwrap_or_else(|| problem.satellites.iter().map(|s| s.dist_id).collect());

    // Action 2: singleton SE route on a brand-new FE route; closed-form
    // delta since both routes are new and independent of the rest.
    for &sat_id in &candidate_satellites {
        let sat = problem.satellite_by_alias(sat_id);
        let candidate_nodes = vec![sat.dist_id, customer_id, sat.coll_id];
        let Some(new_se) = se_evaluate(&candidate_nodes, sat.dist_id, 0.0, &problem) else {
            continue;
        };
        let new_se_rc = Rc::new(new_se);
        let Some((_, fe_distance, fe_travel_time, _, _)) = fe_evaluate(std::slice::from_ref(&new_se_rc), &problem)
        else {
            continue;
        };
        let primary = match config.primary_objective {
            crate::config::PrimaryObjective::Distance => new_se_rc.total_distance + fe_distance,
            crate::config::PrimaryObjective::TravelTime => new_se_rc.total_travel_time + fe_travel_time,
        };
        let mut delta = config.weight_primary * primary;
        if config.optimize_vehicle_count {
            delta += config.weight_fe_vehicle + config.weight_se_vehicle;
        }
        let candidate = InsertionOption {
            objective_increase: delta,
            action: InsertionAction::NewSeOnNewFe {
                customer_id,
                satellite_id: sat.dist_id,
                candidate_nodes,
            },
        };
        if best.is_better(&candidate) {
            best = candidate;
        }
    }

    // Action 3: singleton SE route hosted by an existing FE route.
    for &sat_id in &candidate_satellites {
        let sat = problem.satellite_by_alias(sat_id);
        let candidate_nodes = vec![sat.dist_id, customer_id, sat.coll_id];
        let Some(new_se) = se_evaluate(&candidate_nodes, sat.dist_id, 0.0, &problem) else {
            continue;
        };
        let new_se_rc = Rc::new(new_se);

        for (fe_idx, fe) in solution.fe_routes.iter().enumerate() {
            let mut hosted: Vec<Rc<SERouteData>> = fe
                .serviced_se_route_indices
                .iter()
                .map(|&i| solution.se_routes[i].clone())
                .collect();
            hosted.push(new_se_rc.clone());
            let Some((schedule, total_distance, total_travel_time, route_deadline, refreshed)) =
                fe_evaluate(&hosted, &problem)
            else {
                continue;
            };

            let mut se_routes = solution.se_routes.clone();
            for (&i, r) in fe.serviced_se_route_indices.iter().zip(&refreshed) {
                se_routes[i] = r.clone();
            }
            let new_se_idx = se_routes.len();
            se_routes.push(refreshed.last().unwrap().clone());

            let mut serviced = fe.serviced_se_route_indices.clone();
            serviced.push(new_se_idx);
            let new_fe = Rc::new(FERouteData {
                serviced_se_route_indices: serviced,
                schedule,
                total_distance,
                total_travel_time,
                route_deadline,
            });
            let mut fe_routes = solution.fe_routes.clone();
            fe_routes[fe_idx] = new_fe;

            let new_cost = recompute_cost(
                fe_routes.iter().map(|r| r.as_ref()),
                se_routes.iter().map(|r| r.as_ref()),
                config,
            );
            let candidate = InsertionOption {
                objective_increase: new_cost - current_cost,
                action: InsertionAction::NewSeOnExistingFe {
                    customer_id,
                    fe_idx,
                    satellite_id: sat.dist_id,
                    candidate_nodes: candidate_nodes.clone(),
                },
            };
            if best.is_better(&candidate) {
                best = candidate;
            }
        }
    }

    best
}

/// Commits an [`InsertionOption`] to a new [`SolutionData`]. Every touched
/// route is re-evaluated through the kernel from scratch; if that
/// re-evaluation disagrees with the search-time result (or simply fails),
/// the original solution is returned unchanged and the discrepancy is
/// logged rather than treated as fatal (spec §7 item 4, §9 Open Questions).
pub fn apply_insertion(option: &InsertionOption, solution: &SolutionData) -> SolutionData {
    let problem = solution.problem.clone();
    match &option.action {
        InsertionAction::None => solution.clone(),

        InsertionAction::IntoExistingSe {
            customer_id,
            se_idx,
            fe_idx,
            candidate_nodes,
            satellite_id,
            start_time,
        } => {
            let Some(new_se) = se_evaluate(candidate_nodes, *satellite_id, *start_time, &problem) else {
                warn!(customer_id, "apply_insertion: SE re-evaluation failed, reverting");
                return solution.clone();
            };
            let mut se_routes = solution.se_routes.clone();
            se_routes[*se_idx] = Rc::new(new_se);
            let serviced_indices = solution.fe_routes[*fe_idx].serviced_se_route_indices.clone();
            let hosted: Vec<Rc<SERouteData>> = serviced_indices.iter().map(|&i| se_routes[i].clone()).collect();
            let Some((schedule, total_distance, total_travel_time, route_deadline, refreshed)) =
                fe_evaluate(&hosted, &problem)
            else {
                warn!(customer_id, "apply_insertion: FE re-evaluation failed, reverting");
                return solution.clone();
            };
            for (&i, r) in serviced_indices.iter().zip(refreshed) {
                se_routes[i] = r;
            }
            let mut fe_routes = solution.fe_routes.clone();
            fe_routes[*fe_idx] = Rc::new(FERouteData {
                serviced_se_route_indices: serviced_indices,
                schedule,
                total_distance,
                total_travel_time,
                route_deadline,
            });
            let unserved = solution
                .unserved_customer_ids
                .iter()
                .copied()
                .filter(|id| id != customer_id)
                .collect();
            SolutionData::new(solution.problem.clone(), fe_routes, se_routes, unserved)
        }

        InsertionAction::NewSeOnNewFe {
            customer_id,
            satellite_id,
            candidate_nodes,
        } => {
            let Some(new_se) = se_evaluate(candidate_nodes, *satellite_id, 0.0, &problem) else {
                warn!(customer_id, "apply_insertion: new SE re-evaluation failed, reverting");
                return solution.clone();
            };
            let new_se_rc = Rc::new(new_se);
            let Some((schedule, total_distance, total_travel_time, route_deadline, refreshed)) =
                fe_evaluate(std::slice::from_ref(&new_se_rc), &problem)
            else {
                warn!(customer_id, "apply_insertion: new FE re-evaluation failed, reverting");
                return solution.clone();
            };
            let mut se_routes = solution.se_routes.clone();
            let new_se_idx = se_routes.len();
            se_routes.push(refreshed.into_iter().next().unwrap());
            let mut fe_routes = solution.fe_routes.clone();
            fe_routes.push(Rc::new(FERouteData {
                serviced_se_route_indices: vec![new_se_idx],
                schedule,
                total_distance,
                total_travel_time,
                route_deadline,
            }));
            let unserved = solution
                .unserved_customer_ids
                .iter()
                .copied()
                .filter(|id| id != customer_id)
                .collect();
            SolutionData::new(solution.problem.clone(), fe_routes, se_routes, unserved)
        }

        InsertionAction::NewSeOnExistingFe {
            customer_id,
            fe_idx,
            satellite_id,
            candidate_nodes,
        } => {
            let Some(new_se) = se_evaluate(candidate_nodes, *satellite_id, 0.0, &problem) else {
                warn!(customer_id, "apply_insertion: new SE re-evaluation failed, reverting");
                return solution.clone();
            };
            let new_se_rc = Rc::new(new_se);
            let mut se_routes = solution.se_routes.clone();
            let new_se_idx = se_routes.len();
            se_routes.push(new_se_rc.clone());

            let serviced_indices = solution.fe_routes[*fe_idx].serviced_se_route_indices.clone();
            let mut hosted: Vec<Rc<SERouteData>> = serviced_indices.iter().map(|&i| se_routes[i].clone()).collect();
            hosted.push(new_se_rc);
            let Some((schedule, total_distance, total_travel_time, route_deadline, refreshed)) =
                fe_evaluate(&hosted, &problem)
            else {
                warn!(customer_id, "apply_insertion: FE re-evaluation failed, reverting");
                return solution.clone();
            };
            for (&i, r) in serviced_indices.iter().zip(&refreshed) {
                se_routes[i] = r.clone();
            }
            se_routes[new_se_idx] = refreshed.last().unwrap().clone();
            let mut serviced = serviced_indices.clone();
            serviced.push(new_se_idx);
            let mut fe_routes = solution.fe_routes.clone();
            fe_routes[*fe_idx] = Rc::new(FERouteData {
                serviced_se_route_indices: serviced,
                schedule,
                total_distance,
                total_travel_time,
                route_deadline,
            });
            let unserved = solution
                .unserved_customer_ids
                .iter()
                .copied()
                .filter(|id| id != customer_id)
                .collect();
            SolutionData::new(solution.problem.clone(), fe_routes, se_routes, unserved)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Customer, Depot, Node, ProblemInstance, Satellite};
    use std::rc::Rc as StdRc;

    fn toy_problem() -> ProblemInstance {
        let nodes = vec![
            Node::Depot(Depot { id: 0, x: 0.0, y: 0.0 }),
            Node::Satellite(Satellite { dist_id: 1, coll_id: 4, x: 10.0, y: 0.0 }),
            Node::DeliveryCustomer(Customer {
                id: 2,
                x: 11.0,
                y: 0.0,
                service_time: 0.0,
                ready_time: 0.0,
                due_time: 1000.0,
                demand: 2.0,
                deadline: None,
            }),
            Node::PickupCustomer(Customer {
                id: 3,
                x: 12.0,
                y: 0.0,
                service_time: 0.0,
                ready_time: 0.0,
                due_time: 1000.0,
                demand: 1.0,
                deadline: Some(1000.0),
            }),
        ];
        ProblemInstance::new(nodes, 1.0, 20.0, 10.0, 5, 2, 4)
    }

    #[test]
    fn first_customer_opens_a_new_se_and_fe() {
        let problem = StdRc::new(toy_problem());
        let solution = SolutionData::empty(problem.clone());
        let config = Config::default();
        let option = best_insertion(2, &solution, &config);
        assert!(matches!(option.action, InsertionAction::NewSeOnNewFe { .. }));
        assert!(option.objective_increase.is_finite());
    }

    #[test]
    fn second_customer_prefers_existing_se_over_new_fe() {
        let problem = StdRc::new(toy_problem());
        let config = Config::default();
        let solution = SolutionData::empty(problem.clone());
        let first = best_insertion(2, &solution, &config);
        let solution = apply_insertion(&first, &solution);
        assert_eq!(solution.num_served(), 1);

        let second = best_insertion(3, &solution, &config);
        assert!(!matches!(second.action, InsertionAction::None));
        let solution = apply_insertion(&second, &solution);
        assert_eq!(solution.num_served(), 2);
        assert!(solution.served_and_unserved_partition_all_customers());
    }
}
