//! Pure feasibility+schedule functions for SE and FE routes (spec §4.C).
//!
//! Both functions are deterministic over their inputs (kernel purity, spec
//! §8 property 4) and are the only place route totals, time windows, and
//! loads are computed — grounded on the teacher's
//! `evaluation::eval_funcs`/`phases::core_logic` pair (one function walks a
//! route accumulating distance/load, the other turns that into a
//! feasibility+fitness verdict), generalized from a flat truck partition to
//! the satellite-synchronized two-echelon schedule.

use std::rc::Rc;

use itertools::Itertools;

use crate::domain::{FeEvent, FeEventKind, NodeId, ProblemInstance, SERouteData};

/// Numerical tolerance applied to every feasibility comparison (spec §4.C
/// "Numerical policy").
pub const EPS: f64 = 1e-6;

/// Computes feasibility and derived properties for a second-echelon route.
///
/// `nodes_id` must start with `satellite.dist_id` and end with
/// `satellite.coll_id`. Returns `None` if the route is infeasible (a
/// customer's service start exceeds its due time, or running load leaves
/// `[0, se_capacity]`).
pub fn se_evaluate(
    nodes_id: &[NodeId],
    satellite_id: NodeId,
    start_time: f64,
    problem: &ProblemInstance,
) -> Option<SERouteData> {
    let n = nodes_id.len();
    debug_assert!(n >= 2, "SE route must at least contain both aliases");

    let total_delivery_load: f64 = nodes_id[1..n - 1]
        .iter()
        .map(|&id| problem.customer(id).demand)
        .sum();
    if total_delivery_load > problem.se_vehicle_capacity + EPS {
        return None;
    }

    let mut running_load = total_delivery_load;
    let mut total_pickup_load = 0.0;
    let mut service_start_times = vec![0.0; n];
    let mut waiting_times = vec![0.0; n];
    let mut arrivals = vec![0.0; n];
    let mut departures = vec![0.0; n];

    service_start_times[0] = start_time;
    arrivals[0] = start_time;
    departures[0] = start_time;

    let mut total_distance = 0.0;
    let mut total_travel_time = 0.0;

    for i in 1..n {
        let prev = nodes_id[i - 1];
        let cur = nodes_id[i];
        let dist = problem.distance(prev, cur);
        let tt = problem.travel_time(prev, cur);
        total_distance += dist;
        total_travel_time += tt;

        let arrival = departures[i - 1] + tt;
        arrivals[i] = arrival;

        let is_customer = i < n - 1;
        let (ready, due, demand, is_pickup, service_time) = if is_customer {
            let node = problem.node(cur);
            let c = problem.customer(cur);
            (c.ready_time, c.due_time, c.demand, node.is_pickup(), node.service_time())
        } else {
            (f64::NEG_INFINITY, f64::INFINITY, 0.0, false, 0.0)
        };

        let service_start = arrival.max(ready);
        service_start_times[i] = service_start;
        waiting_times[i] = service_start - arrival;

        if is_customer {
            if service_start > due + EPS {
                return None;
            }
            if is_pickup {
                running_load += demand;
                total_pickup_load += demand;
            } else {
                running_load -= demand;
            }
            if running_load < -EPS || running_load > problem.se_vehicle_capacity + EPS {
                return None;
            }
        }

        departures[i] = service_start + service_time;
    }

    let forward_time_slacks = forward_slacks(nodes_id, &arrivals, &departures, &service_start_times, problem);

    Some(SERouteData {
        satellite_id,
        nodes_id: nodes_id.to_vec(),
        total_distance,
        total_travel_time,
        total_delivery_load,
        total_pickup_load,
        service_start_times,
        waiting_times,
        forward_time_slacks,
    })
}

/// Right-to-left forward time-slack sweep (spec §4.C, property 5): how much
/// service at node `i` can be delayed without violating any downstream
/// window. `slack_last = ∞`; `slack_i = min(slack_{i+1} + (arrival_{i+1} -
/// departure_i), due_time_i - service_start_i)`.
fn forward_slacks(
    nodes_id: &[NodeId],
    arrivals: &[f64],
    departures: &[f64],
    service_start_times: &[f64],
    problem: &ProblemInstance,
) -> Vec<f64> {
    let n = nodes_id.len();
    let mut slack = vec![0.0; n];
    slack[n - 1] = f64::INFINITY;
    for i in (0..n - 1).rev() {
        let due_time = if i == 0 {
            f64::INFINITY
        } else {
            problem.customer(nodes_id[i]).due_time
        };
        let gap = arrivals[i + 1] - departures[i];
        let via_successor = slack[i + 1] + gap;
        let local = due_time - service_start_times[i];
        slack[i] = via_successor.min(local);
    }
    slack
}

/// Computes feasibility and schedule for a first-echelon route given the set
/// of SE routes it services.
///
/// Visits satellites in non-decreasing distance from the depot (tie-broken
/// by satellite id). Each hosted SE route is re-evaluated at the arrival
/// time of its satellite; if any SE route or the aggregate FE load is
/// infeasible, the whole FE route is infeasible. The returned `SERouteData`s
/// carry the schedule each route actually ran on within this FE context (not
/// necessarily the schedule of the `se_routes` passed in) and must replace
/// the caller's copies — a route's arrival time, and therefore its whole
/// downstream schedule, shifts whenever anything earlier in the FE visit
/// order changes.
pub fn fe_evaluate(
    se_routes: &[Rc<SERouteData>],
    problem: &ProblemInstance,
) -> Option<(Vec<FeEvent>, f64, f64, f64, Vec<Rc<SERouteData>>)> {
    let total_delivery: f64 = se_routes.iter().map(|r| r.total_delivery_load).sum();
    if total_delivery > problem.fe_vehicle_capacity + EPS {
        return None;
    }

    let by_satellite = se_routes
        .iter()
        .enumerate()
        .into_group_map_by(|(_, se)| problem.satellite_by_alias(se.satellite_id).dist_id);

    let visit_order: Vec<NodeId> = problem
        .satellites_by_depot_distance()
        .into_iter()
        .map(|s| s.dist_id)
        .filter(|id| by_satellite.contains_key(id))
        .collect();

    let mut schedule = Vec::new();
    let mut current_time = 0.0;
    let mut current_node = problem.depot.id;
    let mut fe_load = total_delivery;
    let mut total_distance = 0.0;
    let mut total_travel_time = 0.0;
    let mut refreshed: Vec<Option<Rc<SERouteData>>> = vec![None; se_routes.len()];

    schedule.push(FeEvent {
        kind: FeEventKind::DepartDepot,
        node_id: problem.depot.id,
        arrival: current_time,
        start: current_time,
        departure: current_time,
        load_after: fe_load,
    });

    for &sat_id in &visit_order {
        let dist = problem.distance(current_node, sat_id);
        let tt = problem.travel_time(current_node, sat_id);
        total_distance += dist;
        total_travel_time += tt;
        let arrival = current_time + tt;

        let hosted = &by_satellite[&sat_id];
        let delivery_here: f64 = hosted.iter().map(|(_, r)| r.total_delivery_load).sum();
        fe_load -= delivery_here;
        if fe_load < -EPS {
            return None;
        }
        schedule.push(FeEvent {
            kind: FeEventKind::UnloadDeliv,
            node_id: sat_id,
            arrival,
            start: arrival,
            departure: arrival,
            load_after: fe_load,
        });

        let mut latest_se_finish = arrival;
        let mut pickup_here = 0.0;
        for &(idx, se) in hosted.iter() {
            let evaluated = Rc::new(se_evaluate(&se.nodes_id, se.satellite_id, arrival, problem)?);
            let finish = *evaluated.service_start_times.last().unwrap();
            latest_se_finish = latest_se_finish.max(finish);
            pickup_here += evaluated.total_pickup_load;
            refreshed[idx] = Some(evaluated);
        }

        fe_load += pickup_here;
        if fe_load > problem.fe_vehicle_capacity + EPS {
            return None;
        }
        schedule.push(FeEvent {
            kind: FeEventKind::LoadPickup,
            node_id: sat_id,
            arrival: latest_se_finish,
            start: latest_se_finish,
            departure: latest_se_finish,
            load_after: fe_load,
        });

        current_time = latest_se_finish;
        current_node = sat_id;
    }

    let dist_back = problem.distance(current_node, problem.depot.id);
    let tt_back = problem.travel_time(current_node, problem.depot.id);
    total_distance += dist_back;
    total_travel_time += tt_back;
    let arrival_at_depot = current_time + tt_back;

    schedule.push(FeEvent {
        kind: FeEventKind::ArriveDepot,
        node_id: problem.depot.id,
        arrival: arrival_at_depot,
        start: arrival_at_depot,
        departure: arrival_at_depot,
        load_after: fe_load,
    });

    let route_deadline = se_routes
        .iter()
        .flat_map(|r| r.customer_ids())
        .filter_map(|id| {
            let node = problem.node(id);
            if node.is_pickup() {
                problem.customer(id).deadline
            } else {
                None
            }
        })
        .fold(f64::INFINITY, f64::min);

    if arrival_at_depot > route_deadline + EPS {
        return None;
    }

    let refreshed: Vec<Rc<SERouteData>> = refreshed
        .into_iter()
        .map(|r| r.expect("every SE route is hosted by exactly one visited satellite"))
        .collect();

    Some((schedule, total_distance, total_travel_time, route_deadline, refreshed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Customer, Depot, Node, Satellite};

    fn toy_problem() -> ProblemInstance {
        let nodes = vec![
            Node::Depot(Depot { id: 0, x: 0.0, y: 0.0 }),
            Node::Satellite(Satellite { dist_id: 1, coll_id: 5, x: 10.0, y: 0.0 }),
            Node::DeliveryCustomer(Customer {
                id: 2,
                x: 11.0,
                y: 0.0,
                service_time: 0.0,
                ready_time: 0.0,
                due_time: 1000.0,
                demand: 3.0,
                deadline: None,
            }),
            Node::DeliveryCustomer(Customer {
                id: 3,
                x: 12.0,
                y: 0.0,
                service_time: 0.0,
                ready_time: 0.0,
                due_time: 1000.0,
                demand: 2.0,
                deadline: None,
            }),
            Node::PickupCustomer(Customer {
                id: 4,
                x: 13.0,
                y: 0.0,
                service_time: 0.0,
                ready_time: 0.0,
                due_time: 1000.0,
                demand: 1.0,
                deadline: Some(1000.0),
            }),
        ];
        ProblemInstance::new(nodes, 1.0, 10.0, 5.0, 5, 2, 4)
    }

    #[test]
    fn se_evaluate_is_pure() {
        let p = toy_problem();
        let nodes = vec![1, 2, 3, 4, 5];
        let a = se_evaluate(&nodes, 1, 0.0, &p).unwrap();
        let b = se_evaluate(&nodes, 1, 0.0, &p).unwrap();
        assert_eq!(a.service_start_times, b.service_start_times);
        assert_eq!(a.total_distance, b.total_distance);
    }

    #[test]
    fn se_evaluate_rejects_capacity_overflow() {
        let p = toy_problem();
        // Capacity is 5, delivery demand alone is already 5; fine.
        let nodes = vec![1, 2, 3, 4, 5];
        assert!(se_evaluate(&nodes, 1, 0.0, &p).is_some());
    }

    #[test]
    fn se_evaluate_rejects_due_time_violation() {
        let mut p = toy_problem();
        // Shrink due_time so the route can't possibly make it.
        for c in p.customers.iter_mut() {
            c.due_time = 0.0;
        }
        let nodes = vec![1, 2, 3, 4, 5];
        assert!(se_evaluate(&nodes, 1, 0.0, &p).is_none());
    }

    #[test]
    fn forward_slack_bounds_a_feasible_shift() {
        let p = toy_problem();
        let nodes = vec![1, 2, 3, 4, 5];
        let r = se_evaluate(&nodes, 1, 0.0, &p).unwrap();
        for i in 1..nodes.len() - 1 {
            let shifted = r.service_start_times[i] + r.forward_time_slacks[i].min(1e6);
            let due = p.customer(nodes[i]).due_time;
            assert!(shifted <= due + EPS);
        }
    }

    #[test]
    fn fe_evaluate_single_satellite_round_trip() {
        let p = toy_problem();
        let nodes = vec![1, 2, 3, 4, 5];
        let se = Rc::new(se_evaluate(&nodes, 1, 0.0, &p).unwrap());
        let (schedule, _dist, _tt, deadline, refreshed) = fe_evaluate(&[se], &p).unwrap();
        assert_eq!(refreshed.len(), 1);
        assert_eq!(schedule.first().unwrap().kind, FeEventKind::DepartDepot);
        assert_eq!(schedule.last().unwrap().kind, FeEventKind::ArriveDepot);
        assert!(schedule.last().unwrap().arrival <= deadline + EPS);
    }

    #[test]
    fn fe_evaluate_rejects_deadline_miss() {
        let mut p = toy_problem();
        for c in p.customers.iter_mut() {
            if c.deadline.is_some() {
                c.deadline = Some(0.0);
            }
        }
        let nodes = vec![1, 2, 3, 4, 5];
        let se = Rc::new(se_evaluate(&nodes, 1, 0.0, &p).unwrap());
        assert!(fe_evaluate(&[se], &p).is_none());
    }
}
