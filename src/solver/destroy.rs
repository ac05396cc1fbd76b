//! Destroy operators (spec §4.F): random, Shaw relatedness-based, and
//! worst-cost removal, sharing one post-removal rebuild helper.
//!
//! Grounded on the teacher's `solver::tabu_search::neighborhood` (candidate
//! selection biased by a scoring function over pairs of locations),
//! generalized from a single scoring pass to the three removal strategies
//! plus the two-echelon rebuild they share.

use std::rc::Rc;
use tracing::debug;

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::config::{Config, PrimaryObjective};
use crate::domain::{NodeId, ProblemInstance, SERouteData, SolutionData};
use crate::kernel::{fe_evaluate, se_evaluate};

/// Picks `min(q, |served|)` served customers uniformly without replacement.
pub fn random_removal(
    solution: &SolutionData,
    q: usize,
    rng: &mut ChaCha8Rng,
    _config: &Config,
) -> (SolutionData, Vec<NodeId>) {
    let mut served: Vec<NodeId> = solution.customer_to_se_route_idx.keys().copied().collect();
    served.sort_unstable();
    let n = q.min(served.len());
    let mut chosen = Vec::with_capacity(n);
    for _ in 0..n {
        let idx = rng.gen_range(0..served.len());
        chosen.push(served.swap_remove(idx));
    }
    rebuild_after_removal(solution, &chosen)
}

fn relatedness(
    problem: &ProblemInstance,
    solution: &SolutionData,
    a: NodeId,
    b: NodeId,
) -> f64 {
    let dist_hat = problem.distance(a, b) / problem.max_dist.max(1e-9);

    let start_a = service_start_of(solution, a);
    let start_b = service_start_of(solution, b);
    let dstart_hat = (start_a - start_b).abs() / problem.max_due_time.max(1e-9);

    let demand_a = problem.customer(a).demand;
    let demand_b = problem.customer(b).demand;
    let ddemand_hat = (demand_a - demand_b).abs() / problem.max_demand.max(1e-9);

    let same_route = solution.customer_to_se_route_idx.get(&a) == solution.customer_to_se_route_idx.get(&b);
    let different_route = if same_route { 0.0 } else { 1.0 };

    9.0 * dist_hat + 3.0 * dstart_hat + 2.0 * ddemand_hat + 5.0 * different_route
}

fn service_start_of(solution: &SolutionData, customer_id: NodeId) -> f64 {
    let se_idx = solution.customer_to_se_route_idx[&customer_id];
    let se = &solution.se_routes[se_idx];
    let pos = se.nodes_id.iter().position(|&id| id == customer_id).expect("customer indexed to its SE route");
    se.service_start_times[pos]
}

/// Shaw relatedness removal (spec §4.F): grows a seed customer into a
/// cluster of `q` related customers, biasing each pick toward the most
/// related candidate via `random()^p`.
pub fn shaw_removal(
    solution: &SolutionData,
    q: usize,
    rng: &mut ChaCha8Rng,
    _config: &Config,
) -> (SolutionData, Vec<NodeId>) {
    const P: f64 = 6.0;
    let problem = solution.problem.clone();
    let mut served: Vec<NodeId> = solution.customer_to_se_route_idx.keys().copied().collect();
    served.sort_unstable();
    if served.is_empty() {
        return rebuild_after_removal(solution, &[]);
    }

    let seed_idx = rng.gen_range(0..served.len());
    let mut removed = vec![served.remove(seed_idx)];

    while removed.len() < q && !served.is_empty() {
        let bait = removed[rng.gen_range(0..removed.len())];
        let mut ranked: Vec<(usize, f64)> = served
            .iter()
            .enumerate()
            .map(|(i, &c)| (i, relatedness(&problem, solution, bait, c)))
            .collect();
        ranked.sort_by(|a, b| a.1.total_cmp(&b.1));
        let pick = ((rng.gen::<f64>().powf(P)) * ranked.len() as f64).floor() as usize;
        let pick = pick.min(ranked.len() - 1);
        let (served_idx, _) = ranked[pick];
        removed.push(served.remove(served_idx));
    }

    debug!(?removed, "shaw_removal selected cluster");
    rebuild_after_removal(solution, &removed)
}

fn primary_cost(problem: &ProblemInstance, from: NodeId, to: NodeId, objective: PrimaryObjective) -> f64 {
    match objective {
        PrimaryObjective::Distance => problem.distance(from, to),
        PrimaryObjective::TravelTime => problem.travel_time(from, to),
    }
}

/// Worst-cost removal (spec §4.F): removes customers whose detour savings
/// are largest, biased toward the top of the ranking via `random()^p`.
pub fn worst_cost_removal(
    solution: &SolutionData,
    q: usize,
    rng: &mut ChaCha8Rng,
    config: &Config,
) -> (SolutionData, Vec<NodeId>) {
    const P: f64 = 3.0;
    let problem = &solution.problem;

    let mut savings: Vec<(NodeId, f64)> = Vec::new();
    for se in &solution.se_routes {
        for pos in 1..se.nodes_id.len() - 1 {
            let cust = se.nodes_id[pos];
            let prev = se.nodes_id[pos - 1];
            let next = se.nodes_id[pos + 1];
            let saving = primary_cost(problem, prev, cust, config.primary_objective)
                + primary_cost(problem, cust, next, config.primary_objective)
                - primary_cost(problem, prev, next, config.primary_objective);
            savings.push((cust, saving));
        }
    }
    savings.sort_by(|a, b| b.1.total_cmp(&a.1));

    let n = q.min(savings.len());
    let mut removed = Vec::with_capacity(n);
    for _ in 0..n {
        let pick = ((rng.gen::<f64>().powf(P)) * savings.len() as f64).floor() as usize;
        let pick = pick.min(savings.len() - 1);
        let (cust, _) = savings.remove(pick);
        removed.push(cust);
    }

    rebuild_after_removal(solution, &removed)
}

/// Shared post-removal rebuild (spec §4.F): removes each customer from its
/// hosting SE route, drops SE routes left with no customers, renumbers FE
/// serviced-index lists, and drops any FE route whose re-evaluation fails —
/// surrendering its remaining customers back to the unserved set so repair
/// can re-host them, possibly on a brand-new FE route.
pub fn rebuild_after_removal(solution: &SolutionData, to_remove: &[NodeId]) -> (SolutionData, Vec<NodeId>) {
    let problem = solution.problem.clone();
    let remove_set: std::collections::HashSet<NodeId> = to_remove.iter().copied().collect();

    // Pass 1: rebuild each touched SE route, dropping ones left empty.
    let mut new_se_routes: Vec<Rc<SERouteData>> = Vec::with_capacity(solution.se_routes.len());
    let mut remap: Vec<Option<usize>> = Vec::with_capacity(solution.se_routes.len());
    for se in &solution.se_routes {
        let touched = se.nodes_id.iter().any(|id| remove_set.contains(id));
        if !touched {
            remap.push(Some(new_se_routes.len()));
            new_se_routes.push(se.clone());
            continue;
        }
        let remaining_nodes: Vec<NodeId> = se.nodes_id.iter().copied().filter(|id| !remove_set.contains(id)).collect();
        if remaining_nodes.len() <= 2 {
            remap.push(None);
            continue;
        }
        let start_time = se.service_start_times[0];
        match se_evaluate(&remaining_nodes, se.satellite_id, start_time, &problem) {
            Some(rebuilt) => {
                remap.push(Some(new_se_routes.len()));
                new_se_routes.push(Rc::new(rebuilt));
            }
            None => remap.push(None),
        }
    }

    // Pass 2: renumber FE serviced-index lists and re-evaluate. A FE route
    // whose re-evaluation fails surrenders all of its hosted SE routes'
    // customers back to the unserved set rather than being force-kept.
    type KeptFe = (Vec<usize>, Vec<crate::domain::FeEvent>, f64, f64, f64);
    let mut kept_fe: Vec<KeptFe> = Vec::with_capacity(solution.fe_routes.len());
    let mut surrendered_new_indices: std::collections::HashSet<usize> = std::collections::HashSet::new();
    let mut surrendered: Vec<NodeId> = Vec::new();

    for fe in &solution.fe_routes {
        let new_indices: Vec<usize> = fe
            .serviced_se_route_indices
            .iter()
            .filter_map(|&old_idx| remap[old_idx])
            .collect();
        if new_indices.is_empty() {
            continue;
        }
        let hosted: Vec<Rc<SERouteData>> = new_indices.iter().map(|&i| new_se_routes[i].clone()).collect();
        match fe_evaluate(&hosted, &problem) {
            Some((schedule, total_distance, total_travel_time, route_deadline, refreshed)) => {
                for (&i, r) in new_indices.iter().zip(refreshed) {
                    new_se_routes[i] = r;
                }
                kept_fe.push((new_indices, schedule, total_distance, total_travel_time, route_deadline));
            }
            None => {
                for se in &hosted {
                    surrendered.extend(se.customer_ids());
                }
                surrendered_new_indices.extend(new_indices);
            }
        }
    }

    // Final SE table excludes surrendered routes; build old-new-final remap.
    let mut final_se_routes: Vec<Rc<SERouteData>> = Vec::with_capacity(new_se_routes.len());
    let mut final_remap: Vec<Option<usize>> = vec![None; new_se_routes.len()];
    for (new_idx, se) in new_se_routes.into_iter().enumerate() {
        if surrendered_new_indices.contains(&new_idx) {
            continue;
        }
        final_remap[new_idx] = Some(final_se_routes.len());
        final_se_routes.push(se);
    }

    let final_fe_routes: Vec<Rc<crate::domain::FERouteData>> = kept_fe
        .into_iter()
        .map(|(new_indices, schedule, total_distance, total_travel_time, route_deadline)| {
            let indices = new_indices
                .into_iter()
                .map(|i| final_remap[i].expect("kept SE route must survive the surrender filter"))
                .collect();
            Rc::new(crate::domain::FERouteData {
                serviced_se_route_indices: indices,
                schedule,
                total_distance,
                total_travel_time,
                route_deadline,
            })
        })
        .collect();

    let mut unserved: Vec<NodeId> = solution.unserved_customer_ids.clone();
    unserved.extend(to_remove.iter().copied());
    unserved.extend(surrendered.iter().copied());
    unserved.sort_unstable();
    unserved.dedup();

    let rebuilt = SolutionData::new(solution.problem.clone(), final_fe_routes, final_se_routes, unserved);
    (rebuilt, to_remove.to_vec())
}
