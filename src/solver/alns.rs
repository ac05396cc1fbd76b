//! The ALNS driver (spec §4.I): destroy -> repair -> accept (SA) -> score ->
//! weight-update -> restart, looped for a fixed iteration budget.
//!
//! Grounded on the teacher's `solver::tabu_search::search::run` main loop
//! shape (iterate, evaluate candidate, accept/reject, track best, emit
//! progress), generalized from tabu-list bookkeeping to adaptive-weight
//! destroy/repair selection with simulated-annealing acceptance.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use crate::config::Config;
use crate::domain::{NodeId, SolutionData};
use crate::evaluation::objective::evaluate_cost;

use super::operator::OperatorPool;

pub type DestroyFn = fn(&SolutionData, usize, &mut ChaCha8Rng, &Config) -> (SolutionData, Vec<NodeId>);
pub type RepairFn = fn(&SolutionData, Vec<NodeId>, &mut ChaCha8Rng, &Config) -> SolutionData;

#[derive(Debug, Clone)]
pub struct IterationRecord {
    pub iteration: u32,
    pub best_cost: f64,
    pub current_cost: f64,
    pub temperature: f64,
}

#[derive(Debug, Clone)]
pub struct SegmentRecord {
    pub iteration: u32,
    pub destroy_weights: Vec<(&'static str, f64)>,
    pub repair_weights: Vec<(&'static str, f64)>,
}

pub struct AlnsOutcome {
    pub best_state: SolutionData,
    pub best_cost: f64,
    pub run_history: Vec<IterationRecord>,
    pub operator_history: Vec<SegmentRecord>,
}

/// Runs the ALNS main loop for `iterations` steps (spec §4.I). When
/// `is_lns` is set, simulated-annealing acceptance and the restart policy
/// are both disabled (used for construction polish).
pub fn run_alns(
    initial: SolutionData,
    iterations: u32,
    destroy_pool: &mut OperatorPool<DestroyFn>,
    repair_pool: &mut OperatorPool<RepairFn>,
    is_lns: bool,
    rng: &mut ChaCha8Rng,
    config: &Config,
) -> AlnsOutcome {
    let initial_cost = evaluate_cost(&initial, config);

    let mut temperature = if is_lns {
        0.0
    } else {
        -(config.start_temp_worsening_pct * initial_cost) / config.start_temp_accept_prob.ln()
    };

    let mut current = initial.clone();
    let mut current_cost = initial_cost;
    let mut best = initial;
    let mut best_cost = initial_cost;
    let mut iterations_without_improvement: u32 = 0;

    let mut run_history = Vec::with_capacity(iterations as usize);
    let mut operator_history = Vec::new();

    for i in 1..=iterations {
        let d_idx = destroy_pool.select(rng);
        let r_idx = repair_pool.select(rng);

        let num_served = current.num_served().max(1);
        let q = if is_lns {
            ((num_served as f64 * config.q_percentage_initial).ceil() as usize).max(1)
        } else {
            let (lo, hi) = config.q_small_range;
            let frac = rng.gen_range(lo..=hi);
            ((num_served as f64 * frac).ceil() as usize).max(1)
        };

        let destroy_fn = destroy_pool.get(d_idx).func;
        let repair_fn = repair_pool.get(r_idx).func;

        let (partial, removed) = destroy_fn(&current, q, rng, config);
        let candidate = repair_fn(&partial, removed, rng, config);
        let candidate_cost = evaluate_cost(&candidate, config);

        let mut accepted = false;
        let mut sigma = 0.0;

        if candidate_cost < current_cost {
            accepted = true;
            sigma = if candidate_cost < best_cost {
                config.sigma_1_new_best
            } else {
                config.sigma_2_better
            };
        } else if !is_lns && temperature > 1e-6 {
            let accept_prob = (-(candidate_cost - current_cost) / temperature).exp();
            if rng.gen::<f64>() < accept_prob {
                accepted = true;
                sigma = config.sigma_3_accepted;
            }
        }

        if accepted {
            current = candidate;
            current_cost = candidate_cost;
            if candidate_cost < best_cost {
                best = current.clone();
                best_cost = candidate_cost;
                iterations_without_improvement = 0;
            } else {
                iterations_without_improvement += 1;
            }
        } else {
            iterations_without_improvement += 1;
        }

        if sigma > 0.0 {
            destroy_pool.reward(d_idx, sigma);
            repair_pool.reward(r_idx, sigma);
        }

        if !is_lns && iterations_without_improvement >= config.restart_threshold {
            debug!(iteration = i, "restart: reverting current state to best");
            current = best.clone();
            current_cost = best_cost;
            iterations_without_improvement = 0;
        }

        if !is_lns {
            temperature *= config.cooling_rate;
        }

        run_history.push(IterationRecord {
            iteration: i,
            best_cost,
            current_cost,
            temperature,
        });

        if i % config.segment_length == 0 {
            destroy_pool.update_weights(config.reaction_factor);
            repair_pool.update_weights(config.reaction_factor);
            operator_history.push(SegmentRecord {
                iteration: i,
                destroy_weights: destroy_pool.weights(),
                repair_weights: repair_pool.weights(),
            });
        }
    }

    info!(best_cost, iterations, "ALNS run complete");

    AlnsOutcome {
        best_state: best,
        best_cost,
        run_history,
        operator_history,
    }
}
