//! End-to-end scenario tests for the route kernel, greedy construction, and
//! the ALNS driver (spec §8 end-to-end scenarios).

use std::rc::Rc;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use vrp2e_alns::config::{Config, PrimaryObjective};
use vrp2e_alns::domain::{Customer, Depot, Node, NodeId, ProblemInstance, Satellite};
use vrp2e_alns::evaluation::objective::evaluate_cost;
use vrp2e_alns::report::validate_solution_feasibility;
use vrp2e_alns::solver::alns::{DestroyFn, RepairFn};
use vrp2e_alns::solver::operator::{Operator, OperatorPool};
use vrp2e_alns::solver::{destroy, greedy_construction, repair, run_alns};

fn single_satellite_problem(se_capacity: f64) -> ProblemInstance {
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
    ProblemInstance::new(nodes, 1.0, 10.0, se_capacity, 5, 2, 4)
}

fn default_pools() -> (OperatorPool<DestroyFn>, OperatorPool<RepairFn>) {
    let destroy_pool = OperatorPool::new(vec![
        Operator::new("random", destroy::random_removal as DestroyFn),
        Operator::new("shaw", destroy::shaw_removal as DestroyFn),
        Operator::new("worst_cost", destroy::worst_cost_removal as DestroyFn),
    ]);
    let repair_pool = OperatorPool::new(vec![Operator::new("greedy", repair::greedy_repair as RepairFn)]);
    (destroy_pool, repair_pool)
}

#[test]
fn single_satellite_toy_yields_one_fe_and_one_se_route() {
    let problem = Rc::new(single_satellite_problem(5.0));
    let mut config = Config::default();
    config.lns_initial_iterations = 30;
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let solution = greedy_construction(problem, &config, &mut rng);

    assert_eq!(solution.unserved_customer_ids.len(), 0);
    assert_eq!(solution.fe_routes.len(), 1);
    assert_eq!(solution.se_routes.len(), 1);
    let cost = evaluate_cost(&solution, &config);
    assert!(cost.is_finite());
    assert!(validate_solution_feasibility(&solution).is_empty());
}

#[test]
fn shrinking_se_capacity_forces_a_route_split() {
    let problem = Rc::new(single_satellite_problem(3.0));
    let mut config = Config::default();
    config.lns_initial_iterations = 60;
    let mut rng = ChaCha8Rng::seed_from_u64(2);
    let solution = greedy_construction(problem, &config, &mut rng);

    assert_eq!(solution.unserved_customer_ids.len(), 0);
    assert_eq!(solution.fe_routes.len(), 1);
    assert_eq!(solution.se_routes.len(), 2);
    assert!(validate_solution_feasibility(&solution).is_empty());
}

#[test]
fn unreachable_pickup_deadline_is_left_unserved_not_a_violation() {
    let nodes = vec![
        Node::Depot(Depot { id: 0, x: 0.0, y: 0.0 }),
        Node::Satellite(Satellite { dist_id: 1, coll_id: 3, x: 10.0, y: 0.0 }),
        Node::PickupCustomer(Customer {
            id: 2,
            x: 11.0,
            y: 0.0,
            service_time: 0.0,
            ready_time: 0.0,
            due_time: 1000.0,
            demand: 1.0,
            deadline: Some(1.0), // far less than 2*travel(depot,satellite)=20
        }),
    ];
    let problem = Rc::new(ProblemInstance::new(nodes, 1.0, 10.0, 5.0, 5, 2, 4));
    let mut config = Config::default();
    config.lns_initial_iterations = 20;
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let solution = greedy_construction(problem, &config, &mut rng);

    assert_eq!(solution.unserved_customer_ids, vec![2 as NodeId]);
    assert!(validate_solution_feasibility(&solution).is_empty());
}

fn cluster_problem() -> ProblemInstance {
    let mut nodes = vec![
        Node::Depot(Depot { id: 0, x: 0.0, y: 0.0 }),
        Node::Satellite(Satellite { dist_id: 1, coll_id: 21, x: 50.0, y: 50.0 }),
    ];
    for i in 0..20u32 {
        let angle = (i as f64) * 0.31;
        let x = 50.0 + 5.0 * angle.cos() * (1.0 + i as f64 * 0.1);
        let y = 50.0 + 5.0 * angle.sin() * (1.0 + i as f64 * 0.1);
        nodes.push(Node::DeliveryCustomer(Customer {
            id: 2 + i as usize,
            x,
            y,
            service_time: 0.0,
            ready_time: 0.0,
            due_time: 10_000.0,
            demand: 1.0,
            deadline: None,
        }));
    }
    ProblemInstance::new(nodes, 1.0, 200.0, 100.0, 5, 2, 4)
}

#[test]
fn shaw_removal_is_reproducible_for_a_fixed_seed() {
    let problem = Rc::new(cluster_problem());
    let mut config = Config::default();
    config.lns_initial_iterations = 50;
    let mut construct_rng = ChaCha8Rng::seed_from_u64(99);
    let solution = greedy_construction(problem, &config, &mut construct_rng);
    assert_eq!(solution.unserved_customer_ids.len(), 0);

    let mut rng_a = ChaCha8Rng::seed_from_u64(123);
    let (_, removed_a) = destroy::shaw_removal(&solution, 5, &mut rng_a, &config);

    let mut rng_b = ChaCha8Rng::seed_from_u64(123);
    let (_, removed_b) = destroy::shaw_removal(&solution, 5, &mut rng_b, &config);

    assert_eq!(removed_a, removed_b);
    assert_eq!(removed_a.len(), 5);
}

#[test]
fn restart_reverts_current_to_best_at_the_threshold() {
    // A single customer, trivially optimal once served: no improvement is
    // possible, so the restart policy should fire every RESTART_THRESHOLD
    // iterations and current_cost should equal best_cost right after.
    let nodes = vec![
        Node::Depot(Depot { id: 0, x: 0.0, y: 0.0 }),
        Node::Satellite(Satellite { dist_id: 1, coll_id: 3, x: 5.0, y: 0.0 }),
        Node::DeliveryCustomer(Customer {
            id: 2,
            x: 6.0,
            y: 0.0,
            service_time: 0.0,
            ready_time: 0.0,
            due_time: 1000.0,
            demand: 1.0,
            deadline: None,
        }),
    ];
    let problem = Rc::new(ProblemInstance::new(nodes, 1.0, 10.0, 10.0, 5, 2, 4));
    let mut config = Config::default();
    config.restart_threshold = 10;
    config.alns_main_iterations = 35;
    config.lns_initial_iterations = 10;

    let mut rng = ChaCha8Rng::seed_from_u64(4);
    let initial = greedy_construction(problem, &config, &mut rng);
    let (mut destroy_pool, mut repair_pool) = default_pools();

    let outcome = run_alns(initial, config.alns_main_iterations, &mut destroy_pool, &mut repair_pool, false, &mut rng, &config);

    for &i in &[10usize, 20, 30] {
        let record = &outcome.run_history[i - 1];
        assert!((record.current_cost - record.best_cost).abs() < 1e-6, "iteration {i} should revert to best");
    }
    assert!(outcome.best_cost.is_finite());
}

#[test]
fn objective_switch_agrees_when_speed_is_one() {
    let problem = Rc::new(single_satellite_problem(5.0));
    let mut config_distance = Config::default();
    config_distance.primary_objective = PrimaryObjective::Distance;
    config_distance.optimize_vehicle_count = false;
    config_distance.lns_initial_iterations = 30;

    let mut config_time = config_distance.clone();
    config_time.primary_objective = PrimaryObjective::TravelTime;

    let mut rng_d = ChaCha8Rng::seed_from_u64(5);
    let solution_d = greedy_construction(problem.clone(), &config_distance, &mut rng_d);
    let mut rng_t = ChaCha8Rng::seed_from_u64(5);
    let solution_t = greedy_construction(problem, &config_time, &mut rng_t);

    let cost_d = evaluate_cost(&solution_d, &config_distance);
    let cost_t = evaluate_cost(&solution_t, &config_time);
    assert!((cost_d - cost_t).abs() < 1e-6);
}
