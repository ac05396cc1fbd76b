//! Greedy construction (spec §4.I "Greedy construction"): builds the first
//! feasible solution, then runs one short LNS-mode polish pass.

use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;

use crate::config::Config;
use crate::domain::{ProblemInstance, SolutionData};
use crate::insertion::{apply_insertion, best_insertion, InsertionAction};

use super::alns::run_alns;
use super::destroy::random_removal;
use super::operator::{Operator, OperatorPool};
use super::repair::greedy_repair;

/// Empty solution -> shuffled best-insertion pass -> short LNS polish.
pub fn greedy_construction(problem: std::rc::Rc<ProblemInstance>, config: &Config, rng: &mut ChaCha8Rng) -> SolutionData {
    let mut customer_ids: Vec<_> = problem.customers.iter().map(|c| c.id).collect();
    customer_ids.shuffle(rng);

    let mut solution = SolutionData::empty(problem);
    for customer_id in customer_ids {
        let option = best_insertion(customer_id, &solution, config);
        solution = match option.action {
            InsertionAction::None => {
                let mut unserved = solution.unserved_customer_ids.clone();
                unserved.push(customer_id);
                SolutionData::new(solution.problem.clone(), solution.fe_routes.clone(), solution.se_routes.clone(), unserved)
            }
            _ => apply_insertion(&option, &solution),
        };
    }

    let mut destroy_pool = OperatorPool::new(vec![Operator::new("random", random_removal as super::alns::DestroyFn)]);
    let mut repair_pool = OperatorPool::new(vec![Operator::new("greedy", greedy_repair as super::alns::RepairFn)]);

    let outcome = run_alns(
        solution,
        config.lns_initial_iterations,
        &mut destroy_pool,
        &mut repair_pool,
        true,
        rng,
        config,
    );
    outcome.best_state
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Customer, Depot, Node, Satellite};
    use rand::SeedableRng;
    use std::rc::Rc;

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
    fn greedy_construction_serves_every_feasible_customer() {
        let problem = Rc::new(toy_problem());
        let mut config = Config::default();
        config.lns_initial_iterations = 20;
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let solution = greedy_construction(problem, &config, &mut rng);
        assert_eq!(solution.unserved_customer_ids.len(), 0);
        assert!(solution.served_and_unserved_partition_all_customers());
    }
}
