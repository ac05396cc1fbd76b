//! Repair operator(s) (spec §4.G): greedy repeated best-insertion.

use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;

use crate::config::Config;
use crate::domain::{NodeId, SolutionData};
use crate::insertion::{apply_insertion, best_insertion, InsertionAction};

/// Shuffles `removed` with the shared RNG and inserts each customer back in
/// via the insertion engine; a customer with no feasible option is appended
/// to the solution's unserved list (spec §4.G).
pub fn greedy_repair(
    partial: &SolutionData,
    mut removed: Vec<NodeId>,
    rng: &mut ChaCha8Rng,
    config: &Config,
) -> SolutionData {
    removed.shuffle(rng);

    let mut current = partial.clone();
    for customer_id in removed {
        let option = best_insertion(customer_id, &current, config);
        current = match option.action {
            InsertionAction::None => {
                let mut unserved = current.unserved_customer_ids.clone();
                unserved.push(customer_id);
                SolutionData::new(current.problem.clone(), current.fe_routes.clone(), current.se_routes.clone(), unserved)
            }
            _ => apply_insertion(&option, &current),
        };
    }
    current
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Customer, Depot, Node, ProblemInstance, Satellite};
    use rand::SeedableRng;
    use std::rc::Rc;

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
    fn greedy_repair_serves_every_customer_when_feasible() {
        let problem = Rc::new(toy_problem());
        let empty = SolutionData::empty(problem.clone());
        let config = Config::default();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let repaired = greedy_repair(&empty, vec![2, 3], &mut rng, &config);
        assert_eq!(repaired.unserved_customer_ids.len(), 0);
        assert!(repaired.served_and_unserved_partition_all_customers());
    }
}
