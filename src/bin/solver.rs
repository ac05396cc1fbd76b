use std::error::Error;
use std::rc::Rc;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{info, span, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use vrp2e_alns::config::Config;
use vrp2e_alns::io::load_instance;
use vrp2e_alns::report::print_solution_details;
use vrp2e_alns::solver::operator::{Operator, OperatorPool};
use vrp2e_alns::solver::{destroy, greedy_construction, repair, run_alns};

#[tracing::instrument(name = "vrp2e solver", level = "info")]
fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(
            fmt::layer()
                .with_span_events(fmt::format::FmtSpan::NEW | fmt::format::FmtSpan::CLOSE)
                .pretty(),
        )
        .init();

    let config = Config::from_env()?;
    info!(file_path = %config.file_path, "starting 2E-VRP ALNS solver");

    let problem = {
        let span = span!(Level::INFO, "load_instance");
        let _guard = span.enter();
        Rc::new(load_instance(&config.file_path, &config)?)
    };

    let mut rng = ChaCha8Rng::seed_from_u64(config.random_seed);

    let initial = {
        let span = span!(Level::INFO, "construction");
        let _guard = span.enter();
        greedy_construction(problem.clone(), &config, &mut rng)
    };

    let mut destroy_pool = OperatorPool::new(vec![
        Operator::new("random", destroy::random_removal as vrp2e_alns::solver::alns::DestroyFn),
        Operator::new("shaw", destroy::shaw_removal as vrp2e_alns::solver::alns::DestroyFn),
        Operator::new("worst_cost", destroy::worst_cost_removal as vrp2e_alns::solver::alns::DestroyFn),
    ]);
    let mut repair_pool = OperatorPool::new(vec![Operator::new(
        "greedy",
        repair::greedy_repair as vrp2e_alns::solver::alns::RepairFn,
    )]);

    let outcome = {
        let span = span!(Level::INFO, "alns_main");
        let _guard = span.enter();
        run_alns(
            initial,
            config.alns_main_iterations,
            &mut destroy_pool,
            &mut repair_pool,
            false,
            &mut rng,
            &config,
        )
    };

    info!(best_cost = outcome.best_cost, "solver finished");
    print_solution_details(&outcome.best_state, &config);

    Ok(())
}
