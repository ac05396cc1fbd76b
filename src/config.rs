//! Configuration record (spec §6). Grounded on the teacher's plain `const`
//! module, generalized to a struct sourced from the environment the way the
//! teacher's `setup::init` reads its `api_key`/`source` arguments from the
//! process environment before wiring up a run.

use std::str::FromStr;

use crate::error::ConfigError;

/// Which cumulative quantity the objective treats as primary cost (spec
/// §4.D, §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimaryObjective {
    Distance,
    TravelTime,
}

impl FromStr for PrimaryObjective {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DISTANCE" => Ok(PrimaryObjective::Distance),
            "TRAVEL_TIME" => Ok(PrimaryObjective::TravelTime),
            other => Err(ConfigError::UnknownPrimaryObjective(other.to_string())),
        }
    }
}

/// The full configuration record the core and its collaborators consume
/// (spec §6 "Configuration record"). `q_large_range` is kept as a dead
/// field even though the destroy-size logic never reads it (spec §9 Open
/// Questions): the source defines it and nothing in the delivered flow
/// consumes it, so it is preserved verbatim rather than silently dropped.
#[derive(Debug, Clone)]
pub struct Config {
    pub file_path: String,
    pub vehicle_speed: f64,
    /// Not part of the core's configuration surface (spec §6 lists vehicle
    /// capacities under the `ProblemInstance` collaborator interface, not
    /// the configuration record) — carried here because the CSV loader has
    /// nowhere else to source them from a flat instance file.
    pub fe_vehicle_capacity: f64,
    pub se_vehicle_capacity: f64,

    pub lns_initial_iterations: u32,
    pub q_percentage_initial: f64,
    pub alns_main_iterations: u32,

    pub start_temp_accept_prob: f64,
    pub start_temp_worsening_pct: f64,
    pub cooling_rate: f64,

    pub reaction_factor: f64,
    pub segment_length: u32,

    pub sigma_1_new_best: f64,
    pub sigma_2_better: f64,
    pub sigma_3_accepted: f64,

    pub q_small_range: (f64, f64),
    /// Defined by the configuration surface but not consulted by the
    /// destroy-size logic (spec §9).
    pub q_large_range: (f64, f64),

    pub restart_threshold: u32,
    pub random_seed: u64,

    pub pruning_k_customer_neighbors: usize,
    pub pruning_m_satellite_neighbors: usize,
    pub pruning_n_se_route_candidates: usize,

    pub primary_objective: PrimaryObjective,
    pub optimize_vehicle_count: bool,
    pub weight_primary: f64,
    pub weight_fe_vehicle: f64,
    pub weight_se_vehicle: f64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            file_path: "data/instance.csv".to_string(),
            vehicle_speed: 1.0,
            fe_vehicle_capacity: 200.0,
            se_vehicle_capacity: 50.0,

            lns_initial_iterations: 500,
            q_percentage_initial: 0.3,
            alns_main_iterations: 5000,

            start_temp_accept_prob: 0.5,
            start_temp_worsening_pct: 0.05,
            cooling_rate: 0.9995,

            reaction_factor: 0.1,
            segment_length: 100,

            sigma_1_new_best: 9.0,
            sigma_2_better: 5.0,
            sigma_3_accepted: 2.0,

            q_small_range: (0.1, 0.4),
            q_large_range: (0.4, 0.6),

            restart_threshold: 100,
            random_seed: 64,

            pruning_k_customer_neighbors: 10,
            pruning_m_satellite_neighbors: 3,
            pruning_n_se_route_candidates: 5,

            primary_objective: PrimaryObjective::TravelTime,
            optimize_vehicle_count: true,
            weight_primary: 1.0,
            weight_fe_vehicle: 50.0,
            weight_se_vehicle: 20.0,
        }
    }
}

impl Config {
    /// Overlays environment variables on top of `Config::default()`. Unset
    /// variables keep the default; a present-but-unparsable variable is a
    /// configuration error (spec §7 item 3 — fatal, surfaced immediately).
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut cfg = Config::default();

        if let Ok(v) = std::env::var("FILE_PATH") {
            cfg.file_path = v;
        }
        if let Some(v) = parse_env("VEHICLE_SPEED")? {
            cfg.vehicle_speed = v;
        }
        if let Some(v) = parse_env("FE_VEHICLE_CAPACITY")? {
            cfg.fe_vehicle_capacity = v;
        }
        if let Some(v) = parse_env("SE_VEHICLE_CAPACITY")? {
            cfg.se_vehicle_capacity = v;
        }
        if let Some(v) = parse_env("LNS_INITIAL_ITERATIONS")? {
            cfg.lns_initial_iterations = v;
        }
        if let Some(v) = parse_env("Q_PERCENTAGE_INITIAL")? {
            cfg.q_percentage_initial = v;
        }
        if let Some(v) = parse_env("ALNS_MAIN_ITERATIONS")? {
            cfg.alns_main_iterations = v;
        }
        if let Some(v) = parse_env("START_TEMP_ACCEPT_PROB")? {
            cfg.start_temp_accept_prob = v;
        }
        if let Some(v) = parse_env("START_TEMP_WORSENING_PCT")? {
            cfg.start_temp_worsening_pct = v;
        }
        if let Some(v) = parse_env("COOLING_RATE")? {
            cfg.cooling_rate = v;
        }
        if let Some(v) = parse_env("REACTION_FACTOR")? {
            cfg.reaction_factor = v;
        }
        if let Some(v) = parse_env("SEGMENT_LENGTH")? {
            cfg.segment_length = v;
        }
        if let Some(v) = parse_env("RESTART_THRESHOLD")? {
            cfg.restart_threshold = v;
        }
        if let Some(v) = parse_env("RANDOM_SEED")? {
            cfg.random_seed = v;
        }
        if let Some(v) = parse_env("PRUNING_K_CUSTOMER_NEIGHBORS")? {
            cfg.pruning_k_customer_neighbors = v;
        }
        if let Some(v) = parse_env("PRUNING_M_SATELLITE_NEIGHBORS")? {
            cfg.pruning_m_satellite_neighbors = v;
        }
        if let Some(v) = parse_env("PRUNING_N_SE_ROUTE_CANDIDATES")? {
            cfg.pruning_n_se_route_candidates = v;
        }
        if let Ok(v) = std::env::var("PRIMARY_OBJECTIVE") {
            cfg.primary_objective = v.parse()?;
        }
        if let Some(v) = parse_env("OPTIMIZE_VEHICLE_COUNT")? {
            cfg.optimize_vehicle_count = v;
        }
        if let Some(v) = parse_env("WEIGHT_PRIMARY")? {
            cfg.weight_primary = v;
        }
        if let Some(v) = parse_env("WEIGHT_FE_VEHICLE")? {
            cfg.weight_fe_vehicle = v;
        }
        if let Some(v) = parse_env("WEIGHT_SE_VEHICLE")? {
            cfg.weight_se_vehicle = v;
        }

        Ok(cfg)
    }
}

fn parse_env<T: FromStr>(name: &'static str) -> Result<Option<T>, ConfigError> {
    match std::env::var(name) {
        Ok(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { field: name, value: raw }),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_primary_objective_is_an_error() {
        assert!("VOLUME".parse::<PrimaryObjective>().is_err());
    }

    #[test]
    fn default_config_picks_travel_time() {
        let cfg = Config::default();
        assert_eq!(cfg.primary_objective, PrimaryObjective::TravelTime);
    }
}
