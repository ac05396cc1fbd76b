//! Error taxonomy (spec §7). The core treats infeasibility and internal
//! re-evaluation failures as in-band control signals — not `Result`s — so
//! this module only covers the two error classes that *are* fatal:
//! configuration errors and problem-instance load failures. Grounded on
//! the teacher's preference for a plain `Box<dyn Error>` return from
//! `main` over a derive-macro error crate; here the two concrete causes are
//! named explicitly since collaborators (the CLI, tests) need to match on
//! them.

use std::error::Error;
use std::fmt;

#[derive(Debug)]
pub enum SolverError {
    Config(ConfigError),
    InstanceLoad(InstanceLoadError),
}

#[derive(Debug)]
pub enum ConfigError {
    UnknownPrimaryObjective(String),
    MissingEnvVar(&'static str),
    InvalidValue { field: &'static str, value: String },
}

#[derive(Debug)]
pub enum InstanceLoadError {
    Io(std::io::Error),
    Csv(csv::Error),
    MissingDepot,
    MalformedRow { line: usize, reason: String },
}

impl fmt::Display for SolverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolverError::Config(e) => write!(f, "configuration error: {e}"),
            SolverError::InstanceLoad(e) => write!(f, "problem-instance load failure: {e}"),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::UnknownPrimaryObjective(v) => {
                write!(f, "unknown PRIMARY_OBJECTIVE {v:?}, expected DISTANCE or TRAVEL_TIME")
            }
            ConfigError::MissingEnvVar(name) => write!(f, "missing required env var {name}"),
            ConfigError::InvalidValue { field, value } => {
                write!(f, "invalid value {value:?} for {field}")
            }
        }
    }
}

impl fmt::Display for InstanceLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstanceLoadError::Io(e) => write!(f, "io error: {e}"),
            InstanceLoadError::Csv(e) => write!(f, "csv error: {e}"),
            InstanceLoadError::MissingDepot => write!(f, "instance CSV contains no depot row"),
            InstanceLoadError::MalformedRow { line, reason } => {
                write!(f, "malformed row at line {line}: {reason}")
            }
        }
    }
}

impl Error for SolverError {}
impl Error for ConfigError {}
impl Error for InstanceLoadError {}

impl From<ConfigError> for SolverError {
    fn from(e: ConfigError) -> Self {
        SolverError::Config(e)
    }
}

impl From<InstanceLoadError> for SolverError {
    fn from(e: InstanceLoadError) -> Self {
        SolverError::InstanceLoad(e)
    }
}

impl From<std::io::Error> for InstanceLoadError {
    fn from(e: std::io::Error) -> Self {
        InstanceLoadError::Io(e)
    }
}

impl From<csv::Error> for InstanceLoadError {
    fn from(e: csv::Error) -> Self {
        InstanceLoadError::Csv(e)
    }
}
