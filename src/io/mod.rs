//! Collaborator I/O: CSV problem-instance loading (spec §6, out-of-core).

pub mod instance_csv;

pub use instance_csv::load_instance;
