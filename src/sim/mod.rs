pub mod environment;
pub mod runner;

pub use environment::EnvironmentRf;
pub use runner::{simulate, simulate_scenario, RunOutput};
