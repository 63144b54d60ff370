pub mod config;
pub mod coordinator;
pub mod scenario;
pub mod scenario_runner;
