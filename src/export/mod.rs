pub mod exporter;
pub mod literal;
pub mod orchestrator;
