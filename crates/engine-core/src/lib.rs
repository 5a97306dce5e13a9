pub mod error;
pub mod history;
pub mod orchestrator;
pub mod registry;
pub mod transform;
