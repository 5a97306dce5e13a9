pub mod core;
pub mod mapping;
pub mod migration;
pub mod records;
pub mod schema;
