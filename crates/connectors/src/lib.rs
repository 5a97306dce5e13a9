pub mod clickhouse;
pub mod error;
pub mod postgres;
pub mod sink;
pub mod source;
