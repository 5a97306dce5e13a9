pub mod sink;

pub use sink::ClickHouseSink;
