mod decode;
pub mod factory;
pub mod source;

pub use factory::PgSourceFactory;
pub use source::PgSource;
