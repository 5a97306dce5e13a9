pub mod error;
pub mod mapping;
pub mod typemap;
