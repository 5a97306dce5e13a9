pub mod record;
pub mod request;
pub mod status;
