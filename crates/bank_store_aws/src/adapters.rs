pub mod dynamodb;
pub mod log_sink;
pub mod store;
