pub mod fixtures;
pub mod sink;
pub mod store;
