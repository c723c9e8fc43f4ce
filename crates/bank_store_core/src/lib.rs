//! Shared domain primitives for the bank store seeding and lookup services.
//!
//! This crate owns the entity model, the single-table key convention, batch
//! planning, and the synthetic dataset generators. It intentionally excludes
//! AWS SDK and Lambda runtime concerns; those live in `bank_store_aws`.

pub mod batching;
pub mod entity;
pub mod generators;
pub mod keys;
pub mod response;
pub mod sampling;
