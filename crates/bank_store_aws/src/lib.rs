//! AWS-oriented adapters, handlers, and binaries for the bank store tables.
//!
//! This crate owns runtime integration details (DynamoDB access, Lambda
//! entrypoints, loader CLIs, structured logging) and drives the domain
//! primitives from `bank_store_core`.

pub mod adapters;
pub mod cli;
pub mod handlers;
