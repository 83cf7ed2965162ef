//! HTTP API: handlers, wire types, error mapping.

pub mod error;
pub mod records;
pub mod types;
