//! # podwire-common
//!
//! Shared types, error definitions, configuration models, and constants
//! used across the Podwire workspace.
//!
//! This crate is the leaf of the dependency graph. It performs no I/O and
//! depends on no other internal crate: event records, filter sets, bulk
//! operation reports and their aggregation all live here so that the HTTP
//! client and any presentation layer agree on one definition.

pub mod config;
pub mod constants;
pub mod error;
pub mod filters;
pub mod report;
pub mod types;
