//! # stevedore-common
//!
//! Shared input types, error definitions, conversion options, and constants
//! used across the stevedore workspace.
//!
//! This crate is the leaf of the dependency graph. It depends on no other
//! internal crate and describes the normalized service configuration that
//! the transformer consumes.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod config;
pub mod constants;
pub mod error;
pub mod types;
