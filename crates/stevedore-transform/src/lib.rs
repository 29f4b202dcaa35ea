//! # stevedore-transform
//!
//! Converts normalized service configurations into OpenShift objects.
//!
//! Handles:
//! - **Builders**: One pure function per object kind.
//! - **Path**: Compose-file directory and build-context resolution.
//! - **SCM**: Branch and remote lookups through `git`.
//! - **Link**: Cross-reference checks between a service's objects.
//! - **Assembler**: Per-service orchestration into an ordered graph.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used, clippy::panic))]

pub mod assembler;
pub mod builders;
pub mod link;
pub mod objects;
pub mod path;
pub mod scm;
pub mod unsupported;

pub use assembler::{Assembler, Conversion, transform};
pub use objects::{OutputGraph, ResourceObject};
