//! # scorpion-common
//!
//! Shared types, error definitions, the generic value tree, the Score
//! workload model, and the project configuration used across the entire
//! Scorpion workspace.
//!
//! This crate is the leaf of the dependency graph. It depends on no other
//! internal crate and provides the foundational primitives that the graph
//! builder, the code generator, and the CLI build upon.

pub mod config;
pub mod constants;
pub mod error;
pub mod types;
pub mod value;
pub mod workload;
