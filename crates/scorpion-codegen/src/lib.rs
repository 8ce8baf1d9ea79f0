//! # scorpion-codegen
//!
//! Emits a Pulumi Go program from a component graph.
//!
//! Handles:
//! - **Go**: A small Go syntax tree and a deterministic printer with import management.
//! - **Emitter**: Translation of graph nodes and parameter trees into Go statements.

pub mod emitter;
pub mod go;

pub use emitter::{build_program, generate_program};
