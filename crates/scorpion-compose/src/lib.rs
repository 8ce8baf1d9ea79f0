//! # scorpion-compose
//!
//! Turns Score workloads into a graph of provisioning components.
//!
//! Handles:
//! - **Ident**: Stable Go identifiers for graph nodes and exported field names.
//! - **Normalize**: Conversion of typed workload records into the value tree.
//! - **Placeholder**: Lexing and parsing of `${...}` references.
//! - **Resolver**: Metadata substitution and resource dependency discovery.
//! - **Component**: First-match lookup in the resource component library.
//! - **Graph**: The component graph, its dependency ordering, and DOT export.
//! - **Builder**: Construction of the graph from a project.

pub mod builder;
pub mod component;
pub mod graph;
pub mod ident;
pub mod normalize;
pub mod placeholder;
pub mod resolver;

pub use builder::{build_component_graph, build_from_config};
pub use component::{ComponentDescriptor, ComponentLibrary};
pub use graph::{ComponentGraph, ComponentInstance};
