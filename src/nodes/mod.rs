//! Node registry and the built-in node collection.

pub mod builtin;
pub mod registry;

pub use registry::{NodeFactory, NodeRegistry, RegistryEntry};
