//! Core types and traits shared by every node.
//!
//! This module contains:
//! - Value types (Integer, String, Array, etc.)
//! - Port definitions and constraints
//! - Node traits and metadata
//! - Error types
//! - Execution and validation contexts

pub mod context;
pub mod error;
pub mod node;
pub mod port;
pub mod types;

// Re-export commonly used types
pub use context::{ExecutionContext, ValidationContext};
pub use error::{
    ConfigError, ExecutionError, MetadataError, NodesError, PlanError, ValidationError,
};
pub use node::{Category, NodeMetadata, PluginNode};
pub use port::{Constraint, PortDefinition, PortDirection};
pub use types::{Color, PortType, Value};
