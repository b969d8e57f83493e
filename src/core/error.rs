//! Error types for the node collection.
//!
//! Uses thiserror for structured errors with context. Errors are designed to:
//! - Include actionable information (which node, what to fix)
//! - Support error chaining for context
//!
//! Missing wildcard files and unknown metadata references are not errors:
//! they leave the token in place and are reported through `log`.

use crate::core::types::PortType;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Unique identifier for a node instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub Uuid);

impl NodeId {
    /// Create a new random node ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.0.to_string()[..8])
    }
}

/// Error from running a registered node by id.
#[derive(Error, Debug)]
pub enum NodesError {
    #[error("Unknown node '{0}'")]
    UnknownNode(String),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Execution error: {0}")]
    Execution(#[from] ExecutionError),
}

/// Invalid arguments to the outpaint frame planner.
///
/// Every variant is an invalid-argument condition: the planner never emits
/// a stage whose generation length breaks the `1 + 4k` rule.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlanError {
    #[error("invalid argument: total_frames must be at least 1, got {0}")]
    InvalidTotalFrames(i64),

    #[error(
        "invalid argument: stage {stage} needs {context} context frames, \
         which leaves no new frames in a {window}-frame window"
    )]
    ContextFillsWindow {
        stage: usize,
        context: i64,
        window: i64,
    },
}

/// Errors reading host workflow metadata.
#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("Workflow metadata is missing '{0}'")]
    MissingField(&'static str),

    #[error("Workflow metadata is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config value for '{key}': {reason}")]
    Invalid { key: String, reason: String },
}

/// Errors from checking a node's inputs before it runs.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum ValidationError {
    #[error("Type mismatch: expected {expected}, got {got}")]
    TypeMismatch { expected: PortType, got: PortType },

    #[error("Missing required input '{port}' on node {node_id}")]
    MissingRequiredInput { node_id: NodeId, port: String },

    #[error("Constraint violation on node {node_id}, parameter '{parameter}': {error}")]
    ConstraintViolation {
        node_id: NodeId,
        parameter: String,
        error: String,
    },
}

/// Errors while a node runs.
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Node {node_id} execution failed: {error}")]
    NodeExecution { node_id: NodeId, error: String },

    #[error("Missing input '{port}' for node {node_id}")]
    MissingInput { node_id: NodeId, port: String },

    #[error("Missing parameter '{parameter}' for node {node_id}")]
    MissingParameter { node_id: NodeId, parameter: String },

    #[error("Output '{port}' was not set by node {node_id}")]
    OutputNotSet { node_id: NodeId, port: String },

    #[error("Node {node_id} rejected its arguments: {source}")]
    Plan {
        node_id: NodeId,
        #[source]
        source: PlanError,
    },

    #[error("Division by zero in node {node_id}")]
    DivisionByZero { node_id: NodeId },
}

// ============================================================================
// Error Utilities
// ============================================================================

impl ValidationError {
    /// Get suggestion for fixing this error.
    pub fn suggested_fix(&self) -> Option<String> {
        match self {
            ValidationError::TypeMismatch { expected, got } => Some(format!(
                "Insert a conversion node to convert {} to {}",
                got, expected
            )),
            ValidationError::MissingRequiredInput { port, .. } => {
                Some(format!("Connect an output to the '{}' input", port))
            }
            ValidationError::ConstraintViolation {
                parameter, error, ..
            } => Some(format!("Adjust '{}': {}", parameter, error)),
        }
    }

    /// Get list of affected node IDs.
    pub fn affected_nodes(&self) -> Vec<NodeId> {
        match self {
            ValidationError::MissingRequiredInput { node_id, .. }
            | ValidationError::ConstraintViolation { node_id, .. } => vec![*node_id],
            ValidationError::TypeMismatch { .. } => vec![],
        }
    }
}

impl ExecutionError {
    /// Get the node ID that caused this error.
    pub fn node_id(&self) -> NodeId {
        match self {
            ExecutionError::NodeExecution { node_id, .. }
            | ExecutionError::MissingInput { node_id, .. }
            | ExecutionError::MissingParameter { node_id, .. }
            | ExecutionError::OutputNotSet { node_id, .. }
            | ExecutionError::Plan { node_id, .. }
            | ExecutionError::DivisionByZero { node_id } => *node_id,
        }
    }

    /// Check if the host may retry the node with different inputs.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, ExecutionError::OutputNotSet { .. })
    }
}

/// Result type alias for running registered nodes.
pub type NodesResult<T> = Result<T, NodesError>;

/// Result type alias for planner operations.
pub type PlanResult<T> = Result<T, PlanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id_display() {
        let id = NodeId::new();
        let display = format!("{}", id);
        assert_eq!(display.len(), 8);
    }

    #[test]
    fn test_validation_error_suggestions() {
        let error = ValidationError::MissingRequiredInput {
            node_id: NodeId::new(),
            port: "prompt".to_string(),
        };
        assert!(error.suggested_fix().unwrap().contains("prompt"));
        assert_eq!(error.affected_nodes().len(), 1);
    }

    #[test]
    fn test_execution_error_converts_to_top_level() {
        let err: NodesError = ExecutionError::Plan {
            node_id: NodeId::new(),
            source: PlanError::InvalidTotalFrames(0),
        }
        .into();
        assert!(err.to_string().contains("total_frames"));
    }

    #[test]
    fn test_execution_error_node_id() {
        let node_id = NodeId::new();
        let err = ExecutionError::DivisionByZero { node_id };
        assert_eq!(err.node_id(), node_id);
        assert!(err.is_recoverable());

        let err = ExecutionError::OutputNotSet {
            node_id,
            port: "prompt".to_string(),
        };
        assert!(!err.is_recoverable());
    }
}
