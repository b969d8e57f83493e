//! Execution and validation contexts.
//!
//! Contexts carry a node's connected inputs and widget parameters into
//! `validate`/`execute`, and collect the outputs the node produces.

use crate::core::error::{ExecutionError, NodeId, ValidationError};
use crate::core::types::{PortType, Value};
use std::collections::HashMap;

/// Context provided during node validation.
#[derive(Debug, Clone)]
pub struct ValidationContext {
    /// ID of the node being validated.
    pub node_id: NodeId,
    /// Input values.
    inputs: HashMap<String, Value>,
    /// Parameter values.
    parameters: HashMap<String, Value>,
}

impl ValidationContext {
    /// Create a new validation context.
    pub fn new(node_id: NodeId) -> Self {
        Self {
            node_id,
            inputs: HashMap::new(),
            parameters: HashMap::new(),
        }
    }

    /// Add an input value to the context.
    pub fn add_input(&mut self, name: impl Into<String>, value: Value) {
        self.inputs.insert(name.into(), value);
    }

    /// Add a parameter value to the context.
    pub fn add_parameter(&mut self, name: impl Into<String>, value: Value) {
        self.parameters.insert(name.into(), value);
    }

    /// Get all inputs.
    pub fn inputs(&self) -> &HashMap<String, Value> {
        &self.inputs
    }

    /// Get all parameters.
    pub fn parameters(&self) -> &HashMap<String, Value> {
        &self.parameters
    }

    /// Get an input value by name.
    pub fn get_input(&self, name: &str) -> Result<&Value, ValidationError> {
        self.inputs
            .get(name)
            .ok_or_else(|| ValidationError::MissingRequiredInput {
                node_id: self.node_id,
                port: name.to_string(),
            })
    }

    /// Check if an input exists.
    pub fn has_input(&self, name: &str) -> bool {
        self.inputs.contains_key(name)
    }

    /// Get a parameter value by name.
    pub fn get_parameter(&self, name: &str) -> Result<&Value, ValidationError> {
        self.parameters
            .get(name)
            .ok_or_else(|| ValidationError::ConstraintViolation {
                node_id: self.node_id,
                parameter: name.to_string(),
                error: "Parameter not set".to_string(),
            })
    }

    /// Get a parameter as an integer.
    pub fn get_integer(&self, name: &str) -> Result<i64, ValidationError> {
        let value = self.get_parameter(name)?;
        value.as_integer().ok_or_else(|| ValidationError::TypeMismatch {
            expected: PortType::Integer,
            got: value.get_type(),
        })
    }

    /// Get a parameter as a string.
    pub fn get_string(&self, name: &str) -> Result<&str, ValidationError> {
        let value = self.get_parameter(name)?;
        value.as_string().ok_or_else(|| ValidationError::TypeMismatch {
            expected: PortType::String,
            got: value.get_type(),
        })
    }

    /// Check if a parameter exists.
    pub fn has_parameter(&self, name: &str) -> bool {
        self.parameters.contains_key(name)
    }
}

/// Context provided during node execution.
#[derive(Debug)]
pub struct ExecutionContext {
    /// ID of the node being executed.
    pub node_id: NodeId,
    /// Input values.
    inputs: HashMap<String, Value>,
    /// Parameter values.
    parameters: HashMap<String, Value>,
    /// Output values set by the node.
    outputs: HashMap<String, Value>,
}

impl ExecutionContext {
    /// Create a new execution context.
    pub fn new(node_id: NodeId) -> Self {
        Self {
            node_id,
            inputs: HashMap::new(),
            parameters: HashMap::new(),
            outputs: HashMap::new(),
        }
    }

    /// Add an input value to the context.
    pub fn add_input(&mut self, name: impl Into<String>, value: Value) {
        self.inputs.insert(name.into(), value);
    }

    /// Add a parameter value to the context.
    pub fn add_parameter(&mut self, name: impl Into<String>, value: Value) {
        self.parameters.insert(name.into(), value);
    }

    /// Get all inputs.
    pub fn inputs(&self) -> &HashMap<String, Value> {
        &self.inputs
    }

    /// Get all parameters.
    pub fn parameters(&self) -> &HashMap<String, Value> {
        &self.parameters
    }

    /// Get all outputs.
    pub fn outputs(&self) -> &HashMap<String, Value> {
        &self.outputs
    }

    /// Take ownership of all outputs.
    pub fn take_outputs(self) -> HashMap<String, Value> {
        self.outputs
    }

    // ========================================================================
    // Input Getters
    // ========================================================================

    /// Get an input value by name.
    pub fn get_input(&self, name: &str) -> Result<&Value, ExecutionError> {
        self.inputs.get(name).ok_or_else(|| ExecutionError::MissingInput {
            node_id: self.node_id,
            port: name.to_string(),
        })
    }

    /// Get an optional input. `Value::None` counts as absent.
    pub fn get_input_optional(&self, name: &str) -> Option<&Value> {
        self.inputs.get(name).filter(|v| !v.is_none())
    }

    /// Get a connected input, falling back to the widget parameter of the
    /// same name.
    pub fn get_value(&self, name: &str) -> Result<&Value, ExecutionError> {
        match self.get_input_optional(name) {
            Some(value) => Ok(value),
            None => self.get_parameter(name),
        }
    }

    /// Check if an input exists.
    pub fn has_input(&self, name: &str) -> bool {
        self.inputs.contains_key(name)
    }

    // ========================================================================
    // Parameter Getters
    // ========================================================================

    /// Get a parameter value by name.
    pub fn get_parameter(&self, name: &str) -> Result<&Value, ExecutionError> {
        self.parameters
            .get(name)
            .ok_or_else(|| ExecutionError::MissingParameter {
                node_id: self.node_id,
                parameter: name.to_string(),
            })
    }

    /// Get a parameter as an integer.
    pub fn get_integer(&self, name: &str) -> Result<i64, ExecutionError> {
        self.get_parameter(name)?
            .as_integer()
            .ok_or_else(|| ExecutionError::NodeExecution {
                node_id: self.node_id,
                error: format!("Parameter '{}' is not an integer", name),
            })
    }

    /// Get a parameter as a string.
    pub fn get_string(&self, name: &str) -> Result<&str, ExecutionError> {
        self.get_parameter(name)?
            .as_string()
            .ok_or_else(|| ExecutionError::NodeExecution {
                node_id: self.node_id,
                error: format!("Parameter '{}' is not a string", name),
            })
    }

    /// Check if a parameter exists.
    pub fn has_parameter(&self, name: &str) -> bool {
        self.parameters.contains_key(name)
    }

    // ========================================================================
    // Output Setters
    // ========================================================================

    /// Set an output value.
    pub fn set_output(
        &mut self,
        name: impl Into<String>,
        value: Value,
    ) -> Result<(), ExecutionError> {
        self.outputs.insert(name.into(), value);
        Ok(())
    }

    /// Check if an output has been set.
    pub fn has_output(&self, name: &str) -> bool {
        self.outputs.contains_key(name)
    }
}

/// Convert ValidationContext to ExecutionContext.
impl From<ValidationContext> for ExecutionContext {
    fn from(val_ctx: ValidationContext) -> Self {
        let mut exec_ctx = ExecutionContext::new(val_ctx.node_id);
        for (name, value) in val_ctx.inputs {
            exec_ctx.add_input(name, value);
        }
        for (name, value) in val_ctx.parameters {
            exec_ctx.add_parameter(name, value);
        }
        exec_ctx
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_context_inputs() {
        let mut ctx = ValidationContext::new(NodeId::new());
        ctx.add_input("test", Value::Integer(42));

        assert!(ctx.has_input("test"));
        assert!(!ctx.has_input("nonexistent"));
        assert!(ctx.get_integer("test").is_err()); // integer is in inputs, not parameters
    }

    #[test]
    fn test_validation_context_parameters() {
        let mut ctx = ValidationContext::new(NodeId::new());
        ctx.add_parameter("total_frames", Value::Integer(192));

        assert!(ctx.has_parameter("total_frames"));
        assert_eq!(ctx.get_integer("total_frames").unwrap(), 192);
        assert!(matches!(
            ctx.get_string("total_frames"),
            Err(ValidationError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_execution_context_outputs() {
        let mut ctx = ExecutionContext::new(NodeId::new());
        ctx.set_output("result", Value::Integer(100)).unwrap();

        assert!(ctx.has_output("result"));
        let outputs = ctx.take_outputs();
        assert_eq!(outputs.get("result"), Some(&Value::Integer(100)));
    }

    #[test]
    fn test_optional_input_treats_none_as_absent() {
        let mut ctx = ExecutionContext::new(NodeId::new());
        ctx.add_input("extra_pnginfo", Value::None);
        assert!(ctx.get_input_optional("extra_pnginfo").is_none());
        assert!(ctx.get_input_optional("missing").is_none());
    }

    #[test]
    fn test_value_prefers_connected_input() {
        let mut ctx = ExecutionContext::new(NodeId::new());
        ctx.add_parameter("text", Value::String("widget".to_string()));
        assert_eq!(ctx.get_value("text").unwrap().as_string(), Some("widget"));

        ctx.add_input("text", Value::String("linked".to_string()));
        assert_eq!(ctx.get_value("text").unwrap().as_string(), Some("linked"));
        assert!(ctx.get_value("missing").is_err());
    }

    #[test]
    fn test_conversion_keeps_values() {
        let mut val_ctx = ValidationContext::new(NodeId::new());
        val_ctx.add_parameter("seed", Value::Integer(3));
        let exec_ctx: ExecutionContext = val_ctx.into();
        assert_eq!(exec_ctx.get_integer("seed").unwrap(), 3);
    }
}
