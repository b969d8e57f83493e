//! PluginNode trait and node metadata.
//!
//! The PluginNode trait is the abstraction every node in the collection
//! implements. It uses a two-phase design: validation (before the host runs
//! the node) and execution.

use crate::core::context::{ExecutionContext, ValidationContext};
use crate::core::error::{ExecutionError, ValidationError};
use crate::core::port::{ParameterDefinition, PortDefinition};
use serde::{Deserialize, Serialize};

/// Category for organizing nodes in the host's add-node menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Nodes that produce paths and other inputs for a workflow
    Input,
    /// Output nodes (print, display)
    Output,
    /// Prompt and string operations
    Text,
    /// Mathematical operations
    Math,
    /// Video model helpers
    Video,
    /// Utility nodes
    Utility,
    /// Custom/user-defined
    #[default]
    Custom,
}

impl Category {
    /// Get the display name for this category.
    pub fn display_name(&self) -> &'static str {
        match self {
            Category::Input => "Input",
            Category::Output => "Output",
            Category::Text => "Text",
            Category::Math => "Math",
            Category::Video => "Video",
            Category::Utility => "Utility",
            Category::Custom => "Custom",
        }
    }

    /// Get all categories in display order.
    pub fn all() -> &'static [Category] {
        &[
            Category::Input,
            Category::Output,
            Category::Text,
            Category::Math,
            Category::Video,
            Category::Utility,
            Category::Custom,
        ]
    }
}

/// Metadata describing a node type.
///
/// This struct contains all information needed to:
/// - Register the node with the host
/// - Generate widgets for its parameters
/// - Document the node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeMetadata {
    /// Unique identifier for this node type (e.g., "Badman_Concat_String")
    pub id: String,
    /// Human-readable name (e.g., "Concat String (Badman)")
    pub name: String,
    /// Category for UI organization
    pub category: Category,
    /// Detailed description
    pub description: String,
    /// Version string
    pub version: String,
    /// Author or source
    pub author: String,

    /// Input port definitions
    pub inputs: Vec<PortDefinition>,
    /// Output port definitions
    pub outputs: Vec<PortDefinition>,
    /// Parameter definitions
    pub parameters: Vec<ParameterDefinition>,

    /// Searchable tags
    pub tags: Vec<String>,
    /// Output nodes are always run by the host even if nothing consumes them
    pub output_node: bool,
    /// Whether this node is deterministic (same inputs always give same outputs)
    pub deterministic: bool,
}

impl NodeMetadata {
    /// Create a new metadata builder.
    pub fn builder(id: impl Into<String>, name: impl Into<String>) -> NodeMetadataBuilder {
        NodeMetadataBuilder::new(id, name)
    }

    /// Get all input port names.
    pub fn input_names(&self) -> Vec<&str> {
        self.inputs.iter().map(|p| p.name.as_str()).collect()
    }

    /// Get all output port names.
    pub fn output_names(&self) -> Vec<&str> {
        self.outputs.iter().map(|p| p.name.as_str()).collect()
    }

    /// Find an input port by name.
    pub fn get_input(&self, name: &str) -> Option<&PortDefinition> {
        self.inputs.iter().find(|p| p.name == name)
    }

    /// Find a parameter by name.
    pub fn get_parameter(&self, name: &str) -> Option<&ParameterDefinition> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// Check every declared parameter present in `ctx` against its definition.
    pub fn validate_parameters(&self, ctx: &ValidationContext) -> Result<(), ValidationError> {
        for param in &self.parameters {
            if let Ok(value) = ctx.get_parameter(&param.name) {
                param
                    .validate(value)
                    .map_err(|error| ValidationError::ConstraintViolation {
                        node_id: ctx.node_id,
                        parameter: param.name.clone(),
                        error,
                    })?;
            }
        }
        Ok(())
    }
}

/// Builder for NodeMetadata.
pub struct NodeMetadataBuilder {
    id: String,
    name: String,
    category: Category,
    description: String,
    version: String,
    author: String,
    inputs: Vec<PortDefinition>,
    outputs: Vec<PortDefinition>,
    parameters: Vec<ParameterDefinition>,
    tags: Vec<String>,
    output_node: bool,
    deterministic: bool,
}

impl NodeMetadataBuilder {
    /// Create a new builder with required fields.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: Category::Custom,
            description: String::new(),
            version: "1.0.0".to_string(),
            author: "Badman".to_string(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            parameters: Vec::new(),
            tags: Vec::new(),
            output_node: false,
            deterministic: true,
        }
    }

    /// Set the category.
    pub fn category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    /// Set the description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the version.
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Set the author.
    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    /// Add an input port.
    pub fn input(mut self, port: PortDefinition) -> Self {
        self.inputs.push(port);
        self
    }

    /// Add an output port.
    pub fn output(mut self, port: PortDefinition) -> Self {
        self.outputs.push(port);
        self
    }

    /// Add a parameter.
    pub fn parameter(mut self, param: ParameterDefinition) -> Self {
        self.parameters.push(param);
        self
    }

    /// Add a tag.
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Add multiple tags.
    pub fn tags(mut self, tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.tags.extend(tags.into_iter().map(|t| t.into()));
        self
    }

    /// Mark as an output node.
    pub fn output_node(mut self) -> Self {
        self.output_node = true;
        self
    }

    /// Mark as non-deterministic.
    pub fn non_deterministic(mut self) -> Self {
        self.deterministic = false;
        self
    }

    /// Build the metadata.
    pub fn build(self) -> NodeMetadata {
        NodeMetadata {
            id: self.id,
            name: self.name,
            category: self.category,
            description: self.description,
            version: self.version,
            author: self.author,
            inputs: self.inputs,
            outputs: self.outputs,
            parameters: self.parameters,
            tags: self.tags,
            output_node: self.output_node,
            deterministic: self.deterministic,
        }
    }
}

/// The core trait for plugin nodes.
///
/// # Design
///
/// 1. **Validation Phase** (`validate`): checks widget values against the
///    node's declared constraints before the host runs it.
///
/// 2. **Execution Phase** (`execute`): reads inputs and parameters from the
///    context and sets outputs. Nodes keep no state between calls.
///
/// # Thread Safety
///
/// `Send + Sync` bounds let a host run independent nodes on different threads.
pub trait PluginNode: Send + Sync {
    /// Get the metadata for this node.
    ///
    /// This is called during registration and should return consistent values.
    fn metadata(&self) -> NodeMetadata;

    /// Validate the node configuration.
    ///
    /// The default checks each parameter against its declared type and
    /// constraints.
    fn validate(&self, ctx: &ValidationContext) -> Result<(), ValidationError> {
        self.metadata().validate_parameters(ctx)
    }

    /// Execute the node.
    fn execute(&self, ctx: &mut ExecutionContext) -> Result<(), ExecutionError>;

    /// Clone this node into a boxed trait object.
    fn clone_box(&self) -> Box<dyn PluginNode>;
}

// Allow cloning Box<dyn PluginNode>
impl Clone for Box<dyn PluginNode> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}
