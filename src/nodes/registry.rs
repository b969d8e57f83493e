//! Node registry for managing available node types.

use crate::config::NodesConfig;
use crate::core::context::{ExecutionContext, ValidationContext};
use crate::core::error::{ExecutionError, NodesError, NodesResult, ValidationError};
use crate::core::node::{Category, NodeMetadata, PluginNode};
use crate::core::types::Value;
use indexmap::IndexMap;
use std::collections::HashMap;
use std::sync::Arc;

/// Factory function for creating node instances.
pub type NodeFactory = Arc<dyn Fn() -> Box<dyn PluginNode> + Send + Sync>;

/// Registry entry containing metadata and factory.
#[derive(Clone)]
pub struct RegistryEntry {
    /// Factory function to create instances.
    pub factory: NodeFactory,
    /// Cached metadata (avoids creating instance just to get metadata).
    pub metadata: NodeMetadata,
}

/// Registry for all available node types.
///
/// The host looks nodes up by id, so registration order is kept for menus
/// and listings.
pub struct NodeRegistry {
    /// Nodes indexed by their unique ID.
    nodes: IndexMap<String, RegistryEntry>,
    /// Node ids grouped by category.
    categories: IndexMap<Category, Vec<String>>,
}

impl NodeRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            nodes: IndexMap::new(),
            categories: IndexMap::new(),
        }
    }

    /// Create a registry with the built-in nodes, configured from the
    /// environment.
    pub fn with_builtins() -> Self {
        Self::with_config(&NodesConfig::from_env())
    }

    /// Create a registry with the built-in nodes using `config`.
    pub fn with_config(config: &NodesConfig) -> Self {
        let mut registry = Self::new();
        crate::nodes::builtin::register_all(&mut registry, config);
        registry
    }

    /// Register a node type. A later registration with the same id replaces
    /// the earlier one and moves to the end of the listing.
    pub fn register<F>(&mut self, factory: F)
    where
        F: Fn() -> Box<dyn PluginNode> + Send + Sync + 'static,
    {
        let metadata = factory().metadata();
        let id = metadata.id.clone();
        let category = metadata.category;

        if let Some(previous) = self.nodes.shift_remove(&id) {
            log::debug!("Replacing registered node '{}'", id);
            if let Some(ids) = self.categories.get_mut(&previous.metadata.category) {
                ids.retain(|i| *i != id);
            }
        }

        self.nodes.insert(
            id.clone(),
            RegistryEntry {
                factory: Arc::new(factory),
                metadata,
            },
        );
        self.categories.entry(category).or_default().push(id);
    }

    /// Create a new instance of a node by ID.
    pub fn create(&self, id: &str) -> Option<Box<dyn PluginNode>> {
        self.nodes.get(id).map(|e| (e.factory)())
    }

    /// Get metadata for a node without creating an instance.
    pub fn get_metadata(&self, id: &str) -> Option<&NodeMetadata> {
        self.nodes.get(id).map(|e| &e.metadata)
    }

    /// Check if a node is registered.
    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// All registered node IDs in registration order.
    pub fn node_ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(|s| s.as_str())
    }

    /// Get node ids in a category.
    pub fn nodes_by_category(&self, category: Category) -> Vec<&str> {
        self.categories
            .get(&category)
            .map(|ids| ids.iter().map(|s| s.as_str()).collect())
            .unwrap_or_default()
    }

    /// Search nodes by id, name, description or tag.
    pub fn search(&self, query: &str) -> Vec<&str> {
        let query = query.to_lowercase();

        self.nodes
            .iter()
            .filter(|(_, entry)| {
                let metadata = &entry.metadata;
                metadata.id.to_lowercase().contains(&query)
                    || metadata.name.to_lowercase().contains(&query)
                    || metadata.description.to_lowercase().contains(&query)
                    || metadata.tags.iter().any(|t| t.to_lowercase().contains(&query))
            })
            .map(|(id, _)| id.as_str())
            .collect()
    }

    /// Get the total number of registered nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if registry is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes grouped by category, each group sorted by name.
    pub fn grouped_by_category(&self) -> IndexMap<Category, Vec<&NodeMetadata>> {
        let mut grouped: IndexMap<Category, Vec<&NodeMetadata>> = IndexMap::new();

        for entry in self.nodes.values() {
            grouped
                .entry(entry.metadata.category)
                .or_default()
                .push(&entry.metadata);
        }

        for nodes in grouped.values_mut() {
            nodes.sort_by(|a, b| a.name.cmp(&b.name));
        }

        grouped
    }

    /// Metadata for every node in registration order, for the host to build
    /// its menus.
    pub fn export_metadata(&self) -> Vec<&NodeMetadata> {
        self.nodes.values().map(|e| &e.metadata).collect()
    }

    /// Run node `id` once with the inputs and parameters in `ctx`.
    ///
    /// Parameters missing from `ctx` take their declared default. Required
    /// inputs and parameter constraints are checked before the node runs,
    /// and every declared output must be set afterwards.
    pub fn run(&self, id: &str, ctx: ExecutionContext) -> NodesResult<HashMap<String, Value>> {
        let entry = self
            .nodes
            .get(id)
            .ok_or_else(|| NodesError::UnknownNode(id.to_string()))?;
        let metadata = &entry.metadata;
        let node = (entry.factory)();

        let mut validation = ValidationContext::new(ctx.node_id);
        for (name, value) in ctx.inputs() {
            validation.add_input(name.clone(), value.clone());
        }
        for param in &metadata.parameters {
            let value = ctx
                .parameters()
                .get(&param.name)
                .cloned()
                .unwrap_or_else(|| param.default_value.clone());
            validation.add_parameter(param.name.clone(), value);
        }

        if let Some(port) = metadata
            .inputs
            .iter()
            .find(|port| !port.optional && !validation.has_input(&port.name))
        {
            return Err(ValidationError::MissingRequiredInput {
                node_id: ctx.node_id,
                port: port.name.clone(),
            }
            .into());
        }
        node.validate(&validation)?;

        let mut ctx = ExecutionContext::from(validation);
        for port in &metadata.inputs {
            if let (false, Some(default)) = (ctx.has_input(&port.name), &port.default_value) {
                ctx.add_input(port.name.clone(), default.clone());
            }
        }
        node.execute(&mut ctx)?;

        if let Some(port) = metadata.outputs.iter().find(|port| !ctx.has_output(&port.name)) {
            return Err(ExecutionError::OutputNotSet {
                node_id: ctx.node_id,
                port: port.name.clone(),
            }
            .into());
        }
        Ok(ctx.take_outputs())
    }
}

impl Default for NodeRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::NodeId;
    use crate::core::port::{ParameterDefinition, PortDefinition};
    use crate::core::types::PortType;

    #[derive(Clone)]
    struct Marker(&'static str);

    impl PluginNode for Marker {
        fn metadata(&self) -> NodeMetadata {
            NodeMetadata::builder("marker", "Marker")
                .description(self.0)
                .category(Category::Utility)
                .tag("debug")
                .output(PortDefinition::output("value", PortType::String))
                .build()
        }

        fn execute(&self, _ctx: &mut ExecutionContext) -> Result<(), ExecutionError> {
            Ok(())
        }

        fn clone_box(&self) -> Box<dyn PluginNode> {
            Box::new(self.clone())
        }
    }

    fn ctx() -> ExecutionContext {
        ExecutionContext::new(NodeId::new())
    }

    #[test]
    fn test_register_and_create() {
        let mut registry = NodeRegistry::new();
        registry.register(|| Box::new(Marker("first")));

        assert!(registry.contains("marker"));
        assert!(registry.create("marker").is_some());
        assert_eq!(registry.get_metadata("marker").unwrap().name, "Marker");
        assert_eq!(registry.export_metadata().len(), 1);
    }

    #[test]
    fn test_reregistering_replaces() {
        let mut registry = NodeRegistry::new();
        registry.register(|| Box::new(Marker("first")));
        registry.register(|| Box::new(Marker("second")));

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.nodes_by_category(Category::Utility), vec!["marker"]);
        assert_eq!(registry.get_metadata("marker").unwrap().description, "second");
    }

    #[test]
    fn test_search() {
        let mut registry = NodeRegistry::new();
        registry.register(|| Box::new(Marker("first")));

        assert_eq!(registry.search("DEBUG"), vec!["marker"]);
        assert!(registry.search("nonexistent").is_empty());
    }

    #[test]
    fn test_builtins_are_registered() {
        let registry = NodeRegistry::with_config(&NodesConfig::default());
        for id in [
            "Badman_String",
            "Badman_Concat_String",
            "Badman_Select_String",
            "Badman_Print",
            "BadmanIntUtil",
            "Badman_HexGenerator",
            "BadmanIO",
            "BadmanWanOutpaintFrameCalculator",
            "BadmanWildCardProcessor",
            "BadmanStripSyntax",
        ] {
            assert!(registry.contains(id), "missing builtin {id}");
        }
        assert_eq!(registry.len(), 10);
        assert_eq!(
            registry.nodes_by_category(Category::Video),
            vec!["BadmanWanOutpaintFrameCalculator"]
        );
        assert_eq!(registry.search("wildcard"), vec!["BadmanWildCardProcessor"]);
    }

    #[test]
    fn test_run_fills_default_parameters() {
        let registry = NodeRegistry::with_config(&NodesConfig::default());
        let outputs = registry.run("BadmanWanOutpaintFrameCalculator", ctx()).unwrap();

        assert_eq!(outputs["num_samplers"], Value::Integer(3));
        assert_eq!(outputs["generation_lengths"], Value::integers([81, 81, 49]));
    }

    #[test]
    fn test_run_unknown_node() {
        let registry = NodeRegistry::new();
        assert!(matches!(
            registry.run("missing", ctx()),
            Err(NodesError::UnknownNode(id)) if id == "missing"
        ));
    }

    #[test]
    fn test_run_missing_required_input() {
        let registry = NodeRegistry::with_config(&NodesConfig::default());
        assert!(matches!(
            registry.run("Badman_Select_String", ctx()),
            Err(NodesError::Validation(ValidationError::MissingRequiredInput { port, .. }))
                if port == "strings"
        ));
    }

    #[test]
    fn test_run_rejects_constraint_violation() {
        let registry = NodeRegistry::with_config(&NodesConfig::default());
        let mut ctx = ctx();
        ctx.add_parameter("total_frames", Value::Integer(20000));
        assert!(matches!(
            registry.run("BadmanWanOutpaintFrameCalculator", ctx),
            Err(NodesError::Validation(ValidationError::ConstraintViolation { .. }))
        ));
    }

    #[test]
    fn test_run_requires_every_output() {
        let mut registry = NodeRegistry::new();
        registry.register(|| Box::new(Marker("lazy")));
        assert!(matches!(
            registry.run("marker", ctx()),
            Err(NodesError::Execution(ExecutionError::OutputNotSet { port, .. })) if port == "value"
        ));
    }

    #[test]
    fn test_run_uses_input_default() {
        #[derive(Clone)]
        struct Echo;

        impl PluginNode for Echo {
            fn metadata(&self) -> NodeMetadata {
                NodeMetadata::builder("echo", "Echo")
                    .input(
                        PortDefinition::input("value", PortType::String)
                            .with_default(Value::String("fallback".into())),
                    )
                    .parameter(ParameterDefinition::new(
                        "suffix",
                        PortType::String,
                        Value::String("!".into()),
                    ))
                    .output(PortDefinition::output("value", PortType::String))
                    .build()
            }

            fn execute(&self, ctx: &mut ExecutionContext) -> Result<(), ExecutionError> {
                let value = ctx.get_input("value")?.as_string().unwrap_or_default();
                let text = format!("{}{}", value, ctx.get_string("suffix")?);
                ctx.set_output("value", Value::String(text))
            }

            fn clone_box(&self) -> Box<dyn PluginNode> {
                Box::new(self.clone())
            }
        }

        let mut registry = NodeRegistry::new();
        registry.register(|| Box::new(Echo));
        let outputs = registry.run("echo", ctx()).unwrap();
        assert_eq!(outputs["value"], Value::String("fallback!".into()));
    }
}
