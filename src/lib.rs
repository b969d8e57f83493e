//! # Badman Nodes - Workflow Utility Nodes
//!
//! A collection of small nodes for node-based generation workflows: string
//! and integer helpers, shot folder layouts, WAN outpaint frame planning and
//! a wildcard prompt engine.
//!
//! ## Features
//!
//! - **Wildcard prompts**: `__file__` wildcards, `{a|b}` choices, `<random:lo:hi>`
//!   numbers and `%Node.widget%` workflow references, reproducible per seed
//! - **Frame planning**: split long clips into overlapping WAN sampler stages
//! - **Registry**: discover nodes by id, category or search term
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use badman_nodes::prelude::*;
//!
//! let registry = NodeRegistry::with_builtins();
//!
//! let mut ctx = ExecutionContext::new(NodeId::new());
//! ctx.add_parameter("total_frames", Value::Integer(192));
//! let outputs = registry.run("BadmanWanOutpaintFrameCalculator", ctx)?;
//! ```
//!
//! ## Architecture
//!
//! - [`core`]: Value types, ports, the node trait and errors
//! - [`config`]: Runtime configuration
//! - [`planner`]: Frame counts and the stage planner
//! - [`template`]: Prompt template resolution
//! - [`nodes`]: Node registry and built-in nodes
//!
//! ## Creating Custom Nodes
//!
//! Implement [`PluginNode`](core::node::PluginNode) and register a factory:
//!
//! ```rust,ignore
//! use badman_nodes::prelude::*;
//!
//! #[derive(Clone)]
//! struct Shout;
//!
//! impl PluginNode for Shout {
//!     fn metadata(&self) -> NodeMetadata {
//!         NodeMetadata::builder("shout", "Shout")
//!             .category(Category::Text)
//!             .output(PortDefinition::output("string", PortType::String))
//!             .parameter(ParameterDefinition::new("text", PortType::String, Value::String(String::new())))
//!             .build()
//!     }
//!
//!     fn execute(&self, ctx: &mut ExecutionContext) -> Result<(), ExecutionError> {
//!         let text = ctx.get_string("text")?.to_uppercase();
//!         ctx.set_output("string", Value::String(text))
//!     }
//!
//!     fn clone_box(&self) -> Box<dyn PluginNode> {
//!         Box::new(self.clone())
//!     }
//! }
//!
//! let mut registry = NodeRegistry::with_builtins();
//! registry.register(|| Box::new(Shout));
//! ```

#![warn(clippy::all)]

pub mod config;
pub mod core;
pub mod nodes;
pub mod planner;
pub mod template;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use badman_nodes::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use crate::core::types::{Color, PortType, Value};

    // Node traits and types
    pub use crate::core::node::{Category, NodeMetadata, PluginNode};

    // Port definitions
    pub use crate::core::port::{Constraint, ParameterDefinition, PortDefinition, UiHint};

    // Contexts
    pub use crate::core::context::{ExecutionContext, ValidationContext};

    // Errors
    pub use crate::core::error::{
        ConfigError, ExecutionError, MetadataError, NodeId, NodesError, NodesResult, PlanError,
        ValidationError,
    };

    pub use crate::config::NodesConfig;

    // Planner
    pub use crate::planner::{plan, ExtraContext, Plan, Stage};

    // Templates
    pub use crate::template::{
        strip_syntax, FsWildcardStore, InMemoryWildcards, PromptResolver, WildcardSource,
        WorkflowMetadata,
    };

    // Registry
    pub use crate::nodes::registry::{NodeFactory, NodeRegistry, RegistryEntry};

    // Built-in nodes
    pub use crate::nodes::builtin::{
        // Text
        BadmanPrint, BadmanString, ConcatString, SelectString, StripSyntax, WildcardProcessor,
        // Math
        HexGenerator, IntUtil, MathFunction,
        // Paths
        IoConfigurator, ShotPaths,
        // Video
        WanOutpaintFrameCalculator,
    };
}

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
