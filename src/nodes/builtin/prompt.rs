//! Prompt template nodes.

use super::{integer_arg, string_arg};
use crate::config::NodesConfig;
use crate::core::context::ExecutionContext;
use crate::core::error::{ExecutionError, MetadataError};
use crate::core::node::{Category, NodeMetadata, PluginNode};
use crate::core::port::{Constraint, ParameterDefinition, PortDefinition, UiHint};
use crate::core::types::{PortType, Value};
use crate::nodes::registry::NodeRegistry;
use crate::template::{strip_syntax, PromptResolver, WorkflowMetadata};
use serde_json::Value as JsonValue;

/// Register prompt nodes. The wildcard processor reads files under
/// `config.wildcards_dir`.
pub fn register(registry: &mut NodeRegistry, config: &NodesConfig) {
    let config = config.clone();
    registry.register(move || Box::new(WildcardProcessor::new(config.clone())));
    registry.register(|| Box::new(StripSyntax));
}

// ============================================================================
// Wildcard processor
// ============================================================================

/// Expands wildcards, choices, random ranges and workflow references.
#[derive(Debug, Clone)]
pub struct WildcardProcessor {
    config: NodesConfig,
}

impl WildcardProcessor {
    pub fn new(config: NodesConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &NodesConfig {
        &self.config
    }
}

impl Default for WildcardProcessor {
    fn default() -> Self {
        Self::new(NodesConfig::from_env())
    }
}

/// Host-provided JSON arrives either serialized or already structured.
fn hidden_json(value: &Value) -> Result<JsonValue, MetadataError> {
    match value {
        Value::String(text) => Ok(serde_json::from_str(text)?),
        other => Ok(other.to_json()),
    }
}

/// Workflow metadata from the hidden inputs.
///
/// `None` when the host supplied neither input. Unusable metadata yields an
/// empty table so that date tokens still resolve.
fn workflow_metadata(ctx: &ExecutionContext) -> Option<WorkflowMetadata> {
    let extra = ctx.get_input_optional("extra_pnginfo");
    let prompt = ctx.get_input_optional("prompt_");
    if extra.is_none() && prompt.is_none() {
        return None;
    }

    let parsed = match (extra, prompt) {
        (Some(extra), Some(prompt)) => hidden_json(extra)
            .and_then(|extra| Ok((extra, hidden_json(prompt)?)))
            .and_then(|(extra, prompt)| WorkflowMetadata::from_json(&extra, &prompt)),
        (None, _) => Err(MetadataError::MissingField("extra_pnginfo")),
        (_, None) => Err(MetadataError::MissingField("prompt")),
    };

    match parsed {
        Ok(metadata) => Some(metadata),
        Err(err) => {
            log::warn!("Ignoring workflow metadata: {}", err);
            Some(WorkflowMetadata::new())
        }
    }
}

impl PluginNode for WildcardProcessor {
    fn metadata(&self) -> NodeMetadata {
        NodeMetadata::builder("BadmanWildCardProcessor", "Wildcard Processor (Badman)")
            .description(
                "Resolves __wildcard__ files, {a|b} choices, <random:lo:hi> ranges and \
                 %Node.widget% / %date:...% references into a plain prompt",
            )
            .category(Category::Text)
            .tags(["prompt", "wildcard", "template"])
            .input(
                PortDefinition::input("prompt_", PortType::Any)
                    .with_description("Host prompt graph (JSON)")
                    .hidden(),
            )
            .input(
                PortDefinition::input("extra_pnginfo", PortType::Any)
                    .with_description("Host workflow info (JSON)")
                    .hidden(),
            )
            .output(
                PortDefinition::output("prompt", PortType::String)
                    .with_description("Resolved prompt"),
            )
            .parameter(
                ParameterDefinition::new("prompt", PortType::String, Value::String(String::new()))
                    .with_description("Prompt template")
                    .with_ui_hint(UiHint::TextInput {
                        multiline: true,
                        placeholder: Some("Prompt Text".to_string()),
                    }),
            )
            .parameter(
                ParameterDefinition::new("seed", PortType::Integer, Value::Integer(0))
                    .with_constraint(Constraint::NonNegative)
                    .with_ui_hint(UiHint::Seed),
            )
            .non_deterministic()
            .build()
    }

    fn execute(&self, ctx: &mut ExecutionContext) -> Result<(), ExecutionError> {
        let template = string_arg(ctx, "prompt")?;
        let seed = integer_arg(ctx, "seed")? as u64;
        let metadata = workflow_metadata(ctx);

        let resolved =
            PromptResolver::from_config(&self.config).resolve(template, seed, metadata.as_ref());
        log::debug!("resolved prompt with seed {}: {}", seed, resolved);

        ctx.set_output("prompt", Value::String(resolved))
    }

    fn clone_box(&self) -> Box<dyn PluginNode> {
        Box::new(self.clone())
    }
}

// ============================================================================
// Strip syntax
// ============================================================================

/// Removes template syntax, leaving only the literal prompt text.
#[derive(Debug, Clone)]
pub struct StripSyntax;

impl PluginNode for StripSyntax {
    fn metadata(&self) -> NodeMetadata {
        NodeMetadata::builder("BadmanStripSyntax", "Strip Syntax (Badman)")
            .description("Removes <lora:...>, <style:...>, __wildcard__, [n$...] and {a|b} syntax")
            .category(Category::Text)
            .output(PortDefinition::output("text", PortType::String))
            .parameter(
                ParameterDefinition::new("text", PortType::String, Value::String(String::new()))
                    .with_ui_hint(UiHint::TextInput {
                        multiline: true,
                        placeholder: None,
                    }),
            )
            .build()
    }

    fn execute(&self, ctx: &mut ExecutionContext) -> Result<(), ExecutionError> {
        let stripped = strip_syntax(string_arg(ctx, "text")?);
        ctx.set_output("text", Value::String(stripped))
    }

    fn clone_box(&self) -> Box<dyn PluginNode> {
        Box::new(self.clone())
    }
}
