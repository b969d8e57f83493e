//! Built-in node implementations.
//!
//! This module contains the nodes that ship with the collection.

mod math;
mod paths;
mod prompt;
mod strings;
mod video;

use crate::config::NodesConfig;
use crate::core::context::ExecutionContext;
use crate::core::error::ExecutionError;
use crate::core::types::Value;
use crate::nodes::registry::NodeRegistry;

/// Register all built-in nodes.
pub fn register_all(registry: &mut NodeRegistry, config: &NodesConfig) {
    strings::register(registry);
    math::register(registry);
    paths::register(registry);
    video::register(registry);
    prompt::register(registry, config);
}

// Re-export for direct access
pub use math::{HexGenerator, IntUtil, MathFunction};
pub use paths::{IoConfigurator, ShotPaths};
pub use prompt::{StripSyntax, WildcardProcessor};
pub use strings::{BadmanPrint, BadmanString, ConcatString, IndexArg, SelectString};
pub use video::WanOutpaintFrameCalculator;

// ============================================================================
// Argument helpers
// ============================================================================

fn type_error(ctx: &ExecutionContext, name: &str, expected: &str) -> ExecutionError {
    ExecutionError::NodeExecution {
        node_id: ctx.node_id,
        error: format!("'{}' expected {}", name, expected),
    }
}

fn string_arg<'a>(ctx: &'a ExecutionContext, name: &str) -> Result<&'a str, ExecutionError> {
    ctx.get_value(name)?
        .as_string()
        .ok_or_else(|| type_error(ctx, name, "a string"))
}

fn integer_arg(ctx: &ExecutionContext, name: &str) -> Result<i64, ExecutionError> {
    ctx.get_value(name)?
        .as_integer()
        .ok_or_else(|| type_error(ctx, name, "an integer"))
}

fn float_arg(ctx: &ExecutionContext, name: &str) -> Result<f64, ExecutionError> {
    ctx.get_value(name)?
        .as_float()
        .ok_or_else(|| type_error(ctx, name, "a number"))
}

/// Missing booleans read as false, like an unticked checkbox.
fn bool_arg(ctx: &ExecutionContext, name: &str) -> Result<bool, ExecutionError> {
    match ctx.get_value(name) {
        Ok(Value::Boolean(b)) => Ok(*b),
        Ok(_) => Err(type_error(ctx, name, "a boolean")),
        Err(_) => Ok(false),
    }
}
