//! String utility nodes.

use super::{bool_arg, string_arg, type_error};
use crate::core::context::ExecutionContext;
use crate::core::error::ExecutionError;
use crate::core::node::{Category, NodeMetadata, PluginNode};
use crate::core::port::{Constraint, ParameterDefinition, PortDefinition, UiHint};
use crate::core::types::{PortType, Value};
use crate::nodes::registry::NodeRegistry;

/// Register string nodes.
pub fn register(registry: &mut NodeRegistry) {
    registry.register(|| Box::new(BadmanString));
    registry.register(|| Box::new(ConcatString));
    registry.register(|| Box::new(SelectString));
    registry.register(|| Box::new(BadmanPrint));
}

/// String passthrough.
#[derive(Debug, Clone)]
pub struct BadmanString;

impl PluginNode for BadmanString {
    fn metadata(&self) -> NodeMetadata {
        NodeMetadata::builder("Badman_String", "String (Badman)")
            .description("Outputs the entered string")
            .category(Category::Text)
            .output(PortDefinition::output("string", PortType::String))
            .parameter(
                ParameterDefinition::new("value", PortType::String, Value::String(String::new()))
                    .with_description("String value"),
            )
            .build()
    }

    fn execute(&self, ctx: &mut ExecutionContext) -> Result<(), ExecutionError> {
        let value = string_arg(ctx, "value")?.to_string();
        ctx.set_output("string", Value::String(value))
    }

    fn clone_box(&self) -> Box<dyn PluginNode> {
        Box::new(self.clone())
    }
}

/// Concatenate two strings, optionally on separate lines.
#[derive(Debug, Clone)]
pub struct ConcatString;

impl PluginNode for ConcatString {
    fn metadata(&self) -> NodeMetadata {
        NodeMetadata::builder("Badman_Concat_String", "Concat String (Badman)")
            .description("Joins two strings, with a newline between them when enabled")
            .category(Category::Text)
            .output(PortDefinition::output("string", PortType::String))
            .parameter(ParameterDefinition::new(
                "string_field_0",
                PortType::String,
                Value::String("Hello".to_string()),
            ))
            .parameter(ParameterDefinition::new(
                "string_field_1",
                PortType::String,
                Value::String("World".to_string()),
            ))
            .parameter(
                ParameterDefinition::new("newline", PortType::Boolean, Value::Boolean(false))
                    .with_ui_hint(UiHint::Checkbox),
            )
            .build()
    }

    fn execute(&self, ctx: &mut ExecutionContext) -> Result<(), ExecutionError> {
        let first = string_arg(ctx, "string_field_0")?;
        let second = string_arg(ctx, "string_field_1")?;
        let separator = if bool_arg(ctx, "newline")? { "\n" } else { "" };

        let joined = format!("{}{}{}", first, separator, second);
        ctx.set_output("string", Value::String(joined))
    }

    fn clone_box(&self) -> Box<dyn PluginNode> {
        Box::new(self.clone())
    }
}

/// Index argument that arrives either alone or as a list.
///
/// List-mode hosts deliver every argument as a list; only the first entry
/// of the index list is used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexArg {
    Scalar(i64),
    List(Vec<i64>),
}

impl IndexArg {
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Integer(i) => Some(IndexArg::Scalar(*i)),
            Value::Array(items) => items
                .iter()
                .map(Value::as_integer)
                .collect::<Option<Vec<_>>>()
                .map(IndexArg::List),
            _ => None,
        }
    }

    /// The index to use, if any.
    pub fn resolve(&self) -> Option<i64> {
        match self {
            IndexArg::Scalar(i) => Some(*i),
            IndexArg::List(items) => items.first().copied(),
        }
    }
}

/// Pick one string from a list.
#[derive(Debug, Clone)]
pub struct SelectString;

impl PluginNode for SelectString {
    fn metadata(&self) -> NodeMetadata {
        NodeMetadata::builder("Badman_Select_String", "Select String (Badman)")
            .description("Selects the string at the given index of a string list")
            .category(Category::Text)
            .input(
                PortDefinition::input("strings", PortType::Array(Box::new(PortType::String)))
                    .with_description("Candidate strings; a single string counts as a list of one"),
            )
            .output(PortDefinition::output("string", PortType::String))
            .parameter(
                ParameterDefinition::new("index", PortType::Integer, Value::Integer(0))
                    .with_constraint(Constraint::NonNegative)
                    .with_ui_hint(UiHint::SpinBox),
            )
            .build()
    }

    fn execute(&self, ctx: &mut ExecutionContext) -> Result<(), ExecutionError> {
        let index = IndexArg::from_value(ctx.get_value("index")?)
            .ok_or_else(|| type_error(ctx, "index", "an integer or a list of integers"))?
            .resolve()
            .ok_or_else(|| type_error(ctx, "index", "at least one index"))?;

        let strings: Vec<&str> = match ctx.get_input("strings")? {
            Value::String(s) => vec![s.as_str()],
            Value::Array(items) => items
                .iter()
                .map(Value::as_string)
                .collect::<Option<Vec<_>>>()
                .ok_or_else(|| type_error(ctx, "strings", "a list of strings"))?,
            _ => return Err(type_error(ctx, "strings", "a list of strings")),
        };

        let selected = usize::try_from(index)
            .ok()
            .and_then(|i| strings.get(i))
            .ok_or_else(|| ExecutionError::NodeExecution {
                node_id: ctx.node_id,
                error: format!("index {} out of range for {} strings", index, strings.len()),
            })?
            .to_string();

        ctx.set_output("string", Value::String(selected))
    }

    fn clone_box(&self) -> Box<dyn PluginNode> {
        Box::new(self.clone())
    }
}

/// Output node that logs its input.
#[derive(Debug, Clone)]
pub struct BadmanPrint;

impl PluginNode for BadmanPrint {
    fn metadata(&self) -> NodeMetadata {
        NodeMetadata::builder("Badman_Print", "Print (Badman)")
            .description("Logs the input value")
            .category(Category::Output)
            .input(PortDefinition::input("value", PortType::Any).with_default(Value::String(String::new())))
            .output_node()
            .build()
    }

    fn execute(&self, ctx: &mut ExecutionContext) -> Result<(), ExecutionError> {
        match ctx.get_input_optional("value") {
            Some(Value::String(text)) => log::info!("{}", text),
            Some(other) => log::info!("{}", other),
            None => log::info!(""),
        }
        Ok(())
    }

    fn clone_box(&self) -> Box<dyn PluginNode> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::NodeId;

    fn strings(items: &[&str]) -> Value {
        Value::Array(items.iter().map(|s| Value::String(s.to_string())).collect())
    }

    fn output(ctx: ExecutionContext, port: &str) -> Value {
        ctx.take_outputs().remove(port).unwrap()
    }

    #[test]
    fn test_string_passthrough() {
        let mut ctx = ExecutionContext::new(NodeId::new());
        ctx.add_parameter("value", Value::String("keep me".to_string()));
        BadmanString.execute(&mut ctx).unwrap();
        assert_eq!(output(ctx, "string"), Value::String("keep me".to_string()));
    }

    #[test]
    fn test_concat() {
        let mut ctx = ExecutionContext::new(NodeId::new());
        ctx.add_parameter("string_field_0", Value::String("Hello".to_string()));
        ctx.add_parameter("string_field_1", Value::String("World".to_string()));
        ConcatString.execute(&mut ctx).unwrap();
        assert_eq!(output(ctx, "string"), Value::String("HelloWorld".to_string()));

        let mut ctx = ExecutionContext::new(NodeId::new());
        ctx.add_parameter("string_field_0", Value::String("Hello".to_string()));
        ctx.add_input("string_field_1", Value::String("there".to_string()));
        ctx.add_parameter("newline", Value::Boolean(true));
        ConcatString.execute(&mut ctx).unwrap();
        assert_eq!(output(ctx, "string"), Value::String("Hello\nthere".to_string()));
    }

    #[test]
    fn test_index_arg_normalizes() {
        assert_eq!(IndexArg::from_value(&Value::Integer(2)).unwrap().resolve(), Some(2));
        assert_eq!(
            IndexArg::from_value(&Value::integers([1, 5])).unwrap().resolve(),
            Some(1)
        );
        assert_eq!(IndexArg::from_value(&Value::Array(Vec::new())).unwrap().resolve(), None);
        assert!(IndexArg::from_value(&Value::String("1".to_string())).is_none());
    }

    #[test]
    fn test_select_string() {
        let mut ctx = ExecutionContext::new(NodeId::new());
        ctx.add_input("strings", strings(&["a", "b", "c"]));
        ctx.add_input("index", Value::integers([2]));
        SelectString.execute(&mut ctx).unwrap();
        assert_eq!(output(ctx, "string"), Value::String("c".to_string()));
    }

    #[test]
    fn test_select_string_out_of_range() {
        let mut ctx = ExecutionContext::new(NodeId::new());
        ctx.add_input("strings", Value::String("only".to_string()));
        ctx.add_parameter("index", Value::Integer(1));
        assert!(matches!(
            SelectString.execute(&mut ctx),
            Err(ExecutionError::NodeExecution { .. })
        ));

        let mut ctx = ExecutionContext::new(NodeId::new());
        ctx.add_input("strings", strings(&["a"]));
        ctx.add_parameter("index", Value::Integer(-1));
        assert!(SelectString.execute(&mut ctx).is_err());
    }

    #[test]
    fn test_print_is_output_node() {
        assert!(BadmanPrint.metadata().output_node);
        let mut ctx = ExecutionContext::new(NodeId::new());
        ctx.add_input("value", Value::Integer(3));
        BadmanPrint.execute(&mut ctx).unwrap();
        assert!(ctx.outputs().is_empty());
    }
}
