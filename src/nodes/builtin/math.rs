//! Integer math and color code nodes.

use super::{bool_arg, float_arg, integer_arg, string_arg};
use crate::core::context::ExecutionContext;
use crate::core::error::ExecutionError;
use crate::core::node::{Category, NodeMetadata, PluginNode};
use crate::core::port::{Constraint, ParameterDefinition, PortDefinition, UiHint};
use crate::core::types::{Color, PortType, Value};
use crate::nodes::registry::NodeRegistry;
use std::fmt;
use std::str::FromStr;

/// Register math nodes.
pub fn register(registry: &mut NodeRegistry) {
    registry.register(|| Box::new(IntUtil));
    registry.register(|| Box::new(HexGenerator));
}

/// Operation selected on the integer math node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathFunction {
    Add,
    Multiply,
    Sub,
    Divide,
}

impl MathFunction {
    pub const ALL: [MathFunction; 4] = [
        MathFunction::Add,
        MathFunction::Multiply,
        MathFunction::Sub,
        MathFunction::Divide,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MathFunction::Add => "add",
            MathFunction::Multiply => "multiply",
            MathFunction::Sub => "sub",
            MathFunction::Divide => "divide",
        }
    }

    /// Apply to `a` and `b`. `None` on overflow or division by zero.
    ///
    /// Division truncates toward zero.
    pub fn apply(&self, a: i64, b: i64) -> Option<i64> {
        match self {
            MathFunction::Add => a.checked_add(b),
            MathFunction::Multiply => a.checked_mul(b),
            MathFunction::Sub => a.checked_sub(b),
            MathFunction::Divide => a.checked_div(b),
        }
    }
}

impl fmt::Display for MathFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MathFunction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MathFunction::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| format!("Unsupported math mode: {}", s))
    }
}

/// Add, multiply, subtract or divide two integers.
#[derive(Debug, Clone)]
pub struct IntUtil;

impl PluginNode for IntUtil {
    fn metadata(&self) -> NodeMetadata {
        let functions: Vec<String> = MathFunction::ALL.iter().map(|f| f.to_string()).collect();

        NodeMetadata::builder("BadmanIntUtil", "Int Math (Badman)")
            .description("Applies an integer operation to two integers")
            .category(Category::Math)
            .output(PortDefinition::output("int", PortType::Integer))
            .parameter(
                ParameterDefinition::new("int1", PortType::Integer, Value::Integer(0))
                    .with_constraint(Constraint::NonNegative),
            )
            .parameter(
                ParameterDefinition::new("int2", PortType::Integer, Value::Integer(0))
                    .with_constraint(Constraint::NonNegative),
            )
            .parameter(
                ParameterDefinition::new(
                    "math_function",
                    PortType::String,
                    Value::String(MathFunction::Add.to_string()),
                )
                .with_constraint(Constraint::OneOf(
                    functions.iter().cloned().map(Value::String).collect(),
                ))
                .with_ui_hint(UiHint::Dropdown { options: functions }),
            )
            .build()
    }

    fn execute(&self, ctx: &mut ExecutionContext) -> Result<(), ExecutionError> {
        let a = integer_arg(ctx, "int1")?;
        let b = integer_arg(ctx, "int2")?;
        let function: MathFunction =
            string_arg(ctx, "math_function")?
                .parse()
                .map_err(|error| ExecutionError::NodeExecution {
                    node_id: ctx.node_id,
                    error,
                })?;

        let result = match function.apply(a, b) {
            Some(result) => result,
            None if function == MathFunction::Divide && b == 0 => {
                return Err(ExecutionError::DivisionByZero {
                    node_id: ctx.node_id,
                })
            }
            None => {
                return Err(ExecutionError::NodeExecution {
                    node_id: ctx.node_id,
                    error: format!("integer overflow in {} {} {}", a, function, b),
                })
            }
        };

        ctx.set_output("int", Value::Integer(result))
    }

    fn clone_box(&self) -> Box<dyn PluginNode> {
        Box::new(self.clone())
    }
}

/// Linear RGB channels to a `0xRRGGBB` integer.
#[derive(Debug, Clone)]
pub struct HexGenerator;

fn channel(name: &str) -> ParameterDefinition {
    ParameterDefinition::new(name, PortType::Float, Value::Float(0.5))
        .with_range(0.0, 1.0)
        .with_constraint(Constraint::Step(0.01))
}

impl PluginNode for HexGenerator {
    fn metadata(&self) -> NodeMetadata {
        NodeMetadata::builder("Badman_HexGenerator", "Hex Generator (Badman)")
            .description("Converts linear RGB values (0-1) to a 0xRRGGBB integer color code")
            .category(Category::Utility)
            .output(
                PortDefinition::output("color", PortType::Integer)
                    .with_description("Color packed as 0xRRGGBB"),
            )
            .output(
                PortDefinition::output("hex", PortType::String)
                    .with_description("Color as #RRGGBB"),
            )
            .parameter(channel("r"))
            .parameter(channel("g"))
            .parameter(channel("b"))
            .parameter(
                ParameterDefinition::new("grayscale", PortType::Boolean, Value::Boolean(false))
                    .with_description("Use the red channel for all three components")
                    .with_ui_hint(UiHint::Checkbox),
            )
            .build()
    }

    fn execute(&self, ctx: &mut ExecutionContext) -> Result<(), ExecutionError> {
        let r = float_arg(ctx, "r")?;
        let (g, b) = if bool_arg(ctx, "grayscale")? {
            (r, r)
        } else {
            (float_arg(ctx, "g")?, float_arg(ctx, "b")?)
        };

        let color = Color::from_linear(r, g, b);
        ctx.set_output("color", Value::Integer(color.to_rgb_int()))?;
        ctx.set_output("hex", Value::String(color.to_hex()))
    }

    fn clone_box(&self) -> Box<dyn PluginNode> {
        Box::new(self.clone())
    }
}
