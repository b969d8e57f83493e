//! Port and widget definitions for node inputs, outputs and parameters.
//!
//! Inputs and outputs are typed connection points; parameters are widget
//! values with a default, optional constraints and a UI hint for the host.

use crate::core::types::{PortType, Value};
use serde::{Deserialize, Serialize};

/// Direction of a port (input or output).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PortDirection {
    Input,
    Output,
}

/// A connection point on a node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortDefinition {
    /// Key the node reads or writes.
    pub name: String,
    /// Label shown by the host.
    pub display_name: String,
    pub port_type: PortType,
    pub direction: PortDirection,
    /// Value the host substitutes when nothing is connected.
    pub default_value: Option<Value>,
    pub optional: bool,
    /// Filled by the host (workflow JSON and similar), never shown.
    pub hidden: bool,
    pub description: String,
}

/// Widget the host should render for a parameter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(tag = "widget", content = "options")]
pub enum UiHint {
    /// Whatever the host uses for the type.
    #[default]
    Default,
    Slider,
    Dropdown {
        options: Vec<String>,
    },
    TextInput {
        multiline: bool,
        placeholder: Option<String>,
    },
    Checkbox,
    SpinBox,
    /// Integer with a randomize control.
    Seed,
}

/// A widget value set on the node rather than connected to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterDefinition {
    pub name: String,
    pub display_name: String,
    pub param_type: PortType,
    pub default_value: Value,
    pub description: String,
    pub constraints: Vec<Constraint>,
    pub ui_hint: UiHint,
}

/// Checks a parameter value must pass before the node runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "params")]
pub enum Constraint {
    /// Inclusive numeric range.
    Range { min: f64, max: f64 },
    /// Numeric value must be a multiple of the step.
    Step(f64),
    /// Value must equal one of the options.
    OneOf(Vec<Value>),
    /// Numeric value must be `>= 0`.
    NonNegative,
}

// ============================================================================
// PortDefinition
// ============================================================================

impl PortDefinition {
    pub fn input(name: impl Into<String>, port_type: PortType) -> Self {
        Self::with_direction(name.into(), port_type, PortDirection::Input)
    }

    pub fn output(name: impl Into<String>, port_type: PortType) -> Self {
        Self::with_direction(name.into(), port_type, PortDirection::Output)
    }

    fn with_direction(name: String, port_type: PortType, direction: PortDirection) -> Self {
        Self {
            display_name: name_to_display(&name),
            name,
            port_type,
            direction,
            default_value: None,
            optional: false,
            hidden: false,
            description: String::new(),
        }
    }

    /// Default for an unconnected input. Inputs with a default are optional.
    pub fn with_default(mut self, value: Value) -> Self {
        self.default_value = Some(value);
        self.optional = true;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Mark this port as host-provided. Hidden ports are always optional.
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self.optional = true;
        self
    }
}

// ============================================================================
// ParameterDefinition
// ============================================================================

impl ParameterDefinition {
    pub fn new(name: impl Into<String>, param_type: PortType, default_value: Value) -> Self {
        let name = name.into();
        Self {
            display_name: name_to_display(&name),
            name,
            param_type,
            default_value,
            description: String::new(),
            constraints: Vec::new(),
            ui_hint: UiHint::Default,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Add a range constraint; a parameter without a widget becomes a slider.
    pub fn with_range(mut self, min: f64, max: f64) -> Self {
        self.constraints.push(Constraint::Range { min, max });
        if self.ui_hint == UiHint::Default {
            self.ui_hint = UiHint::Slider;
        }
        self
    }

    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    pub fn with_ui_hint(mut self, ui_hint: UiHint) -> Self {
        self.ui_hint = ui_hint;
        self
    }

    /// Check the type first, then every constraint in order.
    pub fn validate(&self, value: &Value) -> Result<(), String> {
        if !self.param_type.matches(value) {
            return Err(format!(
                "Type mismatch for parameter '{}': expected {}, got {}",
                self.name,
                self.param_type,
                value.get_type()
            ));
        }

        self.constraints
            .iter()
            .try_for_each(|constraint| constraint.validate(value))
    }
}

/// `string_field_0` -> `String Field 0`.
fn name_to_display(name: &str) -> String {
    name.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(first) => first.to_uppercase().chain(chars).collect(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

// ============================================================================
// Constraint
// ============================================================================

impl Constraint {
    /// Non-numeric values pass the numeric constraints; the type check
    /// rejects them first.
    pub fn validate(&self, value: &Value) -> Result<(), String> {
        match self {
            Constraint::Range { min, max } => match value.as_float() {
                Some(num) if num < *min || num > *max => {
                    Err(format!("Value {} is out of range [{}, {}]", num, min, max))
                }
                _ => Ok(()),
            },
            Constraint::Step(step) => match value.as_float() {
                Some(num) => {
                    let steps = num / step;
                    if (steps - steps.round()).abs() > 1e-6 {
                        Err(format!("Value {} must be a multiple of {}", num, step))
                    } else {
                        Ok(())
                    }
                }
                None => Ok(()),
            },
            Constraint::OneOf(options) if !options.contains(value) => {
                Err(format!("Value {} is not one of the allowed options", value))
            }
            Constraint::OneOf(_) => Ok(()),
            Constraint::NonNegative => match value.as_float() {
                Some(num) if num < 0.0 => Err(format!("Value {} must be non-negative", num)),
                _ => Ok(()),
            },
        }
    }

    /// Short text for node help.
    pub fn description(&self) -> String {
        match self {
            Constraint::Range { min, max } => format!("between {} and {}", min, max),
            Constraint::Step(step) => format!("multiple of {}", step),
            Constraint::OneOf(options) => {
                let options: Vec<String> = options.iter().map(|o| o.to_string()).collect();
                format!("one of {}", options.join(", "))
            }
            Constraint::NonNegative => "non-negative".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_definition_builder() {
        let port = PortDefinition::input("value", PortType::Any)
            .with_description("Value to log")
            .with_default(Value::String(String::new()));

        assert_eq!(port.display_name, "Value");
        assert_eq!(port.direction, PortDirection::Input);
        assert!(port.optional);
        assert!(!port.hidden);
    }

    #[test]
    fn test_hidden_port_is_optional() {
        let port = PortDefinition::input("extra_pnginfo", PortType::Any).hidden();
        assert!(port.hidden);
        assert!(port.optional);
    }

    #[test]
    fn test_parameter_range() {
        let param = ParameterDefinition::new("total_frames", PortType::Integer, Value::Integer(192))
            .with_range(1.0, 10000.0);

        assert_eq!(param.display_name, "Total Frames");
        assert_eq!(param.ui_hint, UiHint::Slider);
        assert!(param.validate(&Value::Integer(192)).is_ok());
        assert!(param.validate(&Value::Integer(0)).is_err());
        assert!(param.validate(&Value::String("192".into())).is_err());
    }

    #[test]
    fn test_explicit_widget_survives_range() {
        let param = ParameterDefinition::new("n", PortType::Integer, Value::Integer(1))
            .with_ui_hint(UiHint::SpinBox)
            .with_range(1.0, 5.0);
        assert_eq!(param.ui_hint, UiHint::SpinBox);
    }

    #[test]
    fn test_constraint_one_of() {
        let constraint = Constraint::OneOf(vec![
            Value::String("add".into()),
            Value::String("sub".into()),
        ]);
        assert!(constraint.validate(&Value::String("add".into())).is_ok());
        assert!(constraint.validate(&Value::String("pow".into())).is_err());
        assert_eq!(constraint.description(), r#"one of "add", "sub""#);
    }

    #[test]
    fn test_constraint_non_negative() {
        assert!(Constraint::NonNegative.validate(&Value::Integer(0)).is_ok());
        assert!(Constraint::NonNegative.validate(&Value::Integer(-1)).is_err());
    }

    #[test]
    fn test_constraint_step_tolerates_float_error() {
        let constraint = Constraint::Step(0.01);
        assert!(constraint.validate(&Value::Float(0.5)).is_ok());
        assert!(constraint.validate(&Value::Float(0.29)).is_ok());
        assert!(constraint.validate(&Value::Float(0.505)).is_err());
    }

    #[test]
    fn test_name_to_display() {
        assert_eq!(name_to_display("string_field_0"), "String Field 0");
        assert_eq!(name_to_display("seed"), "Seed");
    }
}
