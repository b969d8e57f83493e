//! Core value types that flow between nodes.
//!
//! The host hands every node a bag of named values. The set of kinds a
//! node can receive is closed, so an enum is used:
//! - Exhaustive matching catches missing cases at compile time
//! - serde handles tagged enums natively for the host boundary

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Values that can be passed into and out of a node.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "data")]
pub enum Value {
    /// 64-bit signed integer
    Integer(i64),
    /// 64-bit floating point number
    Float(f64),
    /// UTF-8 string
    String(String),
    /// Boolean value
    Boolean(bool),
    /// RGBA color value
    Color(Color),
    /// Homogeneous array of values
    Array(Vec<Value>),
    /// Key-value map
    Map(HashMap<String, Value>),
    /// Represents absence of value
    None,
}

/// RGBA color value.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

/// Port types for describing what a node accepts and produces.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(tag = "kind", content = "inner")]
pub enum PortType {
    Integer,
    Float,
    String,
    Boolean,
    Color,
    /// Array of a specific type
    Array(Box<PortType>),
    /// Map with string keys and values of a specific type
    Map(Box<PortType>),
    /// Accepts any type (for generic nodes)
    Any,
}

// ============================================================================
// Value Implementation
// ============================================================================

impl Value {
    /// Get the port type of this value.
    pub fn get_type(&self) -> PortType {
        match self {
            Value::Integer(_) => PortType::Integer,
            Value::Float(_) => PortType::Float,
            Value::String(_) => PortType::String,
            Value::Boolean(_) => PortType::Boolean,
            Value::Color(_) => PortType::Color,
            Value::Array(arr) => {
                if let Some(first) = arr.first() {
                    PortType::Array(Box::new(first.get_type()))
                } else {
                    PortType::Array(Box::new(PortType::Any))
                }
            }
            Value::Map(map) => {
                if let Some(first) = map.values().next() {
                    PortType::Map(Box::new(first.get_type()))
                } else {
                    PortType::Map(Box::new(PortType::Any))
                }
            }
            Value::None => PortType::Any,
        }
    }

    /// Try to get this value as an integer.
    pub fn as_integer(&self) -> Option<i64> {
        if let Value::Integer(i) = self {
            Some(*i)
        } else {
            None
        }
    }

    /// Try to get this value as a float.
    /// Integers are automatically converted to floats.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Try to get this value as a string reference.
    pub fn as_string(&self) -> Option<&str> {
        if let Value::String(s) = self {
            Some(s)
        } else {
            None
        }
    }

    /// Try to get this value as a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        if let Value::Boolean(b) = self {
            Some(*b)
        } else {
            None
        }
    }

    /// Try to get this value as an array reference.
    pub fn as_array(&self) -> Option<&Vec<Value>> {
        if let Value::Array(arr) = self {
            Some(arr)
        } else {
            None
        }
    }

    /// Try to get this value as a map reference.
    pub fn as_map(&self) -> Option<&HashMap<String, Value>> {
        if let Value::Map(map) = self {
            Some(map)
        } else {
            None
        }
    }

    /// Check if this value is None.
    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    /// Build an integer array value.
    pub fn integers(values: impl IntoIterator<Item = i64>) -> Self {
        Value::Array(values.into_iter().map(Value::Integer).collect())
    }

    /// Convert a host JSON value into a node value.
    ///
    /// JSON numbers become integers when they fit, floats otherwise.
    pub fn from_json(json: &serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::None,
            serde_json::Value::Bool(b) => Value::Boolean(*b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Integer(i),
                None => Value::Float(n.as_f64().unwrap_or(0.0)),
            },
            serde_json::Value::String(s) => Value::String(s.clone()),
            serde_json::Value::Array(items) => {
                Value::Array(items.iter().map(Value::from_json).collect())
            }
            serde_json::Value::Object(map) => Value::Map(
                map.iter()
                    .map(|(k, v)| (k.clone(), Value::from_json(v)))
                    .collect(),
            ),
        }
    }
}

impl Value {
    /// Convert a node value back into host JSON.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::json;
        match self {
            Value::Integer(i) => json!(i),
            Value::Float(f) => json!(f),
            Value::String(s) => json!(s),
            Value::Boolean(b) => json!(b),
            Value::Color(c) => json!({ "r": c.r, "g": c.g, "b": c.b, "a": c.a }),
            Value::Array(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Map(map) => serde_json::Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
            Value::None => serde_json::Value::Null,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(fl) => write!(f, "{:.4}", fl),
            Value::String(s) => write!(f, "\"{}\"", s),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Color(c) => write!(f, "Color({}, {}, {}, {})", c.r, c.g, c.b, c.a),
            Value::Array(arr) => write!(f, "Array[{}]", arr.len()),
            Value::Map(map) => write!(f, "Map{{{} entries}}", map.len()),
            Value::None => write!(f, "None"),
        }
    }
}

// ============================================================================
// PortType Implementation
// ============================================================================

impl PortType {
    /// Check if a value matches this port type.
    pub fn matches(&self, value: &Value) -> bool {
        match (self, value) {
            (PortType::Any, _) => true,
            (PortType::Integer, Value::Integer(_)) => true,
            (PortType::Float, Value::Float(_)) => true,
            // Integer can be used where float is expected (implicit conversion)
            (PortType::Float, Value::Integer(_)) => true,
            (PortType::String, Value::String(_)) => true,
            (PortType::Boolean, Value::Boolean(_)) => true,
            (PortType::Color, Value::Color(_)) => true,
            (PortType::Array(inner), Value::Array(arr)) => {
                arr.is_empty() || arr.iter().all(|v| inner.matches(v))
            }
            (PortType::Map(inner), Value::Map(map)) => {
                map.is_empty() || map.values().all(|v| inner.matches(v))
            }
            _ => false,
        }
    }

    /// Get a human-readable name for this type.
    pub fn display_name(&self) -> String {
        match self {
            PortType::Integer => "Integer".to_string(),
            PortType::Float => "Float".to_string(),
            PortType::String => "String".to_string(),
            PortType::Boolean => "Boolean".to_string(),
            PortType::Color => "Color".to_string(),
            PortType::Array(inner) => format!("Array<{}>", inner.display_name()),
            PortType::Map(inner) => format!("Map<String, {}>", inner.display_name()),
            PortType::Any => "Any".to_string(),
        }
    }
}

impl fmt::Display for PortType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

// ============================================================================
// Color Implementation
// ============================================================================

impl Color {
    /// Create a new color from RGBA components.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create a color from RGB components (alpha = 255).
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Create a color from linear 0.0-1.0 channel values.
    ///
    /// Channels are scaled to 0-255 and rounded half to even.
    pub fn from_linear(r: f64, g: f64, b: f64) -> Self {
        let to_byte = |c: f64| (c.clamp(0.0, 1.0) * 255.0).round_ties_even() as u8;
        Self::rgb(to_byte(r), to_byte(g), to_byte(b))
    }

    /// Pack the RGB channels into a `0xRRGGBB` integer.
    pub fn to_rgb_int(&self) -> i64 {
        ((self.r as i64) << 16) + ((self.g as i64) << 8) + self.b as i64
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            format!("#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::rgb(0, 0, 0)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_type_matching() {
        assert!(PortType::Integer.matches(&Value::Integer(42)));
        assert!(PortType::Float.matches(&Value::Float(3.5)));
        assert!(PortType::Float.matches(&Value::Integer(42))); // Implicit conversion
        assert!(!PortType::Integer.matches(&Value::Float(3.5))); // No downcast
        assert!(PortType::Any.matches(&Value::String("test".to_string())));
        assert!(PortType::Array(Box::new(PortType::Integer)).matches(&Value::integers([81, 49])));
    }

    #[test]
    fn test_color_from_linear() {
        assert_eq!(Color::from_linear(1.0, 0.0, 0.0), Color::rgb(255, 0, 0));
        assert_eq!(Color::from_linear(0.5, 0.5, 0.5).to_rgb_int(), 0x808080);
        assert_eq!(Color::from_linear(1.2, 1.0, -0.1).to_rgb_int(), 0xFFFF00);
    }

    #[test]
    fn test_color_hex() {
        assert_eq!(Color::rgb(255, 128, 0).to_hex(), "#FF8000");
        assert_eq!(Color::new(0, 255, 0, 128).to_hex(), "#00FF0080");
    }

    #[test]
    fn test_value_from_json() {
        let json: serde_json::Value = serde_json::json!({"seed": 7, "cfg": 6.5, "text": "hi"});
        let value = Value::from_json(&json);
        let map = value.as_map().unwrap();
        assert_eq!(map.get("seed"), Some(&Value::Integer(7)));
        assert_eq!(map.get("cfg"), Some(&Value::Float(6.5)));
        assert_eq!(map.get("text"), Some(&Value::String("hi".to_string())));
        assert_eq!(value.to_json(), json);
    }
}
