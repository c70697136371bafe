//! DSL Operations for column values
//!
//! Operations applied, in order, to a record field before it is written as a CSV cell.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{FormatError, FormatResult};
use crate::units::{self, NO_SELECTOR, WEI_DECIMALS};

/// All available column operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Operation {
    /// Remove leading and trailing whitespace
    Trim,

    /// Convert to uppercase
    Uppercase,

    /// Convert to lowercase
    Lowercase,

    /// Take a character range
    Substring {
        start: usize,
        #[serde(default)]
        length: Option<usize>,
    },

    /// Ensure string starts with given prefix
    EnsurePrefix {
        value: String,
    },

    /// Keep the 4-byte function selector of hex call data
    MethodSelector {
        /// Written when the input has no selector (absent, empty, too short)
        #[serde(default = "default_selector_fallback")]
        fallback: String,
    },

    /// Shift an integer amount from minor to major units
    FromMinorUnits {
        #[serde(default = "default_decimals")]
        decimals: u32,
        /// Fractional digits written (defaults to `decimals`)
        #[serde(default)]
        precision: Option<u32>,
    },
}

fn default_selector_fallback() -> String {
    NO_SELECTOR.to_string()
}

fn default_decimals() -> u32 {
    WEI_DECIMALS
}

impl Operation {
    /// Selector extraction with the usual `N/A` fallback
    pub fn method_selector() -> Self {
        Operation::MethodSelector {
            fallback: default_selector_fallback(),
        }
    }

    /// Minor-to-major conversion written with `decimals` fractional digits
    pub fn from_minor_units(decimals: u32) -> Self {
        Operation::FromMinorUnits {
            decimals,
            precision: None,
        }
    }

    /// Apply this operation to a value
    ///
    /// `Null` (absent field) passes through every operation except
    /// `method_selector`, which maps it to its fallback.
    pub fn apply(&self, value: &Value) -> FormatResult<Value> {
        match self {
            Operation::Trim => Ok(self.map_string(value, |s| s.trim().to_string())),
            Operation::Uppercase => Ok(self.map_string(value, |s| s.to_uppercase())),
            Operation::Lowercase => Ok(self.map_string(value, |s| s.to_lowercase())),
            Operation::Substring { start, length } => {
                Ok(self.map_string(value, |s| substring(s, *start, *length)))
            }
            Operation::EnsurePrefix { value: prefix } => Ok(self.map_string(value, |s| {
                if s.starts_with(prefix.as_str()) {
                    s.to_string()
                } else {
                    format!("{}{}", prefix, s)
                }
            })),
            Operation::MethodSelector { fallback } => Ok(self.apply_method_selector(value, fallback)),
            Operation::FromMinorUnits { decimals, precision } => {
                self.apply_from_minor_units(value, *decimals, precision.unwrap_or(*decimals))
            }
        }
    }

    fn as_string(value: &Value) -> Option<String> {
        match value {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    fn map_string(&self, value: &Value, f: impl Fn(&str) -> String) -> Value {
        Self::as_string(value)
            .map(|s| Value::String(f(&s)))
            .unwrap_or_else(|| value.clone())
    }

    fn apply_method_selector(&self, value: &Value, fallback: &str) -> Value {
        let input = value.as_str();
        let selector = units::method_selector(input).unwrap_or(fallback);
        Value::String(selector.to_string())
    }

    fn apply_from_minor_units(&self, value: &Value, decimals: u32, precision: u32) -> FormatResult<Value> {
        match value {
            Value::Null => Ok(Value::Null),
            Value::String(s) => units::from_minor_units(s, decimals, precision).map(Value::String),
            Value::Number(n) => {
                units::from_minor_units(&n.to_string(), decimals, precision).map(Value::String)
            }
            Value::Bool(_) => Err(FormatError::UnsupportedType("boolean".to_string())),
            Value::Array(_) => Err(FormatError::UnsupportedType("array".to_string())),
            Value::Object(_) => Err(FormatError::UnsupportedType("object".to_string())),
        }
    }
}

fn substring(s: &str, start: usize, length: Option<usize>) -> String {
    let chars = s.chars().skip(start);
    match length {
        Some(l) => chars.take(l).collect(),
        None => chars.collect(),
    }
}

/// Get a description of all available operations
pub fn operations_description() -> String {
    r#"Available column operations:

| Operation | Description | Parameters |
|-----------|-------------|------------|
| trim | Remove leading/trailing whitespace | - |
| uppercase | Convert to uppercase | - |
| lowercase | Convert to lowercase | - |
| substring | Extract character range | start: start index, length: optional length |
| ensure_prefix | Add prefix if not present | value: prefix string |
| method_selector | Keep "0x" + 4-byte selector of call data | fallback: written when absent (default "N/A") |
| from_minor_units | Integer minor units to fixed-point major units | decimals: exponent (default 18), precision: fractional digits (default = decimals) |

Example column in JSON:
{
  "header": "Value (ETH)",
  "source": "value",
  "operations": [
    {"type": "trim"},
    {"type": "from_minor_units", "decimals": 18}
  ]
}"#.to_string()
}
