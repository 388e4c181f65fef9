//! Runtime value types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Runtime value type
///
/// Numbers follow loose script semantics: arithmetic on anything that isn't
/// numeric yields `NaN`, and every comparison against `NaN` is false.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "t", content = "v")]
pub enum Val {
    /// Value of a variable that was created without an initializer
    #[default]
    Undefined,
    Bool(bool),
    Num(f64),
    Str(String),
}

impl Val {
    /// Check if value is truthy (for conditionals)
    pub fn is_truthy(&self) -> bool {
        match self {
            Val::Undefined => false,
            Val::Bool(b) => *b,
            Val::Num(n) => *n != 0.0 && !n.is_nan(),
            Val::Str(s) => !s.is_empty(),
        }
    }

    /// Numeric coercion
    pub fn to_number(&self) -> f64 {
        match self {
            Val::Undefined => f64::NAN,
            Val::Bool(true) => 1.0,
            Val::Bool(false) => 0.0,
            Val::Num(n) => *n,
            Val::Str(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    0.0
                } else {
                    trimmed.parse().unwrap_or(f64::NAN)
                }
            }
        }
    }

    /// Numeric addition (`undefined + 1` is `NaN`)
    pub fn add(&self, other: &Val) -> Val {
        Val::Num(self.to_number() + other.to_number())
    }

    /// Numeric less-than
    pub fn lt(&self, other: &Val) -> bool {
        self.to_number() < other.to_number()
    }

    pub fn as_num(&self) -> Option<f64> {
        match self {
            Val::Num(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for Val {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Val::Undefined => write!(f, "undefined"),
            Val::Bool(b) => write!(f, "{b}"),
            Val::Num(n) if n.is_nan() => write!(f, "NaN"),
            Val::Num(n) if n.is_infinite() => {
                write!(f, "{}Infinity", if *n < 0.0 { "-" } else { "" })
            }
            // Integral values print without a trailing `.0`
            Val::Num(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            Val::Num(n) => write!(f, "{n}"),
            Val::Str(s) => write!(f, "{s}"),
        }
    }
}

impl From<f64> for Val {
    fn from(n: f64) -> Self {
        Val::Num(n)
    }
}

impl From<i32> for Val {
    fn from(n: i32) -> Self {
        Val::Num(f64::from(n))
    }
}

impl From<u32> for Val {
    fn from(n: u32) -> Self {
        Val::Num(f64::from(n))
    }
}

impl From<bool> for Val {
    fn from(b: bool) -> Self {
        Val::Bool(b)
    }
}

impl From<&str> for Val {
    fn from(s: &str) -> Self {
        Val::Str(s.to_string())
    }
}

impl From<String> for Val {
    fn from(s: String) -> Self {
        Val::Str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undefined_arithmetic_is_nan() {
        let v = Val::Undefined.add(&Val::Num(1.0));
        assert!(v.as_num().unwrap().is_nan());
        assert!(!v.lt(&Val::Num(3.0)));
        assert!(!Val::Num(3.0).lt(&v));
    }

    #[test]
    fn test_string_coercion() {
        assert_eq!(Val::from("2").add(&Val::from(1)), Val::Num(3.0));
        assert_eq!(Val::from("").to_number(), 0.0);
        assert!(Val::from("abc").to_number().is_nan());
    }

    #[test]
    fn test_display_matches_script_output() {
        assert_eq!(Val::Num(3.0).to_string(), "3");
        assert_eq!(Val::Num(2.5).to_string(), "2.5");
        assert_eq!(Val::Num(f64::NAN).to_string(), "NaN");
        assert_eq!(Val::Num(f64::NEG_INFINITY).to_string(), "-Infinity");
        assert_eq!(Val::Undefined.to_string(), "undefined");
    }

    #[test]
    fn test_serde_tagging() {
        let json = serde_json::to_string(&Val::Num(1.0)).unwrap();
        assert_eq!(json, r#"{"t":"Num","v":1.0}"#);
        let back: Val = serde_json::from_str(r#"{"t":"Undefined"}"#).unwrap();
        assert_eq!(back, Val::Undefined);
    }
}
