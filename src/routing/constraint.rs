//! Variable constraints.
//!
//! # Responsibilities
//! - Parse constraint definitions (`int`, `between(1,10)`, `regex(\d+)`)
//! - Validate raw segment values
//! - Coerce validated values into typed parameters
//!
//! # Design Decisions
//! - Closed enum, no trait objects in the match loop
//! - Malformed definitions fail while parsing, never while matching
//! - Regex patterns are anchored to the whole segment

use std::fmt;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::routing::error::TemplateError;

/// A typed value extracted from a matched route variable.
///
/// Serialize-only: the untagged form cannot tell a uuid-shaped `Text` from a
/// `Uuid`, so values are never read back.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    Int(i64),
    Float(f64),
    Uuid(Uuid),
    Text(String),
}

impl ParamValue {
    /// Returns the integer value, if this parameter was coerced to one.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            ParamValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the text value, if this parameter stayed a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Text(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Int(v) => write!(f, "{}", v),
            ParamValue::Float(v) => write!(f, "{}", v),
            ParamValue::Uuid(v) => write!(f, "{}", v),
            ParamValue::Text(v) => f.write_str(v),
        }
    }
}

/// An anchored regular expression that serializes as its source text.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    pub fn new(source: &str) -> Result<Self, regex::Error> {
        let regex = Regex::new(&format!("^(?:{})$", source))?;
        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn is_match(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Serialize for Pattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.source)
    }
}

impl<'de> Deserialize<'de> for Pattern {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let source = String::deserialize(deserializer)?;
        Pattern::new(&source).map_err(serde::de::Error::custom)
    }
}

/// A predicate and coercion rule attached to a template variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "args", rename_all = "snake_case")]
pub enum Constraint {
    Int,
    Numeric,
    Alpha,
    Alphanumeric,
    String,
    Uuid,
    /// Inclusive integer range.
    Between { min: i64, max: i64 },
    In(Vec<String>),
    NotIn(Vec<String>),
    Regex(Pattern),
}

impl Constraint {
    /// Parses one constraint from its name and optional parenthesised arguments.
    pub fn parse(name: &str, args: Option<&str>) -> Result<Self, TemplateError> {
        let no_args = |constraint: Constraint| match args {
            None => Ok(constraint),
            Some(_) => Err(invalid_args(name, "takes no arguments")),
        };

        match name {
            "int" => no_args(Constraint::Int),
            "numeric" => no_args(Constraint::Numeric),
            "alpha" => no_args(Constraint::Alpha),
            "alphanumeric" => no_args(Constraint::Alphanumeric),
            "string" => no_args(Constraint::String),
            "uuid" => no_args(Constraint::Uuid),
            "between" => {
                let args = args.ok_or_else(|| invalid_args(name, "expects (min,max)"))?;
                let bounds: Vec<&str> = args.split(',').map(str::trim).collect();
                let [min, max] = bounds.as_slice() else {
                    return Err(invalid_args(name, "expects exactly two bounds"));
                };
                let min: i64 = min
                    .parse()
                    .map_err(|_| invalid_args(name, "bounds must be integers"))?;
                let max: i64 = max
                    .parse()
                    .map_err(|_| invalid_args(name, "bounds must be integers"))?;
                if min > max {
                    return Err(invalid_args(name, "min must not exceed max"));
                }
                Ok(Constraint::Between { min, max })
            }
            "in" | "notIn" => {
                let args = args.ok_or_else(|| invalid_args(name, "expects a value list"))?;
                let values: Vec<String> = args
                    .split(',')
                    .map(|v| v.trim().to_string())
                    .filter(|v| !v.is_empty())
                    .collect();
                if values.is_empty() {
                    return Err(invalid_args(name, "expects at least one value"));
                }
                if name == "in" {
                    Ok(Constraint::In(values))
                } else {
                    Ok(Constraint::NotIn(values))
                }
            }
            "regex" => {
                let source = args
                    .filter(|a| !a.is_empty())
                    .ok_or_else(|| invalid_args(name, "expects a pattern"))?;
                let pattern = Pattern::new(source).map_err(|e| TemplateError::InvalidRegex {
                    pattern: source.to_string(),
                    source: e,
                })?;
                Ok(Constraint::Regex(pattern))
            }
            other => Err(TemplateError::UnknownConstraint {
                constraint: other.to_string(),
            }),
        }
    }

    /// Returns true if the raw value satisfies this constraint.
    pub fn validate(&self, value: &str) -> bool {
        match self {
            Constraint::Int => value.parse::<i64>().is_ok(),
            Constraint::Numeric => value.parse::<f64>().map(f64::is_finite).unwrap_or(false),
            Constraint::Alpha => !value.is_empty() && value.chars().all(|c| c.is_ascii_alphabetic()),
            Constraint::Alphanumeric => {
                !value.is_empty() && value.chars().all(|c| c.is_ascii_alphanumeric())
            }
            Constraint::String => true,
            Constraint::Uuid => Uuid::parse_str(value).is_ok(),
            Constraint::Between { min, max } => value
                .parse::<i64>()
                .map(|v| (*min..=*max).contains(&v))
                .unwrap_or(false),
            Constraint::In(values) => values.iter().any(|v| v == value),
            Constraint::NotIn(values) => values.iter().all(|v| v != value),
            Constraint::Regex(pattern) => pattern.is_match(value),
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::Int => f.write_str("int"),
            Constraint::Numeric => f.write_str("numeric"),
            Constraint::Alpha => f.write_str("alpha"),
            Constraint::Alphanumeric => f.write_str("alphanumeric"),
            Constraint::String => f.write_str("string"),
            Constraint::Uuid => f.write_str("uuid"),
            Constraint::Between { min, max } => write!(f, "between({},{})", min, max),
            Constraint::In(values) => write!(f, "in({})", values.join(",")),
            Constraint::NotIn(values) => write!(f, "notIn({})", values.join(",")),
            Constraint::Regex(pattern) => write!(f, "regex({})", pattern.as_str()),
        }
    }
}

fn invalid_args(constraint: &str, reason: &str) -> TemplateError {
    TemplateError::InvalidConstraintArgs {
        constraint: constraint.to_string(),
        reason: reason.to_string(),
    }
}

/// Returns true if the value passes every constraint in the list.
pub fn validate_all(constraints: &[Constraint], value: &str) -> bool {
    constraints.iter().all(|c| c.validate(value))
}

/// Validates and coerces a raw value.
///
/// The first typing constraint (`int`, `between`, `numeric`, `uuid`) decides
/// the resulting variant; everything else stays text.
pub fn coerce(constraints: &[Constraint], value: &str) -> Option<ParamValue> {
    if !validate_all(constraints, value) {
        return None;
    }

    for constraint in constraints {
        match constraint {
            Constraint::Int | Constraint::Between { .. } => {
                return value.parse().ok().map(ParamValue::Int)
            }
            Constraint::Numeric => return value.parse().ok().map(ParamValue::Float),
            Constraint::Uuid => return Uuid::parse_str(value).ok().map(ParamValue::Uuid),
            _ => {}
        }
    }
    Some(ParamValue::Text(value.to_string()))
}

/// Canonical text of a constraint list, used to compare variable edges.
pub fn signature(constraints: &[Constraint]) -> String {
    let parts: Vec<String> = constraints.iter().map(ToString::to_string).collect();
    format!("{{{}}}", parts.join("|"))
}
