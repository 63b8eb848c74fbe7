//! Declarative response schemas.
//!
//! Every analysis reply is described as static `Schema` data. The same
//! description gates the model's raw JSON at runtime (`Schema::validate`) and
//! is rendered into the prompt (`Schema::describe`), so the instructions the
//! model receives and the checks its output must pass cannot drift apart.
//!
//! The response types also derive `schemars::JsonSchema`; that document is
//! what the provider receives as the target shape. Tests keep the two in
//! step with `drift_from_generated`.

use std::fmt;

use schemars::{schema_for, JsonSchema};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Shape of a JSON value.
#[derive(Debug, Clone, Copy)]
pub enum Schema {
    Object(&'static [Field]),
    Array(&'static Schema),
    String { max_len: Option<usize> },
    /// Inclusive bounds.
    Integer { min: i64, max: i64 },
    Boolean,
    /// A string restricted to a closed set of values.
    Enum(&'static [&'static str]),
}

/// A named member of an object schema.
#[derive(Debug, Clone, Copy)]
pub struct Field {
    pub name: &'static str,
    pub schema: Schema,
    /// Optional fields may be absent or `null`.
    pub required: bool,
    pub description: &'static str,
}

impl Field {
    pub const fn required(name: &'static str, schema: Schema, description: &'static str) -> Self {
        Self {
            name,
            schema,
            required: true,
            description,
        }
    }

    pub const fn optional(name: &'static str, schema: Schema, description: &'static str) -> Self {
        Self {
            name,
            schema,
            required: false,
            description,
        }
    }
}

/// Plain string with no length cap.
pub const TEXT: Schema = Schema::String { max_len: None };

/// Integer score on the 0–100 scale.
pub const SCORE: Schema = Schema::Integer { min: 0, max: 100 };

/// List of plain strings.
pub const TEXT_LIST: Schema = Schema::Array(&TEXT);

/// One schema violation, located by a dotted JSON path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub path: String,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "<root>: {}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// Why a model reply was not accepted.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("reply is not valid JSON: {0}")]
    Syntax(#[source] serde_json::Error),

    #[error("reply violates the schema ({} problem(s)): {}", .0.len(), join_violations(.0))]
    Schema(Vec<Violation>),

    #[error("reply does not match the response type: {0}")]
    Shape(#[source] serde_json::Error),
}

fn join_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// A typed reply that an analysis workflow asks the model to produce.
///
/// Implementors are the top-level wrapper objects (`{"analysis": ...}` etc.),
/// so the schema covers the exact document the model must emit.
pub trait ResponseModel: Serialize + DeserializeOwned + JsonSchema + Send + 'static {
    /// Identifier used in logs, errors and as the provider's schema name.
    /// Letters, digits and underscores only.
    const NAME: &'static str;

    fn schema() -> &'static Schema;

    /// A fully populated instance, embedded in prompts as the worked example.
    fn example() -> Self;

    /// JSON Schema document sent to the provider as the target shape.
    fn response_schema() -> Value {
        serde_json::to_value(schema_for!(Self)).unwrap_or(Value::Bool(true))
    }
}

impl Schema {
    /// Checks `value` against this schema and reports every violation found,
    /// not just the first one. Pure: the value is never modified.
    pub fn validate(&self, value: &Value) -> Result<(), Vec<Violation>> {
        let mut violations = Vec::new();
        self.check(value, "", &mut violations);
        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }

    fn check(&self, value: &Value, path: &str, out: &mut Vec<Violation>) {
        match self {
            Schema::Object(fields) => {
                let Some(map) = value.as_object() else {
                    out.push(mismatch(path, "object", value));
                    return;
                };
                for field in fields.iter() {
                    let child = child_path(path, field.name);
                    match map.get(field.name) {
                        None if field.required => out.push(Violation {
                            path: child,
                            message: "missing required field".to_string(),
                        }),
                        Some(Value::Null) if field.required => out.push(Violation {
                            path: child,
                            message: "must not be null".to_string(),
                        }),
                        None | Some(Value::Null) => {}
                        Some(inner) => field.schema.check(inner, &child, out),
                    }
                }
            }
            Schema::Array(item) => {
                let Some(items) = value.as_array() else {
                    out.push(mismatch(path, "array", value));
                    return;
                };
                for (i, inner) in items.iter().enumerate() {
                    item.check(inner, &format!("{path}[{i}]"), out);
                }
            }
            Schema::String { max_len } => {
                let Some(text) = value.as_str() else {
                    out.push(mismatch(path, "string", value));
                    return;
                };
                if let Some(max) = max_len {
                    let len = text.chars().count();
                    if len > *max {
                        out.push(Violation {
                            path: path.to_string(),
                            message: format!("must be at most {max} characters, found {len}"),
                        });
                    }
                }
            }
            Schema::Integer { min, max } => {
                let Some(n) = whole_number(value) else {
                    out.push(mismatch(path, "integer", value));
                    return;
                };
                if n < *min || n > *max {
                    out.push(Violation {
                        path: path.to_string(),
                        message: format!("must be between {min} and {max}, found {n}"),
                    });
                }
            }
            Schema::Boolean => {
                if !value.is_boolean() {
                    out.push(mismatch(path, "boolean", value));
                }
            }
            Schema::Enum(allowed) => {
                let Some(text) = value.as_str() else {
                    out.push(mismatch(path, "string", value));
                    return;
                };
                if !allowed.contains(&text) {
                    out.push(Violation {
                        path: path.to_string(),
                        message: format!("must be one of {}, found '{text}'", quoted(allowed)),
                    });
                }
            }
        }
    }

    /// Rewrites whole-number floats (`80.0`) at integer positions as JSON
    /// integers so they deserialize into integer fields. Run after `validate`.
    pub fn normalize(&self, value: &mut Value) {
        match (self, value) {
            (Schema::Object(fields), Value::Object(map)) => {
                for field in fields.iter() {
                    if let Some(inner) = map.get_mut(field.name) {
                        field.schema.normalize(inner);
                    }
                }
            }
            (Schema::Array(item), Value::Array(items)) => {
                for inner in items.iter_mut() {
                    item.normalize(inner);
                }
            }
            (Schema::Integer { .. }, value) if value.is_f64() => {
                if let Some(n) = whole_number(value) {
                    *value = Value::from(n);
                }
            }
            _ => {}
        }
    }

    /// Renders a field-by-field listing of the schema for use in prompts.
    pub fn describe(&self) -> String {
        let mut out = String::new();
        if let Schema::Object(fields) = self {
            describe_fields(fields, 0, &mut out);
        } else {
            out.push_str(&self.type_label());
            out.push('\n');
        }
        out
    }

    fn type_label(&self) -> String {
        match self {
            Schema::Object(_) => "object".to_string(),
            Schema::Array(item) => match item {
                Schema::Object(_) => "array of objects".to_string(),
                other => format!("array of {}", other.type_label()),
            },
            Schema::String { max_len: Some(max) } => format!("string, at most {max} characters"),
            Schema::String { max_len: None } => "string".to_string(),
            Schema::Integer { min, max } => format!("integer {min}-{max}"),
            Schema::Boolean => "boolean".to_string(),
            Schema::Enum(allowed) => format!("one of {}", quoted(allowed)),
        }
    }

    fn nested_fields(&self) -> Option<&'static [Field]> {
        match self {
            Schema::Object(fields) => Some(*fields),
            Schema::Array(item) => item.nested_fields(),
            _ => None,
        }
    }
}

fn describe_fields(fields: &[Field], depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    for field in fields {
        let presence = if field.required {
            "required"
        } else {
            "optional"
        };
        out.push_str(&format!(
            "{indent}- {} ({}, {presence})",
            field.name,
            field.schema.type_label()
        ));
        if !field.description.is_empty() {
            out.push_str(": ");
            out.push_str(field.description);
        }
        out.push('\n');
        if let Some(nested) = field.schema.nested_fields() {
            describe_fields(nested, depth + 1, out);
        }
    }
}

/// Integer value of `value`, accepting floats with no fractional part.
fn whole_number(value: &Value) -> Option<i64> {
    if let Some(n) = value.as_i64() {
        return Some(n);
    }
    const LIMIT: f64 = 9_223_372_036_854_775_808.0; // 2^63
    value
        .as_f64()
        .filter(|f| f.fract() == 0.0 && *f >= -LIMIT && *f < LIMIT)
        .map(|f| f as i64)
}

fn child_path(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}.{name}")
    }
}

fn mismatch(path: &str, expected: &str, found: &Value) -> Violation {
    Violation {
        path: path.to_string(),
        message: format!("expected {expected}, found {}", kind_of(found)),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn quoted(values: &[&str]) -> String {
    values
        .iter()
        .map(|v| format!("'{v}'"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Differences between a declarative schema and a generated JSON Schema
/// document: fields missing on either side, required flags that disagree and
/// enumerations whose values differ. Empty when the two describe one shape.
#[cfg(test)]
pub fn drift_from_generated(schema: &Schema, generated: &Value) -> Vec<String> {
    let mut out = Vec::new();
    compare_generated(schema, generated, generated, "", &mut out);
    out
}

#[cfg(test)]
fn resolve_generated<'a>(root: &'a Value, mut node: &'a Value) -> &'a Value {
    loop {
        if let Some(reference) = node.get("$ref").and_then(Value::as_str) {
            node = &root["$defs"][reference.trim_start_matches("#/$defs/")];
            continue;
        }
        if let Some(branches) = node.get("anyOf").and_then(Value::as_array) {
            if let Some(branch) = branches.iter().find(|b| b["type"] != "null") {
                node = branch;
                continue;
            }
        }
        return node;
    }
}

#[cfg(test)]
fn compare_generated(schema: &Schema, node: &Value, root: &Value, path: &str, out: &mut Vec<String>) {
    let node = resolve_generated(root, node);
    match schema {
        Schema::Object(fields) => {
            let Some(props) = node.get("properties").and_then(Value::as_object) else {
                out.push(format!("{path}: generated schema has no properties"));
                return;
            };
            let required: Vec<&str> = node
                .get("required")
                .and_then(Value::as_array)
                .map(|names| names.iter().filter_map(Value::as_str).collect())
                .unwrap_or_default();
            for field in fields.iter() {
                let child = child_path(path, field.name);
                match props.get(field.name) {
                    None => out.push(format!("{child}: missing from the generated schema")),
                    Some(prop) => {
                        if required.contains(&field.name) != field.required {
                            out.push(format!("{child}: required flag differs"));
                        }
                        compare_generated(&field.schema, prop, root, &child, out);
                    }
                }
            }
            for name in props.keys() {
                if !fields.iter().any(|f| f.name == name.as_str()) {
                    out.push(format!("{}: not declared", child_path(path, name)));
                }
            }
        }
        Schema::Array(item) => {
            compare_generated(item, &node["items"], root, &format!("{path}[]"), out);
        }
        Schema::Enum(allowed) => {
            let generated: Vec<&str> = match node.get("enum").and_then(Value::as_array) {
                Some(values) => values.iter().filter_map(Value::as_str).collect(),
                None => node
                    .get("oneOf")
                    .and_then(Value::as_array)
                    .map(|variants| variants.iter().filter_map(|v| v["const"].as_str()).collect())
                    .unwrap_or_default(),
            };
            if generated.as_slice() != *allowed {
                out.push(format!("{path}: enum values {generated:?} != {allowed:?}"));
            }
        }
        _ => {}
    }
}
