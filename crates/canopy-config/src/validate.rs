//! Schema validation with default injection.
//!
//! Implements the subset of JSON Schema that configuration schemas use:
//! `type`, `properties`, `required`, `additionalProperties`, `items`,
//! `enum`, `minimum`, `maximum`, `exclusiveMinimum`, `exclusiveMaximum`,
//! `minItems`, and `default`. Defaults declared under `properties` are
//! written into the instance before `required` is checked, so a section
//! whose schema defaults to `{}` is created and then filled in. Any other
//! keyword, apart from the annotations in [`ANNOTATIONS`], makes a schema
//! document fail [`check_schema`] rather than being silently ignored.
//!
//! Messages follow the wording users of JSON Schema tooling already know,
//! e.g. `-1 is less than or equal to the minimum of 0`, and are prefixed
//! with the key path of the offending value as `[core][grid][cell_nx]: `.

use core::fmt::Write as _;

use serde_json::{Map, Value};

/// Names accepted by the `type` keyword.
const TYPE_NAMES: [&str; 7] = [
    "object", "array", "string", "number", "integer", "boolean", "null",
];

/// Keywords that carry no validation rule and are accepted anywhere.
pub const ANNOTATIONS: [&str; 7] = [
    "default",
    "description",
    "title",
    "examples",
    "$comment",
    "$schema",
    "$id",
];

/// Validate `instance` against `schema`, injecting declared defaults.
///
/// Returns every violation found, in schema order. An empty list means the
/// instance is valid; defaults have been written in either case.
pub fn validate_with_defaults(instance: &mut Value, schema: &Value) -> Vec<String> {
    let mut errors = Vec::new();
    let mut path = Vec::new();
    walk(instance, schema, &mut path, &mut errors);
    errors
}

/// One step of an instance path.
enum Step {
    Key(String),
    Index(usize),
}

fn report(path: &[Step], message: String, errors: &mut Vec<String>) {
    if path.is_empty() {
        errors.push(message);
        return;
    }
    let mut prefix = String::new();
    for step in path {
        let _ = match step {
            Step::Key(k) => write!(prefix, "[{k}]"),
            Step::Index(i) => write!(prefix, "[{i}]"),
        };
    }
    errors.push(format!("{prefix}: {message}"));
}

fn walk(instance: &mut Value, schema: &Value, path: &mut Vec<Step>, errors: &mut Vec<String>) {
    let rules = match schema {
        Value::Bool(true) => return,
        Value::Bool(false) => {
            report(
                path,
                format!("False schema does not allow {}", repr(instance)),
                errors,
            );
            return;
        }
        Value::Object(rules) => rules,
        _ => return,
    };

    if let Some(expected) = rules.get("type")
        && !matches_type(instance, expected)
    {
        report(
            path,
            format!("{} is not of type {}", repr(instance), type_list(expected)),
            errors,
        );
    }

    if let Some(Value::Array(options)) = rules.get("enum")
        && !options.contains(instance)
    {
        report(
            path,
            format!("{} is not one of {}", repr(instance), repr_array(options)),
            errors,
        );
    }

    check_bounds(instance, rules, path, errors);

    if let Value::Array(items) = instance {
        if let Some(min) = rules.get("minItems").and_then(Value::as_u64)
            && (items.len() as u64) < min
        {
            report(path, format!("{} is too short", repr_array(items)), errors);
        }
        if let Some(item_schema) = rules.get("items") {
            for (i, item) in items.iter_mut().enumerate() {
                path.push(Step::Index(i));
                walk(item, item_schema, path, errors);
                path.pop();
            }
        }
    }

    if let Value::Object(fields) = instance {
        check_object(fields, rules, path, errors);
    }
}

fn check_object(
    fields: &mut Map<String, Value>,
    rules: &Map<String, Value>,
    path: &mut Vec<Step>,
    errors: &mut Vec<String>,
) {
    let properties = rules.get("properties").and_then(Value::as_object);

    if let Some(properties) = properties {
        for (key, sub) in properties {
            if !fields.contains_key(key)
                && let Some(default) = sub.get("default")
            {
                fields.insert(key.clone(), default.clone());
            }
        }
        for (key, sub) in properties {
            if let Some(child) = fields.get_mut(key) {
                path.push(Step::Key(key.clone()));
                walk(child, sub, path, errors);
                path.pop();
            }
        }
    }

    if let Some(Value::Array(required)) = rules.get("required") {
        for name in required.iter().filter_map(Value::as_str) {
            if !fields.contains_key(name) {
                report(path, format!("'{name}' is a required property"), errors);
            }
        }
    }

    let extra: Vec<String> = fields
        .keys()
        .filter(|k| properties.is_none_or(|p| !p.contains_key(*k)))
        .cloned()
        .collect();
    match rules.get("additionalProperties") {
        Some(Value::Bool(false)) if !extra.is_empty() => {
            let quoted: Vec<String> = extra.iter().map(|k| repr_str(k)).collect();
            let verb = if extra.len() == 1 { "was" } else { "were" };
            report(
                path,
                format!(
                    "Additional properties are not allowed ({} {verb} unexpected)",
                    quoted.join(", ")
                ),
                errors,
            );
        }
        Some(sub @ Value::Object(_)) => {
            for key in extra {
                if let Some(child) = fields.get_mut(&key) {
                    path.push(Step::Key(key));
                    walk(child, sub, path, errors);
                    path.pop();
                }
            }
        }
        _ => {}
    }
}

fn check_bounds(
    instance: &Value,
    rules: &Map<String, Value>,
    path: &[Step],
    errors: &mut Vec<String>,
) {
    let Value::Number(number) = instance else { return };
    let Some(x) = number.as_f64() else { return };

    let bound = |key: &str| match rules.get(key) {
        Some(Value::Number(n)) => n.as_f64().map(|v| (v, n.to_string())),
        _ => None,
    };

    if let Some((min, shown)) = bound("minimum")
        && x < min
    {
        report(path, format!("{number} is less than the minimum of {shown}"), errors);
    }
    if let Some((max, shown)) = bound("maximum")
        && x > max
    {
        report(path, format!("{number} is greater than the maximum of {shown}"), errors);
    }
    if let Some((min, shown)) = bound("exclusiveMinimum")
        && x <= min
    {
        report(
            path,
            format!("{number} is less than or equal to the minimum of {shown}"),
            errors,
        );
    }
    if let Some((max, shown)) = bound("exclusiveMaximum")
        && x >= max
    {
        report(
            path,
            format!("{number} is greater than or equal to the maximum of {shown}"),
            errors,
        );
    }
}

fn matches_type(instance: &Value, expected: &Value) -> bool {
    match expected {
        Value::String(name) => is_type(instance, name),
        Value::Array(names) => names
            .iter()
            .filter_map(Value::as_str)
            .any(|name| is_type(instance, name)),
        _ => true,
    }
}

/// Integers are strict: `1.0` is a number but not an integer.
fn is_type(instance: &Value, name: &str) -> bool {
    match name {
        "object" => instance.is_object(),
        "array" => instance.is_array(),
        "string" => instance.is_string(),
        "number" => instance.is_number(),
        "integer" => instance.is_i64() || instance.is_u64(),
        "boolean" => instance.is_boolean(),
        "null" => instance.is_null(),
        _ => false,
    }
}

fn type_list(expected: &Value) -> String {
    match expected {
        Value::Array(names) => names.iter().map(repr).collect::<Vec<_>>().join(", "),
        other => repr(other),
    }
}

// ---------------------------------------------------------------------------
// Value rendering in messages
// ---------------------------------------------------------------------------

fn repr(value: &Value) -> String {
    match value {
        Value::Null => "None".to_owned(),
        Value::Bool(true) => "True".to_owned(),
        Value::Bool(false) => "False".to_owned(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => repr_str(s),
        Value::Array(items) => repr_array(items),
        Value::Object(fields) => {
            let parts: Vec<String> = fields
                .iter()
                .map(|(k, v)| format!("{}: {}", repr_str(k), repr(v)))
                .collect();
            format!("{{{}}}", parts.join(", "))
        }
    }
}

fn repr_array(items: &[Value]) -> String {
    format!("[{}]", items.iter().map(repr).collect::<Vec<_>>().join(", "))
}

fn repr_str(s: &str) -> String {
    if s.contains('\'') && !s.contains('"') {
        format!("\"{s}\"")
    } else {
        format!("'{}'", s.replace('\'', "\\'"))
    }
}

// ---------------------------------------------------------------------------
// Schema document checks
// ---------------------------------------------------------------------------

/// Check that `schema` is a well-formed schema document for the supported
/// keyword subset.
///
/// # Errors
///
/// Returns a description of the first malformed or unsupported keyword,
/// with its location.
pub fn check_schema(schema: &Value) -> Result<(), String> {
    let mut path = Vec::new();
    check_node(schema, &mut path)
}

fn check_node(schema: &Value, path: &mut Vec<Step>) -> Result<(), String> {
    let rules = match schema {
        Value::Bool(_) => return Ok(()),
        Value::Object(rules) => rules,
        other => {
            return Err(located(
                path,
                format!("{} is not of type 'object', 'boolean'", repr(other)),
            ));
        }
    };

    for (keyword, value) in rules {
        if ANNOTATIONS.contains(&keyword.as_str()) {
            continue;
        }
        path.push(Step::Key(keyword.clone()));
        match keyword.as_str() {
            "type" => check_type_keyword(value, path)?,
            "properties" => {
                let Value::Object(props) = value else {
                    return Err(located(path, format!("{} is not of type 'object'", repr(value))));
                };
                for (name, sub) in props {
                    path.push(Step::Key(name.clone()));
                    check_node(sub, path)?;
                    path.pop();
                }
            }
            "required" => {
                let all_strings = value
                    .as_array()
                    .is_some_and(|names| names.iter().all(Value::is_string));
                if !all_strings {
                    return Err(located(path, format!("{} is not an array of strings", repr(value))));
                }
            }
            "additionalProperties" | "items" => check_node(value, path)?,
            "enum" => {
                if !value.is_array() {
                    return Err(located(path, format!("{} is not of type 'array'", repr(value))));
                }
            }
            "minimum" | "maximum" | "exclusiveMinimum" | "exclusiveMaximum" => {
                if !value.is_number() {
                    return Err(located(path, format!("{} is not of type 'number'", repr(value))));
                }
            }
            "minItems" => {
                if !value.is_u64() {
                    return Err(located(
                        path,
                        format!("{} is not a non-negative integer", repr(value)),
                    ));
                }
            }
            unsupported => {
                path.pop();
                return Err(located(
                    path,
                    format!("Unsupported schema keyword {}", repr_str(unsupported)),
                ));
            }
        }
        path.pop();
    }
    Ok(())
}

fn check_type_keyword(value: &Value, path: &[Step]) -> Result<(), String> {
    let names: Vec<&Value> = match value {
        Value::Array(names) => names.iter().collect(),
        other => vec![other],
    };
    for name in names {
        let known = name.as_str().is_some_and(|n| TYPE_NAMES.contains(&n));
        if !known {
            return Err(located(
                path,
                format!("{} is not valid under any of the given schemas", repr(name)),
            ));
        }
    }
    Ok(())
}

fn located(path: &[Step], message: String) -> String {
    let mut errors = Vec::new();
    report(path, message, &mut errors);
    errors.pop().unwrap_or_default()
}
