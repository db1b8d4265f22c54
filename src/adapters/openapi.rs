//! OpenAPI-style specification import.

use super::slugify;
use crate::classify::markdown_headings;
use crate::page::{Page, PageMetadata};
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;

const METHODS: &[&str] = &["get", "post", "put", "patch", "delete", "options", "head"];

// Reference chains in real specs are shallow; the budget keeps resolution
// total even on cyclic component graphs.
const MAX_REF_DEPTH: usize = 8;

/// Errors surfaced while importing a specification.
#[derive(Debug)]
pub enum SpecError {
    /// The payload is not valid JSON.
    Parse(serde_json::Error),
    /// The payload parses but is not a recognizable API specification.
    InvalidSpec,
}

impl fmt::Display for SpecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "specification is not valid JSON: {err}"),
            Self::InvalidSpec => write!(f, "payload is not a recognizable API specification"),
        }
    }
}

impl std::error::Error for SpecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            Self::InvalidSpec => None,
        }
    }
}

/// Imports an OpenAPI-style specification into pages.
///
/// Produces an overview page from `info`, one page per (path, method)
/// operation, and one page per named schema. Every page carries a
/// deterministic fragment identifier in its URL so re-imports stay
/// idempotent at the page level.
pub fn import_spec(raw: &str, base_url: &str) -> Result<Vec<Page>, SpecError> {
    let spec: Value = serde_json::from_str(raw).map_err(SpecError::Parse)?;
    let Some(root) = spec.as_object() else {
        return Err(SpecError::InvalidSpec);
    };
    if !root.contains_key("paths")
        && !root.contains_key("openapi")
        && !root.contains_key("swagger")
    {
        return Err(SpecError::InvalidSpec);
    }

    let mut pages = Vec::new();
    pages.extend(overview_page(&spec, base_url));
    pages.extend(operation_pages(&spec, base_url));
    pages.extend(schema_pages(&spec, base_url));
    Ok(pages)
}

fn overview_page(spec: &Value, base_url: &str) -> Option<Page> {
    let info = spec.get("info")?.as_object()?;
    let title = info
        .get("title")
        .and_then(Value::as_str)
        .unwrap_or("API Overview")
        .to_string();

    let mut lines = vec![format!("# {title}")];
    if let Some(version) = info.get("version").and_then(Value::as_str) {
        lines.push(format!("API version {version}."));
    }
    if let Some(description) = info.get("description").and_then(Value::as_str) {
        lines.push(description.trim().to_string());
    }

    Some(spec_page(base_url, "#overview", title, lines.join("\n\n")))
}

fn operation_pages(spec: &Value, base_url: &str) -> Vec<Page> {
    let Some(paths) = spec.get("paths").and_then(Value::as_object) else {
        return Vec::new();
    };

    let mut pages = Vec::new();
    for (path, item) in paths {
        let Some(item) = item.as_object() else {
            continue;
        };
        for method in METHODS {
            if let Some(op) = item.get(*method).and_then(Value::as_object) {
                pages.push(operation_page(spec, base_url, path, method, op));
            }
        }
    }
    pages
}

fn operation_page(
    spec: &Value,
    base_url: &str,
    path: &str,
    method: &str,
    op: &serde_json::Map<String, Value>,
) -> Page {
    let method_upper = method.to_uppercase();
    let title = format!("{method_upper} {path}");
    let mut lines = vec![format!("# {title}")];

    if let Some(summary) = op.get("summary").and_then(Value::as_str) {
        lines.push(summary.trim().to_string());
    }
    if let Some(description) = op.get("description").and_then(Value::as_str) {
        lines.push(description.trim().to_string());
    }

    if let Some(params) = op.get("parameters").and_then(Value::as_array) {
        if !params.is_empty() {
            lines.push("## Parameters".to_string());
            for param in params {
                let param = resolve_ref(spec, param, 0);
                if let Some(line) = parameter_line(spec, param) {
                    lines.push(line);
                }
            }
        }
    }

    if let Some(body) = op.get("requestBody") {
        let body = resolve_ref(spec, body, 0);
        lines.push("## Request Body".to_string());
        if let Some(description) = body.get("description").and_then(Value::as_str) {
            lines.push(description.trim().to_string());
        }
        if let Some(content) = body.get("content").and_then(Value::as_object) {
            for (media_type, media) in content {
                if let Some(schema) = media.get("schema") {
                    lines.push(format!(
                        "- `{media_type}`: {}",
                        schema_summary(spec, schema, 0)
                    ));
                }
            }
        }
    }

    if let Some(responses) = op.get("responses").and_then(Value::as_object) {
        if !responses.is_empty() {
            lines.push("## Responses".to_string());
            for (status, response) in responses {
                lines.push(format!("### {status}"));
                let response = resolve_ref(spec, response, 0);
                if let Some(description) = response.get("description").and_then(Value::as_str) {
                    lines.push(description.trim().to_string());
                }
                if let Some(content) = response.get("content").and_then(Value::as_object) {
                    for (media_type, media) in content {
                        if let Some(schema) = media.get("schema") {
                            lines.push(format!(
                                "- `{media_type}`: {}",
                                schema_summary(spec, schema, 0)
                            ));
                        }
                    }
                }
            }
        }
    }

    let fragment = format!("#operation-{method}-{}", slugify(path));
    spec_page(base_url, &fragment, title, lines.join("\n\n"))
}

fn parameter_line(spec: &Value, param: &Value) -> Option<String> {
    let obj = param.as_object()?;
    let name = obj.get("name").and_then(Value::as_str)?;
    let location = obj.get("in").and_then(Value::as_str).unwrap_or("query");
    let required = obj
        .get("required")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    let mut line = format!("- `{name}` ({location}");
    if let Some(schema) = obj.get("schema") {
        line.push_str(&format!(", {}", schema_summary(spec, schema, 0)));
    }
    line.push(')');
    if required {
        line.push_str(" required");
    }
    if let Some(description) = obj.get("description").and_then(Value::as_str) {
        line.push_str(": ");
        line.push_str(description.trim());
    }
    Some(line)
}

fn schema_pages(spec: &Value, base_url: &str) -> Vec<Page> {
    let schemas = spec
        .pointer("/components/schemas")
        .or_else(|| spec.pointer("/definitions"))
        .and_then(Value::as_object);
    let Some(schemas) = schemas else {
        return Vec::new();
    };

    schemas
        .iter()
        .map(|(name, schema)| schema_page(spec, base_url, name, schema))
        .collect()
}

fn schema_page(spec: &Value, base_url: &str, name: &str, schema: &Value) -> Page {
    let title = format!("Schema {name}");
    let mut lines = vec![format!("# {title}")];

    let resolved = resolve_ref(spec, schema, 0);
    if let Some(description) = resolved.get("description").and_then(Value::as_str) {
        lines.push(description.trim().to_string());
    }

    if let Some(obj) = resolved.as_object() {
        let required: HashSet<&str> = obj
            .get("required")
            .and_then(Value::as_array)
            .map(|names| names.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();

        if let Some(properties) = obj.get("properties").and_then(Value::as_object) {
            lines.push("## Properties".to_string());
            for (property, property_schema) in properties {
                let summary = schema_summary(spec, property_schema, 1);
                let marker = if required.contains(property.as_str()) {
                    ", required"
                } else {
                    ""
                };
                lines.push(format!("- `{property}` ({summary}{marker})"));
            }
        }
        if let Some(values) = obj.get("enum").and_then(Value::as_array) {
            let rendered: Vec<String> = values.iter().map(render_scalar).collect();
            lines.push(format!("Allowed values: {}.", rendered.join(", ")));
        }
    }

    let fragment = format!("#schema-{}", slugify(name));
    spec_page(base_url, &fragment, title, lines.join("\n\n"))
}

fn schema_summary(spec: &Value, schema: &Value, depth: usize) -> String {
    if depth >= MAX_REF_DEPTH {
        return "...".to_string();
    }
    let schema = resolve_ref(spec, schema, depth);
    let Some(obj) = schema.as_object() else {
        return "unknown".to_string();
    };

    if let Some(values) = obj.get("enum").and_then(Value::as_array) {
        let rendered: Vec<String> = values.iter().map(render_scalar).collect();
        return format!("enum of {}", rendered.join(", "));
    }

    match obj.get("type").and_then(Value::as_str) {
        Some("array") => {
            let items = obj
                .get("items")
                .map(|items| schema_summary(spec, items, depth + 1))
                .unwrap_or_else(|| "unknown".to_string());
            format!("array of {items}")
        }
        Some("object") | None => {
            let properties: Vec<&str> = obj
                .get("properties")
                .and_then(Value::as_object)
                .map(|properties| properties.keys().map(String::as_str).collect())
                .unwrap_or_default();
            if properties.is_empty() {
                "object".to_string()
            } else {
                format!("object with {}", properties.join(", "))
            }
        }
        Some(other) => other.to_string(),
    }
}

fn resolve_ref<'a>(spec: &'a Value, value: &'a Value, depth: usize) -> &'a Value {
    if depth >= MAX_REF_DEPTH {
        return value;
    }
    let Some(reference) = value.get("$ref").and_then(Value::as_str) else {
        return value;
    };
    let Some(pointer) = reference.strip_prefix('#') else {
        return value;
    };
    match spec.pointer(pointer) {
        Some(target) => resolve_ref(spec, target, depth + 1),
        None => value,
    }
}

fn render_scalar(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn spec_page(base_url: &str, fragment: &str, title: String, content: String) -> Page {
    let mut metadata = PageMetadata::new();
    metadata.headings = markdown_headings(&content);
    metadata
        .extra
        .insert("fragment".to_string(), Value::String(fragment.to_string()));
    Page::new(format!("{base_url}{fragment}"), title, content).with_metadata(metadata)
}
