//! Document loading from files, strings, and HTTP URLs.
//!
//! JSON and YAML are both read into an order-preserving
//! [`serde_json::Value`], so every later stage sees one tree shape.

use std::path::Path;

use serde_json::{Map, Number, Value};
use tracing::{debug, warn};

use crate::error::LoadError;
use crate::path::JsonPath;
use crate::walker::walk_document;

#[cfg(feature = "remote")]
use std::time::Duration;

/// Default timeout for HTTP requests (10 seconds).
#[cfg(feature = "remote")]
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// File extensions recognized as API documents.
pub const DOCUMENT_EXTENSIONS: &[&str] = &["json", "yaml", "yml"];

/// Load a document from a file path.
///
/// The format is chosen by extension: `.json`, `.yaml` or `.yml`.
///
/// # Errors
///
/// Returns `LoadError::FileNotFound` if the file doesn't exist,
/// `LoadError::UnsupportedFormat` for other extensions, or a parse error.
pub fn load_document(path: &Path) -> Result<Value, LoadError> {
    if !path.exists() {
        return Err(LoadError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    let is_yaml = match extension.as_deref() {
        Some("json") => false,
        Some("yaml") | Some("yml") => true,
        _ => {
            return Err(LoadError::UnsupportedFormat {
                path: path.to_path_buf(),
            })
        }
    };

    let content = std::fs::read_to_string(path).map_err(|source| LoadError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), yaml = is_yaml, "loading document");

    if is_yaml {
        parse_yaml(&content)
    } else {
        serde_json::from_str(&content).map_err(|source| LoadError::InvalidJson { source })
    }
}

/// Load a document from a JSON or YAML string.
///
/// JSON is tried first. Content that looks like JSON (starts with `{` or
/// `[`) reports the JSON error; anything else falls back to YAML.
pub fn load_document_str(content: &str) -> Result<Value, LoadError> {
    match serde_json::from_str(content) {
        Ok(value) => Ok(value),
        Err(source) => {
            let trimmed = content.trim_start();
            if trimmed.starts_with('{') || trimmed.starts_with('[') {
                Err(LoadError::InvalidJson { source })
            } else {
                parse_yaml(content)
            }
        }
    }
}

/// Load a document from an HTTP/HTTPS URL.
///
/// Requires the `remote` feature (enabled by default).
#[cfg(feature = "remote")]
pub fn load_document_url(url: &str) -> Result<Value, LoadError> {
    let network_error = |source| LoadError::NetworkError {
        url: url.to_string(),
        source,
    };

    let client = reqwest::blocking::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .map_err(network_error)?;

    let body = client
        .get(url)
        .send()
        .and_then(|response| response.error_for_status())
        .and_then(|response| response.text())
        .map_err(network_error)?;

    debug!(url, bytes = body.len(), "fetched document");
    load_document_str(&body)
}

/// Check if a string looks like a URL (starts with http:// or https://).
pub fn is_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}

/// Load a document from a file path or URL.
///
/// URL loading requires the `remote` feature.
pub fn load_document_auto(source: &str) -> Result<Value, LoadError> {
    if is_url(source) {
        #[cfg(feature = "remote")]
        {
            load_document_url(source)
        }
        #[cfg(not(feature = "remote"))]
        {
            Err(LoadError::FileNotFound {
                path: std::path::PathBuf::from(source),
            })
        }
    } else {
        load_document(Path::new(source))
    }
}

/// Navigate a local JSON Pointer (e.g. `#/components/schemas/Pet`).
///
/// Returns `None` if any segment is missing. `~1` and `~0` are unescaped.
pub fn navigate_pointer<'a>(document: &'a Value, pointer: &str) -> Option<&'a Value> {
    let path = pointer.trim_start_matches('#');
    if path.is_empty() {
        return Some(document);
    }
    let path = path.strip_prefix('/')?;

    let mut current = document;
    for part in path.split('/') {
        let key = part.replace("~1", "/").replace("~0", "~");
        current = match current {
            Value::Object(map) => map.get(&key)?,
            Value::Array(items) => items.get(key.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Produce the resolved form of `document`.
///
/// Every same-document `$ref` (`#/...`) is replaced by its target. Keys
/// written next to the `$ref` override the target's. A reference that is
/// already being expanded further up is left in place, which breaks
/// cycles. External references, the self-root `#` and local references
/// with no target are left untouched; see [`unresolved_local_refs`] to find
/// the latter.
pub fn resolve_local_refs(document: &Value) -> Value {
    let mut resolved = document.clone();
    let mut active = Vec::new();
    inline_refs(&mut resolved, document, &mut active);
    resolved
}

/// Every same-document `$ref` in `document` whose target does not exist,
/// with the path of the `$ref` key, in document order.
pub fn unresolved_local_refs(document: &Value) -> Vec<(JsonPath, String)> {
    let mut unresolved = Vec::new();
    walk_document(document, &mut |node, path| {
        if let Some(reference) = local_ref(node) {
            if navigate_pointer(document, &reference).is_none() {
                unresolved.push((path.concat("$ref"), reference));
            }
        }
    });
    unresolved
}

fn inline_refs(value: &mut Value, root: &Value, active: &mut Vec<String>) {
    if let Some(reference) = local_ref(value) {
        if active.iter().any(|r| r == &reference) {
            debug!(reference = %reference, "leaving circular reference in place");
            return;
        }

        let Some(mut target) = navigate_pointer(root, &reference).cloned() else {
            warn!(reference = %reference, "local reference has no target");
            return;
        };

        active.push(reference);
        inline_refs(&mut target, root, active);

        let mut siblings = Map::new();
        if let Value::Object(map) = value {
            for (key, sibling) in map.iter() {
                if key != "$ref" {
                    let mut sibling = sibling.clone();
                    inline_refs(&mut sibling, root, active);
                    siblings.insert(key.clone(), sibling);
                }
            }
        }
        active.pop();

        *value = merge_siblings(target, siblings);
        return;
    }

    match value {
        Value::Object(map) => {
            if let Some(external) = map.get("$ref").and_then(Value::as_str) {
                if external != "#" {
                    warn!(reference = external, "external reference left unresolved");
                }
                return;
            }
            for child in map.values_mut() {
                inline_refs(child, root, active);
            }
        }
        Value::Array(items) => {
            for item in items {
                inline_refs(item, root, active);
            }
        }
        _ => {}
    }
}

/// The `$ref` of `value` if it points inside the same document.
fn local_ref(value: &Value) -> Option<String> {
    value
        .get("$ref")?
        .as_str()
        .filter(|r| r.starts_with("#/"))
        .map(str::to_string)
}

fn merge_siblings(target: Value, siblings: Map<String, Value>) -> Value {
    match target {
        Value::Object(mut merged) => {
            for (key, sibling) in siblings {
                merged.insert(key, sibling);
            }
            Value::Object(merged)
        }
        other => other,
    }
}

fn parse_yaml(content: &str) -> Result<Value, LoadError> {
    let yaml: serde_yaml::Value =
        serde_yaml::from_str(content).map_err(|source| LoadError::InvalidYaml { source })?;
    yaml_to_json(yaml, "")
}

/// Convert a YAML tree to JSON, stringifying scalar mapping keys.
///
/// YAML allows unquoted numeric keys (`200:` under `responses`), which JSON
/// object keys cannot express directly.
fn yaml_to_json(yaml: serde_yaml::Value, path: &str) -> Result<Value, LoadError> {
    use serde_yaml::Value as Yaml;

    Ok(match yaml {
        Yaml::Null => Value::Null,
        Yaml::Bool(b) => Value::Bool(b),
        Yaml::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Number(i.into())
            } else if let Some(u) = n.as_u64() {
                Value::Number(u.into())
            } else {
                let f = n.as_f64().unwrap_or(f64::NAN);
                Value::Number(Number::from_f64(f).ok_or_else(|| LoadError::UnsupportedYaml {
                    path: path.to_string(),
                    message: format!("non-finite number {}", n),
                })?)
            }
        }
        Yaml::String(s) => Value::String(s),
        Yaml::Sequence(items) => Value::Array(
            items
                .into_iter()
                .enumerate()
                .map(|(i, item)| yaml_to_json(item, &format!("{}/{}", path, i)))
                .collect::<Result<_, _>>()?,
        ),
        Yaml::Mapping(mapping) => {
            let mut map = Map::new();
            for (key, item) in mapping {
                let key = yaml_key(key, path)?;
                let child_path = format!("{}/{}", path, key);
                map.insert(key, yaml_to_json(item, &child_path)?);
            }
            Value::Object(map)
        }
        Yaml::Tagged(tagged) => yaml_to_json(tagged.value, path)?,
    })
}

fn yaml_key(key: serde_yaml::Value, path: &str) -> Result<String, LoadError> {
    use serde_yaml::Value as Yaml;

    match key {
        Yaml::String(s) => Ok(s),
        Yaml::Number(n) => Ok(n.to_string()),
        Yaml::Bool(b) => Ok(b.to_string()),
        Yaml::Null => Ok("null".to_string()),
        Yaml::Tagged(tagged) => yaml_key(tagged.value, path),
        Yaml::Sequence(_) | Yaml::Mapping(_) => Err(LoadError::UnsupportedYaml {
            path: if path.is_empty() { "/".to_string() } else { path.to_string() },
            message: "mapping keys must be scalars".to_string(),
        }),
    }
}
