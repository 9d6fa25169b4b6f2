//! Shared data model: HTTP methods, registered routes, route records and
//! documentation entries.
//!
//! Routes flow through three shapes:
//!
//! 1. [`RegisteredRoute`] - what a [`crate::registry::RouteRegistry`] yields, close to the
//!    framework's own view of a route (declared methods, raw action string).
//! 2. [`RouteRecord`] - the normalized record produced by the [`crate::collector`].
//! 3. [`DocumentationEntry`] - a record plus its resolved description and, in
//!    advanced mode, the structured [`DocBundle`].

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fallback description used when neither a doc comment nor the AI provider
/// produced anything.
pub const NO_DESCRIPTION: &str = "No description available.";

/// HTTP methods known to the route registries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// HTTP GET method
    Get,
    /// HTTP POST method
    Post,
    /// HTTP PUT method
    Put,
    /// HTTP DELETE method
    Delete,
    /// HTTP PATCH method
    Patch,
    /// HTTP OPTIONS method
    Options,
    /// HTTP HEAD method
    Head,
}

impl HttpMethod {
    /// Every method, in the order used when a handler accepts any method.
    pub const ALL: [HttpMethod; 7] = [
        HttpMethod::Get,
        HttpMethod::Head,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Patch,
        HttpMethod::Delete,
        HttpMethod::Options,
    ];

    /// Parse a method token case-insensitively (`"get"`, `"GET"`, ...).
    pub fn parse(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "get" => Some(HttpMethod::Get),
            "post" => Some(HttpMethod::Post),
            "put" => Some(HttpMethod::Put),
            "delete" => Some(HttpMethod::Delete),
            "patch" => Some(HttpMethod::Patch),
            "head" => Some(HttpMethod::Head),
            "options" => Some(HttpMethod::Options),
            _ => None,
        }
    }

    /// Upper-case wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Head => "HEAD",
        }
    }

    /// Whether requests with this method conventionally carry a body.
    pub fn has_body(&self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Render a method set the way cache keys and headings spell it: `GET|POST`.
pub fn join_methods(methods: &[HttpMethod]) -> String {
    methods
        .iter()
        .map(HttpMethod::as_str)
        .collect::<Vec<_>>()
        .join("|")
}

/// A route as the host application registers it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredRoute {
    /// Framework-relative path without a leading slash (`api/users/{id}`)
    pub uri: String,
    /// Declared methods, HEAD included when the framework implies it
    pub methods: Vec<HttpMethod>,
    /// Route name, when the framework supports naming routes
    pub name: Option<String>,
    /// `Owner@method`, a bare handler type name, or `Closure`
    pub action: String,
    /// Middleware identifiers attached to the route
    pub middleware: Vec<String>,
}

/// Normalized route produced by the collector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRecord {
    pub uri: String,
    /// Ordered method set, HEAD excluded
    pub http_methods: Vec<HttpMethod>,
    /// Handler owner (type or module); `None` for closures
    pub controller: Option<String>,
    /// Handler entry point; `None` for closures
    pub method: Option<String>,
    /// Route name, empty when the route is unnamed
    pub name: String,
    pub middleware: Vec<String>,
}

impl RouteRecord {
    /// `GET|POST` form of [`RouteRecord::http_methods`].
    pub fn methods_label(&self) -> String {
        join_methods(&self.http_methods)
    }

    /// First declared method, used where a single method is required.
    pub fn primary_method(&self) -> Option<HttpMethod> {
        self.http_methods.first().copied()
    }
}

/// One documented endpoint, ready for the formatters.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentationEntry {
    pub uri: String,
    pub http_methods: Vec<HttpMethod>,
    pub controller: Option<String>,
    pub method: Option<String>,
    pub name: String,
    /// Never blank; [`NO_DESCRIPTION`] when nothing better is known
    pub description: String,
    /// Structured AI documentation, present in advanced mode
    pub advanced: Option<DocBundle>,
}

impl DocumentationEntry {
    /// Build an entry from a record, substituting the sentinel for a missing
    /// or blank description.
    pub fn new(record: &RouteRecord, description: Option<String>) -> Self {
        let description = description
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| NO_DESCRIPTION.to_string());

        Self {
            uri: record.uri.clone(),
            http_methods: record.http_methods.clone(),
            controller: record.controller.clone(),
            method: record.method.clone(),
            name: record.name.clone(),
            description,
            advanced: None,
        }
    }

    /// `GET|POST` form of the method set.
    pub fn methods_label(&self) -> String {
        join_methods(&self.http_methods)
    }

    /// `Controller@method`, with `Closure@invoke` standing in for anonymous handlers.
    pub fn handler_label(&self) -> String {
        format!(
            "{}@{}",
            self.controller.as_deref().unwrap_or("Closure"),
            self.method.as_deref().unwrap_or("invoke")
        )
    }
}

/// Structured documentation produced by the advanced AI generator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocBundle {
    pub description: String,
    pub summary: String,
    pub parameters: Vec<ParameterDoc>,
    /// JSON body example; `Value::Null` when there is none
    pub request_example: serde_json::Value,
    /// JSON response example; `Value::Null` when there is none
    pub response_example: serde_json::Value,
    pub error_responses: Vec<ErrorResponse>,
    pub tags: Vec<String>,
}

/// A documented request parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterDoc {
    pub name: String,
    /// `path`, `query`, `header` or `body`
    #[serde(rename = "in")]
    pub location: String,
    #[serde(deserialize_with = "bool_or_text")]
    pub required: bool,
    #[serde(rename = "type")]
    pub param_type: String,
    pub description: String,
    pub example: serde_json::Value,
}

impl Default for ParameterDoc {
    fn default() -> Self {
        Self {
            name: String::new(),
            location: "query".to_string(),
            required: false,
            param_type: "string".to_string(),
            description: String::new(),
            example: serde_json::Value::Null,
        }
    }
}

/// A documented error response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(deserialize_with = "number_or_text")]
    pub status_code: u16,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub description: String,
}

impl ErrorResponse {
    pub fn new(status_code: u16, message: &str, description: &str) -> Self {
        Self {
            status_code,
            message: message.to_string(),
            description: description.to_string(),
        }
    }
}

/// Provider output spells scalars either natively or as strings (`400` or `"400"`).
#[derive(Deserialize)]
#[serde(untagged)]
enum Lenient<T> {
    Native(T),
    Text(String),
}

fn number_or_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u16, D::Error> {
    match Lenient::<u16>::deserialize(deserializer)? {
        Lenient::Native(value) => Ok(value),
        Lenient::Text(text) => text.trim().parse().map_err(de::Error::custom),
    }
}

fn bool_or_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    match Lenient::<bool>::deserialize(deserializer)? {
        Lenient::Native(value) => Ok(value),
        Lenient::Text(text) => text.trim().to_ascii_lowercase().parse().map_err(de::Error::custom),
    }
}

/// Names of the `{param}` placeholders in a uri, in order of appearance.
pub fn path_parameters(uri: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut rest = uri;

    while let Some(open) = rest.find('{') {
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) => {
                let name = &after[..close];
                if !name.is_empty() {
                    names.push(name.to_string());
                }
                rest = &after[close + 1..];
            }
            None => break,
        }
    }

    names
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(uri: &str, methods: &[HttpMethod]) -> RouteRecord {
        RouteRecord {
            uri: uri.to_string(),
            http_methods: methods.to_vec(),
            controller: None,
            method: None,
            name: String::new(),
            middleware: Vec::new(),
        }
    }

    #[test]
    fn test_parse_http_method_is_case_insensitive() {
        assert_eq!(HttpMethod::parse("get"), Some(HttpMethod::Get));
        assert_eq!(HttpMethod::parse("PATCH"), Some(HttpMethod::Patch));
        assert_eq!(HttpMethod::parse(" Delete "), Some(HttpMethod::Delete));
        assert_eq!(HttpMethod::parse("CONNECT"), None);
    }

    #[test]
    fn test_join_methods() {
        assert_eq!(join_methods(&[HttpMethod::Get, HttpMethod::Post]), "GET|POST");
        assert_eq!(join_methods(&[]), "");
    }

    #[test]
    fn test_path_parameters_in_order() {
        assert_eq!(
            path_parameters("api/users/{id}/posts/{postId}"),
            vec!["id".to_string(), "postId".to_string()]
        );
        assert!(path_parameters("api/users").is_empty());
        assert!(path_parameters("api/broken/{id").is_empty());
    }

    #[test]
    fn test_entry_uses_sentinel_for_blank_description() {
        let route = record("api/users", &[HttpMethod::Get]);

        assert_eq!(DocumentationEntry::new(&route, None).description, NO_DESCRIPTION);
        assert_eq!(
            DocumentationEntry::new(&route, Some("   \n".to_string())).description,
            NO_DESCRIPTION
        );
        assert_eq!(
            DocumentationEntry::new(&route, Some("Lists users.".to_string())).description,
            "Lists users."
        );
    }

    #[test]
    fn test_handler_label_for_closure() {
        let entry = DocumentationEntry::new(&record("api/ping", &[HttpMethod::Get]), None);
        assert_eq!(entry.handler_label(), "Closure@invoke");
    }

    #[test]
    fn test_bundle_decodes_partial_json() {
        let bundle: DocBundle =
            serde_json::from_str(r#"{"summary":"Lists users","tags":["Users"]}"#).unwrap();

        assert_eq!(bundle.summary, "Lists users");
        assert_eq!(bundle.tags, vec!["Users".to_string()]);
        assert!(bundle.parameters.is_empty());
        assert!(bundle.request_example.is_null());
    }
}
