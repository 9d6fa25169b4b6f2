//! Output formats for a list of [`DocumentationEntry`].
//!
//! Markdown and ReDoc are rendered straight to text. OpenAPI and Postman are built as
//! typed documents and handed to [`crate::serializer`].

pub mod markdown;
pub mod openapi;
pub mod postman;
pub mod redoc;

use crate::model::DocumentationEntry;
use crate::serializer::{serialize_json, serialize_yaml};
use anyhow::Result;
use std::fmt;
use std::path::Path;

pub const GENERATOR_NAME: &str = "apidocx";

/// One artifact format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocFormat {
    Markdown,
    OpenApi,
    Postman,
    Redoc,
}

impl DocFormat {
    pub const ALL: [DocFormat; 4] = [
        DocFormat::Markdown,
        DocFormat::OpenApi,
        DocFormat::Postman,
        DocFormat::Redoc,
    ];
}

impl fmt::Display for DocFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DocFormat::Markdown => "Markdown",
            DocFormat::OpenApi => "OpenAPI",
            DocFormat::Postman => "Postman",
            DocFormat::Redoc => "ReDoc",
        })
    }
}

/// Document-level metadata shared by every format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentInfo {
    pub title: String,
    pub base_url: String,
}

impl Default for DocumentInfo {
    fn default() -> Self {
        Self {
            title: "API Documentation".to_string(),
            base_url: "http://localhost".to_string(),
        }
    }
}

/// Renders `entries` in `format`. The target `path` only matters for OpenAPI, which is
/// written as YAML when it ends in `.yaml` or `.yml`.
pub fn render(
    format: DocFormat,
    entries: &[DocumentationEntry],
    info: &DocumentInfo,
    path: &Path,
) -> Result<String> {
    match format {
        DocFormat::Markdown => Ok(markdown::MarkdownFormatter::new(info).format(entries)),
        DocFormat::OpenApi => {
            let document = openapi::OpenApiFormatter::new(info).build(entries);
            if is_yaml(path) {
                serialize_yaml(&document)
            } else {
                serialize_json(&document)
            }
        }
        DocFormat::Postman => serialize_json(&postman::PostmanFormatter::new(info).build(entries)),
        DocFormat::Redoc => {
            let document = openapi::OpenApiFormatter::new(info).build(entries);
            Ok(redoc::ReDocFormatter::new(info).format(&serialize_json(&document)?))
        }
    }
}

fn is_yaml(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{HttpMethod, RouteRecord};

    fn entries() -> Vec<DocumentationEntry> {
        let record = RouteRecord {
            uri: "api/users".to_string(),
            http_methods: vec![HttpMethod::Get],
            controller: Some("UserController".to_string()),
            method: Some("index".to_string()),
            name: String::new(),
            middleware: Vec::new(),
        };
        vec![DocumentationEntry::new(&record, Some("Lists users.".to_string()))]
    }

    #[test]
    fn test_openapi_follows_target_extension() {
        let info = DocumentInfo::default();

        let json =
            render(DocFormat::OpenApi, &entries(), &info, Path::new("docs/api.json")).unwrap();
        assert!(json.trim_start().starts_with('{'));

        let yaml =
            render(DocFormat::OpenApi, &entries(), &info, Path::new("docs/api.YML")).unwrap();
        assert!(yaml.contains("openapi: 3.0.0"));
        assert!(yaml.contains("/users:"));
    }

    #[test]
    fn test_every_format_renders() {
        let info = DocumentInfo::default();
        for format in DocFormat::ALL {
            let output = render(format, &entries(), &info, Path::new("out")).unwrap();
            assert!(!output.is_empty(), "{} produced nothing", format);
        }
    }
}
