use crate::formatter::{DocumentInfo, GENERATOR_NAME};
use crate::model::{path_parameters, DocumentationEntry, HttpMethod};
use crate::naming::{api_path, segment_title, segments};
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

const SUMMARY_LIMIT: usize = 100;
const JSON_MEDIA_TYPE: &str = "application/json";

/// OpenAPI 3.0 document builder
pub struct OpenApiFormatter<'a> {
    info: &'a DocumentInfo,
}

/// OpenAPI Info object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Info {
    pub title: String,
    pub description: String,
    pub version: String,
}

/// OpenAPI Server object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Server {
    pub url: String,
    pub description: String,
}

/// OpenAPI PathItem object - all operations for a single path
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub put: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head: Option<Operation>,
}

impl PathItem {
    fn slot(&mut self, method: HttpMethod) -> &mut Option<Operation> {
        match method {
            HttpMethod::Get => &mut self.get,
            HttpMethod::Post => &mut self.post,
            HttpMethod::Put => &mut self.put,
            HttpMethod::Delete => &mut self.delete,
            HttpMethod::Patch => &mut self.patch,
            HttpMethod::Options => &mut self.options,
            HttpMethod::Head => &mut self.head,
        }
    }

    /// Operation registered for `method`, if any.
    pub fn operation(&self, method: HttpMethod) -> Option<&Operation> {
        match method {
            HttpMethod::Get => self.get.as_ref(),
            HttpMethod::Post => self.post.as_ref(),
            HttpMethod::Put => self.put.as_ref(),
            HttpMethod::Delete => self.delete.as_ref(),
            HttpMethod::Patch => self.patch.as_ref(),
            HttpMethod::Options => self.options.as_ref(),
            HttpMethod::Head => self.head.as_ref(),
        }
    }
}

/// OpenAPI Operation object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    pub summary: String,
    pub description: String,
    pub tags: Vec<String>,
    #[serde(rename = "operationId", skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub parameters: Vec<Parameter>,
    #[serde(rename = "requestBody", skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBody>,
    pub responses: BTreeMap<String, Response>,
}

/// OpenAPI Parameter object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "in")]
    pub location: String,
    pub required: bool,
    pub schema: Schema,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
}

/// Generic schema; only the JSON type is ever known
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    #[serde(rename = "type")]
    pub schema_type: String,
}

impl Schema {
    fn of(schema_type: &str) -> Self {
        Self {
            schema_type: schema_type.to_string(),
        }
    }
}

/// OpenAPI RequestBody object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestBody {
    pub required: bool,
    pub content: BTreeMap<String, MediaType>,
}

/// OpenAPI MediaType object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaType {
    pub schema: Schema,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
}

/// OpenAPI Response object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<BTreeMap<String, MediaType>>,
}

/// Complete OpenAPI document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenApiDocument {
    pub openapi: String,
    pub info: Info,
    pub servers: Vec<Server>,
    pub paths: BTreeMap<String, PathItem>,
}

impl<'a> OpenApiFormatter<'a> {
    pub fn new(info: &'a DocumentInfo) -> Self {
        Self { info }
    }

    pub fn build(&self, entries: &[DocumentationEntry]) -> OpenApiDocument {
        let mut paths: BTreeMap<String, PathItem> = BTreeMap::new();

        for entry in entries {
            let path = api_path(&entry.uri);
            debug!("Adding {} {}", entry.methods_label(), path);

            let item = paths.entry(path).or_default();
            for method in &entry.http_methods {
                *item.slot(*method) = Some(build_operation(entry, *method));
            }
        }

        OpenApiDocument {
            openapi: "3.0.0".to_string(),
            info: Info {
                title: self.info.title.clone(),
                description: format!("Generated automatically by {}", GENERATOR_NAME),
                version: "1.0.0".to_string(),
            },
            servers: vec![Server {
                url: self.info.base_url.clone(),
                description: "API Server".to_string(),
            }],
            paths,
        }
    }
}

fn build_operation(entry: &DocumentationEntry, method: HttpMethod) -> Operation {
    let bundle = entry.advanced.as_ref();

    let mut parameters: Vec<Parameter> = path_parameters(&entry.uri)
        .into_iter()
        .map(|name| Parameter {
            name,
            location: "path".to_string(),
            required: true,
            schema: Schema::of("string"),
            description: None,
            example: None,
        })
        .collect();

    if let Some(bundle) = bundle {
        for param in &bundle.parameters {
            if let Some(existing) = parameters
                .iter_mut()
                .find(|p| p.name == param.name && param.location == "path")
            {
                existing.description = non_empty(&param.description);
                existing.example = non_null(&param.example);
                continue;
            }
            parameters.push(Parameter {
                name: param.name.clone(),
                location: param.location.clone(),
                required: param.required,
                schema: Schema::of(&param.param_type),
                description: non_empty(&param.description),
                example: non_null(&param.example),
            });
        }
    }

    let request_body = method.has_body().then(|| RequestBody {
        required: true,
        content: json_content(bundle.and_then(|b| non_null(&b.request_example))),
    });

    let mut responses = BTreeMap::new();
    responses.insert(
        "200".to_string(),
        Response {
            description: "Successful response".to_string(),
            content: Some(json_content(
                bundle.and_then(|b| non_null(&b.response_example)),
            )),
        },
    );
    for error in bundle.map(|b| b.error_responses.as_slice()).unwrap_or_default() {
        let description = if error.description.is_empty() {
            error.message.clone()
        } else {
            format!("{}: {}", error.message, error.description)
        };
        responses.insert(
            error.status_code.to_string(),
            Response {
                description,
                content: None,
            },
        );
    }

    let summary = bundle
        .map(|b| b.summary.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| summarize(&entry.description));

    Operation {
        summary,
        description: entry.description.clone(),
        tags: vec![tag_for(&entry.uri)],
        operation_id: non_empty(&entry.name),
        parameters,
        request_body,
        responses,
    }
}

fn json_content(example: Option<Value>) -> BTreeMap<String, MediaType> {
    let mut content = BTreeMap::new();
    content.insert(
        JSON_MEDIA_TYPE.to_string(),
        MediaType {
            schema: Schema::of("object"),
            example,
        },
    );
    content
}

/// First line of a description, cut to 97 characters plus `...` past 100.
pub fn summarize(description: &str) -> String {
    let first_line = description.lines().next().unwrap_or_default().trim();
    if first_line.chars().count() > SUMMARY_LIMIT {
        let cut: String = first_line.chars().take(SUMMARY_LIMIT - 3).collect();
        format!("{}...", cut)
    } else {
        first_line.to_string()
    }
}

/// Title-cased first uri segment (`api/users` groups under `Api`).
pub fn tag_for(uri: &str) -> String {
    segment_title(segments(uri).first().copied().unwrap_or("api"))
}

fn non_empty(text: &str) -> Option<String> {
    (!text.is_empty()).then(|| text.to_string())
}

fn non_null(value: &Value) -> Option<Value> {
    (!value.is_null()).then(|| value.clone())
}
