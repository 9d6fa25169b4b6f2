use crate::formatter::{DocumentInfo, GENERATOR_NAME};
use crate::model::{path_parameters, DocumentationEntry, HttpMethod};
use crate::naming::{api_path, basename, segments, snake_case, title_case};
use serde::{Deserialize, Serialize};
use serde_json::json;

const COLLECTION_SCHEMA: &str =
    "https://schema.getpostman.com/json/collection/v2.1.0/collection.json";
const BASE_URL_VARIABLE: &str = "{{base_url}}";

/// Postman Collection v2.1 builder. One folder per controller, in order of first
/// appearance.
pub struct PostmanFormatter<'a> {
    info: &'a DocumentInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostmanCollection {
    pub info: CollectionInfo,
    pub item: Vec<Folder>,
    pub variable: Vec<Variable>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionInfo {
    pub name: String,
    pub description: String,
    pub schema: String,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Folder {
    pub name: String,
    pub description: String,
    pub item: Vec<RequestItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestItem {
    pub name: String,
    pub request: Request,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub method: String,
    pub header: Vec<Header>,
    pub url: Url,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Body>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Header {
    pub key: String,
    pub value: String,
    #[serde(rename = "type")]
    pub header_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Url {
    pub raw: String,
    pub host: Vec<String>,
    pub path: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub variable: Vec<Variable>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    pub key: String,
    pub value: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub variable_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub mode: String,
    pub raw: String,
    pub options: serde_json::Value,
}

impl<'a> PostmanFormatter<'a> {
    pub fn new(info: &'a DocumentInfo) -> Self {
        Self { info }
    }

    pub fn build(&self, entries: &[DocumentationEntry]) -> PostmanCollection {
        let mut groups: Vec<(String, Vec<&DocumentationEntry>)> = Vec::new();
        for entry in entries {
            let controller = entry.controller.as_deref().unwrap_or("Unknown");
            match groups.iter_mut().find(|(name, _)| name == controller) {
                Some((_, members)) => members.push(entry),
                None => groups.push((controller.to_string(), vec![entry])),
            }
        }

        let item = groups
            .into_iter()
            .map(|(controller, members)| Folder {
                name: folder_name(&controller),
                description: format!("Routes for {}", controller),
                item: members.into_iter().map(build_request).collect(),
            })
            .collect();

        PostmanCollection {
            info: CollectionInfo {
                name: self.info.title.clone(),
                description: format!("Generated automatically by {}", GENERATOR_NAME),
                schema: COLLECTION_SCHEMA.to_string(),
                version: "1.0.0".to_string(),
            },
            item,
            variable: vec![Variable {
                key: "base_url".to_string(),
                value: self.info.base_url.clone(),
                variable_type: Some("string".to_string()),
                description: None,
            }],
        }
    }
}

/// `App\Http\UserProfileController` -> `User Profile`.
pub fn folder_name(controller: &str) -> String {
    let name = basename(controller).replace("Controller", "");
    let words = snake_case(&name).replace('_', " ");
    match title_case(&words) {
        title if title.is_empty() => controller.to_string(),
        title => title,
    }
}

/// `<List|Create|Update|Delete|Action> <second uri segment>`.
pub fn request_name(method: HttpMethod, uri: &str) -> String {
    let action = match method {
        HttpMethod::Get => "List",
        HttpMethod::Post => "Create",
        HttpMethod::Put | HttpMethod::Patch => "Update",
        HttpMethod::Delete => "Delete",
        _ => "Action",
    };
    let resource = segments(uri).get(1).copied().unwrap_or("resource");
    format!("{} {}", action, resource)
}

fn build_request(entry: &DocumentationEntry) -> RequestItem {
    let method = entry.http_methods.first().copied().unwrap_or(HttpMethod::Get);

    // Postman marks path variables as `:name`
    let path: Vec<String> = segments(&api_path(&entry.uri))
        .into_iter()
        .map(|segment| match segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
            Some(name) => format!(":{}", name),
            None => segment.to_string(),
        })
        .collect();

    let variable = path_parameters(&entry.uri)
        .into_iter()
        .map(|name| Variable {
            description: Some(format!("The {} parameter", name)),
            key: name,
            value: "example".to_string(),
            variable_type: None,
        })
        .collect();

    let body = method.has_body().then(|| {
        let example = entry
            .advanced
            .as_ref()
            .map(|bundle| bundle.request_example.clone())
            .filter(|example| !example.is_null())
            .unwrap_or_else(|| json!({"example": "data"}));
        Body {
            mode: "raw".to_string(),
            raw: serde_json::to_string_pretty(&example).unwrap_or_default(),
            options: json!({"raw": {"language": "json"}}),
        }
    });

    RequestItem {
        name: request_name(method, &entry.uri),
        request: Request {
            method: method.as_str().to_string(),
            header: vec![header("Accept"), header("Content-Type")],
            url: Url {
                raw: format!("{}/{}", BASE_URL_VARIABLE, path.join("/")),
                host: vec![BASE_URL_VARIABLE.to_string()],
                path,
                variable,
            },
            description: entry.description.clone(),
            body,
        },
    }
}

fn header(key: &str) -> Header {
    Header {
        key: key.to_string(),
        value: "application/json".to_string(),
        header_type: "text".to_string(),
    }
}
