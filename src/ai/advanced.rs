use crate::ai::{strip_code_fences, AiClient, EndpointContext};
use crate::cache::DescriptionCache;
use crate::model::{path_parameters, DocBundle, ErrorResponse, ParameterDoc, RouteRecord};
use crate::naming::{segment_title, segments};
use log::{debug, warn};
use serde_json::Value;
use std::sync::Arc;

const MAX_TAGS: usize = 3;

/// Structured documentation for an endpoint, assembled from six independent prompts.
///
/// Bundles are cached as JSON under `"comprehensive_<METHODS>:<uri>"`.
pub struct AdvancedAiGenerator {
    client: Arc<dyn AiClient>,
    cache: DescriptionCache,
    enabled: bool,
}

/// Route facts interpolated into every prompt.
struct PromptFacts<'a> {
    controller: &'a str,
    method: &'a str,
    http_methods: String,
    uri: &'a str,
    name: &'a str,
}

impl<'a> PromptFacts<'a> {
    fn new(route: &'a RouteRecord) -> Self {
        Self {
            controller: route.controller.as_deref().unwrap_or("Unknown"),
            method: route.method.as_deref().unwrap_or("Unknown"),
            http_methods: route.methods_label(),
            uri: &route.uri,
            name: if route.name.is_empty() {
                "No name"
            } else {
                &route.name
            },
        }
    }

    fn header(&self) -> String {
        format!(
            "Controller: {}\nMethod: {}\nHTTP Methods: {}\nURI: {}\n",
            self.controller, self.method, self.http_methods, self.uri
        )
    }
}

impl AdvancedAiGenerator {
    pub fn new(client: Arc<dyn AiClient>, cache: DescriptionCache, enabled: bool) -> Self {
        Self {
            client,
            cache,
            enabled,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn generate_comprehensive_docs(&self, route: &RouteRecord) -> DocBundle {
        let key = cache_key(route);

        if let Some(bundle) = self.cached(&key) {
            return bundle;
        }

        let facts = PromptFacts::new(route);
        let bundle = DocBundle {
            description: self.ask(&description_prompt(&facts), 300),
            summary: self.ask(&summary_prompt(&facts), 100),
            parameters: self.parameters(route, &facts),
            request_example: self.request_example(route, &facts),
            response_example: parse_example(&self.ask(&response_example_prompt(&facts), 300)),
            error_responses: parse_error_responses(&self.ask(&error_responses_prompt(&facts), 200)),
            tags: tags_for(&route.uri),
        };

        if !bundle.description.is_empty() || !bundle.summary.is_empty() {
            self.store(&key, &bundle);
        }

        bundle
    }

    fn cached(&self, key: &str) -> Option<DocBundle> {
        let raw = self.cache.get(key)?;

        let bundle: DocBundle = match serde_json::from_str(&raw) {
            Ok(bundle) => bundle,
            Err(e) => {
                warn!("Discarding undecodable cached bundle for {}: {}", key, e);
                return None;
            }
        };

        debug!("Cache hit for {}", key);
        if serde_json::to_string(&bundle).ok().as_deref() != Some(raw.as_str()) {
            self.store(key, &bundle);
        }

        Some(bundle)
    }

    fn store(&self, key: &str, bundle: &DocBundle) {
        let result = serde_json::to_string(bundle)
            .map_err(anyhow::Error::from)
            .and_then(|json| self.cache.put(key, &json));

        if let Err(e) = result {
            warn!("Failed to cache bundle for {}: {:#}", key, e);
        }
    }

    fn ask(&self, prompt: &str, max_tokens: u32) -> String {
        if !self.enabled {
            return String::new();
        }
        self.client
            .describe_endpoint("", "", &EndpointContext::with_prompt(prompt, max_tokens))
    }

    fn parameters(&self, route: &RouteRecord, facts: &PromptFacts<'_>) -> Vec<ParameterDoc> {
        let mut parameters: Vec<ParameterDoc> = path_parameters(&route.uri)
            .into_iter()
            .map(|name| ParameterDoc {
                description: format!("The {} parameter", name),
                location: "path".to_string(),
                required: true,
                example: Value::String("example-value".to_string()),
                name,
                ..ParameterDoc::default()
            })
            .collect();

        let reply = self.ask(&parameters_prompt(facts), 500);
        for extra in parse_list::<ParameterDoc>(&reply) {
            if extra.name.is_empty() || parameters.iter().any(|p| p.name == extra.name) {
                continue;
            }
            parameters.push(extra);
        }

        parameters
    }

    fn request_example(&self, route: &RouteRecord, facts: &PromptFacts<'_>) -> Value {
        match route.primary_method() {
            Some(method) if method.has_body() => {
                parse_example(&self.ask(&request_example_prompt(facts), 200))
            }
            _ => Value::Null,
        }
    }
}

pub fn cache_key(route: &RouteRecord) -> String {
    format!("comprehensive_{}:{}", route.methods_label(), route.uri)
}

/// Up to three title-cased uri segments, skipping a leading `api` and placeholders.
pub fn tags_for(uri: &str) -> Vec<String> {
    let mut parts = segments(uri);
    if parts.first() == Some(&"api") {
        parts.remove(0);
    }

    parts
        .into_iter()
        .filter(|segment| !(segment.contains('{') && segment.contains('}')))
        .take(MAX_TAGS)
        .map(segment_title)
        .collect()
}

/// A JSON object or list from provider output; anything else is `Null`.
fn parse_example(reply: &str) -> Value {
    match serde_json::from_str::<Value>(strip_code_fences(reply)) {
        Ok(value @ (Value::Object(_) | Value::Array(_))) => value,
        _ => Value::Null,
    }
}

/// Elements of a JSON list that decode as `T`. Non-list output yields nothing.
fn parse_list<T: serde::de::DeserializeOwned>(reply: &str) -> Vec<T> {
    match serde_json::from_str::<Value>(strip_code_fences(reply)) {
        Ok(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    }
}

/// Decoded error responses, or [`fallback_errors`] when none decode.
fn parse_error_responses(reply: &str) -> Vec<ErrorResponse> {
    let parsed: Vec<ErrorResponse> = parse_list(reply);
    if parsed.is_empty() {
        fallback_errors()
    } else {
        parsed
    }
}

pub fn fallback_errors() -> Vec<ErrorResponse> {
    vec![
        ErrorResponse::new(400, "Bad Request", "Invalid request data"),
        ErrorResponse::new(401, "Unauthorized", "Authentication required"),
        ErrorResponse::new(404, "Not Found", "Resource not found"),
        ErrorResponse::new(422, "Validation Error", "Request validation failed"),
        ErrorResponse::new(500, "Server Error", "Internal server error"),
    ]
}

fn description_prompt(facts: &PromptFacts<'_>) -> String {
    format!(
        "Generate a detailed description for this HTTP API endpoint:\n\n{}Route Name: {}\n\n\
         Provide a comprehensive description including:\n\
         - What this endpoint does\n\
         - When to use it\n\
         - Business logic involved\n\
         - Any important notes\n\n\
         Keep it professional and detailed (2-3 sentences).",
        facts.header(),
        facts.name
    )
}

fn summary_prompt(facts: &PromptFacts<'_>) -> String {
    format!(
        "Generate a concise one-line summary for this API endpoint:\n\n{}\n\
         Example: 'Retrieves a list of users with pagination'",
        facts.header()
    )
}

fn parameters_prompt(facts: &PromptFacts<'_>) -> String {
    format!(
        "Analyze this HTTP API endpoint and generate parameter documentation:\n\n{}\n\
         Provide JSON format with:\n\
         - name: parameter name\n\
         - type: data type\n\
         - required: boolean\n\
         - description: what it does\n\
         - example: sample value\n\n\
         Include both path parameters and query parameters.",
        facts.header()
    )
}

fn request_example_prompt(facts: &PromptFacts<'_>) -> String {
    format!(
        "Generate a realistic request body example for this HTTP API endpoint:\n\n{}\n\
         Provide a JSON object with realistic sample data that would be sent to this endpoint.",
        facts.header()
    )
}

fn response_example_prompt(facts: &PromptFacts<'_>) -> String {
    format!(
        "Generate a realistic response example for this HTTP API endpoint:\n\n{}\n\
         Provide a JSON object showing what this endpoint would return on success.",
        facts.header()
    )
}

fn error_responses_prompt(facts: &PromptFacts<'_>) -> String {
    format!(
        "Generate common error responses for this HTTP API endpoint:\n\n{}\n\
         Provide JSON format with:\n\
         - status_code: HTTP status\n\
         - message: error message\n\
         - description: when this error occurs\n\n\
         Include common errors like 400, 401, 403, 404, 422, 500.",
        facts.header()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::HttpMethod;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::cell::RefCell;
    use tempfile::TempDir;

    /// Replies according to the kind of prompt it receives.
    #[derive(Default)]
    struct PromptAwareClient {
        prompts: RefCell<Vec<(String, u32)>>,
        parameters: String,
        errors: String,
    }

    impl AiClient for PromptAwareClient {
        fn describe_endpoint(
            &self,
            controller: &str,
            method: &str,
            context: &EndpointContext,
        ) -> String {
            assert!(controller.is_empty() && method.is_empty());
            let prompt = context.prompt.clone().unwrap_or_default();
            self.prompts
                .borrow_mut()
                .push((prompt.clone(), context.max_tokens.unwrap_or_default()));

            if prompt.starts_with("Generate a detailed description") {
                "Returns a single post of a user.".to_string()
            } else if prompt.starts_with("Generate a concise one-line summary") {
                "Shows a post".to_string()
            } else if prompt.starts_with("Analyze") {
                self.parameters.clone()
            } else if prompt.starts_with("Generate a realistic request body") {
                "```json\n{\"title\": \"Hello\"}\n```".to_string()
            } else if prompt.starts_with("Generate a realistic response") {
                "{\"id\": 1}".to_string()
            } else {
                self.errors.clone()
            }
        }
    }

    fn route(uri: &str, methods: &[HttpMethod]) -> RouteRecord {
        RouteRecord {
            uri: uri.to_string(),
            http_methods: methods.to_vec(),
            controller: Some("PostController".to_string()),
            method: Some("show".to_string()),
            name: String::new(),
            middleware: Vec::new(),
        }
    }

    fn temp_cache(temp_dir: &TempDir) -> DescriptionCache {
        DescriptionCache::new(temp_dir.path().join("cache.json"), true)
    }

    #[test]
    fn test_tags() {
        assert_eq!(tags_for("api/users/{id}/posts/{postId}"), vec!["Users", "Posts"]);
        assert_eq!(tags_for("api/user-profiles"), vec!["User Profiles"]);
        assert_eq!(tags_for("v1/a/b/c/d"), vec!["V1", "A", "B"]);
        assert!(tags_for("api").is_empty());
    }

    #[test]
    fn test_parse_example() {
        assert_eq!(parse_example("```json\n{\"a\": 1}\n```"), json!({"a": 1}));
        assert_eq!(parse_example("[1, 2]"), json!([1, 2]));
        assert_eq!(parse_example("\"just a string\""), Value::Null);
        assert_eq!(parse_example("not json"), Value::Null);
    }

    #[test]
    fn test_error_responses_fall_back_when_nothing_decodes() {
        assert_eq!(parse_error_responses("Sorry, I can't."), fallback_errors());
        assert_eq!(parse_error_responses("{\"status_code\": 400}"), fallback_errors());
        assert_eq!(
            parse_error_responses(r#"[{"status_code": 403, "message": "Forbidden"}, "junk"]"#),
            vec![ErrorResponse::new(403, "Forbidden", "")]
        );
        assert_eq!(parse_error_responses("[]"), fallback_errors());
        assert_eq!(parse_error_responses(r#"[{"message": "no code"}]"#), fallback_errors());
    }

    #[test]
    fn test_list_items_accept_scalars_spelled_as_strings() {
        assert_eq!(
            parse_error_responses(
                r#"[{"status_code": "400", "message": "Bad Request"}, {"status_code": " 404 ", "message": "Not Found"}]"#
            ),
            vec![
                ErrorResponse::new(400, "Bad Request", ""),
                ErrorResponse::new(404, "Not Found", ""),
            ]
        );

        let parameters: Vec<ParameterDoc> = parse_list(
            r#"[{"name": "page", "in": "query", "required": "true"}, {"name": "sort", "required": "False"}, {"name": "bad", "required": "maybe"}]"#,
        );
        let names: Vec<(&str, bool)> = parameters
            .iter()
            .map(|p| (p.name.as_str(), p.required))
            .collect();
        assert_eq!(names, vec![("page", true), ("sort", false)]);
    }

    #[test]
    fn test_comprehensive_docs_for_get_route() {
        let temp_dir = TempDir::new().unwrap();
        let client = Arc::new(PromptAwareClient {
            parameters: r#"[{"name": "include", "type": "string", "description": "Relations"}, {"name": "id"}]"#
                .to_string(),
            errors: "no errors to report".to_string(),
            ..PromptAwareClient::default()
        });
        let generator = AdvancedAiGenerator::new(client.clone(), temp_cache(&temp_dir), true);

        let bundle = generator.generate_comprehensive_docs(&route(
            "api/users/{id}/posts/{postId}",
            &[HttpMethod::Get],
        ));

        assert_eq!(bundle.description, "Returns a single post of a user.");
        assert_eq!(bundle.summary, "Shows a post");
        assert_eq!(
            bundle
                .parameters
                .iter()
                .map(|p| (p.name.as_str(), p.location.as_str(), p.required))
                .collect::<Vec<_>>(),
            vec![("id", "path", true), ("postId", "path", true), ("include", "query", false)]
        );
        assert_eq!(bundle.parameters[0].description, "The id parameter");
        assert_eq!(bundle.parameters[0].param_type, "string");
        assert!(bundle.request_example.is_null());
        assert_eq!(bundle.response_example, json!({"id": 1}));
        assert_eq!(bundle.error_responses, fallback_errors());
        assert_eq!(bundle.tags, vec!["Users", "Posts"]);

        let prompts = client.prompts.borrow();
        assert_eq!(
            prompts.iter().map(|(_, tokens)| *tokens).collect::<Vec<_>>(),
            vec![300, 100, 500, 300, 200]
        );
        assert!(prompts[0]
            .0
            .contains("Controller: PostController\nMethod: show\nHTTP Methods: GET"));
        assert!(prompts[0].0.contains("Route Name: No name"));
    }

    #[test]
    fn test_request_example_for_post_route() {
        let client = Arc::new(PromptAwareClient::default());
        let generator =
            AdvancedAiGenerator::new(client.clone(), DescriptionCache::disabled(), true);

        let bundle =
            generator.generate_comprehensive_docs(&route("api/posts", &[HttpMethod::Post]));

        assert_eq!(bundle.request_example, json!({"title": "Hello"}));
        assert_eq!(client.prompts.borrow().len(), 6);
        assert!(bundle.parameters.is_empty());
    }

    #[test]
    fn test_bundle_is_cached_and_reused() {
        let temp_dir = TempDir::new().unwrap();
        let cache = temp_cache(&temp_dir);
        let client = Arc::new(PromptAwareClient::default());
        let generator = AdvancedAiGenerator::new(client.clone(), cache.clone(), true);
        let posts = route("api/posts", &[HttpMethod::Get]);

        let first = generator.generate_comprehensive_docs(&posts);
        let sent = client.prompts.borrow().len();
        let second = generator.generate_comprehensive_docs(&posts);

        assert_eq!(first, second);
        assert_eq!(client.prompts.borrow().len(), sent);
        assert!(cache.get("comprehensive_GET:api/posts").is_some());
    }

    #[test]
    fn test_undecodable_cache_entry_is_a_miss() {
        let temp_dir = TempDir::new().unwrap();
        let cache = temp_cache(&temp_dir);
        cache.put("comprehensive_GET:api/posts", "not json").unwrap();

        let client = Arc::new(PromptAwareClient::default());
        let generator = AdvancedAiGenerator::new(client.clone(), cache.clone(), true);
        let bundle = generator.generate_comprehensive_docs(&route("api/posts", &[HttpMethod::Get]));

        assert_eq!(bundle.summary, "Shows a post");
        assert!(!client.prompts.borrow().is_empty());
        let stored: DocBundle =
            serde_json::from_str(&cache.get("comprehensive_GET:api/posts").unwrap()).unwrap();
        assert_eq!(stored, bundle);
    }

    #[test]
    fn test_non_canonical_hit_is_rewritten() {
        let temp_dir = TempDir::new().unwrap();
        let cache = temp_cache(&temp_dir);
        cache
            .put("comprehensive_GET:api/posts", r#"{ "summary": "Cached summary" }"#)
            .unwrap();

        let client = Arc::new(PromptAwareClient::default());
        let generator = AdvancedAiGenerator::new(client.clone(), cache.clone(), true);
        let bundle = generator.generate_comprehensive_docs(&route("api/posts", &[HttpMethod::Get]));

        assert_eq!(bundle.summary, "Cached summary");
        assert!(client.prompts.borrow().is_empty());
        assert_eq!(
            cache.get("comprehensive_GET:api/posts"),
            Some(serde_json::to_string(&bundle).unwrap())
        );
    }

    #[test]
    fn test_disabled_generator_sends_no_prompts() {
        let temp_dir = TempDir::new().unwrap();
        let cache = temp_cache(&temp_dir);
        let client = Arc::new(PromptAwareClient::default());
        let generator = AdvancedAiGenerator::new(client.clone(), cache.clone(), false);

        let bundle =
            generator.generate_comprehensive_docs(&route("api/users/{id}", &[HttpMethod::Put]));

        assert!(client.prompts.borrow().is_empty());
        assert_eq!(bundle.description, "");
        assert_eq!(bundle.parameters.len(), 1);
        assert!(bundle.request_example.is_null());
        assert_eq!(bundle.error_responses, fallback_errors());
        assert_eq!(bundle.tags, vec!["Users"]);
        assert_eq!(cache.get("comprehensive_PUT:api/users/{id}"), None);
    }
}
