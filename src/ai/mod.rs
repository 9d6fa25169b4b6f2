//! AI provider abstraction and the description generators built on it.
//!
//! A provider is anything implementing [`AiClient`]: [`openai::OpenAiClient`] talks to
//! a chat-completion endpoint, [`NoopAiClient`] never answers. Providers report failure
//! as an empty string so that generation can always fall back to something.

pub mod advanced;
pub mod generator;
pub mod openai;

use crate::model::RouteRecord;

/// Route facts and an optional ready-made prompt handed to a provider.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EndpointContext {
    pub uri: String,
    /// `GET|POST` form of the route's methods
    pub http_methods: String,
    /// Route name, empty when unnamed
    pub name: String,
    /// Complete prompt; when absent the provider builds one from the fields above
    pub prompt: Option<String>,
    pub max_tokens: Option<u32>,
}

impl EndpointContext {
    pub fn for_route(route: &RouteRecord) -> Self {
        Self {
            uri: route.uri.clone(),
            http_methods: route.methods_label(),
            name: route.name.clone(),
            prompt: None,
            max_tokens: None,
        }
    }

    /// A context carrying only a prompt and its token budget.
    pub fn with_prompt(prompt: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            prompt: Some(prompt.into()),
            max_tokens: Some(max_tokens),
            ..Self::default()
        }
    }
}

/// A text-generation provider.
pub trait AiClient {
    /// Describes an endpoint. Returns an empty string when the provider fails.
    fn describe_endpoint(
        &self,
        controller: &str,
        method: &str,
        context: &EndpointContext,
    ) -> String;
}

/// Provider used when AI generation is off or misconfigured.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopAiClient;

impl AiClient for NoopAiClient {
    fn describe_endpoint(
        &self,
        _controller: &str,
        _method: &str,
        _context: &EndpointContext,
    ) -> String {
        String::new()
    }
}

/// Removes a surrounding Markdown code fence (with or without a language tag).
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };

    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::HttpMethod;

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```json\n[1, 2]\n```"), "[1, 2]");
        assert_eq!(strip_code_fences("```\n{\"a\": 1}\n```\n"), "{\"a\": 1}");
        assert_eq!(strip_code_fences("  plain text "), "plain text");
        assert_eq!(strip_code_fences("```json\n[1]"), "[1]");
    }

    #[test]
    fn test_context_for_route() {
        let route = RouteRecord {
            uri: "api/users".to_string(),
            http_methods: vec![HttpMethod::Get, HttpMethod::Post],
            controller: Some("UserController".to_string()),
            method: Some("index".to_string()),
            name: "users.index".to_string(),
            middleware: Vec::new(),
        };

        let context = EndpointContext::for_route(&route);
        assert_eq!(context.http_methods, "GET|POST");
        assert_eq!(context.name, "users.index");
        assert!(context.prompt.is_none());

        let prompted = EndpointContext::with_prompt("Describe", 100);
        assert_eq!(prompted.prompt.as_deref(), Some("Describe"));
        assert_eq!(prompted.max_tokens, Some(100));
    }

    #[test]
    fn test_noop_client_is_silent() {
        assert_eq!(
            NoopAiClient.describe_endpoint("A", "b", &EndpointContext::default()),
            ""
        );
    }
}
