use crate::ai::{AiClient, EndpointContext};
use crate::cache::DescriptionCache;
use crate::model::RouteRecord;
use log::{debug, warn};
use std::sync::Arc;

/// One-paragraph endpoint descriptions from an AI provider, memoized in a
/// [`DescriptionCache`] under `"<METHODS>:<uri>"`.
pub struct AiDocGenerator {
    client: Arc<dyn AiClient>,
    cache: DescriptionCache,
    enabled: bool,
}

impl AiDocGenerator {
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

    /// Description for `route`, or an empty string when the provider had nothing.
    pub fn generate(&self, route: &RouteRecord) -> String {
        let key = cache_key(route);

        if let Some(cached) = self.cache.get(&key) {
            debug!("Cache hit for {}", key);
            return cached;
        }

        let description = self.client.describe_endpoint(
            route.controller.as_deref().unwrap_or_default(),
            route.method.as_deref().unwrap_or_default(),
            &EndpointContext::for_route(route),
        );

        if !description.is_empty() {
            if let Err(e) = self.cache.put(&key, &description) {
                warn!("Failed to cache description for {}: {:#}", key, e);
            }
        }

        description
    }
}

pub fn cache_key(route: &RouteRecord) -> String {
    format!("{}:{}", route.methods_label(), route.uri)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::HttpMethod;
    use std::cell::RefCell;
    use tempfile::TempDir;

    /// Answers every call with a fixed reply and remembers what it was asked.
    struct ScriptedClient {
        reply: String,
        calls: RefCell<Vec<(String, String, EndpointContext)>>,
    }

    impl ScriptedClient {
        fn new(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: reply.to_string(),
                calls: RefCell::new(Vec::new()),
            })
        }
    }

    impl AiClient for ScriptedClient {
        fn describe_endpoint(
            &self,
            controller: &str,
            method: &str,
            context: &EndpointContext,
        ) -> String {
            self.calls
                .borrow_mut()
                .push((controller.to_string(), method.to_string(), context.clone()));
            self.reply.clone()
        }
    }

    fn users_route() -> RouteRecord {
        RouteRecord {
            uri: "api/users".to_string(),
            http_methods: vec![HttpMethod::Get],
            controller: Some("UserController".to_string()),
            method: Some("index".to_string()),
            name: "users.index".to_string(),
            middleware: Vec::new(),
        }
    }

    #[test]
    fn test_cache_key() {
        let mut route = users_route();
        route.http_methods = vec![HttpMethod::Get, HttpMethod::Post];
        assert_eq!(cache_key(&route), "GET|POST:api/users");
    }

    #[test]
    fn test_miss_calls_provider_and_caches() {
        let temp_dir = TempDir::new().unwrap();
        let cache = DescriptionCache::new(temp_dir.path().join("cache.json"), true);
        let client = ScriptedClient::new("Lists users.");
        let generator = AiDocGenerator::new(client.clone(), cache.clone(), true);

        assert_eq!(generator.generate(&users_route()), "Lists users.");
        assert_eq!(cache.get("GET:api/users").as_deref(), Some("Lists users."));

        let calls = client.calls.borrow();
        assert_eq!(calls.len(), 1);
        let (controller, method, context) = &calls[0];
        assert_eq!(controller, "UserController");
        assert_eq!(method, "index");
        assert_eq!(context.uri, "api/users");
        assert_eq!(context.http_methods, "GET");
        assert_eq!(context.name, "users.index");
    }

    #[test]
    fn test_hit_skips_provider() {
        let temp_dir = TempDir::new().unwrap();
        let cache = DescriptionCache::new(temp_dir.path().join("cache.json"), true);
        cache.put("GET:api/users", "From cache.").unwrap();

        let client = ScriptedClient::new("Fresh.");
        let generator = AiDocGenerator::new(client.clone(), cache, true);

        assert_eq!(generator.generate(&users_route()), "From cache.");
        assert!(client.calls.borrow().is_empty());
    }

    #[test]
    fn test_empty_reply_is_not_cached() {
        let temp_dir = TempDir::new().unwrap();
        let cache = DescriptionCache::new(temp_dir.path().join("cache.json"), true);
        let generator = AiDocGenerator::new(ScriptedClient::new(""), cache.clone(), true);

        assert_eq!(generator.generate(&users_route()), "");
        assert_eq!(cache.get("GET:api/users"), None);
    }

    #[test]
    fn test_works_without_cache() {
        let client = ScriptedClient::new("Lists users.");
        let generator = AiDocGenerator::new(client.clone(), DescriptionCache::disabled(), true);

        generator.generate(&users_route());
        generator.generate(&users_route());

        assert_eq!(client.calls.borrow().len(), 2);
    }
}
