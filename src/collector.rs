use crate::handler_index::{HandlerIndex, INVOKE_METHOD};
use crate::model::{HttpMethod, RegisteredRoute, RouteRecord};
use crate::registry::RouteRegistry;
use log::debug;

/// Uri prefix of the routes worth documenting.
pub const API_PREFIX: &str = "api";

/// Turns a registry's routes into normalized [`RouteRecord`]s.
///
/// Only routes whose uri starts with `api` are kept, in registration order.
pub struct RouteCollector<'a> {
    registry: &'a dyn RouteRegistry,
}

impl<'a> RouteCollector<'a> {
    pub fn new(registry: &'a dyn RouteRegistry) -> Self {
        Self { registry }
    }

    pub fn collect(&self) -> Vec<RouteRecord> {
        let index = self.registry.handler_index();

        let records: Vec<RouteRecord> = self
            .registry
            .routes()
            .iter()
            .filter(|route| route.uri.starts_with(API_PREFIX))
            .map(|route| to_record(route, index))
            .collect();

        debug!(
            "Collected {} of {} registered routes",
            records.len(),
            self.registry.routes().len()
        );
        records
    }
}

fn to_record(route: &RegisteredRoute, index: &HandlerIndex) -> RouteRecord {
    let (controller, method) = resolve_action(&route.action, index);

    let mut http_methods: Vec<HttpMethod> = Vec::new();
    for m in route.methods.iter().filter(|m| **m != HttpMethod::Head) {
        if !http_methods.contains(m) {
            http_methods.push(*m);
        }
    }

    RouteRecord {
        uri: route.uri.clone(),
        http_methods,
        controller,
        method,
        name: route.name.clone().unwrap_or_default(),
        middleware: route.middleware.clone(),
    }
}

/// `Type@method` splits on `@` and drops any later `@` segment. A known handler type is
/// invoked through [`INVOKE_METHOD`]; anything else has no resolvable handler.
fn resolve_action(action: &str, index: &HandlerIndex) -> (Option<String>, Option<String>) {
    if let Some((owner, rest)) = action.split_once('@') {
        let method = rest.split('@').next().unwrap_or(rest);
        return (Some(owner.to_string()), Some(method.to_string()));
    }

    if index.is_known_type(action) {
        return (Some(action.to_string()), Some(INVOKE_METHOD.to_string()));
    }

    (None, None)
}
