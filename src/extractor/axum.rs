use crate::extractor::{
    call_name, extract_with, flatten_chain, handler_ref, methods_named_in, middleware_name,
    string_literal, strip, GraphBuilder, HandlerRef, RouteExtractor, RouteInfo, RouterDialect,
};
use crate::model::HttpMethod;
use crate::parser::ParsedFile;
use log::debug;
use syn::Expr;

/// Axum route extractor.
///
/// Understands `Router::route` with method routers (`get(h)`, `get(h).post(h2)`,
/// `on(MethodFilter::..., h)`, `any(h)`), `Router::nest`, `Router::merge`, routers bound
/// to locals and routers returned from functions. `layer` and `route_layer` calls are
/// recorded as middleware on the routes of their chain.
pub struct AxumExtractor;

impl RouteExtractor for AxumExtractor {
    fn extract_routes(&self, parsed_files: &[ParsedFile]) -> Vec<RouteInfo> {
        let routes = extract_with(&AxumDialect, parsed_files);
        debug!("Axum extractor found {} routes", routes.len());
        routes
    }
}

struct AxumDialect;

impl RouterDialect for AxumDialect {
    fn is_router_method(&self, method: &str) -> bool {
        matches!(method, "route" | "nest" | "merge")
    }

    fn analyze_chain(&self, builder: &mut GraphBuilder, expr: &Expr, unit: &str) {
        let (base, calls) = flatten_chain(expr);
        builder.mount_base(base, unit);

        let middleware: Vec<String> = calls
            .iter()
            .filter(|call| matches!(call.method.to_string().as_str(), "layer" | "route_layer"))
            .filter_map(|call| call.args.first().and_then(middleware_name))
            .collect();

        for call in calls {
            let args: Vec<&Expr> = call.args.iter().collect();

            match (call.method.to_string().as_str(), args.as_slice()) {
                ("route", [path, method_router, ..]) => {
                    let Some(path) = string_literal(path) else {
                        debug!("Skipping route with a non-literal path in {}", unit);
                        continue;
                    };
                    for (methods, handler) in parse_method_router(method_router) {
                        let mut route = RouteInfo::new(path.clone(), methods, handler);
                        route.middleware = middleware.clone();
                        builder.add_route(unit, route);
                    }
                }
                ("nest", [prefix, router, ..]) => {
                    if let Some(prefix) = string_literal(prefix) {
                        builder.mount(self, unit, &prefix, router, &middleware, false);
                    }
                }
                ("merge", [router, ..]) => {
                    builder.mount(self, unit, "", router, &middleware, false);
                }
                _ => {}
            }
        }
    }
}

/// Methods declared by a method-router function name. `get` also answers `HEAD`.
fn filter_methods(name: &str) -> Option<Vec<HttpMethod>> {
    let name = name.strip_suffix("_service").unwrap_or(name);
    match name {
        "any" => Some(HttpMethod::ALL.to_vec()),
        "get" => Some(vec![HttpMethod::Get, HttpMethod::Head]),
        other => HttpMethod::parse(other).map(|m| vec![m]),
    }
}

/// Reads a method router such as `get(list).post(create)` into one entry per handler.
fn parse_method_router(expr: &Expr) -> Vec<(Vec<HttpMethod>, HandlerRef)> {
    match strip(expr) {
        Expr::Call(call) => {
            let Some(name) = call_name(expr) else {
                return Vec::new();
            };
            let args: Vec<&Expr> = call.args.iter().collect();
            method_entry(&name, &args).into_iter().collect()
        }
        Expr::MethodCall(method_call) => {
            let mut entries = parse_method_router(&method_call.receiver);
            let args: Vec<&Expr> = method_call.args.iter().collect();
            entries.extend(method_entry(&method_call.method.to_string(), &args));
            entries
        }
        _ => Vec::new(),
    }
}

fn method_entry(name: &str, args: &[&Expr]) -> Option<(Vec<HttpMethod>, HandlerRef)> {
    match (name, args) {
        ("on" | "on_service", [filter, handler, ..]) => {
            let methods = methods_named_in(filter);
            (!methods.is_empty()).then(|| (methods, handler_ref(handler)))
        }
        (name, [handler, ..]) => {
            filter_methods(name).map(|methods| (methods, handler_ref(handler)))
        }
        _ => None,
    }
}
