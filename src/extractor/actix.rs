use crate::extractor::{
    call_name, extract_with, flatten_chain, handler_ref, methods_named_in, middleware_name,
    string_literal, strip, GraphBuilder, HandlerRef, MountTarget, RouteExtractor, RouteInfo,
    RouterDialect,
};
use crate::model::HttpMethod;
use crate::parser::ParsedFile;
use log::debug;
use syn::punctuated::Punctuated;
use syn::{Attribute, Expr, ExprMethodCall, ItemFn, Token};

/// Actix-Web route extractor.
///
/// Reads route macros (`#[get("/p")]`, `#[route("/p", method = "GET", method = "POST")]`,
/// with `name` and `wrap` arguments), `App::service`, `App::route`, `App::configure`,
/// `web::scope` and `web::resource` registrations.
pub struct ActixExtractor;

impl RouteExtractor for ActixExtractor {
    fn extract_routes(&self, parsed_files: &[ParsedFile]) -> Vec<RouteInfo> {
        let routes = extract_with(&ActixDialect, parsed_files);
        debug!("Actix-Web extractor found {} routes", routes.len());
        routes
    }
}

struct ActixDialect;

type RouteTarget = (Vec<HttpMethod>, HandlerRef, Vec<String>);

impl RouterDialect for ActixDialect {
    fn is_router_method(&self, method: &str) -> bool {
        matches!(method, "service" | "route" | "configure" | "to")
    }

    fn analyze_chain(&self, builder: &mut GraphBuilder, expr: &Expr, unit: &str) {
        let (base, calls) = flatten_chain(expr);

        let middleware: Vec<String> = calls
            .iter()
            .filter(|call| matches!(call.method.to_string().as_str(), "wrap" | "wrap_fn"))
            .filter_map(|call| call.args.first().and_then(middleware_name))
            .collect();

        match call_name(base).as_deref() {
            Some("scope") => {
                let Some(prefix) = first_literal_arg(base) else {
                    debug!("Skipping scope with a non-literal prefix in {}", unit);
                    return;
                };
                let inner = builder.anonymous_unit();
                self.apply_calls(builder, &calls, &inner, &[]);
                builder.add_mount(unit, &prefix, MountTarget::Unit(inner), &middleware);
            }
            Some("resource") => self.resource_routes(builder, base, &calls, unit, &middleware),
            _ => {
                builder.mount_base(base, unit);
                self.apply_calls(builder, &calls, unit, &middleware);
            }
        }
    }

    fn attribute_routes(&self, item_fn: &ItemFn) -> Vec<RouteInfo> {
        let handler = HandlerRef::Path(vec![item_fn.sig.ident.to_string()]);
        item_fn
            .attrs
            .iter()
            .filter_map(|attr| parse_route_macro(attr, &handler))
            .collect()
    }
}

impl ActixDialect {
    /// `service`, `configure` and `route` calls on an `App`, a scope or a `ServiceConfig`.
    fn apply_calls(
        &self,
        builder: &mut GraphBuilder,
        calls: &[&ExprMethodCall],
        unit: &str,
        middleware: &[String],
    ) {
        for call in calls {
            let args: Vec<&Expr> = call.args.iter().collect();

            match (call.method.to_string().as_str(), args.as_slice()) {
                ("service" | "configure", [arg, ..]) => {
                    builder.mount(self, unit, "", arg, middleware, true);
                }
                ("route", [path, target, ..]) => {
                    let Some(path) = string_literal(path) else {
                        continue;
                    };
                    if let Some((methods, handler, route_middleware)) = parse_route_target(target) {
                        let mut route = RouteInfo::new(path, methods, handler);
                        route.middleware =
                            middleware.iter().cloned().chain(route_middleware).collect();
                        builder.add_route(unit, route);
                    }
                }
                _ => {}
            }
        }
    }

    /// `web::resource("/p").name("n").route(web::get().to(h)).to(fallback)`.
    fn resource_routes(
        &self,
        builder: &mut GraphBuilder,
        base: &Expr,
        calls: &[&ExprMethodCall],
        unit: &str,
        middleware: &[String],
    ) {
        let Some(path) = first_literal_arg(base) else {
            debug!("Skipping resource with a non-literal path in {}", unit);
            return;
        };

        let mut name = None;
        let mut targets: Vec<RouteTarget> = Vec::new();

        for call in calls {
            let method = call.method.to_string();
            let Some(arg) = call.args.first() else {
                continue;
            };

            match method.as_str() {
                "name" => name = string_literal(arg),
                "route" => targets.extend(parse_route_target(arg)),
                "to" => targets.push((HttpMethod::ALL.to_vec(), handler_ref(arg), Vec::new())),
                other => {
                    if let Some(http_method) = HttpMethod::parse(other) {
                        targets.push((vec![http_method], handler_ref(arg), Vec::new()));
                    }
                }
            }
        }

        for (methods, handler, route_middleware) in targets {
            let mut route = RouteInfo::new(path.clone(), methods, handler);
            route.name = name.clone();
            route.middleware = middleware.iter().cloned().chain(route_middleware).collect();
            builder.add_route(unit, route);
        }
    }
}

fn first_literal_arg(call: &Expr) -> Option<String> {
    match strip(call) {
        Expr::Call(call) => call.args.first().and_then(string_literal),
        _ => None,
    }
}

/// Reads `web::get().to(h)`, `web::method(Method::PATCH).to(h)` or
/// `web::route().guard(guard::Post()).to(h)`. A route without a method guard answers
/// every method.
fn parse_route_target(expr: &Expr) -> Option<RouteTarget> {
    let (base, calls) = flatten_chain(expr);

    let mut methods = match call_name(base).as_deref() {
        Some("method") => methods_named_in(base),
        Some(name) => HttpMethod::parse(name).map(|m| vec![m]).unwrap_or_default(),
        None => Vec::new(),
    };
    let mut handler = None;
    let mut middleware = Vec::new();

    for call in calls {
        let Some(arg) = call.args.first() else {
            continue;
        };
        match call.method.to_string().as_str() {
            "to" => handler = Some(handler_ref(arg)),
            "method" | "guard" => {
                for method in methods_named_in(arg) {
                    if !methods.contains(&method) {
                        methods.push(method);
                    }
                }
            }
            "wrap" => middleware.extend(middleware_name(arg)),
            _ => {}
        }
    }

    if methods.is_empty() {
        methods = HttpMethod::ALL.to_vec();
    }

    handler.map(|handler| (methods, handler, middleware))
}

/// Parse a route macro attribute: `#[get("/path", name = "...", wrap = "...")]` or
/// `#[route("/path", method = "GET", method = "POST")]`.
fn parse_route_macro(attr: &Attribute, handler: &HandlerRef) -> Option<RouteInfo> {
    let attr_name = attr.path().segments.last()?.ident.to_string();
    let mut methods = match attr_name.as_str() {
        "route" => Vec::new(),
        other => vec![HttpMethod::parse(other)?],
    };

    let args = attr
        .parse_args_with(Punctuated::<Expr, Token![,]>::parse_terminated)
        .ok()?;
    let mut args = args.iter();
    let path = string_literal(args.next()?)?;

    let mut name = None;
    let mut middleware = Vec::new();

    for arg in args {
        let Expr::Assign(assign) = arg else {
            continue;
        };
        let Expr::Path(key) = &*assign.left else {
            continue;
        };
        let Some(value) = string_literal(&assign.right) else {
            continue;
        };

        match key.path.get_ident().map(|i| i.to_string()).as_deref() {
            Some("name") => name = Some(value),
            Some("method") => {
                if let Some(method) = HttpMethod::parse(&value) {
                    if !methods.contains(&method) {
                        methods.push(method);
                    }
                }
            }
            Some("wrap") => {
                let wrapped = syn::parse_str::<Expr>(&value)
                    .ok()
                    .and_then(|expr| middleware_name(&expr))
                    .unwrap_or(value);
                middleware.push(wrapped);
            }
            _ => {}
        }
    }

    if methods.is_empty() {
        debug!("Route macro on {:?} declares no method", handler);
        return None;
    }

    let mut route = RouteInfo::new(path, methods, handler.clone());
    route.name = name;
    route.middleware = middleware;
    Some(route)
}
