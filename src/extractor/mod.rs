//! Route extraction module for parsing web framework route definitions.
//!
//! This module provides a unified interface for extracting route information from different
//! web frameworks. Each framework supplies a [`RouterDialect`] that knows how to read its
//! router-building chains; the shared [`GraphBuilder`] walks every function of every file,
//! records what each function's routers contain, and [`RouterGraph::resolve`] stitches
//! nested, merged, scoped and configured routers back together into full paths.
//!
//! # Supported Frameworks
//!
//! - **Axum**: See [`axum::AxumExtractor`]
//! - **Actix-Web**: See [`actix::ActixExtractor`]
//!
//! # Example
//!
//! ```no_run
//! use apidocx::extractor::{RouteExtractor, axum::AxumExtractor};
//! use apidocx::parser::AstParser;
//! use std::path::Path;
//!
//! let parsed = AstParser::parse_file(Path::new("src/main.rs")).unwrap();
//! let extractor = AxumExtractor;
//! let routes = extractor.extract_routes(&[parsed]);
//! println!("Found {} routes", routes.len());
//! ```

pub mod actix;
pub mod axum;

use crate::model::HttpMethod;
use crate::parser::ParsedFile;
use log::{debug, warn};
use std::collections::{HashMap, HashSet};
use syn::visit::Visit;
use syn::{Block, Expr, ExprMethodCall, ImplItem, Item, ItemFn, Lit, Pat, Stmt};

/// Trait for extracting route information from parsed Rust files.
///
/// Implementations analyze the AST of a specific web framework and return every route
/// reachable from the project's routers, with prefixes already applied.
pub trait RouteExtractor {
    /// Extracts all route information from parsed Rust files.
    ///
    /// # Arguments
    ///
    /// * `parsed_files` - All successfully parsed Rust source files in the project
    fn extract_routes(&self, parsed_files: &[ParsedFile]) -> Vec<RouteInfo>;
}

/// How a route refers to its handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerRef {
    /// A path expression such as `list_users` or `UserController::index`
    Path(Vec<String>),
    /// A closure, or any other expression that does not name a handler
    Closure,
}

/// A single route as declared in source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteInfo {
    /// Full path in the framework's own syntax (`/users/:id`, `/users/{id}`)
    pub path: String,
    /// Declared methods
    pub methods: Vec<HttpMethod>,
    pub handler: HandlerRef,
    /// Route name, for frameworks that support naming routes
    pub name: Option<String>,
    /// Middleware applied to the route, outermost first
    pub middleware: Vec<String>,
    /// Module of the file that registered the route
    pub module: String,
}

impl RouteInfo {
    /// Create a new RouteInfo with minimal required fields
    pub fn new(path: impl Into<String>, methods: Vec<HttpMethod>, handler: HandlerRef) -> Self {
        Self {
            path: path.into(),
            methods,
            handler,
            name: None,
            middleware: Vec::new(),
            module: String::new(),
        }
    }
}

/// Framework-specific reading of router chains.
pub(crate) trait RouterDialect {
    /// Whether a method call in a chain registers routes or sub-routers.
    fn is_router_method(&self, method: &str) -> bool;

    /// Adds the routes and mounts of one router chain to `unit`.
    fn analyze_chain(&self, builder: &mut GraphBuilder, expr: &Expr, unit: &str);

    /// Routes declared on a function itself through attribute macros.
    fn attribute_routes(&self, _item_fn: &ItemFn) -> Vec<RouteInfo> {
        Vec::new()
    }
}

/// Runs `dialect` over every function of every file and resolves the resulting graph.
pub(crate) fn extract_with<D: RouterDialect>(
    dialect: &D,
    parsed_files: &[ParsedFile],
) -> Vec<RouteInfo> {
    let mut builder = GraphBuilder::default();

    for parsed_file in parsed_files {
        builder.module = parsed_file.module_path();
        builder.visit_items(dialect, &parsed_file.syntax_tree.items);
    }

    builder.graph.resolve()
}

/// Where a mounted router lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum MountTarget {
    /// A unit key known at analysis time (local bindings, inline routers)
    Unit(String),
    /// A function referenced by path, resolved once every file has been read
    Function { segments: Vec<String>, module: String },
}

#[derive(Debug, Clone)]
pub(crate) enum UnitEntry {
    Route(RouteInfo),
    Mount {
        prefix: String,
        target: MountTarget,
        middleware: Vec<String>,
    },
}

#[derive(Debug)]
struct Unit {
    key: String,
    entries: Vec<UnitEntry>,
}

/// Routers found in source, keyed by where they were built.
///
/// A unit is a router-building function (`users::routes`), a local binding inside one
/// (`app.api`), or an inline router passed as an argument (`app#3`). Units that no other
/// unit mounts are the roots the final route list is expanded from, in the order they
/// were first seen.
#[derive(Debug, Default)]
pub(crate) struct RouterGraph {
    units: Vec<Unit>,
    index: HashMap<String, usize>,
}

impl RouterGraph {
    fn entries_mut(&mut self, key: &str) -> &mut Vec<UnitEntry> {
        let idx = match self.index.get(key) {
            Some(idx) => *idx,
            None => {
                self.units.push(Unit {
                    key: key.to_string(),
                    entries: Vec::new(),
                });
                self.index.insert(key.to_string(), self.units.len() - 1);
                self.units.len() - 1
            }
        };
        &mut self.units[idx].entries
    }

    pub(crate) fn add(&mut self, key: &str, entry: UnitEntry) {
        self.entries_mut(key).push(entry);
    }

    fn resolve_target(&self, target: &MountTarget) -> Option<String> {
        match target {
            MountTarget::Unit(key) => self.index.contains_key(key).then(|| key.clone()),
            MountTarget::Function { segments, module } => {
                let segments: Vec<&str> = segments
                    .iter()
                    .map(String::as_str)
                    .filter(|s| !matches!(*s, "crate" | "self" | "super"))
                    .collect();
                if segments.is_empty() {
                    return None;
                }

                let joined = segments.join("::");
                let local = qualify(module, &joined);
                if self.index.contains_key(&local) {
                    return Some(local);
                }
                if self.index.contains_key(&joined) {
                    return Some(joined);
                }

                let suffix = format!("::{}", joined);
                self.units
                    .iter()
                    .map(|u| &u.key)
                    .find(|k| is_function_key(k) && k.ends_with(&suffix))
                    .cloned()
            }
        }
    }

    /// Expands every root unit into its routes, applying mount prefixes and middleware.
    pub(crate) fn resolve(&self) -> Vec<RouteInfo> {
        let mounted: HashSet<String> = self
            .units
            .iter()
            .flat_map(|u| u.entries.iter())
            .filter_map(|entry| match entry {
                UnitEntry::Mount { target, .. } => self.resolve_target(target),
                UnitEntry::Route(_) => None,
            })
            .collect();

        let mut routes = Vec::new();
        for unit in self.units.iter().filter(|u| !mounted.contains(&u.key)) {
            let mut stack = vec![unit.key.clone()];
            self.expand(unit, "", &[], &mut stack, &mut routes);
        }

        debug!(
            "Resolved {} routes from {} router units",
            routes.len(),
            self.units.len()
        );
        routes
    }

    fn expand(
        &self,
        unit: &Unit,
        prefix: &str,
        middleware: &[String],
        stack: &mut Vec<String>,
        out: &mut Vec<RouteInfo>,
    ) {
        for entry in &unit.entries {
            match entry {
                UnitEntry::Route(route) => {
                    let mut route = route.clone();
                    route.path = combine_paths(prefix, &route.path);
                    route.middleware = middleware
                        .iter()
                        .chain(route.middleware.iter())
                        .cloned()
                        .collect();
                    out.push(route);
                }
                UnitEntry::Mount {
                    prefix: mount_prefix,
                    target,
                    middleware: mount_middleware,
                } => {
                    let Some(key) = self.resolve_target(target) else {
                        debug!("Unresolved router mount {:?} in {}", target, unit.key);
                        continue;
                    };
                    if stack.contains(&key) {
                        warn!("Skipping recursive router mount of {} in {}", key, unit.key);
                        continue;
                    }
                    let Some(child) = self.index.get(&key).map(|idx| &self.units[*idx]) else {
                        continue;
                    };

                    let inherited: Vec<String> = middleware
                        .iter()
                        .chain(mount_middleware.iter())
                        .cloned()
                        .collect();

                    stack.push(key);
                    self.expand(
                        child,
                        &combine_paths(prefix, mount_prefix),
                        &inherited,
                        stack,
                        out,
                    );
                    stack.pop();
                }
            }
        }
    }
}

/// Walks functions and feeds their router chains to a dialect.
#[derive(Debug, Default)]
pub(crate) struct GraphBuilder {
    pub(crate) graph: RouterGraph,
    module: String,
    function: String,
    locals: HashSet<String>,
    anonymous: usize,
}

impl GraphBuilder {
    fn visit_items<D: RouterDialect>(&mut self, dialect: &D, items: &[Item]) {
        for item in items {
            match item {
                Item::Fn(item_fn) => {
                    let key = qualify(&self.module, &item_fn.sig.ident.to_string());
                    for mut route in dialect.attribute_routes(item_fn) {
                        route.module = self.module.clone();
                        self.graph.add(&key, UnitEntry::Route(route));
                    }
                    self.process_function(dialect, &item_fn.sig.ident.to_string(), &item_fn.block);
                }
                Item::Impl(item_impl) => {
                    for impl_item in &item_impl.items {
                        if let ImplItem::Fn(method) = impl_item {
                            let name = method.sig.ident.to_string();
                            self.process_function(dialect, &name, &method.block);
                        }
                    }
                }
                Item::Mod(item_mod) => {
                    if let Some((_, content)) = &item_mod.content {
                        let parent = self.module.clone();
                        self.module = qualify(&parent, &item_mod.ident.to_string());
                        self.visit_items(dialect, content);
                        self.module = parent;
                    }
                }
                _ => {}
            }
        }
    }

    fn process_function<D: RouterDialect>(&mut self, dialect: &D, name: &str, block: &Block) {
        self.function = qualify(&self.module, name);
        self.locals.clear();

        let unit = self.function.clone();
        let last = block.stmts.len();

        for (i, stmt) in block.stmts.iter().enumerate() {
            match stmt {
                Stmt::Local(local) => {
                    let Some(init) = &local.init else { continue };
                    match pat_ident(&local.pat) {
                        Some(ident) => {
                            let key = self.local_unit(&ident);
                            self.locals.insert(ident);
                            self.analyze_router_expr(dialect, &init.expr, &key);
                        }
                        None => self.find_chains(dialect, &init.expr, &unit),
                    }
                }
                Stmt::Expr(Expr::Return(ret), _) => {
                    if let Some(expr) = &ret.expr {
                        self.analyze_router_expr(dialect, expr, &unit);
                    }
                }
                Stmt::Expr(expr, None) if i + 1 == last => {
                    self.analyze_router_expr(dialect, expr, &unit);
                }
                Stmt::Expr(expr, _) => self.find_chains(dialect, expr, &unit),
                _ => {}
            }
        }
    }

    /// A value-position expression that may be a router: a chain, a local router
    /// binding, or a call to a router-building function.
    fn analyze_router_expr<D: RouterDialect>(&mut self, dialect: &D, expr: &Expr, unit: &str) {
        let stripped = strip(expr);
        match stripped {
            Expr::MethodCall(_) if has_router_method(dialect, stripped) => {
                dialect.analyze_chain(self, stripped, unit)
            }
            Expr::Path(_) | Expr::Call(_) => {
                if let Some(target) = self.mount_target(stripped, false) {
                    self.add_mount(unit, "", target, &[]);
                } else {
                    self.find_chains(dialect, stripped, unit);
                }
            }
            _ => self.find_chains(dialect, stripped, unit),
        }
    }

    fn find_chains<D: RouterDialect>(&mut self, dialect: &D, expr: &Expr, unit: &str) {
        let mut finder = ChainFinder {
            dialect,
            chains: Vec::new(),
        };
        finder.visit_expr(expr);

        for chain in finder.chains {
            dialect.analyze_chain(self, chain, unit);
        }
    }

    fn local_unit(&self, ident: &str) -> String {
        format!("{}.{}", self.function, ident)
    }

    /// A fresh key for an inline router.
    pub(crate) fn anonymous_unit(&mut self) -> String {
        self.anonymous += 1;
        format!("{}#{}", self.function, self.anonymous)
    }

    pub(crate) fn add_route(&mut self, unit: &str, mut route: RouteInfo) {
        route.module = self.module.clone();
        self.graph.add(unit, UnitEntry::Route(route));
    }

    pub(crate) fn add_mount(
        &mut self,
        unit: &str,
        prefix: &str,
        target: MountTarget,
        middleware: &[String],
    ) {
        self.graph.add(
            unit,
            UnitEntry::Mount {
                prefix: prefix.to_string(),
                target,
                middleware: middleware.to_vec(),
            },
        );
    }

    /// Mounts the router expression `arg` under `prefix`. Inline router chains get an
    /// anonymous unit of their own. With `allow_fn_path`, a bare path may name a function
    /// (`.configure(routes)`, `.service(index)`).
    pub(crate) fn mount<D: RouterDialect>(
        &mut self,
        dialect: &D,
        unit: &str,
        prefix: &str,
        arg: &Expr,
        middleware: &[String],
        allow_fn_path: bool,
    ) {
        let arg = strip(arg);
        if matches!(arg, Expr::MethodCall(_)) && has_router_method(dialect, arg) {
            let inline = self.anonymous_unit();
            dialect.analyze_chain(self, arg, &inline);
            self.add_mount(unit, prefix, MountTarget::Unit(inline), middleware);
        } else if let Some(target) = self.mount_target(arg, allow_fn_path) {
            self.add_mount(unit, prefix, target, middleware);
        } else {
            debug!("Cannot follow router expression in {}", self.function);
        }
    }

    /// Mounts the base of a chain unless it constructs a fresh router.
    pub(crate) fn mount_base(&mut self, base: &Expr, unit: &str) {
        if is_constructor(base) {
            return;
        }
        if let Some(target) = self.mount_target(base, false) {
            self.add_mount(unit, "", target, &[]);
        }
    }

    fn mount_target(&self, expr: &Expr, allow_fn_path: bool) -> Option<MountTarget> {
        let expr = strip(expr);
        match expr {
            Expr::Path(expr_path) => {
                let segments = path_segments(&expr_path.path);
                if let [single] = segments.as_slice() {
                    if self.locals.contains(single) {
                        return Some(MountTarget::Unit(self.local_unit(single)));
                    }
                }
                allow_fn_path.then(|| MountTarget::Function {
                    segments,
                    module: self.module.clone(),
                })
            }
            Expr::Call(expr_call) if !is_constructor(expr) => match strip(&expr_call.func) {
                Expr::Path(func) => Some(MountTarget::Function {
                    segments: path_segments(&func.path),
                    module: self.module.clone(),
                }),
                _ => None,
            },
            _ => None,
        }
    }
}

/// Collects the outermost router chains inside an expression.
struct ChainFinder<'ast, 'd, D: RouterDialect> {
    dialect: &'d D,
    chains: Vec<&'ast Expr>,
}

impl<'ast, D: RouterDialect> Visit<'ast> for ChainFinder<'ast, '_, D> {
    fn visit_expr(&mut self, expr: &'ast Expr) {
        if matches!(expr, Expr::MethodCall(_)) && has_router_method(self.dialect, expr) {
            self.chains.push(expr);
        } else {
            syn::visit::visit_expr(self, expr);
        }
    }

    // Nested items are functions of their own.
    fn visit_item(&mut self, _item: &'ast Item) {}
}

fn has_router_method<D: RouterDialect>(dialect: &D, expr: &Expr) -> bool {
    flatten_chain(expr)
        .1
        .iter()
        .any(|call| dialect.is_router_method(&call.method.to_string()))
}

/// Splits `base.a().b().c()` into `base` and the calls in source order.
pub(crate) fn flatten_chain(expr: &Expr) -> (&Expr, Vec<&ExprMethodCall>) {
    let mut calls = Vec::new();
    let mut current = strip(expr);

    while let Expr::MethodCall(method_call) = current {
        calls.push(method_call);
        current = strip(&method_call.receiver);
    }

    calls.reverse();
    (current, calls)
}

/// Peels parentheses, references, `?` and `.await`.
pub(crate) fn strip(expr: &Expr) -> &Expr {
    let mut current = expr;
    loop {
        current = match current {
            Expr::Paren(e) => &e.expr,
            Expr::Group(e) => &e.expr,
            Expr::Reference(e) => &e.expr,
            Expr::Try(e) => &e.expr,
            Expr::Await(e) => &e.base,
            _ => return current,
        };
    }
}

/// `Router::new()`, `App::new()`, `Router::default()`.
fn is_constructor(expr: &Expr) -> bool {
    match strip(expr) {
        Expr::Call(call) => match strip(&call.func) {
            Expr::Path(func) => matches!(
                func.path.segments.last().map(|s| s.ident.to_string()).as_deref(),
                Some("new") | Some("default")
            ),
            _ => false,
        },
        _ => false,
    }
}

fn pat_ident(pat: &Pat) -> Option<String> {
    match pat {
        Pat::Ident(pat_ident) => Some(pat_ident.ident.to_string()),
        Pat::Type(pat_type) => pat_ident(&pat_type.pat),
        _ => None,
    }
}

pub(crate) fn path_segments(path: &syn::Path) -> Vec<String> {
    path.segments.iter().map(|s| s.ident.to_string()).collect()
}

/// Last path segment of the function being called, if it is a plain path.
pub(crate) fn call_name(expr: &Expr) -> Option<String> {
    match strip(expr) {
        Expr::Call(call) => match strip(&call.func) {
            Expr::Path(func) => func.path.segments.last().map(|s| s.ident.to_string()),
            _ => None,
        },
        _ => None,
    }
}

/// Extract a string literal from an expression
pub(crate) fn string_literal(expr: &Expr) -> Option<String> {
    match strip(expr) {
        Expr::Lit(expr_lit) => match &expr_lit.lit {
            Lit::Str(lit_str) => Some(lit_str.value()),
            _ => None,
        },
        _ => None,
    }
}

pub(crate) fn handler_ref(expr: &Expr) -> HandlerRef {
    match strip(expr) {
        Expr::Path(expr_path) => HandlerRef::Path(path_segments(&expr_path.path)),
        _ => HandlerRef::Closure,
    }
}

/// Short identifier for a middleware expression: `Logger::default()` is `Logger`,
/// `from_fn(require_auth)` is `require_auth`.
pub(crate) fn middleware_name(expr: &Expr) -> Option<String> {
    match strip(expr) {
        Expr::Path(expr_path) => expr_path.path.segments.last().map(|s| s.ident.to_string()),
        Expr::Call(call) => {
            let Expr::Path(func) = strip(&call.func) else {
                return None;
            };
            let segments = path_segments(&func.path);
            let last = segments.last()?;

            if last.starts_with("from_fn") {
                return call.args.last().and_then(middleware_name);
            }

            let owner = segments
                .iter()
                .rev()
                .nth(1)
                .filter(|s| s.starts_with(|c: char| c.is_uppercase()));
            Some(owner.unwrap_or(last).clone())
        }
        Expr::MethodCall(method_call) => middleware_name(&method_call.receiver),
        Expr::Closure(_) => Some("Closure".to_string()),
        _ => None,
    }
}

/// Every identifier in an expression that names an HTTP method, e.g. in
/// `MethodFilter::GET.or(MethodFilter::POST)` or `guard::Post()`.
pub(crate) fn methods_named_in(expr: &Expr) -> Vec<HttpMethod> {
    struct Idents(Vec<HttpMethod>);

    impl<'ast> Visit<'ast> for Idents {
        fn visit_ident(&mut self, ident: &'ast syn::Ident) {
            if let Some(method) = HttpMethod::parse(&ident.to_string()) {
                if !self.0.contains(&method) {
                    self.0.push(method);
                }
            }
        }
    }

    let mut idents = Idents(Vec::new());
    idents.visit_expr(expr);
    idents.0
}

/// Join a module path and a name: items of the crate root are unqualified.
pub(crate) fn qualify(module: &str, name: &str) -> String {
    if module.is_empty() || module == "crate" {
        name.to_string()
    } else {
        format!("{}::{}", module, name)
    }
}

fn is_function_key(key: &str) -> bool {
    !key.contains('.') && !key.contains('#')
}

/// Combine a prefix and path, handling slashes correctly
pub(crate) fn combine_paths(prefix: &str, path: &str) -> String {
    if prefix.is_empty() {
        return path.to_string();
    }

    let prefix = prefix.trim_end_matches('/');
    let path = path.trim_start_matches('/');

    match (prefix.is_empty(), path.is_empty()) {
        (true, true) => "/".to_string(),
        (true, false) => format!("/{}", path),
        (false, true) => prefix.to_string(),
        (false, false) => format!("{}/{}", prefix, path),
    }
}
