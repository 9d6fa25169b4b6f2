//! Route registries: where the routes to document come from.
//!
//! [`SourceRegistry`] reads them out of a Rust project's sources, [`ManifestRegistry`]
//! out of a JSON route list (the `route:list --json` shape), and [`MemoryRegistry`]
//! holds a list built in code.

use crate::detector::{Framework, FrameworkDetector};
use crate::error::{Error, Result as ManifestResult};
use crate::extractor::actix::ActixExtractor;
use crate::extractor::axum::AxumExtractor;
use crate::extractor::{HandlerRef, RouteExtractor, RouteInfo};
use crate::handler_index::HandlerIndex;
use crate::model::{HttpMethod, RegisteredRoute};
use crate::parser::{AstParser, ParsedFile};
use crate::scanner::FileScanner;
use anyhow::{bail, Result};
use log::{debug, info, warn};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Source of registered routes and of the handler documentation behind them.
pub trait RouteRegistry {
    /// Every registered route, in registration order.
    fn routes(&self) -> &[RegisteredRoute];

    /// Doc-comment lookup for the handlers the routes point at.
    fn handler_index(&self) -> &HandlerIndex;
}

/// Routes extracted from the Rust sources of a project.
#[derive(Debug)]
pub struct SourceRegistry {
    routes: Vec<RegisteredRoute>,
    index: HandlerIndex,
    frameworks: Vec<Framework>,
}

impl SourceRegistry {
    /// Scans, parses and extracts routes from the project at `project`.
    ///
    /// `framework` skips detection and forces a single extractor.
    ///
    /// # Errors
    ///
    /// Fails when the directory cannot be scanned, holds no Rust file, no file parses,
    /// or no supported framework is detected.
    pub fn load(project: &Path, framework: Option<Framework>) -> Result<Self> {
        info!("Scanning project directory: {}", project.display());
        let scan_result = FileScanner::new(project.to_path_buf()).scan()?;

        info!("Found {} Rust files", scan_result.files.len());
        if scan_result.files.is_empty() {
            bail!("No Rust files found in {}", project.display());
        }

        let parsed_files: Vec<ParsedFile> = AstParser::parse_files(&scan_result.files)
            .into_iter()
            .filter_map(|result| match result {
                Ok(parsed) => Some(parsed),
                Err(e) => {
                    debug!("Skipping file due to parse error: {}", e);
                    None
                }
            })
            .collect();

        info!("Successfully parsed {} files", parsed_files.len());
        if parsed_files.is_empty() {
            bail!("No files could be parsed successfully");
        }

        let frameworks = match framework {
            Some(framework) => {
                info!("Using user-specified framework: {:?}", framework);
                vec![framework]
            }
            None => {
                let detected = FrameworkDetector::detect(&parsed_files).frameworks;
                if detected.is_empty() {
                    bail!(
                        "No supported web framework detected. Please specify a framework using --framework option.\n\
                         Supported frameworks: axum, actix-web"
                    );
                }
                info!("Detected frameworks: {:?}", detected);
                detected
            }
        };

        Ok(Self::from_parsed(&parsed_files, &frameworks))
    }

    /// Builds the registry from already parsed files.
    pub fn from_parsed(parsed_files: &[ParsedFile], frameworks: &[Framework]) -> Self {
        let index = HandlerIndex::from_files(parsed_files);

        let extracted: Vec<RouteInfo> = frameworks
            .iter()
            .flat_map(|framework| {
                let extractor: Box<dyn RouteExtractor> = match framework {
                    Framework::Axum => Box::new(AxumExtractor),
                    Framework::ActixWeb => Box::new(ActixExtractor),
                };
                extractor.extract_routes(parsed_files)
            })
            .collect();

        let mut seen = HashSet::new();
        let routes: Vec<RegisteredRoute> = extracted
            .iter()
            .map(|route| registered_route(route, &index))
            .filter(|route| {
                seen.insert((route.uri.clone(), route.methods.clone(), route.action.clone()))
            })
            .collect();

        info!("Extracted {} routes", routes.len());

        Self {
            routes,
            index,
            frameworks: frameworks.to_vec(),
        }
    }

    /// Frameworks whose extractors ran.
    pub fn frameworks(&self) -> &[Framework] {
        &self.frameworks
    }
}

impl RouteRegistry for SourceRegistry {
    fn routes(&self) -> &[RegisteredRoute] {
        &self.routes
    }

    fn handler_index(&self) -> &HandlerIndex {
        &self.index
    }
}

fn registered_route(route: &RouteInfo, index: &HandlerIndex) -> RegisteredRoute {
    let mut methods: Vec<HttpMethod> = Vec::new();
    for method in &route.methods {
        if !methods.contains(method) {
            methods.push(*method);
        }
    }

    RegisteredRoute {
        uri: normalize_uri(&route.path),
        methods,
        name: route.name.clone(),
        action: action_for(&route.handler, &route.module, index),
        middleware: route.middleware.clone(),
    }
}

/// Framework path to registry uri: `/users/:id/` becomes `users/{id}`, `/files/*rest`
/// becomes `files/{rest}`, `/items/{id:\d+}` becomes `items/{id}`, and the root is `/`.
pub fn normalize_uri(path: &str) -> String {
    let segments: Vec<String> = path
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            if let Some(name) = segment.strip_prefix(':').or_else(|| segment.strip_prefix('*')) {
                return format!("{{{}}}", name);
            }
            match segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                Some(inner) => {
                    let inner = inner.trim_start_matches('*');
                    let name = inner.split(':').next().unwrap_or(inner);
                    format!("{{{}}}", name)
                }
                None => segment.to_string(),
            }
        })
        .collect();

    if segments.is_empty() {
        "/".to_string()
    } else {
        segments.join("/")
    }
}

/// Action string for a handler: `Owner@method` for method and module paths, the type
/// name for invokable types, `<module>@fn` for bare functions and `Closure` otherwise.
/// Unresolvable bare names are kept as they are.
pub fn action_for(handler: &HandlerRef, module: &str, index: &HandlerIndex) -> String {
    let HandlerRef::Path(segments) = handler else {
        return "Closure".to_string();
    };

    let segments: Vec<&str> = segments
        .iter()
        .map(String::as_str)
        .filter(|s| !matches!(*s, "crate" | "self" | "super"))
        .collect();

    let joined = segments.join("::");
    if !joined.is_empty() && index.is_known_type(&joined) {
        return joined;
    }

    match segments.as_slice() {
        [] => "Closure".to_string(),
        [name] => match index.function_module(name, module) {
            Some(owner) => format!("{}@{}", owner, name),
            None => {
                debug!("Unknown handler: {}", name);
                name.to_string()
            }
        },
        [owner @ .., method] => format!("{}@{}", owner.join("::"), method),
    }
}

/// Routes read from a JSON route list.
#[derive(Debug)]
pub struct ManifestRegistry {
    routes: Vec<RegisteredRoute>,
    index: HandlerIndex,
}

#[derive(Debug, Deserialize)]
struct ManifestEntry {
    method: String,
    uri: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    action: Option<String>,
    #[serde(default)]
    middleware: Option<Middleware>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Middleware {
    One(String),
    Many(Vec<String>),
}

impl ManifestRegistry {
    /// Reads a route list file.
    pub fn load(path: &Path) -> ManifestResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| Error::Manifest {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        Self::from_json(&content).map_err(|e| Error::Manifest {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Parses a route list:
    /// `[{"method": "GET|HEAD", "uri": ..., "name": ..., "action": ..., "middleware": ...}]`.
    pub fn from_json(content: &str) -> serde_json::Result<Self> {
        let entries: Vec<ManifestEntry> = serde_json::from_str(content)?;
        let mut index = HandlerIndex::new();

        let routes: Vec<RegisteredRoute> = entries
            .into_iter()
            .map(|entry| {
                let methods: Vec<HttpMethod> = entry
                    .method
                    .split('|')
                    .filter_map(|token| {
                        let parsed = HttpMethod::parse(token);
                        if parsed.is_none() {
                            warn!("Ignoring unknown method {:?} for {}", token, entry.uri);
                        }
                        parsed
                    })
                    .collect();

                let action = entry
                    .action
                    .filter(|a| !a.trim().is_empty())
                    .unwrap_or_else(|| "Closure".to_string());
                match action.split_once('@') {
                    Some((owner, rest)) => {
                        index.register(owner, rest.split('@').next().unwrap_or(rest), "")
                    }
                    None if action != "Closure" => index.register_type(&action),
                    None => {}
                }

                let middleware = match entry.middleware {
                    Some(Middleware::One(m)) => vec![m],
                    Some(Middleware::Many(list)) => list,
                    None => Vec::new(),
                };

                RegisteredRoute {
                    uri: normalize_uri(&entry.uri),
                    methods,
                    name: entry.name.filter(|n| !n.is_empty()),
                    action,
                    middleware,
                }
            })
            .collect();

        info!("Loaded {} routes from manifest", routes.len());
        Ok(Self { routes, index })
    }
}

impl RouteRegistry for ManifestRegistry {
    fn routes(&self) -> &[RegisteredRoute] {
        &self.routes
    }

    fn handler_index(&self) -> &HandlerIndex {
        &self.index
    }
}

/// A registry assembled in code.
#[derive(Debug, Default)]
pub struct MemoryRegistry {
    routes: Vec<RegisteredRoute>,
    index: HandlerIndex,
}

impl MemoryRegistry {
    pub fn new(routes: Vec<RegisteredRoute>, index: HandlerIndex) -> Self {
        Self { routes, index }
    }
}

impl RouteRegistry for MemoryRegistry {
    fn routes(&self) -> &[RegisteredRoute] {
        &self.routes
    }

    fn handler_index(&self) -> &HandlerIndex {
        &self.index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_normalize_uri() {
        assert_eq!(normalize_uri("/api/users/:id/"), "api/users/{id}");
        assert_eq!(normalize_uri("/files/*rest"), "files/{rest}");
        assert_eq!(normalize_uri("/items/{id:\\d+}"), "items/{id}");
        assert_eq!(normalize_uri("/assets/{*path}"), "assets/{path}");
        assert_eq!(normalize_uri("/"), "/");
        assert_eq!(normalize_uri(""), "/");
    }

    #[test]
    fn test_action_for_handler_shapes() {
        let mut index = HandlerIndex::new();
        index.register_function("handlers::users", "list_users", "");
        index.register_type("PingHandler");

        let path =
            |segments: &[&str]| HandlerRef::Path(segments.iter().map(|s| s.to_string()).collect());

        assert_eq!(
            action_for(&path(&["list_users"]), "crate", &index),
            "handlers::users@list_users"
        );
        assert_eq!(
            action_for(&path(&["UserController", "index"]), "crate", &index),
            "UserController@index"
        );
        assert_eq!(action_for(&path(&["crate", "users", "show"]), "crate", &index), "users@show");
        assert_eq!(action_for(&path(&["PingHandler"]), "crate", &index), "PingHandler");
        assert_eq!(action_for(&path(&["mystery"]), "crate", &index), "mystery");
        assert_eq!(action_for(&HandlerRef::Closure, "crate", &index), "Closure");
    }

    #[test]
    fn test_source_registry_from_axum_sources() {
        let parsed = ParsedFile::from_source(
            "src/main.rs",
            r#"
            use axum::{Router, routing::get};

            struct UserController;

            impl UserController {
                /// Lists users.
                async fn index() {}
            }

            /// Health check.
            async fn health() {}

            fn app() -> Router {
                Router::new()
                    .route("/api/users/", get(UserController::index))
                    .route("/api/users/", get(UserController::index))
                    .route("/health", get(health))
            }
        "#,
        )
        .unwrap();

        let registry = SourceRegistry::from_parsed(&[parsed], &[Framework::Axum]);

        assert_eq!(
            registry.routes().to_vec(),
            vec![
                RegisteredRoute {
                    uri: "api/users".to_string(),
                    methods: vec![HttpMethod::Get, HttpMethod::Head],
                    name: None,
                    action: "UserController@index".to_string(),
                    middleware: Vec::new(),
                },
                RegisteredRoute {
                    uri: "health".to_string(),
                    methods: vec![HttpMethod::Get, HttpMethod::Head],
                    name: None,
                    action: "crate@health".to_string(),
                    middleware: Vec::new(),
                },
            ]
        );
        assert_eq!(
            registry.handler_index().doc_comment("UserController", "index"),
            Some(" Lists users.")
        );
        assert_eq!(registry.frameworks(), &[Framework::Axum]);
    }

    #[test]
    fn test_source_registry_load_errors() {
        let temp_dir = TempDir::new().unwrap();
        assert!(SourceRegistry::load(temp_dir.path(), None).is_err());

        fs::write(temp_dir.path().join("main.rs"), "fn main() {}").unwrap();
        let err = SourceRegistry::load(temp_dir.path(), None).unwrap_err();
        assert!(err.to_string().contains("No supported web framework detected"));

        let registry = SourceRegistry::load(temp_dir.path(), Some(Framework::Axum)).unwrap();
        assert!(registry.routes().is_empty());
    }

    #[test]
    fn test_manifest_registry() {
        let registry = ManifestRegistry::from_json(
            r#"[
                {"method": "GET|HEAD", "uri": "api/users", "name": "users.index",
                 "action": "App\\Http\\Controllers\\UserController@index", "middleware": ["api"]},
                {"method": "POST", "uri": "api/ping", "name": null,
                 "action": "App\\Http\\Controllers\\PingController", "middleware": "api"},
                {"method": "GET|HEAD", "uri": "/", "action": "Closure"}
            ]"#,
        )
        .unwrap();

        let routes = registry.routes();
        assert_eq!(routes.len(), 3);
        assert_eq!(routes[0].methods, vec![HttpMethod::Get, HttpMethod::Head]);
        assert_eq!(routes[0].name.as_deref(), Some("users.index"));
        assert_eq!(routes[1].middleware, vec!["api".to_string()]);
        assert_eq!(routes[2].uri, "/");
        assert_eq!(routes[2].action, "Closure");

        let index = registry.handler_index();
        assert!(index.is_known_type("App\\Http\\Controllers\\PingController"));
        assert_eq!(
            index.doc_comment("App\\Http\\Controllers\\UserController", "index"),
            Some("")
        );
    }

    #[test]
    fn test_manifest_registry_load_reports_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("routes.json");
        fs::write(&path, "{not json").unwrap();

        let err = ManifestRegistry::load(&path).unwrap_err();
        assert!(matches!(err, Error::Manifest { .. }));
        assert!(err.to_string().contains("routes.json"));
        assert!(ManifestRegistry::load(&temp_dir.path().join("missing.json")).is_err());
    }
}
