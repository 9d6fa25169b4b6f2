// Handlers and routers spread over several modules resolve to the module that defines them
use apidocx::collector::RouteCollector;
use apidocx::detector::Framework;
use apidocx::parser::ParsedFile;
use apidocx::registry::{RouteRegistry, SourceRegistry};
use apidocx::summary::SummaryExtractor;

fn parse(path: &str, code: &str) -> ParsedFile {
    ParsedFile::from_source(path, code).expect("Failed to parse source")
}

#[test]
fn test_cross_file_handler_resolution() {
    let main = parse(
        "src/main.rs",
        r#"
        use axum::Router;

        mod posts;
        mod users;

        fn app() -> Router {
            Router::new()
                .nest("/api/users", users::routes())
                .nest("/api/posts", crate::posts::routes())
        }
    "#,
    );

    let users = parse(
        "src/users.rs",
        r#"
        use axum::{routing::get, Router};

        /// Lists users.
        pub async fn index() -> &'static str { "users" }

        pub fn routes() -> Router {
            Router::new().route("/", get(index))
        }
    "#,
    );

    let posts = parse(
        "src/posts.rs",
        r#"
        use axum::{routing::get, Router};

        /// Lists posts.
        pub async fn index() -> &'static str { "posts" }

        /// Shows a post.
        async fn show() -> &'static str { "post" }

        pub fn routes() -> Router {
            Router::new()
                .route("/", get(index))
                .route("/:slug", get(show))
        }
    "#,
    );

    let registry = SourceRegistry::from_parsed(&[main, users, posts], &[Framework::Axum]);

    let actions: Vec<(&str, &str)> = registry
        .routes()
        .iter()
        .map(|r| (r.uri.as_str(), r.action.as_str()))
        .collect();
    assert_eq!(
        actions,
        vec![
            ("api/users", "users@index"),
            ("api/posts", "posts@index"),
            ("api/posts/{slug}", "posts@show"),
        ]
    );

    let records = RouteCollector::new(&registry).collect();
    let summaries = SummaryExtractor::new(registry.handler_index());
    let described: Vec<Option<String>> = records
        .iter()
        .map(|r| {
            let controller = r.controller.as_deref().unwrap();
            summaries.extract_summary(controller, r.method.as_deref().unwrap())
        })
        .collect();

    assert_eq!(
        described,
        vec![
            Some("Lists users.".to_string()),
            Some("Lists posts.".to_string()),
            Some("Shows a post.".to_string()),
        ]
    );
}
