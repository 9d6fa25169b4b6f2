use axum::{
    extract::Path,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;

#[derive(Serialize, Deserialize)]
struct User {
    id: u32,
    name: String,
}

/// Lists every user.
///
/// Results are ordered by id.
async fn list_users() -> Json<Vec<User>> {
    Json(vec![])
}

/// Creates a user.
async fn create_user(Json(user): Json<User>) -> (StatusCode, Json<User>) {
    (StatusCode::CREATED, Json(user))
}

/// Shows a single user.
async fn show_user(Path(id): Path<u32>) -> Json<User> {
    Json(User { id, name: String::new() })
}

async fn update_user(Path(id): Path<u32>, Json(user): Json<User>) -> Json<User> {
    Json(User { id, ..user })
}

/// Deletes a user.
async fn delete_user(Path(_id): Path<u32>) -> StatusCode {
    StatusCode::NO_CONTENT
}

/// Reports liveness.
async fn health_check() -> &'static str {
    "ok"
}

fn user_routes() -> Router {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/:id", get(show_user).put(update_user).delete(delete_user))
}

fn app() -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/users", user_routes())
        .route("/api/ping", post(|| async { "pong" }))
        .layer(TraceLayer::new_for_http())
}

#[tokio::main]
async fn main() {
    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
    axum::serve(listener, app()).await.unwrap();
}
