//! apidocx - API documentation generated from a web application's registered routes.
//!
//! The routes come from a [`registry::RouteRegistry`]: either read statically out of an
//! Axum or Actix-Web project's sources, or loaded from a JSON route list. Each route is
//! described by its handler's doc comment, or else by an AI provider, and the result is
//! rendered as Markdown, OpenAPI 3.0, a Postman collection and a ReDoc HTML page.
//!
//! # Architecture
//!
//! 1. [`scanner`], [`parser`], [`detector`] and [`extractor`] read a project's routes and
//!    build the [`handler_index`] of doc comments
//! 2. [`registry`] exposes those routes (or a route list) behind one trait
//! 3. [`collector`] keeps the `api` routes and normalizes them
//! 4. [`summary`] and [`ai`] describe each route, memoized by [`cache`]
//! 5. [`formatter`] and [`serializer`] render and write the artifacts
//! 6. [`pipeline`], [`watch`] and [`cli`] drive a run
//!
//! # Example Usage
//!
//! ```no_run
//! use apidocx::config::Config;
//! use apidocx::pipeline::{Pipeline, RunOptions};
//! use apidocx::registry::SourceRegistry;
//! use std::path::Path;
//!
//! let project = Path::new("./my-project");
//! let registry = SourceRegistry::load(project, None).unwrap();
//!
//! let mut config = Config::default().resolve(project);
//! config.enable_ai = false;
//!
//! let report = Pipeline::new(config, RunOptions::default()).run(&registry).unwrap();
//! println!("Documented {} routes", report.routes);
//! ```
//!
//! # Command-Line Interface
//!
//! For command-line usage, see the [`cli`] module.

pub mod ai;
pub mod cache;
pub mod cli;
pub mod collector;
pub mod config;
pub mod detector;
pub mod error;
pub mod extractor;
pub mod formatter;
pub mod handler_index;
pub mod model;
pub mod naming;
pub mod parser;
pub mod pipeline;
pub mod registry;
pub mod scanner;
pub mod serializer;
pub mod summary;
pub mod watch;
