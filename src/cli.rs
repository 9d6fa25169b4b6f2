use crate::config::Config;
use crate::detector::Framework;
use crate::formatter::DocFormat;
use crate::pipeline::{absolute, run_from, Pipeline, RegistrySource, RunOptions};
use crate::watch::Watcher;
use anyhow::Result;
use clap::{Parser, ValueEnum};
use log::{debug, info};
use std::path::PathBuf;

/// apidocx - Generate Markdown, OpenAPI, Postman and HTML documentation for a web API
#[derive(Parser, Debug)]
#[command(name = "apidocx")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Path to the project directory
    #[arg(value_name = "PROJECT_PATH", default_value = ".")]
    pub project_path: PathBuf,

    /// Output format
    #[arg(short = 'f', long = "format", value_enum, default_value = "all")]
    pub format: FormatArg,

    /// Artifact path for a single format, or the target directory with `--format all`
    #[arg(short = 'o', long = "output", value_name = "PATH")]
    pub output_path: Option<PathBuf>,

    /// Generate advanced AI documentation with parameters, examples and error responses
    #[arg(long)]
    pub advanced: bool,

    /// Watch for changes and regenerate automatically
    #[arg(long)]
    pub watch: bool,

    /// Specify the web framework to parse (if not specified, auto-detect)
    #[arg(short = 'w', long = "framework", value_enum)]
    pub framework: Option<Framework>,

    /// Read routes from a JSON route list instead of the project's sources
    #[arg(long = "routes", value_name = "FILE")]
    pub routes: Option<PathBuf>,

    /// Configuration file (default: PROJECT_PATH/apidocx.toml when present)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Never call the AI provider
    #[arg(long = "no-ai")]
    pub no_ai: bool,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    /// Markdown reference
    Markdown,
    /// OpenAPI 3.0 document (YAML when the output ends in .yaml or .yml)
    Openapi,
    /// Postman collection v2.1
    Postman,
    /// ReDoc HTML page
    Redoc,
    /// Every format
    All,
}

impl FormatArg {
    pub fn formats(self) -> Vec<DocFormat> {
        match self {
            FormatArg::Markdown => vec![DocFormat::Markdown],
            FormatArg::Openapi => vec![DocFormat::OpenApi],
            FormatArg::Postman => vec![DocFormat::Postman],
            FormatArg::Redoc => vec![DocFormat::Redoc],
            FormatArg::All => DocFormat::ALL.to_vec(),
        }
    }
}

/// Validate and log already-parsed arguments
pub fn parse_args_from_parsed(args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: {:?}", args);

    if !args.project_path.exists() {
        anyhow::bail!(
            "Project path does not exist: {}",
            args.project_path.display()
        );
    }

    if !args.project_path.is_dir() {
        anyhow::bail!(
            "Project path is not a directory: {}",
            args.project_path.display()
        );
    }

    info!("Project path: {}", args.project_path.display());
    info!("Output format: {:?}", args.format);
    if let Some(ref output) = args.output_path {
        info!("Output: {}", output.display());
    }
    match (&args.routes, &args.framework) {
        (Some(routes), _) => info!("Routes: {}", routes.display()),
        (None, Some(framework)) => info!("Framework: {:?}", framework),
        (None, None) => info!("Framework: auto-detect"),
    }

    Ok(args)
}

/// Run the main workflow
pub fn run(args: CliArgs) -> Result<()> {
    let project = args.project_path.clone();

    let mut config = Config::load(&project, args.config.as_deref())?.resolve(&project);
    if args.no_ai {
        config.enable_ai = false;
    }
    debug!("Effective configuration: {:?}", config);

    let source = match &args.routes {
        Some(routes) => RegistrySource::Manifest(absolute(routes)),
        None => RegistrySource::Sources {
            project: project.clone(),
            framework: args.framework,
        },
    };

    let options = RunOptions {
        formats: args.format.formats(),
        output: args.output_path.as_deref().map(absolute),
        advanced: args.advanced,
    };

    // Configured paths and manifests point at non-Rust sources
    let any_file = !config.watch.paths.is_empty() || args.routes.is_some();
    let watch_paths = if config.watch.paths.is_empty() {
        source.watched_paths()
    } else {
        config.watch.paths.clone()
    };
    let interval = config.watch.interval();
    let cache_path = config.cache.store_path.clone();
    let pipeline = Pipeline::new(config, options);

    if args.watch {
        let mut ignored: Vec<PathBuf> = args
            .format
            .formats()
            .into_iter()
            .map(|format| pipeline.output_path(format))
            .collect();
        ignored.push(cache_path);

        let watcher = Watcher::new(watch_paths, interval).ignoring(ignored);
        let mut watcher = if any_file { watcher.any_file() } else { watcher };
        watcher.run(|| run_from(&source, &pipeline));
    }

    let report = run_from(&source, &pipeline)?;

    info!("Generation complete!");
    info!("Summary:");
    info!("  - Routes documented: {}", report.routes);
    for (format, path) in &report.artifacts {
        info!("  - {}: {}", format, path.display());
    }

    Ok(())
}
