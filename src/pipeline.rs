//! One documentation run: collect routes, describe them, render every requested
//! format and write the artifacts.

use crate::ai::advanced::AdvancedAiGenerator;
use crate::ai::generator::AiDocGenerator;
use crate::ai::openai::{OpenAiClient, OpenAiConfig};
use crate::ai::{AiClient, NoopAiClient};
use crate::cache::DescriptionCache;
use crate::collector::RouteCollector;
use crate::config::Config;
use crate::detector::Framework;
use crate::formatter::{render, DocFormat, DocumentInfo};
use crate::model::{DocumentationEntry, RouteRecord};
use crate::registry::{ManifestRegistry, RouteRegistry, SourceRegistry};
use crate::serializer::write_to_file;
use crate::summary::SummaryExtractor;
use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Where routes are read from.
#[derive(Debug, Clone)]
pub enum RegistrySource {
    /// Rust sources under a project directory
    Sources {
        project: PathBuf,
        framework: Option<Framework>,
    },
    /// A JSON route list
    Manifest(PathBuf),
}

impl RegistrySource {
    /// Builds a fresh registry. Called once per run so that watch mode sees edits.
    pub fn load(&self) -> Result<Box<dyn RouteRegistry>> {
        match self {
            RegistrySource::Sources { project, framework } => {
                Ok(Box::new(SourceRegistry::load(project, *framework)?))
            }
            RegistrySource::Manifest(path) => {
                info!("Reading route manifest: {}", path.display());
                Ok(Box::new(ManifestRegistry::load(path)?))
            }
        }
    }

    /// Paths whose modification should trigger a new run.
    pub fn watched_paths(&self) -> Vec<PathBuf> {
        match self {
            RegistrySource::Sources { project, .. } => vec![project.clone()],
            RegistrySource::Manifest(path) => vec![path.clone()],
        }
    }
}

/// Per-invocation choices that are not part of the configuration file.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub formats: Vec<DocFormat>,
    /// Single-format artifact path, or the directory receiving every format
    pub output: Option<PathBuf>,
    pub advanced: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            formats: DocFormat::ALL.to_vec(),
            output: None,
            advanced: false,
        }
    }
}

/// What a run produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub routes: usize,
    pub artifacts: Vec<(DocFormat, PathBuf)>,
}

pub struct Pipeline {
    config: Config,
    options: RunOptions,
    generator: AiDocGenerator,
    advanced: AdvancedAiGenerator,
}

impl Pipeline {
    /// Pipeline with the AI provider named by the configuration.
    pub fn new(config: Config, options: RunOptions) -> Self {
        let client = client_for(&config);
        Self::with_client(config, options, client)
    }

    pub fn with_client(config: Config, options: RunOptions, client: Arc<dyn AiClient>) -> Self {
        let cache = DescriptionCache::new(config.cache.store_path.clone(), config.cache.enabled);
        let generator = AiDocGenerator::new(client.clone(), cache.clone(), config.enable_ai);
        let advanced = AdvancedAiGenerator::new(client, cache, config.enable_ai);

        Self {
            config,
            options,
            generator,
            advanced,
        }
    }

    /// Runs once against `registry`. An empty route set writes nothing.
    ///
    /// # Errors
    ///
    /// Fails only when an artifact cannot be rendered or written.
    pub fn run(&self, registry: &dyn RouteRegistry) -> Result<RunReport> {
        let entries = self.document(registry);
        if entries.is_empty() {
            info!("No API routes found.");
            return Ok(RunReport::default());
        }

        info!("Found {} API routes. Generating documentation...", entries.len());

        let info = DocumentInfo {
            title: self.config.title.clone(),
            base_url: self.config.base_url.clone(),
        };

        let mut artifacts = Vec::new();
        for format in &self.options.formats {
            let path = self.output_path(*format);
            let content = render(*format, &entries, &info, &path)
                .with_context(|| format!("Failed to render {} documentation", format))?;
            write_to_file(&content, &path)?;
            info!("{} documentation generated: {}", format, path.display());
            artifacts.push((*format, path));
        }

        Ok(RunReport {
            routes: entries.len(),
            artifacts,
        })
    }

    /// Documentation entries for every collected route, in registry order.
    pub fn document(&self, registry: &dyn RouteRegistry) -> Vec<DocumentationEntry> {
        let records = RouteCollector::new(registry).collect();
        let summaries = SummaryExtractor::new(registry.handler_index());

        let mut entries: Vec<DocumentationEntry> = records
            .iter()
            .map(|record| DocumentationEntry::new(record, self.describe(record, &summaries)))
            .collect();

        if self.options.advanced && self.advanced.is_enabled() {
            info!("Generating advanced AI documentation...");
            for (entry, record) in entries.iter_mut().zip(&records) {
                let bundle = self.advanced.generate_comprehensive_docs(record);
                if !bundle.description.trim().is_empty() {
                    entry.description = bundle.description.clone();
                }
                entry.advanced = Some(bundle);
            }
        }

        entries
    }

    fn describe(&self, record: &RouteRecord, summaries: &SummaryExtractor<'_>) -> Option<String> {
        let (Some(controller), Some(method)) = (&record.controller, &record.method) else {
            return None;
        };

        if let Some(summary) = summaries.extract_summary(controller, method) {
            debug!("Using doc comment for {}@{}", controller, method);
            return Some(summary);
        }

        if !self.generator.is_enabled() {
            return None;
        }
        Some(self.generator.generate(record)).filter(|d| !d.trim().is_empty())
    }

    /// Artifact path for `format`.
    ///
    /// An explicit output names the file when a single format is requested and the
    /// directory for the default file names otherwise.
    pub fn output_path(&self, format: DocFormat) -> PathBuf {
        match &self.options.output {
            Some(output) if self.options.formats.len() == 1 => output.clone(),
            Some(dir) => dir.join(default_file_name(format)),
            None => match format {
                DocFormat::Markdown => self.config.output.clone(),
                DocFormat::OpenApi => self.config.openapi_output.clone(),
                DocFormat::Postman => self.config.postman_output.clone(),
                DocFormat::Redoc => self.config.redoc_output.clone(),
            },
        }
    }
}

pub fn default_file_name(format: DocFormat) -> &'static str {
    match format {
        DocFormat::Markdown => "api.md",
        DocFormat::OpenApi => "api.json",
        DocFormat::Postman => "api.postman.json",
        DocFormat::Redoc => "api.html",
    }
}

/// Provider for the configured `ai.provider`; the no-op client when AI is off, the
/// provider is unknown, or no API key is available.
pub fn client_for(config: &Config) -> Arc<dyn AiClient> {
    if !config.enable_ai {
        return Arc::new(NoopAiClient);
    }

    match config.ai.provider.as_str() {
        "openai" if config.ai.api_key.is_some() => Arc::new(OpenAiClient::new(OpenAiConfig {
            api_key: config.ai.api_key.clone(),
            endpoint: config.ai.endpoint().to_string(),
            model: config.ai.model.clone(),
            timeout: config.ai.timeout(),
        })),
        "openai" => {
            warn!("OpenAI API key is missing; AI descriptions are disabled");
            Arc::new(NoopAiClient)
        }
        other => {
            warn!("Unsupported AI provider {:?}; AI descriptions are disabled", other);
            Arc::new(NoopAiClient)
        }
    }
}

/// Loads a fresh registry from `source` and runs `pipeline` against it.
pub fn run_from(source: &RegistrySource, pipeline: &Pipeline) -> Result<RunReport> {
    let registry = source.load()?;
    pipeline.run(registry.as_ref())
}

/// Resolves the output argument against the working directory.
pub fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    }
}
