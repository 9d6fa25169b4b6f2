use anyhow::{Context, Result};
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// AST (Abstract Syntax Tree) parser for Rust source files.
///
/// The `AstParser` uses the `syn` crate to parse Rust source code into an abstract syntax tree,
/// which the route extractors and the handler index then walk.
///
/// # Example
///
/// ```no_run
/// use apidocx::parser::AstParser;
/// use std::path::Path;
///
/// let parsed = AstParser::parse_file(Path::new("src/main.rs")).unwrap();
/// println!("Parsed {} items in {}", parsed.syntax_tree.items.len(), parsed.module_path());
/// ```
pub struct AstParser;

/// A successfully parsed Rust file with its abstract syntax tree.
///
/// Contains both the original file path and the parsed syntax tree structure.
#[derive(Debug)]
pub struct ParsedFile {
    /// Path to the source file
    pub path: PathBuf,
    /// The parsed abstract syntax tree
    pub syntax_tree: syn::File,
}

impl ParsedFile {
    /// Parses in-memory source, attributing it to `path`.
    pub fn from_source(path: impl Into<PathBuf>, source: &str) -> Result<Self> {
        let path = path.into();
        let syntax_tree = syn::parse_file(source)
            .with_context(|| format!("Failed to parse Rust syntax in file: {}", path.display()))?;

        Ok(ParsedFile { path, syntax_tree })
    }

    /// Module path of this file inside its crate.
    ///
    /// The path is taken relative to the last `src` directory: `src/main.rs` and
    /// `src/lib.rs` are `crate`, `src/handlers/mod.rs` is `handlers`, and
    /// `src/handlers/users.rs` is `handlers::users`. Files outside a `src`
    /// directory are named after their file stem.
    pub fn module_path(&self) -> String {
        let components: Vec<String> = self
            .path
            .components()
            .map(|c| c.as_os_str().to_string_lossy().to_string())
            .collect();

        let relative: Vec<String> = match components.iter().rposition(|c| c == "src") {
            Some(idx) => components[idx + 1..].to_vec(),
            None => components.last().cloned().into_iter().collect(),
        };

        let mut segments: Vec<String> = relative
            .into_iter()
            .map(|s| s.strip_suffix(".rs").map(str::to_string).unwrap_or(s))
            .collect();

        if segments.last().map(String::as_str) == Some("mod") {
            segments.pop();
        }

        match segments.as_slice() {
            [] => "crate".to_string(),
            [only] if only == "main" || only == "lib" => "crate".to_string(),
            _ => segments.join("::"),
        }
    }
}

impl AstParser {
    /// Parses a single Rust source file into an AST.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The file contains invalid Rust syntax
    pub fn parse_file(path: &Path) -> Result<ParsedFile> {
        debug!("Parsing file: {}", path.display());

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?;

        let parsed = ParsedFile::from_source(path, &content)?;
        debug!("Successfully parsed file: {}", path.display());

        Ok(parsed)
    }

    /// Parses multiple Rust source files, continuing even if some fail.
    ///
    /// Files that fail to parse are logged as warnings, but parsing continues for remaining
    /// files, so documentation can still be produced for the rest of the project.
    ///
    /// # Returns
    ///
    /// Returns a vector of `Result<ParsedFile>`, one for each input path, in input order.
    pub fn parse_files(paths: &[PathBuf]) -> Vec<Result<ParsedFile>> {
        debug!("Parsing {} files", paths.len());

        let results: Vec<Result<ParsedFile>> = paths
            .iter()
            .map(|path| {
                Self::parse_file(path).map_err(|e| {
                    warn!("Failed to parse {}: {}", path.display(), e);
                    e
                })
            })
            .collect();

        let success_count = results.iter().filter(|r| r.is_ok()).count();
        debug!(
            "Parsing complete: {} succeeded, {} failed",
            success_count,
            results.len() - success_count
        );

        results
    }
}
