use crate::parser::ParsedFile;
use clap::ValueEnum;
use log::debug;
use std::collections::BTreeSet;
use syn::{Item, UseTree};

/// Web frameworks whose route definitions can be read from source.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Framework {
    /// Axum framework
    Axum,
    /// Actix-Web framework
    #[value(name = "actix-web")]
    ActixWeb,
}

impl Framework {
    /// Crate name as it appears in `use` statements.
    fn crate_ident(&self) -> &'static str {
        match self {
            Framework::Axum => "axum",
            Framework::ActixWeb => "actix_web",
        }
    }

    fn from_crate_ident(ident: &str) -> Option<Self> {
        [Framework::Axum, Framework::ActixWeb]
            .into_iter()
            .find(|f| f.crate_ident() == ident)
    }
}

/// Framework detector for identifying web frameworks used in a Rust project.
///
/// The `FrameworkDetector` examines `use` statements for framework-specific imports.
///
/// Currently supports detection of:
/// - Axum (via `use axum::...`)
/// - Actix-Web (via `use actix_web::...`)
pub struct FrameworkDetector;

/// Result of framework detection.
pub struct DetectionResult {
    /// Detected frameworks, in a stable order
    pub frameworks: Vec<Framework>,
}

impl FrameworkDetector {
    /// Detects web frameworks used in the provided parsed files.
    ///
    /// Multiple frameworks can be detected if the project uses more than one.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use apidocx::detector::FrameworkDetector;
    /// use apidocx::parser::AstParser;
    /// use std::path::Path;
    ///
    /// let parsed = AstParser::parse_file(Path::new("src/main.rs")).unwrap();
    /// let result = FrameworkDetector::detect(&[parsed]);
    /// println!("Detected {} framework(s)", result.frameworks.len());
    /// ```
    pub fn detect(parsed_files: &[ParsedFile]) -> DetectionResult {
        debug!("Detecting frameworks in {} files", parsed_files.len());

        let mut detected = BTreeSet::new();

        for parsed_file in parsed_files {
            for item in &parsed_file.syntax_tree.items {
                if let Item::Use(use_item) = item {
                    Self::check_use_tree(&use_item.tree, &mut detected);
                }
            }
        }

        let frameworks: Vec<Framework> = detected.into_iter().collect();
        debug!("Detected frameworks: {:?}", frameworks);

        DetectionResult { frameworks }
    }

    /// Only the leading segment of a use path names a crate.
    fn check_use_tree(tree: &UseTree, detected: &mut BTreeSet<Framework>) {
        let ident = match tree {
            UseTree::Path(path) => path.ident.to_string(),
            UseTree::Rename(rename) => rename.ident.to_string(),
            UseTree::Name(name) => name.ident.to_string(),
            UseTree::Group(group) => {
                for item in &group.items {
                    Self::check_use_tree(item, detected);
                }
                return;
            }
            UseTree::Glob(_) => return,
        };

        if let Some(framework) = Framework::from_crate_ident(&ident) {
            detected.insert(framework);
        }
    }
}
