use anyhow::Result;
use log::warn;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use walkdir::{DirEntry, WalkDir};

/// File scanner for traversing project directories.
///
/// The `FileScanner` recursively walks through a project directory to find all Rust source files.
/// It automatically skips common directories that should be ignored, such as `target` and hidden
/// directories (those starting with `.`). Entries are visited in file-name order so that route
/// discovery, and therefore the generated documentation, is deterministic.
///
/// # Example
///
/// ```no_run
/// use apidocx::scanner::FileScanner;
/// use std::path::PathBuf;
///
/// let scanner = FileScanner::new(PathBuf::from("./my-project"));
/// let result = scanner.scan().unwrap();
/// println!("Found {} Rust files", result.files.len());
/// ```
pub struct FileScanner {
    root_path: PathBuf,
    rust_only: bool,
}

/// Result of directory scanning operation.
///
/// Contains the list of discovered Rust files and any warnings encountered during scanning.
pub struct ScanResult {
    /// Discovered files, sorted by path; `.rs` files only unless the scanner takes any file
    pub files: Vec<PathBuf>,
    /// Warning messages for any issues encountered (e.g., inaccessible directories)
    pub warnings: Vec<String>,
}

impl ScanResult {
    /// Newest modification time among the discovered files.
    ///
    /// Files whose metadata cannot be read are ignored.
    pub fn latest_modification(&self) -> Option<SystemTime> {
        self.files
            .iter()
            .filter_map(|path| modified(path))
            .max()
    }
}

impl FileScanner {
    /// Creates a new `FileScanner` for the specified root directory.
    ///
    /// # Arguments
    ///
    /// * `root_path` - The root directory to scan for Rust files
    pub fn new(root_path: PathBuf) -> Self {
        Self {
            root_path,
            rust_only: true,
        }
    }

    /// Collects every file instead of `.rs` files only. Ignored directories stay ignored.
    pub fn any_file(mut self) -> Self {
        self.rust_only = false;
        self
    }

    /// Scans the directory tree and collects all `.rs` files.
    ///
    /// This method recursively traverses the directory tree starting from the root path,
    /// collecting all files with the `.rs` extension. It automatically skips:
    /// - The `target` directory (build artifacts)
    /// - Hidden directories (starting with `.`)
    ///
    /// If any directories or files cannot be accessed, warnings are logged and added to
    /// the result, but scanning continues.
    ///
    /// # Returns
    ///
    /// Returns a `ScanResult` containing the list of discovered files and any warnings.
    ///
    /// # Errors
    ///
    /// Returns an error if the root directory does not exist.
    pub fn scan(&self) -> Result<ScanResult> {
        if !self.root_path.exists() {
            anyhow::bail!("Path does not exist: {}", self.root_path.display());
        }

        let mut files = Vec::new();
        let mut warnings = Vec::new();

        for entry in WalkDir::new(&self.root_path)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.path() == self.root_path || !is_ignored(e))
        {
            match entry {
                Ok(entry) => {
                    let path = entry.path();

                    if path.is_file() && (!self.rust_only || is_rust_file(path)) {
                        files.push(path.to_path_buf());
                    }
                }
                Err(e) => {
                    let warning = format!("Failed to access path: {}", e);
                    warn!("{}", warning);
                    warnings.push(warning);
                }
            }
        }

        Ok(ScanResult { files, warnings })
    }
}

/// Hidden entries and `target` directories are never scanned.
fn is_ignored(entry: &DirEntry) -> bool {
    let file_name = entry.file_name().to_string_lossy();
    file_name.starts_with('.') || file_name == "target"
}

fn is_rust_file(path: &Path) -> bool {
    path.extension().and_then(|s| s.to_str()) == Some("rs")
}

/// Modification time of a single path, if it can be read.
pub fn modified(path: &Path) -> Option<SystemTime> {
    path.metadata().and_then(|m| m.modified()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_scan_normal_directory() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::write(root.join("main.rs"), "fn main() {}").unwrap();
        fs::write(root.join("lib.rs"), "pub fn test() {}").unwrap();
        fs::write(root.join("readme.md"), "# README").unwrap();

        let scanner = FileScanner::new(root.to_path_buf());
        let result = scanner.scan().unwrap();

        assert_eq!(result.files.len(), 2);
        assert!(result.warnings.is_empty());

        let file_names: Vec<String> = result
            .files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();

        // Sorted by file name
        assert_eq!(file_names, vec!["lib.rs".to_string(), "main.rs".to_string()]);
    }

    #[test]
    fn test_scan_missing_directory_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let scanner = FileScanner::new(temp_dir.path().join("nope"));

        assert!(scanner.scan().is_err());
    }

    #[test]
    fn test_scan_nested_directories_in_order() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::create_dir_all(root.join("src/handlers")).unwrap();
        fs::write(root.join("src/main.rs"), "fn main() {}").unwrap();
        fs::write(root.join("src/handlers/users.rs"), "pub fn list() {}").unwrap();
        fs::write(root.join("src/handlers/mod.rs"), "pub mod users;").unwrap();

        let scanner = FileScanner::new(root.to_path_buf());
        let result = scanner.scan().unwrap();

        let relative: Vec<String> = result
            .files
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();

        assert_eq!(
            relative,
            vec![
                "src/handlers/mod.rs".to_string(),
                "src/handlers/users.rs".to_string(),
                "src/main.rs".to_string(),
            ]
        );
    }

    #[test]
    fn test_scan_skips_target_and_hidden_directories() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::create_dir(root.join("target")).unwrap();
        fs::write(root.join("target/build.rs"), "fn main() {}").unwrap();
        fs::create_dir(root.join(".git")).unwrap();
        fs::write(root.join(".git/config.rs"), "// config").unwrap();
        fs::write(root.join("main.rs"), "fn main() {}").unwrap();

        let scanner = FileScanner::new(root.to_path_buf());
        let result = scanner.scan().unwrap();

        assert_eq!(result.files.len(), 1);
        assert_eq!(
            result.files[0].file_name().unwrap().to_string_lossy(),
            "main.rs"
        );
    }

    #[test]
    fn test_latest_modification() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        let scanner = FileScanner::new(root.to_path_buf());
        assert!(scanner.scan().unwrap().latest_modification().is_none());

        fs::write(root.join("main.rs"), "fn main() {}").unwrap();
        let result = scanner.scan().unwrap();

        assert_eq!(
            result.latest_modification(),
            modified(&root.join("main.rs"))
        );
    }

    #[test]
    fn test_any_file_mode_keeps_ignored_directories_out() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::create_dir_all(root.join("app/Http")).unwrap();
        fs::write(root.join("app/Http/UserController.php"), "<?php").unwrap();
        fs::write(root.join("routes.json"), "[]").unwrap();
        fs::create_dir(root.join(".cache")).unwrap();
        fs::write(root.join(".cache/entries.json"), "{}").unwrap();

        let result = FileScanner::new(root.to_path_buf()).any_file().scan().unwrap();

        let names: Vec<String> = result
            .files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["UserController.php".to_string(), "routes.json".to_string()]);
    }
}
