/*!
 * Common test utilities for the metaforge test suite
 */

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Once;
use tempfile::TempDir;

static INIT_LOGGER: Once = Once::new();

/// Route library logs through env_logger, honoring RUST_LOG
pub fn init_test_logger() {
    INIT_LOGGER.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Helper to get the absolute path to a test resource
pub fn test_resource_path(relative_path: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("resources");
    path.push(relative_path);
    path
}

/// The family-A manuscript template
pub fn template() -> String {
    fs::read_to_string(test_resource_path("template.tex")).expect("template fixture is readable")
}

/// Copies the template into `dir/relative_path`
pub fn create_test_manuscript(dir: &Path, relative_path: &str) -> Result<PathBuf> {
    create_test_file(dir, relative_path, &template())
}

/// A minimal document whose bibliography cites `dois`
pub fn bibliography_document(dois: &[&str]) -> String {
    let mut doc = String::from("\\begin{document}\n\\begin{thebibliography}{99}\n");
    for (i, doi) in dois.iter().enumerate() {
        doc.push_str(&format!("\\bibitem{{ref{}}} Author, \\doi{{{}}}.\n", i, doi));
    }
    doc.push_str("\\end{thebibliography}\n\\end{document}\n");
    doc
}
