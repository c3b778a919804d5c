//! Shared test utilities for compose-ls.
//!
//! This module provides common helpers used across multiple test modules.
//! It is only compiled when running tests.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tower_lsp::lsp_types::Url;

use crate::document::ComposeDocument;

/// Creates a temporary project directory for testing.
///
/// Returns a tuple of (TempDir, PathBuf) where:
/// - TempDir: the temp directory handle (must be kept alive for the test
///   duration)
/// - PathBuf: the path to the `project` subdirectory every test document
///   resolves its references against
pub fn create_test_project_dir() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let project_dir = temp_dir.path().join("project");
    fs::create_dir(&project_dir).expect("Failed to create project subdirectory");
    (temp_dir, project_dir)
}

/// A compose document rooted at `dir/name` with the given text.
///
/// The file itself is not written to disk — link extraction only needs the
/// document's URI to resolve its folder. Tests that exercise filesystem
/// probes (volume bind mounts) create the probed files themselves.
pub fn compose_document_in(dir: &Path, name: &str, text: &str) -> ComposeDocument {
    let uri = Url::from_file_path(dir.join(name)).expect("absolute document path");
    ComposeDocument::new(uri, text)
}
