//! Integration tests for the compose-ls library public API.
//!
//! These tests drive both extractors through the public crate surface the
//! way the server binary does: a document built from real text, references
//! resolved against a real directory on disk.

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;
use tower_lsp::lsp_types::{SymbolKind, Url};

use compose_ls::document::{CancelToken, ComposeDocument};
use compose_ls::{links, symbol};

/// Helper: create a temporary project directory for testing.
///
/// Returns (TempDir, PathBuf) — keep TempDir alive for the test duration.
fn create_test_project_dir() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let project_dir = temp_dir.path().join("project");
    fs::create_dir(&project_dir).expect("Failed to create project subdirectory");
    (temp_dir, project_dir)
}

fn document_in(dir: &PathBuf, text: &str) -> ComposeDocument {
    let uri = Url::from_file_path(dir.join("compose.yaml")).expect("absolute path");
    ComposeDocument::new(uri, text)
}

#[test]
fn extracts_links_and_symbols_from_a_realistic_stack() {
    let (_temp_dir, project_dir) = create_test_project_dir();
    fs::write(project_dir.join("nginx.conf"), "worker_processes 1;\n").unwrap();

    let text = "\
include:
  - ../commons/compose.yaml
services:
  web:
    image: nginx:1.25
    env_file: .env
    volumes:
      - ./nginx.conf:/etc/nginx/nginx.conf:ro
  worker:
    build:
      context: .
      dockerfile: Dockerfile.worker
    image: ghcr.io/acme/widget:v2
networks:
  backend: {}
configs:
  http_config:
    file: ./httpd.conf
models:
  llm:
    model: ai/smollm2
";
    let doc = document_in(&project_dir, text);

    let links = links::document_link(&CancelToken::default(), &doc).expect("links extract");
    let targets: Vec<String> = links
        .iter()
        .map(|l| l.target.as_ref().unwrap().to_string())
        .collect();

    // include + image + env_file + bind mount + dockerfile + ghcr image
    // + config file + model
    assert_eq!(links.len(), 8, "targets were: {targets:?}");
    assert!(targets.iter().any(|t| t.ends_with("/commons/compose.yaml")));
    assert!(targets.contains(&"https://hub.docker.com/_/nginx".to_string()));
    assert!(targets.iter().any(|t| t.ends_with("/project/.env")));
    assert!(targets.iter().any(|t| t.ends_with("/project/nginx.conf")));
    assert!(targets.iter().any(|t| t.ends_with("/project/Dockerfile.worker")));
    assert!(targets.contains(&"https://ghcr.io/acme/widget".to_string()));
    assert!(targets.iter().any(|t| t.ends_with("/project/httpd.conf")));
    assert!(targets.contains(&"https://hub.docker.com/r/ai/smollm2".to_string()));

    let symbols =
        symbol::document_symbol(&CancelToken::default(), &doc).expect("symbols extract");
    let outline: Vec<(&str, SymbolKind)> = symbols
        .iter()
        .map(|s| (s.name.as_str(), s.kind))
        .collect();
    assert_eq!(
        outline,
        [
            ("../commons/compose.yaml", SymbolKind::MODULE),
            ("web", SymbolKind::CLASS),
            ("worker", SymbolKind::CLASS),
            ("backend", SymbolKind::INTERFACE),
            ("http_config", SymbolKind::VARIABLE),
            ("llm", SymbolKind::MODULE),
        ]
    );
}

#[test]
fn documents_without_content_are_empty_but_not_errors() {
    let (_temp_dir, project_dir) = create_test_project_dir();
    let doc = document_in(&project_dir, "");

    let links = links::document_link(&CancelToken::default(), &doc).expect("no error");
    assert!(links.is_empty());

    let symbols = symbol::document_symbol(&CancelToken::default(), &doc).expect("no error");
    assert!(symbols.is_empty());
}

#[test]
fn volume_links_respect_the_filesystem() {
    let (_temp_dir, project_dir) = create_test_project_dir();
    // data exists but is a directory: no link
    fs::create_dir(project_dir.join("data")).unwrap();

    let text = "\
services:
  db:
    volumes:
      - ./data:/var/lib/postgresql/data
";
    let doc = document_in(&project_dir, text);
    let links = links::document_link(&CancelToken::default(), &doc).expect("links extract");
    assert!(links.is_empty(), "directories are not linkable bind sources");
}
