//! Per-document state and request-scoped context.
//!
//! A [`ComposeDocument`] owns the authoritative text buffer and the parsed
//! tree for one open file. The extractors receive it read-only together
//! with a [`CancelToken`]; nothing here is shared mutable state between
//! requests.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{anyhow, bail, Context};
use ropey::Rope;
use tower_lsp::lsp_types::Url;

use crate::ast::ComposeFile;
use crate::parser;

/// The folder context file references resolve against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentPath {
    /// Absolute path of the document's containing directory. In WSL mode
    /// this is the path below the `\\wsl$` share root.
    pub folder: String,
    /// Whether references resolve through the `\\wsl$` network share.
    pub wsl_dollar_sign: bool,
}

/// One open compose file: its URI, text buffer, and parsed tree.
pub struct ComposeDocument {
    uri: Url,
    text: Rope,
    file: ComposeFile,
}

impl ComposeDocument {
    pub fn new(uri: Url, text: &str) -> Self {
        ComposeDocument {
            uri,
            text: Rope::from_str(text),
            file: parser::parse(text).unwrap_or_default(),
        }
    }

    /// Replaces the text buffer (full sync) and reparses. A parse failure
    /// keeps the previous tree, so extraction degrades to slightly stale
    /// output while the user is mid-edit.
    pub fn update(&mut self, text: &str) {
        self.text = Rope::from_str(text);
        if let Ok(file) = parser::parse(text) {
            self.file = file;
        }
    }

    pub fn uri(&self) -> &Url {
        &self.uri
    }

    pub fn text(&self) -> &Rope {
        &self.text
    }

    pub fn file(&self) -> &ComposeFile {
        &self.file
    }

    /// Resolves the folder context for this document.
    ///
    /// This is the one fatal precondition of link extraction: without a
    /// base folder no relative reference can be resolved, so failure here
    /// aborts the whole request.
    pub fn document_path(&self) -> anyhow::Result<DocumentPath> {
        if self.uri.scheme() != "file" {
            bail!("cannot resolve a base folder for {}", self.uri);
        }
        if let Some(host) = self.uri.host_str() {
            if host.eq_ignore_ascii_case("wsl$") || host.eq_ignore_ascii_case("wsl%24") {
                let decoded = urlencoding::decode(self.uri.path())
                    .with_context(|| format!("malformed path encoding in {}", self.uri))?;
                let folder = match decoded.rfind('/') {
                    Some(0) | None => "/".to_string(),
                    Some(idx) => decoded[..idx].to_string(),
                };
                return Ok(DocumentPath {
                    folder,
                    wsl_dollar_sign: true,
                });
            }
        }
        let path = self
            .uri
            .to_file_path()
            .map_err(|_| anyhow!("cannot determine the filesystem path of {}", self.uri))?;
        let folder = path
            .parent()
            .ok_or_else(|| anyhow!("{} has no containing folder", self.uri))?
            .to_string_lossy()
            .into_owned();
        Ok(DocumentPath {
            folder,
            wsl_dollar_sign: false,
        })
    }
}

/// Cooperative cancellation flag threaded through an extraction call.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_canceled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Marker error for an extraction abandoned after its request was canceled.
/// Carries no partial result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Canceled;

impl fmt::Display for Canceled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "request canceled")
    }
}

impl std::error::Error for Canceled {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_path_uses_the_containing_directory() {
        let uri = Url::parse("file:///proj/compose.yaml").unwrap();
        let doc = ComposeDocument::new(uri, "services: {}\n");
        let path = doc.document_path().unwrap();
        assert_eq!(path.folder, "/proj");
        assert!(!path.wsl_dollar_sign);
    }

    #[test]
    fn wsl_uris_resolve_to_wsl_contexts() {
        let uri = Url::parse("file://wsl%24/Ubuntu/proj/compose.yaml").unwrap();
        let doc = ComposeDocument::new(uri, "services: {}\n");
        let path = doc.document_path().unwrap();
        assert!(path.wsl_dollar_sign);
        assert_eq!(path.folder, "/Ubuntu/proj");
    }

    #[test]
    fn non_file_uris_cannot_be_resolved() {
        let uri = Url::parse("untitled:Untitled-1").unwrap();
        let doc = ComposeDocument::new(uri, "services: {}\n");
        assert!(doc.document_path().is_err());
    }

    #[test]
    fn update_keeps_the_last_good_tree_on_parse_failure() {
        let uri = Url::parse("file:///proj/compose.yaml").unwrap();
        let mut doc = ComposeDocument::new(uri, "services:\n  web:\n    image: nginx\n");
        assert_eq!(doc.file().docs.len(), 1);

        doc.update("services: [unclosed\n");
        assert_eq!(doc.file().docs.len(), 1, "previous tree survives");
        assert_eq!(doc.text().to_string(), "services: [unclosed\n");
    }

    #[test]
    fn cancel_token_flips_once() {
        let token = CancelToken::default();
        assert!(!token.is_canceled());
        token.cancel();
        assert!(token.is_canceled());
        let clone = token.clone();
        assert!(clone.is_canceled());
    }
}
