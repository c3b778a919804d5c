//! Document symbols (outline) for compose files.
//!
//! This module implements the LSP `textDocument/documentSymbol` capability.
//! Each recognized top-level section contributes one symbol per named child
//! entry, flat and at most one level deep:
//!
//! | Section | LSP Kind |
//! |---------|----------|
//! | `services` | `Class` |
//! | `networks` | `Interface` |
//! | `volumes` | `File` |
//! | `configs` | `Variable` |
//! | `secrets` | `Key` |
//! | `models` | `Module` |
//! | `include` (per included path) | `Module` |
//!
//! Unrecognized top-level keys are ignored; every embedded document of a
//! multi-document file contributes.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use tower_lsp::lsp_types::{DocumentSymbol, SymbolKind};

use crate::ast::{MappingEntry, Token, YamlDocument};
use crate::document::{CancelToken, ComposeDocument};
use crate::links::included_path_tokens;

/// Symbol kind for each top-level compose section.
static SECTION_KINDS: Lazy<HashMap<&'static str, SymbolKind>> = Lazy::new(|| {
    HashMap::from([
        ("services", SymbolKind::CLASS),
        ("networks", SymbolKind::INTERFACE),
        ("volumes", SymbolKind::FILE),
        ("configs", SymbolKind::VARIABLE),
        ("secrets", SymbolKind::KEY),
        ("models", SymbolKind::MODULE),
    ])
});

/// Builds the outline for `doc`.
///
/// Returns `None` only when the request was canceled; a document with no
/// parsed content yields `Some` of an empty list.
pub fn document_symbol(
    cancel: &CancelToken,
    doc: &ComposeDocument,
) -> Option<Vec<DocumentSymbol>> {
    let mut symbols = Vec::new();
    for yaml_doc in &doc.file().docs {
        let Some(root) = &yaml_doc.root else { continue };
        let Some(entries) = yaml_doc.mapping(root) else {
            continue;
        };
        for entry in entries {
            if cancel.is_canceled() {
                return None;
            }
            let Some(section) = yaml_doc.scalar(&entry.key) else {
                continue;
            };
            symbols.extend(find_symbols(yaml_doc, entry, &section.value));
        }
    }
    Some(symbols)
}

fn find_symbols(doc: &YamlDocument, entry: &MappingEntry, section: &str) -> Vec<DocumentSymbol> {
    let mut symbols = Vec::new();
    if let Some(kind) = SECTION_KINDS.get(section) {
        for child in doc.mapping(&entry.value).unwrap_or_default() {
            if let Some(token) = doc.scalar(&child.key) {
                symbols.push(create_symbol(token, *kind));
            }
        }
    } else if section == "include" {
        if let Some(items) = doc.sequence(&entry.value) {
            for token in included_path_tokens(doc, items) {
                symbols.push(create_symbol(token, SymbolKind::MODULE));
            }
        }
    }
    symbols
}

#[allow(deprecated)] // the `deprecated` field is deprecated in favor of tags
fn create_symbol(token: &Token, kind: SymbolKind) -> DocumentSymbol {
    let range = token.value_range();
    DocumentSymbol {
        name: token.value.clone(),
        kind,
        range,
        selection_range: range,
        detail: None,
        tags: None,
        deprecated: None,
        children: None,
    }
}
