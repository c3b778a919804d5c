//! Document links for compose files.
//!
//! This module implements the LSP `textDocument/documentLink` capability.
//! Every file path, container image, and model reference in the document
//! becomes a clickable link with a precise source range:
//!
//! | Section | Attribute | Link target |
//! |---------|-----------|-------------|
//! | `include` | bare path, `path`, `env_file` | included file |
//! | `services` | `image` | registry web URL |
//! | `services` | `build.dockerfile`, `credential_spec.file`, `extends.file` | file |
//! | `services` | `env_file`, `label_file` | file(s) |
//! | `services` | `volumes` (bind mounts to existing regular files) | host file |
//! | `configs` / `secrets` | `file` | file |
//! | `models` | `model` | registry web URL |
//!
//! Shapes that do not match are skipped silently; the only fatal
//! conditions are an unresolvable document folder and cancellation.

use std::fs;

use anyhow::Result;
use tower_lsp::lsp_types::{DocumentLink, Url};

use crate::ast::{MappingEntry, Node, Token, YamlDocument};
use crate::document::{CancelToken, Canceled, ComposeDocument, DocumentPath};
use crate::mounts::{self, MountKind};
use crate::paths;
use crate::registry;

/// Collects every document link in `doc`.
pub fn document_link(cancel: &CancelToken, doc: &ComposeDocument) -> Result<Vec<DocumentLink>> {
    let path = doc.document_path()?;
    let mut links = Vec::new();
    for yaml_doc in &doc.file().docs {
        let Some(root) = &yaml_doc.root else { continue };
        let Some(entries) = yaml_doc.mapping(root) else {
            continue;
        };
        for entry in entries {
            if cancel.is_canceled() {
                return Err(Canceled.into());
            }
            links.extend(scan_for_links(yaml_doc, &path, entry));
        }
    }
    Ok(links)
}

fn scan_for_links(
    doc: &YamlDocument,
    path: &DocumentPath,
    entry: &MappingEntry,
) -> Vec<DocumentLink> {
    let mut links = Vec::new();
    let Some(section) = doc.scalar(&entry.key) else {
        return links;
    };
    match section.value.as_str() {
        "include" => {
            if let Some(items) = doc.sequence(&entry.value) {
                for token in included_path_tokens(doc, items) {
                    links.extend(file_link(path, token));
                }
            }
        }
        "services" => {
            for service in doc.mapping(&entry.value).unwrap_or_default() {
                let Some(attributes) = doc.mapping(&service.value) else {
                    continue;
                };
                for attribute in attributes {
                    links.extend(image_link(doc, attribute));
                    links.extend(nested_file_link(doc, path, attribute, "build", "dockerfile"));
                    links.extend(nested_file_link(
                        doc,
                        path,
                        attribute,
                        "credential_spec",
                        "file",
                    ));
                    links.extend(nested_file_link(doc, path, attribute, "extends", "file"));
                    links.extend(attribute_file_links(doc, path, attribute, "env_file"));
                    links.extend(attribute_file_links(doc, path, attribute, "label_file"));
                    links.extend(volume_links(doc, path, attribute));
                }
            }
        }
        "configs" | "secrets" => {
            for object in doc.mapping(&entry.value).unwrap_or_default() {
                let Some(attributes) = doc.mapping(&object.value) else {
                    continue;
                };
                for attribute in attributes {
                    if attribute_named(doc, attribute, "file") {
                        links.extend(scalar_file_link(doc, path, &attribute.value));
                    }
                }
            }
        }
        "models" => {
            for model in doc.mapping(&entry.value).unwrap_or_default() {
                let Some(attributes) = doc.mapping(&model.value) else {
                    continue;
                };
                for attribute in attributes {
                    links.extend(model_link(doc, attribute));
                }
            }
        }
        _ => {}
    }
    links
}

/// Path tokens reachable under an `include` section: bare string entries,
/// or `path` / `env_file` attributes holding a scalar or a sequence of
/// scalars. Alias-valued attribute entries are skipped — resolving one
/// would produce a range over the anchor's own span, duplicating its link.
pub(crate) fn included_path_tokens<'a>(
    doc: &'a YamlDocument,
    entries: &'a [Node],
) -> Vec<&'a Token> {
    let mut tokens = Vec::new();
    for entry in entries {
        if let Some(attributes) = doc.mapping(entry) {
            for attribute in attributes {
                let Some(name) = doc.scalar(&attribute.key) else {
                    continue;
                };
                if name.value != "path" && name.value != "env_file" {
                    continue;
                }
                if let Some(paths) = doc.sequence(&attribute.value) {
                    // include:
                    //   - path:
                    //       - ../commons/compose.yaml
                    //       - ./commons-override.yaml
                    for path in paths {
                        if matches!(path, Node::Alias { .. }) {
                            continue;
                        }
                        tokens.extend(doc.scalar(path));
                    }
                } else {
                    // include:
                    //   - path: ../commons/compose.yaml
                    //     env_file: ../another/.env
                    if matches!(attribute.value, Node::Alias { .. }) {
                        continue;
                    }
                    tokens.extend(doc.scalar(&attribute.value));
                }
            }
        } else {
            // include:
            //   - abc.yml
            //   - def.yml
            tokens.extend(doc.scalar(entry));
        }
    }
    tokens
}

fn attribute_named(doc: &YamlDocument, entry: &MappingEntry, name: &str) -> bool {
    doc.scalar(&entry.key).is_some_and(|t| t.value == name)
}

/// A link over `token`'s whole value, pointing at the file it names
/// relative to the document folder.
fn file_link(path: &DocumentPath, token: &Token) -> Option<DocumentLink> {
    let (uri, native) = paths::concatenate(&path.folder, &token.value, path.wsl_dollar_sign);
    make_link(token.value_range(), &uri, native)
}

fn scalar_file_link(
    doc: &YamlDocument,
    path: &DocumentPath,
    value: &Node,
) -> Option<DocumentLink> {
    file_link(path, doc.scalar(value)?)
}

/// A file link one level down, e.g. `build.dockerfile` or `extends.file`.
fn nested_file_link(
    doc: &YamlDocument,
    path: &DocumentPath,
    entry: &MappingEntry,
    parent: &str,
    child: &str,
) -> Option<DocumentLink> {
    if !attribute_named(doc, entry, parent) {
        return None;
    }
    let attributes = doc.mapping(&entry.value)?;
    attributes
        .iter()
        .find(|attribute| attribute_named(doc, attribute, child))
        .and_then(|attribute| scalar_file_link(doc, path, &attribute.value))
}

/// File links for an attribute that holds either one path or a sequence of
/// paths (`env_file`, `label_file`).
fn attribute_file_links(
    doc: &YamlDocument,
    path: &DocumentPath,
    entry: &MappingEntry,
    attribute: &str,
) -> Vec<DocumentLink> {
    let mut links = Vec::new();
    if !attribute_named(doc, entry, attribute) {
        return links;
    }
    if let Some(items) = doc.sequence(&entry.value) {
        for item in items {
            links.extend(scalar_file_link(doc, path, item));
        }
        return links;
    }
    links.extend(scalar_file_link(doc, path, &entry.value));
    links
}

fn image_link(doc: &YamlDocument, entry: &MappingEntry) -> Option<DocumentLink> {
    if !attribute_named(doc, entry, "image") {
        return None;
    }
    let token = doc.scalar(&entry.value)?;
    let decoded = registry::decode_image_ref(&token.value)?;
    make_link(
        token.range(decoded.text.chars().count()),
        &decoded.url,
        decoded.url.clone(),
    )
}

fn model_link(doc: &YamlDocument, entry: &MappingEntry) -> Option<DocumentLink> {
    if !attribute_named(doc, entry, "model") {
        return None;
    }
    let token = doc.scalar(&entry.value)?;
    let decoded = registry::decode_model_ref(&token.value)?;
    make_link(
        token.range(decoded.text.chars().count()),
        &decoded.url,
        decoded.url.clone(),
    )
}

/// Links for `volumes` entries. Only bind mounts qualify, and only when
/// the resolved source stats as a regular file; the range covers just the
/// source-path prefix of the mount string. A failed stat is "no link",
/// never an error.
fn volume_links(
    doc: &YamlDocument,
    path: &DocumentPath,
    entry: &MappingEntry,
) -> Vec<DocumentLink> {
    let mut links = Vec::new();
    if !attribute_named(doc, entry, "volumes") {
        return links;
    }
    let Some(items) = doc.sequence(&entry.value) else {
        return links;
    };
    for item in items {
        let Some(token) = doc.scalar(item) else {
            continue;
        };
        let Some(mount) = mounts::parse_short_mount(&token.value) else {
            continue;
        };
        if mount.kind != MountKind::Bind {
            continue;
        }
        let (uri, native) =
            paths::local_file_link(&path.folder, &mount.source, path.wsl_dollar_sign);
        if !fs::metadata(&native).map(|m| m.is_file()).unwrap_or(false) {
            continue;
        }
        links.extend(make_link(
            token.range(mount.source.chars().count()),
            &uri,
            native,
        ));
    }
    links
}

fn make_link(
    range: tower_lsp::lsp_types::Range,
    target: &str,
    tooltip: String,
) -> Option<DocumentLink> {
    Some(DocumentLink {
        range,
        target: Some(Url::parse(target).ok()?),
        tooltip: Some(tooltip),
        data: None,
    })
}
