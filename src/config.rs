use std::path::Path;

use anyhow::anyhow;
use config::{Config, File};
use serde::Deserialize;
use tower_lsp::lsp_types::ClientCapabilities;

/// Server features that can be toggled from a settings file.
///
/// Settings are layered: `~/.config/compose-ls/settings` first, then a
/// `.compose-ls` file at the workspace root.
#[derive(Deserialize, Debug, Clone)]
pub struct Settings {
    /// Serve textDocument/documentLink.
    pub links: bool,
    /// Serve textDocument/documentSymbol.
    pub symbols: bool,
}

impl Settings {
    pub fn new(root_dir: &Path, capabilities: &ClientCapabilities) -> anyhow::Result<Settings> {
        let expanded = shellexpand::tilde("~/.config/compose-ls/settings");
        let settings = Config::builder()
            .add_source(File::with_name(&expanded).required(false))
            .add_source(
                File::with_name(&format!(
                    "{}/.compose-ls",
                    root_dir
                        .to_str()
                        .ok_or(anyhow!("Can't convert root_dir to str"))?
                ))
                .required(false),
            )
            .set_default("links", true)?
            .set_default("symbols", true)?
            .set_override_option(
                "links",
                capabilities.text_document.as_ref().and_then(|it| {
                    match it.document_link.is_none() {
                        true => Some(false),
                        false => None,
                    }
                }),
            )?
            .build()
            .map_err(|err| anyhow!("Build err: {err}"))?;

        let settings = settings.try_deserialize::<Settings>()?;

        anyhow::Ok(settings)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            links: true,
            symbols: true,
        }
    }
}
