//! The compose-ls language server backend.
//!
//! Holds the open-document store and wires the LSP requests to the
//! extractors. Each request reads the current snapshot of the document;
//! nothing is cached between requests.

use std::collections::HashMap;
use std::path::PathBuf;

use tokio::sync::RwLock;
use tower_lsp::jsonrpc::{Error, Result};
use tower_lsp::lsp_types::{
    DidChangeConfigurationParams, DidChangeTextDocumentParams, DidCloseTextDocumentParams,
    DidOpenTextDocumentParams, DocumentLink, DocumentLinkOptions, DocumentLinkParams,
    DocumentSymbolParams, DocumentSymbolResponse, InitializeParams, InitializeResult,
    InitializedParams, MessageType, OneOf, ServerCapabilities, ServerInfo,
    TextDocumentSyncCapability, TextDocumentSyncKind, Url, WorkDoneProgressOptions,
};
use tower_lsp::{async_trait, Client, LanguageServer};

use crate::config::Settings;
use crate::document::{CancelToken, Canceled, ComposeDocument};
use crate::{links, symbol};

pub struct ComposeLanguageServer {
    client: Client,
    documents: RwLock<HashMap<Url, ComposeDocument>>,
    settings: RwLock<Settings>,
}

impl ComposeLanguageServer {
    pub fn new(client: Client) -> Self {
        ComposeLanguageServer {
            client,
            documents: RwLock::new(HashMap::new()),
            settings: RwLock::new(Settings::default()),
        }
    }

    async fn open_or_update(&self, uri: Url, text: String) {
        let mut documents = self.documents.write().await;
        match documents.get_mut(&uri) {
            Some(document) => document.update(&text),
            None => {
                documents.insert(uri.clone(), ComposeDocument::new(uri, &text));
            }
        }
    }
}

#[async_trait]
impl LanguageServer for ComposeLanguageServer {
    #[allow(deprecated)] // root_uri is the fallback for clients without workspace folders
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        let root = params
            .workspace_folders
            .as_ref()
            .and_then(|folders| folders.first())
            .and_then(|folder| folder.uri.to_file_path().ok())
            .or_else(|| {
                params
                    .root_uri
                    .as_ref()
                    .and_then(|uri| uri.to_file_path().ok())
            })
            .unwrap_or_else(|| PathBuf::from("."));

        match Settings::new(&root, &params.capabilities) {
            Ok(settings) => *self.settings.write().await = settings,
            Err(err) => {
                self.client
                    .log_message(
                        MessageType::WARNING,
                        format!("using default settings: {err}"),
                    )
                    .await;
            }
        }
        let settings = self.settings.read().await.clone();

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::FULL,
                )),
                document_symbol_provider: settings.symbols.then_some(OneOf::Left(true)),
                document_link_provider: settings.links.then(|| DocumentLinkOptions {
                    resolve_provider: Some(false),
                    work_done_progress_options: WorkDoneProgressOptions::default(),
                }),
                ..ServerCapabilities::default()
            },
            server_info: Some(ServerInfo {
                name: "compose-ls".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        self.client
            .log_message(MessageType::INFO, "compose-ls initialized")
            .await;
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let document = params.text_document;
        self.open_or_update(document.uri, document.text).await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        if let Some(change) = params.content_changes.into_iter().last() {
            self.open_or_update(params.text_document.uri, change.text)
                .await;
        }
    }

    async fn did_change_configuration(&self, params: DidChangeConfigurationParams) {
        let mut settings = self.settings.write().await;
        if let Some(links) = params.settings.get("links").and_then(|v| v.as_bool()) {
            settings.links = links;
        }
        if let Some(symbols) = params.settings.get("symbols").and_then(|v| v.as_bool()) {
            settings.symbols = symbols;
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        self.documents
            .write()
            .await
            .remove(&params.text_document.uri);
    }

    async fn document_link(&self, params: DocumentLinkParams) -> Result<Option<Vec<DocumentLink>>> {
        if !self.settings.read().await.links {
            return Ok(None);
        }
        let documents = self.documents.read().await;
        let Some(document) = documents.get(&params.text_document.uri) else {
            return Ok(None);
        };
        match links::document_link(&CancelToken::default(), document) {
            Ok(links) => Ok(Some(links)),
            Err(err) if err.is::<Canceled>() => Ok(None),
            Err(err) => {
                self.client
                    .log_message(MessageType::ERROR, format!("documentLink failed: {err:#}"))
                    .await;
                Err(Error::internal_error())
            }
        }
    }

    async fn document_symbol(
        &self,
        params: DocumentSymbolParams,
    ) -> Result<Option<DocumentSymbolResponse>> {
        if !self.settings.read().await.symbols {
            return Ok(None);
        }
        let documents = self.documents.read().await;
        let Some(document) = documents.get(&params.text_document.uri) else {
            return Ok(None);
        };
        Ok(
            symbol::document_symbol(&CancelToken::default(), document)
                .map(DocumentSymbolResponse::Nested),
        )
    }
}
