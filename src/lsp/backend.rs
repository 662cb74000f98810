//! tower-lsp adapter: editor requests in, completion sessions out

use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;
use ropey::Rope;
use tower_lsp::jsonrpc;
use tower_lsp::lsp_types::{
    CompletionItem, CompletionItemKind, CompletionOptions, CompletionParams, CompletionResponse,
    CompletionTextEdit, DidChangeTextDocumentParams, DidCloseTextDocumentParams,
    DidOpenTextDocumentParams, Documentation, InitializeParams, InitializeResult,
    InitializedParams, InsertTextFormat, MessageType, ParameterInformation, ParameterLabel,
    ServerCapabilities, ServerInfo, SignatureHelp, SignatureHelpOptions, SignatureHelpParams,
    SignatureInformation, TextDocumentSyncCapability, TextDocumentSyncKind, TextEdit, Url,
};
use tower_lsp::{Client, LanguageServer};
use tracing::{debug, info, warn};

use crate::completion::{argument_index, CompletionContext, Suggestion, SuggestionKind};
use crate::config::CompletionConfig;
use crate::metrics::metrics;
use crate::schema::ApiSchema;
use crate::session::{Anchor, CompletionController, CompletionSession, EditInstruction};

use super::document::{char_range_to_lsp, position_to_char_offset, CursorWindow, Document};

pub struct Backend {
    client: Client,
    documents: DashMap<Url, Document>,
    controller: Mutex<CompletionController>,
}

impl Backend {
    pub fn new(client: Client, schema: Arc<ApiSchema>, config: &CompletionConfig) -> Self {
        Self {
            client,
            documents: DashMap::new(),
            controller: Mutex::new(CompletionController::new(schema, config)),
        }
    }

    /// Snapshot of a document and the window of text before `position`
    fn window_at(
        &self,
        uri: &Url,
        position: &tower_lsp::lsp_types::Position,
        window_chars: usize,
    ) -> Option<(Rope, CursorWindow)> {
        let Some(document) = self.documents.get(uri) else {
            debug!("Document not found: {}", uri);
            return None;
        };
        let offset = position_to_char_offset(position, &document.text);
        let window = CursorWindow::before(&document.text, offset, window_chars);
        Some((document.text.clone(), window))
    }
}

fn completion_kind(kind: SuggestionKind) -> CompletionItemKind {
    match kind {
        SuggestionKind::Property => CompletionItemKind::PROPERTY,
        SuggestionKind::Method => CompletionItemKind::METHOD,
        SuggestionKind::Object => CompletionItemKind::MODULE,
        SuggestionKind::Constant => CompletionItemKind::CONSTANT,
        SuggestionKind::Keyword => CompletionItemKind::KEYWORD,
        SuggestionKind::ParameterHint => CompletionItemKind::VALUE,
    }
}

/// LSP item whose edit is exactly what accepting `suggestion` would produce
///
/// `anchor` is relative to `window`, the text the session was computed for.
pub fn completion_item(
    rank: usize,
    suggestion: &Suggestion,
    anchor: Anchor,
    window: &CursorWindow,
    text: &Rope,
) -> CompletionItem {
    // Plain-text edits leave the cursor after the inserted text, which is
    // where accept puts it too
    let edit = EditInstruction::for_suggestion(anchor, suggestion);
    let documentation = (!suggestion.description.is_empty())
        .then(|| Documentation::String(suggestion.description.clone()));

    CompletionItem {
        label: suggestion.name.clone(),
        kind: Some(completion_kind(suggestion.kind)),
        detail: (!suggestion.detail.is_empty()).then(|| suggestion.detail.clone()),
        documentation,
        sort_text: Some(format!("{:04}", rank)),
        filter_text: Some(suggestion.name.clone()),
        insert_text_format: Some(InsertTextFormat::PLAIN_TEXT),
        text_edit: Some(CompletionTextEdit::Edit(TextEdit {
            range: char_range_to_lsp(
                window.document_char(edit.start),
                window.document_char(edit.end),
                text,
            ),
            new_text: edit.insert_text,
        })),
        ..Default::default()
    }
}

/// Signature help for the innermost open call before `cursor`
pub fn signature_help_at(schema: &ApiSchema, context: &CompletionContext) -> Option<SignatureHelp> {
    let CompletionContext::MethodCall {
        callee_name,
        raw_args,
    } = context
    else {
        return None;
    };
    let method = schema.find_method(callee_name)?;

    let parameters = method
        .parameters
        .iter()
        .map(|parameter| ParameterInformation {
            label: ParameterLabel::Simple(parameter.name.clone()),
            documentation: parameter
                .description
                .clone()
                .map(Documentation::String),
        })
        .collect();

    Some(SignatureHelp {
        signatures: vec![SignatureInformation {
            label: method.signature.clone(),
            documentation: (!method.description.is_empty())
                .then(|| Documentation::String(method.description.clone())),
            parameters: Some(parameters),
            active_parameter: None,
        }],
        active_signature: Some(0),
        active_parameter: Some(argument_index(raw_args) as u32),
    })
}

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    async fn initialize(&self, params: InitializeParams) -> jsonrpc::Result<InitializeResult> {
        info!("Received initialize (client: {:?})", params.client_info.map(|c| c.name));

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::INCREMENTAL,
                )),
                completion_provider: Some(CompletionOptions {
                    trigger_characters: Some(vec![
                        ".".to_string(),
                        "(".to_string(),
                        ",".to_string(),
                    ]),
                    resolve_provider: Some(false),
                    ..Default::default()
                }),
                signature_help_provider: Some(SignatureHelpOptions {
                    trigger_characters: Some(vec!["(".to_string(), ",".to_string()]),
                    retrigger_characters: None,
                    work_done_progress_options: Default::default(),
                }),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        self.client
            .log_message(MessageType::INFO, "ExtendScript completion ready")
            .await;
    }

    async fn shutdown(&self) -> jsonrpc::Result<()> {
        info!("Received shutdown request; metrics: {:?}", metrics().summary());
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let document = params.text_document;
        debug!("didOpen {}", document.uri);
        self.documents
            .insert(document.uri, Document::new(&document.text, document.version));
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        let Some(mut document) = self.documents.get_mut(&uri) else {
            warn!("didChange for unknown document {}", uri);
            return;
        };
        if let Err(e) = document.apply(params.content_changes, params.text_document.version) {
            warn!("Ignoring change to {}: {}", uri, e);
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;
        debug!("didClose {}", uri);
        self.documents.remove(&uri);
        self.controller.lock().cancel();
    }

    async fn completion(
        &self,
        params: CompletionParams,
    ) -> jsonrpc::Result<Option<CompletionResponse>> {
        let uri = params.text_document_position.text_document.uri;
        let position = params.text_document_position.position;
        debug!("Completion request at {}:{:?}", uri, position);

        let items: Vec<CompletionItem> = {
            let mut controller = self.controller.lock();
            let window_chars = controller.engine().window_chars();
            let Some((text, window)) = self.window_at(&uri, &position, window_chars) else {
                return Ok(None);
            };
            match controller.manual_trigger(&window.text, window.text.len()) {
                CompletionSession::Open {
                    suggestions,
                    anchor,
                    ..
                } => suggestions
                    .iter()
                    .filter(|suggestion| suggestion.is_acceptable())
                    .enumerate()
                    .map(|(rank, suggestion)| {
                        completion_item(rank, suggestion, *anchor, &window, &text)
                    })
                    .collect(),
                CompletionSession::Closed => Vec::new(),
            }
        };

        debug!("Returning {} completion items", items.len());
        if items.is_empty() {
            Ok(None)
        } else {
            Ok(Some(CompletionResponse::Array(items)))
        }
    }

    async fn signature_help(
        &self,
        params: SignatureHelpParams,
    ) -> jsonrpc::Result<Option<SignatureHelp>> {
        let uri = params.text_document_position_params.text_document.uri;
        let position = params.text_document_position_params.position;
        debug!("Signature help request at {}:{:?}", uri, position);

        let controller = self.controller.lock();
        let engine = controller.engine();
        let Some((_, window)) = self.window_at(&uri, &position, engine.window_chars()) else {
            return Ok(None);
        };
        Ok(engine
            .classify(&window.text, window.text.len())
            .and_then(|context| signature_help_at(engine.schema(), &context)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::classify;
    use crate::schema::{MethodDescriptor, Parameter};
    use tower_lsp::lsp_types::Position;

    #[test]
    fn test_completion_item_edit_matches_accept() {
        let text = Rope::from_str("// «é»\napp.project.sa");
        let window = CursorWindow::before(&text, text.len_chars(), 300);
        let anchor = Anchor {
            cursor: window.text.len(),
            replace_length: 2,
        };
        let save_as = Suggestion::method(&MethodDescriptor::new(
            "saveAs",
            "Number",
            vec![Parameter::new("path")],
        ));

        let item = completion_item(0, &save_as, anchor, &window, &text);
        let Some(CompletionTextEdit::Edit(edit)) = item.text_edit else {
            panic!("expected a plain text edit");
        };
        assert_eq!(edit.new_text, "saveAs(");
        assert_eq!(edit.range.start, Position::new(1, 12));
        assert_eq!(edit.range.end, Position::new(1, 14));
        assert_eq!(item.kind, Some(CompletionItemKind::METHOD));
        assert_eq!(item.sort_text.as_deref(), Some("0000"));
    }

    #[test]
    fn test_signature_help_active_parameter() {
        let schema = ApiSchema::builtin();
        let text = "app.openDocument(path, ";
        let context = classify(text, text.len(), 300).unwrap();

        let help = signature_help_at(&schema, &context).unwrap();
        assert_eq!(help.active_parameter, Some(1));
        assert_eq!(help.signatures[0].parameters.as_ref().unwrap().len(), 4);
    }
}
