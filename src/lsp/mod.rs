//! Language server exposing completion to LSP editors

pub mod backend;
pub mod document;

use std::sync::Arc;

use tower_lsp::{LspService, Server};
use tracing::info;

use crate::config::CompletionConfig;
use crate::schema::ApiSchema;

pub use backend::Backend;

/// Serve LSP over stdin/stdout until the client disconnects
pub async fn serve_stdio(schema: Arc<ApiSchema>, config: CompletionConfig) {
    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = LspService::new(|client| Backend::new(client, schema, &config));
    info!("Language server listening on stdio");

    Server::new(stdin, stdout, socket).serve(service).await;
}
