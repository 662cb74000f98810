pub mod completion;
pub mod config;
pub mod logging;
pub mod lsp;
pub mod metrics;
pub mod schema;
pub mod session;
