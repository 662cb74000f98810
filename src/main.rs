use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use extendscript_console::config::CompletionConfig;
use extendscript_console::logging::init_logger;
use extendscript_console::lsp::serve_stdio;
use extendscript_console::metrics::metrics;
use extendscript_console::schema::load_or_empty;
use extendscript_console::session::CompletionController;

#[derive(Parser)]
#[command(name = "extendscript-console")]
#[command(about = "ExtendScript code completion for the Premiere Pro scripting API")]
#[command(version)]
struct Cli {
    /// Schema JSON file (defaults to the bundled Premiere Pro API)
    #[arg(long, global = true)]
    schema: Option<PathBuf>,

    /// Completion config JSON file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level filter (overrides RUST_LOG)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Disable ANSI colors in log output
    #[arg(long, global = true)]
    no_color: bool,

    /// Also write a debug session log to the user cache directory
    #[arg(long, global = true)]
    log_file: bool,

    /// Override the debounce quiet period (ms)
    #[arg(long, global = true)]
    debounce_ms: Option<u64>,

    /// Override the maximum number of suggestions
    #[arg(long, global = true)]
    max_suggestions: Option<usize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the completion session for TEXT as JSON
    Complete {
        #[arg(short, long)]
        text: String,

        /// Cursor byte offset (defaults to the end of TEXT)
        #[arg(short, long)]
        cursor: Option<usize>,
    },
    /// Run the language server over stdio
    Lsp,
}

impl Cli {
    fn completion_config(&self) -> Result<CompletionConfig> {
        let mut config = match &self.config {
            Some(path) => CompletionConfig::load(path)?,
            None => CompletionConfig::default(),
        };
        if let Some(debounce_ms) = self.debounce_ms {
            config.debounce_ms = debounce_ms;
        }
        if let Some(max_suggestions) = self.max_suggestions {
            config.max_suggestions = max_suggestions;
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let _guard = init_logger(cli.no_color, cli.log_level.as_deref(), cli.log_file)
        .context("failed to initialize logging")?;

    let config = cli.completion_config()?;
    let schema = load_or_empty(cli.schema.as_deref());

    match cli.command {
        Command::Complete { text, cursor } => {
            let cursor = cursor.unwrap_or_else(|| text.len());
            let mut controller = CompletionController::new(schema, &config);
            let session = controller.manual_trigger(&text, cursor);
            let json = serde_json::to_string_pretty(session)
                .context("failed to serialize completion session")?;
            println!("{}", json);
        }
        Command::Lsp => {
            serve_stdio(schema, config).await;
        }
    }

    info!("Metrics: {:?}", metrics().summary());
    Ok(())
}
