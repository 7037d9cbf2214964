//! `notion-md convert` command implementation.

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::Args;
use notion_md_client::NotionClient;
use notion_md_config::{CliSettings, Config};
use notion_md_renderer::{
    BlockId, BlockSource, CancellationToken, Conversion, ConvertOptions, Converter, Warning,
};
use tracing::warn;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the convert command.
#[derive(Args)]
pub(crate) struct ConvertArgs {
    /// Page (or block) ID, or a Notion URL ending in one.
    target: String,

    /// Convert a single block and its subtree instead of a page's children.
    #[arg(long)]
    block: bool,

    /// Start the document with the page title as a `#` heading.
    #[arg(long, conflicts_with = "block")]
    title: bool,

    /// Write Markdown to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Path to configuration file (default: auto-discover notion-md.toml).
    #[arg(short, long, env = "NOTION_MD_CONFIG")]
    config: Option<PathBuf>,

    /// Integration token (overrides config and NOTION_TOKEN).
    #[arg(long)]
    token: Option<String>,

    /// Maximum concurrent fetches (overrides config).
    #[arg(long)]
    concurrency: Option<usize>,

    /// Exit with an error when any warning is reported.
    #[arg(long)]
    fail_on_warnings: bool,

    /// Enable verbose output (show fetch progress logs).
    #[arg(short, long)]
    pub verbose: bool,
}

/// What to convert.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Target {
    Page,
    Block,
}

impl ConvertArgs {
    /// Execute the convert command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration, fetching or writing fails, or if
    /// warnings were reported with `--fail-on-warnings`.
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            token: self.token,
            concurrency: self.concurrency,
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        let token = config.require_token()?;
        let id = BlockId::parse(&self.target)?;

        let client = NotionClient::from_config(&config.notion, token, config.fetch.page_size);
        let options = ConvertOptions {
            concurrency: config.fetch.concurrency,
            max_pages: config.fetch.max_pages,
            include_title: self.title,
        };
        let target = if self.block {
            Target::Block
        } else {
            Target::Page
        };

        let cancel = CancellationToken::new();
        let signal_task = tokio::spawn(cancel_on_ctrl_c(cancel.clone()));
        let result = run_conversion(client, options, id, target, cancel).await;
        signal_task.abort();
        let conversion = result?;

        write_markdown(&conversion.markdown, self.output.as_deref())?;
        if let Some(path) = &self.output {
            output.written(path, conversion.markdown.len());
        }

        report_warnings(&output, &conversion.warnings, self.fail_on_warnings)
    }
}

async fn cancel_on_ctrl_c(cancel: CancellationToken) {
    if tokio::signal::ctrl_c().await.is_ok() {
        warn!("Interrupted, cancelling conversion");
        cancel.cancel();
    }
}

/// Run a conversion on the blocking pool.
async fn run_conversion<S>(
    source: S,
    options: ConvertOptions,
    id: BlockId,
    target: Target,
    cancel: CancellationToken,
) -> Result<Conversion, CliError>
where
    S: BlockSource + 'static,
{
    let conversion = tokio::task::spawn_blocking(move || {
        let converter = Converter::new(source, options)?;
        match target {
            Target::Page => converter.convert_page(id.as_str(), &cancel),
            Target::Block => converter.convert_block(id.as_str(), &cancel),
        }
    })
    .await??;
    Ok(conversion)
}

fn write_markdown(markdown: &str, path: Option<&Path>) -> Result<(), CliError> {
    match path {
        Some(path) => std::fs::write(path, markdown)?,
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(markdown.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(())
}

fn report_warnings(output: &Output, warnings: &[Warning], fail: bool) -> Result<(), CliError> {
    if warnings.is_empty() {
        return Ok(());
    }

    output.warnings(warnings);
    if fail {
        Err(CliError::Warnings {
            count: warnings.len(),
        })
    } else {
        Ok(())
    }
}
