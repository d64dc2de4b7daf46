//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Metagen CLI - Generate book metadata and Thema categories from PDFs.
#[derive(Debug, Parser)]
#[command(name = "metagen")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Model for every LLM call
    #[arg(short, long, global = true, env = "METAGEN_MODEL")]
    pub model: Option<String>,

    /// LLM provider
    #[arg(long, value_enum, global = true, env = "METAGEN_PROVIDER")]
    pub provider: Option<ProviderArg>,

    /// LLM endpoint URL
    #[arg(long, global = true, env = "METAGEN_ENDPOINT")]
    pub endpoint: Option<String>,

    /// API key for the LLM provider
    #[arg(long, global = true, env = "METAGEN_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
}

/// LLM provider options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ProviderArg {
    /// OpenAI-compatible chat completions API
    Openai,
    /// Local Ollama server
    Ollama,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate bibliographic metadata for a PDF
    Generate(GenerateArgs),

    /// Classify a PDF into Thema subject categories
    Classify(ClassifyArgs),

    /// List the title, imprint and contents pages of a PDF
    Pages(PagesArgs),

    /// Inspect or download the Thema taxonomy
    Thema(ThemaArgs),
}

/// Arguments for the generate command.
#[derive(Debug, Parser)]
pub struct GenerateArgs {
    /// PDF file
    pub pdf: PathBuf,

    /// Retry budget for the generation call
    #[arg(short, long)]
    pub retries: Option<u32>,
}

/// Arguments for the classify command.
#[derive(Debug, Parser)]
pub struct ClassifyArgs {
    /// PDF file
    pub pdf: PathBuf,

    /// Descend top-level branches in parallel
    #[arg(long)]
    pub parallel: bool,

    /// Keep going when a branch below the top level fails
    #[arg(long)]
    pub isolate_failures: bool,
}

/// Arguments for the pages command.
#[derive(Debug, Parser)]
pub struct PagesArgs {
    /// PDF file
    pub pdf: PathBuf,
}

/// Arguments for taxonomy commands.
#[derive(Debug, Parser)]
pub struct ThemaArgs {
    #[command(subcommand)]
    pub action: ThemaAction,
}

/// Taxonomy actions.
#[derive(Debug, Subcommand)]
pub enum ThemaAction {
    /// Download the taxonomy and store it as the local cache file
    Fetch {
        /// Write to this file instead of the configured cache file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show one category
    Show {
        /// Category code
        code: String,
    },

    /// List the top-level categories
    Roots,

    /// List the direct children of a category
    Children {
        /// Category code
        code: String,
    },
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
        }
    }
}

impl From<ProviderArg> for crate::config::Provider {
    fn from(provider: ProviderArg) -> Self {
        match provider {
            ProviderArg::Openai => crate::config::Provider::Openai,
            ProviderArg::Ollama => crate::config::Provider::Ollama,
        }
    }
}
