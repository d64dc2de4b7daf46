//! Metagen CLI - Generate book metadata and Thema categories from PDFs.

use clap::Parser;
use metagen_cli::commands;
use metagen_cli::{Cli, Command, Config, Formatter, Overrides};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Log to stderr so command output on stdout stays machine readable.
fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> metagen_cli::Result<()> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    config.apply(Overrides {
        model: cli.model,
        provider: cli.provider.map(Into::into),
        endpoint: cli.endpoint,
        api_key: cli.api_key,
    });

    // Determine output format
    let format = cli.format.map(Into::into).unwrap_or(config.settings.format);
    let color_enabled = !cli.no_color && config.settings.color;
    let formatter = Formatter::new(format, color_enabled);

    match cli.command {
        Command::Generate(args) => commands::execute_generate(args, &config, &formatter),
        Command::Classify(args) => commands::execute_classify(args, &config, &formatter),
        Command::Pages(args) => commands::execute_pages(args, &config, &formatter),
        Command::Thema(args) => commands::execute_thema(args, &config, &formatter),
    }
}
