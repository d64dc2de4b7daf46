//! Pages command implementation.

use crate::cli::PagesArgs;
use crate::commands::build_client;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use crate::pdf::PdfDocument;
use metagen_classifier::RelevantPageCollector;

/// Execute the pages command.
pub fn execute_pages(args: PagesArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let document = PdfDocument::open(&args.pdf)?;
    let collector = RelevantPageCollector::new(build_client(config)?, config.pages.clone())?;

    let pages = collector.collect(&document);

    println!("{}", formatter.format_pages(&pages)?);
    Ok(())
}
