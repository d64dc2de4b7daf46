//! Generate command implementation.

use crate::cli::GenerateArgs;
use crate::commands::build_client;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use crate::pdf::PdfDocument;
use metagen_classifier::MetadataGenerator;
use metagen_domain::{extract_excerpt, PageSelection};
use tracing::info;

/// Execute the generate command.
pub fn execute_generate(args: GenerateArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let document = PdfDocument::open(&args.pdf)?;
    let generator = MetadataGenerator::new(build_client(config)?, config.generator.clone())?;

    let metadata = match args.retries {
        None => generator.generate_for_document(&document)?,
        Some(retries) => {
            let excerpt = extract_excerpt(&document, PageSelection::METADATA)?;
            generator.generate(&excerpt, None, Some(retries))?
        }
    };
    info!("Generated metadata for {}", args.pdf.display());

    println!("{}", formatter.format_metadata(&metadata)?);
    Ok(())
}
