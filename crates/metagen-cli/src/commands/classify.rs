//! Classify command implementation.

use crate::cli::ClassifyArgs;
use crate::commands::build_client;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use crate::pdf::PdfDocument;
use metagen_classifier::ThemaClassifier;
use metagen_thema::ThemaIndex;
use std::sync::Arc;

/// Execute the classify command.
pub fn execute_classify(args: ClassifyArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let document = PdfDocument::open(&args.pdf)?;
    let index = ThemaIndex::load(&config.thema_source()?)?;

    let mut settings = config.classifier.clone();
    settings.parallel_branches |= args.parallel;
    settings.isolate_branch_failures |= args.isolate_failures;

    let classifier = ThemaClassifier::new(build_client(config)?, Arc::new(index), settings)?;
    let result = classifier.classify_document(&document)?;

    println!("{}", formatter.format_categories(&result)?);
    Ok(())
}
