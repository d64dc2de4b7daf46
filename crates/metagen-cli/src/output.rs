//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use metagen_domain::{BookMetadata, CategoryNode, CategoryResult, Confidence, Page};
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format a classification result.
    pub fn format_categories(&self, result: &CategoryResult) -> Result<String> {
        if self.format == OutputFormat::Json {
            return Ok(serde_json::to_string_pretty(result)?);
        }
        if result.is_empty() {
            return Ok(self.colorize("No categories apply.", "yellow"));
        }

        let mut builder = Builder::default();
        builder.push_record(["Code", "Heading", "Confidence", "Reason"]);
        for selection in result.selections() {
            builder.push_record([
                selection.code.clone(),
                selection.heading.clone(),
                self.confidence(selection.confidence),
                selection.reason.clone(),
            ]);
        }

        Ok(format!(
            "{}\n{}",
            self.table(builder),
            self.info(&format!("Total cost: {}", result.total_cost()))
        ))
    }

    /// Format a metadata record.
    pub fn format_metadata(&self, metadata: &BookMetadata) -> Result<String> {
        if self.format == OutputFormat::Json {
            return Ok(serde_json::to_string_pretty(metadata)?);
        }

        let mut builder = Builder::default();
        builder.push_record(["Field", "Value"]);
        builder.push_record(["Title", metadata.title.as_str()]);
        if let Some(subtitle) = &metadata.subtitle {
            builder.push_record(["Subtitle", subtitle.as_str()]);
        }
        builder.push_record(["Description", metadata.description.as_str()]);
        builder.push_record(["Keywords", metadata.keywords.join(", ").as_str()]);
        if let Some(publisher) = &metadata.publisher {
            builder.push_record(["Publisher", publisher.as_str()]);
        }
        if let Some(website) = &metadata.publisher_website {
            builder.push_record(["Website", website.as_str()]);
        }
        if let Some(year) = metadata.year_published {
            builder.push_record(["Year".to_string(), year.to_string()]);
        }
        builder.push_record(["Language", metadata.language.as_str()]);
        for contributor in metadata.contributors.iter().flatten() {
            builder.push_record([
                "Contributor".to_string(),
                format!("{} ({})", contributor.name, contributor.role),
            ]);
        }
        for isbn in metadata.isbns.iter().flatten() {
            let value = match &isbn.edition {
                Some(edition) => format!("{} ({})", isbn.isbn, edition),
                None => isbn.isbn.clone(),
            };
            builder.push_record(["ISBN".to_string(), value]);
        }
        builder.push_record(["Model", metadata.model.as_str()]);
        builder.push_record(["Cost".to_string(), metadata.response_cost.to_string()]);

        Ok(self.table(builder))
    }

    /// Format collected pages.
    pub fn format_pages(&self, pages: &[Page]) -> Result<String> {
        if self.format == OutputFormat::Json {
            return Ok(serde_json::to_string_pretty(pages)?);
        }
        if pages.is_empty() {
            return Ok(self.colorize("No relevant pages found.", "yellow"));
        }

        let mut builder = Builder::default();
        builder.push_record(["Page", "Type", "Confidence", "Preview"]);
        for page in pages {
            let page_type = serde_json::to_value(page.page_type.page_type)?;
            builder.push_record([
                page.page_type.page_number.to_string(),
                page_type.as_str().unwrap_or_default().to_string(),
                self.confidence(page.page_type.confidence),
                preview(&page.content, 60),
            ]);
        }

        Ok(self.table(builder))
    }

    /// Format taxonomy nodes.
    pub fn format_nodes(&self, nodes: &[&CategoryNode]) -> Result<String> {
        if self.format == OutputFormat::Json {
            return Ok(serde_json::to_string_pretty(nodes)?);
        }
        if nodes.is_empty() {
            return Ok(self.colorize("No categories found.", "yellow"));
        }

        let mut builder = Builder::default();
        builder.push_record(["Code", "Heading", "Full heading", "Notes"]);
        for node in nodes {
            builder.push_record([
                node.code.clone(),
                node.heading.clone(),
                node.full_heading.clone(),
                preview(&node.notes, 60),
            ]);
        }

        Ok(self.table(builder))
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    fn confidence(&self, confidence: Confidence) -> String {
        let color = match confidence {
            Confidence::High => "green",
            Confidence::Medium => "yellow",
            Confidence::Low => "red",
        };
        self.colorize(confidence.as_str(), color)
    }

    fn table(&self, builder: Builder) -> String {
        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));
        table.to_string()
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}

/// First `max_chars` characters of `text` on a single line.
fn preview(text: &str, max_chars: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max_chars {
        return flat;
    }
    let mut cut: String = flat.chars().take(max_chars).collect();
    cut.push('…');
    cut
}

#[cfg(test)]
mod tests {
    use super::*;
    use metagen_domain::{CategorySelection, Cost, PageKind, PageType};

    fn result() -> CategoryResult {
        CategoryResult::new(
            vec![CategorySelection::new(
                "AC",
                "History of art",
                "Covers painting",
                Confidence::High,
            )],
            Cost::from_f64(0.03),
        )
    }

    fn metadata() -> BookMetadata {
        serde_json::from_str(
            r#"{"title": "The Art of Seeing", "description": "Essays.", "keywords": ["a", "b", "c"],
                "language": "en", "year_published": 1998,
                "isbns": [{"isbn": "0306406152"}], "model": "gpt-4o"}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_categories_table() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_categories(&result()).unwrap();
        assert!(output.contains("History of art"));
        assert!(output.contains("HIGH"));
        assert!(output.contains("Total cost: 0.03"));
    }

    #[test]
    fn test_categories_json() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let output = formatter.format_categories(&result()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["selections"][0]["category_code"], "AC");
        assert_eq!(value["total_cost"], 0.03);
    }

    #[test]
    fn test_empty_categories() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_categories(&CategoryResult::default()).unwrap();
        assert!(output.contains("No categories apply"));
    }

    #[test]
    fn test_metadata_table() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_metadata(&metadata()).unwrap();
        assert!(output.contains("The Art of Seeing"));
        assert!(output.contains("1998"));
        assert!(output.contains("0306406152"));
        assert!(!output.contains("Subtitle"));
    }

    #[test]
    fn test_pages_table() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let pages = vec![Page {
            page_type: PageType {
                chain_of_thought: "copyright line".to_string(),
                page_type: PageKind::Imprint,
                confidence: Confidence::Medium,
                page_number: 4,
            },
            content: "Copyright 1998\nExample Press".to_string(),
        }];
        let output = formatter.format_pages(&pages).unwrap();
        assert!(output.contains("IMPRINT"));
        assert!(output.contains("Copyright 1998 Example Press"));
    }

    #[test]
    fn test_nodes_json() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let node = CategoryNode::new("A", "The Arts");
        let output = formatter.format_nodes(&[&node]).unwrap();
        assert!(output.contains("\"code\": \"A\""));
    }

    #[test]
    fn test_colorize_disabled() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        assert_eq!(formatter.success("test"), "✓ test");
    }

    #[test]
    fn test_preview() {
        assert_eq!(preview("short\ntext", 20), "short text");
        assert_eq!(preview("abcdef", 3), "abc…");
    }
}
