//! Bibliographic metadata produced from a book excerpt

use crate::cost::Cost;
use crate::traits::ResponseShape;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Earliest accepted publication year
pub const MIN_YEAR_PUBLISHED: i32 = 1450;

/// Latest accepted publication year
pub const MAX_YEAR_PUBLISHED: i32 = 2100;

/// Minimum number of keywords
pub const MIN_KEYWORDS: usize = 3;

/// Maximum number of keywords
pub const MAX_KEYWORDS: usize = 7;

/// A person or organisation that contributed to the book
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Contributor {
    /// The full name of the contributor
    pub name: String,
    /// The role of the contributor (author, editor, translator, ...)
    pub role: String,
}

/// An ISBN and the edition it identifies
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct BookIsbn {
    /// ISBN-10 or ISBN-13
    #[schemars(description = "The ISBN number (Only the number without prefix or dashes)")]
    pub isbn: String,
    /// The book edition to which the ISBN belongs
    #[serde(default)]
    pub edition: Option<String>,
}

impl BookIsbn {
    /// The ISBN without hyphens or spaces
    pub fn digits(&self) -> String {
        normalize_isbn(&self.isbn)
    }

    /// Whether the ISBN has a valid length and check digit
    pub fn is_valid(&self) -> bool {
        is_valid_isbn(&self.isbn)
    }
}

/// Primary metadata record for a book
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BookMetadata {
    /// The title of the book
    pub title: String,

    /// The subtitle of the book
    #[serde(default)]
    pub subtitle: Option<String>,

    /// A short and concise description of the book
    pub description: String,

    /// Keywords that apply to the book's topic
    #[schemars(length(min = 3, max = 7))]
    pub keywords: Vec<String>,

    /// The name of the publisher
    #[serde(default)]
    pub publisher: Option<String>,

    /// Website URL of the publisher
    #[serde(default)]
    pub publisher_website: Option<String>,

    /// The year of publication
    #[serde(default)]
    #[schemars(range(min = 1450, max = 2100))]
    pub year_published: Option<i32>,

    /// Language of the book as ISO 639-1 alpha-2
    pub language: String,

    /// People and organisations involved
    #[serde(default)]
    pub contributors: Option<Vec<Contributor>>,

    /// Known ISBNs
    #[serde(default)]
    pub isbns: Option<Vec<BookIsbn>>,

    /// Model that produced the record
    #[serde(default)]
    #[schemars(skip)]
    pub model: String,

    /// Cost of the completion that produced the record
    #[serde(default)]
    #[schemars(skip)]
    pub response_cost: Cost,
}

impl ResponseShape for BookMetadata {
    const NAME: &'static str = "BookMetadata";

    fn validate(&self) -> Result<(), String> {
        let mut problems = Vec::new();

        if self.title.trim().is_empty() {
            problems.push("title is empty".to_string());
        }
        if self.description.trim().is_empty() {
            problems.push("description is empty".to_string());
        }
        if !(MIN_KEYWORDS..=MAX_KEYWORDS).contains(&self.keywords.len()) {
            problems.push(format!(
                "keywords must contain {} to {} items, got {}",
                MIN_KEYWORDS,
                MAX_KEYWORDS,
                self.keywords.len()
            ));
        }
        if !is_language_alpha2(&self.language) {
            problems.push(format!(
                "language '{}' is not an ISO 639-1 alpha-2 code",
                self.language
            ));
        }
        if let Some(year) = self.year_published {
            if !(MIN_YEAR_PUBLISHED..=MAX_YEAR_PUBLISHED).contains(&year) {
                problems.push(format!(
                    "year_published {} out of range [{}, {}]",
                    year, MIN_YEAR_PUBLISHED, MAX_YEAR_PUBLISHED
                ));
            }
        }
        if let Some(url) = &self.publisher_website {
            if !is_http_url(url) {
                problems.push(format!("publisher_website '{}' is not an http(s) URL", url));
            }
        }
        for contributor in self.contributors.iter().flatten() {
            if contributor.name.trim().is_empty() {
                problems.push("contributor name is empty".to_string());
            }
        }
        for isbn in self.isbns.iter().flatten() {
            if !isbn.is_valid() {
                problems.push(format!("'{}' is not a valid ISBN", isbn.isbn));
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(problems.join("; "))
        }
    }
}

/// Strip hyphens and spaces from an ISBN
pub fn normalize_isbn(isbn: &str) -> String {
    isbn.chars().filter(|c| !matches!(c, '-' | ' ')).collect()
}

/// Validate an ISBN-10 or ISBN-13 check digit
pub fn is_valid_isbn(isbn: &str) -> bool {
    let digits = normalize_isbn(isbn);
    let chars: Vec<char> = digits.chars().collect();
    match chars.len() {
        10 => {
            let mut sum = 0u32;
            for (i, c) in chars.iter().enumerate() {
                let value = match c {
                    'X' | 'x' if i == 9 => 10,
                    _ => match c.to_digit(10) {
                        Some(d) => d,
                        None => return false,
                    },
                };
                sum += value * (10 - i as u32);
            }
            sum % 11 == 0
        }
        13 => {
            let mut sum = 0u32;
            for (i, c) in chars.iter().enumerate() {
                let Some(d) = c.to_digit(10) else {
                    return false;
                };
                sum += if i % 2 == 0 { d } else { d * 3 };
            }
            sum % 10 == 0
        }
        _ => false,
    }
}

fn is_language_alpha2(code: &str) -> bool {
    code.len() == 2 && code.chars().all(|c| c.is_ascii_alphabetic())
}

fn is_http_url(url: &str) -> bool {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"));
    matches!(rest, Some(host) if !host.is_empty() && !host.starts_with('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> BookMetadata {
        BookMetadata {
            title: "The Rust Programming Language".to_string(),
            subtitle: None,
            description: "An introduction to Rust.".to_string(),
            keywords: vec!["rust".into(), "programming".into(), "systems".into()],
            publisher: Some("No Starch Press".to_string()),
            publisher_website: Some("https://nostarch.com".to_string()),
            year_published: Some(2019),
            language: "en".to_string(),
            contributors: Some(vec![Contributor {
                name: "Steve Klabnik".to_string(),
                role: "author".to_string(),
            }]),
            isbns: Some(vec![BookIsbn {
                isbn: "978-1-7185-0044-0".to_string(),
                edition: Some("2nd".to_string()),
            }]),
            model: String::new(),
            response_cost: Cost::ZERO,
        }
    }

    #[test]
    fn test_valid_metadata() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn test_keyword_bounds() {
        let mut metadata = sample();
        metadata.keywords.truncate(2);
        assert!(metadata.validate().unwrap_err().contains("keywords"));

        metadata.keywords = (0..8).map(|i| format!("k{}", i)).collect();
        assert!(metadata.validate().is_err());
    }

    #[test]
    fn test_year_bounds() {
        let mut metadata = sample();
        metadata.year_published = Some(3000);
        assert!(metadata.validate().unwrap_err().contains("year_published"));
    }

    #[test]
    fn test_language_code() {
        let mut metadata = sample();
        metadata.language = "english".to_string();
        assert!(metadata.validate().unwrap_err().contains("language"));
    }

    #[test]
    fn test_reports_all_problems() {
        let mut metadata = sample();
        metadata.title = String::new();
        metadata.publisher_website = Some("nostarch.com".to_string());
        let err = metadata.validate().unwrap_err();
        assert!(err.contains("title"));
        assert!(err.contains("publisher_website"));
    }

    #[test]
    fn test_isbn_check_digits() {
        assert!(is_valid_isbn("9781718500440"));
        assert!(is_valid_isbn("978-1-7185-0044-0"));
        assert!(is_valid_isbn("0-306-40615-2"));
        assert!(is_valid_isbn("080442957X"));
        assert!(!is_valid_isbn("9781718500441"));
        assert!(!is_valid_isbn("12345"));
        assert!(!is_valid_isbn("97817185004X0"));
    }

    #[test]
    fn test_provenance_fields_default_when_missing() {
        let json = r#"{
            "title": "T",
            "description": "D",
            "keywords": ["a", "b", "c"],
            "language": "de"
        }"#;
        let metadata: BookMetadata = serde_json::from_str(json).unwrap();
        assert_eq!(metadata.model, "");
        assert!(metadata.response_cost.is_zero());
        assert!(metadata.contributors.is_none());
        assert!(metadata.validate().is_ok());
    }

    #[test]
    fn test_schema_excludes_provenance() {
        let schema = <BookMetadata as ResponseShape>::json_schema();
        let properties = schema["properties"].as_object().unwrap();
        assert!(properties.contains_key("title"));
        assert!(properties.contains_key("isbns"));
        assert!(!properties.contains_key("model"));
        assert!(!properties.contains_key("response_cost"));
    }

    #[test]
    fn test_schema_matches_validation_bounds() {
        let schema = <BookMetadata as ResponseShape>::json_schema();
        let keywords = &schema["properties"]["keywords"];
        assert_eq!(keywords["minItems"], MIN_KEYWORDS);
        assert_eq!(keywords["maxItems"], MAX_KEYWORDS);

        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|v| v.as_str())
            .collect();
        for field in ["title", "description", "keywords", "language"] {
            assert!(required.contains(&field), "{} should be required", field);
        }
        assert!(!required.contains(&"subtitle"));
        assert!(!required.contains(&"year_published"));
    }
}
