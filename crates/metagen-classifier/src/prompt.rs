//! Prompts for category selection and page classification

use metagen_domain::CategoryNode;

/// Builds the user prompt for one category selection call
pub struct SelectionPrompt<'a> {
    excerpt: &'a str,
    candidates: &'a [&'a CategoryNode],
    max_selections: usize,
}

impl<'a> SelectionPrompt<'a> {
    /// Create a prompt over `candidates` for `excerpt`
    pub fn new(excerpt: &'a str, candidates: &'a [&'a CategoryNode]) -> Self {
        Self {
            excerpt,
            candidates,
            max_selections: 3,
        }
    }

    /// Set the maximum number of categories the model may pick
    pub fn with_max_selections(mut self, max_selections: usize) -> Self {
        self.max_selections = max_selections;
        self
    }

    /// Candidate list, one `code: heading` line per category
    pub fn candidate_lines(&self) -> String {
        self.candidates
            .iter()
            .map(|node| format!("{}: {}", node.code, node.heading))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Build the complete selection prompt
    pub fn build(&self) -> String {
        let n = self.max_selections;
        let mut prompt = String::new();

        prompt.push_str(&format!(
            "You are tasked with selecting the most relevant Thema categories for a document based on \
             excerpts from its beginning, middle, and end. Your goal is to choose 0 to {n} categories that \
             best represent the document's content, ensuring the first category is the most relevant.\n\n"
        ));

        prompt.push_str("Here is the list of Thema categories to choose from:\n");
        prompt.push_str(&self.candidate_lines());
        prompt.push_str("\n\n");

        prompt.push_str("Now, carefully read the following excerpts from the document:\n");
        prompt.push_str("---\n");
        prompt.push_str(self.excerpt);
        prompt.push_str("\n---\n\n");

        prompt.push_str(&format!(
            "Analyze these excerpts to understand the main themes, topics, and focus of the document.\n\
             Based on your analysis, select 0 to {n} relevant Thema categories from the provided list.\n\
             Remember:\n\
             - Only use category codes that appear in the list above.\n\
             - Ensure the first category you list is the most relevant and important.\n\
             - Only select categories if they are truly applicable to the document.\n\
             - Return an empty list of categories if none of them apply.\n\n"
        ));
        prompt.push_str(OUTPUT_FORMAT_REMINDER);

        prompt
    }
}

const OUTPUT_FORMAT_REMINDER: &str = r#"Output format (JSON object only, no additional text):
{
  "categories": [
    {
      "reason": "why this category fits",
      "category_code": "code from the list",
      "category_heading": "heading from the list",
      "confidence": "LOW | MEDIUM | HIGH"
    }
  ]
}"#;

/// User prompt for classifying a single page
pub fn page_type_prompt(text: &str, page_number: Option<u32>) -> String {
    match page_number {
        Some(number) => format!(
            "Classify the following page:\n\n<page_number>{}</page_number>\n<page_text>{}</page_text>",
            number, text
        ),
        None => format!("Classify the following page:\n\n<page_text>{}</page_text>", text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nodes() -> Vec<CategoryNode> {
        vec![
            CategoryNode::new("A", "The Arts"),
            CategoryNode::new("B", "Biography, Literature and Literary studies"),
        ]
    }

    #[test]
    fn test_prompt_lists_candidates() {
        let nodes = nodes();
        let candidates: Vec<&CategoryNode> = nodes.iter().collect();
        let prompt = SelectionPrompt::new("text", &candidates);

        assert_eq!(
            prompt.candidate_lines(),
            "A: The Arts\nB: Biography, Literature and Literary studies"
        );
        assert!(prompt.build().contains("A: The Arts\nB: Biography"));
    }

    #[test]
    fn test_prompt_includes_excerpt() {
        let nodes = nodes();
        let candidates: Vec<&CategoryNode> = nodes.iter().collect();
        let prompt = SelectionPrompt::new("A history of Renaissance painting", &candidates).build();

        assert!(prompt.contains("---\nA history of Renaissance painting\n---"));
    }

    #[test]
    fn test_prompt_states_selection_bounds() {
        let nodes = nodes();
        let candidates: Vec<&CategoryNode> = nodes.iter().collect();
        let prompt = SelectionPrompt::new("text", &candidates)
            .with_max_selections(2)
            .build();

        assert!(prompt.contains("choose 0 to 2 categories"));
        assert!(prompt.contains("empty list"));
        assert!(prompt.contains("category_code"));
    }

    #[test]
    fn test_page_type_prompt() {
        assert_eq!(
            page_type_prompt("Copyright 2020", Some(4)),
            "Classify the following page:\n\n<page_number>4</page_number>\n<page_text>Copyright 2020</page_text>"
        );
        assert!(!page_type_prompt("x", None).contains("page_number"));
    }
}
