//! Integration tests for the classifier, generator and page collector

#[cfg(test)]
mod tests {
    use crate::{
        ClassifierConfig, ClassifierError, PageCollectorConfig, RelevantPageCollector,
        ThemaClassifier,
    };
    use metagen_domain::{CategoryNode, Cost, DocumentPages, PageKind};
    use metagen_llm::{LlmError, MockProvider, StructuredClient};
    use metagen_thema::ThemaIndex;
    use serde_json::json;
    use std::sync::Arc;

    type Client = StructuredClient<MockProvider>;

    fn categories(codes: &[&str]) -> String {
        let items: Vec<_> = codes
            .iter()
            .map(|code| {
                json!({
                    "reason": format!("{} fits", code),
                    "category_code": code,
                    "category_heading": format!("Heading {}", code),
                    "confidence": "HIGH",
                })
            })
            .collect();
        json!({ "categories": items }).to_string()
    }

    fn index(nodes: Vec<CategoryNode>) -> Arc<ThemaIndex> {
        Arc::new(ThemaIndex::from_nodes(nodes).unwrap())
    }

    /// A: Arts { AB: General, AC: History }, B: Biography { BG: Lives }
    fn two_level_index() -> Arc<ThemaIndex> {
        index(vec![
            CategoryNode::new("A", "Arts"),
            CategoryNode::new("AB", "General").with_parent("A"),
            CategoryNode::new("AC", "History").with_parent("A"),
            CategoryNode::new("B", "Biography"),
            CategoryNode::new("BG", "Lives").with_parent("B"),
        ])
    }

    fn classifier(
        provider: &MockProvider,
        index: Arc<ThemaIndex>,
        config: ClassifierConfig,
    ) -> ThemaClassifier<Client> {
        ThemaClassifier::new(StructuredClient::new(provider.clone()), index, config).unwrap()
    }

    #[test]
    fn test_leaf_roots_need_one_call() {
        let provider = MockProvider::new(categories(&["B", "A"]));
        let index = index(vec![
            CategoryNode::new("A", "Arts"),
            CategoryNode::new("B", "Biography"),
        ]);

        let result = classifier(&provider, index, ClassifierConfig::default())
            .classify("excerpt")
            .unwrap();

        assert_eq!(provider.call_count(), 1);
        assert_eq!(result.codes(), vec!["B", "A"]);
    }

    #[test]
    fn test_result_capped_at_max_categories() {
        let provider = MockProvider::new(categories(&["F", "E", "D", "C", "B", "A"]));
        let index = index(
            ["A", "B", "C", "D", "E", "F"]
                .iter()
                .map(|code| CategoryNode::new(*code, format!("Root {}", code)))
                .collect(),
        );

        let result = classifier(&provider, index, ClassifierConfig::default())
            .classify("excerpt")
            .unwrap();

        assert_eq!(result.codes(), vec!["F", "E", "D", "C"]);
        assert_eq!(provider.call_count(), 1);
    }

    #[test]
    fn test_branches_past_the_cap_are_still_descended() {
        let mut nodes: Vec<CategoryNode> = ["A", "B", "C", "D", "E"]
            .iter()
            .map(|code| CategoryNode::new(*code, format!("Root {}", code)))
            .collect();
        nodes.push(CategoryNode::new("EA", "Child of E").with_parent("E"));
        let provider = MockProvider::new("{}");
        provider.push_response_with_cost(categories(&["A", "B", "C", "D", "E"]), Some(0.01));
        provider.push_response_with_cost(categories(&["EA"]), Some(0.02));

        let result = classifier(&provider, index(nodes), ClassifierConfig::default())
            .classify("excerpt")
            .unwrap();

        assert_eq!(result.codes(), vec!["A", "B", "C", "D"]);
        assert_eq!(provider.call_count(), 2);
        assert_eq!(result.total_cost(), Cost::from_f64(0.03));
    }

    #[test]
    fn test_failed_branch_stops_later_branches() {
        let provider = MockProvider::new("{}");
        provider.push_response(categories(&["A", "B"]));
        provider.push_error("backend down");
        provider.push_response(categories(&["BG"]));

        let result = classifier(&provider, two_level_index(), ClassifierConfig::default())
            .classify("excerpt");

        assert!(matches!(result, Err(ClassifierError::Generation(_))));
        assert_eq!(provider.call_count(), 2);
    }

    #[test]
    fn test_costs_are_summed_exactly() {
        let provider = MockProvider::new("{}");
        provider.push_response_with_cost(categories(&["A", "B"]), Some(0.01));
        provider.push_response_with_cost(categories(&["AB"]), Some(0.02));
        provider.push_response_with_cost(categories(&["BG"]), None);

        let result = classifier(&provider, two_level_index(), ClassifierConfig::default())
            .classify("excerpt")
            .unwrap();

        assert_eq!(result.codes(), vec!["AB", "BG"]);
        assert_eq!(result.total_cost(), Cost::from_nanos(30_000_000));
        assert_eq!(result.total_cost(), Cost::from_f64(0.03));
    }

    #[test]
    fn test_empty_child_selection_stops_branch() {
        let provider = MockProvider::new("{}");
        provider.push_response(categories(&["A"]));
        provider.push_response(categories(&[]));

        let result = classifier(&provider, two_level_index(), ClassifierConfig::default())
            .classify("excerpt")
            .unwrap();

        assert_eq!(result.codes(), vec!["A"]);
        assert_eq!(provider.call_count(), 2);
    }

    #[test]
    fn test_nothing_selected_at_root() {
        let provider = MockProvider::new(categories(&[]));

        let result = classifier(&provider, two_level_index(), ClassifierConfig::default())
            .classify("excerpt")
            .unwrap();

        assert!(result.is_empty());
        assert!(result.total_cost().is_zero());
    }

    #[test]
    fn test_hallucinated_root_is_ignored() {
        let provider = MockProvider::new("{}");
        provider.push_response(categories(&["Q", "B"]));
        provider.push_response(categories(&["BG"]));

        let result = classifier(&provider, two_level_index(), ClassifierConfig::default())
            .classify("excerpt")
            .unwrap();

        assert_eq!(result.codes(), vec!["BG"]);
        assert_eq!(provider.call_count(), 2);
    }

    #[test]
    fn test_child_failure_aborts_by_default() {
        let provider = MockProvider::new("{}");
        provider.push_response(categories(&["A", "B"]));
        provider.push_response(categories(&["AC"]));
        provider.push_error("model crashed");

        let result = classifier(&provider, two_level_index(), ClassifierConfig::default())
            .classify("excerpt");

        assert!(matches!(result, Err(ClassifierError::Generation(LlmError::Other(_)))));
    }

    #[test]
    fn test_child_failure_isolated_when_configured() {
        let provider = MockProvider::new("{}");
        provider.push_response_with_cost(categories(&["A", "B"]), Some(0.5));
        provider.push_response_with_cost(categories(&["AC"]), Some(0.25));
        provider.push_error("model crashed");
        let config = ClassifierConfig {
            isolate_branch_failures: true,
            ..Default::default()
        };

        let result = classifier(&provider, two_level_index(), config)
            .classify("excerpt")
            .unwrap();

        assert_eq!(result.codes(), vec!["AC", "B"]);
        assert_eq!(result.total_cost(), Cost::from_f64(0.75));
    }

    #[test]
    fn test_root_failure_always_aborts() {
        let provider = MockProvider::new("{}");
        provider.push_error("unreachable");
        let config = ClassifierConfig {
            isolate_branch_failures: true,
            ..Default::default()
        };

        let result = classifier(&provider, two_level_index(), config).classify("excerpt");

        assert!(result.is_err());
    }

    #[test]
    fn test_parallel_branches_keep_order_and_cost() {
        let mut provider = MockProvider::new(categories(&[]));
        provider.add_response_with_cost(
            "AB: General\nAC: History",
            categories(&["AC"]),
            Some(0.02),
        );
        provider.add_response_with_cost("BG: Lives", categories(&["BG"]), Some(0.03));
        provider.add_response_with_cost(
            "A: Arts\nB: Biography",
            categories(&["B", "A"]),
            Some(0.01),
        );
        let config = ClassifierConfig {
            parallel_branches: true,
            ..Default::default()
        };

        let result = classifier(&provider, two_level_index(), config)
            .classify("excerpt")
            .unwrap();

        assert_eq!(result.codes(), vec!["BG", "AC"]);
        assert_eq!(result.total_cost(), Cost::from_f64(0.06));
        assert_eq!(provider.call_count(), 3);
    }

    #[test]
    fn test_parallel_failure_propagates() {
        let mut provider = MockProvider::new(categories(&[]));
        provider.add_error("BG: Lives");
        provider.add_response("AB: General", categories(&["AB"]));
        provider.add_response("A: Arts", categories(&["A", "B"]));
        let config = ClassifierConfig {
            parallel_branches: true,
            ..Default::default()
        };

        let result = classifier(&provider, two_level_index(), config).classify("excerpt");

        assert!(matches!(result, Err(ClassifierError::Generation(_))));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = ClassifierConfig {
            max_selections_per_call: 0,
            ..Default::default()
        };
        let result = ThemaClassifier::new(
            StructuredClient::new(MockProvider::default()),
            two_level_index(),
            config,
        );
        assert!(matches!(result, Err(ClassifierError::Config(_))));
    }

    struct Book(Vec<String>);

    impl DocumentPages for Book {
        type Error = String;

        fn page_count(&self) -> usize {
            self.0.len()
        }

        fn page_text(&self, index: usize) -> Result<String, String> {
            self.0
                .get(index)
                .cloned()
                .ok_or_else(|| format!("no page {}", index))
        }

        fn name(&self) -> &str {
            "book.pdf"
        }
    }

    fn page_reply(kind: &str, page: u32) -> String {
        json!({
            "chain_of_thought": "looked at the layout",
            "page_type": kind,
            "confidence": "MEDIUM",
            "page_number": page,
        })
        .to_string()
    }

    fn collector(provider: &MockProvider) -> RelevantPageCollector<Client> {
        RelevantPageCollector::new(
            StructuredClient::new(provider.clone()),
            PageCollectorConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_collect_front_pages() {
        let mut provider = MockProvider::new(page_reply("OTHER", 0));
        provider.add_response("<page_number>0</page_number>", page_reply("TITLE_PAGE", 0));
        provider.add_response("<page_number>1</page_number>", page_reply("IMPRINT", 1));
        provider.add_response("<page_number>3</page_number>", page_reply("TABLE_OF_CONTENTS", 3));
        let book = Book(vec![
            "The Art of Seeing".to_string(),
            "Copyright 1998 Example Press".to_string(),
            "".to_string(),
            "Contents: 1 Light 2 Shadow".to_string(),
            "Chapter one begins here".to_string(),
        ]);

        let pages = collector(&provider).collect(&book);

        let kinds: Vec<PageKind> = pages.iter().map(|p| p.page_type.page_type).collect();
        assert_eq!(kinds, vec![PageKind::TitlePage, PageKind::Imprint, PageKind::TableOfContents]);
        assert_eq!(pages[1].content, "Copyright 1998 Example Press");
        // The empty page is never sent to the model, and with an imprint
        // found there is no backward scan.
        assert_eq!(provider.call_count(), 4);
    }

    #[test]
    fn test_backward_scan_finds_imprint() {
        let mut provider = MockProvider::new(page_reply("OTHER", 0));
        provider.add_response("<page_number>0</page_number>", page_reply("TITLE_PAGE", 0));
        provider.add_response("<page_number>38</page_number>", page_reply("IMPRINT", 38));
        let book = Book((0..40).map(|i| format!("Text of page {}", i)).collect());

        let pages = collector(&provider).collect(&book);

        let kinds: Vec<PageKind> = pages.iter().map(|p| p.page_type.page_type).collect();
        assert_eq!(kinds, vec![PageKind::TitlePage, PageKind::Imprint]);
        // Pages 0..=9 forward (nine OTHER pages stop the scan), then 39 and 38
        assert_eq!(provider.call_count(), 12);
    }

    #[test]
    fn test_classification_errors_are_skipped() {
        let mut provider = MockProvider::new(page_reply("OTHER", 0));
        provider.add_error("<page_number>0</page_number>");
        provider.add_response("<page_number>1</page_number>", page_reply("IMPRINT", 1));
        let book = Book(vec!["Broken page".to_string(), "Copyright notice".to_string()]);

        let pages = collector(&provider).collect(&book);

        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].page_type.page_type, PageKind::Imprint);
    }

    #[test]
    fn test_short_book_is_not_scanned_twice() {
        let provider = MockProvider::new(page_reply("OTHER", 0));
        let book = Book(vec!["First page".to_string(), "Second page".to_string()]);

        let pages = collector(&provider).collect(&book);

        assert!(pages.is_empty());
        assert_eq!(provider.call_count(), 2);
    }
}
