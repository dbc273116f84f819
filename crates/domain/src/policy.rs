//! Category inference and candidate filtering policies

use crate::model::FeedItem;

/// Category assigned when no rule matches
pub const DEFAULT_CATEGORY: &str = "General";

/// Domains that mark a candidate as placeholder/demo data
const PLACEHOLDER_DOMAINS: &[&str] = &["example.com", "example.org", "example.net"];

/// Port for category inference over a headline
///
/// The default implementation is a keyword table; a future ML classifier
/// slots in behind the same trait.
pub trait Categorizer: Send + Sync {
    fn categorize(&self, title: &str) -> String;
}

/// One ordered categorization rule: any keyword hit assigns the category
#[derive(Debug, Clone)]
pub struct CategoryRule {
    pub category: &'static str,
    pub keywords: &'static [&'static str],
}

/// Deterministic first-match-wins keyword categorizer
///
/// Matching is a case-insensitive substring check over the title; rules are
/// evaluated in order and the first hit wins.
#[derive(Debug, Clone)]
pub struct KeywordCategorizer {
    rules: Vec<CategoryRule>,
}

impl KeywordCategorizer {
    pub fn new(rules: Vec<CategoryRule>) -> Self {
        Self { rules }
    }
}

impl Default for KeywordCategorizer {
    fn default() -> Self {
        Self::new(vec![
            CategoryRule {
                category: "AI",
                keywords: &["ai", "machine learning"],
            },
            CategoryRule {
                category: "Web Development",
                keywords: &["javascript", "react"],
            },
            CategoryRule {
                category: "Finance",
                keywords: &["finance", "stock"],
            },
            CategoryRule {
                category: "Health",
                keywords: &["health", "covid"],
            },
        ])
    }
}

impl Categorizer for KeywordCategorizer {
    fn categorize(&self, title: &str) -> String {
        let title = title.to_lowercase();
        for rule in &self.rules {
            if rule.keywords.iter().any(|kw| title.contains(kw)) {
                return rule.category.to_string();
            }
        }
        DEFAULT_CATEGORY.to_string()
    }
}

/// Whether a normalized candidate may enter the pipeline
///
/// Rejects empty and non-HTTP(S) URLs and known placeholder domains.
pub fn acceptable_url(url: &str) -> bool {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return false;
    }
    let host = url
        .split('/')
        .nth(2)
        .map(|h| h.split(':').next().unwrap_or(h))
        .unwrap_or("");
    !PLACEHOLDER_DOMAINS
        .iter()
        .any(|d| host == *d || host.ends_with(&format!(".{d}")))
}

/// Filter candidates down to those with acceptable URLs
pub fn filter_candidates(items: Vec<FeedItem>) -> Vec<FeedItem> {
    items
        .into_iter()
        .filter(|item| {
            let ok = acceptable_url(&item.url);
            if !ok {
                tracing::debug!(url = %item.url, "Discarding candidate with unusable URL");
            }
            ok
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categorizer_assigns_expected_categories() {
        let categorizer = KeywordCategorizer::default();

        assert_eq!(categorizer.categorize("New AI model released"), "AI");
        assert_eq!(categorizer.categorize("React 19 ships"), "Web Development");
        assert_eq!(categorizer.categorize("Stock markets rally"), "Finance");
        assert_eq!(categorizer.categorize("COVID vaccine update"), "Health");
        assert_eq!(categorizer.categorize("Local council meeting"), "General");
    }

    #[test]
    fn categorizer_is_case_insensitive() {
        let categorizer = KeywordCategorizer::default();
        assert_eq!(categorizer.categorize("MACHINE LEARNING breakthrough"), "AI");
    }

    #[test]
    fn first_matching_rule_wins() {
        let categorizer = KeywordCategorizer::default();
        // "AI" rule precedes "Finance"
        assert_eq!(categorizer.categorize("AI trading hits the stock market"), "AI");
    }

    #[test]
    fn rejects_missing_and_non_http_urls() {
        assert!(!acceptable_url(""));
        assert!(!acceptable_url("ftp://files.somewhere.net/a"));
        assert!(!acceptable_url("not a url"));
        assert!(acceptable_url("http://news.site/a"));
        assert!(acceptable_url("https://news.site/a"));
    }

    #[test]
    fn rejects_placeholder_domains() {
        assert!(!acceptable_url("https://example.com/story"));
        assert!(!acceptable_url("https://www.example.com/story"));
        assert!(!acceptable_url("http://example.org/story"));
        // Not fooled by placeholder names in the path
        assert!(acceptable_url("https://news.site/example.com"));
    }
}
