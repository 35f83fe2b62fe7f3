//! Classification result and options.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Normalized classification returned by every backend.
///
/// `confidence` is advisory; values outside `[0, 1]` are passed through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    /// Chosen category.
    pub category: String,
    /// Confidence score, nominally in `[0, 1]`.
    #[serde(default)]
    pub confidence: f64,
    /// Short summary of the content.
    #[serde(default)]
    pub summary: String,
    /// Key terms, in the order the backend returned them.
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl Classification {
    /// Create a classification with only a category.
    pub fn new(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            confidence: 0.0,
            summary: String::new(),
            keywords: Vec::new(),
        }
    }

    /// Set the confidence score.
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    /// Set the summary.
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    /// Set the keywords.
    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }
}

/// Per-call classification constraints.
///
/// An empty category list means free-form category selection. Categories
/// keep insertion order (it is the order rendered into the prompt) and are
/// de-duplicated on insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationOptions {
    #[serde(default)]
    categories: Vec<String>,
    /// Reject results whose category is outside the allow-list. When
    /// disabled, an unmatched category is returned as the backend gave it.
    #[serde(default = "default_strict")]
    pub strict: bool,
}

fn default_strict() -> bool {
    true
}

impl Default for ClassificationOptions {
    fn default() -> Self {
        Self {
            categories: Vec::new(),
            strict: true,
        }
    }
}

impl ClassificationOptions {
    /// Free-form options (no allow-list).
    pub fn new() -> Self {
        Self::default()
    }

    /// Options constrained to the given categories.
    pub fn with_categories<I, S>(categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut options = Self::default();
        for category in categories {
            options.add_category(category);
        }
        options
    }

    /// Append a category; blank and already-present entries are ignored.
    pub fn add_category(&mut self, category: impl Into<String>) {
        let category = category.into().trim().to_string();
        if !category.is_empty() && !self.categories.contains(&category) {
            self.categories.push(category);
        }
    }

    /// Set strict enforcement.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Allowed categories in insertion order.
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Whether the backend may pick any category.
    pub fn is_free_form(&self) -> bool {
        self.categories.is_empty()
    }
}

/// Metrics comparing two classifications of the same content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationComparison {
    /// Exact category equality.
    pub category_match: bool,
    /// `a.confidence - b.confidence`.
    pub confidence_diff: f64,
    /// Case-insensitive Jaccard similarity of the keyword sets.
    pub keyword_overlap: f64,
    /// Cosine similarity of the summaries' word-frequency vectors.
    pub summary_similarity: f64,
}

/// Compare two classifications, e.g. from different backends.
pub fn compare_classifications(a: &Classification, b: &Classification) -> ClassificationComparison {
    ClassificationComparison {
        category_match: a.category == b.category,
        confidence_diff: a.confidence - b.confidence,
        keyword_overlap: keyword_overlap(&a.keywords, &b.keywords),
        summary_similarity: summary_similarity(&a.summary, &b.summary),
    }
}

fn keyword_overlap(a: &[String], b: &[String]) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let set_a: HashSet<String> = a.iter().map(|k| k.to_lowercase()).collect();
    let set_b: HashSet<String> = b.iter().map(|k| k.to_lowercase()).collect();
    let intersection = set_a.intersection(&set_b).count();
    let union = set_a.union(&set_b).count();

    intersection as f64 / union as f64
}

fn word_frequencies(text: &str) -> HashMap<String, usize> {
    let mut freq = HashMap::new();
    for word in text.to_lowercase().split_whitespace() {
        *freq.entry(word.to_string()).or_insert(0) += 1;
    }
    freq
}

fn summary_similarity(a: &str, b: &str) -> f64 {
    let freq_a = word_frequencies(a);
    let freq_b = word_frequencies(b);

    let dot: usize = freq_a
        .iter()
        .filter_map(|(word, count)| freq_b.get(word).map(|other| count * other))
        .sum();
    let mag_a: usize = freq_a.values().map(|c| c * c).sum();
    let mag_b: usize = freq_b.values().map(|c| c * c).sum();

    if mag_a == 0 || mag_b == 0 {
        return 0.0;
    }

    dot as f64 / ((mag_a as f64).sqrt() * (mag_b as f64).sqrt())
}
