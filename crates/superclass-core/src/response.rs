//! Decoding of backend replies and category enforcement.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::error::{ErrorCode, SuperclassError, SuperclassResult};
use crate::types::{Classification, ClassificationOptions};

static CODE_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^```[a-zA-Z0-9]*\s*\n?([\s\S]*?)\n?\s*```$").unwrap());

static THINK_TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<think>.*?</think>").unwrap());

/// Remove `<think>` sections and a wrapping markdown code fence.
pub fn strip_wrappers(content: &str) -> String {
    let content = THINK_TAGS.replace_all(content, "");
    let content = content.trim();

    CODE_FENCE
        .captures(content)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim())
        .unwrap_or(content)
        .to_string()
}

/// Decode a backend reply as JSON of type `T`.
///
/// The unparsed reply is attached to the error on failure.
pub fn decode_json<T: DeserializeOwned>(raw: &str, what: &str) -> SuperclassResult<T> {
    let cleaned = strip_wrappers(raw);
    if cleaned.is_empty() {
        return Err(SuperclassError::Decode {
            message: format!("Empty {} response", what),
            code: ErrorCode::DecEmptyResponse,
            raw: raw.to_string(),
        });
    }

    serde_json::from_str(&cleaned).map_err(|e| {
        warn!(error = %e, raw_length = raw.len(), "Failed to parse {} response", what);
        SuperclassError::decode(format!("Failed to parse {} JSON: {}", what, e), raw)
    })
}

/// Decode a backend reply into a [`Classification`].
pub fn decode_classification(raw: &str) -> SuperclassResult<Classification> {
    decode_json(raw, "classification")
}

/// Validate the category against the allow-list in `options`.
///
/// Matching is case-insensitive and rewrites the category to the
/// allow-list's casing. A category with no match fails with
/// [`SuperclassError::InvalidCategory`] when `options.strict` is set and is
/// kept unchanged otherwise. Free-form options accept any category.
pub fn enforce_category(
    classification: &mut Classification,
    options: &ClassificationOptions,
) -> SuperclassResult<()> {
    if options.is_free_form() {
        return Ok(());
    }

    let returned = classification.category.trim().to_lowercase();
    if let Some(canonical) = options
        .categories()
        .iter()
        .find(|allowed| allowed.to_lowercase() == returned)
    {
        classification.category = canonical.clone();
        return Ok(());
    }

    warn!(
        category = %classification.category,
        allowed = ?options.categories(),
        strict = options.strict,
        "Classifier returned a category outside the allow-list"
    );

    if options.strict {
        return Err(SuperclassError::invalid_category(
            classification.category.clone(),
            options.categories(),
        ));
    }
    Ok(())
}
