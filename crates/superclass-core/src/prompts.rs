//! Prompt templates for classification.

use crate::traits::Prompt;
use crate::types::ClassificationOptions;

/// System prompt sent with every classification request.
pub const CLASSIFICATION_SYSTEM_PROMPT: &str =
    "You are a content classification expert. Always respond in valid JSON format.";

/// Build the user instruction for classifying `text`.
///
/// With an allow-list the instruction enumerates the categories in
/// insertion order and requires the result to pick one of them; otherwise
/// the backend chooses the category freely.
pub fn classification_prompt(text: &str, options: &ClassificationOptions) -> String {
    if options.is_free_form() {
        return format!(
            "Analyze the following text and provide a JSON response with these fields:\n\
             \t- category: The main category/topic of the content\n\
             \t- confidence: A confidence score between 0 and 1\n\
             \t- summary: A brief summary of the content (max 100 words)\n\
             \t- keywords: Up to 5 key terms or phrases from the content\n\n\
             Text to analyze:\n{}",
            text
        );
    }

    format!(
        "Analyze the following text and classify it into one of these categories: {}\n\n\
         Provide a JSON response with these fields:\n\
         \t- category: One of the categories listed above that best matches the content\n\
         \t- confidence: A confidence score between 0 and 1 indicating how well the content matches the chosen category\n\
         \t- summary: A brief summary of the content (max 100 words)\n\
         \t- keywords: Up to 5 key terms or phrases from the content\n\n\
         Text to analyze:\n{}",
        options.categories().join(", "),
        text
    )
}

/// System and user prompt for a classification call.
pub fn build_classification_prompt(text: &str, options: &ClassificationOptions) -> Prompt {
    Prompt::new(CLASSIFICATION_SYSTEM_PROMPT, classification_prompt(text, options))
}
