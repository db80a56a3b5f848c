//! Tag extraction for memory indexing
//!
//! Derives a bounded set of indexing tags from the enhanced prompt. Short
//! words and common stopwords are dropped; duplicates keep their first
//! occurrence. Callers must not rely on ordering.

const STOPWORDS: [&str; 9] = ["a", "the", "and", "of", "for", "with", "in", "on", "at"];
const MAX_TAGS: usize = 10;

/// Extract up to [`MAX_TAGS`] tags from an enhanced prompt
pub fn extract_tags(enhanced_prompt: &str) -> Vec<String> {
    let lowered = enhanced_prompt.to_lowercase().replace(',', " ");
    let mut tags: Vec<String> = Vec::new();

    for word in lowered.split_whitespace() {
        if word.chars().count() <= 3 || STOPWORDS.contains(&word) {
            continue;
        }
        if !tags.iter().any(|t| t == word) {
            tags.push(word.to_string());
        }
        if tags.len() == MAX_TAGS {
            break;
        }
    }

    tags
}
