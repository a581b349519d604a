use super::vocabulary::Vocabulary;
use regex::Regex;

/// Computes the sentiment score for a document body.
///
/// The text is lowercased, em-dash separators (`--`) are treated as spaces,
/// and words (letters plus inner hyphens) are matched against both
/// vocabulary sets. The score is `(positives - negatives) / (positives +
/// negatives)`. A document with no matching tokens scores `0.0` instead of
/// dividing by zero.
pub fn sentiment_score(content: &str, vocab: &Vocabulary) -> f32 {
    let normalized = content.to_lowercase().replace("--", " ");
    let word_re = Regex::new(r"[a-zA-Z-]+").unwrap();

    let mut num_pos = 0u32;
    let mut num_neg = 0u32;

    for word in word_re.find_iter(&normalized) {
        let word = word.as_str();
        if vocab.positives.contains(word) {
            num_pos += 1;
        }
        if vocab.negatives.contains(word) {
            num_neg += 1;
        }
    }

    let total = num_pos + num_neg;
    if total == 0 {
        // No vocabulary matches at all: the document is neutral.
        return 0.0;
    }

    (num_pos as f32 - num_neg as f32) / total as f32
}
