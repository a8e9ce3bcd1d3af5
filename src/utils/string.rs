//! String manipulation utilities

/// Pluralize a word based on count
pub fn pluralize(word: &str, count: usize) -> String {
    if count == 1 {
        word.to_string()
    } else if word.ends_with("y") && !word.ends_with("ey") {
        format!("{}ies", &word[..word.len() - 1])
    } else if word.ends_with("ss") {
        format!("{word}es")
    } else {
        format!("{word}s")
    }
}

/// Render `count word` with the word pluralized, e.g. "3 classes"
pub fn counted(count: usize, word: &str) -> String {
    format!("{count} {}", pluralize(word, count))
}
