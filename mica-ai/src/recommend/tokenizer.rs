//! Word tokenization for recommendation documents

/// Lowercased unicode word tokens, at least two characters long
pub fn words(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() >= 2)
        .map(str::to_string)
        .collect()
}

/// Unigrams plus adjacent-pair bigrams over the word stream
pub fn ngrams(text: &str) -> Vec<String> {
    let words = words(text);
    let mut tokens = Vec::with_capacity(words.len() * 2);
    for pair in words.windows(2) {
        tokens.push(format!("{} {}", pair[0], pair[1]));
    }
    tokens.extend(words);
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn words_are_lowercased_and_split_on_punctuation() {
        assert_eq!(
            words("Python, React/Node.js"),
            vec!["python", "react", "node", "js"]
        );
    }

    #[test]
    fn single_character_tokens_are_dropped() {
        assert_eq!(words("r c 파이썬 go"), vec!["파이썬", "go"]);
    }

    #[test]
    fn korean_and_digit_runs_survive() {
        assert_eq!(words("career3 대졸이상"), vec!["career3", "대졸이상"]);
    }

    #[test]
    fn ngrams_include_bigrams() {
        let tokens = ngrams("spring boot mysql");
        assert!(tokens.contains(&"spring".to_string()));
        assert!(tokens.contains(&"spring boot".to_string()));
        assert!(tokens.contains(&"boot mysql".to_string()));
        assert!(!tokens.contains(&"spring mysql".to_string()));
    }

    #[test]
    fn empty_text_yields_no_tokens() {
        assert!(ngrams("  , ;  ").is_empty());
    }
}
