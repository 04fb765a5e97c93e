use rust_stemmers::{Algorithm, Stemmer};

/// Tokens shorter than this are left unstemmed.
const MIN_STEM_LEN: usize = 4;

/// Lowercases, replaces everything outside `[a-z0-9]` with spaces, splits on
/// whitespace and optionally stems tokens of four or more characters.
pub fn tokenize(text: &str, stemmer: Option<&Stemmer>) -> Vec<String> {
    let normalized: String = text
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_lowercase() || c.is_ascii_digit() { c } else { ' ' })
        .collect();

    normalized
        .split_whitespace()
        .map(|tok| match stemmer {
            Some(s) if tok.len() >= MIN_STEM_LEN => s.stem(tok).into_owned(),
            _ => tok.to_string(),
        })
        .filter(|tok| !tok.is_empty())
        .collect()
}

/// Snowball English (Porter2). Classic Porter stems a few inflections
/// differently, so scores can drift slightly from Porter-based ROUGE tools.
pub fn english_stemmer() -> Stemmer {
    Stemmer::create(Algorithm::English)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn punctuation_and_case_are_dropped() {
        assert_eq!(
            tokenize("The Cat, sat!", None),
            vec!["the".to_string(), "cat".into(), "sat".into()]
        );
    }

    #[test]
    fn non_ascii_letters_become_separators() {
        assert_eq!(tokenize("naïve café", None), vec!["na", "ve", "caf"]);
    }

    #[test]
    fn long_tokens_are_stemmed() {
        let s = english_stemmer();
        assert_eq!(tokenize("running fevers", Some(&s)), vec!["run", "fever"]);
        // three letters stay as written
        assert_eq!(tokenize("was", Some(&s)), vec!["was"]);
    }
}
