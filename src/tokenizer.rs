//! Tokenizer collaborator
//!
//! The tokenizer/language pipeline is named out of scope by §1 of the spec —
//! this crate only depends on the shape of the contract. [`Tokenizer`] is
//! that contract; [`WhitespaceTokenizer`] is a minimal stand-in (lowercasing,
//! splitting on non-alphanumeric boundaries) used by this crate's own tests,
//! mirroring the reference stack's own `WhitespaceTokenizer` placeholder for
//! its pluggable tokenizer system.

/// Tokenizes free text into normalized terms. A pure function: the same
/// input always produces the same output, and empty input yields no tokens.
pub trait Tokenizer {
    fn tokenize(&self, text: &str, language: Option<&str>, property: Option<&str>) -> Vec<String>;
}

/// Splits on non-alphanumeric boundaries and lowercases each piece.
/// Ignores `language` and `property` — a real pipeline would stem and
/// apply per-language stop-word lists here.
#[derive(Debug, Default, Clone, Copy)]
pub struct WhitespaceTokenizer;

impl Tokenizer for WhitespaceTokenizer {
    fn tokenize(&self, text: &str, _language: Option<&str>, _property: Option<&str>) -> Vec<String> {
        text.split(|c: char| !c.is_alphanumeric())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_lowercase())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_and_lowercases() {
        let t = WhitespaceTokenizer;
        assert_eq!(
            t.tokenize("Hello, World!", None, None),
            vec!["hello".to_string(), "world".to_string()]
        );
    }

    #[test]
    fn empty_input_yields_no_tokens() {
        let t = WhitespaceTokenizer;
        assert!(t.tokenize("", None, None).is_empty());
        assert!(t.tokenize("   ", None, None).is_empty());
    }
}
