//! Compiled redaction pattern
//!
//! All secrets are folded into one literal alternation so a line is scanned
//! once no matter how many secrets are registered.

use crate::{MASK, RedactionError};
use regex::bytes::{NoExpand, Regex, RegexBuilder};
use std::borrow::Cow;
use url::form_urlencoded;

/// A single matcher over every registered secret and its URL-encoded forms.
#[derive(Debug, Clone)]
pub struct RedactionPattern {
    regex: Regex,
    secret_count: usize,
}

impl RedactionPattern {
    /// Build a pattern from a set of secret values.
    ///
    /// Each non-empty value contributes its literal text and, when they differ
    /// from it, its percent-encoded and form-encoded forms. Returns `Ok(None)`
    /// when there is nothing to match.
    ///
    /// # Errors
    ///
    /// Returns [`RedactionError::Pattern`] if the alternation exceeds the regex
    /// size limits.
    pub fn build<I, S>(secrets: I) -> Result<Option<Self>, RedactionError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut secret_count = 0;
        let mut alternatives: Vec<String> = Vec::new();

        for secret in secrets {
            let secret = secret.as_ref();
            if secret.is_empty() {
                continue;
            }
            secret_count += 1;
            alternatives.push(secret.to_owned());
            alternatives.extend(encoded_forms(secret));
        }

        if alternatives.is_empty() {
            return Ok(None);
        }

        // Leftmost-first matching picks the earliest alternative that matches,
        // so longer alternatives go first. Ties are broken by content to make
        // the pattern independent of registration order.
        alternatives.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        alternatives.dedup();

        let source = alternatives
            .iter()
            .map(|alternative| regex::escape(alternative))
            .collect::<Vec<_>>()
            .join("|");

        let regex = RegexBuilder::new(&source)
            .build()
            .map_err(|source| RedactionError::Pattern {
                count: secret_count,
                source,
            })?;

        Ok(Some(Self {
            regex,
            secret_count,
        }))
    }

    /// Number of secrets covered by this pattern
    #[must_use]
    pub const fn secret_count(&self) -> usize {
        self.secret_count
    }

    /// Check whether `line` contains any secret
    #[must_use]
    pub fn is_match(&self, line: &[u8]) -> bool {
        self.regex.is_match(line)
    }

    /// Replace every non-overlapping secret occurrence with [`MASK`].
    #[must_use]
    pub fn redact<'a>(&self, line: &'a [u8]) -> Cow<'a, [u8]> {
        self.regex.replace_all(line, NoExpand(MASK.as_bytes()))
    }
}

/// URL-encoded variants of `secret` that differ from the literal.
///
/// Two encodings are covered: RFC 3986 percent-encoding (`%20` for space,
/// `~` kept) and `application/x-www-form-urlencoded` (`+` for space, `*`
/// kept, `~` escaped). Encoding a `&str` cannot fail, so every secret gets its
/// variants; the only ones omitted are those identical to the literal or to
/// each other.
fn encoded_forms(secret: &str) -> Vec<String> {
    let form: String = form_urlencoded::byte_serialize(secret.as_bytes()).collect();
    let percent = urlencoding::encode(secret).into_owned();
    let mut forms = Vec::with_capacity(2);

    if form != secret {
        forms.push(form);
    }
    if percent != secret && !forms.contains(&percent) {
        forms.push(percent);
    }

    forms
}

#[cfg(test)]
mod tests {
    use super::*;

    fn redact_str(pattern: &RedactionPattern, line: &str) -> String {
        String::from_utf8(pattern.redact(line.as_bytes()).into_owned()).unwrap()
    }

    #[test]
    fn test_empty_input_builds_nothing() {
        assert!(RedactionPattern::build(Vec::<String>::new()).unwrap().is_none());
        assert!(RedactionPattern::build([""]).unwrap().is_none());
    }

    #[test]
    fn test_empty_secret_skipped() {
        let pattern = RedactionPattern::build(["", "abc"]).unwrap().unwrap();
        assert_eq!(pattern.secret_count(), 1);
        assert_eq!(redact_str(&pattern, "xyz"), "xyz");
    }

    #[test]
    fn test_simple_redaction() {
        let pattern = RedactionPattern::build(["s3cr3t"]).unwrap().unwrap();
        assert_eq!(redact_str(&pattern, "token=s3cr3t end"), "token=******** end");
    }

    #[test]
    fn test_repeated_secret() {
        let pattern = RedactionPattern::build(["secret"]).unwrap().unwrap();
        assert_eq!(
            redact_str(&pattern, "secret appears twice: secret"),
            "******** appears twice: ********"
        );
    }

    #[test]
    fn test_percent_encoded_form() {
        let pattern = RedactionPattern::build(["a/b c"]).unwrap().unwrap();
        assert_eq!(redact_str(&pattern, "url?x=a%2Fb%20c"), "url?x=********");
        assert_eq!(redact_str(&pattern, "raw a/b c"), "raw ********");
    }

    #[test]
    fn test_form_encoded_form() {
        let pattern = RedactionPattern::build(["a/b c"]).unwrap().unwrap();
        assert_eq!(redact_str(&pattern, "q=a%2Fb+c"), "q=********");
    }

    #[test]
    fn test_form_encoding_keeps_asterisk() {
        let pattern = RedactionPattern::build(["a*b c"]).unwrap().unwrap();
        assert_eq!(redact_str(&pattern, "q=a*b+c"), "q=********");
        assert_eq!(redact_str(&pattern, "q=a%2Ab%20c"), "q=********");
    }

    #[test]
    fn test_form_encoding_escapes_tilde() {
        let pattern = RedactionPattern::build(["a~b"]).unwrap().unwrap();
        assert_eq!(redact_str(&pattern, "q=a%7Eb"), "q=********");
        assert_eq!(redact_str(&pattern, "q=a~b"), "q=********");
    }

    #[test]
    fn test_encoded_forms() {
        assert!(encoded_forms("plain-value_1.0").is_empty());
        assert_eq!(encoded_forms("a/b"), vec!["a%2Fb".to_string()]);
        assert_eq!(encoded_forms("a~b"), vec!["a%7Eb".to_string()]);
        assert_eq!(encoded_forms("a*b"), vec!["a%2Ab".to_string()]);
        assert_eq!(
            encoded_forms("a b"),
            vec!["a+b".to_string(), "a%20b".to_string()]
        );
    }

    #[test]
    fn test_literal_overlapping_encoded_form() {
        // "%2F" is both part of the literal and what '/' encodes to
        let pattern = RedactionPattern::build(["x%2F/"]).unwrap().unwrap();
        assert_eq!(redact_str(&pattern, "[x%2F/]"), "[********]");
        assert_eq!(redact_str(&pattern, "[x%252F%2F]"), "[********]");
    }

    #[test]
    fn test_metacharacters_are_literal() {
        let pattern = RedactionPattern::build(["pass$word.*(x|y)"]).unwrap().unwrap();
        assert_eq!(redact_str(&pattern, "the pass$word.*(x|y) is"), "the ******** is");
        assert_eq!(redact_str(&pattern, "the passXwordAAx is"), "the passXwordAAx is");
    }

    #[test]
    fn test_longest_secret_wins() {
        let pattern = RedactionPattern::build(["abc", "abcd"]).unwrap().unwrap();
        assert_eq!(redact_str(&pattern, "xabcdx"), "x********x");
        assert_eq!(redact_str(&pattern, "xabcx"), "x********x");
    }

    #[test]
    fn test_order_independent() {
        let forward = RedactionPattern::build(["pass", "password", "word"]).unwrap().unwrap();
        let backward = RedactionPattern::build(["word", "password", "pass"]).unwrap().unwrap();
        let line = "password passport sword";
        assert_eq!(redact_str(&forward, line), redact_str(&backward, line));
        assert_eq!(redact_str(&forward, line), "******** ********port s********");
    }

    #[test]
    fn test_is_match() {
        let pattern = RedactionPattern::build(["needle"]).unwrap().unwrap();
        assert!(pattern.is_match(b"hay needle hay"));
        assert!(!pattern.is_match(b"hay hay"));
    }

    #[test]
    fn test_non_utf8_bytes_pass_through() {
        let pattern = RedactionPattern::build(["key"]).unwrap().unwrap();
        let line = b"\xff\xfe key \xc0";
        assert_eq!(pattern.redact(line).as_ref(), b"\xff\xfe ******** \xc0");
    }

    #[test]
    fn test_no_match_borrows() {
        let pattern = RedactionPattern::build(["key"]).unwrap().unwrap();
        assert!(matches!(pattern.redact(b"nothing"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_unicode_secret() {
        let pattern = RedactionPattern::build(["pässwörd"]).unwrap().unwrap();
        assert_eq!(redact_str(&pattern, "pw=pässwörd"), "pw=********");
        assert_eq!(redact_str(&pattern, "pw=p%C3%A4ssw%C3%B6rd"), "pw=********");
    }
}
