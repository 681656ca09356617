//! Property-based tests for streaming redaction.
//!
//! These tests verify the behavioral contracts of the redacting writer:
//! - No leaks: registered secrets never appear in emitted lines
//! - Idempotence: redacting already-redacted output changes nothing
//! - Pass-through: with no secrets, output equals input byte for byte
//! - Order invariance: registration order doesn't affect the output

use paramguard_secrets::{LogFilter, LogSink, MASK, RedactionPattern, SecretRegistry};
use proptest::prelude::*;
use std::io::Write;

// =============================================================================
// Strategies for generating test data
// =============================================================================

/// Secret values, including URL-hostile characters
fn secret_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z0-9]{4,12}".prop_map(String::from),
        "[a-zA-Z0-9/ +&=?.$()|-]{4,12}".prop_map(String::from),
    ]
}

/// Output lines without terminators
fn line_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 =:/%._-]{0,40}".prop_map(String::from)
}

/// Lines with secrets spliced in, literal, percent-encoded or form-encoded
fn leaky_lines_strategy() -> impl Strategy<Value = (Vec<String>, Vec<String>)> {
    prop::collection::vec(secret_strategy(), 1..4).prop_flat_map(|secrets| {
        let count = secrets.len();
        let lines = prop::collection::vec(
            (line_strategy(), 0..count, 0u8..3, line_strategy()),
            1..8,
        );
        (Just(secrets), lines).prop_map(|(secrets, parts)| {
            let lines = parts
                .into_iter()
                .map(|(before, idx, encode, after)| {
                    let secret = match encode {
                        0 => secrets[idx].clone(),
                        1 => percent_encode(&secrets[idx]),
                        _ => form_encode(&secrets[idx]),
                    };
                    format!("{before}{secret}{after}")
                })
                .collect();
            (secrets, lines)
        })
    })
}

fn percent_encode(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

fn form_encode(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

fn run(secrets: &[String], input: &[u8]) -> Vec<u8> {
    let registry = SecretRegistry::new();
    registry.add(secrets.iter().cloned());
    let mut writer = LogFilter::new(registry).decorate(Vec::new());
    writer.write_all(input).unwrap();
    writer.close().unwrap();
    writer.get_ref().clone()
}

/// Drop the "Now Redacting" marker, which is written verbatim.
fn without_marker(output: &[u8]) -> &[u8] {
    if output.starts_with(b"----- Now Redacting ") {
        let end = output.iter().position(|&b| b == b'\n').map_or(output.len(), |pos| pos + 1);
        &output[end..]
    } else {
        output
    }
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|window| window == needle)
}

// =============================================================================
// Property Tests
// =============================================================================

proptest! {
    /// Contract: no registered secret, nor its URL-encoded forms, survives
    #[test]
    fn prop_no_secret_leaks((secrets, lines) in leaky_lines_strategy()) {
        let input = lines.join("\n") + "\n";
        let output = run(&secrets, input.as_bytes());
        let output = without_marker(&output);

        for secret in &secrets {
            prop_assert!(!contains(output, secret.as_bytes()), "leaked {secret:?}");
            prop_assert!(!contains(output, percent_encode(secret).as_bytes()));
            prop_assert!(!contains(output, form_encode(secret).as_bytes()));
        }
    }

    /// Contract: a line holding only mask tokens is left as is
    #[test]
    fn prop_redaction_is_idempotent(
        secrets in prop::collection::vec("[a-z]{4,10}", 1..5),
        tokens in 0usize..5,
    ) {
        let pattern = RedactionPattern::build(&secrets).unwrap().unwrap();
        let line = vec![MASK; tokens].join(" ");
        let once = pattern.redact(line.as_bytes()).into_owned();
        prop_assert_eq!(once.as_slice(), line.as_bytes());
        let twice = pattern.redact(&once).into_owned();
        prop_assert_eq!(twice, once);
    }

    /// Contract: with an empty registry output bytes equal input bytes
    #[test]
    fn prop_empty_registry_passes_through(input in prop::collection::vec(any::<u8>(), 0..512)) {
        let output = run(&[], &input);
        prop_assert_eq!(output, input);
    }

    /// Contract: output depends on the final set, not on registration order
    #[test]
    fn prop_registration_order_irrelevant((secrets, lines) in leaky_lines_strategy()) {
        let input = lines.join("\n");
        let mut reversed = secrets.clone();
        reversed.reverse();

        prop_assert_eq!(run(&secrets, input.as_bytes()), run(&reversed, input.as_bytes()));
    }

    /// Contract: chunking of writes doesn't change the output
    #[test]
    fn prop_chunking_irrelevant(
        (secrets, lines) in leaky_lines_strategy(),
        chunk in 1usize..16,
    ) {
        let input = lines.join("\n");
        let whole = run(&secrets, input.as_bytes());

        let registry = SecretRegistry::new();
        registry.add(secrets.iter().cloned());
        let mut writer = LogFilter::new(registry).decorate(Vec::new());
        for piece in input.as_bytes().chunks(chunk) {
            writer.write_all(piece).unwrap();
        }
        writer.close().unwrap();

        prop_assert_eq!(writer.get_ref(), &whole);
    }
}
