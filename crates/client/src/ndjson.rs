//! Newline-delimited JSON decoding for streamed search responses.
//!
//! Lines that fail to parse are skipped: the streaming endpoint may interleave
//! non-event protocol noise with events.

use serde_json::Value;

/// Decode NDJSON text into records, preserving line order.
pub fn decode(text: &str) -> Vec<Value> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| match serde_json::from_str(line) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::trace!("Skipping malformed NDJSON line ({} bytes): {}", line.len(), e);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_skips_malformed_lines() {
        let events = decode("{\"a\":1}\nbadline\n{\"b\":2}");
        assert_eq!(events, vec![json!({"a": 1}), json!({"b": 2})]);
    }

    #[test]
    fn test_decode_trims_and_skips_blank_lines() {
        let events = decode("\n  {\"a\":1}  \r\n\r\n\t{\"b\":2}\n\n");
        assert_eq!(events, vec![json!({"a": 1}), json!({"b": 2})]);
    }

    #[test]
    fn test_decode_empty_input() {
        assert!(decode("").is_empty());
        assert!(decode("   \n \n").is_empty());
    }

    #[test]
    fn test_decode_keeps_non_object_values() {
        let events = decode("1\n\"text\"\n[1,2]");
        assert_eq!(events, vec![json!(1), json!("text"), json!([1, 2])]);
    }

    #[test]
    fn test_decode_partial_record_skipped() {
        let events = decode("{\"a\":1}\n{\"b\":");
        assert_eq!(events, vec![json!({"a": 1})]);
    }
}
