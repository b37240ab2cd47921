use std::ascii;

/// Renders arbitrary bytes as printable ASCII for logging, escaping anything
/// else (so `\r\n` shows up as `\\r\\n`).
pub fn bytes_to_human_str(input: &[u8]) -> String {
    input
        .iter()
        .flat_map(|&c| ascii::escape_default(c))
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes_to_human_str() {
        assert_eq!(bytes_to_human_str(b"plain text"), "plain text");
        assert_eq!(bytes_to_human_str(b"a\r\nb\t"), "a\\r\\nb\\t");
        assert_eq!(bytes_to_human_str(&[0xff, b'"']), "\\xff\\\"");
    }
}
