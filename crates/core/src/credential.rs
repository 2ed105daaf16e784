//! Credential masking for diagnostics and persisted deck metadata.

/// Placeholder shown in place of hidden credential characters.
pub const MASK: &str = "••••••••";

/// Mask an API key so it can appear in logs or deck metadata.
///
/// Short keys are hidden entirely; longer keys keep their first four and
/// last two characters so a user can tell which key was used.
pub fn mask_credential(key: &str) -> String {
    if key.is_empty() {
        return String::new();
    }

    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return MASK.to_string();
    }

    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();
    format!("{head}{MASK}{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_empty() {
        assert_eq!(mask_credential(""), "");
    }

    #[test]
    fn test_mask_short_key_fully_hidden() {
        assert_eq!(mask_credential("abc"), MASK);
        assert_eq!(mask_credential("12345678"), MASK);
    }

    #[test]
    fn test_mask_long_key_keeps_edges() {
        assert_eq!(mask_credential("sk-abcdefghijkl"), format!("sk-a{MASK}kl"));
        assert!(!mask_credential("sk-abcdefghijkl").contains("bcdefghij"));
    }
}
