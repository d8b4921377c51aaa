//! State / federation code extraction
//!
//! Pairing-tool identifiers carry the state in two shapes:
//! - `IND/KA/1234`: second `/` segment is the state
//! - `MH123456`: two-letter prefix followed by digits
//!
//! The prefix form is ambiguous when the letters are also a federation code
//! (`US123456`), so it is flagged for operator confirmation.

use serde::{Deserialize, Serialize};

/// Two-letter codes that also name a federation
pub const DEFAULT_FLAGGED_FEDERATIONS: &[&str] =
    &["US", "UK", "EU", "AU", "NZ", "SG", "AE", "QA", "CN"];

/// Extracted state code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateCode {
    pub code: String,
    /// Code is also a flagged federation code; advisory only
    pub federation_collision: bool,
}

/// Extract a state code from an identifier string
pub fn extract_state_code<S: AsRef<str>>(identifier: &str, flagged: &[S]) -> Option<StateCode> {
    let identifier = identifier.trim();
    if identifier.is_empty() {
        return None;
    }

    let segments: Vec<&str> = identifier.split('/').map(str::trim).collect();
    if segments.len() >= 2 && is_two_uppercase(segments[1]) {
        return Some(StateCode {
            code: segments[1].to_string(),
            federation_collision: false,
        });
    }

    let chars: Vec<char> = identifier.chars().take(3).collect();
    if chars.len() == 3
        && chars[0].is_ascii_alphabetic()
        && chars[1].is_ascii_alphabetic()
        && chars[2].is_ascii_digit()
    {
        let code: String = chars[..2].iter().collect::<String>().to_ascii_uppercase();
        let federation_collision = flagged.iter().any(|f| f.as_ref().eq_ignore_ascii_case(&code));
        if federation_collision {
            tracing::debug!(identifier, code = %code, "state code collides with a federation code");
        }
        return Some(StateCode {
            code,
            federation_collision,
        });
    }

    None
}

fn is_two_uppercase(segment: &str) -> bool {
    segment.len() == 2 && segment.chars().all(|c| c.is_ascii_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slash_segment() {
        let state = extract_state_code("IND/KA/1234", DEFAULT_FLAGGED_FEDERATIONS).unwrap();
        assert_eq!(state.code, "KA");
        assert!(!state.federation_collision);
    }

    #[test]
    fn test_prefix_without_collision() {
        let state = extract_state_code("MH123456", DEFAULT_FLAGGED_FEDERATIONS).unwrap();
        assert_eq!(state.code, "MH");
        assert!(!state.federation_collision);
    }

    #[test]
    fn test_prefix_with_collision() {
        let state = extract_state_code("US123456", DEFAULT_FLAGGED_FEDERATIONS).unwrap();
        assert_eq!(state.code, "US");
        assert!(state.federation_collision);
    }

    #[test]
    fn test_lowercase_second_segment_falls_through() {
        // "ka" is not two uppercase letters and "IN" is followed by "D", not a digit
        assert_eq!(extract_state_code("IND/ka/1234", DEFAULT_FLAGGED_FEDERATIONS), None);
    }

    #[test]
    fn test_no_code() {
        assert_eq!(extract_state_code("25012345", DEFAULT_FLAGGED_FEDERATIONS), None);
        assert_eq!(extract_state_code("", DEFAULT_FLAGGED_FEDERATIONS), None);
        assert_eq!(extract_state_code("K1", DEFAULT_FLAGGED_FEDERATIONS), None);
    }

    #[test]
    fn test_custom_flagged_set() {
        let flagged = vec!["MH".to_string()];
        let state = extract_state_code("mh99", &flagged).unwrap();
        assert_eq!(state.code, "MH");
        assert!(state.federation_collision);
    }
}
