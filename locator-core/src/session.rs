use chrono::Utc;
use uuid::Uuid;

/// Length of the random part of a generated session id.
const SUFFIX_LEN: usize = 9;

/// Generate a session id: `session_<unix-millis>_<9 random chars>`.
pub fn generate_session_id() -> String {
    let random = Uuid::new_v4().simple().to_string();
    format!(
        "session_{}_{}",
        Utc::now().timestamp_millis(),
        &random[..SUFFIX_LEN]
    )
}

/// Use the supplied id when it is non-blank, otherwise generate one.
pub fn session_id_or_generate(supplied: Option<String>) -> String {
    match supplied {
        Some(id) if !id.trim().is_empty() => id,
        _ => generate_session_id(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_id_has_prefix_millis_and_suffix() {
        let id = generate_session_id();
        let parts: Vec<&str> = id.split('_').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "session");
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2].len(), SUFFIX_LEN);
        assert!(parts[2].chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn generated_ids_differ() {
        assert_ne!(generate_session_id(), generate_session_id());
    }

    #[test]
    fn supplied_id_is_kept() {
        assert_eq!(session_id_or_generate(Some("abc".into())), "abc");
    }

    #[test]
    fn blank_or_missing_id_is_replaced() {
        assert!(session_id_or_generate(None).starts_with("session_"));
        assert!(session_id_or_generate(Some("  ".into())).starts_with("session_"));
    }
}
