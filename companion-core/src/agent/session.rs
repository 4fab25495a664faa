//! Conversation-scoped session identifiers

use uuid::Uuid;

/// Length of the random suffix appended to a session prefix
const SUFFIX_LEN: usize = 16;

/// Generator for the identifier a view sends with every turn.
///
/// Identifiers look like `learner-session-3f9a0c7d1e2b4a68`. The suffix is
/// taken from a v4 UUID, so two views in one process collide only with
/// negligible probability. Nothing here touches I/O or can fail.
pub struct SessionIdentity;

impl SessionIdentity {
    /// Generate a new identifier with the given prefix
    pub fn create(prefix: &str) -> String {
        let random = Uuid::new_v4().simple().to_string();
        let suffix = &random[..SUFFIX_LEN];
        let prefix = prefix.trim().trim_end_matches('-');

        if prefix.is_empty() {
            format!("session-{}", suffix)
        } else {
            format!("{}-{}", prefix, suffix)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_create_shape() {
        let id = SessionIdentity::create("frontend-session");
        let suffix = id.strip_prefix("frontend-session-").unwrap();
        assert_eq!(suffix.len(), SUFFIX_LEN);
        assert!(suffix.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_blank_prefix_gets_default() {
        assert!(SessionIdentity::create("").starts_with("session-"));
        assert!(SessionIdentity::create("quiz-").starts_with("quiz-"));
        assert!(!SessionIdentity::create("quiz-").starts_with("quiz--"));
    }

    #[test]
    fn test_no_collisions_in_1000_draws() {
        let ids: HashSet<String> = (0..1000)
            .map(|_| SessionIdentity::create("learner-session"))
            .collect();
        assert_eq!(ids.len(), 1000);
    }
}
