//! Command id generation

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Length of the random suffix appended to the timestamp prefix
const SUFFIX_LEN: usize = 9;

/// Correlation id for one command invocation.
///
/// Ids are `<unix-millis>-<random alphanumerics>`. A collision would
/// silently misroute a reply to the wrong caller, so the generator pairs
/// the millisecond timestamp with a random suffix to make collisions
/// practically impossible within a process lifetime. Ids are never reused
/// while still pending.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommandId(String);

impl CommandId {
    /// Generate a fresh id
    pub fn generate() -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();
        let suffix: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(SUFFIX_LEN)
            .map(char::from)
            .collect();
        Self(format!("{millis}-{suffix}"))
    }

    /// Wrap an id received off the wire or chosen by a test
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_differ() {
        let a = CommandId::generate();
        let b = CommandId::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn test_generated_id_format() {
        let id = CommandId::generate();
        let (prefix, suffix) = id.as_str().split_once('-').expect("missing separator");
        assert!(prefix.chars().all(|c| c.is_ascii_digit()));
        assert_eq!(suffix.len(), SUFFIX_LEN);
        assert!(suffix.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let id = CommandId::from_raw("42-xyz");
        assert_eq!(serde_json::to_string(&id).unwrap(), r#""42-xyz""#);
    }
}
