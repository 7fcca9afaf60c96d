//! Task identity.
//!
//! Minted on the first step of a reasoning task and echoed by the caller on
//! every later step. It correlates steps in logs; it is never a key into
//! server-side state.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Mint a fresh identity.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Echo the caller's identity when it carries one, otherwise mint.
    pub fn resolve(supplied: Option<&str>) -> Self {
        match supplied {
            Some(id) if !id.trim().is_empty() => Self(id.to_string()),
            _ => Self::new(),
        }
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for TaskId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minted_ids_are_unique_and_non_empty() {
        let a = TaskId::new();
        let b = TaskId::new();
        assert!(!a.as_str().is_empty());
        assert_ne!(a, b);
    }

    #[test]
    fn supplied_id_is_echoed() {
        assert_eq!(TaskId::resolve(Some("task-7")).as_str(), "task-7");
    }

    #[test]
    fn supplied_id_is_echoed_verbatim() {
        assert_eq!(TaskId::resolve(Some(" task-7 ")).as_str(), " task-7 ");
    }

    #[test]
    fn blank_id_is_replaced() {
        let id = TaskId::resolve(Some("   "));
        assert!(!id.as_str().trim().is_empty());
        assert!(!TaskId::resolve(None).as_str().is_empty());
    }
}
