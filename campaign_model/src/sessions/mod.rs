//! Session records - bounded recording intervals.

use serde::{Deserialize, Serialize};

use crate::{SessionId, Timestamp};

/// A recording interval. A session without an end timestamp is active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: SessionId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub started_at: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<Timestamp>,
}

impl Session {
    /// Start a new session at the given time.
    pub fn start(id: SessionId, title: Option<String>, started_at: Timestamp) -> Self {
        Self {
            id,
            title,
            started_at,
            ended_at: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.ended_at.is_none()
    }

    /// Record the end time. Returns `false` if the session had already ended,
    /// in which case the original end time is kept.
    pub fn end(&mut self, at: Timestamp) -> bool {
        if self.ended_at.is_some() {
            return false;
        }
        self.ended_at = Some(at);
        true
    }

    /// Length of the session in milliseconds, if it has ended. `None` also
    /// when the span does not fit in an `i64`.
    pub fn duration_ms(&self) -> Option<i64> {
        self.ended_at.and_then(|end| end.checked_sub(self.started_at))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_end_only_once() {
        let mut session = Session::start(SessionId::new("s1"), Some("Intro".into()), 1_000);
        assert!(session.is_active());

        assert!(session.end(5_000));
        assert!(!session.end(9_000));
        assert_eq!(session.ended_at, Some(5_000));
        assert_eq!(session.duration_ms(), Some(4_000));
        assert!(!session.is_active());
    }

    #[test]
    fn test_duration_of_extreme_span() {
        let mut session = Session::start(SessionId::new("s1"), None, i64::MIN);
        session.end(i64::MAX);
        assert_eq!(session.duration_ms(), None);

        let mut session = Session::start(SessionId::new("s2"), None, -500);
        session.end(1_500);
        assert_eq!(session.duration_ms(), Some(2_000));
    }

    #[test]
    fn test_session_json_shape() {
        let session = Session::start(SessionId::new("s1"), None, 7);
        let json = serde_json::to_value(&session).unwrap();
        assert_eq!(json["startedAt"], 7);
        assert!(json.get("endedAt").is_none());
        assert!(json.get("title").is_none());
    }
}
