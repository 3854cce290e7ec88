//! Quest definitions.

use serde::{Deserialize, Serialize};

use super::QuestId;

/// Progress of a quest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuestStatus {
    /// Newly available, not started.
    Open,
    #[default]
    Ongoing,
    Done,
}

/// A quest that events can advance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quest {
    pub id: QuestId,
    pub name: String,
    #[serde(default)]
    pub status: QuestStatus,
}

impl Quest {
    /// Create an ongoing quest.
    pub fn new(id: impl Into<QuestId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            status: QuestStatus::Ongoing,
        }
    }

    pub fn with_status(mut self, status: QuestStatus) -> Self {
        self.status = status;
        self
    }

    pub fn is_done(&self) -> bool {
        self.status == QuestStatus::Done
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_names() {
        let quest = Quest::new("q-heist", "The Vault Heist").with_status(QuestStatus::Open);
        let json = serde_json::to_value(&quest).unwrap();
        assert_eq!(json["status"], "OPEN");

        let done: Quest =
            serde_json::from_str(r#"{"id":"q","name":"Q","status":"DONE"}"#).unwrap();
        assert!(done.is_done());
    }
}
