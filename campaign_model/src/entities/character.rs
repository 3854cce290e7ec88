//! Character definitions.

use serde::{Deserialize, Serialize};

use super::CharacterId;

/// A player character or NPC that events can reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub id: CharacterId,
    pub name: String,
    /// Free-form tags such as class or alignment.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl Character {
    /// Create a new character with the given identifier and display name.
    pub fn new(id: impl Into<CharacterId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            tags: Vec::new(),
        }
    }

    /// Add a tag, ignoring duplicates.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        let tag = tag.into();
        if !self.tags.contains(&tag) {
            self.tags.push(tag);
        }
        self
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_character() {
        let character = Character::new("c-rogue", "Nyx the Rogue");
        assert_eq!(character.name, "Nyx the Rogue");
        assert!(character.tags.is_empty());
    }

    #[test]
    fn test_tags_are_a_set() {
        let character = Character::new("c-mage", "Eira")
            .with_tag("arcane")
            .with_tag("arcane")
            .with_tag("elf");
        assert_eq!(character.tags, vec!["arcane", "elf"]);
        assert!(character.has_tag("elf"));
    }

    #[test]
    fn test_missing_tags_deserialize_empty() {
        let character: Character = serde_json::from_str(r#"{"id":"c-dm","name":"DM"}"#).unwrap();
        assert!(character.tags.is_empty());
    }
}
