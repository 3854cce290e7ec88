//! Entity definitions for the campaign world.

mod character;
mod location;
mod quest;

pub use character::*;
pub use location::*;
pub use quest::*;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Create an identifier from any string-like value.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id!(
    /// Identifier of a character.
    CharacterId
);
string_id!(
    /// Identifier of a location.
    LocationId
);
string_id!(
    /// Identifier of a quest.
    QuestId
);
string_id!(
    /// Identifier of a recorded event.
    EventId
);
string_id!(
    /// Identifier of a recording session.
    SessionId
);

impl SessionId {
    /// Generate a fresh, unique session identifier.
    pub fn generate() -> Self {
        Self(format!("sess-{}", uuid::Uuid::new_v4().simple()))
    }
}

/// The editable entity kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityKind {
    Character,
    Location,
    Quest,
}

impl EntityKind {
    pub const ALL: [EntityKind; 3] = [EntityKind::Character, EntityKind::Location, EntityKind::Quest];

    /// Lower-case name used in storage keys and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Character => "character",
            EntityKind::Location => "location",
            EntityKind::Quest => "quest",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Any one of the editable entities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Entity {
    Character(Character),
    Location(Location),
    Quest(Quest),
}

impl Entity {
    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::Character(_) => EntityKind::Character,
            Entity::Location(_) => EntityKind::Location,
            Entity::Quest(_) => EntityKind::Quest,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Entity::Character(c) => c.id.as_str(),
            Entity::Location(l) => l.id.as_str(),
            Entity::Quest(q) => q.id.as_str(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Entity::Character(c) => &c.name,
            Entity::Location(l) => &l.name,
            Entity::Quest(q) => &q.name,
        }
    }

    /// Reject an entity whose identifier is empty or only whitespace.
    pub fn validate(&self) -> ModelResult<()> {
        check_id(self.kind(), self.id())
    }

    /// Build the placeholder entity used when only an identifier is known.
    ///
    /// The identifier doubles as the display name and quests start out ongoing.
    pub fn placeholder(kind: EntityKind, id: &str) -> Self {
        match kind {
            EntityKind::Character => Entity::Character(Character::new(id, id)),
            EntityKind::Location => Entity::Location(Location::new(id, id)),
            EntityKind::Quest => Entity::Quest(Quest::new(id, id)),
        }
    }
}

pub(crate) fn check_id(kind: EntityKind, id: &str) -> ModelResult<()> {
    if id.trim().is_empty() {
        return Err(ModelError::EmptyId(kind.as_str()));
    }
    Ok(())
}

impl From<Character> for Entity {
    fn from(c: Character) -> Self {
        Entity::Character(c)
    }
}

impl From<Location> for Entity {
    fn from(l: Location) -> Self {
        Entity::Location(l)
    }
}

impl From<Quest> for Entity {
    fn from(q: Quest) -> Self {
        Entity::Quest(q)
    }
}
