//! Registry of known entities - the fixed cast, places and quests of a campaign.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::entities::{
    check_id, Character, CharacterId, Entity, EntityKind, Location, LocationId, Quest, QuestId,
    QuestStatus,
};
use crate::error::{ModelError, ModelResult};

/// All known characters, locations and quests, in insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Registry {
    pub characters: Vec<Character>,
    pub locations: Vec<Location>,
    pub quests: Vec<Quest>,
}

impl Registry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The demo world used by the live session stream.
    pub fn demo() -> Self {
        Self {
            characters: vec![
                Character::new("c-rogue", "Nyx the Rogue").with_tag("stealth"),
                Character::new("c-mage", "Eira the Mage").with_tag("arcane"),
                Character::new("c-dm", "DM"),
            ],
            locations: vec![
                Location::new("l-town", "Ravenshade"),
                Location::new("l-vault", "Obsidian Vault").within("l-town"),
            ],
            quests: vec![Quest::new("q-heist", "The Vault Heist").with_status(QuestStatus::Ongoing)],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty() && self.locations.is_empty() && self.quests.is_empty()
    }

    /// Get character by ID.
    pub fn character(&self, id: &str) -> Option<&Character> {
        self.characters.iter().find(|c| c.id.as_str() == id)
    }

    /// Get location by ID.
    pub fn location(&self, id: &str) -> Option<&Location> {
        self.locations.iter().find(|l| l.id.as_str() == id)
    }

    /// Get quest by ID.
    pub fn quest(&self, id: &str) -> Option<&Quest> {
        self.quests.iter().find(|q| q.id.as_str() == id)
    }

    /// Look up any entity by kind and identifier.
    pub fn get(&self, kind: EntityKind, id: &str) -> Option<Entity> {
        match kind {
            EntityKind::Character => self.character(id).cloned().map(Entity::Character),
            EntityKind::Location => self.location(id).cloned().map(Entity::Location),
            EntityKind::Quest => self.quest(id).cloned().map(Entity::Quest),
        }
    }

    /// Display name for a reference, falling back to the identifier itself.
    pub fn display_name<'a>(&'a self, kind: EntityKind, id: &'a str) -> &'a str {
        let name = match kind {
            EntityKind::Character => self.character(id).map(|c| c.name.as_str()),
            EntityKind::Location => self.location(id).map(|l| l.name.as_str()),
            EntityKind::Quest => self.quest(id).map(|q| q.name.as_str()),
        };
        name.unwrap_or(id)
    }

    /// Add or replace a character.
    pub fn add_character(&mut self, character: Character) -> ModelResult<CharacterId> {
        check_id(EntityKind::Character, character.id.as_str())?;
        let id = character.id.clone();
        match self.characters.iter_mut().find(|c| c.id == id) {
            Some(existing) => *existing = character,
            None => self.characters.push(character),
        }
        Ok(id)
    }

    /// Add or replace a location, rejecting parent chains that loop back.
    pub fn add_location(&mut self, location: Location) -> ModelResult<LocationId> {
        check_location_parent(&self.locations, &location)?;
        let id = location.id.clone();
        match self.locations.iter_mut().find(|l| l.id == id) {
            Some(existing) => *existing = location,
            None => self.locations.push(location),
        }
        Ok(id)
    }

    /// Add or replace a quest.
    pub fn add_quest(&mut self, quest: Quest) -> ModelResult<QuestId> {
        check_id(EntityKind::Quest, quest.id.as_str())?;
        let id = quest.id.clone();
        match self.quests.iter_mut().find(|q| q.id == id) {
            Some(existing) => *existing = quest,
            None => self.quests.push(quest),
        }
        Ok(id)
    }

    /// Add or replace any entity.
    pub fn upsert(&mut self, entity: Entity) -> ModelResult<()> {
        match entity {
            Entity::Character(c) => {
                self.add_character(c)?;
            }
            Entity::Location(l) => {
                self.add_location(l)?;
            }
            Entity::Quest(q) => {
                self.add_quest(q)?;
            }
        }
        Ok(())
    }

    /// Parent chain of a location, nearest first. Unknown parents end the walk.
    pub fn ancestors(&self, id: &str) -> Vec<&Location> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut current = self.location(id).and_then(|l| l.parent_id.as_ref());

        while let Some(parent_id) = current {
            if !seen.insert(parent_id.as_str()) {
                break;
            }
            match self.location(parent_id.as_str()) {
                Some(parent) => {
                    chain.push(parent);
                    current = parent.parent_id.as_ref();
                }
                None => break,
            }
        }

        chain
    }

    /// Locations placed directly inside the given one.
    pub fn children(&self, id: &str) -> Vec<&Location> {
        self.locations
            .iter()
            .filter(|l| l.parent_id.as_ref().is_some_and(|p| p.as_str() == id))
            .collect()
    }
}

/// Check that placing `location` among `existing` keeps the hierarchy a tree.
///
/// Parents that are not present are accepted; only a chain leading back to
/// `location` itself is rejected.
pub fn check_location_parent(existing: &[Location], location: &Location) -> ModelResult<()> {
    check_id(EntityKind::Location, location.id.as_str())?;
    let Some(parent) = &location.parent_id else {
        return Ok(());
    };

    let mut seen = HashSet::new();
    let mut current = Some(parent);
    while let Some(id) = current {
        if *id == location.id {
            return Err(ModelError::LocationCycle {
                location: location.id.clone(),
                parent: parent.clone(),
            });
        }
        if !seen.insert(id.as_str()) {
            // Pre-existing loop above us that does not involve this location.
            break;
        }
        current = existing
            .iter()
            .find(|l| l.id == *id)
            .and_then(|l| l.parent_id.as_ref());
    }

    Ok(())
}
