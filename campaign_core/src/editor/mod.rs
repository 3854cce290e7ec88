//! Entity editor - persisted edits to characters, locations and quests.
//!
//! Each kind is stored as one list under its own key. Until something has
//! been saved for a kind, its list is seeded from the entities the recorded
//! events reference.

use std::collections::HashSet;

use campaign_model::{check_location_parent, Character, Entity, EntityKind, Event, Location, Quest};
use tracing::info;

use crate::error::{JournalResult, StorageError};
use crate::storage::{read_json, write_json, KeyValueStore};
use crate::timeline::{EventQuery, EventSource};

/// Editable entity lists on top of a key-value store.
#[derive(Debug, Clone)]
pub struct EntityEditor<S> {
    store: S,
    prefix: String,
}

impl<S: KeyValueStore> EntityEditor<S> {
    pub fn new(store: S, prefix: impl Into<String>) -> Self {
        Self {
            store,
            prefix: prefix.into(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    fn key(&self, kind: EntityKind) -> String {
        let plural = match kind {
            EntityKind::Character => "characters",
            EntityKind::Location => "locations",
            EntityKind::Quest => "quests",
        };
        format!("{}edit_{}", self.prefix, plural)
    }

    /// What has been saved for `kind`, without seeding.
    pub fn stored(&self, kind: EntityKind) -> Vec<Entity> {
        let key = self.key(kind);
        match kind {
            EntityKind::Character => entities(read_json::<Vec<Character>, _>(&self.store, &key)),
            EntityKind::Location => entities(read_json::<Vec<Location>, _>(&self.store, &key)),
            EntityKind::Quest => entities(read_json::<Vec<Quest>, _>(&self.store, &key)),
        }
    }

    /// The saved list for `kind`, or seeds derived from `source` when
    /// nothing is saved yet.
    pub fn list<E>(&self, kind: EntityKind, source: &E) -> Vec<Entity>
    where
        E: EventSource + ?Sized,
    {
        let stored = self.stored(kind);
        if !stored.is_empty() {
            return stored;
        }
        seed(kind, &source.query_events(&EventQuery::all()))
    }

    /// Insert or replace an entity by id.
    ///
    /// Locations are checked against the rest of the list so the parent
    /// hierarchy stays a tree.
    pub fn upsert<E>(&mut self, entity: Entity, source: &E) -> JournalResult<()>
    where
        E: EventSource + ?Sized,
    {
        entity.validate()?;
        let kind = entity.kind();
        let mut list = self.list(kind, source);

        if let Entity::Location(location) = &entity {
            let existing: Vec<Location> = list
                .iter()
                .filter_map(|e| match e {
                    Entity::Location(l) if l.id != location.id => Some(l.clone()),
                    _ => None,
                })
                .collect();
            check_location_parent(&existing, location)?;
        }

        match list.iter().position(|e| e.id() == entity.id()) {
            Some(i) => list[i] = entity,
            None => list.push(entity),
        }

        self.write(kind, &list)?;
        info!(%kind, entries = list.len(), "saved entity list");
        Ok(())
    }

    /// Remove an entity by id. Returns `false` if no such entity was listed.
    pub fn remove<E>(&mut self, kind: EntityKind, id: &str, source: &E) -> JournalResult<bool>
    where
        E: EventSource + ?Sized,
    {
        let mut list = self.list(kind, source);
        let before = list.len();
        list.retain(|e| e.id() != id);

        self.write(kind, &list)?;
        Ok(list.len() != before)
    }

    fn write(&mut self, kind: EntityKind, list: &[Entity]) -> Result<(), StorageError> {
        let key = self.key(kind);
        match kind {
            EntityKind::Character => {
                let items: Vec<&Character> = list
                    .iter()
                    .filter_map(|e| match e {
                        Entity::Character(c) => Some(c),
                        _ => None,
                    })
                    .collect();
                write_json(&mut self.store, &key, &items)
            }
            EntityKind::Location => {
                let items: Vec<&Location> = list
                    .iter()
                    .filter_map(|e| match e {
                        Entity::Location(l) => Some(l),
                        _ => None,
                    })
                    .collect();
                write_json(&mut self.store, &key, &items)
            }
            EntityKind::Quest => {
                let items: Vec<&Quest> = list
                    .iter()
                    .filter_map(|e| match e {
                        Entity::Quest(q) => Some(q),
                        _ => None,
                    })
                    .collect();
                write_json(&mut self.store, &key, &items)
            }
        }
    }
}

fn entities<T: Into<Entity>>(items: Vec<T>) -> Vec<Entity> {
    items.into_iter().map(Into::into).collect()
}

/// Placeholder entities for every id of `kind` the events reference, in
/// first-seen order.
fn seed(kind: EntityKind, events: &[Event]) -> Vec<Entity> {
    let ids: Vec<&str> = match kind {
        EntityKind::Character => events
            .iter()
            .flat_map(|e| e.characters.iter().map(|c| c.as_str()))
            .collect(),
        EntityKind::Location => events
            .iter()
            .filter_map(|e| e.location.as_ref().map(|l| l.as_str()))
            .collect(),
        EntityKind::Quest => events
            .iter()
            .flat_map(|e| e.quest_ids.iter().map(|q| q.as_str()))
            .collect(),
    };

    let mut seen = HashSet::new();
    ids.into_iter()
        .filter(|id| seen.insert(*id))
        .map(|id| Entity::placeholder(kind, id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::JournalError;
    use crate::storage::MemoryStore;
    use campaign_model::{LocationId, ModelError, QuestStatus};

    fn events() -> Vec<Event> {
        vec![
            Event::new("e2", "Ambush", 200)
                .with_characters(["Rook", "Thorn"])
                .at("Willow Bend")
                .advancing("q-hunt"),
            Event::new("e1", "Letter", 100)
                .with_characters(["Ava", "Rook"])
                .at("Inn")
                .advancing("q-hunt"),
        ]
    }

    fn editor() -> EntityEditor<MemoryStore> {
        EntityEditor::new(MemoryStore::new(), "ds_")
    }

    fn ids(list: &[Entity]) -> Vec<&str> {
        list.iter().map(|e| e.id()).collect()
    }

    #[test]
    fn test_seeds_from_events_when_empty() {
        let editor = editor();
        let source = events();

        let characters = editor.list(EntityKind::Character, &source);
        assert_eq!(ids(&characters), vec!["Ava", "Rook", "Thorn"]);
        assert_eq!(characters[0].name(), "Ava");

        let quests = editor.list(EntityKind::Quest, &source);
        assert_eq!(quests.len(), 1);
        assert!(matches!(&quests[0], Entity::Quest(q) if q.status == QuestStatus::Ongoing));

        assert!(editor.stored(EntityKind::Location).is_empty());
    }

    #[test]
    fn test_upsert_replaces_by_id_and_keeps_seeds() {
        let mut editor = editor();
        let source = events();

        let rook = Character::new("Rook", "Rook the Bold").with_tag("fighter");
        editor.upsert(rook.into(), &source).unwrap();

        let stored = editor.stored(EntityKind::Character);
        assert_eq!(ids(&stored), vec!["Ava", "Rook", "Thorn"]);
        assert_eq!(stored[1].name(), "Rook the Bold");
        assert!(editor.store().get("ds_edit_characters").is_some());

        editor
            .upsert(Character::new("Nyx", "Nyx").into(), &source)
            .unwrap();
        assert_eq!(editor.stored(EntityKind::Character).len(), 4);
    }

    #[test]
    fn test_remove() {
        let mut editor = editor();
        let source = events();

        assert!(editor.remove(EntityKind::Location, "Inn", &source).unwrap());
        assert!(!editor.remove(EntityKind::Location, "Inn", &source).unwrap());
        assert_eq!(ids(&editor.list(EntityKind::Location, &source)), vec!["Willow Bend"]);
    }

    #[test]
    fn test_location_cycle_rejected() {
        let mut editor = editor();
        let source: Vec<Event> = Vec::new();

        editor
            .upsert(Location::new("l-town", "Ravenshade").into(), &source)
            .unwrap();
        editor
            .upsert(Location::new("l-vault", "Vault").within("l-town").into(), &source)
            .unwrap();

        let err = editor
            .upsert(Location::new("l-town", "Ravenshade").within("l-vault").into(), &source)
            .unwrap_err();
        assert!(matches!(
            err,
            JournalError::Model(ModelError::LocationCycle { ref location, .. })
                if *location == LocationId::new("l-town")
        ));

        // Unchanged after the rejected edit.
        let stored = editor.stored(EntityKind::Location);
        assert!(matches!(&stored[0], Entity::Location(l) if l.parent_id.is_none()));
    }

    #[test]
    fn test_blank_id_rejected_for_every_kind() {
        let mut editor = editor();
        let source: Vec<Event> = Vec::new();

        for kind in EntityKind::ALL {
            let err = editor.upsert(Entity::placeholder(kind, ""), &source).unwrap_err();
            assert!(matches!(err, JournalError::Model(ModelError::EmptyId(k)) if k == kind.as_str()));
            assert!(editor.stored(kind).is_empty());
        }
    }

    #[test]
    fn test_dangling_parent_allowed() {
        let mut editor = editor();
        let source: Vec<Event> = Vec::new();
        editor
            .upsert(Location::new("l-cellar", "Cellar").within("l-unknown").into(), &source)
            .unwrap();
        assert_eq!(editor.stored(EntityKind::Location).len(), 1);
    }

    #[test]
    fn test_corrupt_list_falls_back_to_seeds() {
        let mut store = MemoryStore::new();
        store.set("ds_edit_quests", "[oops").unwrap();
        let editor = EntityEditor::new(store, "ds_");

        assert_eq!(ids(&editor.list(EntityKind::Quest, &events())), vec!["q-hunt"]);
    }
}
