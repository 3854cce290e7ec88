//! Synthetic event generation for live sessions.

use campaign_model::{Event, EventId, Registry, Timestamp};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::config::JournalConfig;

/// Produces placeholder events from the registry's cast, places and quests.
#[derive(Debug, Clone)]
pub struct EventFactory {
    rng: StdRng,
    titles: Vec<String>,
    summary: String,
    second_participant_chance: f64,
    quest_chance: f64,
}

impl EventFactory {
    pub fn new(config: &JournalConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            rng,
            titles: config.titles.clone(),
            summary: config.live_summary.clone(),
            second_participant_chance: probability(config.second_participant_chance),
            quest_chance: probability(config.quest_chance),
        }
    }

    /// Synthesize one event.
    ///
    /// One random participant, sometimes a distinct second one, one random
    /// location and sometimes a quest. Empty registry lists simply
    /// contribute nothing.
    pub fn synthesize(&mut self, registry: &Registry, id: EventId, ts: Timestamp) -> Event {
        let title = self
            .titles
            .choose(&mut self.rng)
            .cloned()
            .unwrap_or_else(|| "Untitled moment".to_string());

        let mut event = Event::new(id, title, ts).with_summary(self.summary.clone());

        if let Some(first) = registry.characters.choose(&mut self.rng) {
            event.characters.push(first.id.clone());

            if self.rng.gen_bool(self.second_participant_chance) {
                let others: Vec<_> = registry
                    .characters
                    .iter()
                    .filter(|c| c.id != first.id)
                    .collect();
                if let Some(second) = others.choose(&mut self.rng) {
                    event.characters.push(second.id.clone());
                }
            }
        }

        if let Some(location) = registry.locations.choose(&mut self.rng) {
            event.location = Some(location.id.clone());
        }

        if self.rng.gen_bool(self.quest_chance) {
            if let Some(quest) = registry.quests.choose(&mut self.rng) {
                event.quest_ids.push(quest.id.clone());
            }
        }

        event
    }
}

fn probability(p: f64) -> f64 {
    if p.is_nan() {
        0.0
    } else {
        p.clamp(0.0, 1.0)
    }
}
