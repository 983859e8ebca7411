pub mod adapter;
pub mod client;
pub mod probe;
pub mod season;
pub mod soccer;
pub mod team;

pub use adapter::{Lookups, ScheduleRequest, ScheduleSource};
pub use client::SportsDataClient;
pub use probe::{load_lookups, run_probe, CompetitionProber, ProbeOutcome, SportAccess};
pub use season::{FightCardSource, GolfAdapter, MmaAdapter, NascarAdapter};
pub use soccer::SoccerAdapter;
pub use team::TeamSportAdapter;

use std::collections::HashMap;
use std::sync::Arc;

use crate::detail::DetailSource;
use crate::sport::SportKey;

/// Every adapter, wired to one client.
pub struct SportsRegistry {
    /// One per sport, in [`SportKey::ALL`] order.
    pub schedules: Vec<Arc<dyn ScheduleSource>>,
    pub details: HashMap<SportKey, Arc<dyn DetailSource>>,
    pub competitions: Arc<dyn CompetitionProber>,
    pub fight_cards: Arc<dyn FightCardSource>,
}

impl SportsRegistry {
    pub fn new(client: SportsDataClient) -> Self {
        let soccer = Arc::new(SoccerAdapter::new(client.clone()));
        let mma = Arc::new(MmaAdapter::new(client.clone()));

        let mut schedules: Vec<Arc<dyn ScheduleSource>> = Vec::with_capacity(SportKey::ALL.len());
        let mut details: HashMap<SportKey, Arc<dyn DetailSource>> = HashMap::new();
        for sport in SportKey::ALL {
            if let Some(adapter) = TeamSportAdapter::new(sport, client.clone()) {
                let adapter = Arc::new(adapter);
                details.insert(sport, adapter.clone());
                schedules.push(adapter);
                continue;
            }
            let source: Arc<dyn ScheduleSource> = match sport {
                SportKey::Soccer => soccer.clone(),
                SportKey::Nascar => Arc::new(NascarAdapter::new(client.clone())),
                SportKey::Mma => mma.clone(),
                _ => Arc::new(GolfAdapter::new(client.clone())),
            };
            schedules.push(source);
        }

        SportsRegistry {
            schedules,
            details,
            competitions: soccer,
            fight_cards: mma,
        }
    }

    #[cfg(test)]
    pub fn schedule(&self, sport: SportKey) -> Option<Arc<dyn ScheduleSource>> {
        self.schedules
            .iter()
            .find(|s| s.sport_key() == sport)
            .cloned()
    }

    pub fn detail(&self, sport: SportKey) -> Option<Arc<dyn DetailSource>> {
        self.details.get(&sport).cloned()
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use test_support::session_with_key;

    #[test]
    fn test_registry_covers_every_sport_in_order() {
        let client =
            SportsDataClient::new("http://127.0.0.1:9", session_with_key(Some("k"))).unwrap();
        let registry = SportsRegistry::new(client);

        let keys: Vec<SportKey> = registry.schedules.iter().map(|s| s.sport_key()).collect();
        assert_eq!(keys, SportKey::ALL.to_vec());

        for sport in SportKey::ALL {
            assert_eq!(
                registry.detail(sport).is_some(),
                sport.category() == crate::sport::SportCategory::Team,
                "{}",
                sport
            );
        }
        assert!(registry.schedule(SportKey::Golf).is_some());
    }
}
