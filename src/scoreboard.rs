//! Scoreboard data orchestration.
//!
//! Each call to [`Scoreboard::update`] starts a new generation: a fan-out
//! over every accessible sport plus, when one live-capable sport is viewed
//! on today's date, a repeating poll of that sport. Every async completion
//! carries the generation it was started under and is dropped if the inputs
//! have moved on since.

use chrono::{DateTime, NaiveDate, Utc};
use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::ops::ControlFlow;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::ApiError;
use crate::normalize::dates::{season_of, today};
use crate::normalize::NormalizedEvent;
use crate::polling::PollHandle;
use crate::season_cache::SeasonCache;
use crate::sport::{SportCategory, SportKey};
use crate::sportsdata::{Lookups, ScheduleRequest, ScheduleSource};

/// `all` or one sport key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SportSelection {
    #[default]
    All,
    Sport(SportKey),
}

impl SportSelection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SportSelection::All => "all",
            SportSelection::Sport(key) => key.as_str(),
        }
    }
}

impl std::str::FromStr for SportSelection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(SportSelection::All),
            s => s.parse().map(SportSelection::Sport),
        }
    }
}

impl Serialize for SportSelection {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SportSelection {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// One sport's slot on the scoreboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SportData {
    pub events: Vec<NormalizedEvent>,
    pub loading: bool,
    pub error: Option<String>,
}

impl SportData {
    fn loading() -> Self {
        SportData {
            loading: true,
            ..Default::default()
        }
    }

    fn loaded(events: Vec<NormalizedEvent>) -> Self {
        SportData {
            events,
            ..Default::default()
        }
    }

    fn failed(error: &ApiError) -> Self {
        SportData {
            error: Some(error.to_string()),
            ..Default::default()
        }
    }
}

pub type SportDataMap = BTreeMap<SportKey, SportData>;

/// Everything the scoreboard depends on. A change to any of it is a new
/// generation.
#[derive(Debug, Clone)]
pub struct ScoreboardInputs {
    pub date: NaiveDate,
    pub accessible_sports: Vec<SportKey>,
    pub accessible_competitions: Vec<String>,
    pub selected: SportSelection,
    pub lookups: Arc<Lookups>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreboardSnapshot {
    pub sports: SportDataMap,
    /// Last successful poll; display only.
    pub last_polled: Option<DateTime<Utc>>,
}

#[derive(Default)]
struct ScoreboardState {
    data: SportDataMap,
    last_polled: Option<DateTime<Utc>>,
}

struct ScoreboardInner {
    sources: HashMap<SportKey, Arc<dyn ScheduleSource>>,
    season_cache: SeasonCache,
    generation: AtomicU64,
    state: RwLock<ScoreboardState>,
}

pub struct Scoreboard {
    inner: Arc<ScoreboardInner>,
    poll_interval: Duration,
    poller: Mutex<Option<PollHandle>>,
}

impl Scoreboard {
    pub fn new(
        sources: &[Arc<dyn ScheduleSource>],
        season_cache: SeasonCache,
        poll_interval: Duration,
    ) -> Self {
        Scoreboard {
            inner: Arc::new(ScoreboardInner {
                sources: sources.iter().map(|s| (s.sport_key(), s.clone())).collect(),
                season_cache,
                generation: AtomicU64::new(0),
                state: RwLock::new(ScoreboardState::default()),
            }),
            poll_interval,
            poller: Mutex::new(None),
        }
    }

    fn set_poller(&self, poller: Option<PollHandle>) {
        *self.poller.lock().unwrap_or_else(PoisonError::into_inner) = poller;
    }

    pub fn is_polling(&self) -> bool {
        self.poller
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|p| !p.is_finished())
    }

    /// Start a new generation for `inputs`.
    ///
    /// Slots are reset to loading and the fetch wave runs in the background;
    /// the returned handle completes once every sport of this wave has been
    /// applied or discarded.
    pub async fn update(&self, inputs: ScoreboardInputs) -> JoinHandle<()> {
        let poll_sport = poll_target(&inputs);

        // Poller swap shares the generation bump's critical section.
        let generation = {
            let mut state = self.inner.state.write().await;
            let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
            state.data = inputs
                .accessible_sports
                .iter()
                .map(|sport| (*sport, SportData::loading()))
                .collect();
            state.last_polled = None;

            let poller = poll_sport.map(|sport| {
                let inner = self.inner.clone();
                let inputs = inputs.clone();
                PollHandle::spawn(self.poll_interval, move || {
                    let inner = inner.clone();
                    let inputs = inputs.clone();
                    async move {
                        inner.poll(generation, sport, &inputs).await;
                        ControlFlow::Continue(())
                    }
                })
            });
            self.set_poller(poller);
            generation
        };

        info!(
            "Scoreboard generation {}: {} on {} ({} sports)",
            generation,
            inputs.selected.as_str(),
            inputs.date,
            inputs.accessible_sports.len()
        );

        let inner = self.inner.clone();
        tokio::spawn(async move {
            let loads = inputs.accessible_sports.iter().map(|sport| {
                let inner = inner.clone();
                let inputs = &inputs;
                async move {
                    let data = match inner.fetch_sport(*sport, inputs).await {
                        Ok(events) => SportData::loaded(events),
                        Err(e) => {
                            warn!("Failed to load {}: {}", sport, e);
                            SportData::failed(&e)
                        }
                    };
                    inner.apply(generation, *sport, data).await;
                }
            });
            join_all(loads).await;
        })
    }

    /// Invalidate everything in flight and clear all slots.
    pub async fn clear(&self) {
        let mut state = self.inner.state.write().await;
        self.set_poller(None);
        self.inner.generation.fetch_add(1, Ordering::SeqCst);
        *state = ScoreboardState::default();
    }

    pub async fn snapshot(&self) -> ScoreboardSnapshot {
        let state = self.inner.state.read().await;
        ScoreboardSnapshot {
            sports: state.data.clone(),
            last_polled: state.last_polled,
        }
    }

    /// Swap in a re-fetched version of one event (e.g. an expanded fight
    /// card), matched by id. Returns whether it was on the board.
    pub async fn replace_event(&self, event: NormalizedEvent) -> bool {
        let Some(sport) = event.sport_key else {
            return false;
        };
        let mut state = self.inner.state.write().await;
        let Some(slot) = state.data.get_mut(&sport) else {
            return false;
        };
        match slot.events.iter_mut().find(|e| e.id == event.id) {
            Some(existing) => {
                *existing = event;
                true
            }
            None => false,
        }
    }

    #[cfg(test)]
    pub fn generation(&self) -> u64 {
        self.inner.generation.load(Ordering::SeqCst)
    }
}

/// The sport to poll, if any: one concrete, non-season sport viewed today.
fn poll_target(inputs: &ScoreboardInputs) -> Option<SportKey> {
    match inputs.selected {
        SportSelection::Sport(sport)
            if !sport.is_season_based()
                && inputs.date == today()
                && inputs.accessible_sports.contains(&sport) =>
        {
            Some(sport)
        }
        _ => None,
    }
}

impl ScoreboardInner {
    /// Write `data` into `sport`'s slot unless `generation` is stale.
    /// Returns whether the write happened.
    async fn apply(&self, generation: u64, sport: SportKey, data: SportData) -> bool {
        let mut state = self.state.write().await;
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!("Discarding stale {} result (generation {})", sport, generation);
            return false;
        }
        state.data.insert(sport, data);
        true
    }

    async fn fetch_sport(
        &self,
        sport: SportKey,
        inputs: &ScoreboardInputs,
    ) -> Result<Vec<NormalizedEvent>, ApiError> {
        let source = self.sources.get(&sport).ok_or(ApiError::Unsupported {
            sport: sport.as_str(),
            what: "schedules",
        })?;

        match sport.category() {
            SportCategory::Team => {
                source
                    .events(&ScheduleRequest::Date(inputs.date), &inputs.lookups)
                    .await
            }
            SportCategory::Soccer => Ok(self.fetch_soccer(source.as_ref(), inputs).await),
            SportCategory::Motorsport | SportCategory::Combat | SportCategory::Golf => {
                self.fetch_season(sport, source.as_ref(), inputs).await
            }
        }
    }

    /// Every accessible competition in parallel; failures are dropped and
    /// the rest concatenated.
    async fn fetch_soccer(
        &self,
        source: &dyn ScheduleSource,
        inputs: &ScoreboardInputs,
    ) -> Vec<NormalizedEvent> {
        let fetches = inputs.accessible_competitions.iter().map(|competition| async move {
            let request = ScheduleRequest::Competition {
                competition: competition.clone(),
                date: inputs.date,
            };
            (competition, source.events(&request, &inputs.lookups).await)
        });

        let mut events = Vec::new();
        for (competition, result) in join_all(fetches).await {
            match result {
                Ok(mut games) => events.append(&mut games),
                Err(e) => debug!("Soccer competition {} failed: {}", competition, e),
            }
        }
        events
    }

    /// Season from cache or provider, filtered to the viewed date.
    async fn fetch_season(
        &self,
        sport: SportKey,
        source: &dyn ScheduleSource,
        inputs: &ScoreboardInputs,
    ) -> Result<Vec<NormalizedEvent>, ApiError> {
        let season = season_of(inputs.date);
        let key = SeasonCache::key(sport, &season);
        let events = match self.season_cache.get(&key).await {
            Some(events) => events,
            None => {
                let events = source
                    .events(&ScheduleRequest::Season(season), &inputs.lookups)
                    .await?;
                self.season_cache.set(&key, events).await
            }
        };
        Ok(events
            .iter()
            .filter(|e| e.occurs_on(inputs.date))
            .cloned()
            .collect())
    }

    /// One poll tick. Failures keep the last good data.
    async fn poll(&self, generation: u64, sport: SportKey, inputs: &ScoreboardInputs) {
        match self.fetch_sport(sport, inputs).await {
            Ok(events) => {
                let count = events.len();
                let mut state = self.state.write().await;
                if self.generation.load(Ordering::SeqCst) != generation {
                    debug!("Discarding stale {} poll (generation {})", sport, generation);
                    return;
                }
                state.data.insert(sport, SportData::loaded(events));
                state.last_polled = Some(Utc::now());
                debug!("Polled {}: {} events", sport, count);
            }
            Err(e) => debug!("Poll for {} failed: {}", sport, e),
        }
    }
}
