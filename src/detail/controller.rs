//! Per-event detail page state.
//!
//! On open every section the sport offers is fetched once in parallel. The
//! outcome decides the tabs: a 401 hides the tab, any other failure keeps
//! it with an inline error. A game phase derived from the header then
//! drives polling of the sections that loaded.

use chrono::{Local, NaiveDateTime};
use futures_util::future::join_all;
use serde::Serialize;
use std::collections::BTreeMap;
use std::ops::ControlFlow;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::phase::{game_phase, GamePhase};
use super::sections::{DetailSource, FetchContext, PollClass, SectionFetchResult, SectionKind};
use crate::error::ApiError;
use crate::normalize::team::TeamGame;
use crate::normalize::{transform_team_games, NormalizedEvent};
use crate::polling::PollHandle;
use crate::sport::SportKey;

/// Refresh periods for the two section classes.
#[derive(Debug, Clone, Copy)]
pub struct DetailTiming {
    pub live_every: Duration,
    pub pregame_every: Duration,
}

impl Default for DetailTiming {
    fn default() -> Self {
        DetailTiming {
            live_every: Duration::from_secs(5),
            pregame_every: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum SectionState {
    Loaded { data: serde_json::Value, status: u16 },
    Error { message: String, status: Option<u16> },
    /// Key lacks entitlement; the tab is hidden.
    Unauthorized,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionTab {
    pub key: SectionKind,
    pub label: &'static str,
    pub has_line_movement: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailSnapshot {
    pub event_id: String,
    pub tabs: Vec<SectionTab>,
    pub sections: BTreeMap<SectionKind, SectionState>,
    pub header: Option<NormalizedEvent>,
    pub phase: GamePhase,
    pub polling: bool,
}

/// Header info from a section payload's `Game` object (NFL: `Score`).
pub fn extract_header(sport: SportKey, data: &serde_json::Value) -> Option<NormalizedEvent> {
    let game = data
        .get("Game")
        .or_else(|| data.get("Score"))
        .filter(|g| g.is_object())?;
    let raw: TeamGame = serde_json::from_value(game.clone()).ok()?;
    transform_team_games(sport, std::slice::from_ref(&raw), None)
        .into_iter()
        .next()
}

struct DetailState {
    sections: BTreeMap<SectionKind, SectionState>,
    header: Option<NormalizedEvent>,
    phase: GamePhase,
    last_pregame_poll: Instant,
}

impl DetailState {
    fn derive_phase(&mut self, now: NaiveDateTime) -> GamePhase {
        self.phase = match &self.header {
            Some(h) => game_phase(h.status, h.is_closed, h.date_time, now),
            None => GamePhase::Unknown,
        };
        self.phase
    }
}

struct DetailInner {
    event_id: String,
    source: Arc<dyn DetailSource>,
    ctx: FetchContext,
    timing: DetailTiming,
    state: RwLock<DetailState>,
    polling: AtomicBool,
}

/// Clears the in-flight flag however the poll cycle exits.
struct PollingGuard<'a>(&'a AtomicBool);

impl Drop for PollingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct DetailController {
    inner: Arc<DetailInner>,
    poller: Mutex<Option<PollHandle>>,
}

impl DetailController {
    /// Load every section and start polling if the game is pregame or live.
    pub async fn open(
        event_id: &str,
        source: Arc<dyn DetailSource>,
        ctx: FetchContext,
        timing: DetailTiming,
    ) -> Self {
        let sport = ctx.parsed.sport;
        let sections = source.sections();
        let results = join_all(sections.iter().map(|s| source.fetch_section(*s, &ctx))).await;

        let mut states = BTreeMap::new();
        let mut header = None;
        for (section, result) in sections.into_iter().zip(results) {
            let state = match result {
                Ok(SectionFetchResult { data, status }) => {
                    if header.is_none() {
                        header = extract_header(sport, &data);
                    }
                    SectionState::Loaded { data, status }
                }
                Err(e) if e.is_unauthorized() => SectionState::Unauthorized,
                Err(e) => {
                    warn!("{} {} failed: {}", event_id, section, e);
                    SectionState::Error {
                        message: e.to_string(),
                        status: e.status(),
                    }
                }
            };
            states.insert(section, state);
        }

        let mut state = DetailState {
            sections: states,
            header,
            phase: GamePhase::Unknown,
            last_pregame_poll: Instant::now(),
        };
        let phase = state.derive_phase(Local::now().naive_local());
        info!("Opened detail for {} (phase: {:?})", event_id, phase);

        let controller = DetailController {
            inner: Arc::new(DetailInner {
                event_id: event_id.to_string(),
                source,
                ctx,
                timing,
                state: RwLock::new(state),
                polling: AtomicBool::new(false),
            }),
            poller: Mutex::new(None),
        };
        if phase.is_pollable() {
            controller.start_polling();
        }
        controller
    }

    fn start_polling(&self) {
        let inner = self.inner.clone();
        let handle = PollHandle::spawn(self.inner.timing.live_every, move || {
            let inner = inner.clone();
            async move { inner.poll_once(Local::now().naive_local()).await }
        });
        *self.poller.lock().unwrap_or_else(PoisonError::into_inner) = Some(handle);
    }

    pub fn is_polling(&self) -> bool {
        self.poller
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|p| !p.is_finished())
    }

    /// Run one poll cycle now. Overlapping calls return immediately.
    pub async fn poll_once(&self, now: NaiveDateTime) -> ControlFlow<()> {
        self.inner.poll_once(now).await
    }

    pub async fn snapshot(&self) -> DetailSnapshot {
        let state = self.inner.state.read().await;
        let tabs = state
            .sections
            .iter()
            .filter(|(_, s)| !matches!(s, SectionState::Unauthorized))
            .map(|(kind, _)| SectionTab {
                key: *kind,
                label: kind.label(),
                has_line_movement: kind.has_line_movement(),
            })
            .collect();
        DetailSnapshot {
            event_id: self.inner.event_id.clone(),
            tabs,
            sections: state.sections.clone(),
            header: state.header.clone(),
            phase: state.phase,
            polling: self.is_polling(),
        }
    }

    /// Line movement for an odds tab that is visible on this page.
    pub async fn line_movement(&self, section: SectionKind) -> Result<SectionFetchResult, ApiError> {
        let visible = matches!(
            self.inner.state.read().await.sections.get(&section),
            Some(SectionState::Loaded { .. } | SectionState::Error { .. })
        );
        if !visible || !section.has_line_movement() {
            return Err(ApiError::Unsupported {
                sport: self.inner.ctx.parsed.sport.as_str(),
                what: "line movement for this section",
            });
        }
        self.inner
            .source
            .fetch_line_movement(section, &self.inner.ctx)
            .await
    }
}

impl DetailInner {
    async fn poll_once(&self, now: NaiveDateTime) -> ControlFlow<()> {
        if self.polling.swap(true, Ordering::SeqCst) {
            debug!("{}: previous poll still running, skipping tick", self.event_id);
            return ControlFlow::Continue(());
        }
        let _guard = PollingGuard(&self.polling);

        let targets: Vec<SectionKind> = {
            let mut state = self.state.write().await;
            let phase = state.derive_phase(now);
            if !phase.is_pollable() {
                return ControlFlow::Break(());
            }

            let pregame_due = state.last_pregame_poll.elapsed() >= self.timing.pregame_every;
            if pregame_due {
                state.last_pregame_poll = Instant::now();
            }

            state
                .sections
                .iter()
                .filter(|(_, s)| matches!(s, SectionState::Loaded { .. }))
                .map(|(kind, _)| *kind)
                .filter(|kind| match kind.poll_class() {
                    PollClass::Live => phase == GamePhase::Live,
                    PollClass::Pregame => pregame_due,
                })
                .collect()
        };
        if targets.is_empty() {
            return ControlFlow::Continue(());
        }

        let results = join_all(
            targets
                .iter()
                .map(|s| self.source.fetch_section(*s, &self.ctx)),
        )
        .await;

        let mut state = self.state.write().await;
        for (section, result) in targets.into_iter().zip(results) {
            match result {
                Ok(SectionFetchResult { data, status }) => {
                    if section.poll_class() == PollClass::Live {
                        if let Some(header) = extract_header(self.ctx.parsed.sport, &data) {
                            state.header = Some(header);
                        }
                    }
                    state
                        .sections
                        .insert(section, SectionState::Loaded { data, status });
                }
                Err(e) => debug!("{} {} poll failed: {}", self.event_id, section, e),
            }
        }

        if state.derive_phase(now).is_pollable() {
            ControlFlow::Continue(())
        } else {
            info!("{} is {:?}, polling stopped", self.event_id, state.phase);
            ControlFlow::Break(())
        }
    }
}
