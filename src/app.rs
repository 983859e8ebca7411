//! Application state machine: key entry, probing, the scoreboard selection
//! and open detail pages. The HTTP layer is a thin shell over this.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tracing::{error, info, warn};

use crate::detail::{
    parse_event_id, DetailController, DetailSnapshot, DetailTiming, FetchContext,
    SectionFetchResult, SectionKind,
};
use crate::error::ApiError;
use crate::normalize::dates::today;
use crate::normalize::NormalizedEvent;
use crate::scoreboard::{Scoreboard, ScoreboardInputs, ScoreboardSnapshot, SportSelection};
use crate::session::{is_valid_sportsbook_group, Session};
use crate::sport::SportKey;
use crate::sportsdata::{load_lookups, run_probe, Lookups, ProbeOutcome, SportAccess, SportsRegistry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AppPhase {
    NeedsKey,
    Probing,
    Ready,
    Error,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("no API key configured")]
    NeedsKey,
    #[error("sport access has not been probed yet")]
    NotReady,
    #[error("API key must not be empty")]
    EmptyKey,
    #[error("invalid sportsbook group '{0}'")]
    InvalidSportsbookGroup(String),
    #[error("invalid event id '{0}'")]
    InvalidEventId(String),
    #[error("{0} has no detail pages")]
    NoDetail(SportKey),
    #[error("{0}")]
    UnknownSection(String),
    #[error("event {0} is not open")]
    NotOpen(String),
    #[error(transparent)]
    Api(#[from] ApiError),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppStatus {
    pub phase: AppPhase,
    pub probe_error: Option<String>,
    pub date: NaiveDate,
    pub selected: SportSelection,
    pub sportsbook_group: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SportsView {
    pub sports: Vec<SportAccess>,
    pub competitions: Vec<String>,
    pub competition_labels: HashMap<String, String>,
}

/// A change to the scoreboard selection. `today` wins over `date`; `shift`
/// moves the resulting date by whole days.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionChange {
    pub date: Option<NaiveDate>,
    pub sport: Option<SportSelection>,
    pub shift: Option<i64>,
    #[serde(default)]
    pub today: bool,
}

struct AppState {
    phase: AppPhase,
    probe_error: Option<String>,
    outcome: ProbeOutcome,
    lookups: Arc<Lookups>,
    date: NaiveDate,
    selected: SportSelection,
}

pub struct DashboardApp {
    session: Arc<Session>,
    registry: SportsRegistry,
    scoreboard: Scoreboard,
    detail_timing: DetailTiming,
    competition_batch: usize,
    /// Bumped on every probe start and logout; a probe only lands if it is
    /// still current.
    probe_generation: AtomicU64,
    state: RwLock<AppState>,
    details: Mutex<HashMap<String, Arc<DetailController>>>,
}

impl DashboardApp {
    pub fn new(
        session: Arc<Session>,
        registry: SportsRegistry,
        scoreboard: Scoreboard,
        detail_timing: DetailTiming,
        competition_batch: usize,
    ) -> Self {
        DashboardApp {
            session,
            registry,
            scoreboard,
            detail_timing,
            competition_batch,
            probe_generation: AtomicU64::new(0),
            state: RwLock::new(AppState {
                phase: AppPhase::NeedsKey,
                probe_error: None,
                outcome: ProbeOutcome::default(),
                lookups: Arc::new(Lookups::default()),
                date: today(),
                selected: SportSelection::All,
            }),
            details: Mutex::new(HashMap::new()),
        }
    }

    /// Probe straight away when a key was persisted or configured.
    pub async fn start(&self) {
        if self.session.has_api_key() {
            self.probe().await;
        } else {
            info!("No API key stored; waiting for one");
        }
    }

    pub async fn status(&self) -> AppStatus {
        let state = self.state.read().await;
        AppStatus {
            phase: state.phase,
            probe_error: state.probe_error.clone(),
            date: state.date,
            selected: state.selected,
            sportsbook_group: self.session.sportsbook_group(),
        }
    }

    pub async fn sports(&self) -> SportsView {
        let state = self.state.read().await;
        SportsView {
            sports: state.outcome.sports.clone(),
            competitions: state.outcome.competitions.clone(),
            competition_labels: state.outcome.competition_labels.clone(),
        }
    }

    pub async fn scoreboard(&self) -> ScoreboardSnapshot {
        self.scoreboard.snapshot().await
    }

    // ── Session ─────────────────────────────────────────────────────────────

    /// Store the key and probe with it. A failure to persist is logged; the
    /// key still applies to this process.
    pub async fn submit_key(&self, key: &str) -> Result<AppStatus, AppError> {
        if key.trim().is_empty() {
            return Err(AppError::EmptyKey);
        }
        if let Err(e) = self.session.save_api_key(key) {
            error!("{:#}", e);
        }
        self.probe().await;
        Ok(self.status().await)
    }

    pub async fn logout(&self) -> AppStatus {
        if let Err(e) = self.session.clear_api_key() {
            error!("{:#}", e);
        }
        self.probe_generation.fetch_add(1, Ordering::SeqCst);
        self.details.lock().await.clear();
        self.scoreboard.clear().await;
        {
            let mut state = self.state.write().await;
            state.phase = AppPhase::NeedsKey;
            state.probe_error = None;
            state.outcome = ProbeOutcome::default();
            state.lookups = Arc::new(Lookups::default());
        }
        info!("Logged out");
        self.status().await
    }

    pub async fn retry_probe(&self) -> Result<AppStatus, AppError> {
        if !self.session.has_api_key() {
            return Err(AppError::NeedsKey);
        }
        self.probe().await;
        Ok(self.status().await)
    }

    /// An empty group resets to the default.
    pub async fn set_sportsbook_group(&self, group: &str) -> Result<AppStatus, AppError> {
        let trimmed = group.trim();
        if !trimmed.is_empty() && !is_valid_sportsbook_group(trimmed) {
            return Err(AppError::InvalidSportsbookGroup(trimmed.to_string()));
        }
        if let Err(e) = self.session.save_sportsbook_group(trimmed) {
            error!("{:#}", e);
        }
        Ok(self.status().await)
    }

    async fn probe(&self) {
        let generation = self.probe_generation.fetch_add(1, Ordering::SeqCst) + 1;
        {
            let mut state = self.state.write().await;
            state.phase = AppPhase::Probing;
            state.probe_error = None;
        }

        let result = run_probe(
            &self.registry.schedules,
            self.registry.competitions.as_ref(),
            self.competition_batch,
        )
        .await;
        let loaded = match result {
            Ok(outcome) => {
                let lookups = load_lookups(&self.registry.schedules, &outcome).await;
                Ok((outcome, lookups))
            }
            Err(e) => Err(e),
        };

        {
            let mut state = self.state.write().await;
            if self.probe_generation.load(Ordering::SeqCst) != generation {
                info!("Discarding superseded probe");
                return;
            }
            match loaded {
                Ok((outcome, lookups)) => {
                    state.outcome = outcome;
                    state.lookups = Arc::new(lookups);
                    state.phase = AppPhase::Ready;
                }
                Err(e) => {
                    warn!("Probe failed: {}", e);
                    state.phase = AppPhase::Error;
                    state.probe_error = Some(e.to_string());
                    return;
                }
            }
        }
        self.refresh_scoreboard().await;
    }

    // ── Scoreboard selection ────────────────────────────────────────────────

    pub async fn select(&self, change: SelectionChange) -> AppStatus {
        {
            let mut state = self.state.write().await;
            if change.today {
                state.date = today();
            } else if let Some(date) = change.date {
                state.date = date;
            }
            if let Some(days) = change.shift {
                if let Some(date) = state.date.checked_add_signed(chrono::Duration::days(days)) {
                    state.date = date;
                }
            }
            if let Some(selected) = change.sport {
                state.selected = selected;
            }
        }
        self.refresh_scoreboard().await;
        self.status().await
    }

    async fn refresh_scoreboard(&self) {
        let inputs = {
            let state = self.state.read().await;
            if state.phase != AppPhase::Ready {
                return;
            }
            ScoreboardInputs {
                date: state.date,
                accessible_sports: state.outcome.accessible_sports(),
                accessible_competitions: state.outcome.competitions.clone(),
                selected: state.selected,
                lookups: state.lookups.clone(),
            }
        };
        // The wave completes in the background.
        drop(self.scoreboard.update(inputs).await);
    }

    // ── Event detail ────────────────────────────────────────────────────────

    /// Snapshot of an event's detail page, opening it on first request.
    pub async fn open_event(
        &self,
        event_id: &str,
        date: Option<NaiveDate>,
    ) -> Result<DetailSnapshot, AppError> {
        let viewed = {
            let state = self.state.read().await;
            if state.phase != AppPhase::Ready {
                return Err(AppError::NotReady);
            }
            state.date
        };
        let parsed =
            parse_event_id(event_id).ok_or_else(|| AppError::InvalidEventId(event_id.to_string()))?;

        let existing = self.details.lock().await.get(event_id).cloned();
        if let Some(controller) = existing {
            return Ok(controller.snapshot().await);
        }
        let source = self
            .registry
            .detail(parsed.sport)
            .ok_or(AppError::NoDetail(parsed.sport))?;
        let ctx = FetchContext {
            parsed,
            date: date.unwrap_or(viewed),
            sportsbook_group: self.session.sportsbook_group(),
        };
        // Sections load with the map unlocked; a concurrent opener that lands first wins.
        let opened =
            Arc::new(DetailController::open(event_id, source, ctx, self.detail_timing).await);
        let controller = self
            .details
            .lock()
            .await
            .entry(event_id.to_string())
            .or_insert(opened)
            .clone();
        Ok(controller.snapshot().await)
    }

    /// Tear down a detail page and its polling. Returns whether it was open.
    pub async fn close_event(&self, event_id: &str) -> bool {
        self.details.lock().await.remove(event_id).is_some()
    }

    pub async fn line_movement(
        &self,
        event_id: &str,
        section: &str,
    ) -> Result<SectionFetchResult, AppError> {
        let section: SectionKind = section.parse().map_err(AppError::UnknownSection)?;
        let controller = self
            .details
            .lock()
            .await
            .get(event_id)
            .cloned()
            .ok_or_else(|| AppError::NotOpen(event_id.to_string()))?;
        Ok(controller.line_movement(section).await?)
    }

    /// Fetch a combat event's fight card and swap it onto the scoreboard.
    pub async fn expand_fights(&self, event_id: &str) -> Result<NormalizedEvent, AppError> {
        if self.state.read().await.phase != AppPhase::Ready {
            return Err(AppError::NotReady);
        }
        let parsed =
            parse_event_id(event_id).ok_or_else(|| AppError::InvalidEventId(event_id.to_string()))?;
        if parsed.sport != SportKey::Mma {
            return Err(AppError::NoDetail(parsed.sport));
        }
        let event = self
            .registry
            .fight_cards
            .fight_card(&parsed.provider_id)
            .await?;
        if !self.scoreboard.replace_event(event.clone()).await {
            info!("{} expanded but no longer on the scoreboard", event.id);
        }
        Ok(event)
    }
}
