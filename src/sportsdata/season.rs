//! Season-based sports: NASCAR, MMA and golf.
//!
//! Their schedules are not date-partitioned; each adapter returns the whole
//! season and the caller filters by date.

use async_trait::async_trait;

use super::adapter::{render_route, unsupported, Lookups, ScheduleRequest, SportAdapter};
use super::client::SportsDataClient;
use crate::error::ApiError;
use crate::normalize::combat::{MmaEvent, MmaEventDetail};
use crate::normalize::golf::GolfTournament;
use crate::normalize::motorsport::NascarRace;
use crate::normalize::{
    transform_golf_tournaments, transform_mma_event_detail, transform_mma_events,
    transform_nascar_races, NormalizedEvent,
};
use crate::sport::SportKey;

fn season_of(sport: SportKey, request: &ScheduleRequest) -> Result<&str, ApiError> {
    match request {
        ScheduleRequest::Season(season) => Ok(season.as_str()),
        _ => Err(unsupported(sport, "date schedules")),
    }
}

// ── NASCAR ──────────────────────────────────────────────────────────────────

pub struct NascarAdapter {
    client: SportsDataClient,
}

impl NascarAdapter {
    pub fn new(client: SportsDataClient) -> Self {
        NascarAdapter { client }
    }
}

#[async_trait]
impl SportAdapter for NascarAdapter {
    type Raw = NascarRace;

    fn sport(&self) -> SportKey {
        SportKey::Nascar
    }

    async fn probe(&self) -> Result<bool, ApiError> {
        self.client.probe("/nascar/v2/JSON/series").await
    }

    async fn fetch_raw(&self, request: &ScheduleRequest) -> Result<Vec<NascarRace>, ApiError> {
        let season = season_of(SportKey::Nascar, request)?;
        let path = render_route("/nascar/v2/JSON/races/{season}", &[("season", season)]);
        self.client.get_list(&path).await
    }

    fn normalize(&self, raw: &[NascarRace], _: &ScheduleRequest, _: &Lookups) -> Vec<NormalizedEvent> {
        transform_nascar_races(raw)
    }
}

// ── MMA ─────────────────────────────────────────────────────────────────────

/// Only UFC is scheduled.
const MMA_LEAGUE: &str = "UFC";

/// Lazy fight-card expansion for combat events.
#[async_trait]
pub trait FightCardSource: Send + Sync {
    async fn fight_card(&self, event_id: &str) -> Result<NormalizedEvent, ApiError>;
}

pub struct MmaAdapter {
    client: SportsDataClient,
}

impl MmaAdapter {
    pub fn new(client: SportsDataClient) -> Self {
        MmaAdapter { client }
    }
}

#[async_trait]
impl SportAdapter for MmaAdapter {
    type Raw = MmaEvent;

    fn sport(&self) -> SportKey {
        SportKey::Mma
    }

    async fn probe(&self) -> Result<bool, ApiError> {
        self.client.probe("/v3/mma/scores/JSON/Leagues").await
    }

    async fn fetch_raw(&self, request: &ScheduleRequest) -> Result<Vec<MmaEvent>, ApiError> {
        let season = season_of(SportKey::Mma, request)?;
        let path = render_route(
            "/v3/mma/scores/JSON/Schedule/{league}/{season}",
            &[("league", MMA_LEAGUE), ("season", season)],
        );
        self.client.get_list(&path).await
    }

    fn normalize(&self, raw: &[MmaEvent], _: &ScheduleRequest, _: &Lookups) -> Vec<NormalizedEvent> {
        transform_mma_events(raw)
    }
}

#[async_trait]
impl FightCardSource for MmaAdapter {
    async fn fight_card(&self, event_id: &str) -> Result<NormalizedEvent, ApiError> {
        let path = render_route("/v3/mma/scores/JSON/Event/{id}", &[("id", event_id)]);
        let detail: MmaEventDetail = self.client.get_json(&path).await?;
        Ok(transform_mma_event_detail(&detail))
    }
}

// ── Golf ────────────────────────────────────────────────────────────────────

pub struct GolfAdapter {
    client: SportsDataClient,
}

impl GolfAdapter {
    pub fn new(client: SportsDataClient) -> Self {
        GolfAdapter { client }
    }
}

#[async_trait]
impl SportAdapter for GolfAdapter {
    type Raw = GolfTournament;

    fn sport(&self) -> SportKey {
        SportKey::Golf
    }

    async fn probe(&self) -> Result<bool, ApiError> {
        self.client.probe("/golf/v2/JSON/Tournaments").await
    }

    async fn fetch_raw(&self, request: &ScheduleRequest) -> Result<Vec<GolfTournament>, ApiError> {
        let season = season_of(SportKey::Golf, request)?;
        let path = render_route("/golf/v2/JSON/Tournaments/{season}", &[("season", season)]);
        self.client.get_list(&path).await
    }

    fn normalize(
        &self,
        raw: &[GolfTournament],
        _: &ScheduleRequest,
        _: &Lookups,
    ) -> Vec<NormalizedEvent> {
        transform_golf_tournaments(raw)
    }
}
