use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::adapter::{render_route, unsupported, Lookups, ScheduleRequest, SportAdapter};
use super::client::SportsDataClient;
use super::probe::CompetitionProber;
use crate::error::ApiError;
use crate::normalize::dates::{format_iso_date, today};
use crate::normalize::soccer::SoccerGame;
use crate::normalize::{transform_soccer_games, NormalizedEvent, VenueMap};
use crate::sport::SportKey;

const COMPETITIONS: &str = "/v4/soccer/scores/JSON/Competitions";
const VENUES: &str = "/v4/soccer/scores/JSON/Venues";
const GAMES_BY_DATE: &str = "/v4/soccer/scores/JSON/GamesByDate/{competition}/{date}";

/// One entry of the provider's competition catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CompetitionInfo {
    pub key: Option<String>,
    pub area_name: Option<String>,
    pub name: Option<String>,
    pub gender: Option<String>,
}

impl CompetitionInfo {
    /// `"{AreaName} {Name}"`, plus ` ({Gender})` for anything but men's.
    /// A nameless competition is labelled by its key.
    pub fn label(&self) -> String {
        let name = self
            .name
            .as_deref()
            .or(self.key.as_deref())
            .unwrap_or_default();
        let mut label = format!("{} {}", self.area_name.as_deref().unwrap_or_default(), name);
        if let Some(gender) = self.gender.as_deref().filter(|g| !g.is_empty() && *g != "Male") {
            label.push_str(&format!(" ({})", gender));
        }
        label.trim().to_string()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Venue {
    venue_id: Option<i64>,
    name: Option<String>,
}

pub struct SoccerAdapter {
    client: SportsDataClient,
}

impl SoccerAdapter {
    pub fn new(client: SportsDataClient) -> Self {
        SoccerAdapter { client }
    }

    fn games_path(competition: &str, date: NaiveDate) -> String {
        render_route(
            GAMES_BY_DATE,
            &[("competition", competition), ("date", &format_iso_date(date))],
        )
    }
}

#[async_trait]
impl SportAdapter for SoccerAdapter {
    type Raw = SoccerGame;

    fn sport(&self) -> SportKey {
        SportKey::Soccer
    }

    /// Reachability of the soccer API as a whole, not of any competition.
    async fn probe(&self) -> Result<bool, ApiError> {
        self.client.probe(COMPETITIONS).await
    }

    async fn fetch_raw(&self, request: &ScheduleRequest) -> Result<Vec<SoccerGame>, ApiError> {
        match request {
            ScheduleRequest::Competition { competition, date } => {
                self.client
                    .get_list(&Self::games_path(competition, *date))
                    .await
            }
            _ => Err(unsupported(SportKey::Soccer, "schedules without a competition")),
        }
    }

    fn normalize(
        &self,
        raw: &[SoccerGame],
        request: &ScheduleRequest,
        lookups: &Lookups,
    ) -> Vec<NormalizedEvent> {
        let ScheduleRequest::Competition { competition, .. } = request else {
            return Vec::new();
        };
        transform_soccer_games(
            raw,
            competition,
            lookups.competition_label(competition),
            lookups.venues_for(SportKey::Soccer),
        )
    }

    async fn venues(&self) -> Result<Option<VenueMap>, ApiError> {
        let venues: Vec<Venue> = self.client.get_list(VENUES).await?;
        Ok(Some(
            venues
                .into_iter()
                .filter_map(|v| Some((v.venue_id?, v.name?)))
                .collect(),
        ))
    }
}

#[async_trait]
impl CompetitionProber for SoccerAdapter {
    async fn competitions(&self) -> Result<Vec<CompetitionInfo>, ApiError> {
        self.client.get_list(COMPETITIONS).await
    }

    async fn probe_competition(&self, key: &str) -> Result<bool, ApiError> {
        self.client.probe(&Self::games_path(key, today())).await
    }
}
