//! One adapter for all eight team sports.
//!
//! The sports differ only in their URLs, so each is described by a
//! [`TeamRoutes`] table. The detail tabs a sport offers fall out of which
//! routes it has.

use async_trait::async_trait;
use serde::Deserialize;

use super::adapter::{render_route, unsupported, Lookups, ScheduleRequest, SportAdapter};
use super::client::SportsDataClient;
use crate::detail::{DetailSource, FetchContext, SectionFetchResult, SectionKind};
use crate::error::ApiError;
use crate::normalize::dates::{format_iso_date, format_sdio_date, today};
use crate::normalize::team::TeamGame;
use crate::normalize::{transform_team_games, NormalizedEvent, VenueMap};
use crate::sport::SportKey;

/// Route templates for one team sport.
///
/// Placeholders: `{sdio_date}` (`2025-FEB-20`), `{date}` (`2025-02-20`),
/// `{id}` (provider game id) and `{group}` (sportsbook group).
#[derive(Debug, Clone, Copy)]
pub struct TeamRoutes {
    pub schedule: &'static str,
    pub stadiums: Option<&'static str>,
    /// Also backs the line-score tab.
    pub box_score: Option<&'static str>,
    pub play_by_play: Option<&'static str>,
    pub betting_markets: Option<&'static str>,
    pub pregame_odds: Option<&'static str>,
    pub pregame_line_movement: Option<&'static str>,
    pub inplay_odds: Option<&'static str>,
    pub inplay_line_movement: Option<&'static str>,
    pub projections: Option<&'static str>,
}

const NONE: TeamRoutes = TeamRoutes {
    schedule: "",
    stadiums: None,
    box_score: None,
    play_by_play: None,
    betting_markets: None,
    pregame_odds: None,
    pregame_line_movement: None,
    inplay_odds: None,
    inplay_line_movement: None,
    projections: None,
};

const NBA: TeamRoutes = TeamRoutes {
    schedule: "/v3/nba/scores/JSON/GamesByDate/{sdio_date}",
    stadiums: Some("/v3/nba/scores/JSON/Stadiums"),
    box_score: Some("/v3/nba/stats/JSON/BoxScore/{id}"),
    play_by_play: Some("/v3/nba/pbp/JSON/PlayByPlay/{id}"),
    betting_markets: Some("/v3/nba/odds/JSON/BettingMarketsByGameID/{id}/{group}"),
    pregame_odds: Some("/v3/nba/odds/JSON/PreGameOddsByDate/{date}/{group}"),
    pregame_line_movement: Some("/v3/nba/odds/JSON/PreGameOddsLineMovement/{id}/{group}"),
    inplay_odds: Some("/v3/nba/odds/JSON/InGameOddsByDate/{date}/{group}"),
    inplay_line_movement: Some("/v3/nba/odds/JSON/InGameLineMovement/{id}/{group}"),
    projections: Some("/v3/nba/projections/JSON/PlayerGameProjectionStatsByDate/{sdio_date}"),
};

const NFL: TeamRoutes = TeamRoutes {
    schedule: "/v3/nfl/scores/JSON/ScoresByDate/{sdio_date}",
    stadiums: Some("/v3/nfl/scores/JSON/Stadiums"),
    box_score: Some("/v3/nfl/stats/JSON/BoxScoreByScoreIDV3/{id}"),
    play_by_play: Some("/v3/nfl/pbp/JSON/PlayByPlay/{id}"),
    betting_markets: Some("/v3/nfl/odds/JSON/BettingMarketsByGameID/{id}/{group}"),
    ..NONE
};

const NHL: TeamRoutes = TeamRoutes {
    schedule: "/v3/nhl/scores/JSON/GamesByDate/{sdio_date}",
    stadiums: Some("/v3/nhl/scores/JSON/Stadiums"),
    box_score: Some("/v3/nhl/stats/JSON/BoxScore/{id}"),
    play_by_play: Some("/v3/nhl/pbp/JSON/PlayByPlay/{id}"),
    betting_markets: Some("/v3/nhl/odds/JSON/BettingMarketsByGameID/{id}/{group}"),
    pregame_odds: Some("/v3/nhl/odds/JSON/PreGameOddsByDate/{date}/{group}"),
    pregame_line_movement: Some("/v3/nhl/odds/JSON/PreGameOddsLineMovement/{id}/{group}"),
    inplay_odds: Some("/v3/nhl/odds/JSON/InGameOddsByDate/{date}/{group}"),
    inplay_line_movement: Some("/v3/nhl/odds/JSON/InGameLineMovement/{id}/{group}"),
    ..NONE
};

const MLB: TeamRoutes = TeamRoutes {
    schedule: "/v3/mlb/scores/JSON/GamesByDate/{sdio_date}",
    stadiums: Some("/v3/mlb/scores/JSON/Stadiums"),
    box_score: Some("/v3/mlb/stats/JSON/BoxScore/{id}"),
    play_by_play: Some("/v3/mlb/pbp/JSON/PlayByPlay/{id}"),
    betting_markets: Some("/v3/mlb/odds/JSON/BettingMarketsByGameID/{id}/{group}"),
    pregame_odds: Some("/v3/mlb/odds/JSON/PreGameOddsByDate/{date}/{group}"),
    pregame_line_movement: Some("/v3/mlb/odds/JSON/PreGameOddsLineMovement/{id}/{group}"),
    inplay_odds: Some("/v3/mlb/odds/JSON/InGameOddsByDate/{date}/{group}"),
    inplay_line_movement: Some("/v3/mlb/odds/JSON/InGameOddsLineMovement/{id}/{group}"),
    ..NONE
};

const CBB: TeamRoutes = TeamRoutes {
    schedule: "/v3/cbb/scores/JSON/GamesByDate/{sdio_date}",
    stadiums: Some("/v3/cbb/scores/JSON/Stadiums"),
    box_score: Some("/v3/cbb/stats/JSON/BoxScore/{id}"),
    betting_markets: Some("/v3/cbb/odds/JSON/BettingMarketsByGameID/{id}/{group}"),
    pregame_odds: Some("/v3/cbb/odds/JSON/PreGameOddsByDate/{date}/{group}"),
    pregame_line_movement: Some("/v3/cbb/odds/JSON/PreGameOddsLineMovement/{id}/{group}"),
    inplay_odds: Some("/v3/cbb/odds/JSON/InGameOddsByDate/{date}/{group}"),
    inplay_line_movement: Some("/v3/cbb/odds/JSON/InGameLineMovement/{id}/{group}"),
    ..NONE
};

const CFB: TeamRoutes = TeamRoutes {
    schedule: "/v3/cfb/scores/JSON/GamesByDate/{sdio_date}",
    stadiums: Some("/v3/cfb/scores/JSON/Stadiums"),
    box_score: Some("/v3/cfb/stats/JSON/BoxScore/{id}"),
    betting_markets: Some("/v3/cfb/odds/JSON/BettingMarketsByGameID/{id}/{group}"),
    ..NONE
};

const WNBA: TeamRoutes = TeamRoutes {
    schedule: "/v3/wnba/scores/JSON/GamesByDate/{sdio_date}",
    stadiums: Some("/v3/wnba/scores/JSON/Stadiums"),
    box_score: Some("/v3/wnba/scores/JSON/BoxScore/{id}"),
    betting_markets: Some("/v3/wnba/scores/JSON/BettingMarketsByGameID/{id}/{group}"),
    ..NONE
};

const CWBB: TeamRoutes = TeamRoutes {
    schedule: "/v3/cwbb/scores/JSON/GamesByDate/{sdio_date}",
    ..NONE
};

/// Route table for a team sport; `None` for every other sport.
pub fn team_routes(sport: SportKey) -> Option<&'static TeamRoutes> {
    match sport {
        SportKey::Nba => Some(&NBA),
        SportKey::Nfl => Some(&NFL),
        SportKey::Nhl => Some(&NHL),
        SportKey::Mlb => Some(&MLB),
        SportKey::Cbb => Some(&CBB),
        SportKey::Cfb => Some(&CFB),
        SportKey::Wnba => Some(&WNBA),
        SportKey::Cwbb => Some(&CWBB),
        _ => None,
    }
}

impl TeamRoutes {
    /// Detail tabs backed by this table, in tab order.
    pub fn sections(&self) -> Vec<SectionKind> {
        SectionKind::ALL
            .into_iter()
            .filter(|s| self.section_route(*s).is_some())
            .collect()
    }

    fn section_route(&self, section: SectionKind) -> Option<&'static str> {
        match section {
            SectionKind::BoxScore | SectionKind::LineScore => self.box_score,
            SectionKind::PlayByPlay => self.play_by_play,
            SectionKind::Betting => self.betting_markets,
            SectionKind::PregameOdds => self.pregame_odds,
            SectionKind::InplayOdds => self.inplay_odds,
            SectionKind::Projections => self.projections,
        }
    }

    fn line_movement_route(&self, section: SectionKind) -> Option<&'static str> {
        match section {
            SectionKind::PregameOdds => self.pregame_line_movement,
            SectionKind::InplayOdds => self.inplay_line_movement,
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Stadium {
    #[serde(rename = "StadiumID")]
    stadium_id: Option<i64>,
    name: Option<String>,
}

pub struct TeamSportAdapter {
    sport: SportKey,
    routes: &'static TeamRoutes,
    client: SportsDataClient,
}

impl TeamSportAdapter {
    /// `None` when `sport` is not a team sport.
    pub fn new(sport: SportKey, client: SportsDataClient) -> Option<Self> {
        Some(TeamSportAdapter {
            sport,
            routes: team_routes(sport)?,
            client,
        })
    }

    fn schedule_path(&self, date: chrono::NaiveDate) -> String {
        render_route(
            self.routes.schedule,
            &[("sdio_date", &format_sdio_date(date))],
        )
    }

    fn detail_path(&self, template: &str, ctx: &FetchContext) -> String {
        render_route(
            template,
            &[
                ("id", &ctx.parsed.provider_id),
                ("group", &ctx.sportsbook_group),
                ("date", &format_iso_date(ctx.date)),
                ("sdio_date", &format_sdio_date(ctx.date)),
            ],
        )
    }
}

#[async_trait]
impl SportAdapter for TeamSportAdapter {
    type Raw = TeamGame;

    fn sport(&self) -> SportKey {
        self.sport
    }

    async fn probe(&self) -> Result<bool, ApiError> {
        self.client.probe(&self.schedule_path(today())).await
    }

    async fn fetch_raw(&self, request: &ScheduleRequest) -> Result<Vec<TeamGame>, ApiError> {
        match request {
            ScheduleRequest::Date(date) => self.client.get_list(&self.schedule_path(*date)).await,
            _ => Err(unsupported(self.sport, "non-date schedules")),
        }
    }

    fn normalize(
        &self,
        raw: &[TeamGame],
        _request: &ScheduleRequest,
        lookups: &Lookups,
    ) -> Vec<NormalizedEvent> {
        transform_team_games(self.sport, raw, lookups.venues_for(self.sport))
    }

    async fn venues(&self) -> Result<Option<VenueMap>, ApiError> {
        let Some(path) = self.routes.stadiums else {
            return Ok(None);
        };
        let stadiums: Vec<Stadium> = self.client.get_list(path).await?;
        Ok(Some(
            stadiums
                .into_iter()
                .filter_map(|s| Some((s.stadium_id?, s.name?)))
                .collect(),
        ))
    }
}

#[async_trait]
impl DetailSource for TeamSportAdapter {
    fn sections(&self) -> Vec<SectionKind> {
        self.routes.sections()
    }

    async fn fetch_section(
        &self,
        section: SectionKind,
        ctx: &FetchContext,
    ) -> Result<SectionFetchResult, ApiError> {
        let template = self
            .routes
            .section_route(section)
            .ok_or_else(|| unsupported(self.sport, "this detail section"))?;
        let (data, status) = self.client.get_value(&self.detail_path(template, ctx)).await?;
        Ok(SectionFetchResult { data, status })
    }

    async fn fetch_line_movement(
        &self,
        section: SectionKind,
        ctx: &FetchContext,
    ) -> Result<SectionFetchResult, ApiError> {
        let template = self
            .routes
            .line_movement_route(section)
            .ok_or_else(|| unsupported(self.sport, "line movement for this section"))?;
        let (data, status) = self.client.get_value(&self.detail_path(template, ctx)).await?;
        Ok(SectionFetchResult { data, status })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detail::ParsedEventId;
    use crate::normalize::EventStatus;
    use crate::sportsdata::adapter::ScheduleSource;
    use crate::sportsdata::test_support::{serve, session_with_key};
    use axum::{extract::Path, http::StatusCode, routing::get, Json, Router};
    use chrono::NaiveDate;

    fn sections(sport: SportKey) -> Vec<SectionKind> {
        team_routes(sport).map(|r| r.sections()).unwrap_or_default()
    }

    #[test]
    fn test_section_registry() {
        use SectionKind::*;
        assert_eq!(
            sections(SportKey::Nba),
            vec![BoxScore, LineScore, PlayByPlay, Betting, PregameOdds, InplayOdds, Projections]
        );
        assert_eq!(
            sections(SportKey::Nhl),
            vec![BoxScore, LineScore, PlayByPlay, Betting, PregameOdds, InplayOdds]
        );
        assert_eq!(sections(SportKey::Mlb), sections(SportKey::Nhl));
        assert_eq!(
            sections(SportKey::Nfl),
            vec![BoxScore, LineScore, PlayByPlay, Betting]
        );
        assert_eq!(
            sections(SportKey::Cbb),
            vec![BoxScore, LineScore, Betting, PregameOdds, InplayOdds]
        );
        assert_eq!(sections(SportKey::Cfb), vec![BoxScore, LineScore, Betting]);
        assert_eq!(sections(SportKey::Wnba), vec![BoxScore, LineScore, Betting]);
        assert!(sections(SportKey::Cwbb).is_empty());
        assert!(team_routes(SportKey::Golf).is_none());
    }

    #[test]
    fn test_only_odds_sections_have_line_movement() {
        for sport in SportKey::ALL {
            let Some(routes) = team_routes(sport) else { continue };
            for section in routes.sections() {
                assert_eq!(
                    routes.line_movement_route(section).is_some(),
                    section.has_line_movement(),
                    "{} {}",
                    sport,
                    section
                );
            }
        }
    }

    #[tokio::test]
    async fn test_fetch_games_by_date() {
        let router = Router::new()
            .route(
                "/v3/nba/scores/JSON/GamesByDate/:date",
                get(|Path(date): Path<String>| async move {
                    assert_eq!(date, "2025-FEB-20");
                    Json(serde_json::json!([{
                        "GameID": 18765,
                        "Status": "Final",
                        "IsClosed": true,
                        "Day": "2025-02-20T00:00:00",
                        "AwayTeam": "LAL",
                        "HomeTeam": "BOS",
                        "AwayTeamScore": 101,
                        "HomeTeamScore": 98,
                        "StadiumID": 7
                    }]))
                }),
            )
            .route(
                "/v3/nba/scores/JSON/Stadiums",
                get(|| async { Json(serde_json::json!([{ "StadiumID": 7, "Name": "TD Garden" }])) }),
            );
        let base = serve(router).await;
        let client = SportsDataClient::new(&base, session_with_key(Some("k"))).unwrap();
        let adapter = TeamSportAdapter::new(SportKey::Nba, client).unwrap();

        let mut lookups = Lookups::default();
        if let Some(venues) = adapter.venue_map().await.unwrap() {
            lookups.venues.insert(SportKey::Nba, venues);
        }

        let date = NaiveDate::from_ymd_opt(2025, 2, 20).unwrap();
        let events = adapter
            .events(&ScheduleRequest::Date(date), &lookups)
            .await
            .unwrap();
        assert_eq!(events.len(), 1);
        let e = &events[0];
        assert_eq!(e.id, "nba-18765");
        assert_eq!(e.status, EventStatus::Final);
        assert!(e.is_closed);
        assert_eq!(e.away_score, Some(101));
        assert_eq!(e.home_score, Some(98));
        assert_eq!(e.venue.as_deref(), Some("TD Garden"));
    }

    #[tokio::test]
    async fn test_season_request_unsupported() {
        let client =
            SportsDataClient::new("http://127.0.0.1:9", session_with_key(Some("k"))).unwrap();
        let adapter = TeamSportAdapter::new(SportKey::Nfl, client).unwrap();
        let err = adapter
            .events(&ScheduleRequest::Season("2025".into()), &Lookups::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Unsupported { .. }));
    }

    #[tokio::test]
    async fn test_detail_paths() {
        let router = Router::new()
            .route(
                "/v3/nba/odds/JSON/BettingMarketsByGameID/:id/:group",
                get(|Path((id, group)): Path<(String, String)>| async move {
                    Json(serde_json::json!({ "id": id, "group": group }))
                }),
            )
            .route(
                "/v3/nba/odds/JSON/PreGameOddsByDate/:date/:group",
                get(|Path((date, _)): Path<(String, String)>| async move {
                    Json(serde_json::json!({ "date": date }))
                }),
            )
            .route(
                "/v3/nba/stats/JSON/BoxScore/:id",
                get(|| async { StatusCode::UNAUTHORIZED }),
            );
        let base = serve(router).await;
        let client = SportsDataClient::new(&base, session_with_key(Some("k"))).unwrap();
        let adapter = TeamSportAdapter::new(SportKey::Nba, client).unwrap();
        let ctx = FetchContext {
            parsed: ParsedEventId {
                sport: SportKey::Nba,
                competition: None,
                provider_id: "18765".into(),
            },
            date: NaiveDate::from_ymd_opt(2025, 2, 20).unwrap(),
            sportsbook_group: "G1001".into(),
        };

        let betting = adapter.fetch_section(SectionKind::Betting, &ctx).await.unwrap();
        assert_eq!(betting.status, 200);
        assert_eq!(betting.data["id"], "18765");
        assert_eq!(betting.data["group"], "G1001");

        let odds = adapter
            .fetch_section(SectionKind::PregameOdds, &ctx)
            .await
            .unwrap();
        assert_eq!(odds.data["date"], "2025-02-20");

        let err = adapter
            .fetch_section(SectionKind::LineScore, &ctx)
            .await
            .unwrap_err();
        assert!(err.is_unauthorized());

        let err = adapter
            .fetch_line_movement(SectionKind::Betting, &ctx)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Unsupported { .. }));
    }
}
