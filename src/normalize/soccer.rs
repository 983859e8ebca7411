use serde::Deserialize;

use super::dates::{parse_date_time, sdio_date_to_iso};
use super::{non_empty, normalize_status, NormalizedEvent, VenueMap};
use crate::sport::{SportCategory, SportKey};

/// One game from the v4 soccer `GamesByDate` endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SoccerGame {
    pub game_id: Option<i64>,
    pub status: Option<String>,
    pub day: Option<String>,
    pub date_time: Option<String>,
    pub home_team_name: Option<String>,
    pub home_team_key: Option<String>,
    pub away_team_name: Option<String>,
    pub away_team_key: Option<String>,
    pub home_team_score: Option<i32>,
    pub away_team_score: Option<i32>,
    pub point_spread: Option<f64>,
    pub over_under: Option<f64>,
    pub home_team_money_line: Option<i32>,
    pub away_team_money_line: Option<i32>,
    /// `RegularTime`, `ExtraTime`, `PenaltyKicks`, ...
    pub period: Option<String>,
    pub clock: Option<i32>,
    pub clock_extra: Option<i32>,
    pub clock_display: Option<String>,
    pub venue_id: Option<i64>,
}

/// Match clock as `"{ET |PKs }{clock}'"`, preferring the provider's own
/// display string over the numeric clock plus stoppage minutes.
pub fn format_soccer_status(game: &SoccerGame) -> Option<String> {
    let prefix = match game.period.as_deref() {
        Some("ExtraTime") => "ET ",
        Some("PenaltyKicks") => "PKs ",
        _ => "",
    };

    if let Some(display) = non_empty(game.clock_display.as_deref()) {
        return Some(format!("{}{}'", prefix, display));
    }

    let clock = game.clock?;
    let extra = match game.clock_extra {
        Some(extra) if extra > 0 => format!("+{}", extra),
        _ => String::new(),
    };
    Some(format!("{}{}{}'", prefix, clock, extra))
}

pub fn transform_soccer_games(
    games: &[SoccerGame],
    competition_key: &str,
    competition_label: Option<&str>,
    venues: Option<&VenueMap>,
) -> Vec<NormalizedEvent> {
    let label = competition_label
        .map(str::to_string)
        .unwrap_or_else(|| format!("Soccer ({})", competition_key));

    games
        .iter()
        .map(|g| {
            let venue = venues.zip(g.venue_id).and_then(|(map, id)| map.get(&id).cloned());
            let provider_id = g.game_id.map(|id| id.to_string()).unwrap_or_default();

            NormalizedEvent {
                id: format!("soccer-{}-{}", competition_key, provider_id),
                sport: SportCategory::Soccer,
                sport_key: Some(SportKey::Soccer),
                sport_label: label.clone(),
                status: normalize_status(g.status.as_deref()),
                is_closed: g.status.as_deref() == Some("Final"),
                date_time: parse_date_time(g.date_time.as_deref()),
                day: sdio_date_to_iso(g.day.as_deref()),
                home_team: g.home_team_name.clone().or_else(|| g.home_team_key.clone()),
                away_team: g.away_team_name.clone().or_else(|| g.away_team_key.clone()),
                home_score: g.home_team_score,
                away_score: g.away_team_score,
                point_spread: g.point_spread,
                over_under: g.over_under,
                home_money_line: g.home_team_money_line,
                away_money_line: g.away_team_money_line,
                competition_key: Some(competition_key.to_string()),
                game_status: format_soccer_status(g),
                venue,
                ..Default::default()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::EventStatus;

    fn game(json: serde_json::Value) -> SoccerGame {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_clock_display_preferred() {
        let g = game(serde_json::json!({ "ClockDisplay": "45+2", "Clock": 45, "ClockExtra": 2 }));
        assert_eq!(format_soccer_status(&g).as_deref(), Some("45+2'"));
    }

    #[test]
    fn test_numeric_clock_with_extra_time() {
        let g = game(serde_json::json!({ "Period": "ExtraTime", "Clock": 105, "ClockExtra": 1 }));
        assert_eq!(format_soccer_status(&g).as_deref(), Some("ET 105+1'"));

        let g = game(serde_json::json!({ "Clock": 67, "ClockExtra": 0 }));
        assert_eq!(format_soccer_status(&g).as_deref(), Some("67'"));
    }

    #[test]
    fn test_penalty_prefix_and_missing_clock() {
        let g = game(serde_json::json!({ "Period": "PenaltyKicks", "ClockDisplay": "120" }));
        assert_eq!(format_soccer_status(&g).as_deref(), Some("PKs 120'"));

        let g = game(serde_json::json!({ "Period": "RegularTime" }));
        assert_eq!(format_soccer_status(&g), None);
    }

    #[test]
    fn test_transform_soccer_game() {
        let games = vec![game(serde_json::json!({
            "GameId": 789012,
            "Status": "InProgress",
            "Day": "2025-03-01T00:00:00",
            "HomeTeamKey": "ARS",
            "AwayTeamName": "Chelsea",
            "AwayTeamKey": "CHE",
            "HomeTeamScore": 2,
            "AwayTeamScore": 1,
            "Clock": 78,
            "VenueId": 3
        }))];
        let venues: VenueMap = [(3, "Emirates Stadium".to_string())].into();
        let events = transform_soccer_games(&games, "EPL", Some("England Premier League"), Some(&venues));

        let e = &events[0];
        assert_eq!(e.id, "soccer-EPL-789012");
        assert_eq!(e.sport, SportCategory::Soccer);
        assert_eq!(e.sport_label, "England Premier League");
        assert_eq!(e.status, EventStatus::InProgress);
        assert!(!e.is_closed);
        assert_eq!(e.home_team.as_deref(), Some("ARS"));
        assert_eq!(e.away_team.as_deref(), Some("Chelsea"));
        assert_eq!(e.game_status.as_deref(), Some("78'"));
        assert_eq!(e.venue.as_deref(), Some("Emirates Stadium"));
        assert_eq!(e.competition_key.as_deref(), Some("EPL"));
    }

    #[test]
    fn test_label_falls_back_to_competition_key() {
        let games = vec![game(serde_json::json!({ "GameId": 1, "Status": "Final" }))];
        let e = &transform_soccer_games(&games, "MLS", None, None)[0];
        assert_eq!(e.sport_label, "Soccer (MLS)");
        assert!(e.is_closed);
    }
}
