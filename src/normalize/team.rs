//! Team sports: NBA, NFL, NHL, MLB, college basketball/football, WNBA.
//!
//! All of them share one `Game` shape with small field-name differences.
//! Rather than branching inline, each sport resolves to a [`TeamFieldSet`]
//! of accessor functions and the transform reads every field through it.

use serde::Deserialize;

use super::dates::{parse_date_time, sdio_date_to_iso};
use super::{non_empty, normalize_status, EventStatus, NormalizedEvent, VenueMap};
use crate::sport::{SportCategory, SportKey};

/// Union of the fields the team-sport schedule endpoints return.
/// NFL's `ScoresByDate` uses `ScoreID`/`Date`/`HomeScore`, everyone else
/// uses `GameID`/`Day`/`HomeTeamScore`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TeamGame {
    #[serde(rename = "GameID")]
    pub game_id: Option<i64>,
    #[serde(rename = "ScoreID")]
    pub score_id: Option<i64>,
    pub status: Option<String>,
    pub day: Option<String>,
    pub date_time: Option<String>,
    pub date: Option<String>,

    pub away_team: Option<String>,
    pub home_team: Option<String>,
    pub away_team_score: Option<i32>,
    pub home_team_score: Option<i32>,
    pub away_score: Option<i32>,
    pub home_score: Option<i32>,
    pub away_team_runs: Option<i32>,
    pub home_team_runs: Option<i32>,

    pub point_spread: Option<f64>,
    pub over_under: Option<f64>,
    pub away_team_money_line: Option<i32>,
    pub home_team_money_line: Option<i32>,

    pub is_closed: Option<bool>,
    pub is_over: Option<bool>,
    pub is_in_progress: Option<bool>,
    pub channel: Option<String>,

    pub quarter: Option<String>,
    pub period: Option<String>,
    pub quarter_description: Option<String>,
    pub time_remaining_minutes: Option<i32>,
    pub time_remaining_seconds: Option<i32>,

    pub inning_description: Option<String>,
    pub balls: Option<i32>,
    pub strikes: Option<i32>,
    pub outs: Option<i32>,

    pub down_and_distance: Option<String>,
    pub yard_line: Option<i32>,
    pub yard_line_territory: Option<String>,

    pub last_play: Option<String>,
    #[serde(rename = "StadiumID")]
    pub stadium_id: Option<i64>,
    pub stadium_details: Option<StadiumDetails>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StadiumDetails {
    pub name: Option<String>,
}

/// Where each normalized field comes from for one family of team sports.
pub struct TeamFieldSet {
    pub provider_id: fn(&TeamGame) -> Option<i64>,
    pub status: fn(&TeamGame) -> EventStatus,
    pub date_time: fn(&TeamGame) -> Option<&str>,
    pub day: fn(&TeamGame) -> Option<&str>,
    /// `(home, away)`
    pub scores: fn(&TeamGame) -> (Option<i32>, Option<i32>),
    pub venue: fn(&TeamGame, Option<&VenueMap>) -> Option<String>,
    pub game_status: fn(&TeamGame) -> Option<String>,
    pub game_detail: fn(&TeamGame) -> Option<String>,
}

const STANDARD: TeamFieldSet = TeamFieldSet {
    provider_id: game_id,
    status: status_string,
    date_time: date_time_field,
    day: day_field,
    scores: team_scores,
    venue: venue_from_map,
    game_status: quarter_clock,
    game_detail: no_detail,
};

const HOCKEY: TeamFieldSet = TeamFieldSet {
    game_status: period_clock,
    ..STANDARD
};

const BASEBALL: TeamFieldSet = TeamFieldSet {
    scores: run_scores,
    game_status: inning_description,
    game_detail: count_and_outs,
    ..STANDARD
};

const FOOTBALL_NFL: TeamFieldSet = TeamFieldSet {
    provider_id: score_id,
    status: status_from_nfl_flags,
    date_time: date_field,
    day: date_field,
    scores: nfl_scores,
    venue: embedded_stadium,
    game_status: quarter_description,
    game_detail: down_and_distance,
};

/// Accessor table for a team sport. Non-team sports fall back to the
/// standard table; they never reach this module in practice.
pub fn field_set(sport: SportKey) -> &'static TeamFieldSet {
    match sport {
        SportKey::Nfl => &FOOTBALL_NFL,
        SportKey::Nhl => &HOCKEY,
        SportKey::Mlb => &BASEBALL,
        _ => &STANDARD,
    }
}

pub fn transform_team_games(
    sport: SportKey,
    games: &[TeamGame],
    stadiums: Option<&VenueMap>,
) -> Vec<NormalizedEvent> {
    let fields = field_set(sport);
    games
        .iter()
        .map(|g| transform_team_game(sport, fields, g, stadiums))
        .collect()
}

fn transform_team_game(
    sport: SportKey,
    fields: &TeamFieldSet,
    g: &TeamGame,
    stadiums: Option<&VenueMap>,
) -> NormalizedEvent {
    let provider_id = (fields.provider_id)(g)
        .map(|id| id.to_string())
        .unwrap_or_default();
    let (home_score, away_score) = (fields.scores)(g);

    NormalizedEvent {
        id: format!("{}-{}", sport, provider_id),
        sport: SportCategory::Team,
        sport_key: Some(sport),
        sport_label: sport.display_name().to_string(),
        status: (fields.status)(g),
        is_closed: g.is_closed.unwrap_or(false),
        date_time: parse_date_time((fields.date_time)(g)),
        day: sdio_date_to_iso((fields.day)(g)),
        home_team: g.home_team.clone(),
        away_team: g.away_team.clone(),
        home_score,
        away_score,
        point_spread: g.point_spread,
        over_under: g.over_under,
        home_money_line: g.home_team_money_line,
        away_money_line: g.away_team_money_line,
        channel: g.channel.clone(),
        venue: (fields.venue)(g, stadiums),
        game_status: (fields.game_status)(g),
        game_detail: (fields.game_detail)(g),
        last_play: g.last_play.clone(),
        ..Default::default()
    }
}

// ── Accessors ────────────────────────────────────────────────────────────────

fn game_id(g: &TeamGame) -> Option<i64> {
    g.game_id
}

fn score_id(g: &TeamGame) -> Option<i64> {
    g.score_id
}

fn status_string(g: &TeamGame) -> EventStatus {
    normalize_status(g.status.as_deref())
}

fn status_from_nfl_flags(g: &TeamGame) -> EventStatus {
    if g.is_over.unwrap_or(false) {
        EventStatus::Final
    } else if g.is_in_progress.unwrap_or(false) {
        EventStatus::InProgress
    } else {
        EventStatus::Scheduled
    }
}

fn date_time_field(g: &TeamGame) -> Option<&str> {
    g.date_time.as_deref()
}

fn day_field(g: &TeamGame) -> Option<&str> {
    g.day.as_deref()
}

fn date_field(g: &TeamGame) -> Option<&str> {
    g.date.as_deref()
}

fn team_scores(g: &TeamGame) -> (Option<i32>, Option<i32>) {
    (g.home_team_score, g.away_team_score)
}

fn run_scores(g: &TeamGame) -> (Option<i32>, Option<i32>) {
    (g.home_team_runs, g.away_team_runs)
}

fn nfl_scores(g: &TeamGame) -> (Option<i32>, Option<i32>) {
    (g.home_score, g.away_score)
}

fn venue_from_map(g: &TeamGame, stadiums: Option<&VenueMap>) -> Option<String> {
    stadiums?.get(&g.stadium_id?).cloned()
}

fn embedded_stadium(g: &TeamGame, _stadiums: Option<&VenueMap>) -> Option<String> {
    g.stadium_details.as_ref()?.name.clone()
}

fn quarter_clock(g: &TeamGame) -> Option<String> {
    let quarter = g.quarter.as_deref().or(g.period.as_deref());
    format_quarter_status(quarter, g.time_remaining_minutes, g.time_remaining_seconds)
}

fn period_clock(g: &TeamGame) -> Option<String> {
    format_period_status(
        g.period.as_deref(),
        g.time_remaining_minutes,
        g.time_remaining_seconds,
    )
}

fn inning_description(g: &TeamGame) -> Option<String> {
    g.inning_description.clone()
}

fn quarter_description(g: &TeamGame) -> Option<String> {
    g.quarter_description.clone()
}

fn no_detail(_g: &TeamGame) -> Option<String> {
    None
}

fn count_and_outs(g: &TeamGame) -> Option<String> {
    match (g.balls, g.strikes, g.outs) {
        (Some(b), Some(s), Some(o)) => Some(format!("{}-{}, {} Out", b, s, o)),
        _ => None,
    }
}

fn down_and_distance(g: &TeamGame) -> Option<String> {
    let down = non_empty(g.down_and_distance.as_deref())?;
    let territory = match non_empty(g.yard_line_territory.as_deref()) {
        Some(side) => {
            let yard = g.yard_line.map(|y| y.to_string()).unwrap_or_default();
            format!(" at {} {}", side, yard).trim_end().to_string()
        }
        None => String::new(),
    };
    Some(format!("{}{}", down, territory))
}

// ── Clock formatting ─────────────────────────────────────────────────────────

fn clock_suffix(minutes: Option<i32>, seconds: Option<i32>) -> String {
    match (minutes, seconds) {
        (Some(m), Some(s)) => format!(" {}:{:02}", m, s),
        _ => String::new(),
    }
}

/// `"1", 5, 23` → `"Q1 5:23"`; `"OT"` passes through; half → `"Halftime"`.
pub fn format_quarter_status(
    quarter: Option<&str>,
    minutes: Option<i32>,
    seconds: Option<i32>,
) -> Option<String> {
    let q = quarter?.trim();
    if q.is_empty() {
        return None;
    }
    let lower = q.to_lowercase();
    if lower == "half" || lower == "halftime" {
        return Some("Halftime".to_string());
    }
    let label = if q.chars().all(|c| c.is_ascii_digit()) {
        format!("Q{}", q)
    } else {
        q.to_string()
    };
    Some(format!("{}{}", label, clock_suffix(minutes, seconds)))
}

/// `"2", 12, 4` → `"2nd 12:04"`; shootout → `"SO"`.
pub fn format_period_status(
    period: Option<&str>,
    minutes: Option<i32>,
    seconds: Option<i32>,
) -> Option<String> {
    let p = period?.trim();
    if p.is_empty() {
        return None;
    }
    let lower = p.to_lowercase();
    if lower == "so" || lower == "shootout" {
        return Some("SO".to_string());
    }
    let label = match p {
        "1" => "1st",
        "2" => "2nd",
        "3" => "3rd",
        other => other,
    };
    Some(format!("{}{}", label, clock_suffix(minutes, seconds)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn games(json: serde_json::Value) -> Vec<TeamGame> {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_nba_final_game() {
        let raw = games(serde_json::json!([{
            "GameID": 21234,
            "Status": "Final",
            "Day": "2025-02-20T00:00:00",
            "DateTime": "2025-02-20T19:30:00",
            "AwayTeam": "BOS",
            "HomeTeam": "NY",
            "AwayTeamScore": 101,
            "HomeTeamScore": 98,
            "IsClosed": true,
            "PointSpread": -3.5,
            "StadiumID": 7
        }]));
        let stadiums: VenueMap = [(7, "Madison Square Garden".to_string())].into();
        let events = transform_team_games(SportKey::Nba, &raw, Some(&stadiums));

        assert_eq!(events.len(), 1);
        let e = &events[0];
        assert_eq!(e.id, "nba-21234");
        assert_eq!(e.status, EventStatus::Final);
        assert!(e.is_closed);
        assert_eq!(e.away_score, Some(101));
        assert_eq!(e.home_score, Some(98));
        assert_eq!(e.day, NaiveDate::from_ymd_opt(2025, 2, 20));
        assert_eq!(e.venue.as_deref(), Some("Madison Square Garden"));
        assert_eq!(e.sport_label, "NBA");
        assert_eq!(e.away_point_spread(), Some(3.5));
    }

    #[test]
    fn test_missing_fields_degrade_to_defaults() {
        let raw = games(serde_json::json!([{ "GameID": 1 }]));
        let e = &transform_team_games(SportKey::Cbb, &raw, None)[0];
        assert_eq!(e.id, "cbb-1");
        assert_eq!(e.status, EventStatus::Unknown);
        assert!(!e.is_closed);
        assert!(e.home_team.is_none());
        assert!(e.game_status.is_none());
        assert!(e.venue.is_none());
    }

    #[test]
    fn test_live_basketball_clock() {
        let raw = games(serde_json::json!([{
            "GameID": 5, "Status": "InProgress", "Quarter": "4",
            "TimeRemainingMinutes": 5, "TimeRemainingSeconds": 3,
            "LastPlay": "Tatum makes 3-pt jump shot"
        }]));
        let e = &transform_team_games(SportKey::Wnba, &raw, None)[0];
        assert_eq!(e.game_status.as_deref(), Some("Q4 5:03"));
        assert_eq!(e.last_play.as_deref(), Some("Tatum makes 3-pt jump shot"));
    }

    #[test]
    fn test_quarter_labels() {
        assert_eq!(format_quarter_status(Some("OT"), Some(2), Some(0)).as_deref(), Some("OT 2:00"));
        assert_eq!(format_quarter_status(Some("Half"), Some(0), Some(0)).as_deref(), Some("Halftime"));
        assert_eq!(format_quarter_status(Some("2"), None, None).as_deref(), Some("Q2"));
        assert_eq!(format_quarter_status(None, Some(1), Some(1)), None);
        assert_eq!(format_quarter_status(Some(""), Some(1), Some(1)), None);
    }

    #[test]
    fn test_hockey_period_labels() {
        assert_eq!(format_period_status(Some("1"), Some(12), Some(4)).as_deref(), Some("1st 12:04"));
        assert_eq!(format_period_status(Some("2"), None, None).as_deref(), Some("2nd"));
        assert_eq!(format_period_status(Some("3"), Some(0), Some(59)).as_deref(), Some("3rd 0:59"));
        assert_eq!(format_period_status(Some("OT"), Some(3), Some(10)).as_deref(), Some("OT 3:10"));
        assert_eq!(format_period_status(Some("Shootout"), None, None).as_deref(), Some("SO"));
    }

    #[test]
    fn test_nhl_uses_period_table() {
        let raw = games(serde_json::json!([{
            "GameID": 9, "Status": "InProgress", "Period": "2",
            "Quarter": "ignored", "TimeRemainingMinutes": 7, "TimeRemainingSeconds": 45
        }]));
        let e = &transform_team_games(SportKey::Nhl, &raw, None)[0];
        assert_eq!(e.game_status.as_deref(), Some("2nd 7:45"));
    }

    #[test]
    fn test_mlb_inning_and_count() {
        let raw = games(serde_json::json!([{
            "GameID": 77, "Status": "InProgress",
            "InningDescription": "Top 5th",
            "Balls": 1, "Strikes": 2, "Outs": 2,
            "HomeTeamRuns": 3, "AwayTeamRuns": 4,
            "HomeTeamScore": 99
        }]));
        let e = &transform_team_games(SportKey::Mlb, &raw, None)[0];
        assert_eq!(e.game_status.as_deref(), Some("Top 5th"));
        assert_eq!(e.game_detail.as_deref(), Some("1-2, 2 Out"));
        assert_eq!(e.home_score, Some(3));
        assert_eq!(e.away_score, Some(4));
    }

    #[test]
    fn test_mlb_partial_count_has_no_detail() {
        let raw = games(serde_json::json!([{ "GameID": 78, "Balls": 1, "Strikes": 2 }]));
        let e = &transform_team_games(SportKey::Mlb, &raw, None)[0];
        assert!(e.game_detail.is_none());
    }

    #[test]
    fn test_nfl_uses_its_own_fields() {
        let raw = games(serde_json::json!([{
            "ScoreID": 18001,
            "GameID": 999,
            "Date": "2025-01-12T16:30:00",
            "Status": "Final",
            "IsOver": false,
            "IsInProgress": true,
            "HomeScore": 14,
            "AwayScore": 10,
            "HomeTeamScore": 0,
            "QuarterDescription": "3rd Quarter",
            "DownAndDistance": "3rd & 7",
            "YardLineTerritory": "DAL",
            "YardLine": 35,
            "StadiumDetails": { "Name": "AT&T Stadium" }
        }]));
        let e = &transform_team_games(SportKey::Nfl, &raw, None)[0];
        assert_eq!(e.id, "nfl-18001");
        // booleans drive NFL status, not the status string
        assert_eq!(e.status, EventStatus::InProgress);
        assert_eq!(e.home_score, Some(14));
        assert_eq!(e.away_score, Some(10));
        assert_eq!(e.day, NaiveDate::from_ymd_opt(2025, 1, 12));
        assert!(e.date_time.is_some());
        assert_eq!(e.game_status.as_deref(), Some("3rd Quarter"));
        assert_eq!(e.game_detail.as_deref(), Some("3rd & 7 at DAL 35"));
        assert_eq!(e.venue.as_deref(), Some("AT&T Stadium"));
    }

    #[test]
    fn test_nfl_status_flags() {
        let raw = games(serde_json::json!([
            { "ScoreID": 1, "IsOver": true, "IsInProgress": true },
            { "ScoreID": 2 },
        ]));
        let events = transform_team_games(SportKey::Nfl, &raw, None);
        assert_eq!(events[0].status, EventStatus::Final);
        assert_eq!(events[1].status, EventStatus::Scheduled);
    }

    #[test]
    fn test_nfl_down_without_territory() {
        let raw = games(serde_json::json!([{ "ScoreID": 3, "DownAndDistance": "1st & 10" }]));
        let e = &transform_team_games(SportKey::Nfl, &raw, None)[0];
        assert_eq!(e.game_detail.as_deref(), Some("1st & 10"));
    }

    #[test]
    fn test_transform_is_idempotent() {
        let raw = games(serde_json::json!([
            { "GameID": 1, "Status": "Scheduled", "Day": "2025-FEB-20", "PointSpread": 2.5 },
            { "GameID": 2, "Status": "F/OT", "Quarter": "OT" },
        ]));
        let first = transform_team_games(SportKey::Nba, &raw, None);
        let second = transform_team_games(SportKey::Nba, &raw, None);
        assert_eq!(first, second);
    }
}
