use serde::Deserialize;

use super::dates::{parse_date_time, sdio_date_to_iso};
use super::{non_empty, status_from_flags, NormalizedEvent};
use crate::sport::{SportCategory, SportKey};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GolfTournament {
    #[serde(rename = "TournamentID")]
    pub tournament_id: Option<i64>,
    pub name: Option<String>,
    pub venue: Option<String>,
    pub location: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub start_date_time: Option<String>,
    pub is_over: Option<bool>,
    pub is_in_progress: Option<bool>,
    pub canceled: Option<bool>,
}

pub fn transform_golf_tournaments(tournaments: &[GolfTournament]) -> Vec<NormalizedEvent> {
    tournaments
        .iter()
        .map(|t| {
            let is_over = t.is_over.unwrap_or(false);
            let start = sdio_date_to_iso(t.start_date.as_deref());
            let end = sdio_date_to_iso(t.end_date.as_deref());
            let is_multi_day = matches!((start, end), (Some(s), Some(e)) if s != e);

            let venue = [t.venue.as_deref(), t.location.as_deref()]
                .into_iter()
                .filter_map(non_empty)
                .collect::<Vec<_>>()
                .join(", ");

            NormalizedEvent {
                id: format!(
                    "golf-{}",
                    t.tournament_id.map(|id| id.to_string()).unwrap_or_default()
                ),
                sport: SportCategory::Golf,
                sport_key: Some(SportKey::Golf),
                sport_label: SportKey::Golf.display_name().to_string(),
                status: status_from_flags(
                    t.canceled.unwrap_or(false),
                    is_over,
                    t.is_in_progress.unwrap_or(false),
                ),
                is_closed: is_over,
                date_time: parse_date_time(
                    t.start_date_time.as_deref().or(t.start_date.as_deref()),
                ),
                day: start,
                event_name: t.name.clone(),
                venue: (!venue.is_empty()).then_some(venue),
                is_multi_day,
                end_date: end,
                ..Default::default()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::EventStatus;
    use chrono::NaiveDate;

    fn tournaments(json: serde_json::Value) -> Vec<GolfTournament> {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_multi_day_tournament_in_progress() {
        let raw = tournaments(serde_json::json!([{
            "TournamentID": 601,
            "Name": "The Masters",
            "Venue": "Augusta National Golf Club",
            "Location": "Augusta, GA",
            "StartDate": "2025-04-10",
            "EndDate": "2025-04-13",
            "IsInProgress": true
        }]));
        let e = &transform_golf_tournaments(&raw)[0];

        assert_eq!(e.id, "golf-601");
        assert!(e.is_multi_day);
        assert_eq!(e.status, EventStatus::InProgress);
        assert!(!e.is_closed);
        assert_eq!(e.venue.as_deref(), Some("Augusta National Golf Club, Augusta, GA"));

        for day in 10..=13 {
            assert!(e.occurs_on(NaiveDate::from_ymd_opt(2025, 4, day).unwrap()));
        }
        assert!(!e.occurs_on(NaiveDate::from_ymd_opt(2025, 4, 14).unwrap()));
        assert!(!e.occurs_on(NaiveDate::from_ymd_opt(2025, 4, 9).unwrap()));
    }

    #[test]
    fn test_single_day_and_missing_end() {
        let raw = tournaments(serde_json::json!([
            { "TournamentID": 1, "StartDate": "2025-06-01T00:00:00", "EndDate": "2025-06-01T00:00:00" },
            { "TournamentID": 2, "StartDate": "2025-06-01" },
            { "TournamentID": 3, "Location": "Pebble Beach, CA", "IsOver": true }
        ]));
        let events = transform_golf_tournaments(&raw);
        assert!(!events[0].is_multi_day);
        assert!(!events[1].is_multi_day);
        assert_eq!(events[2].venue.as_deref(), Some("Pebble Beach, CA"));
        assert_eq!(events[2].status, EventStatus::Final);
        assert!(events[2].is_closed);
        assert!(events[2].day.is_none());
    }
}
