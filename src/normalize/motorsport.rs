use serde::Deserialize;

use super::dates::{parse_date_time, sdio_date_to_iso};
use super::{non_empty, status_from_flags, NormalizedEvent};
use crate::sport::{SportCategory, SportKey};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NascarRace {
    #[serde(rename = "RaceID")]
    pub race_id: Option<i64>,
    pub name: Option<String>,
    pub series_name: Option<String>,
    pub track: Option<String>,
    pub broadcast: Option<String>,
    pub day: Option<String>,
    pub date_time: Option<String>,
    pub is_over: Option<bool>,
    pub is_in_progress: Option<bool>,
    pub canceled: Option<bool>,
}

pub fn transform_nascar_races(races: &[NascarRace]) -> Vec<NormalizedEvent> {
    races
        .iter()
        .map(|r| {
            let is_over = r.is_over.unwrap_or(false);
            let sport_label = match non_empty(r.series_name.as_deref()) {
                Some(series) => format!("NASCAR {}", series),
                None => SportKey::Nascar.display_name().to_string(),
            };

            NormalizedEvent {
                id: format!(
                    "nascar-{}",
                    r.race_id.map(|id| id.to_string()).unwrap_or_default()
                ),
                sport: SportCategory::Motorsport,
                sport_key: Some(SportKey::Nascar),
                sport_label,
                status: status_from_flags(
                    r.canceled.unwrap_or(false),
                    is_over,
                    r.is_in_progress.unwrap_or(false),
                ),
                is_closed: is_over,
                date_time: parse_date_time(r.date_time.as_deref()),
                day: sdio_date_to_iso(r.day.as_deref()),
                event_name: r.name.clone(),
                venue: r.track.clone(),
                channel: r.broadcast.clone(),
                ..Default::default()
            }
        })
        .collect()
}
