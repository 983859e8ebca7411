//! One event model for every sport.
//!
//! Each sport family has its own module mapping the provider's wire shape
//! into [`NormalizedEvent`]. Mapping never fails on missing fields: anything
//! absent stays at its `Default` value.

pub mod combat;
pub mod dates;
pub mod golf;
pub mod motorsport;
pub mod soccer;
pub mod team;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::sport::{SportCategory, SportKey};

pub use combat::{transform_mma_event_detail, transform_mma_events};
pub use golf::transform_golf_tournaments;
pub use motorsport::transform_nascar_races;
pub use soccer::transform_soccer_games;
pub use team::transform_team_games;

/// Stadium/venue id → display name.
pub type VenueMap = HashMap<i64, String>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventStatus {
    Scheduled,
    InProgress,
    Final,
    Postponed,
    Canceled,
    Suspended,
    Delayed,
    #[default]
    Unknown,
}

/// Map any provider status string onto [`EventStatus`].
///
/// Case and surrounding whitespace are ignored; anything unrecognised
/// (including `None` and the empty string) is `Unknown`.
pub fn normalize_status(raw: Option<&str>) -> EventStatus {
    let Some(raw) = raw else {
        return EventStatus::Unknown;
    };
    let s = raw.trim().to_lowercase();
    match s.as_str() {
        "scheduled" => EventStatus::Scheduled,
        "inprogress" | "in progress" => EventStatus::InProgress,
        "final" => EventStatus::Final,
        "postponed" => EventStatus::Postponed,
        "canceled" | "cancelled" => EventStatus::Canceled,
        "suspended" | "break" => EventStatus::Suspended,
        "delayed" => EventStatus::Delayed,
        // F/OT, F/SO, F/10 ...
        s if s.starts_with("f/") => EventStatus::Final,
        _ => EventStatus::Unknown,
    }
}

/// Status derived from the `Canceled`/`IsOver`/`IsInProgress` flags used by
/// golf and motorsport, in that precedence order.
pub fn status_from_flags(canceled: bool, is_over: bool, in_progress: bool) -> EventStatus {
    if canceled {
        EventStatus::Canceled
    } else if is_over {
        EventStatus::Final
    } else if in_progress {
        EventStatus::InProgress
    } else {
        EventStatus::Scheduled
    }
}

/// A schedulable unit: game, race, fight card or tournament.
///
/// `Default` is the canonical empty event; normalizers fill only the fields
/// they have data for and take the rest from it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedEvent {
    /// `{sportKey}-{providerId}`, or `soccer-{competition}-{providerId}`.
    pub id: String,
    pub sport: SportCategory,
    pub sport_key: Option<SportKey>,
    pub sport_label: String,

    pub status: EventStatus,
    /// Provider confirmed the result will not change.
    pub is_closed: bool,

    pub date_time: Option<NaiveDateTime>,
    pub day: Option<NaiveDate>,

    pub home_team: Option<String>,
    pub away_team: Option<String>,
    pub home_score: Option<i32>,
    pub away_score: Option<i32>,

    /// Home-team perspective; see [`NormalizedEvent::away_point_spread`].
    pub point_spread: Option<f64>,
    pub over_under: Option<f64>,
    pub home_money_line: Option<i32>,
    pub away_money_line: Option<i32>,

    pub event_name: Option<String>,
    pub venue: Option<String>,
    pub is_multi_day: bool,
    pub end_date: Option<NaiveDate>,

    /// `None` until the card is expanded from the event detail endpoint.
    pub fights: Option<Vec<NormalizedFight>>,

    pub game_status: Option<String>,
    pub game_detail: Option<String>,
    pub last_play: Option<String>,

    pub channel: Option<String>,
    pub competition_key: Option<String>,
}

impl NormalizedEvent {
    /// The away spread is never stored; it is always the negated home spread.
    pub fn away_point_spread(&self) -> Option<f64> {
        self.point_spread.map(|s| -s)
    }

    /// Whether the event is on `date`, or spans it for multi-day events.
    pub fn occurs_on(&self, date: NaiveDate) -> bool {
        self.day == Some(date) || dates::is_date_in_range(date, self.day, self.end_date)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedFight {
    pub id: i64,
    /// Card position; fights without one sort last.
    pub order: Option<i32>,
    pub status: Option<String>,
    pub weight_class: Option<String>,
    pub fighter1: Option<String>,
    pub fighter2: Option<String>,
    pub fighter1_money_line: Option<i32>,
    pub fighter2_money_line: Option<i32>,
    pub winner_id: Option<i64>,
    pub result_type: Option<String>,
}

/// Non-empty, trimmed copy of an optional provider string.
pub(crate) fn non_empty(s: Option<&str>) -> Option<String> {
    s.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
}
