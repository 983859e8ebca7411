use chrono::NaiveDateTime;
use serde::Serialize;

use crate::normalize::EventStatus;

/// Where a game is in its lifecycle, for choosing a refresh cadence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GamePhase {
    Pregame,
    Live,
    Closed,
    #[default]
    Unknown,
}

impl GamePhase {
    /// Only pregame and live games are polled.
    pub fn is_pollable(&self) -> bool {
        matches!(self, GamePhase::Pregame | GamePhase::Live)
    }
}

/// Derive the phase from header info.
///
/// `is_closed` wins outright. A scheduled game whose start time has passed
/// is treated as live, since provider statuses lag kickoff.
pub fn game_phase(
    status: EventStatus,
    is_closed: bool,
    date_time: Option<NaiveDateTime>,
    now: NaiveDateTime,
) -> GamePhase {
    if is_closed {
        return GamePhase::Closed;
    }
    match status {
        EventStatus::InProgress | EventStatus::Suspended | EventStatus::Delayed => GamePhase::Live,
        EventStatus::Scheduled => match date_time {
            Some(start) if start <= now => GamePhase::Live,
            _ => GamePhase::Pregame,
        },
        EventStatus::Final => GamePhase::Closed,
        EventStatus::Canceled | EventStatus::Postponed | EventStatus::Unknown => {
            GamePhase::Unknown
        }
    }
}
