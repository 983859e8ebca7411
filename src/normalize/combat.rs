use serde::Deserialize;

use super::dates::{parse_date_time, sdio_date_to_iso};
use super::{non_empty, normalize_status, NormalizedEvent, NormalizedFight};
use crate::sport::{SportCategory, SportKey};

/// Schedule entry; carries no fights.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MmaEvent {
    pub event_id: Option<i64>,
    pub name: Option<String>,
    pub short_name: Option<String>,
    pub status: Option<String>,
    pub day: Option<String>,
    pub date_time: Option<String>,
}

/// Event detail including the full card.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MmaEventDetail {
    #[serde(flatten)]
    pub event: MmaEvent,
    pub fights: Option<Vec<MmaFight>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MmaFight {
    pub fight_id: Option<i64>,
    pub order: Option<i32>,
    pub status: Option<String>,
    pub weight_class: Option<String>,
    pub winner_id: Option<i64>,
    pub result_type: Option<String>,
    pub fighters: Option<Vec<MmaFighter>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MmaFighter {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub moneyline: Option<i32>,
}

fn fighter_name(f: Option<&MmaFighter>) -> Option<String> {
    let f = f?;
    let name = [f.first_name.as_deref(), f.last_name.as_deref()]
        .into_iter()
        .filter_map(non_empty)
        .collect::<Vec<_>>()
        .join(" ");
    (!name.is_empty()).then_some(name)
}

fn transform_fight(fight: &MmaFight) -> NormalizedFight {
    let fighters = fight.fighters.as_deref().unwrap_or_default();
    let f1 = fighters.first();
    let f2 = fighters.get(1);
    NormalizedFight {
        id: fight.fight_id.unwrap_or(0),
        order: fight.order,
        status: fight.status.clone(),
        weight_class: fight.weight_class.clone(),
        fighter1: fighter_name(f1),
        fighter2: fighter_name(f2),
        fighter1_money_line: f1.and_then(|f| f.moneyline),
        fighter2_money_line: f2.and_then(|f| f.moneyline),
        winner_id: fight.winner_id,
        result_type: fight.result_type.clone(),
    }
}

fn base_event(e: &MmaEvent) -> NormalizedEvent {
    NormalizedEvent {
        id: format!(
            "mma-{}",
            e.event_id.map(|id| id.to_string()).unwrap_or_default()
        ),
        sport: SportCategory::Combat,
        sport_key: Some(SportKey::Mma),
        sport_label: SportKey::Mma.display_name().to_string(),
        status: normalize_status(e.status.as_deref()),
        is_closed: e.status.as_deref() == Some("Final"),
        date_time: parse_date_time(e.date_time.as_deref()),
        day: sdio_date_to_iso(e.day.as_deref()),
        event_name: e.name.clone().or_else(|| e.short_name.clone()),
        ..Default::default()
    }
}

/// Season schedule → events with `fights: None` (expanded lazily).
pub fn transform_mma_events(events: &[MmaEvent]) -> Vec<NormalizedEvent> {
    events.iter().map(base_event).collect()
}

/// Event detail → event with its fight card, main card order first and
/// fights without an order at the end.
pub fn transform_mma_event_detail(detail: &MmaEventDetail) -> NormalizedEvent {
    let mut fights: Vec<NormalizedFight> = detail
        .fights
        .as_deref()
        .unwrap_or_default()
        .iter()
        .map(transform_fight)
        .collect();
    fights.sort_by_key(|f| (f.order.is_none(), f.order));

    NormalizedEvent {
        fights: Some(fights),
        ..base_event(&detail.event)
    }
}
