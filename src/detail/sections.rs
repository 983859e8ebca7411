use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use super::event_id::ParsedEventId;
use crate::error::ApiError;

/// Which refresh cadence a section belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PollClass {
    Live,
    Pregame,
}

/// One detail tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SectionKind {
    BoxScore,
    LineScore,
    PlayByPlay,
    Betting,
    PregameOdds,
    InplayOdds,
    Projections,
}

impl SectionKind {
    pub const ALL: [SectionKind; 7] = [
        SectionKind::BoxScore,
        SectionKind::LineScore,
        SectionKind::PlayByPlay,
        SectionKind::Betting,
        SectionKind::PregameOdds,
        SectionKind::InplayOdds,
        SectionKind::Projections,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            SectionKind::BoxScore => "box-score",
            SectionKind::LineScore => "line-score",
            SectionKind::PlayByPlay => "play-by-play",
            SectionKind::Betting => "betting",
            SectionKind::PregameOdds => "pregame-odds",
            SectionKind::InplayOdds => "inplay-odds",
            SectionKind::Projections => "projections",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SectionKind::BoxScore => "Box Score",
            SectionKind::LineScore => "Line Score",
            SectionKind::PlayByPlay => "Play-by-Play",
            SectionKind::Betting => "Betting",
            SectionKind::PregameOdds => "Pregame Odds",
            SectionKind::InplayOdds => "In-Play Odds",
            SectionKind::Projections => "Projections",
        }
    }

    pub fn poll_class(&self) -> PollClass {
        match self {
            SectionKind::BoxScore
            | SectionKind::LineScore
            | SectionKind::PlayByPlay
            | SectionKind::InplayOdds => PollClass::Live,
            SectionKind::Betting | SectionKind::PregameOdds | SectionKind::Projections => {
                PollClass::Pregame
            }
        }
    }

    pub fn has_line_movement(&self) -> bool {
        matches!(self, SectionKind::PregameOdds | SectionKind::InplayOdds)
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for SectionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SectionKind::ALL
            .into_iter()
            .find(|k| k.key() == s)
            .ok_or_else(|| format!("unknown section '{}'", s))
    }
}

/// Everything a section fetch needs to build its request.
#[derive(Debug, Clone)]
pub struct FetchContext {
    pub parsed: ParsedEventId,
    pub date: NaiveDate,
    pub sportsbook_group: String,
}

/// Raw section payload; left in the sport's own shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionFetchResult {
    pub data: serde_json::Value,
    pub status: u16,
}

/// Detail endpoints of one sport.
#[async_trait]
pub trait DetailSource: Send + Sync {
    /// Sections this sport offers, in tab order.
    fn sections(&self) -> Vec<SectionKind>;

    async fn fetch_section(
        &self,
        section: SectionKind,
        ctx: &FetchContext,
    ) -> Result<SectionFetchResult, ApiError>;

    async fn fetch_line_movement(
        &self,
        section: SectionKind,
        ctx: &FetchContext,
    ) -> Result<SectionFetchResult, ApiError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poll_classes() {
        let live: Vec<_> = SectionKind::ALL
            .into_iter()
            .filter(|s| s.poll_class() == PollClass::Live)
            .collect();
        assert_eq!(
            live,
            vec![
                SectionKind::BoxScore,
                SectionKind::LineScore,
                SectionKind::PlayByPlay,
                SectionKind::InplayOdds
            ]
        );
    }

    #[test]
    fn test_key_round_trip() {
        for s in SectionKind::ALL {
            assert_eq!(s.key().parse::<SectionKind>(), Ok(s));
        }
        assert_eq!(
            serde_json::to_string(&SectionKind::PlayByPlay).unwrap(),
            "\"play-by-play\""
        );
        assert!("standings".parse::<SectionKind>().is_err());
    }
}
