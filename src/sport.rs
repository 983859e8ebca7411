use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which card/detail family an event belongs to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SportCategory {
    #[default]
    Team,
    Soccer,
    Motorsport,
    Combat,
    Golf,
}

/// One entry per sport adapter, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SportKey {
    Nba,
    Nfl,
    Nhl,
    Mlb,
    Cbb,
    Cfb,
    Wnba,
    Cwbb,
    Soccer,
    Nascar,
    Mma,
    Golf,
}

impl SportKey {
    pub const ALL: [SportKey; 12] = [
        SportKey::Nba,
        SportKey::Nfl,
        SportKey::Nhl,
        SportKey::Mlb,
        SportKey::Cbb,
        SportKey::Cfb,
        SportKey::Wnba,
        SportKey::Cwbb,
        SportKey::Soccer,
        SportKey::Nascar,
        SportKey::Mma,
        SportKey::Golf,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SportKey::Nba => "nba",
            SportKey::Nfl => "nfl",
            SportKey::Nhl => "nhl",
            SportKey::Mlb => "mlb",
            SportKey::Cbb => "cbb",
            SportKey::Cfb => "cfb",
            SportKey::Wnba => "wnba",
            SportKey::Cwbb => "cwbb",
            SportKey::Soccer => "soccer",
            SportKey::Nascar => "nascar",
            SportKey::Mma => "mma",
            SportKey::Golf => "golf",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            SportKey::Nba => "NBA",
            SportKey::Nfl => "NFL",
            SportKey::Nhl => "NHL",
            SportKey::Mlb => "MLB",
            SportKey::Cbb => "College Basketball",
            SportKey::Cfb => "College Football",
            SportKey::Wnba => "WNBA",
            SportKey::Cwbb => "College Women's Basketball",
            SportKey::Soccer => "Soccer",
            SportKey::Nascar => "NASCAR",
            SportKey::Mma => "MMA",
            SportKey::Golf => "Golf",
        }
    }

    pub fn category(&self) -> SportCategory {
        match self {
            SportKey::Soccer => SportCategory::Soccer,
            SportKey::Nascar => SportCategory::Motorsport,
            SportKey::Mma => SportCategory::Combat,
            SportKey::Golf => SportCategory::Golf,
            _ => SportCategory::Team,
        }
    }

    /// Season-based sports fetch a whole season at once and are never polled.
    pub fn is_season_based(&self) -> bool {
        matches!(
            self.category(),
            SportCategory::Motorsport | SportCategory::Combat | SportCategory::Golf
        )
    }
}

impl fmt::Display for SportKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SportKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SportKey::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| format!("unknown sport key '{}'", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_keys() {
        for key in SportKey::ALL {
            assert_eq!(key.as_str().parse::<SportKey>(), Ok(key));
        }
        assert!("curling".parse::<SportKey>().is_err());
    }

    #[test]
    fn test_season_based() {
        let season: Vec<_> = SportKey::ALL
            .into_iter()
            .filter(|k| k.is_season_based())
            .collect();
        assert_eq!(season, vec![SportKey::Nascar, SportKey::Mma, SportKey::Golf]);
    }

    #[test]
    fn test_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&SportKey::Wnba).unwrap(), "\"wnba\"");
        assert_eq!(
            serde_json::to_string(&SportCategory::Motorsport).unwrap(),
            "\"motorsport\""
        );
    }
}
