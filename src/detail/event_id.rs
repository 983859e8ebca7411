use serde::Serialize;

use crate::sport::SportKey;

/// An event id split back into its parts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedEventId {
    pub sport: SportKey,
    /// Soccer competition key (`EPL`, `UCL`, ...).
    pub competition: Option<String>,
    pub provider_id: String,
}

/// Parse `{sport}-{id}` or `soccer-{COMPETITION}-{id}`.
///
/// The competition segment is upper-case letters and digits only; a soccer
/// id without one parses as a plain `{sport}-{id}`.
pub fn parse_event_id(id: &str) -> Option<ParsedEventId> {
    if let Some(rest) = id.strip_prefix("soccer-") {
        if let Some((competition, provider_id)) = rest.split_once('-') {
            let is_key = !competition.is_empty()
                && competition
                    .chars()
                    .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit());
            if is_key && !provider_id.is_empty() {
                return Some(ParsedEventId {
                    sport: SportKey::Soccer,
                    competition: Some(competition.to_string()),
                    provider_id: provider_id.to_string(),
                });
            }
        }
    }

    let (sport, provider_id) = id.split_once('-')?;
    if sport.is_empty() || !sport.chars().all(|c| c.is_ascii_lowercase()) || provider_id.is_empty()
    {
        return None;
    }
    Some(ParsedEventId {
        sport: sport.parse().ok()?,
        competition: None,
        provider_id: provider_id.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_team_event_id() {
        let p = parse_event_id("nba-18765").unwrap();
        assert_eq!(p.sport, SportKey::Nba);
        assert_eq!(p.competition, None);
        assert_eq!(p.provider_id, "18765");
    }

    #[test]
    fn test_soccer_event_id() {
        let p = parse_event_id("soccer-EPL-789012").unwrap();
        assert_eq!(p.sport, SportKey::Soccer);
        assert_eq!(p.competition.as_deref(), Some("EPL"));
        assert_eq!(p.provider_id, "789012");

        let p = parse_event_id("soccer-UCL2-1").unwrap();
        assert_eq!(p.competition.as_deref(), Some("UCL2"));
    }

    #[test]
    fn test_soccer_without_competition_falls_back() {
        let p = parse_event_id("soccer-123").unwrap();
        assert_eq!(p.sport, SportKey::Soccer);
        assert_eq!(p.competition, None);
        assert_eq!(p.provider_id, "123");
    }

    #[test]
    fn test_provider_id_may_contain_dashes() {
        let p = parse_event_id("mma-880-x").unwrap();
        assert_eq!(p.sport, SportKey::Mma);
        assert_eq!(p.provider_id, "880-x");
    }

    #[test]
    fn test_invalid_ids() {
        assert_eq!(parse_event_id(""), None);
        assert_eq!(parse_event_id("nba"), None);
        assert_eq!(parse_event_id("nba-"), None);
        assert_eq!(parse_event_id("NBA-1"), None);
        assert_eq!(parse_event_id("curling-1"), None);
    }
}
