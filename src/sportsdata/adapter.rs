use async_trait::async_trait;
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use std::collections::HashMap;

use crate::error::ApiError;
use crate::normalize::{NormalizedEvent, VenueMap};
use crate::sport::SportKey;

/// What schedule a caller wants from an adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleRequest {
    /// Date-partitioned sports (team sports).
    Date(NaiveDate),
    /// One soccer competition on a date.
    Competition { competition: String, date: NaiveDate },
    /// Whole season for motorsport, combat and golf.
    Season(String),
}

/// Lookup maps loaded once after probing.
#[derive(Debug, Clone, Default)]
pub struct Lookups {
    /// Stadium/venue id → name per sport.
    pub venues: HashMap<SportKey, VenueMap>,
    /// Soccer competition key → display label.
    pub competition_labels: HashMap<String, String>,
}

impl Lookups {
    pub fn venues_for(&self, sport: SportKey) -> Option<&VenueMap> {
        self.venues.get(&sport)
    }

    pub fn competition_label(&self, key: &str) -> Option<&str> {
        self.competition_labels.get(key).map(String::as_str)
    }
}

/// Per-sport contract over the provider's REST surface.
///
/// `Raw` is the sport's wire shape; [`normalize`](Self::normalize) turns a
/// batch of it into the shared event model.
#[async_trait]
pub trait SportAdapter: Send + Sync {
    type Raw: DeserializeOwned + Send + Sync;

    fn sport(&self) -> SportKey;

    /// Cheapest representative read; `false` only on 401.
    async fn probe(&self) -> Result<bool, ApiError>;

    async fn fetch_raw(&self, request: &ScheduleRequest) -> Result<Vec<Self::Raw>, ApiError>;

    fn normalize(
        &self,
        raw: &[Self::Raw],
        request: &ScheduleRequest,
        lookups: &Lookups,
    ) -> Vec<NormalizedEvent>;

    /// Stadium or venue names, for sports that expose them.
    async fn venues(&self) -> Result<Option<VenueMap>, ApiError> {
        Ok(None)
    }
}

/// Object-safe view of a [`SportAdapter`], used wherever adapters of
/// different sports sit side by side.
#[async_trait]
pub trait ScheduleSource: Send + Sync {
    fn sport_key(&self) -> SportKey;

    async fn check_access(&self) -> Result<bool, ApiError>;

    async fn events(
        &self,
        request: &ScheduleRequest,
        lookups: &Lookups,
    ) -> Result<Vec<NormalizedEvent>, ApiError>;

    async fn venue_map(&self) -> Result<Option<VenueMap>, ApiError>;
}

#[async_trait]
impl<A: SportAdapter> ScheduleSource for A {
    fn sport_key(&self) -> SportKey {
        SportAdapter::sport(self)
    }

    async fn check_access(&self) -> Result<bool, ApiError> {
        SportAdapter::probe(self).await
    }

    async fn events(
        &self,
        request: &ScheduleRequest,
        lookups: &Lookups,
    ) -> Result<Vec<NormalizedEvent>, ApiError> {
        let raw = self.fetch_raw(request).await?;
        Ok(self.normalize(&raw, request, lookups))
    }

    async fn venue_map(&self) -> Result<Option<VenueMap>, ApiError> {
        SportAdapter::venues(self).await
    }
}

/// Fill `{name}` placeholders in a route template.
pub(crate) fn render_route(template: &str, params: &[(&str, &str)]) -> String {
    params.iter().fold(template.to_string(), |path, (name, value)| {
        path.replace(&format!("{{{}}}", name), value)
    })
}

pub(crate) fn unsupported(sport: SportKey, what: &'static str) -> ApiError {
    ApiError::Unsupported {
        sport: sport.as_str(),
        what,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_route() {
        assert_eq!(
            render_route(
                "/v3/nba/odds/JSON/BettingMarketsByGameID/{id}/{group}",
                &[("id", "18765"), ("group", "G1001")]
            ),
            "/v3/nba/odds/JSON/BettingMarketsByGameID/18765/G1001"
        );
        assert_eq!(render_route("/static", &[("id", "1")]), "/static");
    }

    #[test]
    fn test_lookups_accessors() {
        let mut lookups = Lookups::default();
        lookups
            .venues
            .insert(SportKey::Nba, [(1, "Crypto.com Arena".to_string())].into());
        lookups
            .competition_labels
            .insert("EPL".into(), "England Premier League".into());

        assert_eq!(
            lookups.venues_for(SportKey::Nba).and_then(|m| m.get(&1)).map(String::as_str),
            Some("Crypto.com Arena")
        );
        assert!(lookups.venues_for(SportKey::Nhl).is_none());
        assert_eq!(lookups.competition_label("EPL"), Some("England Premier League"));
        assert_eq!(lookups.competition_label("MLS"), None);
    }
}
