//! Discovers which sports and soccer competitions an API key can reach.

use async_trait::async_trait;
use futures_util::future::join_all;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::adapter::{Lookups, ScheduleSource};
use super::soccer::CompetitionInfo;
use crate::error::ApiError;
use crate::sport::SportKey;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SportAccess {
    pub key: SportKey,
    pub display_name: String,
    pub accessible: bool,
}

/// Soccer competition catalog access.
#[async_trait]
pub trait CompetitionProber: Send + Sync {
    async fn competitions(&self) -> Result<Vec<CompetitionInfo>, ApiError>;

    async fn probe_competition(&self, key: &str) -> Result<bool, ApiError>;
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompetitionCatalog {
    /// Every competition key, in catalog order.
    pub keys: Vec<String>,
    pub labels: HashMap<String, String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProbeError {
    #[error("this API key has no access to any sport")]
    NoSportsAccessible,
}

/// Result of a full probe cycle.
#[derive(Debug, Clone, Default)]
pub struct ProbeOutcome {
    pub sports: Vec<SportAccess>,
    /// Accessible soccer competitions.
    pub competitions: Vec<String>,
    pub competition_labels: HashMap<String, String>,
}

impl ProbeOutcome {
    pub fn accessible_sports(&self) -> Vec<SportKey> {
        self.sports
            .iter()
            .filter(|s| s.accessible)
            .map(|s| s.key)
            .collect()
    }
}

/// Probe every source in parallel. One record per source, in source order;
/// a failed probe counts as inaccessible.
pub async fn probe_all_sports(sources: &[Arc<dyn ScheduleSource>]) -> Vec<SportAccess> {
    let probes = sources.iter().map(|source| async move {
        let key = source.sport_key();
        let accessible = match source.check_access().await {
            Ok(accessible) => accessible,
            Err(e) => {
                debug!("Probe for {} failed: {}", key, e);
                false
            }
        };
        SportAccess {
            key,
            display_name: key.display_name().to_string(),
            accessible,
        }
    });
    join_all(probes).await
}

/// Fetch the competition catalog and derive display labels from it.
pub async fn get_all_competition_info(
    prober: &dyn CompetitionProber,
) -> Result<CompetitionCatalog, ApiError> {
    let mut catalog = CompetitionCatalog::default();
    for info in prober.competitions().await? {
        let Some(key) = info.key.clone().filter(|k| !k.is_empty()) else {
            continue;
        };
        if catalog.labels.contains_key(&key) {
            continue;
        }
        catalog.labels.insert(key.clone(), info.label());
        catalog.keys.push(key);
    }
    Ok(catalog)
}

/// Probe competitions in sequential batches of at most `batch_size`
/// concurrent requests. Returns the accessible keys in input order.
pub async fn probe_competitions_batched(
    prober: &dyn CompetitionProber,
    keys: &[String],
    batch_size: usize,
) -> Vec<String> {
    let mut accessible = Vec::new();
    for batch in keys.chunks(batch_size.max(1)) {
        let results = join_all(batch.iter().map(|key| prober.probe_competition(key))).await;
        for (key, result) in batch.iter().zip(results) {
            match result {
                Ok(true) => accessible.push(key.clone()),
                Ok(false) => {}
                Err(e) => debug!("Competition probe for {} failed: {}", key, e),
            }
        }
    }
    accessible
}

/// Probe sports, then soccer competitions when soccer is reachable.
///
/// Zero accessible sports is an error; a missing competition catalog only
/// leaves soccer without competitions.
pub async fn run_probe(
    sources: &[Arc<dyn ScheduleSource>],
    competitions: &dyn CompetitionProber,
    batch_size: usize,
) -> Result<ProbeOutcome, ProbeError> {
    let sports = probe_all_sports(sources).await;
    let accessible: Vec<&str> = sports
        .iter()
        .filter(|s| s.accessible)
        .map(|s| s.key.as_str())
        .collect();
    info!(
        "Probed {} sports, {} accessible: {:?}",
        sports.len(),
        accessible.len(),
        accessible
    );
    if accessible.is_empty() {
        return Err(ProbeError::NoSportsAccessible);
    }

    let mut outcome = ProbeOutcome {
        sports,
        ..Default::default()
    };
    if outcome.accessible_sports().contains(&SportKey::Soccer) {
        match get_all_competition_info(competitions).await {
            Ok(catalog) => {
                outcome.competitions =
                    probe_competitions_batched(competitions, &catalog.keys, batch_size).await;
                info!(
                    "Soccer: {} of {} competitions accessible",
                    outcome.competitions.len(),
                    catalog.keys.len()
                );
                outcome.competition_labels = catalog.labels;
            }
            Err(e) => warn!("Failed to load soccer competition catalog: {}", e),
        }
    }
    Ok(outcome)
}

/// Load venue maps for the accessible sports. Sports whose lookup fails are
/// simply left without one.
pub async fn load_lookups(
    sources: &[Arc<dyn ScheduleSource>],
    outcome: &ProbeOutcome,
) -> Lookups {
    let accessible = outcome.accessible_sports();
    let loads = sources
        .iter()
        .filter(|s| accessible.contains(&s.sport_key()))
        .map(|source| async move { (source.sport_key(), source.venue_map().await) });

    let mut lookups = Lookups {
        competition_labels: outcome.competition_labels.clone(),
        ..Default::default()
    };
    for (sport, result) in join_all(loads).await {
        match result {
            Ok(Some(venues)) => {
                lookups.venues.insert(sport, venues);
            }
            Ok(None) => {}
            Err(e) => warn!("Failed to load venues for {}: {}", sport, e),
        }
    }
    lookups
}
