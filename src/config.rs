use clap::Parser;
use std::time::Duration;

use crate::detail::DetailTiming;
use crate::session::is_valid_sportsbook_group;

/// Headless multi-sport scoreboard over SportsDataIO
#[derive(Parser, Debug, Clone)]
#[command(name = "sportsdata-scoreboard", version, about)]
pub struct Config {
    /// SportsDataIO API key; overrides the stored key when set
    #[arg(long, env = "SPORTSDATA_API_KEY")]
    pub api_key: Option<String>,

    /// SportsDataIO API base URL
    #[arg(long, env = "SPORTSDATA_BASE_URL", default_value = "https://api.sportsdata.io")]
    pub base_url: String,

    /// SQLite settings database path
    #[arg(long, env = "DATABASE_PATH", default_value = "scoreboard.db")]
    pub database_path: String,

    /// Dashboard listen address
    #[arg(long, env = "DASHBOARD_ADDR", default_value = "0.0.0.0:8080")]
    pub dashboard_addr: String,

    /// Scoreboard polling interval in seconds
    #[arg(long, env = "POLL_INTERVAL_SECS", default_value = "5")]
    pub poll_interval_secs: u64,

    /// Detail page refresh for live sections, in seconds
    #[arg(long, env = "DETAIL_LIVE_POLL_SECS", default_value = "5")]
    pub detail_live_poll_secs: u64,

    /// Detail page refresh for pregame sections, in seconds
    #[arg(long, env = "DETAIL_PREGAME_POLL_SECS", default_value = "60")]
    pub detail_pregame_poll_secs: u64,

    /// How long a fetched season schedule stays fresh, in seconds
    #[arg(long, env = "SEASON_CACHE_TTL_SECS", default_value = "600")]
    pub season_cache_ttl_secs: u64,

    /// Maximum concurrent soccer competition probes
    #[arg(long, env = "COMPETITION_PROBE_BATCH", default_value = "15")]
    pub competition_probe_batch: usize,

    /// Sportsbook group used for odds when none has been chosen
    #[arg(long, env = "DEFAULT_SPORTSBOOK_GROUP", default_value = "G1001")]
    pub default_sportsbook_group: String,
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        if url::Url::parse(&self.base_url).is_err() {
            anyhow::bail!("base_url '{}' is not a valid URL", self.base_url);
        }
        if self.poll_interval_secs == 0 {
            anyhow::bail!("poll_interval_secs must be positive");
        }
        if self.detail_live_poll_secs == 0 || self.detail_pregame_poll_secs == 0 {
            anyhow::bail!("detail poll intervals must be positive");
        }
        if self.detail_pregame_poll_secs < self.detail_live_poll_secs {
            anyhow::bail!("detail_pregame_poll_secs must not be shorter than detail_live_poll_secs");
        }
        if self.season_cache_ttl_secs == 0 {
            anyhow::bail!("season_cache_ttl_secs must be positive");
        }
        if self.competition_probe_batch == 0 {
            anyhow::bail!("competition_probe_batch must be at least 1");
        }
        if !is_valid_sportsbook_group(&self.default_sportsbook_group) {
            anyhow::bail!(
                "default_sportsbook_group '{}' must be a non-empty alphanumeric id",
                self.default_sportsbook_group
            );
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn season_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.season_cache_ttl_secs)
    }

    pub fn detail_timing(&self) -> DetailTiming {
        DetailTiming {
            live_every: Duration::from_secs(self.detail_live_poll_secs),
            pregame_every: Duration::from_secs(self.detail_pregame_poll_secs),
        }
    }
}
