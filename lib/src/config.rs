use std::{sync::Arc, time::Duration};

use clap::{Parser, ValueEnum};

use crate::{
    reconciler::{ReconcileTiming, SeasonReconciler},
    sonarr::{SonarrClient, SonarrError},
};

/// How the reconciler spends the wait between the initial lookup and the
/// search decision.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WaitStrategy {
    /// Sleep for the whole budget.
    #[default]
    Fixed,
    /// Poll the download queue and stop early once every pending season shows up.
    Queue,
}

fn non_empty(value: &str) -> Result<String, String> {
    let value = value.trim();
    if value.is_empty() {
        Err(String::from("value must not be empty"))
    } else {
        Ok(value.to_string())
    }
}

#[derive(Parser, Debug, Clone)]
pub struct SonarrConfig {
    #[arg(
        long = "sonarr-url",
        env = "SONARR_URL",
        default_value = "http://localhost:8989"
    )]
    pub url: String,

    #[arg(
        long = "sonarr-api-key",
        env = "SONARR_API_KEY",
        hide_env_values = true,
        value_parser = non_empty
    )]
    pub api_key: String,
}

#[derive(Parser, Debug, Clone)]
pub struct ReconcileConfig {
    #[arg(long = "settle-delay-secs", env = "SETTLE_DELAY_SECS", default_value_t = 3)]
    pub settle_delay_secs: u64,

    #[arg(long = "season-wait-secs", env = "SEASON_WAIT_SECS", default_value_t = 90)]
    pub season_wait_secs: u64,

    #[arg(long = "queue-poll-secs", env = "QUEUE_POLL_SECS", default_value_t = 5)]
    pub queue_poll_secs: u64,

    #[arg(
        long = "wait-strategy",
        env = "WAIT_STRATEGY",
        value_enum,
        default_value_t = WaitStrategy::Fixed
    )]
    pub wait_strategy: WaitStrategy,
}

impl ReconcileConfig {
    pub fn timing(&self) -> ReconcileTiming {
        ReconcileTiming {
            settle_delay: Duration::from_secs(self.settle_delay_secs),
            per_season_wait: Duration::from_secs(self.season_wait_secs),
            // A zero interval would spin on the queue endpoint.
            queue_poll_interval: Duration::from_secs(self.queue_poll_secs.max(1)),
        }
    }
}

#[derive(Parser, Debug, Clone)]
pub struct Config {
    #[command(flatten, next_help_heading = "Sonarr")]
    pub sonarr: SonarrConfig,

    #[command(flatten, next_help_heading = "Reconciliation")]
    pub reconcile: ReconcileConfig,
}

impl Config {
    pub fn sonarr_client(&self) -> Result<SonarrClient, SonarrError> {
        SonarrClient::new(&self.sonarr.url, self.sonarr.api_key.clone())
    }

    pub fn build_reconciler(&self) -> Result<SeasonReconciler, SonarrError> {
        let client = self.sonarr_client()?;

        Ok(SeasonReconciler::new(Arc::new(client))
            .with_timing(self.reconcile.timing())
            .with_wait_strategy(self.reconcile.wait_strategy))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_defaults_with_api_key() {
        let config = Config::try_parse_from(["seasonarr", "--sonarr-api-key", "abc123"]).unwrap();

        assert_eq!(config.sonarr.api_key, "abc123");
        assert_eq!(config.reconcile.wait_strategy, WaitStrategy::Fixed);

        let timing = config.reconcile.timing();
        assert_eq!(timing.settle_delay, Duration::from_secs(3));
        assert_eq!(timing.per_season_wait, Duration::from_secs(90));
        assert_eq!(timing.queue_poll_interval, Duration::from_secs(5));
    }

    #[test]
    fn rejects_blank_api_key() {
        let result = Config::try_parse_from(["seasonarr", "--sonarr-api-key", "  "]);

        assert!(result.is_err());
    }

    #[test]
    fn parses_queue_strategy_and_custom_waits() {
        let config = Config::try_parse_from([
            "seasonarr",
            "--sonarr-api-key",
            "abc123",
            "--sonarr-url",
            "http://sonarr:8989/sonarr",
            "--wait-strategy",
            "queue",
            "--season-wait-secs",
            "30",
            "--queue-poll-secs",
            "0",
        ])
        .unwrap();

        assert_eq!(config.reconcile.wait_strategy, WaitStrategy::Queue);
        assert_eq!(config.reconcile.timing().per_season_wait, Duration::from_secs(30));
        assert_eq!(config.reconcile.timing().queue_poll_interval, Duration::from_secs(1));
        assert!(config.build_reconciler().is_ok());
    }

    #[test]
    fn invalid_sonarr_url_fails_client_construction() {
        let config = Config::try_parse_from([
            "seasonarr",
            "--sonarr-api-key",
            "abc123",
            "--sonarr-url",
            "sonarr without scheme",
        ])
        .unwrap();

        assert!(config.build_reconciler().is_err());
    }
}
