use std::{collections::BTreeSet, sync::Arc, time::Duration};

use chrono::Utc;
use thiserror::Error;
use tokio::time::{Instant, sleep};
use tracing::{debug, info, warn};

use crate::{
    airing::{self, incomplete_monitored_seasons},
    config::WaitStrategy,
    sonarr::{LibraryManager, SonarrError},
};

/// Deadline used when a configured budget does not fit into an `Instant`.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileTiming {
    /// Pause after the first lookup so Sonarr can finish adding the request.
    pub settle_delay: Duration,
    /// Wait budget per monitored season.
    pub per_season_wait: Duration,
    pub queue_poll_interval: Duration,
}

impl Default for ReconcileTiming {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_secs(3),
            per_season_wait: Duration::from_secs(90),
            queue_poll_interval: Duration::from_secs(5),
        }
    }
}

impl ReconcileTiming {
    pub fn immediate() -> Self {
        Self {
            settle_delay: Duration::ZERO,
            per_season_wait: Duration::ZERO,
            queue_poll_interval: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    SeriesNotFound { tvdb_id: u32 },
    SeriesNotFoundAfterWait { tvdb_id: u32 },
    AllSeasonsQueued { series_id: u64 },
    NoAiringSeason { series_id: u64 },
    SeasonComplete { season: u32 },
    NothingToSearch { season: u32 },
    SearchLaunched {
        season: u32,
        episode_ids: Vec<u64>,
        command_id: u64,
    },
}

impl Outcome {
    pub fn status(&self) -> &'static str {
        match self {
            Outcome::SeriesNotFound { .. } => "Series not found",
            Outcome::SeriesNotFoundAfterWait { .. } => "Series not found after waiting",
            Outcome::AllSeasonsQueued { .. } => "All seasons queued",
            Outcome::NoAiringSeason { .. } => "No currently airing season found",
            Outcome::SeasonComplete { .. } => "Season complete",
            Outcome::NothingToSearch { .. } => "No episodes to search",
            Outcome::SearchLaunched { .. } => "Search launched",
        }
    }
}

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("failed to look up series: {0}")]
    Lookup(#[source] SonarrError),

    #[error("Sonarr API error: {0}")]
    Search(#[source] SonarrError),
}

/// Decides whether a freshly requested series needs an explicit episode search
/// once Sonarr had the chance to grab it on its own.
pub struct SeasonReconciler {
    library: Arc<dyn LibraryManager>,
    timing: ReconcileTiming,
    wait_strategy: WaitStrategy,
}

impl SeasonReconciler {
    pub fn new(library: Arc<dyn LibraryManager>) -> Self {
        Self {
            library,
            timing: ReconcileTiming::default(),
            wait_strategy: WaitStrategy::default(),
        }
    }

    pub fn with_timing(mut self, timing: ReconcileTiming) -> Self {
        self.timing = timing;
        self
    }

    pub fn with_wait_strategy(mut self, wait_strategy: WaitStrategy) -> Self {
        self.wait_strategy = wait_strategy;
        self
    }

    pub async fn reconcile(&self, tvdb_id: u32) -> Result<Outcome, ReconcileError> {
        let Some(series) = self
            .library
            .series_by_tvdb_id(tvdb_id)
            .await
            .map_err(ReconcileError::Lookup)?
        else {
            warn!(tvdb_id, "series not found in Sonarr");
            return Ok(Outcome::SeriesNotFound { tvdb_id });
        };

        sleep(self.timing.settle_delay).await;

        let pending = incomplete_monitored_seasons(&series);
        let monitored = series.monitored_seasons().count() as u32;
        let budget = self.timing.per_season_wait.saturating_mul(monitored);

        info!(
            series = %series.title,
            seasons = ?pending,
            wait_secs = budget.as_secs(),
            "waiting for Sonarr to grab requested seasons"
        );

        match self.wait_strategy {
            WaitStrategy::Fixed => sleep(budget).await,
            WaitStrategy::Queue => {
                if self.wait_for_queue(series.id, &pending, budget).await {
                    info!(series = %series.title, "all requested seasons are in the queue");
                    return Ok(Outcome::AllSeasonsQueued {
                        series_id: series.id,
                    });
                }
            }
        }

        let Some(series) = self
            .library
            .series_by_tvdb_id(tvdb_id)
            .await
            .map_err(ReconcileError::Lookup)?
        else {
            warn!(tvdb_id, "series disappeared from Sonarr while waiting");
            return Ok(Outcome::SeriesNotFoundAfterWait { tvdb_id });
        };

        let Some(season) = airing::select_airing_season(&series.seasons, Utc::now()) else {
            info!(series = %series.title, "no currently airing season found");
            return Ok(Outcome::NoAiringSeason {
                series_id: series.id,
            });
        };
        let season_number = season.season_number;

        if !airing::is_incomplete(season) {
            info!(series = %series.title, season = season_number, "season complete");
            return Ok(Outcome::SeasonComplete {
                season: season_number,
            });
        }

        let episode_ids: Vec<u64> = self
            .library
            .episodes(series.id)
            .await
            .map_err(ReconcileError::Search)?
            .into_iter()
            .filter(|episode| episode.season_number == season_number && !episode.has_file)
            .map(|episode| episode.id)
            .collect();

        if episode_ids.is_empty() {
            info!(series = %series.title, season = season_number, "no episodes to search");
            return Ok(Outcome::NothingToSearch {
                season: season_number,
            });
        }

        let command = self
            .library
            .search_episodes(&episode_ids)
            .await
            .map_err(ReconcileError::Search)?;

        info!(
            series = %series.title,
            season = season_number,
            episodes = episode_ids.len(),
            command_id = command.id,
            "episode search launched"
        );

        Ok(Outcome::SearchLaunched {
            season: season_number,
            episode_ids,
            command_id: command.id,
        })
    }

    /// Polls the download queue until every pending season of the series has
    /// a record or the budget runs out. Returns true when nothing is pending
    /// anymore.
    async fn wait_for_queue(&self, series_id: u64, pending: &[u32], budget: Duration) -> bool {
        let mut pending: BTreeSet<u32> = pending.iter().copied().collect();
        if pending.is_empty() {
            return false;
        }

        let deadline = Instant::now()
            .checked_add(budget)
            .unwrap_or_else(|| Instant::now() + FAR_FUTURE);

        while Instant::now() < deadline {
            match self.library.queue().await {
                Ok(records) => {
                    for record in records {
                        if record.series_id != Some(series_id) {
                            continue;
                        }
                        if let Some(season) = record.season_number
                            && pending.remove(&season)
                        {
                            debug!(series_id, season, "season detected in queue");
                        }
                    }
                }
                Err(error) => warn!(series_id, %error, "failed to poll Sonarr queue"),
            }

            if pending.is_empty() {
                return true;
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            sleep(self.timing.queue_poll_interval.min(remaining)).await;
        }

        warn!(series_id, seasons = ?pending, "seasons still missing from the queue");
        false
    }
}
