//! In-memory [`LibraryManager`] for tests.

use std::{
    collections::VecDeque,
    sync::{Mutex, MutexGuard},
};

use async_trait::async_trait;
use reqwest::StatusCode;

use super::{
    LibraryManager, SonarrCommandResponse, SonarrEpisode, SonarrError, SonarrQueueRecord,
    SonarrSeries,
};

#[derive(Default)]
struct MockState {
    series: VecDeque<Option<SonarrSeries>>,
    episodes: Vec<SonarrEpisode>,
    queue: VecDeque<Option<Vec<SonarrQueueRecord>>>,
    fail_lookup: bool,
    fail_episodes: bool,
    fail_search: bool,
    series_lookups: Vec<u32>,
    searches: Vec<Vec<u64>>,
    queue_polls: usize,
}

/// Scripted library manager. Series and queue responses are consumed in order;
/// the last one keeps being returned once the script runs out.
#[derive(Default)]
pub struct MockLibrary {
    state: Mutex<MockState>,
}

fn failure() -> SonarrError {
    SonarrError::Status {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        body: String::from("mock failure"),
    }
}

impl MockLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Queues the response of the next series lookup.
    pub fn with_series(self, series: Option<SonarrSeries>) -> Self {
        self.state().series.push_back(series);
        self
    }

    pub fn with_episodes(self, episodes: Vec<SonarrEpisode>) -> Self {
        self.state().episodes = episodes;
        self
    }

    /// Queues the response of the next queue poll.
    pub fn with_queue(self, records: Vec<SonarrQueueRecord>) -> Self {
        self.state().queue.push_back(Some(records));
        self
    }

    /// Makes the next queue poll fail.
    pub fn with_queue_failure(self) -> Self {
        self.state().queue.push_back(None);
        self
    }

    pub fn failing_lookup(self) -> Self {
        self.state().fail_lookup = true;
        self
    }

    pub fn failing_episodes(self) -> Self {
        self.state().fail_episodes = true;
        self
    }

    pub fn failing_search(self) -> Self {
        self.state().fail_search = true;
        self
    }

    pub fn series_lookups(&self) -> Vec<u32> {
        self.state().series_lookups.clone()
    }

    pub fn searches(&self) -> Vec<Vec<u64>> {
        self.state().searches.clone()
    }

    pub fn queue_polls(&self) -> usize {
        self.state().queue_polls
    }

    /// True when no call of any kind reached the mock.
    pub fn untouched(&self) -> bool {
        let state = self.state();
        state.series_lookups.is_empty() && state.searches.is_empty() && state.queue_polls == 0
    }
}

fn next_scripted<T: Clone + Default>(script: &mut VecDeque<T>) -> T {
    if script.len() > 1 {
        script.pop_front().unwrap_or_default()
    } else {
        script.front().cloned().unwrap_or_default()
    }
}

#[async_trait]
impl LibraryManager for MockLibrary {
    async fn series_by_tvdb_id(&self, tvdb_id: u32) -> Result<Option<SonarrSeries>, SonarrError> {
        let mut state = self.state();
        state.series_lookups.push(tvdb_id);

        if state.fail_lookup {
            return Err(failure());
        }

        Ok(next_scripted(&mut state.series))
    }

    async fn episodes(&self, _series_id: u64) -> Result<Vec<SonarrEpisode>, SonarrError> {
        let state = self.state();

        if state.fail_episodes {
            return Err(failure());
        }

        Ok(state.episodes.clone())
    }

    async fn search_episodes(
        &self,
        episode_ids: &[u64],
    ) -> Result<SonarrCommandResponse, SonarrError> {
        let mut state = self.state();

        if state.fail_search {
            return Err(failure());
        }

        state.searches.push(episode_ids.to_vec());

        Ok(SonarrCommandResponse {
            id: state.searches.len() as u64,
            name: Some(String::from("EpisodeSearch")),
            status: Some(String::from("queued")),
        })
    }

    async fn queue(&self) -> Result<Vec<SonarrQueueRecord>, SonarrError> {
        let mut state = self.state();
        state.queue_polls += 1;

        match next_scripted(&mut state.queue) {
            Some(records) => Ok(records),
            None if state.queue.is_empty() => Ok(Vec::new()),
            None => Err(failure()),
        }
    }
}
