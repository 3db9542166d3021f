//! Season air-state heuristics.
//!
//! Everything here is derived from the season statistics Sonarr reports and the
//! current time; nothing is cached between evaluations.

use std::fmt;

use chrono::{DateTime, Duration, Utc};

use crate::sonarr::{SonarrSeason, SonarrSeries};

/// How far ahead the next airing may be for a season to count as airing.
pub const AIRING_LOOKAHEAD_DAYS: i64 = 30;

/// How long after the last airing a season still counts as airing.
pub const AIRING_GRACE_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AirState {
    Future,
    CurrentlyAiring,
    Ended,
}

impl fmt::Display for AirState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AirState::Future => "future",
            AirState::CurrentlyAiring => "airing",
            AirState::Ended => "ended",
        })
    }
}

/// A season is incomplete while it has fewer files than episodes. Seasons
/// without statistics are never incomplete.
pub fn is_incomplete(season: &SonarrSeason) -> bool {
    season
        .statistics
        .as_ref()
        .is_some_and(|stats| stats.episode_file_count < stats.total_episode_count)
}

/// Scheduled but not started: a next airing, no previous one and nothing
/// downloaded yet.
pub fn is_future_season(season: &SonarrSeason) -> bool {
    season.statistics.as_ref().is_some_and(|stats| {
        stats.next_airing.is_some()
            && stats.previous_airing.is_none()
            && stats.episode_file_count == 0
    })
}

pub fn is_currently_airing(season: &SonarrSeason, now: DateTime<Utc>) -> bool {
    let Some(stats) = season.statistics.as_ref() else {
        return false;
    };

    if let Some(next) = stats.next_airing
        && next <= now + Duration::days(AIRING_LOOKAHEAD_DAYS)
    {
        return true;
    }

    stats
        .previous_airing
        .is_some_and(|previous| previous >= now - Duration::days(AIRING_GRACE_DAYS))
}

pub fn air_state(season: &SonarrSeason, now: DateTime<Utc>) -> AirState {
    if is_future_season(season) {
        AirState::Future
    } else if is_currently_airing(season, now) {
        AirState::CurrentlyAiring
    } else {
        AirState::Ended
    }
}

/// Season numbers of monitored seasons that still miss files.
pub fn incomplete_monitored_seasons(series: &SonarrSeries) -> Vec<u32> {
    series
        .monitored_seasons()
        .filter(|season| is_incomplete(season))
        .map(|season| season.season_number)
        .collect()
}

/// Picks the monitored, started, currently airing season with the highest
/// season number.
pub fn select_airing_season(
    seasons: &[SonarrSeason],
    now: DateTime<Utc>,
) -> Option<&SonarrSeason> {
    seasons
        .iter()
        .filter(|season| season.monitored)
        .filter(|season| air_state(season, now) == AirState::CurrentlyAiring)
        .max_by_key(|season| season.season_number)
}
