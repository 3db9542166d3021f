use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, de::DeserializeOwned};

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Drops a field Sonarr sent in an unexpected shape instead of failing the
/// whole document.
fn none_on_error<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;

    Ok(value.and_then(|value| serde_json::from_value(value).ok()))
}

/// A series as returned by `GET /api/v3/series`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SonarrSeries {
    pub id: u64,

    pub title: String,

    #[serde(default)]
    pub tvdb_id: Option<u32>,

    #[serde(default)]
    pub seasons: Vec<SonarrSeason>,
}

impl SonarrSeries {
    pub fn monitored_seasons(&self) -> impl Iterator<Item = &SonarrSeason> {
        self.seasons.iter().filter(|season| season.monitored)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SonarrSeason {
    pub season_number: u32,

    #[serde(default, deserialize_with = "null_as_default")]
    pub monitored: bool,

    #[serde(default, deserialize_with = "none_on_error")]
    pub statistics: Option<SeasonStatistics>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct SeasonStatistics {
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_episode_count: u32,

    #[serde(default, deserialize_with = "null_as_default")]
    pub episode_file_count: u32,

    #[serde(default)]
    pub next_airing: Option<DateTime<Utc>>,

    #[serde(default)]
    pub previous_airing: Option<DateTime<Utc>>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SonarrEpisode {
    pub id: u64,

    pub season_number: u32,

    #[serde(default)]
    pub episode_number: u32,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub has_file: bool,
}

/// One page of `GET /api/v3/queue`.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct SonarrQueuePage {
    #[serde(default)]
    pub total_records: u32,

    #[serde(default)]
    pub records: Vec<SonarrQueueRecord>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SonarrQueueRecord {
    #[serde(default)]
    pub series_id: Option<u64>,

    #[serde(default)]
    pub season_number: Option<u32>,

    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeSearchCommand<'a> {
    pub name: &'static str,

    pub episode_ids: &'a [u64],
}

impl<'a> EpisodeSearchCommand<'a> {
    pub fn new(episode_ids: &'a [u64]) -> Self {
        Self {
            name: "EpisodeSearch",
            episode_ids,
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SonarrCommandResponse {
    pub id: u64,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn deserializes_series_with_season_statistics() {
        let body = json!({
            "id": 42,
            "title": "Severance",
            "tvdbId": 371980,
            "status": "continuing",
            "seasons": [
                { "seasonNumber": 0, "monitored": false },
                {
                    "seasonNumber": 2,
                    "monitored": true,
                    "statistics": {
                        "nextAiring": "2025-02-07T02:00:00Z",
                        "previousAiring": "2025-01-31T02:00:00Z",
                        "episodeFileCount": 3,
                        "episodeCount": 3,
                        "totalEpisodeCount": 10,
                        "sizeOnDisk": 123456,
                        "percentOfEpisodes": 30.0
                    }
                }
            ]
        });

        let series: SonarrSeries = serde_json::from_value(body).unwrap();

        assert_eq!(series.id, 42);
        assert_eq!(series.tvdb_id, Some(371980));
        assert_eq!(series.monitored_seasons().count(), 1);
        assert!(series.seasons[0].statistics.is_none());

        let stats = series.seasons[1].statistics.as_ref().unwrap();
        assert_eq!(stats.total_episode_count, 10);
        assert_eq!(stats.episode_file_count, 3);
        assert_eq!(
            stats.next_airing,
            Some(Utc.with_ymd_and_hms(2025, 2, 7, 2, 0, 0).unwrap())
        );
    }

    #[test]
    fn malformed_statistics_only_drop_that_season_block() {
        let body = json!({
            "id": 9,
            "title": "Broken Dates",
            "seasons": [
                {
                    "seasonNumber": 1,
                    "monitored": true,
                    "statistics": {
                        "nextAiring": "soon",
                        "episodeFileCount": 0,
                        "totalEpisodeCount": 8
                    }
                },
                {
                    "seasonNumber": 2,
                    "monitored": null,
                    "statistics": {
                        "episodeFileCount": null,
                        "totalEpisodeCount": null,
                        "previousAiring": "2025-01-31T02:00:00Z"
                    }
                },
                { "seasonNumber": 3, "monitored": true, "statistics": "n/a" }
            ]
        });

        let series: SonarrSeries = serde_json::from_value(body).unwrap();

        assert!(series.seasons[0].statistics.is_none());
        assert!(!series.seasons[1].monitored);
        assert_eq!(
            series.seasons[1].statistics,
            Some(SeasonStatistics {
                total_episode_count: 0,
                episode_file_count: 0,
                next_airing: None,
                previous_airing: Some(Utc.with_ymd_and_hms(2025, 1, 31, 2, 0, 0).unwrap()),
            })
        );
        assert!(series.seasons[2].statistics.is_none());
    }

    #[test]
    fn serializes_episode_search_command() {
        let ids = [11, 12];
        let body = serde_json::to_value(EpisodeSearchCommand::new(&ids)).unwrap();

        assert_eq!(
            body,
            json!({ "name": "EpisodeSearch", "episodeIds": [11, 12] })
        );
    }

    #[test]
    fn queue_records_tolerate_unknown_series() {
        let page: SonarrQueuePage = serde_json::from_value(json!({
            "page": 1,
            "pageSize": 250,
            "totalRecords": 2,
            "records": [
                { "seriesId": 7, "seasonNumber": 1, "title": "Show.S01.1080p" },
                { "title": "unknown.release" }
            ]
        }))
        .unwrap();

        assert_eq!(page.records.len(), 2);
        assert_eq!(page.records[1].series_id, None);
    }
}
