use std::error::Error;

use chrono::Utc;
use clap::Args;
use colored::Colorize;
use seasonarr::{
    Config, LibraryManager,
    airing::{AirState, air_state, is_incomplete, select_airing_season},
};

#[derive(Args)]
pub struct InspectArgs {
    tvdb_id: u32,
}

pub async fn cmd_inspect(config: &Config, args: &InspectArgs) -> Result<(), Box<dyn Error>> {
    let client = config.sonarr_client()?;

    let Some(series) = client.series_by_tvdb_id(args.tvdb_id).await? else {
        println!("Series not found: {}", args.tvdb_id.to_string().red());
        return Ok(());
    };

    let now = Utc::now();
    let selected = select_airing_season(&series.seasons, now).map(|season| season.season_number);

    println!(
        "{} (id {}) on {}",
        series.title.bold(),
        series.id,
        client.base_url().as_str().dimmed()
    );

    for season in &series.seasons {
        let (files, total) = season
            .statistics
            .as_ref()
            .map(|stats| (stats.episode_file_count, stats.total_episode_count))
            .unwrap_or_default();

        let state = air_state(season, now);
        let state = match state {
            AirState::Future => state.to_string().blue(),
            AirState::CurrentlyAiring => state.to_string().green(),
            AirState::Ended => state.to_string().normal(),
        };

        let files = format!("{}/{}", files, total);
        let files = if is_incomplete(season) {
            files.yellow()
        } else {
            files.normal()
        };

        println!(
            "  Season {:>2}  {:<9}  {:<7}  {:>7}{}",
            season.season_number,
            if season.monitored {
                "monitored".normal()
            } else {
                "ignored".dimmed()
            },
            state,
            files,
            if selected == Some(season.season_number) {
                "  <- search target".green().bold()
            } else {
                "".normal()
            }
        );
    }

    if selected.is_none() {
        println!("{}", "No currently airing season found".yellow());
    }

    Ok(())
}
