use std::{error::Error, sync::Arc};

use clap::Args;
use colored::Colorize;
use seasonarr::{Config, Outcome, ReconcileTiming, SeasonReconciler};

#[derive(Args)]
pub struct ReconcileArgs {
    tvdb_id: u32,

    /// Skip the settle delay and the per-season wait
    #[arg(long)]
    no_wait: bool,
}

pub async fn cmd_reconcile(config: &Config, args: &ReconcileArgs) -> Result<(), Box<dyn Error>> {
    let timing = if args.no_wait {
        ReconcileTiming::immediate()
    } else {
        config.reconcile.timing()
    };

    let reconciler = SeasonReconciler::new(Arc::new(config.sonarr_client()?))
        .with_timing(timing)
        .with_wait_strategy(config.reconcile.wait_strategy);

    if !args.no_wait {
        println!(
            "Reconciling tvdb {} (settle {}s, {}s per monitored season)",
            args.tvdb_id.to_string().yellow(),
            timing.settle_delay.as_secs(),
            timing.per_season_wait.as_secs()
        );
    }

    let outcome = reconciler.reconcile(args.tvdb_id).await?;

    let status = match &outcome {
        Outcome::SearchLaunched { .. } => outcome.status().green(),
        Outcome::SeasonComplete { .. } | Outcome::AllSeasonsQueued { .. } => {
            outcome.status().cyan()
        }
        _ => outcome.status().yellow(),
    };
    println!("{}", status.bold());

    if let Outcome::SearchLaunched {
        season,
        episode_ids,
        command_id,
    } = &outcome
    {
        println!(
            "Season {}: searching {} episode(s) {:?} (command {})",
            season,
            episode_ids.len(),
            episode_ids,
            command_id
        );
    }

    Ok(())
}
