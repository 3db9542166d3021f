use crate::{
    app::AppRouter, error::WebhookError, models::overseerr::OverseerrWebhook, state::AppState,
};
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    routing::post,
};
use log::info;
use seasonarr::Outcome;
use serde::Serialize;
use std::sync::Arc;
use tokio::task;

pub fn webhook_routes() -> AppRouter {
    AppRouter::new().route("/", post(handle_webhook))
}

#[derive(Serialize, Debug, PartialEq)]
pub struct StatusBody {
    pub status: &'static str,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub episodes_count: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub season: Option<u32>,
}

impl StatusBody {
    fn message(status: &'static str) -> Self {
        Self {
            status,
            episodes_count: None,
            season: None,
        }
    }
}

impl From<&Outcome> for StatusBody {
    fn from(outcome: &Outcome) -> Self {
        match outcome {
            Outcome::SearchLaunched {
                season,
                episode_ids,
                ..
            } => Self {
                status: outcome.status(),
                episodes_count: Some(episode_ids.len()),
                season: Some(*season),
            },
            _ => Self::message(outcome.status()),
        }
    }
}

async fn handle_webhook(
    State(state): State<AppState>,
    payload: Result<Json<OverseerrWebhook>, JsonRejection>,
) -> Result<Json<StatusBody>, WebhookError> {
    let Json(body) = payload?;

    info!(
        "Webhook received: {} {}",
        body.notification_type
            .as_ref()
            .map_or_else(|| String::from("<none>"), ToString::to_string),
        body.subject.as_ref().map(ToString::to_string).unwrap_or_default()
    );

    let media = match body.media {
        Some(media) => media,
        None => return Ok(Json(StatusBody::message("No media"))),
    };

    if !media.is_tv() {
        info!("Not a TV show: {:?}", media.media_type);
        return Ok(Json(StatusBody::message("Not a TV show")));
    }

    let tvdb_id = media.tvdb_id()?;
    info!("TV show request detected for tvdb id {}", tvdb_id);

    // Runs detached so a dropped connection does not abort the wait or the search.
    let reconciler = Arc::clone(&state.reconciler);
    let outcome = task::spawn(async move { reconciler.reconcile(tvdb_id).await }).await??;

    Ok(Json(StatusBody::from(&outcome)))
}
