use std::sync::Arc;

use axum::{
    extract::State,
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Response},
};
use tzfix_core::{feed_client, ZoneConfig};

/// The feed being served and the zone it is repaired into.
#[derive(Debug, Clone)]
pub struct CalendarSource {
    pub url: String,
    pub zone: ZoneConfig,
}

/// Handle calendar requests.
///
/// The feed is fetched on every request, so subscribers always see the current events.
pub async fn handler(
    State(source): State<Arc<CalendarSource>>,
) -> Result<Response, (StatusCode, String)> {
    let calendar = feed_client::get(&source.url, &source.zone)
        .await
        .map_err(|err| {
            tracing::warn!(url = %source.url, "{err:#}");
            (StatusCode::BAD_GATEWAY, format!("{err:#}"))
        })?;
    let response = ([(CONTENT_TYPE, "text/calendar; charset=utf-8")], calendar).into_response();
    Ok(response)
}
