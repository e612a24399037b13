//! This client fetches a published calendar feed and repairs it.

use std::{borrow::Cow, time::Duration};

use anyhow::{Context, Result};
use reqwest::Response;

use crate::{transform::transform, zone::ZoneConfig};

/// Some publishers refuse requests without a browser-like user agent.
static USER_AGENT: &str = "Mozilla/5.0";
static TIMEOUT: Duration = Duration::from_secs(30);

static WEBCAL_SCHEME: &str = "webcal://";
static REMOTE_SCHEMES: [&str; 3] = ["http://", "https://", "webcal://"];

/// Get the feed at `url` with its timezone metadata repaired.
pub async fn get(url: &str, zone: &ZoneConfig) -> Result<String> {
    let response = get_response(url).await?;
    let raw = response
        .text()
        .await
        .with_context(|| format!("could not read the calendar from {url}"))?;
    tracing::info!(url, bytes = raw.len(), "fetched calendar");
    Ok(transform(&raw, zone))
}

/// Get the response of the calendar service, failing on any non-success status.
async fn get_response(url: &str) -> Result<Response> {
    let url = normalize_url(url);
    let client = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(TIMEOUT)
        .build()?;
    let response = client
        .get(url.as_ref())
        .send()
        .await
        .with_context(|| format!("could not fetch the calendar from {url}"))?
        .error_for_status()?;
    Ok(response)
}

/// Replace the `webcal://` scheme calendar services hand out with `https://`.
pub fn normalize_url(url: &str) -> Cow<'_, str> {
    match strip_scheme(url, WEBCAL_SCHEME) {
        Some(rest) => Cow::Owned(format!("https://{rest}")),
        None => Cow::Borrowed(url),
    }
}

/// Check whether a source names a feed to fetch rather than a local file.
pub fn is_remote(source: &str) -> bool {
    REMOTE_SCHEMES
        .iter()
        .any(|scheme| strip_scheme(source, scheme).is_some())
}

fn strip_scheme<'a>(url: &'a str, scheme: &str) -> Option<&'a str> {
    let prefix = url.get(..scheme.len())?;
    prefix
        .eq_ignore_ascii_case(scheme)
        .then(|| &url[scheme.len()..])
}
