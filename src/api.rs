//! REST client for the kanku backend. Every request is raced against a
//! bounded timeout so a hung server can never leave the page spinning
//! forever.

use std::future::Future;

use futures::future::{select, Either};
use futures::pin_mut;
use gloo_net::http::Request;
use gloo_timers::future::TimeoutFuture;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::models::{Job, JobConfigResponse, TriggerResponse};
use crate::settings::TaskOverrides;

pub const REQUEST_TIMEOUT_MS: u32 = 15_000;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request timed out")]
    Timeout,
    #[error("request failed: {0}")]
    Request(String),
    #[error("server returned HTTP {0}")]
    Status(u16),
    #[error("malformed response: {0}")]
    Decode(String),
}

/// Fetches the job schema, consumed once per page load.
pub async fn fetch_jobs(uri_base: &str) -> Result<Vec<Job>, ApiError> {
    let response: JobConfigResponse = get_json(&job_config_url(uri_base)).await?;
    Ok(response.config)
}

/// POSTs the extracted per-task settings to the per-job trigger endpoint.
pub async fn trigger_job(
    uri_base: &str,
    job_name: &str,
    slots: &[TaskOverrides],
) -> Result<TriggerResponse, ApiError> {
    let request = Request::post(&job_trigger_url(uri_base, job_name))
        .json(&slots)
        .map_err(|err| ApiError::Request(err.to_string()))?;

    let response = with_timeout(request.send())
        .await
        .ok_or(ApiError::Timeout)?
        .map_err(|err| ApiError::Request(err.to_string()))?;
    if !response.ok() {
        return Err(ApiError::Status(response.status()));
    }
    response
        .json::<TriggerResponse>()
        .await
        .map_err(|err| ApiError::Decode(err.to_string()))
}

async fn get_json<T>(url: &str) -> Result<T, ApiError>
where
    T: DeserializeOwned,
{
    let response = with_timeout(Request::get(url).send())
        .await
        .ok_or(ApiError::Timeout)?
        .map_err(|err| ApiError::Request(err.to_string()))?;
    if !response.ok() {
        return Err(ApiError::Status(response.status()));
    }
    response
        .json::<T>()
        .await
        .map_err(|err| ApiError::Decode(err.to_string()))
}

async fn with_timeout<F>(fut: F) -> Option<F::Output>
where
    F: Future,
{
    let timeout = TimeoutFuture::new(REQUEST_TIMEOUT_MS);
    pin_mut!(fut);
    pin_mut!(timeout);
    match select(fut, timeout).await {
        Either::Left((output, _)) => Some(output),
        Either::Right(((), _)) => None,
    }
}

fn job_config_url(uri_base: &str) -> String {
    format!("{uri_base}/rest/gui_config/job.json")
}

fn job_trigger_url(uri_base: &str, job_name: &str) -> String {
    format!("{uri_base}/rest/job/trigger/{job_name}.json")
}

#[cfg(test)]
mod tests {
    use super::{job_config_url, job_trigger_url, ApiError};

    #[test]
    fn endpoint_urls_follow_the_rest_layout() {
        assert_eq!(job_config_url(""), "/rest/gui_config/job.json");
        assert_eq!(
            job_config_url("https://kanku.example"),
            "https://kanku.example/rest/gui_config/job.json"
        );
        assert_eq!(
            job_trigger_url("https://kanku.example", "sync"),
            "https://kanku.example/rest/job/trigger/sync.json"
        );
    }

    #[test]
    fn errors_render_distinct_messages() {
        assert_eq!(ApiError::Timeout.to_string(), "request timed out");
        assert_eq!(
            ApiError::Status(503).to_string(),
            "server returned HTTP 503"
        );
    }
}
