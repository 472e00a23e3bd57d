use super::errors::ConnectorError;
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::Instrument;

pub(crate) fn build_client(timeout_secs: u64) -> Result<reqwest::Client, ConnectorError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs.max(1)))
        .build()
        .map_err(|err| ConnectorError::Internal(format!("HTTP client error: {}", err)))
}

/// Send a request built by `build` and decode its JSON body, retrying
/// connection failures and 5xx responses with exponential backoff.
/// Client errors (4xx) are returned immediately.
pub(crate) async fn send_json<T, F>(
    service: &str,
    retry_attempts: usize,
    build: F,
) -> Result<T, ConnectorError>
where
    T: DeserializeOwned,
    F: Fn() -> RequestBuilder,
{
    let retry_attempts = retry_attempts.max(1);
    let mut attempt = 0usize;
    let mut last_error: Option<ConnectorError> = None;

    while attempt < retry_attempts {
        attempt += 1;
        let span = tracing::info_span!("collaborator_http_request", service, attempt);

        match build().send().instrument(span).await {
            Ok(resp) => {
                let status = resp.status();
                let text = resp
                    .text()
                    .await
                    .map_err(|err| ConnectorError::HttpError(err.to_string()))?;

                if status.is_success() {
                    return serde_json::from_str::<T>(&text)
                        .map_err(|err| ConnectorError::InvalidResponse(format!("{}: {}", err, text)));
                }

                let error = match status {
                    StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                        ConnectorError::Unauthorized(text)
                    }
                    StatusCode::NOT_FOUND => ConnectorError::NotFound(text),
                    StatusCode::TOO_MANY_REQUESTS => ConnectorError::RateLimited(text),
                    status if status.is_server_error() => ConnectorError::ServiceUnavailable(
                        format!("{} error {}: {}", service, status, text),
                    ),
                    status => {
                        ConnectorError::HttpError(format!("{} error {}: {}", service, status, text))
                    }
                };

                if !status.is_server_error() {
                    return Err(error);
                }
                last_error = Some(error);
            }
            Err(err) => {
                last_error = Some(ConnectorError::from(err));
            }
        }

        if attempt < retry_attempts {
            let backoff = Duration::from_millis(100 * (1_u64 << (attempt - 1)));
            tokio::time::sleep(backoff).await;
        }
    }

    Err(last_error.unwrap_or_else(|| {
        ConnectorError::ServiceUnavailable(format!("{} request failed", service))
    }))
}
