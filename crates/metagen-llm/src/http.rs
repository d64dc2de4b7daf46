//! Shared HTTP plumbing for the providers

use crate::LlmError;
use reqwest::blocking::{RequestBuilder, Response};
use reqwest::StatusCode;
use std::time::Duration;
use tracing::debug;

/// Send a request, retrying transport failures with exponential backoff.
///
/// `build` is called once per attempt because a blocking request builder is
/// consumed by `send`. Success statuses return the response; 404 maps to
/// `ModelNotAvailable` immediately; everything else is retried.
pub(crate) fn send_with_retries<F>(
    max_retries: u32,
    model: &str,
    mut build: F,
) -> Result<Response, LlmError>
where
    F: FnMut() -> RequestBuilder,
{
    let max_retries = max_retries.max(1);
    let mut attempts = 0;
    let mut last_error = None;

    while attempts < max_retries {
        match build().send() {
            Ok(response) => {
                let status = response.status();
                if status.is_success() {
                    return Ok(response);
                } else if status == StatusCode::NOT_FOUND {
                    return Err(LlmError::ModelNotAvailable(model.to_string()));
                } else if status == StatusCode::TOO_MANY_REQUESTS {
                    last_error = Some(LlmError::RateLimitExceeded);
                } else {
                    let error_text = response
                        .text()
                        .unwrap_or_else(|_| "Unknown error".to_string());
                    last_error = Some(LlmError::Communication(format!(
                        "HTTP {}: {}",
                        status, error_text
                    )));
                }
            }
            Err(e) => {
                last_error = Some(LlmError::Communication(format!("Request failed: {}", e)));
            }
        }

        attempts += 1;
        if attempts < max_retries {
            // Exponential backoff: 1s, 2s, 4s, etc.
            let delay = Duration::from_secs(2u64.pow(attempts - 1));
            debug!("Retrying in {:?} (attempt {}/{})", delay, attempts + 1, max_retries);
            std::thread::sleep(delay);
        }
    }

    Err(last_error.unwrap_or_else(|| LlmError::Communication("Max retries exceeded".to_string())))
}
