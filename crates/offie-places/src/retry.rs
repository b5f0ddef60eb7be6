//! Exponential back-off for Google Maps requests.
//!
//! Quota and authorisation statuses are returned at once; retrying them only
//! burns more of the daily allowance.

use std::future::Future;
use std::time::Duration;

use crate::error::PlacesError;

const MAX_DELAY_MS: u64 = 30_000;

/// Returns `true` for errors worth another attempt after a delay.
///
/// Retried: timeouts, connection failures, HTTP 5xx and 429, and the
/// `UNKNOWN_ERROR` status, which Google documents as transient.
pub(crate) fn is_retriable(err: &PlacesError) -> bool {
    match err {
        PlacesError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        PlacesError::UnexpectedStatus { status, .. } => *status == 429 || *status >= 500,
        PlacesError::Status { status, .. } => status == "UNKNOWN_ERROR",
        PlacesError::Deserialize { .. } | PlacesError::InvalidBaseUrl { .. } => false,
    }
}

/// Runs `operation`, retrying transient failures up to `max_retries` times.
///
/// The n-th retry sleeps `backoff_base_ms * 2^(n-1)` with ±25 % jitter,
/// capped at 30 s.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, PlacesError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, PlacesError>>,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if !is_retriable(&err) || attempt >= max_retries => return Err(err),
            Err(err) => {
                attempt += 1;
                let delay_ms = backoff_delay_ms(backoff_base_ms, attempt);
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "transient Google Maps error, retrying"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn backoff_delay_ms(backoff_base_ms: u64, attempt: u32) -> u64 {
    let computed = backoff_base_ms.saturating_mul(1u64 << attempt.saturating_sub(1).min(10));
    let capped = computed.min(MAX_DELAY_MS);
    (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use super::*;

    fn status(code: &str) -> PlacesError {
        PlacesError::Status {
            status: code.to_owned(),
            message: None,
        }
    }

    fn http(code: u16) -> PlacesError {
        PlacesError::UnexpectedStatus {
            status: code,
            url: "http://localhost/place/nearbysearch/json".to_owned(),
        }
    }

    #[test]
    fn quota_and_auth_statuses_are_not_retriable() {
        for code in ["OVER_QUERY_LIMIT", "REQUEST_DENIED", "INVALID_REQUEST"] {
            assert!(!is_retriable(&status(code)), "{code} must not be retried");
        }
    }

    #[test]
    fn unknown_error_status_is_retriable() {
        assert!(is_retriable(&status("UNKNOWN_ERROR")));
    }

    #[test]
    fn server_errors_and_rate_limits_are_retriable() {
        assert!(is_retriable(&http(500)));
        assert!(is_retriable(&http(503)));
        assert!(is_retriable(&http(429)));
        assert!(!is_retriable(&http(404)));
    }

    #[test]
    fn delay_is_capped_with_jitter() {
        let delay = backoff_delay_ms(1_000, 20);
        assert!((22_500..=37_500).contains(&delay), "got {delay}");
        assert_eq!(backoff_delay_ms(0, 3), 0);
    }

    #[tokio::test]
    async fn gives_up_after_max_retries() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(2, 0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(http(502))
            }
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(matches!(
            result,
            Err(PlacesError::UnexpectedStatus { status: 502, .. })
        ));
    }

    #[tokio::test]
    async fn does_not_retry_over_query_limit() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(3, 0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(status("OVER_QUERY_LIMIT"))
            }
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(result, Err(PlacesError::Status { .. })));
    }

    #[tokio::test]
    async fn retries_then_succeeds() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(3, 0, || {
            let c = Arc::clone(&c);
            async move {
                let attempt = c.fetch_add(1, Ordering::SeqCst) + 1;
                if attempt < 3 {
                    Err(status("UNKNOWN_ERROR"))
                } else {
                    Ok(7)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
