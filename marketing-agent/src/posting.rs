use marketeer_core::{CoreError, TwitterApiError};
use serde_json::Value;
use std::future::Future;
use tracing::warn;

/// Length rejections get one retry at this size, ellipsis included.
pub const TRUNCATED_TWEET_LEN: usize = 220;

const ELLIPSIS: &str = "...";
const LENGTH_REJECTION_CODE: i64 = 186;

/// Whether a post rejection is the platform complaining about length.
pub fn is_length_rejection(message: &str, code: Option<i64>) -> bool {
    if code == Some(LENGTH_REJECTION_CODE) {
        return true;
    }
    let lower = message.to_lowercase();
    lower.contains("too long") || lower.contains("shorter")
}

/// Cuts the text down to the retry length and marks the cut.
pub fn truncate_for_retry(text: &str) -> String {
    let keep = TRUNCATED_TWEET_LEN - ELLIPSIS.len();
    let mut shortened: String = text.chars().take(keep).collect();
    shortened.push_str(ELLIPSIS);
    shortened
}

/// Runs `post` once; on a length rejection, truncates and retries exactly
/// once. Any other failure, and any failure of the retry itself, propagates
/// with the platform message intact. Returns the response together with the
/// text that was actually posted.
pub async fn post_with_length_retry<F, Fut>(
    text: String,
    mut post: F,
) -> Result<(Value, String), CoreError>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<Value, CoreError>>,
{
    match post(text.clone()).await {
        Ok(response) => Ok((response, text)),
        Err(CoreError::TwitterApi(TwitterApiError::PostRejected { message, code }))
            if is_length_rejection(&message, code) =>
        {
            let shortened = truncate_for_retry(&text);
            warn!(
                "Tweet rejected for length ({}), retrying with {} chars",
                message,
                shortened.chars().count()
            );
            let response = post(shortened.clone()).await?;
            Ok((response, shortened))
        }
        Err(e) => Err(e),
    }
}
