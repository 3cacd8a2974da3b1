use crate::error::*;
use std::time::Duration;
use tracing::{error, warn};

pub trait ErrorExt {
    fn log_error(&self) -> &Self;
    fn log_warn(&self) -> &Self;
    fn is_retryable(&self) -> bool;
    fn retry_after(&self) -> Option<Duration>;
    fn is_fatal(&self) -> bool;
    fn user_friendly_message(&self) -> String;
    fn error_code(&self) -> String;
}

impl ErrorExt for CoreError {
    fn log_error(&self) -> &Self {
        error!("CoreError: {}", self);
        match self {
            CoreError::TwitterApi(e) => {
                error!("Twitter API error details: {:?}", e);
            }
            CoreError::Llm(e) => {
                error!("LLM error details: {:?}", e);
            }
            CoreError::Image(e) => {
                error!("Image generation error details: {:?}", e);
            }
            CoreError::Config(e) => {
                error!("Configuration error details: {:?}", e);
            }
            _ => {}
        }
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("CoreError (warning): {}", self);
        self
    }

    fn is_retryable(&self) -> bool {
        match self {
            CoreError::TwitterApi(e) => matches!(
                e,
                TwitterApiError::RateLimitExceeded { .. }
                    | TwitterApiError::RequestTimeout
                    | TwitterApiError::ServerError { .. }
            ),
            CoreError::Llm(e) => matches!(
                e,
                LlmError::RateLimitExceeded { .. }
                    | LlmError::RequestTimeout { .. }
                    | LlmError::ServiceUnavailable { .. }
            ),
            CoreError::Image(e) => matches!(
                e,
                ImageError::RequestTimeout | ImageError::ServerError { .. }
            ),
            CoreError::Network(_) => true,
            CoreError::Timeout { .. } => true,
            _ => false,
        }
    }

    fn retry_after(&self) -> Option<Duration> {
        match self {
            CoreError::TwitterApi(TwitterApiError::RateLimitExceeded { retry_after }) => {
                Some(Duration::from_secs(*retry_after))
            }
            CoreError::Llm(LlmError::RateLimitExceeded { retry_after, .. }) => {
                Some(Duration::from_secs(*retry_after))
            }
            CoreError::Timeout { seconds } => Some(Duration::from_secs(*seconds)),
            _ if self.is_retryable() => Some(Duration::from_secs(5)), // Default retry delay
            _ => None,
        }
    }

    /// Fatal errors abort the current run; everything else degrades to a
    /// fallback inside the pipeline.
    fn is_fatal(&self) -> bool {
        match self {
            CoreError::TwitterApi(e) => matches!(
                e,
                TwitterApiError::AuthenticationFailed { .. }
                    | TwitterApiError::NotLoggedIn
                    | TwitterApiError::PostRejected { .. }
                    | TwitterApiError::MissingTweetId
            ),
            CoreError::Config(_) => true,
            CoreError::Llm(_) | CoreError::Image(_) => false,
            _ => false,
        }
    }

    fn user_friendly_message(&self) -> String {
        match self {
            CoreError::TwitterApi(e) => match e {
                TwitterApiError::AuthenticationFailed { reason } => {
                    format!("Twitter login failed: {}", reason)
                }
                TwitterApiError::NotLoggedIn => {
                    "The Twitter session is not logged in. Check the stored cookies or credentials."
                        .to_string()
                }
                TwitterApiError::PostRejected { message, .. } => {
                    format!("Twitter rejected the tweet: {}", message)
                }
                TwitterApiError::MissingTweetId => {
                    "The tweet may not have been created: no tweet ID was found in the response."
                        .to_string()
                }
                TwitterApiError::RateLimitExceeded { retry_after } => {
                    format!("Twitter rate limit hit. Retry in {} seconds.", retry_after)
                }
                other => format!("Twitter API problem: {}", other),
            },
            CoreError::Llm(_) => {
                "The LLM text generation is unavailable. Template rendering was used instead."
                    .to_string()
            }
            CoreError::Image(_) => {
                "Image generation failed. The tweet can still be posted without an image."
                    .to_string()
            }
            CoreError::Config(e) => format!("Configuration problem: {}", e),
            CoreError::Network(_) => {
                "Network connection error. Please check your internet connection.".to_string()
            }
            CoreError::InvalidInput { message } => format!("Invalid input: {}", message),
            CoreError::Timeout { .. } => {
                "The operation took too long to complete. Please try again.".to_string()
            }
            CoreError::NotFound { resource } => format!("Could not find: {}", resource),
            _ => "An unexpected error occurred. Please try again later.".to_string(),
        }
    }

    fn error_code(&self) -> String {
        match self {
            CoreError::TwitterApi(_) => "TWITTER_API".to_string(),
            CoreError::Llm(_) => "LLM".to_string(),
            CoreError::Image(_) => "IMAGE".to_string(),
            CoreError::Config(_) => "CONFIG".to_string(),
            CoreError::Io(_) => "IO".to_string(),
            CoreError::Serialization(_) => "SERIALIZATION".to_string(),
            CoreError::Network(_) => "NETWORK".to_string(),
            CoreError::InvalidInput { .. } => "INVALID_INPUT".to_string(),
            CoreError::Timeout { .. } => "TIMEOUT".to_string(),
            CoreError::NotFound { .. } => "NOT_FOUND".to_string(),
            CoreError::Internal { .. } => "INTERNAL".to_string(),
        }
    }
}
