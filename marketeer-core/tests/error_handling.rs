use marketeer_core::{
    ConfigError, CoreError, ErrorExt, ImageError, LlmError, TwitterApiError,
};
use std::time::Duration;

#[test]
fn test_error_codes() {
    let twitter_error = CoreError::TwitterApi(TwitterApiError::NotLoggedIn);
    assert_eq!(twitter_error.error_code(), "TWITTER_API");

    let llm_error = CoreError::Llm(LlmError::CapabilityUnavailable);
    assert_eq!(llm_error.error_code(), "LLM");

    let image_error = CoreError::Image(ImageError::NoImageData);
    assert_eq!(image_error.error_code(), "IMAGE");

    let config_error = CoreError::Config(ConfigError::MissingField {
        field: "api_key".to_string(),
    });
    assert_eq!(config_error.error_code(), "CONFIG");
}

#[test]
fn test_retryable_errors() {
    let retryable_error =
        CoreError::TwitterApi(TwitterApiError::RateLimitExceeded { retry_after: 60 });
    assert!(retryable_error.is_retryable());

    let non_retryable_error = CoreError::Config(ConfigError::MissingField {
        field: "api_key".to_string(),
    });
    assert!(!non_retryable_error.is_retryable());

    // A platform rejection is handled by the pipeline's own single retry,
    // never by generic retry machinery.
    let rejection = CoreError::TwitterApi(TwitterApiError::PostRejected {
        message: "Tweet text is too long".to_string(),
        code: Some(186),
    });
    assert!(!rejection.is_retryable());
}

#[test]
fn test_retry_after() {
    let rate_limit_error =
        CoreError::TwitterApi(TwitterApiError::RateLimitExceeded { retry_after: 60 });
    assert_eq!(
        rate_limit_error.retry_after(),
        Some(Duration::from_secs(60))
    );

    let timeout_error = CoreError::Timeout { seconds: 30 };
    assert_eq!(timeout_error.retry_after(), Some(Duration::from_secs(30)));
}

#[test]
fn test_fatal_classification() {
    // Fatal: authentication and post failures.
    assert!(CoreError::TwitterApi(TwitterApiError::NotLoggedIn).is_fatal());
    assert!(CoreError::TwitterApi(TwitterApiError::MissingTweetId).is_fatal());
    assert!(CoreError::Config(ConfigError::MissingEnvironmentVariable {
        var_name: "GEMINI_API_KEY".to_string(),
    })
    .is_fatal());

    // Degraded-success conditions: the pipeline falls back and continues.
    assert!(!CoreError::Llm(LlmError::EmptyReply {
        provider: "grok".to_string(),
    })
    .is_fatal());
    assert!(!CoreError::Image(ImageError::GenerationFailed {
        details: "backend down".to_string(),
    })
    .is_fatal());
}

#[test]
fn test_user_friendly_messages() {
    let twitter_error = CoreError::TwitterApi(TwitterApiError::NotLoggedIn);
    let message = twitter_error.user_friendly_message();
    assert!(!message.is_empty());
    assert!(message.contains("not logged in"));

    let rejection = CoreError::TwitterApi(TwitterApiError::PostRejected {
        message: "Status is a duplicate".to_string(),
        code: Some(187),
    });
    assert!(rejection
        .user_friendly_message()
        .contains("Status is a duplicate"));

    let config_error = CoreError::Config(ConfigError::MissingField {
        field: "api_key".to_string(),
    });
    assert!(config_error.user_friendly_message().contains("api_key"));
}
