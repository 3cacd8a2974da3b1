use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Twitter API error: {0}")]
    TwitterApi(#[from] TwitterApiError),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Image generation error: {0}")]
    Image(#[from] ImageError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Operation timeout after {seconds} seconds")]
    Timeout { seconds: u64 },

    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

#[derive(Error, Debug, Clone)]
pub enum TwitterApiError {
    #[error("Authentication failed: {reason}")]
    AuthenticationFailed { reason: String },

    #[error("Session is not logged in")]
    NotLoggedIn,

    #[error("Rate limit exceeded. Retry after {retry_after} seconds")]
    RateLimitExceeded { retry_after: u64 },

    #[error("Forbidden access to resource: {resource}")]
    Forbidden { resource: String },

    #[error("Tweet rejected by platform: {message}")]
    PostRejected { message: String, code: Option<i64> },

    #[error("No tweet ID found in the post response")]
    MissingTweetId,

    #[error("Media upload failed: {details}")]
    MediaUploadFailed { details: String },

    #[error("Request timeout")]
    RequestTimeout,

    #[error("Invalid API response: {details}")]
    InvalidResponse { details: String },

    #[error("Server error: {status_code}")]
    ServerError { status_code: u16 },
}

#[derive(Error, Debug, Clone)]
pub enum LlmError {
    #[error("No chat capability available on this session")]
    CapabilityUnavailable,

    #[error("Rate limit exceeded for {provider}. Retry after {retry_after} seconds")]
    RateLimitExceeded { provider: String, retry_after: u64 },

    #[error("Empty reply from {provider}")]
    EmptyReply { provider: String },

    #[error("Request timeout for {provider}")]
    RequestTimeout { provider: String },

    #[error("Invalid response format from {provider}")]
    InvalidResponseFormat { provider: String },

    #[error("Provider service unavailable: {provider}")]
    ServiceUnavailable { provider: String },
}

#[derive(Error, Debug, Clone)]
pub enum ImageError {
    #[error("Image generation failed: {details}")]
    GenerationFailed { details: String },

    #[error("No image data in the generation response")]
    NoImageData,

    #[error("Placeholder image not found: {path}")]
    PlaceholderMissing { path: String },

    #[error("Request timeout")]
    RequestTimeout,

    #[error("Server error: {status_code}")]
    ServerError { status_code: u16 },
}

#[derive(Error, Debug, Clone)]
pub enum ConfigError {
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    #[error("Environment variable not set: {var_name}")]
    MissingEnvironmentVariable { var_name: String },

    #[error("Configuration validation failed: {reason}")]
    ValidationFailed { reason: String },
}
