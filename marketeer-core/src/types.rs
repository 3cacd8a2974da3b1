use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// One cookie record as stored in `cookies.json`.
///
/// The field names mirror the tough-cookie serialization the platform login
/// produces, so an existing cookie file keeps working as-is.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionCookie {
    pub key: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<String>,
    #[serde(default)]
    pub secure: bool,
    #[serde(default)]
    pub http_only: bool,
    #[serde(default)]
    pub host_only: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub same_site: Option<String>,
}

impl SessionCookie {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            domain: Some(".twitter.com".to_string()),
            path: Some("/".to_string()),
            expires: None,
            secure: true,
            http_only: true,
            host_only: false,
            same_site: None,
        }
    }
}

/// Append-only record of one successfully posted tweet.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostedTweet {
    pub id: String,
    /// ISO-8601 timestamp of the post.
    pub timestamp: String,
    pub text: String,
    /// Serialized `TweetOptions` for later analysis.
    pub options: String,
}

/// Options a tweet was posted with, kept in the log for the analyze command.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TweetOptions {
    pub content_type: String,
    pub has_media: bool,
    pub scheduled: bool,
}

/// Credentials and API keys read from the environment at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub twitter_username: Option<String>,
    pub twitter_password: Option<String>,
    pub twitter_email: Option<String>,
    pub gemini_api_key: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            twitter_username: std::env::var("TWITTER_USERNAME").ok(),
            twitter_password: std::env::var("TWITTER_PASSWORD").ok(),
            twitter_email: std::env::var("TWITTER_EMAIL").ok(),
            gemini_api_key: std::env::var("GEMINI_API_KEY").ok(),
        }
    }

    /// Twitter credentials, or a config error naming the first missing
    /// variable. Used by the credential-login fallback.
    pub fn twitter_credentials(&self) -> Result<(String, String, Option<String>), ConfigError> {
        let username = self.twitter_username.clone().ok_or_else(|| {
            ConfigError::MissingEnvironmentVariable {
                var_name: "TWITTER_USERNAME".to_string(),
            }
        })?;
        let password = self.twitter_password.clone().ok_or_else(|| {
            ConfigError::MissingEnvironmentVariable {
                var_name: "TWITTER_PASSWORD".to_string(),
            }
        })?;
        Ok((username, password, self.twitter_email.clone()))
    }

    pub fn gemini_api_key(&self) -> Result<String, ConfigError> {
        self.gemini_api_key
            .clone()
            .ok_or_else(|| ConfigError::MissingEnvironmentVariable {
                var_name: "GEMINI_API_KEY".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_round_trip_uses_camel_case() {
        let cookie = SessionCookie {
            key: "auth_token".to_string(),
            value: "abc123".to_string(),
            domain: Some(".twitter.com".to_string()),
            path: Some("/".to_string()),
            expires: Some("2030-01-01T00:00:00.000Z".to_string()),
            secure: true,
            http_only: true,
            host_only: false,
            same_site: Some("none".to_string()),
        };

        let json = serde_json::to_string(&cookie).unwrap();
        assert!(json.contains("\"httpOnly\":true"));
        assert!(json.contains("\"hostOnly\":false"));
        assert!(json.contains("\"sameSite\":\"none\""));

        let back: SessionCookie = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cookie);
    }

    #[test]
    fn test_cookie_parses_minimal_record() {
        let cookie: SessionCookie =
            serde_json::from_str(r#"{"key":"ct0","value":"csrf"}"#).unwrap();
        assert_eq!(cookie.key, "ct0");
        assert!(!cookie.secure);
        assert!(cookie.domain.is_none());
    }

    #[test]
    fn test_tweet_options_serialization() {
        let options = TweetOptions {
            content_type: "tutorialContent".to_string(),
            has_media: true,
            scheduled: false,
        };
        let json = serde_json::to_string(&options).unwrap();
        assert!(json.contains("\"contentType\":\"tutorialContent\""));
        assert!(json.contains("\"hasMedia\":true"));
    }

    #[test]
    fn test_missing_credentials_name_the_variable() {
        let config = AppConfig {
            twitter_username: None,
            twitter_password: Some("secret".to_string()),
            twitter_email: None,
            gemini_api_key: None,
        };
        let err = config.twitter_credentials().unwrap_err();
        assert!(err.to_string().contains("TWITTER_USERNAME"));
    }
}
