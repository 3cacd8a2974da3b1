use crate::session::TwitterSession;
use base64::Engine;
use marketeer_core::{CoreError, TwitterApiError};
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, error, info};

const CREATE_TWEET_URL: &str = "https://api.x.com/graphql/a1p9RWpkYKBjWv_I3WzS-A/CreateTweet";
const MEDIA_UPLOAD_URL: &str = "https://upload.twitter.com/1.1/media/upload.json";
const TRENDS_URL: &str = "https://api.x.com/1.1/trends/place.json?id=1";
const TWEET_SHOW_URL: &str = "https://api.x.com/1.1/statuses/show.json";

/// Media attached to a tweet.
#[derive(Debug, Clone)]
pub struct MediaUpload {
    pub data: Vec<u8>,
    pub mime_type: String,
}

/// Engagement counters for one tweet.
#[derive(Debug, Clone, Copy, Default)]
pub struct TweetStats {
    pub likes: u64,
    pub retweets: u64,
}

impl TweetStats {
    pub fn engagement(&self) -> u64 {
        self.likes + self.retweets
    }
}

impl TwitterSession {
    /// Posts a tweet, optionally as a reply and with uploaded media.
    ///
    /// Returns the raw response JSON: the top-level shape is not
    /// contractually fixed, so callers resolve the tweet ID themselves
    /// (see [`crate::response::find_tweet_id`]).
    pub async fn send_tweet(
        &self,
        text: &str,
        reply_to: Option<&str>,
        media: Option<&[MediaUpload]>,
    ) -> Result<Value, CoreError> {
        let mut media_ids = Vec::new();
        if let Some(media) = media {
            for upload in media {
                media_ids.push(self.upload_media(upload).await?);
            }
        }

        let mut variables = json!({
            "tweet_text": text,
            "dark_request": false,
            "media": {
                "media_entities": media_ids
                    .iter()
                    .map(|id| json!({ "media_id": id, "tagged_users": [] }))
                    .collect::<Vec<_>>(),
                "possibly_sensitive": false
            },
            "semantic_annotation_ids": []
        });
        if let Some(reply_to) = reply_to {
            variables["reply"] = json!({
                "in_reply_to_tweet_id": reply_to,
                "exclude_reply_user_ids": []
            });
        }

        let body = json!({
            "variables": variables,
            "features": {
                "interactive_text_enabled": true,
                "longform_notetweets_inline_media_enabled": false,
                "responsive_web_edit_tweet_api_enabled": true,
                "tweet_awards_web_tipping_enabled": false,
                "creator_subscriptions_tweet_preview_api_enabled": true,
                "longform_notetweets_rich_text_read_enabled": false,
                "freedom_of_speech_not_reach_fetch_enabled": true,
                "standardized_nudges_misinfo": true,
                "responsive_web_graphql_timeline_navigation_enabled": true,
                "responsive_web_enhance_cards_enabled": false,
                "verified_phone_label_enabled": false,
                "view_counts_everywhere_api_enabled": true
            },
            "queryId": "a1p9RWpkYKBjWv_I3WzS-A"
        });

        info!("Posting tweet ({} chars, {} media)", text.len(), media_ids.len());
        let response = self.request(Method::POST, CREATE_TWEET_URL, Some(body)).await?;

        // GraphQL reports rejections inside a 200 body.
        if let Some(platform_error) = first_platform_error(&response) {
            error!("Tweet rejected: {:?}", platform_error);
            return Err(CoreError::TwitterApi(TwitterApiError::PostRejected {
                message: platform_error.0,
                code: platform_error.1,
            }));
        }

        Ok(response)
    }

    /// Uploads one media payload as base64 form data, returns the media ID.
    pub async fn upload_media(&self, upload: &MediaUpload) -> Result<String, CoreError> {
        let mut headers = reqwest::header::HeaderMap::new();
        self.install_headers(&mut headers).await?;

        let encoded = base64::engine::general_purpose::STANDARD.encode(&upload.data);
        debug!(
            "Uploading {} bytes of {} media",
            upload.data.len(),
            upload.mime_type
        );

        let response = self
            .client
            .post(MEDIA_UPLOAD_URL)
            .headers(headers)
            .form(&[("media_data", encoded.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(CoreError::TwitterApi(TwitterApiError::MediaUploadFailed {
                details: format!("upload returned status {}", status),
            }));
        }

        let body: Value = response.json().await.map_err(|_| {
            CoreError::TwitterApi(TwitterApiError::MediaUploadFailed {
                details: "unparseable upload response".to_string(),
            })
        })?;

        body.get("media_id_string")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| {
                CoreError::TwitterApi(TwitterApiError::MediaUploadFailed {
                    details: "no media_id_string in upload response".to_string(),
                })
            })
    }

    /// Current worldwide trend names, at most `count`.
    pub async fn trends(&self, count: usize) -> Result<Vec<String>, CoreError> {
        let response = self.request(Method::GET, TRENDS_URL, None).await?;

        let trends = response
            .pointer("/0/trends")
            .and_then(|v| v.as_array())
            .ok_or_else(|| {
                CoreError::TwitterApi(TwitterApiError::InvalidResponse {
                    details: "no trends array in response".to_string(),
                })
            })?;

        Ok(trends
            .iter()
            .filter_map(|t| t.get("name").and_then(|n| n.as_str()))
            .take(count)
            .map(|s| s.to_string())
            .collect())
    }

    /// Engagement counters for a posted tweet, used by the analyze command.
    pub async fn tweet_stats(&self, tweet_id: &str) -> Result<TweetStats, CoreError> {
        let url = format!("{}?id={}", TWEET_SHOW_URL, tweet_id);
        let response = self.request(Method::GET, &url, None).await?;

        Ok(TweetStats {
            likes: response
                .get("favorite_count")
                .and_then(|v| v.as_u64())
                .unwrap_or(0),
            retweets: response
                .get("retweet_count")
                .and_then(|v| v.as_u64())
                .unwrap_or(0),
        })
    }
}

/// First entry of a GraphQL `errors` array, as (message, code).
fn first_platform_error(response: &Value) -> Option<(String, Option<i64>)> {
    let error = response.get("errors")?.as_array()?.first()?;
    let message = error
        .get("message")
        .and_then(|m| m.as_str())
        .unwrap_or("unknown platform error")
        .to_string();
    let code = error.get("code").and_then(|c| c.as_i64());
    Some((message, code))
}
