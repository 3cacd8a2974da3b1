use crate::posting::post_with_length_retry;
use crate::store::{SessionStore, TweetLogStore};
use chrono::{SecondsFormat, Utc};
use content_engine::{render_pillar_tweet, ContentExtractor, ContentFields, Pillar};
use image_generator::{GeneratedImage, ImageGenerator};
use llm_interface::{ChatCapability, ChatMessage};
use marketeer_core::{
    AppConfig, ConfigError, CoreError, PostedTweet, TweetOptions, TwitterApiError,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};
use twitter_client::{find_tweet_id, MediaUpload, TwitterSession};

/// The orchestrator: owns the session, the persisted stores and the image
/// backend, and runs the compose, enrich, post, log pipeline.
pub struct MarketingAgent {
    config: AppConfig,
    session: Arc<TwitterSession>,
    cookie_store: SessionStore,
    tweet_log: TweetLogStore,
    image_generator: Option<ImageGenerator>,
    chat: Option<Arc<dyn ChatCapability>>,
    extractor: ContentExtractor,
}

/// One tweet's engagement in the analyze report.
#[derive(Debug, Clone)]
pub struct TweetPerformance {
    pub id: String,
    pub text: String,
    pub content_type: String,
    pub likes: u64,
    pub retweets: u64,
}

impl TweetPerformance {
    pub fn engagement(&self) -> u64 {
        self.likes + self.retweets
    }
}

/// Aggregated analyze output: per-tweet stats, the best performer and the
/// average engagement per content pillar.
#[derive(Debug, Clone, Default)]
pub struct PerformanceReport {
    pub tweets: Vec<TweetPerformance>,
    pub best: Option<TweetPerformance>,
    pub pillar_averages: Vec<(String, f64)>,
}

impl PerformanceReport {
    pub fn build(tweets: Vec<TweetPerformance>) -> Self {
        let best = tweets
            .iter()
            .max_by_key(|t| t.engagement())
            .cloned();

        let mut sums: HashMap<String, (u64, u64)> = HashMap::new();
        for tweet in &tweets {
            let entry = sums.entry(tweet.content_type.clone()).or_default();
            entry.0 += tweet.engagement();
            entry.1 += 1;
        }
        let mut pillar_averages: Vec<(String, f64)> = sums
            .into_iter()
            .map(|(pillar, (total, count))| (pillar, total as f64 / count as f64))
            .collect();
        pillar_averages.sort_by(|a, b| b.1.total_cmp(&a.1));

        Self {
            tweets,
            best,
            pillar_averages,
        }
    }
}

/// One generated sample in test mode.
#[derive(Debug, Clone)]
pub struct TestModeResult {
    pub pillar: Pillar,
    pub text: String,
    pub posted_id: Option<String>,
}

impl MarketingAgent {
    pub fn new(config: AppConfig) -> Result<Self, CoreError> {
        let session = Arc::new(TwitterSession::new()?);

        let image_generator = match config.gemini_api_key() {
            Ok(key) => Some(ImageGenerator::new(key)?),
            Err(e) => {
                warn!("Image generation disabled: {}", e);
                None
            }
        };

        Ok(Self {
            config,
            session,
            cookie_store: SessionStore::default(),
            tweet_log: TweetLogStore::default(),
            image_generator,
            chat: None,
            extractor: ContentExtractor::new(),
        })
    }

    /// Overrides the store locations. Used in tests.
    pub fn with_stores(mut self, cookie_store: SessionStore, tweet_log: TweetLogStore) -> Self {
        self.cookie_store = cookie_store;
        self.tweet_log = tweet_log;
        self
    }

    /// Overrides the chat capability. Used in tests.
    pub fn with_chat(mut self, chat: Option<Arc<dyn ChatCapability>>) -> Self {
        self.chat = chat;
        self
    }

    /// Establishes an authenticated session: persisted cookies first,
    /// credential login as the fallback. Fatal when neither works.
    pub async fn init(&mut self) -> Result<(), CoreError> {
        match self.cookie_store.load() {
            Some(cookies) => {
                self.session.set_cookies(cookies).await;
                if self.session.is_logged_in().await.unwrap_or(false) {
                    info!("Session restored from cookie file");
                } else {
                    warn!("Persisted cookies are stale, logging in with credentials");
                    self.credential_login().await?;
                }
            }
            None => self.credential_login().await?,
        }

        self.chat = self.session.chat_capability().await;
        if self.chat.is_none() {
            info!("No chat capability on this session, composing from templates");
        }
        Ok(())
    }

    async fn credential_login(&self) -> Result<(), CoreError> {
        let (username, password, email) = self.config.twitter_credentials()?;
        self.session
            .login(&username, &password, email.as_deref())
            .await?;
        self.cookie_store.save(&self.session.cookies().await)?;
        Ok(())
    }

    /// Composes tweet text for a pillar: the chat capability when present,
    /// falling back transparently to template rendering on any failure.
    pub async fn compose_tweet(&self, pillar: Pillar) -> String {
        if let Some(chat) = &self.chat {
            let example = render_pillar_tweet(pillar, &mut rand::thread_rng());
            let messages = [
                ChatMessage::system(
                    "You write short, punchy marketing tweets for an AI photo editor app. \
                     Stay under 280 characters and put hashtags on the last line.",
                ),
                ChatMessage::user(format!(
                    "Write one tweet for our '{}' content pillar. House style example:\n{}",
                    pillar.display_name(),
                    example
                )),
            ];
            match chat.chat(&messages).await {
                Ok(reply) if !reply.message.trim().is_empty() => {
                    info!("Composed via {} chat", chat.provider());
                    return reply.message.trim().to_string();
                }
                Ok(_) => warn!("Empty reply from {}, using a template", chat.provider()),
                Err(e) => warn!("Chat compose failed ({}), using a template", e),
            }
        }

        render_pillar_tweet(pillar, &mut rand::thread_rng())
    }

    /// Runs the whole pipeline for one post. `category` forces a pillar;
    /// otherwise the day of week decides.
    pub async fn post_tweet(
        &self,
        category: Option<Pillar>,
        scheduled: bool,
    ) -> Result<PostedTweet, CoreError> {
        let pillar = category.unwrap_or_else(|| {
            Pillar::for_date(Utc::now().date_naive(), &mut rand::thread_rng())
        });
        info!("Posting for pillar: {}", pillar);

        let text = self.compose_tweet(pillar).await;
        self.publish(pillar, text, scheduled).await
    }

    /// Posts already-composed text: extract fields, attach media when
    /// possible, send with the single length retry, log on success.
    async fn publish(
        &self,
        pillar: Pillar,
        text: String,
        scheduled: bool,
    ) -> Result<PostedTweet, CoreError> {
        let content = self.extractor.extract(pillar, &text);
        let media = self.tweet_media(pillar, &content).await;
        let has_media = media.is_some();

        let session = Arc::clone(&self.session);
        let (response, posted_text) = post_with_length_retry(text, |t| {
            let session = Arc::clone(&session);
            let media = media.clone();
            async move {
                session
                    .send_tweet(&t, None, media.as_ref().map(std::slice::from_ref))
                    .await
            }
        })
        .await?;

        let id = find_tweet_id(&response)
            .ok_or(CoreError::TwitterApi(TwitterApiError::MissingTweetId))?;

        let options = TweetOptions {
            content_type: pillar.key().to_string(),
            has_media,
            scheduled,
        };
        let record = PostedTweet {
            id,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            text: posted_text,
            options: serde_json::to_string(&options)?,
        };
        self.tweet_log.append(record.clone())?;
        info!("Tweet {} posted and logged", record.id);
        Ok(record)
    }

    /// Best-effort media for a tweet: generated image, then the bundled
    /// placeholder, then none at all. Never fails the post.
    async fn tweet_media(&self, pillar: Pillar, content: &ContentFields) -> Option<MediaUpload> {
        let generator = self.image_generator.as_ref()?;

        match generator.generate_for_tweet(pillar, content).await {
            Ok(image) => Some(into_media(image)),
            Err(e) => {
                warn!("Image generation failed: {}", e);
                match generator.placeholder_image() {
                    Ok(image) => Some(into_media(image)),
                    Err(e) => {
                        warn!("No placeholder either, posting without media: {}", e);
                        None
                    }
                }
            }
        }
    }

    pub async fn get_popular_trends(&self, count: usize) -> Result<Vec<String>, CoreError> {
        self.session.trends(count).await
    }

    /// Fetches live stats for the most recent `count` logged tweets and
    /// aggregates them. Stats lookups that fail count as zero engagement.
    pub async fn analyze_performance(&self, count: usize) -> Result<PerformanceReport, CoreError> {
        let log = self.tweet_log.load();
        if log.is_empty() {
            info!("Tweet log is empty, nothing to analyze");
            return Ok(PerformanceReport::default());
        }

        let recent = &log[log.len().saturating_sub(count)..];
        let mut entries = Vec::with_capacity(recent.len());
        for tweet in recent {
            let stats = match self.session.tweet_stats(&tweet.id).await {
                Ok(stats) => stats,
                Err(e) => {
                    warn!("No stats for tweet {}: {}", tweet.id, e);
                    Default::default()
                }
            };
            let content_type = serde_json::from_str::<TweetOptions>(&tweet.options)
                .map(|o| o.content_type)
                .unwrap_or_else(|_| "unknown".to_string());
            entries.push(TweetPerformance {
                id: tweet.id.clone(),
                text: tweet.text.clone(),
                content_type,
                likes: stats.likes,
                retweets: stats.retweets,
            });
        }

        Ok(PerformanceReport::build(entries))
    }

    /// Generates two sample tweets per pillar, optionally publishing them.
    /// Individual publish failures are reported in the results, not fatal.
    pub async fn run_test_mode(&self, publish: bool) -> Result<Vec<TestModeResult>, CoreError> {
        let mut results = Vec::new();
        for pillar in Pillar::ALL {
            for _ in 0..2 {
                let text = self.compose_tweet(pillar).await;
                let posted_id = if publish {
                    match self.publish(pillar, text.clone(), false).await {
                        Ok(record) => Some(record.id),
                        Err(e) => {
                            warn!("Test post for {} failed: {}", pillar, e);
                            None
                        }
                    }
                } else {
                    None
                };
                results.push(TestModeResult {
                    pillar,
                    text,
                    posted_id,
                });
            }
        }
        Ok(results)
    }

    /// Standalone image generation; works without a logged-in session.
    pub async fn generate_image(&self, prompt: &str) -> Result<GeneratedImage, CoreError> {
        let generator = self.image_generator.as_ref().ok_or_else(|| {
            CoreError::Config(ConfigError::MissingEnvironmentVariable {
                var_name: "GEMINI_API_KEY".to_string(),
            })
        })?;
        generator.generate(prompt).await
    }

    pub fn session(&self) -> &Arc<TwitterSession> {
        &self.session
    }
}

fn into_media(image: GeneratedImage) -> MediaUpload {
    MediaUpload {
        data: image.bytes,
        mime_type: image.media_type,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use content_engine::PRIMARY_HASHTAGS;
    use llm_interface::ChatReply;
    use marketeer_core::LlmError;

    fn offline_config() -> AppConfig {
        AppConfig {
            twitter_username: None,
            twitter_password: None,
            twitter_email: None,
            gemini_api_key: None,
        }
    }

    struct CannedChat {
        reply: Result<String, ()>,
    }

    #[async_trait]
    impl ChatCapability for CannedChat {
        fn provider(&self) -> &str {
            "canned"
        }

        async fn chat(&self, _messages: &[ChatMessage]) -> Result<ChatReply, CoreError> {
            match &self.reply {
                Ok(message) => Ok(ChatReply {
                    message: message.clone(),
                }),
                Err(()) => Err(CoreError::Llm(LlmError::ServiceUnavailable {
                    provider: "canned".to_string(),
                })),
            }
        }
    }

    #[tokio::test]
    async fn test_compose_without_chat_renders_template_with_hashtags() {
        let agent = MarketingAgent::new(offline_config()).unwrap();
        let text = agent.compose_tweet(Pillar::TutorialContent).await;

        let hashtag_line = text.lines().last().unwrap();
        let tags: Vec<&str> = hashtag_line.split_whitespace().collect();
        assert_eq!(tags.len(), 5);
        for primary in PRIMARY_HASHTAGS {
            assert!(tags.contains(&primary));
        }
    }

    #[tokio::test]
    async fn test_compose_uses_chat_reply_when_present() {
        let agent = MarketingAgent::new(offline_config())
            .unwrap()
            .with_chat(Some(Arc::new(CannedChat {
                reply: Ok("  A crisp tweet from the model  ".to_string()),
            })));

        let text = agent.compose_tweet(Pillar::ProductUpdates).await;
        assert_eq!(text, "A crisp tweet from the model");
    }

    #[tokio::test]
    async fn test_compose_falls_back_on_chat_failure() {
        let agent = MarketingAgent::new(offline_config())
            .unwrap()
            .with_chat(Some(Arc::new(CannedChat { reply: Err(()) })));

        let text = agent.compose_tweet(Pillar::CommunityEngagement).await;
        assert!(text.contains('#'));
        assert!(!text.is_empty());
    }

    #[tokio::test]
    async fn test_compose_falls_back_on_empty_reply() {
        let agent = MarketingAgent::new(offline_config())
            .unwrap()
            .with_chat(Some(Arc::new(CannedChat {
                reply: Ok("   ".to_string()),
            })));

        let text = agent.compose_tweet(Pillar::IndustryContent).await;
        assert!(text.contains('#'));
    }

    #[test]
    fn test_performance_report_aggregates_per_pillar() {
        let entries = vec![
            TweetPerformance {
                id: "1".to_string(),
                text: "a".to_string(),
                content_type: "productUpdates".to_string(),
                likes: 10,
                retweets: 0,
            },
            TweetPerformance {
                id: "2".to_string(),
                text: "b".to_string(),
                content_type: "productUpdates".to_string(),
                likes: 20,
                retweets: 10,
            },
            TweetPerformance {
                id: "3".to_string(),
                text: "c".to_string(),
                content_type: "tutorialContent".to_string(),
                likes: 5,
                retweets: 0,
            },
        ];

        let report = PerformanceReport::build(entries);
        assert_eq!(report.best.as_ref().unwrap().id, "2");
        assert_eq!(report.pillar_averages[0], ("productUpdates".to_string(), 20.0));
        assert_eq!(report.pillar_averages[1], ("tutorialContent".to_string(), 5.0));
    }

    #[test]
    fn test_performance_report_empty() {
        let report = PerformanceReport::build(Vec::new());
        assert!(report.best.is_none());
        assert!(report.pillar_averages.is_empty());
        assert!(report.tweets.is_empty());
    }
}
