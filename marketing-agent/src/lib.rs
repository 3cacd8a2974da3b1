pub mod agent;
pub mod posting;
pub mod store;

pub use agent::{MarketingAgent, PerformanceReport, TestModeResult, TweetPerformance};
pub use posting::{post_with_length_retry, truncate_for_retry, TRUNCATED_TWEET_LEN};
pub use store::{SessionStore, TweetLogStore};
