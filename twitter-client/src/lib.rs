pub mod api;
pub mod grok;
pub mod response;
pub mod session;

pub use api::{MediaUpload, TweetStats};
pub use grok::GrokChat;
pub use response::find_tweet_id;
pub use session::TwitterSession;
