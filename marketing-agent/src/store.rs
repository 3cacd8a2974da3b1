use chrono::{SecondsFormat, Utc};
use marketeer_core::{CoreError, PostedTweet, SessionCookie};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const COOKIE_FILE: &str = "cookies.json";
const COOKIE_BACKUP_DIR: &str = "cookie-backups";
const TWEET_LOG_FILE: &str = "posted-tweets.json";

/// Persists the session cookie jar as a flat JSON file, with a timestamped
/// backup copy written on every save.
pub struct SessionStore {
    path: PathBuf,
    backup_dir: PathBuf,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(COOKIE_FILE, COOKIE_BACKUP_DIR)
    }
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>, backup_dir: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            backup_dir: backup_dir.into(),
        }
    }

    /// Loads the persisted cookies. A missing, unreadable, malformed or
    /// empty file all count as "no cookies": the caller falls back to
    /// credential login.
    pub fn load(&self) -> Option<Vec<SessionCookie>> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) => {
                debug!("No cookie file at {}: {}", self.path.display(), e);
                return None;
            }
        };

        match serde_json::from_str::<Vec<SessionCookie>>(&raw) {
            Ok(cookies) if cookies.is_empty() => {
                warn!("Cookie file {} is empty", self.path.display());
                None
            }
            Ok(cookies) => {
                info!("Loaded {} cookies from {}", cookies.len(), self.path.display());
                Some(cookies)
            }
            Err(e) => {
                warn!("Cookie file {} is malformed, ignoring: {}", self.path.display(), e);
                None
            }
        }
    }

    /// Writes the cookie jar and drops a timestamped backup copy. Backup
    /// failures are logged, never fatal.
    pub fn save(&self, cookies: &[SessionCookie]) -> Result<(), CoreError> {
        let json = serde_json::to_string_pretty(cookies)?;
        std::fs::write(&self.path, &json)?;
        info!("Saved {} cookies to {}", cookies.len(), self.path.display());

        if let Err(e) = self.write_backup(&json) {
            warn!("Could not write cookie backup: {}", e);
        }
        Ok(())
    }

    fn write_backup(&self, json: &str) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.backup_dir)?;
        // Colons are not valid in filenames everywhere.
        let timestamp = Utc::now()
            .to_rfc3339_opts(SecondsFormat::Millis, true)
            .replace(':', "-");
        let backup = self.backup_dir.join(format!("cookies-{}.json", timestamp));
        std::fs::write(&backup, json)?;
        debug!("Cookie backup written to {}", backup.display());
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Append-only log of posted tweets, rewritten wholesale on each append.
pub struct TweetLogStore {
    path: PathBuf,
}

impl Default for TweetLogStore {
    fn default() -> Self {
        Self::new(TWEET_LOG_FILE)
    }
}

impl TweetLogStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Loads the full log. Missing or malformed files yield an empty log.
    pub fn load(&self) -> Vec<PostedTweet> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(_) => return Vec::new(),
        };

        match serde_json::from_str(&raw) {
            Ok(tweets) => tweets,
            Err(e) => {
                warn!(
                    "Tweet log {} is malformed, starting fresh: {}",
                    self.path.display(),
                    e
                );
                Vec::new()
            }
        }
    }

    pub fn append(&self, tweet: PostedTweet) -> Result<(), CoreError> {
        let mut tweets = self.load();
        tweets.push(tweet);
        let json = serde_json::to_string_pretty(&tweets)?;
        std::fs::write(&self.path, json)?;
        debug!("Tweet log now holds {} entries", tweets.len());
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
