use crate::config::{ConfigStore, SchedulerConfig};
use chrono::{Duration as ChronoDuration, Local, NaiveDateTime, SecondsFormat, Utc};
use marketeer_core::CoreError;
use marketing_agent::MarketingAgent;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

/// Drives the timed posting loop: sleep until the next configured
/// wall-clock time, post, update `lastRun`, repeat.
pub struct MarketingScheduler {
    agent: MarketingAgent,
    store: ConfigStore,
    /// Serializes runs; an overlapping trigger is skipped, not queued.
    run_guard: Mutex<()>,
}

impl MarketingScheduler {
    pub fn new(agent: MarketingAgent) -> Self {
        Self {
            agent,
            store: ConfigStore::default(),
            run_guard: Mutex::new(()),
        }
    }

    /// Overrides the config file location. Used in tests.
    pub fn with_store(mut self, store: ConfigStore) -> Self {
        self.store = store;
        self
    }

    /// Runs forever (until the process is stopped), posting at the
    /// configured times. `post_now` fires one immediate post first.
    pub async fn run(&self, post_now: bool) -> Result<(), CoreError> {
        let mut config = self.store.load_or_create()?;

        if !config.enabled {
            info!("Automatic posting is disabled in the scheduler config");
            return Ok(());
        }

        let times = config.effective_times();
        if times.is_empty() && !post_now {
            warn!("No valid scheduled times configured, nothing to do");
            return Ok(());
        }
        info!(
            "Scheduler active with {} posting time(s) per day",
            times.len()
        );

        if post_now {
            info!("Immediate post requested");
            self.fire(&mut config).await;
        }

        loop {
            let times = config.effective_times();
            if times.is_empty() {
                warn!("No valid scheduled times left, stopping");
                return Ok(());
            }

            let now = Local::now().naive_local();
            let next = next_fire_after(&times, now);
            let wait = (next - now).num_seconds().max(1) as u64;
            info!("Next scheduled post at {}", next.format("%Y-%m-%d %H:%M"));

            tokio::time::sleep(std::time::Duration::from_secs(wait)).await;
            self.fire(&mut config).await;
        }
    }

    /// One scheduled post. Failures are logged and the loop carries on;
    /// a still-running previous post makes this trigger a no-op.
    async fn fire(&self, config: &mut SchedulerConfig) {
        let Ok(_guard) = self.run_guard.try_lock() else {
            warn!("Previous scheduled post still running, skipping this trigger");
            return;
        };

        match self.agent.post_tweet(None, true).await {
            Ok(record) => {
                info!("Scheduled tweet {} posted", record.id);
                config.last_run = Some(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true));
                if let Err(e) = self.store.save(config) {
                    warn!("Could not persist lastRun: {}", e);
                }
            }
            Err(e) => error!("Scheduled post failed: {}", e),
        }
    }
}

/// The next wall-clock instant strictly after `now` matching one of the
/// `[hour, minute]` pairs. All times already today having passed, the
/// earliest time tomorrow wins.
pub fn next_fire_after(times: &[(u32, u32)], now: NaiveDateTime) -> NaiveDateTime {
    debug_assert!(!times.is_empty());

    let today = now.date();
    let mut candidates: Vec<NaiveDateTime> = times
        .iter()
        .filter_map(|&(hour, minute)| today.and_hms_opt(hour, minute, 0))
        .collect();
    candidates.sort();

    candidates
        .iter()
        .find(|&&t| t > now)
        .copied()
        .unwrap_or_else(|| candidates[0] + ChronoDuration::days(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 15)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    #[test]
    fn test_next_fire_before_first_time() {
        let times = [(16, 30), (20, 0)];
        assert_eq!(next_fire_after(&times, at(9, 0)), at(16, 30));
    }

    #[test]
    fn test_next_fire_between_times() {
        let times = [(16, 30), (20, 0)];
        assert_eq!(next_fire_after(&times, at(17, 0)), at(20, 0));
    }

    #[test]
    fn test_next_fire_rolls_over_to_tomorrow() {
        let times = [(16, 30), (20, 0)];
        let next = next_fire_after(&times, at(21, 0));
        assert_eq!(
            next,
            NaiveDate::from_ymd_opt(2025, 6, 16)
                .unwrap()
                .and_hms_opt(16, 30, 0)
                .unwrap()
        );
    }

    #[test]
    fn test_next_fire_is_strictly_after_now() {
        // Firing exactly at a configured time must not reschedule the same
        // instant again.
        let times = [(16, 30)];
        let next = next_fire_after(&times, at(16, 30));
        assert!(next > at(16, 30));
    }

    #[test]
    fn test_next_fire_with_unsorted_times() {
        let times = [(20, 0), (8, 15)];
        assert_eq!(next_fire_after(&times, at(6, 0)), at(8, 15));
    }
}
