pub mod config;
pub mod service;

pub use config::{ConfigStore, SchedulerConfig};
pub use service::{next_fire_after, MarketingScheduler};
