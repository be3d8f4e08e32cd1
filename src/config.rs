use std::env;
use std::num::NonZeroU32;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use governor::Quota;

#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: String,
    pub port: u16,

    // Unset means the in-memory store
    pub data_dir: Option<PathBuf>,

    // Live overlay
    pub live_data_ttl_secs: u64,
    pub repoll_interval_secs: u64,
    pub live_fetch_timeout_secs: u64,

    // Manual refresh rate limiting
    pub refresh_period_secs: u64,
    pub refresh_burst_limit: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            port: 8080,
            data_dir: None,
            live_data_ttl_secs: 60,
            repoll_interval_secs: 60,
            live_fetch_timeout_secs: 10,
            refresh_period_secs: 5,
            refresh_burst_limit: 3,
        }
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            bind_address: env_or("BIND_ADDRESS", defaults.bind_address),
            port: env_or("PORT", defaults.port),
            data_dir: env::var("DATA_DIR")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
            live_data_ttl_secs: env_or("LIVE_DATA_TTL_SECS", defaults.live_data_ttl_secs),
            repoll_interval_secs: env_or("REPOLL_INTERVAL_SECS", defaults.repoll_interval_secs),
            live_fetch_timeout_secs: env_or(
                "LIVE_FETCH_TIMEOUT_SECS",
                defaults.live_fetch_timeout_secs,
            ),
            refresh_period_secs: env_or("REFRESH_PERIOD_SECS", defaults.refresh_period_secs),
            refresh_burst_limit: env_or("REFRESH_BURST_LIMIT", defaults.refresh_burst_limit),
        }
    }

    pub fn bind(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    pub fn live_data_ttl(&self) -> Duration {
        Duration::from_secs(self.live_data_ttl_secs)
    }

    pub fn repoll_interval(&self) -> Duration {
        Duration::from_secs(self.repoll_interval_secs.max(1))
    }

    pub fn live_fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.live_fetch_timeout_secs.max(1))
    }

    pub fn refresh_quota(&self) -> Quota {
        let burst = NonZeroU32::new(self.refresh_burst_limit).unwrap_or(NonZeroU32::MIN);
        Quota::with_period(Duration::from_secs(self.refresh_period_secs.max(1)))
            .unwrap_or_else(|| Quota::per_second(NonZeroU32::MIN))
            .allow_burst(burst)
    }
}
