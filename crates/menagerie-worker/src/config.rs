//! Environment configuration for the worker service.
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `DATABASE_URL` | (unset) | PostgreSQL URL; unset keeps jobs in memory |
//! | `WORKER_POLL_INTERVAL` | `1.0` | Seconds between ticks |
//! | `JOB_MAX_CONCURRENT` | `4` | Jobs executing at once per tick |
//! | `JOB_TIMEOUT_SECS` | `300` | Provider call timeout |
//! | `MIN_IMAGES_PER_JOB` | `1` | Smallest accepted request |
//! | `MAX_IMAGES_PER_JOB` | `10` | Largest accepted request |
//! | `IMAGE_PROVIDER` | `mock` | `mock`, `openrouter`, or `openai` |
//! | `IMAGE_MODEL` | provider default | Image generation model |
//! | `IMAGE_TIMEOUT` | `60` | HTTP timeout in seconds |
//! | `IMAGE_PROVIDER_DELAY` | `2.0` | Mock latency per image in seconds |
//! | `VISION_MODEL` | provider default | Classification model |
//! | `OPENROUTER_API_KEY` | | OpenRouter key |
//! | `OPENROUTER_SITE_URL` | | Sent as `HTTP-Referer` |
//! | `OPENROUTER_SITE_NAME` | | Sent as `X-Title` |
//! | `OPENAI_API_KEY` | | OpenAI key |

use std::str::FromStr;
use std::time::Duration;

use menagerie_core::defaults::{
    IMAGE_TIMEOUT_SECS, JOB_MAX_CONCURRENT, JOB_TIMEOUT_SECS, MAX_IMAGES_PER_JOB,
    MIN_IMAGES_PER_JOB, MOCK_PROVIDER_DELAY_SECS,
};
use menagerie_core::{Error, Result};
use menagerie_inference::{ProviderKind, ProviderSettings};
use menagerie_jobs::{JobBounds, WorkerConfig};

/// Fully validated service configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: Option<String>,
    pub worker: WorkerConfig,
    pub bounds: JobBounds,
    pub provider: ProviderSettings,
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let poll_secs: f64 = parse_or(&get, "WORKER_POLL_INTERVAL", 1.0)?;
        if !(poll_secs.is_finite() && poll_secs > 0.0) {
            return Err(invalid("WORKER_POLL_INTERVAL", "must be greater than 0"));
        }

        let max_concurrent: usize = parse_or(&get, "JOB_MAX_CONCURRENT", JOB_MAX_CONCURRENT)?;
        if max_concurrent == 0 {
            return Err(invalid("JOB_MAX_CONCURRENT", "must be at least 1"));
        }

        let job_timeout: u64 = parse_or(&get, "JOB_TIMEOUT_SECS", JOB_TIMEOUT_SECS)?;
        if job_timeout == 0 {
            return Err(invalid("JOB_TIMEOUT_SECS", "must be greater than 0"));
        }

        let worker = WorkerConfig::default()
            .with_poll_interval(((poll_secs * 1000.0).round() as u64).max(1))
            .with_max_concurrent(max_concurrent)
            .with_job_timeout(job_timeout);

        let bounds = JobBounds::new(
            parse_or(&get, "MIN_IMAGES_PER_JOB", MIN_IMAGES_PER_JOB)?,
            parse_or(&get, "MAX_IMAGES_PER_JOB", MAX_IMAGES_PER_JOB)?,
        )?;

        let kind = match get("IMAGE_PROVIDER") {
            Some(raw) => raw.parse::<ProviderKind>()?,
            None => ProviderKind::Mock,
        };

        let mock_delay: f64 = parse_or(&get, "IMAGE_PROVIDER_DELAY", MOCK_PROVIDER_DELAY_SECS)?;
        let mock_delay = Duration::try_from_secs_f64(mock_delay).map_err(|_| {
            invalid(
                "IMAGE_PROVIDER_DELAY",
                "must be a non-negative number of seconds within range",
            )
        })?;

        let timeout_seconds: u64 = parse_or(&get, "IMAGE_TIMEOUT", IMAGE_TIMEOUT_SECS)?;
        if timeout_seconds == 0 {
            return Err(invalid("IMAGE_TIMEOUT", "must be greater than 0"));
        }

        let api_key = match kind {
            ProviderKind::Mock => None,
            ProviderKind::OpenRouter => get("OPENROUTER_API_KEY"),
            ProviderKind::OpenAI => get("OPENAI_API_KEY"),
        };

        let provider = ProviderSettings {
            kind,
            api_key,
            image_model: get("IMAGE_MODEL"),
            vision_model: get("VISION_MODEL"),
            timeout_seconds,
            mock_delay,
            site_url: get("OPENROUTER_SITE_URL"),
            site_name: get("OPENROUTER_SITE_NAME"),
            ..ProviderSettings::default()
        };

        Ok(Self {
            database_url: get("DATABASE_URL"),
            worker,
            bounds,
            provider,
        })
    }
}

fn invalid(key: &str, reason: &str) -> Error {
    Error::Config(format!("{} {}", key, reason))
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| Error::Config(format!("Invalid value for {}: {}", key, raw))),
        None => Ok(default),
    }
}
