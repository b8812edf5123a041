//! Tracker settings resolution: defaults, then an optional RON file, then
//! command-line overrides.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use jobwatch_engine::TrackerSettings;
use jobwatch_logging::watch_info;
use serde::Deserialize;

/// Looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "jobwatch.ron";

/// On-disk settings. Every field is optional; anything missing keeps its
/// default.
///
/// `max_poll_attempts: Some(0)` removes the attempt cap.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub api_base_url: Option<String>,
    pub record_store_url: Option<String>,
    pub record_store_key: Option<String>,
    pub poll_interval_secs: Option<u64>,
    pub max_poll_attempts: Option<u32>,
    pub connect_timeout_secs: Option<u64>,
    pub request_timeout_secs: Option<u64>,
    pub stream_idle_timeout_secs: Option<u64>,
}

/// Values given on the command line or through the environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub api_base_url: Option<String>,
    pub record_store_url: Option<String>,
    pub record_store_key: Option<String>,
    pub poll_interval_secs: Option<u64>,
    pub max_poll_attempts: Option<u32>,
}

impl FileConfig {
    fn apply(self, settings: &mut TrackerSettings) {
        if let Some(url) = self.api_base_url {
            settings.api_base_url = url;
        }
        if let Some(url) = self.record_store_url {
            settings.record_store_url = url;
        }
        if let Some(key) = self.record_store_key {
            settings.record_store_key = key;
        }
        if let Some(secs) = self.poll_interval_secs {
            settings.poll_interval = Duration::from_secs(secs);
        }
        if let Some(max) = self.max_poll_attempts {
            settings.max_poll_attempts = attempt_cap(max);
        }
        if let Some(secs) = self.connect_timeout_secs {
            settings.connect_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = self.request_timeout_secs {
            settings.request_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = self.stream_idle_timeout_secs {
            settings.stream_idle_timeout = Duration::from_secs(secs);
        }
    }
}

impl Overrides {
    fn apply(self, settings: &mut TrackerSettings) {
        if let Some(url) = self.api_base_url {
            settings.api_base_url = url;
        }
        if let Some(url) = self.record_store_url {
            settings.record_store_url = url;
        }
        if let Some(key) = self.record_store_key {
            settings.record_store_key = key;
        }
        if let Some(secs) = self.poll_interval_secs {
            settings.poll_interval = Duration::from_secs(secs);
        }
        if let Some(max) = self.max_poll_attempts {
            settings.max_poll_attempts = attempt_cap(max);
        }
    }
}

fn attempt_cap(max: u32) -> Option<u32> {
    (max > 0).then_some(max)
}

/// Reads a config file. `Ok(None)` when the file does not exist.
pub fn load(path: &Path) -> Result<Option<FileConfig>> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err).with_context(|| format!("reading {}", path.display())),
    };
    let config = ron::from_str(&content).with_context(|| format!("parsing {}", path.display()))?;
    watch_info!("Loaded settings from {:?}", path);
    Ok(Some(config))
}

/// Builds the effective settings.
///
/// An explicitly named file must exist; the default file is optional.
pub fn resolve(explicit: Option<&Path>, overrides: Overrides) -> Result<TrackerSettings> {
    let mut settings = TrackerSettings::default();

    let file = match explicit {
        Some(path) => Some(
            load(path)?.with_context(|| format!("config file {} not found", path.display()))?,
        ),
        None => load(Path::new(DEFAULT_CONFIG_FILE))?,
    };
    if let Some(file) = file {
        file.apply(&mut settings);
    }
    overrides.apply(&mut settings);

    if settings.poll_interval.is_zero() {
        anyhow::bail!("poll interval must be at least one second");
    }
    Ok(settings)
}
