use std::time::Duration;

use url::Url;

use crate::poll::PollSchedule;
use crate::SetupError;

#[derive(Debug, Clone)]
pub struct TrackerSettings {
    /// Base URL of the pipeline backend (`/api/jobs/...` lives below it).
    pub api_base_url: String,
    /// Base URL of the persisted-record store (`/rest/v1/...` lives below it).
    pub record_store_url: String,
    /// API key sent to the record store. Empty means no key.
    pub record_store_key: String,
    pub poll_interval: Duration,
    /// `None` polls until the job is reset or torn down.
    pub max_poll_attempts: Option<u32>,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    /// Longest silence tolerated on the live stream. The backend sends a
    /// heartbeat every 15 seconds.
    pub stream_idle_timeout: Duration,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000".to_string(),
            record_store_url: "http://localhost:54321".to_string(),
            record_store_key: String::new(),
            poll_interval: Duration::from_secs(5),
            max_poll_attempts: Some(120),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            stream_idle_timeout: Duration::from_secs(45),
        }
    }
}

impl TrackerSettings {
    pub fn poll_schedule(&self) -> PollSchedule {
        PollSchedule {
            interval: self.poll_interval,
            max_attempts: self.max_poll_attempts,
        }
    }
}

pub(crate) fn parse_base_url(raw: &str) -> Result<Url, SetupError> {
    let url = Url::parse(raw).map_err(|err| SetupError::InvalidUrl {
        url: raw.to_string(),
        message: err.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(SetupError::InvalidUrl {
            url: raw.to_string(),
            message: "expected an http or https url".to_string(),
        });
    }
    Ok(url)
}

/// Appends path segments to a base URL, keeping any path prefix it has.
pub(crate) fn endpoint(base: &Url, segments: &[&str]) -> Url {
    let mut url = base.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    url
}

#[cfg(test)]
mod tests {
    use super::{endpoint, parse_base_url};

    #[test]
    fn endpoint_keeps_prefix_and_encodes_segments() {
        let base = parse_base_url("https://api.example.com/v2/").unwrap();
        let url = endpoint(&base, &["api", "jobs", "stream", "a b"]);
        assert_eq!(url.as_str(), "https://api.example.com/v2/api/jobs/stream/a%20b");
    }

    #[test]
    fn rejects_non_http_base() {
        assert!(parse_base_url("ftp://example.com").is_err());
        assert!(parse_base_url("not a url").is_err());
    }
}
