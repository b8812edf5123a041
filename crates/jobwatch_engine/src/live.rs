use futures_util::StreamExt;
use jobwatch_core::{Job, Observation, StreamEvent};
use jobwatch_logging::{watch_debug, watch_trace};
use reqwest::header::{ACCEPT, CACHE_CONTROL};
use url::Url;

use crate::settings::{endpoint, parse_base_url};
use crate::{SetupError, SseDecoder, TrackerSettings, TransportError};

/// Receiver for normalized observations, one call per event in server order.
pub trait ObservationSink: Send + Sync {
    fn observe(&self, observation: Observation);
}

/// Push channel for one job's status events.
#[async_trait::async_trait]
pub trait LiveChannel: Send + Sync {
    /// Follows the job until a terminal observation has been forwarded
    /// (`Ok`) or the transport gives out (`Err`). Dropping the future closes
    /// the subscription.
    async fn follow(&self, job: &Job, sink: &dyn ObservationSink) -> Result<(), TransportError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestLiveChannel {
    client: reqwest::Client,
    base: Url,
}

impl ReqwestLiveChannel {
    pub fn new(settings: &TrackerSettings) -> Result<Self, SetupError> {
        let base = parse_base_url(&settings.api_base_url)?;
        // No total timeout: the stream is expected to stay open for minutes.
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .read_timeout(settings.stream_idle_timeout)
            .build()
            .map_err(|err| SetupError::Client(err.to_string()))?;
        Ok(Self { client, base })
    }

    fn stream_url(&self, job: &Job) -> Url {
        let mut url = endpoint(&self.base, &["api", "jobs", "stream", job.id.as_str()]);
        url.query_pairs_mut().append_pair("token", &job.stream_token);
        url
    }
}

#[async_trait::async_trait]
impl LiveChannel for ReqwestLiveChannel {
    async fn follow(&self, job: &Job, sink: &dyn ObservationSink) -> Result<(), TransportError> {
        let response = self
            .client
            .get(self.stream_url(job))
            .header(ACCEPT, "text/event-stream")
            .header(CACHE_CONTROL, "no-cache")
            .send()
            .await
            .map_err(|err| TransportError::Connect(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::HttpStatus(status.as_u16()));
        }
        watch_debug!("Live channel open for job {}", job.id);

        let mut decoder = SseDecoder::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|err| TransportError::Read(err.to_string()))?;
            for payload in decoder.feed(&chunk) {
                let event: StreamEvent = serde_json::from_str(&payload)
                    .map_err(|err| TransportError::Decode(err.to_string()))?;
                let Some(observation) = event.normalize() else {
                    watch_trace!("Live channel acknowledged for job {}", job.id);
                    continue;
                };
                let terminal = observation.is_terminal();
                sink.observe(observation);
                if terminal {
                    watch_debug!("Live channel for job {} closing after terminal event", job.id);
                    return Ok(());
                }
            }
        }

        Err(TransportError::Closed)
    }
}
