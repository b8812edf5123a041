use jobwatch_core::JobId;
use reqwest::header::AUTHORIZATION;
use serde::Deserialize;
use serde_json::Value;
use url::Url;

use crate::settings::{endpoint, parse_base_url};
use crate::{PageRecord, PollQueryError, SetupError, TrackerSettings};

const RECORD_TABLE: &str = "landing_pages";

/// Read access to the persisted artifacts of finished jobs.
#[async_trait::async_trait]
pub trait RecordStore: Send + Sync {
    async fn find_by_job(&self, job_id: &JobId) -> Result<Option<PageRecord>, PollQueryError>;
}

#[derive(Debug, Deserialize)]
struct RawRecord {
    id: Value,
    #[serde(default)]
    structure: Value,
}

impl From<RawRecord> for PageRecord {
    fn from(raw: RawRecord) -> Self {
        let id = match raw.id {
            Value::String(id) => id,
            other => other.to_string(),
        };
        PageRecord {
            id,
            structure: raw.structure,
        }
    }
}

/// PostgREST-style record store (`GET /rest/v1/<table>?job_id=eq.<id>`).
#[derive(Debug, Clone)]
pub struct RestRecordStore {
    client: reqwest::Client,
    base: Url,
    api_key: String,
}

impl RestRecordStore {
    pub fn new(settings: &TrackerSettings) -> Result<Self, SetupError> {
        let base = parse_base_url(&settings.record_store_url)?;
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| SetupError::Client(err.to_string()))?;
        Ok(Self {
            client,
            base,
            api_key: settings.record_store_key.clone(),
        })
    }

    fn query_url(&self, job_id: &str) -> Url {
        let mut url = endpoint(&self.base, &["rest", "v1", RECORD_TABLE]);
        url.query_pairs_mut()
            .append_pair("select", "id,structure")
            .append_pair("job_id", &format!("eq.{job_id}"))
            .append_pair("limit", "1");
        url
    }
}

#[async_trait::async_trait]
impl RecordStore for RestRecordStore {
    async fn find_by_job(&self, job_id: &JobId) -> Result<Option<PageRecord>, PollQueryError> {
        let mut request = self.client.get(self.query_url(job_id));
        if !self.api_key.is_empty() {
            request = request
                .header("apikey", &self.api_key)
                .header(AUTHORIZATION, format!("Bearer {}", self.api_key));
        }
        let response = request
            .send()
            .await
            .map_err(|err| PollQueryError::Network(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PollQueryError::HttpStatus(status.as_u16()));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|err| PollQueryError::Network(err.to_string()))?;
        let rows: Vec<RawRecord> =
            serde_json::from_slice(&bytes).map_err(|err| PollQueryError::Decode(err.to_string()))?;
        Ok(rows.into_iter().next().map(PageRecord::from))
    }
}
