use std::sync::Arc;

use jobwatch_core::{Job, JobForm};
use jobwatch_logging::watch_info;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;
use url::Url;

use crate::settings::{endpoint, parse_base_url};
use crate::{SessionProvider, SetupError, SubmitError, TrackerSettings};

/// Turns a validated form into job identifiers.
#[async_trait::async_trait]
pub trait SubmissionGate: Send + Sync {
    async fn submit(&self, form: &JobForm) -> Result<Job, SubmitError>;
}

#[derive(Debug, Deserialize)]
struct CreateJobResponse {
    job_id: String,
    stream_token: String,
}

pub struct ReqwestSubmissionGate {
    client: reqwest::Client,
    base: Url,
    session: Arc<dyn SessionProvider>,
}

impl ReqwestSubmissionGate {
    pub fn new(
        settings: &TrackerSettings,
        session: Arc<dyn SessionProvider>,
    ) -> Result<Self, SetupError> {
        let base = parse_base_url(&settings.api_base_url)?;
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| SetupError::Client(err.to_string()))?;
        Ok(Self {
            client,
            base,
            session,
        })
    }
}

#[async_trait::async_trait]
impl SubmissionGate for ReqwestSubmissionGate {
    async fn submit(&self, form: &JobForm) -> Result<Job, SubmitError> {
        let token = self
            .session
            .access_token()
            .await
            .ok_or(SubmitError::Unauthenticated)?;

        let body =
            serde_json::to_vec(form).map_err(|err| SubmitError::Encode(err.to_string()))?;
        let response = self
            .client
            .post(endpoint(&self.base, &["api", "jobs", "create"]))
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|err| SubmitError::Network(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SubmitError::Rejected {
                status: status.as_u16(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|err| SubmitError::Network(err.to_string()))?;
        let created: CreateJobResponse = serde_json::from_slice(&bytes)
            .map_err(|err| SubmitError::InvalidResponse(err.to_string()))?;

        watch_info!("Created job {}", created.job_id);
        Ok(Job {
            id: created.job_id,
            stream_token: created.stream_token,
        })
    }
}
