use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::PipelineStep;

/// Statuses the backend publishes while a step is still running. `processing`
/// is the canonical one. The pipeline tasks publish `researching`,
/// `copywriting` and `building`; the rest are job-record values.
const PROGRESS_STATUSES: [&str; 7] = [
    "processing",
    "pending",
    "researching",
    "copywriting",
    "building",
    "copying",
    "generating",
];

/// One decoded message from the live stream, before normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamEvent {
    pub status: String,
    #[serde(default)]
    pub step: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub payload: Option<Value>,
}

impl StreamEvent {
    /// Turns a wire event into an observation.
    ///
    /// Returns `None` for the `connected` acknowledgment, which carries no
    /// progress.
    pub fn normalize(self) -> Option<Observation> {
        let step = self.step.as_deref().and_then(PipelineStep::from_wire);
        let message = self.message.unwrap_or_default();

        let observation = match self.status.as_str() {
            "connected" => return None,
            "failed" => Observation::Failed { step, message },
            "completed" => match step {
                Some(step) if step.is_final() => Observation::Completed {
                    message,
                    structure: self.payload,
                },
                Some(step) => Observation::Progress { step, message },
                None => Observation::Unrecognized {
                    status: self.status,
                },
            },
            status if PROGRESS_STATUSES.contains(&status) => match step {
                Some(step) => Observation::Progress { step, message },
                None => Observation::Unrecognized {
                    status: self.status,
                },
            },
            _ => Observation::Unrecognized {
                status: self.status,
            },
        };
        Some(observation)
    }
}

/// Terminal completion reconstructed from the persisted record alone.
///
/// Per-step progress is unrecoverable on this path, so it carries only the
/// record and its artifact.
#[derive(Debug, Clone, PartialEq)]
pub struct CollapsedCompletion {
    pub record_id: String,
    pub structure: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Observation {
    /// A step reported progress or finished (any step but the last).
    Progress { step: PipelineStep, message: String },
    /// The final step finished; the payload is the artifact.
    Completed {
        message: String,
        structure: Option<Value>,
    },
    /// The pipeline reported failure.
    Failed {
        step: Option<PipelineStep>,
        message: String,
    },
    /// Completion synthesized by the fallback poller.
    Collapsed(CollapsedCompletion),
    /// A status this client does not understand.
    Unrecognized { status: String },
}

impl Observation {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Observation::Completed { .. } | Observation::Failed { .. } | Observation::Collapsed(_)
        )
    }
}
