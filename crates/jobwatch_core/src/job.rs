use std::fmt;

use serde::{Deserialize, Serialize};

/// Backend-assigned job identifier (a UUID rendered as text).
pub type JobId = String;

/// Identifiers handed out by the submission gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub id: JobId,
    pub stream_token: String,
}

/// Generation counter for submissions.
///
/// Every submit and every reset moves to a new epoch. Producers tag their
/// messages with the epoch they were started under, so anything arriving from
/// an older epoch is recognisably stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Epoch(u64);

impl Epoch {
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl fmt::Display for Epoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The four backend stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStep {
    Clarifier,
    Researcher,
    Copywriter,
    StructureBuilder,
}

impl PipelineStep {
    pub const ALL: [PipelineStep; 4] = [
        PipelineStep::Clarifier,
        PipelineStep::Researcher,
        PipelineStep::Copywriter,
        PipelineStep::StructureBuilder,
    ];

    pub const FINAL: PipelineStep = PipelineStep::StructureBuilder;

    pub fn is_final(self) -> bool {
        self == Self::FINAL
    }

    /// Name used on the wire by the pipeline backend.
    pub fn as_wire(self) -> &'static str {
        match self {
            PipelineStep::Clarifier => "clarifier",
            PipelineStep::Researcher => "researcher",
            PipelineStep::Copywriter => "copywriter",
            PipelineStep::StructureBuilder => "structure_builder",
        }
    }

    pub fn from_wire(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|step| step.as_wire() == raw)
    }

    pub fn label(self) -> &'static str {
        match self {
            PipelineStep::Clarifier => "Analysis",
            PipelineStep::Researcher => "Research",
            PipelineStep::Copywriter => "Copy generation",
            PipelineStep::StructureBuilder => "Structure build",
        }
    }
}

impl fmt::Display for PipelineStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JobStatus {
    #[default]
    Idle,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobStatus::Idle => write!(f, "idle"),
            JobStatus::Processing => write!(f, "processing"),
            JobStatus::Completed => write!(f, "completed"),
            JobStatus::Failed => write!(f, "failed"),
        }
    }
}
