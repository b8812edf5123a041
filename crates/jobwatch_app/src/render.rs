//! Plain-text rendering of job snapshots.

use jobwatch_core::{JobSnapshot, JobStatus, PipelineStep};

fn mark(snapshot: &JobSnapshot, step: PipelineStep) -> &'static str {
    if snapshot.is_step_completed(step) {
        "[x]"
    } else if snapshot.current_step == Some(step) && !snapshot.is_terminal() {
        "[>]"
    } else {
        "[ ]"
    }
}

/// Full step checklist in pipeline order.
pub fn checklist(snapshot: &JobSnapshot) -> Vec<String> {
    PipelineStep::ALL
        .iter()
        .map(|&step| format!("{} {}", mark(snapshot, step), step.label()))
        .collect()
}

/// One-line outcome for a terminal snapshot.
pub fn summary(snapshot: &JobSnapshot) -> String {
    match snapshot.status {
        JobStatus::Completed => match &snapshot.record_id {
            Some(record_id) => format!("Page ready (record {record_id})"),
            None => "Page ready".to_string(),
        },
        JobStatus::Failed => format!(
            "Job failed: {}",
            snapshot.error.as_deref().unwrap_or("unknown error")
        ),
        JobStatus::Processing => "Still processing".to_string(),
        JobStatus::Idle => "Nothing submitted".to_string(),
    }
}

/// Turns a stream of snapshots into the lines worth printing: newly
/// finished steps, message changes, and the switch to polling.
#[derive(Debug, Default)]
pub struct ProgressPrinter {
    job_announced: bool,
    printed_steps: Vec<PipelineStep>,
    last_message: String,
    polling_announced: bool,
}

impl ProgressPrinter {
    pub fn advance(&mut self, snapshot: &JobSnapshot) -> Vec<String> {
        let mut lines = Vec::new();

        if !self.job_announced {
            if let Some(job_id) = &snapshot.job_id {
                lines.push(format!("Job {job_id} started"));
                self.job_announced = true;
            }
        }

        // Collapsed completions mark every step at once; keep pipeline order.
        for step in PipelineStep::ALL {
            if snapshot.is_step_completed(step) && !self.printed_steps.contains(&step) {
                lines.push(format!("[x] {}", step.label()));
                self.printed_steps.push(step);
            }
        }

        if snapshot.is_polling && !self.polling_announced {
            lines.push("Live updates lost; checking for the finished page".to_string());
            self.polling_announced = true;
        }

        if !snapshot.current_message.is_empty() && snapshot.current_message != self.last_message {
            lines.push(format!("    {}", snapshot.current_message));
            self.last_message = snapshot.current_message.clone();
        }

        lines
    }
}
