//! Change Summarizer
//!
//! Produces a one-sentence description of a detected change for a monitor.
//! Advisory text only, never persisted. Fail-soft like the selector assistant.

use crate::assist::AssistClient;
use crate::monitor::Monitor;
use std::sync::Arc;
use tracing::warn;

/// Fallback shown when the assist call fails for any reason.
pub const SUMMARY_FALLBACK: &str = "AI service is currently unavailable.";

/// Placeholder used when no prior value was retained for the monitor.
const UNKNOWN_PRIOR: &str = "Different Value";

pub struct ChangeSummarizer {
    client: Arc<dyn AssistClient>,
}

impl ChangeSummarizer {
    pub fn new(client: Arc<dyn AssistClient>) -> Self {
        Self { client }
    }

    /// Summarize the monitor's latest change in one sentence.
    pub async fn summarize(&self, monitor: &Monitor) -> String {
        let prompt = build_prompt(monitor);
        match self.client.complete(&prompt).await {
            Ok(response) => response.trim().to_string(),
            Err(e) => {
                warn!(id = %monitor.id, "change summary failed: {}", e);
                SUMMARY_FALLBACK.to_string()
            }
        }
    }
}

fn build_prompt(monitor: &Monitor) -> String {
    let current = monitor.last_value.as_deref().unwrap_or("(not yet observed)");
    let prior = monitor.previous_value.as_deref().unwrap_or(UNKNOWN_PRIOR);
    format!(
        "A tracked web fragment named \"{}\" changed. \
         The previous value was \"{}\" and the current value is \"{}\". \
         Describe the change to the user in exactly one plain sentence.",
        monitor.name, prior, current
    )
}
