//! Selector Assistant
//!
//! Turns a pasted HTML snippet into a best-guess CSS selector via the assist
//! backend. Fail-soft: any backend error resolves to a fixed fallback string.

use crate::assist::AssistClient;
use std::sync::Arc;
use tracing::warn;

/// Fallback shown when the assist call fails for any reason.
pub const SELECTOR_FALLBACK: &str = "Failed to analyze HTML. Please try again.";

pub struct SelectorAssistant {
    client: Arc<dyn AssistClient>,
}

impl SelectorAssistant {
    pub fn new(client: Arc<dyn AssistClient>) -> Self {
        Self { client }
    }

    /// Suggest a CSS selector for the fragment of interest in `html`.
    ///
    /// The input is passed through as-is, including an empty string; form
    /// validation is the caller's job. The response is trimmed and stripped
    /// of backticks before being returned as the selector.
    pub async fn suggest(&self, html: &str) -> String {
        let prompt = build_prompt(html);
        match self.client.complete(&prompt).await {
            Ok(response) => clean_selector(&response),
            Err(e) => {
                warn!("selector suggestion failed: {}", e);
                SELECTOR_FALLBACK.to_string()
            }
        }
    }
}

fn build_prompt(html: &str) -> String {
    format!(
        "Given the following HTML snippet, suggest the most specific CSS selector \
         for the element a user would most likely want to track for changes \
         (for example a price, stock status, or headline). \
         Respond with ONLY the CSS selector string, no markdown, no explanation.\n\n\
         HTML:\n{}",
        html
    )
}

fn clean_selector(response: &str) -> String {
    response.trim().replace('`', "").trim().to_string()
}
