//! Presentation: monitor list and detail formatters for text and JSON output.

use crate::error::ApiError;
use crate::monitor::{Monitor, MonitorStatus};
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;

fn status_label(status: MonitorStatus) -> String {
    match status {
        MonitorStatus::New => status.to_string().dimmed().to_string(),
        MonitorStatus::Stable => status.to_string().green().to_string(),
        MonitorStatus::Changed => status.to_string().red().bold().to_string(),
    }
}

fn checked_label(monitor: &Monitor) -> String {
    monitor
        .last_checked
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "never".to_string())
}

pub fn format_monitor_list_text(monitors: &[Monitor]) -> String {
    if monitors.is_empty() {
        return "No monitors registered. Add one with `vigil add <url> <selector> <name>`."
            .to_string();
    }
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["ID", "Name", "Status", "Last Value", "Last Checked"]);
    for m in monitors {
        table.add_row(vec![
            m.id.to_string(),
            m.name.clone(),
            status_label(m.status),
            m.last_value.clone().unwrap_or_else(|| "-".to_string()),
            checked_label(m),
        ]);
    }
    table.to_string()
}

pub fn format_monitor_list_json(monitors: &[Monitor]) -> Result<String, ApiError> {
    serde_json::to_string_pretty(monitors)
        .map_err(|e| ApiError::InvalidMonitor(format!("Failed to serialize monitors: {}", e)))
}

pub fn format_monitor_json(monitor: &Monitor) -> Result<String, ApiError> {
    serde_json::to_string_pretty(monitor)
        .map_err(|e| ApiError::InvalidMonitor(format!("Failed to serialize monitor: {}", e)))
}

pub fn format_monitor_detail_text(monitor: &Monitor) -> String {
    let mut s = format!(
        "Monitor {} ({})\n  URL: {}\n  Selector: {}\n  Status: {}",
        monitor.id,
        monitor.name,
        monitor.url,
        monitor.selector,
        status_label(monitor.status)
    );
    s.push_str(&format!(
        "\n  Last value: {}",
        monitor.last_value.as_deref().unwrap_or("-")
    ));
    if let Some(ref prev) = monitor.previous_value {
        s.push_str(&format!("\n  Previous value: {}", prev));
    }
    s.push_str(&format!("\n  Last checked: {}", checked_label(monitor)));
    s.push_str(&format!(
        "\n  Created: {}",
        monitor.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    s
}

/// One-line check outcome for `vigil check`.
pub fn format_check_outcome(monitor: &Monitor) -> String {
    match monitor.status {
        MonitorStatus::Changed => format!(
            "{} {}: {} (was {})",
            status_label(monitor.status),
            monitor.name,
            monitor.last_value.as_deref().unwrap_or("-"),
            monitor.previous_value.as_deref().unwrap_or("-"),
        ),
        _ => format!(
            "{} {}: {}",
            status_label(monitor.status),
            monitor.name,
            monitor.last_value.as_deref().unwrap_or("-"),
        ),
    }
}

/// One-line failed-check outcome for `vigil check --all`.
pub fn format_check_failure(monitor: &Monitor, error: &ApiError) -> String {
    format!(
        "{} {}: {}",
        "failed".red().bold(),
        monitor.name,
        error
    )
}
