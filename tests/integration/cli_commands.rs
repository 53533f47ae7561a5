//! End-to-end tests for the CLI route table over a temp config and data dir

use async_trait::async_trait;
use std::sync::Arc;
use tempfile::TempDir;
use vigil::check::{CheckEngine, ObservationSource};
use vigil::cli::{Commands, RunContext};
use vigil::config::VigilConfig;
use vigil::error::ApiError;
use vigil::repository::MonitorRepository;
use vigil::store::{MonitorStore, SledMonitorStore};

/// Write a config pointing at a temp data dir with a deterministic
/// single-candidate simulated source.
fn write_config(temp_dir: &TempDir, extra: &str) -> std::path::PathBuf {
    let data_dir = temp_dir.path().join("data");
    let config_path = temp_dir.path().join("vigil.toml");
    let contents = format!(
        "data_dir = \"{}\"\n\n[simulation]\ncandidates = [\"$49.99\"]\n{}",
        data_dir.display(),
        extra
    );
    std::fs::write(&config_path, contents).unwrap();
    config_path
}

fn add_widget(ctx: &RunContext) -> u64 {
    let output = ctx
        .execute(&Commands::Add {
            url: "https://example.com/p".to_string(),
            selector: ".price".to_string(),
            name: "Widget Price".to_string(),
        })
        .unwrap();
    // "Created monitor <id> (<name>)"
    output
        .split_whitespace()
        .nth(2)
        .unwrap()
        .parse()
        .unwrap()
}

#[test]
fn test_add_list_show_remove() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = RunContext::new(Some(write_config(&temp_dir, "")), None).unwrap();

    let id = add_widget(&ctx);

    let list = ctx
        .execute(&Commands::List {
            format: "text".to_string(),
        })
        .unwrap();
    assert!(list.contains("Widget Price"));
    assert!(list.contains("new"));

    let shown = ctx
        .execute(&Commands::Show {
            id,
            format: "json".to_string(),
        })
        .unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&shown).unwrap();
    assert_eq!(parsed["status"], "new");
    assert!(parsed["last_value"].is_null());

    ctx.execute(&Commands::Remove { id }).unwrap();
    let list = ctx
        .execute(&Commands::List {
            format: "text".to_string(),
        })
        .unwrap();
    assert!(list.contains("No monitors registered"));
}

#[test]
fn test_add_rejects_blank_fields() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = RunContext::new(Some(write_config(&temp_dir, "")), None).unwrap();

    let result = ctx.execute(&Commands::Add {
        url: "  ".to_string(),
        selector: ".price".to_string(),
        name: "Widget".to_string(),
    });
    assert!(matches!(result, Err(ApiError::InvalidMonitor(_))));
}

#[test]
fn test_check_updates_status_and_value() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = RunContext::new(Some(write_config(&temp_dir, "")), None).unwrap();

    let id = add_widget(&ctx);
    ctx.execute(&Commands::Check {
        id: Some(id),
        all: false,
    })
    .unwrap();

    let shown = ctx
        .execute(&Commands::Show {
            id,
            format: "json".to_string(),
        })
        .unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&shown).unwrap();
    // single-candidate source: first check observes $49.99 and lands stable
    assert_eq!(parsed["status"], "stable");
    assert_eq!(parsed["last_value"], "$49.99");
}

#[test]
fn test_check_all_covers_every_monitor() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = RunContext::new(Some(write_config(&temp_dir, "")), None).unwrap();

    add_widget(&ctx);
    add_widget(&ctx);
    let output = ctx
        .execute(&Commands::Check { id: None, all: true })
        .unwrap();
    assert_eq!(output.lines().count(), 2);
}

/// Fails for the `.broken` selector, succeeds for everything else.
struct OutageSource;

#[async_trait]
impl ObservationSource for OutageSource {
    async fn observe(&self, _url: &str, selector: &str) -> Result<String, ApiError> {
        if selector == ".broken" {
            return Err(ApiError::ObservationFailed("host unreachable".to_string()));
        }
        Ok("$10.00".to_string())
    }
}

#[test]
fn test_check_all_continues_past_failing_monitor() {
    let temp_dir = TempDir::new().unwrap();
    let store: Arc<dyn MonitorStore> =
        Arc::new(SledMonitorStore::new(temp_dir.path().join("data")).unwrap());
    let repository = MonitorRepository::new(Arc::clone(&store));
    let engine = CheckEngine::new(Arc::new(OutageSource), Arc::clone(&store));
    let ctx = RunContext::from_parts(VigilConfig::default(), repository, engine);

    for selector in [".price", ".broken", ".stock"] {
        ctx.execute(&Commands::Add {
            url: "https://example.com/p".to_string(),
            selector: selector.to_string(),
            name: format!("Monitor {}", selector),
        })
        .unwrap();
    }

    let output = ctx
        .execute(&Commands::Check { id: None, all: true })
        .unwrap();

    // one line per monitor, the outage reported inline
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[1].contains("Monitor .broken"));
    assert!(lines[1].contains("host unreachable"));
    assert!(lines[0].contains("$10.00"));
    assert!(lines[2].contains("$10.00"));

    // the healthy monitors were persisted, the broken one left untouched
    let list = ctx
        .execute(&Commands::List {
            format: "json".to_string(),
        })
        .unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&list).unwrap();
    assert_eq!(parsed[0]["status"], "stable");
    assert_eq!(parsed[1]["status"], "new");
    assert!(parsed[1]["last_value"].is_null());
    assert_eq!(parsed[2]["status"], "stable");
}

#[test]
fn test_manual_value_override_resets_to_stable() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = RunContext::new(Some(write_config(&temp_dir, "")), None).unwrap();

    let id = add_widget(&ctx);
    ctx.execute(&Commands::Check {
        id: Some(id),
        all: false,
    })
    .unwrap();

    ctx.execute(&Commands::Edit {
        id,
        url: None,
        selector: None,
        name: None,
        value: Some("$44.00".to_string()),
    })
    .unwrap();

    let shown = ctx
        .execute(&Commands::Show {
            id,
            format: "json".to_string(),
        })
        .unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&shown).unwrap();
    assert_eq!(parsed["status"], "stable");
    assert_eq!(parsed["last_value"], "$44.00");
    assert_eq!(parsed["previous_value"], "$49.99");
}

#[test]
fn test_edit_without_fields_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = RunContext::new(Some(write_config(&temp_dir, "")), None).unwrap();

    let id = add_widget(&ctx);
    let result = ctx.execute(&Commands::Edit {
        id,
        url: None,
        selector: None,
        name: None,
        value: None,
    });
    assert!(matches!(result, Err(ApiError::InvalidMonitor(_))));
}

#[test]
fn test_check_missing_monitor() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = RunContext::new(Some(write_config(&temp_dir, "")), None).unwrap();

    let result = ctx.execute(&Commands::Check {
        id: Some(424242),
        all: false,
    });
    assert!(matches!(result, Err(ApiError::MonitorNotFound(_))));
}

#[test]
fn test_suggest_without_provider_configured() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = RunContext::new(Some(write_config(&temp_dir, "")), None).unwrap();

    let result = ctx.execute(&Commands::Suggest {
        html: Some("<div class=\"price\">$49.99</div>".to_string()),
        file: None,
        provider: None,
    });
    assert!(matches!(result, Err(ApiError::ProviderNotConfigured(_))));
}

#[test]
fn test_suggest_with_keyless_provider_reports_missing_key() {
    let temp_dir = TempDir::new().unwrap();
    let extra = "\n[assist.providers.cloud]\ntype = \"openai\"\nmodel = \"gpt-4o-mini\"\n";
    let ctx = RunContext::new(Some(write_config(&temp_dir, extra)), None).unwrap();

    let output = ctx
        .execute(&Commands::Suggest {
            html: Some("<div class=\"price\">$49.99</div>".to_string()),
            file: None,
            provider: None,
        })
        .unwrap();
    assert!(output.contains("API Key missing"));
}

#[test]
fn test_monitors_persist_across_contexts() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = write_config(&temp_dir, "");

    let id = {
        let ctx = RunContext::new(Some(config_path.clone()), None).unwrap();
        add_widget(&ctx)
    };

    let ctx = RunContext::new(Some(config_path), None).unwrap();
    let shown = ctx
        .execute(&Commands::Show {
            id,
            format: "text".to_string(),
        })
        .unwrap();
    assert!(shown.contains("Widget Price"));
}
