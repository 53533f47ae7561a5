//! CLI route: single route table and run context. Dispatches to domain
//! services and presentation. This is the dashboard controller: it validates
//! form fields, wires user actions to the repository and check engine, and
//! owns nothing beyond that glue.

use crate::assist::{AssistClientFactory, ChangeSummarizer, SelectorAssistant};
use crate::check::{CheckEngine, ObservationSource, SimulatedSource};
use crate::cli::parse::Commands;
use crate::cli::presentation::{
    format_check_failure, format_check_outcome, format_monitor_detail_text, format_monitor_json,
    format_monitor_list_json, format_monitor_list_text,
};
use crate::config::{ConfigLoader, VigilConfig};
use crate::error::ApiError;
use crate::monitor::{MonitorId, MonitorPatch, NewMonitor};
use crate::repository::MonitorRepository;
use crate::store::{MonitorStore, SledMonitorStore};
use chrono::Utc;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// Runtime context for CLI execution: config, repository, and check engine.
pub struct RunContext {
    config: VigilConfig,
    repository: MonitorRepository,
    engine: CheckEngine,
}

impl RunContext {
    /// Create run context from an optional config path and data-dir override.
    /// A repository load failure here means no monitors are presented at all.
    pub fn new(config_path: Option<PathBuf>, data_dir: Option<PathBuf>) -> Result<Self, ApiError> {
        let mut config = if let Some(ref cfg_path) = config_path {
            ConfigLoader::load_from_file(cfg_path)?
        } else {
            ConfigLoader::load()?
        };
        if let Some(dir) = data_dir {
            config.data_dir = Some(dir);
        }
        config
            .validate()
            .map_err(|errors| ApiError::ConfigError(errors.join("; ")))?;

        let data_dir = config.resolve_data_dir();
        std::fs::create_dir_all(&data_dir)
            .map_err(|e| ApiError::StorageError(crate::error::StorageError::IoError(e)))?;

        let store: Arc<dyn MonitorStore> =
            Arc::new(SledMonitorStore::new(data_dir.join("monitors"))?);

        let source: Arc<dyn ObservationSource> = if config.simulation.candidates.is_empty() {
            Arc::new(SimulatedSource::new())
        } else {
            Arc::new(SimulatedSource::with_candidates(
                config.simulation.candidates.clone(),
            ))
        };

        let repository = MonitorRepository::new(Arc::clone(&store));
        repository.load()?;
        let engine = CheckEngine::new(source, store);

        Ok(Self {
            config,
            repository,
            engine,
        })
    }

    /// Build a run context from pre-wired parts. Lets embedders supply their
    /// own observation source and store.
    pub fn from_parts(
        config: VigilConfig,
        repository: MonitorRepository,
        engine: CheckEngine,
    ) -> Self {
        Self {
            config,
            repository,
            engine,
        }
    }

    /// Execute a CLI command via the single route table.
    pub fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        match command {
            Commands::Add {
                url,
                selector,
                name,
            } => {
                validate_field("url", url)?;
                validate_field("selector", selector)?;
                validate_field("name", name)?;
                let monitor = self.repository.create(NewMonitor {
                    url: url.clone(),
                    selector: selector.clone(),
                    name: name.clone(),
                })?;
                info!(id = %monitor.id, "monitor created");
                Ok(format!("Created monitor {} ({})", monitor.id, monitor.name))
            }
            Commands::List { format } => {
                let monitors = self.repository.list();
                if format == "json" {
                    format_monitor_list_json(&monitors)
                } else {
                    Ok(format_monitor_list_text(&monitors))
                }
            }
            Commands::Show { id, format } => {
                let id = MonitorId(*id);
                let monitor = self
                    .repository
                    .get(&id)
                    .ok_or(ApiError::MonitorNotFound(id))?;
                if format == "json" {
                    format_monitor_json(&monitor)
                } else {
                    Ok(format_monitor_detail_text(&monitor))
                }
            }
            Commands::Check { id, all } => {
                if *all {
                    self.check_all()
                } else {
                    // clap enforces an id when --all is absent
                    match id {
                        Some(raw) => self.check_one(&MonitorId(*raw)),
                        None => Err(ApiError::InvalidMonitor("monitor id required".to_string())),
                    }
                }
            }
            Commands::Edit {
                id,
                url,
                selector,
                name,
                value,
            } => self.edit(MonitorId(*id), url, selector, name, value),
            Commands::Remove { id } => {
                let id = MonitorId(*id);
                self.repository.delete(&id)?;
                info!(%id, "monitor deleted");
                Ok(format!("Removed monitor {}", id))
            }
            Commands::Suggest {
                html,
                file,
                provider,
            } => self.suggest(html.as_deref(), file.as_deref(), provider.as_deref()),
            Commands::Summarize { id, provider } => {
                let id = MonitorId(*id);
                let monitor = self
                    .repository
                    .get(&id)
                    .ok_or(ApiError::MonitorNotFound(id))?;
                let client = AssistClientFactory::create_client(
                    &self.config.resolve_provider(provider.as_deref())?,
                )?;
                let summarizer = ChangeSummarizer::new(Arc::from(client));
                let summary = block_on(summarizer.summarize(&monitor))?;
                Ok(summary)
            }
        }
    }

    fn check_one(&self, id: &MonitorId) -> Result<String, ApiError> {
        let updated = block_on(self.engine.check_by_id(id))??;
        self.repository.refresh(id)?;
        Ok(format_check_outcome(&updated))
    }

    fn check_all(&self) -> Result<String, ApiError> {
        let monitors = self.repository.list();
        if monitors.is_empty() {
            return Ok("No monitors to check.".to_string());
        }
        let mut lines = Vec::with_capacity(monitors.len());
        for monitor in &monitors {
            // one broken monitor must not stop the sweep
            match block_on(self.engine.check(monitor))? {
                Ok(updated) => {
                    self.repository.refresh(&updated.id)?;
                    lines.push(format_check_outcome(&updated));
                }
                Err(e) => {
                    warn!(id = %monitor.id, "check failed: {}", e);
                    lines.push(format_check_failure(monitor, &e));
                }
            }
        }
        Ok(lines.join("\n"))
    }

    fn edit(
        &self,
        id: MonitorId,
        url: &Option<String>,
        selector: &Option<String>,
        name: &Option<String>,
        value: &Option<String>,
    ) -> Result<String, ApiError> {
        let monitor = self
            .repository
            .get(&id)
            .ok_or(ApiError::MonitorNotFound(id))?;

        let mut patch = MonitorPatch::default();
        if let Some(url) = url {
            validate_field("url", url)?;
            patch.url = Some(url.clone());
        }
        if let Some(selector) = selector {
            validate_field("selector", selector)?;
            patch.selector = Some(selector.clone());
        }
        if let Some(name) = name {
            validate_field("name", name)?;
            patch.name = Some(name.clone());
        }
        if let Some(value) = value {
            // Manual correction is trusted: stable, stamped now, never flagged.
            let mut corrected = monitor.clone();
            corrected.apply_manual_value(value.clone(), Utc::now());
            patch.last_value = Some(corrected.last_value);
            patch.previous_value = Some(corrected.previous_value);
            patch.last_checked = Some(corrected.last_checked);
            patch.status = Some(corrected.status);
        }
        if patch.is_empty() {
            return Err(ApiError::InvalidMonitor(
                "nothing to update; pass at least one of --url, --selector, --name, --value"
                    .to_string(),
            ));
        }

        let updated = self.repository.update(&id, &patch)?;
        info!(%id, "monitor updated");
        Ok(format!("Updated monitor {} ({})", updated.id, updated.name))
    }

    fn suggest(
        &self,
        html: Option<&str>,
        file: Option<&std::path::Path>,
        provider: Option<&str>,
    ) -> Result<String, ApiError> {
        let html = match (html, file) {
            (Some(html), _) => html.to_string(),
            (None, Some(path)) => std::fs::read_to_string(path)
                .map_err(|e| ApiError::StorageError(crate::error::StorageError::IoError(e)))?,
            (None, None) => {
                return Err(ApiError::InvalidMonitor(
                    "pass the HTML snippet via --html or --file".to_string(),
                ))
            }
        };

        let client =
            AssistClientFactory::create_client(&self.config.resolve_provider(provider)?)?;
        let assistant = SelectorAssistant::new(Arc::from(client));
        block_on(assistant.suggest(&html))
    }
}

/// Validate a required form field the way the dashboard form does: present
/// and non-blank.
fn validate_field(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::InvalidMonitor(format!(
            "{} cannot be empty",
            field
        )));
    }
    Ok(())
}

/// Drive an async operation from the synchronous CLI path.
fn block_on<F: std::future::Future>(future: F) -> Result<F::Output, ApiError> {
    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| ApiError::ConfigError(format!("Failed to create async runtime: {}", e)))?;
    Ok(rt.block_on(future))
}
