//! Application state: pattern catalog, configuration, and the optional
//! outbound clients (hosted model, progress store) plus the code runner.
//!
//! Everything here is built once at startup and then only read, so handlers
//! share it through `Arc<AppState>` without locks.

use tracing::{debug, info, instrument};

use crate::catalog::Catalog;
use crate::config::{load_config_from_env, AppConfig};
use crate::domain::Difficulty;
use crate::model::HostedModel;
use crate::runner::CodeRunner;
use crate::store::ProgressStore;

#[derive(Clone, Debug)]
pub struct AppState {
    pub catalog: Catalog,
    pub config: AppConfig,
    pub model: Option<HostedModel>,
    pub store: Option<ProgressStore>,
    pub runner: CodeRunner,
}

impl AppState {
    /// Build state from env: load config, build the catalog, init optional clients.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        let config = load_config_from_env();
        let catalog = Catalog::default();
        info!(target: "codepattern", patterns = catalog.len(), "Pattern catalog loaded");
        for difficulty in [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard] {
            let count = catalog.all().iter().filter(|p| p.difficulty == difficulty).count();
            debug!(target: "codepattern", %difficulty, count, "Startup pattern inventory");
        }

        let model = HostedModel::from_env(&config.model);
        if let Some(m) = &model {
            info!(target: "codepattern", base_url = %m.base_url, classifier = %m.classifier_model, generator = %m.generator_model, "Hosted model enabled.");
        } else {
            info!(target: "codepattern", "Hosted model disabled (no HF_API_TOKEN). Using local heuristics.");
        }

        let store = ProgressStore::from_env();
        if store.is_none() {
            info!(target: "codepattern", "Progress store disabled (SUPABASE_URL/SUPABASE_ANON_KEY unset).");
        }

        info!(target: "codepattern", mode = ?config.execution.mode, timeout_secs = config.execution.timeout_secs, "Code execution configured");
        let runner = CodeRunner::new(config.execution.clone());

        Self { catalog, config, model, store, runner }
    }

    /// State with no outbound clients.
    #[cfg(test)]
    pub fn offline(config: AppConfig) -> Self {
        let runner = CodeRunner::new(config.execution.clone());
        Self {
            catalog: Catalog::default(),
            config,
            model: None,
            store: None,
            runner,
        }
    }
}
