use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::auth::PasscodeGate;
use crate::color::ColorMap;
use crate::config::AppConfig;
use crate::data::aggregate::{growth_series, top_n, value_counts, GroupCount, GroupSeries};
use crate::data::cache::DatasetCache;
use crate::data::export::save_csv;
use crate::data::filter::{filter, SearchQuery};
use crate::data::model::{Column, Dataset, FieldKey};
use crate::data::summary::{summarize, ColumnSummary};

/// Fields offered in the distribution chart selector.
pub const DISTRIBUTION_FIELDS: [FieldKey; 4] = [
    FieldKey::IpcGroup,
    FieldKey::Classification,
    FieldKey::CountryPriority,
    FieldKey::ApplicationTypeId,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Search,
    Analysis,
}

// ---------------------------------------------------------------------------
// Analysis results
// ---------------------------------------------------------------------------

/// Chart inputs computed from the current view. Rebuilt only when the view
/// or the selected distribution field changes.
#[derive(Debug, Clone, Default)]
pub struct Analysis {
    pub growth: Vec<GroupSeries>,
    pub growth_colors: ColorMap,
    pub distribution: Vec<GroupCount>,
    pub summary: Vec<ColumnSummary>,
}

impl Analysis {
    fn compute(dataset: &Dataset, field: FieldKey, config: &AppConfig) -> Self {
        let growth = growth_series(dataset, config.growth_groups);
        let growth_colors = ColorMap::new(growth.iter().map(|s| s.group.clone()));
        let distribution = top_n(
            &value_counts(dataset, &Column::Field(field), false),
            config.top_n,
        );
        Analysis {
            growth,
            growth_colors,
            distribution,
            summary: summarize(dataset),
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full session state, independent of rendering.
pub struct AppState {
    pub config: AppConfig,
    gate: PasscodeGate,

    /// Set once the passcode was accepted (or no passcode is configured).
    pub authenticated: bool,
    /// Text in the passcode box.
    pub passcode_input: String,

    pub page: Page,

    cache: DatasetCache,

    /// File the dataset came from.
    pub source: Option<PathBuf>,

    /// Loaded dataset (None until a file loads successfully).
    pub dataset: Option<Arc<Dataset>>,

    /// Current search inputs.
    pub query: SearchQuery,

    /// Records passing `query` (cached).
    pub view: Option<Dataset>,

    /// Which field the distribution chart counts.
    pub distribution_field: FieldKey,

    /// Chart inputs for the analysis page. Dropped when the view changes and
    /// rebuilt by [`AppState::ensure_analysis`] when the page is shown.
    pub analysis: Option<Analysis>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let gate = PasscodeGate::new(config.passcode.clone());
        let mut query = SearchQuery::new();
        for key in FieldKey::RAW {
            query = query.with_term(key, "");
        }
        Self {
            authenticated: gate.is_open(),
            gate,
            passcode_input: String::new(),
            page: Page::Search,
            cache: DatasetCache::new(config.cache_capacity),
            source: None,
            dataset: None,
            query,
            view: None,
            distribution_field: FieldKey::IpcGroup,
            analysis: None,
            status_message: None,
            config,
        }
    }

    /// Check the passcode box against the gate.
    pub fn try_authenticate(&mut self) -> bool {
        if self.gate.verify(&self.passcode_input) {
            log::info!("Passcode accepted");
            self.authenticated = true;
            self.status_message = None;
        } else {
            log::warn!("Passcode rejected");
            self.status_message = Some("Invalid credentials.".to_string());
        }
        self.passcode_input.clear();
        self.authenticated
    }

    /// Load a file through the cache. On failure the previous dataset is
    /// dropped and the error becomes the status message.
    pub fn load_path(&mut self, path: &Path) {
        match self.cache.load(path) {
            Ok(dataset) => {
                log::info!(
                    "Loaded {} records with columns {:?}",
                    dataset.len(),
                    dataset
                        .schema()
                        .columns()
                        .iter()
                        .map(|c| c.name())
                        .collect::<Vec<_>>()
                );
                self.source = Some(path.to_path_buf());
                self.set_dataset(dataset);
            }
            Err(e) => {
                log::error!("Failed to load file: {e}");
                self.source = None;
                self.dataset = None;
                self.view = None;
                self.analysis = None;
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    /// Ingest a newly loaded dataset and apply the current search.
    pub fn set_dataset(&mut self, dataset: Arc<Dataset>) {
        self.dataset = Some(dataset);
        self.status_message = None;
        self.refilter();
    }

    /// Forget cached datasets so the next load re-reads from disk.
    pub fn clear_cache(&mut self) {
        let (hits, misses) = self.cache.stats();
        log::info!(
            "Clearing {} cached datasets ({hits} hits, {misses} misses)",
            self.cache.len()
        );
        self.cache.clear();
    }

    /// Recompute the view after a search change.
    pub fn refilter(&mut self) {
        self.view = self.dataset.as_deref().map(|ds| filter(ds, &self.query));
        self.analysis = None;
    }

    /// Clear every search box.
    pub fn reset_search(&mut self) {
        self.query.reset();
        self.refilter();
    }

    pub fn set_distribution_field(&mut self, field: FieldKey) {
        if self.distribution_field != field {
            self.distribution_field = field;
            self.analysis = None;
        }
    }

    /// Build the chart inputs for the current view if they are missing.
    pub fn ensure_analysis(&mut self) {
        if self.analysis.is_none() {
            self.analysis = self
                .view
                .as_ref()
                .map(|view| Analysis::compute(view, self.distribution_field, &self.config));
        }
    }

    /// Write the current view as CSV.
    pub fn export_view(&mut self, path: &Path) {
        let Some(view) = &self.view else {
            return;
        };
        match save_csv(view, path) {
            Ok(()) => {
                self.status_message = Some(format!("Exported {} records to {}", view.len(), path.display()));
            }
            Err(e) => {
                log::error!("Export failed: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "\
Application Number,Title,Application Date,Classification,Country Name (Priority)
A1,Lens,2019-01-01,G06K 9/00,Germany
A2,Radio,2020-01-01,H04L,France
A3,Lens hood,2020-05-05,G06K,Germany
";

    fn loaded() -> (tempfile::TempDir, AppState) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("patents.csv");
        std::fs::write(&path, CSV).unwrap();
        let mut state = AppState::new(AppConfig::default());
        state.load_path(&path);
        (dir, state)
    }

    #[test]
    fn passcode_gate_flow() {
        let config = AppConfig {
            passcode: Some("pw".into()),
            ..Default::default()
        };
        let mut state = AppState::new(config);
        assert!(!state.authenticated);

        state.passcode_input = "nope".into();
        assert!(!state.try_authenticate());
        assert_eq!(state.status_message.as_deref(), Some("Invalid credentials."));
        assert!(state.passcode_input.is_empty());

        state.passcode_input = "pw".into();
        assert!(state.try_authenticate());
        assert!(state.status_message.is_none());
    }

    #[test]
    fn load_builds_view_and_analysis() {
        let (_dir, mut state) = loaded();
        assert_eq!(state.view.as_ref().map(Dataset::len), Some(3));
        state.ensure_analysis();
        let analysis = state.analysis.as_ref().unwrap();
        assert_eq!(analysis.growth[0].group, "G06K");
        assert_eq!(analysis.distribution[0].count, 2);
    }

    #[test]
    fn search_narrows_and_reset_restores() {
        let (_dir, mut state) = loaded();
        state
            .query
            .terms
            .insert(Column::Field(FieldKey::Title), "lens".into());
        state.refilter();
        assert_eq!(state.view.as_ref().unwrap().len(), 2);
        // master dataset untouched
        assert_eq!(state.dataset.as_ref().unwrap().len(), 3);

        state.reset_search();
        assert_eq!(state.view.as_ref().unwrap().len(), 3);
    }

    #[test]
    fn distribution_follows_selected_field() {
        let (_dir, mut state) = loaded();
        state.set_distribution_field(FieldKey::CountryPriority);
        state.ensure_analysis();
        let top = &state.analysis.as_ref().unwrap().distribution[0];
        assert_eq!(top.label(), "Germany");
        assert_eq!(top.count, 2);
    }

    #[test]
    fn analysis_is_built_only_on_demand() {
        let (_dir, mut state) = loaded();
        assert!(state.analysis.is_none());

        state.ensure_analysis();
        assert_eq!(state.analysis.as_ref().unwrap().summary[0].count, 3);

        // typing in the search form only invalidates
        state.query.global = "lens".into();
        state.refilter();
        assert!(state.analysis.is_none());

        state.ensure_analysis();
        assert_eq!(state.analysis.as_ref().unwrap().summary[0].count, 2);

        // same field: cached analysis kept
        state.set_distribution_field(FieldKey::IpcGroup);
        assert!(state.analysis.is_some());
        state.set_distribution_field(FieldKey::Classification);
        assert!(state.analysis.is_none());
    }

    #[test]
    fn failed_load_clears_dataset() {
        let (dir, mut state) = loaded();
        state.load_path(&dir.path().join("missing.csv"));
        assert!(state.dataset.is_none());
        assert!(state.analysis.is_none());
        let msg = state.status_message.unwrap();
        assert!(msg.contains("missing.csv") && msg.contains("not found"), "{msg}");
    }

    #[test]
    fn empty_view_still_analyses() {
        let (_dir, mut state) = loaded();
        state.query.global = "no such thing".into();
        state.refilter();
        state.ensure_analysis();
        let analysis = state.analysis.as_ref().unwrap();
        assert!(analysis.growth.is_empty());
        assert!(analysis.distribution.is_empty());
        assert!(analysis.summary.iter().all(|s| s.top.is_none()));
    }

    #[test]
    fn export_writes_current_view() {
        let (dir, mut state) = loaded();
        state.query.global = "radio".into();
        state.refilter();
        let out = dir.path().join("out.csv");
        state.export_view(&out);
        let text = std::fs::read_to_string(&out).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.contains("A2"));
    }
}
