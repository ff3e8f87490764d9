use crate::cache::RegionCache;
use crate::checklist::{Checklist, FilterDebouncer};
use crate::config::AppConfig;
use crate::error::MapError;
use crate::render::RenderPlan;
use crate::snapshot;
use crate::store::SelectionStore;
use crate::types::BoundaryDataset;
use std::path::PathBuf;
use std::time::Instant;
use tracing::debug;

/// The command core: owns the session state and exposes the operations the
/// UI adapters (HTTP server, export CLI) call. Never touches presentation.
pub struct App {
    pub config: AppConfig,
    cache: RegionCache,
    store: SelectionStore,
    checklist: Checklist,
    debouncer: FilterDebouncer,
    active: Option<String>,
}

impl App {
    pub fn new(config: AppConfig) -> Self {
        let cache = RegionCache::new(config.input.regions.clone());
        let store = SelectionStore::seed(cache.regions());
        App {
            config,
            cache,
            store,
            checklist: Checklist::default(),
            debouncer: FilterDebouncer::default(),
            active: None,
        }
    }

    pub fn regions(&self) -> Vec<String> {
        self.cache.regions()
    }

    pub fn checklist(&self) -> &Checklist {
        &self.checklist
    }

    pub fn active_region(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Makes `region` the active one. If its dataset is already cached the
    /// checklist is rebuilt immediately; otherwise the caller fetches the
    /// dataset and hands it to `install_dataset`.
    pub fn set_active(&mut self, region: &str) -> Result<(), MapError> {
        // Validates the region before switching.
        self.cache.source_for(region)?;
        self.active = Some(region.to_string());
        if let Some(dataset) = self.cache.get(region) {
            self.checklist.rebuild(region, dataset, &self.store);
        }
        Ok(())
    }

    pub fn dataset_cached(&self, region: &str) -> bool {
        self.cache.contains(region)
    }

    pub fn source_for(&self, region: &str) -> Result<PathBuf, MapError> {
        self.cache.source_for(region)
    }

    /// Installs a dataset fetched out-of-band. The dataset is always cached,
    /// but the checklist is only rebuilt if `region` is still the active one;
    /// a late result for a superseded region must not overwrite the current
    /// checklist.
    pub fn install_dataset(&mut self, region: &str, dataset: BoundaryDataset) {
        if self.active.as_deref() == Some(region) {
            self.checklist.rebuild(region, &dataset, &self.store);
        } else {
            debug!(region, "discarding stale checklist rebuild");
        }
        self.cache.insert(region, dataset);
    }

    /// Synchronous load path used by the export CLI and tests.
    pub fn ensure_loaded(&mut self, region: &str) -> Result<(), MapError> {
        let dataset = self.cache.ensure_loaded(region)?;
        if self.active.as_deref() == Some(region) {
            self.checklist.rebuild(region, dataset, &self.store);
        }
        Ok(())
    }

    pub fn dataset_names(&self, region: &str) -> Option<&[String]> {
        self.cache.get(region).map(|d| d.names.as_slice())
    }

    pub fn toggle(&mut self, region: &str, name: &str, included: bool) {
        self.store.toggle(region, name, included);
        if self.active.as_deref() == Some(region) {
            self.checklist.set_checked(name, included);
        }
    }

    /// Selects every municipality of the region's cached dataset. A no-op if
    /// the dataset was never loaded, matching the original UI.
    pub fn select_all(&mut self, region: &str) {
        let Some(dataset) = self.cache.get(region) else {
            return;
        };
        let names = dataset.names.clone();
        self.store.select_all(region, &names);
        if self.active.as_deref() == Some(region) {
            self.checklist.check_all();
        }
    }

    pub fn request_filter(&mut self, term: String, now: Instant) {
        self.debouncer.submit(term, now);
    }

    /// Applies the coalesced filter term once its deadline has passed.
    /// Returns true if a term was applied.
    pub fn apply_due_filter(&mut self, now: Instant) -> bool {
        match self.debouncer.due(now) {
            Some(term) => {
                self.checklist.filter(term.trim());
                true
            }
            None => false,
        }
    }

    pub fn render_plan(&self) -> RenderPlan {
        RenderPlan::build(self.cache.loaded(), &self.store, &self.config.colors)
    }

    pub fn build_snapshot(&self) -> Result<Vec<u8>, MapError> {
        snapshot::build_snapshot(self.cache.loaded(), &self.store, &self.config.colors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ColorConfig, ExportConfig, InputConfig, ServerConfig};
    use crate::data::dataset_from_str;
    use std::collections::HashMap;
    use std::fs;
    use std::time::Duration;

    fn dataset(name: &str) -> BoundaryDataset {
        dataset_from_str(&format!(
            r#"{{
                "type": "FeatureCollection",
                "features": [
                    {{"type": "Feature", "properties": {{"name": "{name}"}},
                      "geometry": {{"type": "Polygon", "coordinates": [[
                        [0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]
                      ]]}}}}
                ]
            }}"#
        ))
    }

    fn app_with_regions(dir: &tempfile::TempDir, regions: &[&str]) -> App {
        let mut table = HashMap::new();
        for region in regions {
            let path = dir.path().join(format!("{region}.json"));
            fs::write(
                &path,
                format!(
                    r#"{{"type": "FeatureCollection", "features": [
                        {{"type": "Feature", "properties": {{"name": "Cidade de {region}"}},
                          "geometry": {{"type": "Polygon", "coordinates": [[
                            [0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]
                          ]]}}}}
                    ]}}"#
                ),
            )
            .unwrap();
            table.insert(region.to_string(), path);
        }
        App::new(AppConfig {
            input: InputConfig { regions: table },
            colors: ColorConfig::default(),
            server: ServerConfig { port: 0 },
            export: ExportConfig::default(),
        })
    }

    #[test]
    fn selections_survive_region_switches() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_with_regions(&dir, &["para", "bahia"]);

        app.set_active("para").unwrap();
        app.ensure_loaded("para").unwrap();
        app.toggle("para", "Cidade de para", true);

        app.set_active("bahia").unwrap();
        app.ensure_loaded("bahia").unwrap();
        assert!(!app.checklist().rows[0].checked);

        // Coming back re-derives the checkbox state from the store.
        app.set_active("para").unwrap();
        assert!(app.checklist().rows[0].checked);
    }

    #[test]
    fn stale_fetch_does_not_overwrite_the_active_checklist() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_with_regions(&dir, &["para", "bahia"]);

        // User picks para (fetch outstanding), then switches to bahia.
        app.set_active("para").unwrap();
        app.set_active("bahia").unwrap();
        app.ensure_loaded("bahia").unwrap();

        // para's fetch resolves late.
        app.install_dataset("para", dataset("Belém"));

        assert_eq!(app.checklist().region.as_deref(), Some("bahia"));
        assert_eq!(app.checklist().rows[0].name, "Cidade de bahia");
        // The late dataset is still cached for later use.
        assert!(app.dataset_cached("para"));
    }

    #[test]
    fn select_all_without_a_cached_dataset_is_a_noop() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_with_regions(&dir, &["para"]);
        app.select_all("para");
        assert!(app.build_snapshot().is_err());
    }

    #[test]
    fn debounced_filter_applies_only_the_last_term() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_with_regions(&dir, &["para"]);
        app.set_active("para").unwrap();
        app.ensure_loaded("para").unwrap();

        let start = Instant::now();
        app.request_filter("xyz".to_string(), start);
        app.request_filter("cidade".to_string(), start + Duration::from_millis(50));

        assert!(!app.apply_due_filter(start + Duration::from_millis(100)));
        assert!(app.apply_due_filter(start + Duration::from_millis(400)));
        assert!(app.checklist().rows[0].visible);
        assert!(!app.checklist().no_results);
    }

    #[test]
    fn unknown_region_cannot_become_active() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_with_regions(&dir, &["para"]);
        assert!(matches!(
            app.set_active("atlantis"),
            Err(MapError::UnknownRegion(_))
        ));
        assert_eq!(app.active_region(), None);
    }

    #[test]
    fn export_path_builds_a_snapshot_from_cli_style_commands() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_with_regions(&dir, &["para", "tocantins"]);
        app.ensure_loaded("para").unwrap();
        app.ensure_loaded("tocantins").unwrap();
        app.toggle("para", "Cidade de para", true);
        let html = String::from_utf8(app.build_snapshot().unwrap()).unwrap();
        assert!(html.contains("Cidade de para"));
        // tocantins is embedded too, selected or not.
        assert!(html.contains("Cidade de tocantins"));
    }
}
