use crate::store::SelectionStore;
use crate::types::BoundaryDataset;
use serde::Serialize;
use std::time::{Duration, Instant};

pub const FILTER_DEBOUNCE: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Row {
    pub name: String,
    pub checked: bool,
    pub visible: bool,
}

/// Checkbox list for the active region, derived from the dataset's feature
/// order and the selection store. Filtering only flips visibility; checked
/// state always mirrors the store.
#[derive(Debug, Default, Clone, Serialize)]
pub struct Checklist {
    pub region: Option<String>,
    pub rows: Vec<Row>,
    /// True when a non-empty search term matched nothing; the UI shows a
    /// single placeholder row instead.
    pub no_results: bool,
}

impl Checklist {
    pub fn rebuild(&mut self, region: &str, dataset: &BoundaryDataset, store: &SelectionStore) {
        self.region = Some(region.to_string());
        self.rows = dataset
            .names
            .iter()
            .map(|name| Row {
                name: name.clone(),
                checked: store.is_selected(region, name),
                visible: true,
            })
            .collect();
        // Switching regions resets the search, as the original UI does.
        self.no_results = false;
    }

    /// Case-insensitive substring filter. An empty term shows every row.
    pub fn filter(&mut self, term: &str) {
        let needle = term.to_lowercase();
        let mut any_visible = false;
        for row in &mut self.rows {
            row.visible = row.name.to_lowercase().contains(&needle);
            any_visible |= row.visible;
        }
        self.no_results = !term.is_empty() && !any_visible;
    }

    pub fn set_checked(&mut self, name: &str, checked: bool) {
        if let Some(row) = self.rows.iter_mut().find(|row| row.name == name) {
            row.checked = checked;
        }
    }

    pub fn check_all(&mut self) {
        for row in &mut self.rows {
            row.checked = true;
        }
    }
}

/// Coalesces rapid filter requests: only the latest term survives, applied
/// once its deadline passes. Deadlines are injected so tests need no sleeps.
#[derive(Debug, Default)]
pub struct FilterDebouncer {
    pending: Option<(String, Instant)>,
}

impl FilterDebouncer {
    pub fn submit(&mut self, term: String, now: Instant) {
        self.pending = Some((term, now + FILTER_DEBOUNCE));
    }

    /// Takes the pending term if its deadline has passed.
    pub fn due(&mut self, now: Instant) -> Option<String> {
        match &self.pending {
            Some((_, deadline)) if *deadline <= now => self.pending.take().map(|(term, _)| term),
            _ => None,
        }
    }
}
