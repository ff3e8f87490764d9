use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Per-region set of selected municipality names. Selections live for the
/// whole session, whether or not the region is currently displayed.
#[derive(Debug, Default, Clone)]
pub struct SelectionStore {
    selected: HashMap<String, BTreeSet<String>>,
}

impl SelectionStore {
    pub fn seed<I: IntoIterator<Item = String>>(regions: I) -> Self {
        let selected = regions.into_iter().map(|r| (r, BTreeSet::new())).collect();
        SelectionStore { selected }
    }

    /// Adds or removes one name. Toggling to the state already held is a
    /// no-op.
    pub fn toggle(&mut self, region: &str, name: &str, included: bool) {
        let set = self.selected.entry(region.to_string()).or_default();
        if included {
            set.insert(name.to_string());
        } else {
            set.remove(name);
        }
    }

    /// Adds every candidate not already present. Other regions are untouched.
    pub fn select_all<'a, I: IntoIterator<Item = &'a String>>(&mut self, region: &str, names: I) {
        let set = self.selected.entry(region.to_string()).or_default();
        set.extend(names.into_iter().cloned());
    }

    pub fn is_selected(&self, region: &str, name: &str) -> bool {
        self.selected
            .get(region)
            .map(|set| set.contains(name))
            .unwrap_or(false)
    }

    /// Only regions with at least one selection, for export.
    pub fn non_empty_regions(&self) -> BTreeMap<String, Vec<String>> {
        self.selected
            .iter()
            .filter(|(_, set)| !set.is_empty())
            .map(|(region, set)| (region.clone(), set.iter().cloned().collect()))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.values().all(|set| set.is_empty())
    }
}
