use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::domain::Tag;
use crate::listeners::{Listeners, Subscription};

/// Active selections: facet key to the ordered, de-duplicated values
/// selected in it. A facet key is present only while it has values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterState {
    facets: IndexMap<String, Vec<String>>,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.facets.is_empty()
    }

    pub fn len(&self) -> usize {
        self.facets.len()
    }

    pub fn values(&self, facet: &str) -> &[String] {
        self.facets.get(facet).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, facet: &str, value: &str) -> bool {
        self.values(facet).iter().any(|existing| existing == value)
    }

    /// Facets in the order they were first selected.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.facets
            .iter()
            .map(|(facet, values)| (facet.as_str(), values.as_slice()))
    }

    /// Appends `value` unless already selected. Returns whether it was added.
    pub fn insert(&mut self, facet: &str, value: &str) -> bool {
        if self.contains(facet, value) {
            return false;
        }
        self.facets
            .entry(facet.to_string())
            .or_default()
            .push(value.to_string());
        true
    }

    /// Removes `value`, returning the index it occupied.
    pub fn remove(&mut self, facet: &str, value: &str) -> Option<usize> {
        let index = self
            .values(facet)
            .iter()
            .position(|existing| existing == value)?;
        self.remove_at(facet, index);
        Some(index)
    }

    fn remove_at(&mut self, facet: &str, index: usize) -> Option<String> {
        let values = self.facets.get_mut(facet)?;
        if index >= values.len() {
            return None;
        }
        let removed = values.remove(index);
        if values.is_empty() {
            self.facets.shift_remove(facet);
        }
        Some(removed)
    }

    fn clear(&mut self) {
        self.facets.clear();
    }
}

/// Which tag `FilterStore::remove_tag` should drop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagIndex {
    At(usize),
    /// The most recently added tag; what backspace on an empty input removes.
    Last,
}

#[derive(Debug, Clone)]
pub struct FilterChange {
    pub revision: u64,
    pub state: FilterState,
}

/// Owns the filter state and the display tags paired with it.
///
/// Every facet in the filter state has a tag sequence of the same length,
/// index-aligned with its values; both are always written together before
/// subscribers are notified.
pub struct FilterStore {
    state: FilterState,
    tags: IndexMap<String, Vec<Tag>>,
    revision: u64,
    listeners: Listeners<FilterChange>,
}

impl FilterStore {
    pub fn new() -> Self {
        Self {
            state: FilterState::new(),
            tags: IndexMap::new(),
            revision: 0,
            listeners: Listeners::new(),
        }
    }

    pub fn state(&self) -> &FilterState {
        &self.state
    }

    pub fn values(&self, facet: &str) -> &[String] {
        self.state.values(facet)
    }

    pub fn tags(&self, facet: &str) -> &[Tag] {
        self.tags.get(facet).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_selected(&self, facet: &str, value: &str) -> bool {
        self.state.contains(facet, value)
    }

    pub fn is_empty(&self) -> bool {
        self.state.is_empty()
    }

    /// Incremented once for every call that changed the state.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn subscribe(&self, listener: impl FnMut(&FilterChange) + 'static) -> Subscription {
        self.listeners.subscribe(listener)
    }

    pub fn toggle_value(&mut self, facet: &str, value: &str, checked: bool) {
        if checked {
            if !self.state.insert(facet, value) {
                return;
            }
            self.tags
                .entry(facet.to_string())
                .or_default()
                .push(Tag::new(value));
        } else {
            let Some(index) = self.state.remove(facet, value) else {
                return;
            };
            self.remove_tag_at(facet, index);
        }
        self.changed();
    }

    pub fn add_tag(&mut self, facet: &str, tag: Tag) {
        if !self.state.insert(facet, &tag.text) {
            return;
        }
        self.tags.entry(facet.to_string()).or_default().push(tag);
        self.changed();
    }

    /// Removing from an empty or unknown facet, or past the end, does nothing.
    pub fn remove_tag(&mut self, facet: &str, index: TagIndex) {
        let len = self.state.values(facet).len();
        let index = match index {
            TagIndex::Last if len > 0 => len - 1,
            TagIndex::Last => return,
            TagIndex::At(index) => index,
        };
        if self.state.remove_at(facet, index).is_none() {
            return;
        }
        self.remove_tag_at(facet, index);
        self.changed();
    }

    pub fn clear(&mut self) {
        if self.state.is_empty() && self.tags.is_empty() {
            return;
        }
        self.state.clear();
        self.tags.clear();
        self.changed();
    }

    fn remove_tag_at(&mut self, facet: &str, index: usize) {
        if let Some(tags) = self.tags.get_mut(facet) {
            if index < tags.len() {
                tags.remove(index);
            }
            if tags.is_empty() {
                self.tags.shift_remove(facet);
            }
        }
    }

    fn changed(&mut self) {
        self.revision += 1;
        tracing::debug!(
            revision = self.revision,
            facets = self.state.len(),
            "filter state changed"
        );
        let change = FilterChange {
            revision: self.revision,
            state: self.state.clone(),
        };
        self.listeners.emit(&change);
    }
}

impl Default for FilterStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    fn assert_aligned(store: &FilterStore) {
        for (facet, values) in store.state().iter() {
            assert!(!values.is_empty(), "facet {facet} kept with no values");
            let texts: Vec<_> = store.tags(facet).iter().map(|t| t.text.as_str()).collect();
            assert_eq!(texts, values.iter().map(String::as_str).collect::<Vec<_>>());
        }
        assert_eq!(store.tags.len(), store.state().len());
    }

    #[test]
    fn toggle_adds_once_and_removes_key_when_empty() {
        let mut store = FilterStore::new();
        store.toggle_value("measure_type", "Unemployment", true);
        store.toggle_value("measure_type", "Unemployment", true);
        assert_eq!(store.values("measure_type"), ["Unemployment".to_string()]);

        store.toggle_value("measure_type", "Unemployment", false);
        assert!(store.is_empty());
        assert!(store.tags("measure_type").is_empty());
        assert_aligned(&store);
    }

    #[test]
    fn toggle_preserves_insertion_order() {
        let mut store = FilterStore::new();
        store.toggle_value("area_type", "Statewide", true);
        store.toggle_value("measure_type", "Employment", true);
        store.toggle_value("area_type", "Counties and equivalents", true);
        let facets: Vec<_> = store.state().iter().map(|(facet, _)| facet).collect();
        assert_eq!(facets, vec!["area_type", "measure_type"]);
        assert_eq!(
            store.values("area_type"),
            ["Statewide".to_string(), "Counties and equivalents".to_string()]
        );
    }

    #[test]
    fn remove_tag_on_absent_facet_is_noop() {
        let mut store = FilterStore::new();
        store.remove_tag("area", TagIndex::Last);
        store.remove_tag("area", TagIndex::At(3));
        assert!(store.is_empty());
        assert_eq!(store.revision(), 0);
    }

    #[test]
    fn remove_tag_by_index_keeps_alignment() {
        let mut store = FilterStore::new();
        store.add_tag("area", Tag::new("California"));
        store.add_tag("area", Tag::new("Texas"));
        store.add_tag("area", Tag::new("Ohio"));
        store.remove_tag("area", TagIndex::At(1));
        assert_eq!(
            store.values("area"),
            ["California".to_string(), "Ohio".to_string()]
        );
        store.remove_tag("area", TagIndex::At(9));
        assert_eq!(store.values("area").len(), 2);
        assert_aligned(&store);
    }

    #[test]
    fn duplicate_tag_is_ignored() {
        let mut store = FilterStore::new();
        store.add_tag("area", Tag::new("California"));
        store.add_tag("area", Tag::new("California"));
        assert_eq!(store.tags("area").len(), 1);
        assert_eq!(store.revision(), 1);
    }

    #[test]
    fn mixed_operations_keep_tags_aligned() {
        let mut store = FilterStore::new();
        let ops: &[(&str, &str, bool)] = &[
            ("area", "Texas", true),
            ("area", "Ohio", true),
            ("period", "2017-01", true),
            ("area", "Texas", false),
            ("period", "2017-01", false),
            ("period", "2017-02", true),
        ];
        for (facet, value, checked) in ops {
            store.toggle_value(facet, value, *checked);
            store.add_tag("label", Tag::new(format!("{facet}-{value}")));
            store.remove_tag("label", TagIndex::Last);
            store.remove_tag("missing", TagIndex::Last);
            assert_aligned(&store);
        }
        assert_eq!(store.values("area"), ["Ohio".to_string()]);
        assert_eq!(store.values("period"), ["2017-02".to_string()]);
    }

    #[test]
    fn notifies_once_per_effective_call() {
        let mut store = FilterStore::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let _subscription = store.subscribe(move |change| {
            sink.borrow_mut().push((change.revision, change.state.len()));
        });

        store.add_tag("area", Tag::new("California"));
        store.toggle_value("measure_type", "Employment", true);
        store.toggle_value("measure_type", "Employment", true);
        store.clear();
        store.clear();

        assert_eq!(*seen.borrow(), vec![(1, 1), (2, 2), (3, 0)]);
    }

    #[test]
    fn dropped_subscription_stops_notifications() {
        let mut store = FilterStore::new();
        let count = Rc::new(RefCell::new(0));
        let sink = count.clone();
        let subscription = store.subscribe(move |_| *sink.borrow_mut() += 1);
        store.toggle_value("area_type", "Statewide", true);
        drop(subscription);
        store.toggle_value("area_type", "Statewide", false);
        assert_eq!(*count.borrow(), 1);
    }
}
