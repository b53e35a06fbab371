//! Single mutable value record plus touched/error bookkeeping.

use std::collections::{BTreeMap, BTreeSet};

use onboard_domain::{keys, FieldValue, FormValues};
use tracing::debug;

use super::engine::FieldErrors;

/// Holds the wizard's values, errors and touched set.
///
/// Every write builds the next value record and swaps it in whole, bumping
/// [`FormStateStore::revision`]. Writing a parent field clears its dependent
/// fields inside the same swap, so a stale child value is never observable.
#[derive(Debug, Clone, Default)]
pub struct FormStateStore {
    values: FormValues,
    errors: FieldErrors,
    touched: BTreeSet<String>,
    dependents: BTreeMap<String, Vec<String>>,
    revision: u64,
}

impl FormStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store with the location cascade used by the listing form:
    /// state clears city and locality, city clears locality.
    pub fn for_listing() -> Self {
        Self::new()
            .with_dependency(keys::STATE, &[keys::CITY, keys::LOCALITY])
            .with_dependency(keys::CITY, &[keys::LOCALITY])
    }

    pub fn with_dependency(mut self, parent: &str, children: &[&str]) -> Self {
        let entry = self.dependents.entry(parent.to_string()).or_default();
        for child in children {
            if !entry.iter().any(|existing| existing == child) {
                entry.push(child.to_string());
            }
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.values.get(key)
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Writes one field (and clears its dependents). Returns the keys that
    /// were cleared as a consequence.
    pub fn set(&mut self, key: &str, value: FieldValue) -> Vec<String> {
        self.set_many(vec![(key.to_string(), value)])
    }

    /// Applies a batch as one update. Dependents of any written parent are
    /// cleared unless the batch writes them explicitly.
    pub fn set_many(&mut self, updates: Vec<(String, FieldValue)>) -> Vec<String> {
        if updates.is_empty() {
            return Vec::new();
        }
        let explicit: BTreeSet<&str> = updates.iter().map(|(key, _)| key.as_str()).collect();
        let mut cleared = Vec::new();
        for (key, _) in &updates {
            for child in self.dependents_of(key) {
                if !explicit.contains(child.as_str()) && !cleared.contains(&child) {
                    cleared.push(child);
                }
            }
        }

        let mut next = self.values.clone();
        for child in &cleared {
            next.insert(child.clone(), FieldValue::Text(String::new()));
        }
        for (key, value) in updates {
            self.touched.insert(key.clone());
            next.insert(key, value);
        }
        self.replace_values(next);

        if !cleared.is_empty() {
            debug!(cleared = ?cleared, "cleared dependent fields");
        }
        cleared
    }

    /// Empties a field without marking it touched.
    pub fn clear(&mut self, key: &str) {
        let mut next = self.values.clone();
        if next.remove(key).is_some() {
            self.replace_values(next);
        }
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn error(&self, key: &str) -> Option<&str> {
        self.errors.get(key).map(String::as_str)
    }

    pub fn set_errors(&mut self, errors: FieldErrors) {
        self.errors = errors;
    }

    /// Sets or clears the message for one field.
    pub fn set_error(&mut self, key: &str, message: Option<String>) {
        match message {
            Some(message) => {
                self.errors.insert(key.to_string(), message);
            }
            None => {
                self.errors.remove(key);
            }
        }
    }

    pub fn touched(&self) -> &BTreeSet<String> {
        &self.touched
    }

    pub fn is_touched(&self, key: &str) -> bool {
        self.touched.contains(key)
    }

    pub fn touch<I, S>(&mut self, keys: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.touched.extend(keys.into_iter().map(Into::into));
    }

    /// Replaces all values and forgets errors and touched state.
    pub fn reset(&mut self, values: FormValues) {
        self.errors.clear();
        self.touched.clear();
        self.replace_values(values);
    }

    fn replace_values(&mut self, next: FormValues) {
        self.values = next;
        self.revision += 1;
    }

    /// Transitive dependents of `key`, each listed once.
    fn dependents_of(&self, key: &str) -> Vec<String> {
        let mut found: Vec<String> = Vec::new();
        let mut pending: Vec<&str> = vec![key];
        while let Some(current) = pending.pop() {
            let Some(children) = self.dependents.get(current) else {
                continue;
            };
            for child in children {
                if child != key && !found.contains(child) {
                    found.push(child.clone());
                    pending.push(child.as_str());
                }
            }
        }
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_is_visible_to_next_get() {
        let mut store = FormStateStore::new();
        store.set("name", FieldValue::text("Ana"));
        assert_eq!(store.get("name"), Some(&FieldValue::text("Ana")));
        assert!(store.is_touched("name"));
    }

    #[test]
    fn changing_state_clears_city_and_locality_in_one_revision() {
        let mut store = FormStateStore::for_listing();
        store.set_many(vec![
            ("state".into(), FieldValue::text("Karnataka")),
            ("city".into(), FieldValue::text("Mumbai")),
            ("locality".into(), FieldValue::text("Bandra")),
        ]);
        let before = store.revision();

        let cleared = store.set("state", FieldValue::text("Maharashtra"));

        assert_eq!(store.revision(), before + 1);
        assert_eq!(cleared, vec!["city".to_string(), "locality".to_string()]);
        assert!(store.values().is_blank("city"));
        assert!(store.values().is_blank("locality"));
        assert_eq!(store.values().text("state"), Some("Maharashtra"));
    }

    #[test]
    fn explicit_child_in_batch_survives_parent_change() {
        let mut store = FormStateStore::for_listing();
        store.set("locality", FieldValue::text("Andheri"));
        store.set_many(vec![
            ("state".into(), FieldValue::text("Maharashtra")),
            ("city".into(), FieldValue::text("Mumbai")),
        ]);
        assert_eq!(store.values().text("city"), Some("Mumbai"));
        assert!(store.values().is_blank("locality"));
    }

    #[test]
    fn reset_replaces_values_and_forgets_errors() {
        let mut store = FormStateStore::new();
        store.set("name", FieldValue::text("Ana"));
        store.set_error("name", Some("bad".into()));

        let mut fresh = FormValues::new();
        fresh.insert("bio", FieldValue::text("hello"));
        store.reset(fresh.clone());

        assert_eq!(store.values(), &fresh);
        assert!(store.errors().is_empty());
        assert!(store.touched().is_empty());
    }

    #[test]
    fn clear_does_not_touch() {
        let mut store = FormStateStore::new();
        store.reset({
            let mut values = FormValues::new();
            values.insert("bio", FieldValue::text("hello"));
            values
        });
        store.clear("bio");
        assert!(store.get("bio").is_none());
        assert!(!store.is_touched("bio"));
    }
}
