//! Per-build pod lookup accumulation.
//!
//! One `PodRegistry` is created for every build pass and threaded through the
//! transform explicitly, so mappings can never leak between builds running in
//! the same process. Keys are stable identifiers for the duration of a build;
//! the generated values they point at are fresh every run.

use std::collections::BTreeMap;

use crate::guid;

#[derive(Debug, Default)]
pub struct PodRegistry {
    pod_identifiers: BTreeMap<String, String>,
    selector_classes: BTreeMap<String, String>,
}

impl PodRegistry {
    pub fn new() -> Self {
        PodRegistry::default()
    }

    /// The pod's generated identifier, created on first touch and stable for
    /// the rest of the build pass.
    pub fn ensure_pod_identifier(&mut self, pod_name: &str) -> &str {
        self.pod_identifiers
            .entry(pod_name.to_string())
            .or_insert_with(|| guid::pod_identifier(pod_name))
    }

    /// Idempotent overwrite of a pod's identifier.
    pub fn record_pod_identifier(&mut self, pod_name: &str, identifier: &str) {
        self.pod_identifiers
            .insert(pod_name.to_string(), identifier.to_string());
    }

    pub fn pod_identifier(&self, pod_name: &str) -> Option<&str> {
        self.pod_identifiers.get(pod_name).map(String::as_str)
    }

    /// Idempotent overwrite of the class generated for `pod_name` +
    /// `selector`. Recomputing the same key on a later pass yields a fresh
    /// token, so last write wins.
    pub fn record_selector_mapping(&mut self, pod_name: &str, selector: &str, class_name: &str) {
        self.selector_classes
            .insert(selector_key(pod_name, selector), class_name.to_string());
    }

    pub fn selector_mapping(&self, pod_name: &str, selector: &str) -> Option<&str> {
        self.selector_classes
            .get(&selector_key(pod_name, selector))
            .map(String::as_str)
    }

    pub fn pod_count(&self) -> usize {
        self.pod_identifiers.len()
    }

    pub fn selector_count(&self) -> usize {
        self.selector_classes.len()
    }

    /// The canonical lookup document: both maps merged into one flat,
    /// sorted key space. Pod keys are bare pod names; selector keys are the
    /// pod name concatenated with the authored selector text.
    pub fn serialize(&self) -> Result<String, serde_json::Error> {
        let mut merged: BTreeMap<&str, &str> = BTreeMap::new();
        for (pod, identifier) in &self.pod_identifiers {
            merged.insert(pod.as_str(), identifier.as_str());
        }
        for (key, class_name) in &self.selector_classes {
            merged.insert(key.as_str(), class_name.as_str());
        }
        serde_json::to_string(&merged)
    }
}

fn selector_key(pod_name: &str, selector: &str) -> String {
    format!("{}{}", pod_name, selector)
}
