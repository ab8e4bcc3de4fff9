//! Persisted settings bundles.
//!
//! # Design
//! A bundle is a flat map from field name to `FieldValue`, stored under a
//! bundle id derived from the component name. Storage is a pluggable
//! `Persistence` capability; `SettingsStore` layers schema defaults on top of
//! it. Submitted input goes through `SettingsStore::validate`, which is
//! currently the identity: whatever the admin submits is stored verbatim.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ApiError;
use crate::schema::{FieldSpec, FieldValue};

/// Current value of every setting, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SettingsBundle {
    values: BTreeMap<String, FieldValue>,
}

impl SettingsBundle {
    pub fn new() -> Self {
        Self::default()
    }

    /// A bundle holding each field's default value.
    pub fn defaults(fields: &[FieldSpec]) -> Self {
        fields
            .iter()
            .map(|f| (f.name.clone(), f.default_value.clone()))
            .collect()
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.values.get(name)
    }

    /// The value of `name` as a single string, or `""` when absent.
    pub fn get_str(&self, name: &str) -> &str {
        self.values.get(name).map(FieldValue::as_str).unwrap_or("")
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Fill every field absent from the bundle with its default. Returns the
    /// number of entries added.
    pub fn fill_defaults(&mut self, fields: &[FieldSpec]) -> usize {
        let mut added = 0;
        for field in fields {
            if !self.contains(&field.name) {
                self.values
                    .insert(field.name.clone(), field.default_value.clone());
                added += 1;
            }
        }
        added
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for SettingsBundle {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Derive the storage key for a component: the name lower-cased, with every
/// run of other characters collapsed to `_`, and suffixed with `_options`.
/// A `.php` file path is reduced to its base name first; any other name is
/// used whole, dots and slashes included.
///
/// `"ZnWP WebService Plugin"` becomes `znwp_webservice_plugin_options`.
pub fn bundle_id(name: &str) -> String {
    let stem = match name.strip_suffix(".php") {
        Some(path) => path.rsplit(&['/', '\\'][..]).next().unwrap_or(path),
        None => name,
    };

    let mut id = String::with_capacity(stem.len() + 8);
    for ch in stem.chars() {
        if ch.is_ascii_alphanumeric() {
            id.push(ch.to_ascii_lowercase());
        } else if !id.is_empty() && !id.ends_with('_') {
            id.push('_');
        }
    }
    if !id.is_empty() && !id.ends_with('_') {
        id.push('_');
    }
    id.push_str("options");
    id
}

/// Key-value storage for settings bundles.
pub trait Persistence {
    /// Fetch the bundle stored under `id`, or `None` if nothing was stored.
    fn get(&self, id: &str) -> Result<Option<SettingsBundle>, ApiError>;

    /// Store `bundle` under `id`, replacing any previous value.
    fn set(&mut self, id: &str, bundle: &SettingsBundle) -> Result<(), ApiError>;
}

/// Process-local storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryPersistence {
    bundles: HashMap<String, SettingsBundle>,
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Persistence for MemoryPersistence {
    fn get(&self, id: &str) -> Result<Option<SettingsBundle>, ApiError> {
        Ok(self.bundles.get(id).cloned())
    }

    fn set(&mut self, id: &str, bundle: &SettingsBundle) -> Result<(), ApiError> {
        self.bundles.insert(id.to_string(), bundle.clone());
        Ok(())
    }
}

/// One pretty-printed JSON document per bundle, at `<root>/<id>.json`.
#[derive(Debug, Clone)]
pub struct JsonFilePersistence {
    root: PathBuf,
}

impl JsonFilePersistence {
    /// The root must be an existing, writable directory.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, ApiError> {
        let root = root.into();
        let attr = fs::metadata(&root).map_err(|e| io_error(&root, e))?;
        if !attr.is_dir() {
            return Err(ApiError::Persistence(format!(
                "{} is not a directory",
                root.display()
            )));
        }
        if attr.permissions().readonly() {
            return Err(ApiError::Persistence(format!(
                "{} is not writable",
                root.display()
            )));
        }
        Ok(Self { root })
    }

    pub fn path_for(&self, id: &str) -> Result<PathBuf, ApiError> {
        if id.is_empty() || id.contains(&['/', '\\'][..]) || id.starts_with('.') {
            return Err(ApiError::Persistence(format!("invalid bundle id {id:?}")));
        }
        Ok(self.root.join(format!("{id}.json")))
    }
}

impl Persistence for JsonFilePersistence {
    fn get(&self, id: &str) -> Result<Option<SettingsBundle>, ApiError> {
        let path = self.path_for(id)?;
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_error(&path, e)),
        };
        Ok(Some(serde_json::from_str(&raw)?))
    }

    fn set(&mut self, id: &str, bundle: &SettingsBundle) -> Result<(), ApiError> {
        let path = self.path_for(id)?;
        let raw = serde_json::to_string_pretty(bundle)?;
        fs::write(&path, raw).map_err(|e| io_error(&path, e))
    }
}

fn io_error(path: &Path, error: io::Error) -> ApiError {
    ApiError::Persistence(format!("{}: {error}", path.display()))
}

/// Schema-aware access to persisted bundles.
#[derive(Debug)]
pub struct SettingsStore<P> {
    persistence: P,
    fields: Vec<FieldSpec>,
}

impl<P: Persistence> SettingsStore<P> {
    pub fn new(persistence: P, fields: Vec<FieldSpec>) -> Self {
        Self {
            persistence,
            fields,
        }
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn persistence(&self) -> &P {
        &self.persistence
    }

    /// Load the bundle stored under `id` with every missing field filled from
    /// the schema. The first load of an unknown id stores the defaulted
    /// bundle.
    pub fn load(&mut self, id: &str) -> Result<SettingsBundle, ApiError> {
        match self.persistence.get(id)? {
            Some(mut bundle) => {
                let added = bundle.fill_defaults(&self.fields);
                debug!(bundle = id, defaults_added = added, "loaded settings");
                Ok(bundle)
            }
            None => {
                let bundle = SettingsBundle::defaults(&self.fields);
                self.persistence.set(id, &bundle)?;
                debug!(bundle = id, "created settings from defaults");
                Ok(bundle)
            }
        }
    }

    /// Validate `input` and store it under `id`. Returns what was stored.
    pub fn save(&mut self, id: &str, input: SettingsBundle) -> Result<SettingsBundle, ApiError> {
        let bundle = Self::validate(input);
        self.persistence.set(id, &bundle)?;
        debug!(bundle = id, entries = bundle.len(), "saved settings");
        Ok(bundle)
    }

    /// Submitted settings are accepted unchanged; no sanitization happens.
    pub fn validate(input: SettingsBundle) -> SettingsBundle {
        input
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::webservice_fields;

    const ID: &str = "znwp_webservice_plugin_options";

    fn store() -> SettingsStore<MemoryPersistence> {
        SettingsStore::new(MemoryPersistence::new(), webservice_fields())
    }

    struct Unavailable;

    impl Persistence for Unavailable {
        fn get(&self, _id: &str) -> Result<Option<SettingsBundle>, ApiError> {
            Err(ApiError::Persistence("backend offline".into()))
        }

        fn set(&mut self, _id: &str, _bundle: &SettingsBundle) -> Result<(), ApiError> {
            Err(ApiError::Persistence("backend offline".into()))
        }
    }

    #[test]
    fn bundle_id_from_display_name() {
        assert_eq!(bundle_id("ZnWP WebService Plugin"), ID);
    }

    #[test]
    fn bundle_id_from_plugin_file() {
        assert_eq!(
            bundle_id("znwp-webservice-plugin/znwp-webservice-plugin.php"),
            "znwp_webservice_plugin_options"
        );
        assert_eq!(bundle_id("Already_Underscored"), "already_underscored_options");
    }

    #[test]
    fn bundle_id_keeps_dots_and_slashes_in_plain_names() {
        assert_ne!(bundle_id("Foo 1.5"), bundle_id("Foo 1.6"));
        assert_eq!(bundle_id("Foo 1.5"), "foo_1_5_options");
        assert_eq!(
            bundle_id("Acme Service v1.2 Plugin"),
            "acme_service_v1_2_plugin_options"
        );
        assert_eq!(bundle_id("Foo/Bar Plugin"), "foo_bar_plugin_options");
        assert_eq!(bundle_id("acme-1.2.php"), "acme_1_2_options");
    }

    #[test]
    fn first_load_fills_and_persists_defaults() {
        let mut store = store();
        let bundle = store.load(ID).unwrap();
        assert_eq!(bundle.get_str("url"), "http://httpbin.org/");
        assert_eq!(bundle.get_str("method"), "GET");
        assert_eq!(bundle.get_str("sslverify"), "0");
        assert_eq!(bundle.get_str("headers"), "");
        assert_eq!(bundle.len(), 6);
        assert_eq!(store.persistence().get(ID).unwrap(), Some(bundle));
    }

    #[test]
    fn load_fills_only_missing_fields() {
        let mut persistence = MemoryPersistence::new();
        let partial: SettingsBundle = [("method", "POST")].into_iter().collect();
        persistence.set(ID, &partial).unwrap();
        let mut store = SettingsStore::new(persistence, webservice_fields());

        let bundle = store.load(ID).unwrap();
        assert_eq!(bundle.get_str("method"), "POST");
        assert_eq!(bundle.get_str("content_type"), "text/html");
    }

    #[test]
    fn load_then_save_round_trips() {
        let mut store = store();
        let loaded = store.load(ID).unwrap();
        let saved = store.save(ID, loaded.clone()).unwrap();
        assert_eq!(saved, loaded);
        assert_eq!(store.load(ID).unwrap(), loaded);
    }

    #[test]
    fn load_after_save_returns_saved_values() {
        let mut store = store();
        let mut bundle = store.load(ID).unwrap();
        bundle.set("url", "http://example.test/api");
        bundle.set("headers", "X-A=1");
        store.save(ID, bundle.clone()).unwrap();
        assert_eq!(store.load(ID).unwrap(), bundle);
    }

    #[test]
    fn validate_passes_input_through_unchanged() {
        let input: SettingsBundle = [
            ("url", FieldValue::from("<script>alert(1)</script>")),
            ("unknown", FieldValue::Multi(vec!["x".into(), "y".into()])),
        ]
        .into_iter()
        .collect();
        let out = SettingsStore::<MemoryPersistence>::validate(input.clone());
        assert_eq!(out, input);
    }

    #[test]
    fn persistence_failure_propagates() {
        let mut store = SettingsStore::new(Unavailable, webservice_fields());
        assert!(matches!(store.load(ID), Err(ApiError::Persistence(_))));
        assert!(matches!(
            store.save(ID, SettingsBundle::new()),
            Err(ApiError::Persistence(_))
        ));
    }

    #[test]
    fn json_file_persistence_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let mut files = JsonFilePersistence::new(dir.path()).unwrap();
        assert_eq!(files.get(ID).unwrap(), None);

        let bundle: SettingsBundle = [
            ("method", FieldValue::from("POST")),
            ("tags", FieldValue::Multi(vec!["a".into(), "b".into()])),
        ]
        .into_iter()
        .collect();
        files.set(ID, &bundle).unwrap();
        assert!(dir.path().join(format!("{ID}.json")).exists());
        assert_eq!(files.get(ID).unwrap(), Some(bundle));
    }

    #[test]
    fn json_file_persistence_rejects_bad_root_and_ids() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("plain.txt");
        fs::write(&file, "x").unwrap();
        assert!(JsonFilePersistence::new(&file).is_err());
        assert!(JsonFilePersistence::new(dir.path().join("missing")).is_err());

        let files = JsonFilePersistence::new(dir.path()).unwrap();
        assert!(files.get("../escape").is_err());
        assert!(files.get("").is_err());
    }

    #[test]
    fn corrupt_file_is_a_serialization_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(format!("{ID}.json")), "{not json").unwrap();
        let files = JsonFilePersistence::new(dir.path()).unwrap();
        assert!(matches!(files.get(ID), Err(ApiError::Serialization(_))));
    }
}
