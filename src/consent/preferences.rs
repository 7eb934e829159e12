//! Preference store: the visitor's consent record and its backing cookie.
//!
//! The record lives in one cookie as a JSON object mapping optional category
//! names to the literal strings `"on"` / `"off"`. That encoding is a
//! compatibility contract with cookies written by earlier sessions.
//!
//! Loading is forgiving. A stored cookie that is not JSON, not an object of
//! strings, or lacks an entry for a currently declared optional category is
//! deleted and the record is rebuilt from defaults in full. Extra keys for
//! categories no longer declared are tolerated.

use crate::base::consenterror::ConsentError;
use crate::base::context::JsonResultExt;
use crate::consent::config::ConsentConfig;
use crate::consent::events::{ConsentEvent, EventBus};
use crate::consent::manifest::ManifestClassifier;
use crate::cookies::access::CookieAccess;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Stored encoding of a granted category.
pub const CONSENT_ON: &str = "on";
/// Stored encoding of a refused category.
pub const CONSENT_OFF: &str = "off";

/// The serialized (string-valued) form of a [`PreferenceRecord`].
pub type EncodedPreferences = BTreeMap<String, String>;

/// Optional-category name -> consent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PreferenceRecord(BTreeMap<String, bool>);

impl PreferenceRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, category: impl Into<String>, granted: bool) -> Option<bool> {
        self.0.insert(category.into(), granted)
    }

    pub fn get(&self, category: &str) -> Option<bool> {
        self.0.get(category).copied()
    }

    /// Consent for `category`; an absent entry counts as refused.
    pub fn is_granted(&self, category: &str) -> bool {
        self.get(category).unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> + '_ {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// `true` -> `"on"`, `false` -> `"off"`.
    pub fn to_encoded(&self) -> EncodedPreferences {
        self.0
            .iter()
            .map(|(k, v)| {
                let encoded = if *v { CONSENT_ON } else { CONSENT_OFF };
                (k.clone(), encoded.to_string())
            })
            .collect()
    }

    /// `"on"` -> `true`, anything else -> `false`.
    pub fn from_encoded(encoded: &EncodedPreferences) -> Self {
        encoded
            .iter()
            .map(|(k, v)| (k.clone(), v == CONSENT_ON))
            .collect()
    }
}

impl<K: Into<String>> FromIterator<(K, bool)> for PreferenceRecord {
    fn from_iter<I: IntoIterator<Item = (K, bool)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Where the current record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LoadState {
    Unloaded,
    LoadedFromCookie,
    LoadedFromDefaults,
}

impl fmt::Display for LoadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LoadState::Unloaded => "unloaded",
            LoadState::LoadedFromCookie => "cookie",
            LoadState::LoadedFromDefaults => "defaults",
        };
        f.write_str(s)
    }
}

/// Loads, validates, holds and persists the preference record.
pub struct PreferenceStore {
    cookie_name: String,
    expiry_days: i64,
    secure: bool,
    default_consent: bool,
    classifier: Arc<ManifestClassifier>,
    access: CookieAccess,
    events: EventBus,
    record: PreferenceRecord,
    state: LoadState,
}

impl fmt::Debug for PreferenceStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreferenceStore")
            .field("cookie_name", &self.cookie_name)
            .field("state", &self.state)
            .field("record", &self.record)
            .finish()
    }
}

impl PreferenceStore {
    pub fn new(
        config: &ConsentConfig,
        classifier: Arc<ManifestClassifier>,
        access: CookieAccess,
        events: EventBus,
    ) -> Self {
        Self {
            cookie_name: config.preference_cookie_name.clone(),
            expiry_days: config.preference_cookie_expiry_days,
            secure: config.preference_cookie_secure,
            default_consent: config.default_consent,
            classifier,
            access,
            events,
            record: PreferenceRecord::new(),
            state: LoadState::Unloaded,
        }
    }

    /// Resolve the record from the stored cookie, falling back to defaults.
    ///
    /// Never fails: an unusable cookie is deleted and replaced by defaults.
    pub fn process_preferences(&mut self) -> &PreferenceRecord {
        match self.load_from_cookie() {
            Ok(Some(record)) => {
                self.record = record;
                self.state = LoadState::LoadedFromCookie;
            }
            Ok(None) => self.load_defaults(),
            Err(e) => {
                tracing::warn!(cookie = %self.cookie_name, error = %e, "discarding stored preferences");
                self.access.delete_cookie(&self.cookie_name);
                self.load_defaults();
            }
        }

        tracing::debug!(state = %self.state, categories = self.record.len(), "preferences processed");
        self.events
            .emit(ConsentEvent::PreferencesLoaded(self.record.to_encoded()));
        &self.record
    }

    /// Read and validate the stored cookie. `Ok(None)` when there is none.
    pub fn load_from_cookie(&self) -> Result<Option<PreferenceRecord>, ConsentError> {
        match self.access.get_cookie(&self.cookie_name) {
            Some(cookie) => self.parse_stored(&cookie.value).map(Some),
            None => Ok(None),
        }
    }

    fn parse_stored(&self, raw: &str) -> Result<PreferenceRecord, ConsentError> {
        let value: serde_json::Value = serde_json::from_str(raw).cookie_context(&self.cookie_name)?;

        let object = match value {
            serde_json::Value::Object(object) => object,
            other => {
                return Err(ConsentError::preference_shape(
                    &self.cookie_name,
                    json_type_name(&other),
                ))
            }
        };

        let mut encoded = EncodedPreferences::new();
        for (key, value) in object {
            match value {
                serde_json::Value::String(s) => {
                    encoded.insert(key, s);
                }
                other => {
                    return Err(ConsentError::preference_shape(
                        &self.cookie_name,
                        format!("{} for {:?}", json_type_name(&other), key),
                    ))
                }
            }
        }

        if let Some(missing) = self
            .classifier
            .optional_categories()
            .find(|category| !encoded.contains_key(&category.name))
        {
            return Err(ConsentError::missing_preference(&missing.name));
        }

        Ok(PreferenceRecord::from_encoded(&encoded))
    }

    /// Every optional category gets the configured default consent.
    pub fn load_defaults(&mut self) {
        self.record = self
            .classifier
            .optional_categories()
            .map(|category| (category.name.clone(), self.default_consent))
            .collect();
        self.state = LoadState::LoadedFromDefaults;
    }

    /// The current record. Empty, with a usage diagnostic, before
    /// [`process_preferences`](Self::process_preferences) has run.
    pub fn preferences(&self) -> &PreferenceRecord {
        if self.state == LoadState::Unloaded {
            tracing::error!(error = %ConsentError::PreferencesNotLoaded, "call process_preferences first");
        }
        &self.record
    }

    /// Replace the record wholesale.
    pub fn set_preferences(&mut self, record: PreferenceRecord) {
        self.record = record;
        self.events
            .emit(ConsentEvent::PreferencesSet(self.record.clone()));
    }

    /// Persist the current record to the preference cookie.
    pub fn save_to_cookie(&self) -> Result<(), ConsentError> {
        let encoded = self.record.to_encoded();
        let payload = serde_json::to_string(&encoded).cookie_context(&self.cookie_name)?;

        self.access.set_cookie(
            &self.cookie_name,
            &payload,
            Some(self.expiry_days),
            self.secure,
        )?;

        tracing::debug!(cookie = %self.cookie_name, "preferences saved");
        self.events.emit(ConsentEvent::PreferencesSaved(encoded));
        Ok(())
    }

    pub fn load_state(&self) -> LoadState {
        self.state
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consent::config::CategoryDecl;
    use crate::cookies::document::JarDocument;
    use url::Url;

    fn setup(default_consent: bool) -> (JarDocument, PreferenceStore) {
        let config = ConsentConfig::new()
            .preference_cookie_name("prefs")
            .default_consent(default_consent)
            .category(CategoryDecl::new("essential", ["session"]).optional(false))
            .category(CategoryDecl::new("analytics", ["_ga"]))
            .category(CategoryDecl::new("ads", ["_fbp"]));
        let doc = JarDocument::for_url(Url::parse("https://www.example.com/").unwrap());
        let access = CookieAccess::new(Arc::new(doc.clone()));
        let classifier = Arc::new(ManifestClassifier::new(&config));
        let store = PreferenceStore::new(&config, classifier, access, EventBus::new());
        (doc, store)
    }

    fn store_raw(doc: &JarDocument, raw: &str) {
        CookieAccess::new(Arc::new(doc.clone()))
            .set_cookie("prefs", raw, Some(30), true)
            .unwrap();
    }

    #[test]
    fn test_encoding_contract() {
        let record: PreferenceRecord = [("ads", true), ("analytics", false)].into_iter().collect();
        let encoded = record.to_encoded();
        assert_eq!(encoded["ads"], "on");
        assert_eq!(encoded["analytics"], "off");
    }

    #[test]
    fn test_anything_but_on_is_refused() {
        let mut encoded = EncodedPreferences::new();
        encoded.insert("a".into(), "on".into());
        encoded.insert("b".into(), "ON".into());
        encoded.insert("c".into(), "yes".into());
        let record = PreferenceRecord::from_encoded(&encoded);
        assert!(record.is_granted("a"));
        assert!(!record.is_granted("b"));
        assert!(!record.is_granted("c"));
    }

    #[test]
    fn test_defaults_cover_only_optional_categories() {
        let (_, mut store) = setup(true);
        let record = store.process_preferences().clone();
        assert_eq!(record.len(), 2);
        assert!(record.is_granted("analytics"));
        assert!(record.is_granted("ads"));
        assert_eq!(record.get("essential"), None);
        assert_eq!(store.load_state(), LoadState::LoadedFromDefaults);
    }

    #[test]
    fn test_loads_valid_cookie() {
        let (doc, mut store) = setup(false);
        store_raw(&doc, r#"{"analytics":"on","ads":"off"}"#);

        store.process_preferences();
        assert_eq!(store.load_state(), LoadState::LoadedFromCookie);
        assert!(store.preferences().is_granted("analytics"));
        assert!(!store.preferences().is_granted("ads"));
    }

    #[test]
    fn test_stale_extra_keys_pass_through() {
        let (doc, mut store) = setup(false);
        store_raw(&doc, r#"{"analytics":"on","ads":"on","retired":"on"}"#);

        store.process_preferences();
        assert_eq!(store.load_state(), LoadState::LoadedFromCookie);
        assert_eq!(store.preferences().get("retired"), Some(true));
    }

    #[test]
    fn test_unparseable_cookie_discarded() {
        let (doc, mut store) = setup(false);
        store_raw(&doc, "{not json");

        store.process_preferences();
        assert_eq!(store.load_state(), LoadState::LoadedFromDefaults);
        assert!(!doc.has_cookie("prefs"));
    }

    #[test]
    fn test_non_string_values_rejected() {
        let (doc, store) = setup(false);
        store_raw(&doc, r#"{"analytics":true,"ads":"on"}"#);
        assert!(matches!(
            store.load_from_cookie(),
            Err(ConsentError::PreferenceShape { .. })
        ));
    }

    #[test]
    fn test_missing_category_rejected() {
        let (doc, store) = setup(false);
        store_raw(&doc, r#"{"analytics":"on"}"#);
        assert_eq!(
            store.load_from_cookie(),
            Err(ConsentError::missing_preference("ads"))
        );
    }

    #[test]
    fn test_preferences_before_load_is_empty() {
        let (_, store) = setup(true);
        assert!(store.preferences().is_empty());
        assert_eq!(store.load_state(), LoadState::Unloaded);
    }

    #[test]
    fn test_set_replaces_without_merge() {
        let (_, mut store) = setup(true);
        store.process_preferences();
        store.set_preferences([("ads", false)].into_iter().collect());
        assert_eq!(store.preferences().len(), 1);
        assert_eq!(store.preferences().get("analytics"), None);
    }

    #[test]
    fn test_save_writes_on_off_json() {
        let (doc, mut store) = setup(false);
        store.process_preferences();
        store.set_preferences([("analytics", true), ("ads", false)].into_iter().collect());
        store.save_to_cookie().unwrap();

        let stored = CookieAccess::new(Arc::new(doc))
            .get_cookie("prefs")
            .unwrap()
            .json()
            .unwrap();
        assert_eq!(stored, serde_json::json!({"analytics": "on", "ads": "off"}));
    }
}
