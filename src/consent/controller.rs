//! Consent controller - one enforcement instance per page.
//!
//! Sequences the components: validate configuration, build the classifier,
//! store and sweeper, resolve preferences, hand the record to the consent
//! surface, announce readiness, then sweep.

use crate::base::consenterror::ConsentError;
use crate::consent::config::ConsentConfig;
use crate::consent::events::{ConsentEvent, EventBus, EventKind, ListenerId};
use crate::consent::manifest::{Classification, ManifestClassifier};
use crate::consent::preferences::{LoadState, PreferenceRecord, PreferenceStore};
use crate::consent::surface::ConsentSurface;
use crate::consent::sweeper::{CookieSweeper, SweepReport};
use crate::cookies::access::CookieAccess;
use crate::cookies::document::CookieDocument;
use std::fmt;
use std::sync::Arc;

/// Builder for [`CookieConsent`].
#[derive(Default)]
#[must_use]
pub struct CookieConsentBuilder {
    config: ConsentConfig,
    document: Option<Arc<dyn CookieDocument>>,
    surface: Option<Arc<dyn ConsentSurface>>,
    events: EventBus,
}

impl CookieConsentBuilder {
    /// Set the configuration.
    pub fn config(mut self, config: ConsentConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the page whose cookies are governed.
    pub fn document(mut self, document: Arc<dyn CookieDocument>) -> Self {
        self.document = Some(document);
        self
    }

    /// Set the banner/form surface.
    pub fn surface(mut self, surface: Arc<dyn ConsentSurface>) -> Self {
        self.surface = Some(surface);
        self
    }

    /// Subscribe before initialization so startup events are observed.
    pub fn on<F>(self, kind: EventKind, listener: F) -> Self
    where
        F: Fn(&ConsentEvent) + Send + Sync + 'static,
    {
        self.events.subscribe(kind, listener);
        self
    }

    /// Subscribe to every event before initialization.
    pub fn on_any<F>(self, listener: F) -> Self
    where
        F: Fn(&ConsentEvent) + Send + Sync + 'static,
    {
        self.events.subscribe_all(listener);
        self
    }

    /// Validate, resolve preferences and run the first sweep.
    ///
    /// On an invalid configuration nothing is built, nothing touches the
    /// cookies, and `ConfigInvalid` is the only event emitted.
    pub fn init(self) -> Result<CookieConsent, ConsentError> {
        let Self {
            config,
            document,
            surface,
            events,
        } = self;

        let document = match config.validate().and_then(|()| {
            document.ok_or_else(|| ConsentError::invalid_config("no cookie document"))
        }) {
            Ok(document) => document,
            Err(e) => {
                tracing::error!(error = %e, "consent initialization aborted");
                events.emit(ConsentEvent::ConfigInvalid(e.clone()));
                return Err(e);
            }
        };

        let classifier = Arc::new(ManifestClassifier::new(&config));
        let access = CookieAccess::new(document);
        let mut store = PreferenceStore::new(&config, classifier.clone(), access.clone(), events.clone());
        let sweeper = CookieSweeper::new(classifier.clone(), access, config.delete_undefined_cookies);

        store.process_preferences();

        if let Some(surface) = &surface {
            if config.show_banner && store.load_state() == LoadState::LoadedFromDefaults {
                surface.show_banner(store.preferences());
            }
            if config.show_preferences_form {
                surface.show_preferences_form(store.preferences());
            }
        }

        events.emit(ConsentEvent::Initialized {
            source: store.load_state(),
        });

        let consent = CookieConsent {
            config,
            classifier,
            store,
            sweeper,
            events,
        };
        let report = consent.sweep();

        tracing::info!(
            categories = consent.classifier.categories().len(),
            source = %consent.load_state(),
            deleted = report.len(),
            "cookie consent initialized"
        );
        Ok(consent)
    }
}

/// A running consent enforcement instance.
pub struct CookieConsent {
    config: ConsentConfig,
    classifier: Arc<ManifestClassifier>,
    store: PreferenceStore,
    sweeper: CookieSweeper,
    events: EventBus,
}

impl fmt::Debug for CookieConsent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CookieConsent")
            .field("preference_cookie", &self.config.preference_cookie_name)
            .field("categories", &self.classifier.categories().len())
            .field("store", &self.store)
            .finish()
    }
}

impl CookieConsent {
    /// Create a new builder.
    pub fn builder() -> CookieConsentBuilder {
        CookieConsentBuilder::default()
    }

    /// The resolved record.
    pub fn preferences(&self) -> &PreferenceRecord {
        self.store.preferences()
    }

    /// Whether preferences came from the stored cookie or from defaults.
    pub fn load_state(&self) -> LoadState {
        self.store.load_state()
    }

    /// Classify a cookie name against the manifest.
    pub fn classify(&self, cookie_name: &str) -> Classification<'_> {
        self.classifier.classify(cookie_name)
    }

    pub fn classifier(&self) -> &ManifestClassifier {
        &self.classifier
    }

    pub fn config(&self) -> &ConsentConfig {
        &self.config
    }

    /// This instance's event bus.
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Subscribe to one kind of event.
    pub fn on<F>(&self, kind: EventKind, listener: F) -> ListenerId
    where
        F: Fn(&ConsentEvent) + Send + Sync + 'static,
    {
        self.events.subscribe(kind, listener)
    }

    /// Sweep the page's cookies against the current record.
    pub fn sweep(&self) -> SweepReport {
        let report = self.sweeper.process_cookies(self.store.preferences());
        self.events.emit(ConsentEvent::CookiesSwept(report.clone()));
        report
    }

    /// Replace the record, persist it and sweep with the new consent.
    pub fn update_preferences(&mut self, record: PreferenceRecord) -> Result<SweepReport, ConsentError> {
        self.store.set_preferences(record);
        self.store.save_to_cookie()?;
        Ok(self.sweep())
    }

    /// Grant every optional category.
    pub fn accept_all(&mut self) -> Result<SweepReport, ConsentError> {
        self.update_preferences(self.uniform_record(true))
    }

    /// Refuse every optional category.
    pub fn reject_all(&mut self) -> Result<SweepReport, ConsentError> {
        self.update_preferences(self.uniform_record(false))
    }

    /// Change consent for one category, keeping the others.
    pub fn set_category(&mut self, category: &str, granted: bool) -> Result<SweepReport, ConsentError> {
        if !self
            .classifier
            .optional_categories()
            .any(|c| c.name == category)
        {
            tracing::warn!(category = %category, "consent set for undeclared or essential category");
        }

        let mut record = self.store.preferences().clone();
        record.insert(category, granted);
        self.update_preferences(record)
    }

    fn uniform_record(&self, granted: bool) -> PreferenceRecord {
        self.classifier
            .optional_categories()
            .map(|c| (c.name.clone(), granted))
            .collect()
    }
}
