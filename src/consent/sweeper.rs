//! Cookie sweeper: deletes every live cookie the visitor has not consented to.

use crate::consent::manifest::{Classification, ManifestClassifier};
use crate::consent::preferences::PreferenceRecord;
use crate::cookies::access::CookieAccess;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

/// Cookies deleted by one sweep, by reason.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepReport {
    /// Matched no declared category.
    pub uncategorized: Vec<String>,
    /// Belong to an optional category without consent.
    pub without_consent: Vec<String>,
}

impl SweepReport {
    /// Every deleted cookie name.
    pub fn deleted(&self) -> impl Iterator<Item = &str> + '_ {
        self.uncategorized
            .iter()
            .chain(self.without_consent.iter())
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.uncategorized.len() + self.without_consent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Enumerates live cookies and deletes the non-compliant ones.
#[derive(Debug, Clone)]
pub struct CookieSweeper {
    classifier: Arc<ManifestClassifier>,
    access: CookieAccess,
    delete_undefined: bool,
}

impl CookieSweeper {
    pub fn new(classifier: Arc<ManifestClassifier>, access: CookieAccess, delete_undefined: bool) -> Self {
        Self {
            classifier,
            access,
            delete_undefined,
        }
    }

    /// Run one sweep against `preferences`.
    ///
    /// Two passes over freshly enumerated cookies: uncategorized cookies go
    /// first (when configured), then cookies of optional categories whose
    /// consent is absent or refused. Essential categories and the
    /// preference cookie are never touched.
    ///
    /// A name visible at several scopes is deleted and reported once.
    pub fn process_cookies(&self, preferences: &PreferenceRecord) -> SweepReport {
        let mut report = SweepReport::default();

        if self.delete_undefined {
            for name in self.live_names() {
                if self.classifier.classify(&name).is_uncategorized() {
                    self.access.delete_cookie(&name);
                    report.uncategorized.push(name);
                }
            }
        }

        // Re-enumerate: the first pass mutated the jar.
        for name in self.live_names() {
            if self.lacks_consent(self.classifier.classify(&name), preferences) {
                self.access.delete_cookie(&name);
                report.without_consent.push(name);
            }
        }

        tracing::debug!(
            uncategorized = report.uncategorized.len(),
            without_consent = report.without_consent.len(),
            "cookie sweep complete"
        );
        report
    }

    /// Distinct names of the live cookies, in document order.
    fn live_names(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.access
            .get_all_cookies()
            .into_iter()
            .map(|cookie| cookie.name)
            .filter(|name| seen.insert(name.clone()))
            .collect()
    }

    fn lacks_consent(&self, class: Classification<'_>, preferences: &PreferenceRecord) -> bool {
        match class {
            Classification::Declared(category) => {
                category.optional && !preferences.is_granted(&category.name)
            }
            Classification::Internal | Classification::Uncategorized => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consent::config::{CategoryDecl, ConsentConfig};
    use crate::cookies::document::{CookieDocument, JarDocument};
    use url::Url;

    fn sweeper(delete_undefined: bool) -> (JarDocument, CookieSweeper) {
        let config = ConsentConfig::new()
            .preference_cookie_name("prefs")
            .category(CategoryDecl::new("essential", ["a"]).optional(false))
            .category(CategoryDecl::new("ads", ["b"]));
        let doc = JarDocument::for_url(Url::parse("https://www.example.com/").unwrap());
        let sweeper = CookieSweeper::new(
            Arc::new(ManifestClassifier::new(&config)),
            CookieAccess::new(Arc::new(doc.clone())),
            delete_undefined,
        );
        for line in ["a=1", "b=2", "c=3", "prefs=x"] {
            doc.write_cookie(line);
        }
        (doc, sweeper)
    }

    #[test]
    fn test_refused_category_swept() {
        let (doc, sweeper) = sweeper(false);
        let report = sweeper.process_cookies(&[("ads", false)].into_iter().collect());

        assert_eq!(report.without_consent, vec!["b"]);
        assert!(report.uncategorized.is_empty());
        assert!(doc.has_cookie("a"));
        assert!(!doc.has_cookie("b"));
        assert!(doc.has_cookie("c"));
        assert!(doc.has_cookie("prefs"));
    }

    #[test]
    fn test_absent_entry_counts_as_refused() {
        let (doc, sweeper) = sweeper(false);
        sweeper.process_cookies(&PreferenceRecord::new());
        assert!(!doc.has_cookie("b"));
    }

    #[test]
    fn test_uncategorized_swept_when_enabled() {
        let (doc, sweeper) = sweeper(true);
        let report = sweeper.process_cookies(&[("ads", true)].into_iter().collect());

        assert_eq!(report.uncategorized, vec!["c"]);
        assert!(report.without_consent.is_empty());
        assert!(doc.has_cookie("b"));
        assert!(!doc.has_cookie("c"));
        assert!(doc.has_cookie("prefs"));
    }

    #[test]
    fn test_name_at_two_scopes_reported_once() {
        let (doc, sweeper) = sweeper(true);
        doc.write_cookie("b=parent; Domain=example.com");
        doc.write_cookie("c=parent; Domain=example.com");

        let report = sweeper.process_cookies(&[("ads", false)].into_iter().collect());

        assert_eq!(report.uncategorized, vec!["c"]);
        assert_eq!(report.without_consent, vec!["b"]);
        assert!(!doc.has_cookie("b"));
        assert!(!doc.has_cookie("c"));
    }

    #[test]
    fn test_second_sweep_is_noop() {
        let (_, sweeper) = sweeper(true);
        let prefs = [("ads", false)].into_iter().collect();
        assert_eq!(sweeper.process_cookies(&prefs).len(), 2);
        assert!(sweeper.process_cookies(&prefs).is_empty());
    }
}
