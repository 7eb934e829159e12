//! Manifest classifier: maps a cookie name onto its declared category.

use crate::consent::config::{ConsentConfig, ManifestEntry};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of the reserved category the preference cookie belongs to.
pub const INTERNAL_CATEGORY: &str = "cookie-consent-internal";

/// Name reported for cookies matching no declared category.
pub const UNCATEGORIZED: &str = "un-categorized";

/// How a category's cookie patterns are compared against cookie names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MatchStrategy {
    /// Pattern equals the cookie name.
    Exact,
    /// Cookie name begins with the pattern.
    #[default]
    StartsWith,
    /// Cookie name contains the pattern.
    Includes,
}

impl MatchStrategy {
    /// Parse the manifest spelling (`exact`, `startsWith`, `includes`).
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "exact" => Some(Self::Exact),
            "startsWith" => Some(Self::StartsWith),
            "includes" => Some(Self::Includes),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::StartsWith => "startsWith",
            Self::Includes => "includes",
        }
    }

    pub fn matches(&self, pattern: &str, cookie_name: &str) -> bool {
        match self {
            Self::Exact => cookie_name == pattern,
            Self::StartsWith => cookie_name.starts_with(pattern),
            Self::Includes => cookie_name.contains(pattern),
        }
    }
}

impl fmt::Display for MatchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A normalized manifest category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub name: String,
    pub cookie_patterns: Vec<String>,
    pub optional: bool,
    pub match_strategy: MatchStrategy,
}

impl Category {
    /// Whether any of this category's patterns matches `cookie_name`.
    pub fn matches(&self, cookie_name: &str) -> bool {
        self.cookie_patterns
            .iter()
            .any(|pattern| self.match_strategy.matches(pattern, cookie_name))
    }
}

/// The outcome of classifying one cookie name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification<'a> {
    /// The preference cookie itself; never optional.
    Internal,
    /// First declared category with a matching pattern.
    Declared(&'a Category),
    /// Matched nothing; treated as optional.
    Uncategorized,
}

impl Classification<'_> {
    pub fn name(&self) -> &str {
        match self {
            Classification::Internal => INTERNAL_CATEGORY,
            Classification::Declared(category) => &category.name,
            Classification::Uncategorized => UNCATEGORIZED,
        }
    }

    pub fn is_optional(&self) -> bool {
        match self {
            Classification::Internal => false,
            Classification::Declared(category) => category.optional,
            Classification::Uncategorized => true,
        }
    }

    pub fn is_uncategorized(&self) -> bool {
        matches!(self, Classification::Uncategorized)
    }
}

/// Classifies cookie names against the configured manifest.
#[derive(Debug, Clone)]
pub struct ManifestClassifier {
    preference_cookie_name: String,
    categories: Vec<Category>,
}

impl ManifestClassifier {
    /// Normalize the manifest in `config`, dropping malformed entries.
    pub fn new(config: &ConsentConfig) -> Self {
        let categories = config
            .category_manifest
            .iter()
            .enumerate()
            .filter_map(|(index, entry)| normalize(index, entry))
            .collect::<Vec<_>>();

        tracing::debug!(
            declared = config.category_manifest.len(),
            accepted = categories.len(),
            "manifest normalized"
        );

        Self {
            preference_cookie_name: config.preference_cookie_name.clone(),
            categories,
        }
    }

    /// Declared categories in declaration order, defaults applied.
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Categories that need consent.
    pub fn optional_categories(&self) -> impl Iterator<Item = &Category> + '_ {
        self.categories.iter().filter(|c| c.optional)
    }

    /// Classify `cookie_name`. Total: always yields exactly one classification.
    pub fn classify(&self, cookie_name: &str) -> Classification<'_> {
        if cookie_name == self.preference_cookie_name {
            return Classification::Internal;
        }

        self.categories
            .iter()
            .find(|category| category.matches(cookie_name))
            .map(Classification::Declared)
            .unwrap_or(Classification::Uncategorized)
    }
}

fn normalize(index: usize, entry: &ManifestEntry) -> Option<Category> {
    let decl = match entry {
        ManifestEntry::Declared(decl) => decl,
        ManifestEntry::Malformed(value) => {
            tracing::warn!(index, entry = %value, "dropping malformed manifest category");
            return None;
        }
    };

    if decl.category_name.is_empty() {
        tracing::warn!(index, "dropping manifest category without a name");
        return None;
    }

    let match_strategy = match decl.match_by.as_deref() {
        None => MatchStrategy::default(),
        Some(raw) => MatchStrategy::parse(raw).unwrap_or_else(|| {
            tracing::warn!(
                category = %decl.category_name,
                match_by = %raw,
                "unknown match strategy, using startsWith"
            );
            MatchStrategy::default()
        }),
    };

    Some(Category {
        name: decl.category_name.clone(),
        cookie_patterns: decl.cookies.clone(),
        optional: decl.optional.unwrap_or(true),
        match_strategy,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consent::config::CategoryDecl;

    fn classifier() -> ManifestClassifier {
        ManifestClassifier::new(
            &ConsentConfig::new()
                .preference_cookie_name("prefs")
                .category(CategoryDecl::new("essential", ["session"]).optional(false))
                .category(CategoryDecl::new("analytics", ["_ga"]))
                .category(CategoryDecl::new("ads", ["fbp"]).match_by(MatchStrategy::Includes))
                .category(CategoryDecl::new("exact", ["id"]).match_by(MatchStrategy::Exact)),
        )
    }

    #[test]
    fn test_defaults_applied() {
        let c = classifier();
        let analytics = &c.categories()[1];
        assert!(analytics.optional);
        assert_eq!(analytics.match_strategy, MatchStrategy::StartsWith);
        assert!(!c.categories()[0].optional);
    }

    #[test]
    fn test_match_strategies() {
        let c = classifier();
        assert_eq!(c.classify("_ga_XYZ").name(), "analytics");
        assert_eq!(c.classify("x_fbp_y").name(), "ads");
        assert_eq!(c.classify("id").name(), "exact");
        assert!(c.classify("idx").is_uncategorized());
    }

    #[test]
    fn test_preference_cookie_is_internal() {
        let c = classifier();
        let class = c.classify("prefs");
        assert_eq!(class, Classification::Internal);
        assert!(!class.is_optional());
    }

    #[test]
    fn test_uncategorized_is_optional() {
        let c = classifier();
        let class = c.classify("mystery");
        assert_eq!(class.name(), UNCATEGORIZED);
        assert!(class.is_optional());
    }

    #[test]
    fn test_first_declared_match_wins() {
        let c = ManifestClassifier::new(
            &ConsentConfig::new()
                .category(CategoryDecl::new("first", ["_g"]))
                .category(CategoryDecl::new("second", ["_ga"])),
        );
        assert_eq!(c.classify("_ga").name(), "first");
    }

    #[test]
    fn test_empty_pattern_list_matches_nothing() {
        let c = ManifestClassifier::new(
            &ConsentConfig::new().category(CategoryDecl::new("empty", Vec::<String>::new())),
        );
        assert_eq!(c.categories().len(), 1);
        assert!(c.classify("anything").is_uncategorized());
    }

    #[test]
    fn test_unknown_strategy_falls_back() {
        let mut decl = CategoryDecl::new("ads", ["ad"]);
        decl.match_by = Some("regex".to_string());
        let c = ManifestClassifier::new(&ConsentConfig::new().category(decl));
        assert_eq!(c.categories()[0].match_strategy, MatchStrategy::StartsWith);
        assert_eq!(c.classify("ad_id").name(), "ads");
    }
}
