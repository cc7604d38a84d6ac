// 🔗 Identifier Resolver - slug generation + catalogue linkage
//
// Feed records carry vendor ids that are not stable across regenerations.
// Every Builder/Subdivision/Plan is linked to a hand-curated catalogue id
// through a slug. Lookup is exact first, then a best-effort token search.

use serde::{Deserialize, Serialize};
use std::fmt;
use unicode_normalization::UnicodeNormalization;

// ============================================================================
// EXTERNAL ID
// ============================================================================

/// Identifier from the external catalogue (CMS post id)
///
/// Unresolved ids are `None` at every use site, so no value of the id space
/// is reserved as a "not found" marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExternalId(pub u64);

impl fmt::Display for ExternalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// NAME CLEANUP + SLUGS
// ============================================================================

/// Strip every configured substring from `name`, then collapse dash spacing
///
/// `"Oak Ridge - Phase 2"` → `"Oak Ridge  Phase 2"` (the dash and its adjoining
/// space become a single space).
pub fn filter_name(filters: &[String], name: &str) -> String {
    let mut cleaned = name.to_string();
    for filter in filters.iter().filter(|f| !f.is_empty()) {
        cleaned = cleaned.replace(filter.as_str(), "");
    }
    if cleaned.contains("- ") {
        cleaned = cleaned.replace("- ", " ");
    }
    if cleaned.contains(" -") {
        cleaned = cleaned.replace(" -", " ");
    }
    cleaned
}

/// URL-safe slug: ASCII-folded, lowercase, word chars and single hyphens
pub fn slugify(value: &str) -> String {
    let folded: String = value
        .nfkd()
        .filter(char::is_ascii)
        .collect::<String>()
        .to_lowercase();

    let mut slug = String::with_capacity(folded.len());
    let mut pending_separator = false;

    for c in folded.chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.push(c);
        } else if c == '-' || c.is_whitespace() {
            pending_separator = true;
        }
        // Any other punctuation is dropped without splitting the word
    }

    slug.trim_matches(|c| c == '-' || c == '_').to_string()
}

/// Slug for an entity's identity: `slugify("{id} {name}")`
pub fn node_slug(id: &str, name: &str) -> String {
    slugify(&format!("{} {}", id, name))
}

/// Slug the catalogue uses for plans: `"{subdivision}-{plan}"`, spaces as hyphens
pub fn lookup_slug(subdivision_name: &str, plan_name: &str) -> String {
    format!("{}-{}", subdivision_name, plan_name)
        .split(' ')
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase()
}

// ============================================================================
// CATALOGUE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogueEntry {
    pub slug: String,
    pub id: ExternalId,
}

/// How a miss on the exact slug is handled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionPolicy {
    /// Exact match, then first token (in slug order) found inside a
    /// catalogue key (in declared order)
    #[default]
    Fuzzy,
    /// Exact match only
    Exact,
}

/// Ordered slug → id catalogue
///
/// Declaration order is significant: it is the tie-break of the fuzzy search.
#[derive(Debug, Clone, Default)]
pub struct Catalogue {
    entries: Vec<CatalogueEntry>,
    policy: ResolutionPolicy,
}

impl Catalogue {
    pub fn new(entries: Vec<CatalogueEntry>, policy: ResolutionPolicy) -> Self {
        Catalogue { entries, policy }
    }

    pub fn entries(&self) -> &[CatalogueEntry] {
        &self.entries
    }

    /// Resolve a slug to a catalogue id
    ///
    /// Pure: the same (slug, catalogue) always yields the same answer.
    pub fn resolve(&self, slug: &str) -> Option<ExternalId> {
        if let Some(entry) = self.entries.iter().find(|e| e.slug == slug) {
            return Some(entry.id);
        }

        if self.policy == ResolutionPolicy::Exact {
            return None;
        }

        // Empty tokens would be a substring of every key
        for token in slug.split('-').filter(|t| !t.is_empty()) {
            if let Some(entry) = self.entries.iter().find(|e| e.slug.contains(token)) {
                return Some(entry.id);
            }
        }

        None
    }
}

// ============================================================================
// TESTS
// ============================================================================
