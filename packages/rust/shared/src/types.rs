//! Core domain types for the skillscout index files.
//!
//! All persisted JSON uses camelCase field names; these structs are the
//! single source of truth for the on-disk contract.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Current schema version for the category index format.
pub const CATEGORY_INDEX_VERSION: u32 = 1;

/// Build the canonical skill identity from its repository and skill id.
///
/// The identity is `source/skillId` and is unique across the index.
pub fn skill_key(source: &str, skill_id: &str) -> String {
    format!("{source}/{skill_id}")
}

// ---------------------------------------------------------------------------
// SkillIndexItem
// ---------------------------------------------------------------------------

/// A single indexed marketplace skill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillIndexItem {
    /// Canonical identity: `source/skillId`.
    pub id: String,
    /// Repository identifier (e.g., `owner/repo`).
    pub source: String,
    /// Skill identifier within the repository.
    pub skill_id: String,
    /// Display title.
    pub title: String,
    /// Link to the source repository.
    pub link: String,
    /// All-time install count.
    pub installs_all_time: u64,
    /// Trending-board install count.
    pub installs_trending: u64,
    /// Hot-board install count.
    pub installs_hot: u64,
    /// When this id was first observed by any crawl run. Immutable once set.
    pub first_seen_at: DateTime<Utc>,
    /// Short description extracted from the skill's markdown, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Data-dir-relative path of the cached skill markdown, if fetched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skill_md_path: Option<String>,
}

// ---------------------------------------------------------------------------
// SkillsIndex
// ---------------------------------------------------------------------------

/// The `skills_index.json` structure.
///
/// Items are sorted descending by all-time installs; ties keep the relative
/// order in which they were first fetched.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillsIndex {
    /// When this file was last written.
    pub updated_at: DateTime<Utc>,
    /// When the marketplace data was last fetched.
    pub source_updated_at: DateTime<Utc>,
    /// Identifier of the upstream marketplace provider.
    pub provider_id: String,
    /// Number of items. Redundant with `items.len()`.
    pub count: usize,
    /// Indexed skills.
    pub items: Vec<SkillIndexItem>,
}

// ---------------------------------------------------------------------------
// First-seen map
// ---------------------------------------------------------------------------

/// Persistent id → first-seen timestamp mapping (`skills_first_seen.json`).
///
/// Append-only: a timestamp is never overwritten once set. A `BTreeMap` so
/// keys serialize in lexicographic order.
pub type FirstSeenMap = BTreeMap<String, DateTime<Utc>>;

// ---------------------------------------------------------------------------
// CategoryIndex
// ---------------------------------------------------------------------------

/// The `skills_category_index.json` structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryIndex {
    /// When this file was last written.
    pub updated_at: DateTime<Utc>,
    /// Schema version.
    pub version: u32,
    /// Category names in rule-priority order, `other` last.
    pub primary_categories: Vec<String>,
    /// id → category name for every indexed skill.
    pub skill_to_category: BTreeMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_item() -> SkillIndexItem {
        SkillIndexItem {
            id: "acme/widgets/pdf-export".into(),
            source: "acme/widgets".into(),
            skill_id: "pdf-export".into(),
            title: "PDF Export".into(),
            link: "https://github.com/acme/widgets".into(),
            installs_all_time: 1200,
            installs_trending: 40,
            installs_hot: 7,
            first_seen_at: "2024-01-01T00:00:00Z".parse().unwrap(),
            description: None,
            skill_md_path: None,
        }
    }

    #[test]
    fn skill_key_joins_source_and_id() {
        assert_eq!(skill_key("acme/widgets", "pdf-export"), "acme/widgets/pdf-export");
    }

    #[test]
    fn index_item_uses_camel_case() {
        let json = serde_json::to_string(&sample_item()).expect("serialize");
        assert!(json.contains(r#""skillId":"pdf-export""#));
        assert!(json.contains(r#""installsAllTime":1200"#));
        assert!(json.contains(r#""firstSeenAt":"2024-01-01T00:00:00Z""#));
        // Nullable fields are omitted when unset
        assert!(!json.contains("description"));
        assert!(!json.contains("skillMdPath"));
    }

    #[test]
    fn index_roundtrip() {
        let index = SkillsIndex {
            updated_at: Utc::now(),
            source_updated_at: Utc::now(),
            provider_id: "skillsmp".into(),
            count: 1,
            items: vec![sample_item()],
        };
        let json = serde_json::to_string_pretty(&index).expect("serialize");
        assert!(json.contains(r#""providerId": "skillsmp""#));
        let parsed: SkillsIndex = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed.count, 1);
        assert_eq!(parsed.items[0].id, "acme/widgets/pdf-export");
        assert!(parsed.items[0].description.is_none());
    }

    #[test]
    fn first_seen_map_serializes_sorted() {
        let mut map = FirstSeenMap::new();
        map.insert("zeta/repo/z".into(), "2024-02-01T00:00:00Z".parse().unwrap());
        map.insert("acme/repo/a".into(), "2024-01-01T00:00:00Z".parse().unwrap());
        let json = serde_json::to_string(&map).expect("serialize");
        let a = json.find("acme/repo/a").unwrap();
        let z = json.find("zeta/repo/z").unwrap();
        assert!(a < z);
    }

    #[test]
    fn category_index_roundtrip() {
        let mut skill_to_category = BTreeMap::new();
        skill_to_category.insert("acme/widgets/pdf-export".to_string(), "other".to_string());
        let index = CategoryIndex {
            updated_at: Utc::now(),
            version: CATEGORY_INDEX_VERSION,
            primary_categories: vec!["development-tools".into(), "other".into()],
            skill_to_category,
        };
        let json = serde_json::to_string_pretty(&index).expect("serialize");
        assert!(json.contains(r#""primaryCategories""#));
        let parsed: CategoryIndex = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed.version, CATEGORY_INDEX_VERSION);
        assert_eq!(parsed.skill_to_category.len(), 1);
    }
}
