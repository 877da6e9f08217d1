//! Keyword-rule categorization of indexed skills.
//!
//! An ordered list of (category, pattern) rules is evaluated against a
//! search text built from `source + skillId + title`. The first matching
//! rule wins; items matching none get [`OTHER_CATEGORY`]. Evaluation is
//! sequential and deterministic, so rule order is the priority order.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use tracing::debug;

use skillscout_shared::{CATEGORY_INDEX_VERSION, CategoryIndex, SkillIndexItem};

/// Fallback category for items no rule matches.
pub const OTHER_CATEGORY: &str = "other";

/// One ordered categorization rule.
struct CategoryRule {
    name: &'static str,
    pattern: Regex,
}

/// The fixed rule list, in priority order.
static RULES: LazyLock<Vec<CategoryRule>> = LazyLock::new(|| {
    // Case-insensitive, word-boundary keyword alternations. Order matters:
    // the first matching rule wins.
    let defs: &[(&str, &str)] = &[
        (
            "development-tools",
            r"(?i)\b(docker|kubernetes|k8s|ci|cd|git|github|deploy|deployment|devops|terraform|build|compile|lint|linter|debug|debugger|refactor|test|testing)\b",
        ),
        (
            "web-development",
            r"(?i)\b(react|vue|svelte|angular|next|nextjs|frontend|backend|css|html|tailwind|web|api|rest|graphql|http)\b",
        ),
        (
            "data-analysis",
            r"(?i)\b(data|sql|database|pandas|analytics|etl|pipeline|chart|visualization|visualisation|csv|excel|spreadsheet)\b",
        ),
        (
            "ai-ml",
            r"(?i)\b(ai|ml|llm|agent|agents|prompt|prompts|model|models|embedding|embeddings|rag|neural|transformer)\b",
        ),
        (
            "content-writing",
            r"(?i)\b(write|writing|writer|blog|seo|content|copywriting|doc|docs|documentation|markdown|translate|translation)\b",
        ),
        (
            "productivity",
            r"(?i)\b(todo|task|tasks|calendar|note|notes|email|schedule|scheduling|workflow|automation|reminder)\b",
        ),
        (
            "security",
            r"(?i)\b(security|audit|vulnerability|vulnerabilities|pentest|crypto|cryptography|auth|authentication|secrets)\b",
        ),
    ];

    defs.iter()
        .map(|(name, pattern)| CategoryRule {
            name,
            pattern: Regex::new(pattern).expect("valid rule pattern"),
        })
        .collect()
});

/// Category names in priority order, [`OTHER_CATEGORY`] last.
pub fn primary_categories() -> Vec<String> {
    RULES
        .iter()
        .map(|r| r.name.to_string())
        .chain(std::iter::once(OTHER_CATEGORY.to_string()))
        .collect()
}

/// The search text a skill is categorized by.
fn search_text(item: &SkillIndexItem) -> String {
    format!("{} {} {}", item.source, item.skill_id, item.title)
}

/// Categorize a single skill. First matching rule wins.
pub fn categorize(item: &SkillIndexItem) -> &'static str {
    let text = search_text(item);
    RULES
        .iter()
        .find(|rule| rule.pattern.is_match(&text))
        .map(|rule| rule.name)
        .unwrap_or(OTHER_CATEGORY)
}

/// Build the full category index for a set of items.
pub fn build_category_index(items: &[SkillIndexItem], now: DateTime<Utc>) -> CategoryIndex {
    let mut skill_to_category = BTreeMap::new();
    for item in items {
        let category = categorize(item);
        debug!(id = %item.id, category, "categorized");
        skill_to_category.insert(item.id.clone(), category.to_string());
    }

    CategoryIndex {
        updated_at: now,
        version: CATEGORY_INDEX_VERSION,
        primary_categories: primary_categories(),
        skill_to_category,
    }
}
