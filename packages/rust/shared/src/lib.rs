//! Shared types, error model, and configuration for skillscout.
//!
//! This crate is the foundation depended on by all other skillscout crates.
//! It provides:
//! - [`SkillScoutError`] — the unified error type
//! - Domain types ([`SkillIndexItem`], [`SkillsIndex`], [`FirstSeenMap`], [`CategoryIndex`])
//! - Configuration ([`AppConfig`], [`CrawlConfig`], [`EnrichConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    ApiConfig, AppConfig, CrawlConfig, DefaultsConfig, EnrichConfig, RawContentConfig,
    auth_token, config_dir, config_file_path, init_config, load_config, load_config_from,
};
pub use error::{Result, SkillScoutError};
pub use types::{
    CATEGORY_INDEX_VERSION, CategoryIndex, FirstSeenMap, SkillIndexItem, SkillsIndex, skill_key,
};
