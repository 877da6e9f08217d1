//! Flat-JSON data directory for the skillscout pipeline.
//!
//! The [`Store`] struct owns the data directory holding:
//! - `skills_index.json` — the merged, sorted skill index
//! - `skills_first_seen.json` — append-only id → first-seen timestamps
//! - `skills_category_index.json` — id → category map
//! - `skill_md_cache/` — one raw markdown file per `source/skillId` pair
//!
//! All JSON is written pretty-printed. Reads and writes are synchronous and
//! assume a single process.

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use skillscout_shared::{CategoryIndex, FirstSeenMap, Result, SkillScoutError, SkillsIndex};

/// File name of the skill index.
const INDEX_FILE: &str = "skills_index.json";

/// File name of the first-seen map.
const FIRST_SEEN_FILE: &str = "skills_first_seen.json";

/// File name of the category index.
const CATEGORY_FILE: &str = "skills_category_index.json";

/// Directory name of the markdown cache.
const SKILL_MD_CACHE_DIR: &str = "skill_md_cache";

/// Handle to the skillscout data directory.
#[derive(Debug, Clone)]
pub struct Store {
    data_dir: PathBuf,
}

impl Store {
    /// Open (creating if needed) the data directory at `data_dir`.
    pub fn open(data_dir: impl Into<PathBuf>) -> Result<Self> {
        let data_dir = data_dir.into();
        std::fs::create_dir_all(&data_dir).map_err(|e| SkillScoutError::io(&data_dir, e))?;
        Ok(Self { data_dir })
    }

    /// The data directory this store writes into.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    // -----------------------------------------------------------------------
    // Skill index
    // -----------------------------------------------------------------------

    /// Load the skill index, or `None` if it has not been written yet.
    pub fn load_index(&self) -> Result<Option<SkillsIndex>> {
        let path = self.data_dir.join(INDEX_FILE);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(read_json(&path)?))
    }

    /// Write the skill index, replacing any previous file.
    pub fn save_index(&self, index: &SkillsIndex) -> Result<()> {
        write_json(&self.data_dir.join(INDEX_FILE), index)
    }

    // -----------------------------------------------------------------------
    // First-seen map
    // -----------------------------------------------------------------------

    /// Load the first-seen map. A missing or unparseable file yields an empty
    /// map: first-seen is a non-critical auxiliary signal and a reset is
    /// acceptable.
    pub fn load_first_seen(&self) -> FirstSeenMap {
        let path = self.data_dir.join(FIRST_SEEN_FILE);
        if !path.exists() {
            return FirstSeenMap::new();
        }
        match read_json(&path) {
            Ok(map) => map,
            Err(e) => {
                warn!(?path, error = %e, "first-seen file unreadable, starting empty");
                FirstSeenMap::new()
            }
        }
    }

    /// Write the first-seen map. Keys serialize in lexicographic order.
    pub fn save_first_seen(&self, map: &FirstSeenMap) -> Result<()> {
        write_json(&self.data_dir.join(FIRST_SEEN_FILE), map)
    }

    // -----------------------------------------------------------------------
    // Category index
    // -----------------------------------------------------------------------

    /// Load the category index, or `None` if it has not been written yet.
    pub fn load_category_index(&self) -> Result<Option<CategoryIndex>> {
        let path = self.data_dir.join(CATEGORY_FILE);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(read_json(&path)?))
    }

    /// Write the category index, replacing any previous file.
    pub fn save_category_index(&self, index: &CategoryIndex) -> Result<()> {
        write_json(&self.data_dir.join(CATEGORY_FILE), index)
    }

    // -----------------------------------------------------------------------
    // Markdown cache
    // -----------------------------------------------------------------------

    /// Data-dir-relative path of the cached markdown for a skill.
    pub fn skill_md_rel_path(source: &str, skill_id: &str) -> String {
        format!(
            "{SKILL_MD_CACHE_DIR}/{}__{}.md",
            sanitize(source),
            sanitize(skill_id)
        )
    }

    /// Absolute path of the cached markdown for a skill.
    pub fn skill_md_path(&self, source: &str, skill_id: &str) -> PathBuf {
        self.data_dir.join(Self::skill_md_rel_path(source, skill_id))
    }

    /// Read the cached markdown for a skill. Any read failure is treated as a
    /// cache miss so the caller refetches.
    pub fn read_skill_md(&self, source: &str, skill_id: &str) -> Option<String> {
        let path = self.skill_md_path(source, skill_id);
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                debug!(?path, "markdown cache hit");
                Some(content)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                warn!(?path, error = %e, "markdown cache unreadable, treating as miss");
                None
            }
        }
    }

    /// Write raw markdown content into the cache.
    pub fn write_skill_md(&self, source: &str, skill_id: &str, content: &str) -> Result<()> {
        let path = self.skill_md_path(source, skill_id);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| SkillScoutError::io(parent, e))?;
        }
        std::fs::write(&path, content).map_err(|e| SkillScoutError::io(&path, e))
    }
}

/// Replace path separators and other unsafe characters in a cache file name.
fn sanitize(part: &str) -> String {
    part.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Read and deserialize a JSON file.
fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path).map_err(|e| SkillScoutError::io(path, e))?;
    serde_json::from_str(&content).map_err(|e| {
        SkillScoutError::Storage(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Serialize and write a value as pretty-printed JSON with a trailing newline.
fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| SkillScoutError::Storage(format!("failed to serialize {}: {e}", path.display())))?;
    std::fs::write(path, format!("{json}\n")).map_err(|e| SkillScoutError::io(path, e))
}
