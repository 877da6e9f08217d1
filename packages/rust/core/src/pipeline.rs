//! End-to-end pipeline: crawl → enrich → categorize over the data directory.
//!
//! Each stage reads and writes the flat JSON files through [`Store`]; file
//! writes happen only after a stage fully succeeds, so a failed crawl leaves
//! the previous output untouched.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{info, instrument};

use skillscout_categorizer::build_category_index;
use skillscout_crawler::Crawler;
use skillscout_enricher::{EnrichOutcome, enrich_index};
use skillscout_shared::{
    CrawlConfig, EnrichConfig, Result, SkillScoutError, SkillsIndex,
};
use skillscout_storage::Store;

// ---------------------------------------------------------------------------
// Progress reporting
// ---------------------------------------------------------------------------

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
}

// ---------------------------------------------------------------------------
// Stage results
// ---------------------------------------------------------------------------

/// Summary of a crawl stage.
#[derive(Debug)]
pub struct CrawlRunResult {
    /// Skills in the written index.
    pub skills: usize,
    /// Pages fetched across all boards.
    pub pages_fetched: usize,
    /// Ids first seen this run.
    pub new_ids: usize,
    /// Stage duration.
    pub elapsed: Duration,
}

/// Summary of a categorize stage.
#[derive(Debug)]
pub struct CategorizeRunResult {
    /// Skills categorized.
    pub skills: usize,
    /// Items that fell through to the `other` category.
    pub uncategorized: usize,
}

/// Combined result of a full pipeline run.
#[derive(Debug)]
pub struct PipelineRunResult {
    pub crawl: CrawlRunResult,
    pub enrich: EnrichOutcome,
    pub categorize: CategorizeRunResult,
}

// ---------------------------------------------------------------------------
// Stages
// ---------------------------------------------------------------------------

/// Crawl all boards and write the index and first-seen files.
#[instrument(skip_all)]
pub async fn run_crawl(
    config: &CrawlConfig,
    store: &Store,
    progress: &dyn ProgressReporter,
) -> Result<CrawlRunResult> {
    progress.phase("Crawling leaderboards");

    let mut first_seen = store.load_first_seen();
    let run_started = Utc::now();

    let crawler = Crawler::new(config.clone())?;
    let outcome = crawler.crawl_boards(&mut first_seen, run_started).await?;

    // First-seen persists before the index is built, so a late index-write
    // failure never loses newly observed ids.
    progress.phase("Writing index");
    store.save_first_seen(&first_seen)?;

    let fetched_at = Utc::now();
    let index = SkillsIndex {
        updated_at: fetched_at,
        source_updated_at: fetched_at,
        provider_id: config.provider_id.clone(),
        count: outcome.items.len(),
        items: outcome.items,
    };
    store.save_index(&index)?;

    info!(skills = index.count, "index written");

    Ok(CrawlRunResult {
        skills: index.count,
        pages_fetched: outcome.pages_fetched,
        new_ids: outcome.new_ids,
        elapsed: outcome.duration,
    })
}

/// Enrich the persisted index with descriptions and rewrite it.
#[instrument(skip_all)]
pub async fn run_enrich(
    config: &EnrichConfig,
    store: &Store,
    progress: &dyn ProgressReporter,
) -> Result<EnrichOutcome> {
    progress.phase("Enriching descriptions");

    let mut index = load_required_index(store)?;
    let outcome = enrich_index(config, store, &mut index).await?;

    progress.phase("Writing index");
    index.updated_at = Utc::now();
    store.save_index(&index)?;

    Ok(outcome)
}

/// Categorize the persisted index and write the category map.
#[instrument(skip_all)]
pub fn run_categorize(
    store: &Store,
    progress: &dyn ProgressReporter,
) -> Result<CategorizeRunResult> {
    progress.phase("Categorizing skills");

    let index = load_required_index(store)?;
    let category_index = build_category_index(&index.items, Utc::now());

    let uncategorized = category_index
        .skill_to_category
        .values()
        .filter(|c| c.as_str() == skillscout_categorizer::OTHER_CATEGORY)
        .count();

    store.save_category_index(&category_index)?;

    info!(
        skills = category_index.skill_to_category.len(),
        uncategorized,
        "category index written"
    );

    Ok(CategorizeRunResult {
        skills: category_index.skill_to_category.len(),
        uncategorized,
    })
}

/// Run all three stages in sequence.
#[instrument(skip_all)]
pub async fn run_all(
    crawl_config: &CrawlConfig,
    enrich_config: &EnrichConfig,
    store: &Store,
    progress: &dyn ProgressReporter,
) -> Result<PipelineRunResult> {
    let crawl = run_crawl(crawl_config, store, progress).await?;
    let enrich = run_enrich(enrich_config, store, progress).await?;
    let categorize = run_categorize(store, progress)?;

    Ok(PipelineRunResult {
        crawl,
        enrich,
        categorize,
    })
}

fn load_required_index(store: &Store) -> Result<SkillsIndex> {
    store.load_index()?.ok_or_else(|| {
        SkillScoutError::validation("no skills index found — run the crawl stage first")
    })
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Snapshot of the persisted pipeline output for the `status` command.
#[derive(Debug)]
pub struct StatusReport {
    /// Items in the index.
    pub skills: usize,
    /// Items carrying a description.
    pub described: usize,
    /// Index timestamps.
    pub updated_at: DateTime<Utc>,
    pub source_updated_at: DateTime<Utc>,
    /// Items per category, in `primaryCategories` order.
    pub category_totals: Vec<(String, usize)>,
}

/// Summarize the persisted files.
pub fn status(store: &Store) -> Result<StatusReport> {
    let index = load_required_index(store)?;
    let described = index.items.iter().filter(|i| i.description.is_some()).count();

    let category_totals = match store.load_category_index()? {
        Some(categories) => {
            let mut totals: BTreeMap<&str, usize> = BTreeMap::new();
            for category in categories.skill_to_category.values() {
                *totals.entry(category.as_str()).or_insert(0) += 1;
            }
            categories
                .primary_categories
                .iter()
                .map(|name| (name.clone(), totals.get(name.as_str()).copied().unwrap_or(0)))
                .collect()
        }
        None => Vec::new(),
    };

    Ok(StatusReport {
        skills: index.items.len(),
        described,
        updated_at: index.updated_at,
        source_updated_at: index.source_updated_at,
        category_totals,
    })
}
