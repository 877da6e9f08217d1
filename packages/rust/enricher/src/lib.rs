//! Description enrichment for indexed skills.
//!
//! The enricher walks the top-N installed items that lack a description,
//! checks the local markdown cache first, and otherwise fetches the skill's
//! markdown from the raw-content host by trying a short list of candidate
//! paths in order. Fetched content is cached; descriptions are extracted
//! with [`skillscout_markdown::extract_description`]. Items whose fetch
//! fails entirely keep a null description — enrichment never aborts the run.

mod pool;

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, instrument, warn};

use skillscout_markdown::extract_description;
use skillscout_shared::{EnrichConfig, Result, SkillScoutError, SkillsIndex};
use skillscout_storage::Store;

/// User-Agent string for raw-content requests.
const USER_AGENT: &str = concat!("SkillScout/", env!("CARGO_PKG_VERSION"));

/// Per-request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Candidate repository-relative paths for a skill's markdown, tried in order.
pub fn candidate_paths(skill_id: &str) -> Vec<String> {
    vec![
        format!("skills/{skill_id}/SKILL.md"),
        format!("{skill_id}/SKILL.md"),
        "SKILL.md".to_string(),
        "README.md".to_string(),
    ]
}

// ---------------------------------------------------------------------------
// EnrichOutcome
// ---------------------------------------------------------------------------

/// Summary of a completed enrichment pass.
#[derive(Debug)]
pub struct EnrichOutcome {
    /// Items considered (top-N without a description).
    pub considered: usize,
    /// Items that obtained a description.
    pub enriched: usize,
    /// Descriptions served from the local cache.
    pub cache_hits: usize,
    /// Items that yielded no description.
    pub failed: usize,
    /// Total enrichment duration.
    pub duration: Duration,
}

// ---------------------------------------------------------------------------
// Enrichment
// ---------------------------------------------------------------------------

/// One unit of enrichment work.
#[derive(Debug, Clone)]
struct WorkItem {
    /// Position of the item in the index.
    pos: usize,
    source: String,
    skill_id: String,
}

/// A successful enrichment result.
#[derive(Debug)]
struct Enrichment {
    description: String,
    skill_md_path: String,
    from_cache: bool,
}

/// Shared per-run fetch context.
struct FetchCtx {
    client: reqwest::Client,
    raw_host: String,
    auth_token: Option<String>,
    store: Store,
}

/// Enrich `index` in place, patching only items that obtain a description.
#[instrument(skip_all, fields(top_n = config.top_n, concurrency = config.concurrency))]
pub async fn enrich_index(
    config: &EnrichConfig,
    store: &Store,
    index: &mut SkillsIndex,
) -> Result<EnrichOutcome> {
    let start = std::time::Instant::now();

    // Items are already sorted by installs; take the top N lacking a description.
    let work: Vec<WorkItem> = index
        .items
        .iter()
        .take(config.top_n)
        .enumerate()
        .filter(|(_, item)| item.description.is_none())
        .map(|(pos, item)| WorkItem {
            pos,
            source: item.source.clone(),
            skill_id: item.skill_id.clone(),
        })
        .collect();

    let considered = work.len();
    info!(considered, "starting enrichment");

    let client = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(|e| SkillScoutError::Network(format!("failed to build HTTP client: {e}")))?;

    let ctx = Arc::new(FetchCtx {
        client,
        raw_host: config.raw_host.trim_end_matches('/').to_string(),
        auth_token: config.auth_token.clone(),
        store: store.clone(),
    });

    let handler = {
        let ctx = Arc::clone(&ctx);
        move |_i: usize, item: WorkItem| {
            let ctx = Arc::clone(&ctx);
            async move { enrich_one(&ctx, &item).await }
        }
    };

    let slots = pool::run_pool(config.concurrency, work.clone(), handler).await;

    let mut enriched = 0usize;
    let mut cache_hits = 0usize;
    for (work_item, slot) in work.iter().zip(slots) {
        let Some(result) = slot else { continue };
        enriched += 1;
        if result.from_cache {
            cache_hits += 1;
        }
        let item = &mut index.items[work_item.pos];
        item.description = Some(result.description);
        item.skill_md_path = Some(result.skill_md_path);
    }

    let outcome = EnrichOutcome {
        considered,
        enriched,
        cache_hits,
        failed: considered - enriched,
        duration: start.elapsed(),
    };

    info!(
        enriched = outcome.enriched,
        cache_hits = outcome.cache_hits,
        failed = outcome.failed,
        duration_ms = outcome.duration.as_millis(),
        "enrichment complete"
    );

    Ok(outcome)
}

/// Enrich one skill: cache first, then candidate paths, one try each.
async fn enrich_one(ctx: &FetchCtx, item: &WorkItem) -> Option<Enrichment> {
    let rel_path = Store::skill_md_rel_path(&item.source, &item.skill_id);

    // Cache hit that yields a usable description avoids the network entirely.
    if let Some(cached) = ctx.store.read_skill_md(&item.source, &item.skill_id) {
        if let Some(description) = extract_description(&cached) {
            debug!(source = %item.source, skill_id = %item.skill_id, "description from cache");
            return Some(Enrichment {
                description,
                skill_md_path: rel_path,
                from_cache: true,
            });
        }
    }

    let raw = fetch_first_candidate(ctx, item).await?;

    if let Err(e) = ctx.store.write_skill_md(&item.source, &item.skill_id, &raw) {
        warn!(source = %item.source, skill_id = %item.skill_id, error = %e, "cache write failed");
    }

    let description = extract_description(&raw)?;
    Some(Enrichment {
        description,
        skill_md_path: rel_path,
        from_cache: false,
    })
}

/// Try each candidate path once; first 200 response wins.
///
/// Non-200 statuses and network errors just move on to the next candidate.
async fn fetch_first_candidate(ctx: &FetchCtx, item: &WorkItem) -> Option<String> {
    for path in candidate_paths(&item.skill_id) {
        let url = format!("{}/{}/HEAD/{path}", ctx.raw_host, item.source);

        let mut request = ctx.client.get(&url);
        if let Some(token) = &ctx.auth_token {
            request = request.bearer_auth(token);
        }

        match request.send().await {
            Ok(resp) if resp.status().is_success() => match resp.text().await {
                Ok(body) => {
                    debug!(%url, "candidate path hit");
                    return Some(body);
                }
                Err(e) => {
                    debug!(%url, error = %e, "body read failed, trying next candidate");
                }
            },
            Ok(resp) => {
                debug!(%url, status = %resp.status(), "candidate miss");
            }
            Err(e) => {
                debug!(%url, error = %e, "candidate fetch error");
            }
        }
    }

    debug!(source = %item.source, skill_id = %item.skill_id, "all candidate paths exhausted");
    None
}
