//! Board crawl engine: pagination, merge, and index construction.
//!
//! Boards are crawled one after another, each paginated sequentially from
//! page 0 until the API reports no more pages. Rows merge into a
//! deduplicated skill set keyed by `source/skillId`; the sorted index items
//! come out of [`Crawler::crawl_boards`].

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument};

use skillscout_shared::{CrawlConfig, FirstSeenMap, Result, SkillIndexItem, skill_key};

use crate::client::{ApiClient, Board, BoardSkill};

// ---------------------------------------------------------------------------
// CrawlOutcome
// ---------------------------------------------------------------------------

/// Summary of a completed board crawl.
#[derive(Debug)]
pub struct CrawlOutcome {
    /// Merged, sorted index items.
    pub items: Vec<SkillIndexItem>,
    /// Pages fetched across all boards.
    pub pages_fetched: usize,
    /// Ids seen for the first time this run.
    pub new_ids: usize,
    /// Total crawl duration.
    pub duration: Duration,
}

// ---------------------------------------------------------------------------
// Crawler
// ---------------------------------------------------------------------------

/// Sequential leaderboard crawler.
pub struct Crawler {
    config: CrawlConfig,
    api: ApiClient,
}

impl Crawler {
    /// Create a crawler from the runtime crawl configuration.
    pub fn new(config: CrawlConfig) -> Result<Self> {
        let api = ApiClient::new(&config.base_url)?;
        Ok(Self { config, api })
    }

    /// Crawl all boards and build the merged item list.
    ///
    /// `first_seen` is threaded through explicitly: ids absent from the map
    /// get `now`, existing entries are never overwritten. The caller persists
    /// the map afterwards.
    ///
    /// Any page fetch that exhausts its retries aborts the whole crawl.
    #[instrument(skip_all, fields(base_url = %self.config.base_url))]
    pub async fn crawl_boards(
        &self,
        first_seen: &mut FirstSeenMap,
        now: DateTime<Utc>,
    ) -> Result<CrawlOutcome> {
        let start = std::time::Instant::now();
        let mut merge = MergeState::default();
        let mut pages_fetched = 0usize;

        for board in Board::ALL {
            let mut page: u32 = 0;
            loop {
                // Fixed delay between successive page fetches.
                if pages_fetched > 0 && self.config.fetch_delay_ms > 0 {
                    tokio::time::sleep(Duration::from_millis(self.config.fetch_delay_ms)).await;
                }

                let board_page = self.api.fetch_board_page(board, page).await?;
                pages_fetched += 1;

                debug!(
                    %board,
                    page,
                    rows = board_page.skills.len(),
                    has_more = board_page.has_more,
                    "board page fetched"
                );

                for row in &board_page.skills {
                    merge.record(board, row);
                }

                if !board_page.has_more {
                    break;
                }
                page += 1;
            }
        }

        let (items, new_ids) = merge.into_items(first_seen, now);

        let outcome = CrawlOutcome {
            items,
            pages_fetched,
            new_ids,
            duration: start.elapsed(),
        };

        info!(
            skills = outcome.items.len(),
            pages_fetched = outcome.pages_fetched,
            new_ids = outcome.new_ids,
            duration_ms = outcome.duration.as_millis(),
            "crawl completed"
        );

        Ok(outcome)
    }
}

// ---------------------------------------------------------------------------
// Merge
// ---------------------------------------------------------------------------

/// Descriptive fields captured the first time an id is encountered.
#[derive(Debug)]
struct SkillInfo {
    source: String,
    skill_id: String,
    name: String,
}

/// Accumulates board rows into a deduplicated skill set.
///
/// Per-board install counts are max-merged (duplicate rows within a board
/// keep the largest value). The cross-board identity set is a union keyed by
/// id; the first board's record wins for descriptive fields, and first
/// encounter fixes an item's relative order.
#[derive(Debug, Default)]
struct MergeState {
    order: Vec<String>,
    info: HashMap<String, SkillInfo>,
    all_time: HashMap<String, u64>,
    trending: HashMap<String, u64>,
    hot: HashMap<String, u64>,
}

impl MergeState {
    /// Record one board row.
    fn record(&mut self, board: Board, row: &BoardSkill) {
        let id = skill_key(&row.source, &row.skill_id);

        if !self.info.contains_key(&id) {
            self.order.push(id.clone());
            self.info.insert(
                id.clone(),
                SkillInfo {
                    source: row.source.clone(),
                    skill_id: row.skill_id.clone(),
                    name: row.name.clone(),
                },
            );
        }

        let counts = match board {
            Board::AllTime => &mut self.all_time,
            Board::Trending => &mut self.trending,
            Board::Hot => &mut self.hot,
        };
        let entry = counts.entry(id).or_insert(0);
        *entry = (*entry).max(row.installs);
    }

    /// Build sorted index items, filling first-seen timestamps for new ids.
    ///
    /// Returns the items and the number of ids added to `first_seen`.
    fn into_items(
        self,
        first_seen: &mut FirstSeenMap,
        now: DateTime<Utc>,
    ) -> (Vec<SkillIndexItem>, usize) {
        let mut new_ids = 0usize;
        let mut items = Vec::with_capacity(self.order.len());

        for id in &self.order {
            let info = &self.info[id];
            if !first_seen.contains_key(id) {
                first_seen.insert(id.clone(), now);
                new_ids += 1;
            }

            items.push(SkillIndexItem {
                id: id.clone(),
                source: info.source.clone(),
                skill_id: info.skill_id.clone(),
                title: info.name.clone(),
                link: format!("https://github.com/{}", info.source),
                installs_all_time: self.all_time.get(id).copied().unwrap_or(0),
                installs_trending: self.trending.get(id).copied().unwrap_or(0),
                installs_hot: self.hot.get(id).copied().unwrap_or(0),
                first_seen_at: first_seen[id],
                description: None,
                skill_md_path: None,
            });
        }

        // Stable sort: ties keep first-encounter order.
        items.sort_by(|a, b| b.installs_all_time.cmp(&a.installs_all_time));

        (items, new_ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(source: &str, skill_id: &str, name: &str, installs: u64) -> BoardSkill {
        BoardSkill {
            source: source.into(),
            skill_id: skill_id.into(),
            name: name.into(),
            installs,
        }
    }

    fn now() -> DateTime<Utc> {
        "2025-06-01T12:00:00Z".parse().unwrap()
    }

    #[test]
    fn duplicate_rows_within_board_keep_max() {
        let mut merge = MergeState::default();
        merge.record(Board::AllTime, &row("a/r", "s", "S", 10));
        merge.record(Board::AllTime, &row("a/r", "s", "S", 3));
        merge.record(Board::AllTime, &row("a/r", "s", "S", 25));

        let mut first_seen = FirstSeenMap::new();
        let (items, _) = merge.into_items(&mut first_seen, now());
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].installs_all_time, 25);
    }

    #[test]
    fn cross_board_union_first_board_wins_fields() {
        let mut merge = MergeState::default();
        merge.record(Board::AllTime, &row("a/r", "s", "Original Name", 100));
        merge.record(Board::Trending, &row("a/r", "s", "Renamed Later", 8));
        merge.record(Board::Hot, &row("b/r", "t", "Hot Only", 2));

        let mut first_seen = FirstSeenMap::new();
        let (items, _) = merge.into_items(&mut first_seen, now());
        assert_eq!(items.len(), 2);

        let merged = items.iter().find(|i| i.id == "a/r/s").unwrap();
        assert_eq!(merged.title, "Original Name");
        assert_eq!(merged.installs_all_time, 100);
        assert_eq!(merged.installs_trending, 8);
        assert_eq!(merged.installs_hot, 0);

        let hot_only = items.iter().find(|i| i.id == "b/r/t").unwrap();
        assert_eq!(hot_only.installs_all_time, 0);
        assert_eq!(hot_only.installs_hot, 2);
    }

    #[test]
    fn sorted_descending_with_stable_ties() {
        let mut merge = MergeState::default();
        merge.record(Board::AllTime, &row("a/r", "first", "First", 50));
        merge.record(Board::AllTime, &row("a/r", "second", "Second", 50));
        merge.record(Board::AllTime, &row("a/r", "top", "Top", 90));

        let mut first_seen = FirstSeenMap::new();
        let (items, _) = merge.into_items(&mut first_seen, now());
        let ids: Vec<&str> = items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, ["a/r/top", "a/r/first", "a/r/second"]);
    }

    #[test]
    fn first_seen_is_append_only() {
        let earlier: DateTime<Utc> = "2024-01-01T00:00:00Z".parse().unwrap();
        let mut first_seen = FirstSeenMap::new();
        first_seen.insert("a/r/s".into(), earlier);

        let mut merge = MergeState::default();
        merge.record(Board::AllTime, &row("a/r", "s", "S", 1));
        merge.record(Board::AllTime, &row("b/r", "fresh", "Fresh", 1));

        let (items, new_ids) = merge.into_items(&mut first_seen, now());
        assert_eq!(new_ids, 1);
        assert_eq!(first_seen["a/r/s"], earlier);
        assert_eq!(first_seen["b/r/fresh"], now());

        let existing = items.iter().find(|i| i.id == "a/r/s").unwrap();
        assert_eq!(existing.first_seen_at, earlier);
    }

    #[test]
    fn link_derived_from_source() {
        let mut merge = MergeState::default();
        merge.record(Board::AllTime, &row("acme/widgets", "s", "S", 1));
        let mut first_seen = FirstSeenMap::new();
        let (items, _) = merge.into_items(&mut first_seen, now());
        assert_eq!(items[0].link, "https://github.com/acme/widgets");
    }

    // -----------------------------------------------------------------------
    // End-to-end crawl against a mock server
    // -----------------------------------------------------------------------

    mod crawl {
        use super::*;
        use skillscout_shared::CrawlConfig;
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        fn board_page(
            rows: &[(&str, &str, &str, u64)],
            has_more: bool,
            page: u32,
        ) -> serde_json::Value {
            let skills: Vec<_> = rows
                .iter()
                .map(|(source, skill_id, name, installs)| {
                    serde_json::json!({
                        "source": source,
                        "skillId": skill_id,
                        "name": name,
                        "installs": installs,
                    })
                })
                .collect();
            serde_json::json!({
                "skills": skills,
                "total": skills.len(),
                "hasMore": has_more,
                "page": page,
            })
        }

        async fn mount_page(
            server: &MockServer,
            board: &str,
            page: u32,
            body: serde_json::Value,
        ) {
            Mock::given(method("GET"))
                .and(path(format!("/{board}/{page}")))
                .respond_with(ResponseTemplate::new(200).set_body_json(body))
                .mount(server)
                .await;
        }

        #[tokio::test]
        async fn crawls_all_boards_and_paginates() {
            let server = MockServer::start().await;

            // all-time has two pages; trending and hot have one each.
            mount_page(
                &server,
                "all-time",
                0,
                board_page(&[("a/r", "one", "One", 100)], true, 0),
            )
            .await;
            mount_page(
                &server,
                "all-time",
                1,
                board_page(&[("a/r", "two", "Two", 40)], false, 1),
            )
            .await;
            mount_page(
                &server,
                "trending",
                0,
                board_page(&[("a/r", "one", "One", 12)], false, 0),
            )
            .await;
            mount_page(
                &server,
                "hot",
                0,
                board_page(&[("b/r", "three", "Three", 5)], false, 0),
            )
            .await;

            let config = CrawlConfig {
                base_url: server.uri(),
                provider_id: "test".into(),
                fetch_delay_ms: 0,
            };
            let crawler = Crawler::new(config).unwrap();

            let mut first_seen = FirstSeenMap::new();
            let outcome = crawler.crawl_boards(&mut first_seen, now()).await.unwrap();

            assert_eq!(outcome.pages_fetched, 4);
            assert_eq!(outcome.items.len(), 3);
            assert_eq!(outcome.new_ids, 3);

            // Sorted by all-time installs descending; hot-only item last.
            let ids: Vec<&str> = outcome.items.iter().map(|i| i.id.as_str()).collect();
            assert_eq!(ids, ["a/r/one", "a/r/two", "b/r/three"]);
            assert_eq!(outcome.items[0].installs_trending, 12);
            assert_eq!(first_seen.len(), 3);
        }

        #[tokio::test]
        async fn server_error_aborts_crawl() {
            let server = MockServer::start().await;
            mount_page(
                &server,
                "all-time",
                0,
                board_page(&[("a/r", "one", "One", 1)], false, 0),
            )
            .await;
            // trending answers 500 on every attempt: the crawl must abort.
            Mock::given(method("GET"))
                .and(path("/trending/0"))
                .respond_with(ResponseTemplate::new(500))
                .mount(&server)
                .await;

            let config = CrawlConfig {
                base_url: server.uri(),
                provider_id: "test".into(),
                fetch_delay_ms: 0,
            };
            let crawler = Crawler::new(config).unwrap();

            let mut first_seen = FirstSeenMap::new();
            let err = crawler
                .crawl_boards(&mut first_seen, now())
                .await
                .expect_err("crawl must abort on exhausted retries");
            assert!(err.to_string().contains("HTTP 500"));
        }
    }
}
