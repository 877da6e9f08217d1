//! Leaderboard API client with retry/backoff.
//!
//! Page fetches go through [`ApiClient::fetch_board_page`], which retries
//! transient failures (HTTP 429/5xx, network or timeout errors) with
//! exponential backoff and fails fast on other client errors.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, warn};

use skillscout_shared::{Result, SkillScoutError};

/// User-Agent string for API requests.
const USER_AGENT: &str = concat!("SkillScout/", env!("CARGO_PKG_VERSION"));

/// Per-request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum attempts per page fetch (1 initial + 3 retries).
pub(crate) const MAX_ATTEMPTS: u32 = 4;

/// Base backoff in ms; attempt `n` waits `BACKOFF_BASE_MS * 2^n`.
pub(crate) const BACKOFF_BASE_MS: u64 = 200;

// ---------------------------------------------------------------------------
// Boards
// ---------------------------------------------------------------------------

/// The fixed set of marketplace leaderboards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Board {
    AllTime,
    Trending,
    Hot,
}

impl Board {
    /// All boards in enumeration (crawl) order.
    pub const ALL: [Board; 3] = [Board::AllTime, Board::Trending, Board::Hot];

    /// URL path segment for this board.
    pub fn slug(self) -> &'static str {
        match self {
            Board::AllTime => "all-time",
            Board::Trending => "trending",
            Board::Hot => "hot",
        }
    }
}

impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.slug())
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// One skill row as returned by the leaderboard API.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardSkill {
    /// Repository identifier (e.g., `owner/repo`).
    pub source: String,
    /// Skill identifier within the repository.
    pub skill_id: String,
    /// Display name.
    pub name: String,
    /// Install count on this board.
    pub installs: u64,
}

/// One page of a leaderboard.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardPage {
    /// Skill rows on this page.
    pub skills: Vec<BoardSkill>,
    /// Total rows on the board.
    #[serde(default)]
    pub total: u64,
    /// Whether another page follows.
    pub has_more: bool,
    /// Page number echoed back by the API.
    #[serde(default)]
    pub page: u32,
}

// ---------------------------------------------------------------------------
// ApiClient
// ---------------------------------------------------------------------------

/// HTTP client for the leaderboard API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client for the given base URL.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| SkillScoutError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Fetch one page of a board, retrying transient failures.
    pub async fn fetch_board_page(&self, board: Board, page: u32) -> Result<BoardPage> {
        let url = format!("{}/{}/{page}", self.base_url, board.slug());
        let response = self.get_with_retry(&url).await?;
        response
            .json::<BoardPage>()
            .await
            .map_err(|e| SkillScoutError::parse(format!("{url}: invalid board page: {e}")))
    }

    /// GET a URL with up to [`MAX_ATTEMPTS`] attempts and exponential backoff.
    ///
    /// Retries on 429, 5xx, and network/timeout errors. Any other non-success
    /// status fails immediately.
    async fn get_with_retry(&self, url: &str) -> Result<reqwest::Response> {
        let mut attempt: u32 = 0;
        loop {
            match self.client.get(url).send().await {
                Ok(resp) if resp.status().is_success() => return Ok(resp),
                Ok(resp) => {
                    let status = resp.status();
                    if !is_retryable_status(status) {
                        return Err(SkillScoutError::Network(format!("{url}: HTTP {status}")));
                    }
                    if attempt + 1 >= MAX_ATTEMPTS {
                        return Err(SkillScoutError::Network(format!(
                            "{url}: HTTP {status} after {MAX_ATTEMPTS} attempts"
                        )));
                    }
                    debug!(%url, %status, attempt, "retrying after HTTP status");
                }
                Err(e) => {
                    if attempt + 1 >= MAX_ATTEMPTS {
                        return Err(SkillScoutError::Network(format!(
                            "{url}: {e} after {MAX_ATTEMPTS} attempts"
                        )));
                    }
                    warn!(%url, error = %e, attempt, "retrying after network error");
                }
            }

            tokio::time::sleep(Duration::from_millis(BACKOFF_BASE_MS << attempt)).await;
            attempt += 1;
        }
    }
}

/// Whether an HTTP status warrants a retry.
fn is_retryable_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}
