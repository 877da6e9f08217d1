//! Leaderboard crawling for skillscout.
//!
//! This crate provides:
//! - [`client`] — the leaderboard API client with retry/backoff
//! - [`engine`] — sequential board pagination and merge into index items

pub mod client;
pub mod engine;

pub use client::{ApiClient, Board, BoardPage, BoardSkill};
pub use engine::{CrawlOutcome, Crawler};
