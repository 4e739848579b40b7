use std::collections::HashMap;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Static co-ownership configuration: collapses multiple raw provider owner
/// ids into one canonical identity, optionally overriding its display name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CoOwnerTable {
    /// raw provider owner id -> canonical owner id.
    #[serde(default)]
    pub merges: HashMap<String, String>,
    /// canonical owner id -> display name override.
    #[serde(default)]
    pub display_names: HashMap<String, String>,
}

impl CoOwnerTable {
    /// Canonical id for a raw provider id (identity when unmapped).
    pub fn canonical<'a>(&'a self, raw: &'a str) -> &'a str {
        self.merges.get(raw).map(String::as_str).unwrap_or(raw)
    }

    pub fn override_name(&self, canonical: &str) -> Option<&str> {
        self.display_names.get(canonical).map(String::as_str)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub co_owners: CoOwnerTable,
    /// Years before this are dropped before normalization.
    pub min_year: Option<i32>,
    /// Decided games with margin <= this are "close" (inclusive).
    pub close_margin: f64,
    /// Decided games with margin > this are "blowouts" (exclusive).
    pub blowout_margin: f64,
    /// Seasons at or before this year only count weeks 1..=legacy_week_limit
    /// toward single-game score records; provider data for that era is
    /// unreliable in later weeks.
    pub legacy_cutoff_year: i32,
    pub legacy_week_limit: u32,
    /// Career games required before a record enters the win-percentage
    /// leaderboard.
    pub min_games_for_pct: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            co_owners: CoOwnerTable::default(),
            min_year: None,
            close_margin: 5.0,
            blowout_margin: 30.0,
            legacy_cutoff_year: 2018,
            legacy_week_limit: 12,
            min_games_for_pct: 10,
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).context("parse engine config json")
    }
}
