use std::collections::BTreeMap;

use rayon::prelude::*;
use serde_json::Value;
use serde::Serialize;
use tracing::{info, warn};

use crate::analytics::{AnalyticsReport, build_report};
use crate::career::{Leaderboards, owner_careers, team_careers};
use crate::clutch::{ClutchRow, compute_clutch};
use crate::config::EngineConfig;
use crate::consistency::{ConsistencyRow, compute_consistency};
use crate::h2h::{H2HMatrix, H2HView};
use crate::luck::{LuckRow, compute_luck};
use crate::model::{Matchup, Season, TeamId};
use crate::normalize::normalize_season;
use crate::owners::OwnerResolver;
use crate::records::{RecordBook, build_record_book};
use crate::schedule_strength::{SosRow, compute_schedule_strength};

#[derive(Debug, Clone, Serialize)]
pub struct SkippedSeason {
    pub year: i32,
    pub reason: String,
}

/// What happened during a run: which years made it in, which were skipped
/// and why. A skipped year is never fatal.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub seasons_total: usize,
    pub seasons_succeeded: usize,
    pub skipped: Vec<SkippedSeason>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChampionEntry {
    pub year: i32,
    pub team_id: TeamId,
    pub team_name: String,
    pub owner_display_name: String,
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
    pub points_for: f64,
}

/// The whole batch transformation behind one explicit object: construct it
/// with configuration, hand it the year -> payload map, get the aggregate
/// model back. No global state; concurrent runs share nothing.
#[derive(Debug, Clone, Default)]
pub struct HistoryEngine {
    config: EngineConfig,
}

impl HistoryEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Normalize every payload (seasons are independent, so in parallel),
    /// merge by year, then run the sequential aggregation passes. Payload
    /// years carrying provider errors or malformed data are skipped and
    /// recorded; given zero valid seasons the result is simply empty.
    pub fn build(&self, payloads: &BTreeMap<i32, Value>) -> LeagueHistory {
        let min_year = self.config.min_year.unwrap_or(i32::MIN);
        let mut normalized: Vec<(i32, Result<Season, String>)> = payloads
            .par_iter()
            .filter(|(year, _)| **year >= min_year)
            .map(|(&year, payload)| {
                (year, normalize_season(year, payload).map_err(|e| e.to_string()))
            })
            .collect();
        normalized.sort_by_key(|(year, _)| *year);

        let mut summary = RunSummary {
            seasons_total: normalized.len(),
            ..RunSummary::default()
        };
        let mut seasons: BTreeMap<i32, Season> = BTreeMap::new();
        for (year, outcome) in normalized {
            match outcome {
                Ok(season) => {
                    summary.seasons_succeeded += 1;
                    seasons.insert(year, season);
                }
                Err(reason) => {
                    warn!(year, %reason, "skipping season");
                    summary.skipped.push(SkippedSeason { year, reason });
                }
            }
        }
        info!(
            succeeded = summary.seasons_succeeded,
            skipped = summary.skipped.len(),
            "normalized league history"
        );

        let resolver = OwnerResolver::build(&seasons, &self.config.co_owners);

        // BTreeMap iteration gives chronological year order; matchups inside
        // a season are already week-sorted by the normalizer.
        let matchups: Vec<Matchup> = seasons
            .values()
            .flat_map(|s| s.matchups.iter().copied())
            .collect();

        let champions = seasons
            .values()
            .filter_map(|season| {
                let id = season.champion_id?;
                let team = season.team(id)?;
                let owner_display_name = resolver
                    .owner_of(season.year, id)
                    .map(|o| resolver.display_name(o).to_string())
                    .unwrap_or_else(|| team.name.clone());
                Some(ChampionEntry {
                    year: season.year,
                    team_id: id,
                    team_name: team.name.clone(),
                    owner_display_name,
                    wins: team.wins,
                    losses: team.losses,
                    ties: team.ties,
                    points_for: team.points_for,
                })
            })
            .collect();

        let team_boards =
            Leaderboards::build(team_careers(&seasons), self.config.min_games_for_pct);
        let owner_boards = Leaderboards::build(
            owner_careers(&seasons, &resolver),
            self.config.min_games_for_pct,
        );
        let record_book = build_record_book(&seasons, &self.config);
        let h2h = H2HMatrix::build(&matchups);
        let analytics = build_report(&seasons, &resolver, &self.config);

        LeagueHistory {
            seasons,
            summary,
            champions,
            matchups,
            team_careers: team_boards,
            owner_careers: owner_boards,
            record_book,
            h2h,
            analytics,
            resolver,
            config: self.config.clone(),
        }
    }
}

/// The aggregate output object: season summaries, champions, careers, the
/// record book, head-to-head data, and the all-time analytics report, plus
/// on-demand per-year analytics views.
#[derive(Debug, Clone)]
pub struct LeagueHistory {
    pub seasons: BTreeMap<i32, Season>,
    pub summary: RunSummary,
    pub champions: Vec<ChampionEntry>,
    pub matchups: Vec<Matchup>,
    pub team_careers: Leaderboards,
    pub owner_careers: Leaderboards,
    pub record_book: RecordBook,
    pub h2h: H2HMatrix,
    pub analytics: AnalyticsReport,
    resolver: OwnerResolver,
    config: EngineConfig,
}

impl LeagueHistory {
    pub fn resolver(&self) -> &OwnerResolver {
        &self.resolver
    }

    pub fn h2h_between(&self, a: TeamId, b: TeamId) -> Option<H2HView> {
        self.h2h.record_between(a, b)
    }

    // Single-season views cover every identity active that year; the
    // current-owner filter only ever applies to all-time rows.

    pub fn luck_for_year(&self, year: i32) -> Vec<LuckRow> {
        compute_luck(&self.seasons, &self.resolver, Some(year))
    }

    pub fn consistency_for_year(&self, year: i32) -> Vec<ConsistencyRow> {
        compute_consistency(&self.seasons, &self.resolver, Some(year))
    }

    pub fn clutch_for_year(&self, year: i32) -> Vec<ClutchRow> {
        compute_clutch(&self.seasons, &self.resolver, &self.config, Some(year))
    }

    pub fn schedule_strength_for_year(&self, year: i32) -> Vec<SosRow> {
        compute_schedule_strength(&self.seasons, &self.resolver, Some(year))
    }
}
