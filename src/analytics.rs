use std::collections::BTreeMap;

use serde::Serialize;

use crate::clutch::{ClutchRow, compute_clutch};
use crate::config::EngineConfig;
use crate::consistency::{ConsistencyRow, compute_consistency};
use crate::luck::{LuckRow, SeasonLuck, compute_luck, season_breakdown};
use crate::model::Season;
use crate::owners::OwnerResolver;
use crate::schedule_strength::{SosRow, compute_schedule_strength};

#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsMeta {
    pub seasons_analyzed: usize,
    pub total_matchups: usize,
    pub close_margin: f64,
    pub blowout_margin: f64,
    pub legacy_cutoff_year: i32,
    pub legacy_week_limit: u32,
}

/// The all-time analytics view. Every metric is aggregated over the full
/// historical population first and only then narrowed to current owners;
/// filtering before aggregating would unbalance the expected-value math
/// (luck, SOS) against matchups played by departed owners. Per-year views
/// are produced separately and never filtered.
#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsReport {
    pub luck: Vec<LuckRow>,
    pub season_luck: Vec<SeasonLuck>,
    pub consistency: Vec<ConsistencyRow>,
    pub clutch: Vec<ClutchRow>,
    pub schedule_strength: Vec<SosRow>,
    pub meta: AnalyticsMeta,
}

pub fn build_report(
    seasons: &BTreeMap<i32, Season>,
    resolver: &OwnerResolver,
    cfg: &EngineConfig,
) -> AnalyticsReport {
    let retain_current = |owner: &str| resolver.is_current(owner);

    let mut luck = compute_luck(seasons, resolver, None);
    luck.retain(|r| retain_current(&r.owner));

    let mut consistency = compute_consistency(seasons, resolver, None);
    consistency.retain(|r| retain_current(&r.owner));

    let mut clutch = compute_clutch(seasons, resolver, cfg, None);
    clutch.retain(|r| retain_current(&r.owner));

    let mut schedule_strength = compute_schedule_strength(seasons, resolver, None);
    schedule_strength.retain(|r| retain_current(&r.owner));

    AnalyticsReport {
        luck,
        season_luck: season_breakdown(seasons, resolver),
        consistency,
        clutch,
        schedule_strength,
        meta: AnalyticsMeta {
            seasons_analyzed: seasons.len(),
            total_matchups: seasons.values().map(|s| s.matchups.len()).sum(),
            close_margin: cfg.close_margin,
            blowout_margin: cfg.blowout_margin,
            legacy_cutoff_year: cfg.legacy_cutoff_year,
            legacy_week_limit: cfg.legacy_week_limit,
        },
    }
}
