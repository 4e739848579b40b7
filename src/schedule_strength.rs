use std::collections::BTreeMap;

use serde::Serialize;

use crate::model::{OwnerId, Season};
use crate::owners::OwnerResolver;

#[derive(Debug, Clone, Serialize)]
pub struct SosRow {
    pub owner: OwnerId,
    pub display_name: String,
    pub games: u32,
    pub avg_opponent_score: f64,
    /// Mean of opponents' season win percentages, percent.
    pub avg_opponent_win_pct: f64,
    /// Average opponent score relative to the league average, scaled to 100.
    pub sos_index: f64,
    pub own_win_pct: f64,
    /// Own win% nudged by half the SOS deviation from 100.
    pub adjusted_win_pct: f64,
}

#[derive(Default)]
struct SosAccum {
    games: u32,
    wins: u32,
    decided: u32,
    opponent_score_sum: f64,
    opponent_win_pct_sum: f64,
}

/// Strength of schedule over regular-season games. The league average is
/// computed over every score in the population, so the index stays balanced
/// across the full history even when the caller later narrows the rows to
/// current owners.
pub fn compute_schedule_strength(
    seasons: &BTreeMap<i32, Season>,
    resolver: &OwnerResolver,
    year: Option<i32>,
) -> Vec<SosRow> {
    let mut accum: BTreeMap<OwnerId, SosAccum> = BTreeMap::new();
    let mut league_score_sum = 0.0;
    let mut league_score_count = 0usize;

    for season in seasons.values() {
        if year.is_some_and(|y| y != season.year) {
            continue;
        }
        for m in season.matchups.iter().filter(|m| !m.playoff) {
            league_score_sum += m.home_score + m.away_score;
            league_score_count += 2;

            let winner = m.winner();
            for (team, opponent) in [(m.home_id, m.away_id), (m.away_id, m.home_id)] {
                let Some(owner) = resolver.owner_of(season.year, team) else {
                    continue;
                };
                let acc = accum.entry(owner.clone()).or_default();
                acc.games += 1;
                acc.opponent_score_sum += m.score_of(opponent).unwrap_or(0.0);
                acc.opponent_win_pct_sum += season
                    .team(opponent)
                    .map(|t| t.win_pct())
                    .unwrap_or(0.0);
                if winner.is_some() {
                    acc.decided += 1;
                    if winner == Some(team) {
                        acc.wins += 1;
                    }
                }
            }
        }
    }

    if league_score_count == 0 {
        return Vec::new();
    }
    let league_average = league_score_sum / league_score_count as f64;

    let mut rows: Vec<SosRow> = accum
        .into_iter()
        .filter(|(_, acc)| acc.games > 0)
        .map(|(owner, acc)| {
            let avg_opponent_score = acc.opponent_score_sum / acc.games as f64;
            let avg_opponent_win_pct = acc.opponent_win_pct_sum / acc.games as f64;
            let sos_index = if league_average > 0.0 {
                avg_opponent_score / league_average * 100.0
            } else {
                100.0
            };
            let own_win_pct = if acc.decided > 0 {
                acc.wins as f64 / acc.decided as f64 * 100.0
            } else {
                0.0
            };
            SosRow {
                display_name: resolver.display_name(&owner).to_string(),
                owner,
                games: acc.games,
                avg_opponent_score,
                avg_opponent_win_pct,
                sos_index,
                own_win_pct,
                adjusted_win_pct: own_win_pct + (sos_index - 100.0) * 0.5,
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        b.sos_index
            .total_cmp(&a.sos_index)
            .then_with(|| a.display_name.cmp(&b.display_name))
    });
    rows
}
