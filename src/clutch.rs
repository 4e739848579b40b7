use std::collections::BTreeMap;

use serde::Serialize;

use crate::config::EngineConfig;
use crate::model::{OwnerId, Season};
use crate::owners::OwnerResolver;

#[derive(Debug, Clone, Serialize)]
pub struct ClutchRow {
    pub owner: OwnerId,
    pub display_name: String,
    pub close_wins: u32,
    pub close_losses: u32,
    pub blowout_wins: u32,
    pub blowout_losses: u32,
    /// Decided (non-tie) regular-season games at any margin.
    pub decided_games: u32,
    pub overall_win_pct: f64,
    pub close_win_pct: f64,
    /// Close-game win% minus overall win%; positive means the identity wins
    /// the tight ones.
    pub clutch_factor: f64,
}

#[derive(Default)]
struct ClutchAccum {
    close_wins: u32,
    close_losses: u32,
    blowout_wins: u32,
    blowout_losses: u32,
    decided_games: u32,
}

/// Close/blowout bucketing over regular-season games. A margin equal to the
/// close threshold is close; a margin equal to the blowout threshold is not
/// a blowout. Ties have no winner and never enter any bucket.
pub fn compute_clutch(
    seasons: &BTreeMap<i32, Season>,
    resolver: &OwnerResolver,
    cfg: &EngineConfig,
    year: Option<i32>,
) -> Vec<ClutchRow> {
    let mut accum: BTreeMap<OwnerId, ClutchAccum> = BTreeMap::new();

    for season in seasons.values() {
        if year.is_some_and(|y| y != season.year) {
            continue;
        }
        for m in season.matchups.iter().filter(|m| !m.playoff) {
            let (Some(winner), Some(loser)) = (m.winner(), m.loser()) else {
                continue;
            };
            let margin = m.margin();
            let close = margin <= cfg.close_margin;
            let blowout = margin > cfg.blowout_margin;

            for (team, won) in [(winner, true), (loser, false)] {
                let Some(owner) = resolver.owner_of(season.year, team) else {
                    continue;
                };
                let acc = accum.entry(owner.clone()).or_default();
                acc.decided_games += 1;
                match (close, blowout, won) {
                    (true, _, true) => acc.close_wins += 1,
                    (true, _, false) => acc.close_losses += 1,
                    (_, true, true) => acc.blowout_wins += 1,
                    (_, true, false) => acc.blowout_losses += 1,
                    _ => {}
                }
            }
        }
    }

    let mut rows: Vec<ClutchRow> = accum
        .into_iter()
        .filter(|(_, acc)| acc.decided_games > 0)
        .map(|(owner, acc)| {
            let overall_win_pct =
                (acc.close_wins + acc.blowout_wins) as f64 / acc.decided_games as f64 * 100.0;
            let close_games = acc.close_wins + acc.close_losses;
            let close_win_pct = if close_games > 0 {
                acc.close_wins as f64 / close_games as f64 * 100.0
            } else {
                0.0
            };
            ClutchRow {
                display_name: resolver.display_name(&owner).to_string(),
                owner,
                close_wins: acc.close_wins,
                close_losses: acc.close_losses,
                blowout_wins: acc.blowout_wins,
                blowout_losses: acc.blowout_losses,
                decided_games: acc.decided_games,
                overall_win_pct,
                close_win_pct,
                clutch_factor: close_win_pct - overall_win_pct,
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        b.clutch_factor
            .total_cmp(&a.clutch_factor)
            .then_with(|| a.display_name.cmp(&b.display_name))
    });
    rows
}
