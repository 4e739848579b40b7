use std::collections::BTreeMap;

use serde::Serialize;

use crate::model::{OwnerId, Season};
use crate::owners::OwnerResolver;

/// Too few games and every statistic here is noise.
pub const MIN_SCORES: usize = 3;

const BOOM_FACTOR: f64 = 1.2;
const BUST_FACTOR: f64 = 0.8;

#[derive(Debug, Clone, Serialize)]
pub struct ConsistencyRow {
    pub owner: OwnerId,
    pub display_name: String,
    pub games: usize,
    pub mean: f64,
    pub std_dev: f64,
    /// Coefficient of variation, percent; lower is more consistent.
    pub cv: f64,
    /// 10th-percentile score (index-based, no interpolation).
    pub floor: f64,
    /// 90th-percentile score.
    pub ceiling: f64,
    /// Share of games at or above 120% of the identity's own mean, percent.
    pub boom_pct: f64,
    /// Share of games at or below 80% of the mean, percent.
    pub bust_pct: f64,
}

/// Scoring spread per identity over every game played (regular season and
/// playoffs). Identities under [`MIN_SCORES`] games are omitted, not errors.
pub fn compute_consistency(
    seasons: &BTreeMap<i32, Season>,
    resolver: &OwnerResolver,
    year: Option<i32>,
) -> Vec<ConsistencyRow> {
    let mut scores: BTreeMap<OwnerId, Vec<f64>> = BTreeMap::new();
    for season in seasons.values() {
        if year.is_some_and(|y| y != season.year) {
            continue;
        }
        for m in &season.matchups {
            for (team, score) in [(m.home_id, m.home_score), (m.away_id, m.away_score)] {
                if let Some(owner) = resolver.owner_of(season.year, team) {
                    scores.entry(owner.clone()).or_default().push(score);
                }
            }
        }
    }

    let mut rows: Vec<ConsistencyRow> = scores
        .into_iter()
        .filter(|(_, s)| s.len() >= MIN_SCORES)
        .map(|(owner, mut s)| {
            let n = s.len();
            let mean = s.iter().sum::<f64>() / n as f64;
            let variance = s.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n as f64;
            let std_dev = variance.sqrt();
            let cv = if mean > 0.0 { std_dev / mean * 100.0 } else { 0.0 };

            s.sort_by(f64::total_cmp);
            let floor = s[(n as f64 * 0.10).floor() as usize];
            let ceiling = s[((n as f64 * 0.90).floor() as usize).min(n - 1)];

            let booms = s.iter().filter(|&&x| x >= mean * BOOM_FACTOR).count();
            let busts = s.iter().filter(|&&x| x <= mean * BUST_FACTOR).count();

            ConsistencyRow {
                display_name: resolver.display_name(&owner).to_string(),
                owner,
                games: n,
                mean,
                std_dev,
                cv,
                floor,
                ceiling,
                boom_pct: booms as f64 / n as f64 * 100.0,
                bust_pct: busts as f64 / n as f64 * 100.0,
            }
        })
        .collect();

    // Most consistent first.
    rows.sort_by(|a, b| {
        a.cv.total_cmp(&b.cv)
            .then_with(|| a.display_name.cmp(&b.display_name))
    });
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CoOwnerTable;
    use crate::model::{Matchup, SeasonSettings, Team};

    fn league_with_scores(scores: &[f64]) -> (BTreeMap<i32, Season>, OwnerResolver) {
        // Team 1 posts the given scores; team 2 answers with 90 every week.
        let teams = vec![
            Team {
                id: 1,
                name: "One".to_string(),
                abbrev: "ONE".to_string(),
                owner_ids: vec!["o1".to_string()],
                wins: 0,
                losses: 0,
                ties: 0,
                points_for: 0.0,
                points_against: 0.0,
                final_rank: None,
                playoff_seed: None,
            },
            Team {
                id: 2,
                name: "Two".to_string(),
                abbrev: "TWO".to_string(),
                owner_ids: vec!["o2".to_string()],
                wins: 0,
                losses: 0,
                ties: 0,
                points_for: 0.0,
                points_against: 0.0,
                final_rank: None,
                playoff_seed: None,
            },
        ];
        let matchups = scores
            .iter()
            .enumerate()
            .map(|(i, &s)| Matchup {
                year: 2022,
                week: i as u32 + 1,
                playoff: false,
                home_id: 1,
                away_id: 2,
                home_score: s,
                away_score: 90.0,
            })
            .collect();
        let season = Season {
            year: 2022,
            teams,
            matchups,
            members: Vec::new(),
            settings: SeasonSettings {
                regular_season_weeks: 13,
                playoff_team_count: 6,
            },
            champion_id: None,
            championship_participants: Vec::new(),
        };
        let seasons = BTreeMap::from([(2022, season)]);
        let resolver = OwnerResolver::build(&seasons, &CoOwnerTable::default());
        (seasons, resolver)
    }

    #[test]
    fn population_stddev_and_cv() {
        let (seasons, resolver) = league_with_scores(&[90.0, 100.0, 110.0]);
        let rows = compute_consistency(&seasons, &resolver, None);
        let row = rows.iter().find(|r| r.owner == "o1").unwrap();
        assert!((row.mean - 100.0).abs() < 1e-12);
        // Population std dev of {90,100,110} = sqrt(200/3).
        assert!((row.std_dev - (200.0_f64 / 3.0).sqrt()).abs() < 1e-9);
        assert!((row.cv - row.std_dev).abs() < 1e-9); // mean is 100
    }

    #[test]
    fn one_game_is_excluded_two_games_too() {
        let (seasons, resolver) = league_with_scores(&[100.0]);
        assert!(compute_consistency(&seasons, &resolver, None).is_empty());
        let (seasons, resolver) = league_with_scores(&[100.0, 101.0]);
        assert!(compute_consistency(&seasons, &resolver, None).is_empty());
    }

    #[test]
    fn percentiles_are_index_based() {
        let scores: Vec<f64> = (1..=10).map(|i| i as f64 * 10.0).collect();
        let (seasons, resolver) = league_with_scores(&scores);
        let rows = compute_consistency(&seasons, &resolver, None);
        let row = rows.iter().find(|r| r.owner == "o1").unwrap();
        // floor = sorted[1] = 20, ceiling = sorted[9] = 100.
        assert_eq!(row.floor, 20.0);
        assert_eq!(row.ceiling, 100.0);
    }

    #[test]
    fn boom_and_bust_rates_use_own_mean() {
        // mean = 100; 130 is a boom (>=120), 70 a bust (<=80).
        let (seasons, resolver) = league_with_scores(&[130.0, 70.0, 100.0, 100.0]);
        let rows = compute_consistency(&seasons, &resolver, None);
        let row = rows.iter().find(|r| r.owner == "o1").unwrap();
        assert!((row.boom_pct - 25.0).abs() < 1e-9);
        assert!((row.bust_pct - 25.0).abs() < 1e-9);
    }
}
