use std::collections::BTreeMap;

use serde::Serialize;

use crate::model::{OwnerId, Season, TeamId};
use crate::owners::OwnerResolver;

/// Schedule-variance metric: actual regular-season wins against the wins a
/// team "deserved" if it had played every other team each week.
#[derive(Debug, Clone, Serialize)]
pub struct LuckRow {
    pub owner: OwnerId,
    pub display_name: String,
    pub actual_wins: u32,
    pub expected_wins: f64,
    pub luck_score: f64,
    pub all_play_wins: u32,
    pub all_play_losses: u32,
    pub all_play_ties: u32,
    pub all_play_pct: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SeasonLuckExtreme {
    pub owner: OwnerId,
    pub display_name: String,
    pub luck_score: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SeasonLuck {
    pub year: i32,
    pub luckiest: Option<SeasonLuckExtreme>,
    pub unluckiest: Option<SeasonLuckExtreme>,
}

#[derive(Default)]
struct LuckAccum {
    actual_wins: u32,
    expected_wins: f64,
    all_play_wins: u32,
    all_play_losses: u32,
    all_play_ties: u32,
}

/// Aggregates over every historical identity; callers filter to current
/// owners at the display boundary, never here. Playoff weeks are excluded:
/// bracket pairings are seeded, not scheduled, so "luck" is meaningless
/// there.
pub fn compute_luck(
    seasons: &BTreeMap<i32, Season>,
    resolver: &OwnerResolver,
    year: Option<i32>,
) -> Vec<LuckRow> {
    let mut accum: BTreeMap<OwnerId, LuckAccum> = BTreeMap::new();

    for season in seasons.values() {
        if year.is_some_and(|y| y != season.year) {
            continue;
        }

        let mut weeks: BTreeMap<u32, Vec<(TeamId, f64)>> = BTreeMap::new();
        for m in season.matchups.iter().filter(|m| !m.playoff) {
            let entry = weeks.entry(m.week).or_default();
            entry.push((m.home_id, m.home_score));
            entry.push((m.away_id, m.away_score));

            if let Some(winner) = m.winner() {
                if let Some(owner) = resolver.owner_of(season.year, winner) {
                    accum.entry(owner.clone()).or_default().actual_wins += 1;
                }
            }
        }

        for scores in weeks.values() {
            let opponents = scores.len().saturating_sub(1);
            if opponents == 0 {
                continue;
            }
            for &(team, score) in scores {
                let Some(owner) = resolver.owner_of(season.year, team) else {
                    continue;
                };
                let outscored = scores
                    .iter()
                    .filter(|&&(other, s)| other != team && s < score)
                    .count();
                let tied = scores
                    .iter()
                    .filter(|&&(other, s)| other != team && s == score)
                    .count();
                let acc = accum.entry(owner.clone()).or_default();
                acc.expected_wins += outscored as f64 / opponents as f64;
                acc.all_play_wins += outscored as u32;
                acc.all_play_ties += tied as u32;
                acc.all_play_losses += (opponents - outscored - tied) as u32;
            }
        }
    }

    let mut rows: Vec<LuckRow> = accum
        .into_iter()
        .map(|(owner, acc)| {
            let all_play_games = acc.all_play_wins + acc.all_play_losses + acc.all_play_ties;
            let all_play_pct = if all_play_games > 0 {
                acc.all_play_wins as f64 / all_play_games as f64 * 100.0
            } else {
                0.0
            };
            LuckRow {
                display_name: resolver.display_name(&owner).to_string(),
                owner,
                actual_wins: acc.actual_wins,
                expected_wins: acc.expected_wins,
                luck_score: acc.actual_wins as f64 - acc.expected_wins,
                all_play_wins: acc.all_play_wins,
                all_play_losses: acc.all_play_losses,
                all_play_ties: acc.all_play_ties,
                all_play_pct,
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        b.luck_score
            .total_cmp(&a.luck_score)
            .then_with(|| a.display_name.cmp(&b.display_name))
    });
    rows
}

/// The single luckiest and unluckiest identity of each year, never filtered
/// by current-owner status.
pub fn season_breakdown(
    seasons: &BTreeMap<i32, Season>,
    resolver: &OwnerResolver,
) -> Vec<SeasonLuck> {
    seasons
        .keys()
        .map(|&year| {
            let rows = compute_luck(seasons, resolver, Some(year));
            let extreme = |row: Option<&LuckRow>| {
                row.map(|r| SeasonLuckExtreme {
                    owner: r.owner.clone(),
                    display_name: r.display_name.clone(),
                    luck_score: r.luck_score,
                })
            };
            SeasonLuck {
                year,
                // Rows come back sorted by luck score descending.
                luckiest: extreme(rows.first()),
                unluckiest: extreme(rows.last()),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CoOwnerTable;
    use crate::model::{Matchup, SeasonSettings, Team};

    fn team(id: TeamId) -> Team {
        Team {
            id,
            name: format!("Team {id}"),
            abbrev: format!("T{id}"),
            owner_ids: vec![format!("owner-{id}")],
            wins: 0,
            losses: 0,
            ties: 0,
            points_for: 0.0,
            points_against: 0.0,
            final_rank: None,
            playoff_seed: None,
        }
    }

    fn matchup(week: u32, home: TeamId, away: TeamId, hs: f64, aws: f64) -> Matchup {
        Matchup {
            year: 2022,
            week,
            playoff: false,
            home_id: home,
            away_id: away,
            home_score: hs,
            away_score: aws,
        }
    }

    fn league(matchups: Vec<Matchup>) -> (BTreeMap<i32, Season>, OwnerResolver) {
        let season = Season {
            year: 2022,
            teams: (1..=4).map(team).collect(),
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
    fn expected_wins_follow_weekly_outscore_share() {
        // Week 1: scores 120, 110, 100, 90. The 110 team outscored 2 of 3
        // opponents but lost its actual game to the 120 team.
        let (seasons, resolver) = league(vec![
            matchup(1, 1, 2, 120.0, 110.0),
            matchup(1, 3, 4, 100.0, 90.0),
        ]);
        let rows = compute_luck(&seasons, &resolver, None);
        let unlucky = rows.iter().find(|r| r.owner == "owner-2").unwrap();
        assert!((unlucky.expected_wins - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(unlucky.actual_wins, 0);
        assert!((unlucky.luck_score + 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(unlucky.all_play_wins, 2);
        assert_eq!(unlucky.all_play_losses, 1);
    }

    #[test]
    fn luck_is_zero_sum_within_a_season() {
        let (seasons, resolver) = league(vec![
            matchup(1, 1, 2, 120.0, 110.0),
            matchup(1, 3, 4, 100.0, 90.0),
            matchup(2, 1, 3, 95.0, 130.0),
            matchup(2, 2, 4, 101.0, 99.0),
        ]);
        let rows = compute_luck(&seasons, &resolver, Some(2022));
        let total: f64 = rows.iter().map(|r| r.luck_score).sum();
        assert!(total.abs() < 1e-9, "luck should be zero-sum, got {total}");
    }

    #[test]
    fn playoff_weeks_are_excluded() {
        let mut playoff = matchup(14, 1, 2, 150.0, 50.0);
        playoff.playoff = true;
        let (seasons, resolver) = league(vec![matchup(1, 1, 2, 100.0, 90.0), playoff]);
        let rows = compute_luck(&seasons, &resolver, None);
        let top = rows.iter().find(|r| r.owner == "owner-1").unwrap();
        // Only the week-1 game counts: 1 actual win, 1/1 expected.
        assert_eq!(top.actual_wins, 1);
        assert!((top.expected_wins - 1.0).abs() < 1e-12);
    }
}
