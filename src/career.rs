use std::collections::BTreeMap;

use crate::model::{AggregationKey, CareerRecord, Season, Team};
use crate::owners::OwnerResolver;

/// Fold every season, in chronological order, into career records keyed by
/// whatever `key_of` extracts. One routine serves both team-granular and
/// owner-granular aggregation; `name_of` supplies the display name (latest
/// team name, or resolved owner name).
pub fn fold_careers<K, N>(
    seasons: &BTreeMap<i32, Season>,
    mut key_of: K,
    mut name_of: N,
) -> Vec<CareerRecord>
where
    K: FnMut(&Season, &Team) -> AggregationKey,
    N: FnMut(&Season, &Team) -> String,
{
    let mut records: BTreeMap<AggregationKey, CareerRecord> = BTreeMap::new();

    for season in seasons.values() {
        for team in &season.teams {
            let key = key_of(season, team);
            let name = name_of(season, team);
            let rec = records.entry(key.clone()).or_insert_with(|| CareerRecord {
                key,
                display_name: name.clone(),
                wins: 0,
                losses: 0,
                ties: 0,
                points_for: 0.0,
                points_against: 0.0,
                championships: 0,
                championship_appearances: 0,
                playoff_appearances: 0,
                seasons_played: 0,
                first_year: season.year,
                last_year: season.year,
            });

            // Latest season's name wins for display.
            rec.display_name = name;
            rec.wins += team.wins;
            rec.losses += team.losses;
            rec.ties += team.ties;
            rec.points_for += team.points_for;
            rec.points_against += team.points_against;
            rec.seasons_played += 1;
            rec.last_year = season.year;

            if season.champion_id == Some(team.id) {
                rec.championships += 1;
            }
            if season.championship_participants.contains(&team.id) {
                rec.championship_appearances += 1;
            }
            if team
                .playoff_seed
                .is_some_and(|seed| seed <= season.settings.playoff_team_count)
            {
                rec.playoff_appearances += 1;
            }
        }
    }

    records.into_values().collect()
}

pub fn team_careers(seasons: &BTreeMap<i32, Season>) -> Vec<CareerRecord> {
    fold_careers(
        seasons,
        |_, team| AggregationKey::Team(team.id),
        |_, team| team.name.clone(),
    )
}

pub fn owner_careers(
    seasons: &BTreeMap<i32, Season>,
    resolver: &OwnerResolver,
) -> Vec<CareerRecord> {
    fold_careers(
        seasons,
        |season, team| {
            let owner = resolver
                .owner_of(season.year, team.id)
                .cloned()
                .unwrap_or_else(|| format!("team-{}", team.id));
            AggregationKey::Owner(owner)
        },
        |season, team| {
            resolver
                .owner_of(season.year, team.id)
                .map(|o| resolver.display_name(o).to_string())
                .unwrap_or_else(|| team.name.clone())
        },
    )
}

/// Full sorted populations, never pre-truncated; rendering decides how many
/// rows to show. Ties break by points-for, then display name.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Leaderboards {
    pub records: Vec<CareerRecord>,
    pub by_wins: Vec<CareerRecord>,
    pub by_win_pct: Vec<CareerRecord>,
    pub by_championships: Vec<CareerRecord>,
    pub by_championship_appearances: Vec<CareerRecord>,
    pub by_playoff_appearances: Vec<CareerRecord>,
}

impl Leaderboards {
    pub fn build(records: Vec<CareerRecord>, min_games_for_pct: u32) -> Self {
        let by_wins = sorted_by(&records, |r| r.wins as f64);
        let by_win_pct = {
            let eligible: Vec<CareerRecord> = records
                .iter()
                .filter(|r| r.games() >= min_games_for_pct.max(1))
                .cloned()
                .collect();
            sorted_by(&eligible, CareerRecord::win_pct)
        };
        let by_championships = sorted_by(&records, |r| r.championships as f64);
        let by_championship_appearances =
            sorted_by(&records, |r| r.championship_appearances as f64);
        let by_playoff_appearances = sorted_by(&records, |r| r.playoff_appearances as f64);
        Self {
            records,
            by_wins,
            by_win_pct,
            by_championships,
            by_championship_appearances,
            by_playoff_appearances,
        }
    }
}

fn sorted_by<F>(records: &[CareerRecord], mut value: F) -> Vec<CareerRecord>
where
    F: FnMut(&CareerRecord) -> f64,
{
    let mut out = records.to_vec();
    out.sort_by(|a, b| {
        value(b)
            .total_cmp(&value(a))
            .then_with(|| b.points_for.total_cmp(&a.points_for))
            .then_with(|| a.display_name.cmp(&b.display_name))
    });
    out
}
