use std::collections::{BTreeMap, HashMap, HashSet};

use crate::config::CoOwnerTable;
use crate::model::{OwnerId, Season, TeamId};

pub const UNKNOWN_OWNER: &str = "Unknown Owner";

/// Maps every `(year, team)` to one canonical owner identity and resolves
/// display names. Built once per run from the full normalized season set.
#[derive(Debug, Clone)]
pub struct OwnerResolver {
    by_team: HashMap<(i32, TeamId), OwnerId>,
    names: HashMap<OwnerId, String>,
    current: HashSet<OwnerId>,
}

impl OwnerResolver {
    pub fn build(seasons: &BTreeMap<i32, Season>, table: &CoOwnerTable) -> Self {
        let mut by_team = HashMap::new();
        let mut names: HashMap<OwnerId, String> = HashMap::new();

        for (&year, season) in seasons {
            let roster: HashMap<&str, &str> = season
                .members
                .iter()
                .map(|m| (m.id.as_str(), m.display_name.as_str()))
                .collect();

            for team in &season.teams {
                let canonical = match team.owner_ids.first() {
                    Some(raw) => table.canonical(raw).to_string(),
                    // Synthetic pseudo-owner: the data still aggregates, but
                    // the id form marks it as not a real person.
                    None => format!("team-{}", team.id),
                };

                // First-seen roster name wins; overrides beat everything.
                if !names.contains_key(&canonical) {
                    let name = table
                        .override_name(&canonical)
                        .map(str::to_string)
                        .or_else(|| {
                            team.owner_ids
                                .iter()
                                .find_map(|raw| roster.get(raw.as_str()).map(|n| n.to_string()))
                        });
                    if let Some(name) = name {
                        names.insert(canonical.clone(), name);
                    }
                }

                by_team.insert((year, team.id), canonical);
            }
        }

        // Current = present in the most recent season that has teams.
        let current: HashSet<OwnerId> = seasons
            .values()
            .rev()
            .find(|s| !s.teams.is_empty())
            .map(|season| {
                season
                    .teams
                    .iter()
                    .filter_map(|t| by_team.get(&(season.year, t.id)).cloned())
                    .collect()
            })
            .unwrap_or_default();

        Self {
            by_team,
            names,
            current,
        }
    }

    pub fn owner_of(&self, year: i32, team_id: TeamId) -> Option<&OwnerId> {
        self.by_team.get(&(year, team_id))
    }

    /// Override name, else first-seen roster name, else `"Unknown Owner"`.
    pub fn display_name(&self, owner: &str) -> &str {
        self.names.get(owner).map(String::as_str).unwrap_or(UNKNOWN_OWNER)
    }

    /// Display filter only; never applied before aggregation.
    pub fn is_current(&self, owner: &str) -> bool {
        self.current.contains(owner)
    }

    pub fn current_owners(&self) -> &HashSet<OwnerId> {
        &self.current
    }
}
