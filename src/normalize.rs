use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::model::{Matchup, Member, Season, SeasonSettings, Team, TeamId};

const WINNERS_BRACKET: &str = "WINNERS_BRACKET";
const DEFAULT_PLAYOFF_TEAMS: u32 = 6;

/// A season the aggregator must skip, never one that aborts the run.
#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("season {year}: provider reported: {message}")]
    ProviderError { year: i32, message: String },
    #[error("season {year}: payload has no team list")]
    MissingTeams { year: i32 },
}

/// Turn one opaque provider payload into a canonical [`Season`]. All
/// provider-era shape differences (nested vs flat records, live vs final
/// score fields, playoff tier markers) are absorbed here; nothing downstream
/// ever touches raw payload fields.
pub fn normalize_season(year: i32, payload: &Value) -> Result<Season, NormalizeError> {
    if let Some(message) = payload.get("error").and_then(|v| v.as_str()) {
        return Err(NormalizeError::ProviderError {
            year,
            message: message.to_string(),
        });
    }

    let Some(raw_teams) = payload.get("teams").and_then(|v| v.as_array()) else {
        return Err(NormalizeError::MissingTeams { year });
    };
    if raw_teams.is_empty() {
        return Err(NormalizeError::MissingTeams { year });
    }

    let settings = parse_settings(year, payload.get("settings"));
    let members = parse_members(payload.get("members"));
    let teams: Vec<Team> = raw_teams.iter().filter_map(parse_team).collect();
    if teams.is_empty() {
        return Err(NormalizeError::MissingTeams { year });
    }

    let games = parse_schedule(year, payload.get("schedule"), &settings);
    let final_game = winners_bracket_final(&games);
    let matchups: Vec<Matchup> = games.into_iter().map(|g| g.matchup).collect();
    let champion_id = resolve_champion(&teams, final_game.as_ref());
    let championship_participants =
        championship_participants(&teams, champion_id, final_game.as_ref());

    debug!(
        year,
        teams = teams.len(),
        matchups = matchups.len(),
        champion = ?champion_id,
        "normalized season"
    );

    Ok(Season {
        year,
        teams,
        matchups,
        members,
        settings,
        champion_id,
        championship_participants,
    })
}

fn parse_settings(year: i32, value: Option<&Value>) -> SeasonSettings {
    let schedule = value
        .and_then(|v| v.get("scheduleSettings"))
        .or(value)
        .unwrap_or(&Value::Null);
    let regular_season_weeks = pick_u32(schedule, &["matchupPeriodCount", "regularSeasonWeeks"])
        .unwrap_or(default_regular_season_weeks(year));
    let playoff_team_count = pick_u32(schedule, &["playoffTeamCount", "playoffTeams"])
        .filter(|&n| n > 0)
        .unwrap_or(DEFAULT_PLAYOFF_TEAMS);
    SeasonSettings {
        regular_season_weeks,
        playoff_team_count,
    }
}

/// The league went from 13 to 14 regular-season weeks when the NFL added a
/// week in 2021; payloads that omit the period count default by era.
fn default_regular_season_weeks(year: i32) -> u32 {
    if year <= 2020 { 13 } else { 14 }
}

fn parse_members(value: Option<&Value>) -> Vec<Member> {
    let Some(list) = value.and_then(|v| v.as_array()) else {
        return Vec::new();
    };
    list.iter()
        .filter_map(|entry| {
            let id = pick_string(entry, &["id", "memberId"])?;
            let display_name = pick_string(entry, &["displayName", "nickname"])
                .or_else(|| {
                    let first = pick_string(entry, &["firstName"])?;
                    let last = pick_string(entry, &["lastName"])?;
                    Some(format!("{first} {last}"))
                })
                .unwrap_or_else(|| id.clone());
            Some(Member { id, display_name })
        })
        .collect()
}

fn parse_team(value: &Value) -> Option<Team> {
    let id = pick_u32(value, &["id", "teamId"])?;
    let name = pick_string(value, &["name"]).or_else(|| {
        let location = pick_string(value, &["location"])?;
        let nickname = pick_string(value, &["nickname"])?;
        Some(format!("{location} {nickname}"))
    })?;
    let abbrev = pick_string(value, &["abbrev", "abbreviation"])
        .unwrap_or_else(|| abbreviate(&name));

    // Record fields live under record.overall on modern payloads, directly on
    // the team on older ones.
    let record = value
        .get("record")
        .map(|r| r.get("overall").unwrap_or(r))
        .unwrap_or(value);
    let wins = pick_u32(record, &["wins"]).unwrap_or(0);
    let losses = pick_u32(record, &["losses"]).unwrap_or(0);
    let ties = pick_u32(record, &["ties"]).unwrap_or(0);
    let points_for = pick_f64(record, &["pointsFor", "points"]).unwrap_or(0.0);
    let points_against = pick_f64(record, &["pointsAgainst"]).unwrap_or(0.0);

    let final_rank =
        pick_u32(value, &["rankCalculatedFinal", "finalRank"]).filter(|&r| r > 0);
    let playoff_seed = pick_u32(value, &["playoffSeed"]).filter(|&s| s > 0);

    Some(Team {
        id,
        name,
        abbrev,
        owner_ids: parse_owner_ids(value),
        wins,
        losses,
        ties,
        points_for,
        points_against,
        final_rank,
        playoff_seed,
    })
}

/// Owner ids in source-priority order: owners array, then primary-owner
/// field, then embedded owner/member sub-records.
fn parse_owner_ids(team: &Value) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();
    if let Some(list) = team.get("owners").and_then(|v| v.as_array()) {
        for entry in list {
            let id = entry
                .as_str()
                .map(str::to_string)
                .or_else(|| pick_string(entry, &["id"]));
            if let Some(id) = id {
                if !ids.contains(&id) {
                    ids.push(id);
                }
            }
        }
    }
    if let Some(id) = pick_string(team, &["primaryOwner"]) {
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    for key in ["owner", "member"] {
        if let Some(id) = team.get(key).and_then(|v| pick_string(v, &["id"])) {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
    }
    ids
}

/// A matchup plus the raw playoff tier marker it carried, kept long enough to
/// locate the winners-bracket final.
struct ParsedGame {
    matchup: Matchup,
    tier: Option<String>,
}

fn parse_schedule(year: i32, value: Option<&Value>, settings: &SeasonSettings) -> Vec<ParsedGame> {
    let Some(list) = value.and_then(|v| v.as_array()) else {
        return Vec::new();
    };
    let mut games: Vec<ParsedGame> = list
        .iter()
        .filter_map(|entry| parse_matchup(year, entry, settings))
        .collect();
    games.sort_by_key(|g| (g.matchup.week, g.matchup.home_id.min(g.matchup.away_id)));
    games
}

fn parse_matchup(year: i32, value: &Value, settings: &SeasonSettings) -> Option<ParsedGame> {
    let week = pick_u32(value, &["matchupPeriodId", "week"])?;

    let (home_id, home_score, away_id, away_score) =
        match (value.get("home"), value.get("away")) {
            (Some(home), Some(away)) => (
                pick_u32(home, &["teamId", "id"])?,
                side_score(home)?,
                pick_u32(away, &["teamId", "id"])?,
                side_score(away)?,
            ),
            // Flat legacy rows; a row missing the away side is a bye.
            _ => (
                pick_u32(value, &["homeTeamId"])?,
                pick_f64(value, &["homeScore"])?,
                pick_u32(value, &["awayTeamId"])?,
                pick_f64(value, &["awayScore"])?,
            ),
        };

    // Unplayed weeks come through as 0-0; they carry no information.
    if home_score == 0.0 && away_score == 0.0 {
        return None;
    }

    let tier = pick_string(value, &["playoffTierType", "playoffTier"]);
    let playoff = match tier.as_deref() {
        Some(tier) => tier != "NONE",
        None => week > settings.regular_season_weeks,
    };

    Some(ParsedGame {
        matchup: Matchup {
            year,
            week,
            playoff,
            home_id,
            away_id,
            home_score,
            away_score,
        },
        tier,
    })
}

fn side_score(side: &Value) -> Option<f64> {
    pick_f64(side, &["totalPoints", "totalPointsLive", "score"])
}

/// The last winners-bracket matchup by week. Only explicit tier markers
/// qualify; payloads without them have no identifiable bracket.
fn winners_bracket_final(games: &[ParsedGame]) -> Option<Matchup> {
    games
        .iter()
        .filter(|g| g.tier.as_deref() == Some(WINNERS_BRACKET))
        .max_by_key(|g| g.matchup.week)
        .map(|g| g.matchup)
}

/// Three-step fallback: explicit final rank 1, then the winners-bracket final
/// winner (a tied final resolves nothing), then best regular-season record
/// with playoff seed as the tie-break.
fn resolve_champion(teams: &[Team], final_game: Option<&Matchup>) -> Option<TeamId> {
    if let Some(team) = teams.iter().find(|t| t.final_rank == Some(1)) {
        return Some(team.id);
    }
    if let Some(winner) = final_game.and_then(Matchup::winner) {
        return Some(winner);
    }
    teams
        .iter()
        .max_by_key(|t| {
            (
                t.wins as i64 - t.losses as i64,
                // Better (lower) seed wins the tie; missing seed loses it.
                -(t.playoff_seed.unwrap_or(u32::MAX) as i64),
                -(t.id as i64),
            )
        })
        .map(|t| t.id)
}

/// The two title-game teams when the final is known; otherwise the champion
/// plus the rank-2 team; otherwise just the champion.
fn championship_participants(
    teams: &[Team],
    champion_id: Option<TeamId>,
    final_game: Option<&Matchup>,
) -> Vec<TeamId> {
    if let Some(game) = final_game {
        return vec![game.home_id, game.away_id];
    }
    let Some(champion) = champion_id else {
        return Vec::new();
    };
    let mut out = vec![champion];
    if let Some(runner_up) = teams
        .iter()
        .find(|t| t.final_rank == Some(2) && t.id != champion)
    {
        out.push(runner_up.id);
    }
    out
}

fn abbreviate(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|w| w.chars().next())
        .take(4)
        .collect::<String>()
        .to_uppercase()
}

fn pick_string(value: &Value, keys: &[&str]) -> Option<String> {
    for key in keys {
        if let Some(v) = value.get(*key) {
            if let Some(s) = v.as_str() {
                if !s.is_empty() {
                    return Some(s.to_string());
                }
            }
        }
    }
    None
}

fn pick_u32(value: &Value, keys: &[&str]) -> Option<u32> {
    for key in keys {
        if let Some(v) = value.get(*key) {
            if let Some(num) = v.as_u64() {
                return u32::try_from(num).ok();
            }
            if let Some(s) = v.as_str() {
                if let Ok(num) = s.parse::<u32>() {
                    return Some(num);
                }
            }
        }
    }
    None
}

fn pick_f64(value: &Value, keys: &[&str]) -> Option<f64> {
    for key in keys {
        if let Some(v) = value.get(*key) {
            if let Some(num) = v.as_f64() {
                return Some(num);
            }
            if let Some(s) = v.as_str() {
                if let Ok(num) = s.parse::<f64>() {
                    return Some(num);
                }
            }
        }
    }
    None
}
