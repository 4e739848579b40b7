use std::fs;
use std::path::PathBuf;

use serde_json::{Value, json};

use league_almanac::normalize::{NormalizeError, normalize_season};

fn read_fixture(name: &str) -> Value {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    let raw = fs::read_to_string(path).expect("fixture file should be readable");
    serde_json::from_str(&raw).expect("fixture should be valid json")
}

#[test]
fn modern_payload_normalizes() {
    let season = normalize_season(2023, &read_fixture("season_modern.json"))
        .expect("modern fixture should normalize");

    assert_eq!(season.year, 2023);
    assert_eq!(season.teams.len(), 4);
    assert_eq!(season.members.len(), 4);
    assert_eq!(season.settings.regular_season_weeks, 3);
    assert_eq!(season.settings.playoff_team_count, 2);

    let alpha = season.team(1).expect("team 1 should exist");
    assert_eq!(alpha.name, "Alpha Attack");
    assert_eq!(alpha.abbrev, "ALP");
    assert_eq!(alpha.owner_ids, vec!["{A1}".to_string()]);
    assert_eq!(alpha.wins, 3);
    assert_eq!(alpha.points_for, 350.5);
    assert_eq!(alpha.final_rank, Some(1));
    assert_eq!(alpha.playoff_seed, Some(1));

    assert_eq!(season.matchups.len(), 8);
    assert_eq!(season.matchups.iter().filter(|m| m.playoff).count(), 2);

    // Rank 1 wins the fallback chain at step one.
    assert_eq!(season.champion_id, Some(1));
    // Title-game participants come from the winners-bracket final.
    assert_eq!(season.championship_participants, vec![1, 2]);
}

#[test]
fn legacy_payload_normalizes_with_era_defaults() {
    let season = normalize_season(2017, &read_fixture("season_legacy.json"))
        .expect("legacy fixture should normalize");

    // No settings block: 2017 defaults to 13 weeks and a 6-team field.
    assert_eq!(season.settings.regular_season_weeks, 13);
    assert_eq!(season.settings.playoff_team_count, 6);

    let old_guard = season.team(1).expect("team 1 should exist");
    assert_eq!(old_guard.name, "Old Guard");
    assert_eq!(old_guard.abbrev, "OG");
    assert_eq!(old_guard.owner_ids, vec!["{A1}".to_string()]);
    assert_eq!(old_guard.wins, 2);

    // No tier markers: playoff status falls back to the week cutoff.
    let playoff_weeks: Vec<u32> = season
        .matchups
        .iter()
        .filter(|m| m.playoff)
        .map(|m| m.week)
        .collect();
    assert_eq!(playoff_weeks, vec![14]);

    // No final ranks and no winners bracket: best record takes the title.
    assert_eq!(season.champion_id, Some(1));
    // Participants degrade to just the champion (no rank-2 team known).
    assert_eq!(season.championship_participants, vec![1]);
}

#[test]
fn champion_falls_back_to_bracket_final_winner() {
    // No rankCalculatedFinal anywhere, but an explicit winners-bracket final
    // decided 120-110: the 120-point side is champion.
    let payload = json!({
        "teams": [
            {"id": 1, "name": "First", "record": {"overall": {"wins": 5, "losses": 1}}},
            {"id": 2, "name": "Second", "record": {"overall": {"wins": 4, "losses": 2}}}
        ],
        "schedule": [
            {"matchupPeriodId": 14, "playoffTierType": "WINNERS_BRACKET",
             "home": {"teamId": 2, "totalPoints": 120.0},
             "away": {"teamId": 1, "totalPoints": 110.0}}
        ]
    });
    let season = normalize_season(2022, &payload).expect("payload should normalize");
    assert_eq!(season.champion_id, Some(2));
    assert_eq!(season.championship_participants, vec![2, 1]);
}

#[test]
fn tied_bracket_final_falls_through_to_record() {
    let payload = json!({
        "teams": [
            {"id": 1, "name": "First", "playoffSeed": 2,
             "record": {"overall": {"wins": 5, "losses": 1}}},
            {"id": 2, "name": "Second", "playoffSeed": 1,
             "record": {"overall": {"wins": 5, "losses": 1}}}
        ],
        "schedule": [
            {"matchupPeriodId": 14, "playoffTierType": "WINNERS_BRACKET",
             "home": {"teamId": 2, "totalPoints": 100.0},
             "away": {"teamId": 1, "totalPoints": 100.0}}
        ]
    });
    let season = normalize_season(2022, &payload).expect("payload should normalize");
    // Step two resolves nothing on a tie; step three breaks the equal
    // records on playoff seed.
    assert_eq!(season.champion_id, Some(2));
}

#[test]
fn provider_error_payload_is_typed() {
    let payload = json!({"error": "season not available"});
    let err = normalize_season(2015, &payload).expect_err("error payload must not normalize");
    assert!(matches!(err, NormalizeError::ProviderError { year: 2015, .. }));
}

#[test]
fn missing_team_list_is_typed() {
    let err = normalize_season(2016, &json!({"schedule": []}))
        .expect_err("payload without teams must not normalize");
    assert!(matches!(err, NormalizeError::MissingTeams { year: 2016 }));
    let err = normalize_season(2016, &json!({"teams": []}))
        .expect_err("empty team list must not normalize");
    assert!(matches!(err, NormalizeError::MissingTeams { year: 2016 }));
}

#[test]
fn unplayed_zero_zero_rows_are_dropped() {
    let payload = json!({
        "teams": [{"id": 1, "name": "First"}, {"id": 2, "name": "Second"}],
        "schedule": [
            {"matchupPeriodId": 1,
             "home": {"teamId": 1, "totalPoints": 0.0},
             "away": {"teamId": 2, "totalPoints": 0.0}},
            {"matchupPeriodId": 2,
             "home": {"teamId": 1, "totalPoints": 101.0},
             "away": {"teamId": 2, "totalPoints": 99.0}}
        ]
    });
    let season = normalize_season(2022, &payload).expect("payload should normalize");
    assert_eq!(season.matchups.len(), 1);
    assert_eq!(season.matchups[0].week, 2);
}
