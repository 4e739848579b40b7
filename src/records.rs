use std::collections::BTreeMap;

use serde::Serialize;

use crate::config::EngineConfig;
use crate::model::{GameRef, Matchup, Season, Streak, StreakKind, TeamId};

/// One team's side of one game, for the high/low score lists.
#[derive(Debug, Clone, Serialize)]
pub struct ScoreEntry {
    pub team_id: TeamId,
    pub team_name: String,
    pub score: f64,
    pub opponent_id: TeamId,
    pub opponent_score: f64,
    pub year: i32,
    pub week: u32,
    pub playoff: bool,
}

/// One decided game, for the blowout/closest lists. Ties have no winner and
/// never appear here.
#[derive(Debug, Clone, Serialize)]
pub struct MarginEntry {
    pub winner_id: TeamId,
    pub winner_name: String,
    pub winner_score: f64,
    pub loser_id: TeamId,
    pub loser_name: String,
    pub loser_score: f64,
    pub margin: f64,
    pub year: i32,
    pub week: u32,
    pub playoff: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecordBook {
    pub high_scores: Vec<ScoreEntry>,
    pub low_scores: Vec<ScoreEntry>,
    pub biggest_blowouts: Vec<MarginEntry>,
    pub closest_games: Vec<MarginEntry>,
    pub longest_win_streaks: Vec<Streak>,
    pub longest_loss_streaks: Vec<Streak>,
}

pub fn build_record_book(seasons: &BTreeMap<i32, Season>, cfg: &EngineConfig) -> RecordBook {
    let mut scores: Vec<ScoreEntry> = Vec::new();
    let mut margins: Vec<MarginEntry> = Vec::new();

    for season in seasons.values() {
        for m in &season.matchups {
            if score_eligible(m, cfg) {
                for (id, opp) in [(m.home_id, m.away_id), (m.away_id, m.home_id)] {
                    scores.push(ScoreEntry {
                        team_id: id,
                        team_name: team_name(season, id),
                        score: m.score_of(id).unwrap_or(0.0),
                        opponent_id: opp,
                        opponent_score: m.score_of(opp).unwrap_or(0.0),
                        year: m.year,
                        week: m.week,
                        playoff: m.playoff,
                    });
                }
            }
            if let (Some(winner), Some(loser)) = (m.winner(), m.loser()) {
                margins.push(MarginEntry {
                    winner_id: winner,
                    winner_name: team_name(season, winner),
                    winner_score: m.score_of(winner).unwrap_or(0.0),
                    loser_id: loser,
                    loser_name: team_name(season, loser),
                    loser_score: m.score_of(loser).unwrap_or(0.0),
                    margin: m.margin(),
                    year: m.year,
                    week: m.week,
                    playoff: m.playoff,
                });
            }
        }
    }

    let mut high_scores = scores.clone();
    high_scores.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| (a.year, a.week, a.team_id).cmp(&(b.year, b.week, b.team_id)))
    });
    let mut low_scores = scores;
    low_scores.sort_by(|a, b| {
        a.score
            .total_cmp(&b.score)
            .then_with(|| (a.year, a.week, a.team_id).cmp(&(b.year, b.week, b.team_id)))
    });

    let mut biggest_blowouts = margins.clone();
    biggest_blowouts.sort_by(|a, b| {
        b.margin
            .total_cmp(&a.margin)
            .then_with(|| (a.year, a.week, a.winner_id).cmp(&(b.year, b.week, b.winner_id)))
    });
    let mut closest_games = margins;
    closest_games.sort_by(|a, b| {
        a.margin
            .total_cmp(&b.margin)
            .then_with(|| (a.year, a.week, a.winner_id).cmp(&(b.year, b.week, b.winner_id)))
    });

    let (longest_win_streaks, longest_loss_streaks) = longest_streaks(seasons);

    RecordBook {
        high_scores,
        low_scores,
        biggest_blowouts,
        closest_games,
        longest_win_streaks,
        longest_loss_streaks,
    }
}

/// Early-era payloads carry garbage past the legacy week limit, so seasons at
/// or before the cutoff year only count weeks up to that limit toward the
/// score lists. Later seasons count every week, playoffs included.
fn score_eligible(m: &Matchup, cfg: &EngineConfig) -> bool {
    m.year > cfg.legacy_cutoff_year || m.week <= cfg.legacy_week_limit
}

fn team_name(season: &Season, id: TeamId) -> String {
    season
        .team(id)
        .map(|t| t.name.clone())
        .unwrap_or_else(|| format!("Team {id}"))
}

/// Per-game outcome from one team's perspective; `None` is a tie, which
/// resets both streak counters.
fn longest_streaks(seasons: &BTreeMap<i32, Season>) -> (Vec<Streak>, Vec<Streak>) {
    let mut games: BTreeMap<TeamId, Vec<(GameRef, Option<bool>)>> = BTreeMap::new();
    for season in seasons.values() {
        for m in &season.matchups {
            let winner = m.winner();
            let at = GameRef {
                year: m.year,
                week: m.week,
            };
            for id in [m.home_id, m.away_id] {
                let won = winner.map(|w| w == id);
                games.entry(id).or_default().push((at, won));
            }
        }
    }

    let mut wins = Vec::new();
    let mut losses = Vec::new();
    for (team_id, mut seq) in games {
        seq.sort_by_key(|(at, _)| *at);
        if let Some(best) = scan_streak(team_id, &seq, StreakKind::Win) {
            wins.push(best);
        }
        if let Some(best) = scan_streak(team_id, &seq, StreakKind::Loss) {
            losses.push(best);
        }
    }
    wins.sort_by(|a, b| b.length.cmp(&a.length).then(a.team_id.cmp(&b.team_id)));
    losses.sort_by(|a, b| b.length.cmp(&a.length).then(a.team_id.cmp(&b.team_id)));
    (wins, losses)
}

fn scan_streak(
    team_id: TeamId,
    seq: &[(GameRef, Option<bool>)],
    kind: StreakKind,
) -> Option<Streak> {
    let mut best: Option<Streak> = None;
    let mut run_len = 0u32;
    let mut run_start: Option<GameRef> = None;

    for &(at, won) in seq {
        let extends = match (kind, won) {
            (StreakKind::Win, Some(true)) => true,
            (StreakKind::Loss, Some(false)) => true,
            _ => false,
        };
        if extends {
            run_len += 1;
            let start = *run_start.get_or_insert(at);
            if best.as_ref().is_none_or(|b| run_len > b.length) {
                best = Some(Streak {
                    team_id,
                    kind,
                    length: run_len,
                    start,
                    end: at,
                });
            }
        } else {
            run_len = 0;
            run_start = None;
        }
    }
    best
}
