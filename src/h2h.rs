use std::collections::BTreeMap;

use serde::Serialize;

use crate::model::{Matchup, TeamId};

/// One game between a canonical pair, oriented so `team1` is always the
/// lower id regardless of who hosted.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct H2HGame {
    pub year: i32,
    pub week: u32,
    pub playoff: bool,
    pub team1_score: f64,
    pub team2_score: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct H2HRecord {
    pub team1: TeamId,
    pub team2: TeamId,
    pub team1_wins: u32,
    pub team2_wins: u32,
    pub ties: u32,
    pub games: Vec<H2HGame>,
}

/// Per-pair view oriented to the team the caller asked about.
#[derive(Debug, Clone, Serialize)]
pub struct H2HView {
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
    pub games: Vec<H2HGame>,
}

/// Pairwise records keyed by `(min(id), max(id))`, so A-vs-B and B-vs-A are
/// one entry.
#[derive(Debug, Clone, Serialize)]
pub struct H2HMatrix {
    pairs: BTreeMap<(TeamId, TeamId), H2HRecord>,
}

impl H2HMatrix {
    /// `matchups` must already be in chronological order; the per-pair game
    /// lists inherit it.
    pub fn build(matchups: &[Matchup]) -> Self {
        let mut pairs: BTreeMap<(TeamId, TeamId), H2HRecord> = BTreeMap::new();
        for m in matchups {
            if m.home_id == m.away_id {
                continue;
            }
            let key = (m.home_id.min(m.away_id), m.home_id.max(m.away_id));
            let rec = pairs.entry(key).or_insert_with(|| H2HRecord {
                team1: key.0,
                team2: key.1,
                team1_wins: 0,
                team2_wins: 0,
                ties: 0,
                games: Vec::new(),
            });
            match m.winner() {
                Some(w) if w == key.0 => rec.team1_wins += 1,
                Some(_) => rec.team2_wins += 1,
                None => rec.ties += 1,
            }
            let (team1_score, team2_score) = if m.home_id == key.0 {
                (m.home_score, m.away_score)
            } else {
                (m.away_score, m.home_score)
            };
            rec.games.push(H2HGame {
                year: m.year,
                week: m.week,
                playoff: m.playoff,
                team1_score,
                team2_score,
            });
        }
        Self { pairs }
    }

    pub fn pairs(&self) -> impl Iterator<Item = &H2HRecord> {
        self.pairs.values()
    }

    /// Symmetric lookup: the view is oriented to `a`, whichever side of the
    /// canonical pair it sits on.
    pub fn record_between(&self, a: TeamId, b: TeamId) -> Option<H2HView> {
        if a == b {
            return None;
        }
        let key = (a.min(b), a.max(b));
        let rec = self.pairs.get(&key)?;
        let (wins, losses) = if a == key.0 {
            (rec.team1_wins, rec.team2_wins)
        } else {
            (rec.team2_wins, rec.team1_wins)
        };
        Some(H2HView {
            wins,
            losses,
            ties: rec.ties,
            games: rec.games.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matchup(week: u32, home_id: TeamId, away_id: TeamId, home: f64, away: f64) -> Matchup {
        Matchup {
            year: 2022,
            week,
            playoff: false,
            home_id,
            away_id,
            home_score: home,
            away_score: away,
        }
    }

    #[test]
    fn reverse_fixtures_share_one_entry() {
        let matchups = vec![
            matchup(1, 5, 2, 100.0, 90.0),
            matchup(8, 2, 5, 95.0, 110.0),
        ];
        let matrix = H2HMatrix::build(&matchups);
        assert_eq!(matrix.pairs().count(), 1);

        let view = matrix.record_between(5, 2).unwrap();
        assert_eq!(view.wins, 2);
        assert_eq!(view.losses, 0);
        assert_eq!(view.ties, 0);
        assert_eq!(view.games.len(), 2);
        // team1 is always id 2; week 1 it scored 90 as the away side.
        assert_eq!(view.games[0].team1_score, 90.0);
        assert_eq!(view.games[0].team2_score, 100.0);

        let reversed = matrix.record_between(2, 5).unwrap();
        assert_eq!(reversed.wins, 0);
        assert_eq!(reversed.losses, 2);
    }

    #[test]
    fn wins_plus_ties_cover_every_game() {
        let matchups = vec![
            matchup(1, 1, 2, 100.0, 90.0),
            matchup(2, 2, 1, 80.0, 80.0),
            matchup(3, 1, 2, 70.0, 90.0),
        ];
        let matrix = H2HMatrix::build(&matchups);
        let rec = matrix.pairs().next().unwrap();
        assert_eq!(
            rec.team1_wins + rec.team2_wins + rec.ties,
            rec.games.len() as u32
        );
        assert_eq!(rec.ties, 1);
    }
}
