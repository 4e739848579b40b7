use serde::Serialize;

pub type TeamId = u32;

/// Canonical owner identity, post co-owner merging. Synthetic pseudo-owners
/// (teams with no resolvable owner) use the `team-<id>` form.
pub type OwnerId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeasonSettings {
    pub regular_season_weeks: u32,
    pub playoff_team_count: u32,
}

/// League-member roster entry as the provider reports it (raw id, pre-merge).
#[derive(Debug, Clone, Serialize)]
pub struct Member {
    pub id: String,
    pub display_name: String,
}

/// One team's snapshot for a single season. Team ids are scoped to
/// `(year, id)`; identity continuity across years is owner-based.
#[derive(Debug, Clone, Serialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub abbrev: String,
    /// Raw provider owner ids in source-priority order (roster entry first).
    pub owner_ids: Vec<String>,
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
    pub points_for: f64,
    pub points_against: f64,
    pub final_rank: Option<u32>,
    pub playoff_seed: Option<u32>,
}

impl Team {
    pub fn games(&self) -> u32 {
        self.wins + self.losses + self.ties
    }

    /// Win percentage in [0, 100]; ties count as half a win.
    pub fn win_pct(&self) -> f64 {
        let games = self.games();
        if games == 0 {
            return 0.0;
        }
        (self.wins as f64 + 0.5 * self.ties as f64) / games as f64 * 100.0
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Matchup {
    pub year: i32,
    pub week: u32,
    pub playoff: bool,
    pub home_id: TeamId,
    pub away_id: TeamId,
    pub home_score: f64,
    pub away_score: f64,
}

impl Matchup {
    pub fn margin(&self) -> f64 {
        (self.home_score - self.away_score).abs()
    }

    /// `None` on a tie; ties are a distinct third outcome everywhere
    /// downstream (streaks, clutch buckets, H2H win columns).
    pub fn winner(&self) -> Option<TeamId> {
        if self.home_score > self.away_score {
            Some(self.home_id)
        } else if self.away_score > self.home_score {
            Some(self.away_id)
        } else {
            None
        }
    }

    pub fn loser(&self) -> Option<TeamId> {
        self.winner().map(|w| {
            if w == self.home_id {
                self.away_id
            } else {
                self.home_id
            }
        })
    }

    pub fn involves(&self, id: TeamId) -> bool {
        self.home_id == id || self.away_id == id
    }

    pub fn opponent_of(&self, id: TeamId) -> Option<TeamId> {
        if self.home_id == id {
            Some(self.away_id)
        } else if self.away_id == id {
            Some(self.home_id)
        } else {
            None
        }
    }

    pub fn score_of(&self, id: TeamId) -> Option<f64> {
        if self.home_id == id {
            Some(self.home_score)
        } else if self.away_id == id {
            Some(self.away_score)
        } else {
            None
        }
    }

    pub fn score_against(&self, id: TeamId) -> Option<f64> {
        self.opponent_of(id).and_then(|opp| self.score_of(opp))
    }
}

/// One normalized league-year. Immutable once built; everything downstream
/// only reads it.
#[derive(Debug, Clone, Serialize)]
pub struct Season {
    pub year: i32,
    pub teams: Vec<Team>,
    pub matchups: Vec<Matchup>,
    pub members: Vec<Member>,
    pub settings: SeasonSettings,
    pub champion_id: Option<TeamId>,
    /// Teams that played in (or were credited with) the title game, 0–2 ids.
    pub championship_participants: Vec<TeamId>,
}

impl Season {
    pub fn team(&self, id: TeamId) -> Option<&Team> {
        self.teams.iter().find(|t| t.id == id)
    }
}

/// Aggregation granularity for career folding: per franchise slot (team id)
/// or per canonical owner identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum AggregationKey {
    Team(TeamId),
    Owner(OwnerId),
}

#[derive(Debug, Clone, Serialize)]
pub struct CareerRecord {
    pub key: AggregationKey,
    pub display_name: String,
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
    pub points_for: f64,
    pub points_against: f64,
    pub championships: u32,
    pub championship_appearances: u32,
    pub playoff_appearances: u32,
    pub seasons_played: u32,
    pub first_year: i32,
    pub last_year: i32,
}

impl CareerRecord {
    pub fn games(&self) -> u32 {
        self.wins + self.losses + self.ties
    }

    pub fn win_pct(&self) -> f64 {
        let games = self.games();
        if games == 0 {
            return 0.0;
        }
        (self.wins as f64 + 0.5 * self.ties as f64) / games as f64 * 100.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StreakKind {
    Win,
    Loss,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct GameRef {
    pub year: i32,
    pub week: u32,
}

/// The single longest run of one kind for one team, from a chronological scan
/// of every game it played.
#[derive(Debug, Clone, Serialize)]
pub struct Streak {
    pub team_id: TeamId,
    pub kind: StreakKind,
    pub length: u32,
    pub start: GameRef,
    pub end: GameRef,
}
