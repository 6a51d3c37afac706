// This module defines the match records supplied by the match store.
// Matches are plain data: the rating ledger reads them but never writes back;
// per-match rating snapshots live in the ledger keyed by match id.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{BalancerError, Result};
use crate::player::PlayerRef;
use crate::skill::TeamOutcome;

/// Outcome discriminator stored on a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Outcome {
    LocalWin,
    AwayWin,
    Draw,
}

impl Outcome {
    /// Parses the discriminator. The store's legacy colour names are accepted too.
    pub fn parse(raw: &str) -> Result<Self> {
        match raw {
            "localWin" | "white" => Ok(Outcome::LocalWin),
            "awayWin" | "dark" => Ok(Outcome::AwayWin),
            "draw" => Ok(Outcome::Draw),
            other => Err(BalancerError::UnknownOutcome(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::LocalWin => "localWin",
            Outcome::AwayWin => "awayWin",
            Outcome::Draw => "draw",
        }
    }
}

/// Result of a match for one participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerResult {
    #[serde(rename = "W")]
    Win,
    #[serde(rename = "D")]
    Draw,
    #[serde(rename = "L")]
    Loss,
}

impl PlayerResult {
    pub fn letter(&self) -> char {
        match self {
            PlayerResult::Win => 'W',
            PlayerResult::Draw => 'D',
            PlayerResult::Loss => 'L',
        }
    }
}

/// Which roster a player appeared on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Local,
    Away,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    #[serde(alias = "_id")]
    pub id: String,
    pub date: NaiveDate,
    /// Raw discriminator as stored; validated when the match is rated.
    #[serde(alias = "result")]
    pub outcome: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_score: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub away_score: Option<u32>,
    pub local_team: Vec<PlayerRef>,
    pub away_team: Vec<PlayerRef>,
}

impl Match {
    pub fn new(
        id: impl Into<String>,
        date: NaiveDate,
        outcome: Outcome,
        local_team: Vec<PlayerRef>,
        away_team: Vec<PlayerRef>,
    ) -> Self {
        Match {
            id: id.into(),
            date,
            outcome: outcome.as_str().to_string(),
            local_score: None,
            away_score: None,
            local_team,
            away_team,
        }
    }

    pub fn with_score(mut self, local_score: u32, away_score: u32) -> Self {
        self.local_score = Some(local_score);
        self.away_score = Some(away_score);
        self
    }

    /// Validated discriminator.
    pub fn outcome(&self) -> Result<Outcome> {
        Outcome::parse(&self.outcome)
    }

    /// Outcome used for rating, local team as team A. The score decides when
    /// both sides have one; otherwise the discriminator does. The discriminator
    /// is validated either way.
    pub fn team_outcome(&self) -> Result<TeamOutcome> {
        let outcome = self.outcome()?;
        let team_outcome = match (self.local_score, self.away_score) {
            (Some(local), Some(away)) if local > away => TeamOutcome::AWins,
            (Some(local), Some(away)) if local < away => TeamOutcome::BWins,
            (Some(_), Some(_)) => TeamOutcome::Draw,
            _ => match outcome {
                Outcome::LocalWin => TeamOutcome::AWins,
                Outcome::AwayWin => TeamOutcome::BWins,
                Outcome::Draw => TeamOutcome::Draw,
            },
        };
        Ok(team_outcome)
    }

    pub fn side_of(&self, player_id: &str) -> Option<Side> {
        if self.local_team.iter().any(|p| p.id == player_id) {
            Some(Side::Local)
        } else if self.away_team.iter().any(|p| p.id == player_id) {
            Some(Side::Away)
        } else {
            None
        }
    }

    pub fn involves(&self, player_id: &str) -> bool {
        self.side_of(player_id).is_some()
    }

    /// Result from one participant's perspective, `None` if they did not play.
    pub fn result_for(&self, player_id: &str) -> Result<Option<PlayerResult>> {
        let side = match self.side_of(player_id) {
            Some(side) => side,
            None => return Ok(None),
        };
        let result = match (self.team_outcome()?, side) {
            (TeamOutcome::Draw, _) => PlayerResult::Draw,
            (TeamOutcome::AWins, Side::Local) | (TeamOutcome::BWins, Side::Away) => PlayerResult::Win,
            _ => PlayerResult::Loss,
        };
        Ok(Some(result))
    }

    pub fn participants(&self) -> impl Iterator<Item = &PlayerRef> {
        self.local_team.iter().chain(self.away_team.iter())
    }
}

/// Matches in chronological order; equal dates keep their input order.
pub fn chronological(matches: &[Match]) -> Vec<&Match> {
    let mut sorted: Vec<&Match> = matches.iter().collect();
    sorted.sort_by(|a, b| a.date.cmp(&b.date));
    sorted
}

/// Parses a match history as supplied by the store (JSON array).
pub fn load_matches(json: &str) -> Result<Vec<Match>> {
    Ok(serde_json::from_str(json)?)
}
