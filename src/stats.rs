// Per-player match statistics derived from the match history: win/draw/loss
// record, current streak, and head-to-head numbers against or alongside every
// other player.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::match_result::{chronological, Match, PlayerResult};
use crate::player::Player;

/// Players need at least this many shared matches to get pair statistics
pub const MIN_SHARED_MATCHES: usize = 4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResultEntry {
    pub result: PlayerResult,
    pub match_id: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerMatchStats {
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub total_matches: u32,
    /// Percentage of wins, 0-100
    pub win_rate: f64,
    /// Chronological, oldest first
    pub results: Vec<MatchResultEntry>,
    /// e.g. "3W", or "0" without matches
    pub current_streak: String,
}

/// Record of one pairing, from the target player's point of view.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
}

impl Record {
    fn add(&mut self, result: PlayerResult) {
        match result {
            PlayerResult::Win => self.wins += 1,
            PlayerResult::Draw => self.draws += 1,
            PlayerResult::Loss => self.losses += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.wins + self.draws + self.losses
    }

    fn rate(&self, count: u32) -> f64 {
        if self.total() == 0 {
            0.0
        } else {
            count as f64 / self.total() as f64 * 100.0
        }
    }

    pub fn win_rate(&self) -> f64 {
        self.rate(self.wins)
    }

    pub fn draw_rate(&self) -> f64 {
        self.rate(self.draws)
    }

    pub fn loss_rate(&self) -> f64 {
        self.rate(self.losses)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairStats {
    pub player_id: String,
    pub player_name: String,
    pub together: Record,
    pub against: Record,
}

impl PairStats {
    pub fn total(&self) -> u32 {
        self.together.total() + self.against.total()
    }
}

pub fn player_match_stats(player_id: &str, matches: &[Match]) -> Result<PlayerMatchStats> {
    let mut stats = PlayerMatchStats::default();
    let mut record = Record::default();

    for game in chronological(matches) {
        if let Some(result) = game.result_for(player_id)? {
            record.add(result);
            stats.results.push(MatchResultEntry {
                result,
                match_id: game.id.clone(),
            });
        }
    }

    stats.wins = record.wins;
    stats.draws = record.draws;
    stats.losses = record.losses;
    stats.total_matches = record.total();
    stats.win_rate = record.win_rate();
    stats.current_streak = match stats.results.last() {
        Some(last) => {
            let streak = stats
                .results
                .iter()
                .rev()
                .take_while(|r| r.result == last.result)
                .count();
            format!("{}{}", streak, last.result.letter())
        }
        None => "0".to_string(),
    };
    Ok(stats)
}

/// Share of all matches in which the player took part, 0-1.
pub fn participation_rate(player_id: &str, matches: &[Match]) -> f64 {
    if matches.is_empty() {
        return 0.0;
    }
    let played = matches.iter().filter(|m| m.involves(player_id)).count();
    played as f64 / matches.len() as f64
}

/// Records of `target_id` with and against every other player they shared at
/// least `min_shared` matches with, most shared matches first.
pub fn pair_stats(target_id: &str, players: &[Player], matches: &[Match], min_shared: usize) -> Result<Vec<PairStats>> {
    let mut pairs = Vec::new();

    for other in players.iter().filter(|p| p.id != target_id) {
        let shared: Vec<&Match> = matches
            .iter()
            .filter(|m| m.involves(target_id) && m.involves(&other.id))
            .collect();
        if shared.len() < min_shared {
            continue;
        }

        let mut pair = PairStats {
            player_id: other.id.clone(),
            player_name: other.name.clone(),
            together: Record::default(),
            against: Record::default(),
        };
        for game in shared {
            let (Some(target_side), Some(other_side)) = (game.side_of(target_id), game.side_of(&other.id)) else {
                continue;
            };
            let Some(result) = game.result_for(target_id)? else {
                continue;
            };
            if target_side == other_side {
                pair.together.add(result);
            } else {
                pair.against.add(result);
            }
        }
        pairs.push(pair);
    }

    pairs.sort_by(|a, b| b.total().cmp(&a.total()));
    Ok(pairs)
}
