// This module replays a match history through the skill model.
// The ledger owns the current rating of every player seen so far and records an
// immutable snapshot of all ratings after each match, so any player's rating can
// be recovered as of any point in the history.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use fnv::FnvHashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{BalancerError, Result};
use crate::match_result::{chronological, Match};
use crate::player::PlayerRef;
use crate::skill::{Rating, SkillModel};

/// A player's rating state and display metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRating {
    pub player_id: String,
    pub player_name: String,
    pub mu: f64,
    pub sigma: f64,
    /// mu - 3 sigma
    pub conservative_rating: f64,
}

impl PlayerRating {
    pub fn new(player_id: impl Into<String>, player_name: impl Into<String>, mu: f64, sigma: f64) -> Self {
        PlayerRating {
            player_id: player_id.into(),
            player_name: player_name.into(),
            mu,
            sigma,
            conservative_rating: mu - 3.0 * sigma,
        }
    }

    pub fn rating(&self) -> Rating {
        Rating::new(self.mu, self.sigma)
    }

    fn set(&mut self, rating: Rating) {
        self.mu = rating.mu;
        self.sigma = rating.sigma;
        self.conservative_rating = rating.conservative();
    }
}

pub type RatingsByPlayerId = FnvHashMap<String, PlayerRating>;

/// All players' ratings immediately after one match was applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingSnapshot {
    pub match_id: String,
    pub date: NaiveDate,
    pub ratings: BTreeMap<String, PlayerRating>,
}

impl RatingSnapshot {
    pub fn get(&self, player_id: &str) -> Option<&PlayerRating> {
        self.ratings.get(player_id)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// One point of a player's rating progression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingPoint {
    pub match_id: String,
    pub date: NaiveDate,
    pub mu: f64,
    pub sigma: f64,
}

/// Manages ratings for every player across a replayed history.
///
/// A ledger is owned by its caller; nothing is shared between ledgers. `replay`
/// resets before processing, so replaying the same history twice gives the same
/// ratings.
#[derive(Debug, Clone, Default)]
pub struct RatingLedger {
    model: SkillModel,
    ratings: RatingsByPlayerId,
    snapshots: Vec<RatingSnapshot>,
    pub matches_processed: u32,
}

impl RatingLedger {
    pub fn new(model: SkillModel) -> Self {
        RatingLedger {
            model,
            ratings: RatingsByPlayerId::default(),
            snapshots: Vec::new(),
            matches_processed: 0,
        }
    }

    pub fn model(&self) -> &SkillModel {
        &self.model
    }

    /// Forget every rating and snapshot.
    pub fn reset(&mut self) {
        self.ratings.clear();
        self.snapshots.clear();
        self.matches_processed = 0;
    }

    /// Current rating for a participant, seeding it on first appearance.
    fn ensure_player(&mut self, player: &PlayerRef) -> Rating {
        let model = &self.model;
        self.ratings
            .entry(player.id.clone())
            .or_insert_with(|| {
                let seed = model.seed(player.average, player.is_guest);
                PlayerRating::new(player.id.clone(), player.name.clone(), seed.mu, seed.sigma)
            })
            .rating()
    }

    /// Apply one match on top of the current state and record its snapshot.
    /// Guests are rated as inputs but their own ratings are left untouched.
    pub fn process_match(&mut self, game: &Match) -> Result<()> {
        let outcome = game.team_outcome()?;

        let local: Vec<Rating> = game.local_team.iter().map(|p| self.ensure_player(p)).collect();
        let away: Vec<Rating> = game.away_team.iter().map(|p| self.ensure_player(p)).collect();

        let (new_local, new_away) = self.model.rate(&local, &away, outcome);

        let updates = game
            .local_team
            .iter()
            .zip(new_local)
            .chain(game.away_team.iter().zip(new_away));
        for (player, rating) in updates {
            if player.is_guest {
                continue;
            }
            if let Some(entry) = self.ratings.get_mut(&player.id) {
                entry.set(rating);
            }
        }

        self.snapshots.push(RatingSnapshot {
            match_id: game.id.clone(),
            date: game.date,
            ratings: self.ratings.iter().map(|(id, r)| (id.clone(), r.clone())).collect(),
        });
        self.matches_processed += 1;

        debug!(
            match_id = %game.id,
            outcome = ?outcome,
            participants = game.local_team.len() + game.away_team.len(),
            "applied match"
        );
        Ok(())
    }

    /// Rebuild all ratings from scratch. Matches are processed by date, never by
    /// input position. An invalid outcome anywhere fails the whole replay and
    /// leaves the ledger empty.
    pub fn replay(&mut self, matches: &[Match]) -> Result<&RatingsByPlayerId> {
        self.reset();
        for game in chronological(matches) {
            if let Err(e) = self.process_match(game) {
                self.reset();
                return Err(e);
            }
        }
        info!(
            matches = self.matches_processed,
            players = self.ratings.len(),
            "rating replay complete"
        );
        Ok(&self.ratings)
    }

    /// Ratings as they stood immediately before `match_id`. Runs on a private
    /// ledger; this ledger is not touched.
    pub fn ratings_before_match(&self, matches: &[Match], match_id: &str) -> Result<RatingsByPlayerId> {
        let (scratch, _) = self.replay_prefix(matches, match_id)?;
        Ok(scratch.ratings)
    }

    /// Ratings immediately after `match_id`: the strict prefix plus the match itself.
    pub fn ratings_including_match(&self, matches: &[Match], match_id: &str) -> Result<RatingsByPlayerId> {
        let (mut scratch, target) = self.replay_prefix(matches, match_id)?;
        scratch.process_match(target)?;
        Ok(scratch.ratings)
    }

    fn replay_prefix<'m>(&self, matches: &'m [Match], match_id: &str) -> Result<(RatingLedger, &'m Match)> {
        let sorted = chronological(matches);
        let position = sorted
            .iter()
            .position(|m| m.id == match_id)
            .ok_or_else(|| BalancerError::MatchNotFound(match_id.to_string()))?;

        let mut scratch = RatingLedger::new(self.model.clone());
        for game in &sorted[..position] {
            scratch.process_match(game)?;
        }
        Ok((scratch, sorted[position]))
    }

    pub fn ratings(&self) -> &RatingsByPlayerId {
        &self.ratings
    }

    pub fn get(&self, player_id: &str) -> Option<&PlayerRating> {
        self.ratings.get(player_id)
    }

    /// Current mu, or the model default for a player never seen.
    pub fn mu_or_default(&self, player_id: &str) -> f64 {
        self.ratings
            .get(player_id)
            .map(|r| r.mu)
            .unwrap_or(self.model.mu)
    }

    /// All ratings, highest mu first.
    pub fn ranked(&self) -> Vec<&PlayerRating> {
        let mut players: Vec<&PlayerRating> = self.ratings.values().collect();
        players.sort_by(|a, b| b.mu.total_cmp(&a.mu).then_with(|| a.player_name.cmp(&b.player_name)));
        players
    }

    /// Snapshots in chronological order.
    pub fn snapshots(&self) -> &[RatingSnapshot] {
        &self.snapshots
    }

    pub fn snapshot(&self, match_id: &str) -> Option<&RatingSnapshot> {
        self.snapshots.iter().find(|s| s.match_id == match_id)
    }

    /// Rating progression for one player across every recorded snapshot in
    /// which they already had a rating.
    pub fn player_history(&self, player_id: &str) -> Vec<RatingPoint> {
        self.snapshots
            .iter()
            .filter_map(|snapshot| {
                snapshot.get(player_id).map(|r| RatingPoint {
                    match_id: snapshot.match_id.clone(),
                    date: snapshot.date,
                    mu: r.mu,
                    sigma: r.sigma,
                })
            })
            .collect()
    }
}

/// Replays `matches` with the default model and returns the final ratings.
pub fn replay(matches: &[Match]) -> Result<RatingsByPlayerId> {
    let mut ledger = RatingLedger::default();
    ledger.replay(matches)?;
    Ok(ledger.ratings)
}
