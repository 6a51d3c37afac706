// Roster data: players, their raw attributes and the scoring strategies used to
// compare them. Players arrive from the roster store without `average` or
// ratings; the average is computed on load and ratings are attached later by
// `apply_ratings` once the ledger has replayed the match history.

use serde::{Deserialize, Serialize};

use crate::ledger::RatingsByPlayerId;
use crate::skill::DEFAULT_MU;

/// Baseline mu for the enhanced-average bonus. A player at this mu gets no bonus.
pub const MU_BASELINE: f64 = 20.0;

/// Divisor applied to the mu bonus in the enhanced average.
pub const MU_BONUS_DIVISOR: f64 = 10.0;

/// The five raw skill attributes, each typically 0-5.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Attributes {
    pub attack: f64,
    pub defense: f64,
    pub physical: f64,
    pub vision: f64,
    pub technique: f64,
}

impl Attributes {
    pub fn new(attack: f64, defense: f64, physical: f64, vision: f64, technique: f64) -> Self {
        Attributes {
            attack,
            defense,
            physical,
            vision,
            technique,
        }
    }

    /// Same value for all five attributes, handy when only the average matters.
    pub fn uniform(value: f64) -> Self {
        Attributes::new(value, value, value, value, value)
    }

    pub fn average(&self) -> f64 {
        (self.attack + self.defense + self.physical + self.vision + self.technique) / 5.0
    }
}

/// Shape of a player as the roster store supplies it. Ratings are only
/// present when reading back a player this crate serialized.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RosterEntry {
    #[serde(alias = "_id")]
    id: String,
    name: String,
    #[serde(flatten)]
    attributes: Attributes,
    #[serde(default)]
    is_guest: bool,
    #[serde(default)]
    mu: Option<f64>,
    #[serde(default)]
    sigma: Option<f64>,
}

impl From<RosterEntry> for Player {
    fn from(entry: RosterEntry) -> Self {
        let mut player = Player::new(entry.id, entry.name, entry.attributes, entry.is_guest);
        player.mu = entry.mu;
        player.sigma = entry.sigma;
        player
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RosterEntry")]
pub struct Player {
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub attributes: Attributes,
    /// Mean of the five attributes, fixed when the player is loaded.
    pub average: f64,
    pub is_guest: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mu: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sigma: Option<f64>,
}

impl Player {
    pub fn new(id: impl Into<String>, name: impl Into<String>, attributes: Attributes, is_guest: bool) -> Self {
        Player {
            id: id.into(),
            name: name.into(),
            average: attributes.average(),
            attributes,
            is_guest,
            mu: None,
            sigma: None,
        }
    }

    pub fn with_rating(mut self, mu: f64, sigma: f64) -> Self {
        self.mu = Some(mu);
        self.sigma = Some(sigma);
        self
    }

    /// Rated mu, or the model default for players without history
    pub fn mu_or_default(&self) -> f64 {
        self.mu.unwrap_or(DEFAULT_MU)
    }

    /// Attribute average adjusted by how far the player's mu sits from the baseline.
    pub fn enhanced_average(&self) -> f64 {
        self.average + (self.mu_or_default() - MU_BASELINE) / MU_BONUS_DIVISOR
    }

    /// Reference used inside match rosters.
    pub fn to_ref(&self) -> PlayerRef {
        PlayerRef {
            id: self.id.clone(),
            name: self.name.clone(),
            average: Some(self.average),
            is_guest: self.is_guest,
        }
    }
}

/// A player as recorded on a match roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRef {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    /// Attribute average used to seed a first rating.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average: Option<f64>,
    #[serde(default)]
    pub is_guest: bool,
}

impl PlayerRef {
    pub fn new(id: impl Into<String>, name: impl Into<String>, average: Option<f64>) -> Self {
        PlayerRef {
            id: id.into(),
            name: name.into(),
            average,
            is_guest: false,
        }
    }

    pub fn guest(id: impl Into<String>, name: impl Into<String>, average: Option<f64>) -> Self {
        PlayerRef {
            is_guest: true,
            ..PlayerRef::new(id, name, average)
        }
    }
}

/// Strategy mapping a player to the scalar the balancer compares.
pub trait ScoreFn {
    fn score(&self, player: &Player) -> f64;
}

impl<F> ScoreFn for F
where
    F: Fn(&Player) -> f64,
{
    fn score(&self, player: &Player) -> f64 {
        self(player)
    }
}

/// The scoring functions the product ships with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scoring {
    /// Raw attribute average.
    Average,
    /// Attribute average plus the rating bonus.
    #[default]
    Enhanced,
    /// Raw mu, default when unrated.
    Mu,
}

impl ScoreFn for Scoring {
    fn score(&self, player: &Player) -> f64 {
        match self {
            Scoring::Average => player.average,
            Scoring::Enhanced => player.enhanced_average(),
            Scoring::Mu => player.mu_or_default(),
        }
    }
}

/// Roster without guests, as shown in official listings.
pub fn official_players(players: &[Player]) -> Vec<Player> {
    players.iter().filter(|p| !p.is_guest).cloned().collect()
}

/// Copies ledger ratings onto the roster. Players the ledger never saw keep no rating.
pub fn apply_ratings(players: &[Player], ratings: &RatingsByPlayerId) -> Vec<Player> {
    players
        .iter()
        .map(|player| match ratings.get(&player.id) {
            Some(rating) => player.clone().with_rating(rating.mu, rating.sigma),
            None => player.clone(),
        })
        .collect()
}

/// Parses a roster as supplied by the store (JSON array of players).
pub fn load_roster(json: &str) -> crate::Result<Vec<Player>> {
    Ok(serde_json::from_str(json)?)
}
