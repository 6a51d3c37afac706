//! Team balancing and skill rating for casual football matches.
//!
//! Ratings come from replaying the match history through a two-team TrueSkill
//! model ([`ledger::RatingLedger`]). Teams are built from a pool of players by a
//! snake draft plus a randomized swap search ([`optimizer::TeamOptimizer`]), or
//! by exhaustively enumerating every split ([`combinations::enumerate`]). Both
//! take a pluggable [`player::ScoreFn`].

pub mod balance;
pub mod combinations;
pub mod config;
pub mod error;
pub mod ledger;
pub mod match_result;
pub mod optimizer;
pub mod player;
pub mod skill;
pub mod stats;
pub mod team;

pub use combinations::{enumerate, TeamCombination};
pub use config::Config;
pub use error::{BalancerError, Result};
pub use ledger::{RatingLedger, RatingsByPlayerId};
pub use match_result::{Match, Outcome};
pub use optimizer::{optimize, optimize_with_seed, TeamOptimizer};
pub use player::{Attributes, Player, PlayerRef, ScoreFn, Scoring};
pub use skill::{Rating, SkillModel};
pub use team::TeamSplit;
