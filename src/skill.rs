// This module implements the two-team TrueSkill update used to rate players.
// A match is reduced to team A vs team B and one of three outcomes; the update
// is the closed-form truncated-Gaussian approximation for two teams.

use serde::{Deserialize, Serialize};
use statrs::distribution::{Continuous, ContinuousCDF, Normal};

/// Default mean skill for an unrated player
pub const DEFAULT_MU: f64 = 25.0;

/// Default uncertainty for an unrated player
pub const DEFAULT_SIGMA: f64 = 8.3;

/// Skill distance that gives the stronger side roughly a 76% win chance
pub const BETA: f64 = 4.166;

/// Dynamics factor added to every sigma before an update
pub const TAU: f64 = 0.12;

/// Prior probability of a draw
pub const DRAW_PROBABILITY: f64 = 0.05;

/// Guests start with this multiple of the default sigma
pub const GUEST_SIGMA_MULTIPLIER: f64 = 2.0;

/// Sigma never drops below this after an update
pub const MIN_SIGMA: f64 = 0.0001;

/// Seeding scale: attribute rating `MIN_RATING` maps to `MIN_MU`, each point above adds `MU_PER_RATING_POINT`
pub const MIN_RATING: f64 = 1.0;
pub const MIN_MU: f64 = 15.0;
pub const MU_PER_RATING_POINT: f64 = 5.0;

/// A single (mu, sigma) skill estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    pub mu: f64,
    pub sigma: f64,
}

impl Rating {
    pub fn new(mu: f64, sigma: f64) -> Self {
        Rating { mu, sigma }
    }

    /// Lower confidence bound, mu - 3 sigma
    pub fn conservative(&self) -> f64 {
        self.mu - 3.0 * self.sigma
    }
}

impl Default for Rating {
    fn default() -> Self {
        Rating::new(DEFAULT_MU, DEFAULT_SIGMA)
    }
}

/// Result of a match from team A's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TeamOutcome {
    AWins,
    BWins,
    Draw,
}

/// Maps a 1-5 attribute rating onto the mu scale (1 -> 15, 3 -> 25, 5 -> 35).
pub fn rating_to_mu(rating: f64) -> f64 {
    Seeding::default().mu_for(rating)
}

/// Linear map from attribute average to a starting mu.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Seeding {
    pub min_rating: f64,
    pub min_mu: f64,
    pub mu_per_rating_point: f64,
}

impl Default for Seeding {
    fn default() -> Self {
        Seeding {
            min_rating: MIN_RATING,
            min_mu: MIN_MU,
            mu_per_rating_point: MU_PER_RATING_POINT,
        }
    }
}

impl Seeding {
    pub fn mu_for(&self, rating: f64) -> f64 {
        self.min_mu + (rating - self.min_rating) * self.mu_per_rating_point
    }
}

/// TrueSkill parameters plus the seeding rule for players seen for the first time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillModel {
    pub mu: f64,
    pub sigma: f64,
    pub beta: f64,
    pub tau: f64,
    pub draw_probability: f64,
    pub guest_sigma_multiplier: f64,
    pub min_sigma: f64,
    pub seeding: Seeding,
}

impl Default for SkillModel {
    fn default() -> Self {
        SkillModel {
            mu: DEFAULT_MU,
            sigma: DEFAULT_SIGMA,
            beta: BETA,
            tau: TAU,
            draw_probability: DRAW_PROBABILITY,
            guest_sigma_multiplier: GUEST_SIGMA_MULTIPLIER,
            min_sigma: MIN_SIGMA,
            seeding: Seeding::default(),
        }
    }
}

impl SkillModel {
    /// First rating for a player: seeded from the attribute average when known,
    /// otherwise the model defaults. Guests get a wider sigma.
    pub fn seed(&self, average: Option<f64>, is_guest: bool) -> Rating {
        let mu = average.map(|avg| self.seeding.mu_for(avg)).unwrap_or(self.mu);
        let sigma = if is_guest {
            self.sigma * self.guest_sigma_multiplier
        } else {
            self.sigma
        };
        Rating::new(mu, sigma)
    }

    /// Half-width of the draw band in performance space for `total_players` participants.
    fn draw_margin(&self, n: &Normal, total_players: usize) -> f64 {
        n.inverse_cdf((self.draw_probability + 1.0) / 2.0)
            * (total_players as f64).sqrt()
            * self.beta
    }

    /// Updates both teams for one outcome. Returns new ratings in input order.
    pub fn rate(
        &self,
        team_a: &[Rating],
        team_b: &[Rating],
        outcome: TeamOutcome,
    ) -> (Vec<Rating>, Vec<Rating>) {
        if team_a.is_empty() || team_b.is_empty() {
            return (team_a.to_vec(), team_b.to_vec());
        }

        let tau_sq = self.tau * self.tau;
        let total_players = team_a.len() + team_b.len();

        let mu_a: f64 = team_a.iter().map(|r| r.mu).sum();
        let mu_b: f64 = team_b.iter().map(|r| r.mu).sum();
        let variance: f64 = team_a
            .iter()
            .chain(team_b.iter())
            .map(|r| r.sigma * r.sigma + tau_sq)
            .sum();
        let c_sq = variance + total_players as f64 * self.beta * self.beta;
        let c = c_sq.sqrt();
        let n = standard_normal();
        let margin = self.draw_margin(&n, total_players) / c;

        // v and w from team A's perspective: positive v moves A up
        let (v, w) = match outcome {
            TeamOutcome::AWins => {
                let t = (mu_a - mu_b) / c;
                (v_win(&n, t, margin), w_win(&n, t, margin))
            }
            TeamOutcome::BWins => {
                let t = (mu_b - mu_a) / c;
                (-v_win(&n, t, margin), w_win(&n, t, margin))
            }
            TeamOutcome::Draw => {
                let t = (mu_a - mu_b) / c;
                (v_draw(&n, t, margin), w_draw(&n, t, margin))
            }
        };

        let update = |rating: &Rating, sign: f64| -> Rating {
            let prior_var = rating.sigma * rating.sigma + tau_sq;
            let mu = rating.mu + sign * (prior_var / c) * v;
            let var = prior_var * (1.0 - (prior_var / c_sq) * w);
            Rating::new(mu, var.max(0.0).sqrt().max(self.min_sigma))
        };

        let new_a = team_a.iter().map(|r| update(r, 1.0)).collect();
        let new_b = team_b.iter().map(|r| update(r, -1.0)).collect();
        (new_a, new_b)
    }

    /// Probability that team A beats team B under the model.
    pub fn win_probability(&self, team_a: &[Rating], team_b: &[Rating]) -> f64 {
        let delta: f64 =
            team_a.iter().map(|r| r.mu).sum::<f64>() - team_b.iter().map(|r| r.mu).sum::<f64>();
        let n = (team_a.len() + team_b.len()) as f64;
        let variance: f64 = team_a
            .iter()
            .chain(team_b.iter())
            .map(|r| r.sigma * r.sigma)
            .sum();
        let denom = (n * self.beta * self.beta + variance).sqrt();
        if denom == 0.0 {
            return 0.5;
        }
        standard_normal().cdf(delta / denom)
    }

    /// TrueSkill match quality: close to 1 for evenly matched, well-known teams.
    pub fn match_quality(&self, team_a: &[Rating], team_b: &[Rating]) -> f64 {
        let n = (team_a.len() + team_b.len()) as f64;
        if n == 0.0 {
            return 0.0;
        }
        let delta: f64 =
            team_a.iter().map(|r| r.mu).sum::<f64>() - team_b.iter().map(|r| r.mu).sum::<f64>();
        let beta_sq = n * self.beta * self.beta;
        let c_sq = beta_sq
            + team_a
                .iter()
                .chain(team_b.iter())
                .map(|r| r.sigma * r.sigma)
                .sum::<f64>();
        (beta_sq / c_sq).sqrt() * (-(delta * delta) / (2.0 * c_sq)).exp()
    }
}

/// Built once per public call and handed to the v/w helpers.
fn standard_normal() -> Normal {
    Normal::new(0.0, 1.0).expect("unit normal parameters are valid")
}

/// Mean correction for a win with normalized performance difference `t`.
fn v_win(n: &Normal, t: f64, margin: f64) -> f64 {
    let x = t - margin;
    let denom = n.cdf(x);
    if denom > f64::MIN_POSITIVE {
        n.pdf(x) / denom
    } else {
        -x
    }
}

/// Variance correction for a win.
fn w_win(n: &Normal, t: f64, margin: f64) -> f64 {
    let x = t - margin;
    let v = v_win(n, t, margin);
    let w = v * (v + x);
    if w > 0.0 && w < 1.0 {
        w
    } else if x < 0.0 {
        1.0
    } else {
        0.0
    }
}

/// Mean correction for a draw; signed so a favorite that only draws loses ground.
fn v_draw(n: &Normal, t: f64, margin: f64) -> f64 {
    let abs_t = t.abs();
    let a = margin - abs_t;
    let b = -margin - abs_t;
    let denom = n.cdf(a) - n.cdf(b);
    let v = if denom > f64::MIN_POSITIVE {
        (n.pdf(b) - n.pdf(a)) / denom
    } else {
        a
    };
    if t < 0.0 {
        -v
    } else {
        v
    }
}

/// Variance correction for a draw.
fn w_draw(n: &Normal, t: f64, margin: f64) -> f64 {
    let abs_t = t.abs();
    let a = margin - abs_t;
    let b = -margin - abs_t;
    let denom = n.cdf(a) - n.cdf(b);
    if denom <= f64::MIN_POSITIVE {
        return 1.0;
    }
    let v = v_draw(n, abs_t, margin);
    (v * v + (a * n.pdf(a) - b * n.pdf(b)) / denom).clamp(0.0, 1.0)
}
