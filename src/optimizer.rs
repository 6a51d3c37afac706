// Two-team optimizer: snake draft seeding followed by a randomized swap search.
// Output is always a canonical TeamSplit.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::debug;

use crate::balance::difference;
use crate::player::{Player, ScoreFn};
use crate::team::{sort_team, TeamSplit};

/// Number of swap attempts in the local search
pub const DEFAULT_ITERATIONS: usize = 50;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizerConfig {
    pub iterations: usize,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
        }
    }
}

/// Splits a pool into two balanced teams.
///
/// The pool is sorted best-first and dealt out in a snake draft (front to team 1,
/// front to team 2, back to team 1, back to team 2, repeat), then a randomized
/// swap search trims the remaining imbalance. A swap is kept unless it makes the
/// absolute difference strictly worse, so equal-difference swaps also stick and
/// repeated runs can offer different but equally balanced splits. Pass a seeded
/// RNG for reproducible output.
#[derive(Debug, Clone, Default)]
pub struct TeamOptimizer {
    pub config: OptimizerConfig,
}

impl TeamOptimizer {
    pub fn new(config: OptimizerConfig) -> Self {
        Self { config }
    }

    pub fn optimize<S, R>(&self, pool: &[Player], score: &S, rng: &mut R) -> TeamSplit
    where
        S: ScoreFn + ?Sized,
        R: Rng,
    {
        if pool.len() < 2 {
            return TeamSplit::empty();
        }

        let mut sorted = pool.to_vec();
        sort_team(&mut sorted, score);
        let (mut team1, mut team2) = snake_draft(sorted);

        let initial = difference(&team1, &team2, score);
        let mut kept = 0;
        for _ in 0..self.config.iterations {
            let i = rng.gen_range(0..team1.len());
            let j = rng.gen_range(0..team2.len());
            let before = difference(&team1, &team2, score);

            std::mem::swap(&mut team1[i], &mut team2[j]);
            let after = difference(&team1, &team2, score);

            if after.abs() > before.abs() {
                // Revert the swap
                std::mem::swap(&mut team1[i], &mut team2[j]);
            } else {
                kept += 1;
            }
        }

        let split = TeamSplit::from_teams(team1, team2, score);
        debug!(
            players = pool.len(),
            initial_difference = initial,
            final_difference = split.difference,
            swaps_kept = kept,
            "team optimization complete"
        );
        split
    }
}

/// Deal a best-first list out to two teams, four picks per round.
fn snake_draft(sorted: Vec<Player>) -> (Vec<Player>, Vec<Player>) {
    let mut queue: VecDeque<Player> = sorted.into();
    let mut team1 = Vec::with_capacity(queue.len() / 2 + 1);
    let mut team2 = Vec::with_capacity(queue.len() / 2 + 1);

    loop {
        match queue.pop_front() {
            Some(p) => team1.push(p),
            None => break,
        }
        match queue.pop_front() {
            Some(p) => team2.push(p),
            None => break,
        }
        match queue.pop_back() {
            Some(p) => team1.push(p),
            None => break,
        }
        match queue.pop_back() {
            Some(p) => team2.push(p),
            None => break,
        }
    }
    (team1, team2)
}

/// Balanced split with the default settings and a thread-local RNG.
pub fn optimize<S: ScoreFn + ?Sized>(pool: &[Player], score: &S) -> TeamSplit {
    TeamOptimizer::default().optimize(pool, score, &mut rand::thread_rng())
}

/// Balanced split with the default settings, reproducible for a given seed.
pub fn optimize_with_seed<S: ScoreFn + ?Sized>(pool: &[Player], score: &S, seed: u64) -> TeamSplit {
    TeamOptimizer::default().optimize(pool, score, &mut StdRng::seed_from_u64(seed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::{Attributes, Scoring};

    fn player(name: &str, avg: f64) -> Player {
        Player::new(name.to_lowercase(), name, Attributes::uniform(avg), false)
    }

    fn averages(team: &[Player]) -> Vec<f64> {
        team.iter().map(|p| p.average).collect()
    }

    #[test]
    fn test_snake_draft_positions() {
        let sorted: Vec<Player> = (0..8).map(|i| player(&format!("P{}", i), 8.0 - i as f64)).collect();
        let (team1, team2) = snake_draft(sorted);
        let names1: Vec<&str> = team1.iter().map(|p| p.name.as_str()).collect();
        let names2: Vec<&str> = team2.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names1, vec!["P0", "P7", "P2", "P5"]);
        assert_eq!(names2, vec!["P1", "P6", "P3", "P4"]);
    }

    #[test]
    fn test_snake_draft_odd_pool() {
        let sorted: Vec<Player> = (0..5).map(|i| player(&format!("P{}", i), 5.0 - i as f64)).collect();
        let (team1, team2) = snake_draft(sorted);
        assert_eq!(team1.len(), 3);
        assert_eq!(team2.len(), 2);
    }

    #[test]
    fn test_four_players_already_balanced() {
        let pool = vec![
            player("Ann", 5.0),
            player("Bob", 4.0),
            player("Cat", 2.0),
            player("Dan", 1.0),
        ];
        let split = optimize_with_seed(&pool, &Scoring::Average, 7);
        assert!(split.difference.abs() < 1e-12);
        assert_eq!(split.len(), 4);
        assert!(split.team1[0].name <= split.team2[0].name);
    }

    #[test]
    fn test_two_players_canonical() {
        let pool = vec![player("Bob", 3.0), player("Ann", 3.0)];
        for seed in 0..10 {
            let split = optimize_with_seed(&pool, &Scoring::Average, seed);
            assert_eq!(split.team1[0].name, "Ann");
            assert_eq!(split.team2[0].name, "Bob");
            assert_eq!(split.difference, 0.0);
        }
    }

    #[test]
    fn test_small_pool_returns_empty_split() {
        let split = optimize(&[player("Solo", 3.0)], &Scoring::Average);
        assert!(split.is_empty());
        assert_eq!(split.difference, 0.0);
        assert!(optimize(&[], &Scoring::Average).is_empty());
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let pool: Vec<Player> = (0..10)
            .map(|i| player(&format!("Player{}", i), 1.0 + (i as f64 * 0.37) % 4.0))
            .collect();
        let a = optimize_with_seed(&pool, &Scoring::Enhanced, 42);
        let b = optimize_with_seed(&pool, &Scoring::Enhanced, 42);
        assert_eq!(a, b);
    }

    #[test]
    fn test_search_never_worsens_snake_draft() {
        let pool = vec![
            player("Ann", 4.8),
            player("Bob", 4.1),
            player("Cat", 3.9),
            player("Dan", 3.0),
            player("Eve", 2.6),
            player("Fay", 2.2),
            player("Gus", 1.5),
            player("Hal", 1.1),
        ];
        let mut sorted = pool.clone();
        sort_team(&mut sorted, &Scoring::Average);
        let (t1, t2) = snake_draft(sorted);
        let seeded = difference(&t1, &t2, &Scoring::Average).abs();

        for seed in 0..20 {
            let split = optimize_with_seed(&pool, &Scoring::Average, seed);
            assert!(split.difference.abs() <= seeded + 1e-12);
            let mut all = averages(&split.team1);
            all.extend(averages(&split.team2));
            assert_eq!(all.len(), 8);
        }
    }

    #[test]
    fn test_equal_magnitude_swap_is_kept() {
        let pool = vec![player("Ann", 5.0), player("Bob", 4.0), player("Cat", 2.0), player("Dan", 1.0)];
        // Every player scores the same, so any swap leaves the difference at 0
        let flat = |_: &Player| 3.0;
        let optimizer = TeamOptimizer::new(OptimizerConfig { iterations: 1 });

        for seed in 0..10 {
            let split = optimizer.optimize(&pool, &flat, &mut StdRng::seed_from_u64(seed));
            let mut side: Vec<&str> = split.team1.iter().map(|p| p.name.as_str()).collect();
            side.sort_unstable();
            // Snake draft gives {Ann, Dan} vs {Bob, Cat}; one kept swap breaks that up
            assert_ne!(side, vec!["Ann", "Dan"]);
            assert_ne!(side, vec!["Bob", "Cat"]);
            assert_eq!(split.difference, 0.0);
        }
    }

    #[test]
    fn test_zero_iterations_keeps_snake_draft() {
        let pool = vec![player("Ann", 5.0), player("Bob", 4.0), player("Cat", 2.0), player("Dan", 1.0)];
        let optimizer = TeamOptimizer::new(OptimizerConfig { iterations: 0 });
        let split = optimizer.optimize(&pool, &Scoring::Average, &mut StdRng::seed_from_u64(1));
        assert_eq!(averages(&split.team1), vec![5.0, 1.0]);
        assert_eq!(averages(&split.team2), vec![4.0, 2.0]);
    }
}
