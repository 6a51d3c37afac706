// Exhaustive enumeration of every way to split a pool into two halves.
//
// The number of splits is C(n, n/2), which grows fast: 12 players give 924
// subsets (462 distinct splits), 20 would give ~185k. This module does not cap
// the pool size; callers are expected to keep pools small (the product allows
// 4-12 players) and to run large enumerations off any latency-sensitive thread.

use fnv::FnvHashSet;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::balance::difference;
use crate::player::{Player, ScoreFn, Scoring};
use crate::team::sort_team;

/// One candidate split scored three ways.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamCombination {
    pub team1: Vec<Player>,
    pub team2: Vec<Player>,
    /// Mean mu difference, unrated players at the default mu.
    pub mu_diff: f64,
    /// Mean difference under the caller's scoring function.
    pub score_diff: f64,
    /// Mean raw attribute average difference.
    pub average_diff: f64,
}

impl TeamCombination {
    fn key(&self) -> (String, String) {
        let side = |team: &[Player]| {
            let mut ids: Vec<&str> = team.iter().map(|p| p.id.as_str()).collect();
            ids.sort_unstable();
            ids.join(",")
        };
        let (a, b) = (side(&self.team1), side(&self.team2));
        if a <= b {
            (a, b)
        } else {
            (b, a)
        }
    }
}

/// Every distinct split of `pool` into a floor(n/2) side and the complement,
/// sorted from most to least balanced by the scoring function (ties by mu).
/// Mirror images of the same split are reported once.
pub fn enumerate<S: ScoreFn + ?Sized>(pool: &[Player], score: &S) -> Vec<TeamCombination> {
    let n = pool.len();
    if n < 2 {
        return Vec::new();
    }
    let team_size = n / 2;

    let mut seen: FnvHashSet<(String, String)> = FnvHashSet::default();
    let mut combinations = Vec::new();

    for_each_subset(n, team_size, |indices| {
        let mut in_team1 = vec![false; n];
        for &i in indices {
            in_team1[i] = true;
        }
        let mut team1 = Vec::with_capacity(team_size);
        let mut team2 = Vec::with_capacity(n - team_size);
        for (player, &chosen) in pool.iter().zip(&in_team1) {
            if chosen {
                team1.push(player.clone());
            } else {
                team2.push(player.clone());
            }
        }
        if team1.len() != team_size || team2.len() != n - team_size {
            return;
        }

        sort_team(&mut team1, score);
        sort_team(&mut team2, score);
        let combination = TeamCombination {
            mu_diff: difference(&team1, &team2, &Scoring::Mu),
            score_diff: difference(&team1, &team2, score),
            average_diff: difference(&team1, &team2, &Scoring::Average),
            team1,
            team2,
        };
        if seen.insert(combination.key()) {
            combinations.push(combination);
        }
    });

    combinations.sort_by(|a, b| {
        a.score_diff
            .abs()
            .total_cmp(&b.score_diff.abs())
            .then_with(|| a.mu_diff.abs().total_cmp(&b.mu_diff.abs()))
    });

    info!(
        players = n,
        combinations = combinations.len(),
        "enumerated team combinations"
    );
    combinations
}

/// Calls `f` with every k-element subset of 0..n, in lexicographic order.
fn for_each_subset<F: FnMut(&[usize])>(n: usize, k: usize, mut f: F) {
    if k > n {
        return;
    }
    let mut indices: Vec<usize> = (0..k).collect();
    loop {
        f(&indices);

        // Find the rightmost index that can still move right
        let mut i = k;
        loop {
            if i == 0 {
                return;
            }
            i -= 1;
            if indices[i] != i + n - k {
                break;
            }
            if i == 0 {
                return;
            }
        }
        indices[i] += 1;
        for j in i + 1..k {
            indices[j] = indices[j - 1] + 1;
        }
    }
}

/// Number of players that sit on different sides in the two combinations.
pub fn team_changes(a: &TeamCombination, b: &TeamCombination) -> usize {
    let ids = |team: &[Player]| -> FnvHashSet<String> { team.iter().map(|p| p.id.clone()).collect() };
    let (a1, a2) = (ids(&a.team1), ids(&a.team2));
    let (b1, b2) = (ids(&b.team1), ids(&b.team2));
    a1.intersection(&b2).count() + a2.intersection(&b1).count()
}

/// Keeps combinations that are either selected or differ from every selected
/// combination by more than `min_changes` players. Returns indices into
/// `combinations`.
pub fn distinct_from(combinations: &[TeamCombination], selected: &[usize], min_changes: usize) -> Vec<usize> {
    (0..combinations.len())
        .filter(|idx| {
            if selected.contains(idx) {
                return true;
            }
            selected
                .iter()
                .filter_map(|&s| combinations.get(s))
                .all(|chosen| team_changes(&combinations[*idx], chosen) > min_changes)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::Attributes;

    fn pool(n: usize) -> Vec<Player> {
        (0..n)
            .map(|i| {
                Player::new(
                    format!("id{:02}", i),
                    format!("Player{:02}", i),
                    Attributes::uniform(1.0 + (i % 5) as f64),
                    false,
                )
            })
            .collect()
    }

    fn binomial(n: usize, k: usize) -> usize {
        (0..k).fold(1, |acc, i| acc * (n - i) / (i + 1))
    }

    #[test]
    fn test_for_each_subset_counts() {
        let mut count = 0;
        for_each_subset(6, 3, |s| {
            assert_eq!(s.len(), 3);
            count += 1;
        });
        assert_eq!(count, 20);

        let mut count = 0;
        for_each_subset(4, 0, |_| count += 1);
        assert_eq!(count, 1);
    }

    #[test]
    fn test_even_pool_deduplicates_mirrors() {
        for n in [2, 4, 6, 8, 10] {
            let combos = enumerate(&pool(n), &Scoring::Average);
            assert_eq!(combos.len(), binomial(n, n / 2) / 2, "n = {}", n);
            for c in &combos {
                assert_eq!(c.team1.len(), n / 2);
                assert_eq!(c.team2.len(), n / 2);
            }
        }
    }

    #[test]
    fn test_odd_pool_keeps_floor_vs_ceil() {
        let combos = enumerate(&pool(5), &Scoring::Average);
        assert_eq!(combos.len(), binomial(5, 2));
        for c in &combos {
            assert_eq!(c.team1.len(), 2);
            assert_eq!(c.team2.len(), 3);
        }
    }

    #[test]
    fn test_sorted_by_balance() {
        let combos = enumerate(&pool(8), &Scoring::Enhanced);
        for pair in combos.windows(2) {
            assert!(pair[0].score_diff.abs() <= pair[1].score_diff.abs());
        }
    }

    #[test]
    fn test_three_metrics() {
        let players = vec![
            Player::new("a", "Ann", Attributes::uniform(4.0), false).with_rating(30.0, 3.0),
            Player::new("b", "Bob", Attributes::uniform(2.0), false),
        ];
        let combos = enumerate(&players, &Scoring::Enhanced);
        assert_eq!(combos.len(), 1);
        let c = &combos[0];
        let sign = if c.team1[0].id == "a" { 1.0 } else { -1.0 };
        assert!((c.mu_diff - sign * 5.0).abs() < 1e-12);
        assert!((c.average_diff - sign * 2.0).abs() < 1e-12);
        // enhanced: (4 + 1.0) - (2 + 0.5)
        assert!((c.score_diff - sign * 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_small_pool() {
        assert!(enumerate(&pool(1), &Scoring::Average).is_empty());
        assert!(enumerate(&[], &Scoring::Average).is_empty());
    }

    #[test]
    fn test_team_changes_and_distinct_filter() {
        let combos = enumerate(&pool(6), &Scoring::Average);
        assert_eq!(team_changes(&combos[0], &combos[0]), 0);

        let kept = distinct_from(&combos, &[0], 2);
        assert!(kept.contains(&0));
        for idx in kept.iter().filter(|&&i| i != 0) {
            assert!(team_changes(&combos[*idx], &combos[0]) > 2);
        }

        let everything = distinct_from(&combos, &[], 2);
        assert_eq!(everything.len(), combos.len());
    }
}
