// Balance metric: signed difference of the mean score of two teams.
// Positive means the first team has the advantage.

use crate::player::{Player, ScoreFn};

/// Mean score of a team; 0 for an empty team.
pub fn team_mean<S: ScoreFn + ?Sized>(team: &[Player], score: &S) -> f64 {
    if team.is_empty() {
        return 0.0;
    }
    team.iter().map(|p| score.score(p)).sum::<f64>() / team.len() as f64
}

/// `mean(score(a)) - mean(score(b))`. An empty side yields 0 so callers can
/// score half-built teams without special-casing them.
pub fn difference<S: ScoreFn + ?Sized>(team_a: &[Player], team_b: &[Player], score: &S) -> f64 {
    if team_a.is_empty() || team_b.is_empty() {
        return 0.0;
    }
    team_mean(team_a, score) - team_mean(team_b, score)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::{Attributes, Scoring};

    fn player(name: &str, avg: f64) -> Player {
        Player::new(name, name, Attributes::uniform(avg), false)
    }

    #[test]
    fn test_difference_sign() {
        let a = vec![player("a", 4.0), player("b", 2.0)];
        let b = vec![player("c", 1.0), player("d", 3.0)];
        assert!((difference(&a, &b, &Scoring::Average) - 1.0).abs() < 1e-12);
        assert!((difference(&b, &a, &Scoring::Average) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_team_is_neutral() {
        let a = vec![player("a", 4.0)];
        assert_eq!(difference(&a, &[], &Scoring::Average), 0.0);
        assert_eq!(difference(&[], &a, &Scoring::Average), 0.0);
        assert_eq!(team_mean(&[], &Scoring::Mu), 0.0);
    }

    #[test]
    fn test_uneven_sizes_use_means() {
        let a = vec![player("a", 3.0)];
        let b = vec![player("b", 2.0), player("c", 4.0), player("d", 3.0)];
        assert!(difference(&a, &b, &Scoring::Average).abs() < 1e-12);
    }

    #[test]
    fn test_custom_score_fn() {
        let a = vec![player("a", 3.0).with_rating(30.0, 2.0)];
        let b = vec![player("b", 3.0)];
        let by_mu = |p: &Player| p.mu_or_default();
        assert!((difference(&a, &b, &by_mu) - 5.0).abs() < 1e-12);
    }
}
