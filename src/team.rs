// Two-sided team splits and their plain-text summaries.
// A split is always kept sorted and canonical: each side best-first, and the
// side whose leading player's name sorts first is team 1.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::balance::{difference, team_mean};
use crate::player::{Player, ScoreFn};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TeamSplit {
    pub team1: Vec<Player>,
    pub team2: Vec<Player>,
    /// team1 advantage minus team2 advantage under the scoring function used.
    pub difference: f64,
}

/// Highest score first, ties by name.
pub fn compare_players<S: ScoreFn + ?Sized>(a: &Player, b: &Player, score: &S) -> Ordering {
    score
        .score(b)
        .total_cmp(&score.score(a))
        .then_with(|| a.name.cmp(&b.name))
}

pub fn sort_team<S: ScoreFn + ?Sized>(team: &mut [Player], score: &S) {
    team.sort_by(|a, b| compare_players(a, b, score));
}

impl TeamSplit {
    /// Neutral result for pools too small to split.
    pub fn empty() -> Self {
        TeamSplit::default()
    }

    /// Sorts both sides, scores them and canonicalizes. Used for manual
    /// arrangements and as the last step of every optimizer run.
    pub fn from_teams<S: ScoreFn + ?Sized>(mut team1: Vec<Player>, mut team2: Vec<Player>, score: &S) -> Self {
        sort_team(&mut team1, score);
        sort_team(&mut team2, score);
        let difference = difference(&team1, &team2, score);
        let mut split = TeamSplit {
            team1,
            team2,
            difference,
        };
        split.canonicalize();
        split
    }

    /// Swap the sides if team2's leader sorts before team1's by name.
    pub fn canonicalize(&mut self) {
        let swap = match (self.team1.first(), self.team2.first()) {
            (Some(first1), Some(first2)) => first1.name > first2.name,
            _ => false,
        };
        if swap {
            std::mem::swap(&mut self.team1, &mut self.team2);
            self.difference = -self.difference;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.team1.is_empty() && self.team2.is_empty()
    }

    pub fn len(&self) -> usize {
        self.team1.len() + self.team2.len()
    }

    pub fn contains(&self, player_id: &str) -> bool {
        self.team1.iter().chain(self.team2.iter()).any(|p| p.id == player_id)
    }

    /// Move one player to the other side, then re-sort, re-score and
    /// re-canonicalize. No re-optimization happens. Returns false if the player
    /// is not in the split.
    pub fn move_player<S: ScoreFn + ?Sized>(&mut self, player_id: &str, score: &S) -> bool {
        let mut team1 = std::mem::take(&mut self.team1);
        let mut team2 = std::mem::take(&mut self.team2);

        if let Some(idx) = team1.iter().position(|p| p.id == player_id) {
            let player = team1.remove(idx);
            team2.push(player);
        } else if let Some(idx) = team2.iter().position(|p| p.id == player_id) {
            let player = team2.remove(idx);
            team1.push(player);
        } else {
            self.team1 = team1;
            self.team2 = team2;
            return false;
        }

        *self = TeamSplit::from_teams(team1, team2, score);
        true
    }

    /// Plain-text-ready summaries of both sides.
    pub fn summaries<S: ScoreFn + ?Sized>(&self, score: &S, labels: (&str, &str)) -> (TeamSummary, TeamSummary) {
        (
            TeamSummary::new(&self.team1, score, labels.0),
            TeamSummary::new(&self.team2, score, labels.1),
        )
    }
}

/// One side of a split as it is shared: label, averages and (name, score) lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamSummary {
    pub label: String,
    pub average: f64,
    pub average_mu: f64,
    pub players: Vec<(String, f64)>,
}

impl TeamSummary {
    pub fn new<S: ScoreFn + ?Sized>(team: &[Player], score: &S, label: &str) -> Self {
        TeamSummary {
            label: label.to_string(),
            average: team_mean(team, score),
            average_mu: team_mean(team, &|p: &Player| p.mu_or_default()),
            players: team.iter().map(|p| (p.name.clone(), score.score(p))).collect(),
        }
    }
}

impl fmt::Display for TeamSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Equip {}: {:.2} TS:{:.1}", self.label, self.average, self.average_mu)?;
        for (name, _) in &self.players {
            write!(f, "\n {} {}", self.label, name)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::{Attributes, Scoring};

    fn player(name: &str, avg: f64) -> Player {
        Player::new(name.to_lowercase(), name, Attributes::uniform(avg), false)
    }

    #[test]
    fn test_from_teams_sorts_and_canonicalizes() {
        let split = TeamSplit::from_teams(
            vec![player("Zoe", 2.0), player("Yan", 4.0)],
            vec![player("Bob", 3.0), player("Ann", 1.0)],
            &Scoring::Average,
        );
        // team2 leader "Bob" < team1 leader "Yan", so sides are swapped
        assert_eq!(split.team1[0].name, "Bob");
        assert_eq!(split.team1[1].name, "Ann");
        assert_eq!(split.team2[0].name, "Yan");
        assert!((split.difference - (-1.0)).abs() < 1e-12);
    }

    #[test]
    fn test_sort_ties_by_name() {
        let mut team = vec![player("Cid", 3.0), player("Abe", 3.0), player("Bea", 5.0)];
        sort_team(&mut team, &Scoring::Average);
        let names: Vec<&str> = team.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Bea", "Abe", "Cid"]);
    }

    #[test]
    fn test_move_player() {
        let mut split = TeamSplit::from_teams(
            vec![player("Ann", 5.0), player("Cat", 1.0)],
            vec![player("Bob", 4.0), player("Dan", 2.0)],
            &Scoring::Average,
        );
        assert!(split.difference.abs() < 1e-12);

        assert!(split.move_player("dan", &Scoring::Average));
        assert_eq!(split.team1.len(), 3);
        assert_eq!(split.team2.len(), 1);
        // Ann leads team1 in both arrangements
        assert_eq!(split.team1[0].name, "Ann");
        let expected = (5.0 + 1.0 + 2.0) / 3.0 - 4.0;
        assert!((split.difference - expected).abs() < 1e-12);

        assert!(!split.move_player("nobody", &Scoring::Average));
        assert_eq!(split.len(), 4);
    }

    #[test]
    fn test_rated_split_survives_json() {
        let split = TeamSplit::from_teams(
            vec![player("Ann", 3.0).with_rating(31.0, 4.5), player("Cat", 2.0)],
            vec![player("Bob", 4.0)],
            &Scoring::Enhanced,
        );
        let json = serde_json::to_string(&split).unwrap();
        let restored: TeamSplit = serde_json::from_str(&json).unwrap();

        assert_eq!(restored, split);
        assert_eq!(restored.team1[0].mu, Some(31.0));
        assert_eq!(restored.team1[0].sigma, Some(4.5));
        assert_eq!(restored.team1[1].mu, None);
    }

    #[test]
    fn test_summary_display() {
        let split = TeamSplit::from_teams(
            vec![player("Ann", 3.0).with_rating(30.0, 3.0)],
            vec![player("Bob", 2.0)],
            &Scoring::Average,
        );
        let (light, dark) = split.summaries(&Scoring::Average, ("A", "B"));
        assert_eq!(light.to_string(), "Equip A: 3.00 TS:30.0\n A Ann");
        assert_eq!(dark.to_string(), "Equip B: 2.00 TS:25.0\n B Bob");
    }
}
