// Configuration module for the team balancer
// Supports YAML configuration files for the skill model, rating seeds, the
// optimizer and match statistics

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use crate::error::{BalancerError, Result};
use crate::optimizer::{OptimizerConfig, TeamOptimizer, DEFAULT_ITERATIONS};
use crate::player::Scoring;
use crate::skill::{self, Seeding, SkillModel};
use crate::stats::MIN_SHARED_MATCHES;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub skill: SkillSettings,
    #[serde(default)]
    pub seeding: SeedingSettings,
    #[serde(default)]
    pub optimizer: OptimizerSettings,
    #[serde(default)]
    pub stats: StatsSettings,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file(path: &str) -> Result<Self> {
        if !Path::new(path).exists() {
            return Err(BalancerError::Config(format!("Config file not found: {}", path)));
        }

        let content = fs::read_to_string(path)
            .map_err(|e| BalancerError::Config(format!("Failed to read config file: {}", e)))?;

        serde_yaml::from_str(&content)
            .map_err(|e| BalancerError::Config(format!("Failed to parse config file: {}", e)))
    }

    /// Load configuration from file if it exists, otherwise use defaults
    pub fn load_or_default(path: Option<&str>) -> Self {
        match path {
            Some(p) => Self::from_file(p).unwrap_or_else(|e| {
                warn!(error = %e, "using default configuration");
                Self::default()
            }),
            None => {
                for default_path in &["balancer.yaml", "balancer.yml", ".balancer.yaml"] {
                    if Path::new(default_path).exists() {
                        match Self::from_file(default_path) {
                            Ok(config) => {
                                info!(path = default_path, "loaded configuration");
                                return config;
                            }
                            Err(e) => warn!(path = default_path, error = %e, "skipping config file"),
                        }
                    }
                }
                Self::default()
            }
        }
    }

    /// Save configuration to a YAML file
    pub fn save_to_file(&self, path: &str) -> Result<()> {
        let yaml = serde_yaml::to_string(self)
            .map_err(|e| BalancerError::Config(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, yaml).map_err(|e| BalancerError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    pub fn skill_model(&self) -> SkillModel {
        SkillModel {
            mu: self.skill.mu,
            sigma: self.skill.sigma,
            beta: self.skill.beta,
            tau: self.skill.tau,
            draw_probability: self.skill.draw_probability,
            guest_sigma_multiplier: self.skill.guest_sigma_multiplier,
            min_sigma: self.skill.min_sigma,
            seeding: Seeding {
                min_rating: self.seeding.min_rating,
                min_mu: self.seeding.min_mu,
                mu_per_rating_point: self.seeding.mu_per_rating_point,
            },
        }
    }

    pub fn optimizer(&self) -> TeamOptimizer {
        TeamOptimizer::new(OptimizerConfig {
            iterations: self.optimizer.iterations,
        })
    }
}

/// TrueSkill parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillSettings {
    /// Mean skill of an unrated player with no attribute average
    #[serde(default = "default_mu")]
    pub mu: f64,

    /// Initial uncertainty
    #[serde(default = "default_sigma")]
    pub sigma: f64,

    /// Performance noise per player
    #[serde(default = "default_beta")]
    pub beta: f64,

    /// Dynamics factor added before every update
    #[serde(default = "default_tau")]
    pub tau: f64,

    #[serde(default = "default_draw_probability")]
    pub draw_probability: f64,

    /// Guests start with sigma times this
    #[serde(default = "default_guest_sigma_multiplier")]
    pub guest_sigma_multiplier: f64,

    #[serde(default = "default_min_sigma")]
    pub min_sigma: f64,
}

impl Default for SkillSettings {
    fn default() -> Self {
        SkillSettings {
            mu: default_mu(),
            sigma: default_sigma(),
            beta: default_beta(),
            tau: default_tau(),
            draw_probability: default_draw_probability(),
            guest_sigma_multiplier: default_guest_sigma_multiplier(),
            min_sigma: default_min_sigma(),
        }
    }
}

fn default_mu() -> f64 { skill::DEFAULT_MU }
fn default_sigma() -> f64 { skill::DEFAULT_SIGMA }
fn default_beta() -> f64 { skill::BETA }
fn default_tau() -> f64 { skill::TAU }
fn default_draw_probability() -> f64 { skill::DRAW_PROBABILITY }
fn default_guest_sigma_multiplier() -> f64 { skill::GUEST_SIGMA_MULTIPLIER }
fn default_min_sigma() -> f64 { skill::MIN_SIGMA }

/// Starting mu for players first seen in the history: min_mu + (average - min_rating) * mu_per_rating_point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedingSettings {
    #[serde(default = "default_min_rating")]
    pub min_rating: f64,

    #[serde(default = "default_min_mu")]
    pub min_mu: f64,

    #[serde(default = "default_mu_per_rating_point")]
    pub mu_per_rating_point: f64,
}

impl Default for SeedingSettings {
    fn default() -> Self {
        SeedingSettings {
            min_rating: default_min_rating(),
            min_mu: default_min_mu(),
            mu_per_rating_point: default_mu_per_rating_point(),
        }
    }
}

fn default_min_rating() -> f64 { skill::MIN_RATING }
fn default_min_mu() -> f64 { skill::MIN_MU }
fn default_mu_per_rating_point() -> f64 { skill::MU_PER_RATING_POINT }

/// Team optimizer settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizerSettings {
    /// Random swap attempts after the snake draft
    #[serde(default = "default_iterations")]
    pub iterations: usize,

    /// Scoring function: "enhanced", "average" or "mu"
    #[serde(default)]
    pub scoring: Scoring,
}

impl Default for OptimizerSettings {
    fn default() -> Self {
        OptimizerSettings {
            iterations: default_iterations(),
            scoring: Scoring::default(),
        }
    }
}

fn default_iterations() -> usize { DEFAULT_ITERATIONS }

/// Match statistics settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsSettings {
    /// Shared matches required before a pairing is reported
    #[serde(default = "default_min_shared_matches")]
    pub min_shared_matches: usize,
}

impl Default for StatsSettings {
    fn default() -> Self {
        StatsSettings {
            min_shared_matches: default_min_shared_matches(),
        }
    }
}

fn default_min_shared_matches() -> usize { MIN_SHARED_MATCHES }

/// Generate a sample configuration file
pub fn generate_sample_config() -> String {
    r#"# Team Balancer Configuration
# All values shown are defaults - uncomment and modify as needed

# TrueSkill parameters
skill:
  # Mean and uncertainty for a player with no attribute average
  mu: 25.0
  sigma: 8.3
  # Performance noise per player
  beta: 4.166
  # Dynamics factor added to sigma before each update
  tau: 0.12
  # Prior probability of a draw
  draw_probability: 0.05
  # Guests start with sigma multiplied by this
  guest_sigma_multiplier: 2.0
  # Sigma never drops below this
  min_sigma: 0.0001

# Starting mu for a player first seen in the history
# mu = min_mu + (average - min_rating) * mu_per_rating_point
seeding:
  min_rating: 1.0
  min_mu: 15.0
  mu_per_rating_point: 5.0

# Team optimizer
optimizer:
  # Random swap attempts after the snake draft
  iterations: 50
  # Scoring function: "enhanced" (average + (mu - 20) / 10), "average" or "mu"
  scoring: enhanced

# Match statistics
stats:
  # Shared matches required before two players get pair statistics
  min_shared_matches: 4
"#.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.optimizer.iterations, 50);
        assert_eq!(config.optimizer.scoring, Scoring::Enhanced);
        assert_eq!(config.stats.min_shared_matches, 4);
        assert_eq!(config.skill_model(), SkillModel::default());
    }

    #[test]
    fn test_parse_yaml() {
        let yaml = r#"
skill:
  draw_probability: 0.1
optimizer:
  iterations: 200
  scoring: mu
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.skill.draw_probability, 0.1);
        assert_eq!(config.optimizer.iterations, 200);
        assert_eq!(config.optimizer.scoring, Scoring::Mu);
        // Defaults should still work
        assert_eq!(config.skill.sigma, 8.3);
        assert_eq!(config.seeding, SeedingSettings::default());
        assert_eq!(config.optimizer().config.iterations, 200);
    }

    #[test]
    fn test_sample_config_matches_defaults() {
        let config: Config = serde_yaml::from_str(&generate_sample_config()).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_seeding_flows_into_model() {
        let yaml = "seeding:\n  min_mu: 10.0\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        let model = config.skill_model();
        assert_eq!(model.seed(Some(3.0), false).mu, 20.0);
    }

    #[test]
    fn test_missing_file() {
        let err = Config::from_file("/nonexistent/balancer.yaml").unwrap_err();
        assert!(matches!(err, BalancerError::Config(_)));
        assert_eq!(Config::load_or_default(Some("/nonexistent/balancer.yaml")), Config::default());
    }
}
