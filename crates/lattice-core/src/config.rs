//! Configuration loading and typed config structures for a Lattice run.
//!
//! The configuration lives in `lattice-config.yaml` at the project root.
//! Every field has a default, so an empty file (or no file at all) yields a
//! runnable configuration. The space and schedule sections know how to
//! build the values they describe.

use std::path::Path;

use lattice_space::{Bounds, ContinuousSpace, MultiGrid, SingleGrid, SpaceError};
use lattice_time::{
    BaseScheduler, RandomScheduler, Schedule, ScheduleError, SimultaneousScheduler,
    StagedScheduler,
};
use serde::Deserialize;

/// Environment variable that overrides `world.seed`.
pub const SEED_ENV: &str = "LATTICE_SEED";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A value parsed but is out of its allowed range.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Explanation of what is wrong.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level run configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// Run name and seed.
    #[serde(default)]
    pub world: WorldConfig,

    /// Grid and continuous space dimensions.
    #[serde(default)]
    pub space: SpaceConfig,

    /// Activation regime.
    #[serde(default)]
    pub schedule: ScheduleConfig,

    /// Demonstration model parameters.
    #[serde(default)]
    pub model: ModelConfig,

    /// Run length.
    #[serde(default)]
    pub run: RunConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// `LATTICE_SEED`, when set to an integer, overrides `world.seed`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&contents)?;
        config.world.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yml::from_str(yaml)?;
        Ok(config)
    }
}

/// Run identity.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorldConfig {
    /// Human-readable run name.
    #[serde(default = "default_world_name")]
    pub name: String,

    /// Seed for the model's random source.
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl WorldConfig {
    /// Apply `LATTICE_SEED` if it is set and parses.
    pub fn apply_env_overrides(&mut self) {
        if let Some(seed) = std::env::var(SEED_ENV)
            .ok()
            .and_then(|raw| raw.trim().parse().ok())
        {
            self.seed = seed;
        }
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            name: default_world_name(),
            seed: default_seed(),
        }
    }
}

/// Space dimensions, for both grid and continuous models.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SpaceConfig {
    /// Grid columns.
    #[serde(default = "default_grid_side")]
    pub width: u32,

    /// Grid rows.
    #[serde(default = "default_grid_side")]
    pub height: u32,

    /// Whether opposite edges are joined.
    #[serde(default = "default_true")]
    pub torus: bool,

    /// Continuous space lower x bound.
    #[serde(default)]
    pub x_min: f64,

    /// Continuous space lower y bound.
    #[serde(default)]
    pub y_min: f64,

    /// Continuous space upper x bound (exclusive).
    #[serde(default = "default_extent")]
    pub x_max: f64,

    /// Continuous space upper y bound (exclusive).
    #[serde(default = "default_extent")]
    pub y_max: f64,

    /// Broad-phase buckets along x.
    #[serde(default = "default_buckets")]
    pub grid_width: u32,

    /// Broad-phase buckets along y.
    #[serde(default = "default_buckets")]
    pub grid_height: u32,
}

impl SpaceConfig {
    /// Continuous-space bounds.
    pub const fn bounds(&self) -> Bounds {
        Bounds {
            x_min: self.x_min,
            x_max: self.x_max,
            y_min: self.y_min,
            y_max: self.y_max,
        }
    }

    /// A single-occupancy grid of the configured size.
    ///
    /// # Errors
    ///
    /// Returns [`SpaceError::InvalidDimensions`] for a zero dimension.
    pub fn single_grid(&self) -> Result<SingleGrid, SpaceError> {
        SingleGrid::new(self.width, self.height, self.torus)
    }

    /// A multi-occupancy grid of the configured size.
    ///
    /// # Errors
    ///
    /// Returns [`SpaceError::InvalidDimensions`] for a zero dimension.
    pub fn multi_grid(&self) -> Result<MultiGrid, SpaceError> {
        MultiGrid::new(self.width, self.height, self.torus)
    }

    /// A continuous space over the configured bounds.
    ///
    /// # Errors
    ///
    /// Returns [`SpaceError::InvalidDimensions`] for empty bounds or a zero
    /// bucket count.
    pub fn continuous(&self) -> Result<ContinuousSpace, SpaceError> {
        ContinuousSpace::new(self.bounds(), self.torus, self.grid_width, self.grid_height)
    }
}

impl Default for SpaceConfig {
    fn default() -> Self {
        Self {
            width: default_grid_side(),
            height: default_grid_side(),
            torus: true,
            x_min: 0.0,
            y_min: 0.0,
            x_max: default_extent(),
            y_max: default_extent(),
            grid_width: default_buckets(),
            grid_height: default_buckets(),
        }
    }
}

/// Activation regime names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Regime {
    /// Insertion order.
    Base,
    /// Reshuffled every tick.
    #[default]
    Random,
    /// Decide then commit.
    Simultaneous,
    /// Named stages.
    Staged,
}

/// Schedule configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScheduleConfig {
    /// Which regime to run.
    #[serde(default)]
    pub regime: Regime,

    /// Stage names for the staged regime.
    #[serde(default = "default_stages")]
    pub stages: Vec<String>,

    /// Staged regime: shuffle once per tick.
    #[serde(default)]
    pub shuffle: bool,

    /// Staged regime: shuffle after every stage.
    #[serde(default)]
    pub shuffle_between_stages: bool,
}

impl ScheduleConfig {
    /// Build the configured schedule.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::InvalidConfig`] for an unusable stage list.
    pub fn build(&self) -> Result<Schedule, ScheduleError> {
        Ok(match self.regime {
            Regime::Base => BaseScheduler::new().into(),
            Regime::Random => RandomScheduler::new().into(),
            Regime::Simultaneous => SimultaneousScheduler::new().into(),
            Regime::Staged => StagedScheduler::new(
                self.stages.iter().cloned(),
                self.shuffle,
                self.shuffle_between_stages,
            )?
            .into(),
        })
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            regime: Regime::default(),
            stages: default_stages(),
            shuffle: false,
            shuffle_between_stages: false,
        }
    }
}

/// Which demonstration model to run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    /// Segregation on a single-occupancy grid.
    #[default]
    Schelling,
    /// Flocking in continuous space.
    Flock,
}

/// Demonstration model parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ModelConfig {
    /// Which model to build.
    #[serde(default)]
    pub kind: ModelKind,

    /// Schelling: fraction of cells occupied at start.
    #[serde(default = "default_density")]
    pub density: f64,

    /// Schelling: fraction of agents in the minority group.
    #[serde(default = "default_minority_fraction")]
    pub minority_fraction: f64,

    /// Schelling: similar neighbors an agent needs to be happy.
    #[serde(default = "default_homophily")]
    pub homophily: u32,

    /// Flock: number of agents.
    #[serde(default = "default_flock_size")]
    pub agents: u32,

    /// Flock: neighbor radius.
    #[serde(default = "default_vision")]
    pub vision: f64,

    /// Flock: distance moved per tick.
    #[serde(default = "default_speed")]
    pub speed: f64,

    /// Flock: distance below which agents steer apart.
    #[serde(default = "default_separation")]
    pub separation: f64,
}

impl ModelConfig {
    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fractions = [
            ("density", self.density),
            ("minority_fraction", self.minority_fraction),
        ];
        for (name, value) in fractions {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Invalid {
                    reason: format!("model.{name} must be within [0, 1], got {value}"),
                });
            }
        }
        let distances = [
            ("vision", self.vision),
            ("speed", self.speed),
            ("separation", self.separation),
        ];
        for (name, value) in distances {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid {
                    reason: format!("model.{name} must be a non-negative number, got {value}"),
                });
            }
        }
        Ok(())
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            kind: ModelKind::default(),
            density: default_density(),
            minority_fraction: default_minority_fraction(),
            homophily: default_homophily(),
            agents: default_flock_size(),
            vision: default_vision(),
            speed: default_speed(),
            separation: default_separation(),
        }
    }
}

/// Run length.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RunConfig {
    /// Tick limit.
    #[serde(default = "default_max_steps")]
    pub max_steps: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            max_steps: default_max_steps(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

fn default_world_name() -> String {
    "Lattice Run".to_owned()
}

const fn default_seed() -> u64 {
    42
}

const fn default_grid_side() -> u32 {
    20
}

const fn default_true() -> bool {
    true
}

const fn default_extent() -> f64 {
    100.0
}

const fn default_buckets() -> u32 {
    10
}

fn default_stages() -> Vec<String> {
    vec![lattice_time::DEFAULT_STAGE.to_owned()]
}

const fn default_density() -> f64 {
    0.8
}

const fn default_minority_fraction() -> f64 {
    0.2
}

const fn default_homophily() -> u32 {
    3
}

const fn default_flock_size() -> u32 {
    50
}

const fn default_vision() -> f64 {
    10.0
}

const fn default_speed() -> f64 {
    1.0
}

const fn default_separation() -> f64 {
    2.0
}

const fn default_max_steps() -> u64 {
    100
}

fn default_log_level() -> String {
    "info".to_owned()
}

#[cfg(test)]
mod tests {
    use lattice_time::Scheduler;

    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = SimulationConfig::default();
        assert_eq!(config.world.seed, 42);
        assert_eq!(config.space.width, 20);
        assert_eq!(config.schedule.regime, Regime::Random);
        assert_eq!(config.schedule.stages, vec!["step".to_owned()]);
        assert_eq!(config.model.kind, ModelKind::Schelling);
        assert_eq!(config.run.max_steps, 100);
        assert!(config.model.validate().is_ok());
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
world:
  name: "Test Run"
  seed: 123

space:
  width: 8
  height: 6
  torus: false
  x_min: -10.0
  y_min: 0.0
  x_max: 10.0
  y_max: 5.0
  grid_width: 4
  grid_height: 2

schedule:
  regime: staged
  stages: [sense, act]
  shuffle: true
  shuffle_between_stages: true

model:
  kind: flock
  density: 0.5
  minority_fraction: 0.5
  homophily: 2
  agents: 12
  vision: 3.5
  speed: 0.5
  separation: 1.0

run:
  max_steps: 7

logging:
  level: "debug"
"#;

        let config = SimulationConfig::parse(yaml);
        assert!(config.is_ok());
        let config = config.ok().unwrap_or_default();

        assert_eq!(config.world.name, "Test Run");
        assert_eq!(config.world.seed, 123);
        assert_eq!(config.space.width, 8);
        assert!(!config.space.torus);
        assert_eq!(config.schedule.regime, Regime::Staged);
        assert_eq!(config.schedule.stages.len(), 2);
        assert_eq!(config.model.kind, ModelKind::Flock);
        assert_eq!(config.model.agents, 12);
        assert_eq!(config.run.max_steps, 7);
        assert_eq!(config.logging.level, "debug");

        let bounds = config.space.bounds();
        assert!((bounds.width() - 20.0).abs() < f64::EPSILON);
        assert!(config.space.continuous().is_ok());
        assert!(config.space.single_grid().is_ok());
    }

    #[test]
    fn parse_minimal_yaml() {
        let yaml = "world:\n  seed: 7\n";
        let config = SimulationConfig::parse(yaml);
        assert!(config.is_ok());
        let config = config.ok().unwrap_or_default();

        // Seed is overridden
        assert_eq!(config.world.seed, 7);
        // Everything else uses defaults
        assert_eq!(config.space.height, 20);
        assert_eq!(config.schedule.regime, Regime::Random);
    }

    #[test]
    fn parse_empty_yaml() {
        let config = SimulationConfig::parse("");
        assert!(config.is_ok());
    }

    #[test]
    fn unknown_regime_is_rejected() {
        let config = SimulationConfig::parse("schedule:\n  regime: chaotic\n");
        assert!(matches!(config, Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn schedule_build_honors_regime() {
        let mut config = ScheduleConfig {
            regime: Regime::Simultaneous,
            ..ScheduleConfig::default()
        };
        assert_eq!(config.build().map(|s| s.regime()).ok(), Some("simultaneous"));

        config.regime = Regime::Staged;
        config.stages = vec!["a".to_owned(), "b".to_owned(), "c".to_owned()];
        let staged = config.build();
        assert!(staged.is_ok_and(|s| s.stages().len() == 3));

        config.stages.clear();
        assert!(matches!(
            config.build(),
            Err(ScheduleError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn zero_sized_space_is_rejected() {
        let space = SpaceConfig {
            width: 0,
            ..SpaceConfig::default()
        };
        assert!(space.single_grid().is_err());
        assert!(space.multi_grid().is_err());
    }

    #[test]
    fn out_of_range_fraction_is_rejected() {
        let model = ModelConfig {
            density: 1.5,
            ..ModelConfig::default()
        };
        assert!(matches!(model.validate(), Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("lattice-config.yaml");
        if path.exists() {
            let config = SimulationConfig::from_file(&path);
            assert!(config.is_ok(), "Failed to load project config: {config:?}");
        }
    }
}
