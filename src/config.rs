//! Runtime configuration for aggregation and simplification.
//!
//! Temporal values themselves carry no configuration. The settings here
//! only shape internal structures whose layout does not change results, such
//! as the aggregation skip-list, plus defaults for trajectory simplification.
use serde::de::Error;

/// Highest skip-list level supported by the level generator.
pub const MAX_SKIPLIST_LEVEL: usize = 47;

/// Library configuration
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Aggregation skip-list settings
    #[serde(default)]
    pub aggregation: AggregationConfig,

    /// Trajectory simplification defaults
    #[serde(default)]
    pub simplify: SimplifyConfig,
}

/// Settings for the skip-list behind temporal aggregates
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AggregationConfig {
    /// Number of element slots reserved when a state is created
    #[serde(default = "AggregationConfig::default_initial_capacity")]
    pub initial_capacity: usize,

    /// Maximum tower height of a skip-list element
    #[serde(default = "AggregationConfig::default_max_level")]
    pub max_level: usize,

    /// Seed of the level generator, fixed so that runs are reproducible
    #[serde(default = "AggregationConfig::default_seed")]
    pub seed: u64,
}

impl AggregationConfig {
    const fn default_initial_capacity() -> usize {
        1024
    }

    const fn default_max_level() -> usize {
        32
    }

    const fn default_seed() -> u64 {
        0x5EED_CAFE
    }
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            initial_capacity: Self::default_initial_capacity(),
            max_level: Self::default_max_level(),
            seed: Self::default_seed(),
        }
    }
}

/// Defaults for the Douglas-Peucker simplification variant
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimplifyConfig {
    /// Sequences with at most this many instants are returned unchanged
    #[serde(default = "SimplifyConfig::default_min_points")]
    pub min_points: usize,
}

impl SimplifyConfig {
    const fn default_min_points() -> usize {
        2
    }
}

impl Default for SimplifyConfig {
    fn default() -> Self {
        Self {
            min_points: Self::default_min_points(),
        }
    }
}

impl Config {
    /// Set the number of skip-list slots reserved up front.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn with_initial_capacity(mut self, capacity: usize) -> Self {
        assert!(capacity > 0, "Initial capacity must be greater than zero");

        if capacity > 1_000_000 {
            log::warn!(
                "Skip-list initial capacity of {} is very large and is allocated for every \
                aggregation state.",
                capacity
            );
        }

        self.aggregation.initial_capacity = capacity;
        self
    }

    /// Set the maximum skip-list level.
    ///
    /// # Panics
    ///
    /// Panics if `level` is zero or above [`MAX_SKIPLIST_LEVEL`].
    pub fn with_max_level(mut self, level: usize) -> Self {
        assert!(
            (1..=MAX_SKIPLIST_LEVEL).contains(&level),
            "Max level must be between 1 and {}",
            MAX_SKIPLIST_LEVEL
        );
        self.aggregation.max_level = level;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.aggregation.seed = seed;
        self
    }

    pub fn with_min_points(mut self, min_points: usize) -> Self {
        self.simplify.min_points = min_points;
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.aggregation.initial_capacity == 0 {
            return Err("Initial capacity must be greater than zero".to_string());
        }

        if self.aggregation.max_level == 0 || self.aggregation.max_level > MAX_SKIPLIST_LEVEL {
            return Err(format!(
                "Max level must be between 1 and {}",
                MAX_SKIPLIST_LEVEL
            ));
        }

        if self.simplify.min_points < 2 {
            return Err("Simplification must keep at least two points".to_string());
        }

        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let config: Config = serde_json::from_str(json)?;
        if let Err(e) = config.validate() {
            return Err(Error::custom(e));
        }
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    #[cfg(feature = "toml")]
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        let config: Config = toml::from_str(toml_str)?;
        if let Err(e) = config.validate() {
            return Err(toml::de::Error::custom(e));
        }
        Ok(config)
    }

    #[cfg(feature = "toml")]
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            aggregation: AggregationConfig::default(),
            simplify: SimplifyConfig::default(),
        }
    }
}
