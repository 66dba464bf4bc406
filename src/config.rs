use crate::species::SpeciesPolicy;
use crate::stats::StatsMode;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

/// Largest species count any palette supports
pub const MAX_SPECIES: usize = 6;

/// Environment variable naming a JSON config file
pub const CONFIG_ENV: &str = "FOREST_CONFIG";

/// Configuration errors reported when a forest is constructed
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("canvas size must be positive and finite (got {width}x{height})")]
    InvalidCanvas { width: f64, height: f64 },
    #[error("number_species must be in 1..={max} (got {actual})")]
    InvalidSpeciesCount { max: usize, actual: usize },
    #[error("max_tree_radius must be positive and finite")]
    InvalidMaxRadius,
    #[error("cell_size {cell_size} must be at least twice max_tree_radius {max_radius}")]
    CellTooSmall { cell_size: f64, max_radius: f64 },
    #[error("{name} must be a probability in [0, 1] (got {value})")]
    InvalidProbability { name: &'static str, value: f64 },
    #[error("{name} must be finite and non-negative (got {value})")]
    NegativeValue { name: &'static str, value: f64 },
    #[error("growth_divisor must be positive and finite")]
    InvalidGrowthDivisor,
    #[error("stats_width must be greater than 0")]
    EmptyStatsWindow,
    #[error("clear_fraction must be in (0, 1]")]
    InvalidClearFraction,
    #[error("death_exponent must be at least 1 (got {0})")]
    InvalidDeathExponent(i32),
    #[error("failed to load config from {path}: {reason}")]
    Load { path: String, reason: String },
}

/// All tunables of a forest run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestConfig {
    /// Canvas width in pixels
    pub width: f64,
    /// Canvas height in pixels
    pub height: f64,
    /// Number of samples kept in the statistics window
    pub stats_width: usize,
    pub number_species: usize,
    pub max_tree_radius: f64,
    /// Side of one grid cell; must be >= 2 * max_tree_radius
    pub cell_size: f64,
    pub birth_rate: f64,
    pub death_rate: f64,
    /// Pick new seed species by neighbouring area instead of uniformly
    pub parent_weighting: bool,
    /// Weight every species receives before neighbour areas are added
    pub parent_floor_weight: f64,
    /// Chance per tick of trying to drop a random seed
    pub seed_probability: f64,
    /// Growth per tick is `growth_rate * U(0,1) / growth_divisor`
    pub growth_divisor: f64,
    /// 1 = linear death accrual, 2 = power-law variant
    pub death_exponent: i32,
    /// Chance per tick of a random clear-cut
    pub disaster_probability: f64,
    /// Clear-cut radius as a fraction of the smaller canvas dimension
    pub clear_fraction: f64,
    /// Extra radius painted when erasing a dead tree
    pub erase_padding: f64,
    /// Standard deviation of growth-rate mutation (evolving policy only)
    pub mutation_sd: f64,
    /// Neighbours needed before an evolving seed inherits from a parent
    pub evolving_min_neighbors: usize,
    pub stats_mode: StatsMode,
    pub policy: SpeciesPolicy,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            width: 900.0,
            height: 600.0,
            stats_width: 900,
            number_species: 2,
            max_tree_radius: 50.0,
            cell_size: 100.0,
            birth_rate: 1.0,
            death_rate: 1.0,
            parent_weighting: true,
            parent_floor_weight: 1.0,
            seed_probability: 0.05,
            growth_divisor: 5.0,
            death_exponent: 1,
            disaster_probability: 0.0,
            clear_fraction: 0.25,
            erase_padding: 2.0,
            mutation_sd: 0.5,
            evolving_min_neighbors: 5,
            stats_mode: StatsMode::AreaProportion,
            policy: SpeciesPolicy::Palette,
        }
    }
}

impl ForestConfig {
    /// Two-species evolving forest reporting mean growth rates
    pub fn evolving() -> Self {
        Self {
            number_species: 2,
            policy: SpeciesPolicy::Evolving,
            stats_mode: StatsMode::MeanGrowthRate,
            ..Self::default()
        }
    }

    /// Set width and height, keeping the stats window as wide as the canvas
    pub fn with_canvas(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self.stats_width = (width.max(1.0)) as usize;
        self
    }

    /// Radius of a clear-cut for the configured canvas
    pub fn clear_radius(&self) -> f64 {
        self.width.min(self.height) * self.clear_fraction
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = |v: f64| v.is_finite() && v > 0.0;

        if !(positive(self.width) && positive(self.height)) {
            return Err(ConfigError::InvalidCanvas {
                width: self.width,
                height: self.height,
            });
        }
        if !(1..=MAX_SPECIES).contains(&self.number_species) {
            return Err(ConfigError::InvalidSpeciesCount {
                max: MAX_SPECIES,
                actual: self.number_species,
            });
        }
        if !positive(self.max_tree_radius) {
            return Err(ConfigError::InvalidMaxRadius);
        }
        if !(self.cell_size.is_finite() && self.cell_size >= 2.0 * self.max_tree_radius) {
            return Err(ConfigError::CellTooSmall {
                cell_size: self.cell_size,
                max_radius: self.max_tree_radius,
            });
        }
        for (name, value) in [
            ("seed_probability", self.seed_probability),
            ("disaster_probability", self.disaster_probability),
        ] {
            if !(value.is_finite() && (0.0..=1.0).contains(&value)) {
                return Err(ConfigError::InvalidProbability { name, value });
            }
        }
        for (name, value) in [
            ("birth_rate", self.birth_rate),
            ("death_rate", self.death_rate),
            ("parent_floor_weight", self.parent_floor_weight),
            ("erase_padding", self.erase_padding),
            ("mutation_sd", self.mutation_sd),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::NegativeValue { name, value });
            }
        }
        if self.death_exponent < 1 {
            return Err(ConfigError::InvalidDeathExponent(self.death_exponent));
        }
        if !positive(self.growth_divisor) {
            return Err(ConfigError::InvalidGrowthDivisor);
        }
        if self.stats_width == 0 {
            return Err(ConfigError::EmptyStatsWindow);
        }
        if !(self.clear_fraction > 0.0 && self.clear_fraction <= 1.0) {
            return Err(ConfigError::InvalidClearFraction);
        }
        Ok(())
    }
}

impl ForestConfig {
    /// Read and validate a JSON config. Missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let load_error = |reason: String| ConfigError::Load {
            path: path.display().to_string(),
            reason,
        };
        let text = fs::read_to_string(path).map_err(|e| load_error(e.to_string()))?;
        let config: Self = serde_json::from_str(&text).map_err(|e| load_error(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Config named by `FOREST_CONFIG`, or the defaults when it is unset or unusable
    pub fn from_env() -> Self {
        let Some(path) = std::env::var_os(CONFIG_ENV) else {
            return Self::default();
        };
        match Self::from_json_file(Path::new(&path)) {
            Ok(config) => {
                info!(path = %Path::new(&path).display(), "loaded forest config");
                config
            }
            Err(err) => {
                warn!(%err, "using default forest config");
                Self::default()
            }
        }
    }
}

/// Exponential slider scaling: `3^s - 1`, so slider 0 disables the rate
pub fn rate_from_slider(value: f64) -> f64 {
    3f64.powf(value) - 1.0
}

/// Inverse of [`rate_from_slider`]
pub fn slider_from_rate(rate: f64) -> f64 {
    (rate.max(0.0) + 1.0).log(3.0)
}

/// Tick period in milliseconds for the update-rate slider (`2^(7 - s)`)
pub fn tick_period_ms(value: f64) -> f64 {
    2f64.powf(7.0 - value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert_eq!(ForestConfig::default().validate(), Ok(()));
        assert_eq!(ForestConfig::evolving().validate(), Ok(()));
    }

    #[test]
    fn test_cell_size_precondition() {
        let config = ForestConfig {
            cell_size: 99.0,
            ..ForestConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::CellTooSmall {
                cell_size: 99.0,
                max_radius: 50.0
            })
        );
    }

    #[test]
    fn test_species_count_bounds() {
        for bad in [0, MAX_SPECIES + 1] {
            let config = ForestConfig {
                number_species: bad,
                ..ForestConfig::default()
            };
            assert!(matches!(
                config.validate(),
                Err(ConfigError::InvalidSpeciesCount { .. })
            ));
        }
    }

    #[test]
    fn test_invalid_canvas() {
        let config = ForestConfig::default().with_canvas(0.0, 100.0);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidCanvas { .. })
        ));
    }

    #[test]
    fn test_probability_out_of_range() {
        let config = ForestConfig {
            disaster_probability: 1.5,
            ..ForestConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidProbability {
                name: "disaster_probability",
                value: 1.5
            })
        );
    }

    #[test]
    fn test_negative_rate_rejected() {
        let config = ForestConfig {
            death_rate: -1.0,
            ..ForestConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NegativeValue { name: "death_rate", .. })
        ));
    }

    #[test]
    fn test_death_exponent_must_be_positive() {
        for exponent in [0, -1] {
            let config = ForestConfig {
                death_exponent: exponent,
                ..ForestConfig::default()
            };
            assert_eq!(
                config.validate(),
                Err(ConfigError::InvalidDeathExponent(exponent))
            );
        }
        let power_law = ForestConfig {
            death_exponent: 2,
            ..ForestConfig::default()
        };
        assert_eq!(power_law.validate(), Ok(()));
    }

    #[test]
    fn test_with_canvas_resizes_stats_window() {
        let config = ForestConfig::default().with_canvas(320.0, 200.0);
        assert_eq!(config.stats_width, 320);
        assert_eq!(config.clear_radius(), 50.0);
    }

    #[test]
    fn test_slider_scaling() {
        assert_eq!(rate_from_slider(0.0), 0.0);
        assert_eq!(rate_from_slider(1.0), 2.0);
        assert!((rate_from_slider(3.0) - 26.0).abs() < 1e-9);
        assert!((slider_from_rate(26.0) - 3.0).abs() < 1e-9);
        assert_eq!(tick_period_ms(7.0), 1.0);
        assert_eq!(tick_period_ms(0.0), 128.0);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: ForestConfig =
            serde_json::from_str(r#"{"number_species": 4, "policy": "spectrum"}"#).unwrap();
        assert_eq!(config.number_species, 4);
        assert_eq!(config.policy, SpeciesPolicy::Spectrum);
        assert_eq!(config.max_tree_radius, 50.0);
    }

    #[test]
    fn test_load_json_file() {
        let path = std::env::temp_dir().join(format!("forest-config-{}.json", std::process::id()));
        fs::write(&path, r#"{"width": 300, "height": 200, "death_exponent": 2}"#).unwrap();
        let config = ForestConfig::from_json_file(&path).unwrap();
        fs::remove_file(&path).ok();
        assert_eq!(config.width, 300.0);
        assert_eq!(config.death_exponent, 2);
        assert_eq!(config.number_species, 2);
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let path = std::env::temp_dir().join(format!("forest-bad-{}.json", std::process::id()));
        fs::write(&path, r#"{"number_species": 9}"#).unwrap();
        let result = ForestConfig::from_json_file(&path);
        fs::remove_file(&path).ok();
        assert!(matches!(result, Err(ConfigError::InvalidSpeciesCount { .. })));

        let missing = ForestConfig::from_json_file(Path::new("/nonexistent/forest.json"));
        assert!(matches!(missing, Err(ConfigError::Load { .. })));
    }
}
