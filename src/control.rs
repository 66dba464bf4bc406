use crate::config::{
    rate_from_slider, slider_from_rate, tick_period_ms, ConfigError, ForestConfig,
};
use crate::forest::Forest;
use crate::species::SpeciesPolicy;
use crate::stats::StatsMode;
use crate::surface::DrawSurface;

/// Disaster chance per tick when disasters are switched on
pub const DISASTER_PROBABILITY: f64 = 0.001;

/// User-adjustable knobs. Slider values are stored raw and converted on apply.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlPanel {
    /// Exponential slider in [0, 6]; rate = 3^s - 1
    pub birth_slider: f64,
    /// Exponential slider in [0, 6]; rate = 3^s - 1
    pub death_slider: f64,
    pub number_species: usize,
    pub parent_weighting: bool,
    pub disasters: bool,
    /// Update-rate slider in [0, 6]; period = 2^(7 - s) ms
    pub update_slider: f64,
    pub policy: SpeciesPolicy,
}

impl ControlPanel {
    /// Panel mirroring the current settings of `config`
    pub fn from_config(config: &ForestConfig) -> Self {
        Self {
            birth_slider: slider_from_rate(config.birth_rate),
            death_slider: slider_from_rate(config.death_rate),
            number_species: config.number_species,
            parent_weighting: config.parent_weighting,
            disasters: config.disaster_probability > 0.0,
            update_slider: 3.0,
            policy: config.policy,
        }
    }

    pub fn birth_rate(&self) -> f64 {
        rate_from_slider(self.birth_slider)
    }

    pub fn death_rate(&self) -> f64 {
        rate_from_slider(self.death_slider)
    }

    pub fn tick_period_ms(&self) -> f64 {
        tick_period_ms(self.update_slider)
    }

    /// Push the panel's values into `forest`. A new species count or policy
    /// restarts the forest; rates take effect on the next tick.
    pub fn apply<S: DrawSurface>(&self, forest: &mut Forest<S>) -> Result<(), ConfigError> {
        if self.policy != forest.config().policy {
            // Only the policy-specific fields change; loaded tunables carry over
            let (stats_mode, number_species) = match self.policy {
                SpeciesPolicy::Evolving => {
                    let preset = ForestConfig::evolving();
                    (preset.stats_mode, preset.number_species)
                }
                _ => (StatsMode::AreaProportion, self.number_species),
            };
            forest.set_policy(ForestConfig {
                policy: self.policy,
                stats_mode,
                number_species,
                ..forest.config().clone()
            })?;
        }
        forest.set_number_species(self.number_species)?;
        forest.set_birth_rate(self.birth_rate());
        forest.set_death_rate(self.death_rate());
        forest.set_parent_weighting(self.parent_weighting);
        forest.set_disaster_probability(if self.disasters {
            DISASTER_PROBABILITY
        } else {
            0.0
        });
        Ok(())
    }
}
