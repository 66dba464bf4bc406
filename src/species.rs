use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

/// Plain RGB colour, independent of any rendering backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

const DARK_ORANGE: Rgb = Rgb(255, 140, 0);
const DARK_TURQUOISE: Rgb = Rgb(0, 206, 209);
const PALE_GREEN: Rgb = Rgb(152, 251, 152);
const BLUE_VIOLET: Rgb = Rgb(138, 43, 226);
const TURQUOISE: Rgb = Rgb(64, 224, 208);
const GREEN: Rgb = Rgb(0, 128, 0);
const GOLD: Rgb = Rgb(255, 215, 0);
const FIREBRICK: Rgb = Rgb(178, 34, 34);

/// Named palettes indexed by species count, slow growers first
const PALETTES: [&[Rgb]; 6] = [
    &[DARK_ORANGE],
    &[DARK_TURQUOISE, DARK_ORANGE],
    &[DARK_TURQUOISE, PALE_GREEN, DARK_ORANGE],
    &[BLUE_VIOLET, TURQUOISE, PALE_GREEN, DARK_ORANGE],
    &[BLUE_VIOLET, TURQUOISE, GREEN, GOLD, DARK_ORANGE],
    &[BLUE_VIOLET, TURQUOISE, GREEN, GOLD, DARK_ORANGE, FIREBRICK],
];

/// Channel masks for the evolving policy: blue, red, then extras
const EVOLVING_CHANNELS: [(u8, u8, u8); 6] = [
    (0, 0, 1),
    (1, 0, 0),
    (0, 1, 0),
    (1, 1, 0),
    (1, 0, 1),
    (0, 1, 1),
];

/// How species are coloured, seeded and varied between generations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeciesPolicy {
    /// Fixed named colour per species, fixed growth rate
    #[default]
    Palette,
    /// Hue sweeps from violet (slow) to red (fast), fixed growth rate
    Spectrum,
    /// Growth rate is inherited from a parent and mutated with Gaussian noise
    Evolving,
}

impl SpeciesPolicy {
    /// Baseline growth rate: evenly spaced midpoints of [0, 1]
    pub fn initial_growth_rate(&self, species: usize, number_species: usize) -> f64 {
        (2 * species + 1) as f64 / (2 * number_species.max(1)) as f64
    }

    /// Colour of an individual tree
    pub fn color(&self, species: usize, growth_rate: f64, number_species: usize) -> Rgb {
        match self {
            SpeciesPolicy::Palette => palette_color(species, number_species),
            SpeciesPolicy::Spectrum => hue_color(280.0 * (1.0 - growth_rate)),
            SpeciesPolicy::Evolving => {
                let intensity = (128.0 + growth_rate.clamp(0.0, 1.0) * 128.0).min(255.0) as u8;
                evolving_color(species, intensity)
            }
        }
    }

    /// Colour used for a species' line in the statistics graph
    pub fn series_color(&self, species: usize, number_species: usize) -> Rgb {
        match self {
            SpeciesPolicy::Evolving => evolving_color(species, 0xC0),
            _ => self.color(
                species,
                self.initial_growth_rate(species, number_species),
                number_species,
            ),
        }
    }

    /// Whether new seeds draw their genes from nearby parents
    pub fn inherits_from_parents(&self) -> bool {
        matches!(self, SpeciesPolicy::Evolving)
    }

    /// Perturb an inherited growth rate; identity unless evolving
    pub fn mutate<R: Rng>(&self, growth_rate: f64, sd: f64, rng: &mut R) -> f64 {
        match self {
            SpeciesPolicy::Evolving => {
                let noise: f64 = rng.sample(StandardNormal);
                (growth_rate + sd * noise).clamp(0.0, 1.0)
            }
            _ => growth_rate,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SpeciesPolicy::Palette => "Palette",
            SpeciesPolicy::Spectrum => "Spectrum",
            SpeciesPolicy::Evolving => "Evolving",
        }
    }

    pub fn all() -> [SpeciesPolicy; 3] {
        [
            SpeciesPolicy::Palette,
            SpeciesPolicy::Spectrum,
            SpeciesPolicy::Evolving,
        ]
    }
}

fn palette_color(species: usize, number_species: usize) -> Rgb {
    let palette = PALETTES[number_species.clamp(1, PALETTES.len()) - 1];
    palette[species.min(palette.len() - 1)]
}

fn evolving_color(species: usize, intensity: u8) -> Rgb {
    let (r, g, b) = EVOLVING_CHANNELS[species % EVOLVING_CHANNELS.len()];
    Rgb(r * intensity, g * intensity, b * intensity)
}

/// Fully saturated colour at half lightness for a hue in degrees
fn hue_color(hue: f64) -> Rgb {
    let h = hue.rem_euclid(360.0) / 60.0;
    let x = 1.0 - (h % 2.0 - 1.0).abs();
    let (r, g, b) = match h as u32 {
        0 => (1.0, x, 0.0),
        1 => (x, 1.0, 0.0),
        2 => (0.0, 1.0, x),
        3 => (0.0, x, 1.0),
        4 => (x, 0.0, 1.0),
        _ => (1.0, 0.0, x),
    };
    let to_byte = |c: f64| (c * 255.0).round() as u8;
    Rgb(to_byte(r), to_byte(g), to_byte(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn test_initial_growth_rates_are_midpoints() {
        let policy = SpeciesPolicy::Palette;
        assert_eq!(policy.initial_growth_rate(0, 1), 0.5);
        assert_eq!(policy.initial_growth_rate(0, 2), 0.25);
        assert_eq!(policy.initial_growth_rate(1, 2), 0.75);
    }

    #[test]
    fn test_palette_matches_species_count() {
        let policy = SpeciesPolicy::Palette;
        assert_eq!(policy.color(0, 0.5, 1), DARK_ORANGE);
        assert_eq!(policy.color(0, 0.25, 2), DARK_TURQUOISE);
        assert_eq!(policy.color(5, 0.9, 6), FIREBRICK);
        // out-of-range species fall back to the last colour
        assert_eq!(policy.color(9, 0.9, 2), DARK_ORANGE);
    }

    #[test]
    fn test_spectrum_endpoints() {
        let policy = SpeciesPolicy::Spectrum;
        assert_eq!(policy.color(0, 1.0, 2), Rgb(255, 0, 0));
        assert_eq!(policy.color(0, 1.0 - 120.0 / 280.0, 2), Rgb(0, 255, 0));
    }

    #[test]
    fn test_evolving_shading() {
        let policy = SpeciesPolicy::Evolving;
        assert_eq!(policy.color(0, 0.0, 2), Rgb(0, 0, 128));
        assert_eq!(policy.color(1, 1.0, 2), Rgb(255, 0, 0));
        assert_eq!(policy.series_color(0, 2), Rgb(0, 0, 0xC0));
        assert_eq!(policy.series_color(1, 2), Rgb(0xC0, 0, 0));
    }

    #[test]
    fn test_mutation_only_when_evolving() {
        let mut rng = SmallRng::seed_from_u64(7);
        assert_eq!(SpeciesPolicy::Palette.mutate(0.3, 0.5, &mut rng), 0.3);
        assert_eq!(SpeciesPolicy::Spectrum.mutate(0.3, 0.5, &mut rng), 0.3);

        let mut changed = false;
        for _ in 0..100 {
            let rate = SpeciesPolicy::Evolving.mutate(0.3, 0.5, &mut rng);
            assert!((0.0..=1.0).contains(&rate));
            changed |= rate != 0.3;
        }
        assert!(changed);
    }

    #[test]
    fn test_zero_sd_mutation_is_identity() {
        let mut rng = SmallRng::seed_from_u64(1);
        assert_eq!(SpeciesPolicy::Evolving.mutate(0.4, 0.0, &mut rng), 0.4);
    }
}
