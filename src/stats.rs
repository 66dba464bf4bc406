use crate::tree::Tree;
#[cfg(not(target_arch = "wasm32"))]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Which per-species aggregate the statistics window records
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatsMode {
    /// Summed tree area divided by canvas area
    #[default]
    AreaProportion,
    /// Mean growth rate of live trees (0 for an empty species)
    MeanGrowthRate,
}

impl StatsMode {
    pub fn name(&self) -> &'static str {
        match self {
            StatsMode::AreaProportion => "Area proportion",
            StatsMode::MeanGrowthRate => "Mean growth rate",
        }
    }
}

/// Sliding window of per-species samples, oldest first
#[derive(Debug, Clone)]
pub struct StatsSeries {
    mode: StatsMode,
    number_species: usize,
    samples: VecDeque<Vec<f64>>,
}

impl StatsSeries {
    /// Window of `len` zeroed samples
    pub fn new(len: usize, number_species: usize, mode: StatsMode) -> Self {
        Self {
            mode,
            number_species,
            samples: (0..len).map(|_| vec![0.0; number_species]).collect(),
        }
    }

    pub fn mode(&self) -> StatsMode {
        self.mode
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn number_species(&self) -> usize {
        self.number_species
    }

    /// Evict the oldest sample and append one computed from `trees`
    pub fn record(&mut self, trees: &[Tree], canvas_area: f64) {
        let sample = match self.mode {
            StatsMode::AreaProportion => {
                let mut areas = species_sums(trees, self.number_species, |t| t.area());
                for area in &mut areas {
                    *area /= canvas_area;
                }
                areas
            }
            StatsMode::MeanGrowthRate => {
                let sums = species_sums(trees, self.number_species, |t| t.growth_rate);
                let counts = species_sums(trees, self.number_species, |_| 1.0);
                sums.iter()
                    .zip(&counts)
                    .map(|(sum, &n)| if n > 0.0 { sum / n } else { 0.0 })
                    .collect()
            }
        };
        self.push(sample);
    }

    fn push(&mut self, sample: Vec<f64>) {
        if self.samples.is_empty() {
            return;
        }
        self.samples.pop_front();
        self.samples.push_back(sample);
    }

    /// Most recent sample
    pub fn latest(&self) -> Option<&[f64]> {
        self.samples.back().map(|s| s.as_slice())
    }

    /// One species' values, oldest first
    pub fn species_series(&self, species: usize) -> impl Iterator<Item = f64> + '_ {
        self.samples
            .iter()
            .map(move |s| s.get(species).copied().unwrap_or(0.0))
    }
}

/// Sum `value` over live trees per species (parallel)
#[cfg(not(target_arch = "wasm32"))]
fn species_sums(
    trees: &[Tree],
    number_species: usize,
    value: impl Fn(&Tree) -> f64 + Sync,
) -> Vec<f64> {
    trees
        .par_iter()
        .filter(|t| t.alive && t.species < number_species)
        .fold(
            || vec![0.0; number_species],
            |mut acc, t| {
                acc[t.species] += value(t);
                acc
            },
        )
        .reduce(
            || vec![0.0; number_species],
            |mut acc, part| {
                for (a, p) in acc.iter_mut().zip(part) {
                    *a += p;
                }
                acc
            },
        )
}

/// Sum `value` over live trees per species (sequential on wasm)
#[cfg(target_arch = "wasm32")]
fn species_sums(
    trees: &[Tree],
    number_species: usize,
    value: impl Fn(&Tree) -> f64,
) -> Vec<f64> {
    let mut acc = vec![0.0; number_species];
    for t in trees.iter().filter(|t| t.alive && t.species < number_species) {
        acc[t.species] += value(t);
    }
    acc
}
