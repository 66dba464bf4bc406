use crate::config::{ConfigError, ForestConfig};
use crate::debug;
use crate::grid::SpatialIndex;
use crate::species::Rgb;
use crate::stats::StatsSeries;
use crate::surface::{DrawSurface, Raster};
use crate::tree::Tree;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
#[cfg(not(target_arch = "wasm32"))]
use rayon::prelude::*;
use std::f64::consts::PI;
use std::sync::atomic::Ordering;
use tracing::info;

/// A forest of competing tree species on a rectangular canvas.
///
/// One `tick` places a random seed, lets trees spawn children, grows every
/// growing tree up to its nearest neighbour, rolls for deaths and records a
/// statistics sample. Dead trees are erased immediately and dropped from the
/// tree list at the start of the following tick.
pub struct Forest<S: DrawSurface = Raster> {
    config: ForestConfig,

    /// Every tree, including those that died during the last tick
    pub trees: Vec<Tree>,

    surface: S,
    stats: StatsSeries,
    next_id: u64,

    /// Statistics
    pub total_ticks: u64,
    pub total_seeds: u64,
    pub total_births: u64,
    pub total_deaths: u64,
    pub total_clearings: u64,

    rng: SmallRng,
}

impl Forest<Raster> {
    /// Forest drawing onto an in-memory raster, seeded from entropy
    pub fn new(config: ForestConfig) -> Result<Self, ConfigError> {
        let surface = Raster::new(config.width, config.height);
        Self::with_surface(config, surface, SmallRng::from_entropy())
    }

    /// Deterministic forest for reproducible runs
    pub fn with_seed(config: ForestConfig, seed: u64) -> Result<Self, ConfigError> {
        let surface = Raster::new(config.width, config.height);
        Self::with_surface(config, surface, SmallRng::seed_from_u64(seed))
    }

    /// Drop every tree and start over on a canvas of a new size
    pub fn resize(&mut self, width: f64, height: f64) -> Result<(), ConfigError> {
        let config = self.config.clone().with_canvas(width, height);
        config.validate()?;
        self.surface = Raster::new(width, height);
        self.config = config;
        self.reset();
        Ok(())
    }
}

impl<S: DrawSurface> Forest<S> {
    pub fn with_surface(
        config: ForestConfig,
        mut surface: S,
        rng: SmallRng,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        surface.clear();

        let stats = StatsSeries::new(config.stats_width, config.number_species, config.stats_mode);
        info!(
            species = config.number_species,
            width = config.width,
            height = config.height,
            policy = config.policy.name(),
            "forest created"
        );

        Ok(Self {
            config,
            trees: Vec::new(),
            surface,
            stats,
            next_id: 0,
            total_ticks: 0,
            total_seeds: 0,
            total_births: 0,
            total_deaths: 0,
            total_clearings: 0,
            rng,
        })
    }

    pub fn config(&self) -> &ForestConfig {
        &self.config
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn stats(&self) -> &StatsSeries {
        &self.stats
    }

    /// Number of live trees
    pub fn population(&self) -> usize {
        self.trees.iter().filter(|t| t.alive).count()
    }

    /// Colour a tree is painted with under the current policy
    pub fn color_of(&self, tree: &Tree) -> Rgb {
        self.config
            .policy
            .color(tree.species, tree.growth_rate, self.config.number_species)
    }

    /// Colour of a species' statistics line
    pub fn series_color(&self, species: usize) -> Rgb {
        self.config
            .policy
            .series_color(species, self.config.number_species)
    }

    /// Advance the forest by one step
    pub fn tick(&mut self) {
        self.remove_dead();
        self.disaster();
        self.place_seed();
        self.birth_from_parents(self.config.birth_rate);
        self.grow_and_cull();
        self.update_stats();
        self.total_ticks += 1;

        if self.total_ticks % 1000 == 0 {
            debug::log_event(format!(
                "[TICK #{}] pop:{} seeds:{} births:{} deaths:{}",
                self.total_ticks,
                self.population(),
                self.total_seeds,
                self.total_births,
                self.total_deaths
            ));
        }
    }

    /// Drop trees that died since the previous tick; returns how many
    pub fn remove_dead(&mut self) -> usize {
        let before = self.trees.len();
        self.trees.retain(|t| t.alive);
        before - self.trees.len()
    }

    /// With the configured probability, try to drop a seed at a random point
    pub fn place_seed(&mut self) -> Option<u64> {
        if self.rng.gen::<f64>() >= self.config.seed_probability {
            return None;
        }
        let x = self.rng.gen::<f64>() * self.config.width;
        let y = self.rng.gen::<f64>() * self.config.height;
        self.plant(x, y)
    }

    /// Plant a seedling at `(x, y)` unless the spot is already covered.
    /// Species and growth rate come from the species policy and parent weighting.
    pub fn plant(&mut self, x: f64, y: f64) -> Option<u64> {
        if self.surface.is_occupied(x, y) {
            return None;
        }
        let (species, growth_rate) = self.seed_genes(x, y);
        let id = self.spawn(x, y, species, growth_rate);
        self.total_seeds += 1;
        debug::SEEDS.fetch_add(1, Ordering::Relaxed);
        Some(id)
    }

    fn spawn(&mut self, x: f64, y: f64, species: usize, growth_rate: f64) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        let tree = Tree::new(id, x, y, species, growth_rate);
        self.surface.draw_tree(&tree, self.config.erase_padding);
        self.trees.push(tree);
        id
    }

    /// Pick species and growth rate for a seed landing at `(x, y)`
    fn seed_genes(&mut self, x: f64, y: f64) -> (usize, f64) {
        let policy = self.config.policy;
        let n = self.config.number_species;
        let needs_index = self.config.parent_weighting || policy.inherits_from_parents();
        let index = needs_index.then(|| self.index());

        if let Some(index) = index.as_ref().filter(|_| policy.inherits_from_parents()) {
            let reach = 2.0 * self.config.max_tree_radius;
            let disk: Vec<usize> = index
                .near(x, y)
                .iter()
                .copied()
                .filter(|&i| self.trees[i].alive && self.trees[i].distance_to(x, y) < reach)
                .collect();
            if disk.len() >= self.config.evolving_min_neighbors.max(1) {
                let pick = disk[self.rng.gen_range(0..disk.len())];
                let (species, rate) = (self.trees[pick].species, self.trees[pick].growth_rate);
                return (species, policy.mutate(rate, self.config.mutation_sd, &mut self.rng));
            }
        }

        // Evolving seeds without a crowd pick their species uniformly
        let weighted = self.config.parent_weighting && !policy.inherits_from_parents();
        let species = match index.as_ref().filter(|_| weighted) {
            Some(index) => {
                let (u, v) = index.cell_of(x, y);
                self.weighted_parent_selection(index, u, v)
            }
            None => self.rng.gen_range(0..n),
        };
        let rate = policy.initial_growth_rate(species, n);
        (species, policy.mutate(rate, self.config.mutation_sd, &mut self.rng))
    }

    /// Fresh spatial index over the current trees
    pub fn index(&self) -> SpatialIndex {
        SpatialIndex::rebuild(
            &self.trees,
            self.config.cell_size,
            self.config.width,
            self.config.height,
        )
    }

    /// Per-species selection weights for cell `(u, v)`: the floor weight plus
    /// the area of every live same-species tree listed in that cell
    pub fn species_weights(&self, index: &SpatialIndex, u: usize, v: usize) -> Vec<f64> {
        let mut weights = vec![self.config.parent_floor_weight; self.config.number_species];
        for tree in index.query(u, v).iter().filter_map(|&i| self.trees.get(i)) {
            if tree.alive && tree.species < weights.len() {
                weights[tree.species] += tree.area();
            }
        }
        weights
    }

    /// Draw a species with probability proportional to its weight in cell `(u, v)`
    pub fn weighted_parent_selection(&mut self, index: &SpatialIndex, u: usize, v: usize) -> usize {
        let n = self.config.number_species;
        let mut running = 0.0;
        let cumulative: Vec<f64> = self
            .species_weights(index, u, v)
            .into_iter()
            .map(|w| {
                running += w;
                running
            })
            .collect();

        let total = cumulative.last().copied().unwrap_or(0.0);
        if !(total > 0.0 && total.is_finite()) {
            return self.rng.gen_range(0..n);
        }
        let target = self.rng.gen::<f64>() * total;
        cumulative
            .iter()
            .position(|&w| w > target)
            .unwrap_or(n - 1)
    }

    /// Every live tree may drop a child nearby with probability
    /// `birth_rate * area / 1e5`. Children land within `max_tree_radius`.
    pub fn birth_from_parents(&mut self, birth_rate: f64) -> usize {
        let max_radius = self.config.max_tree_radius;
        let (width, height) = (self.config.width, self.config.height);
        let mut born = Vec::new();

        for parent in self.trees.iter().filter(|t| t.alive) {
            if self.rng.gen::<f64>() >= birth_rate * parent.area() / 1e5 {
                continue;
            }
            let r = self.rng.gen::<f64>() * max_radius;
            let theta = self.rng.gen::<f64>() * 2.0 * PI;
            let x = parent.x + r * theta.cos();
            let y = parent.y + r * theta.sin();

            let in_bounds = (0.0..=width).contains(&x) && (0.0..=height).contains(&y);
            if !in_bounds || self.surface.is_occupied(x, y) {
                continue;
            }

            let growth_rate =
                self.config
                    .policy
                    .mutate(parent.growth_rate, self.config.mutation_sd, &mut self.rng);
            let child = Tree::new(self.next_id, x, y, parent.species, growth_rate);
            self.next_id += 1;
            self.surface.draw_tree(&child, self.config.erase_padding);
            born.push(child);
        }

        let count = born.len();
        self.trees.extend(born);
        self.total_births += count as u64;
        debug::BIRTHS.fetch_add(count as u64, Ordering::Relaxed);
        count
    }

    /// Rebuild the grid, grow every growing tree toward its nearest
    /// neighbour, roll for deaths and repaint. Returns the number of deaths.
    pub fn grow_and_cull(&mut self) -> usize {
        let index = self.index();
        let closest = closest_neighbor_distances(&self.trees, &index);

        let config = &self.config;
        let mut deaths = 0;
        for (tree, closest) in self.trees.iter_mut().zip(closest) {
            if !tree.alive {
                continue;
            }
            if let Some(distance) = closest {
                tree.closest_neighbor_distance = distance;
                let draw = self.rng.gen::<f64>();
                tree.grow(
                    draw,
                    config.growth_divisor,
                    config.max_tree_radius,
                    config.width,
                    config.height,
                );
            }
            tree.age(config.death_rate, config.death_exponent, self.rng.gen::<f64>());
            if !tree.alive {
                deaths += 1;
            }
        }

        self.total_deaths += deaths as u64;
        debug::DEATHS.fetch_add(deaths as u64, Ordering::Relaxed);
        self.redraw();
        deaths
    }

    /// Erase dead trees, then paint live ones over any pixels the erasing took
    pub fn redraw(&mut self) {
        let padding = self.config.erase_padding;
        for tree in self.trees.iter().filter(|t| !t.alive) {
            self.surface.draw_tree(tree, padding);
        }
        for tree in self.trees.iter().filter(|t| t.alive) {
            self.surface.draw_tree(tree, padding);
        }
    }

    /// Kill every tree whose centre is within the clear-cut radius of `(cx, cy)`
    pub fn clear_area(&mut self, cx: f64, cy: f64) -> usize {
        let radius = self.config.clear_radius();
        let mut killed = 0;
        for tree in self.trees.iter_mut().filter(|t| t.alive) {
            if tree.distance_to(cx, cy) < radius {
                tree.kill();
                killed += 1;
            }
        }

        self.total_deaths += killed as u64;
        self.total_clearings += 1;
        debug::DEATHS.fetch_add(killed as u64, Ordering::Relaxed);
        debug::CLEARINGS.fetch_add(1, Ordering::Relaxed);
        debug::log_event(format!(
            "[CLEAR] ({:.0},{:.0}) radius:{:.0} killed:{}",
            cx, cy, radius, killed
        ));
        self.redraw();
        killed
    }

    /// With the configured probability, clear-cut a random point
    pub fn disaster(&mut self) -> Option<(f64, f64)> {
        if self.rng.gen::<f64>() >= self.config.disaster_probability {
            return None;
        }
        let x = self.rng.gen::<f64>() * self.config.width;
        let y = self.rng.gen::<f64>() * self.config.height;
        info!(x, y, tick = self.total_ticks, "disaster");
        self.clear_area(x, y);
        Some((x, y))
    }

    /// Push a new statistics sample computed from the live trees
    pub fn update_stats(&mut self) {
        let canvas_area = self.config.width * self.config.height;
        self.stats.record(&self.trees, canvas_area);
    }

    /// Remove every tree, wipe the surface and zero the statistics window
    pub fn reset(&mut self) {
        self.trees.clear();
        self.surface.clear();
        self.stats = StatsSeries::new(
            self.config.stats_width,
            self.config.number_species,
            self.config.stats_mode,
        );
        info!(species = self.config.number_species, "forest reset");
        debug::log_event(format!(
            "[RESET] species:{} policy:{}",
            self.config.number_species,
            self.config.policy.name()
        ));
    }

    pub fn set_birth_rate(&mut self, rate: f64) {
        self.config.birth_rate = rate.max(0.0);
    }

    /// Applies to every tree from the next tick on
    pub fn set_death_rate(&mut self, rate: f64) {
        self.config.death_rate = rate.max(0.0);
    }

    pub fn set_parent_weighting(&mut self, enabled: bool) {
        self.config.parent_weighting = enabled;
    }

    pub fn set_disaster_probability(&mut self, probability: f64) {
        self.config.disaster_probability = probability.clamp(0.0, 1.0);
    }

    /// Changing the species count starts a new forest
    pub fn set_number_species(&mut self, number_species: usize) -> Result<(), ConfigError> {
        if number_species == self.config.number_species {
            return Ok(());
        }
        let config = ForestConfig {
            number_species,
            ..self.config.clone()
        };
        config.validate()?;
        tracing::debug!(
            from = self.config.number_species,
            to = number_species,
            "species count changed"
        );
        self.config = config;
        self.reset();
        Ok(())
    }

    /// Switching policy changes colours and growth rates, so it starts a new forest
    pub fn set_policy(&mut self, config: ForestConfig) -> Result<(), ConfigError> {
        config.validate()?;
        self.config = ForestConfig {
            width: self.config.width,
            height: self.config.height,
            stats_width: self.config.stats_width,
            ..config
        };
        self.reset();
        Ok(())
    }
}

/// Edge distance from each growing tree to its closest neighbour in the same
/// grid cell. `None` for trees that are dead or no longer growing.
#[cfg(not(target_arch = "wasm32"))]
fn closest_neighbor_distances(trees: &[Tree], index: &SpatialIndex) -> Vec<Option<f64>> {
    trees
        .par_iter()
        .enumerate()
        .map(|(i, tree)| closest_neighbor(i, tree, trees, index))
        .collect()
}

#[cfg(target_arch = "wasm32")]
fn closest_neighbor_distances(trees: &[Tree], index: &SpatialIndex) -> Vec<Option<f64>> {
    trees
        .iter()
        .enumerate()
        .map(|(i, tree)| closest_neighbor(i, tree, trees, index))
        .collect()
}

fn closest_neighbor(i: usize, tree: &Tree, trees: &[Tree], index: &SpatialIndex) -> Option<f64> {
    if !(tree.alive && tree.growing) {
        return None;
    }
    let closest = index
        .near(tree.x, tree.y)
        .iter()
        .filter(|&&j| j != i && trees[j].alive)
        .map(|&j| tree.edge_distance(&trees[j]))
        // An exact zero only arises from coincident edges; treat it as absent
        .filter(|&d| d != 0.0)
        .fold(f64::INFINITY, f64::min);
    Some(closest)
}
