/// Diagnostic tools for analyzing forest composition

use crate::forest::Forest;
use crate::surface::DrawSurface;

/// Per-species summary of the live trees
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SpeciesSummary {
    pub count: usize,
    pub growing: usize,
    pub total_area: f64,
    pub radius_sum: f64,
    pub growth_rate_sum: f64,
    pub min_growth_rate: f64,
    pub max_growth_rate: f64,
}

impl SpeciesSummary {
    pub fn mean_radius(&self) -> f64 {
        if self.count > 0 {
            self.radius_sum / self.count as f64
        } else {
            0.0
        }
    }

    pub fn mean_growth_rate(&self) -> f64 {
        if self.count > 0 {
            self.growth_rate_sum / self.count as f64
        } else {
            0.0
        }
    }
}

/// Snapshot of a forest for console reports
#[derive(Debug, Default, Clone)]
pub struct ForestReport {
    pub ticks: u64,
    pub population: usize,
    pub canvas_area: f64,
    pub species: Vec<SpeciesSummary>,
}

/// Analyze the live trees of a forest
pub fn analyze<S: DrawSurface>(forest: &Forest<S>) -> ForestReport {
    let config = forest.config();
    let mut species: Vec<SpeciesSummary> = (0..config.number_species)
        .map(|_| SpeciesSummary {
            min_growth_rate: f64::INFINITY,
            max_growth_rate: f64::NEG_INFINITY,
            ..SpeciesSummary::default()
        })
        .collect();

    let mut population = 0;
    for tree in forest.trees.iter().filter(|t| t.alive) {
        population += 1;
        let Some(summary) = species.get_mut(tree.species) else {
            continue;
        };
        summary.count += 1;
        if tree.growing {
            summary.growing += 1;
        }
        summary.total_area += tree.area();
        summary.radius_sum += tree.r;
        summary.growth_rate_sum += tree.growth_rate;
        summary.min_growth_rate = summary.min_growth_rate.min(tree.growth_rate);
        summary.max_growth_rate = summary.max_growth_rate.max(tree.growth_rate);
    }

    ForestReport {
        ticks: forest.total_ticks,
        population,
        canvas_area: config.width * config.height,
        species,
    }
}

impl ForestReport {
    /// Fraction of the canvas covered by live trees
    pub fn coverage(&self) -> f64 {
        let area: f64 = self.species.iter().map(|s| s.total_area).sum();
        if self.canvas_area > 0.0 {
            area / self.canvas_area
        } else {
            0.0
        }
    }

    pub fn print_report(&self) {
        println!("\n=== Forest Composition (tick {}) ===", self.ticks);
        println!("Live trees: {}", self.population);
        println!("Canvas coverage: {:.1}%", 100.0 * self.coverage());
        for (i, s) in self.species.iter().enumerate() {
            if s.count == 0 {
                println!("  species {}: extinct", i);
                continue;
            }
            println!(
                "  species {}: {} trees ({} growing), {:.1}% of canvas, mean r {:.1}, growth {:.3} [{:.3}..{:.3}]",
                i,
                s.count,
                s.growing,
                100.0 * s.total_area / self.canvas_area,
                s.mean_radius(),
                s.mean_growth_rate(),
                s.min_growth_rate,
                s.max_growth_rate
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ForestConfig;
    use crate::tree::Tree;

    #[test]
    fn test_empty_forest_report() {
        let forest = Forest::with_seed(ForestConfig::default(), 1).unwrap();
        let report = analyze(&forest);
        assert_eq!(report.population, 0);
        assert_eq!(report.species.len(), 2);
        assert_eq!(report.coverage(), 0.0);
        assert_eq!(report.species[0].mean_radius(), 0.0);
    }

    #[test]
    fn test_report_groups_by_species() {
        let config = ForestConfig::default().with_canvas(100.0, 100.0);
        let mut forest = Forest::with_seed(config, 1).unwrap();
        forest.trees.push(Tree::new(0, 10.0, 10.0, 0, 0.2));
        forest.trees.push(Tree::new(1, 30.0, 10.0, 0, 0.4));
        forest.trees.push(Tree::new(2, 50.0, 10.0, 1, 0.9));
        let mut dead = Tree::new(3, 70.0, 10.0, 1, 0.1);
        dead.kill();
        forest.trees.push(dead);

        let report = analyze(&forest);
        assert_eq!(report.population, 3);
        assert_eq!(report.species[0].count, 2);
        assert!((report.species[0].mean_growth_rate() - 0.3).abs() < 1e-12);
        assert_eq!(report.species[0].min_growth_rate, 0.2);
        assert_eq!(report.species[0].max_growth_rate, 0.4);
        assert_eq!(report.species[1].count, 1);
        assert_eq!(report.species[1].max_growth_rate, 0.9);
        assert!(report.coverage() > 0.0);
    }
}
