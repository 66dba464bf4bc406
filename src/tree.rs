use std::f64::consts::PI;

/// A single circular tree on the forest floor
#[derive(Debug, Clone, PartialEq)]
pub struct Tree {
    /// Unique id within one forest run
    pub id: u64,

    /// Centre position, fixed at birth
    pub x: f64,
    pub y: f64,

    /// Current radius - never shrinks while the tree is alive
    pub r: f64,

    /// Species index in `0..number_species`
    pub species: usize,

    /// Growth rate in [0, 1]; faster growers also die sooner
    pub growth_rate: f64,

    /// Accumulated probability of death, checked against a fresh draw every tick
    pub death_prob: f64,

    /// Edge distance to the closest neighbour at the last grid rebuild
    pub closest_neighbor_distance: f64,

    /// False once the tree has been capped (dormant); never flips back
    pub growing: bool,

    /// False once the tree has died; never flips back
    pub alive: bool,
}

impl Tree {
    /// Create a seedling of radius 1
    pub fn new(id: u64, x: f64, y: f64, species: usize, growth_rate: f64) -> Self {
        Self {
            id,
            x,
            y,
            r: 1.0,
            species,
            growth_rate,
            death_prob: 0.0,
            closest_neighbor_distance: f64::INFINITY,
            growing: true,
            alive: true,
        }
    }

    pub fn area(&self) -> f64 {
        PI * self.r * self.r
    }

    /// Distance from the centre to a point
    pub fn distance_to(&self, x: f64, y: f64) -> f64 {
        ((self.x - x).powi(2) + (self.y - y).powi(2)).sqrt()
    }

    /// Distance from this tree's centre to the edge of `other`
    pub fn edge_distance(&self, other: &Tree) -> f64 {
        self.distance_to(other.x, other.y) - other.r
    }

    /// Whether the whole disc lies inside a `width` x `height` canvas
    pub fn is_contained_in(&self, width: f64, height: f64) -> bool {
        self.x - self.r >= 0.0
            && self.x + self.r <= width
            && self.y - self.r >= 0.0
            && self.y + self.r <= height
    }

    /// Whether the tree may grow this tick given its cached neighbour distance
    pub fn can_grow(&self, max_radius: f64, width: f64, height: f64) -> bool {
        self.r < max_radius
            && self.r < self.closest_neighbor_distance
            && self.is_contained_in(width, height)
    }

    /// Grow by `growth_rate * draw / divisor`, or go dormant if capped.
    /// `draw` is a uniform sample in [0, 1).
    pub fn grow(&mut self, draw: f64, divisor: f64, max_radius: f64, width: f64, height: f64) {
        if self.can_grow(max_radius, width, height) {
            // Never step past the global cap or into the closest neighbour
            let limit = max_radius.min(self.closest_neighbor_distance.max(self.r));
            self.r = (self.r + self.growth_rate * draw / divisor).min(limit);
        } else {
            self.growing = false;
        }
    }

    /// Add this tick's death probability and roll for death with `draw`
    pub fn age(&mut self, death_rate: f64, exponent: i32, draw: f64) {
        self.death_prob += death_rate * self.growth_rate.powi(exponent) / 1e6;
        if draw < self.death_prob {
            self.alive = false;
        }
    }

    /// Kill the tree outright (clear-cuts, disasters)
    pub fn kill(&mut self) {
        self.alive = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_tree_is_seedling() {
        let tree = Tree::new(3, 10.0, 20.0, 1, 0.75);
        assert_eq!(tree.id, 3);
        assert_eq!(tree.r, 1.0);
        assert_eq!(tree.death_prob, 0.0);
        assert!(tree.alive);
        assert!(tree.growing);
        assert!(tree.closest_neighbor_distance.is_infinite());
    }

    #[test]
    fn test_area() {
        let mut tree = Tree::new(0, 0.0, 0.0, 0, 0.5);
        tree.r = 2.0;
        assert!((tree.area() - 4.0 * PI).abs() < 1e-12);
    }

    #[test]
    fn test_edge_distance_subtracts_other_radius() {
        let a = Tree::new(0, 0.0, 0.0, 0, 0.5);
        let mut b = Tree::new(1, 3.0, 4.0, 0, 0.5);
        b.r = 2.0;
        assert_eq!(a.distance_to(3.0, 4.0), 5.0);
        assert_eq!(a.edge_distance(&b), 3.0);
    }

    #[test]
    fn test_containment() {
        let mut tree = Tree::new(0, 5.0, 5.0, 0, 0.5);
        assert!(tree.is_contained_in(10.0, 10.0));
        tree.r = 5.0;
        assert!(tree.is_contained_in(10.0, 10.0));
        tree.r = 5.1;
        assert!(!tree.is_contained_in(10.0, 10.0));
    }

    #[test]
    fn test_grow_increments_radius() {
        let mut tree = Tree::new(0, 50.0, 50.0, 0, 1.0);
        tree.grow(0.5, 5.0, 50.0, 100.0, 100.0);
        assert!((tree.r - 1.1).abs() < 1e-12);
        assert!(tree.growing);
    }

    #[test]
    fn test_grow_stops_at_neighbor() {
        let mut tree = Tree::new(0, 50.0, 50.0, 0, 1.0);
        tree.closest_neighbor_distance = 1.0;
        tree.grow(0.9, 5.0, 50.0, 100.0, 100.0);
        assert_eq!(tree.r, 1.0);
        assert!(!tree.growing);
    }

    #[test]
    fn test_grow_stops_exactly_at_neighbor() {
        let mut tree = Tree::new(0, 50.0, 50.0, 0, 1.0);
        tree.closest_neighbor_distance = 1.05;
        tree.grow(0.99, 1.0, 50.0, 100.0, 100.0);
        assert_eq!(tree.r, 1.05);
        assert!(tree.growing);
        tree.grow(0.99, 1.0, 50.0, 100.0, 100.0);
        assert_eq!(tree.r, 1.05);
        assert!(!tree.growing);
    }

    #[test]
    fn test_grow_never_exceeds_max_radius() {
        let mut tree = Tree::new(0, 50.0, 50.0, 0, 1.0);
        tree.r = 9.99;
        tree.grow(0.99, 1.0, 10.0, 100.0, 100.0);
        assert_eq!(tree.r, 10.0);
        tree.grow(0.99, 1.0, 10.0, 100.0, 100.0);
        assert_eq!(tree.r, 10.0);
        assert!(!tree.growing);
    }

    #[test]
    fn test_grow_stops_at_canvas_edge() {
        let mut tree = Tree::new(0, 0.5, 50.0, 0, 1.0);
        tree.grow(0.5, 5.0, 50.0, 100.0, 100.0);
        assert!(!tree.growing);
    }

    #[test]
    fn test_age_accumulates_and_kills() {
        let mut tree = Tree::new(0, 0.0, 0.0, 0, 0.5);
        tree.age(2.0, 1, 0.5);
        assert!((tree.death_prob - 1e-6).abs() < 1e-18);
        assert!(tree.alive);

        tree.age(2.0, 1, 0.0);
        assert!(!tree.alive);
    }

    #[test]
    fn test_age_power_law() {
        let mut tree = Tree::new(0, 0.0, 0.0, 0, 0.5);
        tree.age(4.0, 2, 0.9);
        assert!((tree.death_prob - 1e-6).abs() < 1e-18);
    }

    #[test]
    fn test_zero_death_rate_never_kills() {
        let mut tree = Tree::new(0, 0.0, 0.0, 0, 1.0);
        for _ in 0..1000 {
            tree.age(0.0, 1, 0.0);
        }
        assert!(tree.alive);
    }
}
