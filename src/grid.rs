use crate::tree::Tree;

/// Uniform grid over the canvas. Each cell lists every tree whose own cell is
/// within one step of it, so a single lookup covers the 3x3 neighbourhood.
///
/// Rebuilt from scratch every tick; there is no removal or point update.
/// Correct only while `cell_size >= 2 * max_tree_radius`.
#[derive(Debug, Clone)]
pub struct SpatialIndex {
    cell_size: f64,
    grid_width: usize,
    grid_height: usize,
    /// Flat array of cells, index = u * grid_height + v
    cells: Vec<Vec<usize>>,
}

impl SpatialIndex {
    /// Empty grid covering a `width` x `height` canvas
    pub fn new(cell_size: f64, width: f64, height: f64) -> Self {
        let grid_width = ((width / cell_size).ceil() as usize).max(1);
        let grid_height = ((height / cell_size).ceil() as usize).max(1);

        Self {
            cell_size,
            grid_width,
            grid_height,
            cells: vec![Vec::new(); grid_width * grid_height],
        }
    }

    /// Build a grid holding the index of every tree in `trees`
    pub fn rebuild(trees: &[Tree], cell_size: f64, width: f64, height: f64) -> Self {
        let mut index = Self::new(cell_size, width, height);

        for (i, tree) in trees.iter().enumerate() {
            let (u, v) = index.cell_of(tree.x, tree.y);
            let u_lower = u.saturating_sub(1);
            let u_upper = (u + 1).min(index.grid_width - 1);
            let v_lower = v.saturating_sub(1);
            let v_upper = (v + 1).min(index.grid_height - 1);

            for cu in u_lower..=u_upper {
                for cv in v_lower..=v_upper {
                    let key = index.cell_key(cu, cv);
                    index.cells[key].push(i);
                }
            }
        }

        index
    }

    /// Grid dimensions in cells
    pub fn dimensions(&self) -> (usize, usize) {
        (self.grid_width, self.grid_height)
    }

    /// Cell containing a point, clamped onto the grid
    pub fn cell_of(&self, x: f64, y: f64) -> (usize, usize) {
        let clamp = |coord: f64, len: usize| -> usize {
            let cell = (coord / self.cell_size).floor();
            if cell.is_nan() || cell < 0.0 {
                0
            } else {
                (cell as usize).min(len - 1)
            }
        };
        (clamp(x, self.grid_width), clamp(y, self.grid_height))
    }

    #[inline]
    fn cell_key(&self, u: usize, v: usize) -> usize {
        u * self.grid_height + v
    }

    /// Tree indices registered in cell `(u, v)`; empty when out of range
    pub fn query(&self, u: usize, v: usize) -> &[usize] {
        if u < self.grid_width && v < self.grid_height {
            &self.cells[self.cell_key(u, v)]
        } else {
            &[]
        }
    }

    /// Trees that may neighbour a point: the lookup for the point's own cell
    pub fn near(&self, x: f64, y: f64) -> &[usize] {
        let (u, v) = self.cell_of(x, y);
        self.query(u, v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree_at(id: u64, x: f64, y: f64) -> Tree {
        Tree::new(id, x, y, 0, 0.5)
    }

    #[test]
    fn test_dimensions_round_up() {
        let index = SpatialIndex::new(100.0, 250.0, 100.0);
        assert_eq!(index.dimensions(), (3, 1));
    }

    #[test]
    fn test_cell_of_clamps_to_grid() {
        let index = SpatialIndex::new(100.0, 300.0, 200.0);
        assert_eq!(index.cell_of(150.0, 50.0), (1, 0));
        assert_eq!(index.cell_of(-5.0, -5.0), (0, 0));
        assert_eq!(index.cell_of(300.0, 200.0), (2, 1));
        assert_eq!(index.cell_of(10_000.0, 10_000.0), (2, 1));
    }

    #[test]
    fn test_tree_lands_in_3x3_block() {
        let trees = vec![tree_at(0, 150.0, 150.0)];
        let index = SpatialIndex::rebuild(&trees, 100.0, 500.0, 500.0);

        for u in 0..5 {
            for v in 0..5 {
                let expected = (0..=2).contains(&u) && (0..=2).contains(&v);
                assert_eq!(index.query(u, v) == [0], expected, "cell ({u},{v})");
            }
        }
    }

    #[test]
    fn test_corner_tree_is_clipped_not_wrapped() {
        let trees = vec![tree_at(0, 10.0, 10.0)];
        let index = SpatialIndex::rebuild(&trees, 100.0, 500.0, 500.0);

        let occupied: usize = (0..5)
            .flat_map(|u| (0..5).map(move |v| (u, v)))
            .filter(|&(u, v)| !index.query(u, v).is_empty())
            .count();
        assert_eq!(occupied, 4);
        assert!(index.query(4, 4).is_empty());
    }

    #[test]
    fn test_query_out_of_range_is_empty() {
        let index = SpatialIndex::rebuild(&[tree_at(0, 1.0, 1.0)], 100.0, 200.0, 200.0);
        assert!(index.query(5, 0).is_empty());
        assert!(index.query(0, 5).is_empty());
    }

    #[test]
    fn test_close_trees_share_a_cell() {
        // Pairs at most one cell apart must see each other from their own cell
        let cell = 100.0;
        let pairs = [
            ((99.0, 99.0), (101.0, 101.0)),
            ((0.0, 0.0), (100.0, 0.0)),
            ((250.0, 250.0), (179.3, 179.3)),
            ((399.0, 5.0), (301.0, 95.0)),
        ];
        for ((ax, ay), (bx, by)) in pairs {
            let trees = vec![tree_at(0, ax, ay), tree_at(1, bx, by)];
            let index = SpatialIndex::rebuild(&trees, cell, 400.0, 400.0);
            assert!(index.near(ax, ay).contains(&1));
            assert!(index.near(bx, by).contains(&0));
        }
    }

    #[test]
    fn test_rebuild_is_deterministic() {
        let trees: Vec<Tree> = (0..20)
            .map(|i| tree_at(i, (i * 37 % 400) as f64, (i * 91 % 300) as f64))
            .collect();
        let a = SpatialIndex::rebuild(&trees, 100.0, 400.0, 300.0);
        let b = SpatialIndex::rebuild(&trees, 100.0, 400.0, 300.0);
        let (w, h) = a.dimensions();
        for u in 0..w {
            for v in 0..h {
                assert_eq!(a.query(u, v), b.query(u, v));
            }
        }
    }
}
