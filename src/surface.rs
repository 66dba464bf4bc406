use crate::tree::Tree;

/// Outline width painted around live trees
pub const OUTLINE_WIDTH: f64 = 1.0;

/// Something trees are painted onto. Placement asks it whether a pixel is
/// already covered, so it doubles as the forest's occupancy map.
pub trait DrawSurface {
    /// Whether the pixel under `(x, y)` is covered (off-canvas counts as covered)
    fn is_occupied(&self, x: f64, y: f64) -> bool;

    /// Paint a live tree, or erase a dead one padded by `erase_padding`
    fn draw_tree(&mut self, tree: &Tree, erase_padding: f64);

    /// Reset every pixel to background
    fn clear(&mut self);
}

/// In-memory pixel surface: 0 is background, `species + 1` marks coverage
#[derive(Debug, Clone)]
pub struct Raster {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

impl Raster {
    pub fn new(width: f64, height: f64) -> Self {
        let width = width.max(1.0).ceil() as usize;
        let height = height.max(1.0).ceil() as usize;
        Self {
            width,
            height,
            pixels: vec![0; width * height],
        }
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Raw pixel value, `None` off canvas
    pub fn pixel(&self, px: usize, py: usize) -> Option<u8> {
        if px < self.width && py < self.height {
            Some(self.pixels[py * self.width + px])
        } else {
            None
        }
    }

    /// Number of covered pixels
    pub fn covered(&self) -> usize {
        self.pixels.iter().filter(|&&p| p != 0).count()
    }

    /// Set every pixel whose centre lies within `radius` of `(cx, cy)`
    fn fill_disc(&mut self, cx: f64, cy: f64, radius: f64, value: u8) {
        if radius <= 0.0 {
            return;
        }
        let r_sq = radius * radius;
        let x_lo = (cx - radius).floor().max(0.0) as usize;
        let y_lo = (cy - radius).floor().max(0.0) as usize;
        let x_hi = ((cx + radius).ceil().max(0.0) as usize).min(self.width);
        let y_hi = ((cy + radius).ceil().max(0.0) as usize).min(self.height);

        for py in y_lo..y_hi {
            let dy = py as f64 + 0.5 - cy;
            let row = py * self.width;
            for px in x_lo..x_hi {
                let dx = px as f64 + 0.5 - cx;
                if dx * dx + dy * dy <= r_sq {
                    self.pixels[row + px] = value;
                }
            }
        }
    }
}

impl DrawSurface for Raster {
    fn is_occupied(&self, x: f64, y: f64) -> bool {
        if !(x >= 0.0 && y >= 0.0) {
            return true;
        }
        self.pixel(x as usize, y as usize)
            .map(|p| p != 0)
            .unwrap_or(true)
    }

    fn draw_tree(&mut self, tree: &Tree, erase_padding: f64) {
        if tree.alive {
            let value = (tree.species.min(u8::MAX as usize - 1) + 1) as u8;
            self.fill_disc(tree.x, tree.y, tree.r + OUTLINE_WIDTH, value);
        } else {
            self.fill_disc(tree.x, tree.y, tree.r + erase_padding, 0);
        }
    }

    fn clear(&mut self) {
        self.pixels.fill(0);
    }
}
