use rayon::prelude::*;

/// Cells that decay below this value are snapped to exactly zero.
pub const SNAP_TO_ZERO: f32 = 0.1;

/// Single shared trail field covering the arena at one cell per world unit.
///
/// Every cell stays in `[0, cap]`. Continuous points map to cells by floor,
/// and the grid is half-open: `x == width` or `y == height` is outside.
#[derive(Debug, Clone)]
pub struct PheromoneField {
    width: usize,
    height: usize,
    cap: f32,
    cells: Vec<f32>,
}

impl PheromoneField {
    pub fn new(width: usize, height: usize, cap: f32) -> Self {
        Self {
            width,
            height,
            cap: cap.max(0.0),
            cells: vec![0.0; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn cap(&self) -> f32 {
        self.cap
    }

    /// Row-major cell values, `y * width + x`.
    pub fn cells(&self) -> &[f32] {
        &self.cells
    }

    /// Changes the cap and pulls any cell above it back down.
    pub fn set_cap(&mut self, cap: f32) {
        self.cap = cap.max(0.0);
        let cap = self.cap;
        self.cells.par_iter_mut().for_each(|val| *val = val.min(cap));
    }

    pub fn clear(&mut self) {
        self.cells.fill(0.0);
    }

    /// Maps a continuous point to its cell index, `None` outside the grid.
    pub fn world_to_grid(&self, x: f32, y: f32) -> Option<usize> {
        if !(x.is_finite() && y.is_finite()) {
            return None;
        }
        self.cell_index(x.floor() as i64, y.floor() as i64)
    }

    fn cell_index(&self, grid_x: i64, grid_y: i64) -> Option<usize> {
        if grid_x >= 0
            && grid_y >= 0
            && (grid_x as usize) < self.width
            && (grid_y as usize) < self.height
        {
            Some(grid_y as usize * self.width + grid_x as usize)
        } else {
            None
        }
    }

    /// Evaporation: keeps `retain` of every cell, snapping cold cells to zero.
    pub fn decay(&mut self, retain: f32) {
        self.cells.par_iter_mut().for_each(|val| {
            if *val > 0.0 {
                *val *= retain;
                if *val < SNAP_TO_ZERO {
                    *val = 0.0;
                }
            }
        });
    }

    /// Adds `amount` to the cell under `(x, y)`, clamped to `[0, cap]`.
    /// Points outside the grid are ignored.
    pub fn deposit(&mut self, x: f32, y: f32, amount: f32) {
        if let Some(idx) = self.world_to_grid(x, y) {
            self.cells[idx] = (self.cells[idx] + amount).clamp(0.0, self.cap);
        }
    }

    pub fn sample_at(&self, x: f32, y: f32) -> f32 {
        self.world_to_grid(x, y).map_or(0.0, |idx| self.cells[idx])
    }

    /// Samples `distance` units away from `(x, y)` along `direction`.
    pub fn sample_directional(&self, x: f32, y: f32, direction: f32, distance: f32) -> f32 {
        self.sample_at(x + direction.cos() * distance, y + direction.sin() * distance)
    }

    /// Mean over the `(2 * radius + 1)²` block of cells centred on the cell
    /// containing `(x, y)`, counting only in-bounds cells. Zero when no cell
    /// of the block is inside the grid.
    pub fn neighborhood_average(&self, x: f32, y: f32, radius: i64) -> f32 {
        if !(x.is_finite() && y.is_finite()) {
            return 0.0;
        }
        let center_x = x.floor() as i64;
        let center_y = y.floor() as i64;

        let mut total = 0.0;
        let mut count = 0;
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if let Some(idx) = self.cell_index(center_x + dx, center_y + dy) {
                    total += self.cells[idx];
                    count += 1;
                }
            }
        }

        if count > 0 {
            total / count as f32
        } else {
            0.0
        }
    }

    /// Strongest cell in the `size`×`size` block whose top-left cell is
    /// `(column * size, row * size)`. Cells past the grid edge are skipped.
    pub fn block_max(&self, column: usize, row: usize, size: usize) -> f32 {
        let x0 = column.saturating_mul(size).min(self.width);
        let y0 = row.saturating_mul(size).min(self.height);
        let x1 = x0.saturating_add(size).min(self.width);
        let y1 = y0.saturating_add(size).min(self.height);

        (y0..y1)
            .flat_map(|y| self.cells[y * self.width + x0..y * self.width + x1].iter())
            .fold(0.0, |max, &v| f32::max(max, v))
    }

    pub fn total(&self) -> f32 {
        self.cells.par_iter().sum()
    }
}
