use super::error::GeometryError;

/// Regular grid of terrain heights in collider-local space.
///
/// Sample `(column, row)` sits at local `(column * cell_size, row * cell_size)`
/// and heights are stored row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct HeightField {
    columns: usize,
    rows: usize,
    cell_size: f32,
    heights: Vec<f32>,
    min_height: f32,
    max_height: f32,
}

impl HeightField {
    pub fn new(
        columns: usize,
        rows: usize,
        cell_size: f32,
        heights: Vec<f32>,
    ) -> Result<Self, GeometryError> {
        if columns < 2 || rows < 2 || !(cell_size.is_finite() && cell_size > 0.0) {
            return Err(GeometryError::InvalidDimensions {
                columns,
                rows,
                cell_size,
            });
        }
        let expected = columns * rows;
        if heights.len() != expected {
            return Err(GeometryError::HeightCountMismatch {
                expected,
                actual: heights.len(),
            });
        }
        if let Some(index) = heights.iter().position(|height| !height.is_finite()) {
            return Err(GeometryError::NonFiniteHeight { index });
        }

        let min_height = heights.iter().copied().fold(f32::INFINITY, f32::min);
        let max_height = heights.iter().copied().fold(f32::NEG_INFINITY, f32::max);

        Ok(Self {
            columns,
            rows,
            cell_size,
            heights,
            min_height,
            max_height,
        })
    }

    pub fn flat(columns: usize, rows: usize, cell_size: f32, height: f32) -> Result<Self, GeometryError> {
        Self::new(columns, rows, cell_size, vec![height; columns * rows])
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn min_height(&self) -> f32 {
        self.min_height
    }

    pub fn max_height(&self) -> f32 {
        self.max_height
    }

    /// Local extent along x and y
    pub fn extent(&self) -> (f32, f32) {
        (
            (self.columns - 1) as f32 * self.cell_size,
            (self.rows - 1) as f32 * self.cell_size,
        )
    }

    pub fn sample(&self, column: usize, row: usize) -> f32 {
        self.heights[row * self.columns + column]
    }

    pub fn set_sample(&mut self, column: usize, row: usize, height: f32) {
        self.heights[row * self.columns + column] = height;
        self.min_height = self.min_height.min(height);
        self.max_height = self.max_height.max(height);
    }

    /// Bilinearly interpolated height at local `(x, y)`, `None` outside the grid
    pub fn height_at(&self, x: f32, y: f32) -> Option<f32> {
        let (width, depth) = self.extent();
        if !(0.0..=width).contains(&x) || !(0.0..=depth).contains(&y) {
            return None;
        }

        let fx = x / self.cell_size;
        let fy = y / self.cell_size;
        let column = (fx.floor() as usize).min(self.columns - 2);
        let row = (fy.floor() as usize).min(self.rows - 2);
        let tx = fx - column as f32;
        let ty = fy - row as f32;

        let h00 = self.sample(column, row);
        let h10 = self.sample(column + 1, row);
        let h01 = self.sample(column, row + 1);
        let h11 = self.sample(column + 1, row + 1);

        let near = h00 + (h10 - h00) * tx;
        let far = h01 + (h11 - h01) * tx;
        Some(near + (far - near) * ty)
    }
}
