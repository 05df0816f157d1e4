use thiserror::Error;

/// Errors that can occur while building or caching occlusion geometry
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    /// A height field needs at least 2x2 samples and a positive cell size
    #[error("Invalid height field dimensions: {columns}x{rows} samples, cell size {cell_size}")]
    InvalidDimensions {
        columns: usize,
        rows: usize,
        cell_size: f32,
    },

    /// Sample buffer does not match `columns * rows`
    #[error("Height field expects {expected} samples but {actual} were given")]
    HeightCountMismatch { expected: usize, actual: usize },

    /// A sample is NaN or infinite
    #[error("Height field sample {index} is not finite")]
    NonFiniteHeight { index: usize },

    /// Collider pose has a non-positive or non-finite scale, or a non-finite translation
    #[error("Invalid collider pose: {reason}")]
    InvalidPose { reason: &'static str },
}
