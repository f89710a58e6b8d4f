//! Flat, x-major buffer of per-grid-point heights.

use crate::error::TerrainError;

/// A `width × depth` grid of heights stored in one flat buffer.
///
/// Cell `(x, z)` lives at `x * depth + z`: X is the outer axis and Z the inner
/// one. For square fields this is the familiar `x * width + z`.
#[derive(Clone, Debug, PartialEq)]
pub struct HeightField {
    width: usize,
    depth: usize,
    data: Vec<f32>,
}

impl HeightField {
    /// Allocates a zeroed field.
    ///
    /// Fails with [`TerrainError::InvalidConfiguration`] if either dimension is
    /// zero; nothing is allocated in that case.
    pub fn new(width: usize, depth: usize) -> Result<Self, TerrainError> {
        if width == 0 || depth == 0 {
            return Err(TerrainError::config(format!(
                "height field dimensions must be positive (got {width}×{depth})"
            )));
        }
        Ok(Self {
            width,
            depth,
            data: vec![0.0; width * depth],
        })
    }

    /// Wraps an existing buffer. Its length must equal `width * depth`.
    pub fn from_vec(width: usize, depth: usize, data: Vec<f32>) -> Result<Self, TerrainError> {
        if width == 0 || depth == 0 {
            return Err(TerrainError::config(format!(
                "height field dimensions must be positive (got {width}×{depth})"
            )));
        }
        if data.len() != width * depth {
            return Err(TerrainError::config(format!(
                "height buffer holds {} values, expected {width}×{depth}",
                data.len()
            )));
        }
        Ok(Self { width, depth, data })
    }

    /// Number of samples along X.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of samples along Z.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Flat index of cell `(x, z)`.
    #[inline]
    pub fn index(&self, x: usize, z: usize) -> usize {
        x * self.depth + z
    }

    /// Height at `(x, z)`.
    ///
    /// # Panics
    ///
    /// Panics if the cell is outside the field.
    #[inline]
    pub fn get(&self, x: usize, z: usize) -> f32 {
        self.data[self.index(x, z)]
    }

    /// Overwrites the height at `(x, z)`. Panics outside the field, like [`Self::get`].
    #[inline]
    pub fn set(&mut self, x: usize, z: usize, value: f32) {
        let i = self.index(x, z);
        self.data[i] = value;
    }

    /// The raw buffer in `x * depth + z` order.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Mutable view of the raw buffer, for in-place passes such as
    /// [`crate::normalize`].
    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Consumes the field, returning its buffer.
    pub fn into_vec(self) -> Vec<f32> {
        self.data
    }
}
