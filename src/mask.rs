//! Selection masks and their derived bounding boxes.
//!
//! A mask is a single-channel byte plane: 0 = unselected, 255 = fully
//! selected, intermediate values are soft/feathered edges. The bounding
//! box is never stored — it is derived on demand from the current samples
//! so it cannot drift out of sync with the data.

use ndarray::Array2;

use crate::error::{EngineError, EngineResult};

/// Samples above this value count as visibly selected when deriving bounds.
pub const VISIBLE_THRESHOLD: u8 = 128;

/// Tight inclusive pixel rectangle around the visible samples of a mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub min_x: usize,
    pub min_y: usize,
    pub max_x: usize,
    pub max_y: usize,
}

impl Bounds {
    /// Width of the inclusive rectangle in pixels.
    pub fn width(&self) -> usize {
        self.max_x - self.min_x + 1
    }

    /// Height of the inclusive rectangle in pixels.
    pub fn height(&self) -> usize {
        self.max_y - self.min_y + 1
    }
}

/// Aggregate statistics over a mask.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaskStats {
    /// Number of samples above [`VISIBLE_THRESHOLD`].
    pub foreground_pixels: usize,
    /// Total number of samples.
    pub total_pixels: usize,
    /// `foreground_pixels / total_pixels`.
    pub foreground_ratio: f32,
    /// Bounds of the visible samples, or `None` for an empty mask.
    pub bounds: Option<Bounds>,
}

/// Single-channel selection-strength plane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    data: Array2<u8>,
}

impl Mask {
    /// Create an all-zero (fully unselected) mask.
    pub fn new(width: usize, height: usize) -> Mask {
        Mask {
            data: Array2::<u8>::zeros((height, width)),
        }
    }

    /// Build a mask from a flat row-major byte buffer.
    ///
    /// # Errors
    /// `InvalidDimensions` when `data.len() != width * height` or either
    /// dimension is zero.
    pub fn from_raw(data: Vec<u8>, width: usize, height: usize) -> EngineResult<Mask> {
        if width == 0 || height == 0 || data.len() != width * height {
            return Err(EngineError::InvalidDimensions {
                width,
                height,
                channels: 1,
                len: data.len(),
            });
        }
        let data = Array2::from_shape_vec((height, width), data)
            .map_err(|_| EngineError::InvalidDimensions {
                width,
                height,
                channels: 1,
                len: 0,
            })?;
        Ok(Mask { data })
    }

    /// Wrap an existing 2D plane.
    pub fn from_array(data: Array2<u8>) -> Mask {
        Mask { data }
    }

    pub fn width(&self) -> usize {
        self.data.dim().1
    }

    pub fn height(&self) -> usize {
        self.data.dim().0
    }

    /// Sample at `(x, y)`. Out-of-range coordinates are a programming
    /// error and panic; they are never silently read as zero.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.data[[y, x]]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: u8) {
        self.data[[y, x]] = value;
    }

    pub fn data(&self) -> &Array2<u8> {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut Array2<u8> {
        &mut self.data
    }

    /// Flat row-major view of the samples.
    pub fn as_slice(&self) -> &[u8] {
        self.data.as_slice().expect("mask is always standard layout")
    }

    /// Consume the mask into its flat row-major buffer.
    pub fn into_raw(self) -> Vec<u8> {
        self.data.into_raw_vec_and_offset().0
    }

    /// True when every sample is zero.
    pub fn is_empty(&self) -> bool {
        self.data.iter().all(|&v| v == 0)
    }

    /// Tight bounding box of all samples above [`VISIBLE_THRESHOLD`],
    /// recomputed on demand. `None` when nothing is visibly selected.
    pub fn bounds(&self) -> Option<Bounds> {
        let (height, width) = self.data.dim();
        let mut bounds: Option<Bounds> = None;

        for y in 0..height {
            for x in 0..width {
                if self.data[[y, x]] > VISIBLE_THRESHOLD {
                    bounds = Some(match bounds {
                        None => Bounds {
                            min_x: x,
                            min_y: y,
                            max_x: x,
                            max_y: y,
                        },
                        Some(b) => Bounds {
                            min_x: b.min_x.min(x),
                            min_y: b.min_y.min(y),
                            max_x: b.max_x.max(x),
                            max_y: b.max_y.max(y),
                        },
                    });
                }
            }
        }

        bounds
    }

    /// Swap foreground and background.
    pub fn invert(&self) -> Mask {
        Mask {
            data: self.data.mapv(|v| 255 - v),
        }
    }

    /// Foreground coverage statistics.
    pub fn stats(&self) -> MaskStats {
        let total_pixels = self.data.len();
        let foreground_pixels = self
            .data
            .iter()
            .filter(|&&v| v > VISIBLE_THRESHOLD)
            .count();
        MaskStats {
            foreground_pixels,
            total_pixels,
            foreground_ratio: if total_pixels == 0 {
                0.0
            } else {
                foreground_pixels as f32 / total_pixels as f32
            },
            bounds: self.bounds(),
        }
    }
}
