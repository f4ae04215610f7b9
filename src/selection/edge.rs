//! Edge maps for edge-aware selection.
//!
//! A Sobel gradient-magnitude map of the source image. The region grower
//! consults it to tighten its effective tolerance near strong edges, so
//! fills snap to object boundaries instead of bleeding across them.
//! Hosts compute the map once per loaded image and pass it into wand
//! clicks.

use ndarray::Array2;
use rayon::prelude::*;

use crate::buffer::PixelBuffer;

const SOBEL_X: [[f32; 3]; 3] = [[-1.0, 0.0, 1.0], [-2.0, 0.0, 2.0], [-1.0, 0.0, 1.0]];
const SOBEL_Y: [[f32; 3]; 3] = [[-1.0, -2.0, -1.0], [0.0, 0.0, 0.0], [1.0, 2.0, 1.0]];

/// Per-pixel edge strength derived from the source image.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeMap {
    data: Array2<f32>,
}

impl EdgeMap {
    /// Compute the gradient-magnitude map of `buffer`.
    ///
    /// Luminance uses BT.601 weights; the 3x3 Sobel window leaves the
    /// 1-pixel border at zero.
    pub fn compute(buffer: &PixelBuffer) -> EdgeMap {
        let (width, height) = (buffer.width(), buffer.height());

        let mut gray = Array2::<f32>::zeros((height, width));
        for y in 0..height {
            for x in 0..width {
                let [r, g, b] = buffer.rgb(x, y);
                gray[[y, x]] = 0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32;
            }
        }

        let mut flat = vec![0.0f32; width * height];
        flat.par_chunks_mut(width)
            .enumerate()
            .for_each(|(y, row)| {
                if y == 0 || y + 1 >= height {
                    return;
                }
                for x in 1..width.saturating_sub(1) {
                    let mut gx = 0.0f32;
                    let mut gy = 0.0f32;
                    for ky in 0..3 {
                        for kx in 0..3 {
                            let sample = gray[[y + ky - 1, x + kx - 1]];
                            gx += sample * SOBEL_X[ky][kx];
                            gy += sample * SOBEL_Y[ky][kx];
                        }
                    }
                    row[x] = (gx * gx + gy * gy).sqrt();
                }
            });

        let data = Array2::from_shape_vec((height, width), flat)
            .expect("shape mismatch in edge map");
        EdgeMap { data }
    }

    pub fn width(&self) -> usize {
        self.data.dim().1
    }

    pub fn height(&self) -> usize {
        self.data.dim().0
    }

    /// Raw gradient magnitude at `(x, y)`.
    #[inline]
    pub fn magnitude(&self, x: usize, y: usize) -> f32 {
        self.data[[y, x]]
    }

    /// Edge strength normalized to 0.0-1.0 against the 8-bit range.
    #[inline]
    pub fn strength(&self, x: usize, y: usize) -> f32 {
        (self.data[[y, x]] / 255.0).min(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::PixelBuffer;

    fn two_tone(width: usize, height: usize, split: usize) -> PixelBuffer {
        let mut data = Vec::with_capacity(width * height * 3);
        for _ in 0..height {
            for x in 0..width {
                let v = if x < split { 0 } else { 255 };
                data.extend_from_slice(&[v, v, v]);
            }
        }
        PixelBuffer::from_raw(data, width, height, 3).unwrap()
    }

    #[test]
    fn test_uniform_image_has_no_edges() {
        let buffer = PixelBuffer::from_raw(vec![77; 8 * 8 * 3], 8, 8, 3).unwrap();
        let edges = EdgeMap::compute(&buffer);
        for y in 0..8 {
            for x in 0..8 {
                assert_eq!(edges.magnitude(x, y), 0.0);
            }
        }
    }

    #[test]
    fn test_vertical_boundary_shows_up() {
        let buffer = two_tone(10, 6, 5);
        let edges = EdgeMap::compute(&buffer);
        // Strong response on the columns flanking the split...
        assert!(edges.strength(4, 3) > 0.9);
        assert!(edges.strength(5, 3) > 0.9);
        // ...none far away from it.
        assert_eq!(edges.magnitude(1, 3), 0.0);
        assert_eq!(edges.magnitude(8, 3), 0.0);
    }

    #[test]
    fn test_border_stays_zero() {
        let buffer = two_tone(6, 6, 3);
        let edges = EdgeMap::compute(&buffer);
        assert_eq!(edges.magnitude(0, 0), 0.0);
        assert_eq!(edges.magnitude(5, 5), 0.0);
    }
}
