//! Pixel buffers: the image substrate the engine reads and writes.
//!
//! A [`PixelBuffer`] pairs the source color samples (RGB or RGBA, shape
//! `(height, width, channels)`) with an independent single-channel mask
//! plane of the same size. The engine never decodes images itself: callers
//! hand in decoded bytes with explicit dimensions.

use ndarray::{Array2, Array3};

use crate::error::{EngineError, EngineResult};
use crate::mask::{Bounds, Mask};

/// Source image plus its committed selection/opacity plane.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer {
    /// Color samples, `(height, width, channels)` with 3 or 4 channels.
    pixels: Array3<u8>,
    /// Committed mask plane, always `(height, width)`.
    mask: Array2<u8>,
}

impl PixelBuffer {
    /// Build a buffer from a flat row-major byte slice.
    ///
    /// # Errors
    /// `UnsupportedChannels` unless `channels` is 3 or 4;
    /// `InvalidDimensions` when the byte count does not match
    /// `width * height * channels` or either dimension is zero.
    pub fn from_raw(
        data: Vec<u8>,
        width: usize,
        height: usize,
        channels: usize,
    ) -> EngineResult<PixelBuffer> {
        if channels != 3 && channels != 4 {
            return Err(EngineError::UnsupportedChannels(channels));
        }
        if width == 0 || height == 0 || data.len() != width * height * channels {
            return Err(EngineError::InvalidDimensions {
                width,
                height,
                channels,
                len: data.len(),
            });
        }
        let pixels = Array3::from_shape_vec((height, width, channels), data).map_err(|_| {
            EngineError::InvalidDimensions {
                width,
                height,
                channels,
                len: 0,
            }
        })?;
        Ok(PixelBuffer {
            mask: Array2::zeros((height, width)),
            pixels,
        })
    }

    /// Wrap an existing `(height, width, channels)` array.
    pub fn from_pixels(pixels: Array3<u8>) -> EngineResult<PixelBuffer> {
        let (height, width, channels) = pixels.dim();
        if channels != 3 && channels != 4 {
            return Err(EngineError::UnsupportedChannels(channels));
        }
        if width == 0 || height == 0 {
            return Err(EngineError::InvalidDimensions {
                width,
                height,
                channels,
                len: pixels.len(),
            });
        }
        Ok(PixelBuffer {
            mask: Array2::zeros((height, width)),
            pixels,
        })
    }

    pub fn width(&self) -> usize {
        self.pixels.dim().1
    }

    pub fn height(&self) -> usize {
        self.pixels.dim().0
    }

    pub fn channels(&self) -> usize {
        self.pixels.dim().2
    }

    pub fn pixels(&self) -> &Array3<u8> {
        &self.pixels
    }

    /// True when `(x, y)` lies inside the buffer.
    #[inline]
    pub fn contains(&self, x: usize, y: usize) -> bool {
        x < self.width() && y < self.height()
    }

    /// RGB sample at `(x, y)`. Alpha (if present) is ignored: color
    /// distance is defined over RGB only. Panics out of range.
    #[inline]
    pub fn rgb(&self, x: usize, y: usize) -> [u8; 3] {
        [
            self.pixels[[y, x, 0]],
            self.pixels[[y, x, 1]],
            self.pixels[[y, x, 2]],
        ]
    }

    /// The committed mask plane.
    pub fn mask(&self) -> &Array2<u8> {
        &self.mask
    }

    /// Store `mask` as the buffer's committed plane.
    ///
    /// # Errors
    /// `DimensionMismatch` when the mask size differs from the buffer.
    pub fn set_mask(&mut self, mask: &Mask) -> EngineResult<()> {
        self.check_mask_dims(mask)?;
        self.mask.assign(mask.data());
        Ok(())
    }

    /// Composite the committed mask plane as the alpha channel, producing
    /// an RGBA image of the same dimensions.
    pub fn to_rgba(&self) -> Array3<u8> {
        let (height, width, _) = self.pixels.dim();
        let mut out = Array3::<u8>::zeros((height, width, 4));
        for y in 0..height {
            for x in 0..width {
                out[[y, x, 0]] = self.pixels[[y, x, 0]];
                out[[y, x, 1]] = self.pixels[[y, x, 1]];
                out[[y, x, 2]] = self.pixels[[y, x, 2]];
                out[[y, x, 3]] = self.mask[[y, x]];
            }
        }
        out
    }

    /// Cut the selected region out of the image: an RGBA block cropped to
    /// the mask bounds, with the mask as per-pixel alpha, plus the bounds
    /// it was cropped to. `Ok(None)` when the mask selects nothing.
    ///
    /// # Errors
    /// `DimensionMismatch` when the mask size differs from the buffer.
    pub fn extract(&self, mask: &Mask) -> EngineResult<Option<(Array3<u8>, Bounds)>> {
        self.check_mask_dims(mask)?;
        let bounds = match mask.bounds() {
            Some(b) => b,
            None => return Ok(None),
        };

        let mut out = Array3::<u8>::zeros((bounds.height(), bounds.width(), 4));
        for y in 0..bounds.height() {
            for x in 0..bounds.width() {
                let (sx, sy) = (bounds.min_x + x, bounds.min_y + y);
                let rgb = self.rgb(sx, sy);
                out[[y, x, 0]] = rgb[0];
                out[[y, x, 1]] = rgb[1];
                out[[y, x, 2]] = rgb[2];
                out[[y, x, 3]] = mask.get(sx, sy);
            }
        }
        Ok(Some((out, bounds)))
    }

    fn check_mask_dims(&self, mask: &Mask) -> EngineResult<()> {
        if mask.width() != self.width() || mask.height() != self.height() {
            return Err(EngineError::DimensionMismatch {
                expected_width: self.width(),
                expected_height: self.height(),
                width: mask.width(),
                height: mask.height(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: usize, height: usize, rgb: [u8; 3]) -> PixelBuffer {
        let mut data = Vec::with_capacity(width * height * 3);
        for _ in 0..width * height {
            data.extend_from_slice(&rgb);
        }
        PixelBuffer::from_raw(data, width, height, 3).unwrap()
    }

    #[test]
    fn test_from_raw_validates() {
        assert_eq!(
            PixelBuffer::from_raw(vec![0; 12], 2, 2, 2),
            Err(EngineError::UnsupportedChannels(2))
        );
        assert!(matches!(
            PixelBuffer::from_raw(vec![0; 13], 2, 2, 3),
            Err(EngineError::InvalidDimensions { .. })
        ));
        assert!(PixelBuffer::from_raw(vec![0; 12], 2, 2, 3).is_ok());
    }

    #[test]
    fn test_rgb_ignores_alpha() {
        let buffer = PixelBuffer::from_raw(vec![10, 20, 30, 99], 1, 1, 4).unwrap();
        assert_eq!(buffer.rgb(0, 0), [10, 20, 30]);
    }

    #[test]
    fn test_set_mask_rejects_wrong_size() {
        let mut buffer = solid(4, 4, [0, 0, 0]);
        let mask = Mask::new(3, 4);
        assert!(matches!(
            buffer.set_mask(&mask),
            Err(EngineError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_to_rgba_uses_committed_mask_as_alpha() {
        let mut buffer = solid(2, 2, [5, 6, 7]);
        let mut mask = Mask::new(2, 2);
        mask.set(1, 0, 200);
        buffer.set_mask(&mask).unwrap();

        let rgba = buffer.to_rgba();
        assert_eq!(rgba[[0, 1, 3]], 200);
        assert_eq!(rgba[[0, 0, 3]], 0);
        assert_eq!(rgba[[0, 1, 0]], 5);
    }

    #[test]
    fn test_extract_crops_to_bounds() {
        let buffer = solid(6, 6, [9, 9, 9]);
        let mut mask = Mask::new(6, 6);
        mask.set(2, 1, 255);
        mask.set(4, 3, 255);

        let (cutout, bounds) = buffer.extract(&mask).unwrap().unwrap();
        assert_eq!((bounds.min_x, bounds.min_y, bounds.max_x, bounds.max_y), (2, 1, 4, 3));
        assert_eq!(cutout.dim(), (3, 3, 4));
        assert_eq!(cutout[[0, 0, 3]], 255); // (2, 1)
        assert_eq!(cutout[[1, 1, 3]], 0); // (3, 2) unselected
        assert_eq!(cutout[[2, 2, 3]], 255); // (4, 3)
    }

    #[test]
    fn test_extract_empty_mask_is_none() {
        let buffer = solid(4, 4, [1, 2, 3]);
        let mask = Mask::new(4, 4);
        assert_eq!(buffer.extract(&mask).unwrap(), None);
    }
}
