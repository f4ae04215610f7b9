//! Region growing: seeded flood fill and background removal.
//!
//! Both operations segment by color distance. The seeded fill grows a
//! 4-connected region outward from a click point, comparing every visited
//! pixel against the seed's original color. Background removal inverts the
//! question: it samples the four image corners, averages them into a
//! background color, and keeps everything *far* from that color.

use std::collections::VecDeque;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::buffer::PixelBuffer;
use crate::error::{EngineError, EngineResult};
use crate::mask::Mask;
use crate::selection::edge::EdgeMap;
use crate::selection::morphology;

/// Settings for seeded growing (the magic wand).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrowSettings {
    /// Euclidean RGB distance threshold against the seed color.
    pub tolerance: f32,
    /// Grown regions smaller than this many pixels collapse to an empty
    /// mask (filters out speckle grabs). 0 keeps everything, including a
    /// single-pixel zero-tolerance fill.
    pub min_area: usize,
    /// Open (erode+dilate) passes the wand applies after growing.
    pub refine_iterations: usize,
    /// Feather radius the wand applies after refinement.
    pub feather_radius: usize,
}

impl Default for GrowSettings {
    fn default() -> Self {
        GrowSettings {
            tolerance: 32.0,
            min_area: 0,
            refine_iterations: 1,
            feather_radius: 2,
        }
    }
}

/// Settings for corner-sampled background removal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackgroundSettings {
    /// Pixels within this distance of the sampled background color are
    /// treated as background.
    pub tolerance: f32,
    /// Open passes applied to the raw mask.
    pub refine_iterations: usize,
    /// Feather radius applied after refinement.
    pub feather_radius: usize,
}

impl Default for BackgroundSettings {
    fn default() -> Self {
        BackgroundSettings {
            tolerance: 30.0,
            refine_iterations: 1,
            feather_radius: 2,
        }
    }
}

#[inline]
fn distance_sq(a: [u8; 3], b: [u8; 3]) -> f32 {
    let dr = a[0] as f32 - b[0] as f32;
    let dg = a[1] as f32 - b[1] as f32;
    let db = a[2] as f32 - b[2] as f32;
    dr * dr + dg * dg + db * db
}

fn check_tolerance(tolerance: f32) -> EngineResult<()> {
    if !tolerance.is_finite() || tolerance < 0.0 {
        return Err(EngineError::InvalidParameter(format!(
            "tolerance must be a non-negative number, got {tolerance}"
        )));
    }
    Ok(())
}

/// Grow a region from `(seed_x, seed_y)` by breadth-first flood fill.
///
/// Every pixel reachable from the seed through 4-connected neighbors, each
/// within `settings.tolerance` of the seed's original color, is set to
/// 255; everything else stays 0. With an [`EdgeMap`] the effective
/// tolerance shrinks near strong edges (`tolerance * (1 - strength / 2)`),
/// so the fill stops at object boundaries.
///
/// A degenerate result (empty mask) is a valid outcome, never an error.
///
/// # Errors
/// `OutOfBounds` for a seed outside the buffer, `InvalidParameter` for a
/// negative tolerance.
pub fn grow_from_seed(
    buffer: &PixelBuffer,
    seed_x: usize,
    seed_y: usize,
    settings: &GrowSettings,
    edges: Option<&EdgeMap>,
) -> EngineResult<Mask> {
    check_tolerance(settings.tolerance)?;
    let (width, height) = (buffer.width(), buffer.height());
    if !buffer.contains(seed_x, seed_y) {
        return Err(EngineError::OutOfBounds {
            x: seed_x,
            y: seed_y,
            width,
            height,
        });
    }

    let seed_color = buffer.rgb(seed_x, seed_y);
    let mut visited = vec![false; width * height];
    let mut points: Vec<(usize, usize)> = Vec::new();
    let mut queue = VecDeque::new();

    queue.push_back((seed_x, seed_y));
    visited[seed_y * width + seed_x] = true;

    while let Some((x, y)) = queue.pop_front() {
        let mut tolerance = settings.tolerance;
        if let Some(edges) = edges {
            tolerance *= 1.0 - edges.strength(x, y) * 0.5;
        }
        if distance_sq(buffer.rgb(x, y), seed_color) > tolerance * tolerance {
            continue;
        }

        points.push((x, y));

        let x = x as isize;
        let y = y as isize;
        for (nx, ny) in [(x + 1, y), (x - 1, y), (x, y + 1), (x, y - 1)] {
            if nx < 0 || ny < 0 || nx >= width as isize || ny >= height as isize {
                continue;
            }
            let (nx, ny) = (nx as usize, ny as usize);
            if !visited[ny * width + nx] {
                visited[ny * width + nx] = true;
                queue.push_back((nx, ny));
            }
        }
    }

    let mut mask = Mask::new(width, height);
    if points.len() >= settings.min_area.max(1) {
        for &(x, y) in &points {
            mask.set(x, y, 255);
        }
        debug!(
            "region grow from ({seed_x}, {seed_y}): {} px at tolerance {}",
            points.len(),
            settings.tolerance
        );
    } else {
        debug!(
            "region grow from ({seed_x}, {seed_y}): {} px below min_area {}, dropped",
            points.len(),
            settings.min_area
        );
    }
    Ok(mask)
}

/// Average color of the four image corners.
fn sample_background(buffer: &PixelBuffer) -> [f32; 3] {
    let (width, height) = (buffer.width(), buffer.height());
    let corners = [
        (0, 0),
        (width - 1, 0),
        (0, height - 1),
        (width - 1, height - 1),
    ];
    let mut sum = [0.0f32; 3];
    for (x, y) in corners {
        let rgb = buffer.rgb(x, y);
        for c in 0..3 {
            sum[c] += rgb[c] as f32;
        }
    }
    [sum[0] / 4.0, sum[1] / 4.0, sum[2] / 4.0]
}

/// Separate foreground from a uniform background.
///
/// The background color is the average of the four corner pixels; every
/// pixel farther than `settings.tolerance` from it becomes foreground
/// (inverted semantics from the seeded fill). The raw mask is then opened
/// `refine_iterations` times and feathered by `feather_radius`.
///
/// Known limitation: the corner sampling assumes the background touches
/// all four corners. A subject occupying a corner (a full-bleed photo)
/// skews the sampled color and the split becomes meaningless.
///
/// # Errors
/// `InvalidParameter` for a negative tolerance.
pub fn remove_background(
    buffer: &PixelBuffer,
    settings: &BackgroundSettings,
) -> EngineResult<Mask> {
    check_tolerance(settings.tolerance)?;
    let (width, height) = (buffer.width(), buffer.height());
    let background = sample_background(buffer);
    let tolerance_sq = settings.tolerance * settings.tolerance;

    let mut mask = Mask::new(width, height);
    for y in 0..height {
        for x in 0..width {
            let rgb = buffer.rgb(x, y);
            let dr = rgb[0] as f32 - background[0];
            let dg = rgb[1] as f32 - background[1];
            let db = rgb[2] as f32 - background[2];
            if dr * dr + dg * dg + db * db > tolerance_sq {
                mask.set(x, y, 255);
            }
        }
    }

    if settings.refine_iterations > 0 {
        mask = morphology::refine_edges(&mask, settings.refine_iterations);
    }
    if settings.feather_radius > 0 {
        mask = morphology::feather(&mask, settings.feather_radius);
    }

    debug!(
        "background removal: bg ({:.0}, {:.0}, {:.0}), foreground ratio {:.3}",
        background[0],
        background[1],
        background[2],
        mask.stats().foreground_ratio
    );
    Ok(mask)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer_from_rows(rows: &[&[[u8; 3]]]) -> PixelBuffer {
        let height = rows.len();
        let width = rows[0].len();
        let mut data = Vec::with_capacity(width * height * 3);
        for row in rows {
            for px in *row {
                data.extend_from_slice(px);
            }
        }
        PixelBuffer::from_raw(data, width, height, 3).unwrap()
    }

    fn solid(width: usize, height: usize, rgb: [u8; 3]) -> PixelBuffer {
        let mut data = Vec::with_capacity(width * height * 3);
        for _ in 0..width * height {
            data.extend_from_slice(&rgb);
        }
        PixelBuffer::from_raw(data, width, height, 3).unwrap()
    }

    fn plain(tolerance: f32) -> GrowSettings {
        GrowSettings {
            tolerance,
            min_area: 0,
            refine_iterations: 0,
            feather_radius: 0,
        }
    }

    #[test]
    fn test_uniform_image_selects_everything() {
        let buffer = solid(10, 10, [200, 30, 30]);
        let mask = grow_from_seed(&buffer, 5, 5, &plain(10.0), None).unwrap();
        assert!(mask.as_slice().iter().all(|&v| v == 255));
    }

    #[test]
    fn test_zero_tolerance_keeps_exact_matches_only() {
        const R: [u8; 3] = [255, 0, 0];
        const B: [u8; 3] = [0, 0, 255];
        let buffer = buffer_from_rows(&[
            &[R, R, B],
            &[R, B, B],
            &[B, B, R],
        ]);
        let mask = grow_from_seed(&buffer, 0, 0, &plain(0.0), None).unwrap();
        // The connected red component around the seed, not the far corner.
        assert_eq!(mask.get(0, 0), 255);
        assert_eq!(mask.get(1, 0), 255);
        assert_eq!(mask.get(0, 1), 255);
        assert_eq!(mask.get(2, 2), 0);
        assert_eq!(mask.get(2, 0), 0);
    }

    #[test]
    fn test_seed_is_always_included() {
        let buffer = solid(3, 3, [1, 2, 3]);
        let mask = grow_from_seed(&buffer, 2, 0, &plain(0.0), None).unwrap();
        assert_eq!(mask.get(2, 0), 255);
    }

    #[test]
    fn test_fill_respects_tolerance_gradient() {
        // Columns step from 100 to 160 in increments of 20.
        let row: Vec<[u8; 3]> = [100u8, 120, 140, 160]
            .iter()
            .map(|&v| [v, 0, 0])
            .collect();
        let buffer = buffer_from_rows(&[&row, &row]);
        let mask = grow_from_seed(&buffer, 0, 0, &plain(25.0), None).unwrap();
        // 120 is within 25 of the seed's 100; 140 is not, and growth stops
        // there even though 140 is within 25 of its own neighbor.
        assert_eq!(mask.get(1, 0), 255);
        assert_eq!(mask.get(2, 0), 0);
        assert_eq!(mask.get(3, 0), 0);
    }

    #[test]
    fn test_min_area_drops_small_regions() {
        let buffer = solid(4, 4, [10, 10, 10]);
        let settings = GrowSettings {
            tolerance: 0.0,
            min_area: 100,
            ..plain(0.0)
        };
        let mask = grow_from_seed(&buffer, 1, 1, &settings, None).unwrap();
        assert!(mask.is_empty());
    }

    #[test]
    fn test_seed_out_of_bounds_is_rejected() {
        let buffer = solid(4, 4, [0, 0, 0]);
        assert!(matches!(
            grow_from_seed(&buffer, 4, 0, &plain(10.0), None),
            Err(EngineError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_negative_tolerance_is_rejected() {
        let buffer = solid(4, 4, [0, 0, 0]);
        assert!(matches!(
            grow_from_seed(&buffer, 0, 0, &plain(-1.0), None),
            Err(EngineError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_edge_map_stops_fill_at_boundary() {
        // 9x9 gray field with a slightly brighter 3x3 patch. The step is
        // within plain tolerance, but the Sobel response on the patch rim
        // tightens the effective tolerance below it.
        let mut rows = Vec::new();
        for y in 0..9 {
            let row: Vec<[u8; 3]> = (0..9)
                .map(|x| {
                    if (3..6).contains(&x) && (3..6).contains(&y) {
                        [160, 160, 160]
                    } else {
                        [100, 100, 100]
                    }
                })
                .collect();
            rows.push(row);
        }
        let refs: Vec<&[[u8; 3]]> = rows.iter().map(|r| r.as_slice()).collect();
        let buffer = buffer_from_rows(&refs);

        let unaware = grow_from_seed(&buffer, 0, 0, &plain(110.0), None).unwrap();
        assert_eq!(unaware.get(4, 4), 255);

        let edges = EdgeMap::compute(&buffer);
        let aware = grow_from_seed(&buffer, 0, 0, &plain(110.0), Some(&edges)).unwrap();
        assert_eq!(aware.get(0, 0), 255);
        assert_eq!(aware.get(8, 8), 255);
        assert_eq!(aware.get(3, 3), 0);
        assert_eq!(aware.get(4, 4), 0);
    }

    #[test]
    fn test_background_removal_keeps_distinct_center() {
        // White 12x12 frame around a dark 6x6 block.
        let mut data = Vec::with_capacity(12 * 12 * 3);
        for y in 0..12 {
            for x in 0..12 {
                let v = if (3..9).contains(&x) && (3..9).contains(&y) {
                    10
                } else {
                    255
                };
                data.extend_from_slice(&[v, v, v]);
            }
        }
        let buffer = PixelBuffer::from_raw(data, 12, 12, 3).unwrap();

        let settings = BackgroundSettings {
            tolerance: 30.0,
            refine_iterations: 0,
            feather_radius: 0,
        };
        let mask = remove_background(&buffer, &settings).unwrap();
        assert_eq!(mask.get(0, 0), 0);
        assert_eq!(mask.get(11, 11), 0);
        assert_eq!(mask.get(5, 5), 255);
        assert_eq!(mask.stats().foreground_pixels, 36);
    }

    #[test]
    fn test_background_removal_uniform_image_selects_nothing() {
        let buffer = solid(8, 8, [40, 40, 40]);
        let settings = BackgroundSettings {
            tolerance: 0.0,
            refine_iterations: 0,
            feather_radius: 0,
        };
        let mask = remove_background(&buffer, &settings).unwrap();
        assert!(mask.is_empty());
    }
}
