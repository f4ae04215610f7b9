//! Mask morphology: erode, dilate, edge refinement and feathering.
//!
//! All passes are pure (mask in, new mask out, same dimensions), clamp to
//! the 0-255 range, treat radius 0 as the identity, and parallelize over
//! rows with rayon. Erode and dilate use a square `(2r+1)^2` window and
//! leave an `r`-pixel inset ring untouched (copied from the input), so
//! every window stays fully in bounds.

use rayon::prelude::*;

use crate::mask::Mask;

/// Shrink the selection: each interior pixel becomes the minimum of its
/// `(2 * radius + 1)^2` neighborhood.
pub fn erode(mask: &Mask, radius: usize) -> Mask {
    min_max_filter(mask, radius, false)
}

/// Grow the selection: each interior pixel becomes the maximum of its
/// `(2 * radius + 1)^2` neighborhood.
pub fn dilate(mask: &Mask, radius: usize) -> Mask {
    min_max_filter(mask, radius, true)
}

fn min_max_filter(mask: &Mask, radius: usize, take_max: bool) -> Mask {
    let (width, height) = (mask.width(), mask.height());
    if radius == 0 || width <= 2 * radius || height <= 2 * radius {
        return mask.clone();
    }

    let input = mask.data();
    let mut flat = mask.as_slice().to_vec();
    flat.par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| {
            if y < radius || y + radius >= height {
                return;
            }
            for x in radius..width - radius {
                let mut value = input[[y, x]];
                for sy in y - radius..=y + radius {
                    for sx in x - radius..=x + radius {
                        let sample = input[[sy, sx]];
                        value = if take_max {
                            value.max(sample)
                        } else {
                            value.min(sample)
                        };
                    }
                }
                row[x] = value;
            }
        });

    Mask::from_raw(flat, width, height).expect("filter preserves dimensions")
}

/// Open the mask `iterations` times: each round is an erode(1) followed by
/// a dilate(1). Removes isolated noise specks and smooths jagged
/// boundaries without materially changing the selected area; a mask with
/// no single-pixel protrusions is a fixed point.
pub fn refine_edges(mask: &Mask, iterations: usize) -> Mask {
    let mut refined = mask.clone();
    for _ in 0..iterations {
        refined = dilate(&erode(&refined, 1), 1);
    }
    refined
}

/// Gaussian kernel of width exactly `2 * radius + 1` with `sigma =
/// radius / 2`, normalized to sum 1.
fn feather_kernel(radius: usize) -> Vec<f32> {
    let sigma = radius as f32 / 2.0;
    let mut kernel: Vec<f32> = (0..2 * radius + 1)
        .map(|i| {
            let x = i as f32 - radius as f32;
            (-(x * x) / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let sum: f32 = kernel.iter().sum();
    for v in kernel.iter_mut() {
        *v /= sum;
    }
    kernel
}

/// Soften the mask boundary into a gradual band roughly `radius` pixels
/// wide. Separable two-pass (horizontal then vertical) Gaussian average;
/// borders clamp by replicating the edge pixel.
pub fn feather(mask: &Mask, radius: usize) -> Mask {
    let (width, height) = (mask.width(), mask.height());
    if radius == 0 || width == 0 || height == 0 {
        return mask.clone();
    }
    let kernel = feather_kernel(radius);
    let r = radius as isize;
    let input = mask.data();

    // Horizontal pass
    let mut temp = vec![0.0f32; width * height];
    temp.par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| {
            for x in 0..width {
                let mut sum = 0.0f32;
                for (ki, &kv) in kernel.iter().enumerate() {
                    let sx = (x as isize + ki as isize - r).clamp(0, width as isize - 1);
                    sum += input[[y, sx as usize]] as f32 * kv;
                }
                row[x] = sum;
            }
        });

    // Vertical pass
    let mut flat = vec![0u8; width * height];
    flat.par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| {
            for x in 0..width {
                let mut sum = 0.0f32;
                for (ki, &kv) in kernel.iter().enumerate() {
                    let sy = (y as isize + ki as isize - r).clamp(0, height as isize - 1);
                    sum += temp[sy as usize * width + x] * kv;
                }
                row[x] = sum.round().clamp(0.0, 255.0) as u8;
            }
        });

    Mask::from_raw(flat, width, height).expect("feather preserves dimensions")
}
