//! WebAssembly exports for the MagicGrab selection engine.
//!
//! These functions are exposed to JavaScript via wasm-bindgen. Images and
//! masks cross the boundary as flat row-major arrays with explicit
//! dimensions; detection regions and groups cross as JSON strings.

use wasm_bindgen::prelude::*;

use crate::buffer::PixelBuffer;
use crate::grouping;
use crate::mask::Mask;
use crate::selection::morphology;
use crate::selection::region_grow::{self, BackgroundSettings, GrowSettings};

fn buffer_from(data: &[u8], width: usize, height: usize, channels: usize) -> PixelBuffer {
    PixelBuffer::from_raw(data.to_vec(), width, height, channels).expect("Invalid dimensions")
}

fn mask_from(data: &[u8], width: usize, height: usize) -> Mask {
    Mask::from_raw(data.to_vec(), width, height).expect("Invalid dimensions")
}

// ============================================================================
// Region growing
// ============================================================================

/// Flood fill from a seed point by color similarity.
///
/// # Arguments
/// * `data` - Flat RGB(A) bytes (length = width * height * channels)
/// * `width`, `height`, `channels` - Image dimensions (3 or 4 channels)
/// * `seed_x`, `seed_y` - Click point
/// * `tolerance` - Euclidean RGB distance threshold
///
/// # Returns
/// Flat mask bytes (length = width * height)
#[wasm_bindgen]
pub fn grow_from_seed_wasm(
    data: &[u8],
    width: usize,
    height: usize,
    channels: usize,
    seed_x: usize,
    seed_y: usize,
    tolerance: f32,
) -> Vec<u8> {
    let buffer = buffer_from(data, width, height, channels);
    let settings = GrowSettings {
        tolerance,
        min_area: 0,
        ..GrowSettings::default()
    };
    region_grow::grow_from_seed(&buffer, seed_x, seed_y, &settings, None)
        .expect("Invalid seed or tolerance")
        .into_raw()
}

/// Corner-sampled background removal.
#[wasm_bindgen]
pub fn remove_background_wasm(
    data: &[u8],
    width: usize,
    height: usize,
    channels: usize,
    tolerance: f32,
    refine_iterations: usize,
    feather_radius: usize,
) -> Vec<u8> {
    let buffer = buffer_from(data, width, height, channels);
    let settings = BackgroundSettings {
        tolerance,
        refine_iterations,
        feather_radius,
    };
    region_grow::remove_background(&buffer, &settings)
        .expect("Invalid tolerance")
        .into_raw()
}

// ============================================================================
// Mask morphology
// ============================================================================

/// Shrink the mask by `radius`.
#[wasm_bindgen]
pub fn erode_wasm(mask: &[u8], width: usize, height: usize, radius: usize) -> Vec<u8> {
    morphology::erode(&mask_from(mask, width, height), radius).into_raw()
}

/// Grow the mask by `radius`.
#[wasm_bindgen]
pub fn dilate_wasm(mask: &[u8], width: usize, height: usize, radius: usize) -> Vec<u8> {
    morphology::dilate(&mask_from(mask, width, height), radius).into_raw()
}

/// Open the mask `iterations` times (erode then dilate).
#[wasm_bindgen]
pub fn refine_edges_wasm(mask: &[u8], width: usize, height: usize, iterations: usize) -> Vec<u8> {
    morphology::refine_edges(&mask_from(mask, width, height), iterations).into_raw()
}

/// Feather the mask boundary with a Gaussian of the given radius.
#[wasm_bindgen]
pub fn feather_wasm(mask: &[u8], width: usize, height: usize, radius: usize) -> Vec<u8> {
    morphology::feather(&mask_from(mask, width, height), radius).into_raw()
}

/// Bounding box of the visibly selected samples.
///
/// # Returns
/// `[min_x, min_y, max_x, max_y]`, or an empty array for an empty mask.
#[wasm_bindgen]
pub fn mask_bounds_wasm(mask: &[u8], width: usize, height: usize) -> Vec<u32> {
    match mask_from(mask, width, height).bounds() {
        Some(b) => vec![b.min_x as u32, b.min_y as u32, b.max_x as u32, b.max_y as u32],
        None => Vec::new(),
    }
}

// ============================================================================
// Smart grouping
// ============================================================================

/// Group detected regions.
///
/// # Arguments
/// * `payload` - JSON array of detected regions
///
/// # Returns
/// JSON array of groups
#[wasm_bindgen]
pub fn group_regions_wasm(payload: &str) -> String {
    let regions = grouping::regions_from_json(payload).expect("Invalid detection payload");
    let groups = grouping::group_regions(&regions, &grouping::GroupingConfig::default());
    serde_json::to_string(&groups).expect("Groups serialize")
}
