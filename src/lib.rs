//! MagicGrab selection engine
//!
//! The raster selection, mask-refinement and smart-grouping core of the
//! MagicGrab editor, with Python bindings via PyO3 and WASM bindings for
//! JavaScript.
//!
//! ## Data model
//! - Images are `(height, width, channels)` u8 arrays with 3 (RGB) or 4
//!   (RGBA) channels; the engine never decodes files itself.
//! - Masks are single-channel `(height, width)` byte planes: 0 =
//!   unselected, 255 = fully selected, intermediate values are feathered
//!   edges. A mask's bounding box is always derived on demand.
//!
//! ## Architecture
//! All heavy passes (flood fill, morphology, feathering) are pure
//! functions from input buffers to fresh output buffers, so they are safe
//! to run on a worker as long as the caller awaits completion before the
//! next contribution. Stateful pieces are arena-scoped to one editing
//! session: a [`selection::Compositor`] owns the live mask, a
//! [`selection::SelectionSession`] owns the stroke state machine, and
//! nothing survives the session.

pub mod buffer;
pub mod error;
pub mod grouping;
pub mod mask;
pub mod selection;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use buffer::PixelBuffer;
pub use error::{EngineError, EngineResult};
pub use mask::{Bounds, Mask};

// Python bindings (only when python feature is enabled)
#[cfg(feature = "python")]
mod python {
    use numpy::{IntoPyArray, PyArray2, PyReadonlyArray2, PyReadonlyArray3};
    use pyo3::exceptions::PyValueError;
    use pyo3::prelude::*;

    use crate::buffer::PixelBuffer;
    use crate::error::EngineError;
    use crate::grouping;
    use crate::mask::Mask;
    use crate::selection::morphology;
    use crate::selection::region_grow::{self, BackgroundSettings, GrowSettings};

    fn engine_err(err: EngineError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }

    fn buffer_from(image: &PyReadonlyArray3<'_, u8>) -> PyResult<PixelBuffer> {
        PixelBuffer::from_pixels(image.as_array().to_owned()).map_err(engine_err)
    }

    fn mask_from(mask: &PyReadonlyArray2<'_, u8>) -> Mask {
        Mask::from_array(mask.as_array().to_owned())
    }

    // ========================================================================
    // Region growing
    // ========================================================================

    /// Flood fill from a seed point by color similarity.
    ///
    /// Returns the selection mask as a (height, width) u8 array.
    #[pyfunction]
    #[pyo3(signature = (image, seed_x, seed_y, tolerance=32.0, min_area=0))]
    pub fn grow_from_seed<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        seed_x: usize,
        seed_y: usize,
        tolerance: f32,
        min_area: usize,
    ) -> PyResult<Bound<'py, PyArray2<u8>>> {
        let buffer = buffer_from(&image)?;
        let settings = GrowSettings {
            tolerance,
            min_area,
            ..GrowSettings::default()
        };
        let mask = region_grow::grow_from_seed(&buffer, seed_x, seed_y, &settings, None)
            .map_err(engine_err)?;
        Ok(mask.data().to_owned().into_pyarray(py))
    }

    /// Corner-sampled background removal.
    ///
    /// Foreground = everything farther than `tolerance` from the average
    /// corner color, opened and feathered as requested.
    #[pyfunction]
    #[pyo3(signature = (image, tolerance=30.0, refine_iterations=1, feather_radius=2))]
    pub fn remove_background<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        tolerance: f32,
        refine_iterations: usize,
        feather_radius: usize,
    ) -> PyResult<Bound<'py, PyArray2<u8>>> {
        let buffer = buffer_from(&image)?;
        let settings = BackgroundSettings {
            tolerance,
            refine_iterations,
            feather_radius,
        };
        let mask = region_grow::remove_background(&buffer, &settings).map_err(engine_err)?;
        Ok(mask.data().to_owned().into_pyarray(py))
    }

    // ========================================================================
    // Mask morphology
    // ========================================================================

    /// Shrink the mask by `radius`.
    #[pyfunction]
    pub fn erode<'py>(
        py: Python<'py>,
        mask: PyReadonlyArray2<'py, u8>,
        radius: usize,
    ) -> Bound<'py, PyArray2<u8>> {
        let result = morphology::erode(&mask_from(&mask), radius);
        result.data().to_owned().into_pyarray(py)
    }

    /// Grow the mask by `radius`.
    #[pyfunction]
    pub fn dilate<'py>(
        py: Python<'py>,
        mask: PyReadonlyArray2<'py, u8>,
        radius: usize,
    ) -> Bound<'py, PyArray2<u8>> {
        let result = morphology::dilate(&mask_from(&mask), radius);
        result.data().to_owned().into_pyarray(py)
    }

    /// Open the mask `iterations` times (erode then dilate).
    #[pyfunction]
    #[pyo3(signature = (mask, iterations=1))]
    pub fn refine_edges<'py>(
        py: Python<'py>,
        mask: PyReadonlyArray2<'py, u8>,
        iterations: usize,
    ) -> Bound<'py, PyArray2<u8>> {
        let result = morphology::refine_edges(&mask_from(&mask), iterations);
        result.data().to_owned().into_pyarray(py)
    }

    /// Feather the mask boundary with a Gaussian of the given radius.
    #[pyfunction]
    pub fn feather<'py>(
        py: Python<'py>,
        mask: PyReadonlyArray2<'py, u8>,
        radius: usize,
    ) -> Bound<'py, PyArray2<u8>> {
        let result = morphology::feather(&mask_from(&mask), radius);
        result.data().to_owned().into_pyarray(py)
    }

    /// Bounding box of the visibly selected samples as
    /// `(min_x, min_y, max_x, max_y)`, or `None` for an empty mask.
    #[pyfunction]
    pub fn mask_bounds(mask: PyReadonlyArray2<'_, u8>) -> Option<(usize, usize, usize, usize)> {
        mask_from(&mask)
            .bounds()
            .map(|b| (b.min_x, b.min_y, b.max_x, b.max_y))
    }

    // ========================================================================
    // Smart grouping
    // ========================================================================

    /// Group detected regions. Input and output are JSON: a list of
    /// regions in, a list of groups out.
    #[pyfunction]
    #[pyo3(signature = (payload, config=None))]
    pub fn group_regions(payload: &str, config: Option<&str>) -> PyResult<String> {
        let regions = grouping::regions_from_json(payload)
            .map_err(|e| PyValueError::new_err(e.to_string()))?;
        let config = match config {
            Some(raw) => {
                serde_json::from_str(raw).map_err(|e| PyValueError::new_err(e.to_string()))?
            }
            None => grouping::GroupingConfig::default(),
        };
        let groups = grouping::group_regions(&regions, &config);
        serde_json::to_string(&groups).map_err(|e| PyValueError::new_err(e.to_string()))
    }

    /// MagicGrab Rust extension module
    #[pymodule]
    pub fn magicgrab_rust(m: &Bound<'_, PyModule>) -> PyResult<()> {
        // Region growing
        m.add_function(wrap_pyfunction!(grow_from_seed, m)?)?;
        m.add_function(wrap_pyfunction!(remove_background, m)?)?;

        // Mask morphology
        m.add_function(wrap_pyfunction!(erode, m)?)?;
        m.add_function(wrap_pyfunction!(dilate, m)?)?;
        m.add_function(wrap_pyfunction!(refine_edges, m)?)?;
        m.add_function(wrap_pyfunction!(feather, m)?)?;
        m.add_function(wrap_pyfunction!(mask_bounds, m)?)?;

        // Smart grouping
        m.add_function(wrap_pyfunction!(group_regions, m)?)?;

        Ok(())
    }
}

#[cfg(feature = "python")]
pub use python::magicgrab_rust;
