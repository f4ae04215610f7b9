//! The live selection and its single merge rule.
//!
//! Every tool — brush, eraser, lasso, rectangle, ellipse, magic wand —
//! produces a contribution mask and funnels it through [`Compositor::apply`].
//! The compositor itself has no tool-specific logic: Add takes the
//! pixelwise maximum, Subtract saturating-subtracts. One compositor exists
//! per editing session and is dropped or cleared when the session ends.

use log::trace;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::mask::{Bounds, Mask};

/// How the next tool contribution merges with the live selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMode {
    #[default]
    Add,
    Subtract,
}

/// Owner of the live, user-editable selection mask.
#[derive(Debug, Clone, PartialEq)]
pub struct Compositor {
    live: Mask,
}

impl Compositor {
    /// Start a selection session with an empty mask.
    pub fn new(width: usize, height: usize) -> Compositor {
        Compositor {
            live: Mask::new(width, height),
        }
    }

    pub fn width(&self) -> usize {
        self.live.width()
    }

    pub fn height(&self) -> usize {
        self.live.height()
    }

    /// Merge one tool contribution into the live selection.
    ///
    /// Add: `live = max(live, contribution)`. Subtract:
    /// `live = max(0, live - contribution)`.
    ///
    /// # Errors
    /// `DimensionMismatch` when the contribution size differs from the
    /// live mask.
    pub fn apply(&mut self, contribution: &Mask, mode: SelectionMode) -> EngineResult<()> {
        if contribution.width() != self.width() || contribution.height() != self.height() {
            return Err(EngineError::DimensionMismatch {
                expected_width: self.width(),
                expected_height: self.height(),
                width: contribution.width(),
                height: contribution.height(),
            });
        }

        let live = self.live.data_mut();
        match mode {
            SelectionMode::Add => {
                live.zip_mut_with(contribution.data(), |l, &c| *l = (*l).max(c));
            }
            SelectionMode::Subtract => {
                live.zip_mut_with(contribution.data(), |l, &c| *l = l.saturating_sub(c));
            }
        }
        trace!("applied {mode:?} contribution");
        Ok(())
    }

    /// Drop the whole selection and merge a single contribution in.
    pub fn replace(&mut self, contribution: &Mask) -> EngineResult<()> {
        self.clear();
        self.apply(contribution, SelectionMode::Add)
    }

    /// Reset the live selection to fully unselected.
    pub fn clear(&mut self) {
        self.live.data_mut().fill(0);
    }

    /// Bounding box of the live selection, recomputed on demand.
    pub fn bounds(&self) -> Option<Bounds> {
        self.live.bounds()
    }

    /// Immutable snapshot of the current mask for downstream consumption.
    /// Does not clear the live selection.
    pub fn commit(&self) -> Mask {
        self.live.clone()
    }

    pub fn mask(&self) -> &Mask {
        &self.live
    }
}
