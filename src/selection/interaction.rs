//! Pointer interaction: from gesture events to compositor contributions.
//!
//! A [`SelectionSession`] tracks the stroke state machine (`Idle`
//! <-> `Drawing`), the active tool and merge mode, and owns the session's
//! [`Compositor`]. Tool and mode selectors persist across strokes;
//! changing either mid-stroke is treated as an implicit cancel. Brush and
//! eraser stamp on the fly so the live preview updates incrementally;
//! lasso, rectangle and ellipse convert their geometry once on pointer-up;
//! the magic wand fires on pointer-down with no drag phase.

use log::trace;

use crate::buffer::PixelBuffer;
use crate::error::{EngineError, EngineResult};
use crate::mask::{Bounds, Mask};
use crate::selection::compositor::{Compositor, SelectionMode};
use crate::selection::edge::EdgeMap;
use crate::selection::region_grow::GrowSettings;
use crate::selection::tools::{self, BrushSettings, ToolKind};

#[derive(Debug, Clone, PartialEq)]
enum StrokeState {
    Idle,
    Drawing {
        anchor: (f32, f32),
        path: Vec<(f32, f32)>,
    },
}

/// One interactive selection session over a fixed-size canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionSession {
    compositor: Compositor,
    tool: ToolKind,
    mode: SelectionMode,
    brush: BrushSettings,
    wand: GrowSettings,
    stroke: StrokeState,
}

impl SelectionSession {
    /// Start a session with an empty selection.
    pub fn new(width: usize, height: usize) -> SelectionSession {
        SelectionSession {
            compositor: Compositor::new(width, height),
            tool: ToolKind::MagicWand,
            mode: SelectionMode::Add,
            brush: BrushSettings::default(),
            wand: GrowSettings::default(),
            stroke: StrokeState::Idle,
        }
    }

    /// Start a session sized to `buffer`.
    pub fn for_buffer(buffer: &PixelBuffer) -> SelectionSession {
        SelectionSession::new(buffer.width(), buffer.height())
    }

    pub fn tool(&self) -> ToolKind {
        self.tool
    }

    /// Switch tools. Switching mid-stroke discards the stroke in progress.
    pub fn set_tool(&mut self, tool: ToolKind) {
        if self.is_drawing() {
            self.cancel();
        }
        self.tool = tool;
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    /// Switch merge mode. Switching mid-stroke discards the stroke in
    /// progress.
    pub fn set_mode(&mut self, mode: SelectionMode) {
        if self.is_drawing() {
            self.cancel();
        }
        self.mode = mode;
    }

    pub fn brush(&self) -> BrushSettings {
        self.brush
    }

    pub fn set_brush(&mut self, brush: BrushSettings) {
        self.brush = brush;
    }

    pub fn wand(&self) -> GrowSettings {
        self.wand
    }

    pub fn set_wand(&mut self, wand: GrowSettings) {
        self.wand = wand;
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self.stroke, StrokeState::Drawing { .. })
    }

    /// The eraser always subtracts; every other tool follows the session
    /// mode.
    fn effective_mode(&self) -> SelectionMode {
        if self.tool == ToolKind::Eraser {
            SelectionMode::Subtract
        } else {
            self.mode
        }
    }

    /// Begin a stroke (or, for the magic wand, fire it).
    ///
    /// # Errors
    /// `DimensionMismatch` when `buffer` does not match the session
    /// canvas; wand errors propagate from the region grower.
    pub fn pointer_down(
        &mut self,
        buffer: &PixelBuffer,
        x: f32,
        y: f32,
        edges: Option<&EdgeMap>,
    ) -> EngineResult<()> {
        if buffer.width() != self.compositor.width() || buffer.height() != self.compositor.height()
        {
            return Err(EngineError::DimensionMismatch {
                expected_width: self.compositor.width(),
                expected_height: self.compositor.height(),
                width: buffer.width(),
                height: buffer.height(),
            });
        }

        match self.tool {
            ToolKind::MagicWand => {
                // Single click, no drag phase.
                let seed_x = (x.floor().max(0.0) as usize).min(buffer.width() - 1);
                let seed_y = (y.floor().max(0.0) as usize).min(buffer.height() - 1);
                let contribution =
                    tools::magic_wand_mask(buffer, seed_x, seed_y, &self.wand, edges)?;
                self.compositor.apply(&contribution, self.effective_mode())?;
            }
            ToolKind::Brush | ToolKind::Eraser => {
                self.stroke = StrokeState::Drawing {
                    anchor: (x, y),
                    path: vec![(x, y)],
                };
                let stamp = tools::brush_stamp(
                    self.compositor.width(),
                    self.compositor.height(),
                    x,
                    y,
                    &self.brush,
                );
                self.compositor.apply(&stamp, self.effective_mode())?;
            }
            ToolKind::Lasso | ToolKind::Rectangle | ToolKind::Ellipse => {
                self.stroke = StrokeState::Drawing {
                    anchor: (x, y),
                    path: vec![(x, y)],
                };
            }
        }
        trace!("pointer down at ({x}, {y}) with {:?}", self.tool);
        Ok(())
    }

    /// Extend the stroke in progress. Ignored while idle.
    pub fn pointer_move(&mut self, x: f32, y: f32) -> EngineResult<()> {
        let StrokeState::Drawing { ref mut path, .. } = self.stroke else {
            return Ok(());
        };

        match self.tool {
            ToolKind::Brush | ToolKind::Eraser => {
                path.push((x, y));
                let stamp = tools::brush_stamp(
                    self.compositor.width(),
                    self.compositor.height(),
                    x,
                    y,
                    &self.brush,
                );
                self.compositor.apply(&stamp, self.effective_mode())?;
            }
            ToolKind::Lasso => {
                path.push((x, y));
            }
            ToolKind::Rectangle | ToolKind::Ellipse => {
                // Only the latest drag end-point matters.
                path.clear();
                path.push((x, y));
            }
            ToolKind::MagicWand => {}
        }
        Ok(())
    }

    /// Finish the stroke: convert its geometry and merge the contribution.
    pub fn pointer_up(&mut self) -> EngineResult<()> {
        let StrokeState::Drawing { anchor, path } = std::mem::replace(&mut self.stroke, StrokeState::Idle)
        else {
            return Ok(());
        };

        let (width, height) = (self.compositor.width(), self.compositor.height());
        let contribution = match self.tool {
            // Already stamped incrementally.
            ToolKind::Brush | ToolKind::Eraser | ToolKind::MagicWand => None,
            ToolKind::Lasso => Some(tools::lasso_mask(width, height, &path)),
            ToolKind::Rectangle => {
                let end = path.last().copied().unwrap_or(anchor);
                Some(tools::rect_mask(width, height, anchor, end))
            }
            ToolKind::Ellipse => {
                let end = path.last().copied().unwrap_or(anchor);
                Some(tools::ellipse_mask(width, height, anchor, end))
            }
        };

        if let Some(contribution) = contribution {
            self.compositor.apply(&contribution, self.effective_mode())?;
        }
        trace!("pointer up, {:?} stroke finalized", self.tool);
        Ok(())
    }

    /// Discard the stroke in progress without contributing anything.
    pub fn cancel(&mut self) {
        if self.is_drawing() {
            trace!("stroke cancelled");
        }
        self.stroke = StrokeState::Idle;
    }

    /// Snapshot of the live selection (does not end the session).
    pub fn commit(&self) -> Mask {
        self.compositor.commit()
    }

    /// Reset the live selection to empty.
    pub fn clear(&mut self) {
        self.compositor.clear();
    }

    pub fn bounds(&self) -> Option<Bounds> {
        self.compositor.bounds()
    }

    pub fn mask(&self) -> &Mask {
        self.compositor.mask()
    }

    pub fn compositor(&self) -> &Compositor {
        &self.compositor
    }
}
