// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Zoom animations.  A ZoomPath only knows where each frame looks;
//! rendering and encoding the frames is up to the caller.

use log::debug;
use num::Complex;

use crate::config::RenderConfig;
use crate::errors::{Error, Result};
use crate::navigation::estimate_iterations;
use crate::pixels::PixelBuffer;
use crate::planes::ViewWindow;

/// A zoom from `start` toward `target`, magnifying by `zoom` over
/// `frames` frames.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ZoomPath {
    start: ViewWindow,
    target: Complex<f64>,
    zoom: f64,
    frames: usize,
}

impl ZoomPath {
    /// Checks the path: at least one frame, a positive finite zoom and a
    /// finite target.
    pub fn new(start: ViewWindow, target: Complex<f64>, zoom: f64, frames: usize) -> Result<ZoomPath> {
        if frames == 0 {
            return Err(Error::EmptyAnimation);
        }
        if !(zoom.is_finite() && zoom > 0.0) {
            return Err(Error::Geometry(format!("zoom factor {} must be positive", zoom)));
        }
        if !(target.re.is_finite() && target.im.is_finite()) {
            return Err(Error::Geometry("zoom target must be finite".to_string()));
        }
        Ok(ZoomPath {
            start,
            target,
            zoom,
            frames,
        })
    }

    /// Number of frames.
    pub fn len(&self) -> usize {
        self.frames
    }

    /// Always false; a path has at least one frame.
    pub fn is_empty(&self) -> bool {
        self.frames == 0
    }

    // Position along the path, 0 at the first frame and 1 at the last.
    fn progress(&self, frame: usize) -> f64 {
        if self.frames == 1 {
            return 0.0;
        }
        frame.min(self.frames - 1) as f64 / (self.frames - 1) as f64
    }

    /// Magnification of `frame` relative to the start window.  Spans
    /// shrink geometrically, so every frame zooms by the same ratio.
    pub fn zoom_at_frame(&self, frame: usize) -> f64 {
        self.zoom.powf(self.progress(frame))
    }

    /// The window shown in `frame`.  Frames past the end repeat the
    /// last one.
    pub fn window(&self, frame: usize) -> Result<ViewWindow> {
        let scale = 1.0 / self.zoom_at_frame(frame);
        let end_scale = 1.0 / self.zoom;
        // The centre travels in step with the span already shed, so it
        // arrives at the target exactly when the span does.
        let travelled = if (1.0 - end_scale).abs() > std::f64::EPSILON {
            (1.0 - scale) / (1.0 - end_scale)
        } else {
            self.progress(frame)
        };
        let origin = self.start.center();
        let center = origin + (self.target - origin) * travelled;
        ViewWindow::from_center(
            center,
            self.start.real_span() * scale,
            self.start.imag_span() * scale,
        )
    }

    /// Every frame's window, in order.
    pub fn windows(&self) -> Result<Vec<ViewWindow>> {
        (0..self.frames).map(|frame| self.window(frame)).collect()
    }

    /// Iteration budget for `frame`, grown with its magnification the
    /// way the explorer grows it.
    pub fn iterations(&self, frame: usize, base: usize) -> usize {
        estimate_iterations(self.zoom_at_frame(frame), base)
    }
}

/// Renders every frame of `path` with `config`.  With
/// `dynamic_iterations` the iteration budget follows each frame's
/// magnification, starting from the budget in `config`.
pub fn render_frames(path: &ZoomPath, config: &RenderConfig, dynamic_iterations: bool) -> Result<Vec<PixelBuffer>> {
    let mut frames = Vec::with_capacity(path.len());
    for (index, window) in path.windows()?.iter().enumerate() {
        let frame_config = if dynamic_iterations {
            config
                .to_builder()
                .maxiter(path.iterations(index, config.maxiter()))
                .build()?
        } else {
            config.clone()
        };
        debug!(
            "frame {}/{}: zoom {:.3}, maxiter {}",
            index + 1,
            path.len(),
            path.zoom_at_frame(index),
            frame_config.maxiter()
        );
        frames.push(crate::render(window, &frame_config)?);
    }
    Ok(frames)
}
