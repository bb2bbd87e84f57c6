// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! State for an interactive explorer.
//!
//! The renderer itself remembers nothing between calls.  Whatever an
//! explorer needs to carry from one frame to the next (where it is
//! looking, how far it has zoomed, where it has been, which render
//! request is the newest) lives here and is passed into every render
//! explicitly.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use log::{debug, info};
use num::Complex;

use crate::config::RenderConfig;
use crate::errors::Result;
use crate::pixels::PixelBuffer;
use crate::planes::{Pixel, PlaneMapper, ViewWindow};

/// How many views `Explorer::back` can step through.
pub const HISTORY_LIMIT: usize = 20;

/// Upper bound for the dynamic iteration budget.
pub const ITERATION_CEILING: usize = 50_000;

/// Decimal digits a double can be trusted with.
pub const FLOAT64_DIGITS: u32 = 15;

/// Iteration budget for a zoom level: the base budget at zoom one or
/// less, growing with the logarithm of the zoom beyond that.
pub fn estimate_iterations(zoom: f64, base: usize) -> usize {
    if zoom <= 1.0 {
        return base;
    }
    let base_f = base as f64;
    let estimated = (base_f * (zoom + 1.0).log10() + base_f) as usize;
    estimated.min(ITERATION_CEILING)
}

/// Stripe density and palette cycles that keep deep zooms lively.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ColorHint {
    /// Stripe density.
    pub stripe_density: f64,
    /// Palette cycles.
    pub cycles: u32,
}

/// Colour settings suited to a zoom level.  Deeper views get denser stripes
/// and more palette cycles.
pub fn color_hint(zoom: f64) -> ColorHint {
    let (stripe_density, cycles) = if zoom < 10.0 {
        (16.0, 32)
    } else if zoom < 100.0 {
        (20.0, 48)
    } else if zoom < 1000.0 {
        (24.0, 64)
    } else {
        (32.0, 96)
    };
    ColorHint {
        stripe_density,
        cycles,
    }
}

/// How close a zoom level is to the limit of double precision.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Precision {
    /// Significant decimal digits needed to tell neighbouring pixels apart.
    pub digits_needed: u32,
    /// Digits a double can resolve.
    pub float64_digits: u32,
    /// Set once more than 12 digits are needed.
    pub warning: bool,
    /// Share of the available digits in use, capped at 100.
    pub percent: f64,
}

/// Precision report for a zoom level.
pub fn precision_at(zoom: f64) -> Precision {
    let zoom = if zoom.is_finite() { zoom.max(1.0) } else { 1.0 };
    let digits_needed = (zoom.log10().floor() as u32 + 2).max(1);
    Precision {
        digits_needed,
        float64_digits: FLOAT64_DIGITS,
        warning: digits_needed > 12,
        percent: (f64::from(digits_needed) / f64::from(FLOAT64_DIGITS) * 100.0).min(100.0),
    }
}

/// The navigation state of one explorer window.
#[derive(Clone, Debug)]
pub struct Explorer {
    home: ViewWindow,
    view: ViewWindow,
    zoom: f64,
    history: VecDeque<(ViewWindow, f64)>,
    base_iterations: usize,
    maxiter: usize,
    dynamic_iterations: bool,
}

impl Default for Explorer {
    fn default() -> Self {
        Explorer::new(ViewWindow::default(), 500)
    }
}

impl Explorer {
    /// An explorer sitting at `home` with dynamic iterations on.
    pub fn new(home: ViewWindow, base_iterations: usize) -> Explorer {
        Explorer {
            home,
            view: home,
            zoom: 1.0,
            history: VecDeque::with_capacity(HISTORY_LIMIT),
            base_iterations,
            maxiter: base_iterations,
            dynamic_iterations: true,
        }
    }

    /// The window currently shown.
    pub fn view(&self) -> &ViewWindow {
        &self.view
    }

    /// Magnification relative to the home view.
    pub fn zoom_level(&self) -> f64 {
        self.zoom
    }

    /// The iteration budget the next render should use.
    pub fn maxiter(&self) -> usize {
        self.maxiter
    }

    /// Number of views `back` can return to.
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Switches dynamic iteration budgets on or off.
    pub fn set_dynamic_iterations(&mut self, enabled: bool) {
        self.dynamic_iterations = enabled;
        self.update_iterations();
    }

    /// Changes the budget used at zoom one.
    pub fn set_base_iterations(&mut self, base: usize) {
        self.base_iterations = base;
        if self.dynamic_iterations {
            self.update_iterations();
        } else {
            self.maxiter = base;
        }
    }

    /// A configuration for the current view, built from `template` with
    /// the explorer's iteration budget.
    pub fn config(&self, template: &RenderConfig) -> Result<RenderConfig> {
        template.to_builder().maxiter(self.maxiter).build()
    }

    /// How close the current zoom is to the precision floor.
    pub fn precision(&self) -> Precision {
        precision_at(self.zoom)
    }

    /// Suggested colour settings for the current zoom.
    pub fn color_hint(&self) -> ColorHint {
        color_hint(self.zoom)
    }

    /// The complex number under pixel (`x`, `y`) of a `width` x
    /// `height` image of the current view, or `None` off the image.
    pub fn point_at(&self, x: usize, y: usize, width: usize, height: usize) -> Result<Option<Complex<f64>>> {
        let plane = PlaneMapper::new(width, height, self.view)?;
        if x >= width || y >= height {
            return Ok(None);
        }
        Ok(Some(plane.pixel_to_point(&Pixel(x, y))))
    }

    /// Recentres on the given pixel and scales the view by `factor`;
    /// the zoom level changes by the inverse factor.  Returns false
    /// when the pixel is off the image.
    pub fn zoom_at_pixel(
        &mut self,
        x: usize,
        y: usize,
        width: usize,
        height: usize,
        factor: f64,
    ) -> Result<bool> {
        let point = match self.point_at(x, y, width, height)? {
            Some(point) => point,
            None => return Ok(false),
        };
        let next = self.view.zoom_at(point, factor)?;
        self.remember();
        self.view = next;
        self.zoom /= factor;
        self.update_iterations();
        debug!("zoomed to {:.1}x around {}", self.zoom, point);
        Ok(true)
    }

    /// A click: four times closer.
    pub fn zoom_in_at(&mut self, x: usize, y: usize, width: usize, height: usize) -> Result<bool> {
        self.zoom_at_pixel(x, y, width, height, 0.25)
    }

    /// A right click: four times further away.
    pub fn zoom_out_at(&mut self, x: usize, y: usize, width: usize, height: usize) -> Result<bool> {
        self.zoom_at_pixel(x, y, width, height, 4.0)
    }

    /// A wheel step: twice as close for a positive delta, twice as far
    /// otherwise.
    pub fn wheel_at(
        &mut self,
        x: usize,
        y: usize,
        width: usize,
        height: usize,
        delta: i32,
    ) -> Result<bool> {
        let factor = if delta > 0 { 0.5 } else { 2.0 };
        self.zoom_at_pixel(x, y, width, height, factor)
    }

    /// Moves the view by fractions of its spans, remembering where it was.
    pub fn pan(&mut self, dx: f64, dy: f64) -> Result<()> {
        let next = self.view.pan(dx, dy)?;
        self.remember();
        self.view = next;
        Ok(())
    }

    /// Steps back to the previous view.  Returns false when there is
    /// no history left.
    pub fn back(&mut self) -> bool {
        match self.history.pop_back() {
            Some((view, zoom)) => {
                self.view = view;
                self.zoom = zoom;
                self.update_iterations();
                true
            }
            None => false,
        }
    }

    /// Returns to the home view, stretched to the aspect ratio of a
    /// `width` x `height` image, with the base iteration budget.
    pub fn reset_home(&mut self, width: usize, height: usize) -> Result<()> {
        let next = self.home.fit_aspect(width, height)?;
        self.remember();
        self.view = next;
        self.zoom = 1.0;
        self.maxiter = self.base_iterations;
        Ok(())
    }

    /// Keeps the current view's centre and real span but matches the
    /// aspect ratio of a `width` x `height` image.
    pub fn fit_to(&mut self, width: usize, height: usize) -> Result<()> {
        self.view = self.view.fit_aspect(width, height)?;
        Ok(())
    }

    fn remember(&mut self) {
        if self.history.len() >= HISTORY_LIMIT {
            self.history.pop_front();
        }
        self.history.push_back((self.view, self.zoom));
    }

    // Only moves the budget when it is off by more than ten percent, so
    // small zoom changes do not force a full recomputation.
    fn update_iterations(&mut self) {
        if !self.dynamic_iterations {
            return;
        }
        let wanted = estimate_iterations(self.zoom, self.base_iterations);
        let current = self.maxiter as f64;
        if (wanted as f64 - current).abs() > 0.1 * current {
            info!("iterations adjusted to {}", wanted);
            self.maxiter = wanted;
        }
    }
}

/// Identifies one render request.  Later requests have larger ids.
pub type RequestId = u64;

/// Hands out request ids and keeps the most recent finished render.
/// A result is only accepted when it answers the newest request, so a
/// slow render that was superseded can never replace a newer picture.
/// Accepted buffers are swapped in whole, never modified in place.
#[derive(Debug, Default)]
pub struct RenderRequests {
    issued: AtomicU64,
    shown: Mutex<Option<(RequestId, Arc<PixelBuffer>)>>,
}

impl RenderRequests {
    /// No requests issued, nothing shown.
    pub fn new() -> RenderRequests {
        RenderRequests::default()
    }

    /// Starts a new request, superseding every earlier one.
    pub fn issue(&self) -> RequestId {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// True if no request has been issued since `id`.
    pub fn is_current(&self, id: RequestId) -> bool {
        self.issued.load(Ordering::SeqCst) == id
    }

    fn slot(&self) -> MutexGuard<'_, Option<(RequestId, Arc<PixelBuffer>)>> {
        match self.shown.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Offers a finished render.  Returns true if it became the
    /// displayed picture, false if it was stale and dropped.
    pub fn publish(&self, id: RequestId, buffer: PixelBuffer) -> bool {
        let mut shown = self.slot();
        let newer_than_shown = shown.as_ref().map_or(true, |(current, _)| id > *current);
        if !(self.is_current(id) && newer_than_shown) {
            debug!("dropping stale render {}", id);
            return false;
        }
        *shown = Some((id, Arc::new(buffer)));
        true
    }

    /// The picture currently on display, if any.
    pub fn latest(&self) -> Option<(RequestId, Arc<PixelBuffer>)> {
        self.slot().clone()
    }
}
