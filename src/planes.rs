// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Contains the ViewWindow, a rectangle on the complex plane, and the
//! PlaneMapper, which describes a relationship between a rectangle on
//! the integral plane with an origin at 0,0 in the upper-left corner
//! and a ViewWindow.
//!
//! Images are laid out the way they are displayed: row 0 is the top
//! of the picture and carries the largest imaginary values, so the
//! imaginary axis increases upward on screen.  Every pixel samples the
//! complex number at its centre.
use num::Complex;
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};

/// The visible region of the complex plane.  Once built, a window is
/// immutable; zooming and panning produce new windows.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Bounds", into = "Bounds")]
pub struct ViewWindow {
    real_min: f64,
    real_max: f64,
    imag_min: f64,
    imag_max: f64,
}

/// The serialised shape of a ViewWindow.  Deserialisation goes through
/// `ViewWindow::new` so a hand-edited file cannot smuggle in an
/// inverted window.
#[derive(Copy, Clone, Debug, Serialize, Deserialize)]
struct Bounds {
    real_min: f64,
    real_max: f64,
    imag_min: f64,
    imag_max: f64,
}

impl std::convert::TryFrom<Bounds> for ViewWindow {
    type Error = Error;

    fn try_from(b: Bounds) -> Result<Self> {
        ViewWindow::new(b.real_min, b.real_max, b.imag_min, b.imag_max)
    }
}

impl From<ViewWindow> for Bounds {
    fn from(w: ViewWindow) -> Self {
        Bounds {
            real_min: w.real_min,
            real_max: w.real_max,
            imag_min: w.imag_min,
            imag_max: w.imag_max,
        }
    }
}

/// True when the span between `lo` and `hi` covers more than one step
/// of double-precision resolution at their magnitude.
fn resolvable(lo: f64, hi: f64) -> bool {
    let scale = lo.abs().max(hi.abs()).max(std::f64::MIN_POSITIVE);
    hi - lo > scale * std::f64::EPSILON
}

impl ViewWindow {
    /// Validates and builds a window.  Bounds must be finite, ordered,
    /// and far enough apart that doubles can tell them apart.
    pub fn new(real_min: f64, real_max: f64, imag_min: f64, imag_max: f64) -> Result<ViewWindow> {
        if ![real_min, real_max, imag_min, imag_max]
            .iter()
            .all(|v| v.is_finite())
        {
            return Err(Error::Geometry("window bounds must be finite".to_string()));
        }
        if real_min >= real_max {
            return Err(Error::Geometry(format!(
                "real_min {} is not to the left of real_max {}",
                real_min, real_max
            )));
        }
        if imag_min >= imag_max {
            return Err(Error::Geometry(format!(
                "imag_min {} is not below imag_max {}",
                imag_min, imag_max
            )));
        }
        if !(real_max - real_min).is_finite() || !(imag_max - imag_min).is_finite() {
            return Err(Error::Geometry(
                "window span overflows double precision".to_string(),
            ));
        }
        if !resolvable(real_min, real_max) || !resolvable(imag_min, imag_max) {
            return Err(Error::Geometry(
                "window is narrower than double-precision resolution".to_string(),
            ));
        }
        Ok(ViewWindow {
            real_min,
            real_max,
            imag_min,
            imag_max,
        })
    }

    /// Builds a window from its centre and its full spans.
    pub fn from_center(center: Complex<f64>, real_span: f64, imag_span: f64) -> Result<ViewWindow> {
        ViewWindow::new(
            center.re - real_span / 2.0,
            center.re + real_span / 2.0,
            center.im - imag_span / 2.0,
            center.im + imag_span / 2.0,
        )
    }

    /// Left edge.
    pub fn real_min(&self) -> f64 {
        self.real_min
    }

    /// Right edge.
    pub fn real_max(&self) -> f64 {
        self.real_max
    }

    /// Bottom edge.
    pub fn imag_min(&self) -> f64 {
        self.imag_min
    }

    /// Top edge.
    pub fn imag_max(&self) -> f64 {
        self.imag_max
    }

    /// Width of the window on the real axis.
    pub fn real_span(&self) -> f64 {
        self.real_max - self.real_min
    }

    /// Height of the window on the imaginary axis.
    pub fn imag_span(&self) -> f64 {
        self.imag_max - self.imag_min
    }

    /// The midpoint of the window.
    pub fn center(&self) -> Complex<f64> {
        Complex::new(
            0.5 * self.real_min + 0.5 * self.real_max,
            0.5 * self.imag_min + 0.5 * self.imag_max,
        )
    }

    /// Recentres the window on `point` and scales both spans by
    /// `factor`.  A factor below one zooms in.
    pub fn zoom_at(&self, point: Complex<f64>, factor: f64) -> Result<ViewWindow> {
        if !(factor.is_finite() && factor > 0.0) {
            return Err(Error::Geometry(format!("zoom factor {} must be positive", factor)));
        }
        let half_re = self.real_span() / 2.0 * factor;
        let half_im = self.imag_span() / 2.0 * factor;
        ViewWindow::new(
            point.re - half_re,
            point.re + half_re,
            point.im - half_im,
            point.im + half_im,
        )
    }

    /// Shifts the window by fractions of its own spans.  Positive `dy`
    /// moves the window up the imaginary axis.
    pub fn pan(&self, dx: f64, dy: f64) -> Result<ViewWindow> {
        let shift_re = dx * self.real_span();
        let shift_im = dy * self.imag_span();
        ViewWindow::new(
            self.real_min + shift_re,
            self.real_max + shift_re,
            self.imag_min + shift_im,
            self.imag_max + shift_im,
        )
    }

    /// Keeps the centre and real span, and stretches the imaginary span
    /// so the window has the same aspect ratio as a `width` x `height`
    /// image.
    pub fn fit_aspect(&self, width: usize, height: usize) -> Result<ViewWindow> {
        if width == 0 || height == 0 {
            return Err(Error::Geometry(format!(
                "cannot fit a window to a {}x{} image",
                width, height
            )));
        }
        let imag_span = self.real_span() * (height as f64) / (width as f64);
        ViewWindow::from_center(self.center(), self.real_span(), imag_span)
    }

    /// True if `point` lies inside the window or on its edge.
    pub fn contains(&self, point: &Complex<f64>) -> bool {
        point.re >= self.real_min
            && point.re <= self.real_max
            && point.im >= self.imag_min
            && point.im <= self.imag_max
    }
}

impl Default for ViewWindow {
    /// The classic full view of the set.
    fn default() -> Self {
        ViewWindow {
            real_min: -2.6,
            real_max: 1.845,
            imag_min: -1.25,
            imag_max: 1.25,
        }
    }
}

/// Describes the width and height of an integral plane that is assumed to start at
/// 0,0 and all values are assumed to be non-negative integers.  For that reason,
/// the upper-left-hand corner is not included.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct IntegralPlane(pub usize, pub usize);

/// Describes the column, row of a pixel in a region.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Pixel(pub usize, pub usize);

/// Contains the definitions of two planes: an integral cartesian plane,
/// and a rectangle of the complex plane.  Maps points from one to the
/// other.
#[derive(Debug, Clone)]
pub struct PlaneMapper {
    /// The size of the integral cartesian plane.
    pub integral_plane: IntegralPlane,
    /// The rectangle of the complex plane being sampled.
    pub window: ViewWindow,
    // Centre and half-spans of the window.  Offsets are measured from
    // the centre so that rows mirrored about the middle of the grid
    // land on exactly conjugate points.
    center: Complex<f64>,
    half_spans: (f64, f64),
}

impl PlaneMapper {
    /// Maps a `width` x `height` grid onto `window`.  Both sides must be
    /// positive.
    pub fn new(width: usize, height: usize, window: ViewWindow) -> Result<PlaneMapper> {
        if width == 0 || height == 0 {
            return Err(Error::Config(format!(
                "cannot map a {}x{} grid",
                width, height
            )));
        }
        Ok(PlaneMapper {
            integral_plane: IntegralPlane(width, height),
            window,
            center: window.center(),
            half_spans: (window.real_span() / 2.0, window.imag_span() / 2.0),
        })
    }

    /// The total number of points in the integral grid.  Used to
    /// calculate memory needs.
    pub fn len(&self) -> usize {
        self.integral_plane.0 * self.integral_plane.1
    }

    /// True when the grid has no cells.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Distance on the complex plane between adjacent columns and
    /// adjacent rows.
    pub fn spacing(&self) -> (f64, f64) {
        (
            self.window.real_span() / self.integral_plane.0 as f64,
            self.window.imag_span() / self.integral_plane.1 as f64,
        )
    }

    /// Given a pixel on the integral cartesian plane, return the
    /// complex number at the centre of that pixel.
    pub fn pixel_to_point(&self, pixel: &Pixel) -> Complex<f64> {
        let w = self.integral_plane.0 as f64;
        let h = self.integral_plane.1 as f64;
        // Both offsets run over (-1, 1): left to right, top to bottom.
        let x = (2.0 * pixel.0 as f64 + 1.0 - w) / w;
        let y = (h - 2.0 * pixel.1 as f64 - 1.0) / h;
        Complex::new(
            self.center.re + self.half_spans.0 * x,
            self.center.im + self.half_spans.1 * y,
        )
    }

    /// Given a complex number, find the pixel whose area contains it,
    /// if any.
    pub fn point_to_pixel(&self, point: &Complex<f64>) -> Option<Pixel> {
        let left = (point.re - self.window.real_min) / self.window.real_span()
            * self.integral_plane.0 as f64;
        let top = (self.window.imag_max - point.im) / self.window.imag_span()
            * self.integral_plane.1 as f64;
        if !(left >= 0.0 && top >= 0.0) {
            return None;
        }
        let (left, top) = (left as usize, top as usize);
        if left >= self.integral_plane.0 || top >= self.integral_plane.1 {
            return None;
        }
        Some(Pixel(left, top))
    }
}
