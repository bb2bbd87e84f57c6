// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The escape-time field computer.
//!
//! Every cell of the (oversampled) grid is mapped to a point `c` on
//! the complex plane and the orbit of zero under `z -> z² + c` is
//! followed until it leaves a disc of radius `ESCAPE_RADIUS` or the
//! iteration budget runs out.  Escaped cells record a continuous
//! (fractional) escape count; cells that never leave record no count
//! at all and are treated as members of the set.
//!
//! Alongside the orbit we track its derivative with respect to `c`,
//! which gives a surface normal for lighting, and optionally the
//! average of `sin(density * arg z)` over the orbit, which drives
//! stripe colouring.
//!
//! All arithmetic is double precision.  Windows narrower than the
//! spacing between adjacent doubles are refused when the ViewWindow is
//! built; windows whose *pixels* are narrower than that still render,
//! but the picture degenerates into blocks and bands.

use std::time::Instant;

use log::{debug, warn};
use num::Complex;

use crate::config::RenderConfig;
use crate::errors::Result;
use crate::planes::{Pixel, PlaneMapper, ViewWindow};
use crate::workers;

/// Bailout radius.  Much larger than the minimal 2 so the smooth
/// escape count is accurate.
pub const ESCAPE_RADIUS: f64 = 1e5;

const ESCAPE_RADIUS_SQR: f64 = ESCAPE_RADIUS * ESCAPE_RADIUS;

/// What the field computer knows about one cell.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Sample {
    /// The continuous escape count, or `None` for cells that did not
    /// escape within the budget (or whose orbit stopped being finite).
    pub escape: Option<f64>,
    /// Mean stripe signal over the orbit, in [0, 1].  Zero when stripe
    /// colouring was not requested.
    pub stripe: f64,
    /// Unit vector along `z / dz` at escape; zero when the derivative
    /// is degenerate.
    pub normal: Complex<f64>,
    /// `|dz|` at escape.
    pub derivative: f64,
}

impl Sample {
    /// The sentinel for cells inside the set.
    pub const INTERIOR: Sample = Sample {
        escape: None,
        stripe: 0.0,
        normal: Complex { re: 0.0, im: 0.0 },
        derivative: 0.0,
    };

    /// True for cells inside the set.
    pub fn is_interior(&self) -> bool {
        self.escape.is_none()
    }
}

fn surface_normal(z: Complex<f64>, dz: Complex<f64>) -> Complex<f64> {
    let zero = Complex::new(0.0, 0.0);
    if !(dz.norm_sqr() > 0.0) {
        return zero;
    }
    let u = z / dz;
    let len = u.norm();
    if len > 0.0 && len.is_finite() {
        u / len
    } else {
        zero
    }
}

/// Follows the orbit of `c` for at most `maxiter` iterations.  A
/// `stripe_density` of zero skips the stripe average.
pub fn iterate(c: Complex<f64>, maxiter: usize, stripe_density: f64) -> Sample {
    if !(c.re.is_finite() && c.im.is_finite()) {
        return Sample::INTERIOR;
    }
    let stripes = stripe_density > 0.0;
    let mut z: Complex<f64> = Complex::new(0.0, 0.0);
    let mut dz: Complex<f64> = Complex::new(0.0, 0.0);
    let mut stripe_sum = 0.0;

    for n in 1..=maxiter {
        dz = z * dz * 2.0 + 1.0;
        z = z * z + c;
        let norm_sqr = z.norm_sqr();
        if !norm_sqr.is_finite() {
            return Sample::INTERIOR;
        }
        if norm_sqr > ESCAPE_RADIUS_SQR {
            let r = norm_sqr.sqrt();
            // A first iterate far past the radius would push the count
            // below zero.
            let escape = (n as f64 + 1.0 - (r.ln() / ESCAPE_RADIUS.ln()).ln() / std::f64::consts::LN_2)
                .max(0.0);
            // The escaping iterate itself is not part of the average.
            let sampled = n - 1;
            let stripe = if stripes && sampled > 0 {
                stripe_sum / sampled as f64
            } else {
                0.0
            };
            return Sample {
                escape: Some(escape),
                stripe,
                normal: surface_normal(z, dz),
                derivative: dz.norm(),
            };
        }
        if stripes {
            stripe_sum += 0.5 + 0.5 * (stripe_density * z.arg()).sin();
        }
    }
    Sample::INTERIOR
}

/// A grid of samples, one per oversampled cell, stored row by row with
/// row 0 at the top of the picture.
#[derive(Clone, Debug, PartialEq)]
pub struct EscapeField {
    width: usize,
    height: usize,
    oversample: usize,
    maxiter: usize,
    stripes: bool,
    samples: Vec<Sample>,
}

impl EscapeField {
    /// Width of the oversampled grid.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height of the oversampled grid.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Cells per output pixel along each axis.
    pub fn oversample(&self) -> usize {
        self.oversample
    }

    /// Size of the image this field downsamples into.
    pub fn output_size(&self) -> (usize, usize) {
        (self.width / self.oversample, self.height / self.oversample)
    }

    /// The iteration budget the field was computed with.
    pub fn maxiter(&self) -> usize {
        self.maxiter
    }

    /// Whether the stripe average was accumulated.
    pub fn has_stripes(&self) -> bool {
        self.stripes
    }

    /// The sample at column `col`, row `row` of the oversampled grid.
    pub fn get(&self, col: usize, row: usize) -> &Sample {
        &self.samples[row * self.width + col]
    }

    /// All samples, row by row.
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// The share of cells that never escaped.
    pub fn interior_fraction(&self) -> f64 {
        let inside = self.samples.iter().filter(|s| s.is_interior()).count();
        inside as f64 / self.samples.len() as f64
    }
}

/// Computes the escape field of `view` at the oversampled resolution
/// `config` asks for.
pub fn render_field(view: &ViewWindow, config: &RenderConfig) -> Result<EscapeField> {
    let (width, height) = config.grid_size();
    let plane = PlaneMapper::new(width, height, *view)?;
    let maxiter = config.maxiter();
    let density = config.style().stripes.density;

    let (dx, dy) = plane.spacing();
    let center = view.center();
    let floor = center.re.abs().max(center.im.abs()).max(1.0) * std::f64::EPSILON;
    if dx < floor || dy < floor {
        warn!(
            "pixel spacing {:e} x {:e} is below double precision at this depth; expect banding",
            dx, dy
        );
    }

    debug!(
        "computing {}x{} field (oversample {}), maxiter {}, {} threads",
        width,
        height,
        config.oversample(),
        maxiter,
        config.threads()
    );
    let start = Instant::now();

    let mut samples = vec![Sample::INTERIOR; plane.len()];
    workers::for_each_row(&mut samples, width, config.threads(), |row, cells| {
        for (col, cell) in cells.iter_mut().enumerate() {
            *cell = iterate(plane.pixel_to_point(&Pixel(col, row)), maxiter, density);
        }
    })?;

    debug!("field computed in {:?}", start.elapsed());
    Ok(EscapeField {
        width,
        height,
        oversample: config.oversample(),
        maxiter,
        stripes: density > 0.0,
        samples,
    })
}
