#![deny(missing_docs)]
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Smooth Mandelbrot renderer
//!
//! The Mandelbrot set is the set of points `c` on the complex plane
//! for which the orbit of zero under `z -> z² + c` stays bounded.
//! Points outside the set escape to infinity, some quickly and some
//! after a very long time; how long they take is the "escape time",
//! and colouring by it produces the familiar pictures.
//!
//! Counting whole iterations produces visible bands.  This crate
//! measures a continuous escape count instead, colours it with a
//! smooth periodic palette, and can dress the result with stripe
//! average colouring, step shading, and Blinn-Phong lighting driven by
//! the orbit's derivative.  Oversampling gives anti-aliased edges.
//!
//! A render is a pure function of a `ViewWindow` and a `RenderConfig`:
//! nothing is remembered between calls, identical inputs give
//! identical bytes, and the thread count never changes the result.
//! The interactive state of an explorer (current view, zoom history,
//! pending requests) lives in `navigation` and is threaded through by
//! the caller.

pub mod animation;
pub mod bookmarks;
pub mod compositor;
pub mod config;
pub mod errors;
pub mod export;
pub mod field;
pub mod navigation;
pub mod pixels;
pub mod planes;
pub mod shading;
mod workers;

pub use compositor::composite;
pub use config::{Lighting, Palette, RenderConfig, RenderConfigBuilder, Steps, Stripes, Style};
pub use errors::{Error, Result};
pub use field::{render_field, EscapeField, Sample, ESCAPE_RADIUS};
pub use pixels::PixelBuffer;
pub use planes::ViewWindow;

/// Renders `view` into an image as described by `config`.
pub fn render(view: &ViewWindow, config: &RenderConfig) -> Result<PixelBuffer> {
    let field = render_field(view, config)?;
    composite(&field, config)
}
