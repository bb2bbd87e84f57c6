// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The colour and shading compositor.
//!
//! Each oversampled cell is coloured on its own, always in the same
//! order: palette colour, then stripes, then steps, then lighting.
//! Every stage is skipped when its parameter is zero.  Each block of
//! `oversample x oversample` cells is then averaged into one output
//! pixel and clipped to a byte.

use std::time::Instant;

use itertools::iproduct;
use log::debug;

use crate::config::{RenderConfig, Style};
use crate::errors::Result;
use crate::field::{EscapeField, Sample};
use crate::pixels::{to_byte, PixelBuffer};
use crate::shading::{
    apply_light, apply_steps, base_color, blend_stripes, blinn_phong, step_shade, Rgb, BACKGROUND,
};
use crate::workers;

/// The colour of a single cell.  `stripes` says whether the sample
/// carries a stripe average worth blending.
pub fn shade_cell(sample: &Sample, maxiter: usize, style: &Style, stripes: bool) -> Rgb {
    let escape = match sample.escape {
        Some(escape) => escape,
        None => return BACKGROUND,
    };
    let mut color = base_color(escape, maxiter, &style.palette);
    if stripes && style.stripes.density > 0.0 {
        color = blend_stripes(color, sample.stripe, style.stripes.mix);
    }
    if style.steps.density > 0.0 {
        color = apply_steps(color, step_shade(escape, style.steps.density));
    }
    if style.lighting.intensity > 0.0 {
        if let Some(bright) = blinn_phong(sample.normal, &style.lighting) {
            color = apply_light(color, bright);
        }
    }
    color
}

/// Colours `field` with the style in `config` and downsamples it to
/// the field's output size.  Only the style and thread count of
/// `config` are used; size, budget and oversampling come from the
/// field, so one field can be composited with many styles.
pub fn composite(field: &EscapeField, config: &RenderConfig) -> Result<PixelBuffer> {
    let (width, height) = field.output_size();
    let os = field.oversample();
    let maxiter = field.maxiter();
    let style = config.style();
    if style.stripes.density > 0.0 && !field.has_stripes() {
        debug!("field was computed without stripe averages; stripes skipped");
    }
    let stripes = field.has_stripes();
    let weight = 1.0 / (os * os) as f64;
    let start = Instant::now();

    let mut data = vec![0u8; width * height * 3];
    workers::for_each_row(&mut data, width * 3, config.threads(), |row, pixels| {
        for (col, pixel) in pixels.chunks_mut(3).enumerate() {
            let mut sum = [0.0; 3];
            for (dy, dx) in iproduct!(0..os, 0..os) {
                let cell = field.get(col * os + dx, row * os + dy);
                let color = shade_cell(cell, maxiter, style, stripes);
                for (total, channel) in sum.iter_mut().zip(color.iter()) {
                    *total += channel;
                }
            }
            for (out, total) in pixel.iter_mut().zip(sum.iter()) {
                *out = to_byte(total * weight);
            }
        }
    })?;

    debug!("composited {}x{} pixels in {:?}", width, height, start.elapsed());
    Ok(PixelBuffer::from_raw(width, height, data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Lighting, Palette, Steps, Stripes};
    use crate::field::render_field;
    use crate::planes::ViewWindow;
    use num::Complex;

    fn escaped(escape: f64) -> Sample {
        Sample {
            escape: Some(escape),
            stripe: 0.8,
            normal: Complex::new(0.6, 0.8),
            derivative: 10.0,
        }
    }

    #[test]
    fn interior_is_background_whatever_the_style() {
        let style = crate::config::preset("filigree").unwrap();
        assert_eq!(shade_cell(&Sample::INTERIOR, 100, &style, true), BACKGROUND);
    }

    #[test]
    fn flat_style_is_pure_palette() {
        let style = Style::flat(Palette::default());
        let sample = escaped(12.5);
        assert_eq!(
            shade_cell(&sample, 100, &style, true),
            base_color(12.5, 100, &style.palette)
        );
    }

    #[test]
    fn each_effect_changes_the_colour_on_its_own() {
        let flat = Style::flat(Palette::default());
        let sample = escaped(12.3);
        let base = shade_cell(&sample, 100, &flat, true);

        let striped = Style {
            stripes: Stripes {
                density: 5.0,
                mix: 1.0,
            },
            ..flat
        };
        assert_ne!(shade_cell(&sample, 100, &striped, true), base);
        // No stripe data, no stripe effect.
        assert_eq!(shade_cell(&sample, 100, &striped, false), base);

        let stepped = Style {
            steps: Steps { density: 0.5 },
            ..flat
        };
        assert_ne!(shade_cell(&sample, 100, &stepped, true), base);

        let lit = Style {
            lighting: Lighting::default(),
            ..flat
        };
        assert_ne!(shade_cell(&sample, 100, &lit, true), base);
    }

    #[test]
    fn composite_is_repeatable() {
        let view = ViewWindow::new(-2.0, 1.0, -1.5, 1.5).unwrap();
        let config = RenderConfig::builder()
            .resolution(32, 24)
            .maxiter(80)
            .oversample(2)
            .stripes(3.0)
            .steps(0.3)
            .build()
            .unwrap();
        let field = render_field(&view, &config).unwrap();
        let a = composite(&field, &config).unwrap();
        let b = composite(&field, &config).unwrap();
        assert_eq!(a, b);
        assert_eq!((a.width(), a.height()), (32, 24));
    }

    #[test]
    fn one_field_many_styles() {
        let view = ViewWindow::new(-2.0, 1.0, -1.5, 1.5).unwrap();
        let config = RenderConfig::builder()
            .resolution(16, 16)
            .maxiter(60)
            .build()
            .unwrap();
        let field = render_field(&view, &config).unwrap();
        let restyled = config
            .to_builder()
            .phases([0.5, 0.5, 0.5])
            .build()
            .unwrap();
        let a = composite(&field, &config).unwrap();
        let b = composite(&field, &restyled).unwrap();
        assert_ne!(a, b);
        // The set itself stays black in both.
        assert_eq!(a.get(8, 8), [0, 0, 0]);
        assert_eq!(b.get(8, 8), [0, 0, 0]);
    }
}
