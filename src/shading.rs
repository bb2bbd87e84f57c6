// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Per-cell colour functions.  Colours are RGB triples of `f64` in
//! [0, 1]; nothing here knows about grids or bytes.

use num::Complex;

use crate::config::{Lighting, Palette};

/// A colour with channels in [0, 1] (before clipping).
pub type Rgb = [f64; 3];

/// Colour of cells inside the set.
pub const BACKGROUND: Rgb = [0.0, 0.0, 0.0];

/// Smooth periodic palette: each channel is a cosine of the escape
/// count, shifted by that channel's phase.  The palette repeats
/// `cycles` times between zero and `maxiter`.
pub fn base_color(escape: f64, maxiter: usize, palette: &Palette) -> Rgb {
    let position = f64::from(palette.cycles) * escape / maxiter as f64;
    let channel = |phase: f64| 0.5 + 0.5 * (2.0 * std::f64::consts::PI * (position + phase)).cos();
    [
        channel(palette.phases[0]),
        channel(palette.phases[1]),
        channel(palette.phases[2]),
    ]
}

/// The "overlay" blend mode: darkens `x` where `y` is below one half
/// and lightens it above.  `gamma` weights the result against `x`
/// itself.
pub fn overlay(x: f64, y: f64, gamma: f64) -> f64 {
    let out = if 2.0 * y < 1.0 {
        2.0 * x * y
    } else {
        1.0 - 2.0 * (1.0 - x) * (1.0 - y)
    };
    out * gamma + x * (1.0 - gamma)
}

fn overlay_rgb(color: Rgb, y: f64, gamma: f64) -> Rgb {
    [
        overlay(color[0], y, gamma),
        overlay(color[1], y, gamma),
        overlay(color[2], y, gamma),
    ]
}

/// Weighted blend of the stripe signal over a colour.
pub fn blend_stripes(color: Rgb, stripe: f64, mix: f64) -> Rgb {
    overlay_rgb(color, stripe, mix)
}

/// Brightness factor for step shading.  The escape count is cut into
/// bands of width `1 / density`; each band is bright in the middle and
/// falls to black at its lower edge, with a finer ripple of eight
/// sub-bands laid over it.
pub fn step_shade(escape: f64, density: f64) -> f64 {
    let position = escape * density;
    let x = position - position.floor();
    let coarse = 0.6 * (1.0 - x.powi(5) - (1.0 - x).powi(100));
    let fine_position = position * 8.0;
    let xf = fine_position - fine_position.floor();
    let fine = 0.6 * (1.0 - xf.powi(5) - (1.0 - xf).powi(30));
    overlay(fine, coarse, 1.0).max(0.0).min(1.0)
}

/// Applies a step shade factor to a colour.
pub fn apply_steps(color: Rgb, shade: f64) -> Rgb {
    overlay_rgb(color, shade, 1.0)
}

/// Unit vector pointing at the light.  Angles are in degrees; an
/// elevation of 90 puts the light straight overhead.
pub fn light_direction(azimuth: f64, elevation: f64) -> [f64; 3] {
    let (azimuth, elevation) = (azimuth.to_radians(), elevation.to_radians());
    let cos_elev = elevation.cos();
    [
        azimuth.cos() * cos_elev,
        azimuth.sin() * cos_elev,
        elevation.sin(),
    ]
}

fn normalize(v: [f64; 3]) -> [f64; 3] {
    let len = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
    [v[0] / len, v[1] / len, v[2] / len]
}

fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

/// Blinn-Phong brightness of the pseudo-surface whose 2-D normal is
/// `normal`, viewed from straight above.  The raw reflectance is
/// pulled toward one half as intensity drops, so intensity zero is
/// neutral under `overlay`.  Returns `None` when there is no usable
/// normal.
pub fn blinn_phong(normal: Complex<f64>, lighting: &Lighting) -> Option<f64> {
    if normal.re == 0.0 && normal.im == 0.0 {
        return None;
    }
    let n = normalize([normal.re, normal.im, 1.0]);
    let light = light_direction(lighting.azimuth, lighting.elevation);
    let half = normalize([light[0], light[1], light[2] + 1.0]);

    let diffuse = dot(n, light).max(0.0);
    let specular = dot(n, half).max(0.0).powf(lighting.shininess);
    let raw = lighting.ambient + lighting.diffuse * diffuse + lighting.specular * specular;
    let bright = raw * lighting.intensity + (1.0 - lighting.intensity) / 2.0;
    Some(bright.max(0.0).min(1.0))
}

/// Applies a lighting brightness to a colour.
pub fn apply_light(color: Rgb, bright: f64) -> Rgb {
    overlay_rgb(color, bright, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_color_channels_stay_in_range() {
        let palette = Palette::default();
        for i in 0..1000 {
            let c = base_color(i as f64 * 0.37, 500, &palette);
            assert!(c.iter().all(|v| *v >= 0.0 && *v <= 1.0), "{:?}", c);
        }
    }

    #[test]
    fn base_color_is_periodic_in_cycles() {
        let palette = Palette {
            phases: [0.0, 0.25, 0.5],
            cycles: 4,
        };
        // One period spans maxiter / cycles escape units.
        let a = base_color(10.0, 100, &palette);
        let b = base_color(35.0, 100, &palette);
        for i in 0..3 {
            assert!((a[i] - b[i]).abs() < 1e-9);
        }
        // Escape count zero with phase zero is full intensity.
        assert!((base_color(0.0, 100, &palette)[0] - 1.0).abs() < 1e-12);
        assert!((base_color(0.0, 100, &palette)[2]).abs() < 1e-12);
    }

    #[test]
    fn overlay_with_half_is_neutral() {
        for &x in &[0.0, 0.2, 0.5, 0.9, 1.0] {
            assert!((overlay(x, 0.5, 1.0) - x).abs() < 1e-12);
        }
        assert_eq!(overlay(0.8, 0.0, 1.0), 0.0);
        assert_eq!(overlay(0.3, 1.0, 1.0), 1.0);
        assert_eq!(overlay(0.3, 1.0, 0.0), 0.3);
    }

    #[test]
    fn step_shade_is_bounded_and_dark_at_band_edges() {
        for i in 0..1000 {
            let s = step_shade(i as f64 * 0.013, 3.0);
            assert!(s >= 0.0 && s <= 1.0);
        }
        assert!(step_shade(1.0, 1.0) < 0.01);
        assert!(step_shade(1.5, 1.0) > step_shade(1.0, 1.0));
    }

    #[test]
    fn light_direction_horizontal_and_overhead() {
        let l = light_direction(0.0, 0.0);
        assert!((l[0] - 1.0).abs() < 1e-12 && l[1].abs() < 1e-12 && l[2].abs() < 1e-12);
        let l = light_direction(0.0, 90.0);
        assert!(l[0].abs() < 1e-12 && (l[2] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn surface_facing_light_is_brighter() {
        let lighting = Lighting {
            intensity: 1.0,
            ..Lighting::default()
        };
        let toward = blinn_phong(Complex::new(1.0, 1.0).unscale(2f64.sqrt()), &lighting).unwrap();
        let away = blinn_phong(Complex::new(-1.0, -1.0).unscale(2f64.sqrt()), &lighting).unwrap();
        assert!(toward > away, "{} <= {}", toward, away);
    }

    #[test]
    fn zero_intensity_is_neutral_and_missing_normal_is_none() {
        let lighting = Lighting::off();
        let b = blinn_phong(Complex::new(0.0, 1.0), &lighting).unwrap();
        assert!((b - 0.5).abs() < 1e-12);
        assert!(blinn_phong(Complex::new(0.0, 0.0), &lighting).is_none());
    }
}
