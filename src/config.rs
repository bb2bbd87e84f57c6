// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Render configuration.
//!
//! A `RenderConfig` is everything a render needs besides the window:
//! the size of the image, the iteration budget, the oversampling
//! factor, how many threads to spread the work over, and the `Style`
//! used to turn escape counts into colours.  Configurations are only
//! obtainable through `RenderConfigBuilder::build`, which rejects bad
//! values up front so that a render never fails halfway through.

use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};

/// The cosine palette: one phase offset per RGB channel, and the
/// number of times the palette repeats across the iteration budget.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    /// Phase offset of each RGB channel, in [0, 1).
    pub phases: [f64; 3],
    /// How many times the palette repeats between zero and `maxiter`.
    pub cycles: u32,
}

impl Default for Palette {
    fn default() -> Self {
        Palette {
            phases: [0.0, 0.15, 0.25],
            cycles: 32,
        }
    }
}

/// Stripe average colouring.  A density of zero turns it off; `mix`
/// is how strongly the stripe signal is blended over the base colour.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Stripes {
    /// Stripe frequency around the orbit angle.  Zero disables stripes.
    pub density: f64,
    /// Weight of the stripe signal against the base colour, in [0, 1].
    pub mix: f64,
}

impl Default for Stripes {
    fn default() -> Self {
        Stripes {
            density: 0.0,
            mix: 0.5,
        }
    }
}

/// Step shading: bands per unit of escape count.  Zero turns it off.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Steps {
    /// Bands per unit of escape count.  Zero disables steps.
    pub density: f64,
}

/// Blinn-Phong lighting.  Angles are in degrees; an intensity of zero
/// turns lighting off.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Lighting {
    /// Compass direction of the light, in degrees.
    pub azimuth: f64,
    /// Height of the light above the plane, in degrees.
    pub elevation: f64,
    /// Strength of the effect, in [0, 1].  Zero disables lighting.
    pub intensity: f64,
    /// Reflectance that does not depend on the light direction.
    pub ambient: f64,
    /// Lambertian weight.
    pub diffuse: f64,
    /// Weight of the specular highlight.
    pub specular: f64,
    /// Specular exponent; larger values give tighter highlights.
    pub shininess: f64,
}

impl Default for Lighting {
    fn default() -> Self {
        Lighting {
            azimuth: 45.0,
            elevation: 45.0,
            intensity: 0.75,
            ambient: 0.2,
            diffuse: 0.5,
            specular: 0.5,
            shininess: 20.0,
        }
    }
}

impl Lighting {
    /// Lighting with the same surface response but switched off.
    pub fn off() -> Self {
        Lighting {
            intensity: 0.0,
            ..Lighting::default()
        }
    }
}

/// Everything the compositor needs to colour an escape field.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Style {
    /// Base palette.
    pub palette: Palette,
    /// Stripe average colouring.
    pub stripes: Stripes,
    /// Step shading.
    pub steps: Steps,
    /// Relief lighting.
    pub lighting: Lighting,
}

impl Style {
    /// Base colouring only: no stripes, no steps, no lighting.
    pub fn flat(palette: Palette) -> Self {
        Style {
            palette,
            stripes: Stripes::default(),
            steps: Steps::default(),
            lighting: Lighting::off(),
        }
    }

    /// Reads a style from a JSON document.  Missing sections take their
    /// defaults; the result is validated.
    pub fn from_json(text: &str) -> Result<Style> {
        let style: Style = serde_json::from_str(text)?;
        style.validate()?;
        Ok(style)
    }

    /// Checks every field, reporting the first bad one as a configuration
    /// error.
    pub fn validate(&self) -> Result<()> {
        let Style {
            palette,
            stripes,
            steps,
            lighting,
        } = self;
        for (channel, phase) in palette.phases.iter().enumerate() {
            if !(phase.is_finite() && *phase >= 0.0 && *phase < 1.0) {
                return Err(Error::Config(format!(
                    "phase {} of channel {} is outside [0, 1)",
                    phase, channel
                )));
            }
        }
        if palette.cycles == 0 {
            return Err(Error::Config("palette cycles must be positive".to_string()));
        }
        non_negative("stripe density", stripes.density)?;
        unit_interval("stripe mix", stripes.mix)?;
        non_negative("step density", steps.density)?;
        unit_interval("light intensity", lighting.intensity)?;
        non_negative("ambient light", lighting.ambient)?;
        non_negative("diffuse light", lighting.diffuse)?;
        non_negative("specular light", lighting.specular)?;
        if !(lighting.shininess.is_finite() && lighting.shininess > 0.0) {
            return Err(Error::Config(format!(
                "shininess {} must be positive",
                lighting.shininess
            )));
        }
        if !(lighting.azimuth.is_finite() && lighting.elevation.is_finite()) {
            return Err(Error::Config("light angles must be finite".to_string()));
        }
        Ok(())
    }
}

fn non_negative(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(Error::Config(format!("{} {} must be non-negative", name, value)))
    }
}

fn unit_interval(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(Error::Config(format!("{} {} must lie in [0, 1]", name, value)))
    }
}

/// A validated render configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderConfig {
    width: usize,
    height: usize,
    maxiter: usize,
    oversample: usize,
    threads: usize,
    style: Style,
}

impl RenderConfig {
    /// A builder holding the defaults.
    pub fn builder() -> RenderConfigBuilder {
        RenderConfigBuilder::default()
    }

    /// Output width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Output height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Iteration budget per cell.
    pub fn maxiter(&self) -> usize {
        self.maxiter
    }

    /// Cells per output pixel along each axis.
    pub fn oversample(&self) -> usize {
        self.oversample
    }

    /// Worker threads used for field and compositing passes.
    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Colouring parameters.
    pub fn style(&self) -> &Style {
        &self.style
    }

    /// Size of the oversampled grid the field computer works on.
    pub fn grid_size(&self) -> (usize, usize) {
        (self.width * self.oversample, self.height * self.oversample)
    }

    /// Re-opens this configuration for editing.
    pub fn to_builder(&self) -> RenderConfigBuilder {
        RenderConfigBuilder {
            width: self.width,
            height: self.height,
            maxiter: self.maxiter,
            oversample: self.oversample,
            threads: self.threads,
            style: self.style,
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        let b = RenderConfigBuilder::default();
        RenderConfig {
            width: b.width,
            height: b.height,
            maxiter: b.maxiter,
            oversample: b.oversample,
            threads: b.threads,
            style: b.style,
        }
    }
}

/// Collects RenderConfig fields; nothing is checked until `build`.
#[derive(Clone, Debug)]
pub struct RenderConfigBuilder {
    width: usize,
    height: usize,
    maxiter: usize,
    oversample: usize,
    threads: usize,
    style: Style,
}

impl Default for RenderConfigBuilder {
    fn default() -> Self {
        RenderConfigBuilder {
            width: 640,
            height: 360,
            maxiter: 500,
            oversample: 1,
            threads: num_cpus::get().max(1),
            style: Style::default(),
        }
    }
}

impl RenderConfigBuilder {
    /// Output size in pixels.
    pub fn resolution(mut self, width: usize, height: usize) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Iteration budget per cell.
    pub fn maxiter(mut self, maxiter: usize) -> Self {
        self.maxiter = maxiter;
        self
    }

    /// Cells per pixel along each axis.
    pub fn oversample(mut self, oversample: usize) -> Self {
        self.oversample = oversample;
        self
    }

    /// Number of worker threads.  One selects the sequential path.
    pub fn threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Replaces the whole style.
    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// Replaces the palette.
    pub fn palette(mut self, palette: Palette) -> Self {
        self.style.palette = palette;
        self
    }

    /// Palette phase offsets for red, green and blue.
    pub fn phases(mut self, phases: [f64; 3]) -> Self {
        self.style.palette.phases = phases;
        self
    }

    /// Palette repetitions over the iteration range.
    pub fn cycles(mut self, cycles: u32) -> Self {
        self.style.palette.cycles = cycles;
        self
    }

    /// Stripe density; zero turns stripes off.
    pub fn stripes(mut self, density: f64) -> Self {
        self.style.stripes.density = density;
        self
    }

    /// Weight of the stripe blend.
    pub fn stripe_mix(mut self, mix: f64) -> Self {
        self.style.stripes.mix = mix;
        self
    }

    /// Step density; zero turns steps off.
    pub fn steps(mut self, density: f64) -> Self {
        self.style.steps.density = density;
        self
    }

    /// Replaces the lighting parameters.
    pub fn lighting(mut self, lighting: Lighting) -> Self {
        self.style.lighting = lighting;
        self
    }

    /// Lighting strength; zero turns lighting off.
    pub fn light_intensity(mut self, intensity: f64) -> Self {
        self.style.lighting.intensity = intensity;
        self
    }

    /// Light azimuth and elevation, in degrees.
    pub fn light_angles(mut self, azimuth: f64, elevation: f64) -> Self {
        self.style.lighting.azimuth = azimuth;
        self.style.lighting.elevation = elevation;
        self
    }

    /// Validates everything and produces the configuration.
    pub fn build(self) -> Result<RenderConfig> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::Config(format!(
                "resolution {}x{} must be positive",
                self.width, self.height
            )));
        }
        if self.maxiter == 0 {
            return Err(Error::Config("maxiter must be positive".to_string()));
        }
        if self.oversample == 0 {
            return Err(Error::Config("oversampling must be at least 1".to_string()));
        }
        if self.threads == 0 {
            return Err(Error::Config("thread count must be positive".to_string()));
        }
        self.width
            .checked_mul(self.oversample)
            .and_then(|w| self.height.checked_mul(self.oversample).map(|h| (w, h)))
            .and_then(|(w, h)| w.checked_mul(h))
            .ok_or_else(|| Error::Config("oversampled grid is too large".to_string()))?;
        self.style.validate()?;
        Ok(RenderConfig {
            width: self.width,
            height: self.height,
            maxiter: self.maxiter,
            oversample: self.oversample,
            threads: self.threads,
            style: self.style,
        })
    }
}

/// Colour themes: named phase triples.
pub const THEMES: &[(&str, [f64; 3])] = &[
    ("classic", [0.0, 0.15, 0.25]),
    ("fire", [0.0, 0.05, 0.1]),
    ("ocean", [0.4, 0.6, 0.8]),
    ("forest", [0.2, 0.4, 0.1]),
    ("purple", [0.7, 0.3, 0.9]),
    ("sunset", [0.0, 0.3, 0.6]),
    ("electric", [0.2, 0.7, 0.9]),
    ("copper", [0.1, 0.05, 0.0]),
];

/// Looks up a colour theme by name.
pub fn theme(name: &str) -> Result<[f64; 3]> {
    THEMES
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, phases)| *phases)
        .ok_or_else(|| Error::UnknownPreset(name.to_string()))
}

/// Names accepted by `preset`.
pub const PRESET_NAMES: &[&str] = &["filigree", "deep-structure", "fine-detail", "rich-boundaries"];

/// Looks up a complete style preset by name.
pub fn preset(name: &str) -> Result<Style> {
    // `steps` is the width of one band in escape units.
    let (phases, cycles, stripes, mix, steps, light) = match name {
        "filigree" => (
            [0.0, 0.15, 0.25],
            32,
            16.0,
            0.9,
            8.0,
            [45.0, 45.0, 0.75, 0.2, 0.5, 0.5, 20.0],
        ),
        "deep-structure" => (
            [0.7, 0.3, 0.9],
            64,
            24.0,
            0.85,
            12.0,
            [60.0, 60.0, 0.85, 0.15, 0.6, 0.7, 30.0],
        ),
        "fine-detail" => (
            [0.2, 0.7, 0.9],
            48,
            12.0,
            0.95,
            4.0,
            [30.0, 30.0, 0.9, 0.1, 0.7, 0.6, 15.0],
        ),
        "rich-boundaries" => (
            [0.0, 0.3, 0.6],
            56,
            20.0,
            0.88,
            10.0,
            [75.0, 25.0, 0.8, 0.25, 0.45, 0.65, 25.0],
        ),
        _ => return Err(Error::UnknownPreset(name.to_string())),
    };
    Ok(Style {
        palette: Palette { phases, cycles },
        stripes: Stripes { density: stripes, mix },
        steps: Steps { density: 1.0 / steps },
        lighting: Lighting {
            azimuth: light[0],
            elevation: light[1],
            intensity: light[2],
            ambient: light[3],
            diffuse: light[4],
            specular: light[5],
            shininess: light[6],
        },
    })
}
