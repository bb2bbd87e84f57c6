// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The final image: packed 8-bit RGB, row 0 at the top.

use image::{Rgb, RgbImage, RgbaImage};

/// Converts a channel in [0, 1] to a byte, clipping anything outside.
pub fn to_byte(value: f64) -> u8 {
    (value.max(0.0).min(1.0) * 255.0).round() as u8
}

/// An 8-bit RGB picture, row 0 at the top.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelBuffer {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// A black buffer.
    pub fn new(width: usize, height: usize) -> PixelBuffer {
        PixelBuffer {
            width,
            height,
            data: vec![0; width * height * 3],
        }
    }

    pub(crate) fn from_raw(width: usize, height: usize, data: Vec<u8>) -> PixelBuffer {
        debug_assert_eq!(data.len(), width * height * 3);
        PixelBuffer {
            width,
            height,
            data,
        }
    }

    /// Width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// The colour of pixel (`x`, `y`).
    pub fn get(&self, x: usize, y: usize) -> [u8; 3] {
        let offset = (y * self.width + x) * 3;
        [
            self.data[offset],
            self.data[offset + 1],
            self.data[offset + 2],
        ]
    }

    /// The packed RGB bytes, row by row.
    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    /// Hands over the packed bytes.
    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    /// Copies the picture into an `image` buffer for encoding.
    pub fn to_image(&self) -> RgbImage {
        RgbImage::from_fn(self.width as u32, self.height as u32, |x, y| {
            Rgb(self.get(x as usize, y as usize))
        })
    }

    /// The same picture with an opaque alpha channel, for encoders that
    /// want RGBA frames.
    pub fn to_rgba_image(&self) -> RgbaImage {
        image::DynamicImage::ImageRgb8(self.to_image()).to_rgba8()
    }
}
