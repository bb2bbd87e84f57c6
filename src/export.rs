// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Writes finished pictures to disk.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame};
use log::info;

use crate::errors::{Error, Result};
use crate::pixels::PixelBuffer;

/// Saves a still image.  The format follows the file extension.
pub fn save_image<P: AsRef<Path>>(buffer: &PixelBuffer, path: P) -> Result<()> {
    let path = path.as_ref();
    buffer.to_image().save(path)?;
    info!(
        "wrote {}x{} image to {}",
        buffer.width(),
        buffer.height(),
        path.display()
    );
    Ok(())
}

/// Saves `frames` as a looping GIF showing each frame for `delay_ms`
/// milliseconds.
pub fn save_gif<P: AsRef<Path>>(frames: &[PixelBuffer], path: P, delay_ms: u32) -> Result<()> {
    if frames.is_empty() {
        return Err(Error::EmptyAnimation);
    }
    let path = path.as_ref();
    let file = BufWriter::new(File::create(path)?);
    let mut encoder = GifEncoder::new(file);
    encoder.set_repeat(Repeat::Infinite)?;
    for buffer in frames {
        let frame = Frame::from_parts(
            buffer.to_rgba_image(),
            0,
            0,
            Delay::from_numer_denom_ms(delay_ms, 1),
        );
        encoder.encode_frame(frame)?;
    }
    info!("wrote {} frame animation to {}", frames.len(), path.display());
    Ok(())
}
