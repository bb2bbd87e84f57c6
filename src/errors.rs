// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The error type shared by every part of the renderer.

use failure::Fail;

/// Everything that can go wrong between building a configuration and
/// writing a file.  Configuration and geometry problems are reported
/// when the offending value is constructed, never halfway through a
/// render.
#[derive(Debug, Fail)]
pub enum Error {
    /// A RenderConfig (or a Style loaded from disk) failed validation.
    #[fail(display = "invalid render configuration: {}", _0)]
    Config(String),

    /// A ViewWindow is empty, inverted, non-finite, or narrower than
    /// the spacing between adjacent doubles.
    #[fail(display = "invalid view window: {}", _0)]
    Geometry(String),

    /// One of the render threads panicked.
    #[fail(display = "a render worker panicked")]
    WorkerPanicked,

    /// An image could not be encoded or written.
    #[fail(display = "image encoding failed")]
    Image(#[cause] image::ImageError),

    /// Reading or writing a file failed.
    #[fail(display = "i/o failure")]
    Io(#[cause] std::io::Error),

    /// The bookmark or style file could not be parsed.
    #[fail(display = "malformed JSON")]
    Bookmark(#[cause] serde_json::Error),

    /// `BookmarkStore` has no entry with this name.
    #[fail(display = "no bookmark named '{}'", _0)]
    UnknownBookmark(String),

    /// No preset or colour theme has this name.
    #[fail(display = "no preset or theme named '{}'", _0)]
    UnknownPreset(String),

    /// A zoom path or GIF was asked for with zero frames.
    #[fail(display = "an animation needs at least one frame")]
    EmptyAnimation,
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        Error::Image(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Bookmark(err)
    }
}

/// Shorthand used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
