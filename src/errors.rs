// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The single error type of the renderer.  Bad input is rejected at the
//! boundary, before anything reaches the plane mapper, so most of these
//! describe either a parameter problem or a failure in one of the
//! collaborators (files, palette data, the image encoder).

use failure::Fail;

/// Everything that can go wrong between reading parameters and writing
/// a finished image.
#[derive(Debug, Fail)]
pub enum Error {
    /// Geometry, scale, iteration count or center was unusable.
    #[fail(display = "invalid parameter: {}", _0)]
    InvalidParameter(String),

    /// The requested palette is not in the active palette set.
    #[fail(display = "unknown palette: {}", _0)]
    UnknownPalette(String),

    /// A palette color was not a `#rrggbb` hex string.
    #[fail(display = "invalid color: {}", _0)]
    InvalidColor(String),

    /// The render was aborted through its cancel token.
    #[fail(display = "render cancelled")]
    Cancelled,

    /// One of the render threads panicked.
    #[fail(display = "render worker panicked")]
    WorkerPanicked,

    /// Reading or writing a file failed.
    #[fail(display = "i/o error: {}", _0)]
    Io(#[cause] std::io::Error),

    /// The palette file was not valid palette JSON.
    #[fail(display = "palette data error: {}", _0)]
    Json(#[cause] serde_json::Error),

    /// The image encoder refused the buffer.
    #[fail(display = "image error: {}", _0)]
    Image(#[cause] image::ImageError),
}

/// Shorthand used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Json(e)
    }
}

impl From<image::ImageError> for Error {
    fn from(e: image::ImageError) -> Self {
        Error::Image(e)
    }
}
