#![deny(missing_docs)]
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Mandelbrot renderer
//!
//! The Mandelbrot set is the set of points c on the complex plane for
//! which repeatedly squaring z and adding c, starting from zero, never
//! carries z off to infinity.  Points outside the set run away at
//! different speeds; the number of iterations it takes a point to leave
//! the circle of radius 2 is its "escape time", and it is the escape
//! time that is turned into a color here.
//!
//! A render goes through four stages.  A `Framing` (center, zoom and
//! iteration cap) becomes a `Viewport` on the complex plane; every
//! pixel of the output is mapped onto that viewport; each point is put
//! through the escape-time test; and the result is colored with a
//! four-color `Palette` using logarithmic bands.
//!
//! ```no_run
//! use mandelbrot::{render, Framing, Palette};
//!
//! let palette = Palette::preset("classic").unwrap();
//! let request = Framing::default().request(800, 600, palette).unwrap();
//! let pixels = render(&request);
//! mandelbrot::write_png("mandelbrot.png", &pixels).unwrap();
//! ```

extern crate crossbeam;
extern crate failure;
extern crate image;
extern crate itertools;
extern crate log;
extern crate num;
extern crate serde;
extern crate serde_json;

pub mod errors;
pub mod escape;
pub mod framing;
pub mod output;
pub mod palette;
pub mod planes;
pub mod render;

pub use errors::{Error, Result};
pub use escape::{escape_count, escape_time};
pub use framing::Framing;
pub use output::write_png;
pub use palette::{color_for, Palette, PaletteSet, Rgb};
pub use planes::{point_for, viewport_for, Pixel, PlaneMapper, Viewport};
pub use render::{render, render_threaded, CancelToken, PixelBuffer, RenderRequest};
