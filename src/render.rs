// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The pixel loop.  Every pixel is mapped to a point on the complex
//! plane, run through the escape-time test, and colored from the
//! palette.  Pixels are independent of one another, so the threaded
//! renderer simply hands out whole rows of the output buffer to as many
//! workers as it is given; each row is owned by exactly one worker.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use image::RgbaImage;
use itertools::iproduct;
use log::{debug, info};

use crate::errors::{Error, Result};
use crate::escape::escape_time;
use crate::palette::{color_for, Palette};
use crate::planes::{Pixel, PlaneMapper, Viewport};

/// Bytes per pixel: red, green, blue, alpha.
pub const CHANNELS: usize = 4;

/// Everything one render pass needs.  Validated on construction and
/// never changed afterwards.
#[derive(Clone, Debug)]
pub struct RenderRequest {
    plane: PlaneMapper,
    iterations: u32,
    palette: Palette,
}

impl RenderRequest {
    /// Requires the region of the complex plane, the iteration cap, the
    /// output size in pixels and the palette to color with.
    pub fn new(
        viewport: Viewport,
        iterations: u32,
        width: usize,
        height: usize,
        palette: Palette,
    ) -> Result<RenderRequest> {
        if iterations == 0 {
            return Err(Error::InvalidParameter(
                "iteration cap must be at least 1".to_string(),
            ));
        }
        let plane = PlaneMapper::new(width, height, viewport)?;
        Ok(RenderRequest {
            plane,
            iterations,
            palette,
        })
    }

    /// Output width in pixels.
    pub fn width(&self) -> usize {
        self.plane.integral_plane.0
    }

    /// Output height in pixels.
    pub fn height(&self) -> usize {
        self.plane.integral_plane.1
    }

    /// The rendered region of the complex plane.
    pub fn viewport(&self) -> &Viewport {
        &self.plane.viewport
    }

    /// The iteration cap.
    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    /// The palette in use.
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    fn pixel(&self, pixel: &Pixel) -> [u8; 4] {
        let count = escape_time(self.plane.pixel_to_point(pixel), self.iterations);
        color_for(count, self.iterations, &self.palette)
    }

    fn render_row(&self, row: usize, pixels: &mut [u8]) {
        for (column, out) in pixels.chunks_mut(CHANNELS).enumerate() {
            out.copy_from_slice(&self.pixel(&Pixel(column, row)));
        }
    }
}

/// A finished image: RGBA bytes, row-major, origin at the top left.
#[derive(Clone, Debug, PartialEq)]
pub struct PixelBuffer {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl PixelBuffer {
    fn blank(width: usize, height: usize) -> PixelBuffer {
        PixelBuffer {
            width,
            height,
            data: vec![0 as u8; width * height * CHANNELS],
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

    /// The raw RGBA bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// The RGBA value of one pixel, or None outside the buffer.
    pub fn pixel(&self, column: usize, row: usize) -> Option<[u8; 4]> {
        if column >= self.width || row >= self.height {
            return None;
        }
        let at = (row * self.width + column) * CHANNELS;
        let mut rgba = [0; 4];
        rgba.copy_from_slice(&self.data[at..at + CHANNELS]);
        Some(rgba)
    }

    /// Gives up the raw bytes.
    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    /// Converts into an image the `image` crate can encode.
    pub fn to_image(&self) -> Result<RgbaImage> {
        RgbaImage::from_raw(self.width as u32, self.height as u32, self.data.clone()).ok_or_else(
            || Error::InvalidParameter("image dimensions do not fit the encoder".to_string()),
        )
    }
}

/// Lets one thread abort a render running on another.  Workers check it
/// before every row.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// A token that has not been cancelled.
    pub fn new() -> CancelToken {
        CancelToken::default()
    }

    /// Asks every render holding this token to stop.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancel has been called.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// The main function for single-threaded rendering.
pub fn render(request: &RenderRequest) -> PixelBuffer {
    let started = Instant::now();
    let mut buffer = PixelBuffer::blank(request.width(), request.height());
    let pixels = iproduct!(0..request.height(), 0..request.width());
    for ((row, column), out) in pixels.zip(buffer.data.chunks_mut(CHANNELS)) {
        out.copy_from_slice(&request.pixel(&Pixel(column, row)));
    }
    debug!(
        "rendered {}x{} at {} iterations in {:?}",
        request.width(),
        request.height(),
        request.iterations(),
        started.elapsed()
    );
    buffer
}

type RowType<'a> = Arc<Mutex<std::iter::Enumerate<std::slice::ChunksMut<'a, u8>>>>;

/// A multi-threaded version of the render function.  Rows are pulled
/// from a shared iterator, so a worker that finishes early simply takes
/// the next one.  Produces exactly the same bytes as `render`.
pub fn render_threaded(
    request: &RenderRequest,
    threads: usize,
    cancel: &CancelToken,
) -> Result<PixelBuffer> {
    if threads == 0 {
        return Err(Error::InvalidParameter(
            "thread count must be at least 1".to_string(),
        ));
    }
    let started = Instant::now();
    let mut buffer = PixelBuffer::blank(request.width(), request.height());
    let stride = request.width() * CHANNELS;

    crossbeam::scope(|spawner| {
        let rows: RowType = Arc::new(Mutex::new(buffer.data.chunks_mut(stride).enumerate()));
        for _ in 0..threads {
            let rows = rows.clone();
            spawner.spawn(move |_| loop {
                if cancel.is_cancelled() {
                    break;
                }
                let next = match rows.lock() {
                    Ok(mut rows) => rows.next(),
                    Err(_) => None,
                };
                match next {
                    Some((row, pixels)) => request.render_row(row, pixels),
                    None => {
                        break;
                    }
                }
            });
        }
    })
    .map_err(|_| Error::WorkerPanicked)?;

    if cancel.is_cancelled() {
        info!("render cancelled after {:?}", started.elapsed());
        return Err(Error::Cancelled);
    }
    debug!(
        "rendered {}x{} at {} iterations on {} threads in {:?}",
        request.width(),
        request.height(),
        request.iterations(),
        threads,
        started.elapsed()
    );
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::Rgb;
    use std::time::Duration;

    fn classic() -> Palette {
        Palette::preset("classic").unwrap()
    }

    fn full_set() -> Viewport {
        Viewport {
            xmin: -2.1,
            xmax: 2.1,
            ymin: -2.1,
            ymax: 2.1,
        }
    }

    #[test]
    fn request_rejects_bad_input() {
        assert!(RenderRequest::new(full_set(), 0, 4, 4, classic()).is_err());
        assert!(RenderRequest::new(full_set(), 100, 0, 4, classic()).is_err());
        let flipped = Viewport {
            ymin: 1.0,
            ymax: -1.0,
            ..full_set()
        };
        assert!(RenderRequest::new(flipped, 100, 4, 4, classic()).is_err());
    }

    #[test]
    fn four_by_four_has_colored_corners() {
        let request = RenderRequest::new(full_set(), 100, 4, 4, classic()).unwrap();
        let buffer = render(&request);
        assert_eq!(buffer.as_bytes().len(), 4 * 4 * 4);
        for &(column, row) in &[(0, 0), (3, 0), (0, 3), (3, 3)] {
            let rgba = buffer.pixel(column, row).unwrap();
            assert_ne!(&rgba[..3], &[0, 0, 0]);
            assert_eq!(rgba[3], 255);
        }
    }

    #[test]
    fn origin_pixel_is_interior() {
        let request = RenderRequest::new(full_set(), 100, 5, 5, classic()).unwrap();
        let buffer = render(&request);
        let Rgb(r, g, b) = classic().center;
        assert_eq!(buffer.pixel(2, 2), Some([r, g, b, 255]));
        assert_eq!(buffer.pixel(5, 0), None);
    }

    #[test]
    fn buffer_is_row_major_from_the_top_left() {
        let (width, height, cap) = (7, 3, 60);
        let viewport = Viewport {
            xmin: -2.0,
            xmax: 0.5,
            ymin: 0.2,
            ymax: 1.2,
        };
        let palette = classic();
        let request = RenderRequest::new(viewport, cap, width, height, palette.clone()).unwrap();
        let buffer = render(&request);
        let bytes = buffer.as_bytes();
        for row in 0..height {
            for column in 0..width {
                let x = -2.0 + (0.5 - -2.0) * (column as f64) / 6.0;
                let y = 0.2 + (1.2 - 0.2) * (row as f64) / 2.0;
                let expected = color_for(crate::escape::escape_count(x, y, cap), cap, &palette);
                let at = (row * width + column) * CHANNELS;
                assert_eq!(&bytes[at..at + 4], &expected, "pixel {},{}", column, row);
            }
        }
        // -0.33+0.2i is inside the set, -0.33+1.2i is not: row 0 is ymin.
        let Rgb(r, g, b) = palette.center;
        assert_eq!(buffer.pixel(4, 0), Some([r, g, b, 255]));
        assert_ne!(buffer.pixel(4, 2), Some([r, g, b, 255]));
    }

    #[test]
    fn threaded_matches_single() {
        let request = RenderRequest::new(
            Viewport {
                xmin: -2.0,
                xmax: 0.6,
                ymin: -1.1,
                ymax: 1.1,
            },
            200,
            61,
            37,
            Palette::preset("acva").unwrap(),
        )
        .unwrap();
        let single = render(&request);
        for threads in 1..5 {
            let threaded = render_threaded(&request, threads, &CancelToken::new()).unwrap();
            assert_eq!(single, threaded);
        }
    }

    #[test]
    fn cancelled_render_reports_it() {
        let request = RenderRequest::new(full_set(), 100, 16, 16, classic()).unwrap();
        let cancel = CancelToken::new();
        cancel.clone().cancel();
        match render_threaded(&request, 2, &cancel) {
            Err(Error::Cancelled) => {}
            other => panic!("expected cancellation, got {:?}", other),
        }
    }

    #[test]
    fn cancelling_from_another_thread_stops_a_live_render() {
        // Every pixel of this view runs to the cap, so the full render
        // would take far longer than the wait below.
        let interior = Viewport {
            xmin: -0.4,
            xmax: 0.0,
            ymin: -0.2,
            ymax: 0.2,
        };
        let request = RenderRequest::new(interior, 20_000, 1000, 1000, classic()).unwrap();
        let cancel = CancelToken::new();
        let canceller = cancel.clone();
        let handle = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(50));
            canceller.cancel();
        });
        let result = render_threaded(&request, 2, &cancel);
        handle.join().unwrap();
        match result {
            Err(Error::Cancelled) => {}
            other => panic!("expected cancellation, got {:?}", other.map(|b| b.width())),
        }
    }

    #[test]
    fn zero_threads_is_an_error() {
        let request = RenderRequest::new(full_set(), 100, 4, 4, classic()).unwrap();
        assert!(render_threaded(&request, 0, &CancelToken::new()).is_err());
    }

    #[test]
    fn converts_to_an_image() {
        let request = RenderRequest::new(full_set(), 20, 7, 3, classic()).unwrap();
        let image = render(&request).to_image().unwrap();
        assert_eq!(image.dimensions(), (7, 3));
    }
}
