//! Contains the Viewport and PlaneMapper types, which describe a
//! relationship between a rectangle on the integral plane with an
//! origin at 0,0 in the top-left corner, and a rectangle on the
//! complex plane bounded by xmin, xmax, ymin and ymax.
use num::Complex;
use std::convert::TryFrom;

use crate::errors::{Error, Result};

/// The framing constant.  At scale 1 and a centered view, the shorter
/// side of the output spans -2.1 to 2.1, which shows the whole set.
pub const FRAME: f64 = 2.1;

/// Describes the x, y of a pixel in the output, column first.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Pixel(pub usize, pub usize);

/// The rectangle of the complex plane being rendered.  Real parts run
/// from xmin to xmax, imaginary parts from ymin to ymax.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Viewport {
    /// Left edge, real part.
    pub xmin: f64,
    /// Right edge, real part.
    pub xmax: f64,
    /// Top edge of the output, imaginary part.
    pub ymin: f64,
    /// Bottom edge of the output, imaginary part.
    pub ymax: f64,
}

impl Viewport {
    /// Checks that every bound is finite and that both spans are
    /// positive.
    pub fn validate(&self) -> Result<()> {
        let bounds = [self.xmin, self.xmax, self.ymin, self.ymax];
        if bounds.iter().any(|b| !b.is_finite()) {
            return Err(Error::InvalidParameter(format!(
                "viewport bounds must be finite: {:?}",
                self
            )));
        }
        if self.xmin >= self.xmax {
            return Err(Error::InvalidParameter(
                "viewport xmin is not to the left of xmax".to_string(),
            ));
        }
        if self.ymin >= self.ymax {
            return Err(Error::InvalidParameter(
                "viewport ymin is not above ymax".to_string(),
            ));
        }
        Ok(())
    }
}

/// Derives the viewport from a center given in percent (50 is the
/// middle), a zoom scale, and the output size.  The caller has already
/// rejected non-finite values, a non-positive scale and empty sizes.
pub fn viewport_for(
    center_x_percent: f64,
    center_y_percent: f64,
    scale: f64,
    width: usize,
    height: usize,
) -> Viewport {
    let k = FRAME / (width.min(height) as f64);
    let move_x = (width as f64) * k / scale;
    let move_y = (height as f64) * k / scale;

    let center_x = (center_x_percent - 50.0) / 50.0 * FRAME;
    let center_y = (center_y_percent - 50.0) / 50.0 * FRAME;

    Viewport {
        xmin: center_x - move_x,
        xmax: center_x + move_x,
        ymin: center_y - move_y,
        ymax: center_y + move_y,
    }
}

/// Linear interpolation from a pixel to a point on the complex plane.
/// Pixel 0 lands on the minimum bound and pixel size-1 on the maximum.
/// A one-pixel-wide (or tall) output maps that pixel to the minimum.
pub fn point_for(
    ix: usize,
    iy: usize,
    viewport: &Viewport,
    width: usize,
    height: usize,
) -> (f64, f64) {
    let x = if width > 1 {
        viewport.xmin + (viewport.xmax - viewport.xmin) * (ix as f64) / ((width - 1) as f64)
    } else {
        viewport.xmin
    };
    let y = if height > 1 {
        viewport.ymin + (viewport.ymax - viewport.ymin) * (iy as f64) / ((height - 1) as f64)
    } else {
        viewport.ymin
    };
    (x, y)
}

/// Binds a viewport to an output size, and maps pixels on the integral
/// plane to points on the complex plane.
#[derive(Debug, Clone, Copy)]
pub struct PlaneMapper {
    /// Output width and height in pixels.
    pub integral_plane: (usize, usize),
    /// The region of the complex plane covered by the output.
    pub viewport: Viewport,
}

impl PlaneMapper {
    /// Constructor.  Fails if the output is empty, too large to hold as
    /// an RGBA buffer or to encode, or if the viewport is not a proper
    /// rectangle.
    pub fn new(width: usize, height: usize, viewport: Viewport) -> Result<PlaneMapper> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidParameter(format!(
                "output size must be positive, got {}x{}",
                width, height
            )));
        }
        let encodable = u32::try_from(width).is_ok() && u32::try_from(height).is_ok();
        let bytes = width.checked_mul(height).and_then(|n| n.checked_mul(4));
        if !encodable || bytes.is_none() {
            return Err(Error::InvalidParameter(format!(
                "output size {}x{} is too large",
                width, height
            )));
        }
        viewport.validate()?;
        Ok(PlaneMapper {
            integral_plane: (width, height),
            viewport,
        })
    }

    /// The total number of pixels in the output.
    pub fn len(&self) -> usize {
        self.integral_plane.0 * self.integral_plane.1
    }

    /// Describes that the integral plane is of a size.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Given a pixel on the integral plane, return the equivalent
    /// point on the complex plane.
    pub fn pixel_to_point(&self, pixel: &Pixel) -> Complex<f64> {
        let (x, y) = point_for(
            pixel.0,
            pixel.1,
            &self.viewport,
            self.integral_plane.0,
            self.integral_plane.1,
        );
        Complex::new(x, y)
    }
}
