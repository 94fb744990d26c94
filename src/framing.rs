//! The user-facing view parameters: where the view is centered, how far
//! it is zoomed in, and how many iterations each point is given.  This
//! is the boundary at which input is checked; nothing past it has to
//! worry about NaN centers or a zero scale.

use crate::errors::{Error, Result};
use crate::palette::Palette;
use crate::planes::{viewport_for, Viewport};
use crate::render::RenderRequest;

/// Center, zoom and iteration cap of a view.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Framing {
    /// Horizontal center, in percent; 50 is the middle of the default
    /// view and each 50 points shifts it by the framing constant.
    pub center_x_percent: f64,
    /// Vertical center, in percent.
    pub center_y_percent: f64,
    /// Zoom factor; 1 shows the whole set.
    pub scale: f64,
    /// Iteration cap.
    pub iterations: u32,
}

impl Default for Framing {
    fn default() -> Self {
        Framing {
            center_x_percent: 50.0,
            center_y_percent: 50.0,
            scale: 1.0,
            iterations: 100,
        }
    }
}

// Rounds to `places` decimals, halves toward positive infinity, so
// -0.125 becomes -0.12.  Display on f64 already drops a trailing ".0".
fn rounded(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor + 0.5).floor() / factor
}

impl Framing {
    /// Rejects anything the plane mapper cannot take.
    pub fn validate(&self) -> Result<()> {
        if !self.center_x_percent.is_finite() || !self.center_y_percent.is_finite() {
            return Err(Error::InvalidParameter(format!(
                "center must be finite, got {},{}",
                self.center_x_percent, self.center_y_percent
            )));
        }
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(Error::InvalidParameter(format!(
                "scale must be positive, got {}",
                self.scale
            )));
        }
        if self.iterations < 1 {
            return Err(Error::InvalidParameter(
                "iteration cap must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// The viewport for an output of the given size.
    pub fn viewport(&self, width: usize, height: usize) -> Result<Viewport> {
        self.validate()?;
        if width == 0 || height == 0 {
            return Err(Error::InvalidParameter(format!(
                "output size must be positive, got {}x{}",
                width, height
            )));
        }
        Ok(viewport_for(
            self.center_x_percent,
            self.center_y_percent,
            self.scale,
            width,
            height,
        ))
    }

    /// Builds the render request for an output of the given size.
    pub fn request(&self, width: usize, height: usize, palette: Palette) -> Result<RenderRequest> {
        let viewport = self.viewport(width, height)?;
        RenderRequest::new(viewport, self.iterations, width, height, palette)
    }

    /// The export name: `mandelbrot_{x}_{y}_{iterations}_{scale}.png`,
    /// with the centers kept to two decimals and the scale rounded to a
    /// whole number.
    pub fn filename(&self) -> String {
        format!(
            "mandelbrot_{}_{}_{}_{}.png",
            rounded(self.center_x_percent, 2),
            rounded(self.center_y_percent, 2),
            self.iterations,
            rounded(self.scale, 0)
        )
    }
}
