//! The escape-time test.  A point c belongs to the Mandelbrot set if
//! repeatedly applying z = z * z + c, starting from zero, never carries
//! z outside the circle of radius 2.  Once it does, it is known to run
//! off to infinity, and the number of steps it took is the "escape
//! time" used to color the pixel.

use num::Complex;

/// Iterates the quadratic map for the point (cx, cy) and returns the
/// number of iterations run before the escape test failed, or
/// `max_iterations` if it never did.  The squares are kept in separate
/// variables so each step costs three multiplications, and the escape
/// test reads the squares of the value before the latest update.
#[inline]
pub fn escape_count(cx: f64, cy: f64, max_iterations: u32) -> u32 {
    let (mut x, mut y) = (0.0_f64, 0.0_f64);
    let (mut xx, mut yy) = (0.0_f64, 0.0_f64);
    let mut count = 0;
    while count < max_iterations && xx + yy <= 4.0 {
        let xy = x * y;
        xx = x * x;
        yy = y * y;
        x = xx - yy + cx;
        y = xy + xy + cy;
        count += 1;
    }
    count
}

/// The same test for a point already expressed as a complex number.
pub fn escape_time(point: Complex<f64>, max_iterations: u32) -> u32 {
    escape_count(point.re, point.im, max_iterations)
}
