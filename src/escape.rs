// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The escape-time evaluator.  A point on the complex plane is
//! repeatedly squared and offset by itself; the number of rounds it
//! survives before its magnitude passes 2 is the "velocity" used to
//! colour the pixel.

use num::Complex;

/// The largest colour a pixel can take, 24 bits of white.
pub const WHITE: u32 = 0x00FF_FFFF;

/// Return the number of iterations it takes `point` to escape the
/// radius-2 disc, up to a maximum of `max`.  Iteration starts at the
/// point itself, so a point already outside the disc escapes in zero
/// rounds, and a point inside the set returns `max`.
pub fn iterations_at_point(point: Complex<f64>, max: u32) -> u32 {
    let mut z = point;
    let mut iter = 0;
    while z.norm_sqr() <= 4.0 && iter < max {
        z = Complex::new(z.re * z.re - z.im * z.im + point.re, 2.0 * z.re * z.im + point.im);
        iter += 1;
    }
    iter
}

/// Scale an iteration count linearly onto 24-bit grey-to-white.  The
/// mapping truncates, so neighbouring counts may share a colour when
/// `max` is large.
pub fn iteration_to_color(iters: u32, max: u32) -> u32 {
    if max == 0 {
        return 0;
    }
    (u64::from(WHITE) * u64::from(iters.min(max)) / u64::from(max)) as u32
}

/// Split a packed 0xRRGGBB colour into its channels.
#[inline]
pub fn channels(color: u32) -> [u8; 3] {
    [(color >> 16) as u8, (color >> 8) as u8, color as u8]
}
