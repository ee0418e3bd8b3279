// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Contains the Viewport struct, which describes a rectangle on the
//! complex plane by its center and its horizontal extent, and the
//! PlaneMapper, which relates that rectangle to an integral plane of
//! pixels with an origin at 0,0 in the lower-left corner.
use num::Complex;

/// Describes the x, y of a pixel on the integral plane.  Row 0 is the
/// bottom row of the image.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Pixel(pub usize, pub usize);

/// The region of the complex plane being rendered.  Only the
/// horizontal scale is stored; the vertical scale always follows from
/// it and the aspect ratio of whatever image it is mapped onto.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Viewport {
    /// The point at the center of the image.
    pub center: Complex<f64>,
    /// The width of the image, in complex-plane units.
    pub xscale: f64,
}

impl Viewport {
    /// A viewport centered on (x, y), `xscale` units wide.
    pub fn new(x: f64, y: f64, xscale: f64) -> Viewport {
        Viewport {
            center: Complex::new(x, y),
            xscale,
        }
    }

    /// The same center, zoomed to a different width.
    pub fn with_scale(&self, xscale: f64) -> Viewport {
        Viewport { xscale, ..*self }
    }

    /// The height of the image in complex-plane units, for an image of
    /// `width` by `height` pixels.
    pub fn yscale(&self, width: usize, height: usize) -> f64 {
        self.xscale / (width as f64) * (height as f64)
    }
}

/// Maps pixels on an integral plane of `width` by `height` onto the
/// region of the complex plane covered by a viewport.
#[derive(Copy, Clone, Debug)]
pub struct PlaneMapper {
    width: usize,
    height: usize,
    // Lower-left corner of the complex region.
    origin: Complex<f64>,
    // Complex-plane distance covered by one pixel, per axis.
    step: (f64, f64),
}

impl PlaneMapper {
    /// Constructor.  The vertical extent is derived from the viewport's
    /// horizontal scale and the pixel aspect ratio.
    pub fn new(viewport: &Viewport, width: usize, height: usize) -> Result<PlaneMapper, String> {
        if width == 0 || height == 0 {
            return Err(format!("Image of {}x{} pixels has no area", width, height));
        }
        if !(viewport.xscale > 0.0) || !viewport.xscale.is_finite() {
            return Err(format!("Scale must be a positive number, not {}", viewport.xscale));
        }

        let xscale = viewport.xscale;
        let yscale = viewport.yscale(width, height);
        let origin = Complex::new(
            viewport.center.re - xscale / 2.0,
            viewport.center.im - yscale / 2.0,
        );

        Ok(PlaneMapper {
            width,
            height,
            origin,
            step: (xscale / (width as f64), yscale / (height as f64)),
        })
    }

    /// Width of the integral plane.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height of the integral plane.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Given a pixel on the integral plane, return the point on the
    /// complex plane at its lower-left corner.
    pub fn pixel_to_point(&self, pixel: &Pixel) -> Complex<f64> {
        Complex::new(
            self.origin.re + (pixel.0 as f64) * self.step.0,
            self.origin.im + (pixel.1 as f64) * self.step.1,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yscale_follows_aspect_ratio() {
        let vp = Viewport::new(0.0, 0.0, 4.0);
        assert_eq!(vp.yscale(1000, 1000), 4.0);
        assert_eq!(vp.yscale(800, 600), 3.0);
        assert_eq!(vp.with_scale(2.0).yscale(800, 400), 1.0);
    }

    #[test]
    fn with_scale_keeps_center() {
        let vp = Viewport::new(-0.5, 0.25, 4.0).with_scale(0.5);
        assert_eq!(vp.center, Complex::new(-0.5, 0.25));
        assert_eq!(vp.xscale, 0.5);
    }

    #[test]
    fn planemapper_fails_on_empty_image() {
        let vp = Viewport::new(0.0, 0.0, 4.0);
        assert!(PlaneMapper::new(&vp, 0, 10).is_err());
        assert!(PlaneMapper::new(&vp, 10, 0).is_err());
    }

    #[test]
    fn planemapper_fails_on_bad_scale() {
        assert!(PlaneMapper::new(&Viewport::new(0.0, 0.0, 0.0), 10, 10).is_err());
        assert!(PlaneMapper::new(&Viewport::new(0.0, 0.0, -1.0), 10, 10).is_err());
        assert!(PlaneMapper::new(&Viewport::new(0.0, 0.0, std::f64::NAN), 10, 10).is_err());
    }

    #[test]
    fn pixel_to_point_on_centered_plane() {
        let pm = PlaneMapper::new(&Viewport::new(0.0, 0.0, 4.0), 10, 10).unwrap();
        assert_eq!(pm.pixel_to_point(&Pixel(0, 0)), Complex::new(-2.0, -2.0));
        assert_eq!(pm.pixel_to_point(&Pixel(5, 5)), Complex::new(0.0, 0.0));
    }

    #[test]
    fn pixel_to_point_on_offset_plane() {
        let pm = PlaneMapper::new(&Viewport::new(1.0, -1.0, 2.0), 4, 2).unwrap();
        assert_eq!(pm.pixel_to_point(&Pixel(0, 0)), Complex::new(0.0, -1.5));
        assert_eq!(pm.pixel_to_point(&Pixel(2, 1)), Complex::new(1.0, -1.0));
    }
}
