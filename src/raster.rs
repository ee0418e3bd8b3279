// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A contiguous RGB raster.  Storage is row-major from the top of the
//! image down, the order image encoders want, but every coordinate
//! handed to this module is logical: (0, 0) is the bottom-left pixel.
//! Writes that land outside the image are quietly dropped.

use crate::escape::channels;
use std::ops::Range;

const COMPONENTS: usize = 3;

/// An owned RGB image.
#[derive(Clone, Debug, PartialEq)]
pub struct PixelBuffer {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Allocate a black image of `width` by `height` pixels.
    pub fn new(width: usize, height: usize) -> PixelBuffer {
        PixelBuffer {
            width,
            height,
            data: vec![0 as u8; width * height * COMPONENTS],
        }
    }

    /// Wrap raw top-down RGB bytes.  Returns None if the data does not
    /// match the dimensions.
    pub fn from_raw(width: usize, height: usize, data: Vec<u8>) -> Option<PixelBuffer> {
        if data.len() != width * height * COMPONENTS {
            return None;
        }
        Some(PixelBuffer { width, height, data })
    }

    /// Width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// The raw top-down RGB bytes.
    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    /// Consume the buffer, returning its raw bytes.
    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    /// Paint every pixel with one 0xRRGGBB colour.
    pub fn fill(&mut self, color: u32) {
        let rgb = channels(color);
        for pixel in self.data.chunks_mut(COMPONENTS) {
            pixel.copy_from_slice(&rgb);
        }
    }

    fn offset(&self, x: usize, y: usize) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(((self.height - y - 1) * self.width + x) * COMPONENTS)
    }

    /// Set the pixel at logical (x, y).  Out-of-range coordinates are a
    /// no-op.
    pub fn set_pixel(&mut self, x: usize, y: usize, color: u32) {
        if let Some(offset) = self.offset(x, y) {
            self.data[offset..offset + COMPONENTS].copy_from_slice(&channels(color));
        }
    }

    /// Read back the pixel at logical (x, y) as 0xRRGGBB.
    pub fn pixel(&self, x: usize, y: usize) -> Option<u32> {
        self.offset(x, y).map(|offset| {
            let p = &self.data[offset..offset + COMPONENTS];
            (u32::from(p[0]) << 16) | (u32::from(p[1]) << 8) | u32::from(p[2])
        })
    }

    /// Hands out the image as disjoint horizontal bands, bottom first.
    pub fn bands(&mut self) -> BandSplitter<'_> {
        BandSplitter {
            width: self.width,
            height: self.height,
            remaining: &mut self.data,
        }
    }
}

/// Carves a buffer into bands of logical rows on request.  Each band is
/// a mutable borrow of exactly the storage its rows occupy, so two
/// bands can never write the same pixel.
pub struct BandSplitter<'a> {
    width: usize,
    height: usize,
    // Storage not yet handed out: the top of the image.
    remaining: &'a mut [u8],
}

impl<'a> BandSplitter<'a> {
    /// Take the band covering logical rows `rows`, clamped to the image.
    /// Rows must be requested bottom-up and contiguously; rows past the
    /// top of the image yield an empty band.
    pub fn take(&mut self, rows: Range<usize>) -> Band<'a> {
        let stride = self.width * COMPONENTS;
        let start = rows.start.min(self.height);
        let end = rows.end.min(self.height).max(start);
        debug_assert_eq!(
            self.remaining.len(),
            (self.height - start) * stride,
            "bands must be taken in order"
        );
        let remaining = std::mem::take(&mut self.remaining);
        let split = remaining.len() - (end - start) * stride;
        let (rest, band) = remaining.split_at_mut(split);
        self.remaining = rest;
        Band {
            width: self.width,
            rows: start..end,
            data: band,
        }
    }
}

/// A mutable view of a run of whole rows of a PixelBuffer.
#[derive(Debug)]
pub struct Band<'a> {
    width: usize,
    rows: Range<usize>,
    data: &'a mut [u8],
}

impl<'a> Band<'a> {
    /// The logical rows this band may write.
    pub fn rows(&self) -> Range<usize> {
        self.rows.clone()
    }

    /// Width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Set the pixel at logical image coordinates (x, y).  Anything
    /// outside this band is a no-op.
    pub fn set_pixel(&mut self, x: usize, y: usize, color: u32) {
        if x >= self.width || y < self.rows.start || y >= self.rows.end {
            return;
        }
        let offset = ((self.rows.end - y - 1) * self.width + x) * COMPONENTS;
        self.data[offset..offset + COMPONENTS].copy_from_slice(&channels(color));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_buffer_is_black() {
        let buf = PixelBuffer::new(4, 3);
        assert_eq!(buf.as_raw().len(), 36);
        assert!(buf.as_raw().iter().all(|b| *b == 0));
    }

    #[test]
    fn fill_paints_everything() {
        let mut buf = PixelBuffer::new(3, 2);
        buf.fill(0x0010_2030);
        for chunk in buf.as_raw().chunks(3) {
            assert_eq!(chunk, &[0x10, 0x20, 0x30]);
        }
    }

    #[test]
    fn set_pixel_flips_vertically() {
        let mut buf = PixelBuffer::new(2, 2);
        buf.set_pixel(0, 0, 0x00FF_0000);
        // Logical (0,0) is the bottom-left: the first pixel of the last stored row.
        assert_eq!(&buf.as_raw()[6..9], &[0xFF, 0, 0]);
        assert_eq!(buf.pixel(0, 0), Some(0x00FF_0000));
        assert_eq!(buf.pixel(0, 1), Some(0));
    }

    #[test]
    fn set_pixel_out_of_range_is_a_noop() {
        let mut buf = PixelBuffer::new(3, 3);
        buf.set_pixel(3, 0, 0x00FF_FFFF);
        buf.set_pixel(0, 3, 0x00FF_FFFF);
        buf.set_pixel(100, 100, 0x00FF_FFFF);
        assert!(buf.as_raw().iter().all(|b| *b == 0));
        assert_eq!(buf.pixel(3, 0), None);
    }

    #[test]
    fn from_raw_checks_length() {
        assert!(PixelBuffer::from_raw(2, 2, vec![0; 12]).is_some());
        assert!(PixelBuffer::from_raw(2, 2, vec![0; 11]).is_none());
    }

    #[test]
    fn bands_write_where_the_buffer_would() {
        let mut direct = PixelBuffer::new(3, 5);
        let mut banded = PixelBuffer::new(3, 5);
        {
            let mut splitter = banded.bands();
            for rows in vec![0..2, 2..4, 4..6] {
                let mut band = splitter.take(rows.clone());
                for y in rows {
                    for x in 0..3 {
                        band.set_pixel(x, y, (y * 3 + x) as u32 + 1);
                    }
                }
            }
        }
        for y in 0..5 {
            for x in 0..3 {
                direct.set_pixel(x, y, (y * 3 + x) as u32 + 1);
            }
        }
        assert_eq!(direct, banded);
    }

    #[test]
    fn bands_are_clamped_to_the_image() {
        let mut buf = PixelBuffer::new(2, 5);
        let mut splitter = buf.bands();
        assert_eq!(splitter.take(0..4).rows(), 0..4);
        let mut last = splitter.take(4..8);
        assert_eq!(last.rows(), 4..5);
        last.set_pixel(0, 5, 0x00FF_FFFF);
        last.set_pixel(0, 3, 0x00FF_FFFF);
        assert_eq!(splitter.take(8..12).rows(), 5..5);
    }
}
