// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Row-partition scheduler
//!
//! One image is cut into horizontal bands of `ceil(height / threads)`
//! rows, and exactly `threads` workers are started to fill them.  Each
//! worker claims the next band from a shared cursor, which is the only
//! thing held under the lock; the escape-time arithmetic for the band
//! happens after the lock is released, so the workers really do run
//! side by side.
//!
//! A claim hands the worker both the row numbers and a mutable borrow of
//! exactly the storage those rows occupy, so no two workers can ever
//! write the same pixel.  When the height doesn't divide evenly the last
//! claims run past the top of the image; their bands are clamped, and
//! may be empty.

use crate::error::RenderError;
use crate::escape::{iteration_to_color, iterations_at_point};
use crate::gate::Gate;
use crate::raster::{Band, BandSplitter, PixelBuffer};
use crate::viewport::{Pixel, PlaneMapper};
use itertools::iproduct;
use log::debug;
use std::ops::Range;
use std::sync::Mutex;

/// A half-open run of image rows, `[start, end)`, claimed by one worker.
pub type RowRange = Range<usize>;

/// How many rows each of `threads` workers is given for an image of
/// `height` rows.  Rounds up, so the workers always cover the image.
pub fn rows_per_thread(height: usize, threads: usize) -> usize {
    (height + threads - 1) / threads
}

/// The ranges `threads` successive claims would produce, in claim order.
pub fn partition(height: usize, threads: usize) -> Vec<RowRange> {
    let mut cursor = RowCursor::new(rows_per_thread(height, threads));
    (0..threads).map(|_| cursor.claim()).collect()
}

/// The shared row cursor.  Every claim starts where the last one ended
/// and advances by exactly one step.
#[derive(Debug)]
pub struct RowCursor {
    next: usize,
    step: usize,
}

impl RowCursor {
    /// A cursor at row 0 that hands out `step` rows per claim.
    pub fn new(step: usize) -> RowCursor {
        RowCursor { next: 0, step }
    }

    /// Claim the next range and advance past it.
    pub fn claim(&mut self) -> RowRange {
        let start = self.next;
        self.next += self.step;
        start..self.next
    }
}

// The cursor together with the storage its claims grant.
struct Claims<'a> {
    cursor: RowCursor,
    bands: BandSplitter<'a>,
}

impl<'a> Claims<'a> {
    fn claim(&mut self) -> (RowRange, Band<'a>) {
        let rows = self.cursor.claim();
        let band = self.bands.take(rows.clone());
        (rows, band)
    }
}

/// Colour every pixel in a band.
pub fn render_band(band: &mut Band, plane: &PlaneMapper, max: u32) {
    for (row, column) in iproduct!(band.rows(), 0..band.width()) {
        let point = plane.pixel_to_point(&Pixel(column, row));
        let iters = iterations_at_point(point, max);
        band.set_pixel(column, row, iteration_to_color(iters, max));
    }
}

/// Fill `buffer` with the Mandelbrot set as seen through `plane`, using
/// exactly `threads` worker threads.  Blocks until every worker has
/// finished and returns the ranges they claimed, ordered by start.
///
/// A worker thread that cannot be created aborts the render.
pub fn render_rows(
    buffer: &mut PixelBuffer,
    plane: &PlaneMapper,
    max: u32,
    threads: usize,
) -> Result<Vec<RowRange>, RenderError> {
    if threads == 0 {
        return Err(RenderError::InvalidJob("thread count must be at least 1".to_string()));
    }
    if (buffer.width(), buffer.height()) != (plane.width(), plane.height()) {
        return Err(RenderError::InvalidJob(format!(
            "{}x{} buffer does not match {}x{} plane",
            buffer.width(),
            buffer.height(),
            plane.width(),
            plane.height()
        )));
    }

    let step = rows_per_thread(buffer.height(), threads);
    let claims = Mutex::new(Claims {
        cursor: RowCursor::new(step),
        bands: buffer.bands(),
    });

    // Launch gate: one slot per thread, returned as each worker finishes.
    let gate = Gate::new(threads);

    let result = crossbeam::scope(|spawner| -> Result<Vec<RowRange>, RenderError> {
        let mut handles = Vec::with_capacity(threads);
        for index in 0..threads {
            let permit = gate.acquire();
            let claims = &claims;
            let handle = spawner
                .builder()
                .name(format!("mandel-{}", index))
                .spawn(move |_| {
                    let (rows, mut band) = { claims.lock().unwrap().claim() };
                    debug!("worker {} claimed rows {}..{}", index, rows.start, rows.end);
                    render_band(&mut band, plane, max);
                    drop(permit);
                    rows
                })
                .map_err(|cause| RenderError::ThreadSpawn { index, cause })?;
            handles.push(handle);
        }
        handles
            .into_iter()
            .map(|handle| handle.join().map_err(|_| RenderError::WorkerPanicked))
            .collect()
    });

    let mut claimed = match result {
        Ok(claimed) => claimed?,
        Err(_) => return Err(RenderError::WorkerPanicked),
    };
    claimed.sort_by_key(|rows| rows.start);
    Ok(claimed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::escape::WHITE;
    use crate::viewport::Viewport;
    use rand::Rng;

    fn plane(width: usize, height: usize) -> PlaneMapper {
        PlaneMapper::new(&Viewport::new(0.0, 0.0, 4.0), width, height).unwrap()
    }

    #[test]
    fn rows_per_thread_rounds_up() {
        assert_eq!(rows_per_thread(10, 2), 5);
        assert_eq!(rows_per_thread(10, 3), 4);
        assert_eq!(rows_per_thread(10, 10), 1);
        assert_eq!(rows_per_thread(3, 8), 1);
        assert_eq!(rows_per_thread(1000, 1), 1000);
    }

    #[test]
    fn cursor_claims_are_contiguous() {
        let mut cursor = RowCursor::new(5);
        assert_eq!(cursor.claim(), 0..5);
        assert_eq!(cursor.claim(), 5..10);
        assert_eq!(cursor.claim(), 10..15);
    }

    // Clamped to the image, the claims must tile [0, height) exactly.
    fn assert_tiles(height: usize, threads: usize, ranges: &[RowRange]) {
        assert_eq!(ranges.len(), threads);
        let mut next = 0;
        for rows in ranges {
            assert_eq!(rows.start.min(height), next, "gap or overlap at row {}", next);
            next = rows.end.min(height);
        }
        assert_eq!(next, height, "rows {}..{} never claimed", next, height);
    }

    #[test]
    fn partitions_cover_every_row_once() {
        let mut rng = rand::thread_rng();
        for _ in 0..500 {
            let height = rng.gen_range(1, 2000);
            let threads = rng.gen_range(1, 64);
            assert_tiles(height, threads, &partition(height, threads));
        }
        for height in 1..40 {
            for threads in 1..12 {
                assert_tiles(height, threads, &partition(height, threads));
            }
        }
    }

    #[test]
    fn ten_by_ten_on_two_threads() {
        let mut buf = PixelBuffer::new(10, 10);
        let claimed = render_rows(&mut buf, &plane(10, 10), 1000, 2).unwrap();
        assert_eq!(claimed, vec![0..5, 5..10]);
        // (0, 0) sits at the center pixel and never escapes.
        assert_eq!(iterations_at_point(plane(10, 10).pixel_to_point(&Pixel(5, 5)), 1000), 1000);
        assert_eq!(buf.pixel(5, 5), Some(WHITE));
        // The corners are far outside the set.
        assert_eq!(buf.pixel(0, 0), Some(0));
    }

    #[test]
    fn uneven_heights_are_clamped() {
        let mut buf = PixelBuffer::new(7, 10);
        let claimed = render_rows(&mut buf, &plane(7, 10), 200, 4).unwrap();
        assert_eq!(claimed, vec![0..3, 3..6, 6..9, 9..12]);
        assert_tiles(10, 4, &claimed);
    }

    #[test]
    fn more_threads_than_rows() {
        let mut buf = PixelBuffer::new(4, 3);
        let claimed = render_rows(&mut buf, &plane(4, 3), 100, 8).unwrap();
        assert_tiles(3, 8, &claimed);
    }

    #[test]
    fn thread_count_does_not_change_the_image() {
        let (width, height) = (64, 47);
        let mut reference = PixelBuffer::new(width, height);
        render_rows(&mut reference, &plane(width, height), 300, 1).unwrap();
        for threads in &[2, 3, 4, 7, 16, 47, 60] {
            let mut buf = PixelBuffer::new(width, height);
            render_rows(&mut buf, &plane(width, height), 300, *threads).unwrap();
            assert!(buf == reference, "image differs with {} threads", threads);
        }
    }

    #[test]
    fn every_pixel_is_written() {
        // Paint the canvas a colour the renderer can never produce at
        // this cap, then check none of it survives.
        let (width, height) = (9, 13);
        let mut buf = PixelBuffer::new(width, height);
        buf.fill(0x0012_3457);
        render_rows(&mut buf, &plane(width, height), 1000, 5).unwrap();
        for y in 0..height {
            for x in 0..width {
                let iters = iterations_at_point(plane(width, height).pixel_to_point(&Pixel(x, y)), 1000);
                assert_eq!(buf.pixel(x, y), Some(iteration_to_color(iters, 1000)));
            }
        }
    }

    #[test]
    fn zero_threads_is_invalid() {
        let mut buf = PixelBuffer::new(4, 4);
        match render_rows(&mut buf, &plane(4, 4), 100, 0) {
            Err(RenderError::InvalidJob(_)) => (),
            other => panic!("expected InvalidJob, got {:?}", other),
        }
    }

    #[test]
    fn mismatched_plane_is_invalid() {
        let mut buf = PixelBuffer::new(4, 4);
        assert!(render_rows(&mut buf, &plane(5, 4), 100, 1).is_err());
    }
}
