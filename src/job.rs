// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! One image, start to finish: allocate a black canvas, fill it with
//! the scheduler, and hand it to the codec.

use crate::codec;
use crate::error::RenderError;
use crate::raster::PixelBuffer;
use crate::scheduler::{render_rows, RowRange};
use crate::viewport::{PlaneMapper, Viewport};
use log::info;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Everything needed to render a single image.  Built once from the
/// command line and never changed while the render runs.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderJob {
    /// Image width in pixels.
    pub width: usize,
    /// Image height in pixels.
    pub height: usize,
    /// Iteration cap per point.
    pub max: u32,
    /// The region of the complex plane to draw.
    pub viewport: Viewport,
    /// Worker threads to split the rows among.
    pub threads: usize,
    /// Where the finished image goes.
    pub output: PathBuf,
}

impl Default for RenderJob {
    fn default() -> RenderJob {
        RenderJob {
            width: 1000,
            height: 1000,
            max: 1000,
            viewport: Viewport::new(0.0, 0.0, 4.0),
            threads: 1,
            output: PathBuf::from("mandel.jpg"),
        }
    }
}

/// What a finished render did.
#[derive(Clone, Debug)]
pub struct RenderReport {
    /// The row ranges each worker claimed, ordered by start.
    pub claims: Vec<RowRange>,
    /// Wall-clock time from allocation to the file being written.
    pub elapsed: Duration,
}

impl RenderJob {
    /// Map this job's pixels onto its viewport.
    pub fn plane(&self) -> Result<PlaneMapper, RenderError> {
        PlaneMapper::new(&self.viewport, self.width, self.height).map_err(RenderError::InvalidJob)
    }

    /// Compute the image in memory.
    pub fn render(&self) -> Result<(PixelBuffer, Vec<RowRange>), RenderError> {
        if self.max == 0 {
            return Err(RenderError::InvalidJob("iteration cap must be at least 1".to_string()));
        }
        let plane = self.plane()?;
        let mut buffer = PixelBuffer::new(self.width, self.height);
        buffer.fill(0);
        let claims = render_rows(&mut buffer, &plane, self.max, self.threads)?;
        Ok((buffer, claims))
    }

    /// Compute the image and store it at `self.output`.
    pub fn run(&self) -> Result<RenderReport, RenderError> {
        let start = Instant::now();
        info!(
            "mandel: x={} y={} xscale={} yscale={} max={} threads={} outfile={}",
            self.viewport.center.re,
            self.viewport.center.im,
            self.viewport.xscale,
            self.viewport.yscale(self.width, self.height),
            self.max,
            self.threads,
            self.output.display()
        );
        let (buffer, claims) = self.render()?;
        codec::encode(&buffer, &self.output)?;
        let elapsed = start.elapsed();
        info!("wrote {} in {:?}", self.output.display(), elapsed);
        Ok(RenderReport { claims, elapsed })
    }
}
