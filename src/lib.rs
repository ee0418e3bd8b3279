#![deny(missing_docs)]
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Mandelbrot renderer and zoom-movie sequencer
//!
//! The Mandelbrot set is the set of points on the complex plane that
//! never run off to infinity when repeatedly squared and offset by
//! themselves.  Points outside the set escape at different speeds, and
//! that speed, the number of rounds they survive, is what colours the
//! picture.
//!
//! There are two layers of parallelism here.  A single image is cut
//! into bands of rows and rendered by a fixed pool of threads (see
//! `scheduler`).  A movie is a run of images at ever-smaller scales,
//! each rendered by its own `mandel` process, with a bounded number of
//! those processes running at once (see `sequence`).

extern crate crossbeam;
extern crate failure;
extern crate image;
extern crate itertools;
extern crate num;
extern crate num_cpus;

pub mod codec;
pub mod error;
pub mod escape;
pub mod gate;
pub mod job;
pub mod options;
pub mod raster;
pub mod scheduler;
pub mod sequence;
pub mod viewport;

pub use error::{CodecError, RenderError, SequenceError};
pub use job::{RenderJob, RenderReport};
pub use raster::PixelBuffer;
pub use sequence::{ProcessLauncher, Sequence, SequenceReport};
pub use viewport::Viewport;
