// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors.  Nothing in this crate retries: every variant here ends the
//! unit of work that raised it.

use failure::Fail;
use std::fmt;
use std::io;
use std::path::PathBuf;

/// Failure to move an image between memory and a file.
#[derive(Debug, Fail)]
pub enum CodecError {
    /// The file could not be opened, read or written.
    Io {
        /// The file involved.
        path: PathBuf,
        /// The underlying failure.
        #[cause]
        cause: io::Error,
    },
    /// The encoder or decoder rejected the image.
    Image {
        /// The file involved.
        path: PathBuf,
        /// The underlying failure.
        #[cause]
        cause: image::ImageError,
    },
    /// Decoded data did not match the dimensions it claimed.
    Shape {
        /// The file involved.
        path: PathBuf,
        /// Claimed width.
        width: usize,
        /// Claimed height.
        height: usize,
        /// Bytes actually decoded.
        len: usize,
    },
}

// Paths aren't Display, so this one is written out by hand.
impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CodecError::Io { path, cause } => write!(f, "{}: {}", path.display(), cause),
            CodecError::Image { path, cause } => write!(f, "{}: {}", path.display(), cause),
            CodecError::Shape {
                path,
                width,
                height,
                len,
            } => write!(
                f,
                "{}: {}x{} image does not fit in {} bytes",
                path.display(),
                width,
                height,
                len
            ),
        }
    }
}

/// Failure to render one image.
#[derive(Debug, Fail)]
pub enum RenderError {
    /// The job's parameters cannot describe an image.
    #[fail(display = "invalid render job: {}", _0)]
    InvalidJob(String),
    /// The OS refused to start a worker thread.
    #[fail(display = "could not create worker thread {}: {}", index, cause)]
    ThreadSpawn {
        /// Which of the job's threads failed to start.
        index: usize,
        /// The underlying failure.
        #[cause]
        cause: io::Error,
    },
    /// A worker thread panicked before finishing its rows.
    #[fail(display = "a worker thread panicked")]
    WorkerPanicked,
    /// The finished image could not be written.
    #[fail(display = "could not store image: {}", _0)]
    Codec(#[cause] CodecError),
}

impl From<CodecError> for RenderError {
    fn from(err: CodecError) -> RenderError {
        RenderError::Codec(err)
    }
}

/// Failure that ends a whole frame sequence.  A single frame failing
/// to render is not one of these; see `sequence::FrameOutcome`.
#[derive(Debug, Fail)]
pub enum SequenceError {
    /// The sequence's parameters cannot describe a movie.
    #[fail(display = "invalid sequence: {}", _0)]
    InvalidSequence(String),
    /// The frame worker could not be started.
    #[fail(display = "could not launch worker for frame {}: {}", index, cause)]
    Launch {
        /// The frame being launched.
        index: usize,
        /// The underlying failure.
        #[cause]
        cause: io::Error,
    },
    /// The thread that waits on a frame worker could not be started.
    #[fail(display = "could not watch worker for frame {}: {}", index, cause)]
    WaiterSpawn {
        /// The frame being watched.
        index: usize,
        /// The underlying failure.
        #[cause]
        cause: io::Error,
    },
    /// A waiter thread panicked.
    #[fail(display = "a frame waiter thread panicked")]
    WorkerPanicked,
}
