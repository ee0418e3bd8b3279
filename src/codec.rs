// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Moves PixelBuffers in and out of image files.  JPEG output is
//! written at full quality; any other extension is left to the image
//! crate to pick an encoder for.

use crate::error::CodecError;
use crate::raster::PixelBuffer;
use image::jpeg::JPEGEncoder;
use image::ColorType;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

const JPEG_QUALITY: u8 = 100;

fn is_jpeg(path: &Path) -> bool {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => ext.eq_ignore_ascii_case("jpg") || ext.eq_ignore_ascii_case("jpeg"),
        None => false,
    }
}

fn io_error(path: &Path) -> impl Fn(std::io::Error) -> CodecError + '_ {
    move |cause| CodecError::Io {
        path: path.to_path_buf(),
        cause,
    }
}

/// Write `buffer` to `path`.
pub fn encode(buffer: &PixelBuffer, path: &Path) -> Result<(), CodecError> {
    let (width, height) = (buffer.width() as u32, buffer.height() as u32);
    if is_jpeg(path) {
        let output = File::create(path).map_err(io_error(path))?;
        let mut output = BufWriter::new(output);
        JPEGEncoder::new_with_quality(&mut output, JPEG_QUALITY)
            .encode(buffer.as_raw(), width, height, ColorType::RGB(8))
            .map_err(io_error(path))?;
        return output.flush().map_err(io_error(path));
    }
    image::save_buffer(path, buffer.as_raw(), width, height, ColorType::RGB(8))
        .map_err(io_error(path))
}

/// Read the image at `path` into a new PixelBuffer.
pub fn decode(path: &Path) -> Result<PixelBuffer, CodecError> {
    let img = image::open(path)
        .map_err(|cause| CodecError::Image {
            path: path.to_path_buf(),
            cause,
        })?
        .to_rgb();
    let (width, height) = (img.width() as usize, img.height() as usize);
    let data = img.into_raw();
    let len = data.len();
    PixelBuffer::from_raw(width, height, data).ok_or_else(|| CodecError::Shape {
        path: path.to_path_buf(),
        width,
        height,
        len,
    })
}
