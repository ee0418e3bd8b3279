// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

extern crate clap;
extern crate env_logger;
extern crate mandel;

use clap::Arg;
use mandel::options::{self, value, HEIGHT, MAX, SCALE, THREADS, WIDTH, XCENTER, YCENTER};
use mandel::{RenderJob, Viewport};
use std::path::PathBuf;

const OUTPUT: &str = "output";

const EXAMPLES: &str = "Some examples are:
    mandel -x -0.5 -y -0.5 -s 0.2
    mandel -x -.38 -y -.665 -s .05 -m 100
    mandel -x 0.286932 -y 0.014287 -s .0005 -m 1000";

fn args() -> clap::ArgMatches<'static> {
    let app = options::app("mandel", "Renders one Mandelbrot set image")
        .after_help(EXAMPLES)
        .arg(
            Arg::with_name(SCALE)
                .long(SCALE)
                .short("s")
                .takes_value(true)
                .default_value("4")
                .validator(|s| options::validate_positive(&s, "Could not parse scale"))
                .help("Scale of the image in Mandelbrot coordinates (X-axis)"),
        )
        .arg(
            Arg::with_name(OUTPUT)
                .long(OUTPUT)
                .short("o")
                .takes_value(true)
                .default_value("mandel.jpg")
                .help("Output file"),
        );
    options::get_matches(options::render_args(app))
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let matches = args();
    let job = RenderJob {
        width: value(&matches, WIDTH),
        height: value(&matches, HEIGHT),
        max: value(&matches, MAX),
        viewport: Viewport::new(
            value(&matches, XCENTER),
            value(&matches, YCENTER),
            value(&matches, SCALE),
        ),
        threads: value(&matches, THREADS),
        output: PathBuf::from(matches.value_of_os(OUTPUT).unwrap_or_default()),
    };

    if let Err(e) = job.run() {
        eprintln!("Render failure: {}", e);
        std::process::exit(1);
    }
}
